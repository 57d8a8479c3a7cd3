//! Platform hooks the driver and the harness depend on.
//!
//! The firmware provides a busy-wait delay, the mapping from CPU pointers
//! to bus addresses, and a blocking character output. Everything else in
//! the crate is platform independent.

use alloc::vec::Vec;
use core::{fmt, ptr::NonNull};

/// Bus address as programmed into `mem_base_addr`.
pub type DmaAddr = u32;

pub trait Osal {
    /// Busy-wait for roughly `us` microseconds.
    fn udelay(&self, us: u32);

    /// Bus address the coprocessor uses to reach `ptr`.
    fn dma_addr(&self, ptr: NonNull<u8>) -> DmaAddr;
}

impl<T: Osal + ?Sized> Osal for &T {
    fn udelay(&self, us: u32) {
        (**self).udelay(us)
    }

    fn dma_addr(&self, ptr: NonNull<u8>) -> DmaAddr {
        (**self).dma_addr(ptr)
    }
}

/// Identity-mapped SoC with a calibrated spin delay.
#[derive(Debug, Clone, Copy)]
pub struct BareMetalOsal {
    pub loops_per_us: u32,
}

impl BareMetalOsal {
    pub const fn new(loops_per_us: u32) -> Self {
        Self { loops_per_us }
    }
}

impl Osal for BareMetalOsal {
    fn udelay(&self, us: u32) {
        let loops = us.saturating_mul(self.loops_per_us);
        for _ in 0..loops {
            core::hint::spin_loop();
        }
    }

    fn dma_addr(&self, ptr: NonNull<u8>) -> DmaAddr {
        // Physical == virtual on this SoC; the bus is 32 bits wide.
        ptr.as_ptr() as usize as DmaAddr
    }
}

/// Blocking character output.
pub trait CharSink {
    fn put_char(&mut self, c: u8);

    fn put_str(&mut self, s: &str) {
        for b in s.bytes() {
            self.put_char(b);
        }
    }
}

impl<S: CharSink + ?Sized> CharSink for &mut S {
    fn put_char(&mut self, c: u8) {
        (**self).put_char(c)
    }
}

impl CharSink for Vec<u8> {
    fn put_char(&mut self, c: u8) {
        self.push(c);
    }
}

/// Wraps the firmware's `putchar`-style UART routine.
#[derive(Clone, Copy)]
pub struct PutChar(pub fn(u8));

impl CharSink for PutChar {
    fn put_char(&mut self, c: u8) {
        (self.0)(c)
    }
}

/// [`fmt::Write`] adapter so reports can use `write!`.
pub struct SinkWriter<'a, S: CharSink + ?Sized>(pub &'a mut S);

impl<S: CharSink + ?Sized> fmt::Write for SinkWriter<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put_str(s);
        Ok(())
    }
}
