//! Software model of the vector unit.
//!
//! [`SoftVectorUnit`] implements [`RegisterMap`] without hardware: it
//! latches the configuration registers, performs the operation over an
//! attached memory window as soon as `control` receives an operation
//! opcode, and then reports busy for a configurable number of `status`
//! reads. Every register write is recorded so bus ordering can be checked.
//!
//! The window is addressed the way the hardware would address it: the
//! programmed `mem_base_addr` must equal the bus address the OSAL reported
//! for the attached pointer.

use alloc::vec::Vec;
use core::{
    cell::{Cell, RefCell},
    ptr::NonNull,
};

use crate::{
    memory::BufferLayout,
    osal::DmaAddr,
    registers::{Opcode, RegisterMap, consts::*},
    verify::reference,
};

/// Status code the model reports when a job could not be executed.
pub const STATUS_FAULT: u32 = 0x2;

/// A register write as seen on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusWrite {
    pub offset: usize,
    pub value: u32,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    host: NonNull<u8>,
    bus: DmaAddr,
    len: usize,
}

pub struct SoftVectorUnit {
    control: Cell<u32>,
    mem_base_addr: Cell<u32>,
    num_elements: Cell<u32>,
    status: Cell<u32>,
    irq_status: Cell<u32>,
    /// Busy reads the next job reports before completing.
    latency: Cell<u32>,
    remaining: Cell<u32>,
    stuck: Cell<bool>,
    jobs: Cell<u32>,
    irq_reads: Cell<u32>,
    window: Cell<Option<Window>>,
    writes: RefCell<Vec<BusWrite>>,
}

impl SoftVectorUnit {
    pub fn new() -> Self {
        Self {
            control: Cell::new(OPCODE_WAITING),
            mem_base_addr: Cell::new(0),
            num_elements: Cell::new(0),
            status: Cell::new(STATUS_IDLE),
            irq_status: Cell::new(0),
            latency: Cell::new(0),
            remaining: Cell::new(0),
            stuck: Cell::new(false),
            jobs: Cell::new(0),
            irq_reads: Cell::new(0),
            window: Cell::new(None),
            writes: RefCell::new(Vec::new()),
        }
    }

    /// Busy `status` reads reported per job.
    pub fn with_latency(self, polls: u32) -> Self {
        self.latency.set(polls);
        self
    }

    /// Never leave busy once triggered.
    pub fn set_stuck(&self, stuck: bool) {
        self.stuck.set(stuck);
    }

    /// Makes `len` bytes at `host` reachable at bus address `bus`.
    ///
    /// # Safety
    ///
    /// The region must stay valid and 4-byte aligned for as long as the
    /// model may execute jobs, and must only be accessed through volatile
    /// operations while it is attached.
    pub unsafe fn attach(&self, host: NonNull<u8>, bus: DmaAddr, len: usize) {
        self.window.set(Some(Window { host, bus, len }));
    }

    /// Register writes since creation or the last [`Self::take_writes`].
    pub fn take_writes(&self) -> Vec<BusWrite> {
        core::mem::take(&mut *self.writes.borrow_mut())
    }

    /// Jobs started so far.
    pub fn jobs(&self) -> u32 {
        self.jobs.get()
    }

    pub fn irq_reads(&self) -> u32 {
        self.irq_reads.get()
    }

    fn record(&self, offset: usize, value: u32) {
        self.writes.borrow_mut().push(BusWrite { offset, value });
    }

    fn start(&self, opcode: Opcode) {
        self.jobs.set(self.jobs.get() + 1);
        self.irq_status.set(0);
        let elements = self.num_elements.get() as usize;
        let base = self.mem_base_addr.get();

        if !self.execute(opcode, base, elements) {
            warn!(
                "sim: cannot run {} over {} elements at {:#x}",
                opcode, elements, base
            );
            self.status.set(STATUS_FAULT);
            return;
        }

        if self.stuck.get() || self.latency.get() > 0 {
            self.remaining.set(self.latency.get());
            self.status.set(STATUS_BUSY);
        } else {
            self.complete();
        }
    }

    fn complete(&self) {
        self.status.set(STATUS_IDLE);
        self.irq_status.set(IRQ_DONE);
    }

    fn execute(&self, opcode: Opcode, base: DmaAddr, elements: usize) -> bool {
        let Some(window) = self.window.get() else {
            return false;
        };
        let Ok(layout) = BufferLayout::checked(elements) else {
            return false;
        };
        if base != window.bus || layout.total_size > window.len {
            return false;
        }

        let word = |offset: usize| unsafe { window.host.as_ptr().add(offset).cast::<u32>() };
        for i in 0..elements {
            let (a, b) = unsafe {
                (
                    word(layout.op_a_offset + i * 4).read_volatile(),
                    word(layout.op_b_offset + i * 4).read_volatile(),
                )
            };
            let value = reference(opcode, a, b).unwrap_or(0);
            let at = layout.result_offset + i * 8;
            unsafe {
                word(at).write_volatile(value as u32);
                word(at + 4).write_volatile((value >> 32) as u32);
            }
        }
        true
    }
}

impl Default for SoftVectorUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterMap for SoftVectorUnit {
    fn control(&self) -> u32 {
        self.control.get()
    }

    fn set_control(&self, opcode: Opcode) {
        self.record(OFFSET_CONTROL, opcode.raw());
        self.control.set(opcode.raw());
        if opcode.is_trigger() {
            self.start(opcode);
        }
    }

    fn mem_base_addr(&self) -> u32 {
        self.mem_base_addr.get()
    }

    fn set_mem_base_addr(&self, addr: u32) {
        self.record(OFFSET_MEM_BASE_ADDR, addr);
        self.mem_base_addr.set(addr);
    }

    fn num_elements(&self) -> u32 {
        self.num_elements.get()
    }

    fn set_num_elements(&self, count: u32) {
        self.record(OFFSET_NUM_ELEMENTS, count);
        self.num_elements.set(count);
    }

    fn status_raw(&self) -> u32 {
        let status = self.status.get();
        if status == STATUS_BUSY && !self.stuck.get() {
            match self.remaining.get() {
                0 => {
                    self.complete();
                    return STATUS_IDLE;
                }
                n => self.remaining.set(n - 1),
            }
        }
        status
    }

    fn irq_status(&self) -> u32 {
        self.irq_reads.set(self.irq_reads.get() + 1);
        self.irq_status.get()
    }
}
