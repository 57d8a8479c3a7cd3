//! Job descriptor handed to the driver.

use core::fmt;

use crate::{osal::DmaAddr, registers::Opcode};

/// One coprocessor invocation. It only lives for the duration of
/// [`crate::VectorUnit::run_job`]; afterwards the state is in the registers
/// and the scratch buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorJob {
    pub opcode: Opcode,
    pub element_count: u32,
    /// Bus address of the scratch buffer.
    pub buffer_base: DmaAddr,
}

impl VectorJob {
    pub const fn new(opcode: Opcode, element_count: u32, buffer_base: DmaAddr) -> Self {
        Self {
            opcode,
            element_count,
            buffer_base,
        }
    }
}

impl fmt::Display for VectorJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opcode={} elements={} base={:#010x}",
            self.opcode, self.element_count, self.buffer_base
        )
    }
}

/// Driver-side phases of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Configuring,
    Triggered,
    Busy,
    Done,
}

/// What the driver observed while running a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    /// Number of `status` reads that returned busy.
    pub busy_polls: u32,
    /// The first non-busy `status` value.
    pub final_status: u32,
}
