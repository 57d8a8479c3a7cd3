//! Bare-metal driver and self-test harness for a memory-mapped vector
//! coprocessor.
//!
//! The coprocessor sits on the SoC bus and exposes five 32-bit registers.
//! Software places two operand arrays in a scratch buffer, programs the
//! element count and buffer address, writes an opcode to start the job and
//! polls `status` until the unit is done. The harness then recomputes every
//! element in software and reports PASS or FAIL on the console.
//!
//! ```text
//! harness ── layout ── scratch buffer ── VectorUnit::run_job ── verify
//!                                             │
//!                                         RegisterMap
//!                                       (MMIO or sim)
//! ```
//!
//! Only polling is supported and only one job runs at a time.

#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[macro_use]
extern crate log;

mod config;
mod device;
mod err;
mod harness;
mod job;
pub mod logger;
mod memory;
mod osal;
pub mod registers;
mod shell;
pub mod sim;
mod verify;

pub use config::*;
pub use device::*;
pub use err::*;
pub use harness::*;
pub use job::*;
pub use memory::*;
pub use osal::*;
pub use registers::{Opcode, RegisterMap, Status, VecUnitRegisters};
pub use shell::*;
pub use verify::*;

use core::ptr::NonNull;

/// Builds a driver over the MMIO block named by `config.base_addr`.
///
/// # Safety
///
/// `config.base_addr` must be the mapped address of the vector unit
/// register file and stay valid for the lifetime of the driver.
pub unsafe fn mmio_vector_unit<O: Osal>(
    config: &VecUnitConfig,
    osal: O,
) -> Result<VectorUnit<VecUnitRegisters, O>, VecUnitError> {
    let base = NonNull::new(config.base_addr as *mut u8).ok_or(VecUnitError::InvalidArgument)?;
    let regs = unsafe { VecUnitRegisters::new(base) };
    Ok(VectorUnit::new(regs, osal, config.poll))
}
