//! Memory-mapped register definitions for the vector unit.
//!
//! The register file is described with [`tock_registers`] so every access
//! is a single volatile 32-bit load or store at `base + offset`. The driver
//! does not touch the block directly; it goes through [`RegisterMap`], which
//! is implemented here for real MMIO and in [`crate::sim`] for the software
//! model.

use core::{ops::Deref, ptr::NonNull};

use tock_registers::{
    interfaces::{Readable, Writeable},
    register_structs,
    registers::{ReadOnly, ReadWrite},
};

pub mod consts;
mod fields;

pub use fields::*;

register_structs! {
    pub VecUnitRegs {
        (0x0000 => pub control: ReadWrite<u32, CONTROL::Register>),
        (0x0004 => pub mem_base_addr: ReadWrite<u32>),
        (0x0008 => pub num_elements: ReadWrite<u32>),
        (0x000C => pub status: ReadOnly<u32, STATUS::Register>),
        (0x0010 => pub irq_status: ReadOnly<u32, IRQ_STATUS::Register>),
        (0x0014 => @END),
    }
}

/// Typed accessors for the coprocessor registers.
///
/// Each call is exactly one bus transaction. Nothing is cached, so two
/// consecutive reads of `status` observe the hardware twice.
pub trait RegisterMap {
    /// Latched opcode.
    fn control(&self) -> u32;

    /// Writes `control`.
    ///
    /// Writing an opcode other than [`Opcode::Waiting`] starts an operation
    /// using the current `num_elements` and `mem_base_addr`.
    fn set_control(&self, opcode: Opcode);

    fn mem_base_addr(&self) -> u32;

    fn set_mem_base_addr(&self, addr: u32);

    fn num_elements(&self) -> u32;

    fn set_num_elements(&self, count: u32);

    /// Raw `status` value.
    fn status_raw(&self) -> u32;

    fn irq_status(&self) -> u32;

    fn status(&self) -> Status {
        Status::from_raw(self.status_raw())
    }

    /// Completion flag in `irq_status`.
    fn irq_done(&self) -> bool {
        self.irq_status() & consts::IRQ_DONE != 0
    }
}

impl<T: RegisterMap + ?Sized> RegisterMap for &T {
    fn control(&self) -> u32 {
        (**self).control()
    }

    fn set_control(&self, opcode: Opcode) {
        (**self).set_control(opcode)
    }

    fn mem_base_addr(&self) -> u32 {
        (**self).mem_base_addr()
    }

    fn set_mem_base_addr(&self, addr: u32) {
        (**self).set_mem_base_addr(addr)
    }

    fn num_elements(&self) -> u32 {
        (**self).num_elements()
    }

    fn set_num_elements(&self, count: u32) {
        (**self).set_num_elements(count)
    }

    fn status_raw(&self) -> u32 {
        (**self).status_raw()
    }

    fn irq_status(&self) -> u32 {
        (**self).irq_status()
    }

    fn status(&self) -> Status {
        (**self).status()
    }

    fn irq_done(&self) -> bool {
        (**self).irq_done()
    }
}

/// MMIO view of the vector unit register file.
pub struct VecUnitRegisters {
    base: NonNull<VecUnitRegs>,
}

unsafe impl Send for VecUnitRegisters {}

impl VecUnitRegisters {
    /// Create a new facade over the vector unit MMIO region.
    ///
    /// # Safety
    ///
    /// `base_addr` must point at the mapped register block, be 4-byte
    /// aligned and stay valid for the lifetime of the returned object. No
    /// other typed reference may alias the block.
    pub const unsafe fn new(base_addr: NonNull<u8>) -> Self {
        Self {
            base: base_addr.cast(),
        }
    }

}

impl Deref for VecUnitRegisters {
    type Target = VecUnitRegs;

    fn deref(&self) -> &Self::Target {
        unsafe { self.base.as_ref() }
    }
}

impl RegisterMap for VecUnitRegisters {
    fn control(&self) -> u32 {
        self.control.get()
    }

    fn set_control(&self, opcode: Opcode) {
        self.control.write(CONTROL::OPCODE.val(opcode.raw()));
    }

    fn mem_base_addr(&self) -> u32 {
        self.mem_base_addr.get()
    }

    fn set_mem_base_addr(&self, addr: u32) {
        self.mem_base_addr.set(addr);
    }

    fn num_elements(&self) -> u32 {
        self.num_elements.get()
    }

    fn set_num_elements(&self, count: u32) {
        self.num_elements.set(count);
    }

    fn status_raw(&self) -> u32 {
        self.status.get()
    }

    fn irq_status(&self) -> u32 {
        self.irq_status.get()
    }

    fn status(&self) -> Status {
        let status = self.status.extract();
        match status.read_as_enum(STATUS::STATE) {
            Some(STATUS::STATE::Value::Busy) => Status::Busy,
            Some(STATUS::STATE::Value::Idle) | None => Status::NotBusy(status.get()),
        }
    }

    fn irq_done(&self) -> bool {
        self.irq_status.is_set(IRQ_STATUS::DONE)
    }
}

#[cfg(test)]
mod tests {
    use super::consts::*;
    use super::*;

    #[repr(C, align(4))]
    struct Backing([u32; REGISTER_BLOCK_SIZE / 4]);

    fn word(backing: &Backing, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile(&backing.0[offset / 4]) }
    }

    #[test]
    fn accessors_hit_documented_offsets() {
        let mut backing = Backing([0; REGISTER_BLOCK_SIZE / 4]);
        let regs = unsafe { VecUnitRegisters::new(NonNull::from(&mut backing).cast()) };

        regs.set_num_elements(10);
        regs.set_mem_base_addr(0x4000_1000);
        regs.set_control(Opcode::Sub);
        drop(regs);

        assert_eq!(word(&backing, OFFSET_NUM_ELEMENTS), 10);
        assert_eq!(word(&backing, OFFSET_MEM_BASE_ADDR), 0x4000_1000);
        assert_eq!(word(&backing, OFFSET_CONTROL), OPCODE_SUB);
    }

    #[test]
    fn read_only_registers_reflect_backing_memory() {
        let mut backing = Backing([0; REGISTER_BLOCK_SIZE / 4]);
        backing.0[OFFSET_STATUS / 4] = STATUS_BUSY;
        backing.0[OFFSET_IRQ_STATUS / 4] = IRQ_DONE;
        let regs = unsafe { VecUnitRegisters::new(NonNull::from(&mut backing).cast()) };

        assert_eq!(regs.status(), Status::Busy);
        assert_eq!(regs.irq_status(), IRQ_DONE);
        assert!(regs.irq_done());
    }

    #[test]
    fn status_codes_other_than_busy_decode_as_not_busy() {
        let mut backing = Backing([0; REGISTER_BLOCK_SIZE / 4]);
        let regs = unsafe { VecUnitRegisters::new(NonNull::from(&mut backing).cast()) };
        assert_eq!(regs.status(), Status::NotBusy(STATUS_IDLE));
        assert!(!regs.irq_done());
        drop(regs);

        backing.0[OFFSET_STATUS / 4] = 0x2;
        let regs = unsafe { VecUnitRegisters::new(NonNull::from(&mut backing).cast()) };
        assert_eq!(regs.status(), Status::NotBusy(0x2));
    }

    #[test]
    fn read_write_registers_round_trip() {
        let mut backing = Backing([0; REGISTER_BLOCK_SIZE / 4]);
        let regs = unsafe { VecUnitRegisters::new(NonNull::from(&mut backing).cast()) };

        regs.set_mem_base_addr(0xFFEE_AA55);
        regs.set_num_elements(32);
        regs.set_control(Opcode::Waiting);

        assert_eq!(regs.mem_base_addr(), 0xFFEE_AA55);
        assert_eq!(regs.num_elements(), 32);
        assert_eq!(regs.control(), OPCODE_WAITING);
    }
}
