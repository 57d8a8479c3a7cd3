//! Raw offsets and encodings of the vector unit register file.

/// Offset of the control (opcode) register.
pub const OFFSET_CONTROL: usize = 0x00;
/// Offset of the scratch buffer bus address register.
pub const OFFSET_MEM_BASE_ADDR: usize = 0x04;
/// Offset of the element count register.
pub const OFFSET_NUM_ELEMENTS: usize = 0x08;
/// Offset of the execution status register.
pub const OFFSET_STATUS: usize = 0x0C;
/// Offset of the interrupt status register.
pub const OFFSET_IRQ_STATUS: usize = 0x10;

/// Size of the register block in bytes.
pub const REGISTER_BLOCK_SIZE: usize = 0x14;

/// Idle/reset opcode. Writing it never starts an operation.
pub const OPCODE_WAITING: u32 = 0;
/// Element-wise addition.
pub const OPCODE_ADD: u32 = 1;
/// Element-wise subtraction.
pub const OPCODE_SUB: u32 = 2;

/// Status code of an idle unit.
pub const STATUS_IDLE: u32 = 0;
/// Status code reported while the unit owns the scratch buffer.
pub const STATUS_BUSY: u32 = 1;

/// Completion bit in `irq_status`.
pub const IRQ_DONE: u32 = 1 << 0;
