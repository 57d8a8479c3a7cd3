use core::fmt;

use super::consts::*;

tock_registers::register_bitfields! {u32,
    pub CONTROL [
        OPCODE OFFSET(0) NUMBITS(32) [
            Waiting = 0,
            Add = 1,
            Sub = 2
        ]
    ],

    pub STATUS [
        STATE OFFSET(0) NUMBITS(32) [
            Idle = 0,
            Busy = 1
        ]
    ],

    pub IRQ_STATUS [
        DONE OFFSET(0) NUMBITS(1) []
    ]
}

/// Operation selected through the `control` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Opcode {
    Waiting = OPCODE_WAITING,
    Add = OPCODE_ADD,
    Sub = OPCODE_SUB,
}

impl Opcode {
    pub const fn raw(self) -> u32 {
        self as u32
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            OPCODE_WAITING => Some(Self::Waiting),
            OPCODE_ADD => Some(Self::Add),
            OPCODE_SUB => Some(Self::Sub),
            _ => None,
        }
    }

    /// Whether writing this opcode to `control` starts an operation.
    pub const fn is_trigger(self) -> bool {
        !matches!(self, Self::Waiting)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Add => "ADD",
            Self::Sub => "SUB",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Execution state as seen by the driver.
///
/// Only the busy code keeps the driver polling. Every other encoding,
/// including codes this driver does not know about, means the unit has
/// released the scratch buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Busy,
    NotBusy(u32),
}

impl Status {
    pub const fn from_raw(raw: u32) -> Self {
        if raw == STATUS_BUSY {
            Self::Busy
        } else {
            Self::NotBusy(raw)
        }
    }

    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_operation_opcodes_trigger() {
        assert!(!Opcode::Waiting.is_trigger());
        assert!(Opcode::Add.is_trigger());
        assert!(Opcode::Sub.is_trigger());
    }

    #[test]
    fn opcode_raw_values_match_register_encoding() {
        for op in [Opcode::Waiting, Opcode::Add, Opcode::Sub] {
            assert_eq!(Opcode::from_raw(op.raw()), Some(op));
        }
        assert_eq!(Opcode::Add.raw(), 1);
        assert_eq!(Opcode::Sub.raw(), 2);
        assert_eq!(Opcode::from_raw(3), None);
    }

    #[test]
    fn unknown_status_codes_are_not_busy() {
        assert!(Status::from_raw(STATUS_BUSY).is_busy());
        assert_eq!(Status::from_raw(0), Status::NotBusy(0));
        assert_eq!(Status::from_raw(0xdead), Status::NotBusy(0xdead));
    }
}
