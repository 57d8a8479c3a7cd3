//! Board-level configuration for the vector unit and its self-test.

/// SoC integrations the crate knows about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VecUnitType {
    /// LiteX SoC with the vector unit as a Wishbone slave.
    LitexWishbone,
}

/// How the driver waits for the `status` register to clear.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of busy status reads before giving up. `None` polls
    /// forever.
    pub limit: Option<u32>,
    /// Busy-wait tick between two status reads, in microseconds.
    pub delay_us: u32,
}

impl PollPolicy {
    pub const fn unbounded(delay_us: u32) -> Self {
        Self {
            limit: None,
            delay_us,
        }
    }

    pub const fn bounded(limit: u32, delay_us: u32) -> Self {
        Self {
            limit: Some(limit),
            delay_us,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::bounded(1_000_000, 1)
    }
}

#[derive(Debug, Clone)]
pub struct VecUnitConfig {
    pub ty: VecUnitType,
    /// Physical address of the register block.
    pub base_addr: usize,
    pub poll: PollPolicy,
    /// Element count used by the self-test.
    pub test_elements: usize,
    /// Operand-A pattern is `i + operand_a_bias`.
    pub operand_a_bias: u32,
    /// Operand-B pattern is `i + operand_b_bias`.
    pub operand_b_bias: u32,
    /// Number of `irq_status` samples taken by the register probe.
    pub irq_samples: usize,
    /// Delay between two `irq_status` samples, in microseconds.
    pub irq_sample_delay_us: u32,
}

impl VecUnitConfig {
    pub fn new(ty: VecUnitType) -> Self {
        match ty {
            VecUnitType::LitexWishbone => Self::new_litex(),
        }
    }

    fn new_litex() -> Self {
        Self {
            ty: VecUnitType::LitexWishbone,
            base_addr: 0x8300_0000,
            poll: PollPolicy::default(),
            test_elements: 10,
            operand_a_bias: 100,
            operand_b_bias: 1,
            irq_samples: 10,
            irq_sample_delay_us: 100_000,
        }
    }

    /// Words of `u64` arena the self-test needs.
    pub fn arena_words(&self) -> usize {
        self.test_elements * 2
    }
}
