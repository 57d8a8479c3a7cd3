//! Software reference check of a finished job.

use alloc::vec::Vec;
use core::fmt;

use crate::{memory::ScratchBuffer, registers::Opcode};

/// Expected result of `a OP b` in 64-bit arithmetic.
///
/// Addition cannot overflow. Subtraction wraps to the 64-bit two's
/// complement difference. `WAITING` computes nothing and yields `None`.
pub fn reference(opcode: Opcode, a: u32, b: u32) -> Option<u64> {
    let (a, b) = (u64::from(a), u64::from(b));
    match opcode {
        Opcode::Add => Some(a + b),
        Opcode::Sub => Some(a.wrapping_sub(b)),
        Opcode::Waiting => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementCheck {
    pub index: usize,
    pub a: u32,
    pub b: u32,
    pub actual: u64,
    pub expected: u64,
}

impl ElementCheck {
    pub fn is_match(&self) -> bool {
        self.actual == self.expected
    }
}

impl fmt::Display for ElementCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:3}] A={:#010x} B={:#010x} HW={:#018x} SW={:#018x} {}",
            self.index,
            self.a,
            self.b,
            self.actual,
            self.expected,
            if self.is_match() { "OK" } else { "MISMATCH" }
        )
    }
}

/// Element-wise comparison of hardware output against [`reference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub opcode: Opcode,
    pub checks: Vec<ElementCheck>,
    pub mismatches: usize,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }

    /// One line per element followed by the PASS/FAIL summary.
    pub fn write_report(&self, w: &mut impl fmt::Write) -> fmt::Result {
        for check in &self.checks {
            writeln!(w, "{check}")?;
        }
        writeln!(w, "{}", Summary(self))
    }
}

struct Summary<'a>(&'a Verification);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.passed() {
            write!(f, "PASS: {} {} elements match", v.checks.len(), v.opcode)
        } else {
            write!(
                f,
                "FAIL: {} of {} {} elements mismatched",
                v.mismatches,
                v.checks.len(),
                v.opcode
            )
        }
    }
}

/// Reads operands and results from `scratch` and compares every element.
///
/// Only reads the buffer; the register map is not touched.
pub fn verify(scratch: &ScratchBuffer<'_>, opcode: Opcode) -> Verification {
    let mut checks = Vec::with_capacity(scratch.len());
    let mut mismatches = 0;

    for index in 0..scratch.len() {
        let a = scratch.operand_a(index);
        let b = scratch.operand_b(index);
        let actual = scratch.result(index);
        // WAITING never produces output, so the result region should be
        // left as the harness zeroed it.
        let expected = reference(opcode, a, b).unwrap_or(0);
        let check = ElementCheck {
            index,
            a,
            b,
            actual,
            expected,
        };
        if !check.is_match() {
            mismatches += 1;
            warn!(
                "verify: element {} mismatch, hw={:#x} sw={:#x}",
                index, actual, expected
            );
        }
        checks.push(check);
    }

    Verification {
        opcode,
        checks,
        mismatches,
    }
}
