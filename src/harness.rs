//! End-to-end self-tests run from the firmware console.

use core::fmt::Write;

use crate::{
    config::VecUnitConfig,
    device::VectorUnit,
    err::VecUnitError,
    job::{JobReport, VectorJob},
    memory::ScratchBuffer,
    osal::{CharSink, Osal, SinkWriter},
    registers::{Opcode, RegisterMap},
    verify::{Verification, verify},
};

/// Outcome of [`run_vector_test`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub job: VectorJob,
    pub report: JobReport,
    pub verification: Verification,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.verification.passed()
    }
}

/// Runs one job over `arena` and checks it against the software reference.
///
/// The operands follow `a[i] = i + operand_a_bias`, `b[i] = i + operand_b_bias`
/// with `config.test_elements` entries. Progress and the per-element report
/// go to `out`. A verification failure is reported through the returned
/// outcome; `Err` means the job could not be run.
pub fn run_vector_test<R, O, S>(
    unit: &mut VectorUnit<R, O>,
    config: &VecUnitConfig,
    opcode: Opcode,
    arena: &mut [u64],
    out: &mut S,
) -> Result<TestOutcome, VecUnitError>
where
    R: RegisterMap,
    O: Osal,
    S: CharSink + ?Sized,
{
    let mut w = SinkWriter(out);
    let _ = writeln!(
        w,
        "\n--- Vector Unit {} Test (N={}) ---",
        opcode, config.test_elements
    );

    let mut scratch = match ScratchBuffer::new(arena, config.test_elements) {
        Ok(scratch) => scratch,
        Err(e) => {
            let _ = writeln!(w, "scratch buffer: {e}");
            return Err(e);
        }
    };
    let layout = scratch.layout();
    scratch.zero();
    let (bias_a, bias_b) = (config.operand_a_bias, config.operand_b_bias);
    scratch.fill_operands(|i| {
        let i = i as u32;
        (i.wrapping_add(bias_a), i.wrapping_add(bias_b))
    });

    let job = VectorJob::new(
        opcode,
        layout.elements as u32,
        unit.osal().dma_addr(scratch.as_ptr()),
    );
    let _ = writeln!(
        w,
        "scratch: A=+{:#x} B=+{:#x} R=+{:#x} ({} bytes)",
        layout.op_a_offset, layout.op_b_offset, layout.result_offset, layout.total_size
    );
    let _ = writeln!(w, "job: {job}");
    info!("vector test: starting {}", job);

    let report = match unit.run_job(&job) {
        Ok(report) => report,
        Err(e) => {
            let _ = writeln!(w, "job failed: {e}");
            return Err(e);
        }
    };
    let _ = writeln!(
        w,
        "done after {} busy polls (status={:#x})",
        report.busy_polls, report.final_status
    );

    let verification = verify(&scratch, opcode);
    let _ = verification.write_report(&mut w);
    if verification.passed() {
        info!("vector test: PASS");
    } else {
        warn!("vector test: FAIL with {} mismatches", verification.mismatches);
    }

    Ok(TestOutcome {
        job,
        report,
        verification,
    })
}

/// Result of a single register write/read-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterCheck {
    pub name: &'static str,
    pub offset: usize,
    pub written: u32,
    pub read: u32,
}

impl RegisterCheck {
    pub fn passed(&self) -> bool {
        self.written == self.read
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub checks: [RegisterCheck; 3],
    pub irq_samples: alloc::vec::Vec<u32>,
}

impl ProbeReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(RegisterCheck::passed)
    }
}

const PROBE_MEM_BASE_ADDR: u32 = 0xFFEE_AA55;
const PROBE_NUM_ELEMENTS: u32 = 32;

/// Write/read-back check of the R/W registers, then a few `irq_status`
/// samples.
///
/// `control` is only ever written with `WAITING`, so the probe never starts
/// an operation. The unit must be idle.
pub fn probe_registers<R, O, S>(
    unit: &VectorUnit<R, O>,
    config: &VecUnitConfig,
    out: &mut S,
) -> ProbeReport
where
    R: RegisterMap,
    O: Osal,
    S: CharSink + ?Sized,
{
    use crate::registers::consts::*;

    let mut w = SinkWriter(out);
    let regs = unit.regs();
    let _ = writeln!(w, "\n--- Vector Unit Register Test ---");

    regs.set_mem_base_addr(PROBE_MEM_BASE_ADDR);
    let mem_base = RegisterCheck {
        name: "mem_base_addr",
        offset: OFFSET_MEM_BASE_ADDR,
        written: PROBE_MEM_BASE_ADDR,
        read: regs.mem_base_addr(),
    };

    regs.set_num_elements(PROBE_NUM_ELEMENTS);
    let num_elements = RegisterCheck {
        name: "num_elements",
        offset: OFFSET_NUM_ELEMENTS,
        written: PROBE_NUM_ELEMENTS,
        read: regs.num_elements(),
    };

    regs.set_control(Opcode::Waiting);
    let control = RegisterCheck {
        name: "control",
        offset: OFFSET_CONTROL,
        written: OPCODE_WAITING,
        read: regs.control(),
    };

    let checks = [mem_base, num_elements, control];
    for check in &checks {
        let _ = writeln!(
            w,
            "{:<14} (+{:#04x}) wrote {:#010x} read {:#010x} {}",
            check.name,
            check.offset,
            check.written,
            check.read,
            if check.passed() { "PASSED" } else { "FAILED" }
        );
    }

    let _ = writeln!(w, "irq_status (+{:#04x}):", OFFSET_IRQ_STATUS);
    let mut irq_samples = alloc::vec::Vec::with_capacity(config.irq_samples);
    for i in 0..config.irq_samples {
        let value = regs.irq_status();
        let _ = writeln!(w, "  read {}: {:#010x}", i + 1, value);
        irq_samples.push(value);
        unit.osal().udelay(config.irq_sample_delay_us);
    }

    let report = ProbeReport {
        checks,
        irq_samples,
    };
    let _ = writeln!(
        w,
        "register test {}",
        if report.passed() { "PASSED" } else { "FAILED" }
    );
    report
}
