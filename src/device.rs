//! Polling driver for the vector unit.

use core::sync::atomic::{Ordering, fence};

use crate::{
    config::PollPolicy,
    err::VecUnitError,
    job::{JobReport, JobState, VectorJob},
    osal::Osal,
    registers::{RegisterMap, Status},
};

const LOG_INTERVAL: u32 = 100_000;

/// Drives one job at a time through `num_elements`, `mem_base_addr` and
/// `control`, then polls `status`.
///
/// The driver keeps no state between jobs. Callers must let a job reach
/// [`JobState::Done`] before starting the next one, which holds naturally
/// because [`VectorUnit::run_job`] blocks.
pub struct VectorUnit<R: RegisterMap, O: Osal> {
    regs: R,
    osal: O,
    poll: PollPolicy,
}

impl<R: RegisterMap, O: Osal> VectorUnit<R, O> {
    pub fn new(regs: R, osal: O, poll: PollPolicy) -> Self {
        Self { regs, osal, poll }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn osal(&self) -> &O {
        &self.osal
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn set_poll_policy(&mut self, poll: PollPolicy) {
        self.poll = poll;
    }

    /// Runs `job` to completion.
    ///
    /// The element count is written before the base address, and both before
    /// the opcode, because the opcode write is what starts the hardware.
    /// Results are in the scratch buffer once this returns `Ok`.
    pub fn run_job(&mut self, job: &VectorJob) -> Result<JobReport, VecUnitError> {
        if !job.opcode.is_trigger() || job.element_count == 0 {
            warn!("rejecting job {}", job);
            return Err(VecUnitError::InvalidArgument);
        }

        let mut state = JobState::Configuring;
        trace!("vector unit: {:?}", state);
        debug!("vector unit: configuring {}", job);
        self.regs.set_num_elements(job.element_count);
        self.regs.set_mem_base_addr(job.buffer_base);

        // Operand stores must reach memory before the unit starts reading.
        fence(Ordering::Release);
        self.regs.set_control(job.opcode);
        state = self.advance(state, JobState::Triggered);

        state = self.advance(state, JobState::Busy);
        let report = self.wait_for_completion()?;
        self.advance(state, JobState::Done);

        fence(Ordering::Acquire);
        debug!(
            "vector unit: {} done after {} busy polls, status={:#x}",
            job.opcode, report.busy_polls, report.final_status
        );
        Ok(report)
    }

    /// Polls `status` until it no longer reports busy, honouring the poll
    /// policy's limit.
    pub fn wait_for_completion(&self) -> Result<JobReport, VecUnitError> {
        let mut busy_polls: u32 = 0;
        loop {
            if let Status::NotBusy(final_status) = self.regs.status() {
                return Ok(JobReport {
                    busy_polls,
                    final_status,
                });
            }

            busy_polls = busy_polls.saturating_add(1);
            if self.poll.limit.is_some_and(|limit| busy_polls >= limit) {
                error!(
                    "vector unit timeout: polls={} control={:#x} mem_base_addr={:#x} num_elements={} irq_status={:#x}",
                    busy_polls,
                    self.regs.control(),
                    self.regs.mem_base_addr(),
                    self.regs.num_elements(),
                    self.regs.irq_status()
                );
                return Err(VecUnitError::Timeout { polls: busy_polls });
            }

            if busy_polls % LOG_INTERVAL == 0 {
                debug!("vector unit: still busy after {} polls", busy_polls);
            }

            self.osal.udelay(self.poll.delay_us);
        }
    }

    fn advance(&self, from: JobState, to: JobState) -> JobState {
        trace!("vector unit: {:?} -> {:?}", from, to);
        to
    }
}

#[cfg(test)]
mod tests {
    use core::{cell::Cell, ptr::NonNull};

    use super::*;
    use crate::{registers::Opcode, sim::SoftVectorUnit};

    #[derive(Default)]
    struct CountingOsal {
        delays: Cell<u32>,
    }

    impl Osal for CountingOsal {
        fn udelay(&self, _us: u32) {
            self.delays.set(self.delays.get() + 1);
        }

        fn dma_addr(&self, ptr: NonNull<u8>) -> u32 {
            ptr.as_ptr() as usize as u32
        }
    }

    fn single_element_job(sim: &SoftVectorUnit, arena: &mut [u64; 2]) -> VectorJob {
        let host = NonNull::from(arena).cast::<u8>();
        let bus = CountingOsal::default().dma_addr(host);
        unsafe { sim.attach(host, bus, 16) };
        VectorJob::new(Opcode::Add, 1, bus)
    }

    #[test]
    fn one_tick_per_busy_poll() {
        let sim = SoftVectorUnit::new().with_latency(4);
        let mut arena = [0u64; 2];
        let job = single_element_job(&sim, &mut arena);
        let osal = CountingOsal::default();
        let mut unit = VectorUnit::new(&sim, &osal, PollPolicy::unbounded(7));

        let report = unit.run_job(&job).unwrap();

        assert_eq!(report.busy_polls, 4);
        assert_eq!(osal.delays.get(), 4);
    }

    #[test]
    fn limit_counts_busy_reads() {
        let sim = SoftVectorUnit::new().with_latency(10);
        let mut arena = [0u64; 2];
        let job = single_element_job(&sim, &mut arena);
        let mut unit = VectorUnit::new(&sim, CountingOsal::default(), PollPolicy::bounded(10, 0));
        assert_eq!(unit.run_job(&job), Err(VecUnitError::Timeout { polls: 10 }));

        unit.set_poll_policy(PollPolicy::bounded(11, 0));
        assert!(unit.run_job(&job).is_ok());
    }
}
