use proptest::prelude::*;
use vecunit::{
    BareMetalOsal, BufferLayout, Opcode, Osal, PollPolicy, ScratchBuffer, VectorJob, VectorUnit,
    sim::SoftVectorUnit, verify,
};

const OSAL: BareMetalOsal = BareMetalOsal::new(0);
const MAX_ELEMENTS: usize = u32::MAX as usize / 16;

fn wide(opcode: Opcode, a: u32, b: u32) -> u64 {
    match opcode {
        Opcode::Add => u64::from(a) + u64::from(b),
        Opcode::Sub => u64::from(a).wrapping_sub(u64::from(b)),
        Opcode::Waiting => 0,
    }
}

proptest! {
    #[test]
    fn layout_tiles_sixteen_bytes_per_element(n in 1usize..=MAX_ELEMENTS) {
        let layout = BufferLayout::new(n);
        prop_assert_eq!(BufferLayout::checked(n), Ok(layout));
        prop_assert_eq!(layout.total_size, 16 * n);
        prop_assert_eq!(layout.op_a_range(), 0..4 * n);
        prop_assert_eq!(layout.op_b_range(), 4 * n..8 * n);
        prop_assert_eq!(layout.result_range(), 8 * n..16 * n);
    }

    #[test]
    fn hardware_results_match_wide_reference(
        operands in prop::collection::vec(any::<(u32, u32)>(), 1..64),
        opcode in prop_oneof![Just(Opcode::Add), Just(Opcode::Sub)],
        latency in 0u32..8,
    ) {
        let n = operands.len();
        let sim = SoftVectorUnit::new().with_latency(latency);
        let mut arena = vec![0u64; 2 * n];
        let mut scratch = ScratchBuffer::new(&mut arena, n).unwrap();
        let bus = OSAL.dma_addr(scratch.as_ptr());
        unsafe { sim.attach(scratch.as_ptr(), bus, scratch.layout().total_size) };

        scratch.zero();
        scratch.fill_operands(|i| operands[i]);
        let mut unit = VectorUnit::new(&sim, OSAL, PollPolicy::bounded(16, 0));
        let report = unit.run_job(&VectorJob::new(opcode, n as u32, bus)).unwrap();
        prop_assert_eq!(report.busy_polls, latency);

        let verification = verify(&scratch, opcode);
        prop_assert_eq!(verification.mismatches, 0);
        for (check, &(a, b)) in verification.checks.iter().zip(&operands) {
            prop_assert_eq!((check.a, check.b), (a, b));
            prop_assert_eq!(check.actual, wide(opcode, a, b));
            prop_assert_eq!(scratch.result(check.index), wide(opcode, a, b));
        }
    }
}
