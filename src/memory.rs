//! Scratch buffer shared between the CPU and the vector unit.
//!
//! A job uses one contiguous region split into three back-to-back arrays:
//!
//! ```text
//! [0,   4N)  operand A   N x u32
//! [4N,  8N)  operand B   N x u32
//! [8N, 16N)  result      N x u64 (low word first)
//! ```

use core::{marker::PhantomData, mem::size_of, ptr::NonNull};

use crate::err::VecUnitError;

const OPERAND_BYTES: usize = size_of::<u32>();
const RESULT_BYTES: usize = size_of::<u64>();

/// Byte offsets of the three sub-arrays for a given element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    pub elements: usize,
    pub op_a_offset: usize,
    pub op_b_offset: usize,
    pub result_offset: usize,
    pub total_size: usize,
}

impl BufferLayout {
    /// Layout for `elements` entries. The caller keeps `elements` small
    /// enough for the address arithmetic; see [`BufferLayout::checked`].
    pub const fn new(elements: usize) -> Self {
        Self {
            elements,
            op_a_offset: 0,
            op_b_offset: elements * OPERAND_BYTES,
            result_offset: elements * OPERAND_BYTES * 2,
            total_size: elements * (OPERAND_BYTES * 2 + RESULT_BYTES),
        }
    }

    /// Like [`BufferLayout::new`], but rejects zero elements and sizes the
    /// 32-bit bus cannot address.
    pub fn checked(elements: usize) -> Result<Self, VecUnitError> {
        if elements == 0 {
            return Err(VecUnitError::InvalidArgument);
        }
        let total = elements
            .checked_mul(OPERAND_BYTES * 2 + RESULT_BYTES)
            .filter(|&total| u32::try_from(total).is_ok())
            .ok_or(VecUnitError::LayoutOverflow { elements })?;
        debug_assert_eq!(total, Self::new(elements).total_size);
        Ok(Self::new(elements))
    }

    pub const fn op_a_range(&self) -> core::ops::Range<usize> {
        self.op_a_offset..self.op_b_offset
    }

    pub const fn op_b_range(&self) -> core::ops::Range<usize> {
        self.op_b_offset..self.result_offset
    }

    pub const fn result_range(&self) -> core::ops::Range<usize> {
        self.result_offset..self.total_size
    }
}

/// One run's view over a caller-owned arena.
///
/// The arena is borrowed for `'a`, so nothing else on the CPU side can touch
/// it while the coprocessor may be writing. Every element access is volatile
/// because the memory is shared with a bus master.
pub struct ScratchBuffer<'a> {
    base: NonNull<u8>,
    layout: BufferLayout,
    _arena: PhantomData<&'a mut [u64]>,
}

impl<'a> ScratchBuffer<'a> {
    /// Carves a buffer for `elements` entries out of the front of `arena`.
    pub fn new(arena: &'a mut [u64], elements: usize) -> Result<Self, VecUnitError> {
        let layout = BufferLayout::checked(elements)?;
        let available = arena.len() * size_of::<u64>();
        if available < layout.total_size {
            return Err(VecUnitError::BufferTooSmall {
                needed: layout.total_size,
                available,
            });
        }

        let base = NonNull::from(arena).cast::<u8>();
        Ok(Self {
            base,
            layout,
            _arena: PhantomData,
        })
    }

    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.layout.elements
    }

    pub fn is_empty(&self) -> bool {
        self.layout.elements == 0
    }

    /// Start of the region, as handed to [`crate::Osal::dma_addr`].
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.base
    }

    pub fn zero(&mut self) {
        for word in 0..self.layout.total_size / size_of::<u32>() {
            unsafe { self.word_ptr(word * size_of::<u32>()).write_volatile(0) };
        }
    }

    /// Fills both operand arrays from `pattern(i) -> (a, b)`.
    pub fn fill_operands(&mut self, mut pattern: impl FnMut(usize) -> (u32, u32)) {
        for i in 0..self.len() {
            let (a, b) = pattern(i);
            self.set_operand_a(i, a);
            self.set_operand_b(i, b);
        }
    }

    pub fn set_operand_a(&mut self, index: usize, value: u32) {
        let offset = self.operand_offset(self.layout.op_a_offset, index);
        unsafe { self.word_ptr(offset).write_volatile(value) };
    }

    pub fn set_operand_b(&mut self, index: usize, value: u32) {
        let offset = self.operand_offset(self.layout.op_b_offset, index);
        unsafe { self.word_ptr(offset).write_volatile(value) };
    }

    pub fn operand_a(&self, index: usize) -> u32 {
        let offset = self.operand_offset(self.layout.op_a_offset, index);
        unsafe { self.word_ptr(offset).read_volatile() }
    }

    pub fn operand_b(&self, index: usize) -> u32 {
        let offset = self.operand_offset(self.layout.op_b_offset, index);
        unsafe { self.word_ptr(offset).read_volatile() }
    }

    /// Result element `index`, assembled from its low and high words.
    pub fn result(&self, index: usize) -> u64 {
        assert!(index < self.len(), "result index {index} out of range");
        let offset = self.layout.result_offset + index * RESULT_BYTES;
        let (lo, hi) = unsafe {
            (
                self.word_ptr(offset).read_volatile(),
                self.word_ptr(offset + OPERAND_BYTES).read_volatile(),
            )
        };
        u64::from(lo) | (u64::from(hi) << 32)
    }

    fn operand_offset(&self, array: usize, index: usize) -> usize {
        assert!(index < self.len(), "operand index {index} out of range");
        array + index * OPERAND_BYTES
    }

    /// # Safety
    ///
    /// `offset` must be 4-byte aligned and inside the layout.
    unsafe fn word_ptr(&self, offset: usize) -> *mut u32 {
        unsafe { self.base.as_ptr().add(offset).cast::<u32>() }
    }
}
