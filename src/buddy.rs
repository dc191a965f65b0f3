//! A binary-buddy allocation simulator.
//!
//! The region `[0, total_size)` is represented as an address-ordered sequence
//! of [`Block`] records that always tile it exactly. Allocation rounds the
//! request up to a power of two, finds the first free block that fits, and
//! splits it in half repeatedly until the block is as small as possible.
//! Deallocation frees a block by address and then coalesces free buddies,
//! cascading merges back up until no two adjacent free blocks of equal size
//! remain.

use tracing::trace;

use crate::{AllocError, AllocInitError, DeallocError};

/// The allocation state of a [`Block`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockState {
    /// The block is available to satisfy allocations.
    Free,
    /// The block is held by a caller.
    Allocated,
}

/// A record describing one block of the simulated region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    start: usize,
    size: usize,
    state: BlockState,
    fragmentation: usize,
}

impl Block {
    fn free(start: usize, size: usize) -> Block {
        Block {
            start,
            size,
            state: BlockState::Free,
            fragmentation: 0,
        }
    }

    /// Returns the offset of this block from the base of the region.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the size of this block.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the allocation state of this block.
    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Returns `true` if this block is free.
    pub fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }

    /// Returns the internal fragmentation of this block.
    ///
    /// For an allocated block, this is the block size minus the size that was
    /// requested. For a free block it is always zero.
    pub fn fragmentation(&self) -> usize {
        self.fragmentation
    }
}

/// A binary-buddy allocator over a simulated address range.
///
/// The allocator is pure bookkeeping: it hands out offsets into an abstract
/// region rather than pointers into real memory. The region begins as a
/// single free block spanning `[0, total_size)`.
///
/// Blocks are stored sorted by start address at all times, so the first-fit
/// scan is deterministic and [`blocks`] enumerates the region in address
/// order.
///
/// [`blocks`]: BuddyAllocator::blocks
#[derive(Debug)]
pub struct BuddyAllocator {
    total_size: usize,
    blocks: Vec<Block>,
}

impl BuddyAllocator {
    /// Constructs a simulator over a region of `total_size` units.
    ///
    /// # Panics
    ///
    /// Panics if `total_size` is zero.
    pub fn new(total_size: usize) -> BuddyAllocator {
        BuddyAllocator::try_new(total_size).expect("region size must be positive")
    }

    /// Constructs a simulator over a region of `total_size` units.
    ///
    /// # Errors
    ///
    /// Returns [`AllocInitError::InvalidConfig`] if `total_size` is zero.
    pub fn try_new(total_size: usize) -> Result<BuddyAllocator, AllocInitError> {
        if total_size == 0 {
            return Err(AllocInitError::InvalidConfig);
        }

        Ok(BuddyAllocator {
            total_size,
            blocks: vec![Block::free(0, total_size)],
        })
    }

    /// Returns the total size of the simulated region.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Returns the blocks partitioning the region, in address order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Attempts to allocate a block of at least `requested_size` units.
    ///
    /// The request is rounded up to the next power of two and satisfied by
    /// the lowest-addressed free block that fits, splitting it down to size.
    /// On success, returns the start address of the allocated block.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidRequest`] if `requested_size` is zero,
    /// and [`AllocError::OutOfMemory`] if no free block is large enough.
    /// Either failure leaves the block structure unchanged.
    pub fn allocate(&mut self, requested_size: usize) -> Result<usize, AllocError> {
        if requested_size == 0 {
            return Err(AllocError::InvalidRequest);
        }

        // A request too large for the round-up to represent cannot fit in any
        // region either.
        let needed = requested_size
            .checked_next_power_of_two()
            .ok_or(AllocError::OutOfMemory)?;

        // First fit, in address order.
        let index = self
            .blocks
            .iter()
            .position(|b| b.is_free() && b.size >= needed)
            .ok_or(AllocError::OutOfMemory)?;

        while self.blocks[index].size / 2 >= needed {
            self.split(index);
        }

        let block = &mut self.blocks[index];
        block.state = BlockState::Allocated;
        block.fragmentation = block.size - requested_size;

        trace!(
            start = block.start,
            size = block.size,
            requested_size,
            fragmentation = block.fragmentation,
            "allocated block"
        );

        Ok(block.start)
    }

    /// Deallocates the block that starts at `address`.
    ///
    /// The block becomes free and is coalesced with its buddies as far as
    /// possible.
    ///
    /// # Errors
    ///
    /// Returns [`DeallocError`] if no allocated block starts at `address`,
    /// leaving the block structure unchanged. Deallocating the same address
    /// twice therefore succeeds once and fails the second time.
    pub fn deallocate(&mut self, address: usize) -> Result<(), DeallocError> {
        let index = self
            .blocks
            .iter()
            .position(|b| b.start == address && !b.is_free())
            .ok_or(DeallocError)?;

        let block = &mut self.blocks[index];
        block.state = BlockState::Free;
        block.fragmentation = 0;

        trace!(start = address, size = block.size, "deallocated block");

        self.coalesce();

        Ok(())
    }

    /// Returns the number of free units in the region.
    pub fn free_total(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_free())
            .map(|b| b.size)
            .sum()
    }

    /// Returns the number of allocated units in the region.
    pub fn allocated_total(&self) -> usize {
        self.total_size - self.free_total()
    }

    /// Returns the total internal fragmentation across allocated blocks.
    pub fn fragmentation_total(&self) -> usize {
        self.blocks.iter().map(|b| b.fragmentation).sum()
    }

    /// Returns the size of the largest free block, or zero if none is free.
    pub fn largest_free_block(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_free())
            .map(|b| b.size)
            .max()
            .unwrap_or(0)
    }

    /// Halves the block at `index`, inserting its right buddy just after it.
    ///
    /// The block keeps its start address and becomes the left buddy.
    fn split(&mut self, index: usize) {
        let half = self.blocks[index].size / 2;
        self.blocks[index].size = half;

        let right = Block::free(self.blocks[index].start + half, half);

        trace!(
            left = self.blocks[index].start,
            right = right.start,
            size = half,
            "split block into buddies"
        );

        self.blocks.insert(index + 1, right);
    }

    /// Merges adjacent free blocks of equal size until none remain.
    ///
    /// After a merge the scan steps back one position so the enlarged block
    /// is re-examined against both neighbors; a single deallocation can
    /// cascade merges all the way back to the full region.
    fn coalesce(&mut self) {
        let mut i = 0;

        while i + 1 < self.blocks.len() {
            let current = &self.blocks[i];
            let next = &self.blocks[i + 1];

            let mergeable = current.is_free()
                && next.is_free()
                && current.size == next.size
                && current.start + current.size == next.start;

            if mergeable {
                self.blocks[i].size *= 2;
                self.blocks.remove(i + 1);

                trace!(
                    start = self.blocks[i].start,
                    size = self.blocks[i].size,
                    "merged buddies"
                );

                i = i.saturating_sub(1);
            } else {
                i += 1;
            }
        }
    }
}
