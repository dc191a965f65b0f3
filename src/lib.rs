//! A simulator of the binary-buddy memory-allocation algorithm.
//!
//! The simulator tracks free and allocated power-of-two blocks over a single
//! contiguous address range. No real memory is touched; allocation returns an
//! offset into the simulated region, and deallocation takes that offset back.
//!
//! ```
//! use buddy_sim::BuddyAllocator;
//!
//! let mut sim = BuddyAllocator::try_new(1024)?;
//!
//! // 200 rounds up to 256; the 1024 block is split down to produce it.
//! let addr = sim.allocate(200)?;
//! assert_eq!(addr, 0);
//!
//! // Freeing the block coalesces the buddies back into one 1024 block.
//! sim.deallocate(addr)?;
//! assert_eq!(sim.blocks().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![doc(html_root_url = "https://docs.rs/buddy_sim/0.1.0")]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]

pub mod buddy;


use std::{error, fmt};

pub use crate::buddy::{Block, BlockState, BuddyAllocator};

/// The error type for allocator constructors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocInitError {
    /// The configuration of the allocator is invalid.
    ///
    /// This variant is returned when the requested region size is zero.
    InvalidConfig,
}

impl fmt::Display for AllocInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocInitError::InvalidConfig => f.write_str("region size must be positive"),
        }
    }
}

impl error::Error for AllocInitError {}

/// The error type returned by [`BuddyAllocator::allocate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested size was zero.
    InvalidRequest,

    /// No free block is large enough to satisfy the request.
    ///
    /// This is a normal outcome of exhaustion, not a fault: a later
    /// deallocation can make the same request succeed.
    OutOfMemory,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::InvalidRequest => f.write_str("requested size must be positive"),
            AllocError::OutOfMemory => f.write_str("not enough memory"),
        }
    }
}

impl error::Error for AllocError {}

/// The error type returned by [`BuddyAllocator::deallocate`].
///
/// Indicates that no allocated block starts at the given address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeallocError;

impl fmt::Display for DeallocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid address")
    }
}

impl error::Error for DeallocError {}
