//! VID: the opaque identifier of every registered object.
//!
//! A VID is the integer form of a native entity. The low [`INDEX_BITS`] bits
//! address a slot in the entity allocator, the remaining high bits carry the
//! slot's generation. Slot `0` is never handed out, so `Vid(0)` is free to act
//! as the "invalid / none" value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of bits used for the slot index.
pub const INDEX_BITS: u32 = 22;
/// Number of bits used for the generation counter.
pub const GENERATION_BITS: u32 = 32 - INDEX_BITS;

pub const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
pub const GENERATION_MASK: u32 = (1 << GENERATION_BITS) - 1;

/// Largest slot index the allocator may hand out.
pub const MAX_INDEX: u32 = INDEX_MASK;

/// Opaque, process-wide unique identifier of one entity.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Vid(pub u32);

/// The reserved "invalid / none" VID.
pub const INVALID_VID: Vid = Vid(0);

#[inline]
const fn pack(index: u32, generation: u32) -> u32 {
    ((generation & GENERATION_MASK) << INDEX_BITS) | (index & INDEX_MASK)
}

impl Vid {
    /// Builds a VID from a slot index and a generation.
    #[inline]
    #[must_use]
    pub const fn from_parts(index: u32, generation: u32) -> Self {
        Self(pack(index, generation))
    }

    /// Returns the slot index part.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    /// Returns the generation part.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0 >> INDEX_BITS
    }

    /// `true` for every VID except [`INVALID_VID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index() != 0
    }

    #[inline]
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for Vid {
    #[inline]
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Vid> for u32 {
    #[inline]
    fn from(vid: Vid) -> Self {
        vid.0
    }
}

impl fmt::Debug for Vid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Vid({}v{})", self.index(), self.generation())
        } else {
            f.write_str("Vid(INVALID)")
        }
    }
}

impl fmt::Display for Vid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
