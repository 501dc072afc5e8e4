//! A 128-bit block, used both as a garbled wire label and as an AES block.
//!
//! The select bit used for point-and-permute is the most significant bit of
//! the first byte.

use crate::utils::xor_inplace;
use core::fmt;
use core::ops::{BitAnd, BitXor, BitXorAssign};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Size of a block in bytes.
pub const BLOCK_LEN: usize = 16;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block([u8; BLOCK_LEN]);

/// `SELECT_MASK[b] & x` is `x` if `b == 1` and zero otherwise.
pub const SELECT_MASK: [Block; 2] = [Block::ZERO, Block::ONES];

impl Block {
    /// The canonical zero label.
    pub const ZERO: Block = Block([0u8; BLOCK_LEN]);
    /// All bits set.
    pub const ONES: Block = Block([0xFF; BLOCK_LEN]);

    #[inline]
    pub const fn new(bytes: [u8; BLOCK_LEN]) -> Self {
        Block(bytes)
    }

    /// Try to create a block from a slice of exactly 16 bytes.
    #[inline]
    pub fn try_from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; BLOCK_LEN] = bytes.try_into().ok()?;
        Some(Block(bytes))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }

    /// The point-and-permute select bit.
    #[inline]
    pub fn select_bit(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Returns a copy with the select bit set.
    #[inline]
    pub fn set_select_bit(mut self) -> Self {
        self.0[0] |= 0x80;
        self
    }

    /// Returns `self` if `bit` is set and zero otherwise, without branching on `bit`.
    #[inline]
    pub fn times(self, bit: bool) -> Self {
        SELECT_MASK[bit as usize] & self
    }
}

impl From<[u8; BLOCK_LEN]> for Block {
    #[inline]
    fn from(bytes: [u8; BLOCK_LEN]) -> Self {
        Block(bytes)
    }
}

impl From<Block> for [u8; BLOCK_LEN] {
    #[inline]
    fn from(block: Block) -> Self {
        block.0
    }
}

/// Big-endian, so the top bit of the integer is the select bit.
impl From<u128> for Block {
    #[inline]
    fn from(x: u128) -> Self {
        Block(x.to_be_bytes())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(block: Block) -> Self {
        u128::from_be_bytes(block.0)
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for Block {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl BitXor for Block {
    type Output = Block;

    #[inline]
    fn bitxor(mut self, rhs: Block) -> Block {
        self ^= rhs;
        self
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Block) {
        xor_inplace(&mut self.0, &rhs.0);
    }
}

impl BitAnd for Block {
    type Output = Block;

    #[inline]
    fn bitand(self, rhs: Block) -> Block {
        let mut out = [0u8; BLOCK_LEN];
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
            *o = a & b;
        }
        Block(out)
    }
}

impl Distribution<Block> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        let mut bytes = [0u8; BLOCK_LEN];
        rng.fill_bytes(&mut bytes);
        Block(bytes)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
