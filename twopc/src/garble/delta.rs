//! The global free-XOR offset.

use super::errors::GeneratorError;
use crypto_core::Block;
use rand::Rng;

/// The secret offset between the two labels of every wire.
///
/// The select bit of Δ is always set, so the two labels of a wire have
/// opposite select bits.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Delta(Block);

impl Delta {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Delta(rng.gen::<Block>().set_select_bit())
    }

    #[inline]
    pub fn block(&self) -> Block {
        self.0
    }

    /// `Δ` if `bit` is set, zero otherwise.
    #[inline]
    pub fn times(&self, bit: bool) -> Block {
        self.0.times(bit)
    }
}

impl TryFrom<Block> for Delta {
    type Error = GeneratorError;

    fn try_from(block: Block) -> Result<Self, Self::Error> {
        if block.select_bit() {
            Ok(Delta(block))
        } else {
            Err(GeneratorError::InvalidDelta)
        }
    }
}

// Δ is a secret; keep it out of logs.
impl std::fmt::Debug for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Delta(..)")
    }
}
