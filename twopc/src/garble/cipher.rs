//! Label encryption keyed by the gate position.

use crypto_core::{AesHash, Block};

/// Encryption of one label under another, tweaked by the gate and sub-gate
/// index so that equal keys at different gates give unrelated pads.
pub trait GarbleCipher {
    /// The pad `H(input, gate_index, sub_index)`.
    fn hash(&self, input: Block, gate_index: u64, sub_index: u64) -> Block;

    #[inline]
    fn encrypt(&self, input: Block, output: Block, gate_index: u64, sub_index: u64) -> Block {
        output ^ self.hash(input, gate_index, sub_index)
    }

    #[inline]
    fn decrypt(&self, input: Block, ciphertext: Block, gate_index: u64, sub_index: u64) -> Block {
        ciphertext ^ self.hash(input, gate_index, sub_index)
    }
}

/// [`GarbleCipher`] over the tweakable correlation-robust hash of fixed-key AES.
pub struct AesHashCipher {
    hash: AesHash,
}

impl AesHashCipher {
    pub fn new(key: Block) -> Self {
        Self {
            hash: AesHash::new(key),
        }
    }
}

impl Default for AesHashCipher {
    /// The all-zero key.
    fn default() -> Self {
        Self::new(Block::ZERO)
    }
}

impl GarbleCipher for AesHashCipher {
    #[inline]
    fn hash(&self, input: Block, gate_index: u64, sub_index: u64) -> Block {
        self.hash.tccr_hash(gate_index, sub_index, input)
    }
}
