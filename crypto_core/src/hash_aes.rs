//! Correlation-robust hashing based on fixed-key AES.

use crate::block::Block;
use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use once_cell::sync::Lazy;

pub struct AesHash {
    aes: Aes128,
}

/// Hash instance under the all-zero key.
pub static AES_HASH: Lazy<AesHash> = Lazy::new(|| AesHash::new(Block::ZERO));

/// Multiply every byte by 2 in GF(2^8) modulo `x^8 + x^4 + x^3 + x + 1`.
#[inline]
pub fn xtime(x: Block) -> Block {
    let mut out = [0u8; 16];
    for (o, b) in out.iter_mut().zip(x.as_bytes().iter()) {
        *o = (b << 1) ^ ((b >> 7) * 0x1b);
    }
    Block::from(out)
}

impl AesHash {
    /// Initialize the hash function using `key`.
    #[inline]
    pub fn new(key: Block) -> Self {
        let key_byte: [u8; 16] = key.into();
        let key = GenericArray::from(key_byte);
        let aes = Aes128::new(&key);
        AesHash { aes }
    }

    #[inline]
    pub fn encrypt(&self, x: Block) -> Block {
        let y: [u8; 16] = x.into();
        let mut y = GenericArray::from(y);
        self.aes.encrypt_block(&mut y);
        let y: [u8; 16] = y.into();
        Block::from(y)
    }

    /// Correlation-robust hash for 128-bit inputs.
    ///
    /// The function computes `π(x) ⊕ 2·x`, where `2·x` doubles each byte in
    /// GF(2^8).
    #[inline]
    pub fn cr_hash(&self, x: Block) -> Block {
        self.encrypt(x) ^ xtime(x)
    }

    /// Tweakable variant of [`AesHash::cr_hash`].
    ///
    /// `gate_index` is XORed into bytes 0..8 and `sub_index` into bytes 8..16,
    /// both big-endian, before hashing.
    #[inline]
    pub fn tccr_hash(&self, gate_index: u64, sub_index: u64, x: Block) -> Block {
        let tweak = Block::from((u128::from(gate_index) << 64) | u128::from(sub_index));
        self.cr_hash(x ^ tweak)
    }
}
