pub mod bitvec;
pub mod block;
pub mod hash_aes;
pub mod rand_aes;
pub mod utils;

pub use crate::{
    bitvec::{BitVector, BitVectorError},
    block::{Block, BLOCK_LEN},
    hash_aes::{AesHash, AES_HASH},
    rand_aes::AesRng,
};
