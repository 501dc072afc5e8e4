//! Immutable, sliceable bit vectors backed by packed bytes.
//!
//! Bits are stored most significant bit first. Slicing never copies: every
//! view shares the backing storage of the vector it was cut from.

use crate::utils::{pack_bits, unpack_bits};
use crate::Block;
use core::fmt;
use core::ops::{Bound, RangeBounds};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitVectorError {
    #[error("bit range {start}..{end} is not byte aligned")]
    Unaligned { start: usize, end: usize },
    #[error("expected {expected} bits, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "PackedBits", try_from = "PackedBits")]
pub struct BitVector {
    bytes: Arc<[u8]>,
    start: usize,
    end: usize,
}

impl BitVector {
    pub fn empty() -> Self {
        Self::from_bytes(&[])
    }

    pub fn singleton(bit: bool) -> Self {
        Self {
            bytes: Arc::from([(bit as u8) << 7]),
            start: 0,
            end: 1,
        }
    }

    /// Copy `bytes` into a new vector of `8 * bytes.len()` bits.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
            start: 0,
            end: bytes.len() * 8,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len()).then(|| self.bit_unchecked(index))
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        assert!(
            index < self.len(),
            "bit index {} out of range for length {}",
            index,
            self.len()
        );
        self.bit_unchecked(index)
    }

    #[inline]
    fn bit_unchecked(&self, index: usize) -> bool {
        let i = self.start + index;
        self.bytes[i / 8] & (0x80 >> (i & 7)) != 0
    }

    /// A view of a sub-range, sharing storage with `self`.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or out of bounds.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let from = match range.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i + 1,
            Bound::Unbounded => 0,
        };
        let to = match range.end_bound() {
            Bound::Included(&i) => i + 1,
            Bound::Excluded(&i) => i,
            Bound::Unbounded => self.len(),
        };
        assert!(
            from <= to && to <= self.len(),
            "range {}..{} out of range for length {}",
            from,
            to,
            self.len()
        );
        Self {
            bytes: self.bytes.clone(),
            start: self.start + from,
            end: self.start + to,
        }
    }

    /// Export as bytes. Trailing bits of a partial last byte are zero.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BitVectorError> {
        if self.start & 7 != 0 {
            return Err(BitVectorError::Unaligned {
                start: self.start,
                end: self.end,
            });
        }
        let mut bytes = self.bytes[self.start / 8..(self.end + 7) / 8].to_vec();
        if self.end & 7 != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFFu8 << (8 - (self.end & 7));
            }
        }
        Ok(bytes)
    }

    /// Interpret a 128-bit, byte-aligned vector as a block.
    pub fn to_block(&self) -> Result<Block, BitVectorError> {
        if self.len() != 128 {
            return Err(BitVectorError::LengthMismatch {
                expected: 128,
                actual: self.len(),
            });
        }
        let bytes = self.to_bytes()?;
        Block::try_from_slice(&bytes).ok_or(BitVectorError::LengthMismatch {
            expected: 128,
            actual: bytes.len() * 8,
        })
    }

    /// Concatenate two vectors. `self` must be byte aligned at both ends and
    /// `other` at its start, unless either is empty.
    pub fn concat(&self, other: &BitVector) -> Result<BitVector, BitVectorError> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }
        if self.start & 7 != 0 || self.end & 7 != 0 {
            return Err(BitVectorError::Unaligned {
                start: self.start,
                end: self.end,
            });
        }
        let mut bytes = self.to_bytes()?;
        bytes.extend(other.to_bytes()?);
        Ok(BitVector {
            bytes: Arc::from(bytes),
            start: 0,
            end: self.len() + other.len(),
        })
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            bits: self,
            index: 0,
        }
    }

    pub fn to_vec(&self) -> Vec<bool> {
        self.iter().collect()
    }
}

impl Default for BitVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Block> for BitVector {
    fn from(block: Block) -> Self {
        Self::from_bytes(block.as_bytes())
    }
}

impl From<&[bool]> for BitVector {
    fn from(bits: &[bool]) -> Self {
        Self {
            bytes: Arc::from(pack_bits(bits)),
            start: 0,
            end: bits.len(),
        }
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let bits: Vec<bool> = iter.into_iter().collect();
        BitVector::from(bits.as_slice())
    }
}

impl PartialEq for BitVector {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for BitVector {}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector{{size={},bits=", self.len())?;
        for bit in self.iter() {
            write!(f, "{}", bit as u8)?;
        }
        write!(f, "}}")
    }
}

pub struct Iter<'a> {
    bits: &'a BitVector,
    index: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.index)?;
        self.index += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> IntoIterator for &'a BitVector {
    type Item = bool;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Wire form of a [`BitVector`]: the bit length and the bits packed from offset zero.
#[derive(Serialize, Deserialize)]
struct PackedBits {
    len: usize,
    bytes: Vec<u8>,
}

impl From<BitVector> for PackedBits {
    fn from(bits: BitVector) -> Self {
        PackedBits {
            len: bits.len(),
            bytes: pack_bits(&bits.to_vec()),
        }
    }
}

impl TryFrom<PackedBits> for BitVector {
    type Error = BitVectorError;

    fn try_from(packed: PackedBits) -> Result<Self, Self::Error> {
        if packed.bytes.len() != (packed.len + 7) / 8 {
            return Err(BitVectorError::LengthMismatch {
                expected: (packed.len + 7) / 8 * 8,
                actual: packed.bytes.len() * 8,
            });
        }
        Ok(BitVector::from(unpack_bits(&packed.bytes, packed.len).as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_slice() {
        let bits = BitVector::from_bytes(&[0b1010_0000, 0b0000_0001]);
        assert_eq!(bits.len(), 16);
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(bits.bit(2));
        assert!(bits.bit(15));
        assert_eq!(bits.get(16), None);

        let view = bits.slice(2..15);
        assert_eq!(view.len(), 13);
        assert!(view.bit(0));
        assert!(!view.bit(12));
        assert_eq!(view.slice(..1), BitVector::singleton(true));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_bit() {
        BitVector::from_bytes(&[0xFF]).bit(8);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_slice() {
        BitVector::from_bytes(&[0xFF]).slice(4..9);
    }

    #[test]
    fn test_to_bytes() {
        let bits = BitVector::from_bytes(&[0xFF, 0xFF]);
        assert_eq!(bits.slice(..12).to_bytes().unwrap(), vec![0xFF, 0xF0]);
        assert_eq!(bits.slice(8..).to_bytes().unwrap(), vec![0xFF]);
        assert_eq!(
            bits.slice(3..).to_bytes(),
            Err(BitVectorError::Unaligned { start: 3, end: 16 })
        );
        assert_eq!(BitVector::empty().to_bytes().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_concat() {
        let a = BitVector::from_bytes(&[0xAB]);
        let b = BitVector::singleton(true);
        let c = a.concat(&b).unwrap();
        assert_eq!(c.len(), 9);
        assert_eq!(c.to_bytes().unwrap(), vec![0xAB, 0x80]);

        // Unaligned on the left is refused, empty operands are not.
        assert!(b.concat(&a).is_err());
        assert_eq!(b.concat(&BitVector::empty()).unwrap(), b);
        assert_eq!(BitVector::empty().concat(&b).unwrap(), b);
    }

    #[test]
    fn test_block_conversion() {
        let block = rand::random::<Block>();
        let bits = BitVector::from(block);
        assert_eq!(bits.len(), 128);
        assert_eq!(bits.bit(0), block.select_bit());
        assert_eq!(bits.to_block().unwrap(), block);

        let padded = bits.concat(&BitVector::singleton(false)).unwrap();
        assert_eq!(padded.slice(..128).to_block().unwrap(), block);
        assert!(padded.to_block().is_err());
    }

    #[test]
    fn test_from_iter() {
        let bits: BitVector = [true, false, true, true].iter().copied().collect();
        assert_eq!(bits.len(), 4);
        assert_eq!(bits.to_vec(), vec![true, false, true, true]);
        assert_eq!(bits.to_bytes().unwrap(), vec![0xB0]);
    }

    #[test]
    fn test_serde() {
        let bits = BitVector::from_bytes(&[0x12, 0x34, 0x56]).slice(5..21);
        let encoded = bincode::serialize(&bits).unwrap();
        let decoded: BitVector = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, bits);
    }
}
