//! Useful utility functions.

/// Pack a bit slice into bytes, most significant bit first.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let nbytes = (bits.len() + 7) / 8;
    let mut bytes = vec![0; nbytes];
    for (i, bit) in bits.iter().enumerate() {
        bytes[i / 8] |= (*bit as u8) << (7 - (i & 7));
    }
    bytes
}

/// Unpack the first `size` bits of a byte slice, most significant bit first.
pub fn unpack_bits(bytes: &[u8], size: usize) -> Vec<bool> {
    let mut bits = Vec::with_capacity(size);
    for (i, byte) in bytes.iter().enumerate() {
        for j in 0..8 {
            if 8 * i + j >= size {
                break;
            }
            bits.push(((byte >> (7 - j)) & 1) != 0);
        }
    }
    bits
}

/// XOR two byte arrays in place.
pub fn xor_inplace(a: &mut [u8], b: &[u8]) {
    for (a, b) in a.iter_mut().zip(b.iter()) {
        *a ^= *b;
    }
}
