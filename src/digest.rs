//! 256-bit Merkle–Damgård digest built from the published round tables
//!
//! The digest is a pure function of its input bytes. All word arithmetic is
//! unsigned 32-bit with wraparound.

use crate::constants::*;

/// Digest: 𝔹* → ℍ (64-character lowercase hex)
///
/// Pads the message, folds each 64-byte block into the running state and
/// renders the final 8 state words as big-endian hex.
pub fn digest(data: &[u8]) -> String {
    hex::encode(digest_bytes(data))
}

/// Digest of the UTF-8 bytes of a string
pub fn digest_str(text: &str) -> String {
    digest(text.as_bytes())
}

/// Raw 32-byte digest
pub fn digest_bytes(data: &[u8]) -> [u8; 32] {
    let mut state = INITIAL_STATE;
    for block in pad_message(data).chunks_exact(DIGEST_BLOCK_SIZE) {
        compress(&mut state, block);
    }

    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_exact_mut(4).zip(state.iter()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// Pad: append 0x80, zero-fill to 448 mod 512 bits, append the bit length
/// as a 64-bit big-endian integer
fn pad_message(data: &[u8]) -> Vec<u8> {
    let bit_len = (data.len() as u64).wrapping_mul(8);

    let mut padded = Vec::with_capacity(data.len() + DIGEST_BLOCK_SIZE + 8);
    padded.extend_from_slice(data);
    padded.push(0x80);
    while padded.len() % DIGEST_BLOCK_SIZE != DIGEST_BLOCK_SIZE - 8 {
        padded.push(0x00);
    }
    padded.extend_from_slice(&bit_len.to_be_bytes());

    debug_assert_eq!(padded.len() % DIGEST_BLOCK_SIZE, 0);
    padded
}

/// Fold one 64-byte block into the running state
fn compress(state: &mut [u32; 8], block: &[u8]) {
    let schedule = expand_schedule(block);

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for i in 0..64 {
        let temp1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(choose(e, f, g))
            .wrapping_add(ROUND_CONSTANTS[i])
            .wrapping_add(schedule[i]);
        let temp2 = big_sigma0(a).wrapping_add(majority(a, b, c));

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(temp1);
        d = c;
        c = b;
        b = a;
        a = temp1.wrapping_add(temp2);
    }

    for (word, value) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *word = word.wrapping_add(value);
    }
}

/// Expand 16 big-endian words into the 64-word message schedule
fn expand_schedule(block: &[u8]) -> [u32; 64] {
    let mut w = [0u32; 64];
    for (i, word) in block.chunks_exact(4).enumerate().take(16) {
        w[i] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    }
    for i in 16..64 {
        w[i] = w[i - 16]
            .wrapping_add(small_sigma0(w[i - 15]))
            .wrapping_add(w[i - 7])
            .wrapping_add(small_sigma1(w[i - 2]));
    }
    w
}

#[inline]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

#[inline]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline]
fn choose(e: u32, f: u32, g: u32) -> u32 {
    (e & f) ^ (!e & g)
}

#[inline]
fn majority(a: u32, b: u32, c: u32) -> u32 {
    (a & b) ^ (a & c) ^ (b & c)
}
