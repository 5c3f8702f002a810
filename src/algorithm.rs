// Copyright (c) 2023 Boris Onchev (boris.oncev@gmail.com)
//
// Distributed under the Boost Software License, Version 1.0. (See accompanying
// file LICENSE or copy at http://www.boost.org/LICENSE_1_0.txt)

//! The RC5-32/12/128 key schedule and block round function.
//!
//! The parameters are fixed to the variant used for firmware images: 32-bit
//! words, 12 rounds, a 128-bit key. The key is expanded once into a table of
//! `2 * (ROUNDS + 1)` round subkeys; the round function then transforms one
//! two-word block under that table, forward or inverse.

use crate::words::{rotl, rotr, Word, WORD_BYTES};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of rounds applied by the block round function.
pub const ROUNDS: usize = 12;

/// Secret key length in bytes (128 bits).
pub const KEY_BYTES: usize = 16;

/// Cipher block length in bytes: two 32-bit words.
pub const BLOCK_BYTES: usize = 2 * WORD_BYTES;

/// Subkey table length in words, `t = 2 * (r + 1)`.
const SUBKEY_WORDS: usize = 2 * (ROUNDS + 1);

/// Key length in words, `c`.
const KEY_WORDS: usize = KEY_BYTES / WORD_BYTES;

// Magic constants for the 32-bit word size:
// P = Odd((e - 2) * 2^32), Q = Odd((phi - 1) * 2^32)
const P: Word = 0xb7e15163;
const Q: Word = 0x9e3779b9;

/// The expanded cipher core: an RC5-32/12/128 subkey table.
///
/// Derived deterministically from the key and immutable afterwards; entries 0
/// and 1 are the pre-whitening subkeys, entries `2r` and `2r + 1` the per-round
/// pair. The table is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Rc5 {
    subkeys: [Word; SUBKEY_WORDS],
}

impl Rc5 {
    /// Expands a 128-bit key into the subkey table.
    pub(crate) fn new(key: &[u8; KEY_BYTES]) -> Rc5 {
        let mut l = [0; KEY_WORDS];
        for (lw, chunk) in l.iter_mut().zip(key.chunks_exact(WORD_BYTES)) {
            // chunks_exact yields word-sized chunks, the unwrap cannot fail
            *lw = Word::from_le_bytes(chunk.try_into().unwrap());
        }

        let mut s = [0; SUBKEY_WORDS];
        s[0] = P;
        for i in 1..SUBKEY_WORDS {
            s[i] = s[i - 1].wrapping_add(Q);
        }

        // Mix the key into S: three passes over the larger of the two arrays,
        // both indices cycling through their own array.
        let (mut a, mut b): (Word, Word) = (0, 0);
        let (mut i, mut j) = (0, 0);
        for _ in 0..3 * SUBKEY_WORDS.max(KEY_WORDS) {
            s[i] = rotl(s[i].wrapping_add(a).wrapping_add(b), 3);
            a = s[i];
            let ab = a.wrapping_add(b);
            l[j] = rotl(l[j].wrapping_add(ab), ab);
            b = l[j];
            i = (i + 1) % SUBKEY_WORDS;
            j = (j + 1) % KEY_WORDS;
        }

        l.zeroize();
        Rc5 { subkeys: s }
    }

    /// Encodes the two-word block `(a, b)` in place.
    pub(crate) fn encode_block(&self, a: &mut Word, b: &mut Word) {
        *a = a.wrapping_add(self.subkeys[0]);
        *b = b.wrapping_add(self.subkeys[1]);

        for pair in self.subkeys[2..].chunks_exact(2) {
            // A = ((A ^ B) << B) + S[2*r]
            *a = rotl(*a ^ *b, *b).wrapping_add(pair[0]);
            // B = ((B ^ A) << A) + S[2*r + 1]
            *b = rotl(*b ^ *a, *a).wrapping_add(pair[1]);
        }
    }

    /// Decodes the two-word block `(a, b)` in place.
    ///
    /// The exact algebraic inverse of [`Rc5::encode_block`], applied in
    /// reverse round order.
    pub(crate) fn decode_block(&self, a: &mut Word, b: &mut Word) {
        for pair in self.subkeys[2..].rchunks_exact(2) {
            // B = ((B - S[2*r + 1]) >> A) ^ A
            *b = rotr(b.wrapping_sub(pair[1]), *a) ^ *a;
            // A = ((A - S[2*r]) >> B) ^ B
            *a = rotr(a.wrapping_sub(pair[0]), *b) ^ *b;
        }

        *b = b.wrapping_sub(self.subkeys[1]);
        *a = a.wrapping_sub(self.subkeys[0]);
    }
}
