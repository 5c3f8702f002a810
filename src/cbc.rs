// Copyright (c) 2023 Boris Onchev (boris.oncev@gmail.com)
//
// Distributed under the Boost Software License, Version 1.0. (See accompanying
// file LICENSE or copy at http://www.boost.org/LICENSE_1_0.txt)

//! The cipher-block-chaining session around the RC5 core.
//!
//! A [`Rc5Cbc`] session owns the expanded subkey table together with the
//! running chain vector. Each encrypted or decrypted block advances the chain
//! vector, so sequential stream calls on one session form a single continuous
//! CBC stream: `C_i = Enc(P_i ^ C_{i-1})`, `P_i = Dec(C_i) ^ C_{i-1}`, with
//! `C_0` the initialization vector.

use crate::algorithm::{Rc5, BLOCK_BYTES, KEY_BYTES};
use crate::words::{load_block, store_block, Word};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The `Error` enum represents the possible errors reported by an [Rc5Cbc]
/// session.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid key size: `{0}`; the key must be exactly 16 bytes")]
    InvalidKeySize(usize),
    #[error("output buffer too short: the input holds `{needed}` whole blocks worth of bytes, the output only `{got}`")]
    OutputTooShort { needed: usize, got: usize },
}

/// An RC5-32/12/128-CBC session.
///
/// The session is the unit of chaining: the chain vector starts at the IV
/// and, after every processed block, equals that block's *ciphertext*, in
/// both directions. Encrypting a stream with one session and decrypting it
/// with a fresh session built from the same key and IV restores the original
/// bytes, no matter how the stream was split across calls.
///
/// Every stream operation takes `&mut self`; a session shared across
/// execution contexts must be serialized externally, and interleaving
/// encrypt and decrypt calls on one session corrupts the chain for both.
/// Key material and chain state are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Rc5Cbc {
    cipher: Rc5,
    chain: [Word; 2],
    iv: [Word; 2],
}

impl Rc5Cbc {
    /// Creates a session from a 128-bit key and the two IV nonce words.
    ///
    /// Expanding the key is the expensive part of the setup; the session can
    /// be reused for any number of stream calls afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc5_cbc::Rc5Cbc;
    ///
    /// let key = b"my 128 bit key!!";
    /// let mut session = Rc5Cbc::new(key, [0x1A2B3C4D, 0x5E6F7081]);
    ///
    /// let image = *b"firmware image!!";
    /// let mut encrypted = [0; 16];
    /// session.encrypt(&mut encrypted, &image)?;
    /// assert_ne!(encrypted, image);
    /// # Ok::<(), rc5_cbc::Error>(())
    /// ```
    pub fn new(key: &[u8; KEY_BYTES], iv: [Word; 2]) -> Rc5Cbc {
        Rc5Cbc {
            cipher: Rc5::new(key),
            chain: iv,
            iv,
        }
    }

    /// Creates a session from an untyped key slice, e.g. a configuration
    /// blob.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc5_cbc::{Error, Rc5Cbc};
    ///
    /// let res = Rc5Cbc::from_key_slice(b"too short", [0, 0]);
    /// assert!(matches!(res, Err(Error::InvalidKeySize(9))));
    /// ```
    pub fn from_key_slice(key: &[u8], iv: [Word; 2]) -> Result<Rc5Cbc, Error> {
        let key = key.try_into().map_err(|_| Error::InvalidKeySize(key.len()))?;
        Ok(Rc5Cbc::new(key, iv))
    }

    /// Rewinds the chain vector to the IV, starting a fresh stream under the
    /// same key.
    pub fn reset(&mut self) {
        self.chain = self.iv;
    }

    fn encrypt_block(&mut self, a: &mut Word, b: &mut Word) {
        *a ^= self.chain[0];
        *b ^= self.chain[1];
        self.cipher.encode_block(a, b);
        self.chain = [*a, *b];
    }

    fn decrypt_block(&mut self, a: &mut Word, b: &mut Word) {
        // the chain feeds back the *input* ciphertext, captured before the
        // words are overwritten
        let input = [*a, *b];
        self.cipher.decode_block(a, b);
        *a ^= self.chain[0];
        *b ^= self.chain[1];
        self.chain = input;
    }

    /// Encrypts whole blocks of `data` in place, advancing the chain vector.
    ///
    /// Any trailing fragment shorter than [BLOCK_BYTES] is left untouched;
    /// the returned count says how many bytes were actually processed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc5_cbc::Rc5Cbc;
    ///
    /// let mut session = Rc5Cbc::new(&[0x5A; 16], [7, 42]);
    /// let mut data = *b"an image padded to whole blocks!";
    /// assert_eq!(session.encrypt_in_place(&mut data), 32);
    /// ```
    pub fn encrypt_in_place(&mut self, data: &mut [u8]) -> usize {
        let whole = data.len() - data.len() % BLOCK_BYTES;
        for block in data[..whole].chunks_exact_mut(BLOCK_BYTES) {
            let (mut a, mut b) = load_block(block);
            self.encrypt_block(&mut a, &mut b);
            store_block(block, a, b);
        }
        whole
    }

    /// Decrypts whole blocks of `data` in place, advancing the chain vector.
    ///
    /// The mirror of [Rc5Cbc::encrypt_in_place]: trailing fragments are left
    /// untouched and the processed byte count is returned.
    pub fn decrypt_in_place(&mut self, data: &mut [u8]) -> usize {
        let whole = data.len() - data.len() % BLOCK_BYTES;
        for block in data[..whole].chunks_exact_mut(BLOCK_BYTES) {
            let (mut a, mut b) = load_block(block);
            self.decrypt_block(&mut a, &mut b);
            store_block(block, a, b);
        }
        whole
    }

    /// Encrypts whole blocks from `input` into `out`, advancing the chain
    /// vector.
    ///
    /// Only whole [BLOCK_BYTES]-sized blocks are processed: a trailing input
    /// fragment is neither consumed nor written, and the returned count says
    /// how many bytes were. `out` may be longer than `input`; bytes past the
    /// processed span are left untouched.
    ///
    /// Fails with [Error::OutputTooShort] if `out` cannot hold the whole
    /// blocks of `input`. The check runs before any block is processed, so a
    /// failed call leaves the chain vector unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc5_cbc::Rc5Cbc;
    ///
    /// let key = b"my 128 bit key!!";
    /// let iv = [0x1A2B3C4D, 0x5E6F7081];
    /// let image = *b"firmware image!!";
    ///
    /// let mut encrypted = [0; 16];
    /// Rc5Cbc::new(key, iv).encrypt(&mut encrypted, &image)?;
    ///
    /// let mut decrypted = [0; 16];
    /// Rc5Cbc::new(key, iv).decrypt(&mut decrypted, &encrypted)?;
    /// assert_eq!(decrypted, image);
    /// # Ok::<(), rc5_cbc::Error>(())
    /// ```
    pub fn encrypt(&mut self, out: &mut [u8], input: &[u8]) -> Result<usize, Error> {
        let whole = self.copy_whole_blocks(out, input)?;
        Ok(self.encrypt_in_place(&mut out[..whole]))
    }

    /// Decrypts whole blocks from `input` into `out`, advancing the chain
    /// vector.
    ///
    /// The mirror of [Rc5Cbc::encrypt], with the same truncation and error
    /// behavior.
    pub fn decrypt(&mut self, out: &mut [u8], input: &[u8]) -> Result<usize, Error> {
        let whole = self.copy_whole_blocks(out, input)?;
        Ok(self.decrypt_in_place(&mut out[..whole]))
    }

    fn copy_whole_blocks(&self, out: &mut [u8], input: &[u8]) -> Result<usize, Error> {
        let whole = input.len() - input.len() % BLOCK_BYTES;
        if out.len() < whole {
            return Err(Error::OutputTooShort {
                needed: whole,
                got: out.len(),
            });
        }
        out[..whole].copy_from_slice(&input[..whole]);
        Ok(whole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; KEY_BYTES] = b"\x2B\xD6\x45\x9F\x82\xC5\xB3\x00\x95\x2C\x49\x10\x48\x81\xFF\x48";
    const IV: [Word; 2] = [0xDEAD10CC, 0x0BADF00D];

    #[test]
    fn first_block_matches_reference_vector() {
        // RFC 2040 RC5-CBC vector: r = 12, zero key, zero IV, zero plaintext.
        let mut session = Rc5Cbc::new(&[0; KEY_BYTES], [0, 0]);
        let mut block = [0; BLOCK_BYTES];
        session.encrypt_in_place(&mut block);
        assert_eq!(block, [0x21, 0xA5, 0xDB, 0xEE, 0x15, 0x4B, 0x8F, 0x6D]);
    }

    #[test]
    fn chain_vector_is_last_ciphertext_after_encrypt() {
        let mut session = Rc5Cbc::new(KEY, IV);
        let mut data = [0x5C; 3 * BLOCK_BYTES];
        session.encrypt_in_place(&mut data);

        let (a, b) = load_block(&data[2 * BLOCK_BYTES..]);
        assert_eq!(session.chain, [a, b]);
    }

    #[test]
    fn chain_vector_is_last_ciphertext_after_decrypt() {
        let mut session = Rc5Cbc::new(KEY, IV);
        let mut data = [0x5C; 3 * BLOCK_BYTES];
        session.encrypt_in_place(&mut data);

        let (a, b) = load_block(&data[2 * BLOCK_BYTES..]);

        session.reset();
        session.decrypt_in_place(&mut data);
        assert_eq!(session.chain, [a, b]);
    }

    #[test]
    fn reset_rewinds_to_the_iv() {
        let mut session = Rc5Cbc::new(KEY, IV);
        let mut data = [0xC3; 2 * BLOCK_BYTES];
        session.encrypt_in_place(&mut data);
        assert_ne!(session.chain, IV);

        session.reset();
        assert_eq!(session.chain, IV);
    }

    #[test]
    fn in_place_decrypt_aliases_safely() {
        let plaintext = *b"the aliasing of out and in matters here!";
        let mut aliased = plaintext;
        let mut session = Rc5Cbc::new(KEY, IV);
        session.encrypt_in_place(&mut aliased);

        // split buffers as the baseline
        let mut split = [0; 40];
        session.reset();
        session.decrypt(&mut split, &aliased).unwrap();

        // in place on the ciphertext itself
        session.reset();
        session.decrypt_in_place(&mut aliased);

        assert_eq!(aliased, split);
        assert_eq!(aliased, plaintext);
    }

    #[test]
    fn output_too_short_leaves_the_chain_untouched() {
        let mut session = Rc5Cbc::new(KEY, IV);
        let input = [0x11; 2 * BLOCK_BYTES];
        let mut short = [0; BLOCK_BYTES];

        let res = session.encrypt(&mut short, &input);
        assert!(matches!(
            res,
            Err(Error::OutputTooShort { needed: 16, got: 8 })
        ));
        assert_eq!(session.chain, IV);

        // the failed call must not have advanced the stream
        let mut out = [0; 2 * BLOCK_BYTES];
        session.encrypt(&mut out, &input).unwrap();

        let mut fresh = [0; 2 * BLOCK_BYTES];
        Rc5Cbc::new(KEY, IV).encrypt(&mut fresh, &input).unwrap();
        assert_eq!(out, fresh);
    }

    #[test]
    fn key_slice_must_be_exactly_16_bytes() {
        for len in [0, 15, 17, 32] {
            let key = vec![0; len];
            let res = Rc5Cbc::from_key_slice(&key, IV);
            assert!(matches!(
                res,
                Err(Error::InvalidKeySize(error_key_size))
                if error_key_size == len
            ));
        }

        assert!(Rc5Cbc::from_key_slice(&[0; KEY_BYTES], IV).is_ok());
    }

    #[test]
    fn cloned_session_forks_the_chain() {
        let mut session = Rc5Cbc::new(KEY, IV);
        let mut head = [0x77; BLOCK_BYTES];
        session.encrypt_in_place(&mut head);

        let mut fork = session.clone();
        let mut tail_a = [0x88; BLOCK_BYTES];
        let mut tail_b = tail_a;
        session.encrypt_in_place(&mut tail_a);
        fork.encrypt_in_place(&mut tail_b);
        assert_eq!(tail_a, tail_b);
    }
}
