// Copyright (c) 2023 Boris Onchev (boris.oncev@gmail.com)
//
// Distributed under the Boost Software License, Version 1.0. (See accompanying
// file LICENSE or copy at http://www.boost.org/LICENSE_1_0.txt)

//! This library provides the RC5-32/12/128 block cipher in cipher-block-chaining
//! mode, as used to protect firmware images in transfer.
//!
//! The cipher follows Ronald L. Rivest, "The RC5 Encryption Algorithm", with
//! the parameters fixed to 32-bit words, 12 rounds and a 128-bit key. A
//! [Rc5Cbc] session expands the key into the round subkey table once and then
//! chains 8-byte blocks through the round function, so a firmware image can
//! be streamed through the session chunk by chunk, with each call picking up
//! the chain vector where the previous one left it.
//!
//! The transfer layer is expected to pad images to a whole number of blocks;
//! trailing fragments are not processed (see [Rc5Cbc::encrypt]). The crate
//! provides confidentiality only: there is no authentication tag, so image
//! integrity has to be checked by the surrounding protocol.

mod algorithm;
mod cbc;
mod words;

pub use crate::algorithm::{BLOCK_BYTES, KEY_BYTES, ROUNDS};
pub use crate::cbc::{Error, Rc5Cbc};
pub use crate::words::Word;
