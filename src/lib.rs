//! `qrfountain` splits a byte payload into an endless stream of Luby Transform
//! (fountain code) blocks, sized for transport through a sequence of QR codes.
//!
//! The receiver can start scanning at any time, miss arbitrary blocks, and
//! still restore the payload once it has captured slightly more blocks than
//! the payload has slices.
//!
//! # Emit a stream of blocks
//!
//! ```
//! use qrfountain::{Encoder, Xoshiro256};
//! let data = String::from("Some binary data").repeat(100);
//! let encoder = Encoder::new(data.as_bytes(), 100).unwrap();
//! assert_eq!(encoder.slice_count(), 16);
//!
//! let block = encoder.blocks(Xoshiro256::from("Wolf")).next().unwrap();
//! let wire = block.to_bytes();
//! assert_eq!(wire.len(), (block.degree() + 4) * 4 + 100);
//! ```
//!
//! # Recombine the stream into the payload
//!
//! ```
//! use qrfountain::compress::Identity;
//! use qrfountain::{Decoder, Encoder, Xoshiro256};
//! let data = String::from("Some binary data").repeat(100);
//! let encoder = Encoder::new(data.as_bytes(), 100).unwrap();
//! let mut decoder = Decoder::default();
//! for (i, block) in encoder.blocks(Xoshiro256::from("Wolf")).enumerate() {
//!     // Simulate some communication loss
//!     if i % 3 == 0 {
//!         continue;
//!     }
//!     if decoder.receive_bytes(&block.to_bytes()).unwrap() {
//!         break;
//!     }
//! }
//! assert_eq!(decoder.message(&Identity).unwrap().unwrap(), data.as_bytes());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;

pub mod block;
pub mod compress;
pub mod config;
pub mod error;
pub mod fountain;
pub mod sampler;
pub mod xoshiro;

pub use self::block::Block;
pub use self::config::Config;
pub use self::error::{Error, Malformed, Result};
pub use self::fountain::{Blocks, Decoder, Encoder};
pub use self::xoshiro::Xoshiro256;

const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// IEEE CRC-32 of `data`.
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// Transmission checksum: the CRC-32 of the original payload bound to the
/// slice count, so a decoder assembling with the wrong `k` notices.
#[must_use]
pub fn checksum(payload: &[u8], k: u32) -> u32 {
    crc32(payload) ^ k
}

/// Splits `data` into `slice_size` chunks, zero-padding the last one.
#[must_use]
pub fn partition(data: &[u8], slice_size: usize) -> Vec<Vec<u8>> {
    data.chunks(slice_size)
        .map(|c| {
            let mut slice = c.to_vec();
            slice.resize(slice_size, 0);
            slice
        })
        .collect()
}

/// Concatenates `slices` and strips the padding beyond `length`.
#[must_use]
pub fn join(slices: &[Vec<u8>], length: usize) -> Vec<u8> {
    let mut joined: Vec<u8> = slices.iter().flatten().copied().collect();
    joined.truncate(length);
    joined
}
