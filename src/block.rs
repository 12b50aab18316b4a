//! Wire format of a single fountain-coded block.
//!
//! Every header field is an unsigned 32-bit big-endian word:
//!
//! ```text
//! [0]              degree
//! [1 ..= degree]   indices, ascending
//! [degree + 1]     k
//! [degree + 2]     bytes
//! [degree + 3]     checksum
//! [degree + 4 ..]  data
//! ```
//!
//! ```
//! use qrfountain::Block;
//! let block = Block::new(3, 10, 0xdead_beef, vec![0, 2], vec![0xff; 4]).unwrap();
//! let wire = block.to_bytes();
//! assert_eq!(wire.len(), (2 + 4) * 4 + 4);
//! assert_eq!(Block::from_bytes(&wire).unwrap(), block);
//! ```

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::error::{Malformed, Result};

const WORD: usize = 4;

/// One XOR combination of source slices together with the transmission
/// parameters a decoder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    k: u32,
    bytes: u32,
    checksum: u32,
    indices: Vec<u32>,
    data: Vec<u8>,
}

impl Block {
    /// Assembles a block, sorting `indices`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedBlock`] under the same conditions as
    /// [`Block::from_bytes`]: no indices, a repeated index, or an index not
    /// below `k`.
    pub fn new(
        k: u32,
        bytes: u32,
        checksum: u32,
        indices: Vec<u32>,
        data: Vec<u8>,
    ) -> Result<Self> {
        Ok(Self {
            k,
            bytes,
            checksum,
            indices: checked_indices(k, indices)?,
            data,
        })
    }

    /// Assembles a block from indices already known to be ascending, distinct
    /// and below `k`.
    pub(crate) fn from_valid_parts(
        k: u32,
        bytes: u32,
        checksum: u32,
        indices: Vec<u32>,
        data: Vec<u8>,
    ) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(indices.last().is_some_and(|&i| i < k));
        Self {
            k,
            bytes,
            checksum,
            indices,
            data,
        }
    }

    /// Number of slices XORed into this block.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.indices.len()
    }

    /// Whether the block carries exactly one slice verbatim.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.indices.len() == 1
    }

    #[must_use]
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Length of the sliced payload before padding.
    #[must_use]
    pub fn bytes(&self) -> u32 {
        self.bytes
    }

    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (Vec<u32>, Vec<u8>) {
        (self.indices, self.data)
    }

    /// Serializes the block into its wire format.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.degree() + 4) * WORD + self.data.len());
        out.extend_from_slice(&(self.indices.len() as u32).to_be_bytes());
        for index in &self.indices {
            out.extend_from_slice(&index.to_be_bytes());
        }
        for word in [self.k, self.bytes, self.checksum] {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out.extend_from_slice(&self.data);
        out
    }

    /// Parses a block from its wire format.
    ///
    /// # Examples
    ///
    /// ```
    /// use qrfountain::{Block, Error, Malformed};
    /// assert_eq!(
    ///     Block::from_bytes(&[0, 0, 0, 0]).unwrap_err(),
    ///     Error::MalformedBlock(Malformed::ZeroDegree)
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedBlock`] if the buffer is too short for
    /// the header its degree announces, if the degree is zero, or if an index
    /// is repeated or not below `k`. The length of the trailing data is not
    /// checked.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self> {
        let degree = read_word(buffer, 0)?;
        if degree == 0 {
            return Err(Malformed::ZeroDegree.into());
        }
        let header_words = usize::try_from(degree)
            .ok()
            .and_then(|d| d.checked_add(4))
            .ok_or(Malformed::Truncated {
                expected: usize::MAX,
                actual: buffer.len(),
            })?;
        let header_len = header_words.checked_mul(WORD).ok_or(Malformed::Truncated {
            expected: usize::MAX,
            actual: buffer.len(),
        })?;
        if buffer.len() < header_len {
            return Err(Malformed::Truncated {
                expected: header_len,
                actual: buffer.len(),
            }
            .into());
        }

        let k = read_word(buffer, header_words - 3)?;
        let bytes = read_word(buffer, header_words - 2)?;
        let checksum = read_word(buffer, header_words - 1)?;

        let indices = (1..header_words - 3)
            .map(|word| read_word(buffer, word))
            .collect::<Result<Vec<u32>>>()?;

        Ok(Self {
            k,
            bytes,
            checksum,
            indices: checked_indices(k, indices)?,
            data: buffer[header_len..].to_vec(),
        })
    }
}

/// Sorts `indices` after checking they form a non-empty set below `k`.
fn checked_indices(k: u32, indices: Vec<u32>) -> Result<Vec<u32>> {
    if indices.is_empty() {
        return Err(Malformed::ZeroDegree.into());
    }
    let mut seen = BTreeSet::new();
    for index in indices {
        if index >= k {
            return Err(Malformed::IndexOutOfRange { index, k }.into());
        }
        if !seen.insert(index) {
            return Err(Malformed::DuplicateIndex(index).into());
        }
    }
    Ok(seen.into_iter().collect())
}

fn read_word(buffer: &[u8], word: usize) -> Result<u32> {
    let start = word * WORD;
    buffer
        .get(start..start + WORD)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or_else(|| {
            Malformed::Truncated {
                expected: start + WORD,
                actual: buffer.len(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use alloc::vec;

    fn sample_block() -> Block {
        Block::new(5, 17, 0x414f_a339, vec![0, 3], vec![0xde, 0xad, 0xbe, 0xef]).unwrap()
    }

    #[test]
    fn test_layout() {
        let wire = sample_block().to_bytes();
        assert_eq!(
            hex::encode(&wire),
            concat!(
                "00000002", "00000000", "00000003", "00000005", "00000011", "414fa339",
                "deadbeef"
            )
        );
    }

    #[test]
    fn test_round_trip() {
        let block = sample_block();
        let decoded = Block::from_bytes(&block.to_bytes()).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.degree(), 2);
        assert!(!decoded.is_simple());
        assert_eq!(decoded.indices(), &[0, 3]);
        assert_eq!(decoded.k(), 5);
        assert_eq!(decoded.bytes(), 17);
        assert_eq!(decoded.checksum(), 0x414f_a339);
        assert_eq!(decoded.data(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_indices_are_sorted() {
        let block = Block::new(9, 1, 0, vec![7, 1, 4], vec![0]).unwrap();
        assert_eq!(block.indices(), &[1, 4, 7]);

        let mut wire = hex::decode("00000002000000040000000100000005000000010000000000").unwrap();
        let decoded = Block::from_bytes(&wire).unwrap();
        assert_eq!(decoded.indices(), &[1, 4]);
        assert_eq!(decoded.data(), &[0]);

        wire.truncate(24);
        assert!(Block::from_bytes(&wire).unwrap().data().is_empty());
    }

    #[test]
    fn test_truncated() {
        let wire = sample_block().to_bytes();
        assert_eq!(
            Block::from_bytes(&[]).unwrap_err(),
            Error::MalformedBlock(Malformed::Truncated {
                expected: 4,
                actual: 0
            })
        );
        assert_eq!(
            Block::from_bytes(&wire[..3]).unwrap_err(),
            Error::MalformedBlock(Malformed::Truncated {
                expected: 4,
                actual: 3
            })
        );
        for len in 4..24 {
            assert_eq!(
                Block::from_bytes(&wire[..len]).unwrap_err(),
                Error::MalformedBlock(Malformed::Truncated {
                    expected: 24,
                    actual: len
                })
            );
        }
    }

    #[test]
    fn test_huge_degree() {
        let wire = [0xff, 0xff, 0xff, 0xff, 0, 0, 0, 1];
        assert!(matches!(
            Block::from_bytes(&wire).unwrap_err(),
            Error::MalformedBlock(Malformed::Truncated { actual: 8, .. })
        ));
    }

    #[test]
    fn test_zero_degree() {
        let wire = hex::decode("00000000000000050000001100000000").unwrap();
        assert_eq!(
            Block::from_bytes(&wire).unwrap_err(),
            Error::MalformedBlock(Malformed::ZeroDegree)
        );
    }

    #[test]
    fn test_invalid_indices() {
        let duplicate = hex::decode("0000000200000001000000010000000500000011414fa339").unwrap();
        assert_eq!(
            Block::from_bytes(&duplicate).unwrap_err(),
            Error::MalformedBlock(Malformed::DuplicateIndex(1))
        );
        let out_of_range = hex::decode("0000000100000005000000050000001100000000").unwrap();
        assert_eq!(
            Block::from_bytes(&out_of_range).unwrap_err(),
            Error::MalformedBlock(Malformed::IndexOutOfRange { index: 5, k: 5 })
        );
        let no_slices = hex::decode("0000000100000000000000000000000000000000").unwrap();
        assert_eq!(
            Block::from_bytes(&no_slices).unwrap_err(),
            Error::MalformedBlock(Malformed::IndexOutOfRange { index: 0, k: 0 })
        );
    }

    #[test]
    fn test_new_rejects_what_the_codec_rejects() {
        assert_eq!(
            Block::new(4, 16, 0, vec![], vec![0; 4]).unwrap_err(),
            Error::MalformedBlock(Malformed::ZeroDegree)
        );
        assert_eq!(
            Block::new(4, 16, 0, vec![1, 1], vec![0; 4]).unwrap_err(),
            Error::MalformedBlock(Malformed::DuplicateIndex(1))
        );
        assert_eq!(
            Block::new(4, 16, 0, vec![2, 4], vec![0; 4]).unwrap_err(),
            Error::MalformedBlock(Malformed::IndexOutOfRange { index: 4, k: 4 })
        );
        assert_eq!(
            Block::new(0, 0, 0, vec![0], vec![]).unwrap_err(),
            Error::MalformedBlock(Malformed::IndexOutOfRange { index: 0, k: 0 })
        );

        let block = Block::new(4, 16, 0, vec![3, 0, 2], vec![0; 4]).unwrap();
        assert_eq!(Block::from_bytes(&block.to_bytes()).unwrap(), block);
    }
}
