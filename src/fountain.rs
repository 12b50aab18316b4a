//! Luby Transform encoder and peeling decoder.
//!
//! The encoder slices a payload into `k` equally sized slices and emits an
//! unbounded stream of [`Block`]s, each the XOR of a random subset of slices
//! whose size follows the Ideal Soliton distribution. The decoder resolves
//! degree-one blocks into slices and XORs known slices out of the remaining
//! ones until every slice is known.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec;
use alloc::vec::Vec;

use rand_xoshiro::rand_core::RngCore;

use crate::block::Block;
use crate::compress::{Compressor, Identity};
use crate::config::Config;
use crate::error::{Error, Malformed, Result};
use crate::sampler::{sample_indices, IdealSoliton};

fn xor_into(target: &mut [u8], source: &[u8]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t ^= s;
    }
}

/// Produces blocks for a single payload.
#[derive(Debug, Clone)]
pub struct Encoder {
    slices: Vec<Vec<u8>>,
    slice_size: usize,
    bytes: u32,
    checksum: u32,
    soliton: IdealSoliton,
}

impl Encoder {
    /// Slices `payload` without compression.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyPayload`] for an empty payload,
    /// [`Error::ZeroSliceSize`] if `slice_size` is zero and
    /// [`Error::PayloadTooLarge`] if the payload length does not fit in 32 bits.
    pub fn new(payload: &[u8], slice_size: usize) -> Result<Self> {
        Self::with_compressor(payload, slice_size, &Identity)
    }

    /// Slices `compressor.compress(payload)`. The checksum still covers the
    /// uncompressed `payload`.
    ///
    /// # Errors
    ///
    /// As [`Encoder::new`], with [`Error::EmptyPayload`] referring to the
    /// compressed form, plus any error of the compressor.
    pub fn with_compressor<C: Compressor + ?Sized>(
        payload: &[u8],
        slice_size: usize,
        compressor: &C,
    ) -> Result<Self> {
        if slice_size == 0 {
            return Err(Error::ZeroSliceSize);
        }
        let compressed = compressor.compress(payload)?;
        if compressed.is_empty() {
            return Err(Error::EmptyPayload);
        }
        let too_large = || Error::PayloadTooLarge {
            size: compressed.len(),
        };
        let bytes = u32::try_from(compressed.len()).map_err(|_| too_large())?;
        let slices = crate::partition(&compressed, slice_size);
        let k = u32::try_from(slices.len()).map_err(|_| too_large())?;
        let checksum = crate::checksum(payload, k);
        tracing::debug!(k, bytes, slice_size, checksum, "fountain encoder ready");
        Ok(Self {
            soliton: IdealSoliton::new(slices.len()),
            slices,
            slice_size,
            bytes,
            checksum,
        })
    }

    /// Builds an encoder from a [`Config`].
    ///
    /// # Errors
    ///
    /// As [`Encoder::with_compressor`]; asking for compression without the
    /// `snappy` feature yields [`Error::Compression`].
    pub fn from_config(payload: &[u8], config: &Config) -> Result<Self> {
        if config.compress {
            #[cfg(feature = "snappy")]
            return Self::with_compressor(payload, config.slice_size, &crate::compress::Snappy);
            #[cfg(not(feature = "snappy"))]
            return Err(Error::Compression(
                "compression requires the `snappy` feature".into(),
            ));
        }
        Self::new(payload, config.slice_size)
    }

    /// The number of slices `k`.
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    #[must_use]
    pub fn slice_size(&self) -> usize {
        self.slice_size
    }

    /// Length of the sliced (possibly compressed) payload before padding.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bytes as usize
    }

    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    #[must_use]
    pub fn slices(&self) -> &[Vec<u8>] {
        &self.slices
    }

    /// XORs the slices named by `indices` into a block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if `indices` is empty, repeats an
    /// index or names a slice that does not exist.
    #[allow(clippy::cast_possible_truncation)]
    pub fn create_block(&self, indices: &[usize]) -> Result<Block> {
        if indices.is_empty() {
            return Err(Malformed::ZeroDegree.into());
        }
        let k = self.slices.len() as u32;
        let mut chosen = BTreeSet::new();
        for &index in indices {
            if index >= self.slices.len() {
                return Err(Malformed::IndexOutOfRange {
                    index: u32::try_from(index).unwrap_or(u32::MAX),
                    k,
                }
                .into());
            }
            if !chosen.insert(index) {
                return Err(Malformed::DuplicateIndex(index as u32).into());
            }
        }
        Ok(self.combine(chosen))
    }

    /// Draws one block.
    pub fn next_block<R: RngCore + ?Sized>(&self, rng: &mut R) -> Block {
        let degree = self.soliton.sample(rng);
        let indices = sample_indices(self.slices.len(), degree, rng);
        tracing::trace!(degree, "emitting block");
        self.combine(indices)
    }

    /// An endless stream of independently drawn blocks.
    ///
    /// Calling this again starts an equivalent stream; with a seeded `rng`
    /// the stream is reproducible.
    pub fn blocks<R: RngCore>(&self, rng: R) -> Blocks<'_, R> {
        Blocks { encoder: self, rng }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn combine(&self, indices: impl IntoIterator<Item = usize>) -> Block {
        let mut data = vec![0; self.slice_size];
        let indices = indices
            .into_iter()
            .map(|index| {
                xor_into(&mut data, &self.slices[index]);
                index as u32
            })
            .collect();
        Block::from_valid_parts(
            self.slices.len() as u32,
            self.bytes,
            self.checksum,
            indices,
            data,
        )
    }
}

/// Iterator returned by [`Encoder::blocks`]. It never ends.
#[derive(Debug)]
pub struct Blocks<'a, R> {
    encoder: &'a Encoder,
    rng: R,
}

impl<R: RngCore> Iterator for Blocks<'_, R> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        Some(self.encoder.next_block(&mut self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transmission {
    k: u32,
    bytes: u32,
    checksum: u32,
    slice_len: usize,
}

impl Transmission {
    fn of(block: &Block) -> Self {
        Self {
            k: block.k(),
            bytes: block.bytes(),
            checksum: block.checksum(),
            slice_len: block.data().len(),
        }
    }

    /// Whether the header could have come from an [`Encoder`].
    fn is_plausible(&self) -> bool {
        self.slice_len > 0
            && self.k > 0
            && (self.bytes as usize).div_ceil(self.slice_len) == self.k as usize
    }
}

/// Reassembles a payload from blocks of one transmission, in any order,
/// with duplicates and gaps.
#[derive(Debug, Default)]
pub struct Decoder {
    transmission: Option<Transmission>,
    slices: BTreeMap<usize, Vec<u8>>,
    received: usize,
    pending: Vec<(BTreeSet<usize>, Vec<u8>)>,
}

impl Decoder {
    /// Parses and receives one serialized block.
    ///
    /// # Errors
    ///
    /// Malformed buffers are reported as [`Error::MalformedBlock`] and leave
    /// the decoder untouched; see [`Decoder::receive`] for the rest.
    pub fn receive_bytes(&mut self, buffer: &[u8]) -> Result<bool> {
        let block = Block::from_bytes(buffer).inspect_err(|e| {
            tracing::debug!(%e, "discarding malformed block");
        })?;
        self.receive(block)
    }

    /// Receives one block and returns whether the payload is now complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentBlock`] if the block's `k`, `bytes`,
    /// `checksum` or slice length differ from earlier blocks or could not
    /// have been produced by an encoder.
    pub fn receive(&mut self, block: Block) -> Result<bool> {
        let transmission = Transmission::of(&block);
        match self.transmission {
            Some(known) if known != transmission => return Err(Error::InconsistentBlock),
            Some(_) => {}
            None if !transmission.is_plausible() => return Err(Error::InconsistentBlock),
            None => {}
        }
        self.transmission = Some(transmission);

        self.received += 1;
        if self.is_complete() {
            return Ok(true);
        }
        let (indices, data) = block.into_parts();
        self.absorb(indices.into_iter().map(|i| i as usize).collect(), data);
        if self.is_complete() {
            self.pending.clear();
            tracing::debug!(
                received = self.received,
                k = transmission.k,
                "all slices recovered"
            );
        }
        Ok(self.is_complete())
    }

    fn absorb(&mut self, indices: BTreeSet<usize>, data: Vec<u8>) {
        let mut queue = vec![(indices, data)];
        while let Some((mut indices, mut data)) = queue.pop() {
            self.reduce(&mut indices, &mut data);
            match indices.len() {
                0 => {}
                1 => {
                    let Some(&index) = indices.first() else {
                        continue;
                    };
                    tracing::trace!(index, "slice recovered");
                    self.slices.insert(index, data);
                    let (unblocked, waiting): (Vec<_>, Vec<_>) =
                        core::mem::take(&mut self.pending)
                            .into_iter()
                            .partition(|(pending, _)| pending.contains(&index));
                    self.pending = waiting;
                    queue.extend(unblocked);
                }
                _ => {
                    if !self.pending.iter().any(|(pending, _)| *pending == indices) {
                        self.pending.push((indices, data));
                    }
                }
            }
        }
    }

    fn reduce(&self, indices: &mut BTreeSet<usize>, data: &mut [u8]) {
        indices.retain(|index| match self.slices.get(index) {
            Some(slice) => {
                xor_into(data, slice);
                false
            }
            None => true,
        });
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slice_count() > 0 && self.slices.len() == self.slice_count()
    }

    /// `k` of the transmission, or 0 before the first block.
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.transmission.map_or(0, |t| t.k as usize)
    }

    #[must_use]
    pub fn recovered_count(&self) -> usize {
        self.slices.len()
    }

    /// Blocks accepted so far, including redundant ones.
    #[must_use]
    pub fn received_count(&self) -> usize {
        self.received
    }

    /// The payload once every slice is known, else `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IntegrityFailure`] if the reassembled payload does not
    /// match the transmitted checksum, and any error of `compressor`.
    pub fn message<C: Compressor + ?Sized>(&self, compressor: &C) -> Result<Option<Vec<u8>>> {
        let Some(transmission) = self.transmission.filter(|_| self.is_complete()) else {
            return Ok(None);
        };
        let slices: Vec<Vec<u8>> = self.slices.values().cloned().collect();
        let joined = crate::join(&slices, transmission.bytes as usize);
        let payload = compressor.decompress(&joined)?;
        let actual = crate::checksum(&payload, transmission.k);
        if actual != transmission.checksum {
            tracing::warn!(
                expected = transmission.checksum,
                actual,
                "reassembled payload failed the integrity check"
            );
            return Err(Error::IntegrityFailure {
                expected: transmission.checksum,
                actual,
            });
        }
        Ok(Some(payload))
    }
}
