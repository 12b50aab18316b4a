//! Invertible transforms applied to the payload before slicing.

use alloc::vec::Vec;

use crate::error::Result;

/// A byte transform with an exact inverse.
///
/// The encoder slices `compress(payload)`; a decoder recovers the payload with
/// `decompress`. The checksum is always taken over the untransformed payload.
pub trait Compressor {
    /// # Errors
    ///
    /// Implementation specific.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// # Errors
    ///
    /// Implementation specific, typically on input `compress` never produced.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Passes the payload through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Compressor for Identity {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Raw Snappy block compression.
#[cfg(feature = "snappy")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snappy;

#[cfg(feature = "snappy")]
impl Compressor for Snappy {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(|e| {
                crate::Error::Compression(alloc::format!("snappy compression failed: {e}"))
            })
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(|e| {
                crate::Error::Compression(alloc::format!("snappy decompression failed: {e}"))
            })
    }
}

impl<C: Compressor + ?Sized> Compressor for &C {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).compress(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).decompress(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let data = b"Some binary data";
        assert_eq!(Identity.compress(data).unwrap(), data);
        assert_eq!(Identity.decompress(data).unwrap(), data);
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn test_snappy() {
        let data = "Some binary data".repeat(100);
        let compressed = Snappy.compress(data.as_bytes()).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(Snappy.decompress(&compressed).unwrap(), data.as_bytes());
        assert!(matches!(
            Snappy.decompress(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            Err(crate::Error::Compression(_))
        ));
    }
}
