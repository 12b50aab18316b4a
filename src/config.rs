//! Encoder configuration.

/// Slice size and compression choice for an [`crate::Encoder`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Bytes per slice, and thus per block payload.
    ///
    /// Default: 200
    pub slice_size: usize,

    /// Compress the payload before slicing. Requires the `snappy` feature.
    ///
    /// Default: false
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slice_size: 200,
            compress: false,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_slice_size(mut self, slice_size: usize) -> Self {
        self.slice_size = slice_size;
        self
    }

    #[must_use]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}
