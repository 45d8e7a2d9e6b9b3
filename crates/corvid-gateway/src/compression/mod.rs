//! Transport-level zlib-stream decompression
//!
//! The gateway deflates a single logical stream across many WebSocket
//! frames. Each logical payload is terminated by a `Z_SYNC_FLUSH` marker
//! (`00 00 FF FF`); the inflate state persists across payloads within one
//! connection and must be recreated on reconnect, because the stream
//! dictionary is per-connection.

use flate2::{Decompress, FlushDecompress, Status};

/// The 4-byte suffix that terminates each logical payload
pub const ZLIB_SUFFIX: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];

/// Fixed scratch buffer size for inflate output (512 KiB)
pub const DECOMPRESSION_BUFFER_SIZE: usize = 512 * 1024;

/// Streaming zlib inflate errors
///
/// The numeric codes are part of the operator-facing error taxonomy,
/// alongside the WebSocket and gateway close codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ZlibStreamError {
    /// The inflater could make no progress on the stream
    #[error("zlib stream error")]
    Stream,

    /// The compressed data or the inflated text is malformed
    #[error("zlib data error")]
    Data,

    /// The decompressed payload could not be buffered
    #[error("zlib memory error")]
    Memory,
}

impl ZlibStreamError {
    /// The numeric error code logged for operators
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Stream => 6000,
            Self::Data => 6001,
            Self::Memory => 6002,
        }
    }
}

/// Reassembles and inflates zlib-stream transport frames
///
/// One instance per connection. Feed every binary transport frame to
/// [`push`](Self::push); a complete logical payload is yielded once the
/// accumulated bytes end with [`ZLIB_SUFFIX`].
pub struct ZlibStream {
    inflater: Decompress,
    /// Compressed bytes accumulated for the current logical payload
    compressed: Vec<u8>,
    /// Fixed-size inflate output buffer
    scratch: Vec<u8>,
    /// Total inflated bytes produced over the connection
    decompressed_total: u64,
}

impl ZlibStream {
    /// Create a fresh inflate context (zlib wrapper expected)
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflater: Decompress::new(true),
            compressed: Vec::new(),
            scratch: vec![0u8; DECOMPRESSION_BUFFER_SIZE],
            decompressed_total: 0,
        }
    }

    /// Feed one transport frame
    ///
    /// Returns `Ok(None)` while the logical payload is incomplete,
    /// `Ok(Some(text))` once the flush marker arrives and the accumulated
    /// bytes inflate to a complete payload.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<String>, ZlibStreamError> {
        self.compressed.extend_from_slice(chunk);

        // A logical payload is complete only when the buffer ends with the
        // sync-flush marker.
        if !self.compressed.ends_with(&ZLIB_SUFFIX) {
            return Ok(None);
        }

        let mut inflated: Vec<u8> = Vec::new();
        let mut offset = 0usize;

        loop {
            let before_in = self.inflater.total_in();
            let before_out = self.inflater.total_out();

            let status = self
                .inflater
                .decompress(
                    &self.compressed[offset..],
                    &mut self.scratch,
                    FlushDecompress::None,
                )
                .map_err(|_| ZlibStreamError::Data)?;

            let consumed = (self.inflater.total_in() - before_in) as usize;
            let produced = (self.inflater.total_out() - before_out) as usize;
            offset += consumed;

            if status == Status::BufError && consumed == 0 && produced == 0 {
                return Err(ZlibStreamError::Stream);
            }

            inflated
                .try_reserve(produced)
                .map_err(|_| ZlibStreamError::Memory)?;
            inflated.extend_from_slice(&self.scratch[..produced]);
            self.decompressed_total += produced as u64;

            // The scratch buffer was not filled: the inflater has no more
            // output for the accumulated input.
            if produced < self.scratch.len() {
                break;
            }
        }

        self.compressed.clear();

        let text = String::from_utf8(inflated).map_err(|_| ZlibStreamError::Data)?;
        Ok(Some(text))
    }

    /// Number of compressed bytes buffered for the incomplete payload
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.compressed.len()
    }

    /// Total inflated bytes produced over this connection
    #[must_use]
    pub const fn decompressed_bytes(&self) -> u64 {
        self.decompressed_total
    }
}

impl Default for ZlibStream {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ZlibStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZlibStream")
            .field("pending_bytes", &self.compressed.len())
            .field("decompressed_total", &self.decompressed_total)
            .finish()
    }
}
