/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Byte-at-a-time input seam for the codec.
//!
//! Decoders pull single bytes through the [`DataSource`] trait so the same
//! code can read from a packet slice, a buffered stream, or anything else
//! that can produce bytes in order.

use std::io::Read;
use tracing::warn;

/// Default scratch size for [`ReaderSource`].
const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A source of bytes for FAST decoding.
pub trait DataSource {
    /// Returns the next byte, or `None` at end of input.
    fn get_byte(&mut self) -> Option<u8>;
}

/// A data source over an in-memory byte slice.
///
/// This is the source used for decoding packets that have already been
/// received in full, which is the normal case for multicast market data.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    /// Wraps `data` as a source positioned at its first byte.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl DataSource for SliceSource<'_> {
    fn get_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }
}

/// A data source over any [`Read`] implementation.
///
/// Bytes are pulled from the reader in chunks and handed out one at a time.
/// Read errors are reported once and then treated as end of input; the
/// decoder sees a truncated stream and fails the surrounding decode.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    chunk: Box<[u8]>,
    used: usize,
    position: usize,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps `reader` with the default chunk size.
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    /// Wraps `reader`, buffering reads through a `chunk_size` byte scratch.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk: vec![0; chunk_size.max(1)].into_boxed_slice(),
            used: 0,
            position: 0,
        }
    }

    fn refill(&mut self) -> bool {
        match self.reader.read(&mut self.chunk) {
            Ok(0) => false,
            Ok(n) => {
                self.used = n;
                self.position = 0;
                true
            }
            Err(err) => {
                warn!(error = %err, "read failed, treating as end of input");
                false
            }
        }
    }
}

impl<R: Read> DataSource for ReaderSource<R> {
    fn get_byte(&mut self) -> Option<u8> {
        if self.position >= self.used && !self.refill() {
            return None;
        }
        let byte = self.chunk[self.position];
        self.position += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_yields_bytes_in_order() {
        let mut source = SliceSource::new(&[1, 2, 3]);
        assert_eq!(source.get_byte(), Some(1));
        assert_eq!(source.get_byte(), Some(2));
        assert_eq!(source.position(), 2);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.get_byte(), Some(3));
        assert_eq!(source.get_byte(), None);
        assert_eq!(source.get_byte(), None);
    }

    #[test]
    fn test_reader_source_crosses_chunk_boundaries() {
        let data: Vec<u8> = (0..=255).collect();
        let mut source = ReaderSource::with_chunk_size(&data[..], 7);
        for expected in 0..=255u8 {
            assert_eq!(source.get_byte(), Some(expected));
        }
        assert_eq!(source.get_byte(), None);
    }

    #[test]
    fn test_reader_source_empty_reader() {
        let mut source = ReaderSource::new(std::io::empty());
        assert_eq!(source.get_byte(), None);
    }
}
