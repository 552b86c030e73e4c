//! Pattern buffer with incremental marker search.
//!
//! Device output arrives in arbitrary chunks. Rather than rescanning the
//! whole accumulated output on every read, the buffer remembers how far it
//! has already searched and only scans the new bytes, backing up by the
//! marker length so a prompt split across two reads is still found.
//!
//! For large outputs (e.g., `show tech-support detail`) this keeps prompt
//! detection linear in the size of the output.

use bytes::{Bytes, BytesMut};
use memchr::memmem;

/// Buffer for accumulating shell output and locating literal markers.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated, not yet consumed output.
    buffer: BytesMut,

    /// Number of leading bytes already scanned for the current marker.
    searched: usize,
}

impl PatternBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            searched: 0,
        }
    }

    /// Append newly received data.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Find `marker` in the buffer, returning the offset just past its end.
    ///
    /// Only bytes that could complete a match not seen by an earlier call
    /// are scanned. Callers must use the same marker until it is found and
    /// consumed with [`split_through`](Self::split_through), or call
    /// [`rewind`](Self::rewind) before switching markers.
    pub fn find(&mut self, marker: &[u8]) -> Option<usize> {
        if marker.is_empty() {
            return Some(0);
        }

        let start = self.searched.saturating_sub(marker.len() - 1);
        match memmem::find(&self.buffer[start..], marker) {
            Some(pos) => Some(start + pos + marker.len()),
            None => {
                self.searched = self.buffer.len();
                None
            }
        }
    }

    /// Remove and return everything up to `end`, keeping the rest buffered.
    pub fn split_through(&mut self, end: usize) -> Bytes {
        self.searched = 0;
        self.buffer.split_to(end).freeze()
    }

    /// Forget search progress so the next `find` scans from the start.
    pub fn rewind(&mut self) {
        self.searched = 0;
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.searched = 0;
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_slice(), b"Hello, world!");
        assert_eq!(buffer.len(), 13);
    }

    #[test]
    fn test_find_returns_end_of_marker() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"output\r\nseamicro# ");
        assert_eq!(buffer.find(b"seamicro#"), Some(17));
    }

    #[test]
    fn test_partial_marker_does_not_match() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"output\r\nseami");
        assert_eq!(buffer.find(b"seamicro#"), None);
    }

    #[test]
    fn test_marker_split_across_chunks() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"some output\r\nseami");
        assert!(buffer.find(b"seamicro#").is_none());

        buffer.extend(b"cro#");
        assert_eq!(buffer.find(b"seamicro#"), Some(buffer.len()));
    }

    #[test]
    fn test_split_keeps_remainder() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"banner\r\nseamicro>enable\r\n");

        let end = buffer.find(b"seamicro>").unwrap();
        let head = buffer.split_through(end);
        assert_eq!(&head[..], b"banner\r\nseamicro>");
        assert_eq!(buffer.as_slice(), b"enable\r\n");
    }

    #[test]
    fn test_rewind_rescans_for_new_marker() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"seamicro>");
        assert!(buffer.find(b"seamicro#").is_none());

        buffer.rewind();
        assert_eq!(buffer.find(b"seamicro>"), Some(9));
    }

    #[test]
    fn test_large_output_searched_incrementally() {
        let mut buffer = PatternBuffer::new();
        for _ in 0..100 {
            buffer.extend(&[b'x'; 1000]);
            assert!(buffer.find(b"seamicro#").is_none());
        }
        buffer.extend(b"\r\nseamicro#");
        assert_eq!(buffer.find(b"seamicro#"), Some(100_000 + 11));
    }
}
