use crate::error::{self, Error, ErrorKind};

/// Holds the single chunk of input fed by the caller, and how much of it the
/// driver has consumed already.
///
/// Only one chunk can be pending at once: feeding again before the previous
/// chunk has been fully consumed is refused.
#[derive(Debug, Default)]
pub(crate) struct StagingBuffer {
    pending: Vec<u8>,
    consumed: usize,
}

impl StagingBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.consumed >= self.pending.len()
    }

    #[inline(always)]
    pub(crate) fn remaining(&self) -> usize {
        self.pending.len().saturating_sub(self.consumed)
    }

    pub(crate) fn feed(&mut self, bytes: &[u8]) -> error::Result<()> {
        if !self.is_empty() {
            return Err(Error::new(ErrorKind::BufferBusy {
                pending: self.remaining(),
            }));
        }

        self.pending.clear();
        self.consumed = 0;

        // NOTE: `pending` is empty here, so a failed reservation leaves the
        // buffer in its drained state.
        self.pending.try_reserve(bytes.len())?;
        self.pending.extend_from_slice(bytes);

        Ok(())
    }

    /// Returns at most `max_len` unconsumed bytes and marks them as consumed.
    /// An empty slice means there is nothing left to parse.
    #[inline]
    pub(crate) fn take_chunk(&mut self, max_len: usize) -> &[u8] {
        if self.is_empty() {
            return &[];
        }

        let start = self.consumed;
        self.consumed += self.remaining().min(max_len);

        &self.pending[start..self.consumed]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_chunk() -> error::Result<()> {
        let mut buffer = StagingBuffer::new();

        assert!(buffer.is_empty());
        assert_eq!(buffer.take_chunk(10), b"");

        buffer.feed(b"name,surname\n")?;
        assert_eq!(buffer.remaining(), 13);

        assert_eq!(buffer.take_chunk(4), b"name");
        assert_eq!(buffer.take_chunk(1), b",");
        assert_eq!(buffer.take_chunk(128), b"surname\n");
        assert!(buffer.is_empty());
        assert_eq!(buffer.take_chunk(128), b"");

        Ok(())
    }

    #[test]
    fn test_feed_busy() -> error::Result<()> {
        let mut buffer = StagingBuffer::new();

        buffer.feed(b"john,landis\n")?;
        buffer.take_chunk(3);

        let err = buffer.feed(b"lucy,rose\n").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::BufferBusy { pending: 9 }));

        // State is unchanged by the refused feed
        assert_eq!(buffer.take_chunk(128), b"n,landis\n");

        buffer.feed(b"lucy,rose\n")?;
        assert_eq!(buffer.take_chunk(128), b"lucy,rose\n");

        Ok(())
    }

    #[test]
    fn test_feed_empty_chunk() -> error::Result<()> {
        let mut buffer = StagingBuffer::new();

        buffer.feed(b"")?;
        assert!(buffer.is_empty());

        // An empty chunk never blocks the next one
        buffer.feed(b"a")?;
        assert_eq!(buffer.remaining(), 1);

        Ok(())
    }
}
