use tracing::{debug, trace};

use crate::batch::{BatchSink, MAX_ROWS_PER_BATCH};
use crate::capture::Capture;
use crate::error::{self, Error, ErrorKind};
use crate::records::{FieldEncoding, Row};
use crate::row::RowStore;
use crate::staging::StagingBuffer;
use crate::tokenizer::{TokenSink, Tokenizer};

/// Maximum number of bytes handed to the tokenizer by a single
/// [`ParserDriver::parse`] call.
pub const MAX_PARSE_SIZE: usize = 128;

// Each row needs at least two bytes of input (one byte of content and its
// terminator), so this is what keeps a single chunk from overflowing a batch.
const _: () = assert!(MAX_PARSE_SIZE <= 2 * MAX_ROWS_PER_BATCH);

/// Context threaded through tokenizer callbacks during one driver call.
struct RowSink<'a> {
    row: &'a mut RowStore,
    capture: &'a Capture,
    encoding: FieldEncoding,
    batch: BatchSink,
}

impl<'a> RowSink<'a> {
    fn new(row: &'a mut RowStore, capture: &'a Capture, encoding: FieldEncoding) -> Self {
        Self {
            row,
            capture,
            encoding,
            batch: BatchSink::begin_batch(),
        }
    }
}

impl TokenSink for RowSink<'_> {
    #[inline]
    fn field(&mut self, bytes: &[u8]) -> error::Result<()> {
        self.row.append_field(bytes, self.capture)
    }

    #[inline]
    fn record(&mut self) -> error::Result<()> {
        let row = self.capture.materialize_row(self.row, self.encoding);
        self.row.reset_row();
        self.batch.push_row(row);

        Ok(())
    }
}

/// Drives a [`Tokenizer`] over the staged input, accumulating its fields into
/// rows and handing completed rows back in bounded batches.
pub(crate) struct ParserDriver<T> {
    tokenizer: T,
    row: RowStore,
    staging: StagingBuffer,
    capture: Capture,
    encoding: FieldEncoding,
    poisoned: bool,
}

impl<T: Tokenizer> ParserDriver<T> {
    pub(crate) fn new(tokenizer: T, encoding: FieldEncoding) -> Self {
        Self {
            tokenizer,
            row: RowStore::new(),
            staging: StagingBuffer::new(),
            capture: Capture::All,
            encoding,
            poisoned: false,
        }
    }

    #[inline(always)]
    pub(crate) fn staging(&self) -> &StagingBuffer {
        &self.staging
    }

    #[inline(always)]
    pub(crate) fn capture(&self) -> &Capture {
        &self.capture
    }

    #[inline(always)]
    pub(crate) fn encoding(&self) -> FieldEncoding {
        self.encoding
    }

    #[inline(always)]
    pub(crate) fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    fn check_poisoned(&self) -> error::Result<()> {
        if self.poisoned {
            return Err(Error::new(ErrorKind::Poisoned));
        }

        Ok(())
    }

    // When a field could not be stored, the tokenizer has already moved past
    // it and the row in progress is missing it for good.
    fn on_tokenizer_error(&mut self, err: Error) -> Error {
        if matches!(err.kind(), ErrorKind::Alloc(_)) {
            debug!("csv row dropped after failed allocation");

            self.row.reset_row();
            self.poisoned = true;
        }

        err
    }

    pub(crate) fn feed(&mut self, bytes: &[u8]) -> error::Result<()> {
        self.staging.feed(bytes)
    }

    pub(crate) fn set_capture(&mut self, capture: Capture) {
        self.capture = capture;
    }

    /// Pushes a single chunk of at most [`MAX_PARSE_SIZE`] bytes through the
    /// tokenizer and returns every row it completed, possibly none.
    pub(crate) fn parse(&mut self) -> error::Result<Vec<Row>> {
        self.check_poisoned()?;

        let chunk = self.staging.take_chunk(MAX_PARSE_SIZE);

        if chunk.is_empty() {
            trace!("end of buffer");
            return Err(Error::new(ErrorKind::EndOfBuffer));
        }

        let mut sink = RowSink::new(&mut self.row, &self.capture, self.encoding);

        if let Err(err) = self.tokenizer.parse(chunk, &mut sink) {
            return Err(self.on_tokenizer_error(err));
        }

        trace!(
            bytes = chunk.len(),
            rows = sink.batch.len(),
            "parsed chunk"
        );

        Ok(sink.batch.drain())
    }

    /// Pushes input one byte at a time until at least one row is complete.
    pub(crate) fn parse_one_row(&mut self) -> error::Result<Vec<Row>> {
        self.check_poisoned()?;

        let mut sink = RowSink::new(&mut self.row, &self.capture, self.encoding);

        while sink.batch.is_empty() {
            let chunk = self.staging.take_chunk(1);

            if chunk.is_empty() {
                trace!("end of buffer before a row was complete");
                return Err(Error::new(ErrorKind::EndOfBuffer));
            }

            if let Err(err) = self.tokenizer.parse(chunk, &mut sink) {
                return Err(self.on_tokenizer_error(err));
            }
        }

        Ok(sink.batch.drain())
    }

    /// Flushes the record the tokenizer may still be holding because input
    /// did not end with a line terminator.
    pub(crate) fn finish(&mut self) -> error::Result<Vec<Row>> {
        self.check_poisoned()?;

        let mut sink = RowSink::new(&mut self.row, &self.capture, self.encoding);

        if let Err(err) = self.tokenizer.finish(&mut sink) {
            return Err(self.on_tokenizer_error(err));
        }

        Ok(sink.batch.drain())
    }
}
