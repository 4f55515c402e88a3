use tracing::debug;

use crate::capture::Capture;
use crate::core::CoreTokenizer;
use crate::driver::ParserDriver;
use crate::error;
use crate::records::{FieldEncoding, Row};
use crate::tokenizer::Tokenizer;

/// Session options, as a bitmask hosts can pass around.
///
/// Only the delimiter and the output encoding can be set this way. Anything
/// else, e.g. strict parsing, goes through [`SessionBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options(u32);

impl Options {
    /// Split fields on tabs instead of commas.
    pub const TABS: Self = Self(1);
    /// Hand fields back as raw bytes instead of text.
    pub const BINARY: Self = Self(1 << 1);

    const ALL: u32 = Self::TABS.0 | Self::BINARY.0;

    pub fn empty() -> Self {
        Self(0)
    }

    /// Unknown bits are silently dropped.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    #[inline(always)]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Options {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Configures and creates a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    delimiter: u8,
    quote: u8,
    encoding: FieldEncoding,
    strict: bool,
    max_field_size: Option<usize>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            encoding: FieldEncoding::Text,
            strict: false,
            max_field_size: None,
        }
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: Options) -> Self {
        let mut builder = Self::new();
        builder
            .tabs(options.contains(Options::TABS))
            .binary(options.contains(Options::BINARY));
        builder
    }

    pub fn tabs(&mut self, yes: bool) -> &mut Self {
        self.delimiter = if yes { b'\t' } else { b',' };
        self
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(&mut self, quote: u8) -> &mut Self {
        self.quote = quote;
        self
    }

    pub fn binary(&mut self, yes: bool) -> &mut Self {
        self.encoding = if yes {
            FieldEncoding::Binary
        } else {
            FieldEncoding::Text
        };
        self
    }

    pub fn strict(&mut self, yes: bool) -> &mut Self {
        self.strict = yes;
        self
    }

    /// Make the tokenizer fail on any field longer than `max` bytes.
    pub fn max_field_size(&mut self, max: usize) -> &mut Self {
        self.max_field_size = Some(max);
        self
    }

    pub fn build(&self) -> Session {
        let tokenizer = CoreTokenizer::new(self.delimiter, self.quote)
            .strict(self.strict)
            .max_field_size(self.max_field_size);

        self.build_with(tokenizer)
    }

    /// Creates a session driving a custom tokenizer. Only the output encoding
    /// of the builder applies, the grammar is the tokenizer's business.
    pub fn build_with<T: Tokenizer>(&self, tokenizer: T) -> Session<T> {
        debug!(
            delimiter = %self.delimiter.escape_ascii(),
            encoding = ?self.encoding,
            strict = self.strict,
            "csv session created"
        );

        Session {
            driver: ParserDriver::new(tokenizer, self.encoding),
        }
    }
}

/// An incremental CSV parsing session.
///
/// Input is handed over with [`Session::feed`], one chunk at a time, and
/// rows are pulled with [`Session::parse`] or [`Session::parse_one_row`] until
/// they report the end of the buffer, at which point the next chunk may be fed.
/// No call ever blocks waiting for input.
///
/// ```
/// use csv_feed::Session;
///
/// let mut session = Session::new();
/// session.feed(b"name,age\njohn,")?;
///
/// loop {
///     match session.parse() {
///         Ok(rows) => println!("{:?}", rows),
///         Err(err) if err.is_end_of_buffer() => break,
///         Err(err) => return Err(err),
///     }
/// }
///
/// session.feed(b"45")?;
/// // ...
/// let last_rows = session.close()?;
/// ```
pub struct Session<T = CoreTokenizer> {
    driver: ParserDriver<T>,
}

impl Session {
    /// Creates a session with default options: comma-delimited, text fields.
    pub fn new() -> Self {
        SessionBuilder::new().build()
    }

    /// Creates a session from an options bitmask, see [`Options`]. Bits
    /// other than [`Options::TABS`] and [`Options::BINARY`] are ignored.
    pub fn init(bits: u32) -> Self {
        SessionBuilder::from_options(Options::from_bits(bits)).build()
    }

    /// Whether the tokenizer holds a record that was not terminated yet.
    pub fn has_partial_record(&self) -> bool {
        self.driver.tokenizer().has_partial_record()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tokenizer> Session<T> {
    /// Stages a new chunk of input. Fails if the previous chunk has not been
    /// entirely parsed yet, in which case nothing changes.
    pub fn feed(&mut self, bytes: &[u8]) -> error::Result<()> {
        self.driver.feed(bytes)?;

        debug!(bytes = bytes.len(), "csv chunk fed");

        Ok(())
    }

    /// Replaces the current capture with the given zero-based column
    /// indices. If any of them is invalid, the current capture is kept.
    ///
    /// Note that an empty list means every row will be empty.
    pub fn set_capture<I, C>(&mut self, indexes: I) -> error::Result<()>
    where
        I: IntoIterator<Item = C>,
        C: TryInto<usize>,
    {
        let capture = Capture::try_from_iter(indexes)?;
        self.replace_capture(capture);

        Ok(())
    }

    /// Replaces the current capture wholesale. [`Capture::All`] restores
    /// the default of keeping every column.
    pub fn replace_capture(&mut self, capture: Capture) {
        debug!(width = ?capture.width(), "csv capture replaced");

        self.driver.set_capture(capture);
    }

    /// Goes back to keeping every column.
    pub fn clear_capture(&mut self) {
        self.replace_capture(Capture::All);
    }

    pub fn capture(&self) -> &Capture {
        self.driver.capture()
    }

    pub fn encoding(&self) -> FieldEncoding {
        self.driver.encoding()
    }

    /// Number of fed bytes still waiting to be parsed.
    pub fn pending_bytes(&self) -> usize {
        self.driver.staging().remaining()
    }

    /// Whether the next [`Session::feed`] would be accepted.
    pub fn is_buffer_empty(&self) -> bool {
        self.driver.staging().is_empty()
    }

    /// Parses the next chunk of at most
    /// [`MAX_PARSE_SIZE`](crate::MAX_PARSE_SIZE) bytes of staged input and
    /// returns the rows it completed, which can be none at all.
    ///
    /// Returns an end-of-buffer error, see [`Error::is_end_of_buffer`](crate::Error::is_end_of_buffer), if
    /// everything fed so far has been parsed already.
    pub fn parse(&mut self) -> error::Result<Vec<Row>> {
        self.driver.parse()
    }

    /// Parses staged input until at least one row is complete.
    ///
    /// Returns an end-of-buffer error if input runs out first. The row in
    /// progress is kept so that parsing can resume after the next
    /// [`Session::feed`].
    pub fn parse_one_row(&mut self) -> error::Result<Vec<Row>> {
        self.driver.parse_one_row()
    }

    /// Ends the session, returning the last row if input did not end with
    /// a line terminator. Any staged input that was not parsed yet is
    /// discarded.
    pub fn close(mut self) -> error::Result<Vec<Row>> {
        let unparsed = self.driver.staging().remaining();
        let rows = self.driver.finish()?;

        debug!(rows = rows.len(), unparsed, "csv session closed");

        Ok(rows)
    }
}
