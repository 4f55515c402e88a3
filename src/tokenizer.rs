use crate::error;

/// Receives the tokens produced by a [`Tokenizer`].
///
/// Errors returned by the sink must be propagated by the tokenizer as-is,
/// aborting the current call.
pub trait TokenSink {
    /// A field was completed. `bytes` are its unescaped contents.
    fn field(&mut self, bytes: &[u8]) -> error::Result<()>;

    /// The record whose fields were just reported is complete.
    fn record(&mut self) -> error::Result<()>;
}

/// A push-style CSV tokenizer.
///
/// Implementations consume every byte they are given, invoking the sink
/// synchronously any number of times before returning, and keep whatever
/// partial field or record remains for the next call.
///
/// The driver relies on one property of the grammar: a record always spans at
/// least two bytes of input, one of content plus its terminator. This is
/// what bounds the number of rows a single chunk can complete, so empty lines
/// must never produce records.
pub trait Tokenizer {
    fn parse<S: TokenSink + ?Sized>(&mut self, chunk: &[u8], sink: &mut S) -> error::Result<()>;

    /// Called once input is over: flushes the record in progress, if any,
    /// even though it was not terminated.
    fn finish<S: TokenSink + ?Sized>(&mut self, sink: &mut S) -> error::Result<()>;
}
