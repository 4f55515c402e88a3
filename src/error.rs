use std::collections::TryReserveError;
use std::{error, fmt, io, result};

/// The tokenizer step that produced a [`ErrorKind::Tokenizer`] error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// While pushing a chunk through [`Tokenizer::parse`](crate::Tokenizer::parse).
    Parse,
    /// While flushing the trailing record with [`Tokenizer::finish`](crate::Tokenizer::finish).
    Finish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse => f.write_str("parse"),
            Self::Finish => f.write_str("finish"),
        }
    }
}

/// The specific type of an error.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Indicate that [`Session::feed`](crate::Session::feed) was called while
    /// a previously fed chunk still had unconsumed bytes.
    BufferBusy {
        /// Number of bytes still waiting to be parsed
        pending: usize,
    },

    /// Not really a failure: no complete row can be produced from the bytes
    /// fed so far. The caller should feed more input and retry.
    EndOfBuffer,

    /// Indicate that a capture list contained something that is not a valid
    /// non-negative column index.
    InvalidCapture {
        /// Position of the offending element in the given list
        position: usize,
    },

    /// A previous allocation failure interrupted a row midway. The session
    /// refuses to parse anything else, since it could only produce rows
    /// missing some of their fields.
    Poisoned,

    /// The tokenizer rejected its input.
    Tokenizer {
        /// Which tokenizer step failed
        stage: Stage,
        /// Diagnostic text reported by the tokenizer
        reason: String,
    },

    /// Some buffer could not grow.
    Alloc(TryReserveError),
}

/// An error occurring when feeding or parsing CSV data.
#[derive(Debug)]
pub struct Error(ErrorKind);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self(kind)
    }

    /// Build a tokenizer error. Meant for custom [`Tokenizer`](crate::Tokenizer)
    /// implementations.
    pub fn tokenizer(stage: Stage, reason: impl Into<String>) -> Self {
        Self(ErrorKind::Tokenizer {
            stage,
            reason: reason.into(),
        })
    }

    /// Return whether this is the end-of-buffer signal rather than an
    /// actual failure.
    pub fn is_end_of_buffer(&self) -> bool {
        matches!(self.0, ErrorKind::EndOfBuffer)
    }

    /// Return whether a chunk was fed while the previous one was not drained.
    pub fn is_buffer_busy(&self) -> bool {
        matches!(self.0, ErrorKind::BufferBusy { .. })
    }

    /// Return whether the session gave up after an allocation failure.
    pub fn is_poisoned(&self) -> bool {
        matches!(self.0, ErrorKind::Poisoned)
    }

    /// Return the tokenizer's diagnostic text, if the tokenizer failed.
    pub fn diagnostic(&self) -> Option<&str> {
        match &self.0 {
            ErrorKind::Tokenizer { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Return a reference to the underlying [`ErrorKind`].
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwraps the error into its underlying [`ErrorKind`].
    pub fn into_kind(self) -> ErrorKind {
        self.0
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Self(ErrorKind::Alloc(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        Self::new(io::ErrorKind::Other, err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.0 {
            ErrorKind::Alloc(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            ErrorKind::BufferBusy { pending } => write!(
                f,
                "csv buffer not empty: {} bytes still need to be parsed",
                pending
            ),
            ErrorKind::EndOfBuffer => write!(f, "end of buffer: feed more data"),
            ErrorKind::InvalidCapture { position } => write!(
                f,
                "invalid capture list: element {} is not a non-negative column index",
                position
            ),
            ErrorKind::Poisoned => write!(
                f,
                "csv session unusable: a row was lost to a failed allocation"
            ),
            ErrorKind::Tokenizer {
                stage,
                ref reason,
            } => write!(f, "csv {} failed: {}", stage, reason),
            ErrorKind::Alloc(ref err) => write!(f, "could not allocate csv buffer: {}", err),
        }
    }
}

/// A type alias for `Result<T, csv_feed::Error>`.
pub type Result<T> = result::Result<T, Error>;
