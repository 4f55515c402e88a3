use std::borrow::Cow;
use std::fmt;

/// How field values are materialized in output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldEncoding {
    /// Each byte becomes the `char` of the same value (Latin-1), so that no
    /// byte is ever lost or replaced.
    #[default]
    Text,
    /// Fields are handed back as raw bytes.
    Binary,
}

impl FieldEncoding {
    #[inline]
    pub(crate) fn encode(self, bytes: &[u8]) -> Field {
        match self {
            Self::Text => Field::Text(bytes.iter().copied().map(char::from).collect()),
            Self::Binary => Field::Binary(bytes.to_vec()),
        }
    }

    #[inline]
    pub(crate) fn empty(self) -> Field {
        match self {
            Self::Text => Field::Text(String::new()),
            Self::Binary => Field::Binary(Vec::new()),
        }
    }
}

/// A single materialized field value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Text(String),
    Binary(Vec<u8>),
}

impl Field {
    /// Returns the number of bytes captured by the tokenizer for this field.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Binary(bytes) => bytes.is_empty(),
        }
    }

    /// Returns the exact bytes captured by the tokenizer.
    ///
    /// Binary fields are borrowed. Text fields are borrowed when they are
    /// pure ASCII, else their Latin-1 characters are folded back into bytes.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Binary(bytes) => Cow::Borrowed(bytes),
            Self::Text(text) if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Self::Text(text) => Cow::Owned(text.chars().map(|c| c as u8).collect()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Text(_) => None,
            Self::Binary(bytes) => Some(bytes),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{:?}", text),
            Self::Binary(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&[u8]> for Field {
    fn from(value: &[u8]) -> Self {
        Self::Binary(value.to_vec())
    }
}

/// A completed row, as handed back to the caller.
pub type Row = Vec<Field>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text() {
        let field = FieldEncoding::Text.encode(b"name");
        assert_eq!(field, Field::Text("name".to_string()));
        assert_eq!(field.len(), 4);
        assert_eq!(field.to_bytes(), Cow::Borrowed(b"name".as_slice()));

        // Latin-1 keeps every byte
        let field = FieldEncoding::Text.encode(b"b\xe9atrice\xff");
        assert_eq!(field.as_text(), Some("b\u{e9}atrice\u{ff}"));
        assert_eq!(field.len(), 9);
        assert_eq!(field.to_bytes().as_ref(), b"b\xe9atrice\xff");
    }

    #[test]
    fn test_encode_binary() {
        let field = FieldEncoding::Binary.encode(b"\x00raw\xff");
        assert_eq!(field.as_binary(), Some(b"\x00raw\xff".as_slice()));
        assert_eq!(field.as_text(), None);
        assert_eq!(format!("{:?}", field), "b\"\\x00raw\\xff\"");
    }

    #[test]
    fn test_empty() {
        assert!(FieldEncoding::Text.empty().is_empty());
        assert_eq!(FieldEncoding::Binary.empty(), Field::Binary(vec![]));
        assert_ne!(FieldEncoding::Text.empty(), FieldEncoding::Binary.empty());
    }
}
