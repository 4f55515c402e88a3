use memchr::{memchr, memchr3};

use crate::error::{self, Error, Stage};
use crate::tokenizer::{TokenSink, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    RecordStart,
    FieldStart,
    Unquoted,
    Quoted,
    Quote,
}

/// The default [`Tokenizer`], a state machine resumable at any byte.
///
/// Records end on either `\n` or `\r`, and empty lines are skipped, which
/// handles CRLF for free. Quoted fields may contain delimiters and line
/// terminators, and doubled quotes stand for a single one.
///
/// In lenient mode (the default), stray quotes are kept as regular bytes. In
/// strict mode they are reported as errors, as is input ending in the middle of
/// a quoted field.
#[derive(Debug, Clone)]
pub struct CoreTokenizer {
    delimiter: u8,
    quote: u8,
    strict: bool,
    max_field_size: Option<usize>,
    state: ReadState,
    field: Vec<u8>,
}

impl Default for CoreTokenizer {
    fn default() -> Self {
        Self::new(b',', b'"')
    }
}

impl CoreTokenizer {
    pub fn new(delimiter: u8, quote: u8) -> Self {
        Self {
            delimiter,
            quote,
            strict: false,
            max_field_size: None,
            state: ReadState::RecordStart,
            field: Vec::new(),
        }
    }

    pub fn strict(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    pub fn max_field_size(mut self, max: Option<usize>) -> Self {
        self.max_field_size = max;
        self
    }

    #[inline(always)]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Whether some record has been started and not terminated yet.
    #[inline(always)]
    pub fn has_partial_record(&self) -> bool {
        self.state != ReadState::RecordStart
    }

    #[inline]
    fn extend(&mut self, bytes: &[u8]) -> error::Result<()> {
        if let Some(max) = self.max_field_size {
            if self.field.len() + bytes.len() > max {
                return Err(Error::tokenizer(
                    Stage::Parse,
                    format!("field too large (more than {} bytes)", max),
                ));
            }
        }

        self.field.try_reserve(bytes.len())?;
        self.field.extend_from_slice(bytes);

        Ok(())
    }

    #[inline]
    fn submit_field<S: TokenSink + ?Sized>(&mut self, sink: &mut S) -> error::Result<()> {
        let result = sink.field(&self.field);
        self.field.clear();
        result
    }

    #[inline]
    fn submit_record<S: TokenSink + ?Sized>(&mut self, sink: &mut S) -> error::Result<()> {
        self.submit_field(sink)?;
        self.state = ReadState::RecordStart;
        sink.record()
    }
}

impl Tokenizer for CoreTokenizer {
    fn parse<S: TokenSink + ?Sized>(&mut self, input: &[u8], sink: &mut S) -> error::Result<()> {
        use ReadState::*;

        let input_len = input.len();
        let mut pos: usize = 0;

        while pos < input_len {
            match self.state {
                RecordStart => {
                    // Empty lines, and the LF of CRLF
                    if input[pos] == b'\n' || input[pos] == b'\r' {
                        pos += 1;
                    } else {
                        self.state = FieldStart;
                    }
                }
                FieldStart => {
                    if input[pos] == self.quote {
                        self.state = Quoted;
                        pos += 1;
                    } else {
                        self.state = Unquoted;
                    }
                }
                Unquoted => {
                    let found = memchr3(self.delimiter, b'\n', b'\r', &input[pos..]);
                    let end = found.map(|offset| pos + offset).unwrap_or(input_len);
                    let segment = &input[pos..end];

                    if self.strict && memchr(self.quote, segment).is_some() {
                        return Err(Error::tokenizer(
                            Stage::Parse,
                            "unexpected quote in unquoted field",
                        ));
                    }

                    self.extend(segment)?;

                    if found.is_none() {
                        break;
                    }

                    pos = end + 1;

                    if input[end] == self.delimiter {
                        self.submit_field(sink)?;
                        self.state = FieldStart;
                    } else {
                        self.submit_record(sink)?;
                    }
                }
                Quoted => {
                    // Here we are moving to next quote
                    if let Some(offset) = memchr(self.quote, &input[pos..]) {
                        self.extend(&input[pos..pos + offset])?;
                        pos += offset + 1;
                        self.state = Quote;
                    } else {
                        self.extend(&input[pos..])?;
                        break;
                    }
                }
                Quote => {
                    let byte = input[pos];

                    pos += 1;

                    if byte == self.quote {
                        self.extend(&[byte])?;
                        self.state = Quoted;
                    } else if byte == self.delimiter {
                        self.submit_field(sink)?;
                        self.state = FieldStart;
                    } else if byte == b'\n' || byte == b'\r' {
                        self.submit_record(sink)?;
                    } else if self.strict {
                        return Err(Error::tokenizer(
                            Stage::Parse,
                            "unexpected character after closing quote",
                        ));
                    } else {
                        self.extend(&[self.quote, byte])?;
                        self.state = Quoted;
                    }
                }
            }
        }

        Ok(())
    }

    fn finish<S: TokenSink + ?Sized>(&mut self, sink: &mut S) -> error::Result<()> {
        match self.state {
            ReadState::RecordStart => Ok(()),
            ReadState::Quoted if self.strict => {
                Err(Error::tokenizer(Stage::Finish, "unterminated quoted field"))
            }
            _ => self.submit_record(sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect {
        records: Vec<Vec<Vec<u8>>>,
        current: Vec<Vec<u8>>,
    }

    impl TokenSink for Collect {
        fn field(&mut self, bytes: &[u8]) -> error::Result<()> {
            self.current.push(bytes.to_vec());
            Ok(())
        }

        fn record(&mut self) -> error::Result<()> {
            self.records.push(std::mem::take(&mut self.current));
            Ok(())
        }
    }

    fn tokenize_with(
        mut tokenizer: CoreTokenizer,
        data: &[u8],
        chunk_size: usize,
    ) -> error::Result<Vec<Vec<Vec<u8>>>> {
        let mut sink = Collect::default();

        for chunk in data.chunks(chunk_size) {
            tokenizer.parse(chunk, &mut sink)?;
        }

        tokenizer.finish(&mut sink)?;

        Ok(sink.records)
    }

    fn tokenize(data: &str, chunk_size: usize) -> Vec<Vec<String>> {
        tokenize_with(CoreTokenizer::default(), data.as_bytes(), chunk_size)
            .unwrap()
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|cell| String::from_utf8(cell).unwrap())
                    .collect()
            })
            .collect()
    }

    fn with_oracle(data: &str) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_bytes());

        reader
            .records()
            .map(|record| record.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_empty_lines() {
        let tests = vec![
            "name\njohn\nlucy",
            "name\njohn\nlucy\n",
            "name\n\njohn\r\nlucy\n",
            "name\n\njohn\r\nlucy\n\n",
            "name\n\n\njohn\r\n\r\nlucy\n\n\n",
            "\nname\njohn\nlucy",
            "\n\nname\njohn\nlucy",
            "\r\n\r\nname\njohn\nlucy",
            "name\rjohn\rlucy\r",
            "name\njohn\nlucy\r\n\r\n",
        ];

        for chunk_size in [1024usize, 4, 3, 2, 1] {
            for test in tests.iter() {
                assert_eq!(
                    tokenize(test, chunk_size),
                    vec![vec!["name"], vec!["john"], vec!["lucy"]],
                    "chunk_size={} string={:?}",
                    chunk_size,
                    bstr::BStr::new(test)
                );
            }
        }

        assert!(tokenize("", 1).is_empty());
        assert!(tokenize("\r\n\n\r", 1).is_empty());
    }

    #[test]
    fn test_against_csv_crate() {
        let tests = vec![
            "name,surname,age\njohn,landy,45\nlucy,rose,67",
            "name,surname,age\n\"john\",\"landy, the \"\"everlasting\"\" bastard\",45\nlucy,rose,\"67\"\njermaine,jackson,\"89\"\n\nkarine,loucan,\"52\"\r\n",
            "a,,c\n,,\n\"\",x,\"\"\n",
            "\"multi\nline\",\"with\r\ncrlf\"\nnext,row\n",
            "ragged\nrows,of\ndifferent,widths,here\n",
            "\"\"\"ok\"\"\",whatever,dude\r\n",
        ];

        for chunk_size in [1024usize, 32, 7, 3, 2, 1] {
            for test in tests.iter() {
                assert_eq!(
                    tokenize(test, chunk_size),
                    with_oracle(test),
                    "chunk_size={} string={:?}",
                    chunk_size,
                    test
                );
            }
        }
    }

    #[test]
    fn test_trailing_fields() {
        assert_eq!(tokenize("a,b", 1), vec![vec!["a", "b"]]);
        assert_eq!(tokenize("a,", 1), vec![vec!["a", ""]]);
        assert_eq!(tokenize("a,\n", 1), vec![vec!["a", ""]]);
        assert_eq!(tokenize("\"a\"", 1), vec![vec!["a"]]);
    }

    #[test]
    fn test_tabs() {
        let tokenizer = CoreTokenizer::new(b'\t', b'"');
        let records = tokenize_with(tokenizer, b"name\tsurname\njohn,jr\tlandy\n", 5).unwrap();

        assert_eq!(
            records,
            vec![
                vec![b"name".to_vec(), b"surname".to_vec()],
                vec![b"john,jr".to_vec(), b"landy".to_vec()]
            ]
        );
    }

    #[test]
    fn test_lenient_quotes() {
        assert_eq!(tokenize("joh\"n,landis\n", 1), vec![vec!["joh\"n", "landis"]]);
        assert_eq!(tokenize("\"ab\"c\",d\n", 1), vec![vec!["ab\"c", "d"]]);
        assert_eq!(tokenize("\"open,field", 3), vec![vec!["open,field"]]);
    }

    #[test]
    fn test_strict_quotes() {
        let strict = || CoreTokenizer::default().strict(true);

        let err = tokenize_with(strict(), b"joh\"n,landis\n", 4).unwrap_err();
        assert_eq!(err.diagnostic(), Some("unexpected quote in unquoted field"));

        let err = tokenize_with(strict(), b"\"ab\"c\",d\n", 1).unwrap_err();
        assert_eq!(
            err.diagnostic(),
            Some("unexpected character after closing quote")
        );

        let err = tokenize_with(strict(), b"\"open,field", 1).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::ErrorKind::Tokenizer {
                stage: Stage::Finish,
                ..
            }
        ));

        assert_eq!(
            tokenize_with(strict(), b"\"a\"\"b\",c\n", 2).unwrap(),
            vec![vec![b"a\"b".to_vec(), b"c".to_vec()]]
        );
    }

    #[test]
    fn test_max_field_size() {
        let tokenizer = CoreTokenizer::default().max_field_size(Some(4));

        assert!(tokenize_with(tokenizer.clone(), b"abcd,efgh\n", 3).is_ok());

        let err = tokenize_with(tokenizer, b"abcd,efghi\n", 3).unwrap_err();
        assert_eq!(err.diagnostic(), Some("field too large (more than 4 bytes)"));
    }

    #[test]
    fn test_has_partial_record() {
        let mut tokenizer = CoreTokenizer::default();
        let mut sink = Collect::default();

        assert!(!tokenizer.has_partial_record());

        tokenizer.parse(b"a,b", &mut sink).unwrap();
        assert!(tokenizer.has_partial_record());

        tokenizer.parse(b"\n", &mut sink).unwrap();
        assert!(!tokenizer.has_partial_record());
        assert_eq!(sink.records.len(), 1);
    }
}
