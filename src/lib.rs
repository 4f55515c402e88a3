/*!
The `csv-feed` crate provides an incremental, resumable CSV parsing engine
meant to be embedded in hosts that cannot afford to block.

Instead of reading from some [`std::io::Read`] implementation, a [`Session`]
is handed already-in-memory chunks of bytes, of any size, and gives completed
rows back in small capped batches. Every call only does a bounded amount of
work before returning, and all parser state is kept in the session between
calls.

# Examples

*Feeding chunks and draining rows*

```
use csv_feed::Session;

let mut session = Session::new();

for chunk in [b"name,surname\njohn,lan".as_slice(), b"dis\nlucy,rose"] {
    session.feed(chunk)?;

    loop {
        match session.parse() {
            Ok(rows) => {
                for row in rows {
                    dbg!(row);
                }
            }
            Err(err) if err.is_end_of_buffer() => break,
            Err(err) => return Err(err),
        }
    }
}

// Flushes the last row, which has no line terminator
let rows = session.close()?;
```

*Selecting and reordering columns*

```
use csv_feed::SessionBuilder;

let mut session = SessionBuilder::new().tabs(true).binary(true).build();
session.set_capture([2, 0])?;
```

# Feeding protocol

A session stages a single chunk at a time: [`Session::feed`] will refuse a new
chunk as long as the previous one has not been completely parsed. Parsing is
done by either:

- [`Session::parse`]: hands at most [`MAX_PARSE_SIZE`] bytes of staged input to
  the tokenizer and returns whatever rows were completed, possibly none.
- [`Session::parse_one_row`]: hands staged input to the tokenizer one byte at a
  time and returns as soon as a row is complete.

Both return an end-of-buffer error, see [`Error::is_end_of_buffer`], when
staged input runs out. This is not a failure, only a hint that more input
should be fed.

# Batches

A record always spans at least two bytes of input, one of content plus its
terminator, since empty lines are skipped. This means a single call to
[`Session::parse`] can never complete more than `MAX_PARSE_SIZE / 2`, i.e.
[`MAX_ROWS_PER_BATCH`], rows. This relationship is checked at compile time.

# Captures

By default, every column of every row is returned. [`Session::set_capture`]
restricts output to some columns, in the given order, possibly repeating some
of them. Indices out of bounds for a given row yield empty fields.

Beware that an empty capture is not the same thing as no capture at all:
it yields empty rows.

# Tokenizers

The CSV grammar itself is handled by a [`Tokenizer`], invoking a
[`TokenSink`] each time a field or a record is complete. The default one,
[`CoreTokenizer`], handles quoting, doubled quotes, CRLF and empty lines.
[`SessionBuilder::build_with`] lets you drive your own instead.

# Caveats

## Field values

Fields are never trimmed nor transformed. In text mode (the default),
each byte is mapped to the `char` of the same value (i.e. decoded as Latin-1)
so that no byte is ever lost, whatever the actual encoding of the data. Use
binary mode and decode yourself if you need anything else.

## Allocation failures

If a field cannot be stored because memory ran out, the row it belonged to is
lost and the session is poisoned: every later parse returns an error, see
[`Error::is_poisoned`]. It never hands back a row with missing fields.

## Line terminators

Both `\n` and `\r` terminate records and empty lines are skipped, so
leading CR characters of a record will be trimmed.
*/
#[allow(unused_macros)]
macro_rules! brow {
    () => {{
        $crate::records::Row::new()
    }};

    ($($x: expr),*) => {{
        let r: $crate::records::Row = vec![$($crate::records::Field::from($x)),*];
        r
    }};
}

mod batch;
mod capture;
mod cell;
mod core;
mod driver;
mod error;
mod records;
mod row;
mod session;
mod staging;
mod tokenizer;

pub use batch::MAX_ROWS_PER_BATCH;
pub use capture::Capture;
pub use crate::core::CoreTokenizer;
pub use driver::MAX_PARSE_SIZE;
pub use error::{Error, ErrorKind, Result, Stage};
pub use records::{Field, FieldEncoding, Row};
pub use session::{Options, Session, SessionBuilder};
pub use tokenizer::{TokenSink, Tokenizer};
