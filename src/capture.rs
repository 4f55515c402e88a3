use std::str::FromStr;

use crate::error::{self, Error, ErrorKind};
use crate::records::{FieldEncoding, Row};
use crate::row::RowStore;

fn collect_columns<I, T>(indexes: I) -> error::Result<Vec<usize>>
where
    I: IntoIterator<Item = T>,
    T: TryInto<usize>,
{
    let indexes = indexes.into_iter();
    let mut columns = Vec::new();
    columns.try_reserve(indexes.size_hint().0)?;

    for (position, index) in indexes.enumerate() {
        let index = index
            .try_into()
            .map_err(|_| Error::new(ErrorKind::InvalidCapture { position }))?;

        columns.push(index);
    }

    Ok(columns)
}

/// Which columns of each row end up in the output, and in what order.
///
/// [`Capture::All`] and an empty [`Capture::Columns`] are not the same thing:
/// the first passes every column through, the second yields rows with no field
/// at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Capture {
    #[default]
    All,
    /// Zero-based column indices, possibly reordered or duplicated.
    Columns(Vec<usize>),
}

impl Capture {
    /// Builds a projection from any list of integers, rejecting anything
    /// that is not a valid non-negative column index.
    pub fn try_from_iter<I, T>(indexes: I) -> error::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: TryInto<usize>,
    {
        collect_columns(indexes).map(Self::Columns)
    }

    /// Builds a projection from 1-based column numbers, as most hosts and
    /// command line tools count them. `0` is rejected.
    pub fn from_one_based<I, T>(numbers: I) -> error::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: TryInto<usize>,
    {
        let mut columns = collect_columns(numbers)?;

        for (position, column) in columns.iter_mut().enumerate() {
            *column = column
                .checked_sub(1)
                .ok_or_else(|| Error::new(ErrorKind::InvalidCapture { position }))?;
        }

        Ok(Self::Columns(columns))
    }

    /// Number of fields in each output row, if fixed by the projection.
    pub fn width(&self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Columns(columns) => Some(columns.len()),
        }
    }

    #[inline]
    pub fn is_selected(&self, column: usize) -> bool {
        match self {
            Self::All => true,
            Self::Columns(columns) => columns.contains(&column),
        }
    }

    pub(crate) fn materialize_row(&self, row: &RowStore, encoding: FieldEncoding) -> Row {
        match self {
            Self::All => row.iter().map(|cell| encoding.encode(cell)).collect(),
            Self::Columns(columns) => columns
                .iter()
                .map(|&column| match row.get(column) {
                    Some(cell) => encoding.encode(cell),
                    None => encoding.empty(),
                })
                .collect(),
        }
    }
}

/// Parses a comma-separated list of zero-based indices, e.g. `"2,0"`.
/// An empty string is the empty projection.
impl FromStr for Capture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::Columns(Vec::new()));
        }

        let mut columns = Vec::new();

        for (position, token) in s.split(',').enumerate() {
            let column = token
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::new(ErrorKind::InvalidCapture { position }))?;

            columns.push(column);
        }

        Ok(Self::Columns(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_store(fields: &[&str]) -> RowStore {
        let mut row = RowStore::new();

        for field in fields {
            row.append_field(field.as_bytes(), &Capture::All).unwrap();
        }

        row
    }

    #[test]
    fn test_is_selected() {
        assert!(Capture::All.is_selected(0));
        assert!(Capture::All.is_selected(1000));

        let capture = Capture::Columns(vec![2, 0]);
        assert!(capture.is_selected(0));
        assert!(!capture.is_selected(1));
        assert!(capture.is_selected(2));

        assert!(!Capture::Columns(vec![]).is_selected(0));
    }

    #[test]
    fn test_materialize_row() {
        let row = row_store(&["a", "b", "c"]);
        let encoding = FieldEncoding::Text;

        assert_eq!(Capture::All.materialize_row(&row, encoding), brow!["a", "b", "c"]);
        assert_eq!(
            Capture::Columns(vec![2, 0]).materialize_row(&row, encoding),
            brow!["c", "a"]
        );
        assert_eq!(
            Capture::Columns(vec![1, 1, 1]).materialize_row(&row, encoding),
            brow!["b", "b", "b"]
        );
        assert_eq!(
            Capture::Columns(vec![5]).materialize_row(&row, encoding),
            brow![""]
        );
        assert_eq!(Capture::Columns(vec![]).materialize_row(&row, encoding), brow![]);
    }

    #[test]
    fn test_try_from_iter() {
        assert_eq!(
            Capture::try_from_iter([2i64, 0]).unwrap(),
            Capture::Columns(vec![2, 0])
        );
        assert_eq!(
            Capture::try_from_iter(Vec::<u32>::new()).unwrap(),
            Capture::Columns(vec![])
        );

        let err = Capture::try_from_iter([1i32, 4, -3]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidCapture { position: 2 }
        ));
    }

    #[test]
    fn test_from_one_based() {
        assert_eq!(
            Capture::from_one_based([3u32, 1]).unwrap(),
            Capture::Columns(vec![2, 0])
        );
        assert_eq!(
            Capture::from_one_based(Vec::<u32>::new()).unwrap(),
            Capture::Columns(vec![])
        );
        assert!(matches!(
            Capture::from_one_based([1u32, 0]).unwrap_err().kind(),
            ErrorKind::InvalidCapture { position: 1 }
        ));
        assert!(matches!(
            Capture::from_one_based([2i64, -1]).unwrap_err().kind(),
            ErrorKind::InvalidCapture { position: 1 }
        ));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("2,0".parse::<Capture>().unwrap(), Capture::Columns(vec![2, 0]));
        assert_eq!(" 1 , 3 ".parse::<Capture>().unwrap(), Capture::Columns(vec![1, 3]));
        assert_eq!("".parse::<Capture>().unwrap(), Capture::Columns(vec![]));
        assert!("1,-2".parse::<Capture>().is_err());
        assert!("1,,2".parse::<Capture>().is_err());
        assert!("name".parse::<Capture>().is_err());
    }
}
