use crate::capture::Capture;
use crate::cell::FieldCell;
use crate::error;

const ROW_GROWTH: usize = 5;

/// Storage for the row currently being tokenized.
///
/// Cells are allocated in slices of 5 and kept for the whole session, so their
/// own buffers are reused from one row to the next. Only `used` is reset
/// when a row completes.
#[derive(Debug, Default)]
pub(crate) struct RowStore {
    cells: Vec<FieldCell>,
    used: usize,
}

impl RowStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of fields seen so far in the current row, including the ones
    /// that were not captured.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.used
    }

    #[cfg(test)]
    pub(crate) fn allocated(&self) -> usize {
        self.cells.len()
    }

    fn ensure_slot(&mut self) -> error::Result<()> {
        if self.used < self.cells.len() {
            return Ok(());
        }

        self.cells.try_reserve_exact(ROW_GROWTH)?;
        self.cells.resize_with(self.cells.len() + ROW_GROWTH, FieldCell::new);

        Ok(())
    }

    /// Records the next field of the current row. Its bytes are only copied
    /// when the capture needs them, but the column always counts.
    pub(crate) fn append_field(&mut self, bytes: &[u8], capture: &Capture) -> error::Result<()> {
        self.ensure_slot()?;

        let cell = &mut self.cells[self.used];

        if capture.is_selected(self.used) {
            cell.write(bytes)?;
        } else {
            // Never let a previous row's value leak if the capture changes
            // while this row is still in progress.
            cell.clear();
        }

        self.used += 1;

        Ok(())
    }

    #[inline]
    pub(crate) fn reset_row(&mut self) {
        self.used = 0;
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&[u8]> {
        if index < self.used {
            Some(self.cells[index].as_bytes())
        } else {
            None
        }
    }

    pub(crate) fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.cells[..self.used].iter().map(FieldCell::as_bytes)
    }
}
