use crate::records::Row;

/// Maximum number of rows a single driver call can produce.
pub const MAX_ROWS_PER_BATCH: usize = 64;

/// Rows completed during one driver call.
#[derive(Debug, Default)]
pub(crate) struct BatchSink {
    rows: Vec<Row>,
}

impl BatchSink {
    pub(crate) fn begin_batch() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Panics if the batch is already full: chunk sizes are chosen so that
    /// no input can ever fill it, so getting here means that relationship
    /// was broken.
    #[inline]
    pub(crate) fn push_row(&mut self, row: Row) {
        assert!(
            self.rows.len() < MAX_ROWS_PER_BATCH,
            "batch overflow: a single chunk completed more than {} rows",
            MAX_ROWS_PER_BATCH
        );

        self.rows.push(row);
    }

    #[inline]
    pub(crate) fn drain(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.rows)
    }
}
