use crate::error;

const CELL_ALIGNMENT: usize = 16;

#[inline]
fn align_cell_size(size: usize) -> usize {
    size
        .div_ceil(CELL_ALIGNMENT)
        .saturating_mul(CELL_ALIGNMENT)
}

/// Growable storage for the raw bytes of a single field.
///
/// Capacity is always a multiple of 16 bytes and never shrinks, so a cell
/// reused row after row stops allocating once it has seen its widest value.
#[derive(Debug, Default)]
pub(crate) struct FieldCell {
    data: Vec<u8>,
}

impl FieldCell {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    pub(crate) fn ensure_capacity(&mut self, size: usize) -> error::Result<()> {
        if self.data.capacity() >= size {
            return Ok(());
        }

        // Old contents are never needed once a cell must grow: drop them
        // instead of letting the allocator copy them around.
        self.data = Vec::new();
        self.data.try_reserve_exact(align_cell_size(size))?;

        Ok(())
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) -> error::Result<()> {
        self.data.clear();
        self.ensure_capacity(bytes.len())?;
        self.data.extend_from_slice(bytes);

        Ok(())
    }
}
