//! Mapping between positions in a rendered dump (line, character column) and linear
//! byte offsets in the source.

use crate::formatter::{ADDRESS_COLUMN_WIDTH, DisplayLayout};

/// Bidirectional offset <-> position index for one layout and source length.
/// Must be rebuilt when either changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewIndex {
    layout: DisplayLayout,
    source_len: usize,
}

impl ViewIndex {
    #[must_use]
    pub const fn new(layout: DisplayLayout, source_len: usize) -> Self {
        Self { layout, source_len }
    }

    #[must_use]
    pub const fn layout(&self) -> DisplayLayout {
        self.layout
    }

    #[must_use]
    pub const fn source_len(&self) -> usize {
        self.source_len
    }

    /// Number of rendered lines.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.source_len.div_ceil(self.layout.bytes_per_line())
    }

    /// Column of the first hex digit of byte `byte_index` within a line.
    /// Every completed group before the byte adds one extra separator space.
    ///
    /// # Example
    /// ```
    /// use romdumplib::{DisplayLayout, ViewIndex};
    ///
    /// let view = ViewIndex::new(DisplayLayout::default(), 256);
    /// assert_eq!(view.offset_to_column(0), 10);
    /// assert_eq!(view.offset_to_column(7), 31);
    /// assert_eq!(view.offset_to_column(8), 35);
    /// ```
    #[must_use]
    pub const fn offset_to_column(&self, byte_index: usize) -> usize {
        ADDRESS_COLUMN_WIDTH + byte_index * 3 + byte_index / self.layout.group_size()
    }

    /// Column at which byte `byte_index` is shown in the ASCII column.
    #[must_use]
    pub const fn offset_to_ascii_column(&self, byte_index: usize) -> usize {
        self.layout.ascii_column() + byte_index
    }

    /// Linear offset of the byte shown at `column` of line `line`.
    ///
    /// Returns `None` inside the address column, on padding, past the end of the
    /// rendered line, or when the offset lies beyond the source.
    #[must_use]
    pub fn column_to_offset(&self, line: usize, column: usize) -> Option<usize> {
        if column < ADDRESS_COLUMN_WIDTH {
            return None;
        }
        let byte_index = self.byte_index_at(column)?;
        let offset = line
            .checked_mul(self.layout.bytes_per_line())?
            .checked_add(byte_index)?;

        (offset < self.source_len).then_some(offset)
    }

    #[must_use]
    pub const fn line_for_offset(&self, offset: usize) -> usize {
        offset / self.layout.bytes_per_line()
    }

    /// Line and hex column of the byte at `offset`, if it lies within the source.
    #[must_use]
    pub const fn position_for_offset(&self, offset: usize) -> Option<(usize, usize)> {
        if offset >= self.source_len {
            return None;
        }
        let bpl = self.layout.bytes_per_line();
        Some((offset / bpl, self.offset_to_column(offset % bpl)))
    }

    fn byte_index_at(&self, column: usize) -> Option<usize> {
        let bpl = self.layout.bytes_per_line();
        let group_size = self.layout.group_size();

        let ascii = self.layout.ascii_column();
        if column >= ascii {
            let index = column - ascii;
            return (index < bpl).then_some(index);
        }

        // A group spans "XX " per byte plus one extra separator space
        let stride = group_size * 3 + 1;
        let rel = column - ADDRESS_COLUMN_WIDTH;
        let within = ((rel % stride) / 3).min(group_size - 1);
        let index = (rel / stride) * group_size + within;

        (index < bpl).then_some(index)
    }
}
