//! Note records (`SHT_NOTE` sections and `PT_NOTE` segments).
//!
//! Each record is a 12-byte header (`namesz`, `descsz`, `type`) followed by
//! the name and the descriptor, both padded to four bytes.

use crate::bytes::{align4, c_str};
use crate::view::{Accessor, Linked, impl_record};

const NOTE_HEADER: usize = 12;

/// One note record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note<'a> {
    raw: Accessor<'a>,
}

impl_record!(Note<'a>);

impl<'a> Note<'a> {
    /// View the note at `offset` within `image`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
        }
    }

    /// Length of the name including its terminator.
    #[must_use]
    pub fn name_size(&self) -> usize {
        self.raw.u32(0) as usize
    }

    /// Length of the descriptor.
    #[must_use]
    pub fn description_size(&self) -> usize {
        self.raw.u32(4) as usize
    }

    /// Note type, interpreted relative to the owner name.
    #[must_use]
    pub fn note_type(&self) -> u32 {
        self.raw.u32(8)
    }

    /// Owner name without terminator, `None` for a nameless note.
    #[must_use]
    pub fn name(&self) -> Option<&'a [u8]> {
        let len = self.name_size();
        if len == 0 {
            return None;
        }
        let start = self.raw.offset() + NOTE_HEADER;
        Some(c_str(&self.raw.image()[..start + len], start))
    }

    /// Descriptor bytes.
    #[must_use]
    pub fn description(&self) -> &'a [u8] {
        let start = self.raw.offset() + NOTE_HEADER + align4(self.name_size());
        &self.raw.image()[start..start + self.description_size()]
    }

    /// Total size of the record including padding.
    #[must_use]
    pub fn size(&self) -> usize {
        NOTE_HEADER + align4(self.name_size()) + align4(self.description_size())
    }
}

impl Linked for Note<'_> {
    fn successor(&self) -> Option<usize> {
        Some(self.raw.offset() + self.size())
    }
}
