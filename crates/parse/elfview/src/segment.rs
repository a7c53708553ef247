//! Program headers.

use core::marker::PhantomData;

use crate::bytes::{c_str, to_usize};
use crate::class::ElfClass;
use crate::consts::{PT_DYNAMIC, PT_INTERP, PT_NOTE, SegmentFlags};
use crate::dynamic::{Dynamic, DynamicTable};
use crate::note::Note;
use crate::view::{Accessor, Array, Fixed, List, impl_record};

/// One program header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a, C> {
    raw: Accessor<'a>,
    _class: PhantomData<C>,
}

impl_record!(Segment<'a, C> where C: ElfClass);

impl<C: ElfClass> Fixed for Segment<'_, C> {
    fn stride(&self) -> usize {
        C::PHDR.size
    }
}

impl<'a, C: ElfClass> Segment<'a, C> {
    /// View the program header at `offset` within `image`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            _class: PhantomData,
        }
    }

    /// The image the header lives in.
    #[must_use]
    pub const fn image(&self) -> &'a [u8] {
        self.raw.image()
    }

    /// Segment type (`PT_*`).
    #[must_use]
    pub fn segment_type(&self) -> u32 {
        self.raw.u32(C::PHDR.kind)
    }

    /// Permission flags.
    #[must_use]
    pub fn flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_retain(self.raw.u32(C::PHDR.flags))
    }

    /// Whether the segment is readable.
    #[must_use]
    pub fn readable(&self) -> bool {
        self.flags().contains(SegmentFlags::READ)
    }

    /// Whether the segment is writable.
    #[must_use]
    pub fn writeable(&self) -> bool {
        self.flags().contains(SegmentFlags::WRITE)
    }

    /// Whether the segment is executable.
    #[must_use]
    pub fn executable(&self) -> bool {
        self.flags().contains(SegmentFlags::EXECUTE)
    }

    /// File offset of the contents.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.raw.word::<C>(C::PHDR.offset)
    }

    /// Size of the contents in the file.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.raw.word::<C>(C::PHDR.filesz)
    }

    /// Virtual address.
    #[must_use]
    pub fn virt_addr(&self) -> u64 {
        self.raw.word::<C>(C::PHDR.vaddr)
    }

    /// Size in memory.
    #[must_use]
    pub fn virt_size(&self) -> u64 {
        self.raw.word::<C>(C::PHDR.memsz)
    }

    /// Physical address.
    #[must_use]
    pub fn phys_addr(&self) -> u64 {
        self.raw.word::<C>(C::PHDR.paddr)
    }

    /// Required alignment.
    #[must_use]
    pub fn alignment(&self) -> u64 {
        self.raw.word::<C>(C::PHDR.align)
    }

    /// File contents.
    ///
    /// # Panics
    ///
    /// Panics if the contents extend past the end of the image.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        let start = to_usize(self.offset());
        &self.raw.image()[start..start + to_usize(self.size())]
    }

    /// Interpreter path of a `PT_INTERP` segment, without terminator.
    #[must_use]
    pub fn path(&self) -> Option<&'a [u8]> {
        (self.segment_type() == PT_INTERP).then(|| c_str(self.data(), 0))
    }

    /// Note records of a `PT_NOTE` segment.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `PT_NOTE` segment.
    #[must_use]
    pub fn get_notes(&self) -> List<Note<'a>> {
        assert_eq!(self.segment_type(), PT_NOTE, "not a note segment");
        let start = to_usize(self.offset());
        if self.size() == 0 {
            return List::empty();
        }
        List::bounded(
            Note::new(self.raw.image(), start),
            start + to_usize(self.size()),
        )
    }

    /// Entries of a `PT_DYNAMIC` segment, up to and including `DT_NULL`.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `PT_DYNAMIC` segment.
    #[must_use]
    pub fn get_dynamic(&self, mapped: bool) -> Array<Dynamic<'a, C>> {
        self.get_dynamic_table(mapped).entries()
    }

    /// Resolver for a `PT_DYNAMIC` segment.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `PT_DYNAMIC` segment.
    #[must_use]
    pub fn get_dynamic_table(&self, mapped: bool) -> DynamicTable<'a, C> {
        assert_eq!(self.segment_type(), PT_DYNAMIC, "not a dynamic segment");
        DynamicTable::from_segment(self, mapped)
    }
}
