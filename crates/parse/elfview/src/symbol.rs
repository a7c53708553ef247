//! Symbol table entries.

use core::marker::PhantomData;

use crate::bytes::c_str;
use crate::class::ElfClass;
use crate::consts::{SHN_ABS, SHN_COMMON, SHN_LORESERVE, SHN_UNDEF, STT_GNU_IFUNC};
use crate::elf::Elf;
use crate::section::Section;
use crate::view::{Accessor, Fixed, impl_record};

/// One symbol table entry.
///
/// The symbol carries the image offset of its string table; `0` means the
/// string table is unknown, which also makes the symbol invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'a, C> {
    raw: Accessor<'a>,
    strtab: usize,
    _class: PhantomData<C>,
}

impl_record!(Symbol<'a, C> where C: ElfClass);

impl<C: ElfClass> Fixed for Symbol<'_, C> {
    fn stride(&self) -> usize {
        C::SYM.total
    }
}

impl<'a, C: ElfClass> Symbol<'a, C> {
    /// View the symbol at `offset`, with names in the string table at image
    /// offset `strtab`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize, strtab: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            strtab,
            _class: PhantomData,
        }
    }

    /// Whether the symbol has a string table and any non-zero content.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.strtab != 0
            && (self.value() != 0 || self.size() != 0 || self.info() != 0 || self.other() != 0)
    }

    /// The image the symbol lives in.
    #[must_use]
    pub const fn image(&self) -> &'a [u8] {
        self.raw.image()
    }

    /// Image offset of the associated string table.
    #[must_use]
    pub const fn string_table(&self) -> usize {
        self.strtab
    }

    /// Offset of the name in the string table.
    #[must_use]
    pub fn name_offset(&self) -> u32 {
        self.raw.u32(C::SYM.name)
    }

    /// Symbol name bytes, empty if the symbol has no string table.
    #[must_use]
    pub fn name(&self) -> &'a [u8] {
        if self.strtab == 0 {
            return &[];
        }
        c_str(self.raw.image(), self.strtab + self.name_offset() as usize)
    }

    /// Symbol name as UTF-8, if it is valid UTF-8.
    #[must_use]
    pub fn name_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.name()).ok()
    }

    /// Symbol value, usually a virtual address.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.raw.word::<C>(C::SYM.value)
    }

    /// Size of the object or function.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.raw.word::<C>(C::SYM.size)
    }

    /// Packed binding and type.
    #[must_use]
    pub fn info(&self) -> u8 {
        self.raw.u8(C::SYM.info)
    }

    /// Binding (`STB_*`, upper 4 bits of `st_info`).
    #[must_use]
    pub fn bind(&self) -> u8 {
        self.info() >> 4
    }

    /// Type (`STT_*`, lower 4 bits of `st_info`).
    #[must_use]
    pub fn sym_type(&self) -> u8 {
        self.info() & 0xf
    }

    /// Raw `st_other`.
    #[must_use]
    pub fn other(&self) -> u8 {
        self.raw.u8(C::SYM.other)
    }

    /// Visibility (`STV_*`, lower 2 bits of `st_other`).
    #[must_use]
    pub fn visibility(&self) -> u8 {
        self.other() & 0x3
    }

    /// Index of the section the symbol is defined in, or a `SHN_*` value.
    #[must_use]
    pub fn section_index(&self) -> u16 {
        self.raw.u16(C::SYM.shndx)
    }

    /// The section the symbol is defined in, read from the section headers
    /// of the image. `None` for undefined symbols and reserved indices.
    #[must_use]
    pub fn section(&self) -> Option<Section<'a, C>> {
        match self.section_index() {
            SHN_UNDEF => None,
            index if index >= SHN_LORESERVE => None,
            index => Elf::<C>::new(self.raw.image())
                .sections()
                .try_get(usize::from(index)),
        }
    }

    /// Whether the symbol is undefined here.
    #[must_use]
    pub fn undefined(&self) -> bool {
        self.section_index() == SHN_UNDEF
    }

    /// Whether the symbol value is absolute.
    #[must_use]
    pub fn absolute(&self) -> bool {
        self.section_index() == SHN_ABS
    }

    /// Whether the symbol is a common block.
    #[must_use]
    pub fn common(&self) -> bool {
        self.section_index() == SHN_COMMON
    }

    /// Whether the symbol is an indirect function.
    #[must_use]
    pub fn indirect(&self) -> bool {
        self.sym_type() == STT_GNU_IFUNC
    }
}
