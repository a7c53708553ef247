//! Section headers and the typed views over section contents.

use core::marker::PhantomData;

use crate::bytes::to_usize;
use crate::class::ElfClass;
use crate::consts::{
    SHN_HIRESERVE, SHN_UNDEF, SHT_DYNAMIC, SHT_DYNSYM, SHT_GNU_HASH, SHT_GNU_VERDEF,
    SHT_GNU_VERNEED, SHT_GNU_VERSYM, SHT_HASH, SHT_NOBITS, SHT_NOTE, SHT_NULL, SHT_REL, SHT_RELA,
    SHT_SYMTAB, SectionFlags,
};
use crate::dynamic::{Dynamic, DynamicTable, scan_entries};
use crate::elf::Elf;
use crate::note::Note;
use crate::reloc::Relocation;
use crate::symbol::Symbol;
use crate::symtab::{Lookup, SymbolTable};
use crate::version::{VersionDefinition, VersionIndex, VersionNeeded};
use crate::view::{Accessor, Array, Fixed, Linked, List, impl_record};

/// One section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a, C> {
    raw: Accessor<'a>,
    _class: PhantomData<C>,
}

impl_record!(Section<'a, C> where C: ElfClass);

impl<C: ElfClass> Fixed for Section<'_, C> {
    fn stride(&self) -> usize {
        C::SHDR.total
    }
}

impl<'a, C: ElfClass> Section<'a, C> {
    /// View the section header at `offset` within `image`.
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

    /// Section type (`SHT_*`).
    #[must_use]
    pub fn section_type(&self) -> u32 {
        self.raw.u32(C::SHDR.kind)
    }

    /// Whether this is the inactive null section.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.section_type() == SHT_NULL
    }

    /// Attribute flags.
    #[must_use]
    pub fn flags(&self) -> SectionFlags {
        SectionFlags::from_bits_retain(self.raw.word::<C>(C::SHDR.flags))
    }

    /// `SHF_WRITE`.
    #[must_use]
    pub fn writeable(&self) -> bool {
        self.flags().contains(SectionFlags::WRITE)
    }

    /// `SHF_ALLOC`.
    #[must_use]
    pub fn allocate(&self) -> bool {
        self.flags().contains(SectionFlags::ALLOC)
    }

    /// `SHF_EXECINSTR`.
    #[must_use]
    pub fn executable(&self) -> bool {
        self.flags().contains(SectionFlags::EXECINSTR)
    }

    /// `SHF_MERGE`.
    #[must_use]
    pub fn merge(&self) -> bool {
        self.flags().contains(SectionFlags::MERGE)
    }

    /// `SHF_STRINGS`.
    #[must_use]
    pub fn strings(&self) -> bool {
        self.flags().contains(SectionFlags::STRINGS)
    }

    /// `SHF_INFO_LINK`.
    #[must_use]
    pub fn info_link(&self) -> bool {
        self.flags().contains(SectionFlags::INFO_LINK)
    }

    /// `SHF_LINK_ORDER`.
    #[must_use]
    pub fn link_order(&self) -> bool {
        self.flags().contains(SectionFlags::LINK_ORDER)
    }

    /// `SHF_OS_NONCONFORMING`.
    #[must_use]
    pub fn os_nonconforming(&self) -> bool {
        self.flags().contains(SectionFlags::OS_NONCONFORMING)
    }

    /// `SHF_GROUP`.
    #[must_use]
    pub fn group(&self) -> bool {
        self.flags().contains(SectionFlags::GROUP)
    }

    /// `SHF_TLS`.
    #[must_use]
    pub fn tls(&self) -> bool {
        self.flags().contains(SectionFlags::TLS)
    }

    /// `SHF_COMPRESSED`.
    #[must_use]
    pub fn compressed(&self) -> bool {
        self.flags().contains(SectionFlags::COMPRESSED)
    }

    /// Offset of the name in the section name string table.
    #[must_use]
    pub fn name_offset(&self) -> u32 {
        self.raw.u32(C::SHDR.name)
    }

    /// Section name, empty if the file has no section name table.
    #[must_use]
    pub fn name(&self) -> &'a [u8] {
        let elf = Elf::<C>::new(self.raw.image());
        match elf.header().sh_string_index() {
            SHN_UNDEF => &[],
            index => {
                let names = elf.sections().get(usize::from(index));
                elf.string(to_usize(names.offset()), self.name_offset() as usize)
            }
        }
    }

    /// Section name as UTF-8, if it is valid UTF-8.
    #[must_use]
    pub fn name_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.name()).ok()
    }

    /// Virtual address once loaded, `0` if not allocated.
    #[must_use]
    pub fn virt_addr(&self) -> u64 {
        self.raw.word::<C>(C::SHDR.addr)
    }

    /// File offset of the contents.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.raw.word::<C>(C::SHDR.offset)
    }

    /// Size of the contents.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.raw.word::<C>(C::SHDR.size)
    }

    /// Index of the linked section.
    ///
    /// # Panics
    ///
    /// Panics if the link does not fit a section index.
    #[must_use]
    pub fn link(&self) -> u16 {
        let link = self.raw.u32(C::SHDR.link);
        match u16::try_from(link) {
            Ok(index) if index <= SHN_HIRESERVE => index,
            _ => panic!("section link {link} out of range"),
        }
    }

    /// Extra information, meaning depends on the type.
    #[must_use]
    pub fn info(&self) -> u32 {
        self.raw.u32(C::SHDR.info)
    }

    /// Required alignment.
    #[must_use]
    pub fn alignment(&self) -> u64 {
        self.raw.word::<C>(C::SHDR.align)
    }

    /// Size of one entry, `0` if the section is not a table.
    #[must_use]
    pub fn entry_size(&self) -> u64 {
        self.raw.word::<C>(C::SHDR.entsize)
    }

    /// Number of entries, `0` if the section is not a table.
    #[must_use]
    pub fn entries(&self) -> usize {
        match self.entry_size() {
            0 => 0,
            entry_size => to_usize(self.size() / entry_size),
        }
    }

    /// Contents in the file, empty for `SHT_NOBITS`.
    ///
    /// # Panics
    ///
    /// Panics if the contents extend past the end of the image.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        if self.section_type() == SHT_NOBITS {
            return &[];
        }
        let start = to_usize(self.offset());
        &self.raw.image()[start..start + to_usize(self.size())]
    }

    /// The contents as a table of `A` records, the first one built by
    /// `first` from the image and the contents' offset.
    ///
    /// # Panics
    ///
    /// Panics if the entry size does not match the record stride.
    #[must_use]
    pub fn get_array<A: Fixed>(&self, first: impl FnOnce(&'a [u8], usize) -> A) -> Array<A> {
        let first = first(self.raw.image(), to_usize(self.offset()));
        assert_eq!(
            to_usize(self.entry_size()),
            first.stride(),
            "section entry size does not match record size"
        );
        Array::new(first, self.entries())
    }

    /// The contents as a chain of `A` records ending at the end of the
    /// section, the first one built by `first` from the image and the
    /// contents' offset.
    #[must_use]
    pub fn get_list<A: Linked>(&self, first: impl FnOnce(&'a [u8], usize) -> A) -> List<A> {
        if self.size() == 0 {
            return List::empty();
        }
        let start = to_usize(self.offset());
        List::bounded(first(self.raw.image(), start), start + to_usize(self.size()))
    }

    /// Number of dynamic entries up to and including the first `DT_NULL`.
    ///
    /// # Panics
    ///
    /// Panics if this is not a dynamic section or the entry size does not
    /// match the class.
    #[must_use]
    pub fn dynamic_entries(&self) -> usize {
        self.expect_table(SHT_DYNAMIC, C::DYN_SIZE);
        scan_entries::<C>(self.raw.image(), to_usize(self.offset()), self.entries())
    }

    /// Note records of an `SHT_NOTE` section.
    ///
    /// # Panics
    ///
    /// Panics if this is not a note section.
    #[must_use]
    pub fn get_notes(&self) -> List<Note<'a>> {
        assert_eq!(self.section_type(), SHT_NOTE, "not a note section");
        self.get_list(Note::new)
    }

    /// Version indices of an `SHT_GNU_VERSYM` section.
    ///
    /// # Panics
    ///
    /// Panics if this is not a version index section.
    #[must_use]
    pub fn get_versions(&self) -> Array<VersionIndex<'a>> {
        assert_eq!(self.section_type(), SHT_GNU_VERSYM, "not a version index section");
        self.get_array(VersionIndex::new)
    }

    /// Version definitions of an `SHT_GNU_VERDEF` section.
    ///
    /// # Panics
    ///
    /// Panics if this is not a version definition section.
    #[must_use]
    pub fn get_version_definition(&self) -> List<VersionDefinition<'a>> {
        assert_eq!(self.section_type(), SHT_GNU_VERDEF, "not a version definition section");
        if self.size() == 0 {
            return List::empty();
        }
        List::new(VersionDefinition::new(
            self.raw.image(),
            to_usize(self.offset()),
            self.linked_offset(),
        ))
    }

    /// Version requirements of an `SHT_GNU_VERNEED` section.
    ///
    /// # Panics
    ///
    /// Panics if this is not a version requirement section.
    #[must_use]
    pub fn get_version_needed(&self) -> List<VersionNeeded<'a>> {
        assert_eq!(self.section_type(), SHT_GNU_VERNEED, "not a version requirement section");
        if self.size() == 0 {
            return List::empty();
        }
        List::new(VersionNeeded::new(
            self.raw.image(),
            to_usize(self.offset()),
            self.linked_offset(),
        ))
    }

    /// Symbols of an `SHT_SYMTAB` or `SHT_DYNSYM` section.
    ///
    /// # Panics
    ///
    /// Panics if this is not a symbol section or the entry size does not
    /// match the class.
    #[must_use]
    pub fn get_symbols(&self) -> Array<Symbol<'a, C>> {
        let kind = self.section_type();
        assert!(kind == SHT_SYMTAB || kind == SHT_DYNSYM, "not a symbol section");
        self.expect_table(kind, C::SYM.total);
        Array::new(
            Symbol::new(self.raw.image(), to_usize(self.offset()), self.linked_offset()),
            self.entries(),
        )
    }

    /// Symbol lookup over this section. Hash sections search the symbol
    /// section they link to; symbol sections are scanned linearly.
    /// `version` is the `SHT_GNU_VERSYM` section to filter versions with.
    ///
    /// # Panics
    ///
    /// Panics if this is neither a symbol nor a hash section.
    #[must_use]
    pub fn get_symbol_table(&self, version: Option<Section<'a, C>>) -> SymbolTable<'a, C> {
        let (symbols, lookup) = match self.section_type() {
            SHT_SYMTAB | SHT_DYNSYM => (self.get_symbols(), Lookup::Linear),
            SHT_HASH => (
                self.linked().get_symbols(),
                Lookup::SysV {
                    table: to_usize(self.offset()),
                },
            ),
            SHT_GNU_HASH => (
                self.linked().get_symbols(),
                Lookup::Gnu {
                    table: to_usize(self.offset()),
                },
            ),
            other => panic!("section type {other:#x} holds no symbols"),
        };
        let versions = version
            .filter(|v| v.section_type() == SHT_GNU_VERSYM)
            .map(|v| {
                Array::new(
                    VersionIndex::new(self.raw.image(), to_usize(v.offset())),
                    symbols.count(),
                )
            });
        SymbolTable::new(symbols, lookup, versions)
    }

    /// Entries of an `SHT_DYNAMIC` section, up to and including `DT_NULL`.
    ///
    /// # Panics
    ///
    /// Panics if this is not a dynamic section.
    #[must_use]
    pub fn get_dynamic(&self) -> Array<Dynamic<'a, C>> {
        self.get_dynamic_table().entries()
    }

    /// Resolver for an `SHT_DYNAMIC` section.
    ///
    /// # Panics
    ///
    /// Panics if this is not a dynamic section.
    #[must_use]
    pub fn get_dynamic_table(&self) -> DynamicTable<'a, C> {
        assert_eq!(self.section_type(), SHT_DYNAMIC, "not a dynamic section");
        DynamicTable::from_section(self)
    }

    /// Relocations of an `SHT_REL` or `SHT_RELA` section; empty for the null
    /// section.
    ///
    /// # Panics
    ///
    /// Panics for any other section type, or if the entry size does not
    /// match the class.
    #[must_use]
    pub fn get_relocations(&self) -> Array<Relocation<'a, C>> {
        let image = self.raw.image();
        let rela = match self.section_type() {
            SHT_NULL => return Array::empty(Relocation::new(image, 0, 0, 0, false)),
            SHT_RELA => true,
            SHT_REL => false,
            other => panic!("section type {other:#x} holds no relocations"),
        };
        let kind = self.section_type();
        self.expect_table(kind, if rela { C::RELA_SIZE } else { C::REL_SIZE });
        let symbols = self.linked();
        let symtab = to_usize(symbols.offset());
        let strtab = symbols.linked_offset();
        Array::new(
            Relocation::new(image, to_usize(self.offset()), symtab, strtab, rela),
            self.entries(),
        )
    }

    fn linked(&self) -> Section<'a, C> {
        Elf::<C>::new(self.raw.image())
            .sections()
            .get(usize::from(self.link()))
    }

    /// Image offset of the linked section, `0` when there is no link.
    fn linked_offset(&self) -> usize {
        match self.link() {
            SHN_UNDEF => 0,
            _ => to_usize(self.linked().offset()),
        }
    }

    fn expect_table(&self, kind: u32, entry_size: usize) {
        assert_eq!(self.section_type(), kind, "unexpected section type");
        assert_eq!(
            to_usize(self.entry_size()),
            entry_size,
            "section entry size does not match record size"
        );
    }
}
