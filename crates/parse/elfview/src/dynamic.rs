//! Dynamic table entries and the dynamic table resolver.
//!
//! Values in the dynamic table are virtual addresses. How they map to
//! offsets in the image being read depends on where the image came from:
//!
//! - an unmapped file: addresses are translated through the `PT_LOAD`
//!   segments to file offsets ([`Translation::FileOffset`]);
//! - a mapped position-independent object: the image starts at virtual
//!   address 0 ([`Translation::Direct`]);
//! - a mapped `ET_EXEC`: addresses are absolute and the image starts at
//!   its own host address ([`Translation::Rebase`]).

use core::fmt;
use core::marker::PhantomData;

use crate::bytes::{c_str, to_usize};
use crate::class::ElfClass;
use crate::consts::{
    DT_FINI, DT_FINI_ARRAY, DT_FINI_ARRAYSZ, DT_FLAGS, DT_FLAGS_1, DT_GNU_HASH, DT_HASH, DT_INIT,
    DT_INIT_ARRAY, DT_INIT_ARRAYSZ, DT_JMPREL, DT_NEEDED, DT_NULL, DT_PLTGOT, DT_PLTREL,
    DT_PLTRELSZ, DT_PREINIT_ARRAY, DT_PREINIT_ARRAYSZ, DT_REL, DT_RELA, DT_RELAENT, DT_RELASZ,
    DT_RELENT, DT_RELSZ, DT_RPATH, DT_RUNPATH, DT_SONAME, DT_STRTAB, DT_SYMENT, DT_SYMTAB,
    DT_VERDEF, DT_VERDEFNUM, DT_VERNEED, DT_VERNEEDNUM, DT_VERSYM, DynamicFlags, DynamicFlags1,
    ET_EXEC, SHT_STRTAB, VER_NDX_ELIMINATE, VER_NDX_GLOBAL, VER_NDX_LOCAL,
};
use crate::elf::Elf;
use crate::hash::{GnuHash, SysvHash};
use crate::reloc::Relocation;
use crate::section::Section;
use crate::segment::Segment;
use crate::symbol::Symbol;
use crate::symtab::{Lookup, SymbolTable};
use crate::version::{VersionDefinition, VersionIndex, VersionNeeded};
use crate::view::{Accessor, Address, Array, ArrayIter, Fixed, Linked, List, impl_record};

// ---------------------------------------------------------------------------
// Dynamic entry
// ---------------------------------------------------------------------------

/// One dynamic table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dynamic<'a, C> {
    raw: Accessor<'a>,
    strtab: usize,
    _class: PhantomData<C>,
}

impl_record!(Dynamic<'a, C> where C: ElfClass);

impl<C: ElfClass> Fixed for Dynamic<'_, C> {
    fn stride(&self) -> usize {
        C::DYN_SIZE
    }
}

impl<'a, C: ElfClass> Dynamic<'a, C> {
    /// View the entry at `offset`, with strings in the table at image
    /// offset `strtab` (`0` if unknown).
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize, strtab: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            strtab,
            _class: PhantomData,
        }
    }

    /// Whether the entry knows its string table.
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.strtab != 0
    }

    /// Entry tag (`DT_*`).
    #[must_use]
    pub fn tag(&self) -> i64 {
        self.raw.sword::<C>(0)
    }

    /// Entry value or address.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.raw.word::<C>(C::WORD)
    }

    /// The value read as a string table offset.
    ///
    /// # Panics
    ///
    /// Panics if the entry does not know its string table.
    #[must_use]
    pub fn string(&self) -> &'a [u8] {
        assert!(self.valid(), "dynamic entry has no string table");
        let offset = usize::try_from(self.value()).unwrap_or(usize::MAX);
        c_str(self.raw.image(), self.strtab.saturating_add(offset))
    }
}

/// Number of entries of a dynamic table at `offset` with room for
/// `capacity` entries: up to and including the first `DT_NULL`, or all of
/// them if none is found.
pub(crate) fn scan_entries<C: ElfClass>(image: &[u8], offset: usize, capacity: usize) -> usize {
    let Some(limit) = capacity.checked_sub(1) else {
        return 0;
    };
    let mut entries = 0;
    while entries < limit && C::sword(image, offset + entries * C::DYN_SIZE) != DT_NULL {
        entries += 1;
    }
    entries + 1
}

// ---------------------------------------------------------------------------
// Tag-filtered entries
// ---------------------------------------------------------------------------

/// A dynamic entry in a list of entries sharing one tag, such as the
/// `DT_NEEDED` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedEntry<'a, C> {
    raw: Accessor<'a>,
    strtab: usize,
    end: usize,
    _class: PhantomData<C>,
}

impl_record!(TaggedEntry<'a, C> where C: ElfClass);

impl<'a, C: ElfClass> TaggedEntry<'a, C> {
    /// The underlying entry.
    #[must_use]
    pub const fn entry(&self) -> Dynamic<'a, C> {
        Dynamic {
            raw: self.raw,
            strtab: self.strtab,
            _class: PhantomData,
        }
    }

    /// Entry value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.entry().value()
    }

    /// Entry value as a string.
    ///
    /// # Panics
    ///
    /// Panics if the entry does not know its string table.
    #[must_use]
    pub fn string(&self) -> &'a [u8] {
        self.entry().string()
    }
}

impl<C: ElfClass> Linked for TaggedEntry<'_, C> {
    fn successor(&self) -> Option<usize> {
        let tag = self.entry().tag();
        let mut offset = self.raw.offset() + C::DYN_SIZE;
        while offset < self.end {
            match C::sword(self.raw.image(), offset) {
                DT_NULL => return None,
                t if t == tag => return Some(offset),
                _ => offset += C::DYN_SIZE,
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Address translation
// ---------------------------------------------------------------------------

/// How dynamic table addresses map to image offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// The address is the image offset.
    Direct,
    /// Subtract this base (the image's host address) from the address.
    Rebase(u64),
    /// Translate through the `PT_LOAD` segments to a file offset.
    FileOffset,
}

// ---------------------------------------------------------------------------
// DynamicTable
// ---------------------------------------------------------------------------

/// The dynamic table of an object with address translation and typed
/// accessors for the tables it points to.
#[derive(Clone, Copy)]
pub struct DynamicTable<'a, C> {
    elf: Elf<'a, C>,
    entries: Array<Dynamic<'a, C>>,
    translation: Translation,
}

impl<C: ElfClass> fmt::Debug for DynamicTable<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicTable")
            .field("entries", &self.entries)
            .field("translation", &self.translation)
            .finish_non_exhaustive()
    }
}

impl<'a, C: ElfClass> DynamicTable<'a, C> {
    /// A table without entries.
    #[must_use]
    pub fn empty(elf: Elf<'a, C>) -> Self {
        Self {
            elf,
            entries: Array::empty(Dynamic::new(elf.data(), 0, 0)),
            translation: Translation::Direct,
        }
    }

    /// The table referenced by a `PT_DYNAMIC` segment.
    ///
    /// `mapped` tells whether the image is laid out as in memory (each
    /// segment at its virtual address) or as the file.
    ///
    /// # Panics
    ///
    /// Panics if an address cannot be translated.
    #[must_use]
    pub fn from_segment(segment: &Segment<'a, C>, mapped: bool) -> Self {
        let elf = Elf::new(segment.image());
        let translation = if !mapped {
            Translation::FileOffset
        } else if elf.header().elf_type() == ET_EXEC {
            Translation::Rebase(elf.data().as_ptr() as u64)
        } else {
            Translation::Direct
        };
        let mut table = Self {
            elf,
            entries: Array::empty(Dynamic::new(elf.data(), 0, 0)),
            translation,
        };
        let start = if mapped {
            table.resolve(segment.virt_addr())
        } else {
            to_usize(segment.offset())
        };
        let capacity = to_usize(segment.size()) / C::DYN_SIZE;
        let count = scan_entries::<C>(elf.data(), start, capacity);
        table.entries = Array::new(Dynamic::new(elf.data(), start, 0), count);
        let strtab = table.address(DT_STRTAB).unwrap_or(0);
        table.entries = Array::new(Dynamic::new(elf.data(), start, strtab), count);
        log::trace!(
            "dynamic table at {start:#x}: {count} entries, {:?}, strtab {strtab:#x}",
            table.translation
        );
        table
    }

    /// The table held by an `SHT_DYNAMIC` section of an unmapped file.
    ///
    /// # Panics
    ///
    /// Panics if the section's link is out of range or not a string table,
    /// or its entry size does not match the class.
    #[must_use]
    pub fn from_section(section: &Section<'a, C>) -> Self {
        let elf = Elf::new(section.image());
        let translation = if section.virt_addr() == section.offset() {
            Translation::Direct
        } else {
            Translation::FileOffset
        };
        let strings = elf.sections().get(usize::from(section.link()));
        assert_eq!(
            strings.section_type(),
            SHT_STRTAB,
            "dynamic section does not link a string table"
        );
        let strtab = to_usize(strings.offset());
        let start = to_usize(section.offset());
        let count = section.dynamic_entries();
        log::trace!("dynamic section at {start:#x}: {count} entries, {translation:?}");
        Self {
            elf,
            entries: Array::new(Dynamic::new(elf.data(), start, strtab), count),
            translation,
        }
    }

    /// The object this table belongs to.
    #[must_use]
    pub const fn elf(&self) -> Elf<'a, C> {
        self.elf
    }

    /// The entries, up to and including the terminating `DT_NULL`.
    #[must_use]
    pub const fn entries(&self) -> Array<Dynamic<'a, C>> {
        self.entries
    }

    /// Number of entries, including the terminating `DT_NULL`.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.entries.count()
    }

    /// Whether the object has no dynamic table.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = Dynamic<'a, C>> + 'a {
        self.entries.iter()
    }

    /// The address translation in use.
    #[must_use]
    pub const fn translation(&self) -> Translation {
        self.translation
    }

    /// Image offset of the string table, `0` if there is none.
    #[must_use]
    pub fn string_table(&self) -> usize {
        self.entries.template().strtab
    }

    /// Image offset for the virtual address `address`.
    ///
    /// # Panics
    ///
    /// Panics if the address is not backed by the image: below the rebase
    /// base, or outside the file part of every `PT_LOAD` segment.
    #[must_use]
    pub fn resolve(&self, address: u64) -> usize {
        match self.translation {
            Translation::Direct => to_usize(address),
            Translation::Rebase(base) => match address.checked_sub(base) {
                Some(offset) => to_usize(offset),
                None => panic!("address {address:#x} below image base {base:#x}"),
            },
            Translation::FileOffset => match self.elf.file_offset(address) {
                Some(offset) => offset,
                None => panic!("address {address:#x} is not backed by file contents"),
            },
        }
    }

    /// The first entry with `tag`.
    #[must_use]
    pub fn get(&self, tag: i64) -> Option<Dynamic<'a, C>> {
        self.iter().find(|d| d.tag() == tag)
    }

    /// Value of the first entry with `tag`.
    #[must_use]
    pub fn value(&self, tag: i64) -> Option<u64> {
        self.get(tag).map(|d| d.value())
    }

    /// Image offset of the address held by the first entry with `tag`.
    #[must_use]
    pub fn address(&self, tag: i64) -> Option<usize> {
        self.value(tag).map(|v| self.resolve(v))
    }

    /// `DT_SONAME`, the object's own name.
    #[must_use]
    pub fn get_soname(&self) -> Option<&'a [u8]> {
        self.get(DT_SONAME).map(|d| d.string())
    }

    /// `DT_NEEDED` entries, one per needed library.
    #[must_use]
    pub fn get_needed(&self) -> List<TaggedEntry<'a, C>> {
        self.tagged(DT_NEEDED)
    }

    /// `DT_RPATH` entries.
    #[must_use]
    pub fn get_rpath(&self) -> List<TaggedEntry<'a, C>> {
        self.tagged(DT_RPATH)
    }

    /// `DT_RUNPATH` entries.
    #[must_use]
    pub fn get_runpath(&self) -> List<TaggedEntry<'a, C>> {
        self.tagged(DT_RUNPATH)
    }

    /// Names of the needed libraries that are valid UTF-8.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn needed_names(&self) -> alloc::vec::Vec<&'a str> {
        self.get_needed()
            .iter()
            .filter_map(|n| core::str::from_utf8(n.string()).ok())
            .collect()
    }

    /// `DT_FLAGS`.
    #[must_use]
    pub fn flags(&self) -> DynamicFlags {
        DynamicFlags::from_bits_retain(self.value(DT_FLAGS).unwrap_or(0))
    }

    /// `DT_FLAGS_1`.
    #[must_use]
    pub fn flags_1(&self) -> DynamicFlags1 {
        DynamicFlags1::from_bits_retain(self.value(DT_FLAGS_1).unwrap_or(0))
    }

    /// The dynamic symbols.
    ///
    /// # Panics
    ///
    /// Panics if `DT_SYMTAB` is present without `DT_HASH` or `DT_GNU_HASH`,
    /// or `DT_SYMENT` does not match the class.
    #[must_use]
    pub fn get_symbols(&self) -> Array<Symbol<'a, C>> {
        self.symbol_layout()
            .map_or_else(|| self.no_symbols(), |(symbols, _)| symbols)
    }

    /// The dynamic symbols with hash lookup. The GNU hash table is used
    /// when present, the SysV one otherwise.
    ///
    /// # Panics
    ///
    /// Same conditions as [`get_symbols`](Self::get_symbols).
    #[must_use]
    pub fn get_symbol_table(&self) -> SymbolTable<'a, C> {
        match self.symbol_layout() {
            Some((symbols, lookup)) => {
                let versions = self.address(DT_VERSYM).map(|offset| {
                    Array::new(VersionIndex::new(self.elf.data(), offset), symbols.count())
                });
                SymbolTable::new(symbols, lookup, versions)
            }
            None => SymbolTable::empty(self.elf.data()),
        }
    }

    /// The version index table, parallel to the dynamic symbols.
    #[must_use]
    pub fn get_versions(&self) -> Option<Array<VersionIndex<'a>>> {
        self.get_symbol_table().versions()
    }

    /// Version definitions (`DT_VERDEF`).
    ///
    /// # Panics
    ///
    /// Panics if the list length disagrees with `DT_VERDEFNUM`.
    #[must_use]
    pub fn get_version_definition(&self) -> List<VersionDefinition<'a>> {
        let Some(offset) = self.address(DT_VERDEF) else {
            return List::empty();
        };
        let list = List::new(VersionDefinition::new(
            self.elf.data(),
            offset,
            self.string_table(),
        ));
        if let Some(expected) = self.value(DT_VERDEFNUM) {
            assert_eq!(list.count() as u64, expected, "DT_VERDEFNUM mismatch");
        }
        list
    }

    /// Version requirements (`DT_VERNEED`).
    ///
    /// # Panics
    ///
    /// Panics if the list length disagrees with `DT_VERNEEDNUM`.
    #[must_use]
    pub fn get_version_needed(&self) -> List<VersionNeeded<'a>> {
        let Some(offset) = self.address(DT_VERNEED) else {
            return List::empty();
        };
        let list = List::new(VersionNeeded::new(
            self.elf.data(),
            offset,
            self.string_table(),
        ));
        if let Some(expected) = self.value(DT_VERNEEDNUM) {
            assert_eq!(list.count() as u64, expected, "DT_VERNEEDNUM mismatch");
        }
        list
    }

    /// Version index assigned to the version called `name`: requirements
    /// are searched first, then non-base definitions. `VER_NDX_GLOBAL` if
    /// no version has that name.
    #[must_use]
    pub fn version_index(&self, name: &str) -> u16 {
        let name = name.as_bytes();
        let needed = self
            .get_version_needed()
            .iter()
            .flat_map(|n| n.auxiliary().iter())
            .find(|aux| aux.name() == name)
            .map(|aux| aux.version_index());
        let defined = || {
            self.get_version_definition()
                .iter()
                .filter(|d| !d.base())
                .find(|d| d.name() == Some(name))
                .map(|d| d.version_index())
        };
        needed.or_else(defined).unwrap_or(VER_NDX_GLOBAL)
    }

    /// Name of version index `index`. Reserved indices get bracketed
    /// pseudo names; unknown ones `*invalid*`.
    #[must_use]
    pub fn version_name(&self, index: u16) -> &'a [u8] {
        match index {
            VER_NDX_LOCAL => return b"*local*",
            VER_NDX_GLOBAL => return b"*global*",
            VER_NDX_ELIMINATE => return b"*eliminate*",
            _ => {}
        }
        let needed = self
            .get_version_needed()
            .iter()
            .flat_map(|n| n.auxiliary().iter())
            .find(|aux| aux.version_index() == index)
            .map(|aux| aux.name());
        let defined = || {
            self.get_version_definition()
                .iter()
                .find(|d| d.version_index() == index)
                .and_then(|d| d.name())
        };
        needed.or_else(defined).unwrap_or(b"*invalid*")
    }

    /// Relocations of `DT_REL` or `DT_RELA`.
    ///
    /// # Panics
    ///
    /// Panics if `REL` and `RELA` tags are mixed, the entry size does not
    /// match the class, or the table is declared without symbol and string
    /// tables.
    #[must_use]
    pub fn get_relocations(&self) -> Array<Relocation<'a, C>> {
        let mut with_addend = None;
        let mut table = None;
        let mut size = 0;
        let mut entry_size = 0;
        let mut kind = |rela: bool| {
            assert!(
                with_addend.is_none_or(|current| current == rela),
                "dynamic table mixes DT_REL and DT_RELA"
            );
            with_addend = Some(rela);
        };
        for entry in self.iter() {
            match entry.tag() {
                DT_REL | DT_RELA => {
                    kind(entry.tag() == DT_RELA);
                    table = Some(self.resolve(entry.value()));
                }
                DT_RELSZ | DT_RELASZ => {
                    kind(entry.tag() == DT_RELASZ);
                    size = to_usize(entry.value());
                }
                DT_RELENT => {
                    kind(false);
                    entry_size = to_usize(entry.value());
                    assert_eq!(entry_size, C::REL_SIZE, "DT_RELENT mismatch");
                }
                DT_RELAENT => {
                    kind(true);
                    entry_size = to_usize(entry.value());
                    assert_eq!(entry_size, C::RELA_SIZE, "DT_RELAENT mismatch");
                }
                DT_SYMENT => {
                    assert_eq!(to_usize(entry.value()), C::SYM.total, "DT_SYMENT mismatch");
                }
                _ => {}
            }
        }
        match (with_addend, table) {
            (Some(rela), Some(offset)) => {
                assert!(entry_size != 0, "relocation table without entry size");
                self.relocation_array(offset, rela, size / entry_size)
            }
            (None, None) => self.relocation_array(0, false, 0),
            _ => panic!("incomplete relocation table in dynamic section"),
        }
    }

    /// PLT relocations (`DT_JMPREL`).
    ///
    /// # Panics
    ///
    /// Panics if `DT_PLTREL` is neither `DT_REL` nor `DT_RELA`, or the table
    /// is declared without its address.
    #[must_use]
    pub fn get_relocations_plt(&self) -> Array<Relocation<'a, C>> {
        let size = self.value(DT_PLTRELSZ).map_or(0, to_usize);
        match (self.value(DT_PLTREL), self.address(DT_JMPREL)) {
            (None, None) => self.relocation_array(0, false, 0),
            (Some(kind), Some(offset)) => {
                let rela = match i64::try_from(kind) {
                    Ok(DT_RELA) => true,
                    Ok(DT_REL) => false,
                    _ => panic!("invalid DT_PLTREL value {kind}"),
                };
                let entry_size = if rela { C::RELA_SIZE } else { C::REL_SIZE };
                self.relocation_array(offset, rela, size / entry_size)
            }
            _ => panic!("incomplete PLT relocation table in dynamic section"),
        }
    }

    /// `DT_PREINIT_ARRAY` function addresses.
    #[must_use]
    pub fn get_preinit_array(&self) -> Array<Address<'a, C>> {
        self.address_array(DT_PREINIT_ARRAY, DT_PREINIT_ARRAYSZ)
    }

    /// `DT_INIT_ARRAY` function addresses.
    #[must_use]
    pub fn get_init_array(&self) -> Array<Address<'a, C>> {
        self.address_array(DT_INIT_ARRAY, DT_INIT_ARRAYSZ)
    }

    /// `DT_FINI_ARRAY` function addresses.
    #[must_use]
    pub fn get_fini_array(&self) -> Array<Address<'a, C>> {
        self.address_array(DT_FINI_ARRAY, DT_FINI_ARRAYSZ)
    }

    /// Address of the `DT_INIT` function once loaded at `base`.
    #[must_use]
    pub fn get_init_function(&self, base: u64) -> Option<u64> {
        self.value(DT_INIT).map(|v| v.wrapping_add(base))
    }

    /// Address of the `DT_FINI` function once loaded at `base`.
    #[must_use]
    pub fn get_fini_function(&self, base: u64) -> Option<u64> {
        self.value(DT_FINI).map(|v| v.wrapping_add(base))
    }

    /// The global offset table: three reserved words plus one per PLT
    /// relocation. Empty without PLT relocations.
    ///
    /// # Panics
    ///
    /// Panics if `DT_PLTREL` holds an invalid value.
    #[must_use]
    pub fn get_global_offset_table(&self) -> Array<Address<'a, C>> {
        let relocations = self.get_relocations_plt().count();
        match self.address(DT_PLTGOT) {
            Some(offset) if relocations > 0 => {
                Array::new(Address::new(self.elf.data(), offset), 3 + relocations)
            }
            _ => Array::empty(Address::new(self.elf.data(), 0)),
        }
    }

    fn tagged(&self, tag: i64) -> List<TaggedEntry<'a, C>> {
        let end = self.entries.position() + self.count() * C::DYN_SIZE;
        match self.iter().find(|d| d.tag() == tag) {
            Some(first) => List::bounded(
                TaggedEntry {
                    raw: first.raw,
                    strtab: first.strtab,
                    end,
                    _class: PhantomData,
                },
                end,
            ),
            None => List::empty(),
        }
    }

    fn no_symbols(&self) -> Array<Symbol<'a, C>> {
        Array::empty(Symbol::new(self.elf.data(), 0, self.string_table()))
    }

    fn symbol_layout(&self) -> Option<(Array<Symbol<'a, C>>, Lookup)> {
        let symtab = self.address(DT_SYMTAB)?;
        if let Some(entry_size) = self.value(DT_SYMENT) {
            assert_eq!(to_usize(entry_size), C::SYM.total, "DT_SYMENT mismatch");
        }
        let (count, lookup) = if let Some(table) = self.address(DT_GNU_HASH) {
            (
                GnuHash::<C>::new(self.elf.data(), table).symbol_count(),
                Lookup::Gnu { table },
            )
        } else if let Some(table) = self.address(DT_HASH) {
            (
                SysvHash::new(self.elf.data(), table).symbol_count(),
                Lookup::SysV { table },
            )
        } else {
            panic!("dynamic symbol table without DT_HASH or DT_GNU_HASH");
        };
        log::debug!("dynamic symbol table at {symtab:#x}: {count} symbols, {lookup:?}");
        let first = Symbol::new(self.elf.data(), symtab, self.string_table());
        Some((Array::new(first, count), lookup))
    }

    fn relocation_array(&self, offset: usize, rela: bool, count: usize) -> Array<Relocation<'a, C>> {
        let symtab = if count > 0 {
            self.address(DT_SYMTAB).unwrap_or(0)
        } else {
            0
        };
        let strtab = self.string_table();
        assert!(
            count == 0 || (symtab != 0 && strtab != 0),
            "relocations without symbol or string table"
        );
        Array::new(
            Relocation::new(self.elf.data(), offset, symtab, strtab, rela),
            count,
        )
    }

    fn address_array(&self, tag: i64, size_tag: i64) -> Array<Address<'a, C>> {
        match self.address(tag) {
            Some(offset) => {
                let count = self.value(size_tag).map_or(0, to_usize) / C::WORD;
                Array::new(Address::new(self.elf.data(), offset), count)
            }
            None => Array::empty(Address::new(self.elf.data(), 0)),
        }
    }
}

impl<'a, C: ElfClass> IntoIterator for &DynamicTable<'a, C> {
    type Item = Dynamic<'a, C>;
    type IntoIter = ArrayIter<Dynamic<'a, C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{Class32, Class64};
    use crate::consts::{
        EM_X86_64, ET_DYN, PT_DYNAMIC, R_386_RELATIVE, R_X86_64_GLOB_DAT, R_X86_64_RELATIVE,
        SHN_UNDEF,
    };
    use crate::symtab::SymbolVersion;
    use crate::testutil::{DSO_BIAS, Dso, GLIBC, ImageBuilder, Phdr, VERS_1, VERS_2, dynamic};

    fn strings<C: ElfClass>(list: List<TaggedEntry<'_, C>>) -> Vec<&[u8]> {
        list.iter().map(|e| e.string()).collect()
    }

    fn scan_stops_at_first_null<C: ElfClass>() {
        let dso = Dso::shared::<C>();
        let elf = Elf::<C>::new(&dso.image);
        let table = elf.dynamic(false);
        assert_eq!(table.translation(), Translation::FileOffset);
        assert_eq!(table.count(), dso.dynamic_entries);
        assert_eq!(table.entries().get(table.count() - 1).tag(), DT_NULL);
        assert_eq!(table.iter().filter(|d| d.tag() == DT_NULL).count(), 1);
    }

    #[test]
    fn scan_stops_at_first_null_64() {
        scan_stops_at_first_null::<Class64>();
    }

    #[test]
    fn scan_stops_at_first_null_32() {
        scan_stops_at_first_null::<Class32>();
    }

    #[test]
    fn scan_without_terminator_uses_capacity() {
        let data = dynamic::<Class64>(&[(DT_NEEDED, 1), (DT_NEEDED, 2), (DT_NULL, 0)]);
        assert_eq!(scan_entries::<Class64>(&data, 0, 2), 2);
        assert_eq!(scan_entries::<Class64>(&data, 0, 3), 3);
        assert_eq!(scan_entries::<Class64>(&data, 0, 0), 0);
    }

    fn names_and_paths<C: ElfClass>() {
        let dso = Dso::shared::<C>();
        let elf = Elf::<C>::new(&dso.image);
        let table = elf.dynamic(false);
        let needed = table.get_needed();
        assert_eq!(needed.count(), 2);
        assert_eq!(strings(needed), [&b"libc.so.6"[..], b"libm.so.6"]);
        assert_eq!(table.get_soname(), Some(&b"libfixture.so"[..]));
        assert_eq!(strings(table.get_rpath()), [&b"$ORIGIN/lib"[..]]);
        assert_eq!(strings(table.get_runpath()), [&b"/opt/run"[..]]);
        assert!(table.get(DT_NEEDED).is_some_and(|d| d.valid()));
    }

    #[test]
    fn names_and_paths_64() {
        names_and_paths::<Class64>();
    }

    #[test]
    fn names_and_paths_32() {
        names_and_paths::<Class32>();
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn needed_names_collects() {
        let dso = Dso::shared::<Class64>();
        let table = Elf::<Class64>::new(&dso.image).dynamic(false);
        assert_eq!(table.needed_names(), ["libc.so.6", "libm.so.6"]);
    }

    #[test]
    fn flag_words() {
        let dso = Dso::shared::<Class64>();
        let table = Elf::<Class64>::new(&dso.image).dynamic(false);
        assert_eq!(table.flags(), DynamicFlags::BIND_NOW);
        assert!(table.flags_1().contains(DynamicFlags1::NOW | DynamicFlags1::PIE));
    }

    fn mapped_matches_file<C: ElfClass>() {
        let dso = Dso::shared::<C>();
        let memory = dso.mapped();
        let file = Elf::<C>::new(&dso.image).dynamic(false);
        let mapped = Elf::<C>::new(&memory).dynamic(true);
        assert_eq!(mapped.translation(), Translation::Direct);
        assert_eq!(mapped.count(), file.count());
        assert_eq!(mapped.get_soname(), file.get_soname());
        assert_eq!(mapped.entries().position(), DSO_BIAS as usize + dso.dynamic_offset as usize);

        let file_symbols = file.get_symbol_table();
        let mapped_symbols = mapped.get_symbol_table();
        assert_eq!(mapped_symbols.count(), file_symbols.count());
        for name in ["foo", "bar", "baz"] {
            assert_eq!(
                mapped_symbols.index(name, SymbolVersion::Any),
                file_symbols.index(name, SymbolVersion::Any)
            );
        }
        assert_eq!(mapped.get_relocations().count(), 2);
        assert_eq!(mapped.get_version_definition().count(), 3);
    }

    #[test]
    fn mapped_matches_file_64() {
        mapped_matches_file::<Class64>();
    }

    #[test]
    fn mapped_matches_file_32() {
        mapped_matches_file::<Class32>();
    }

    #[test]
    fn mapped_executable_is_rebased() {
        // An executable linked at the address its buffer lives at.
        let len = Dso::build::<Class64>(ET_EXEC, 0).image.len();
        let mut buffer: Vec<u8> = Vec::with_capacity(len);
        let base = buffer.as_ptr() as u64;
        let dso = Dso::build::<Class64>(ET_EXEC, base);
        buffer.extend_from_slice(&dso.image);
        assert_eq!(buffer.as_ptr() as u64, base);

        let table = Elf::<Class64>::new(&buffer).dynamic(true);
        assert_eq!(table.translation(), Translation::Rebase(base));
        assert_eq!(table.entries().position(), dso.dynamic_offset as usize);
        assert_eq!(table.get_soname(), Some(&b"libfixture.so"[..]));
        let bar = table.get_symbol_table().find("bar", SymbolVersion::Any);
        assert_eq!(bar.map(|s| s.value()), Some(base + 0x840));
        assert_eq!(table.resolve(base + 0x10), 0x10);
    }

    #[test]
    #[should_panic(expected = "below image base")]
    fn rebase_rejects_low_addresses() {
        let len = Dso::build::<Class64>(ET_EXEC, 0).image.len();
        let mut buffer: Vec<u8> = Vec::with_capacity(len);
        let base = buffer.as_ptr() as u64;
        buffer.extend_from_slice(&Dso::build::<Class64>(ET_EXEC, base).image);
        let _ = Elf::<Class64>::new(&buffer).dynamic(true).resolve(base - 1);
    }

    #[test]
    #[should_panic(expected = "not backed by file contents")]
    fn unmapped_address_outside_load_panics() {
        let dso = Dso::shared::<Class64>();
        let _ = Elf::<Class64>::new(&dso.image).dynamic(false).resolve(0x10);
    }

    fn versions<C: ElfClass>() {
        let dso = Dso::shared::<C>();
        let table = Elf::<C>::new(&dso.image).dynamic(false);
        assert_eq!(table.version_index("VERS_1"), VERS_1);
        assert_eq!(table.version_index("VERS_2"), VERS_2);
        assert_eq!(table.version_index("GLIBC_2.2.5"), GLIBC);
        assert_eq!(table.version_index("libfixture.so"), VER_NDX_GLOBAL);
        assert_eq!(table.version_index("nope"), VER_NDX_GLOBAL);

        assert_eq!(table.version_name(VER_NDX_LOCAL), b"*local*");
        assert_eq!(table.version_name(VER_NDX_GLOBAL), b"*global*");
        assert_eq!(table.version_name(VER_NDX_ELIMINATE), b"*eliminate*");
        assert_eq!(table.version_name(VERS_2), b"VERS_2");
        assert_eq!(table.version_name(GLIBC), b"GLIBC_2.2.5");
        assert_eq!(table.version_name(9), b"*invalid*");

        let defs = table.get_version_definition();
        let names: Vec<_> = defs.iter().filter_map(|d| d.name()).collect();
        assert_eq!(names, [&b"libfixture.so"[..], b"VERS_1", b"VERS_2"]);
        assert!(defs.get(0).base());
        let parents: Vec<_> = defs.get(2).auxiliary().iter().map(|a| a.name()).collect();
        assert_eq!(parents, [&b"VERS_2"[..], b"VERS_1"]);

        let needed = table.get_version_needed();
        assert_eq!(needed.count(), 1);
        assert_eq!(needed.get(0).file(), b"libc.so.6");
        let aux = needed.get(0).auxiliary().get(0);
        assert_eq!(aux.name(), b"GLIBC_2.2.5");
        assert_eq!(aux.version_index(), GLIBC);

        let versions = table.get_versions().unwrap();
        assert_eq!(versions.count(), dso.names.len());
        assert_eq!(versions.get(dso.index_of("printf")).index(), GLIBC);
    }

    #[test]
    fn versions_64() {
        versions::<Class64>();
    }

    #[test]
    fn versions_32() {
        versions::<Class32>();
    }

    #[test]
    fn relocation_tables_64() {
        let dso = Dso::shared::<Class64>();
        let table = Elf::<Class64>::new(&dso.image).dynamic(false);
        let relocations = table.get_relocations();
        assert_eq!(relocations.count(), 2);
        let relative = relocations.get(0);
        assert!(relative.has_addend());
        assert_eq!(relative.rel_type(), R_X86_64_RELATIVE);
        assert_eq!(relative.addend(), 0x100);
        let glob = relocations.get(1);
        assert_eq!(glob.rel_type(), R_X86_64_GLOB_DAT);
        assert_eq!(glob.symbol().name(), b"bar");

        let plt = table.get_relocations_plt();
        assert_eq!(plt.count(), 1);
        assert_eq!(plt.get(0).symbol().name(), b"printf");
        assert_eq!(plt.get(0).symbol().section_index(), SHN_UNDEF);

        let got = table.get_global_offset_table();
        assert_eq!(got.count(), 4);
        assert_eq!(got.get(3).value(), 0);
    }

    #[test]
    fn relocation_tables_32() {
        let dso = Dso::shared::<Class32>();
        let table = Elf::<Class32>::new(&dso.image).dynamic(false);
        let relocations = table.get_relocations();
        assert_eq!(relocations.count(), 2);
        assert!(!relocations.get(0).has_addend());
        assert_eq!(relocations.get(0).rel_type(), R_386_RELATIVE);
        assert_eq!(table.get_relocations_plt().count(), 1);
        assert_eq!(table.get_global_offset_table().count(), 4);
    }

    #[test]
    #[should_panic(expected = "mixes DT_REL and DT_RELA")]
    fn mixed_relocation_kinds_panic() {
        let mut b = ImageBuilder::<Class64>::new(ET_DYN, EM_X86_64).load_at(0);
        let entries = dynamic::<Class64>(&[(DT_RELA, 0x100), (DT_RELSZ, 24), (DT_NULL, 0)]);
        let offset = b.append(&entries, 8);
        b.segment(Phdr {
            kind: PT_DYNAMIC,
            offset,
            vaddr: offset,
            filesz: entries.len() as u64,
            memsz: entries.len() as u64,
            ..Phdr::default()
        });
        let image = b.build();
        let _ = Elf::<Class64>::new(&image).dynamic(false).get_relocations();
    }

    fn init_and_fini<C: ElfClass>() {
        let dso = Dso::shared::<C>();
        let table = Elf::<C>::new(&dso.image).dynamic(false);
        let text = DSO_BIAS + 0x800;
        let init: Vec<u64> = table.get_init_array().iter().map(|a| a.value()).collect();
        assert_eq!(init, [text + 0x100, text + 0x110]);
        let fini: Vec<u64> = table.get_fini_array().iter().map(|a| a.value()).collect();
        assert_eq!(fini, [text + 0x120]);
        assert!(table.get_preinit_array().is_empty());
        assert_eq!(table.get_init_function(0), Some(text + 0x200));
        assert_eq!(table.get_fini_function(0x1000), Some(text + 0x1210));
    }

    #[test]
    fn init_and_fini_64() {
        init_and_fini::<Class64>();
    }

    #[test]
    fn init_and_fini_32() {
        init_and_fini::<Class32>();
    }

    #[test]
    fn section_table_matches_segment_table() {
        let dso = Dso::shared::<Class64>();
        let elf = Elf::<Class64>::new(&dso.image);
        let from_section = elf.section_by_name(".dynamic").unwrap().get_dynamic_table();
        let from_segment = elf.dynamic(false);
        assert_eq!(from_section.translation(), Translation::FileOffset);
        assert_eq!(from_section.count(), from_segment.count());
        assert_eq!(from_section.string_table(), from_segment.string_table());
        assert_eq!(from_section.get_soname(), from_segment.get_soname());
    }

    #[test]
    fn tables_format_for_debugging() {
        let dso = Dso::shared::<Class32>();
        let table = Elf::<Class32>::new(&dso.image).dynamic(false);
        let text = format!("{table:?}");
        assert!(text.starts_with("DynamicTable {"), "{text}");
        assert!(text.contains("translation: FileOffset"), "{text}");
        let symbols = format!("{:?}", table.get_symbol_table());
        assert!(symbols.starts_with("SymbolTable {"), "{symbols}");
        assert!(symbols.contains("lookup: Gnu"), "{symbols}");
    }

    #[test]
    fn object_without_dynamic_table() {
        let image = ImageBuilder::<Class64>::new(ET_EXEC, EM_X86_64).build();
        let table = Elf::<Class64>::new(&image).dynamic(false);
        assert!(table.is_empty());
        assert!(table.get_symbol_table().is_empty());
        assert!(table.get_relocations().is_empty());
        assert!(table.get_relocations_plt().is_empty());
        assert!(table.get_global_offset_table().is_empty());
        assert!(table.get_needed().is_empty());
        assert_eq!(table.get_soname(), None);
        assert_eq!(table.version_name(2), b"*invalid*");
        assert_eq!((&table).into_iter().count(), 0);
    }
}
