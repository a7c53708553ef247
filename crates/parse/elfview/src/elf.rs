//! The ELF object: header plus the segment and section tables.

use core::fmt;
use core::marker::PhantomData;

use crate::bytes::{c_str, to_usize};
use crate::class::{Class32, Class64, ElfClass};
use crate::consts::{ELFCLASS32, ELFCLASS64, PT_DYNAMIC, PT_INTERP, PT_LOAD, SHT_NOBITS, SHT_NULL};
use crate::dynamic::DynamicTable;
use crate::header::{ElfError, Header, Identification};
use crate::section::Section;
use crate::segment::Segment;
use crate::symbol::Symbol;
use crate::view::Array;

/// An ELF image of class `C`.
///
/// `Elf` is a view: it holds the image slice and nothing else, and every
/// accessor reads the image on demand. Construct it with [`Elf::parse`]
/// for untrusted input; [`Elf::new`] skips the checks and the accessors
/// then panic on malformed tables.
#[derive(Clone, Copy)]
pub struct Elf<'a, C> {
    data: &'a [u8],
    _class: PhantomData<C>,
}

impl<C> fmt::Debug for Elf<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elf")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl<'a, C: ElfClass> Elf<'a, C> {
    /// View `data` as an ELF image without checking it.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            _class: PhantomData,
        }
    }

    /// Check `data` with [`check`](Self::check) and view it.
    ///
    /// # Errors
    ///
    /// Returns the first failing condition as an [`ElfError`].
    pub fn parse(data: &'a [u8]) -> Result<Self, ElfError> {
        let elf = Self::new(data);
        elf.check(data.len())?;
        Ok(elf)
    }

    /// The whole image.
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The file header.
    #[must_use]
    pub const fn header(&self) -> Header<'a, C> {
        Header::new(self.data)
    }

    /// The class byte this object is read as.
    #[must_use]
    pub const fn elf_class(&self) -> u8 {
        C::CLASS
    }

    /// The program headers.
    #[must_use]
    pub fn segments(&self) -> Array<Segment<'a, C>> {
        let header = self.header();
        Array::new(
            Segment::new(self.data, to_usize(header.ph_offset())),
            usize::from(header.ph_count()),
        )
    }

    /// The section headers, the null section included.
    #[must_use]
    pub fn sections(&self) -> Array<Section<'a, C>> {
        let header = self.header();
        Array::new(
            Section::new(self.data, to_usize(header.sh_offset())),
            usize::from(header.sh_count()),
        )
    }

    /// Check that the first `file_size` bytes of the image hold a header of
    /// class `C` in host byte order, and that both header tables, every
    /// segment and every section with file contents lie within them.
    ///
    /// # Errors
    ///
    /// Returns the first failing condition as an [`ElfError`].
    pub fn check(&self, file_size: usize) -> Result<(), ElfError> {
        if file_size > self.data.len() {
            return Err(ElfError::Truncated);
        }
        let header = Header::<C>::new(&self.data[..file_size]);
        header.check()?;

        let file_size = file_size as u64;
        let within = |offset: u64, size: u64| {
            offset
                .checked_add(size)
                .is_some_and(|end| end <= file_size)
        };
        let ph_table = u64::from(header.ph_count()) * C::PHDR.size as u64;
        let sh_table = u64::from(header.sh_count()) * C::SHDR.total as u64;
        if !within(header.ph_offset(), ph_table) || !within(header.sh_offset(), sh_table) {
            return Err(ElfError::InvalidOffset);
        }
        let names = header.sh_string_index();
        if names != 0 && names >= header.sh_count() {
            return Err(ElfError::InvalidOffset);
        }

        for segment in self.segments() {
            if !within(segment.offset(), segment.size()) {
                log::debug!(
                    "segment at {:#x} exceeds file size {file_size:#x}",
                    segment.offset()
                );
                return Err(ElfError::InvalidOffset);
            }
        }
        for section in self.sections() {
            let kind = section.section_type();
            if kind == SHT_NULL || kind == SHT_NOBITS {
                continue;
            }
            if !within(section.offset(), section.size()) {
                log::debug!(
                    "section at {:#x} exceeds file size {file_size:#x}",
                    section.offset()
                );
                return Err(ElfError::InvalidOffset);
            }
        }
        Ok(())
    }

    /// Whether [`check`](Self::check) succeeds.
    #[must_use]
    pub fn valid(&self, file_size: usize) -> bool {
        self.check(file_size).is_ok()
    }

    /// Size of the file as described by its headers: the furthest end of
    /// any header table, segment or section contents. With `only_allocated`
    /// only `PT_LOAD` segments and `SHF_ALLOC` sections count, which gives
    /// the extent a loader needs.
    #[must_use]
    pub fn size(&self, only_allocated: bool) -> u64 {
        let header = self.header();
        let mut end = u64::from(header.header_size());
        if !only_allocated {
            let ph_table = u64::from(header.ph_count()) * u64::from(header.ph_entry_size());
            let sh_table = u64::from(header.sh_count()) * u64::from(header.sh_entry_size());
            end = end
                .max(header.ph_offset() + ph_table)
                .max(header.sh_offset() + sh_table);
        }
        for segment in self.segments() {
            if !only_allocated || segment.segment_type() == PT_LOAD {
                end = end.max(segment.offset() + segment.size());
            }
        }
        for section in self.sections() {
            if section.section_type() == SHT_NOBITS || section.is_null() {
                continue;
            }
            if !only_allocated || section.allocate() {
                end = end.max(section.offset() + section.size());
            }
        }
        end
    }

    /// NUL-terminated string at `offset` within the string table at image
    /// offset `strtab`.
    #[must_use]
    pub fn string(&self, strtab: usize, offset: usize) -> &'a [u8] {
        c_str(self.data, strtab.saturating_add(offset))
    }

    /// The first section called `name`.
    #[must_use]
    pub fn section_by_name(&self, name: &str) -> Option<Section<'a, C>> {
        self.sections()
            .iter()
            .skip(1)
            .find(|s| s.name() == name.as_bytes())
    }

    /// The section whose file contents contain `offset`.
    #[must_use]
    pub fn section_by_offset(&self, offset: u64) -> Option<Section<'a, C>> {
        self.sections().iter().find(|s| {
            !s.is_null()
                && s.section_type() != SHT_NOBITS
                && (s.offset()..s.offset() + s.size()).contains(&offset)
        })
    }

    /// Symbol `index` of the symbol section `section`.
    ///
    /// # Panics
    ///
    /// Panics if `section` holds no symbols or `index` is out of range.
    #[must_use]
    pub fn symbol(&self, section: &Section<'a, C>, index: usize) -> Symbol<'a, C> {
        section.get_symbols().get(index)
    }

    /// The dynamic table of the `PT_DYNAMIC` segment, empty without one.
    /// `mapped` tells whether the image is laid out as in memory.
    ///
    /// # Panics
    ///
    /// Panics if an address in the table cannot be translated.
    #[must_use]
    pub fn dynamic(&self, mapped: bool) -> DynamicTable<'a, C> {
        self.segments()
            .iter()
            .find(|s| s.segment_type() == PT_DYNAMIC)
            .map_or_else(
                || DynamicTable::empty(*self),
                |s| s.get_dynamic_table(mapped),
            )
    }

    /// Program interpreter path from `PT_INTERP`, without terminator.
    #[must_use]
    pub fn interpreter(&self) -> Option<&'a [u8]> {
        self.segments().iter().find_map(|s| s.path())
    }

    /// File offset backing virtual address `address`, found through the
    /// `PT_LOAD` segments. An address one past the end of a segment's file
    /// contents still maps, so empty tables at the end resolve.
    #[must_use]
    pub fn file_offset(&self, address: u64) -> Option<usize> {
        self.segments()
            .iter()
            .filter(|s| s.segment_type() == PT_LOAD)
            .find(|s| address >= s.virt_addr() && address - s.virt_addr() <= s.size())
            .map(|s| to_usize(s.offset() + (address - s.virt_addr())))
    }

    /// Replace the `PT_INTERP` path of the image in place. The rest of the
    /// original allocation is cleared; nothing is moved or grown.
    ///
    /// # Errors
    ///
    /// [`InterpError::Elf`] if the image fails [`check`](Self::check),
    /// [`InterpError::NoInterpreter`] without a `PT_INTERP` segment,
    /// [`InterpError::InvalidPath`] for an empty path or one holding a NUL
    /// byte, and [`InterpError::TooLong`] if the path and its terminator do
    /// not fit the segment.
    pub fn set_interpreter(image: &mut [u8], path: &str) -> Result<(), InterpError> {
        if path.is_empty() || path.bytes().any(|b| b == 0) {
            return Err(InterpError::InvalidPath);
        }
        let (start, capacity) = {
            let elf = Elf::<C>::parse(image).map_err(InterpError::Elf)?;
            let segment = elf
                .segments()
                .iter()
                .find(|s| s.segment_type() == PT_INTERP)
                .ok_or(InterpError::NoInterpreter)?;
            (to_usize(segment.offset()), to_usize(segment.size()))
        };
        let requested = path.len() + 1;
        if requested > capacity {
            log::warn!("interpreter path needs {requested} bytes, segment holds {capacity}");
            return Err(InterpError::TooLong {
                capacity,
                requested,
            });
        }
        let slot = image
            .get_mut(start..start + capacity)
            .ok_or(InterpError::Elf(ElfError::InvalidOffset))?;
        let (text, rest) = slot.split_at_mut(path.len());
        text.copy_from_slice(path.as_bytes());
        rest.fill(0);
        log::trace!("interpreter at {start:#x} set to {path}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Interpreter rewrite errors
// ---------------------------------------------------------------------------

/// Errors from [`Elf::set_interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpError {
    /// The image is not a valid ELF file of the requested class.
    Elf(ElfError),
    /// The image has no `PT_INTERP` segment.
    NoInterpreter,
    /// The new path does not fit the existing segment.
    TooLong {
        /// Bytes available, terminator included.
        capacity: usize,
        /// Bytes needed, terminator included.
        requested: usize,
    },
    /// The new path is empty or contains a NUL byte.
    InvalidPath,
}

impl fmt::Display for InterpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elf(e) => write!(f, "invalid image: {e}"),
            Self::NoInterpreter => write!(f, "image has no interpreter segment"),
            Self::TooLong {
                capacity,
                requested,
            } => write!(
                f,
                "interpreter path needs {requested} bytes but only {capacity} are available"
            ),
            Self::InvalidPath => write!(f, "interpreter path is empty or contains NUL"),
        }
    }
}

impl core::error::Error for InterpError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Elf(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AnyElf
// ---------------------------------------------------------------------------

/// An ELF image whose class is only known at run time.
#[derive(Debug, Clone, Copy)]
pub enum AnyElf<'a> {
    /// A 32-bit object.
    Elf32(Elf<'a, Class32>),
    /// A 64-bit object.
    Elf64(Elf<'a, Class64>),
}

impl<'a> AnyElf<'a> {
    /// Pick the class from the identification and [`Elf::parse`] as it.
    ///
    /// # Errors
    ///
    /// [`ElfError::UnsupportedClass`] for an unknown class byte, otherwise
    /// whatever [`Elf::parse`] reports.
    pub fn parse(data: &'a [u8]) -> Result<Self, ElfError> {
        let ident = Identification::new(data);
        ident.check()?;
        match ident.class() {
            ELFCLASS32 => Elf::parse(data).map(Self::Elf32),
            ELFCLASS64 => Elf::parse(data).map(Self::Elf64),
            _ => Err(ElfError::UnsupportedClass),
        }
    }

    /// The class byte.
    #[must_use]
    pub const fn elf_class(&self) -> u8 {
        match self {
            Self::Elf32(elf) => elf.elf_class(),
            Self::Elf64(elf) => elf.elf_class(),
        }
    }

    /// Object file type (`ET_*`).
    #[must_use]
    pub fn elf_type(&self) -> u16 {
        match self {
            Self::Elf32(elf) => elf.header().elf_type(),
            Self::Elf64(elf) => elf.header().elf_type(),
        }
    }

    /// Target machine (`EM_*`).
    #[must_use]
    pub fn machine(&self) -> u16 {
        match self {
            Self::Elf32(elf) => elf.header().machine(),
            Self::Elf64(elf) => elf.header().machine(),
        }
    }

    /// Entry point virtual address.
    #[must_use]
    pub fn entry(&self) -> u64 {
        match self {
            Self::Elf32(elf) => elf.header().entry(),
            Self::Elf64(elf) => elf.header().entry(),
        }
    }

    /// Program interpreter path, without terminator.
    #[must_use]
    pub fn interpreter(&self) -> Option<&'a [u8]> {
        match self {
            Self::Elf32(elf) => elf.interpreter(),
            Self::Elf64(elf) => elf.interpreter(),
        }
    }

    /// See [`Elf::size`].
    #[must_use]
    pub fn size(&self, only_allocated: bool) -> u64 {
        match self {
            Self::Elf32(elf) => elf.size(only_allocated),
            Self::Elf64(elf) => elf.size(only_allocated),
        }
    }
}
