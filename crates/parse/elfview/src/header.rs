//! File identification and header.
//!
//! [`Identification`] covers the sixteen `e_ident` bytes, which are laid out
//! identically in both classes. [`Header`] reads the remaining fields through
//! the class layout.

use core::fmt;
use core::marker::PhantomData;

use crate::class::ElfClass;
use crate::consts::{
    EI_ABIVERSION, EI_CLASS, EI_DATA, EI_NIDENT, EI_OSABI, EI_VERSION, ELF_MAGIC, ELFDATA_HOST,
    EV_CURRENT,
};
use crate::view::{Accessor, impl_record};

/// Errors reported when checking an image before reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfError {
    /// The input is too short for the declared structure.
    Truncated,
    /// The file does not start with the ELF magic bytes.
    BadMagic,
    /// The class byte does not match the class being read.
    UnsupportedClass,
    /// The data encoding does not match the host.
    UnsupportedEncoding,
    /// The identification or header version is not `EV_CURRENT`.
    UnsupportedVersion,
    /// A table or record extends past the end of the file.
    InvalidOffset,
    /// A declared header or entry size does not match the class layout.
    HeaderSizeMismatch,
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "input data truncated"),
            Self::BadMagic => write!(f, "invalid ELF magic bytes"),
            Self::UnsupportedClass => write!(f, "unsupported ELF class"),
            Self::UnsupportedEncoding => {
                write!(f, "unsupported data encoding (expected host byte order)")
            }
            Self::UnsupportedVersion => write!(f, "unsupported ELF version"),
            Self::InvalidOffset => write!(f, "table or record extends past end of file"),
            Self::HeaderSizeMismatch => write!(f, "declared header size does not match class"),
        }
    }
}

impl core::error::Error for ElfError {}

// ---------------------------------------------------------------------------
// Identification
// ---------------------------------------------------------------------------

/// The `e_ident` block at the start of every ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identification<'a> {
    raw: Accessor<'a>,
}

impl<'a> Identification<'a> {
    /// View the identification at the start of `image`.
    #[must_use]
    pub const fn new(image: &'a [u8]) -> Self {
        Self {
            raw: Accessor::new(image, 0),
        }
    }

    /// Whether the image starts with `\x7fELF`.
    #[must_use]
    pub fn has_magic(&self) -> bool {
        self.raw.bytes().starts_with(&ELF_MAGIC)
    }

    /// `EI_CLASS`.
    #[must_use]
    pub fn class(&self) -> u8 {
        self.raw.u8(EI_CLASS)
    }

    /// `EI_DATA`.
    #[must_use]
    pub fn data_encoding(&self) -> u8 {
        self.raw.u8(EI_DATA)
    }

    /// Whether the data encoding is the host byte order.
    #[must_use]
    pub fn host_encoding(&self) -> bool {
        self.data_encoding() == ELFDATA_HOST
    }

    /// `EI_VERSION`.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.raw.u8(EI_VERSION)
    }

    /// `EI_OSABI`.
    #[must_use]
    pub fn os_abi(&self) -> u8 {
        self.raw.u8(EI_OSABI)
    }

    /// `EI_ABIVERSION`.
    #[must_use]
    pub fn abi_version(&self) -> u8 {
        self.raw.u8(EI_ABIVERSION)
    }

    /// Check magic, identification version and data encoding.
    ///
    /// # Errors
    ///
    /// Returns the first failing condition as an [`ElfError`].
    pub fn check(&self) -> Result<(), ElfError> {
        if !self.raw.fits(EI_NIDENT) {
            return Err(ElfError::Truncated);
        }
        if !self.has_magic() {
            return Err(ElfError::BadMagic);
        }
        if u32::from(self.version()) != EV_CURRENT {
            return Err(ElfError::UnsupportedVersion);
        }
        if !self.host_encoding() {
            return Err(ElfError::UnsupportedEncoding);
        }
        Ok(())
    }

    /// Whether [`check`](Self::check) succeeds.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.check().is_ok()
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The ELF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a, C> {
    raw: Accessor<'a>,
    _class: PhantomData<C>,
}

impl_record!(Header<'a, C> where C: ElfClass);

impl<'a, C: ElfClass> Header<'a, C> {
    /// View the header at the start of `image`.
    #[must_use]
    pub const fn new(image: &'a [u8]) -> Self {
        Self {
            raw: Accessor::new(image, 0),
            _class: PhantomData,
        }
    }

    /// The identification block.
    #[must_use]
    pub fn identification(&self) -> Identification<'a> {
        Identification::new(self.raw.image())
    }

    /// Check that the image holds a complete header of class `C`, in host
    /// byte order, with entry sizes matching the class layout.
    ///
    /// # Errors
    ///
    /// Returns the first failing condition as an [`ElfError`].
    pub fn check(&self) -> Result<(), ElfError> {
        if !self.raw.fits(C::EHDR.size) {
            return Err(ElfError::Truncated);
        }
        let ident = self.identification();
        ident.check()?;
        if ident.class() != C::CLASS {
            return Err(ElfError::UnsupportedClass);
        }
        if self.version() != EV_CURRENT {
            return Err(ElfError::UnsupportedVersion);
        }
        if usize::from(self.header_size()) != C::EHDR.size {
            return Err(ElfError::HeaderSizeMismatch);
        }
        if self.ph_count() > 0 && usize::from(self.ph_entry_size()) != C::PHDR.size {
            return Err(ElfError::HeaderSizeMismatch);
        }
        if self.sh_count() > 0 && usize::from(self.sh_entry_size()) != C::SHDR.total {
            return Err(ElfError::HeaderSizeMismatch);
        }
        Ok(())
    }

    /// Whether [`check`](Self::check) succeeds.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Object file type (`ET_*`).
    #[must_use]
    pub fn elf_type(&self) -> u16 {
        self.raw.u16(16)
    }

    /// Target machine (`EM_*`).
    #[must_use]
    pub fn machine(&self) -> u16 {
        self.raw.u16(18)
    }

    /// Object file version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.raw.u32(20)
    }

    /// Entry point virtual address.
    #[must_use]
    pub fn entry(&self) -> u64 {
        self.raw.word::<C>(C::EHDR.entry)
    }

    /// Processor-specific flags.
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.raw.u32(C::EHDR.flags)
    }

    /// Declared size of this header.
    #[must_use]
    pub fn header_size(&self) -> u16 {
        self.raw.u16(C::EHDR.ehsize)
    }

    /// File offset of the program header table.
    #[must_use]
    pub fn ph_offset(&self) -> u64 {
        self.raw.word::<C>(C::EHDR.phoff)
    }

    /// Size of one program header.
    #[must_use]
    pub fn ph_entry_size(&self) -> u16 {
        self.raw.u16(C::EHDR.phentsize)
    }

    /// Number of program headers.
    #[must_use]
    pub fn ph_count(&self) -> u16 {
        self.raw.u16(C::EHDR.phnum)
    }

    /// File offset of the section header table.
    #[must_use]
    pub fn sh_offset(&self) -> u64 {
        self.raw.word::<C>(C::EHDR.shoff)
    }

    /// Size of one section header.
    #[must_use]
    pub fn sh_entry_size(&self) -> u16 {
        self.raw.u16(C::EHDR.shentsize)
    }

    /// Number of section headers.
    #[must_use]
    pub fn sh_count(&self) -> u16 {
        self.raw.u16(C::EHDR.shnum)
    }

    /// Index of the section holding section names.
    #[must_use]
    pub fn sh_string_index(&self) -> u16 {
        self.raw.u16(C::EHDR.shstrndx)
    }
}
