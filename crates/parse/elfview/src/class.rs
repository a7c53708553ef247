//! Address-width parameterization.
//!
//! ELF32 and ELF64 share every algorithm in this crate but differ in field
//! widths and record layouts. [`ElfClass`] captures those differences as
//! associated constants, so each view is written once and instantiated for
//! [`Class32`] and [`Class64`]. All address-sized fields are widened to
//! `u64` (signed ones to `i64`) on read.

use core::fmt::Debug;

use crate::bytes::{ne_sword, ne_word};
use crate::consts::{ELFCLASS32, ELFCLASS64};

/// Byte offsets of the file header fields that differ between classes.
///
/// `e_type`, `e_machine` and `e_version` sit at 16, 18 and 20 in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the e_* header members")]
pub struct EhdrLayout {
    pub entry: usize,
    pub phoff: usize,
    pub shoff: usize,
    pub flags: usize,
    pub ehsize: usize,
    pub phentsize: usize,
    pub phnum: usize,
    pub shentsize: usize,
    pub shnum: usize,
    pub shstrndx: usize,
    pub size: usize,
}

/// Byte offsets of the program header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the p_* header members")]
pub struct PhdrLayout {
    pub kind: usize,
    pub flags: usize,
    pub offset: usize,
    pub vaddr: usize,
    pub paddr: usize,
    pub filesz: usize,
    pub memsz: usize,
    pub align: usize,
    pub size: usize,
}

/// Byte offsets of the section header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the sh_* header members")]
pub struct ShdrLayout {
    pub name: usize,
    pub kind: usize,
    pub flags: usize,
    pub addr: usize,
    pub offset: usize,
    pub size: usize,
    pub link: usize,
    pub info: usize,
    pub align: usize,
    pub entsize: usize,
    pub total: usize,
}

/// Byte offsets of the symbol table entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the st_* symbol members")]
pub struct SymLayout {
    pub name: usize,
    pub value: usize,
    pub size: usize,
    pub info: usize,
    pub other: usize,
    pub shndx: usize,
    pub total: usize,
}

/// Field widths and layouts of one ELF class.
pub trait ElfClass: Copy + Debug + Default + Eq + 'static {
    /// `EI_CLASS` value identifying this class.
    const CLASS: u8;
    /// Width of an address-sized word in bytes.
    const WORD: usize;
    /// File header layout.
    const EHDR: EhdrLayout;
    /// Program header layout.
    const PHDR: PhdrLayout;
    /// Section header layout.
    const SHDR: ShdrLayout;
    /// Symbol entry layout.
    const SYM: SymLayout;
    /// Size of a relocation entry without addend.
    const REL_SIZE: usize = 2 * Self::WORD;
    /// Size of a relocation entry with addend.
    const RELA_SIZE: usize = 3 * Self::WORD;
    /// Size of a dynamic table entry.
    const DYN_SIZE: usize = 2 * Self::WORD;

    /// Symbol index packed into `r_info`.
    fn r_sym(info: u64) -> u32;

    /// Relocation type packed into `r_info`.
    fn r_type(info: u64) -> u32;

    /// Read an unsigned address-sized word.
    fn word(data: &[u8], off: usize) -> u64 {
        ne_word(data, off, Self::WORD)
    }

    /// Read a signed address-sized word.
    fn sword(data: &[u8], off: usize) -> i64 {
        ne_sword(data, off, Self::WORD)
    }
}

/// The 32-bit ELF class (`ELFCLASS32`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Class32;

/// The 64-bit ELF class (`ELFCLASS64`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Class64;

impl ElfClass for Class32 {
    const CLASS: u8 = ELFCLASS32;
    const WORD: usize = 4;
    const EHDR: EhdrLayout = EhdrLayout {
        entry: 24,
        phoff: 28,
        shoff: 32,
        flags: 36,
        ehsize: 40,
        phentsize: 42,
        phnum: 44,
        shentsize: 46,
        shnum: 48,
        shstrndx: 50,
        size: 52,
    };
    const PHDR: PhdrLayout = PhdrLayout {
        kind: 0,
        offset: 4,
        vaddr: 8,
        paddr: 12,
        filesz: 16,
        memsz: 20,
        flags: 24,
        align: 28,
        size: 32,
    };
    const SHDR: ShdrLayout = ShdrLayout {
        name: 0,
        kind: 4,
        flags: 8,
        addr: 12,
        offset: 16,
        size: 20,
        link: 24,
        info: 28,
        align: 32,
        entsize: 36,
        total: 40,
    };
    const SYM: SymLayout = SymLayout {
        name: 0,
        value: 4,
        size: 8,
        info: 12,
        other: 13,
        shndx: 14,
        total: 16,
    };

    #[expect(clippy::cast_possible_truncation, reason = "masked to 24 bits")]
    fn r_sym(info: u64) -> u32 {
        ((info & 0xffff_ffff) >> 8) as u32
    }

    #[expect(clippy::cast_possible_truncation, reason = "masked to 8 bits")]
    fn r_type(info: u64) -> u32 {
        (info & 0xff) as u32
    }
}

impl ElfClass for Class64 {
    const CLASS: u8 = ELFCLASS64;
    const WORD: usize = 8;
    const EHDR: EhdrLayout = EhdrLayout {
        entry: 24,
        phoff: 32,
        shoff: 40,
        flags: 48,
        ehsize: 52,
        phentsize: 54,
        phnum: 56,
        shentsize: 58,
        shnum: 60,
        shstrndx: 62,
        size: 64,
    };
    const PHDR: PhdrLayout = PhdrLayout {
        kind: 0,
        flags: 4,
        offset: 8,
        vaddr: 16,
        paddr: 24,
        filesz: 32,
        memsz: 40,
        align: 48,
        size: 56,
    };
    const SHDR: ShdrLayout = ShdrLayout {
        name: 0,
        kind: 4,
        flags: 8,
        addr: 16,
        offset: 24,
        size: 32,
        link: 40,
        info: 44,
        align: 48,
        entsize: 56,
        total: 64,
    };
    const SYM: SymLayout = SymLayout {
        name: 0,
        info: 4,
        other: 5,
        shndx: 6,
        value: 8,
        size: 16,
        total: 24,
    };

    #[expect(clippy::cast_possible_truncation, reason = "upper half of r_info")]
    fn r_sym(info: u64) -> u32 {
        (info >> 32) as u32
    }

    #[expect(clippy::cast_possible_truncation, reason = "lower half of r_info")]
    fn r_type(info: u64) -> u32 {
        info as u32
    }
}

/// The class matching the host's pointer width.
#[cfg(target_pointer_width = "64")]
pub type NativeClass = Class64;

/// The class matching the host's pointer width.
#[cfg(target_pointer_width = "32")]
pub type NativeClass = Class32;
