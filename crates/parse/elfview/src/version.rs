//! Symbol versioning records.
//!
//! Version definitions and requirements are linked lists: each record
//! stores the byte distance to its successor and to its first auxiliary
//! record, zero meaning none. The per-symbol version table is a plain
//! array of `u16` indices.

use crate::bytes::c_str;
use crate::consts::{VERSYM_HIDDEN, VERSYM_VERSION, VersionFlags};
use crate::view::{Accessor, Fixed, Linked, List, impl_record};

/// Offset of the record linked `distance` bytes after `raw`, if any.
fn link(raw: &Accessor<'_>, distance: u32) -> Option<usize> {
    (distance != 0).then(|| raw.offset() + distance as usize)
}

// ---------------------------------------------------------------------------
// Version index table
// ---------------------------------------------------------------------------

/// One entry of the version index table (`SHT_GNU_VERSYM`, `DT_VERSYM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionIndex<'a> {
    raw: Accessor<'a>,
}

impl_record!(VersionIndex<'a>);

impl<'a> VersionIndex<'a> {
    /// View the entry at `offset` within `image`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
        }
    }

    /// The stored value, hidden bit included.
    #[must_use]
    pub fn raw_value(&self) -> u16 {
        self.raw.u16(0)
    }

    /// Version index with the hidden bit masked off.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.raw_value() & VERSYM_VERSION
    }

    /// Whether the symbol is hidden from version-less references.
    #[must_use]
    pub fn hidden(&self) -> bool {
        self.raw_value() & VERSYM_HIDDEN != 0
    }
}

impl Fixed for VersionIndex<'_> {
    fn stride(&self) -> usize {
        2
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A version definition (`Verdef`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionDefinition<'a> {
    raw: Accessor<'a>,
    strtab: usize,
}

impl_record!(VersionDefinition<'a>);

impl<'a> VersionDefinition<'a> {
    /// View the definition at `offset`, resolving names in the string table
    /// at image offset `strtab`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize, strtab: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            strtab,
        }
    }

    /// Structure revision (`VER_DEF_CURRENT`).
    #[must_use]
    pub fn revision(&self) -> u16 {
        self.raw.u16(0)
    }

    /// Definition flags.
    #[must_use]
    pub fn flags(&self) -> VersionFlags {
        VersionFlags::from_bits_retain(self.raw.u16(2))
    }

    /// Whether this defines the file itself.
    #[must_use]
    pub fn base(&self) -> bool {
        self.flags().contains(VersionFlags::BASE)
    }

    /// Whether this is a weak version.
    #[must_use]
    pub fn weak(&self) -> bool {
        self.flags().contains(VersionFlags::WEAK)
    }

    /// Version index referenced from the version index table.
    #[must_use]
    pub fn version_index(&self) -> u16 {
        self.raw.u16(4)
    }

    /// Number of auxiliary records.
    #[must_use]
    pub fn aux_count(&self) -> u16 {
        self.raw.u16(6)
    }

    /// ELF hash of the version name.
    #[must_use]
    pub fn hash(&self) -> u32 {
        self.raw.u32(8)
    }

    /// Auxiliary records: the version name first, then its parents.
    #[must_use]
    pub fn auxiliary(&self) -> List<VersionDefinitionAux<'a>> {
        match link(&self.raw, self.raw.u32(12)) {
            Some(offset) => List::new(VersionDefinitionAux {
                raw: self.raw.at(offset),
                strtab: self.strtab,
            }),
            None => List::empty(),
        }
    }

    /// Name of the defined version, taken from the first auxiliary record.
    #[must_use]
    pub fn name(&self) -> Option<&'a [u8]> {
        self.auxiliary().iter().next().map(|aux| aux.name())
    }
}

impl Linked for VersionDefinition<'_> {
    fn successor(&self) -> Option<usize> {
        link(&self.raw, self.raw.u32(16))
    }
}

/// An auxiliary record of a version definition (`Verdaux`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionDefinitionAux<'a> {
    raw: Accessor<'a>,
    strtab: usize,
}

impl_record!(VersionDefinitionAux<'a>);

impl<'a> VersionDefinitionAux<'a> {
    /// Version or dependency name.
    #[must_use]
    pub fn name(&self) -> &'a [u8] {
        c_str(self.raw.image(), self.strtab + self.raw.u32(0) as usize)
    }
}

impl Linked for VersionDefinitionAux<'_> {
    fn successor(&self) -> Option<usize> {
        link(&self.raw, self.raw.u32(4))
    }
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// A version requirement on one file (`Verneed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionNeeded<'a> {
    raw: Accessor<'a>,
    strtab: usize,
}

impl_record!(VersionNeeded<'a>);

impl<'a> VersionNeeded<'a> {
    /// View the requirement at `offset`, resolving names in the string
    /// table at image offset `strtab`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize, strtab: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            strtab,
        }
    }

    /// Structure revision (`VER_NEED_CURRENT`).
    #[must_use]
    pub fn revision(&self) -> u16 {
        self.raw.u16(0)
    }

    /// Number of auxiliary records.
    #[must_use]
    pub fn aux_count(&self) -> u16 {
        self.raw.u16(2)
    }

    /// Name of the file the versions are needed from.
    #[must_use]
    pub fn file(&self) -> &'a [u8] {
        c_str(self.raw.image(), self.strtab + self.raw.u32(4) as usize)
    }

    /// The versions needed from this file.
    #[must_use]
    pub fn auxiliary(&self) -> List<VersionNeededAux<'a>> {
        match link(&self.raw, self.raw.u32(8)) {
            Some(offset) => List::new(VersionNeededAux {
                raw: self.raw.at(offset),
                strtab: self.strtab,
            }),
            None => List::empty(),
        }
    }
}

impl Linked for VersionNeeded<'_> {
    fn successor(&self) -> Option<usize> {
        link(&self.raw, self.raw.u32(12))
    }
}

/// One needed version (`Vernaux`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionNeededAux<'a> {
    raw: Accessor<'a>,
    strtab: usize,
}

impl_record!(VersionNeededAux<'a>);

impl<'a> VersionNeededAux<'a> {
    /// ELF hash of the version name.
    #[must_use]
    pub fn hash(&self) -> u32 {
        self.raw.u32(0)
    }

    /// Requirement flags.
    #[must_use]
    pub fn flags(&self) -> VersionFlags {
        VersionFlags::from_bits_retain(self.raw.u16(4))
    }

    /// Whether the requirement is weak.
    #[must_use]
    pub fn weak(&self) -> bool {
        self.flags().contains(VersionFlags::WEAK)
    }

    /// Version index assigned to this requirement.
    #[must_use]
    pub fn version_index(&self) -> u16 {
        self.raw.u16(6)
    }

    /// Version name.
    #[must_use]
    pub fn name(&self) -> &'a [u8] {
        c_str(self.raw.image(), self.strtab + self.raw.u32(8) as usize)
    }
}

impl Linked for VersionNeededAux<'_> {
    fn successor(&self) -> Option<usize> {
        link(&self.raw, self.raw.u32(12))
    }
}
