//! Relocation entries.
//!
//! One view covers both `Rel` and `Rela` entries; the flavour is fixed when
//! the table is resolved and decides the stride and whether an addend is
//! stored.

use core::marker::PhantomData;

use crate::class::ElfClass;
use crate::symbol::Symbol;
use crate::view::{Accessor, Fixed, impl_record};

/// One relocation entry.
///
/// The entry carries the image offsets of the symbol table and string table
/// it refers to; `0` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation<'a, C> {
    raw: Accessor<'a>,
    symtab: usize,
    strtab: usize,
    with_addend: bool,
    _class: PhantomData<C>,
}

impl_record!(Relocation<'a, C> where C: ElfClass);

impl<C: ElfClass> Fixed for Relocation<'_, C> {
    fn stride(&self) -> usize {
        if self.with_addend {
            C::RELA_SIZE
        } else {
            C::REL_SIZE
        }
    }
}

impl<'a, C: ElfClass> Relocation<'a, C> {
    /// View the entry at `offset`.
    #[must_use]
    pub const fn new(
        image: &'a [u8],
        offset: usize,
        symtab: usize,
        strtab: usize,
        with_addend: bool,
    ) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            symtab,
            strtab,
            with_addend,
            _class: PhantomData,
        }
    }

    /// The image the entry lives in.
    #[must_use]
    pub const fn image(&self) -> &'a [u8] {
        self.raw.image()
    }

    /// Whether the entry knows its symbol and string tables.
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.symtab != 0 && self.strtab != 0
    }

    /// Whether the entry stores an explicit addend (`Rela`).
    #[must_use]
    pub const fn has_addend(&self) -> bool {
        self.with_addend
    }

    /// Location to patch, relative to the load base.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.raw.word::<C>(0)
    }

    /// Packed symbol index and type.
    #[must_use]
    pub fn info(&self) -> u64 {
        self.raw.word::<C>(C::WORD)
    }

    /// Symbol table index.
    #[must_use]
    pub fn symbol_index(&self) -> u32 {
        C::r_sym(self.info())
    }

    /// Relocation type (`R_*`).
    #[must_use]
    pub fn rel_type(&self) -> u32 {
        C::r_type(self.info())
    }

    /// Explicit addend, `0` for `Rel` entries.
    #[must_use]
    pub fn addend(&self) -> i64 {
        if self.with_addend {
            self.raw.sword::<C>(2 * C::WORD)
        } else {
            0
        }
    }

    /// The referenced symbol.
    ///
    /// # Panics
    ///
    /// Panics if the entry does not know its symbol table.
    #[must_use]
    pub fn symbol(&self) -> Symbol<'a, C> {
        assert!(self.symtab != 0, "relocation has no symbol table");
        Symbol::new(
            self.raw.image(),
            self.symtab + self.symbol_index() as usize * C::SYM.total,
            self.strtab,
        )
    }
}
