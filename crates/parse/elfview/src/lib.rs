//! Zero-copy ELF32/ELF64 reader.
//!
//! Every type in this crate is a view into a caller-owned image: the bytes
//! of a file, or of an object mapped into memory. Nothing is copied or
//! allocated; records are read field by field, in host byte order, when
//! they are accessed.
//!
//! Structural violations (an index past a table, a table of the wrong type)
//! panic. Run [`Elf::check`] first on untrusted input; a file that passes
//! it can be walked without running past its end.
//!
//! # Usage
//!
//! ```
//! use elfview::{Elf, NativeClass, SymbolVersion};
//!
//! fn lookup(data: &[u8]) -> Option<u64> {
//!     let elf = Elf::<NativeClass>::parse(data).ok()?;
//!     let symbols = elf.dynamic(false).get_symbol_table();
//!     let symbol = symbols.find("malloc", SymbolVersion::Any)?;
//!     Some(symbol.value())
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod bytes;
pub mod class;
pub mod consts;
pub mod dynamic;
pub mod elf;
pub mod hash;
pub mod header;
pub mod note;
pub mod reloc;
pub mod relocator;
pub mod section;
pub mod segment;
pub mod symbol;
pub mod symtab;
pub mod version;
pub mod view;

#[cfg(test)]
mod testutil;

pub use class::{Class32, Class64, ElfClass, NativeClass};
pub use dynamic::{Dynamic, DynamicTable, TaggedEntry, Translation};
pub use elf::{AnyElf, Elf, InterpError};
pub use hash::{GnuHash, SysvHash, elf_hash, gnu_hash};
pub use header::{ElfError, Header, Identification};
pub use note::Note;
pub use reloc::Relocation;
pub use relocator::{
    ImageMemory, Machine, RelocContext, RelocError, RelocValue, Relocator, TargetMemory,
};
pub use section::Section;
pub use segment::Segment;
pub use symbol::Symbol;
pub use symtab::{Lookup, LookupStats, SymbolTable, SymbolVersion};
pub use version::{
    VersionDefinition, VersionDefinitionAux, VersionIndex, VersionNeeded, VersionNeededAux,
};
pub use view::{Accessor, Address, Array, ArrayIter, Fixed, Linked, List, ListIter, Record};
