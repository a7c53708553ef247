//! Symbol lookup by name and version.
//!
//! A [`SymbolTable`] pairs a symbol array with the lookup strategy chosen
//! when it was built: a GNU hash table when one exists, the SysV hash table
//! otherwise, and a linear scan for plain symbol sections.

use core::fmt;

use crate::class::ElfClass;
use crate::consts::{VER_NDX_GLOBAL, VERSYM_VERSION};
use crate::hash::{GnuHash, SysvHash, elf_hash, gnu_hash};
use crate::symbol::Symbol;
use crate::version::VersionIndex;
use crate::view::Array;

/// The version a lookup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolVersion {
    /// Accept any version.
    #[default]
    Any,
    /// Accept only symbols whose version index (hidden bit masked) matches.
    Index(u16),
}

impl From<u16> for SymbolVersion {
    /// `VER_NDX_GLOBAL` requests any version; other values are masked to
    /// their index bits.
    fn from(index: u16) -> Self {
        match index & VERSYM_VERSION {
            VER_NDX_GLOBAL => Self::Any,
            other => Self::Index(other),
        }
    }
}

/// How [`SymbolTable::index`] searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Compare every symbol in order.
    Linear,
    /// Use the SysV hash table at this image offset.
    SysV {
        /// Image offset of the table.
        table: usize,
    },
    /// Use the GNU hash table at this image offset.
    Gnu {
        /// Image offset of the table.
        table: usize,
    },
}

/// Counters filled in by [`SymbolTable::index_with_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    /// Lookups answered negatively by the bloom filter alone.
    pub bloom_rejections: u32,
    /// Symbols inspected while walking chains or scanning.
    pub chain_comparisons: u32,
}

/// A symbol array with name lookup.
#[derive(Clone, Copy)]
pub struct SymbolTable<'a, C> {
    symbols: Array<Symbol<'a, C>>,
    lookup: Lookup,
    versions: Option<Array<VersionIndex<'a>>>,
}

impl<C: ElfClass> fmt::Debug for SymbolTable<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.symbols)
            .field("lookup", &self.lookup)
            .field("versions", &self.versions)
            .finish()
    }
}

impl<'a, C: ElfClass> SymbolTable<'a, C> {
    /// Combine `symbols` with a lookup strategy and, optionally, the
    /// version index table running parallel to it.
    #[must_use]
    pub const fn new(
        symbols: Array<Symbol<'a, C>>,
        lookup: Lookup,
        versions: Option<Array<VersionIndex<'a>>>,
    ) -> Self {
        Self {
            symbols,
            lookup,
            versions,
        }
    }

    /// A table without symbols.
    #[must_use]
    pub const fn empty(image: &'a [u8]) -> Self {
        Self::new(Array::empty(Symbol::new(image, 0, 0)), Lookup::Linear, None)
    }

    /// The symbols.
    #[must_use]
    pub const fn symbols(&self) -> Array<Symbol<'a, C>> {
        self.symbols
    }

    /// The lookup strategy.
    #[must_use]
    pub const fn lookup(&self) -> Lookup {
        self.lookup
    }

    /// The version index table, if one is attached.
    #[must_use]
    pub const fn versions(&self) -> Option<Array<VersionIndex<'a>>> {
        self.versions
    }

    /// Number of symbols, including the null symbol.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.symbols.count()
    }

    /// Whether the table holds no symbols.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Symbol<'a, C> {
        self.symbols.get(index)
    }

    /// Index of the symbol called `name` with an acceptable version, or `0`
    /// if there is none.
    #[must_use]
    pub fn index(&self, name: &str, version: impl Into<SymbolVersion>) -> u32 {
        self.index_with_stats(name, version, &mut LookupStats::default())
    }

    /// Like [`index`](Self::index), with hashes of `name` computed by the
    /// caller (useful when searching several objects).
    #[must_use]
    pub fn index_with_hashes(
        &self,
        name: &str,
        gnu: u32,
        sysv: u32,
        version: impl Into<SymbolVersion>,
    ) -> u32 {
        self.search(
            name.as_bytes(),
            gnu,
            sysv,
            self.effective(version.into()),
            &mut LookupStats::default(),
        )
    }

    /// Like [`index`](Self::index), accumulating work counters in `stats`.
    pub fn index_with_stats(
        &self,
        name: &str,
        version: impl Into<SymbolVersion>,
        stats: &mut LookupStats,
    ) -> u32 {
        let name = name.as_bytes();
        let (gnu, sysv) = match self.lookup {
            Lookup::Linear => (0, 0),
            Lookup::SysV { .. } => (0, elf_hash(name)),
            Lookup::Gnu { .. } => (gnu_hash(name), 0),
        };
        self.search(name, gnu, sysv, self.effective(version.into()), stats)
    }

    /// The symbol called `name` with an acceptable version.
    #[must_use]
    pub fn find(&self, name: &str, version: impl Into<SymbolVersion>) -> Option<Symbol<'a, C>> {
        match self.index(name, version) {
            0 => None,
            index => Some(self.get(index as usize)),
        }
    }

    /// Name of the symbol at `index`, `None` for the null symbol.
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&'a [u8]> {
        (index != 0).then(|| self.symbols.get(index).name())
    }

    /// Version index of the symbol at `index`, `VER_NDX_GLOBAL` when no
    /// version table is attached.
    #[must_use]
    pub fn version(&self, index: usize) -> u16 {
        self.versions
            .map_or(VER_NDX_GLOBAL, |versions| versions.get(index).index())
    }

    /// Whether the symbol at `index` is hidden.
    #[must_use]
    pub fn hidden(&self, index: usize) -> bool {
        self.versions
            .is_some_and(|versions| versions.get(index).hidden())
    }

    fn effective(&self, version: SymbolVersion) -> SymbolVersion {
        if self.versions.is_none() {
            SymbolVersion::Any
        } else {
            version
        }
    }

    fn accepts(&self, index: u32, name: &[u8], version: SymbolVersion) -> bool {
        let index = index as usize;
        if index >= self.symbols.count() || self.symbols.get(index).name() != name {
            return false;
        }
        match (version, self.versions) {
            (SymbolVersion::Index(wanted), Some(versions)) => versions.get(index).index() == wanted,
            _ => true,
        }
    }

    fn search(
        &self,
        name: &[u8],
        gnu: u32,
        sysv: u32,
        version: SymbolVersion,
        stats: &mut LookupStats,
    ) -> u32 {
        let image = self.symbols.template().image();
        let found = match self.lookup {
            Lookup::Linear => self.search_linear(name, version, stats),
            Lookup::SysV { table } => {
                self.search_sysv(SysvHash::new(image, table), name, sysv, version, stats)
            }
            Lookup::Gnu { table } => {
                self.search_gnu(GnuHash::<C>::new(image, table), name, gnu, version, stats)
            }
        };
        log::trace!(
            "symbol lookup {:?} ({:?}) via {:?}: {found}",
            core::str::from_utf8(name).unwrap_or("<binary>"),
            version,
            self.lookup
        );
        found
    }

    #[expect(clippy::cast_possible_truncation, reason = "symbol counts fit in u32")]
    fn search_linear(&self, name: &[u8], version: SymbolVersion, stats: &mut LookupStats) -> u32 {
        for index in 1..self.symbols.count() as u32 {
            stats.chain_comparisons += 1;
            if self.accepts(index, name, version) {
                return index;
            }
        }
        0
    }

    fn search_sysv(
        &self,
        table: SysvHash<'a>,
        name: &[u8],
        hash: u32,
        version: SymbolVersion,
        stats: &mut LookupStats,
    ) -> u32 {
        let buckets = table.bucket_count();
        if buckets == 0 {
            return 0;
        }
        let mut index = table.bucket(hash % buckets);
        // A chain never visits more symbols than the table holds.
        for _ in 0..table.chain_count() {
            if index == 0 {
                break;
            }
            stats.chain_comparisons += 1;
            if self.accepts(index, name, version) {
                return index;
            }
            index = table.chain(index);
        }
        0
    }

    fn search_gnu(
        &self,
        table: GnuHash<'a, C>,
        name: &[u8],
        hash: u32,
        version: SymbolVersion,
        stats: &mut LookupStats,
    ) -> u32 {
        let buckets = table.bucket_count();
        if buckets == 0 || table.bloom_size() == 0 {
            return 0;
        }
        if !table.bloom_may_contain(hash) {
            stats.bloom_rejections += 1;
            return 0;
        }
        let mut index = table.bucket(hash % buckets);
        if index == 0 {
            return 0;
        }
        loop {
            let chained = table.chain(index);
            stats.chain_comparisons += 1;
            if (hash | 1) == (chained | 1) && self.accepts(index, name, version) {
                return index;
            }
            if chained & 1 != 0 {
                return 0;
            }
            index += 1;
        }
    }
}
