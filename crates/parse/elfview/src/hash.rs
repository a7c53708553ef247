//! Symbol hash functions and hash table views.
//!
//! Two table formats exist. The SysV table (`DT_HASH`) chains every symbol
//! through per-symbol links. The GNU table (`DT_GNU_HASH`) puts a bloom
//! filter in front, groups hashed symbols by bucket and marks the last
//! symbol of each bucket in a packed chain of hash values.

use core::marker::PhantomData;

use crate::class::ElfClass;
use crate::view::Accessor;

/// The SysV ELF hash of `name`.
#[must_use]
pub fn elf_hash(name: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &c in name {
        h = (h << 4).wrapping_add(u32::from(c));
        let g = h & 0xf000_0000;
        if g != 0 {
            h ^= g >> 24;
        }
        h &= !g;
    }
    h
}

/// The GNU (DJB, `h * 33 + c`) hash of `name`.
#[must_use]
pub fn gnu_hash(name: &[u8]) -> u32 {
    name.iter()
        .fold(5381_u32, |h, &c| h.wrapping_mul(33).wrapping_add(u32::from(c)))
}

// ---------------------------------------------------------------------------
// SysV
// ---------------------------------------------------------------------------

/// A SysV hash table: `nbucket`, `nchain`, buckets, chains (all `u32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysvHash<'a> {
    raw: Accessor<'a>,
}

impl<'a> SysvHash<'a> {
    /// View the table at `offset` within `image`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
        }
    }

    /// Number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> u32 {
        self.raw.u32(0)
    }

    /// Number of chain entries, equal to the number of symbols.
    #[must_use]
    pub fn chain_count(&self) -> u32 {
        self.raw.u32(4)
    }

    /// First symbol index of bucket `index`.
    #[must_use]
    pub fn bucket(&self, index: u32) -> u32 {
        self.raw.u32(8 + 4 * index as usize)
    }

    /// Symbol index following `symbol` in its chain, 0 at the end.
    #[must_use]
    pub fn chain(&self, symbol: u32) -> u32 {
        let buckets = self.bucket_count() as usize;
        self.raw.u32(8 + 4 * buckets + 4 * symbol as usize)
    }

    /// Number of symbols in the associated symbol table.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.chain_count() as usize
    }
}

// ---------------------------------------------------------------------------
// GNU
// ---------------------------------------------------------------------------

/// A GNU hash table: four `u32` header words, the bloom filter (address
/// sized words), buckets and the hash value chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GnuHash<'a, C> {
    raw: Accessor<'a>,
    _class: PhantomData<C>,
}

impl<'a, C: ElfClass> GnuHash<'a, C> {
    const HEADER: usize = 16;

    /// View the table at `offset` within `image`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            _class: PhantomData,
        }
    }

    /// Number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> u32 {
        self.raw.u32(0)
    }

    /// Index of the first symbol covered by the table.
    #[must_use]
    pub fn symbol_offset(&self) -> u32 {
        self.raw.u32(4)
    }

    /// Number of bloom filter words.
    #[must_use]
    pub fn bloom_size(&self) -> u32 {
        self.raw.u32(8)
    }

    /// Shift applied to derive the second bloom bit.
    #[must_use]
    pub fn bloom_shift(&self) -> u32 {
        self.raw.u32(12)
    }

    /// Bloom filter word `index`.
    #[must_use]
    pub fn bloom(&self, index: u32) -> u64 {
        self.raw.word::<C>(Self::HEADER + index as usize * C::WORD)
    }

    /// First symbol index of bucket `index`, 0 for an empty bucket.
    #[must_use]
    pub fn bucket(&self, index: u32) -> u32 {
        self.raw.u32(self.buckets_start() + 4 * index as usize)
    }

    /// Chain hash value of `symbol`, which must be at least
    /// [`symbol_offset`](Self::symbol_offset).
    ///
    /// The low bit marks the last symbol of a bucket.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is below the symbol offset.
    #[must_use]
    pub fn chain(&self, symbol: u32) -> u32 {
        let Some(slot) = symbol.checked_sub(self.symbol_offset()) else {
            panic!(
                "GNU hash chain lookup for symbol {symbol} below symbol offset {}",
                self.symbol_offset()
            );
        };
        let chain_start = self.buckets_start() + 4 * self.bucket_count() as usize;
        self.raw.u32(chain_start + 4 * slot as usize)
    }

    /// Whether the bloom filter lets a name with hash `hash` through.
    ///
    /// `false` proves the name is absent; `true` only means it may be
    /// present.
    ///
    /// # Panics
    ///
    /// Panics if the table declares an empty bloom filter or a shift of 32
    /// bits or more.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "word width is 4 or 8")]
    pub fn bloom_may_contain(&self, hash: u32) -> bool {
        let size = self.bloom_size();
        let shift = self.bloom_shift();
        assert!(size != 0, "GNU hash table has an empty bloom filter");
        assert!(shift < u32::BITS, "GNU hash bloom shift {shift} out of range");
        let bits = (C::WORD * 8) as u32;
        let word = self.bloom((hash / bits) % size);
        let mask = (1u64 << (hash % bits)) | (1u64 << ((hash >> shift) % bits));
        word & mask == mask
    }

    /// Number of symbols in the associated symbol table.
    ///
    /// The table does not store this, so it is derived: the last symbol is
    /// the end of the chain starting at the highest bucket entry. A table
    /// whose buckets are all empty only covers undefined symbols; the
    /// symbol offset is returned then, which undercounts any undefined
    /// symbols placed after it.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        let Some(mut last) = (0..self.bucket_count()).map(|i| self.bucket(i)).max() else {
            return self.symbol_offset() as usize;
        };
        if last == 0 {
            log::warn!(
                "GNU hash table has only empty buckets, assuming {} symbols",
                self.symbol_offset()
            );
            return self.symbol_offset() as usize;
        }
        while self.chain(last) & 1 == 0 {
            last += 1;
        }
        last as usize + 1
    }

    fn buckets_start(&self) -> usize {
        Self::HEADER + self.bloom_size() as usize * C::WORD
    }
}
