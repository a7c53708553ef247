//! Byte-level image builders shared by the unit tests.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::wildcard_imports,
    missing_docs
)]

use std::marker::PhantomData;

use crate::class::ElfClass;
use crate::consts::*;
use crate::hash::{elf_hash, gnu_hash};

// ---------------------------------------------------------------------------
// Raw encoders
// ---------------------------------------------------------------------------

pub(crate) fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_ne_bytes());
}

pub(crate) fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_ne_bytes());
}

pub(crate) fn put_word<C: ElfClass>(buf: &mut Vec<u8>, v: u64) {
    if C::WORD == 4 {
        buf.extend_from_slice(&(v as u32).to_ne_bytes());
    } else {
        buf.extend_from_slice(&v.to_ne_bytes());
    }
}

pub(crate) fn patch(buf: &mut [u8], off: usize, bytes: &[u8]) {
    buf[off..off + bytes.len()].copy_from_slice(bytes);
}

pub(crate) fn patch_word<C: ElfClass>(buf: &mut [u8], off: usize, v: u64) {
    let mut tmp = Vec::new();
    put_word::<C>(&mut tmp, v);
    patch(buf, off, &tmp);
}

pub(crate) fn r_info<C: ElfClass>(sym: u32, ty: u32) -> u64 {
    if C::WORD == 4 {
        (u64::from(sym) << 8) | u64::from(ty & 0xff)
    } else {
        (u64::from(sym) << 32) | u64::from(ty)
    }
}

/// Encode one symbol table entry.
pub(crate) fn sym<C: ElfClass>(
    name: u32,
    value: u64,
    size: u64,
    info: u8,
    other: u8,
    shndx: u16,
) -> Vec<u8> {
    let mut b = vec![0u8; C::SYM.total];
    patch(&mut b, C::SYM.name, &name.to_ne_bytes());
    patch_word::<C>(&mut b, C::SYM.value, value);
    patch_word::<C>(&mut b, C::SYM.size, size);
    b[C::SYM.info] = info;
    b[C::SYM.other] = other;
    patch(&mut b, C::SYM.shndx, &shndx.to_ne_bytes());
    b
}

/// Encode one relocation entry, with addend when `addend` is `Some`.
pub(crate) fn reloc<C: ElfClass>(offset: u64, sym: u32, ty: u32, addend: Option<i64>) -> Vec<u8> {
    let mut b = Vec::new();
    put_word::<C>(&mut b, offset);
    put_word::<C>(&mut b, r_info::<C>(sym, ty));
    if let Some(a) = addend {
        put_word::<C>(&mut b, a as u64);
    }
    b
}

/// Encode a dynamic table.
pub(crate) fn dynamic<C: ElfClass>(entries: &[(i64, u64)]) -> Vec<u8> {
    let mut b = Vec::new();
    for &(tag, val) in entries {
        put_word::<C>(&mut b, tag as u64);
        put_word::<C>(&mut b, val);
    }
    b
}

/// Encode a note record.
pub(crate) fn note(name: &[u8], desc: &[u8], ty: u32) -> Vec<u8> {
    let mut b = Vec::new();
    put_u32(&mut b, name.len() as u32);
    put_u32(&mut b, desc.len() as u32);
    put_u32(&mut b, ty);
    b.extend_from_slice(name);
    while b.len() % 4 != 0 {
        b.push(0);
    }
    b.extend_from_slice(desc);
    while b.len() % 4 != 0 {
        b.push(0);
    }
    b
}

/// A string table under construction. Offset 0 is the empty string.
#[derive(Default)]
pub(crate) struct StrTab {
    bytes: Vec<u8>,
}

impl StrTab {
    pub(crate) fn new() -> Self {
        Self { bytes: vec![0] }
    }

    pub(crate) fn add(&mut self, s: &str) -> u32 {
        let off = self.bytes.len() as u32;
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        off
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Encode a SysV hash table. `names[i]` is the name of symbol `i`.
pub(crate) fn sysv_hash(names: &[&str], nbucket: u32) -> Vec<u8> {
    let nchain = names.len() as u32;
    let mut buckets = vec![0u32; nbucket as usize];
    let mut tails = vec![0u32; nbucket as usize];
    let mut chains = vec![0u32; nchain as usize];
    for (i, name) in names.iter().enumerate().skip(1) {
        let b = (elf_hash(name.as_bytes()) % nbucket) as usize;
        // Append, so chains visit symbols in table order.
        if buckets[b] == 0 {
            buckets[b] = i as u32;
        } else {
            chains[tails[b] as usize] = i as u32;
        }
        tails[b] = i as u32;
    }
    let mut out = Vec::new();
    put_u32(&mut out, nbucket);
    put_u32(&mut out, nchain);
    buckets.iter().for_each(|&v| put_u32(&mut out, v));
    chains.iter().for_each(|&v| put_u32(&mut out, v));
    out
}

/// Order `names` so that a GNU hash table with `nbuckets` buckets can be
/// built over them.
pub(crate) fn gnu_order<'n>(names: &[&'n str], nbuckets: u32) -> Vec<&'n str> {
    let mut sorted = names.to_vec();
    sorted.sort_by_key(|n| gnu_hash(n.as_bytes()) % nbuckets);
    sorted
}

/// Encode a GNU hash table. `names[i]` is the name of symbol `i`; symbols
/// from `symoffset` on must already be grouped by bucket (see [`gnu_order`]).
pub(crate) fn gnu_hash_table<C: ElfClass>(
    names: &[&str],
    symoffset: u32,
    nbuckets: u32,
    bloom_size: u32,
    bloom_shift: u32,
) -> Vec<u8> {
    let bits = (C::WORD * 8) as u32;
    let mut bloom = vec![0u64; bloom_size as usize];
    let mut buckets = vec![0u32; nbuckets as usize];
    let hashed = &names[symoffset as usize..];
    let mut chain = vec![0u32; hashed.len()];
    let mut last_bucket = None;
    for (j, name) in hashed.iter().enumerate() {
        let h = gnu_hash(name.as_bytes());
        let b = h % nbuckets;
        if let Some(prev) = last_bucket {
            assert!(prev <= b, "symbols must be grouped by bucket");
        }
        last_bucket = Some(b);
        if buckets[b as usize] == 0 {
            buckets[b as usize] = symoffset + j as u32;
        }
        let word = ((h / bits) % bloom_size) as usize;
        bloom[word] |= (1u64 << (h % bits)) | (1u64 << ((h >> bloom_shift) % bits));
        let end_of_chain = hashed
            .get(j + 1)
            .is_none_or(|next| gnu_hash(next.as_bytes()) % nbuckets != b);
        chain[j] = (h & !1) | u32::from(end_of_chain);
    }
    let mut out = Vec::new();
    put_u32(&mut out, nbuckets);
    put_u32(&mut out, symoffset);
    put_u32(&mut out, bloom_size);
    put_u32(&mut out, bloom_shift);
    bloom.iter().for_each(|&w| put_word::<C>(&mut out, w));
    buckets.iter().for_each(|&v| put_u32(&mut out, v));
    chain.iter().for_each(|&v| put_u32(&mut out, v));
    out
}

// ---------------------------------------------------------------------------
// ImageBuilder
// ---------------------------------------------------------------------------

/// A section header to be written by [`ImageBuilder`].
#[derive(Clone, Copy, Default)]
pub(crate) struct Shdr {
    pub kind: u32,
    pub flags: u64,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub align: u64,
    pub entsize: u64,
}

/// A program header to be written by [`ImageBuilder`].
#[derive(Clone, Copy, Default)]
pub(crate) struct Phdr {
    pub kind: u32,
    pub flags: u32,
    pub offset: u64,
    pub vaddr: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub align: u64,
}

/// Lays out an image as: file header, payload, program headers, section
/// headers. Section 0 is the null section; `.shstrtab` is added last.
pub(crate) struct ImageBuilder<C> {
    e_type: u16,
    machine: u16,
    entry: u64,
    payload: Vec<u8>,
    sections: Vec<(u32, Shdr)>,
    segments: Vec<Phdr>,
    names: StrTab,
    load_bias: Option<u64>,
    _class: PhantomData<C>,
}

impl<C: ElfClass> ImageBuilder<C> {
    pub(crate) fn new(e_type: u16, machine: u16) -> Self {
        Self {
            e_type,
            machine,
            entry: 0,
            payload: Vec::new(),
            sections: Vec::new(),
            segments: Vec::new(),
            names: StrTab::new(),
            load_bias: None,
            _class: PhantomData,
        }
    }

    pub(crate) fn entry(mut self, entry: u64) -> Self {
        self.entry = entry;
        self
    }

    /// Map the whole file with one `PT_LOAD` at virtual address `bias`.
    pub(crate) fn load_at(mut self, bias: u64) -> Self {
        self.load_bias = Some(bias);
        self
    }

    /// File offset the next appended byte will land at.
    pub(crate) fn cursor(&self) -> u64 {
        (C::EHDR.size + self.payload.len()) as u64
    }

    /// Append `bytes` at the next `align`-aligned offset, returning it.
    pub(crate) fn append(&mut self, bytes: &[u8], align: usize) -> u64 {
        while self.cursor() as usize % align != 0 {
            self.payload.push(0);
        }
        let offset = self.cursor();
        self.payload.extend_from_slice(bytes);
        offset
    }

    /// Add a section header, returning its index.
    pub(crate) fn section(&mut self, name: &str, shdr: Shdr) -> u16 {
        let name = self.names.add(name);
        self.sections.push((name, shdr));
        self.sections.len() as u16
    }

    /// Index the next added section will get.
    pub(crate) fn next_section_index(&self) -> u16 {
        self.sections.len() as u16 + 1
    }

    pub(crate) fn segment(&mut self, phdr: Phdr) {
        self.segments.push(phdr);
    }

    pub(crate) fn build(mut self) -> Vec<u8> {
        let shstrtab = self.names.add(".shstrtab");
        let names = self.names.bytes().to_vec();
        let names_off = self.append(&names, 1);
        self.sections.push((
            shstrtab,
            Shdr {
                kind: SHT_STRTAB,
                offset: names_off,
                size: names.len() as u64,
                align: 1,
                ..Shdr::default()
            },
        ));
        while self.cursor() as usize % 8 != 0 {
            self.payload.push(0);
        }

        let phnum = self.segments.len() + usize::from(self.load_bias.is_some());
        let phoff = self.cursor() as usize;
        let shoff = phoff + phnum * C::PHDR.size;
        let shnum = self.sections.len() + 1;
        let total = shoff + shnum * C::SHDR.total;

        let mut out = vec![0u8; C::EHDR.size];
        patch(&mut out, 0, &ELF_MAGIC);
        out[EI_CLASS] = C::CLASS;
        out[EI_DATA] = ELFDATA_HOST;
        out[EI_VERSION] = EV_CURRENT as u8;
        patch(&mut out, 16, &self.e_type.to_ne_bytes());
        patch(&mut out, 18, &self.machine.to_ne_bytes());
        patch(&mut out, 20, &EV_CURRENT.to_ne_bytes());
        patch_word::<C>(&mut out, C::EHDR.entry, self.entry);
        patch_word::<C>(&mut out, C::EHDR.phoff, if phnum > 0 { phoff as u64 } else { 0 });
        patch_word::<C>(&mut out, C::EHDR.shoff, shoff as u64);
        patch(&mut out, C::EHDR.ehsize, &(C::EHDR.size as u16).to_ne_bytes());
        patch(&mut out, C::EHDR.phentsize, &(C::PHDR.size as u16).to_ne_bytes());
        patch(&mut out, C::EHDR.phnum, &(phnum as u16).to_ne_bytes());
        patch(&mut out, C::EHDR.shentsize, &(C::SHDR.total as u16).to_ne_bytes());
        patch(&mut out, C::EHDR.shnum, &(shnum as u16).to_ne_bytes());
        patch(&mut out, C::EHDR.shstrndx, &(self.sections.len() as u16).to_ne_bytes());
        out.extend_from_slice(&self.payload);

        let mut segments = Vec::new();
        if let Some(bias) = self.load_bias {
            segments.push(Phdr {
                kind: PT_LOAD,
                flags: 0x5,
                offset: 0,
                vaddr: bias,
                filesz: total as u64,
                memsz: total as u64,
                align: 0x1000,
            });
        }
        segments.extend_from_slice(&self.segments);
        for p in &segments {
            let mut b = vec![0u8; C::PHDR.size];
            patch(&mut b, C::PHDR.kind, &p.kind.to_ne_bytes());
            patch(&mut b, C::PHDR.flags, &p.flags.to_ne_bytes());
            patch_word::<C>(&mut b, C::PHDR.offset, p.offset);
            patch_word::<C>(&mut b, C::PHDR.vaddr, p.vaddr);
            patch_word::<C>(&mut b, C::PHDR.paddr, p.vaddr);
            patch_word::<C>(&mut b, C::PHDR.filesz, p.filesz);
            patch_word::<C>(&mut b, C::PHDR.memsz, p.memsz);
            patch_word::<C>(&mut b, C::PHDR.align, p.align);
            out.extend_from_slice(&b);
        }

        out.extend_from_slice(&vec![0u8; C::SHDR.total]);
        for (name, s) in &self.sections {
            let mut b = vec![0u8; C::SHDR.total];
            patch(&mut b, C::SHDR.name, &name.to_ne_bytes());
            patch(&mut b, C::SHDR.kind, &s.kind.to_ne_bytes());
            patch_word::<C>(&mut b, C::SHDR.flags, s.flags);
            patch_word::<C>(&mut b, C::SHDR.addr, s.addr);
            patch_word::<C>(&mut b, C::SHDR.offset, s.offset);
            patch_word::<C>(&mut b, C::SHDR.size, s.size);
            patch(&mut b, C::SHDR.link, &s.link.to_ne_bytes());
            patch(&mut b, C::SHDR.info, &s.info.to_ne_bytes());
            patch_word::<C>(&mut b, C::SHDR.align, s.align);
            patch_word::<C>(&mut b, C::SHDR.entsize, s.entsize);
            out.extend_from_slice(&b);
        }
        assert_eq!(out.len(), total);
        out
    }
}

// ---------------------------------------------------------------------------
// Shared object fixture
// ---------------------------------------------------------------------------

/// Version index of `VERS_1` in [`Dso`].
pub(crate) const VERS_1: u16 = 2;
/// Version index of `VERS_2` in [`Dso`].
pub(crate) const VERS_2: u16 = 3;
/// Version index of the `GLIBC_2.2.5` requirement in [`Dso`].
pub(crate) const GLIBC: u16 = 4;

/// Virtual address of the first `PT_LOAD` of [`Dso`] images built by
/// [`Dso::build`].
pub(crate) const DSO_BIAS: u64 = 0x1_0000;

/// A dynamically linked object with every table the resolver knows about.
///
/// Symbols: `printf` (undefined, `GLIBC_2.2.5`), two definitions of `foo`
/// (`VERS_1` and `VERS_2`), `bar` (object, global version), `baz`
/// (hidden).
pub(crate) struct Dso {
    /// The file image.
    pub image: Vec<u8>,
    /// Symbol names in table order.
    pub names: Vec<&'static str>,
    /// Symbol index of the first symbol covered by the GNU hash table.
    pub symoffset: u32,
    /// File offset of `.dynamic`.
    pub dynamic_offset: u64,
    /// Number of dynamic entries up to and including the first `DT_NULL`.
    pub dynamic_entries: usize,
    /// Virtual address assigned to the `foo@VERS_2` definition.
    pub foo_v2_value: u64,
}

impl Dso {
    /// Build the fixture as `e_type`, mapped at `bias`.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn build<C: ElfClass>(e_type: u16, bias: u64) -> Self {
        let machine = if C::WORD == 8 { EM_X86_64 } else { EM_386 };
        let rela = C::WORD == 8;
        let mut b = ImageBuilder::<C>::new(e_type, machine).load_at(bias);
        let va = |off: u64| off + bias;

        // .interp
        let interp = b"/lib/ld-linux.so.2\0";
        let interp_off = b.append(interp, 1);
        b.section(
            ".interp",
            Shdr {
                kind: SHT_PROGBITS,
                flags: 0x2,
                addr: va(interp_off),
                offset: interp_off,
                size: interp.len() as u64,
                align: 1,
                ..Shdr::default()
            },
        );

        // .note.gnu.build-id
        let build_id = note(b"GNU\0", &[0xde, 0xad, 0xbe, 0xef, 0x01], NT_GNU_BUILD_ID);
        let abi_tag = note(b"GNU\0", &[0u8; 16], NT_GNU_ABI_TAG);
        let mut notes = build_id.clone();
        notes.extend_from_slice(&abi_tag);
        let note_off = b.append(&notes, 4);
        b.section(
            ".note",
            Shdr {
                kind: SHT_NOTE,
                flags: 0x2,
                addr: va(note_off),
                offset: note_off,
                size: notes.len() as u64,
                align: 4,
                ..Shdr::default()
            },
        );

        // .dynstr
        let mut strtab = StrTab::new();
        let s_libc = strtab.add("libc.so.6");
        let s_libm = strtab.add("libm.so.6");
        let s_soname = strtab.add("libfixture.so");
        let s_rpath = strtab.add("$ORIGIN/lib");
        let s_runpath = strtab.add("/opt/run");
        let s_vers1 = strtab.add("VERS_1");
        let s_vers2 = strtab.add("VERS_2");
        let s_glibc = strtab.add("GLIBC_2.2.5");

        // Symbol order: null, printf (undefined), then the hashed symbols
        // grouped by GNU bucket.
        let nbuckets = 3;
        let hashed = gnu_order(&["foo", "foo", "bar", "baz"], nbuckets);
        let mut names = vec!["", "printf"];
        names.extend_from_slice(&hashed);
        let symoffset = 2u32;
        let name_offs: Vec<u32> = names
            .iter()
            .map(|n| if n.is_empty() { 0 } else { strtab.add(n) })
            .collect();
        let dynstr = strtab.bytes().to_vec();
        let dynstr_off = b.append(&dynstr, 1);
        let dynstr_idx = b.section(
            ".dynstr",
            Shdr {
                kind: SHT_STRTAB,
                flags: 0x2,
                addr: va(dynstr_off),
                offset: dynstr_off,
                size: dynstr.len() as u64,
                align: 1,
                ..Shdr::default()
            },
        );

        // .dynsym and .gnu.version
        let text = va(0x800);
        let mut dynsym = Vec::new();
        let mut versym = Vec::new();
        let mut foo_seen = false;
        let mut foo_v2_value = 0;
        for (i, name) in names.iter().enumerate() {
            let (value, size, info, other, shndx, ver) = match *name {
                "" => (0, 0, 0, 0, SHN_UNDEF, VER_NDX_LOCAL),
                "printf" => (0, 0, (STB_GLOBAL << 4) | STT_FUNC, 0, SHN_UNDEF, GLIBC),
                "foo" if !foo_seen => {
                    foo_seen = true;
                    (text, 16, (STB_GLOBAL << 4) | STT_FUNC, 0, 1, VERS_1)
                }
                "foo" => {
                    foo_v2_value = text + 0x20;
                    (text + 0x20, 16, (STB_GLOBAL << 4) | STT_FUNC, 0, 1, VERS_2)
                }
                "bar" => (text + 0x40, 8, (STB_GLOBAL << 4) | STT_OBJECT, 0, 1, VER_NDX_GLOBAL),
                "baz" => (
                    text + 0x60,
                    4,
                    (STB_WEAK << 4) | STT_FUNC,
                    STV_HIDDEN,
                    1,
                    VER_NDX_GLOBAL | VERSYM_HIDDEN,
                ),
                _ => unreachable!(),
            };
            dynsym.extend(sym::<C>(name_offs[i], value, size, info, other, shndx));
            put_u16(&mut versym, ver);
        }
        let dynsym_idx = b.next_section_index();
        let dynsym_off = b.append(&dynsym, C::WORD);
        b.section(
            ".dynsym",
            Shdr {
                kind: SHT_DYNSYM,
                flags: 0x2,
                addr: va(dynsym_off),
                offset: dynsym_off,
                size: dynsym.len() as u64,
                link: u32::from(dynstr_idx),
                info: 2,
                align: C::WORD as u64,
                entsize: C::SYM.total as u64,
            },
        );
        let versym_off = b.append(&versym, 2);
        b.section(
            ".gnu.version",
            Shdr {
                kind: SHT_GNU_VERSYM,
                flags: 0x2,
                addr: va(versym_off),
                offset: versym_off,
                size: versym.len() as u64,
                link: u32::from(dynsym_idx),
                align: 2,
                entsize: 2,
                ..Shdr::default()
            },
        );

        // .gnu.version_d: base, VERS_1, VERS_2 (inherits VERS_1).
        let mut verdef = Vec::new();
        let defs: [(u16, u16, &[u32], &str); 3] = [
            (1, 1, &[s_soname], "libfixture.so"),
            (0, VERS_1, &[s_vers1], "VERS_1"),
            (0, VERS_2, &[s_vers2, s_vers1], "VERS_2"),
        ];
        for (i, (flags, ndx, auxes, name)) in defs.iter().enumerate() {
            let last = i + 1 == defs.len();
            let aux_len = 8 * auxes.len() as u32;
            put_u16(&mut verdef, VER_DEF_CURRENT);
            put_u16(&mut verdef, *flags);
            put_u16(&mut verdef, *ndx);
            put_u16(&mut verdef, auxes.len() as u16);
            put_u32(&mut verdef, elf_hash(name.as_bytes()));
            put_u32(&mut verdef, 20);
            put_u32(&mut verdef, if last { 0 } else { 20 + aux_len });
            for (j, aux) in auxes.iter().enumerate() {
                put_u32(&mut verdef, *aux);
                put_u32(&mut verdef, if j + 1 == auxes.len() { 0 } else { 8 });
            }
        }
        let verdef_off = b.append(&verdef, 4);
        b.section(
            ".gnu.version_d",
            Shdr {
                kind: SHT_GNU_VERDEF,
                flags: 0x2,
                addr: va(verdef_off),
                offset: verdef_off,
                size: verdef.len() as u64,
                link: u32::from(dynstr_idx),
                info: defs.len() as u32,
                align: 4,
                ..Shdr::default()
            },
        );

        // .gnu.version_r: libc.so.6 needs GLIBC_2.2.5.
        let mut verneed = Vec::new();
        put_u16(&mut verneed, VER_NEED_CURRENT);
        put_u16(&mut verneed, 1);
        put_u32(&mut verneed, s_libc);
        put_u32(&mut verneed, 16);
        put_u32(&mut verneed, 0);
        put_u32(&mut verneed, elf_hash(b"GLIBC_2.2.5"));
        put_u16(&mut verneed, 0);
        put_u16(&mut verneed, GLIBC);
        put_u32(&mut verneed, s_glibc);
        put_u32(&mut verneed, 0);
        let verneed_off = b.append(&verneed, 4);
        b.section(
            ".gnu.version_r",
            Shdr {
                kind: SHT_GNU_VERNEED,
                flags: 0x2,
                addr: va(verneed_off),
                offset: verneed_off,
                size: verneed.len() as u64,
                link: u32::from(dynstr_idx),
                info: 1,
                align: 4,
                ..Shdr::default()
            },
        );

        // .hash and .gnu.hash
        let hash = sysv_hash(&names, 3);
        let hash_off = b.append(&hash, 4);
        b.section(
            ".hash",
            Shdr {
                kind: SHT_HASH,
                flags: 0x2,
                addr: va(hash_off),
                offset: hash_off,
                size: hash.len() as u64,
                link: u32::from(dynsym_idx),
                align: 4,
                entsize: 4,
                ..Shdr::default()
            },
        );
        let gnu = gnu_hash_table::<C>(&names, symoffset, nbuckets, 2, 6);
        let gnu_off = b.append(&gnu, C::WORD);
        b.section(
            ".gnu.hash",
            Shdr {
                kind: SHT_GNU_HASH,
                flags: 0x2,
                addr: va(gnu_off),
                offset: gnu_off,
                size: gnu.len() as u64,
                link: u32::from(dynsym_idx),
                align: C::WORD as u64,
                ..Shdr::default()
            },
        );

        // .init_array / .fini_array
        let mut init = Vec::new();
        put_word::<C>(&mut init, text + 0x100);
        put_word::<C>(&mut init, text + 0x110);
        let init_off = b.append(&init, C::WORD);
        let mut fini = Vec::new();
        put_word::<C>(&mut fini, text + 0x120);
        let fini_off = b.append(&fini, C::WORD);

        // .got: three reserved words, one PLT slot.
        let mut got = Vec::new();
        for _ in 0..4 {
            put_word::<C>(&mut got, 0);
        }
        let got_off = b.append(&got, C::WORD);
        let slot = va(got_off) + 3 * C::WORD as u64;

        // Relocations.
        let (rel_kind, rel_name, plt_name, relative, glob_dat, jump_slot) = if rela {
            (SHT_RELA, ".rela.dyn", ".rela.plt", R_X86_64_RELATIVE, R_X86_64_GLOB_DAT, R_X86_64_JUMP_SLOT)
        } else {
            (SHT_REL, ".rel.dyn", ".rel.plt", R_386_RELATIVE, R_386_GLOB_DAT, R_386_JMP_SLOT)
        };
        let addend = |a: i64| rela.then_some(a);
        let bar_idx = names.iter().position(|n| *n == "bar").unwrap() as u32;
        let mut reldyn = reloc::<C>(va(init_off), 0, relative, addend(0x100));
        reldyn.extend(reloc::<C>(va(got_off), bar_idx, glob_dat, addend(0)));
        let reldyn_off = b.append(&reldyn, C::WORD);
        let relent = (if rela { C::RELA_SIZE } else { C::REL_SIZE }) as u64;
        b.section(
            rel_name,
            Shdr {
                kind: rel_kind,
                flags: 0x2,
                addr: va(reldyn_off),
                offset: reldyn_off,
                size: reldyn.len() as u64,
                link: u32::from(dynsym_idx),
                align: C::WORD as u64,
                entsize: relent,
                ..Shdr::default()
            },
        );
        let relplt = reloc::<C>(slot, 1, jump_slot, addend(0));
        let relplt_off = b.append(&relplt, C::WORD);
        b.section(
            plt_name,
            Shdr {
                kind: rel_kind,
                flags: 0x42,
                addr: va(relplt_off),
                offset: relplt_off,
                size: relplt.len() as u64,
                link: u32::from(dynsym_idx),
                align: C::WORD as u64,
                entsize: relent,
                ..Shdr::default()
            },
        );

        // .dynamic, padded with extra DT_NULL entries after the terminator.
        let (t_rel, t_relsz, t_relent, t_pltrel) = if rela {
            (DT_RELA, DT_RELASZ, DT_RELAENT, DT_RELA as u64)
        } else {
            (DT_REL, DT_RELSZ, DT_RELENT, DT_REL as u64)
        };
        let entries: Vec<(i64, u64)> = vec![
            (DT_NEEDED, u64::from(s_libc)),
            (DT_NEEDED, u64::from(s_libm)),
            (DT_SONAME, u64::from(s_soname)),
            (DT_RPATH, u64::from(s_rpath)),
            (DT_RUNPATH, u64::from(s_runpath)),
            (DT_HASH, va(hash_off)),
            (DT_GNU_HASH, va(gnu_off)),
            (DT_STRTAB, va(dynstr_off)),
            (DT_STRSZ, dynstr.len() as u64),
            (DT_SYMTAB, va(dynsym_off)),
            (DT_SYMENT, C::SYM.total as u64),
            (DT_VERSYM, va(versym_off)),
            (DT_VERDEF, va(verdef_off)),
            (DT_VERDEFNUM, 3),
            (DT_VERNEED, va(verneed_off)),
            (DT_VERNEEDNUM, 1),
            (t_rel, va(reldyn_off)),
            (t_relsz, reldyn.len() as u64),
            (t_relent, relent),
            (DT_JMPREL, va(relplt_off)),
            (DT_PLTREL, t_pltrel),
            (DT_PLTRELSZ, relplt.len() as u64),
            (DT_PLTGOT, va(got_off)),
            (DT_INIT, text + 0x200),
            (DT_FINI, text + 0x210),
            (DT_INIT_ARRAY, va(init_off)),
            (DT_INIT_ARRAYSZ, init.len() as u64),
            (DT_FINI_ARRAY, va(fini_off)),
            (DT_FINI_ARRAYSZ, fini.len() as u64),
            (DT_FLAGS, 0x8),
            (DT_FLAGS_1, 0x1 | 0x800_0000),
            (DT_NULL, 0),
            (DT_NULL, 0),
            (DT_NULL, 0),
        ];
        let dynamic_entries = entries.len() - 2;
        let dyn_bytes = dynamic::<C>(&entries);
        let dynamic_offset = b.append(&dyn_bytes, C::WORD);
        b.section(
            ".dynamic",
            Shdr {
                kind: SHT_DYNAMIC,
                flags: 0x3,
                addr: va(dynamic_offset),
                offset: dynamic_offset,
                size: dyn_bytes.len() as u64,
                link: u32::from(dynstr_idx),
                align: C::WORD as u64,
                entsize: C::DYN_SIZE as u64,
                ..Shdr::default()
            },
        );

        b.segment(Phdr {
            kind: PT_DYNAMIC,
            flags: 0x6,
            offset: dynamic_offset,
            vaddr: va(dynamic_offset),
            filesz: dyn_bytes.len() as u64,
            memsz: dyn_bytes.len() as u64,
            align: C::WORD as u64,
        });
        b.segment(Phdr {
            kind: PT_INTERP,
            flags: 0x4,
            offset: interp_off,
            vaddr: va(interp_off),
            filesz: interp.len() as u64,
            memsz: interp.len() as u64,
            align: 1,
        });
        b.segment(Phdr {
            kind: PT_NOTE,
            flags: 0x4,
            offset: note_off,
            vaddr: va(note_off),
            filesz: notes.len() as u64,
            memsz: notes.len() as u64,
            align: 4,
        });

        Self {
            image: b.build(),
            names,
            symoffset,
            dynamic_offset,
            dynamic_entries,
            foo_v2_value,
        }
    }

    /// Build the fixture as a shared object mapped at [`DSO_BIAS`].
    pub(crate) fn shared<C: ElfClass>() -> Self {
        Self::build::<C>(ET_DYN, DSO_BIAS)
    }

    /// The memory image of a shared object built by [`Dso::shared`]: the
    /// file copied to [`DSO_BIAS`], so virtual addresses index it directly.
    /// The start of the buffer repeats the file so the headers are found at
    /// offset 0.
    pub(crate) fn mapped(&self) -> Vec<u8> {
        assert!(self.image.len() <= DSO_BIAS as usize);
        let mut memory = self.image.clone();
        memory.resize(DSO_BIAS as usize, 0);
        memory.extend_from_slice(&self.image);
        memory
    }

    /// Symbol index of the first symbol called `name`.
    pub(crate) fn index_of(&self, name: &str) -> usize {
        self.names.iter().position(|n| *n == name).unwrap()
    }
}
