//! ELF constants shared by both classes.
//!
//! Values follow the System V gABI, the GNU extensions and the i386 and
//! x86-64 psABI supplements. Bit sets are exposed through `bitflags` types.

// ---------------------------------------------------------------------------
// Identification
// ---------------------------------------------------------------------------

/// ELF magic bytes: `\x7fELF`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
/// Size of the `e_ident` array.
pub const EI_NIDENT: usize = 16;
/// Index of the class byte in `e_ident`.
pub const EI_CLASS: usize = 4;
/// Index of the data encoding byte in `e_ident`.
pub const EI_DATA: usize = 5;
/// Index of the identification version byte in `e_ident`.
pub const EI_VERSION: usize = 6;
/// Index of the OS ABI byte in `e_ident`.
pub const EI_OSABI: usize = 7;
/// Index of the ABI version byte in `e_ident`.
pub const EI_ABIVERSION: usize = 8;

/// Invalid class.
pub const ELFCLASSNONE: u8 = 0;
/// 32-bit objects.
pub const ELFCLASS32: u8 = 1;
/// 64-bit objects.
pub const ELFCLASS64: u8 = 2;

/// Invalid data encoding.
pub const ELFDATANONE: u8 = 0;
/// Two's complement, little-endian.
pub const ELFDATA2LSB: u8 = 1;
/// Two's complement, big-endian.
pub const ELFDATA2MSB: u8 = 2;

/// Invalid version.
pub const EV_NONE: u32 = 0;
/// Current version.
pub const EV_CURRENT: u32 = 1;

/// Data encoding of the host, the only encoding this crate reads.
#[cfg(target_endian = "little")]
pub const ELFDATA_HOST: u8 = ELFDATA2LSB;
/// Data encoding of the host, the only encoding this crate reads.
#[cfg(target_endian = "big")]
pub const ELFDATA_HOST: u8 = ELFDATA2MSB;

// ---------------------------------------------------------------------------
// Object file types and machines
// ---------------------------------------------------------------------------

/// No file type.
pub const ET_NONE: u16 = 0;
/// Relocatable file.
pub const ET_REL: u16 = 1;
/// Executable file.
pub const ET_EXEC: u16 = 2;
/// Shared object file.
pub const ET_DYN: u16 = 3;
/// Core file.
pub const ET_CORE: u16 = 4;

/// No machine.
pub const EM_NONE: u16 = 0;
/// Intel 80386.
pub const EM_386: u16 = 3;
/// Intel 80486.
pub const EM_486: u16 = 6;
/// ARM.
pub const EM_ARM: u16 = 40;
/// AMD x86-64.
pub const EM_X86_64: u16 = 62;
/// ARM AArch64.
pub const EM_AARCH64: u16 = 183;
/// RISC-V.
pub const EM_RISCV: u16 = 243;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Undefined section index.
pub const SHN_UNDEF: u16 = 0;
/// Start of the reserved index range.
pub const SHN_LORESERVE: u16 = 0xff00;
/// Absolute symbol values.
pub const SHN_ABS: u16 = 0xfff1;
/// Common symbols.
pub const SHN_COMMON: u16 = 0xfff2;
/// Index is stored in an extended section index table.
pub const SHN_XINDEX: u16 = 0xffff;
/// End of the reserved index range.
pub const SHN_HIRESERVE: u16 = 0xffff;

/// Inactive section header.
pub const SHT_NULL: u32 = 0;
/// Program-defined contents.
pub const SHT_PROGBITS: u32 = 1;
/// Full symbol table.
pub const SHT_SYMTAB: u32 = 2;
/// String table.
pub const SHT_STRTAB: u32 = 3;
/// Relocation entries with addends.
pub const SHT_RELA: u32 = 4;
/// SysV symbol hash table.
pub const SHT_HASH: u32 = 5;
/// Dynamic linking table.
pub const SHT_DYNAMIC: u32 = 6;
/// Notes.
pub const SHT_NOTE: u32 = 7;
/// Occupies no file space.
pub const SHT_NOBITS: u32 = 8;
/// Relocation entries without addends.
pub const SHT_REL: u32 = 9;
/// Reserved.
pub const SHT_SHLIB: u32 = 10;
/// Dynamic linker symbol table.
pub const SHT_DYNSYM: u32 = 11;
/// Array of constructors.
pub const SHT_INIT_ARRAY: u32 = 14;
/// Array of destructors.
pub const SHT_FINI_ARRAY: u32 = 15;
/// Array of pre-constructors.
pub const SHT_PREINIT_ARRAY: u32 = 16;
/// Section group.
pub const SHT_GROUP: u32 = 17;
/// Extended section indices.
pub const SHT_SYMTAB_SHNDX: u32 = 18;
/// GNU-style symbol hash table.
pub const SHT_GNU_HASH: u32 = 0x6fff_fff6;
/// Version definitions.
pub const SHT_GNU_VERDEF: u32 = 0x6fff_fffd;
/// Version requirements.
pub const SHT_GNU_VERNEED: u32 = 0x6fff_fffe;
/// Per-symbol version indices.
pub const SHT_GNU_VERSYM: u32 = 0x6fff_ffff;

bitflags::bitflags! {
    /// Section attribute flags (`sh_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SectionFlags: u64 {
        /// Writable at run time.
        const WRITE            = 0x1;
        /// Occupies memory at run time.
        const ALLOC            = 0x2;
        /// Contains executable instructions.
        const EXECINSTR        = 0x4;
        /// Elements may be merged.
        const MERGE            = 0x10;
        /// Contains NUL-terminated strings.
        const STRINGS          = 0x20;
        /// `sh_info` holds a section index.
        const INFO_LINK        = 0x40;
        /// Ordering requirements apply on link.
        const LINK_ORDER       = 0x80;
        /// OS-specific processing required.
        const OS_NONCONFORMING = 0x100;
        /// Member of a section group.
        const GROUP            = 0x200;
        /// Holds thread-local storage.
        const TLS              = 0x400;
        /// Contents are compressed.
        const COMPRESSED       = 0x800;
    }
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// Unused entry.
pub const PT_NULL: u32 = 0;
/// Loadable segment.
pub const PT_LOAD: u32 = 1;
/// Dynamic linking information.
pub const PT_DYNAMIC: u32 = 2;
/// Program interpreter path.
pub const PT_INTERP: u32 = 3;
/// Auxiliary notes.
pub const PT_NOTE: u32 = 4;
/// Reserved.
pub const PT_SHLIB: u32 = 5;
/// The program header table itself.
pub const PT_PHDR: u32 = 6;
/// Thread-local storage template.
pub const PT_TLS: u32 = 7;
/// Exception handling frame header.
pub const PT_GNU_EH_FRAME: u32 = 0x6474_e550;
/// Stack executability.
pub const PT_GNU_STACK: u32 = 0x6474_e551;
/// Read-only after relocation.
pub const PT_GNU_RELRO: u32 = 0x6474_e552;
/// GNU property notes.
pub const PT_GNU_PROPERTY: u32 = 0x6474_e553;

bitflags::bitflags! {
    /// Segment permission flags (`p_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SegmentFlags: u32 {
        /// Executable.
        const EXECUTE = 0x1;
        /// Writable.
        const WRITE   = 0x2;
        /// Readable.
        const READ    = 0x4;
    }
}

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

/// Reserved undefined symbol index.
pub const STN_UNDEF: u32 = 0;

/// Local binding.
pub const STB_LOCAL: u8 = 0;
/// Global binding.
pub const STB_GLOBAL: u8 = 1;
/// Weak binding.
pub const STB_WEAK: u8 = 2;
/// Unique global (GNU).
pub const STB_GNU_UNIQUE: u8 = 10;

/// Unspecified type.
pub const STT_NOTYPE: u8 = 0;
/// Data object.
pub const STT_OBJECT: u8 = 1;
/// Function.
pub const STT_FUNC: u8 = 2;
/// Section.
pub const STT_SECTION: u8 = 3;
/// Source file.
pub const STT_FILE: u8 = 4;
/// Uninitialized common block.
pub const STT_COMMON: u8 = 5;
/// Thread-local data object.
pub const STT_TLS: u8 = 6;
/// Indirect function resolved at load time (GNU).
pub const STT_GNU_IFUNC: u8 = 10;

/// Default visibility.
pub const STV_DEFAULT: u8 = 0;
/// Processor-specific hidden class.
pub const STV_INTERNAL: u8 = 1;
/// Not visible to other components.
pub const STV_HIDDEN: u8 = 2;
/// Visible but not preemptable.
pub const STV_PROTECTED: u8 = 3;

// ---------------------------------------------------------------------------
// Dynamic table tags
// ---------------------------------------------------------------------------

/// End of the dynamic table.
pub const DT_NULL: i64 = 0;
/// Needed library name.
pub const DT_NEEDED: i64 = 1;
/// Size of the PLT relocations.
pub const DT_PLTRELSZ: i64 = 2;
/// PLT/GOT address.
pub const DT_PLTGOT: i64 = 3;
/// SysV symbol hash table address.
pub const DT_HASH: i64 = 4;
/// String table address.
pub const DT_STRTAB: i64 = 5;
/// Symbol table address.
pub const DT_SYMTAB: i64 = 6;
/// Relocations with addends.
pub const DT_RELA: i64 = 7;
/// Total size of `DT_RELA`.
pub const DT_RELASZ: i64 = 8;
/// Size of one `DT_RELA` entry.
pub const DT_RELAENT: i64 = 9;
/// Size of the string table.
pub const DT_STRSZ: i64 = 10;
/// Size of one symbol table entry.
pub const DT_SYMENT: i64 = 11;
/// Initialization function address.
pub const DT_INIT: i64 = 12;
/// Termination function address.
pub const DT_FINI: i64 = 13;
/// Shared object name.
pub const DT_SONAME: i64 = 14;
/// Library search path (deprecated).
pub const DT_RPATH: i64 = 15;
/// Start symbol search in this object.
pub const DT_SYMBOLIC: i64 = 16;
/// Relocations without addends.
pub const DT_REL: i64 = 17;
/// Total size of `DT_REL`.
pub const DT_RELSZ: i64 = 18;
/// Size of one `DT_REL` entry.
pub const DT_RELENT: i64 = 19;
/// Kind of PLT relocations (`DT_REL` or `DT_RELA`).
pub const DT_PLTREL: i64 = 20;
/// Debugger hook.
pub const DT_DEBUG: i64 = 21;
/// Relocations may modify read-only segments.
pub const DT_TEXTREL: i64 = 22;
/// PLT relocations address.
pub const DT_JMPREL: i64 = 23;
/// Process all relocations before execution.
pub const DT_BIND_NOW: i64 = 24;
/// Constructor array address.
pub const DT_INIT_ARRAY: i64 = 25;
/// Destructor array address.
pub const DT_FINI_ARRAY: i64 = 26;
/// Size of `DT_INIT_ARRAY`.
pub const DT_INIT_ARRAYSZ: i64 = 27;
/// Size of `DT_FINI_ARRAY`.
pub const DT_FINI_ARRAYSZ: i64 = 28;
/// Library search path.
pub const DT_RUNPATH: i64 = 29;
/// Flags for this object.
pub const DT_FLAGS: i64 = 30;
/// Pre-constructor array address.
pub const DT_PREINIT_ARRAY: i64 = 32;
/// Size of `DT_PREINIT_ARRAY`.
pub const DT_PREINIT_ARRAYSZ: i64 = 33;
/// Extended section index table address.
pub const DT_SYMTAB_SHNDX: i64 = 34;
/// GNU-style hash table address.
pub const DT_GNU_HASH: i64 = 0x6fff_fef5;
/// Version index table address.
pub const DT_VERSYM: i64 = 0x6fff_fff0;
/// Number of `R_*_RELATIVE` entries in `DT_RELA`.
pub const DT_RELACOUNT: i64 = 0x6fff_fff9;
/// Number of `R_*_RELATIVE` entries in `DT_REL`.
pub const DT_RELCOUNT: i64 = 0x6fff_fffa;
/// State flags.
pub const DT_FLAGS_1: i64 = 0x6fff_fffb;
/// Version definition table address.
pub const DT_VERDEF: i64 = 0x6fff_fffc;
/// Number of version definitions.
pub const DT_VERDEFNUM: i64 = 0x6fff_fffd;
/// Version requirement table address.
pub const DT_VERNEED: i64 = 0x6fff_fffe;
/// Number of version requirements.
pub const DT_VERNEEDNUM: i64 = 0x6fff_ffff;

bitflags::bitflags! {
    /// Values of `DT_FLAGS`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DynamicFlags: u64 {
        /// Object may use `DF_ORIGIN`.
        const ORIGIN     = 0x1;
        /// Symbol resolution starts here.
        const SYMBOLIC   = 0x2;
        /// Object contains text relocations.
        const TEXTREL    = 0x4;
        /// No lazy binding.
        const BIND_NOW   = 0x8;
        /// Module uses the static TLS model.
        const STATIC_TLS = 0x10;
    }
}

bitflags::bitflags! {
    /// Values of `DT_FLAGS_1`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DynamicFlags1: u64 {
        /// Set `RTLD_NOW` for this object.
        const NOW        = 0x1;
        /// Set `RTLD_GLOBAL` for this object.
        const GLOBAL     = 0x2;
        /// Set `RTLD_GROUP` for this object.
        const GROUP      = 0x4;
        /// Set `RTLD_NODELETE` for this object.
        const NODELETE   = 0x8;
        /// Trigger filtee loading at run time.
        const LOADFLTR   = 0x10;
        /// Set `RTLD_INITFIRST` for this object.
        const INITFIRST  = 0x20;
        /// Set `RTLD_NOOPEN` for this object.
        const NOOPEN     = 0x40;
        /// `$ORIGIN` must be handled.
        const ORIGIN     = 0x80;
        /// Direct binding enabled.
        const DIRECT     = 0x100;
        /// Object is used to interpose.
        const INTERPOSE  = 0x400;
        /// Ignore default library search path.
        const NODEFLIB   = 0x800;
        /// Object can't be dldump'ed.
        const NODUMP     = 0x1000;
        /// Configuration alternative created.
        const CONFALT    = 0x2000;
        /// Filtee terminates filter's search.
        const ENDFILTEE  = 0x4000;
        /// Displacement relocation done.
        const DISPRELDNE = 0x8000;
        /// Displacement relocation pending.
        const DISPRELPND = 0x1_0000;
        /// Object has no direct binding.
        const NODIRECT   = 0x2_0000;
        /// Position-independent executable.
        const PIE        = 0x800_0000;
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// GNU ABI tag note.
pub const NT_GNU_ABI_TAG: u32 = 1;
/// GNU hardware capabilities note.
pub const NT_GNU_HWCAP: u32 = 2;
/// GNU build ID note.
pub const NT_GNU_BUILD_ID: u32 = 3;
/// GNU gold version note.
pub const NT_GNU_GOLD_VERSION: u32 = 4;
/// GNU program property note.
pub const NT_GNU_PROPERTY_TYPE_0: u32 = 5;

// ---------------------------------------------------------------------------
// Symbol versioning
// ---------------------------------------------------------------------------

/// Symbol is local.
pub const VER_NDX_LOCAL: u16 = 0;
/// Symbol is global and unversioned; as a lookup request it matches any version.
pub const VER_NDX_GLOBAL: u16 = 1;
/// Start of the reserved version index range.
pub const VER_NDX_LORESERVE: u16 = 0xff00;
/// Symbol is to be eliminated.
pub const VER_NDX_ELIMINATE: u16 = 0xff01;
/// Mask of the index bits in a version table entry.
pub const VERSYM_VERSION: u16 = 0x7fff;
/// Hidden bit in a version table entry.
pub const VERSYM_HIDDEN: u16 = 0x8000;

/// No version definition revision.
pub const VER_DEF_NONE: u16 = 0;
/// Current version definition revision.
pub const VER_DEF_CURRENT: u16 = 1;
/// No version requirement revision.
pub const VER_NEED_NONE: u16 = 0;
/// Current version requirement revision.
pub const VER_NEED_CURRENT: u16 = 1;

bitflags::bitflags! {
    /// Flags of version definitions and requirements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VersionFlags: u16 {
        /// Version definition of the file itself.
        const BASE = 0x1;
        /// Weak version identifier.
        const WEAK = 0x2;
    }
}

// ---------------------------------------------------------------------------
// i386 relocation types
// ---------------------------------------------------------------------------

/// No relocation.
pub const R_386_NONE: u32 = 0;
/// Direct 32-bit: `S + A`.
pub const R_386_32: u32 = 1;
/// PC-relative 32-bit: `S + A - P`.
pub const R_386_PC32: u32 = 2;
/// GOT entry 32-bit: `G + A`.
pub const R_386_GOT32: u32 = 3;
/// PLT-relative 32-bit: `L + A - P`.
pub const R_386_PLT32: u32 = 4;
/// Copy symbol at run time.
pub const R_386_COPY: u32 = 5;
/// Create GOT entry: `S`.
pub const R_386_GLOB_DAT: u32 = 6;
/// Create PLT entry: `S`.
pub const R_386_JMP_SLOT: u32 = 7;
/// Adjust by load base: `B + A`.
pub const R_386_RELATIVE: u32 = 8;
/// Offset from GOT: `S + A - GOT`.
pub const R_386_GOTOFF: u32 = 9;
/// PC-relative GOT address: `GOT + A - P`.
pub const R_386_GOTPC: u32 = 10;
/// PLT address: `L + A`.
pub const R_386_32PLT: u32 = 11;
/// Offset in static TLS block.
pub const R_386_TLS_TPOFF: u32 = 14;
/// Address of GOT entry for static TLS offset.
pub const R_386_TLS_IE: u32 = 15;
/// GOT entry for static TLS offset.
pub const R_386_TLS_GOTIE: u32 = 16;
/// Offset relative to static TLS block.
pub const R_386_TLS_LE: u32 = 17;
/// GOT entry for general dynamic TLS.
pub const R_386_TLS_GD: u32 = 18;
/// GOT entry for local dynamic TLS.
pub const R_386_TLS_LDM: u32 = 19;
/// Direct 16-bit: `S + A`.
pub const R_386_16: u32 = 20;
/// PC-relative 16-bit: `S + A - P`.
pub const R_386_PC16: u32 = 21;
/// Direct 8-bit: `S + A`.
pub const R_386_8: u32 = 22;
/// PC-relative 8-bit: `S + A - P`.
pub const R_386_PC8: u32 = 23;
/// General dynamic TLS, call.
pub const R_386_TLS_GD_32: u32 = 24;
/// General dynamic TLS, push.
pub const R_386_TLS_GD_PUSH: u32 = 25;
/// General dynamic TLS, call.
pub const R_386_TLS_GD_CALL: u32 = 26;
/// General dynamic TLS, pop.
pub const R_386_TLS_GD_POP: u32 = 27;
/// Local dynamic TLS, 32-bit.
pub const R_386_TLS_LDM_32: u32 = 28;
/// Local dynamic TLS, push.
pub const R_386_TLS_LDM_PUSH: u32 = 29;
/// Local dynamic TLS, call.
pub const R_386_TLS_LDM_CALL: u32 = 30;
/// Local dynamic TLS, pop.
pub const R_386_TLS_LDM_POP: u32 = 31;
/// Offset relative to TLS block.
pub const R_386_TLS_LDO_32: u32 = 32;
/// GOT entry for negated static TLS offset.
pub const R_386_TLS_IE_32: u32 = 33;
/// Negated offset relative to static TLS block.
pub const R_386_TLS_LE_32: u32 = 34;
/// Module ID.
pub const R_386_TLS_DTPMOD32: u32 = 35;
/// Offset in TLS block.
pub const R_386_TLS_DTPOFF32: u32 = 36;
/// Negated offset in static TLS block.
pub const R_386_TLS_TPOFF32: u32 = 37;
/// Symbol size: `Z + A`.
pub const R_386_SIZE32: u32 = 38;
/// GOT offset for TLS descriptor.
pub const R_386_TLS_GOTDESC: u32 = 39;
/// Marker of call through TLS descriptor.
pub const R_386_TLS_DESC_CALL: u32 = 40;
/// TLS descriptor.
pub const R_386_TLS_DESC: u32 = 41;
/// Adjust indirectly by load base: call `B + A`.
pub const R_386_IRELATIVE: u32 = 42;
/// Relaxable GOT entry 32-bit.
pub const R_386_GOT32X: u32 = 43;

// ---------------------------------------------------------------------------
// x86-64 relocation types
// ---------------------------------------------------------------------------

/// No relocation.
pub const R_X86_64_NONE: u32 = 0;
/// Direct 64-bit: `S + A`.
pub const R_X86_64_64: u32 = 1;
/// PC-relative 32-bit: `S + A - P`.
pub const R_X86_64_PC32: u32 = 2;
/// GOT entry 32-bit: `G + A`.
pub const R_X86_64_GOT32: u32 = 3;
/// PLT-relative 32-bit: `L + A - P`.
pub const R_X86_64_PLT32: u32 = 4;
/// Copy symbol at run time.
pub const R_X86_64_COPY: u32 = 5;
/// Create GOT entry: `S`.
pub const R_X86_64_GLOB_DAT: u32 = 6;
/// Create PLT entry: `S`.
pub const R_X86_64_JUMP_SLOT: u32 = 7;
/// Adjust by load base: `B + A`.
pub const R_X86_64_RELATIVE: u32 = 8;
/// PC-relative GOT entry: `G + GOT + A - P`.
pub const R_X86_64_GOTPCREL: u32 = 9;
/// Direct 32-bit zero-extended: `S + A`.
pub const R_X86_64_32: u32 = 10;
/// Direct 32-bit sign-extended: `S + A`.
pub const R_X86_64_32S: u32 = 11;
/// Direct 16-bit zero-extended: `S + A`.
pub const R_X86_64_16: u32 = 12;
/// PC-relative 16-bit: `S + A - P`.
pub const R_X86_64_PC16: u32 = 13;
/// Direct 8-bit sign-extended: `S + A`.
pub const R_X86_64_8: u32 = 14;
/// PC-relative 8-bit: `S + A - P`.
pub const R_X86_64_PC8: u32 = 15;
/// Module ID of the symbol.
pub const R_X86_64_DTPMOD64: u32 = 16;
/// Offset in the module's TLS block.
pub const R_X86_64_DTPOFF64: u32 = 17;
/// Offset in the initial TLS block.
pub const R_X86_64_TPOFF64: u32 = 18;
/// PC-relative offset to general dynamic GOT entry.
pub const R_X86_64_TLSGD: u32 = 19;
/// PC-relative offset to local dynamic GOT entry.
pub const R_X86_64_TLSLD: u32 = 20;
/// Offset in TLS block, 32-bit.
pub const R_X86_64_DTPOFF32: u32 = 21;
/// PC-relative offset to initial exec GOT entry.
pub const R_X86_64_GOTTPOFF: u32 = 22;
/// Offset in initial TLS block, 32-bit.
pub const R_X86_64_TPOFF32: u32 = 23;
/// PC-relative 64-bit: `S + A - P`.
pub const R_X86_64_PC64: u32 = 24;
/// Offset from GOT, 64-bit: `S + A - GOT`.
pub const R_X86_64_GOTOFF64: u32 = 25;
/// PC-relative GOT address, 32-bit: `GOT + A - P`.
pub const R_X86_64_GOTPC32: u32 = 26;
/// GOT entry, 64-bit.
pub const R_X86_64_GOT64: u32 = 27;
/// PC-relative GOT entry, 64-bit.
pub const R_X86_64_GOTPCREL64: u32 = 28;
/// PC-relative GOT address, 64-bit.
pub const R_X86_64_GOTPC64: u32 = 29;
/// GOT-relative PLT entry, 64-bit.
pub const R_X86_64_GOTPLT64: u32 = 30;
/// GOT-relative PLT offset, 64-bit.
pub const R_X86_64_PLTOFF64: u32 = 31;
/// Symbol size, 32-bit: `Z + A`.
pub const R_X86_64_SIZE32: u32 = 32;
/// Symbol size, 64-bit: `Z + A`.
pub const R_X86_64_SIZE64: u32 = 33;
/// PC-relative GOT offset for TLS descriptor.
pub const R_X86_64_GOTPC32_TLSDESC: u32 = 34;
/// Marker of call through TLS descriptor.
pub const R_X86_64_TLSDESC_CALL: u32 = 35;
/// TLS descriptor, two words.
pub const R_X86_64_TLSDESC: u32 = 36;
/// Adjust indirectly by load base: call `B + A`.
pub const R_X86_64_IRELATIVE: u32 = 37;
/// 64-bit adjust by load base: `B + A`.
pub const R_X86_64_RELATIVE64: u32 = 38;
/// Relaxable PC-relative GOT entry.
pub const R_X86_64_GOTPCRELX: u32 = 41;
/// Relaxable PC-relative GOT entry with REX prefix.
pub const R_X86_64_REX_GOTPCRELX: u32 = 42;
