//! Relocation value computation and application for x86 and x86-64.
//!
//! [`Relocator`] evaluates the ABI formula of a relocation entry using the
//! usual linker variables:
//!
//! | Variable | Meaning                                   |
//! |----------|-------------------------------------------|
//! | `A`      | addend                                    |
//! | `B`      | load base of the object being relocated   |
//! | `G`      | GOT-relative address of the symbol        |
//! | `GOT`    | address of the global offset table        |
//! | `L`      | PLT entry of the symbol                   |
//! | `P`      | address of the patched location           |
//! | `S`      | final address of the symbol               |
//! | `Z`      | size of the symbol                        |
//!
//! Memory is only touched through a [`TargetMemory`], so the crate stays
//! free of raw pointer access. [`ImageMemory`] implements it over a byte
//! slice.

use core::fmt;
use core::ops::Range;

use crate::bytes::to_usize;
use crate::class::ElfClass;
use crate::consts::{
    EM_386, EM_486, EM_X86_64, R_386_8, R_386_16, R_386_32, R_386_32PLT, R_386_COPY,
    R_386_GLOB_DAT, R_386_GOT32, R_386_GOTOFF, R_386_GOTPC, R_386_IRELATIVE, R_386_JMP_SLOT,
    R_386_NONE, R_386_PC8, R_386_PC16, R_386_PC32, R_386_PLT32, R_386_RELATIVE, R_386_SIZE32,
    R_386_TLS_DTPMOD32, R_386_TLS_DTPOFF32, R_X86_64_8, R_X86_64_16, R_X86_64_32, R_X86_64_32S,
    R_X86_64_64, R_X86_64_COPY, R_X86_64_DTPMOD64, R_X86_64_DTPOFF64, R_X86_64_GLOB_DAT,
    R_X86_64_GOT32, R_X86_64_GOTOFF64, R_X86_64_GOTPC32, R_X86_64_GOTPCREL,
    R_X86_64_GOTPCRELX, R_X86_64_IRELATIVE, R_X86_64_JUMP_SLOT, R_X86_64_NONE, R_X86_64_PC8,
    R_X86_64_PC16, R_X86_64_PC32, R_X86_64_PC64, R_X86_64_PLT32, R_X86_64_RELATIVE,
    R_X86_64_RELATIVE64, R_X86_64_REX_GOTPCRELX, R_X86_64_SIZE32, R_X86_64_SIZE64,
    R_X86_64_TLSDESC, R_X86_64_TPOFF64,
};
use crate::elf::Elf;
use crate::reloc::Relocation;
use crate::symbol::Symbol;

// ---------------------------------------------------------------------------
// Machines and formulas
// ---------------------------------------------------------------------------

/// Architectures with a relocation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    /// 32-bit x86 (`EM_386`, `EM_486`).
    I386,
    /// x86-64 (`EM_X86_64`).
    X86_64,
}

impl Machine {
    /// The machine for an `e_machine` value.
    #[must_use]
    pub const fn from_elf(machine: u16) -> Option<Self> {
        match machine {
            EM_386 | EM_486 => Some(Self::I386),
            EM_X86_64 => Some(Self::X86_64),
            _ => None,
        }
    }
}

/// Formula of a relocation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Formula {
    None,
    /// `S`, for GOT slots and copy sources.
    Symbol,
    /// `S + A`
    Absolute,
    /// `S + A - P`
    PcRelative,
    /// `G + A`
    GotEntry,
    /// `G + GOT + A - P`
    GotPcRelative,
    /// `L + A - P`
    PltRelative,
    /// `L + A`
    PltAbsolute,
    /// `B + A`
    Base,
    /// `S + A - GOT`
    GotOffset,
    /// `GOT + A - P`
    GotPc,
    /// `Z + A`
    Size,
    TlsModule,
    /// Symbol value plus addend, relative to its TLS block.
    TlsBlockOffset,
    /// Symbol value plus addend, relative to the thread pointer.
    TlsThreadOffset,
    TlsDescriptor,
}

/// Formula and width in bytes of relocation type `ty` on `machine`.
fn describe(machine: Machine, ty: u32) -> (Formula, usize) {
    let found = match machine {
        Machine::I386 => match ty {
            R_386_NONE => Some((Formula::None, 0)),
            R_386_COPY => Some((Formula::Symbol, 0)),
            R_386_8 => Some((Formula::Absolute, 1)),
            R_386_16 => Some((Formula::Absolute, 2)),
            R_386_32 => Some((Formula::Absolute, 4)),
            R_386_PC8 => Some((Formula::PcRelative, 1)),
            R_386_PC16 => Some((Formula::PcRelative, 2)),
            R_386_PC32 => Some((Formula::PcRelative, 4)),
            R_386_GOT32 => Some((Formula::GotEntry, 4)),
            R_386_PLT32 => Some((Formula::PltRelative, 4)),
            R_386_GLOB_DAT | R_386_JMP_SLOT => Some((Formula::Symbol, 4)),
            R_386_RELATIVE | R_386_IRELATIVE => Some((Formula::Base, 4)),
            R_386_GOTOFF => Some((Formula::GotOffset, 4)),
            R_386_GOTPC => Some((Formula::GotPc, 4)),
            R_386_32PLT => Some((Formula::PltAbsolute, 4)),
            R_386_SIZE32 => Some((Formula::Size, 4)),
            R_386_TLS_DTPMOD32 => Some((Formula::TlsModule, 4)),
            R_386_TLS_DTPOFF32 => Some((Formula::TlsBlockOffset, 4)),
            _ => None,
        },
        Machine::X86_64 => match ty {
            R_X86_64_NONE => Some((Formula::None, 0)),
            R_X86_64_COPY => Some((Formula::Symbol, 0)),
            R_X86_64_GLOB_DAT | R_X86_64_JUMP_SLOT => Some((Formula::Symbol, 8)),
            R_X86_64_8 => Some((Formula::Absolute, 1)),
            R_X86_64_16 => Some((Formula::Absolute, 2)),
            R_X86_64_32 | R_X86_64_32S => Some((Formula::Absolute, 4)),
            R_X86_64_64 => Some((Formula::Absolute, 8)),
            R_X86_64_PC8 => Some((Formula::PcRelative, 1)),
            R_X86_64_PC16 => Some((Formula::PcRelative, 2)),
            R_X86_64_PC32 => Some((Formula::PcRelative, 4)),
            R_X86_64_PC64 => Some((Formula::PcRelative, 8)),
            R_X86_64_GOT32 => Some((Formula::GotEntry, 4)),
            R_X86_64_PLT32 => Some((Formula::PltRelative, 4)),
            R_X86_64_RELATIVE | R_X86_64_RELATIVE64 | R_X86_64_IRELATIVE => {
                Some((Formula::Base, 8))
            }
            R_X86_64_GOTPCREL | R_X86_64_GOTPCRELX | R_X86_64_REX_GOTPCRELX => {
                Some((Formula::GotPcRelative, 4))
            }
            R_X86_64_GOTOFF64 => Some((Formula::GotOffset, 8)),
            R_X86_64_GOTPC32 => Some((Formula::GotPc, 4)),
            R_X86_64_SIZE32 => Some((Formula::Size, 4)),
            R_X86_64_SIZE64 => Some((Formula::Size, 8)),
            R_X86_64_DTPMOD64 => Some((Formula::TlsModule, 8)),
            R_X86_64_DTPOFF64 => Some((Formula::TlsBlockOffset, 8)),
            R_X86_64_TPOFF64 => Some((Formula::TlsThreadOffset, 8)),
            R_X86_64_TLSDESC => Some((Formula::TlsDescriptor, 16)),
            _ => None,
        },
    };
    match found {
        Some(description) => description,
        None => panic!("unsupported {machine:?} relocation type {ty}"),
    }
}

// ---------------------------------------------------------------------------
// Values and errors
// ---------------------------------------------------------------------------

/// Placement of the object being relocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocContext {
    /// Load base (`B`).
    pub base: u64,
    /// Address of the global offset table (`GOT`).
    pub got: u64,
    /// PLT entry of the symbol (`L`), required by PLT-relative types.
    pub plt_entry: Option<u64>,
    /// TLS module id of the symbol's object.
    pub tls_module_id: u64,
    /// Offset of the symbol's TLS block from the thread pointer.
    pub tls_offset: i64,
}

impl RelocContext {
    /// A context with only the load base set.
    #[must_use]
    pub const fn at(base: u64) -> Self {
        Self {
            base,
            got: 0,
            plt_entry: None,
            tls_module_id: 0,
            tls_offset: 0,
        }
    }
}

/// A relocation value truncated to its field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocValue {
    /// Nothing is written.
    None,
    /// An 8-bit value to write.
    U8(u8),
    /// A 16-bit value to write.
    U16(u16),
    /// A 32-bit value to write.
    U32(u32),
    /// A 64-bit value to write.
    U64(u64),
}

impl RelocValue {
    /// The value zero-extended to 64 bits.
    #[must_use]
    pub const fn get(self) -> u64 {
        match self {
            Self::None => 0,
            Self::U8(v) => v as u64,
            Self::U16(v) => v as u64,
            Self::U32(v) => v as u64,
            Self::U64(v) => v,
        }
    }

    fn store(self, memory: &mut impl TargetMemory, address: u64) {
        match self {
            Self::None => {}
            Self::U8(v) => memory.write(address, &v.to_ne_bytes()),
            Self::U16(v) => memory.write(address, &v.to_ne_bytes()),
            Self::U32(v) => memory.write(address, &v.to_ne_bytes()),
            Self::U64(v) => memory.write(address, &v.to_ne_bytes()),
        }
    }
}

/// Errors from writing relocation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocError {
    /// The value fits the field neither zero- nor sign-extended.
    Overflow {
        /// The computed value.
        value: u64,
        /// Field width in bytes.
        width: usize,
    },
}

impl fmt::Display for RelocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { value, width } => {
                write!(f, "relocation value {value:#x} overflows {width}-byte field")
            }
        }
    }
}

impl core::error::Error for RelocError {}

// ---------------------------------------------------------------------------
// Target memory
// ---------------------------------------------------------------------------

/// Memory the relocator reads and patches, addressed as in the target.
pub trait TargetMemory {
    /// Fill `buf` from `address`.
    fn read(&self, address: u64, buf: &mut [u8]);

    /// Store `bytes` at `address`.
    fn write(&mut self, address: u64, bytes: &[u8]);

    /// Copy `len` bytes from `source` to `destination`.
    fn copy(&mut self, destination: u64, source: u64, len: usize);

    /// Run the indirect function at `function` and return its result.
    fn call_indirect(&mut self, function: u64) -> u64;
}

/// [`TargetMemory`] over a byte slice placed at `base`. Indirect functions
/// are resolved by a caller-provided closure.
pub struct ImageMemory<'m, F = fn(u64) -> u64> {
    base: u64,
    bytes: &'m mut [u8],
    resolver: F,
}

impl<'m, F: FnMut(u64) -> u64> ImageMemory<'m, F> {
    /// Memory `bytes` at target address `base`.
    pub fn new(base: u64, bytes: &'m mut [u8], resolver: F) -> Self {
        Self {
            base,
            bytes,
            resolver,
        }
    }

    /// The underlying bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    fn range(&self, address: u64, len: usize) -> Range<usize> {
        let start = address
            .checked_sub(self.base)
            .and_then(|offset| usize::try_from(offset).ok())
            .filter(|start| start.checked_add(len).is_some_and(|end| end <= self.bytes.len()));
        match start {
            Some(start) => start..start + len,
            None => panic!("target range {address:#x}+{len:#x} outside image memory"),
        }
    }
}

impl<F: FnMut(u64) -> u64> TargetMemory for ImageMemory<'_, F> {
    fn read(&self, address: u64, buf: &mut [u8]) {
        let range = self.range(address, buf.len());
        buf.copy_from_slice(&self.bytes[range]);
    }

    fn write(&mut self, address: u64, bytes: &[u8]) {
        let range = self.range(address, bytes.len());
        self.bytes[range].copy_from_slice(bytes);
    }

    fn copy(&mut self, destination: u64, source: u64, len: usize) {
        let to = self.range(destination, len);
        let from = self.range(source, len);
        self.bytes.copy_within(from, to.start);
    }

    fn call_indirect(&mut self, function: u64) -> u64 {
        (self.resolver)(function)
    }
}

// ---------------------------------------------------------------------------
// Relocator
// ---------------------------------------------------------------------------

/// Computes and applies one relocation entry.
#[derive(Debug, Clone, Copy)]
pub struct Relocator<'a, C> {
    entry: Relocation<'a, C>,
    machine: Machine,
    formula: Formula,
    width: usize,
}

impl<'a, C: ElfClass> Relocator<'a, C> {
    /// Relocator for `entry`, for the machine named in the header of the
    /// image the entry lives in.
    ///
    /// # Panics
    ///
    /// Panics if the entry has no symbol table, or the machine or the
    /// relocation type is not supported.
    #[must_use]
    pub fn new(entry: Relocation<'a, C>) -> Self {
        let machine = Elf::<C>::new(entry.image()).header().machine();
        Self::with_machine(entry, machine)
    }

    /// Relocator for `entry` on `machine` (`EM_*`).
    ///
    /// # Panics
    ///
    /// Same conditions as [`new`](Self::new).
    #[must_use]
    pub fn with_machine(entry: Relocation<'a, C>, machine: u16) -> Self {
        assert!(entry.valid(), "relocation without symbol or string table");
        let Some(machine) = Machine::from_elf(machine) else {
            panic!("unsupported relocation machine {machine}");
        };
        let (formula, width) = describe(machine, entry.rel_type());
        Self {
            entry,
            machine,
            formula,
            width,
        }
    }

    /// The relocation entry.
    #[must_use]
    pub const fn entry(&self) -> Relocation<'a, C> {
        self.entry
    }

    /// The target architecture.
    #[must_use]
    pub const fn machine(&self) -> Machine {
        self.machine
    }

    /// Width in bytes of the patched field; `0` when nothing is written
    /// (`NONE`, `COPY`) and `16` for TLS descriptors.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.width
    }

    /// Whether this is a copy relocation.
    #[must_use]
    pub fn is_copy(&self) -> bool {
        match self.machine {
            Machine::I386 => self.entry.rel_type() == R_386_COPY,
            Machine::X86_64 => self.entry.rel_type() == R_X86_64_COPY,
        }
    }

    /// Whether this relocation calls an indirect function.
    #[must_use]
    pub fn is_indirect(&self) -> bool {
        match self.machine {
            Machine::I386 => self.entry.rel_type() == R_386_IRELATIVE,
            Machine::X86_64 => self.entry.rel_type() == R_X86_64_IRELATIVE,
        }
    }

    /// Address of the patched location (`P`) for an object loaded at
    /// `base`.
    #[must_use]
    pub fn address(&self, base: u64) -> u64 {
        base.wrapping_add(self.entry.offset())
    }

    /// Value for the entry's own symbol, defined in the same object.
    /// Neither copies nor calls indirect functions.
    ///
    /// # Panics
    ///
    /// Panics if the formula needs `L` and the context has no PLT entry.
    #[must_use]
    pub fn value(&self, ctx: &RelocContext) -> u64 {
        self.evaluate(ctx, || self.entry.symbol(), ctx.base)
    }

    /// Value for `symbol`, defined in an object loaded at `symbol_base`.
    /// Neither copies nor calls indirect functions.
    ///
    /// # Panics
    ///
    /// Same conditions as [`value`](Self::value).
    #[must_use]
    pub fn value_with(
        &self,
        ctx: &RelocContext,
        symbol: &Symbol<'_, C>,
        symbol_base: u64,
    ) -> u64 {
        self.evaluate(ctx, || *symbol, symbol_base)
    }

    /// Value for an external `symbol`. Copy relocations copy the symbol's
    /// bytes to the patched location and return `0`; indirect relocations
    /// and `STT_GNU_IFUNC` symbols return the indirect function's result.
    pub fn value_external(
        &self,
        memory: &mut impl TargetMemory,
        ctx: &RelocContext,
        symbol: &Symbol<'_, C>,
        symbol_base: u64,
    ) -> u64 {
        let value = self.value_with(ctx, symbol, symbol_base);
        if self.is_copy() {
            memory.copy(self.address(ctx.base), value, to_usize(symbol.size()));
            0
        } else if self.is_indirect() || symbol.indirect() {
            memory.call_indirect(value)
        } else {
            value
        }
    }

    /// [`value_external`](Self::value_external) for the entry's own symbol.
    /// Symbol 0 is never read.
    pub fn value_internal(&self, memory: &mut impl TargetMemory, ctx: &RelocContext) -> u64 {
        if self.entry.symbol_index() != 0 {
            return self.value_external(memory, ctx, &self.entry.symbol(), ctx.base);
        }
        let value = self.value(ctx);
        if self.is_indirect() {
            memory.call_indirect(value)
        } else {
            value
        }
    }

    /// Truncate `value` to the field width.
    ///
    /// # Errors
    ///
    /// [`RelocError::Overflow`] if the value fits the field neither as an
    /// unsigned nor as a sign-extended number.
    ///
    /// # Panics
    ///
    /// Panics for TLS descriptors, which are written with
    /// [`write_tls_descriptor`](Self::write_tls_descriptor).
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "truncation is checked against the field width first"
    )]
    pub fn encode(&self, value: u64) -> Result<RelocValue, RelocError> {
        let width = self.width;
        if width > 0 && width < 8 {
            let bits = width as u32 * 8;
            let unsigned = value >> bits == 0;
            let high = (value as i64) >> (bits - 1);
            if !unsigned && high != 0 && high != -1 {
                return Err(RelocError::Overflow { value, width });
            }
        }
        Ok(match width {
            0 => RelocValue::None,
            1 => RelocValue::U8(value as u8),
            2 => RelocValue::U16(value as u16),
            4 => RelocValue::U32(value as u32),
            8 => RelocValue::U64(value),
            _ => panic!("{width}-byte relocation field has no scalar value"),
        })
    }

    /// Current value of the patched field, zero-extended.
    ///
    /// # Panics
    ///
    /// Panics for TLS descriptors.
    pub fn read_value(&self, memory: &impl TargetMemory, base: u64) -> u64 {
        let address = self.address(base);
        match self.width {
            0 => 0,
            1 => {
                let mut b = [0; 1];
                memory.read(address, &mut b);
                u64::from(u8::from_ne_bytes(b))
            }
            2 => {
                let mut b = [0; 2];
                memory.read(address, &mut b);
                u64::from(u16::from_ne_bytes(b))
            }
            4 => {
                let mut b = [0; 4];
                memory.read(address, &mut b);
                u64::from(u32::from_ne_bytes(b))
            }
            8 => {
                let mut b = [0; 8];
                memory.read(address, &mut b);
                u64::from_ne_bytes(b)
            }
            width => panic!("{width}-byte relocation field has no scalar value"),
        }
    }

    /// Store `value` in the patched field and return what was written.
    ///
    /// # Errors
    ///
    /// [`RelocError::Overflow`] if the value does not fit the field.
    pub fn write_value(
        &self,
        memory: &mut impl TargetMemory,
        base: u64,
        value: u64,
    ) -> Result<u64, RelocError> {
        let encoded = self.encode(value)?;
        let address = self.address(base);
        log::trace!("relocation at {address:#x} <- {:#x}", encoded.get());
        encoded.store(memory, address);
        Ok(encoded.get())
    }

    /// Add `delta` to the patched field, wrapping at the field width, and
    /// return the new value. Used for `Rel` entries, whose addend is the
    /// field's current content.
    pub fn increment_value(&self, memory: &mut impl TargetMemory, base: u64, delta: u64) -> u64 {
        let width = self.width;
        if width == 0 {
            return 0;
        }
        let sum = self.read_value(memory, base).wrapping_add(delta);
        let mask = if width >= 8 { u64::MAX } else { (1 << (width * 8)) - 1 };
        let address = self.address(base);
        let truncated = sum & mask;
        memory.write(address, &truncated.to_ne_bytes()[..width]);
        truncated
    }

    /// Compute the value for an external `symbol` and write it.
    ///
    /// # Errors
    ///
    /// [`RelocError::Overflow`] if the value does not fit the field.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is undefined.
    pub fn fix_external(
        &self,
        memory: &mut impl TargetMemory,
        ctx: &RelocContext,
        symbol: &Symbol<'_, C>,
        symbol_base: u64,
    ) -> Result<u64, RelocError> {
        assert!(!symbol.undefined(), "external relocation against undefined symbol");
        let value = self.value_external(memory, ctx, symbol, symbol_base);
        self.write_value(memory, ctx.base, value)
    }

    /// Compute the value for the entry's own symbol and write it.
    ///
    /// # Errors
    ///
    /// [`RelocError::Overflow`] if the value does not fit the field.
    pub fn fix_internal(
        &self,
        memory: &mut impl TargetMemory,
        ctx: &RelocContext,
    ) -> Result<u64, RelocError> {
        let value = self.value_internal(memory, ctx);
        self.write_value(memory, ctx.base, value)
    }

    /// Write a TLS descriptor: the resolver `function` and its `argument`,
    /// one word each.
    ///
    /// # Panics
    ///
    /// Panics if this is not a TLS descriptor relocation.
    pub fn write_tls_descriptor(
        &self,
        memory: &mut impl TargetMemory,
        base: u64,
        function: u64,
        argument: u64,
    ) {
        assert_eq!(self.formula, Formula::TlsDescriptor, "not a TLS descriptor relocation");
        let address = self.address(base);
        memory.write(address, &function.to_ne_bytes());
        memory.write(address + 8, &argument.to_ne_bytes());
    }

    #[expect(clippy::cast_sign_loss, reason = "ABI arithmetic is modulo 2^64")]
    fn evaluate<'s>(
        &self,
        ctx: &RelocContext,
        symbol: impl FnOnce() -> Symbol<'s, C>,
        symbol_base: u64,
    ) -> u64 {
        let a = self.entry.addend() as u64;
        let b = ctx.base;
        let got = ctx.got;
        let p = self.address(ctx.base);
        let s = |symbol: Symbol<'s, C>| symbol_base.wrapping_add(symbol.value());
        let l = || match ctx.plt_entry {
            Some(entry) => entry,
            None => panic!("PLT relocation without PLT entry"),
        };
        match self.formula {
            Formula::None => 0,
            Formula::Symbol => {
                debug_assert_eq!(self.entry.addend(), 0, "GOT slot relocation with addend");
                s(symbol())
            }
            Formula::Absolute => s(symbol()).wrapping_add(a),
            Formula::PcRelative => s(symbol()).wrapping_add(a).wrapping_sub(p),
            Formula::GotEntry => s(symbol()).wrapping_add(a),
            Formula::GotPcRelative => s(symbol())
                .wrapping_add(got)
                .wrapping_add(a)
                .wrapping_sub(p),
            Formula::PltRelative => l().wrapping_add(a).wrapping_sub(p),
            Formula::PltAbsolute => l().wrapping_add(a),
            Formula::Base => b.wrapping_add(a),
            Formula::GotOffset => s(symbol()).wrapping_add(a).wrapping_sub(got),
            Formula::GotPc => got.wrapping_add(a).wrapping_sub(p),
            Formula::Size => symbol().size().wrapping_add(a),
            Formula::TlsModule => ctx.tls_module_id,
            Formula::TlsBlockOffset | Formula::TlsDescriptor => {
                symbol().value().wrapping_add(a)
            }
            Formula::TlsThreadOffset => symbol()
                .value()
                .wrapping_add(a)
                .wrapping_sub(ctx.tls_offset as u64),
        }
    }
}
