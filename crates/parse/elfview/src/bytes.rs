//! Native-endian field extraction.
//!
//! Every record in an image is read in place through these helpers. They
//! copy a fixed-size chunk out of the slice with `first_chunk()` so no
//! alignment requirement is ever placed on the underlying buffer.

/// Read a native-endian `u16` from `data` at byte offset `off`.
///
/// # Panics
///
/// Panics if `off + 2 > data.len()`. Callers must bounds-check first.
pub(crate) fn ne_u16(data: &[u8], off: usize) -> u16 {
    u16::from_ne_bytes(*chunk(data, off))
}

/// Read a native-endian `u32` from `data` at byte offset `off`.
pub(crate) fn ne_u32(data: &[u8], off: usize) -> u32 {
    u32::from_ne_bytes(*chunk(data, off))
}

/// Read a native-endian `u64` from `data` at byte offset `off`.
pub(crate) fn ne_u64(data: &[u8], off: usize) -> u64 {
    u64::from_ne_bytes(*chunk(data, off))
}

/// Read an unsigned word of `width` bytes (4 or 8), widened to `u64`.
pub(crate) fn ne_word(data: &[u8], off: usize, width: usize) -> u64 {
    match width {
        4 => u64::from(ne_u32(data, off)),
        8 => ne_u64(data, off),
        _ => unreachable!("word width must be 4 or 8, got {width}"),
    }
}

/// Read a signed word of `width` bytes (4 or 8), sign-extended to `i64`.
#[expect(
    clippy::cast_possible_wrap,
    reason = "reinterpreting the stored two's complement bits is the point"
)]
pub(crate) fn ne_sword(data: &[u8], off: usize, width: usize) -> i64 {
    match width {
        4 => i64::from(ne_u32(data, off) as i32),
        8 => ne_u64(data, off) as i64,
        _ => unreachable!("word width must be 4 or 8, got {width}"),
    }
}

/// Return the NUL-terminated byte string starting at `off`, without the
/// terminator.
///
/// A string that runs to the end of `data` without a terminator is returned
/// up to the end. An offset past the end yields an empty string.
pub(crate) fn c_str(data: &[u8], off: usize) -> &[u8] {
    let Some(tail) = data.get(off..) else {
        return &[];
    };
    let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    &tail[..len]
}

/// Convert a file quantity to `usize`, saturating on hosts narrower than
/// the value so that a later bounds check fails instead of wrapping.
pub(crate) fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Round `value` up to the next multiple of four.
pub(crate) const fn align4(value: usize) -> usize {
    (value + 3) & !3
}

fn chunk<const N: usize>(data: &[u8], off: usize) -> &[u8; N] {
    match data.get(off..).and_then(<[u8]>::first_chunk) {
        Some(bytes) => bytes,
        None => panic!(
            "read of {N} bytes at offset {off:#x} past end of image ({:#x} bytes)",
            data.len()
        ),
    }
}
