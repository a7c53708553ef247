//! Zero-copy record views.
//!
//! Every record in this crate is an [`Accessor`]: the image slice plus a byte
//! offset into it. Nothing is copied out of the image until a field is read.
//! Record types implement [`Record`], and [`Fixed`] or [`Linked`] on top of
//! it, which lets the two collection views work for any of them:
//!
//! - [`Array`] walks records of constant stride, `count` of them.
//! - [`List`] follows per-record successor links and stops at an end bound
//!   or when a record reports no successor.
//!
//! Collections are `Copy` and can be iterated any number of times.

use core::fmt;
use core::marker::PhantomData;

use crate::bytes::{ne_u16, ne_u32};
use crate::class::ElfClass;

// ---------------------------------------------------------------------------
// Accessor
// ---------------------------------------------------------------------------

/// A position inside an image.
///
/// Two accessors are equal only when they point into the same image (by
/// address, not by contents) at the same offset.
#[derive(Clone, Copy)]
pub struct Accessor<'a> {
    image: &'a [u8],
    offset: usize,
}

impl<'a> Accessor<'a> {
    /// Create an accessor for the record at `offset` within `image`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize) -> Self {
        Self { image, offset }
    }

    /// The whole image this accessor points into.
    #[must_use]
    pub const fn image(&self) -> &'a [u8] {
        self.image
    }

    /// Byte offset of the record within the image.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Host address of the record.
    #[must_use]
    pub fn address(&self) -> usize {
        self.image.as_ptr() as usize + self.offset
    }

    /// Bytes of the image starting at the record.
    ///
    /// # Panics
    ///
    /// Panics if the offset is past the end of the image.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        &self.image[self.offset..]
    }

    /// Accessor for another record in the same image.
    #[must_use]
    pub const fn at(&self, offset: usize) -> Self {
        Self::new(self.image, offset)
    }

    /// Whether `len` bytes starting at the record are inside the image.
    #[must_use]
    pub fn fits(&self, len: usize) -> bool {
        self.offset
            .checked_add(len)
            .is_some_and(|end| end <= self.image.len())
    }

    pub(crate) fn u8(&self, field: usize) -> u8 {
        self.image[self.offset + field]
    }

    pub(crate) fn u16(&self, field: usize) -> u16 {
        ne_u16(self.image, self.offset + field)
    }

    pub(crate) fn u32(&self, field: usize) -> u32 {
        ne_u32(self.image, self.offset + field)
    }

    pub(crate) fn word<C: ElfClass>(&self, field: usize) -> u64 {
        C::word(self.image, self.offset + field)
    }

    pub(crate) fn sword<C: ElfClass>(&self, field: usize) -> i64 {
        C::sword(self.image, self.offset + field)
    }
}

impl PartialEq for Accessor<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.image.as_ptr(), other.image.as_ptr()) && self.offset == other.offset
    }
}

impl Eq for Accessor<'_> {}

impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor({:#x})", self.offset)
    }
}

// ---------------------------------------------------------------------------
// Record traits
// ---------------------------------------------------------------------------

/// A record that can be re-targeted to another offset of the same image,
/// keeping whatever context (string table, symbol table) it carries.
pub trait Record: Copy {
    /// Byte offset of the record within its image.
    fn position(&self) -> usize;

    /// The same kind of record, with the same context, at `offset`.
    #[must_use]
    fn at(&self, offset: usize) -> Self;
}

/// A record stored in a table of constant stride.
pub trait Fixed: Record {
    /// Distance in bytes between consecutive records.
    fn stride(&self) -> usize;
}

/// A record that knows where its successor is.
pub trait Linked: Record {
    /// Image offset of the next record, or `None` if this is the last one.
    fn successor(&self) -> Option<usize>;
}

/// Implements [`Record`] for a view type whose `raw` field is its
/// [`Accessor`].
macro_rules! impl_record {
    ($ty:ident $(<$($gen:tt),*>)? $(where $($bound:tt)*)?) => {
        impl$(<$($gen),*>)? $crate::view::Record for $ty$(<$($gen),*>)? $(where $($bound)*)? {
            fn position(&self) -> usize {
                self.raw.offset()
            }

            #[allow(clippy::needless_update)]
            fn at(&self, offset: usize) -> Self {
                Self {
                    raw: self.raw.at(offset),
                    ..*self
                }
            }
        }
    };
}
pub(crate) use impl_record;

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// `count` records of constant stride starting at a first record.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Array<A> {
    first: A,
    count: usize,
}

impl<A: Fixed> Array<A> {
    /// Create an array of `count` records, the first one being `first`.
    #[must_use]
    pub const fn new(first: A, count: usize) -> Self {
        Self { first, count }
    }

    /// An array with no elements. `template` only provides the context.
    #[must_use]
    pub const fn empty(template: A) -> Self {
        Self::new(template, 0)
    }

    /// Number of elements.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Whether the array has no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The first element, present even in an empty array to carry the
    /// image and context.
    #[must_use]
    pub const fn template(&self) -> A {
        self.first
    }

    /// Image offset of the first element.
    #[must_use]
    pub fn position(&self) -> usize {
        self.first.position()
    }

    /// The element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.count()`.
    #[must_use]
    pub fn get(&self, index: usize) -> A {
        assert!(
            index < self.count,
            "array index {index} out of range for {} elements",
            self.count
        );
        self.element(index)
    }

    /// The element at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn try_get(&self, index: usize) -> Option<A> {
        (index < self.count).then(|| self.element(index))
    }

    /// Position of `element` within the array.
    ///
    /// # Panics
    ///
    /// Panics if `element` does not lie on an element boundary of this array.
    #[must_use]
    pub fn index(&self, element: &A) -> usize {
        let stride = self.first.stride();
        let distance = element.position().wrapping_sub(self.first.position());
        assert!(
            element.position() >= self.first.position()
                && distance % stride == 0
                && distance / stride < self.count,
            "element at {:#x} is not part of this array",
            element.position()
        );
        distance / stride
    }

    /// Iterate over the elements in order.
    #[must_use]
    pub fn iter(&self) -> ArrayIter<A> {
        ArrayIter {
            array: *self,
            front: 0,
            back: self.count,
        }
    }

    fn element(&self, index: usize) -> A {
        self.first
            .at(self.first.position() + index * self.first.stride())
    }
}

impl<A: Fixed + fmt::Debug> fmt::Debug for Array<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<A: Fixed> IntoIterator for Array<A> {
    type Item = A;
    type IntoIter = ArrayIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<A: Fixed> IntoIterator for &Array<A> {
    type Item = A;
    type IntoIter = ArrayIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of an [`Array`].
#[derive(Clone)]
pub struct ArrayIter<A> {
    array: Array<A>,
    front: usize,
    back: usize,
}

impl<A: Fixed> Iterator for ArrayIter<A> {
    type Item = A;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let element = self.array.element(self.front);
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<A: Fixed> DoubleEndedIterator for ArrayIter<A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.array.element(self.back))
    }
}

impl<A: Fixed> ExactSizeIterator for ArrayIter<A> {}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Records chained through successor links.
///
/// Iteration stops at the first record whose offset reaches `end` (when an
/// end is set) or after a record without successor. Records past the end are
/// never read.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct List<A> {
    first: Option<A>,
    end: Option<usize>,
}

impl<A: Linked> List<A> {
    /// A list ending after the record that reports no successor.
    #[must_use]
    pub const fn new(first: A) -> Self {
        Self {
            first: Some(first),
            end: None,
        }
    }

    /// A list ending at image offset `end` (exclusive).
    #[must_use]
    pub const fn bounded(first: A, end: usize) -> Self {
        Self {
            first: Some(first),
            end: Some(end),
        }
    }

    /// A list with no records.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            first: None,
            end: None,
        }
    }

    /// Whether the list has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of records. This walks the whole list.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// The record at `index`. This walks the list up to it.
    ///
    /// # Panics
    ///
    /// Panics if the list has `index` records or fewer.
    #[must_use]
    pub fn get(&self, index: usize) -> A {
        match self.iter().nth(index) {
            Some(record) => record,
            None => panic!("list index {index} out of range"),
        }
    }

    /// Position of `record` within the list, if it is part of it.
    #[must_use]
    pub fn index(&self, record: &A) -> Option<usize> {
        self.iter().position(|r| r.position() == record.position())
    }

    /// Iterate over the records in order.
    #[must_use]
    pub fn iter(&self) -> ListIter<A> {
        ListIter {
            next: self.first,
            end: self.end,
        }
    }
}

impl<A: Linked + fmt::Debug> fmt::Debug for List<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<A: Linked> IntoIterator for List<A> {
    type Item = A;
    type IntoIter = ListIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<A: Linked> IntoIterator for &List<A> {
    type Item = A;
    type IntoIter = ListIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of a [`List`].
#[derive(Clone)]
pub struct ListIter<A> {
    next: Option<A>,
    end: Option<usize>,
}

impl<A: Linked> Iterator for ListIter<A> {
    type Item = A;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if self.end.is_some_and(|end| current.position() >= end) {
            return None;
        }
        self.next = current.successor().map(|offset| {
            assert!(
                offset > current.position(),
                "list record at {:#x} does not advance",
                current.position()
            );
            current.at(offset)
        });
        Some(current)
    }
}

impl<A: Linked> core::iter::FusedIterator for ListIter<A> {}

// ---------------------------------------------------------------------------
// Address-sized words
// ---------------------------------------------------------------------------

/// One address-sized word, as found in init/fini arrays and the GOT.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Address<'a, C> {
    raw: Accessor<'a>,
    _class: PhantomData<C>,
}

impl<'a, C: ElfClass> Address<'a, C> {
    /// View the word at `offset` within `image`.
    #[must_use]
    pub const fn new(image: &'a [u8], offset: usize) -> Self {
        Self {
            raw: Accessor::new(image, offset),
            _class: PhantomData,
        }
    }

    /// The stored value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.raw.word::<C>(0)
    }
}

impl<C: ElfClass> fmt::Debug for Address<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#x})", self.value())
    }
}

impl_record!(Address<'a, C> where C: ElfClass);

impl<C: ElfClass> Fixed for Address<'_, C> {
    fn stride(&self) -> usize {
        C::WORD
    }
}
