//! Reading and writing logical bit groups stored at fixed positions inside an integer.
//!
//! A [`BitField`] is either a single contiguous run of bits, a list of runs ("split") whose
//! bits are concatenated into one logical value, or empty. Fields are immutable once built and
//! are usually kept in process-lifetime statics shared by every consumer.

use std::{borrow::Cow, fmt::Debug, marker::PhantomData};

use crate::error::{Error, Result};

/// Name reported by fields that were never given one
pub const ANONYMOUS: &str = "<anonymous>";

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Unsigned integer types a [`BitField`] can be stored in
pub trait PackedValue: sealed::Sealed + Copy + Eq + Ord + Debug + Default {
    /// Storage width in bits
    const BITS: u32;

    /// Widens the value
    fn to_u64(self) -> u64;

    /// Narrows `value`, discarding bits above [`Self::BITS`]
    fn truncate_from(value: u64) -> Self;
}

macro_rules! impl_packed_value {
    ($($t:ty),*) => {
        $(
            impl PackedValue for $t {
                const BITS: u32 = <$t>::BITS;

                fn to_u64(self) -> u64 {
                    u64::from(self)
                }

                #[allow(clippy::cast_possible_truncation)]
                fn truncate_from(value: u64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_packed_value!(u8, u16, u32);

/// One run of bits: `width` bits starting at bit `position` (bit 0 is the least significant)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Number of bits in the run
    pub width: u32,
    /// Position of the run's least significant bit
    pub position: u32,
}

impl Chunk {
    const fn low_mask(self) -> u64 {
        (1u64 << self.width) - 1
    }

    const fn mask(self) -> u64 {
        self.low_mask() << self.position
    }

    fn validate<T: PackedValue>(self) -> Result<Self> {
        if self.width == 0 {
            return Err(Error::Overflow("bit field width cannot be zero".into()));
        }
        if self.width > T::BITS {
            return Err(Error::Overflow(format!(
                "bit field width {} exceeds the {}-bit storage type",
                self.width,
                T::BITS
            )));
        }
        if self.position.checked_add(self.width).map_or(true, |end| end > T::BITS) {
            return Err(Error::Overflow(format!(
                "bit field at position {} with width {} does not fit the {}-bit storage type",
                self.position,
                self.width,
                T::BITS
            )));
        }
        Ok(self)
    }
}

/// Placement of a [`BitField`]'s bits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BitFieldKind {
    /// A single run of bits
    Contiguous(Chunk),
    /// Several runs concatenated into one value, most significant run first
    Split(Cow<'static, [Chunk]>),
    /// No bits at all; only the value `0` can be stored
    Empty,
}

/// A logical N-bit value stored at one or more fixed bit positions inside a `T`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitField<T> {
    kind: BitFieldKind,
    name: Option<Cow<'static, str>>,
    storage: PhantomData<T>,
}

impl<T: PackedValue> BitField<T> {
    /// Creates a field of `width` bits whose least significant bit sits at `position`
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if `width` is zero or the field does not fit inside `T`
    pub fn contiguous(width: u32, position: u32) -> Result<Self> {
        let chunk = Chunk { width, position }.validate::<T>()?;
        Ok(Self::from_kind(BitFieldKind::Contiguous(chunk)))
    }

    /// Creates a discontiguous field out of `(width, position)` runs.
    ///
    /// The first run holds the most significant bits of the logical value, the last run the
    /// least significant ones.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if no runs are given, [`Error::Overflow`] if a run is invalid
    /// or the combined width does not fit inside `T`
    pub fn split(chunks: impl IntoIterator<Item = (u32, u32)>) -> Result<Self> {
        let chunks = chunks
            .into_iter()
            .map(|(width, position)| Chunk { width, position }.validate::<T>())
            .collect::<Result<Vec<_>>>()?;
        if chunks.is_empty() {
            return Err(Error::InvalidArgument(
                "split bit field requires at least one chunk".into(),
            ));
        }
        let total: u32 = chunks.iter().map(|c| c.width).sum();
        if total > T::BITS {
            return Err(Error::Overflow(format!(
                "split bit field of {total} bits exceeds the {}-bit storage type",
                T::BITS
            )));
        }
        Ok(Self::from_kind(BitFieldKind::Split(Cow::Owned(chunks))))
    }

    /// Creates the empty field, used for absent components
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_kind(BitFieldKind::Empty)
    }

    pub(crate) const fn from_kind(kind: BitFieldKind) -> Self {
        Self {
            kind,
            name: None,
            storage: PhantomData,
        }
    }

    /// Builds a named field in a `const` context. The caller guarantees the chunks fit `T`.
    pub(crate) const fn fixed(kind: BitFieldKind, name: &'static str) -> Self {
        Self {
            kind,
            name: Some(Cow::Borrowed(name)),
            storage: PhantomData,
        }
    }

    /// Attaches a diagnostic name to the field
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or equal to [`ANONYMOUS`]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name == ANONYMOUS {
            return Err(Error::InvalidArgument(format!(
                "invalid bit field name {name:?}"
            )));
        }
        self.name = Some(name);
        Ok(self)
    }

    /// Returns the field's name, or [`ANONYMOUS`]
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS)
    }

    /// Returns the placement of the field's bits
    #[must_use]
    pub const fn kind(&self) -> &BitFieldKind {
        &self.kind
    }

    fn chunks(&self) -> &[Chunk] {
        match &self.kind {
            BitFieldKind::Contiguous(chunk) => std::slice::from_ref(chunk),
            BitFieldKind::Split(chunks) => chunks.as_ref(),
            BitFieldKind::Empty => &[],
        }
    }

    /// Number of bits in the logical value (0 for the empty field)
    #[must_use]
    pub fn size(&self) -> u32 {
        self.chunks().iter().map(|c| c.width).sum()
    }

    /// Largest value the field can hold, `2^size - 1`
    #[must_use]
    pub fn max_value(&self) -> T {
        T::truncate_from(self.max_value_wide())
    }

    fn max_value_wide(&self) -> u64 {
        (1u64 << self.size()) - 1
    }

    /// Bits occupied by the field inside its storage type
    #[must_use]
    pub fn mask(&self) -> T {
        T::truncate_from(self.chunks().iter().fold(0, |acc, c| acc | c.mask()))
    }

    /// Extracts the field's value from `packed`, right-justified
    #[must_use]
    pub fn get_from(&self, packed: T) -> T {
        let packed = packed.to_u64();
        let value = self.chunks().iter().fold(0u64, |acc, c| {
            (acc << c.width) | ((packed >> c.position) & c.low_mask())
        });
        T::truncate_from(value)
    }

    /// Returns `base` with the field's bits replaced by `value`; all other bits are untouched
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if `value` exceeds [`Self::max_value`]
    pub fn set_in(&self, base: T, value: T) -> Result<T> {
        let mut remaining = value.to_u64();
        if remaining > self.max_value_wide() {
            return Err(match self.kind {
                BitFieldKind::Empty => Error::Overflow(format!(
                    "value {remaining} too large for null field `{}`",
                    self.name()
                )),
                _ => Error::Overflow(format!(
                    "value {remaining} too large for {}-bit field `{}`",
                    self.size(),
                    self.name()
                )),
            });
        }
        let mut out = base.to_u64();
        for chunk in self.chunks().iter().rev() {
            let bits = remaining & chunk.low_mask();
            remaining >>= chunk.width;
            out = (out & !chunk.mask()) | (bits << chunk.position);
        }
        Ok(T::truncate_from(out))
    }
}
