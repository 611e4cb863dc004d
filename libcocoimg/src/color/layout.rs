use std::borrow::Cow;

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
    bitfield::{BitField, BitFieldKind, Chunk, PackedValue},
    error::{Error, Result},
};

/// One of the four components of a packed color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Component {
    /// Red
    Red,
    /// Green
    Green,
    /// Blue
    Blue,
    /// Alpha
    Alpha,
}

/// Where the red, green, blue and alpha components live inside one packed color value.
///
/// Every component must fit into an 8-bit channel. Component masks are not checked for
/// overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorLayout<T> {
    red: BitField<T>,
    green: BitField<T>,
    blue: BitField<T>,
    alpha: BitField<T>,
}

const fn bit(position: u32) -> Chunk {
    Chunk { width: 1, position }
}

const RED_CHUNKS: &[Chunk] = &[bit(5), bit(2)];
const GREEN_CHUNKS: &[Chunk] = &[bit(4), bit(1)];
const BLUE_CHUNKS: &[Chunk] = &[bit(3), bit(0)];

/// Hardware palette byte of the Color Computer 3: `..R1G1B1R0G0B0`
static COCO3: ColorLayout<u8> = ColorLayout {
    red: BitField::fixed(
        BitFieldKind::Split(Cow::Borrowed(RED_CHUNKS)),
        "red",
    ),
    green: BitField::fixed(
        BitFieldKind::Split(Cow::Borrowed(GREEN_CHUNKS)),
        "green",
    ),
    blue: BitField::fixed(
        BitFieldKind::Split(Cow::Borrowed(BLUE_CHUNKS)),
        "blue",
    ),
    alpha: BitField::empty(),
};

impl ColorLayout<u8> {
    /// Returns the layout of the Color Computer 3 6-bit palette registers
    #[must_use]
    pub fn coco3() -> &'static Self {
        &COCO3
    }
}

impl<T: PackedValue> ColorLayout<T> {
    /// Creates a layout out of four component fields, any of which may be empty
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if a component can hold values larger than an 8-bit channel
    pub fn new(
        red: BitField<T>,
        green: BitField<T>,
        blue: BitField<T>,
        alpha: BitField<T>,
    ) -> Result<Self> {
        let layout = Self {
            red,
            green,
            blue,
            alpha,
        };
        for component in Component::iter() {
            let max = layout.component_max_value(component).to_u64();
            if max > u64::from(u8::MAX) {
                return Err(Error::Range(format!(
                    "{component} component maximum {max} does not fit an 8-bit channel"
                )));
            }
        }
        Ok(layout)
    }

    /// Red component field
    #[must_use]
    pub const fn red(&self) -> &BitField<T> {
        &self.red
    }

    /// Green component field
    #[must_use]
    pub const fn green(&self) -> &BitField<T> {
        &self.green
    }

    /// Blue component field
    #[must_use]
    pub const fn blue(&self) -> &BitField<T> {
        &self.blue
    }

    /// Alpha component field
    #[must_use]
    pub const fn alpha(&self) -> &BitField<T> {
        &self.alpha
    }

    /// Field of the given component
    #[must_use]
    pub const fn component(&self, component: Component) -> &BitField<T> {
        match component {
            Component::Red => &self.red,
            Component::Green => &self.green,
            Component::Blue => &self.blue,
            Component::Alpha => &self.alpha,
        }
    }

    /// Width in bits of the given component
    #[must_use]
    pub fn component_size(&self, component: Component) -> u32 {
        self.component(component).size()
    }

    /// Largest value of the given component
    #[must_use]
    pub fn component_max_value(&self, component: Component) -> T {
        self.component(component).max_value()
    }

    /// Every bit a packed color of this layout may have set
    #[must_use]
    pub fn packed_color_bitmask(&self) -> T {
        T::truncate_from(
            self.red.mask().to_u64()
                | self.green.mask().to_u64()
                | self.blue.mask().to_u64()
                | self.alpha.mask().to_u64(),
        )
    }
}
