//! Seven segment font: a map from characters to segment masks, and the digit builder that turns
//! text into one mask per display position.
//!
//! ```text
//!      a
//!     ---
//!  f |   | b
//!     -g-
//!  e |   | c
//!     ---
//!      d    . (dp)
//! ```
//!
//! Bits 0 to 6 of a mask are segments a to g, bit 7 is the decimal point.

use heapless::FnvIndexMap;

use crate::error::{Argument, Error};

/// How many characters a [`Font`] can hold.  Enough for all of printable ASCII.
pub const FONT_CAPACITY: usize = 128;

/// The live character to segment mask mapping of a [`Font`]
pub type FontMap = FnvIndexMap<char, u8, FONT_CAPACITY>;

/// The decimal point segment
pub const DECIMAL_POINT: u8 = 0b1000_0000;

/// Limited font mapping, enough for decimal and hex numbers plus a few status letters.
const DEFAULT_FONT: &[(char, u8)] = &[
    (' ', 0b0_0000000),
    ('0', 0b0_0111111),
    ('1', 0b0_0000110),
    ('2', 0b0_1011011),
    ('3', 0b0_1001111),
    ('4', 0b0_1100110),
    ('5', 0b0_1101101),
    ('6', 0b0_1111101),
    ('7', 0b0_0000111),
    ('8', 0b0_1111111),
    ('9', 0b0_1101111),
    // Only shows up on its own when there is no digit to merge it into
    ('.', 0b1_0000000),
    ('-', 0b0_1000000),
    ('A', 0b0_1110111),
    ('B', 0b0_1111100),
    ('C', 0b0_0111001),
    ('D', 0b0_1011110),
    ('E', 0b0_1111001),
    ('F', 0b0_1110001),
    ('H', 0b0_1110110),
    ('i', 0b0_0000100),
    ('L', 0b0_0111000),
    ('o', 0b0_1011100),
];

const _: () = assert!(DEFAULT_FONT.len() <= FONT_CAPACITY);

/// Printable ASCII, `' '` to `'~'`, one row per 16 characters.
///
/// From https://github.com/gavinlyonsrepo/TM1638plus_PICO/blob/main/src/tm1638plus_common.cpp
#[cfg(feature = "ascii-font")]
const ASCII_FONT_TABLE: [u8; 95] = [
    // ' ' ! " # $ % & ' ( ) * + , - . /
    0x00, 0x86, 0x22, 0x7E, 0x6D, 0xD2, 0x46, 0x20, 0x29, 0x0B, 0x21, 0x70, 0x10, 0x40, 0x80, 0x52,
    // 0 - 9 : ; < = > ?
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F, 0x09, 0x0D, 0x61, 0x48, 0x43, 0xD3,
    // @ A - O
    0x5F, 0x77, 0x7C, 0x39, 0x5E, 0x79, 0x71, 0x3D, 0x76, 0x30, 0x1E, 0x75, 0x38, 0x15, 0x37, 0x3F,
    // P - Z [ \ ] ^ _
    0x73, 0x6B, 0x33, 0x6D, 0x78, 0x3E, 0x3E, 0x2A, 0x76, 0x6E, 0x5B, 0x39, 0x64, 0x0F, 0x23, 0x08,
    // ` a - o
    0x02, 0x5F, 0x7C, 0x58, 0x5E, 0x7B, 0x71, 0x6F, 0x74, 0x10, 0x0C, 0x75, 0x30, 0x14, 0x54, 0x5C,
    // p - z { | } ~
    0x73, 0x67, 0x50, 0x6D, 0x78, 0x1C, 0x1C, 0x14, 0x76, 0x6E, 0x5B, 0x46, 0x30, 0x70, 0x01,
];

#[cfg(feature = "ascii-font")]
const _: () = assert!(ASCII_FONT_TABLE.len() <= FONT_CAPACITY);

/// A seven segment font.
///
/// Each board owns one of these.  The mapping is meant to be changed by the user: add the letters
/// your application needs with [`Self::set_glyph`], or work on the map directly through
/// [`Self::font_mut`].
#[derive(Clone, Debug)]
pub struct Font {
    map: FontMap,
}

impl Default for Font {
    fn default() -> Self {
        Self::new()
    }
}

impl Font {
    /// A font holding the default mapping
    pub fn new() -> Self {
        let mut font = Self {
            map: FontMap::new(),
        };
        font.reset_font();
        font
    }

    /// A font covering all of printable ASCII
    #[cfg(feature = "ascii-font")]
    pub fn ascii() -> Self {
        let mut font = Self {
            map: FontMap::new(),
        };
        for (c, segments) in (b' '..=b'~').map(char::from).zip(ASCII_FONT_TABLE) {
            let _ = font.map.insert(c, segments);
        }
        font
    }

    /// Reset the font back to the default mapping, dropping any changes
    pub fn reset_font(&mut self) {
        self.map.clear();
        for (c, segments) in DEFAULT_FONT {
            let _ = self.map.insert(*c, *segments);
        }
    }

    pub fn font(&self) -> &FontMap {
        &self.map
    }

    /// The live mapping.  Changes are picked up by the next [`Self::build_digits`].
    pub fn font_mut(&mut self) -> &mut FontMap {
        &mut self.map
    }

    /// The segment mask for `c`, if the font has one
    pub fn glyph(&self, c: char) -> Option<u8> {
        self.map.get(&c).copied()
    }

    /// Add or replace the segment mask for `c`
    pub fn set_glyph(&mut self, c: char, segments: u8) -> Result<(), Error> {
        self.map
            .insert(c, segments)
            .map(|_| ())
            .map_err(|_| Error::FontFull)
    }

    /// Build the segment masks to display `text` on `max_digits` digits, left to right, into the
    /// start of `out`.
    ///
    /// A `.` following a character is merged into that character's digit as its decimal point.
    /// A `.` that has nothing to merge into (at the start of the text, or right after another
    /// `.`) takes a digit of its own, using whatever the font maps `.` to.  Digits after the end
    /// of the text are blanked.
    ///
    /// Returns the number of digits the text occupies.  On error `out` may have been partly
    /// overwritten.
    pub fn build_digits(
        &self,
        text: &str,
        max_digits: usize,
        out: &mut [u8],
    ) -> Result<usize, Error> {
        let out = out
            .get_mut(..max_digits)
            .ok_or(Error::InvalidArgument(Argument::MaxDigits))?;

        // Digit a following '.' may merge into
        let mut previous: Option<usize> = None;
        let mut used = 0;

        for c in text.chars() {
            if c == '.' {
                if let Some(index) = previous.take() {
                    out[index] |= DECIMAL_POINT;
                    continue;
                }
            }

            let segments = self.glyph(c).ok_or(Error::UnknownCharacter(c))?;

            let slot = out.get_mut(used).ok_or(Error::TooManyDigits { max: max_digits })?;
            *slot = segments;

            previous = if c == '.' { None } else { Some(used) };
            used += 1;
        }

        out[used..].fill(0);

        #[cfg(feature = "defmt")]
        defmt::trace!("digits = {=[u8]:x}", &out[..]);

        Ok(used)
    }
}
