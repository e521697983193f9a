//! The 16 key display board: 8 seven segment digits and a 4x4 keypad, no LEDs.
//!
//! This board wires the chip's segment and grid lines the other way around from the LED&KEY
//! board.  Each even memory byte holds one segment for all 8 digits (a "segment plane"), with
//! the leftmost digit in bit 7:
//!
//! ```text
//! address  0  2  4  6  8  10 12 14
//! segment  a  b  c  d  e  f  g  dp
//! ```
//!
//! Odd addresses are not connected.

use crate::command::AddressingMode;
use crate::error::Error;
use crate::font::Font;
use crate::{BusDriver, Tm1638};

/// Number of digits on the board
pub const DISP16KEY_DIGITS: usize = 8;

/// Number of buttons on the board
pub const DISP16KEY_BUTTONS: usize = 16;

/// Driver for the 16 key display board.
pub struct Disp16Key<Driver> {
    tm1638: Tm1638<Driver>,
    font: Font,
}

impl<Driver: BusDriver> Disp16Key<Driver> {
    /// Use the default [`Font`]
    pub fn new(tm1638: Tm1638<Driver>) -> Self {
        Self::with_font(tm1638, Font::new())
    }

    pub fn with_font(tm1638: Tm1638<Driver>, font: Font) -> Self {
        Self { tm1638, font }
    }

    pub fn release(self) -> Tm1638<Driver> {
        self.tm1638
    }

    /// The chip level driver, for raw memory writes and display control
    pub fn driver_mut(&mut self) -> &mut Tm1638<Driver> {
        &mut self.tm1638
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// The font used by [`Self::write_string`]; add or replace characters as needed
    pub fn font_mut(&mut self) -> &mut Font {
        &mut self.font
    }

    pub fn reset_font(&mut self) {
        self.font.reset_font();
    }

    /// Turn every digit off and switch the display on
    pub fn init(&mut self) {
        self.tm1638.init();
    }

    /// See [`Tm1638::configure_display`]
    pub fn configure_display(&mut self, enabled: bool, brightness: u8) -> Result<(), Error> {
        self.tm1638.configure_display(enabled, brightness)
    }

    /// Write one segment mask per digit, left to right, in the same format as everywhere else
    /// (segment a in bit 0, decimal point in bit 7).
    pub fn write_digits(&mut self, digits: [u8; DISP16KEY_DIGITS]) -> Result<(), Error> {
        let planes = segment_planes(&digits);

        self.tm1638.prepare_write(AddressingMode::AutoIncrement);

        for (segment, plane) in planes.iter().enumerate() {
            self.tm1638
                .write_data((segment * 2) as u8, core::slice::from_ref(plane))?;
        }

        Ok(())
    }

    /// Show `text` on the display, left aligned, blanking the digits it does not cover.
    ///
    /// Fails without writing anything if the font lacks a character or the text needs more
    /// than 8 digits.
    pub fn write_string(&mut self, text: &str) -> Result<(), Error> {
        let mut digits = [0u8; DISP16KEY_DIGITS];
        self.font.build_digits(text, DISP16KEY_DIGITS, &mut digits)?;

        self.write_digits(digits)
    }

    /// Read the 16 buttons, left to right and top to bottom
    pub fn read_buttons(&mut self) -> [bool; DISP16KEY_BUTTONS] {
        self.tm1638.read_keys().disp16key_buttons()
    }
}

/// Transpose per-digit masks into per-segment planes: bit `s` of digit `d` becomes bit `7 - d`
/// of plane `s`.
fn segment_planes(digits: &[u8; DISP16KEY_DIGITS]) -> [u8; 8] {
    let mut planes = [0u8; 8];

    for (digit, mask) in digits.iter().enumerate() {
        for (segment, plane) in planes.iter_mut().enumerate() {
            if mask & (1 << segment) != 0 {
                *plane |= 0x80 >> digit;
            }
        }
    }

    planes
}
