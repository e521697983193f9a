//! The LED&KEY board: 8 seven segment digits, 8 red LEDs and 8 push buttons in a row.
//!
//! Display memory alternates between digits and LEDs:
//!
//! ```text
//! address  0    1    2    3    ...  14   15
//!          dig0 led0 dig1 led1 ...  dig7 led7
//! ```
//!
//! Digits and LEDs are numbered left to right.  An LED is on when bit 0 of its byte is set.

use crate::command::AddressingMode;
use crate::error::{Argument, Error};
use crate::font::Font;
use crate::{BusDriver, Tm1638};

/// Number of digits, LEDs and buttons on the board
pub const LED8KEY_DIGITS: usize = 8;

/// Driver for the LED&KEY board.
///
/// Each method talks to the chip right away; nothing is cached, so the state of the LEDs and
/// digits is whatever the last write to them was.
pub struct Led8Key<Driver> {
    tm1638: Tm1638<Driver>,
    font: Font,
}

impl<Driver: BusDriver> Led8Key<Driver> {
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

    /// Turn every digit and LED off and switch the display on
    pub fn init(&mut self) {
        self.tm1638.init();
    }

    /// See [`Tm1638::configure_display`]
    pub fn configure_display(&mut self, enabled: bool, brightness: u8) -> Result<(), Error> {
        self.tm1638.configure_display(enabled, brightness)
    }

    /// Set all 8 LEDs, left to right.
    ///
    /// LED bytes are not next to each other in memory, so each one is its own write.
    pub fn set_leds(&mut self, leds: [bool; LED8KEY_DIGITS]) -> Result<(), Error> {
        self.tm1638.prepare_write(AddressingMode::AutoIncrement);

        for (index, on) in leds.iter().enumerate() {
            self.tm1638.write_data(led_address(index), &[*on as u8])?;
        }

        Ok(())
    }

    /// Set all 8 LEDs from a mask, LED 0 in bit 0
    pub fn set_led_mask(&mut self, mask: u8) -> Result<(), Error> {
        let mut leds = [false; LED8KEY_DIGITS];
        for (bit, led) in leds.iter_mut().enumerate() {
            *led = mask & (1 << bit) != 0;
        }

        self.set_leds(leds)
    }

    /// Turn one LED on or off, leaving the others alone
    pub fn set_led(&mut self, index: usize, on: bool) -> Result<(), Error> {
        if index >= LED8KEY_DIGITS {
            return Err(Argument::LedIndex.into());
        }

        self.tm1638.prepare_write(AddressingMode::AutoIncrement);
        self.tm1638.write_data(led_address(index), &[on as u8])
    }

    /// Write raw segment masks to consecutive digits, starting with digit `start`.
    ///
    /// `segments` must hold at least one mask and must not run past the last digit.  LEDs are
    /// not touched.
    pub fn write_digits(&mut self, start: usize, segments: &[u8]) -> Result<(), Error> {
        let fits = start
            .checked_add(segments.len())
            .is_some_and(|end| end <= LED8KEY_DIGITS);
        if segments.is_empty() || !fits {
            return Err(Argument::DigitRange.into());
        }

        self.tm1638.prepare_write(AddressingMode::AutoIncrement);

        for (offset, mask) in segments.iter().enumerate() {
            self.tm1638
                .write_data(digit_address(start + offset), core::slice::from_ref(mask))?;
        }

        Ok(())
    }

    /// Show `text` on the display, left aligned, blanking the digits it does not cover.
    ///
    /// Fails without writing anything if the font lacks a character or the text needs more
    /// than 8 digits.
    pub fn write_string(&mut self, text: &str) -> Result<(), Error> {
        let mut digits = [0u8; LED8KEY_DIGITS];
        self.font.build_digits(text, LED8KEY_DIGITS, &mut digits)?;

        self.write_digits(0, &digits)
    }

    /// Read the 8 buttons, left to right
    pub fn read_buttons(&mut self) -> [bool; LED8KEY_DIGITS] {
        self.tm1638.read_keys().led8key_buttons()
    }
}

fn digit_address(index: usize) -> u8 {
    (index * 2) as u8
}

fn led_address(index: usize) -> u8 {
    (index * 2 + 1) as u8
}
