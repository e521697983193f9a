//! Driver for TM1638 based LED and key boards, talking to the chip by bit-banging three GPIO lines.
//!
//! The crate is layered the same way the data flows:
//!
//! - [`GpioPin`] is the only thing a platform has to provide: a pin that can be written, read and
//!   switched between input and output.
//! - [`BitBangingBusDriver`] implements the TM1638 bit-serial protocol on three of those pins,
//!   behind the [`BusDriver`] trait.
//! - [`Tm1638`] encodes the chip's commands: display control, write setup, memory writes and key
//!   scan reads.
//! - [`Font`] turns text into seven segment masks.
//! - [`Led8Key`] and [`Disp16Key`] map the chip's memory and key scan bytes onto the LEDs,
//!   digits and buttons of the two boards supported.
//!
//! ```
//! # struct Pin;
//! # impl led8key::GpioPin for Pin {
//! #     fn write(&mut self, _high: bool) {}
//! #     fn read(&mut self) -> bool { true }
//! #     fn set_input(&mut self) {}
//! #     fn set_output(&mut self) {}
//! # }
//! # let (strobe, clock, dio) = (Pin, Pin, Pin);
//! # let delay = embedded_hal_mock::eh1::delay::NoopDelay::new();
//! let driver = led8key::Tm1638::builder()
//!     .with_delay(delay)
//!     .with_bit_banging_pins(strobe, clock, dio)
//!     .build();
//!
//! let mut board = led8key::Led8Key::new(driver);
//! board.init();
//! board.write_string("3.14")?;
//! board.set_leds([true, false, true, false, true, false, true, false])?;
//! # Ok::<(), led8key::Error>(())
//! ```
//!
//! A driver instance assumes it is the only user of its three lines.  Nothing here is
//! thread-safe; wrap the driver in a mutex if several tasks need it.
#![cfg_attr(not(test), no_std)]

mod bus;
mod command;
mod disp16key;
mod error;
mod font;
mod keys;
mod led8key;
mod pin;

#[cfg(test)]
mod sim;

use embedded_hal_1::delay::DelayNs;

pub use bus::*;
pub use command::AddressingMode;
pub use disp16key::*;
pub use error::*;
pub use font::*;
pub use keys::*;
pub use led8key::*;
pub use pin::*;

use command::{ReadCommand, WriteCommand};

/// Bytes of display memory on the chip
pub const MEMORY_SIZE: usize = 16;

/// Highest display brightness; 0 is the lowest
pub const MAX_BRIGHTNESS: u8 = 7;

/// Brightness [`Tm1638::init`] switches the display on with
pub const DEFAULT_BRIGHTNESS: u8 = 2;

const BLANK_MEMORY: [u8; MEMORY_SIZE] = [0; MEMORY_SIZE];

pub struct Tm1638Builder;

impl Tm1638Builder {
    /// Use an arbitrary [`BusDriver`] implementation; nothing more needs to be specified!
    pub fn with_bus_driver<D: BusDriver>(self, driver: D) -> Tm1638Builder3<D> {
        Tm1638Builder3 { driver }
    }

    /// Use an arbitrary Embedded HAL delay provider to time the bit-banging driver.
    pub fn with_delay<Delay: DelayNs>(self, delay: Delay) -> Tm1638Builder1<Delay> {
        Tm1638Builder1 { delay }
    }

    #[cfg(feature = "embassy-time")]
    /// Time the bit-banging driver with the blocking `embassy-time` delay
    pub fn with_embassy_delay(self) -> Tm1638Builder1<embassy_time::Delay> {
        self.with_delay(embassy_time::Delay)
    }
}

pub struct Tm1638Builder1<Delay: DelayNs> {
    delay: Delay,
}

impl<Delay: DelayNs> Tm1638Builder1<Delay> {
    /// Use the bit-banging driver, with arbitrary [`GpioPin`] implementations specific to your
    /// target platform
    pub fn with_bit_banging_pins<Strobe: GpioPin, Clock: GpioPin, Dio: GpioPin>(
        self,
        strobe: Strobe,
        clock: Clock,
        dio: Dio,
    ) -> Tm1638Builder2<Strobe, Clock, Dio, Delay> {
        Tm1638Builder2 {
            strobe,
            clock,
            dio,
            delay: self.delay,
        }
    }

    /// Use a bit-banging driver talking to the specified Embassy RP HAL pins
    #[cfg(feature = "embassy-rp")]
    pub fn with_embassy_rp_pins<
        'a,
        StrobePin: embassy_rp::gpio::Pin,
        ClockPin: embassy_rp::gpio::Pin,
        DioPin: embassy_rp::gpio::Pin,
    >(
        self,
        strobe: StrobePin,
        clock: ClockPin,
        dio: DioPin,
    ) -> Tm1638Builder2<
        embassy_rp::gpio::Flex<'a, StrobePin>,
        embassy_rp::gpio::Flex<'a, ClockPin>,
        embassy_rp::gpio::Flex<'a, DioPin>,
        Delay,
    > {
        let (strobe, clock, dio) = embassy_rp_pins(strobe, clock, dio);
        self.with_bit_banging_pins(strobe, clock, dio)
    }
}

pub struct Tm1638Builder2<Strobe, Clock, Dio, Delay> {
    strobe: Strobe,
    clock: Clock,
    dio: Dio,
    delay: Delay,
}

impl<Strobe: GpioPin, Clock: GpioPin, Dio: GpioPin, Delay: DelayNs>
    Tm1638Builder2<Strobe, Clock, Dio, Delay>
{
    /// Construct the [`Tm1638`] instance using the bit-banging driver.  This puts the bus in its
    /// idle state right away.
    pub fn build(self) -> Tm1638<BitBangingBusDriver<Strobe, Clock, Dio, Delay>> {
        let driver = BitBangingBusDriver::new(self.strobe, self.clock, self.dio, self.delay);
        Tm1638::new(driver)
    }
}

pub struct Tm1638Builder3<D: BusDriver> {
    driver: D,
}

impl<D: BusDriver> Tm1638Builder3<D> {
    /// Construct the [`Tm1638`] instance using the selected driver.
    pub fn build(self) -> Tm1638<D> {
        Tm1638::new(self.driver)
    }
}

/// Driver for TM1638 display and switch controllers.
///
/// The implementation is generalized over the implementation of the underling bus protocol driver,
/// behind the [`BusDriver`] trait.  This allows most of the code to remain the same, while
/// supporting multiple hardware HALs and timer implementations.
///
/// This layer knows the chip, not the board: addresses are raw display memory addresses and key
/// scan data is returned undecoded.  See [`Led8Key`] and [`Disp16Key`] for the board layouts.
///
/// Every method validates its arguments before touching the bus, so a call that returns an error
/// has sent nothing to the chip.
pub struct Tm1638<Driver> {
    driver: Driver,

    /// The write mode the last data command put the chip in.  `None` when unknown, or after a
    /// key scan left the chip in read mode.
    write_mode: Option<AddressingMode>,
}

impl Tm1638<()> {
    /// Return a builder pattern implementation to ease some of the type parameter complexity
    /// around creating the bus driver and delay.
    ///
    /// This is not required; you can always instantiate the driver without a builder, but you
    /// might have to type more angle brackets to do so.
    pub fn builder() -> Tm1638Builder {
        Tm1638Builder
    }
}

impl<Driver: BusDriver> Tm1638<Driver> {
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            write_mode: None,
        }
    }

    /// Give back the bus driver
    pub fn release(self) -> Driver {
        self.driver
    }

    /// Reset the TM1638 state, blanking all of the LEDs, and switch the display on.
    pub fn init(&mut self) {
        self.blank_display();

        // Activate the display with a reasonable default brightness
        self.apply_write_command(WriteCommand::ConfigureDisplay {
            enabled: true,
            brightness: DEFAULT_BRIGHTNESS,
        });
    }

    /// Clear all 16 bytes of display memory, which blanks every digit and LED on any board.
    pub fn blank_display(&mut self) {
        self.prepare_write(AddressingMode::AutoIncrement);

        self.apply_write_command(WriteCommand::WriteData {
            address: 0,
            data: &BLANK_MEMORY,
        });
    }

    /// Switch the display on or off and set its brightness.
    ///
    /// `brightness` goes from 0 (1/16 pulse width) to 7 (14/16).  The steps are not linear:
    ///
    /// | brightness | 0    | 1    | 2    | 3     | 4     | 5     | 6     | 7     |
    /// |------------|------|------|------|-------|-------|-------|-------|-------|
    /// | pulse      | 1/16 | 2/16 | 4/16 | 10/16 | 11/16 | 12/16 | 13/16 | 14/16 |
    pub fn configure_display(&mut self, enabled: bool, brightness: u8) -> Result<(), Error> {
        if brightness > MAX_BRIGHTNESS {
            return Err(Argument::Brightness.into());
        }

        self.apply_write_command(WriteCommand::ConfigureDisplay {
            enabled,
            brightness,
        });

        Ok(())
    }

    /// Put the chip in write mode with the given address behaviour.
    ///
    /// This has to happen before [`Self::write_data`], and again after any key scan read.  The
    /// board types take care of it themselves.
    pub fn init_write_data(&mut self, auto_increment: bool) {
        let mode = if auto_increment {
            AddressingMode::AutoIncrement
        } else {
            AddressingMode::Fixed
        };

        self.apply_write_command(WriteCommand::SetWriteMode(mode));
        self.write_mode = Some(mode);
    }

    /// Write `data` to display memory starting at `address`.
    ///
    /// `address` must be 0 to 15 and `data` 1 to 16 bytes.  In auto increment mode the bytes
    /// fill consecutive addresses (the chip wraps past 15); in fixed mode they all land on
    /// `address`.
    pub fn write_data(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        if address as usize >= MEMORY_SIZE {
            return Err(Argument::Address.into());
        }
        if data.is_empty() || data.len() > MEMORY_SIZE {
            return Err(Argument::DataLength.into());
        }

        self.apply_write_command(WriteCommand::WriteData { address, data });

        Ok(())
    }

    /// Read 1 to 4 bytes of raw key scan data, one per byte of `data`.
    ///
    /// This leaves the chip in read mode.
    pub fn read_scanning_data(&mut self, data: &mut [u8]) -> Result<(), Error> {
        if data.is_empty() || data.len() > KEY_BYTES {
            return Err(Argument::ReadCount.into());
        }

        self.apply_read_command(ReadCommand::ReadKeys, data);

        Ok(())
    }

    /// Read the whole key scan state from the controller
    pub fn read_keys(&mut self) -> ScanData {
        let mut buffer = [0u8; KEY_BYTES];

        self.apply_read_command(ReadCommand::ReadKeys, &mut buffer);

        #[cfg(feature = "defmt")]
        defmt::trace!("keys = {:?}", buffer);

        ScanData::new(buffer)
    }

    /// Issue the write data command for `mode` unless the chip is known to be in that mode
    /// already.
    pub(crate) fn prepare_write(&mut self, mode: AddressingMode) {
        if self.write_mode != Some(mode) {
            self.init_write_data(mode == AddressingMode::AutoIncrement);
        }
    }

    /// Apply the command to the controller
    fn apply_write_command(&mut self, command: WriteCommand<'_>) {
        let (command_byte, data_bytes) = command.encode();

        #[cfg(feature = "defmt")]
        defmt::trace!("command byte = {=u8:x}", command_byte);

        if let Some(data_bytes) = data_bytes {
            self.driver.send_command_write_data(command_byte, data_bytes);
        } else {
            self.driver.send_command(command_byte);
        }
    }

    fn apply_read_command(&mut self, command: ReadCommand, read_buffer: &mut [u8]) {
        let command_byte = command.encode();

        #[cfg(feature = "defmt")]
        defmt::trace!("command byte = {=u8:x}", command_byte);

        self.driver.send_command_read_data(command_byte, read_buffer);

        // Reading switched the chip out of write mode
        self.write_mode = None;
    }
}
