//! The GPIO capability the bit-banging bus driver is written against.

/// A single digital I/O line whose direction can be switched at runtime.
///
/// The TM1638 shares one data line (DIO) between host and chip.  The host emulates an open-drain
/// output on it: a `0` is sent by driving the line low, a `1` by switching the pin to input and
/// letting the board's pull-up resistor present the high level.  That needs a pin which can flip
/// between input and output, which is exactly what this trait exposes.
///
/// Sadly, due to [this issue](https://github.com/rust-embedded/embedded-hal/issues/397), there is
/// no Embedded HAL trait for such a pin, so implement this one in terms of whatever your HAL
/// provides.  STROBE and CLK only ever need `write` and `set_output`.
///
/// None of these operations can fail; the bus has no feedback channel to report a failure on.
pub trait GpioPin {
    /// Set the output latch of the pin.  Only visible on the line while the pin is an output.
    fn write(&mut self, high: bool);

    /// Sample the level currently present on the line.
    fn read(&mut self) -> bool;

    /// Stop driving the line.
    fn set_input(&mut self);

    /// Start driving the line with the value of the output latch.
    fn set_output(&mut self);
}

impl<P: GpioPin + ?Sized> GpioPin for &mut P {
    fn write(&mut self, high: bool) {
        (**self).write(high)
    }

    fn read(&mut self) -> bool {
        (**self).read()
    }

    fn set_input(&mut self) {
        (**self).set_input()
    }

    fn set_output(&mut self) {
        (**self).set_output()
    }
}

#[cfg(feature = "embassy-rp")]
mod embassy_rp_pin {
    use embassy_rp::gpio;

    /// A `Flex` pin can switch direction at runtime, so it serves for all three lines.
    impl<'d, T: gpio::Pin> super::GpioPin for gpio::Flex<'d, T> {
        fn write(&mut self, high: bool) {
            self.set_level(high.into());
        }

        fn read(&mut self) -> bool {
            self.is_high()
        }

        fn set_input(&mut self) {
            self.set_as_input();
        }

        fn set_output(&mut self) {
            self.set_as_output();
        }
    }

    /// Flex pins for STROBE, CLK and DIO on an RP2040, in that order.
    pub type EmbassyRpPins<'d, StrobePin, ClockPin, DioPin> = (
        gpio::Flex<'d, StrobePin>,
        gpio::Flex<'d, ClockPin>,
        gpio::Flex<'d, DioPin>,
    );

    /// Wrap three RP2040 pins as [`gpio::Flex`] pins usable by the bit-banging driver.
    pub fn embassy_rp_pins<'d, StrobePin: gpio::Pin, ClockPin: gpio::Pin, DioPin: gpio::Pin>(
        strobe: StrobePin,
        clock: ClockPin,
        dio: DioPin,
    ) -> EmbassyRpPins<'d, StrobePin, ClockPin, DioPin> {
        (
            gpio::Flex::new(strobe),
            gpio::Flex::new(clock),
            gpio::Flex::new(dio),
        )
    }
}

#[cfg(feature = "embassy-rp")]
pub use embassy_rp_pin::{embassy_rp_pins, EmbassyRpPins};
