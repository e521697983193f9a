//! Module describing the [`BusDriver`] trait and the bit-banging implementation of the TM1638
//! bus in terms of [`GpioPin`]s.

use embedded_hal_1::delay::DelayNs;

use crate::pin::GpioPin;

/// Half period of the clock.  The datasheet asks for at least 1us between edges.
const CLOCK_TICK_US: u32 = 1;

/// The interval to wait after sending the key scan command, before clocking in data.
/// Corresponds to tWAIT in section 12 of the datasheet, under Timing Characteristics.
const TWAIT_US: u32 = 1;

/// This trait represents some low-level implementation of the TM1638 bus interface.
///
/// The TM1638 uses a three-wire bus similar to SPI, but not so similar that we can just use an SPI
/// implementation instead.  This trait exposes a byte-level interface that must be implemented by
/// a bus driver in terms of bit-level I/O, either using bit-banging, PIO, or maybe some hacked
/// version of an SPI implementation.
///
/// Each method is one complete transaction: STROBE goes low before the first byte and high again
/// after the last one.  There is nothing to report back on failure, the chip never acknowledges
/// anything, so none of these return a `Result`.
pub trait BusDriver {
    /// Send a single command, with no payload, and no response expected
    fn send_command(&mut self, b: u8);

    /// Send a command with a data payload, but no response expected.
    fn send_command_write_data(&mut self, b: u8, data: &[u8]);

    /// Send a command which is expected to generate a response.
    ///
    /// The expected size of the response (in bytes) is determined by the size of the `data` slice.
    fn send_command_read_data(&mut self, b: u8, data: &mut [u8]);
}

impl<D: BusDriver + ?Sized> BusDriver for &mut D {
    fn send_command(&mut self, b: u8) {
        (**self).send_command(b)
    }

    fn send_command_write_data(&mut self, b: u8, data: &[u8]) {
        (**self).send_command_write_data(b, data)
    }

    fn send_command_read_data(&mut self, b: u8, data: &mut [u8]) {
        (**self).send_command_read_data(b, data)
    }
}

/// Implementation of [`BusDriver`] that bit-bangs the protocol on three GPIO lines.
///
/// Works with any [`GpioPin`] implementation and any Embedded HAL delay provider.  DIO must have
/// a pull-up resistor; the boards this crate targets all have one on the module itself.
pub struct BitBangingBusDriver<Strobe, Clock, Dio, Delay> {
    strobe: Strobe,
    clock: Clock,
    dio: Dio,
    delay: Delay,
}

impl<Strobe, Clock, Dio, Delay> BitBangingBusDriver<Strobe, Clock, Dio, Delay>
where
    Strobe: GpioPin,
    Clock: GpioPin,
    Dio: GpioPin,
    Delay: DelayNs,
{
    /// Take ownership of the pins and put the bus in its idle state: STROBE and CLK driven high,
    /// DIO released.
    pub fn new(mut strobe: Strobe, mut clock: Clock, mut dio: Dio, delay: Delay) -> Self {
        // Latch the level before enabling the driver so the line never glitches low
        strobe.write(true);
        strobe.set_output();

        clock.write(true);
        clock.set_output();

        // DIO stays an input until we need to pull it low.  The latch is kept at 0 so that
        // switching it to output always drives a 0.
        dio.write(false);
        dio.set_input();

        Self {
            strobe,
            clock,
            dio,
            delay,
        }
    }

    /// Give back the pins and the delay provider
    pub fn release(self) -> (Strobe, Clock, Dio, Delay) {
        (self.strobe, self.clock, self.dio, self.delay)
    }

    fn wait_clock_tick(&mut self) {
        self.delay.delay_us(CLOCK_TICK_US);
    }

    fn wait_twait(&mut self) {
        self.delay.delay_us(TWAIT_US);
    }

    fn begin(&mut self) {
        self.strobe.write(false);
        self.wait_clock_tick();
    }

    fn end(&mut self) {
        self.strobe.write(true);
        self.wait_clock_tick();
    }

    /// Shift the byte value out on the DIO pin, LSB first.
    ///
    /// DIO is only ever pulled low or released; a `1` is the pull-up doing its job.  The chip
    /// latches the bit while CLK is low, so DIO is settled before the falling edge.  DIO is left
    /// released afterwards.
    fn send_byte(&mut self, mut value: u8) {
        for _ in 0..8 {
            if value & 1 == 1 {
                self.dio.set_input();
            } else {
                self.dio.write(false);
                self.dio.set_output();
            }

            self.clock.write(false);
            self.wait_clock_tick();
            value >>= 1;
            self.clock.write(true);
            self.wait_clock_tick();
        }

        self.dio.set_input();
    }

    /// Clock a byte in from the DIO pin.
    ///
    /// Taking CLK low tells the chip to present the next bit, which is sampled just before CLK
    /// goes high again.  Each sample is shifted in from the right, so the first bit on the wire
    /// ends up in bit 7 of the result.  The chip sends LSB first, so the value returned is the
    /// bit-reversal of the datasheet's key scan byte; the board key maps in [`crate::keys`] are
    /// written in terms of this order.
    fn read_byte(&mut self) -> u8 {
        let mut value = 0u8;

        self.dio.set_input();

        for _ in 0..8 {
            self.clock.write(false);
            value <<= 1;
            self.wait_clock_tick();

            if self.dio.read() {
                value |= 1;
            }

            self.clock.write(true);
            self.wait_clock_tick();
        }

        value
    }
}

impl<Strobe, Clock, Dio, Delay> BusDriver for BitBangingBusDriver<Strobe, Clock, Dio, Delay>
where
    Strobe: GpioPin,
    Clock: GpioPin,
    Dio: GpioPin,
    Delay: DelayNs,
{
    fn send_command(&mut self, b: u8) {
        self.begin();
        self.send_byte(b);
        self.wait_clock_tick();
        self.end();
    }

    fn send_command_write_data(&mut self, b: u8, data: &[u8]) {
        self.begin();
        self.send_byte(b);
        self.wait_clock_tick();
        for b in data {
            #[cfg(feature = "defmt")]
            defmt::trace!("data byte = {=u8:x}", b);
            self.send_byte(*b);
        }
        self.end();
    }

    fn send_command_read_data(&mut self, b: u8, data: &mut [u8]) {
        self.begin();
        self.send_byte(b);

        // Wait Twait interval before reading response
        self.wait_twait();

        #[cfg(feature = "defmt")]
        defmt::trace!("Expecting {0} bytes from controller", data.len());

        for byte in data.iter_mut() {
            *byte = self.read_byte();
            self.wait_clock_tick();
        }

        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBus, Wire};

    fn bus(wire: &Wire) -> SimBus {
        wire.bus()
    }

    #[test]
    fn new_leaves_bus_idle() {
        let wire = Wire::new();
        let _bus = bus(&wire);

        assert!(wire.strobe_high());
        assert!(wire.clock_high());
        assert!(!wire.dio_driven());
        assert_eq!(0, wire.transactions().len());
    }

    #[test]
    fn command_is_sent_lsb_first_inside_one_strobe() {
        let wire = Wire::new();
        let mut bus = bus(&wire);

        bus.send_command(0b1000_1010);

        assert_eq!(wire.transactions(), [vec![0b1000_1010]]);
        assert!(wire.strobe_high());
        assert!(!wire.dio_driven(), "DIO must be released after every byte");
    }

    #[test]
    fn dio_is_never_driven_high() {
        let wire = Wire::new();
        let mut bus = bus(&wire);

        bus.send_command_write_data(0xc0, &[0x00, 0xff, 0x5a]);
        bus.send_command(0xff);
        let mut data = [0u8; 4];
        bus.send_command_read_data(0x42, &mut data);

        assert_eq!(wire.transactions()[0], [0xc0, 0x00, 0xff, 0x5a]);
        assert!(!wire.dio_driven_high(), "ones must be sent by releasing DIO");
    }

    #[test]
    fn data_bytes_share_the_command_strobe() {
        let wire = Wire::new();
        let mut bus = bus(&wire);

        bus.send_command_write_data(0xc3, &[0x00, 0xff, 0x5a]);

        assert_eq!(wire.transactions(), [vec![0xc3, 0x00, 0xff, 0x5a]]);
    }

    #[test]
    fn read_places_first_wire_bit_in_msb() {
        let wire = Wire::new();
        // What the chip holds, in datasheet order
        wire.set_scan([0b0000_0001, 0b0001_0000, 0b1000_0000, 0b0000_0110]);
        let mut bus = bus(&wire);

        let mut data = [0u8; 4];
        bus.send_command_read_data(0x42, &mut data);

        assert_eq!(data, [0b1000_0000, 0b0000_1000, 0b0000_0001, 0b0110_0000]);
        assert_eq!(wire.transactions(), [vec![0x42]]);
        assert!(!wire.dio_driven());
    }

    #[test]
    fn release_returns_pins() {
        let wire = Wire::new();
        let (mut strobe, _clock, _dio, _delay) = bus(&wire).release();

        strobe.write(false);
        assert!(!wire.strobe_high());
    }
}
