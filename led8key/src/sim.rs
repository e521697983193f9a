//! A simulated TM1638 on the far end of three [`GpioPin`]s, for tests.
//!
//! The three pin handles share one [`Wire`].  Every pin operation re-evaluates the line levels
//! and feeds the edges to a small model of the chip, which decodes commands, keeps the 16 bytes
//! of display memory and clocks key scan bytes back out on DIO.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal_mock::eh1::delay::NoopDelay;

use crate::bus::BitBangingBusDriver;
use crate::pin::GpioPin;
use crate::Tm1638;

pub type SimBus = BitBangingBusDriver<SimPin, SimPin, SimPin, NoopDelay>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Line {
    Strobe,
    Clock,
    Dio,
}

#[derive(Default)]
struct PinState {
    latch: bool,
    output: bool,
}

impl PinState {
    /// Level on a line with a pull-up and nothing else driving it
    fn level(&self) -> bool {
        !self.output || self.latch
    }
}

#[derive(Default)]
struct Chip {
    memory: [u8; 16],
    scan: [u8; 4],
    display_on: bool,
    brightness: u8,
    read_mode: bool,
    fixed_address: bool,
    address: u8,

    bytes: Vec<u8>,
    shift: u8,
    bits: u8,
    sending: bool,
    send_byte: usize,
    send_bit: u8,
    pulling_low: bool,

    transactions: Vec<Vec<u8>>,
}

impl Chip {
    fn begin(&mut self) {
        self.bytes.clear();
        self.shift = 0;
        self.bits = 0;
        self.sending = false;
        self.pulling_low = false;
    }

    fn end(&mut self) {
        if !self.bytes.is_empty() {
            self.transactions.push(core::mem::take(&mut self.bytes));
        }
        self.sending = false;
        self.pulling_low = false;
    }

    fn clock_falling(&mut self, dio: bool) {
        if self.sending {
            let byte = self.scan.get(self.send_byte).copied().unwrap_or(0);
            self.pulling_low = (byte >> self.send_bit) & 1 == 0;
            self.send_bit += 1;
            if self.send_bit == 8 {
                self.send_bit = 0;
                self.send_byte += 1;
            }
            return;
        }

        if dio {
            self.shift |= 1 << self.bits;
        }
        self.bits += 1;
        if self.bits == 8 {
            let b = self.shift;
            self.shift = 0;
            self.bits = 0;
            self.receive(b);
        }
    }

    fn receive(&mut self, b: u8) {
        self.bytes.push(b);

        if self.bytes.len() == 1 {
            match b >> 6 {
                0b01 => {
                    self.read_mode = b & 0b11 == 0b10;
                    self.fixed_address = b & 0b1000 != 0;
                    if self.read_mode {
                        self.sending = true;
                        self.send_byte = 0;
                        self.send_bit = 0;
                    }
                }
                0b10 => {
                    self.display_on = b & 0b1000 != 0;
                    self.brightness = b & 0b111;
                }
                0b11 => self.address = b & 0x0f,
                _ => {}
            }
            return;
        }

        let opened_with_address = self.bytes.first().is_some_and(|cmd| cmd >> 6 == 0b11);
        if opened_with_address && !self.read_mode {
            self.memory[self.address as usize] = b;
            if !self.fixed_address {
                self.address = (self.address + 1) & 0x0f;
            }
        }
    }
}

#[derive(Default)]
struct State {
    strobe: PinState,
    clock: PinState,
    dio: PinState,
    chip: Chip,
    pin_ops: usize,
    dio_driven_high: bool,
}

impl State {
    fn dio_level(&self) -> bool {
        self.dio.level() && !self.chip.pulling_low
    }

    fn pin(&mut self, line: Line) -> &mut PinState {
        match line {
            Line::Strobe => &mut self.strobe,
            Line::Clock => &mut self.clock,
            Line::Dio => &mut self.dio,
        }
    }

    fn update(&mut self, line: Line, f: impl FnOnce(&mut PinState)) {
        self.pin_ops += 1;

        let strobe_before = self.strobe.level();
        let clock_before = self.clock.level();

        f(self.pin(line));

        if self.dio.output && self.dio.latch {
            self.dio_driven_high = true;
        }

        let strobe = self.strobe.level();
        let clock = self.clock.level();

        if strobe_before && !strobe {
            self.chip.begin();
        } else if !strobe_before && strobe {
            self.chip.end();
        }

        if !strobe && clock_before && !clock {
            let dio = self.dio_level();
            self.chip.clock_falling(dio);
        }
    }
}

/// The shared state of the three lines and the chip listening on them
#[derive(Clone, Default)]
pub struct Wire(Rc<RefCell<State>>);

impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    /// STROBE, CLK and DIO handles onto this wire
    pub fn pins(&self) -> (SimPin, SimPin, SimPin) {
        (
            SimPin::new(self, Line::Strobe),
            SimPin::new(self, Line::Clock),
            SimPin::new(self, Line::Dio),
        )
    }

    pub fn bus(&self) -> SimBus {
        let (strobe, clock, dio) = self.pins();
        BitBangingBusDriver::new(strobe, clock, dio, NoopDelay::new())
    }

    pub fn driver(&self) -> Tm1638<SimBus> {
        Tm1638::new(self.bus())
    }

    pub fn strobe_high(&self) -> bool {
        self.0.borrow().strobe.level()
    }

    pub fn clock_high(&self) -> bool {
        self.0.borrow().clock.level()
    }

    pub fn dio_driven(&self) -> bool {
        self.0.borrow().dio.output
    }

    /// Whether DIO was ever actively driven high.  An open drain line only pulls low.
    pub fn dio_driven_high(&self) -> bool {
        self.0.borrow().dio_driven_high
    }

    /// Bytes received by the chip, one entry per STROBE frame
    pub fn transactions(&self) -> Vec<Vec<u8>> {
        self.0.borrow().chip.transactions.clone()
    }

    pub fn clear_transactions(&self) {
        self.0.borrow_mut().chip.transactions.clear();
    }

    /// Set the key scan bytes as the chip holds them (datasheet bit order)
    pub fn set_scan(&self, scan: [u8; 4]) {
        self.0.borrow_mut().chip.scan = scan;
    }

    /// Set the key scan bytes so that the host reads back exactly `scan`
    pub fn set_scan_as_read(&self, scan: [u8; 4]) {
        self.set_scan(scan.map(u8::reverse_bits));
    }

    pub fn memory(&self) -> [u8; 16] {
        self.0.borrow().chip.memory
    }

    pub fn set_memory(&self, memory: [u8; 16]) {
        self.0.borrow_mut().chip.memory = memory;
    }

    /// Display enable and brightness
    pub fn display(&self) -> (bool, u8) {
        let state = self.0.borrow();
        (state.chip.display_on, state.chip.brightness)
    }

    /// Number of level or direction changes requested on any pin so far
    pub fn pin_ops(&self) -> usize {
        self.0.borrow().pin_ops
    }
}

pub struct SimPin {
    line: Line,
    wire: Wire,
}

impl SimPin {
    fn new(wire: &Wire, line: Line) -> Self {
        Self {
            line,
            wire: wire.clone(),
        }
    }
}

impl GpioPin for SimPin {
    fn write(&mut self, high: bool) {
        self.wire
            .0
            .borrow_mut()
            .update(self.line, |pin| pin.latch = high);
    }

    fn read(&mut self) -> bool {
        let state = self.wire.0.borrow();
        match self.line {
            Line::Strobe => state.strobe.level(),
            Line::Clock => state.clock.level(),
            Line::Dio => state.dio_level(),
        }
    }

    fn set_input(&mut self) {
        self.wire
            .0
            .borrow_mut()
            .update(self.line, |pin| pin.output = false);
    }

    fn set_output(&mut self) {
        self.wire
            .0
            .borrow_mut()
            .update(self.line, |pin| pin.output = true);
    }
}
