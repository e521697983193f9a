/// The number of bytes used to represent the state of the keys on the board
pub const KEY_BYTES: usize = 4;

/// The raw key scan bytes in response to a call to [`crate::Tm1638::read_keys`], and the
/// board-specific decoding of them.
///
/// The bytes are kept exactly as the bus driver clocked them in, which puts the first bit the
/// chip sends in bit 7.  That is the reverse of the datasheet's tables, and the masks below are
/// written in this order.
///
/// Which scan bit a button lands on is down to how each board is wired, so there is one decoder
/// per board:
///
/// - [`Self::led8key_buttons`] for the LED&KEY board with 8 buttons in a row
/// - [`Self::disp16key_buttons`] and [`Self::is_pressed`] for the 4x4 keypad board
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanData([u8; KEY_BYTES]);

/// The LED&KEY buttons S1-S4 are wired to KS1, KS3, KS5 and KS7, which show up in this bit of
/// scan bytes 0-3.
const LED8KEY_LEFT_MASK: u8 = 0x80;

/// ...and S5-S8 are wired to KS2, KS4, KS6 and KS8, in this bit.
const LED8KEY_RIGHT_MASK: u8 = 0x08;

/// (scan byte, mask) for each key of the 4x4 keypad, row by row, as measured by pressing each
/// button on its own:
///
/// ```text
///     Column 1       Column 2       Column 3       Column 4
///  [20,00,00,00]  [02,00,00,00]  [00,20,00,00]  [00,02,00,00] Row 1
///  [00,00,20,00]  [00,00,02,00]  [00,00,00,20]  [00,00,00,02] Row 2
///  [40,00,00,00]  [04,00,00,00]  [00,40,00,00]  [00,04,00,00] Row 3
///  [00,00,40,00]  [00,00,04,00]  [00,00,00,40]  [00,00,00,04] Row 4
/// ```
const KEYPAD: [[(usize, u8); 4]; 4] = [
    [(0, 0x20), (0, 0x02), (1, 0x20), (1, 0x02)],
    [(2, 0x20), (2, 0x02), (3, 0x20), (3, 0x02)],
    [(0, 0x40), (0, 0x04), (1, 0x40), (1, 0x04)],
    [(2, 0x40), (2, 0x04), (3, 0x40), (3, 0x04)],
];

impl ScanData {
    pub fn new(bytes: [u8; KEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Quickly check if *any* keys are pressed
    pub fn any_pressed(&self) -> bool {
        self.0.iter().any(|byte| *byte != 0)
    }

    /// The 8 buttons of the LED&KEY board, left to right.
    pub fn led8key_buttons(&self) -> [bool; 8] {
        let mut buttons = [false; 8];
        let (left, right) = buttons.split_at_mut(4);

        for ((byte, l), r) in self.0.iter().zip(left).zip(right) {
            *l = byte & LED8KEY_LEFT_MASK != 0;
            *r = byte & LED8KEY_RIGHT_MASK != 0;
        }

        buttons
    }

    /// Same as [`Self::led8key_buttons`] packed into a byte, S1 in bit 0.
    ///
    /// Handing this straight to [`crate::Led8Key::set_led_mask`] lights the LED above each pressed
    /// button.
    pub fn led8key_bitmask(&self) -> u8 {
        self.led8key_buttons()
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .fold(0, |mask, (bit, _)| mask | (1 << bit))
    }

    /// The 16 buttons of the keypad board, left to right and top to bottom.
    pub fn disp16key_buttons(&self) -> [bool; 16] {
        let mut buttons = [false; 16];

        for (button, (byte, mask)) in buttons.iter_mut().zip(KEYPAD.iter().flatten()) {
            *button = self.0[*byte] & mask != 0;
        }

        buttons
    }

    /// Test if the given key of the 4x4 keypad is pressed
    pub fn is_pressed(&self, col: KeypadColumn, row: KeypadRow) -> bool {
        let (byte, mask) = KEYPAD[row.index()][col.index()];

        #[cfg(feature = "defmt")]
        defmt::trace!("byte={=usize} mask={=u8:x}", byte, mask);

        self.0[byte] & mask != 0
    }
}

impl AsRef<[u8; KEY_BYTES]> for ScanData {
    fn as_ref(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

impl AsRef<[u8]> for ScanData {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

/// The columns of the 4x4 keypad, left to right
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::VariantArray)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeypadColumn {
    C1,
    C2,
    C3,
    C4,
}

impl KeypadColumn {
    pub fn to_column_number(self) -> u8 {
        self.index() as u8 + 1
    }

    fn index(self) -> usize {
        match self {
            Self::C1 => 0,
            Self::C2 => 1,
            Self::C3 => 2,
            Self::C4 => 3,
        }
    }
}

/// The rows of the 4x4 keypad, top to bottom
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::VariantArray)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeypadRow {
    R1,
    R2,
    R3,
    R4,
}

impl KeypadRow {
    pub fn to_row_number(self) -> u8 {
        self.index() as u8 + 1
    }

    fn index(self) -> usize {
        match self {
            Self::R1 => 0,
            Self::R2 => 1,
            Self::R3 => 2,
            Self::R4 => 3,
        }
    }
}
