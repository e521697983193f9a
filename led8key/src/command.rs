//! Encoding of the three TM1638 command families into the first byte of a transaction.
//!
//! ```text
//! 01_00_I_tMM  data command       I: 0 auto increment, 1 fixed address
//!                                 t: test mode, always 0
//!                                 MM: 00 write display register, 10 read key scanning data
//! 10_00_D_PPP  display control    D: display on, PPP: pulse width (brightness)
//! 11_00_AAAA   address command    AAAA: display memory address 0x0 to 0xF
//! ```

/// How the chip moves its address pointer after each byte written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressingMode {
    /// Each byte lands one address after the previous one, so a single transaction can fill a
    /// contiguous range of display memory.
    AutoIncrement,
    /// Every byte goes to the address named by the address command.
    Fixed,
}

const DATA_COMMAND: u8 = 0b0100_0000;
const FIXED_ADDRESS: u8 = 0b0000_1000;
const READ_KEYS: u8 = 0b0000_0010;

const DISPLAY_CONTROL_COMMAND: u8 = 0b1000_0000;
const DISPLAY_ON: u8 = 0b0000_1000;
const BRIGHTNESS_MASK: u8 = 0b0000_0111;

const ADDRESS_COMMAND: u8 = 0b1100_0000;
const ADDRESS_MASK: u8 = 0b0000_1111;

/// Represents the write-only commands sent to the TM1638 as Rust enums for greater readability.
pub(crate) enum WriteCommand<'a> {
    /// Turn the display on or off and set its brightness.
    ///
    /// The pulse width steps are not linear: 1/16, 2/16, 4/16, 10/16, 11/16, 12/16, 13/16 and
    /// 14/16 for brightness 0 through 7.
    ConfigureDisplay { enabled: bool, brightness: u8 },

    /// Data command selecting register writes with the given addressing mode.  It carries no
    /// data of its own and stays in effect until the next data command.
    SetWriteMode(AddressingMode),

    /// Address command followed by the bytes to store from that address on.
    WriteData { address: u8, data: &'a [u8] },
}

impl<'a> WriteCommand<'a> {
    /// Convert this command into the command byte and the (optional) data bytes that follow it
    /// while strobe is still low.
    pub(crate) fn encode<'me>(&'me self) -> (u8, Option<&'me [u8]>)
    where
        'a: 'me,
    {
        match self {
            WriteCommand::ConfigureDisplay {
                enabled,
                brightness,
            } => {
                let on = if *enabled { DISPLAY_ON } else { 0 };
                (
                    DISPLAY_CONTROL_COMMAND | on | (brightness & BRIGHTNESS_MASK),
                    None,
                )
            }
            WriteCommand::SetWriteMode(AddressingMode::AutoIncrement) => (DATA_COMMAND, None),
            WriteCommand::SetWriteMode(AddressingMode::Fixed) => {
                (DATA_COMMAND | FIXED_ADDRESS, None)
            }
            WriteCommand::WriteData { address, data } => {
                (ADDRESS_COMMAND | (address & ADDRESS_MASK), Some(data))
            }
        }
    }
}

/// Commands that make the chip answer on DIO
pub(crate) enum ReadCommand {
    /// Clock out up to four bytes of key scanning data
    ReadKeys,
}

impl ReadCommand {
    pub(crate) fn encode(&self) -> u8 {
        match self {
            ReadCommand::ReadKeys => DATA_COMMAND | READ_KEYS,
        }
    }
}
