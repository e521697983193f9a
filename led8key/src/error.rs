use core::fmt;

/// The argument that failed validation in an [`Error::InvalidArgument`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Argument {
    /// Display memory address, must be 0 to 15
    Address,
    /// Number of bytes in a single write, must be 1 to 16
    DataLength,
    /// Display brightness, must be 0 to 7
    Brightness,
    /// Number of key scan bytes to read, must be 1 to 4
    ReadCount,
    /// First digit written, plus the digit count, must stay on the display
    DigitRange,
    /// Digit buffer shorter than the requested number of digits
    MaxDigits,
    /// LED index, must be 0 to 7
    LedIndex,
}

impl Argument {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "address must be 0 to 15",
            Self::DataLength => "data must be 1 to 16 bytes",
            Self::Brightness => "brightness must be 0 to 7",
            Self::ReadCount => "can only read 1 to 4 scan bytes",
            Self::DigitRange => "digits do not fit on the display",
            Self::MaxDigits => "digit buffer is smaller than the digit count",
            Self::LedIndex => "LED index must be 0 to 7",
        }
    }
}

/// Errors returned by the driver.
///
/// All of them are detected before anything is sent to the chip, so a call that fails has not
/// changed the state of the display.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    InvalidArgument(Argument),
    /// The font has no segment pattern for this character
    UnknownCharacter(char),
    /// The text needs more digits than the display has
    TooManyDigits { max: usize },
    /// No room left in the font for another character
    FontFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(arg) => write!(f, "invalid argument: {}", arg.as_str()),
            Self::UnknownCharacter(c) => write!(f, "no font mapping for {c:?}"),
            Self::TooManyDigits { max } => write!(f, "exceeded number of {max} digits"),
            Self::FontFull => f.write_str("font table is full"),
        }
    }
}

impl From<Argument> for Error {
    fn from(arg: Argument) -> Self {
        Self::InvalidArgument(arg)
    }
}
