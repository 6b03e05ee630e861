use core::fmt::{self, Debug, Display};

use embedded_hal::can::ErrorKind;

pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Errors returned by the bus, the filter allocator and the receive
/// dispatcher. `E` is the error type of the underlying [`Peripheral`].
///
/// [`Peripheral`]: crate::peripheral::Peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Every filter slot reported by the peripheral is already allocated.
    FilterFull,
    /// The peripheral rejected a filter or global filter configuration.
    HardwareConfig(E),
    /// Filter ID or mask wider than a standard (11-bit) identifier.
    InvalidId(u16),
    /// Receive FIFO identifier other than 0 or 1.
    InvalidFifo(u32),
    /// Payload holds fewer bytes than the requested data length code.
    InvalidLength,
    /// Extended identifiers and remote frames cannot be transmitted.
    Unsupported,
    /// The transmit queue is full.
    TxBusy,
    /// The receive FIFO is empty.
    NoMessage,
    /// The peripheral failed to start, enqueue or dequeue.
    Hardware(E),
}

impl<E> Error<E> {
    pub(crate) fn from_nb(e: nb::Error<E>, would_block: Self) -> Self {
        match e {
            nb::Error::WouldBlock => would_block,
            nb::Error::Other(e) => Error::Hardware(e),
        }
    }
}

impl<E: Debug> Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FilterFull => f.write_str("filter table full"),
            Error::HardwareConfig(e) => write!(f, "peripheral rejected configuration: {:?}", e),
            Error::InvalidId(id) => write!(f, "filter id {:#X} exceeds 11 bits", id),
            Error::InvalidFifo(fifo) => write!(f, "invalid receive fifo {}", fifo),
            Error::InvalidLength => f.write_str("payload shorter than data length code"),
            Error::Unsupported => f.write_str("only standard data frames are supported"),
            Error::TxBusy => f.write_str("transmit queue full"),
            Error::NoMessage => f.write_str("receive fifo empty"),
            Error::Hardware(e) => write!(f, "peripheral error: {:?}", e),
        }
    }
}

impl<E: Debug> embedded_hal::can::Error for Error<E> {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        // `E` is not required to implement `defmt::Format`
        match self {
            Error::FilterFull => defmt::write!(fmt, "FilterFull"),
            Error::HardwareConfig(_) => defmt::write!(fmt, "HardwareConfig"),
            Error::InvalidId(id) => defmt::write!(fmt, "InvalidId({=u16:#X})", *id),
            Error::InvalidFifo(fifo) => defmt::write!(fmt, "InvalidFifo({})", fifo),
            Error::InvalidLength => defmt::write!(fmt, "InvalidLength"),
            Error::Unsupported => defmt::write!(fmt, "Unsupported"),
            Error::TxBusy => defmt::write!(fmt, "TxBusy"),
            Error::NoMessage => defmt::write!(fmt, "NoMessage"),
            Error::Hardware(_) => defmt::write!(fmt, "Hardware"),
        }
    }
}
