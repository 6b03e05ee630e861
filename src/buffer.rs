use core::convert::TryFrom;

use crate::interrupt::RxInterrupts;

/// Receive FIFO.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "ufmt", derive(ufmt::derive::uDebug))]
pub enum RxFifo {
    /// RX FIFO 0.
    Fifo0 = 0,
    /// RX FIFO 1.
    Fifo1 = 1,
}

impl RxFifo {
    /// All valid options for [`RxFifo`].
    pub const ALL: [Self; 2] = [Self::Fifo0, Self::Fifo1];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The interrupt flag raised when a new frame is written to this FIFO.
    pub const fn new_message_flag(self) -> RxInterrupts {
        match self {
            Self::Fifo0 => RxInterrupts::FIFO0_NEW_MESSAGE,
            Self::Fifo1 => RxInterrupts::FIFO1_NEW_MESSAGE,
        }
    }
}

impl TryFrom<u32> for RxFifo {
    type Error = u32;

    fn try_from(fifo: u32) -> Result<Self, u32> {
        match fifo {
            0 => Ok(Self::Fifo0),
            1 => Ok(Self::Fifo1),
            other => Err(other),
        }
    }
}
