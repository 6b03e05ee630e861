//! Receive interrupt flags.

bitflags::bitflags! {
    /// Receive FIFO interrupt flags, as reported to the interrupt entry
    /// points. Bit positions follow the FDCAN `IR`/`IE` registers.
    #[derive(Default)]
    pub struct RxInterrupts: u32 {
        /// A new frame was written to RX FIFO 0.
        const FIFO0_NEW_MESSAGE = 1 << 0;
        /// RX FIFO 0 is full.
        const FIFO0_FULL = 1 << 1;
        /// A frame was dropped because RX FIFO 0 was full.
        const FIFO0_MESSAGE_LOST = 1 << 2;
        /// A new frame was written to RX FIFO 1.
        const FIFO1_NEW_MESSAGE = 1 << 3;
        /// RX FIFO 1 is full.
        const FIFO1_FULL = 1 << 4;
        /// A frame was dropped because RX FIFO 1 was full.
        const FIFO1_MESSAGE_LOST = 1 << 5;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RxInterrupts {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "RxInterrupts({=u32:#b})", self.bits());
    }
}
