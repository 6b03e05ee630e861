//! Receive callback registration and interrupt dispatch.
//!
//! A [`Dispatcher`] holds at most one callback per receive FIFO. The HAL's
//! FIFO interrupt handlers forward to [`Dispatcher::on_fifo0_interrupt`] and
//! [`Dispatcher::on_fifo1_interrupt`], which pop the new frame and hand it to
//! the callback together with the peripheral it came from.
//!
//! A dispatcher is usually a `static` shared by every bus, in which case the
//! callbacks receive frames from all of them and must tell them apart by the
//! handle. [`Bus::init`] clears the dispatcher it is given, so with a shared
//! dispatcher every bus must be initialized *before* any callback is
//! registered. Giving each bus its own dispatcher avoids that ordering
//! constraint.
//!
//! ```ignore
//! static DISPATCHER: Dispatcher<Fdcan1> = Dispatcher::new();
//!
//! fn on_frame(can: &Fdcan1, header: &RxHeader, data: &[u8; 8]) { /* ... */ }
//!
//! let mut bus = Bus::init(&fdcan1, &TxHeader::new(id), &DISPATCHER)?;
//! DISPATCHER.set_receive_callback(0, on_frame)?;
//!
//! #[interrupt]
//! fn FDCAN1_IT0() {
//!     let _ = DISPATCHER.on_fifo0_interrupt(&fdcan1, fdcan1.rx_interrupts());
//! }
//! ```
//!
//! [`Bus::init`]: crate::Bus::init

use core::{cell::Cell, convert::TryFrom};

use critical_section::Mutex;

use crate::{
    buffer::RxFifo,
    error::{Error, Result},
    frame::RxHeader,
    interrupt::RxInterrupts,
    peripheral::Peripheral,
};

/// Receive callback. Gets the originating peripheral, the frame header and
/// the full 8 byte payload buffer (only `header.dlc.len()` bytes are valid).
pub type RxCallback<P> = fn(&P, &RxHeader, &[u8; 8]);

/// Per-FIFO receive callback table.
pub struct Dispatcher<P> {
    callbacks: [Mutex<Cell<Option<RxCallback<P>>>>; 2],
}

impl<P> Dispatcher<P> {
    /// Creates a dispatcher with no callbacks registered.
    pub const fn new() -> Self {
        Self {
            callbacks: [Mutex::new(Cell::new(None)), Mutex::new(Cell::new(None))],
        }
    }

    /// Unregisters the callbacks of both FIFOs.
    pub fn reset(&self) {
        critical_section::with(|cs| {
            for slot in &self.callbacks {
                slot.borrow(cs).set(None);
            }
        });
    }

    /// Returns whether a callback is registered for `fifo`.
    pub fn is_registered(&self, fifo: RxFifo) -> bool {
        self.callback(fifo).is_some()
    }

    fn callback(&self, fifo: RxFifo) -> Option<RxCallback<P>> {
        critical_section::with(|cs| self.callbacks[fifo.index()].borrow(cs).get())
    }
}

impl<P: Peripheral> Dispatcher<P> {
    /// Registers `callback` for receive FIFO `fifo` (0 or 1), replacing any
    /// callback registered before.
    ///
    /// # Returns
    ///
    /// [`Error::InvalidFifo`] if `fifo` is neither 0 nor 1, in which case no
    /// registration changes.
    pub fn set_receive_callback(
        &self,
        fifo: u32,
        callback: RxCallback<P>,
    ) -> Result<(), P::Error> {
        let fifo = RxFifo::try_from(fifo).map_err(Error::InvalidFifo)?;
        critical_section::with(|cs| self.callbacks[fifo.index()].borrow(cs).set(Some(callback)));
        debug!("rx callback registered for {}", fifo);
        Ok(())
    }

    /// Handles a receive interrupt for `fifo`.
    ///
    /// If `flags` has the new-message flag of `fifo` set and a callback is
    /// registered for it, one frame is popped from `fifo` and passed to the
    /// callback. Otherwise nothing is read and `Ok` is returned.
    ///
    /// # Returns
    ///
    /// The dequeue error if popping the frame failed; the callback is not
    /// called in that case.
    pub fn dispatch(&self, handle: &P, fifo: RxFifo, flags: RxInterrupts) -> Result<(), P::Error> {
        if !flags.contains(fifo.new_message_flag()) {
            return Ok(());
        }
        let callback = match self.callback(fifo) {
            Some(callback) => callback,
            None => return Ok(()),
        };

        let mut header = RxHeader::default();
        let mut data = [0u8; 8];
        handle
            .dequeue_receive(fifo, &mut header, &mut data)
            .map_err(|e| {
                let e = Error::from_nb(e, Error::NoMessage);
                warn!("rx dispatch on {} failed: {}", fifo, e);
                e
            })?;

        trace!("rx dispatch on {}: {}", fifo, header);
        callback(handle, &header, &data);
        Ok(())
    }

    /// Entry point for the RX FIFO 0 interrupt.
    #[inline]
    pub fn on_fifo0_interrupt(&self, handle: &P, flags: RxInterrupts) -> Result<(), P::Error> {
        self.dispatch(handle, RxFifo::Fifo0, flags)
    }

    /// Entry point for the RX FIFO 1 interrupt.
    #[inline]
    pub fn on_fifo1_interrupt(&self, handle: &P, flags: RxInterrupts) -> Result<(), P::Error> {
        self.dispatch(handle, RxFifo::Fifo1, flags)
    }
}

impl<P> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}
