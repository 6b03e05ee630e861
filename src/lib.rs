//! A small wrapper over FDCAN-class CAN peripherals.
//!
//! Only classic data frames with standard (11-bit) identifiers are handled.
//! FD frames, extended identifiers and remote-frame transmission are left to
//! the underlying driver.
//!
//! Typical use:
//!
//! 1. [`Bus::init`] around a [`Peripheral`] and a [`TxHeader`] template.
//! 2. [`Bus::add_filter`] up to the peripheral's filter capacity.
//! 3. [`Bus::set_filter_mode`] for frames no filter matches.
//! 4. [`Dispatcher::set_receive_callback`] if frames are received by interrupt.
//! 5. [`Bus::start`], then [`Bus::send_msg`] and [`Bus::recv_msg`].
#![no_std]

#[macro_use]
mod macros;

pub mod buffer;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod frame;
pub mod interrupt;
pub mod peripheral;
pub mod regs;

use embedded_hal::can::{Frame, Id, StandardId};

pub use crate::{
    buffer::RxFifo,
    dispatch::{Dispatcher, RxCallback},
    error::{Error, Result},
    filter::{FilterAction, FilterConfig, FilterType, GlobalFilter, NonMatchAction},
    frame::{CanFrame, DataLength, RxHeader, TxHeader},
    interrupt::RxInterrupts,
    peripheral::Peripheral,
};

/// One CAN bus: a borrowed peripheral, the outgoing header template and the
/// filter slot allocator.
pub struct Bus<'a, P: Peripheral> {
    /// Peripheral instance. Owned by the environment, not by the bus.
    handle: &'a P,
    /// Template for outgoing frames. Only the length is changed on send.
    tx_header: TxHeader,
    /// Next free filter slot.
    next_filter: usize,
}

impl<'a, P: Peripheral> Bus<'a, P> {
    /// Creates the bus state without touching the peripheral.
    ///
    /// The header template is copied; it is expected to be complete except
    /// for the data length, which [`Bus::send_msg`] sets. Later changes go
    /// through [`Bus::tx_header_mut`].
    ///
    /// Both receive callbacks of `dispatcher` are unregistered. When several
    /// buses share one dispatcher, initialize all of them before registering
    /// callbacks.
    ///
    /// # Parameters
    ///
    /// * `handle` - Peripheral instance, configured by the HAL.
    /// * `tx_header` - Template for outgoing frames.
    /// * `dispatcher` - Receive dispatcher serving this peripheral.
    pub fn init(
        handle: &'a P,
        tx_header: &TxHeader,
        dispatcher: &Dispatcher<P>,
    ) -> Result<Self, P::Error> {
        dispatcher.reset();
        debug!("bus init, template {}", tx_header);
        Ok(Self {
            handle,
            tx_header: *tx_header,
            next_filter: 0,
        })
    }

    /// Adds a standard-ID filter in the next free slot.
    ///
    /// Slots are handed out in call order and never reused; the first
    /// matching slot wins in hardware.
    ///
    /// # Parameters
    ///
    /// * `filter_type` - How `id1` and `id2` are matched.
    /// * `action` - Where matching frames go.
    /// * `id1`, `id2` - Filter IDs, see [`FilterType`]. Both must fit in 11
    ///   bits.
    ///
    /// # Returns
    ///
    /// [`Error::InvalidId`] if `id1` or `id2` is above `0x7FF` and
    /// [`Error::FilterFull`] if every slot is taken; the peripheral is not
    /// touched in either case. [`Error::HardwareConfig`] if the peripheral
    /// rejected the filter. The slot stays free on every error.
    pub fn add_filter(
        &mut self,
        filter_type: FilterType,
        action: FilterAction,
        id1: u16,
        id2: u16,
    ) -> Result<(), P::Error> {
        if let Some(&id) = [id1, id2].iter().find(|&&id| id > StandardId::MAX.as_raw()) {
            warn!("filter id {=u16:#X} out of range", id);
            return Err(Error::InvalidId(id));
        }
        if self.next_filter >= self.handle.filter_capacity() {
            warn!("filter table full ({} slots)", self.next_filter);
            return Err(Error::FilterFull);
        }

        let filter = FilterConfig {
            index: self.next_filter,
            filter_type,
            action,
            id1,
            id2,
        };
        self.handle
            .configure_filter(&filter)
            .map_err(Error::HardwareConfig)?;

        self.next_filter += 1;
        debug!("filter added: {}", filter);
        Ok(())
    }

    /// Sets what happens to frames matching no filter, and to remote frames.
    ///
    /// Extended-ID frames are always rejected. May be called again to change
    /// the policy; the last call wins.
    ///
    /// # Parameters
    ///
    /// * `non_match` - Destination of standard frames matching no filter.
    /// * `reject_remote` - Reject all remote frames. When `false`, standard
    ///   remote frames go through the filters like data frames.
    pub fn set_filter_mode(
        &mut self,
        non_match: NonMatchAction,
        reject_remote: bool,
    ) -> Result<(), P::Error> {
        let policy = GlobalFilter::standard_only(non_match, reject_remote);
        self.handle
            .configure_global_filter(&policy)
            .map_err(Error::HardwareConfig)?;
        debug!("global filter set: {}", policy);
        Ok(())
    }

    /// Starts the peripheral, enabling transmission and reception.
    pub fn start(&mut self) -> Result<(), P::Error> {
        self.handle.start().map_err(Error::Hardware)?;
        debug!("bus started");
        Ok(())
    }

    /// Queues a frame built from the header template.
    ///
    /// # Parameters
    ///
    /// * `length` - Data length code, stored into the template.
    /// * `data` - Payload. Must hold at least `length.len()` bytes; any bytes
    ///   past that are ignored.
    ///
    /// # Returns
    ///
    /// [`Error::InvalidLength`] if `data` is too short (nothing is sent),
    /// [`Error::TxBusy`] if the transmit queue is full.
    pub fn send_msg(&mut self, length: DataLength, data: &[u8]) -> Result<(), P::Error> {
        let payload = data.get(..length.len()).ok_or(Error::InvalidLength)?;
        self.tx_header.dlc = length;
        self.handle
            .enqueue_transmit(&self.tx_header, payload)
            .map_err(|e| Error::from_nb(e, Error::TxBusy))?;
        trace!("tx {}", self.tx_header);
        Ok(())
    }

    /// Pops the next frame from `fifo`, for use when polling instead of
    /// relying on receive callbacks.
    ///
    /// The whole of `data` may be written, whatever the frame's length.
    ///
    /// # Returns
    ///
    /// [`Error::NoMessage`] if the FIFO is empty.
    pub fn recv_msg(
        &mut self,
        fifo: RxFifo,
        header: &mut RxHeader,
        data: &mut [u8; 8],
    ) -> Result<(), P::Error> {
        self.handle
            .dequeue_receive(fifo, header, data)
            .map_err(|e| Error::from_nb(e, Error::NoMessage))
    }

    /// Header template used for outgoing frames.
    #[inline]
    pub fn tx_header(&self) -> &TxHeader {
        &self.tx_header
    }

    /// Mutable access to the template, e.g. to change the identifier between
    /// sends. The data length is overwritten on every send.
    #[inline]
    pub fn tx_header_mut(&mut self) -> &mut TxHeader {
        &mut self.tx_header
    }

    /// Number of filter slots allocated so far.
    #[inline]
    pub fn filter_count(&self) -> usize {
        self.next_filter
    }

    /// Number of filter slots still free.
    pub fn filters_remaining(&self) -> usize {
        self.handle.filter_capacity().saturating_sub(self.next_filter)
    }

    /// The peripheral this bus drives.
    #[inline]
    pub fn handle(&self) -> &'a P {
        self.handle
    }
}

impl<'a, P: Peripheral> embedded_hal::can::nb::Can for Bus<'a, P> {
    type Frame = CanFrame;
    type Error = Error<P::Error>;

    /// Sends `frame` with the template's non-identifier fields. The template
    /// keeps the frame's identifier and length afterwards.
    ///
    /// Never replaces a pending frame, so `Ok(None)` is the only success.
    fn transmit(&mut self, frame: &Self::Frame) -> nb::Result<Option<Self::Frame>, Self::Error> {
        let id = match frame.id() {
            Id::Standard(id) if !frame.is_remote_frame() => id,
            _ => return Err(nb::Error::Other(Error::Unsupported)),
        };
        self.tx_header.id = id;
        self.tx_header.dlc = frame.dlc;
        match self.handle.enqueue_transmit(&self.tx_header, frame.data()) {
            Ok(()) => Ok(None),
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(e)) => Err(nb::Error::Other(Error::Hardware(e))),
        }
    }

    /// Returns the oldest frame of FIFO 0, or of FIFO 1 if FIFO 0 is empty.
    fn receive(&mut self) -> nb::Result<Self::Frame, Self::Error> {
        let mut header = RxHeader::default();
        let mut data = [0u8; 8];
        for fifo in RxFifo::ALL {
            match self.handle.dequeue_receive(fifo, &mut header, &mut data) {
                Ok(()) => return Ok(CanFrame::from_rx(&header, &data)),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(e)) => return Err(nb::Error::Other(Error::Hardware(e))),
            }
        }
        Err(nb::Error::WouldBlock)
    }
}
