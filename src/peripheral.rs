use core::fmt::Debug;

use crate::{
    buffer::RxFifo,
    filter::{FilterConfig, GlobalFilter},
    frame::{RxHeader, TxHeader},
};

/// A CAN peripheral instance, as provided by the downstream HAL.
///
/// Methods take `&self`: the same handle is used by the foreground through
/// [`Bus`] and by the interrupt path through [`Dispatcher`], so
/// implementations do their own register access (volatile writes through a
/// register block, or a call into a vendor driver).
///
/// [`Bus`]: crate::Bus
/// [`Dispatcher`]: crate::dispatch::Dispatcher
pub trait Peripheral {
    type Error: Debug;

    /// Number of standard filter slots configured on this instance.
    fn filter_capacity(&self) -> usize;

    /// Programs one standard filter slot (`filter.index`).
    fn configure_filter(&self, filter: &FilterConfig) -> Result<(), Self::Error>;

    /// Programs the policy for non-matching and remote frames.
    fn configure_global_filter(&self, policy: &GlobalFilter) -> Result<(), Self::Error>;

    /// Leaves initialization mode and joins the bus.
    fn start(&self) -> Result<(), Self::Error>;

    /// Queues a frame for transmission. `data` holds exactly
    /// `header.dlc.len()` bytes.
    ///
    /// Returns `WouldBlock` if the transmit queue is full.
    fn enqueue_transmit(&self, header: &TxHeader, data: &[u8]) -> nb::Result<(), Self::Error>;

    /// Pops the oldest frame from `fifo`. The whole 8 byte buffer may be
    /// written regardless of the frame length.
    ///
    /// Returns `WouldBlock` if the FIFO is empty.
    fn dequeue_receive(
        &self,
        fifo: RxFifo,
        header: &mut RxHeader,
        data: &mut [u8; 8],
    ) -> nb::Result<(), Self::Error>;
}
