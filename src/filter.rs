//! Acceptance filter descriptors and the global filter policy.

use embedded_hal::can::StandardId;

/// How `id1` and `id2` of a filter are matched against an incoming ID.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "ufmt", derive(ufmt::derive::uDebug))]
pub enum FilterType {
    /// IDs from `id1` to `id2`, both inclusive.
    Range = 0,
    /// IDs equal to either `id1` or `id2`.
    Dual = 1,
    /// IDs equal to `id1` after masking both with `id2`.
    Mask = 2,
    /// Range filter with the extended ID mask bypassed. Standard IDs are
    /// never masked, so on a standard filter this behaves like [`Range`].
    ///
    /// [`Range`]: FilterType::Range
    RangeNoEidm = 3,
}

/// What happens to a frame that matches a filter.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "ufmt", derive(ufmt::derive::uDebug))]
pub enum FilterAction {
    /// Store in RX FIFO 0.
    ToFifo0 = 1,
    /// Store in RX FIFO 1.
    ToFifo1 = 2,
    /// Reject.
    Reject = 3,
    /// Store in RX FIFO 0 and flag as high priority.
    HighPriorityToFifo0 = 5,
    /// Store in RX FIFO 1 and flag as high priority.
    HighPriorityToFifo1 = 6,
}

impl FilterAction {
    /// The FIFO a matching frame lands in, if it is not rejected.
    pub const fn fifo(self) -> Option<crate::RxFifo> {
        match self {
            Self::ToFifo0 | Self::HighPriorityToFifo0 => Some(crate::RxFifo::Fifo0),
            Self::ToFifo1 | Self::HighPriorityToFifo1 => Some(crate::RxFifo::Fifo1),
            Self::Reject => None,
        }
    }
}

/// One standard-ID filter slot, as handed to [`Peripheral::configure_filter`].
///
/// The identifier width is always standard (11 bit). [`Bus::add_filter`]
/// only builds descriptors whose `id1` and `id2` fit in 11 bits.
///
/// [`Bus::add_filter`]: crate::Bus::add_filter
///
/// [`Peripheral::configure_filter`]: crate::peripheral::Peripheral::configure_filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "ufmt", derive(ufmt::derive::uDebug))]
pub struct FilterConfig {
    /// Slot index in the standard filter table.
    pub index: usize,
    pub filter_type: FilterType,
    pub action: FilterAction,
    pub id1: u16,
    pub id2: u16,
}

impl FilterConfig {
    /// Returns whether `id` is accepted by this filter's match rule. The
    /// action is not considered, so a rejecting filter still "matches".
    pub fn matches(&self, id: StandardId) -> bool {
        let id = id.as_raw();
        let (id1, id2) = (self.id1, self.id2);
        match self.filter_type {
            FilterType::Range | FilterType::RangeNoEidm => (id1..=id2).contains(&id),
            FilterType::Dual => id == id1 || id == id2,
            FilterType::Mask => id & id2 == id1 & id2,
        }
    }
}

/// What happens to a frame that matches no filter.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "ufmt", derive(ufmt::derive::uDebug))]
pub enum NonMatchAction {
    /// Accept into RX FIFO 0.
    ToFifo0 = 0,
    /// Accept into RX FIFO 1.
    ToFifo1 = 1,
    /// Reject.
    Reject = 2,
}

impl NonMatchAction {
    pub const fn fifo(self) -> Option<crate::RxFifo> {
        match self {
            Self::ToFifo0 => Some(crate::RxFifo::Fifo0),
            Self::ToFifo1 => Some(crate::RxFifo::Fifo1),
            Self::Reject => None,
        }
    }
}

/// Global filter policy, as handed to
/// [`Peripheral::configure_global_filter`].
///
/// [`Peripheral::configure_global_filter`]: crate::peripheral::Peripheral::configure_global_filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "ufmt", derive(ufmt::derive::uDebug))]
pub struct GlobalFilter {
    /// Standard-ID frames that match no filter.
    pub non_matching_standard: NonMatchAction,
    /// Extended-ID frames that match no filter.
    pub non_matching_extended: NonMatchAction,
    /// Reject every standard-ID remote frame. When `false` they go through
    /// the filters like data frames.
    pub reject_remote_standard: bool,
    /// Reject every extended-ID remote frame.
    pub reject_remote_extended: bool,
}

impl GlobalFilter {
    /// The only shape of policy the bus applies: extended frames, data or
    /// remote, are always rejected.
    pub const fn standard_only(non_match: NonMatchAction, reject_remote: bool) -> Self {
        Self {
            non_matching_standard: non_match,
            non_matching_extended: NonMatchAction::Reject,
            reject_remote_standard: reject_remote,
            reject_remote_extended: true,
        }
    }
}

impl Default for GlobalFilter {
    fn default() -> Self {
        Self::standard_only(NonMatchAction::ToFifo0, false)
    }
}
