use embedded_hal::can::{Frame, Id, StandardId};

/// Data length code of a classic CAN frame, 0 to 8 bytes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "ufmt", derive(ufmt::derive::uDebug))]
pub enum DataLength {
    Bytes0 = 0,
    Bytes1 = 1,
    Bytes2 = 2,
    Bytes3 = 3,
    Bytes4 = 4,
    Bytes5 = 5,
    Bytes6 = 6,
    Bytes7 = 7,
    Bytes8 = 8,
}

impl DataLength {
    /// All data length codes, indexed by their byte count.
    pub const ALL: [Self; 9] = [
        Self::Bytes0,
        Self::Bytes1,
        Self::Bytes2,
        Self::Bytes3,
        Self::Bytes4,
        Self::Bytes5,
        Self::Bytes6,
        Self::Bytes7,
        Self::Bytes8,
    ];

    /// Returns the code for `len` bytes, or `None` if `len > 8`.
    pub const fn from_len(len: usize) -> Option<Self> {
        if len < Self::ALL.len() {
            Some(Self::ALL[len])
        } else {
            None
        }
    }

    /// Number of payload bytes.
    #[inline]
    pub const fn len(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Bytes0)
    }
}

impl Default for DataLength {
    fn default() -> Self {
        Self::Bytes0
    }
}

/// Header template for outgoing frames.
///
/// Only classic data frames with standard identifiers are sent, so the
/// frame format, identifier width and bit rate switch are not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHeader {
    /// Standard 11-bit identifier.
    pub id: StandardId,
    /// Data length code. Overwritten by [`Bus::send_msg`] on every send.
    ///
    /// [`Bus::send_msg`]: crate::Bus::send_msg
    pub dlc: DataLength,
    /// Transmit with the error state indicator set (error passive).
    pub error_passive: bool,
    /// Store a transmit event for this frame in the TX event FIFO.
    pub store_tx_event: bool,
    /// Marker copied into the TX event, if one is stored.
    pub message_marker: u8,
}

impl TxHeader {
    /// Creates a header for `id` with everything else zeroed.
    pub const fn new(id: StandardId) -> Self {
        Self {
            id,
            dlc: DataLength::Bytes0,
            error_passive: false,
            store_tx_event: false,
            message_marker: 0,
        }
    }

    pub const fn with_dlc(mut self, dlc: DataLength) -> Self {
        self.dlc = dlc;
        self
    }

    pub const fn with_tx_event(mut self, marker: u8) -> Self {
        self.store_tx_event = true;
        self.message_marker = marker;
        self
    }
}

impl Default for TxHeader {
    fn default() -> Self {
        Self::new(StandardId::ZERO)
    }
}

/// Header of a received frame, filled in by the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxHeader {
    /// Standard 11-bit identifier.
    pub id: StandardId,
    /// Whether the frame is a remote frame. Only seen when remote frames are
    /// not rejected by the global filter.
    pub remote: bool,
    /// Data length code.
    pub dlc: DataLength,
    /// The transmitter was error passive.
    pub error_passive: bool,
    /// Value of the timestamp counter at start of frame.
    pub timestamp: u16,
    /// Index of the filter that accepted the frame. `None` when the frame
    /// matched no filter and was accepted by the global filter.
    pub filter_index: Option<u8>,
}

impl RxHeader {
    /// Returns the valid part of a received payload buffer.
    #[inline]
    pub fn payload<'a>(&self, data: &'a [u8; 8]) -> &'a [u8] {
        &data[..self.dlc.len()]
    }
}

impl Default for RxHeader {
    fn default() -> Self {
        Self {
            id: StandardId::ZERO,
            remote: false,
            dlc: DataLength::Bytes0,
            error_passive: false,
            timestamp: 0,
            filter_index: None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TxHeader {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "TxHeader {{ id: {:#X}, dlc: {}, esi: {}, event: {}, marker: {} }}",
            self.id.as_raw(),
            self.dlc,
            self.error_passive,
            self.store_tx_event,
            self.message_marker
        );
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RxHeader {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "RxHeader {{ id: {:#X}, rtr: {}, dlc: {}, esi: {}, ts: {}, filter: {} }}",
            self.id.as_raw(),
            self.remote,
            self.dlc,
            self.error_passive,
            self.timestamp,
            self.filter_index
        );
    }
}

/// Self-contained frame for the embedded-hal `Can` interface. Received
/// frames are built by [`CanFrame::from_rx`] and always carry a standard ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    /// Identifier. Only `Id::Standard` can be transmitted.
    pub(crate) id: Id,
    /// Remote frame; received only when remote frames are not rejected.
    pub(crate) rtr: bool,
    /// Data length code, shared by data and remote frames.
    pub(crate) dlc: DataLength,
    /// Payload. Zero past `dlc`, and all zero for remote frames.
    pub(crate) data: [u8; 8],
}

impl CanFrame {
    /// Builds a frame out of a received header and payload buffer.
    pub fn from_rx(header: &RxHeader, data: &[u8; 8]) -> Self {
        let mut frame = CanFrame {
            id: Id::Standard(header.id),
            rtr: header.remote,
            dlc: header.dlc,
            data: [0; 8],
        };
        if !header.remote {
            frame.data[..header.dlc.len()].copy_from_slice(header.payload(data));
        }
        frame
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CanFrame {
    fn format(&self, fmt: defmt::Formatter) {
        // [`Id`] does not implement `defmt::Format`
        #[derive(defmt::Format)]
        enum InnerId {
            Standard(u16),
            Extended(u32),
        }

        defmt::write!(
            fmt,
            "CanFrame {{ id: {:#X}, rtr: {}, dlc: {}, data: {:#X} }}",
            match self.id {
                Id::Standard(id) => InnerId::Standard(id.as_raw()),
                Id::Extended(id) => InnerId::Extended(id.as_raw()),
            },
            self.rtr,
            self.dlc,
            self.data
        );
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        let dlc = DataLength::from_len(data.len())?;
        let mut frame = CanFrame {
            id: id.into(),
            rtr: false,
            dlc,
            data: [0; 8],
        };
        frame.data[..data.len()].copy_from_slice(data);
        Some(frame)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        Some(CanFrame {
            id: id.into(),
            rtr: true,
            dlc: DataLength::from_len(dlc)?,
            data: [0; 8],
        })
    }

    #[inline]
    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    #[inline]
    fn is_remote_frame(&self) -> bool {
        self.rtr
    }

    #[inline]
    fn id(&self) -> Id {
        self.id
    }

    #[inline]
    fn dlc(&self) -> usize {
        self.dlc.len()
    }

    #[inline]
    fn data(&self) -> &[u8] {
        if self.rtr {
            &[]
        } else {
            &self.data[..self.dlc()]
        }
    }
}
