#![allow(dead_code)]

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;

use canlib::{
    DataLength, FilterConfig, GlobalFilter, Peripheral, RxFifo, RxHeader, TxHeader,
};
use embedded_hal::can::StandardId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Configuration call refused.
    Rejected,
    /// Receive buffer could not be read.
    Bus,
}

pub struct State {
    pub capacity: usize,
    pub capacity_reads: usize,
    /// Programmed filter slots, by index.
    pub filters: Vec<Option<FilterConfig>>,
    pub filter_writes: Vec<FilterConfig>,
    pub global: Option<GlobalFilter>,
    pub started: bool,
    pub reject_config: bool,
    pub fail_rx: bool,
    pub loopback: bool,
    /// Free transmit queue entries.
    pub tx_free: usize,
    pub sent: Vec<(TxHeader, Vec<u8>)>,
    pub fifos: [VecDeque<(RxHeader, [u8; 8])>; 2],
    pub dequeues: usize,
}

/// In-memory FDCAN stand-in. In loopback mode transmitted frames are routed
/// through the programmed filters and global policy into the RX FIFOs.
pub struct MockCan {
    pub name: &'static str,
    state: RefCell<State>,
}

impl MockCan {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            state: RefCell::new(State {
                capacity,
                capacity_reads: 0,
                filters: vec![None; capacity],
                filter_writes: Vec::new(),
                global: None,
                started: false,
                reject_config: false,
                fail_rx: false,
                loopback: false,
                tx_free: 3,
                sent: Vec::new(),
                fifos: [VecDeque::new(), VecDeque::new()],
                dequeues: 0,
            }),
        }
    }

    pub fn loopback(name: &'static str, capacity: usize) -> Self {
        let can = Self::new(name, capacity);
        can.state().loopback = true;
        can
    }

    pub fn state(&self) -> RefMut<'_, State> {
        self.state.borrow_mut()
    }

    /// Places a received data frame directly into `fifo`.
    pub fn push_rx(&self, fifo: RxFifo, id: u16, data: &[u8]) {
        let mut buf = [0u8; 8];
        buf[..data.len()].copy_from_slice(data);
        let header = RxHeader {
            id: StandardId::new(id).unwrap(),
            dlc: DataLength::from_len(data.len()).unwrap(),
            ..RxHeader::default()
        };
        self.state().fifos[fifo.index()].push_back((header, buf));
    }

    pub fn pending(&self, fifo: RxFifo) -> usize {
        self.state().fifos[fifo.index()].len()
    }
}

impl State {
    fn route(&self, id: StandardId) -> Option<(RxFifo, Option<u8>)> {
        for filter in self.filters.iter().flatten() {
            if filter.matches(id) {
                return filter.action.fifo().map(|fifo| (fifo, Some(filter.index as u8)));
            }
        }
        // RXGFC resets to zero: non-matching frames go to FIFO 0.
        let policy = self.global.unwrap_or_default();
        policy.non_matching_standard.fifo().map(|fifo| (fifo, None))
    }
}

impl Peripheral for MockCan {
    type Error = MockError;

    fn filter_capacity(&self) -> usize {
        let mut state = self.state();
        state.capacity_reads += 1;
        state.capacity
    }

    fn configure_filter(&self, filter: &FilterConfig) -> Result<(), MockError> {
        let mut state = self.state();
        if state.reject_config || filter.index >= state.capacity {
            return Err(MockError::Rejected);
        }
        state.filters[filter.index] = Some(*filter);
        state.filter_writes.push(*filter);
        Ok(())
    }

    fn configure_global_filter(&self, policy: &GlobalFilter) -> Result<(), MockError> {
        let mut state = self.state();
        if state.reject_config {
            return Err(MockError::Rejected);
        }
        state.global = Some(*policy);
        Ok(())
    }

    fn start(&self) -> Result<(), MockError> {
        let mut state = self.state();
        if state.reject_config {
            return Err(MockError::Rejected);
        }
        state.started = true;
        Ok(())
    }

    fn enqueue_transmit(&self, header: &TxHeader, data: &[u8]) -> nb::Result<(), MockError> {
        let mut state = self.state();
        if state.tx_free == 0 {
            return Err(nb::Error::WouldBlock);
        }
        assert_eq!(data.len(), header.dlc.len());
        state.tx_free -= 1;
        state.sent.push((*header, data.to_vec()));

        if state.loopback && state.started {
            // Frame leaves the queue as soon as it is looped back.
            state.tx_free += 1;
            if let Some((fifo, filter_index)) = state.route(header.id) {
                let mut buf = [0u8; 8];
                buf[..data.len()].copy_from_slice(data);
                let rx = RxHeader {
                    id: header.id,
                    dlc: header.dlc,
                    filter_index,
                    ..RxHeader::default()
                };
                state.fifos[fifo.index()].push_back((rx, buf));
            }
        }
        Ok(())
    }

    fn dequeue_receive(
        &self,
        fifo: RxFifo,
        header: &mut RxHeader,
        data: &mut [u8; 8],
    ) -> nb::Result<(), MockError> {
        let mut state = self.state();
        state.dequeues += 1;
        if state.fail_rx {
            return Err(nb::Error::Other(MockError::Bus));
        }
        let (rx, buf) = state.fifos[fifo.index()]
            .pop_front()
            .ok_or(nb::Error::WouldBlock)?;
        *header = rx;
        *data = buf;
        Ok(())
    }
}

pub fn id(raw: u16) -> StandardId {
    StandardId::new(raw).unwrap()
}
