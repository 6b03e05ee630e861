//! FDCAN register encodings for [`Peripheral`] implementations that program
//! the message RAM and filter registers directly.
//!
//! [`Peripheral`]: crate::peripheral::Peripheral

use modular_bitfield::prelude::*;

use crate::filter::{FilterConfig, FilterType, GlobalFilter};

/// Standard message ID filter element (one word of the filter list in
/// message RAM).
#[bitfield]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdFilterElement {
    /// Second ID, mask or range end.
    pub sfid2: B11,
    #[skip]
    __: B5,
    /// First ID or range start.
    pub sfid1: B11,
    /// Filter element configuration (action).
    pub sfec: B3,
    /// Filter type.
    pub sft: B2,
}

impl StdFilterElement {
    /// `SFT` value of a disabled element.
    pub const SFT_DISABLED: u8 = 0b11;

    /// Encodes a filter slot. Returns `None` if `id1` or `id2` does not fit
    /// in 11 bits.
    pub fn from_config(filter: &FilterConfig) -> Option<Self> {
        // Standard filters have no EIDM, so the no-EIDM range is a plain range.
        // `SFT = 0b11` would disable the element.
        let sft = match filter.filter_type {
            FilterType::Range | FilterType::RangeNoEidm => 0b00,
            FilterType::Dual => 0b01,
            FilterType::Mask => 0b10,
        };
        StdFilterElement::new()
            .with_sft(sft)
            .with_sfec(filter.action as u8)
            .with_sfid1_checked(filter.id1)
            .ok()?
            .with_sfid2_checked(filter.id2)
            .ok()
    }

    /// A disabled element, used to blank unused slots.
    pub fn disabled() -> Self {
        StdFilterElement::new().with_sft(Self::SFT_DISABLED)
    }
}

/// Global filter configuration register (`RXGFC`), filter policy bits only.
#[bitfield]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rxgfc {
    /// Reject remote frames extended.
    pub rrfe: bool,
    /// Reject remote frames standard.
    pub rrfs: bool,
    /// Accept non-matching frames extended.
    pub anfe: B2,
    /// Accept non-matching frames standard.
    pub anfs: B2,
    #[skip]
    __: B26,
}

impl Rxgfc {
    /// Mask covering the policy bits, for read-modify-write of the register.
    pub const MASK: u32 = 0b11_1111;

    pub fn from_policy(policy: &GlobalFilter) -> Self {
        Rxgfc::new()
            .with_rrfe(policy.reject_remote_extended)
            .with_rrfs(policy.reject_remote_standard)
            .with_anfe(policy.non_matching_extended as u8)
            .with_anfs(policy.non_matching_standard as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterAction, NonMatchAction};

    #[test]
    fn std_filter_element_layout() {
        let filter = FilterConfig {
            index: 3,
            filter_type: FilterType::Dual,
            action: FilterAction::ToFifo1,
            id1: 0x123,
            id2: 0x456,
        };
        let word: u32 = StdFilterElement::from_config(&filter).unwrap().into();
        assert_eq!(word, (0b01 << 30) | (2 << 27) | (0x123 << 16) | 0x456);
    }

    #[test]
    fn range_no_eidm_does_not_disable() {
        let filter = FilterConfig {
            index: 0,
            filter_type: FilterType::RangeNoEidm,
            action: FilterAction::HighPriorityToFifo0,
            id1: 0x700,
            id2: 0x7FF,
        };
        let element = StdFilterElement::from_config(&filter).unwrap();
        assert_eq!(element.sft(), 0);
        assert_eq!(element.sfec(), 5);
        assert_eq!(element.sfid1(), 0x700);
        assert_eq!(element.sfid2(), 0x7FF);
        assert_eq!(StdFilterElement::disabled().sft(), StdFilterElement::SFT_DISABLED);
    }

    #[test]
    fn wide_ids_are_not_encoded() {
        let mut filter = FilterConfig {
            index: 0,
            filter_type: FilterType::Dual,
            action: FilterAction::ToFifo0,
            id1: 0x923,
            id2: 0x123,
        };
        assert_eq!(StdFilterElement::from_config(&filter), None);
        filter.id1 = 0x123;
        filter.id2 = 0x800;
        assert_eq!(StdFilterElement::from_config(&filter), None);
    }

    #[test]
    fn rxgfc_policy_bits() {
        let policy = GlobalFilter::standard_only(NonMatchAction::ToFifo1, true);
        let word: u32 = Rxgfc::from_policy(&policy).into();
        // ANFS = 1, ANFE = reject (2), RRFS = 1, RRFE = 1
        assert_eq!(word, (1 << 4) | (2 << 2) | 0b11);
        assert_eq!(word & !Rxgfc::MASK, 0);
    }
}
