use gsm_core::{ChanKind, ChanNr};

/// N200 on SACCH, clause 5.8.2.1
pub const N200_SACCH: u8 = 5;
pub const N200_SDCCH: u8 = 23;
pub const N200_FACCH_FR: u8 = 34;
pub const N200_FACCH_EFR: u8 = 48;
pub const N200_FACCH_HR: u8 = 29;

/// Maximum number of retransmissions in timer recovery for a channel
pub fn n200_for(chan_nr: ChanNr, acch: bool, efr_facch: bool) -> u8 {
    if acch {
        return N200_SACCH;
    }
    match chan_nr.kind() {
        ChanKind::TchF if efr_facch => N200_FACCH_EFR,
        ChanKind::TchF => N200_FACCH_FR,
        ChanKind::TchH { .. } => N200_FACCH_HR,
        _ => N200_SDCCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n200_per_channel() {
        let sdcch = ChanNr::new(ChanKind::Sdcch8 { subslot: 2 }, 0);
        let tchf = ChanNr::new(ChanKind::TchF, 3);
        let tchh = ChanNr::new(ChanKind::TchH { subslot: 0 }, 3);
        assert_eq!(n200_for(sdcch, false, false), 23);
        assert_eq!(n200_for(sdcch, true, false), 5);
        assert_eq!(n200_for(tchf, false, false), 34);
        assert_eq!(n200_for(tchf, false, true), 48);
        assert_eq!(n200_for(tchh, false, false), 29);
        assert_eq!(n200_for(tchh, true, false), 5);
    }
}
