use gsm_core::{ChanNr, GsmTime, LinkId};

/// PH-DATA-IND: one block received by layer 1
#[derive(Debug, Clone)]
pub struct PhDataInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    /// Frame number at which the block was received
    pub fn_rx: GsmTime,
    /// 23 octets. On SACCH this includes the two-octet L1 header
    pub data: Vec<u8>,
}

/// PH-DATA-REQ: one block to be transmitted by layer 1
#[derive(Debug, Clone)]
pub struct PhDataReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    /// Always padded to the full 23 octet block
    pub data: Vec<u8>,
}

/// PH-RTS-IND: layer 1 is ready to send a block on the given channel. Only
/// used when LAPDm paces its transmissions on layer 1
#[derive(Debug, Clone)]
pub struct PhRtsInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    /// Frame number the block will be sent in
    pub fn_tx: GsmTime,
}

/// PH-EMPTY-FRAME-REQ: nothing to send in answer to a PH-RTS-IND
#[derive(Debug, Clone)]
pub struct PhEmptyFrameReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
}

/// PH-RACH-REQ: send an access burst
#[derive(Debug, Clone)]
pub struct PhRachReq {
    /// Random access reference
    pub ra: u8,
    /// Frame offset for the burst, 15 bits
    pub offset: u16,
    pub combined_ccch: bool,
    /// Timing advance applied to the burst
    pub ta: i8,
    pub tx_power: u8,
}

/// PH-RACH-IND: access burst received by the BS
#[derive(Debug, Clone)]
pub struct PhRachInd {
    pub ra: u8,
    pub fn_rx: GsmTime,
    /// Access delay in bit periods
    pub acc_delay: u8,
}

/// PH-RACH-CONF: the requested access burst was sent
#[derive(Debug, Clone)]
pub struct PhRachConf {
    pub fn_tx: GsmTime,
}

/// Two-octet L1 header preceding LAPDm on SACCH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SacchL1Header {
    /// MS power level, 5 bits
    pub ms_power: u8,
    /// Timing advance, in bit periods
    pub timing_advance: u8,
}

impl SacchL1Header {
    pub fn from_octets(octets: [u8; 2]) -> Self {
        Self {
            ms_power: octets[0] & 0x1f,
            timing_advance: octets[1],
        }
    }

    pub fn to_octets(self) -> [u8; 2] {
        [self.ms_power & 0x1f, self.timing_advance]
    }
}

/// Sets the L1 header to prefix onto outgoing SACCH blocks of a channel
#[derive(Debug, Clone)]
pub struct PhSacchHeaderReq {
    pub chan_nr: ChanNr,
    pub header: SacchL1Header,
}
