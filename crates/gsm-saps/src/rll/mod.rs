//! Radio link layer primitives between LAPDm and layer 3 (RSLms RLL messages).
//! Every primitive carries the channel number and link identifier of its datalink.

use core::fmt;

use gsm_core::{ChanNr, GsmTime, LinkId};

use crate::ph::SacchL1Header;

/// Release mode of a release request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Send DISC and wait for the peer
    Normal,
    /// Release locally without any frame exchange
    Local,
}

/// Reason attached to a release indication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCause {
    /// Peer sent DISC
    Normal,
    /// Peer answered with DM
    Rejected,
    /// Retransmissions exhausted without acknowledgement
    Timeout,
    /// UA did not echo the contention resolution information of our SABM
    ContentionResolutionFailed,
    /// Establishment request that cannot be carried out
    ProtocolError,
}

/// RLL cause values for error indications, GSM 08.58 clause 9.3.22
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RllCause {
    T200Expired = 0x01,
    ReestablishReq = 0x02,
    UnsolicitedUa = 0x03,
    UnsolicitedDm = 0x04,
    UnsolicitedDmMf = 0x05,
    UnsolicitedSupervisory = 0x06,
    SequenceError = 0x07,
    UFrameIncorrectParams = 0x08,
    SFrameIncorrectParams = 0x09,
    IFrameIncorrectMbits = 0x0a,
    IFrameIncorrectLength = 0x0b,
    FrameNotImplemented = 0x0c,
    SabmMultiFrame = 0x0d,
    SabmInfoNotAllowed = 0x0e,
}

impl RllCause {
    pub fn into_raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for RllCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RllCause::T200Expired => write!(f, "T200 expired N200+1 times"),
            RllCause::ReestablishReq => write!(f, "re-establishment request"),
            RllCause::UnsolicitedUa => write!(f, "unsolicited UA response"),
            RllCause::UnsolicitedDm => write!(f, "unsolicited DM response"),
            RllCause::UnsolicitedDmMf => write!(f, "unsolicited DM response, multiple frame"),
            RllCause::UnsolicitedSupervisory => write!(f, "unsolicited supervisory response"),
            RllCause::SequenceError => write!(f, "sequence error"),
            RllCause::UFrameIncorrectParams => write!(f, "U-frame with incorrect parameters"),
            RllCause::SFrameIncorrectParams => write!(f, "S-frame with incorrect parameters"),
            RllCause::IFrameIncorrectMbits => write!(f, "I-frame with incorrect use of M bit"),
            RllCause::IFrameIncorrectLength => write!(f, "I-frame with incorrect length"),
            RllCause::FrameNotImplemented => write!(f, "frame not implemented"),
            RllCause::SabmMultiFrame => write!(f, "SABM command, multiple frame established state"),
            RllCause::SabmInfoNotAllowed => write!(f, "SABM frame with information not allowed in this state"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RllEstablishReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    /// Contention resolution information, SAPI 0 only
    pub l3_info: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct RllEstablishConf {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
}

#[derive(Debug, Clone)]
pub struct RllEstablishInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub l3_info: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct RllReleaseReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub mode: ReleaseMode,
}

#[derive(Debug, Clone)]
pub struct RllReleaseConf {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
}

#[derive(Debug, Clone)]
pub struct RllReleaseInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub cause: ReleaseCause,
}

#[derive(Debug, Clone)]
pub struct RllDataReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub l3_info: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RllDataInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub l3_info: Vec<u8>,
}

/// An I frame sent on behalf of a data request was acknowledged by the peer
#[derive(Debug, Clone)]
pub struct RllDataConf {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
}

#[derive(Debug, Clone)]
pub struct RllUnitDataReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub l3_info: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RllUnitDataInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub l3_info: Vec<u8>,
    /// Present for blocks received on SACCH
    pub sacch_header: Option<SacchL1Header>,
}

/// The UI frame of a unit data request was handed to layer 1
#[derive(Debug, Clone)]
pub struct RllUnitDataConf {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
}

#[derive(Debug, Clone)]
pub struct RllSuspendReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
}

#[derive(Debug, Clone)]
pub struct RllSuspendConf {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
}

#[derive(Debug, Clone)]
pub struct RllResumeReq {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    /// Sent as the first I frame once the link is re-established
    pub l3_info: Vec<u8>,
}

/// MDL-ERROR-INDICATION, reported as an RLL error indication
#[derive(Debug, Clone)]
pub struct RllErrorInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub cause: RllCause,
}

/// Request reference of an access burst, 3GPP TS 44.018 clause 10.5.2.30: the RA
/// value and the frame it was sent in, as T1' (T1 mod 32), T2 and T3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRef {
    pub ra: u8,
    pub t1: u8,
    pub t2: u8,
    pub t3: u8,
}

impl RequestRef {
    pub fn new(ra: u8, time: GsmTime) -> Self {
        Self {
            ra,
            t1: (time.t1() % 32) as u8,
            t2: time.t2(),
            t3: time.t3(),
        }
    }

    pub fn to_octets(self) -> [u8; 3] {
        [
            self.ra,
            (self.t1 << 3) | (self.t3 >> 3),
            ((self.t3 & 0x07) << 5) | (self.t2 & 0x1f),
        ]
    }
}

impl fmt::Display for RequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RA 0x{:02x} T1' {} T2 {} T3 {}", self.ra, self.t1, self.t2, self.t3)
    }
}

/// Asks the MS layer 1 to send an access burst
#[derive(Debug, Clone)]
pub struct RllRachReq {
    pub ra: u8,
    pub offset: u16,
    pub combined_ccch: bool,
    /// Access delay to compensate, sent as a negative timing advance
    pub access_delay: u8,
    pub ms_power: u8,
}

/// Access burst received on the BS side
#[derive(Debug, Clone)]
pub struct RllChanRqd {
    pub req_ref: RequestRef,
    pub access_delay: u8,
}

/// The access burst of a RACH request was sent
#[derive(Debug, Clone)]
pub struct RllChanConf {
    pub req_ref: RequestRef,
}
