use gsm_core::PduParseErr;

use super::datalink::DlState;

/// Reasons a frame or request was not applied. All of them are handled inside
/// the LAPDm entity; the caller only logs them
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LapdmError {
    #[error("unsupported framing ({field})")]
    UnsupportedFraming { field: &'static str },

    #[error("N(S) sequence error: got {ns}, expected {expected}")]
    SequenceError { ns: u8, expected: u8 },

    #[error("N(R) sequence error: got {nr}, V(A)={v_ack} V(S)={v_send}")]
    NrSequenceError { nr: u8, v_ack: u8, v_send: u8 },

    #[error("{frame} frame with incorrect parameters")]
    IncorrectFrameParameters { frame: &'static str },

    #[error("information length {len} outside 1..={n201}")]
    IncorrectLength { len: usize, n201: usize },

    #[error("unsolicited {frame} response in state {state:?}")]
    UnsolicitedResponse { frame: &'static str, state: DlState },

    #[error("no acknowledgement after {attempts} retransmissions")]
    RetransmissionExhausted { attempts: u8 },

    #[error("no datalink for SAPI {0}")]
    UnknownSapi(u8),

    #[error("{frame} frame with wrong C/R bit")]
    WrongCommandResponse { frame: &'static str },

    #[error("{op} not allowed on SAPI {sapi}")]
    SapiNotAllowed { op: &'static str, sapi: u8 },

    #[error("contention resolution failed, UA information differs from SABM")]
    ContentionResolution,

    #[error("{op} refused in state {state:?}")]
    InvalidState { op: &'static str, state: DlState },

    #[error("malformed frame: {0:?}")]
    Malformed(PduParseErr),
}

impl From<PduParseErr> for LapdmError {
    fn from(e: PduParseErr) -> Self {
        match e {
            PduParseErr::UnsupportedFraming { field } => LapdmError::UnsupportedFraming { field },
            other => LapdmError::Malformed(other),
        }
    }
}
