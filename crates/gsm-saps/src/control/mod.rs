use gsm_core::{ChanNr, LinkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Established,
    Released,
}

/// Sent to the procedure owning a dedicated channel whenever one of its
/// datalinks completes establishment or is released
#[derive(Debug, Clone)]
pub struct LinkStatusInd {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    pub status: LinkStatus,
}
