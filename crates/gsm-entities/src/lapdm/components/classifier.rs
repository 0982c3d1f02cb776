use gsm_core::{ChanNr, LinkId};
use gsm_pdus::lapdm::enums::frame_format::FrameFormat;

/// Decides the frame format of a block from the channel it was carried on.
/// Formats A and Bter are never returned for received blocks
pub fn classify(chan_nr: ChanNr, link_id: LinkId) -> FrameFormat {
    if chan_nr.is_broadcast() {
        FrameFormat::Bbis
    } else if link_id.is_acch() {
        FrameFormat::B4
    } else {
        FrameFormat::B
    }
}
