//! Translation between datalink actions and SAP primitives

use gsm_core::{ChanNr, LinkId, Sapi, assert_warn};
use gsm_pdus::lapdm::LapdmFrame;
use gsm_pdus::lapdm::consts::LAPDM_BLOCK_LEN;
use gsm_saps::SapMsgInner;
use gsm_saps::control::{LinkStatus, LinkStatusInd};
use gsm_saps::ph::{PhDataInd, PhDataReq, SacchL1Header};
use gsm_saps::rll::*;

use super::datalink::{DlAction, DlEvent};

/// Addressing of the primitives produced for one datalink
#[derive(Debug, Clone, Copy)]
pub struct PrimContext {
    pub chan_nr: ChanNr,
    pub link_id: LinkId,
    /// On transmit the header to prefix, on receive the header that came with the block
    pub sacch_header: Option<SacchL1Header>,
    pub fill_octet: u8,
}

/// Builds the block handed to layer 1: SACCH header if any, the frame, then
/// fill octets up to the block length
pub fn encode_block(frame: &LapdmFrame, sacch_header: Option<SacchL1Header>, fill_octet: u8) -> Vec<u8> {
    let mut block = Vec::with_capacity(LAPDM_BLOCK_LEN);
    if let Some(header) = sacch_header {
        block.extend_from_slice(&header.to_octets());
    }
    block.extend_from_slice(&frame.to_bytes());
    assert_warn!(block.len() <= LAPDM_BLOCK_LEN, "block of {} octets for {}", block.len(), frame);
    block.resize(LAPDM_BLOCK_LEN, fill_octet);
    block
}

/// Appends the primitives for one action. Establishment and release also notify
/// the owner of the channel through a link status indication
pub fn action_to_prims(action: DlAction, ctx: &PrimContext, out: &mut Vec<SapMsgInner>) {
    let chan_nr = ctx.chan_nr;
    let link_id = ctx.link_id;
    let link_status = |status| SapMsgInner::LinkStatusInd(LinkStatusInd { chan_nr, link_id, status });

    match action {
        DlAction::Transmit(frame) => {
            tracing::debug!("-> {} on {} {}", frame, chan_nr, link_id);
            let data = encode_block(&frame, ctx.sacch_header, ctx.fill_octet);
            out.push(SapMsgInner::PhDataReq(PhDataReq { chan_nr, link_id, data }));
        }
        DlAction::EstablishInd(l3_info) => {
            out.push(SapMsgInner::RllEstablishInd(RllEstablishInd { chan_nr, link_id, l3_info }));
            out.push(link_status(LinkStatus::Established));
        }
        DlAction::EstablishConf => {
            out.push(SapMsgInner::RllEstablishConf(RllEstablishConf { chan_nr, link_id }));
            out.push(link_status(LinkStatus::Established));
        }
        DlAction::ReleaseInd(cause) => {
            out.push(SapMsgInner::RllReleaseInd(RllReleaseInd { chan_nr, link_id, cause }));
            out.push(link_status(LinkStatus::Released));
        }
        DlAction::ReleaseConf => {
            out.push(SapMsgInner::RllReleaseConf(RllReleaseConf { chan_nr, link_id }));
            out.push(link_status(LinkStatus::Released));
        }
        DlAction::DataInd(l3_info) => {
            out.push(SapMsgInner::RllDataInd(RllDataInd { chan_nr, link_id, l3_info }));
        }
        DlAction::DataConf => {
            out.push(SapMsgInner::RllDataConf(RllDataConf { chan_nr, link_id }));
        }
        DlAction::UnitDataInd(l3_info) => {
            out.push(SapMsgInner::RllUnitDataInd(RllUnitDataInd {
                chan_nr,
                link_id,
                l3_info,
                sacch_header: ctx.sacch_header,
            }));
        }
        DlAction::UnitDataConf => {
            out.push(SapMsgInner::RllUnitDataConf(RllUnitDataConf { chan_nr, link_id }));
        }
        DlAction::SuspendConf => {
            out.push(SapMsgInner::RllSuspendConf(RllSuspendConf { chan_nr, link_id }));
        }
        DlAction::ErrorInd(cause) => {
            tracing::info!("error indication on {} {}: {}", chan_nr, link_id, cause);
            out.push(SapMsgInner::RllErrorInd(RllErrorInd { chan_nr, link_id, cause }));
        }
    }
}

/// Blocks of broadcast channels carry layer 3 without a LAPDm header and are
/// passed up whole
pub fn broadcast_unit_data(ind: &PhDataInd) -> SapMsgInner {
    SapMsgInner::RllUnitDataInd(RllUnitDataInd {
        chan_nr: ind.chan_nr,
        link_id: LinkId::new(Sapi::Normal, false),
        l3_info: ind.data.clone(),
        sacch_header: None,
    })
}

/// Splits a layer 3 request into its addressing and datalink event. Anything
/// that is not a request is handed back
pub fn rll_to_event(msg: SapMsgInner) -> Result<(ChanNr, LinkId, DlEvent), SapMsgInner> {
    match msg {
        SapMsgInner::RllEstablishReq(prim) => {
            Ok((prim.chan_nr, prim.link_id, DlEvent::EstablishReq { l3_info: prim.l3_info }))
        }
        SapMsgInner::RllReleaseReq(prim) => Ok((prim.chan_nr, prim.link_id, DlEvent::ReleaseReq(prim.mode))),
        SapMsgInner::RllDataReq(prim) => Ok((prim.chan_nr, prim.link_id, DlEvent::DataReq { l3_info: prim.l3_info })),
        SapMsgInner::RllUnitDataReq(prim) => {
            Ok((prim.chan_nr, prim.link_id, DlEvent::UnitDataReq { l3_info: prim.l3_info }))
        }
        SapMsgInner::RllSuspendReq(prim) => Ok((prim.chan_nr, prim.link_id, DlEvent::SuspendReq)),
        SapMsgInner::RllResumeReq(prim) => Ok((prim.chan_nr, prim.link_id, DlEvent::ResumeReq { l3_info: prim.l3_info })),
        other => Err(other),
    }
}
