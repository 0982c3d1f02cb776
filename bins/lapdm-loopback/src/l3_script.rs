use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gsm_core::gsm_entities::GsmEntity;
use gsm_core::{ChanNr, GsmTime, LinkId, Sap, Sapi};
use gsm_entities::{GsmEntityTrait, MessageQueue};
use gsm_saps::control::LinkStatusInd;
use gsm_saps::rll::*;
use gsm_saps::{SapMsg, SapMsgInner};

/// Contention resolution information sent with the SABM, a paging response stand-in
const ESTABLISH_INFO: [u8; 4] = [0x06, 0x27, 0x07, 0x03];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MsPhase {
    Idle,
    Establishing,
    Sending,
    Releasing,
    Done,
}

/// Layer 3 user on the MS side. Establishes SAPI 0 on one SDCCH, sends a few
/// messages one at a time, waits for their acknowledgement and the BS echo,
/// then releases.
pub struct MsScript {
    chan_nr: ChanNr,
    link_id: LinkId,
    phase: MsPhase,

    num_messages: usize,
    confirmed: usize,
    echoed: usize,
    /// The next unconfirmed message goes out at the start of the next frame
    send_next: bool,

    done: Arc<AtomicBool>,
}

impl MsScript {
    pub fn new(chan_nr: ChanNr, num_messages: usize, done: Arc<AtomicBool>) -> Self {
        Self {
            chan_nr,
            link_id: LinkId::new(Sapi::Normal, false),
            phase: MsPhase::Idle,
            num_messages,
            confirmed: 0,
            echoed: 0,
            send_next: false,
            done,
        }
    }

    fn rll_req(&self, ts: GsmTime, msg: SapMsgInner) -> SapMsg {
        SapMsg::new(Sap::RllSap, GsmEntity::Rr, GsmEntity::Lapdm, ts, msg)
    }

    fn send_message(&mut self, queue: &mut MessageQueue, ts: GsmTime) {
        // Arbitrary DTAP-like payload, index in the last octet
        let l3_info = vec![0x05, 0x08, 0x70, self.confirmed as u8];
        queue.push_back(self.rll_req(ts, SapMsgInner::RllDataReq(RllDataReq {
            chan_nr: self.chan_nr,
            link_id: self.link_id,
            l3_info,
        })));
    }

    fn maybe_release(&mut self, queue: &mut MessageQueue, ts: GsmTime) {
        if self.phase != MsPhase::Sending || self.confirmed < self.num_messages || self.echoed < self.num_messages {
            return;
        }
        tracing::info!(ts=%ts, "all {} messages confirmed and echoed, releasing", self.num_messages);
        queue.push_back(self.rll_req(ts, SapMsgInner::RllReleaseReq(RllReleaseReq {
            chan_nr: self.chan_nr,
            link_id: self.link_id,
            mode: ReleaseMode::Normal,
        })));
        self.phase = MsPhase::Releasing;
    }

    fn finish(&mut self) {
        self.phase = MsPhase::Done;
        self.done.store(true, Ordering::SeqCst);
    }
}

impl GsmEntityTrait for MsScript {
    fn entity(&self) -> GsmEntity {
        GsmEntity::Rr
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        let ts = message.time;
        match message.msg {
            SapMsgInner::RllEstablishConf(_) => match self.phase {
                MsPhase::Establishing => {
                    tracing::info!(ts=%ts, "MS: link established");
                    self.phase = MsPhase::Sending;
                    self.send_next = self.num_messages > 0;
                }
                MsPhase::Sending => {
                    // The peer reset the link, an unacknowledged message is gone
                    tracing::info!(ts=%ts, "MS: link re-established by peer");
                    self.send_next = self.confirmed < self.num_messages;
                }
                _ => {}
            },
            SapMsgInner::RllEstablishInd(ind) => {
                tracing::info!(ts=%ts, "MS: link established by peer, info {:02x?}", ind.l3_info);
            }
            SapMsgInner::RllDataConf(_) => {
                self.confirmed += 1;
                tracing::debug!(ts=%ts, "MS: {}/{} messages confirmed", self.confirmed, self.num_messages);
                self.send_next = self.confirmed < self.num_messages;
                self.maybe_release(queue, ts);
            }
            SapMsgInner::RllDataInd(ind) => {
                self.echoed += 1;
                tracing::info!(ts=%ts, "MS: echo {:02x?}", ind.l3_info);
                self.maybe_release(queue, ts);
            }
            SapMsgInner::RllReleaseConf(_) => {
                tracing::info!(ts=%ts, "MS: link released");
                self.finish();
            }
            SapMsgInner::RllReleaseInd(ind) => {
                tracing::warn!(ts=%ts, "MS: link lost: {:?}", ind.cause);
                self.finish();
            }
            SapMsgInner::RllErrorInd(ind) => {
                tracing::warn!(ts=%ts, "MS: error indication: {}", ind.cause);
            }
            SapMsgInner::LinkStatusInd(ind) => log_link_status("MS", ts, &ind),
            other => {
                tracing::debug!(ts=%ts, "MS: ignoring {}", other);
            }
        }
    }

    fn tick_start(&mut self, queue: &mut MessageQueue, ts: GsmTime) {
        if self.phase == MsPhase::Sending && self.send_next {
            self.send_next = false;
            self.send_message(queue, ts);
        }
        if self.phase != MsPhase::Idle {
            return;
        }
        tracing::info!(ts=%ts, "MS: requesting establishment on {} {}", self.chan_nr, self.link_id);
        queue.push_back(self.rll_req(ts, SapMsgInner::RllEstablishReq(RllEstablishReq {
            chan_nr: self.chan_nr,
            link_id: self.link_id,
            l3_info: Some(ESTABLISH_INFO.to_vec()),
        })));
        self.phase = MsPhase::Establishing;
    }
}

/// Layer 3 user on the BS side. Echoes every received message back to the MS.
#[derive(Default)]
pub struct BsScript {
    received: usize,
}

impl BsScript {
    pub fn new() -> Self {
        Self { received: 0 }
    }
}

impl GsmEntityTrait for BsScript {
    fn entity(&self) -> GsmEntity {
        GsmEntity::Rr
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        let ts = message.time;
        match message.msg {
            SapMsgInner::RllEstablishInd(ind) => {
                tracing::info!(ts=%ts, "BS: establishment from MS on {} {}, info {:02x?}", ind.chan_nr, ind.link_id, ind.l3_info);
            }
            SapMsgInner::RllEstablishConf(_) => {
                tracing::info!(ts=%ts, "BS: link established");
            }
            SapMsgInner::RllDataInd(ind) => {
                self.received += 1;
                tracing::info!(ts=%ts, "BS: message {} {:02x?}, echoing", self.received, ind.l3_info);
                let req = RllDataReq {
                    chan_nr: ind.chan_nr,
                    link_id: ind.link_id,
                    l3_info: ind.l3_info,
                };
                queue.push_back(SapMsg::new(Sap::RllSap, GsmEntity::Rr, GsmEntity::Lapdm, ts, SapMsgInner::RllDataReq(req)));
            }
            SapMsgInner::RllReleaseInd(ind) => {
                tracing::info!(ts=%ts, "BS: link released by MS: {:?}", ind.cause);
            }
            SapMsgInner::RllErrorInd(ind) => {
                tracing::warn!(ts=%ts, "BS: error indication: {}", ind.cause);
            }
            SapMsgInner::LinkStatusInd(ind) => log_link_status("BS", ts, &ind),
            other => {
                tracing::debug!(ts=%ts, "BS: ignoring {}", other);
            }
        }
    }
}

fn log_link_status(side: &str, ts: GsmTime, ind: &LinkStatusInd) {
    tracing::info!(ts=%ts, "{}: {} {} now {:?}", side, ind.chan_nr, ind.link_id, ind.status);
}
