use crossbeam_channel::{Receiver, Sender, TryRecvError};

use gsm_core::gsm_entities::GsmEntity;
use gsm_core::{ChanNr, GsmTime, LinkId, Sap, Sapi};
use gsm_entities::{GsmEntityTrait, MessageQueue};
use gsm_saps::ph::{PhDataInd, PhDataReq, PhRtsInd};
use gsm_saps::{SapMsg, SapMsgInner};

/// Stands in for layer 1 of one stack. Blocks handed down by LAPDm are put on
/// the channel towards the peer stack, blocks from the peer come up as
/// PH-DATA-IND at the start of the next frame. With RTS enabled, LAPDm is asked
/// for one main channel block every frame and one SACCH block every 104 frames.
pub struct AirLink {
    name: &'static str,
    tx: Sender<PhDataReq>,
    rx: Receiver<PhDataReq>,
    /// Channel polled with PH-RTS-IND, if any
    rts_chan: Option<ChanNr>,

    /// Drop every n-th transmitted block, if set
    drop_every: Option<usize>,
    tx_count: usize,
    dropped: usize,
}

impl AirLink {
    pub fn new(name: &'static str, tx: Sender<PhDataReq>, rx: Receiver<PhDataReq>, drop_every: Option<usize>) -> Self {
        Self {
            name,
            tx,
            rx,
            rts_chan: None,
            drop_every,
            tx_count: 0,
            dropped: 0,
        }
    }

    /// Polls LAPDm for blocks on `chan_nr` instead of taking them as they come
    pub fn with_rts(mut self, chan_nr: ChanNr) -> Self {
        self.rts_chan = Some(chan_nr);
        self
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn transmit(&mut self, req: PhDataReq) {
        self.tx_count += 1;
        if should_drop(self.tx_count, self.drop_every) {
            self.dropped += 1;
            tracing::info!("{}: dropping block {} on {} {}: {:02x?}", self.name, self.tx_count, req.chan_nr, req.link_id, &req.data[..3.min(req.data.len())]);
            return;
        }
        if let Err(e) = self.tx.send(req) {
            tracing::warn!("{}: peer gone, block lost: {}", self.name, e);
        }
    }
}

fn should_drop(count: usize, drop_every: Option<usize>) -> bool {
    match drop_every {
        Some(n) if n > 0 => count % n == 0,
        _ => false,
    }
}

impl GsmEntityTrait for AirLink {
    fn entity(&self) -> GsmEntity {
        GsmEntity::Phy
    }

    fn rx_prim(&mut self, _queue: &mut MessageQueue, message: SapMsg) {
        match message.msg {
            SapMsgInner::PhDataReq(req) => {
                tracing::debug!(ts=%message.time, "-> {} {} {:02x?}", req.chan_nr, req.link_id, req.data);
                self.transmit(req);
            }
            SapMsgInner::PhEmptyFrameReq(req) => {
                tracing::trace!(ts=%message.time, "{}: nothing to send on {} {}", self.name, req.chan_nr, req.link_id);
            }
            other => {
                tracing::warn!("{}: unexpected primitive {}", self.name, other);
            }
        }
    }

    fn tick_start(&mut self, queue: &mut MessageQueue, ts: GsmTime) {
        loop {
            match self.rx.try_recv() {
                Ok(req) => {
                    tracing::debug!(ts=%ts, "<- {} {} {:02x?}", req.chan_nr, req.link_id, req.data);
                    let ind = PhDataInd {
                        chan_nr: req.chan_nr,
                        link_id: req.link_id,
                        fn_rx: ts,
                        data: req.data,
                    };
                    queue.push_back(SapMsg::new(Sap::PhSap, GsmEntity::Phy, GsmEntity::Lapdm, ts, SapMsgInner::PhDataInd(ind)));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("{}: peer disconnected", self.name);
                    break;
                }
            }
        }

        if let Some(chan_nr) = self.rts_chan {
            for acch in [false, true] {
                if acch && ts.frame % 104 != 0 {
                    continue;
                }
                let rts = PhRtsInd { chan_nr, link_id: LinkId::new(Sapi::Normal, acch), fn_tx: ts };
                queue.push_back(SapMsg::new(Sap::PhSap, GsmEntity::Phy, GsmEntity::Lapdm, ts, SapMsgInner::PhRtsInd(rts)));
            }
        }
    }
}
