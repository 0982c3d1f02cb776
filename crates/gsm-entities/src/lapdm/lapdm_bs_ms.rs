use std::collections::HashMap;

use gsm_config::SharedConfig;
use gsm_core::gsm_entities::GsmEntity;
use gsm_core::{ChanNr, GsmTime, Sap};
use gsm_pdus::lapdm::enums::frame_format::FrameFormat;
use gsm_saps::control::{LinkStatus, LinkStatusInd};
use gsm_saps::ph::{PhEmptyFrameReq, PhRachReq};
use gsm_saps::rll::{RequestRef, RllChanConf, RllChanRqd};
use gsm_saps::{SapMsg, SapMsgInner};

use crate::lapdm::components::classifier::classify;
use crate::lapdm::components::error::LapdmError;
use crate::lapdm::components::lapdm_channel::LapdmChannel;
use crate::lapdm::components::primitives::{broadcast_unit_data, rll_to_event};
use crate::{GsmEntityTrait, MessageQueue};

/// LAPDm layer of one stack, for either MS or BS. Keeps the LAPDm state of every
/// dedicated channel in use, routes blocks and requests to it and turns the
/// output into SAP messages. Also relays random access between layer 1 and layer 3
pub struct Lapdm {
    config: SharedConfig,
    now: GsmTime,
    /// Created on first use, dropped once released
    channels: HashMap<ChanNr, LapdmChannel>,
    /// RA of the access burst requested last, reported back on PH-RACH-CONF
    rach_ra: Option<u8>,

    /// Receives RLL primitives
    l3_user: GsmEntity,
    /// Receives link status indications, if set
    link_owner: Option<GsmEntity>,
}

impl Lapdm {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            now: GsmTime::default(),
            channels: HashMap::new(),
            rach_ra: None,
            l3_user: GsmEntity::Rr,
            link_owner: Some(GsmEntity::Mm),
        }
    }

    pub fn set_l3_user(&mut self, user: GsmEntity) {
        self.l3_user = user;
    }

    /// Entity notified when datalinks are established or released
    pub fn set_link_owner(&mut self, owner: Option<GsmEntity>) {
        self.link_owner = owner;
    }

    pub fn channel(&self, chan_nr: ChanNr) -> Option<&LapdmChannel> {
        self.channels.get(&chan_nr)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    fn channel_mut(&mut self, chan_nr: ChanNr) -> &mut LapdmChannel {
        let cfg = self.config.config();
        self.channels.entry(chan_nr).or_insert_with(|| {
            tracing::debug!("LAPDm channel {} created", chan_nr);
            LapdmChannel::new(chan_nr, &cfg)
        })
    }

    /// Records releases reported in `prims` and drops the channel once it may go
    fn update_channel(&mut self, chan_nr: ChanNr, prims: &[SapMsgInner]) {
        let Some(channel) = self.channels.get_mut(&chan_nr) else {
            return;
        };
        let released = prims.iter().any(|m| {
            matches!(m, SapMsgInner::LinkStatusInd(LinkStatusInd { chan_nr: c, status: LinkStatus::Released, .. }) if *c == chan_nr)
        });
        if released {
            channel.note_link_released();
        }
        if channel.can_drop() {
            tracing::debug!("LAPDm channel {} released", chan_nr);
            self.channels.remove(&chan_nr);
        }
    }

    /// Wraps primitives produced by the entities and queues them for delivery
    fn dispatch(&self, queue: &mut MessageQueue, prims: Vec<SapMsgInner>) {
        for msg in prims {
            let (sap, dest) = match msg {
                SapMsgInner::PhDataReq(_) | SapMsgInner::PhEmptyFrameReq(_) | SapMsgInner::PhRachReq(_) => {
                    (Sap::PhSap, GsmEntity::Phy)
                }
                SapMsgInner::LinkStatusInd(_) => match self.link_owner {
                    Some(owner) => (Sap::Control, owner),
                    None => continue,
                },
                _ => (Sap::RllSap, self.l3_user),
            };
            queue.push_back(SapMsg::new(sap, GsmEntity::Lapdm, dest, self.now, msg));
        }
    }

    fn log_result(&self, res: Result<(), LapdmError>) {
        match res {
            Ok(()) => {}
            Err(e @ (LapdmError::InvalidState { .. } | LapdmError::IncorrectLength { .. } | LapdmError::SapiNotAllowed { .. })) => {
                tracing::warn!(ts=%self.now, "request refused: {}", e);
            }
            Err(e @ LapdmError::RetransmissionExhausted { .. }) => {
                tracing::info!(ts=%self.now, "{}", e);
            }
            Err(e) => {
                tracing::debug!(ts=%self.now, "frame dropped: {}", e);
            }
        }
    }

    fn rx_ph_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        let now = self.now;
        let mut prims = Vec::new();
        match message.msg {
            SapMsgInner::PhDataInd(ind) => {
                if classify(ind.chan_nr, ind.link_id) == FrameFormat::Bbis {
                    prims.push(broadcast_unit_data(&ind));
                } else {
                    let res = self.channel_mut(ind.chan_nr).entity_mut(ind.link_id).rx_ph_data(&ind, now, &mut prims);
                    self.log_result(res);
                    self.update_channel(ind.chan_nr, &prims);
                }
            }
            SapMsgInner::PhRtsInd(rts) => {
                let req = self.channels.get_mut(&rts.chan_nr).and_then(|ch| ch.dequeue_ph_data(rts.link_id));
                match req {
                    Some(req) => prims.push(SapMsgInner::PhDataReq(req)),
                    None if self.config.config().lapdm.empty_frame => {
                        prims.push(SapMsgInner::PhEmptyFrameReq(PhEmptyFrameReq { chan_nr: rts.chan_nr, link_id: rts.link_id }));
                    }
                    None => {}
                }
                self.update_channel(rts.chan_nr, &prims);
            }
            SapMsgInner::PhSacchHeaderReq(req) => {
                tracing::debug!("SACCH header for {}: power {} TA {}", req.chan_nr, req.header.ms_power, req.header.timing_advance);
                self.channel_mut(req.chan_nr).set_sacch_header(req.header);
            }
            SapMsgInner::PhRachInd(ind) => {
                let req_ref = RequestRef::new(ind.ra, ind.fn_rx);
                tracing::debug!(ts=%now, "access burst {} delay {}", req_ref, ind.acc_delay);
                prims.push(SapMsgInner::RllChanRqd(RllChanRqd { req_ref, access_delay: ind.acc_delay }));
            }
            SapMsgInner::PhRachConf(conf) => match self.rach_ra.take() {
                Some(ra) => {
                    let req_ref = RequestRef::new(ra, conf.fn_tx);
                    prims.push(SapMsgInner::RllChanConf(RllChanConf { req_ref }));
                }
                None => tracing::warn!(ts=%now, "RACH confirmation without request"),
            },
            other => {
                tracing::warn!("unexpected primitive on PH-SAP: {}", other);
            }
        }
        self.dispatch(queue, prims);
    }

    fn rx_rll_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        let now = self.now;
        let msg = match message.msg {
            SapMsgInner::RllRachReq(req) => {
                tracing::debug!(ts=%now, "RACH request RA 0x{:02x} offset {}", req.ra, req.offset);
                self.rach_ra = Some(req.ra);
                // Layer 1 compensates the access delay by sending the burst early
                let rach = PhRachReq {
                    ra: req.ra,
                    offset: req.offset,
                    combined_ccch: req.combined_ccch,
                    ta: -(req.access_delay.min(i8::MAX as u8) as i8),
                    tx_power: req.ms_power,
                };
                self.dispatch(queue, vec![SapMsgInner::PhRachReq(rach)]);
                return;
            }
            other => other,
        };
        let (chan_nr, link_id, event) = match rll_to_event(msg) {
            Ok(req) => req,
            Err(other) => {
                tracing::warn!("unexpected primitive on RLL-SAP: {}", other);
                return;
            }
        };
        tracing::debug!(ts=%now, "{:?} on {} {}", event, chan_nr, link_id);

        let mut prims = Vec::new();
        let res = self.channel_mut(chan_nr).entity_mut(link_id).rx_request(link_id, event, now, &mut prims);
        self.log_result(res);
        self.update_channel(chan_nr, &prims);
        self.dispatch(queue, prims);
    }
}

impl GsmEntityTrait for Lapdm {
    fn entity(&self) -> GsmEntity {
        GsmEntity::Lapdm
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.channels.clear();
        self.rach_ra = None;
        self.config = config;
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        tracing::trace!("rx_prim: {} from {:?}", message.msg, message.src);

        match message.sap {
            Sap::PhSap => self.rx_ph_prim(queue, message),
            Sap::RllSap => self.rx_rll_prim(queue, message),
            Sap::Control => {
                tracing::warn!("unexpected control message {} for {:?} stack", message.msg, self.config.config().stack_mode);
            }
        }
    }

    fn tick_start(&mut self, queue: &mut MessageQueue, ts: GsmTime) {
        self.now = ts;

        // Fixed channel order keeps the output deterministic
        let mut chan_nrs: Vec<ChanNr> = self.channels.keys().copied().collect();
        chan_nrs.sort_unstable_by_key(|c| c.raw());

        let mut prims = Vec::new();
        for chan_nr in chan_nrs {
            let Some(channel) = self.channels.get_mut(&chan_nr) else {
                continue;
            };
            let mut chan_prims = Vec::new();
            for handle in channel.poll_timers(ts) {
                if let Err(e) = channel.expire_t200(handle, ts, &mut chan_prims) {
                    tracing::info!(ts=%ts, "{}", e);
                }
            }
            self.update_channel(chan_nr, &chan_prims);
            prims.append(&mut chan_prims);
        }
        self.dispatch(queue, prims);
    }
}
