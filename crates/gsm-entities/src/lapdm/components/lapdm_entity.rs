use std::collections::VecDeque;

use gsm_config::StackConfig;
use gsm_core::{ChanNr, GsmTime, LinkId, LinkRole, OctetBuffer, PduParseErr, Sapi, unimplemented_log};
use gsm_pdus::lapdm::consts::{SACCH_L1_HEADER_LEN, n201};
use gsm_pdus::lapdm::enums::{frame_format::FrameFormat, lpd::Lpd};
use gsm_pdus::lapdm::{Address, LapdmFrame};
use gsm_saps::SapMsgInner;
use gsm_saps::ph::{PhDataInd, PhDataReq, SacchL1Header};
use gsm_saps::rll::RllCause;

use super::classifier::classify;
use super::datalink::{Datalink, DlAction, DlEvent, DlParams, DlState};
use super::error::LapdmError;
use super::primitives::{PrimContext, action_to_prims, broadcast_unit_data};
use super::t200::T200Handle;

/// Per-block facts established before a frame reaches its datalink
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub format: FrameFormat,
    pub link_id: LinkId,
    pub sacch_header: Option<SacchL1Header>,
}

/// LAPDm for one channel type (main DCCH or SACCH) of one channel, holding a
/// datalink per SAPI
pub struct LapdmEntity {
    chan_nr: ChanNr,
    acch: bool,
    role: LinkRole,
    fill_octet: u8,
    /// Prefixed to every transmitted SACCH block
    tx_sacch_header: SacchL1Header,
    /// Indexed by `Sapi::index`. SAPI 3 may be disabled
    datalinks: [Option<Datalink>; 2],

    /// Blocks wait for PH-RTS instead of going to layer 1 directly
    polling_only: bool,
    /// Blocks awaiting PH-RTS, per datalink
    tx_queues: [VecDeque<PhDataReq>; 2],
    /// Queue served by the previous PH-RTS
    last_tx_dequeue: usize,
}

impl LapdmEntity {
    pub fn new(chan_nr: ChanNr, acch: bool, config: &StackConfig) -> Self {
        let params = DlParams {
            role: config.stack_mode.role(),
            acch,
            n201: n201(FrameFormat::B, acch),
            window: config.lapdm.window_size,
            t200_frames: GsmTime::frames_from_ms(config.lapdm.t200_ms),
            efr_facch: config.lapdm.efr_facch,
            n200_override: config.lapdm.n200_override,
        };
        let sapi3 = config.lapdm.sapi3_enabled.then(|| Datalink::new(Sapi::Sms, chan_nr, params));
        Self {
            chan_nr,
            acch,
            role: params.role,
            fill_octet: config.lapdm.fill_octet,
            tx_sacch_header: SacchL1Header::default(),
            datalinks: [Some(Datalink::new(Sapi::Normal, chan_nr, params)), sapi3],
            polling_only: config.lapdm.polling_only,
            tx_queues: Default::default(),
            // SAPI 0 is served first
            last_tx_dequeue: 1,
        }
    }

    pub fn chan_nr(&self) -> ChanNr {
        self.chan_nr
    }

    pub fn is_acch(&self) -> bool {
        self.acch
    }

    pub fn datalink(&self, sapi: Sapi) -> Option<&Datalink> {
        self.datalinks[sapi.index()].as_ref()
    }

    pub fn set_sacch_header(&mut self, header: SacchL1Header) {
        self.tx_sacch_header = header;
    }

    /// Number of blocks waiting for PH-RTS
    pub fn queued_blocks(&self) -> usize {
        self.tx_queues.iter().map(VecDeque::len).sum()
    }

    /// No datalink holds state and nothing waits for layer 1
    pub fn is_released(&self) -> bool {
        self.queued_blocks() == 0
            && self.datalinks.iter().flatten().all(|dl| dl.state() == DlState::Idle && dl.queued() == 0)
    }

    fn datalink_mut(&mut self, sapi: Sapi) -> Result<&mut Datalink, LapdmError> {
        self.datalinks[sapi.index()].as_mut().ok_or(LapdmError::UnknownSapi(sapi.into_raw()))
    }

    fn prim_context(&self, sapi: Sapi, sacch_header: Option<SacchL1Header>) -> PrimContext {
        PrimContext {
            chan_nr: self.chan_nr,
            link_id: LinkId::new(sapi, self.acch),
            sacch_header,
            fill_octet: self.fill_octet,
        }
    }

    /// Converts datalink actions to primitives. Blocks we transmit on SACCH carry
    /// our L1 header, indications carry the header that was received, if any.
    /// In polling mode blocks are queued for PH-RTS
    fn emit(&mut self, actions: Vec<DlAction>, sapi: Sapi, rx_header: Option<SacchL1Header>, out: &mut Vec<SapMsgInner>) {
        let tx_header = self.acch.then_some(self.tx_sacch_header);
        let tx_ctx = self.prim_context(sapi, tx_header);
        let rx_ctx = self.prim_context(sapi, rx_header);
        for action in actions {
            let ctx = if matches!(action, DlAction::Transmit(_)) { &tx_ctx } else { &rx_ctx };
            let mut prims = Vec::with_capacity(2);
            action_to_prims(action, ctx, &mut prims);
            for prim in prims {
                match prim {
                    SapMsgInner::PhDataReq(req) if self.polling_only => self.tx_queues[sapi.index()].push_back(req),
                    prim => out.push(prim),
                }
            }
        }
    }

    /// Next block to send in answer to PH-RTS. Datalinks with queued blocks take
    /// turns, starting after the one served last
    pub fn dequeue_ph_data(&mut self) -> Option<PhDataReq> {
        let num = self.tx_queues.len();
        for offset in 1..=num {
            let idx = (self.last_tx_dequeue + offset) % num;
            if let Some(req) = self.tx_queues[idx].pop_front() {
                self.last_tx_dequeue = idx;
                return Some(req);
            }
        }
        None
    }

    /// Handles one block from layer 1
    pub fn rx_ph_data(&mut self, ind: &PhDataInd, now: GsmTime, out: &mut Vec<SapMsgInner>) -> Result<(), LapdmError> {
        let format = classify(ind.chan_nr, ind.link_id);
        let mut buf = OctetBuffer::new(&ind.data);

        let sacch_header = match format {
            FrameFormat::Bbis => {
                out.push(broadcast_unit_data(ind));
                return Ok(());
            }
            FrameFormat::A | FrameFormat::Bter => {
                unimplemented_log!("frame format {} on {}", format, ind.chan_nr);
                return Err(LapdmError::UnsupportedFraming { field: "format" });
            }
            FrameFormat::B4 => {
                let header = buf.read_slice(SACCH_L1_HEADER_LEN, "l1_header")?;
                Some(SacchL1Header::from_octets([header[0], header[1]]))
            }
            FrameFormat::B => None,
        };

        let l2 = buf.remaining();
        let Some(&address) = l2.first() else {
            return Err(PduParseErr::BufferEnded { field: Some("address") }.into());
        };
        let addr = Address::from_octet(address)?;
        if addr.lpd != Lpd::Normal {
            tracing::debug!("ignoring block with LPD {:?} on {}", addr.lpd, self.chan_nr);
            return Ok(());
        }
        let sapi = Sapi::try_from(addr.sapi).map_err(|_| LapdmError::UnknownSapi(addr.sapi))?;
        if self.datalinks[sapi.index()].is_none() {
            tracing::debug!("dropping frame for disabled {} on {}", sapi, self.chan_nr);
            return Err(LapdmError::UnknownSapi(addr.sapi));
        }

        let ctx = FrameContext {
            format,
            link_id: LinkId::new(sapi, self.acch),
            sacch_header,
        };

        // On SACCH only UI frames towards the MS lack the length octet
        let b4_ui = format == FrameFormat::B4 && self.role == LinkRole::Ms;
        let frame = match LapdmFrame::from_bytes(l2, b4_ui) {
            Ok(frame) => frame,
            Err(e) => {
                if matches!(e, PduParseErr::NotImplemented { .. } | PduParseErr::UnsupportedFraming { .. }) {
                    let actions = vec![DlAction::ErrorInd(RllCause::FrameNotImplemented)];
                    self.emit(actions, sapi, ctx.sacch_header, out);
                }
                return Err(e.into());
            }
        };
        tracing::debug!(ts=%now, "<- {} on {} {}", frame, self.chan_nr, ctx.link_id);

        let mut actions = Vec::new();
        let res = self.datalink_mut(sapi)?.rx_frame(frame, now, &mut actions);
        self.emit(actions, sapi, ctx.sacch_header, out);
        res
    }

    /// Handles a layer 3 request for one of the datalinks
    pub fn rx_request(&mut self, link_id: LinkId, event: DlEvent, now: GsmTime, out: &mut Vec<SapMsgInner>) -> Result<(), LapdmError> {
        let sapi = link_id.sapi().map_err(LapdmError::UnknownSapi)?;
        let mut actions = Vec::new();
        let res = self.datalink_mut(sapi)?.handle(event, now, &mut actions);
        self.emit(actions, sapi, None, out);
        res
    }

    /// Collects the T200 instances that expired at `now`
    pub fn poll_timers(&mut self, now: GsmTime) -> Vec<T200Handle> {
        let (chan_nr, acch) = (self.chan_nr, self.acch);
        self.datalinks
            .iter_mut()
            .flatten()
            .filter_map(|dl| {
                dl.poll_t200(now)
                    .map(|generation| T200Handle { chan_nr, acch, sapi: dl.sapi(), generation })
            })
            .collect()
    }

    /// Delivers a T200 expiry to its datalink. Stale handles are ignored
    pub fn expire_t200(&mut self, handle: T200Handle, now: GsmTime, out: &mut Vec<SapMsgInner>) -> Result<(), LapdmError> {
        if handle.chan_nr != self.chan_nr || handle.acch != self.acch {
            tracing::warn!("T200 handle for another entity: {:?}", handle);
            return Ok(());
        }
        let mut actions = Vec::new();
        let res = self.datalink_mut(handle.sapi)?.t200_expired(handle.generation, now, &mut actions);
        self.emit(actions, handle.sapi, None, out);
        res
    }
}
