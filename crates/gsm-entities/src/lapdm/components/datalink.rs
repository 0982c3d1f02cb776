//! One LAPDm datalink: the state machine of TS 04.06 clause 5 for a single SAPI
//! on a single channel. Acknowledged mode with modulo 8 sequence numbers,
//! no segmentation and no REJ generation.

use std::collections::VecDeque;

use gsm_core::{ChanNr, GsmTime, LinkId, LinkRole, Sapi};
use gsm_pdus::lapdm::consts::N201_B4;
use gsm_pdus::lapdm::enums::{lpd::Lpd, s_type::SType, u_cmd::UCmd};
use gsm_pdus::lapdm::seq::{inc_mod8, sub_mod8};
use gsm_pdus::lapdm::{Address, Control, LapdmFrame};
use gsm_saps::rll::{ReleaseCause, ReleaseMode, RllCause};

use super::error::LapdmError;
use super::n200;
use super::t200::T200;

/// Retransmission limit for SABM and DISC
pub const N200_EST_REL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlState {
    Idle,
    SabmSent,
    MultiFrameEstablished,
    TimerRecovery,
    DiscSent,
}

/// Fixed parameters of a datalink
#[derive(Debug, Clone, Copy)]
pub struct DlParams {
    pub role: LinkRole,
    /// Datalink lives on the SACCH
    pub acch: bool,
    /// Maximum information field length
    pub n201: usize,
    /// Window size k
    pub window: u8,
    pub t200_frames: u32,
    pub efr_facch: bool,
    pub n200_override: Option<u8>,
}

/// Inputs to the state machine. Received frames have already been checked
/// for command/response and parameter errors when they arrive here
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DlEvent {
    EstablishReq { l3_info: Option<Vec<u8>> },
    ReleaseReq(ReleaseMode),
    DataReq { l3_info: Vec<u8> },
    UnitDataReq { l3_info: Vec<u8> },
    SuspendReq,
    ResumeReq { l3_info: Vec<u8> },

    T200Expired,

    RxSabm { p: bool, info: Vec<u8> },
    RxUa { f: bool, info: Vec<u8> },
    RxDm { f: bool },
    RxDisc { p: bool },
    RxUi { info: Vec<u8> },
    RxI { ns: u8, nr: u8, p: bool, info: Vec<u8> },
    RxS { stype: SType, nr: u8, pf: bool, cmd: bool },
}

impl DlEvent {
    /// Name of a layer 3 request, None for frames and timer events
    fn request_name(&self) -> Option<&'static str> {
        match self {
            DlEvent::EstablishReq { .. } => Some("establish request"),
            DlEvent::ReleaseReq(_) => Some("release request"),
            DlEvent::DataReq { .. } => Some("data request"),
            DlEvent::UnitDataReq { .. } => Some("unit data request"),
            DlEvent::SuspendReq => Some("suspend request"),
            DlEvent::ResumeReq { .. } => Some("resume request"),
            _ => None,
        }
    }
}

/// Outputs of the state machine, in the order they must be carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DlAction {
    Transmit(LapdmFrame),
    EstablishInd(Option<Vec<u8>>),
    EstablishConf,
    ReleaseInd(ReleaseCause),
    ReleaseConf,
    DataInd(Vec<u8>),
    DataConf,
    UnitDataInd(Vec<u8>),
    UnitDataConf,
    SuspendConf,
    ErrorInd(RllCause),
}

pub struct Datalink {
    sapi: Sapi,
    params: DlParams,
    chan_nr: ChanNr,
    n200: u8,

    state: DlState,
    v_send: u8,
    v_recv: u8,
    v_ack: u8,
    retrans_ctr: u8,
    peer_busy: bool,
    t200: T200,

    /// SABM or DISC repeated on T200 expiry
    pending_unnumbered: Option<LapdmFrame>,
    /// Information sent in our SABM, which the UA must echo
    contention_info: Option<Vec<u8>>,
    /// Sent I frame payloads by N(S), kept until acknowledged
    tx_hist: [Option<Vec<u8>>; 8],
    send_queue: VecDeque<Vec<u8>>,
}

impl Datalink {
    pub fn new(sapi: Sapi, chan_nr: ChanNr, params: DlParams) -> Self {
        let n200 = params
            .n200_override
            .unwrap_or_else(|| n200::n200_for(chan_nr, params.acch, params.efr_facch));
        Self {
            sapi,
            params,
            chan_nr,
            n200,
            state: DlState::Idle,
            v_send: 0,
            v_recv: 0,
            v_ack: 0,
            retrans_ctr: 0,
            peer_busy: false,
            t200: T200::new(params.t200_frames),
            pending_unnumbered: None,
            contention_info: None,
            tx_hist: Default::default(),
            send_queue: VecDeque::new(),
        }
    }

    pub fn sapi(&self) -> Sapi {
        self.sapi
    }
    pub fn link_id(&self) -> LinkId {
        LinkId::new(self.sapi, self.params.acch)
    }
    pub fn chan_nr(&self) -> ChanNr {
        self.chan_nr
    }
    pub fn state(&self) -> DlState {
        self.state
    }
    pub fn v_send(&self) -> u8 {
        self.v_send
    }
    pub fn v_recv(&self) -> u8 {
        self.v_recv
    }
    pub fn v_ack(&self) -> u8 {
        self.v_ack
    }
    pub fn retrans_ctr(&self) -> u8 {
        self.retrans_ctr
    }
    pub fn n200(&self) -> u8 {
        self.n200
    }
    pub fn peer_busy(&self) -> bool {
        self.peer_busy
    }
    pub fn t200(&self) -> &T200 {
        &self.t200
    }
    pub fn queued(&self) -> usize {
        self.send_queue.len()
    }

    /// Checks a received frame and feeds it to the state machine. Actions are
    /// appended to `out` even when an error is returned
    pub fn rx_frame(&mut self, frame: LapdmFrame, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        let event = self.check_frame(frame, out)?;
        self.handle(event, now, out)
    }

    /// Returns the generation of a T200 instance that expired at `now`
    pub fn poll_t200(&mut self, now: GsmTime) -> Option<u32> {
        self.t200.poll(now)
    }

    /// Handles an expiry of T200. Expiries of instances that were stopped or
    /// restarted in the meantime are ignored
    pub fn t200_expired(&mut self, generation: u32, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if !self.t200.is_current(generation) {
            tracing::debug!("{} ignoring stale T200 expiry, gen {} current {}", self.sapi, generation, self.t200.generation());
            return Ok(());
        }
        tracing::debug!(ts=%now, "{} T200 expired in {:?}, retrans {}", self.sapi, self.state, self.retrans_ctr);
        self.handle(DlEvent::T200Expired, now, out)
    }

    /// Transition table
    pub fn handle(&mut self, event: DlEvent, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        use DlState::*;

        match (self.state, event) {
            // Layer 3 requests
            (Idle, DlEvent::EstablishReq { l3_info }) => self.tx_establish(l3_info, true, now, out),
            (Idle, DlEvent::ResumeReq { l3_info }) => self.resume(l3_info, now, out),
            (_, DlEvent::ReleaseReq(ReleaseMode::Local)) => {
                self.reset_link();
                out.push(DlAction::ReleaseConf);
                Ok(())
            }
            (Idle, DlEvent::ReleaseReq(ReleaseMode::Normal)) => {
                out.push(DlAction::ReleaseConf);
                Ok(())
            }
            (SabmSent | MultiFrameEstablished | TimerRecovery, DlEvent::ReleaseReq(ReleaseMode::Normal)) => {
                self.tx_disc(now, out);
                Ok(())
            }
            (SabmSent | MultiFrameEstablished | TimerRecovery, DlEvent::DataReq { l3_info }) => {
                self.queue_data(l3_info, now, out)
            }
            (_, DlEvent::UnitDataReq { l3_info }) => self.tx_unit_data(l3_info, out),
            (SabmSent | MultiFrameEstablished | TimerRecovery, DlEvent::SuspendReq) => self.suspend(out),

            // Timer
            (SabmSent | DiscSent, DlEvent::T200Expired) => self.retransmit_unnumbered(now, out),
            (MultiFrameEstablished, DlEvent::T200Expired) => {
                self.retrans_ctr = 0;
                self.state = TimerRecovery;
                self.recovery_expiry(now, out)
            }
            (TimerRecovery, DlEvent::T200Expired) => self.recovery_expiry(now, out),

            // Unnumbered frames
            (_, DlEvent::RxUi { info }) => {
                if info.is_empty() {
                    tracing::debug!("{} discarding UI without information", self.sapi);
                } else {
                    out.push(DlAction::UnitDataInd(info));
                }
                Ok(())
            }
            (Idle, DlEvent::RxSabm { p, info }) => self.rx_sabm_idle(p, info, now, out),
            (SabmSent | TimerRecovery, DlEvent::RxSabm { p, info }) => {
                // Answered, the state is left alone. In SabmSent both sides are
                // establishing at once and our own UA is still awaited
                self.tx_u(UCmd::Ua, false, p, info, out);
                Ok(())
            }
            (MultiFrameEstablished, DlEvent::RxSabm { p, info }) => self.rx_sabm_established(p, info, now, out),
            (DiscSent, DlEvent::RxSabm { p, .. }) => {
                self.tx_u(UCmd::Dm, false, p, Vec::new(), out);
                Ok(())
            }
            (_, DlEvent::RxUa { f: false, .. }) | (_, DlEvent::RxDm { f: false }) => {
                tracing::debug!("{} ignoring UA/DM response with F=0", self.sapi);
                Ok(())
            }
            (SabmSent, DlEvent::RxUa { info, .. }) => self.rx_ua_establish(info, now, out),
            (DiscSent, DlEvent::RxUa { .. } | DlEvent::RxDm { .. }) => {
                self.reset_link();
                out.push(DlAction::ReleaseConf);
                Ok(())
            }
            (MultiFrameEstablished | TimerRecovery, DlEvent::RxUa { .. }) => {
                out.push(DlAction::ErrorInd(RllCause::UnsolicitedUa));
                Err(LapdmError::UnsolicitedResponse { frame: "UA", state: self.state })
            }
            (Idle, DlEvent::RxUa { .. }) => Err(LapdmError::UnsolicitedResponse { frame: "UA", state: Idle }),
            (SabmSent | TimerRecovery, DlEvent::RxDm { .. }) => {
                self.reset_link();
                out.push(DlAction::ReleaseInd(ReleaseCause::Rejected));
                Ok(())
            }
            (MultiFrameEstablished, DlEvent::RxDm { .. }) => {
                out.push(DlAction::ErrorInd(RllCause::UnsolicitedDm));
                Err(LapdmError::UnsolicitedResponse { frame: "DM", state: MultiFrameEstablished })
            }
            (Idle, DlEvent::RxDm { .. }) => Err(LapdmError::UnsolicitedResponse { frame: "DM", state: Idle }),
            (Idle, DlEvent::RxDisc { p }) => {
                self.tx_u(UCmd::Dm, false, p, Vec::new(), out);
                Ok(())
            }
            (SabmSent, DlEvent::RxDisc { p }) => {
                self.tx_u(UCmd::Dm, false, p, Vec::new(), out);
                self.reset_link();
                out.push(DlAction::ReleaseInd(ReleaseCause::Normal));
                Ok(())
            }
            (MultiFrameEstablished | TimerRecovery, DlEvent::RxDisc { p }) => {
                self.tx_u(UCmd::Ua, false, p, Vec::new(), out);
                self.reset_link();
                out.push(DlAction::ReleaseInd(ReleaseCause::Normal));
                Ok(())
            }
            (DiscSent, DlEvent::RxDisc { p }) => {
                self.tx_u(UCmd::Ua, false, p, Vec::new(), out);
                self.reset_link();
                out.push(DlAction::ReleaseConf);
                Ok(())
            }

            // Numbered and supervisory frames
            (MultiFrameEstablished | TimerRecovery, DlEvent::RxI { ns, nr, p, info }) => {
                self.rx_info(ns, nr, p, info, now, out)
            }
            (MultiFrameEstablished | TimerRecovery, DlEvent::RxS { stype, nr, pf, cmd }) => {
                self.rx_supervisory(stype, nr, pf, cmd, now, out)
            }
            (Idle, DlEvent::RxI { p: true, .. }) | (Idle, DlEvent::RxS { pf: true, cmd: true, .. }) => {
                // Peer believes the link is up
                self.tx_u(UCmd::Dm, false, true, Vec::new(), out);
                Ok(())
            }

            (state, event) => match event.request_name() {
                Some(op) => Err(LapdmError::InvalidState { op, state }),
                None => {
                    tracing::debug!("{} ignoring {:?} in {:?}", self.sapi, event, state);
                    Ok(())
                }
            },
        }
    }

    /// Command/response and parameter checks of a received frame, clause 5.4 and 5.6.
    /// EL and M were already checked by the frame parser, apart from M on DISC and DM
    fn check_frame(&self, frame: LapdmFrame, out: &mut Vec<DlAction>) -> Result<DlEvent, LapdmError> {
        let cmd = frame.addr.cr == self.peer_cmd_cr();
        let announced = frame.announced_len();

        match frame.ctrl {
            Control::U { cmd: ucmd, pf } => {
                let command_only = matches!(ucmd, UCmd::Sabm | UCmd::Disc | UCmd::Ui);
                if cmd != command_only {
                    out.push(DlAction::ErrorInd(RllCause::FrameNotImplemented));
                    return Err(LapdmError::WrongCommandResponse { frame: ucmd_name(ucmd) });
                }
                match ucmd {
                    UCmd::Dm | UCmd::Disc => {
                        if announced != 0 || frame.more() {
                            out.push(DlAction::ErrorInd(RllCause::UFrameIncorrectParams));
                            return Err(LapdmError::IncorrectFrameParameters { frame: ucmd_name(ucmd) });
                        }
                        Ok(if ucmd == UCmd::Dm { DlEvent::RxDm { f: pf } } else { DlEvent::RxDisc { p: pf } })
                    }
                    UCmd::Sabm | UCmd::Ua | UCmd::Ui => {
                        // B4 frames carry a fixed 19 octet information field
                        let limit = if frame.length.is_none() { N201_B4 } else { self.params.n201 };
                        if announced > limit || frame.info.len() != announced {
                            out.push(DlAction::ErrorInd(RllCause::UFrameIncorrectParams));
                            return Err(LapdmError::IncorrectLength { len: announced, n201: limit });
                        }
                        let info = frame.info;
                        Ok(match ucmd {
                            UCmd::Sabm => DlEvent::RxSabm { p: pf, info },
                            UCmd::Ua => DlEvent::RxUa { f: pf, info },
                            _ => DlEvent::RxUi { info },
                        })
                    }
                }
            }
            Control::S { stype, nr, pf } => {
                if announced != 0 {
                    out.push(DlAction::ErrorInd(RllCause::SFrameIncorrectParams));
                    return Err(LapdmError::IncorrectFrameParameters { frame: "S" });
                }
                Ok(DlEvent::RxS { stype, nr, pf, cmd })
            }
            Control::I { ns, nr, p } => {
                if !cmd {
                    out.push(DlAction::ErrorInd(RllCause::FrameNotImplemented));
                    return Err(LapdmError::WrongCommandResponse { frame: "I" });
                }
                if announced == 0 || announced > self.params.n201 || frame.info.len() != announced {
                    out.push(DlAction::ErrorInd(RllCause::IFrameIncorrectLength));
                    return Err(LapdmError::IncorrectLength { len: announced, n201: self.params.n201 });
                }
                Ok(DlEvent::RxI { ns, nr, p, info: frame.info })
            }
        }
    }

    // C/R bit: MS to BS commands carry 0, BS to MS commands carry 1
    fn cmd_cr(&self) -> bool {
        self.params.role == LinkRole::Bs
    }
    fn peer_cmd_cr(&self) -> bool {
        self.params.role == LinkRole::Ms
    }

    fn address(&self, command: bool) -> Address {
        let cr = if command { self.cmd_cr() } else { !self.cmd_cr() };
        Address::new(Lpd::Normal, self.sapi, cr)
    }

    fn tx_u(&self, cmd: UCmd, command: bool, pf: bool, info: Vec<u8>, out: &mut Vec<DlAction>) {
        let frame = LapdmFrame::new(self.address(command), Control::U { cmd, pf }, info);
        out.push(DlAction::Transmit(frame));
    }

    fn tx_s(&self, stype: SType, command: bool, pf: bool, out: &mut Vec<DlAction>) {
        let frame = LapdmFrame::new(self.address(command), Control::S { stype, nr: self.v_recv, pf }, Vec::new());
        out.push(DlAction::Transmit(frame));
    }

    fn tx_i(&self, ns: u8, p: bool, info: Vec<u8>, out: &mut Vec<DlAction>) {
        let frame = LapdmFrame::new(self.address(true), Control::I { ns, nr: self.v_recv, p }, info);
        out.push(DlAction::Transmit(frame));
    }

    fn reset_seq(&mut self) {
        self.v_send = 0;
        self.v_recv = 0;
        self.v_ack = 0;
        self.retrans_ctr = 0;
        self.peer_busy = false;
    }

    /// Back to Idle, dropping everything in flight
    fn reset_link(&mut self) {
        self.t200.stop();
        self.state = DlState::Idle;
        self.reset_seq();
        self.tx_hist = Default::default();
        self.send_queue.clear();
        self.pending_unnumbered = None;
        self.contention_info = None;
    }

    /// Moves unacknowledged I frames back to the head of the send queue
    fn requeue_unacked(&mut self) {
        let mut ns = self.v_send;
        while ns != self.v_ack {
            ns = sub_mod8(ns, 1);
            if let Some(info) = self.tx_hist[ns as usize].take() {
                self.send_queue.push_front(info);
            }
        }
        self.tx_hist = Default::default();
    }

    fn tx_establish(&mut self, l3_info: Option<Vec<u8>>, flush: bool, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        let l3_info = l3_info.filter(|info| !info.is_empty());
        if let Some(info) = &l3_info {
            if self.sapi != Sapi::Normal {
                out.push(DlAction::ReleaseInd(ReleaseCause::ProtocolError));
                return Err(LapdmError::SapiNotAllowed { op: "contention resolution", sapi: self.sapi.into_raw() });
            }
            if info.len() > self.params.n201 {
                out.push(DlAction::ReleaseInd(ReleaseCause::ProtocolError));
                return Err(LapdmError::IncorrectLength { len: info.len(), n201: self.params.n201 });
            }
        }

        if flush {
            self.send_queue.clear();
        }
        self.tx_hist = Default::default();
        self.reset_seq();

        let frame = LapdmFrame::new(
            self.address(true),
            Control::U { cmd: UCmd::Sabm, pf: true },
            l3_info.clone().unwrap_or_default(),
        );
        self.contention_info = l3_info;
        self.pending_unnumbered = Some(frame.clone());
        self.state = DlState::SabmSent;
        self.t200.start(now);
        out.push(DlAction::Transmit(frame));
        Ok(())
    }

    fn resume(&mut self, l3_info: Vec<u8>, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if self.sapi != Sapi::Normal {
            return Err(LapdmError::SapiNotAllowed { op: "resume", sapi: self.sapi.into_raw() });
        }
        if !l3_info.is_empty() {
            self.send_queue.push_front(l3_info);
        }
        self.tx_establish(None, false, now, out)
    }

    fn suspend(&mut self, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if self.sapi != Sapi::Normal {
            return Err(LapdmError::SapiNotAllowed { op: "suspend", sapi: self.sapi.into_raw() });
        }
        // Queue is kept for the resume
        self.requeue_unacked();
        self.t200.stop();
        self.state = DlState::Idle;
        self.reset_seq();
        self.pending_unnumbered = None;
        self.contention_info = None;
        out.push(DlAction::SuspendConf);
        Ok(())
    }

    fn tx_disc(&mut self, now: GsmTime, out: &mut Vec<DlAction>) {
        self.send_queue.clear();
        self.tx_hist = Default::default();
        self.contention_info = None;

        let frame = LapdmFrame::new(self.address(true), Control::U { cmd: UCmd::Disc, pf: true }, Vec::new());
        self.pending_unnumbered = Some(frame.clone());
        self.retrans_ctr = 0;
        self.state = DlState::DiscSent;
        self.t200.start(now);
        out.push(DlAction::Transmit(frame));
    }

    fn queue_data(&mut self, l3_info: Vec<u8>, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if l3_info.is_empty() || l3_info.len() > self.params.n201 {
            return Err(LapdmError::IncorrectLength { len: l3_info.len(), n201: self.params.n201 });
        }
        self.send_queue.push_back(l3_info);
        self.tx_pending(now, out);
        Ok(())
    }

    /// Sends queued I frames while the window allows
    fn tx_pending(&mut self, now: GsmTime, out: &mut Vec<DlAction>) {
        if self.state != DlState::MultiFrameEstablished {
            return;
        }
        while !self.peer_busy && sub_mod8(self.v_send, self.v_ack) < self.params.window {
            let ns = self.v_send;
            let info = match self.tx_hist[ns as usize].clone() {
                // Rewound by REJ or the end of timer recovery
                Some(info) => info,
                None => match self.send_queue.pop_front() {
                    Some(info) => {
                        self.tx_hist[ns as usize] = Some(info.clone());
                        info
                    }
                    None => break,
                },
            };
            self.tx_i(ns, false, info, out);
            self.v_send = inc_mod8(ns);
            if !self.t200.is_running() {
                self.t200.start(now);
            }
        }
    }

    fn tx_unit_data(&mut self, l3_info: Vec<u8>, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        let b4 = self.params.acch && self.params.role == LinkRole::Bs;
        let limit = if b4 { N201_B4 } else { self.params.n201 };
        if l3_info.len() > limit {
            return Err(LapdmError::IncorrectLength { len: l3_info.len(), n201: limit });
        }
        let addr = self.address(true);
        let ctrl = Control::U { cmd: UCmd::Ui, pf: false };
        let frame = if b4 { LapdmFrame::new_b4(addr, ctrl, l3_info) } else { LapdmFrame::new(addr, ctrl, l3_info) };
        out.push(DlAction::Transmit(frame));
        out.push(DlAction::UnitDataConf);
        Ok(())
    }

    fn retransmit_unnumbered(&mut self, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if self.retrans_ctr >= N200_EST_REL {
            let releasing = self.state == DlState::DiscSent;
            self.reset_link();
            out.push(DlAction::ErrorInd(RllCause::T200Expired));
            out.push(if releasing { DlAction::ReleaseConf } else { DlAction::ReleaseInd(ReleaseCause::Timeout) });
            return Err(LapdmError::RetransmissionExhausted { attempts: N200_EST_REL });
        }
        self.retrans_ctr += 1;
        if let Some(frame) = self.pending_unnumbered.clone() {
            out.push(DlAction::Transmit(frame));
        }
        self.t200.start(now);
        Ok(())
    }

    /// T200 expiry in timer recovery, clause 5.5.7
    fn recovery_expiry(&mut self, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if self.retrans_ctr >= self.n200 {
            tracing::info!("{} on {}: link failure after {} retransmissions", self.sapi, self.chan_nr, self.n200);
            self.reset_link();
            out.push(DlAction::ErrorInd(RllCause::T200Expired));
            out.push(DlAction::ReleaseInd(ReleaseCause::Timeout));
            return Err(LapdmError::RetransmissionExhausted { attempts: self.n200 });
        }
        self.retrans_ctr += 1;

        let last = sub_mod8(self.v_send, 1);
        match &self.tx_hist[last as usize] {
            Some(info) if self.v_send != self.v_ack => self.tx_i(last, true, info.clone(), out),
            _ => self.tx_s(SType::Rr, true, true, out),
        }
        self.t200.start(now);
        Ok(())
    }

    fn rx_sabm_idle(&mut self, p: bool, info: Vec<u8>, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if !info.is_empty() && self.sapi != Sapi::Normal {
            out.push(DlAction::ErrorInd(RllCause::SabmInfoNotAllowed));
            return Err(LapdmError::SapiNotAllowed { op: "contention resolution", sapi: self.sapi.into_raw() });
        }

        // UA echoes the contention resolution information
        self.tx_u(UCmd::Ua, false, p, info.clone(), out);
        self.reset_seq();
        self.tx_hist = Default::default();
        out.push(DlAction::EstablishInd(if info.is_empty() { None } else { Some(info) }));

        // Establish our own direction, the link is up once the peer answers
        let sabm = LapdmFrame::new(self.address(true), Control::U { cmd: UCmd::Sabm, pf: true }, Vec::new());
        self.contention_info = None;
        self.pending_unnumbered = Some(sabm.clone());
        self.state = DlState::SabmSent;
        self.t200.start(now);
        out.push(DlAction::Transmit(sabm));
        Ok(())
    }

    /// SABM on an established link resets it, clause 5.4.1.4. Unacknowledged
    /// I frames are discarded and layer 3 gets a fresh establish confirmation
    fn rx_sabm_established(&mut self, p: bool, info: Vec<u8>, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if !info.is_empty() {
            out.push(DlAction::ErrorInd(RllCause::SabmInfoNotAllowed));
            return Err(LapdmError::IncorrectFrameParameters { frame: "SABM" });
        }
        tracing::debug!("{} on {}: re-established by peer", self.sapi, self.chan_nr);
        self.tx_u(UCmd::Ua, false, p, Vec::new(), out);
        self.t200.stop();
        self.reset_seq();
        self.tx_hist = Default::default();
        self.state = DlState::MultiFrameEstablished;
        out.push(DlAction::EstablishConf);
        self.tx_pending(now, out);
        Ok(())
    }

    fn rx_ua_establish(&mut self, info: Vec<u8>, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if let Some(sent) = self.contention_info.take() {
            if info != sent {
                self.reset_link();
                out.push(DlAction::ReleaseInd(ReleaseCause::ContentionResolutionFailed));
                return Err(LapdmError::ContentionResolution);
            }
        }
        self.t200.stop();
        self.reset_seq();
        self.pending_unnumbered = None;
        self.state = DlState::MultiFrameEstablished;
        out.push(DlAction::EstablishConf);
        self.tx_pending(now, out);
        Ok(())
    }

    fn nr_valid(&self, nr: u8) -> bool {
        sub_mod8(nr, self.v_ack) <= sub_mod8(self.v_send, self.v_ack)
    }

    /// Frees acknowledged frames up to `nr`, confirming each to layer 3
    fn release_acked(&mut self, nr: u8, out: &mut Vec<DlAction>) {
        while self.v_ack != nr {
            if self.tx_hist[self.v_ack as usize].take().is_some() {
                out.push(DlAction::DataConf);
            }
            self.v_ack = inc_mod8(self.v_ack);
        }
    }

    /// N(R) processing outside of timer recovery restarts T200 while frames
    /// remain outstanding
    fn acknowledge(&mut self, nr: u8, now: GsmTime, out: &mut Vec<DlAction>) {
        if nr == self.v_ack {
            return;
        }
        self.release_acked(nr, out);
        if self.state != DlState::TimerRecovery {
            self.t200.stop();
            if self.v_send != self.v_ack {
                self.t200.start(now);
            }
        }
    }

    fn rx_info(&mut self, ns: u8, nr: u8, p: bool, info: Vec<u8>, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if ns != self.v_recv {
            // No REJ, the peer recovers through its own T200. A poll is still answered
            if p {
                self.tx_s(SType::Rr, false, true, out);
            }
            return Err(LapdmError::SequenceError { ns, expected: self.v_recv });
        }
        if !self.nr_valid(nr) {
            out.push(DlAction::ErrorInd(RllCause::SequenceError));
            return Err(LapdmError::NrSequenceError { nr, v_ack: self.v_ack, v_send: self.v_send });
        }

        self.v_recv = inc_mod8(self.v_recv);
        out.push(DlAction::DataInd(info));
        self.tx_s(SType::Rr, false, p, out);
        self.acknowledge(nr, now, out);
        self.tx_pending(now, out);
        Ok(())
    }

    fn rx_supervisory(&mut self, stype: SType, nr: u8, pf: bool, cmd: bool, now: GsmTime, out: &mut Vec<DlAction>) -> Result<(), LapdmError> {
        if !self.nr_valid(nr) {
            out.push(DlAction::ErrorInd(RllCause::SequenceError));
            return Err(LapdmError::NrSequenceError { nr, v_ack: self.v_ack, v_send: self.v_send });
        }
        self.peer_busy = stype == SType::Rnr;

        if cmd && pf {
            self.tx_s(SType::Rr, false, true, out);
        }

        if self.state == DlState::TimerRecovery {
            self.release_acked(nr, out);
            if !cmd && pf {
                // Answer to our poll ends timer recovery, unacknowledged frames go out again
                self.t200.stop();
                self.v_send = nr;
                self.retrans_ctr = 0;
                self.state = DlState::MultiFrameEstablished;
            }
        } else {
            if !cmd && pf {
                out.push(DlAction::ErrorInd(RllCause::UnsolicitedSupervisory));
            }
            if stype == SType::Rej {
                self.release_acked(nr, out);
                self.t200.stop();
                self.v_send = nr;
            } else {
                self.acknowledge(nr, now, out);
            }
        }

        self.tx_pending(now, out);
        if self.state == DlState::MultiFrameEstablished && self.v_send != self.v_ack && !self.t200.is_running() {
            self.t200.start(now);
        }
        Ok(())
    }
}

fn ucmd_name(cmd: UCmd) -> &'static str {
    match cmd {
        UCmd::Ui => "UI",
        UCmd::Dm => "DM",
        UCmd::Sabm => "SABM",
        UCmd::Disc => "DISC",
        UCmd::Ua => "UA",
    }
}
