use gsm_config::StackConfig;
use gsm_core::{ChanNr, GsmTime, LinkId};
use gsm_saps::SapMsgInner;
use gsm_saps::ph::{PhDataReq, SacchL1Header};

use super::error::LapdmError;
use super::lapdm_entity::LapdmEntity;
use super::t200::T200Handle;

/// LAPDm of one dedicated channel: the entity on the main channel and the one
/// on its SACCH
pub struct LapdmChannel {
    chan_nr: ChanNr,
    dcch: LapdmEntity,
    acch: LapdmEntity,
    /// Layer 1 configured the channel, it is kept while its datalinks are idle
    configured: bool,
    /// A datalink was released since the channel was created
    link_released: bool,
}

impl LapdmChannel {
    pub fn new(chan_nr: ChanNr, config: &StackConfig) -> Self {
        Self {
            chan_nr,
            dcch: LapdmEntity::new(chan_nr, false, config),
            acch: LapdmEntity::new(chan_nr, true, config),
            configured: false,
            link_released: false,
        }
    }

    pub fn chan_nr(&self) -> ChanNr {
        self.chan_nr
    }

    pub fn dcch(&self) -> &LapdmEntity {
        &self.dcch
    }

    pub fn acch(&self) -> &LapdmEntity {
        &self.acch
    }

    pub fn entity_mut(&mut self, link_id: LinkId) -> &mut LapdmEntity {
        if link_id.is_acch() { &mut self.acch } else { &mut self.dcch }
    }

    pub fn set_sacch_header(&mut self, header: SacchL1Header) {
        self.acch.set_sacch_header(header);
        self.configured = true;
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn note_link_released(&mut self) {
        self.link_released = true;
    }

    /// Both entities hold no state and nothing waits for layer 1
    pub fn is_released(&self) -> bool {
        self.dcch.is_released() && self.acch.is_released()
    }

    /// Channels created implicitly go away as soon as they are idle. Configured
    /// ones stay until one of their datalinks was released
    pub fn can_drop(&self) -> bool {
        self.is_released() && (!self.configured || self.link_released)
    }

    pub fn dequeue_ph_data(&mut self, link_id: LinkId) -> Option<PhDataReq> {
        self.entity_mut(link_id).dequeue_ph_data()
    }

    pub fn poll_timers(&mut self, now: GsmTime) -> Vec<T200Handle> {
        let mut handles = self.dcch.poll_timers(now);
        handles.extend(self.acch.poll_timers(now));
        handles
    }

    pub fn expire_t200(&mut self, handle: T200Handle, now: GsmTime, out: &mut Vec<SapMsgInner>) -> Result<(), LapdmError> {
        let entity = if handle.acch { &mut self.acch } else { &mut self.dcch };
        entity.expire_t200(handle, now, out)
    }
}

#[cfg(test)]
mod tests {
    use gsm_config::StackMode;
    use gsm_core::{ChanKind, Sapi};
    use gsm_saps::rll::ReleaseMode;

    use super::super::datalink::DlEvent;
    use super::*;

    fn sdcch() -> ChanNr {
        ChanNr::new(ChanKind::Sdcch8 { subslot: 5 }, 1)
    }

    #[test]
    fn test_lifetime_of_configured_channel() {
        let cfg = StackConfig::new(StackMode::Ms);
        let mut channel = LapdmChannel::new(sdcch(), &cfg);
        assert!(channel.can_drop());

        channel.set_sacch_header(SacchL1Header { ms_power: 3, timing_advance: 0 });
        assert!(channel.is_released());
        assert!(!channel.can_drop());

        let link_id = LinkId::new(Sapi::Normal, false);
        let mut out = vec![];
        channel
            .entity_mut(link_id)
            .rx_request(link_id, DlEvent::EstablishReq { l3_info: None }, GsmTime::new(0), &mut out)
            .unwrap();
        assert!(!channel.is_released());

        channel
            .entity_mut(link_id)
            .rx_request(link_id, DlEvent::ReleaseReq(ReleaseMode::Local), GsmTime::new(1), &mut out)
            .unwrap();
        channel.note_link_released();
        assert!(channel.can_drop());
    }

    #[test]
    fn test_timers_of_both_entities() {
        let mut cfg = StackConfig::new(StackMode::Ms);
        cfg.lapdm.t200_ms = 50;
        let mut channel = LapdmChannel::new(sdcch(), &cfg);
        let t0 = GsmTime::new(0);
        let mut out = vec![];
        for acch in [false, true] {
            let link_id = LinkId::new(Sapi::Sms, acch);
            channel
                .entity_mut(link_id)
                .rx_request(link_id, DlEvent::EstablishReq { l3_info: None }, t0, &mut out)
                .unwrap();
        }

        let handles = channel.poll_timers(t0.add_frames(11));
        assert_eq!(handles.len(), 2);
        assert!(handles.iter().all(|h| h.chan_nr == sdcch() && h.sapi == Sapi::Sms));

        out.clear();
        for handle in handles {
            channel.expire_t200(handle, t0.add_frames(11), &mut out).unwrap();
        }
        assert_eq!(out.iter().filter(|m| matches!(m, SapMsgInner::PhDataReq(_))).count(), 2);
        assert_eq!(channel.acch().datalink(Sapi::Sms).map(|dl| dl.retrans_ctr()), Some(1));
        assert_eq!(channel.dcch().datalink(Sapi::Sms).map(|dl| dl.retrans_ctr()), Some(1));
    }
}
