use gsm_config::{SharedConfig, StackConfig, StackMode};
use gsm_core::gsm_entities::GsmEntity;
use gsm_core::{ChanKind, ChanNr, GsmTime, LinkId, Sap, Sapi};
use gsm_entities::lapdm::lapdm_bs_ms::Lapdm;
use gsm_entities::{GsmEntityTrait, MessageRouter};
use gsm_saps::ph::PhDataInd;
use gsm_saps::sapmsg::{SapMsg, SapMsgInner};

use super::sink::Sink;

/// Creates a default config for testing. It can still be modified as needed
/// before passing it to the ComponentTest constructor
pub fn default_test_config(stack_mode: StackMode) -> StackConfig {
    let mut cfg = StackConfig::new(stack_mode);
    // Short T200 keeps timer tests to a few dozen ticks: 100 ms is 22 frames
    cfg.lapdm.t200_ms = 100;
    cfg
}

/// Channel used by most tests
pub fn test_sdcch() -> ChanNr {
    ChanNr::new(ChanKind::Sdcch8 { subslot: 2 }, 0)
}

/// Pads octets to a 23 octet block
pub fn block(octets: &[u8], fill: u8) -> Vec<u8> {
    let mut data = octets.to_vec();
    data.resize(23, fill);
    data
}

/// Infrastructure for testing stack components
/// Quick setup of LAPDm plus sinks for the surrounding entities
pub struct ComponentTest {
    pub config: SharedConfig,
    pub router: MessageRouter,
    pub sinks: Vec<GsmEntity>,
}

impl ComponentTest {
    pub fn new(config: StackConfig, start_time: Option<GsmTime>) -> Self {
        let shared_config = SharedConfig::from_config(config);
        let mut mr = MessageRouter::new(shared_config.clone());
        mr.set_time(start_time.unwrap_or_default());

        Self {
            config: shared_config,
            router: mr,
            sinks: vec![],
        }
    }

    pub fn get_shared_config(&self) -> SharedConfig {
        self.config.clone()
    }

    pub fn now(&self) -> GsmTime {
        self.router.get_time()
    }

    pub fn populate_entities(&mut self, components: Vec<GsmEntity>, sinks: Vec<GsmEntity>) {
        for component in components.iter() {
            match component {
                GsmEntity::Lapdm => {
                    let lapdm = Lapdm::new(self.config.clone());
                    self.register_entity(lapdm);
                }
                _ => {
                    panic!("Component not implemented: {:?}", component);
                }
            }
        }

        // Create sinks for debugging / message collection
        for sink in sinks.iter() {
            assert!(!self.sinks.contains(sink), "Sink already exists: {:?}", sink);
            assert!(self.router.get_entity(*sink).is_none(), "Sink already registered as entity: {:?}", sink);

            self.sinks.push(*sink);
            self.router.register_entity(Box::new(Sink::new(*sink)));
        }
    }

    /// LAPDm with sinks for layer 1, layer 3 and the channel owner
    pub fn new_lapdm(config: StackConfig) -> Self {
        let mut test = Self::new(config, None);
        test.populate_entities(
            vec![GsmEntity::Lapdm],
            vec![GsmEntity::Phy, GsmEntity::Rr, GsmEntity::Mm],
        );
        test
    }

    pub fn register_entity<T: 'static + GsmEntityTrait>(&mut self, entity: T) {
        self.router.register_entity(Box::new(entity));
    }

    pub fn run_stack(&mut self, num_ticks: Option<usize>) {
        self.router.run_stack(num_ticks, None);
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        self.router.submit_message(message);
    }

    /// Submits a primitive from layer 3 to LAPDm
    pub fn submit_rll(&mut self, msg: SapMsgInner) {
        let now = self.now();
        self.submit_message(SapMsg::new(Sap::RllSap, GsmEntity::Rr, GsmEntity::Lapdm, now, msg));
    }

    /// Submits a primitive from layer 1 to LAPDm
    pub fn submit_ph(&mut self, msg: SapMsgInner) {
        let now = self.now();
        self.submit_message(SapMsg::new(Sap::PhSap, GsmEntity::Phy, GsmEntity::Lapdm, now, msg));
    }

    /// Submits a received block from layer 1 to LAPDm
    pub fn submit_block(&mut self, chan_nr: ChanNr, acch: bool, data: Vec<u8>) {
        let now = self.now();
        let ind = PhDataInd { chan_nr, link_id: LinkId::new(Sapi::Normal, acch), fn_rx: now, data };
        self.submit_ph(SapMsgInner::PhDataInd(ind));
    }

    /// The LAPDm entity under test
    pub fn lapdm(&mut self) -> &Lapdm {
        self.router
            .get_entity(GsmEntity::Lapdm)
            .and_then(|e| e.as_any_mut().downcast_mut::<Lapdm>())
            .expect("LAPDm registered")
    }

    pub fn deliver_all_messages(&mut self) {
        self.router.deliver_all_messages();
    }

    pub fn dump_sinks(&mut self) -> Vec<SapMsg> {
        let mut msgs = vec![];
        for sink in self.sinks.iter() {
            if let Some(component) = self.router.get_entity(*sink) {
                if let Some(sink) = component.as_any_mut().downcast_mut::<Sink>() {
                    let mut sink_msgs = sink.take_msgqueue();
                    msgs.append(&mut sink_msgs);
                }
            }
        }
        msgs
    }

    /// Collected messages for one sink only
    pub fn dump_sink(&mut self, entity: GsmEntity) -> Vec<SapMsg> {
        match self.router.get_entity(entity) {
            Some(component) => match component.as_any_mut().downcast_mut::<Sink>() {
                Some(sink) => sink.take_msgqueue(),
                None => vec![],
            },
            None => vec![],
        }
    }
}

/// Blocks sent to layer 1, in order
pub fn ph_blocks(msgs: &[SapMsg]) -> Vec<Vec<u8>> {
    msgs.iter()
        .filter_map(|m| match &m.msg {
            SapMsgInner::PhDataReq(req) => Some(req.data.clone()),
            _ => None,
        })
        .collect()
}

/// Turns blocks one stack sent into received blocks for the other
pub fn forward_blocks(from: &mut ComponentTest, to: &mut ComponentTest) -> usize {
    let msgs = from.dump_sink(GsmEntity::Phy);
    let mut count = 0;
    for msg in msgs {
        if let SapMsgInner::PhDataReq(req) = msg.msg {
            to.submit_block(req.chan_nr, req.link_id.is_acch(), req.data);
            count += 1;
        }
    }
    count
}
