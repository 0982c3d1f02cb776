use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gsm_config::SharedConfig;
use gsm_core::{GsmTime, gsm_entities::GsmEntity};
use gsm_saps::SapMsg;

use crate::GsmEntityTrait;


#[derive(Default)]
pub enum MessagePrio {
    Immediate,
    #[default]
    Normal,
}

pub struct MessageQueue {
    messages: VecDeque<SapMsg>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    pub fn push_back(&mut self, message: SapMsg) {
        self.messages.push_back(message);
    }

    pub fn push_prio(&mut self, message: SapMsg, prio: MessagePrio) {
        match prio {
            MessagePrio::Immediate => {
                self.messages.push_front(message);
            }
            MessagePrio::Normal => {
                self.messages.push_back(message);
            }
        }
    }

    pub fn pop_front(&mut self) -> Option<SapMsg> {
        self.messages.pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MessageRouter {
    /// Kept for entities registered later and for future use by the router itself
    _config: SharedConfig,
    entities: HashMap<GsmEntity, Box<dyn GsmEntityTrait>>,
    msg_queue: MessageQueue,

    /// Current TDMA frame, advanced by one at the end of every tick
    ts: GsmTime,
}


impl MessageRouter {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            entities: HashMap::new(),
            msg_queue: MessageQueue::new(),
            _config: config,
            ts: GsmTime::default(),
        }
    }

    /// Sets the frame number handed to entities on the next tick
    pub fn set_time(&mut self, ts: GsmTime) {
        self.ts = ts;
    }

    pub fn get_time(&self) -> GsmTime {
        self.ts
    }

    pub fn register_entity(&mut self, entity: Box<dyn GsmEntityTrait>) {
        let comp_type = entity.entity();
        tracing::debug!("register_entity {:?}", comp_type);
        self.entities.insert(comp_type, entity);
    }

    /// Returns a mut ref to a component of the requested type
    pub fn get_entity(&mut self, comp: GsmEntity) -> Option<&mut dyn GsmEntityTrait> {
        self.entities.get_mut(&comp).map(|entity| entity.as_mut())
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        tracing::debug!("submit_message {:?}: {:?} -> {:?}", message.get_sap(), message.get_source(), message.get_dest());
        self.msg_queue.push_back(message);
    }

    pub fn deliver_message(&mut self) {
        let Some(message) = self.msg_queue.pop_front() else {
            return;
        };

        tracing::trace!("deliver_message: {} {:?}: {:?} -> {:?}", message.msg, message.get_sap(), message.get_source(), message.get_dest());

        let dest = *message.get_dest();
        if let Some(entity) = self.entities.get_mut(&dest) {
            entity.rx_prim(&mut self.msg_queue, message);
        } else {
            tracing::warn!("deliver_message: entity {:?} not found for {} {:?}: {:?} -> {:?}", dest, message.msg, message.get_sap(), message.get_source(), message.get_dest());
        }
    }

    pub fn deliver_all_messages(&mut self) {
        while !self.msg_queue.is_empty() {
            self.deliver_message();
        }
    }

    pub fn get_msgqueue_len(&self) -> usize {
        self.msg_queue.len()
    }

    pub fn tick_start(&mut self) {
        tracing::trace!("--- tick {} ----------------------------", self.ts);

        for entity in self.entities.values_mut() {
            entity.tick_start(&mut self.msg_queue, self.ts);
        }
    }

    /// Lets every entity flush what it collected during the frame, then
    /// advances the frame number
    pub fn tick_end(&mut self) {
        for entity in self.entities.values_mut() {
            entity.tick_end(&mut self.msg_queue, self.ts);
        }
        self.deliver_all_messages();

        self.ts = self.ts.add_frames(1);
    }

    /// Runs the stack one TDMA frame per tick, either for a number of ticks or
    /// until `running` is cleared
    pub fn run_stack(&mut self, num_ticks: Option<usize>, running: Option<Arc<AtomicBool>>) {
        let mut ticks: usize = 0;

        loop {
            if let Some(running) = &running {
                if !running.load(Ordering::SeqCst) {
                    tracing::info!("stopping stack after {} ticks", ticks);
                    break;
                }
            }

            self.tick_start();
            self.deliver_all_messages();
            self.tick_end();

            ticks += 1;
            if let Some(num_ticks) = num_ticks {
                if ticks >= num_ticks {
                    break;
                }
            }
        }
    }
}
