pub mod entity_trait;
pub mod lapdm;
pub mod messagerouter;

// Re-export commonly used items from router
pub use entity_trait::GsmEntityTrait;
pub use messagerouter::{MessagePrio, MessageQueue, MessageRouter};
