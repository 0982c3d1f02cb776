pub mod classifier;
pub mod datalink;
pub mod error;
pub mod lapdm_channel;
pub mod lapdm_entity;
pub mod n200;
pub mod primitives;
pub mod t200;
