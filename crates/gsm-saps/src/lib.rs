/// Custom definitions for stack control
pub mod control;

pub mod ph;
pub mod rll;
pub mod sapmsg;

pub use sapmsg::*;
