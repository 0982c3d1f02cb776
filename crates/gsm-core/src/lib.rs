//! Core utilities for the GSM LAPDm stack
//!
//! This crate provides fundamental types and utilities used across the stack:
//! - OctetBuffer for octet-level PDU parsing
//! - GsmTime for TDMA frame timing
//! - Channel number and link identifier types (ChanNr, LinkId, Sapi)
//! - Common macros and debug utilities

pub mod chan_nr;
pub mod debug;
pub mod gsm_common;
pub mod gsm_entities;
pub mod gsm_time;
pub mod link_id;
pub mod octet_buffer;
pub mod pdu_parse_error;

// Re-export commonly used items
pub use chan_nr::{ChanKind, ChanNr};
pub use gsm_common::*;
pub use gsm_time::GsmTime;
pub use link_id::{LinkId, Sapi};
pub use octet_buffer::OctetBuffer;
pub use pdu_parse_error::PduParseErr;
