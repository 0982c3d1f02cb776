//! LAPDm frame codec, TS 04.06 clause 2 and 3

pub mod address;
pub mod consts;
pub mod control;
pub mod enums;
pub mod frame;
pub mod length;
pub mod seq;

pub use address::Address;
pub use control::Control;
pub use frame::LapdmFrame;
pub use length::LengthInd;
