//! Wire formats of the GSM radio interface data link layer

pub mod lapdm;
