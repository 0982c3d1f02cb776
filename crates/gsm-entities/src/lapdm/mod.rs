pub mod components;
pub mod lapdm_bs_ms;
