use serde::Deserialize;
use std::sync::Arc;

use gsm_core::LinkRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StackMode {
    Bs,
    Ms,
}

impl StackMode {
    pub fn role(self) -> LinkRole {
        match self {
            StackMode::Bs => LinkRole::Bs,
            StackMode::Ms => LinkRole::Ms,
        }
    }
}

/// LAPDm data link parameters, TS 04.06 clause 5.8
#[derive(Debug, Clone)]
pub struct CfgLapdm {
    /// T200 retransmission timer in milliseconds
    pub t200_ms: u32,
    /// Maximum number of outstanding I frames (k)
    pub window_size: u8,
    /// Octet used to pad frames to the 23 octet block length
    pub fill_octet: u8,
    /// Replaces the channel-dependent N200 of the multiple frame state when set
    pub n200_override: Option<u8>,
    /// FACCH/F runs enhanced full rate speech, which raises N200
    pub efr_facch: bool,
    /// Whether a SAPI 3 datalink exists. Frames for SAPI 3 are dropped otherwise
    pub sapi3_enabled: bool,
    /// Frames wait in per-datalink queues until layer 1 asks for a block with
    /// PH-RTS. Otherwise they are handed to layer 1 immediately
    pub polling_only: bool,
    /// Answer a PH-RTS with PH-EMPTY-FRAME when no frame is queued
    pub empty_frame: bool,
}

impl Default for CfgLapdm {
    fn default() -> Self {
        Self {
            t200_ms: default_t200_ms(),
            window_size: 1,
            fill_octet: 0x00,
            n200_override: None,
            efr_facch: false,
            sapi3_enabled: true,
            polling_only: false,
            empty_frame: false,
        }
    }
}

#[inline]
fn default_t200_ms() -> u32 {
    1000
}

#[derive(Debug, Clone)]
pub struct StackConfig {
    pub stack_mode: StackMode,
    pub debug_log: Option<String>,

    pub lapdm: CfgLapdm,
}

impl StackConfig {
    pub fn new(mode: StackMode) -> Self {
        StackConfig {
            stack_mode: mode,
            debug_log: None,
            lapdm: CfgLapdm::default(),
        }
    }

    /// Validate that all configuration fields are within protocol limits.
    pub fn validate(&self) -> Result<(), &str> {
        if self.lapdm.t200_ms == 0 {
            return Err("lapdm.t200_ms must be non-zero");
        }
        // Modulo 8 sequence numbers allow at most 7 outstanding frames
        if self.lapdm.window_size == 0 || self.lapdm.window_size > 7 {
            return Err("lapdm.window_size must be between 1 and 7");
        }
        if self.lapdm.n200_override == Some(0) {
            return Err("lapdm.n200_override must be non-zero");
        }
        if self.lapdm.empty_frame && !self.lapdm.polling_only {
            return Err("lapdm.empty_frame requires lapdm.polling_only");
        }
        Ok(())
    }
}

/// Global shared configuration, immutable after construction
#[derive(Clone)]
pub struct SharedConfig {
    cfg: Arc<StackConfig>,
}

impl SharedConfig {
    pub fn new(mode: StackMode) -> Self {
        Self::from_config(StackConfig::new(mode))
    }

    /// Wraps a config after validating it. Panics on an invalid config; use
    /// `try_from_config` where the config comes from outside the program
    pub fn from_config(cfg: StackConfig) -> Self {
        match Self::try_from_config(cfg) {
            Ok(c) => c,
            Err(e) => panic!("Invalid stack configuration: {}", e),
        }
    }

    pub fn try_from_config(cfg: StackConfig) -> Result<Self, String> {
        cfg.validate().map_err(|e| e.to_string())?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }
}
