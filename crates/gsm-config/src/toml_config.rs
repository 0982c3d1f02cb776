use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::stack_config::{CfgLapdm, SharedConfig, StackConfig, StackMode};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref lapdm) = root.lapdm {
        if !lapdm.extra.is_empty() {
            return Err(format!("Unrecognized fields: lapdm::{:?}", sorted_keys(&lapdm.extra)).into());
        }
    }

    let mut cfg = StackConfig {
        stack_mode: root.stack_mode,
        debug_log: root.debug_log,
        lapdm: CfgLapdm::default(),
    };

    if let Some(lapdm) = root.lapdm {
        apply_lapdm_patch(&mut cfg.lapdm, lapdm);
    }

    Ok(SharedConfig::try_from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(f)
}

fn apply_lapdm_patch(dst: &mut CfgLapdm, src: LapdmDto) {
    if let Some(v) = src.t200_ms {
        dst.t200_ms = v;
    }
    if let Some(v) = src.window_size {
        dst.window_size = v;
    }
    if let Some(v) = src.fill_octet {
        dst.fill_octet = v;
    }
    if let Some(v) = src.efr_facch {
        dst.efr_facch = v;
    }
    if let Some(v) = src.sapi3_enabled {
        dst.sapi3_enabled = v;
    }
    if let Some(v) = src.polling_only {
        dst.polling_only = v;
    }
    if let Some(v) = src.empty_frame {
        dst.empty_frame = v;
    }
    dst.n200_override = src.n200_override;
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    stack_mode: StackMode,
    debug_log: Option<String>,

    #[serde(default)]
    lapdm: Option<LapdmDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct LapdmDto {
    pub t200_ms: Option<u32>,
    pub window_size: Option<u8>,
    pub fill_octet: Option<u8>,
    pub n200_override: Option<u8>,
    pub efr_facch: Option<bool>,
    pub sapi3_enabled: Option<bool>,
    pub polling_only: Option<bool>,
    pub empty_frame: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
