use clap::Parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gsm_config::{SharedConfig, StackConfig, StackMode, toml_config};
use gsm_core::gsm_entities::GsmEntity;
use gsm_core::{ChanKind, ChanNr, debug};
use gsm_entities::MessageRouter;
use gsm_entities::lapdm::lapdm_bs_ms::Lapdm;
use gsm_saps::ph::PhDataReq;

mod air;
mod l3_script;

use air::AirLink;
use l3_script::{BsScript, MsScript};

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Copy of the loaded config for one side of the link
fn config_for(base: &StackConfig, mode: StackMode) -> SharedConfig {
    let mut cfg = base.clone();
    cfg.stack_mode = mode;
    SharedConfig::from_config(cfg)
}

/// LAPDm with a scripted layer 3 on top and the air link below
fn build_stack(cfg: SharedConfig, air: AirLink, script: Box<dyn gsm_entities::GsmEntityTrait>) -> MessageRouter {
    let mut router = MessageRouter::new(cfg.clone());

    let mut lapdm = Lapdm::new(cfg);
    lapdm.set_link_owner(Some(GsmEntity::Rr));

    router.register_entity(Box::new(air));
    router.register_entity(Box::new(lapdm));
    router.register_entity(script);
    router
}

fn dropped_blocks(router: &mut MessageRouter) -> usize {
    router
        .get_entity(GsmEntity::Phy)
        .and_then(|e| e.as_any_mut().downcast_mut::<AirLink>())
        .map(|air| air.dropped())
        .unwrap_or(0)
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "LAPDm MS/BS loopback",
    long_about = "Runs an MS and a BS LAPDm stack against each other over an in-memory air interface"
)]
struct Args {
    /// Config file, defaults are used when omitted
    #[arg(short, long, help = "TOML config with LAPDm parameters")]
    config: Option<String>,

    /// Maximum number of TDMA frames to run
    #[arg(short, long, default_value_t = 5000)]
    ticks: usize,

    /// Number of I frames the MS sends once established
    #[arg(short, long, default_value_t = 3)]
    messages: usize,

    /// Drop every n-th block on the air interface, in both directions
    #[arg(short, long)]
    drop_every: Option<usize>,

    /// Timeslot of the SDCCH/8 carrying the link
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..8))]
    timeslot: u8,

    /// SDCCH/8 subchannel
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..8))]
    subslot: u8,
}

fn main() {
    eprintln!("LAPDm loopback, TS 04.06 data link layer between MS and BS\n");

    let args = Args::parse();
    let base = match &args.config {
        Some(path) => load_config_from_toml(path).config(),
        None => Arc::new(StackConfig::new(StackMode::Ms)),
    };
    let _log_guard = debug::setup_logging_default(base.debug_log.clone());

    let ms_cfg = config_for(&base, StackMode::Ms);
    let bs_cfg = config_for(&base, StackMode::Bs);

    let (ms_tx, bs_rx) = crossbeam_channel::unbounded::<PhDataReq>();
    let (bs_tx, ms_rx) = crossbeam_channel::unbounded::<PhDataReq>();

    let done = Arc::new(AtomicBool::new(false));
    let chan_nr = ChanNr::new(ChanKind::Sdcch8 { subslot: args.subslot }, args.timeslot);

    let air = |name, tx, rx| {
        let link = AirLink::new(name, tx, rx, args.drop_every);
        if base.lapdm.polling_only { link.with_rts(chan_nr) } else { link }
    };
    let mut ms_router = build_stack(
        ms_cfg,
        air("MS", ms_tx, ms_rx),
        Box::new(MsScript::new(chan_nr, args.messages, done.clone())),
    );
    let mut bs_router = build_stack(
        bs_cfg,
        air("BS", bs_tx, bs_rx),
        Box::new(BsScript::new()),
    );

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!("failed to set Ctrl+C handler: {}", e);
    }

    // Both stacks advance one frame at a time so blocks cross the air link
    // with a single frame of delay
    let mut ticks = 0;
    while ticks < args.ticks && running.load(Ordering::SeqCst) && !done.load(Ordering::SeqCst) {
        ms_router.run_stack(Some(1), None);
        bs_router.run_stack(Some(1), None);
        ticks += 1;
    }

    let dropped = dropped_blocks(&mut ms_router) + dropped_blocks(&mut bs_router);
    if done.load(Ordering::SeqCst) {
        tracing::info!("session finished after {} frames, {} blocks dropped", ticks, dropped);
    } else {
        tracing::warn!("stopped after {} frames without completing the session, {} blocks dropped", ticks, dropped);
    }
}
