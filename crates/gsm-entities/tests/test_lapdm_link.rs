mod common;

use gsm_config::StackMode;
use gsm_core::gsm_entities::GsmEntity;
use gsm_core::{LinkId, Sapi, debug};
use gsm_entities::lapdm::components::datalink::DlState;
use gsm_saps::rll::*;
use gsm_saps::sapmsg::SapMsgInner;
use common::component_test::{forward_blocks, test_sdcch};
use common::{ComponentTest, default_test_config};

/// Runs both stacks one frame at a time, carrying blocks across
fn exchange(ms: &mut ComponentTest, bs: &mut ComponentTest, ticks: usize) {
    for _ in 0..ticks {
        ms.run_stack(Some(1));
        forward_blocks(ms, bs);
        bs.run_stack(Some(1));
        forward_blocks(bs, ms);
    }
}

fn names(msgs: Vec<gsm_saps::SapMsg>) -> Vec<String> {
    msgs.iter().map(|m| m.msg.to_string()).collect()
}

fn sapi0_state(test: &mut ComponentTest) -> Option<DlState> {
    let channel = test.lapdm().channel(test_sdcch())?;
    channel.dcch().datalink(Sapi::Normal).map(|dl| dl.state())
}

#[test]
fn test_ms_bs_session() {
    debug::setup_logging_verbose();
    let mut ms = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    let mut bs = ComponentTest::new_lapdm(default_test_config(StackMode::Bs));
    let chan_nr = test_sdcch();
    let link_id = LinkId::new(Sapi::Normal, false);

    ms.submit_rll(SapMsgInner::RllEstablishReq(RllEstablishReq { chan_nr, link_id, l3_info: Some(vec![0x06, 0x27, 0x07]) }));
    exchange(&mut ms, &mut bs, 3);
    assert_eq!(sapi0_state(&mut ms), Some(DlState::MultiFrameEstablished));
    assert_eq!(sapi0_state(&mut bs), Some(DlState::MultiFrameEstablished));
    // The BS establishes its own direction with a SABM, which resets the MS link
    assert_eq!(names(ms.dump_sink(GsmEntity::Rr)), vec!["RllEstablishConf", "RllEstablishConf"]);
    let bs_rr = bs.dump_sink(GsmEntity::Rr);
    let SapMsgInner::RllEstablishInd(ind) = &bs_rr[0].msg else {
        panic!("expected establish indication, got {}", bs_rr[0].msg);
    };
    assert_eq!(ind.l3_info, Some(vec![0x06, 0x27, 0x07]));
    assert!(matches!(bs_rr[1].msg, SapMsgInner::RllEstablishConf(_)));

    // Two messages each way with a window of one
    ms.submit_rll(SapMsgInner::RllDataReq(RllDataReq { chan_nr, link_id, l3_info: vec![0x05, 0x24, 0x11] }));
    ms.submit_rll(SapMsgInner::RllDataReq(RllDataReq { chan_nr, link_id, l3_info: vec![0x05, 0x24, 0x12] }));
    bs.submit_rll(SapMsgInner::RllDataReq(RllDataReq { chan_nr, link_id, l3_info: vec![0x05, 0x12, 0x01] }));
    bs.submit_rll(SapMsgInner::RllDataReq(RllDataReq { chan_nr, link_id, l3_info: vec![0x05, 0x12, 0x02] }));
    exchange(&mut ms, &mut bs, 6);

    let received = |msgs: Vec<gsm_saps::SapMsg>| -> Vec<Vec<u8>> {
        msgs.into_iter()
            .filter_map(|m| match m.msg {
                SapMsgInner::RllDataInd(ind) => Some(ind.l3_info),
                _ => None,
            })
            .collect()
    };
    let ms_rr = ms.dump_sink(GsmEntity::Rr);
    let bs_rr = bs.dump_sink(GsmEntity::Rr);
    assert_eq!(ms_rr.iter().filter(|m| matches!(m.msg, SapMsgInner::RllDataConf(_))).count(), 2);
    assert_eq!(bs_rr.iter().filter(|m| matches!(m.msg, SapMsgInner::RllDataConf(_))).count(), 2);
    assert_eq!(received(bs_rr), vec![vec![0x05, 0x24, 0x11], vec![0x05, 0x24, 0x12]]);
    assert_eq!(received(ms_rr), vec![vec![0x05, 0x12, 0x01], vec![0x05, 0x12, 0x02]]);

    ms.submit_rll(SapMsgInner::RllReleaseReq(RllReleaseReq { chan_nr, link_id, mode: ReleaseMode::Normal }));
    exchange(&mut ms, &mut bs, 2);
    assert_eq!(names(ms.dump_sink(GsmEntity::Rr)), vec!["RllReleaseConf"]);
    let bs_rr = bs.dump_sink(GsmEntity::Rr);
    assert!(matches!(bs_rr[0].msg, SapMsgInner::RllReleaseInd(RllReleaseInd { cause: ReleaseCause::Normal, .. })));
    // Released channels are dropped on both sides
    assert_eq!(sapi0_state(&mut ms), None);
    assert_eq!(sapi0_state(&mut bs), None);
    assert_eq!(ms.lapdm().num_channels(), 0);
    assert_eq!(bs.lapdm().num_channels(), 0);
}

#[test]
fn test_lost_ack_recovered_by_timer() {
    debug::setup_logging_verbose();
    let mut ms = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    let mut bs = ComponentTest::new_lapdm(default_test_config(StackMode::Bs));
    let chan_nr = test_sdcch();
    let link_id = LinkId::new(Sapi::Normal, false);

    ms.submit_rll(SapMsgInner::RllEstablishReq(RllEstablishReq { chan_nr, link_id, l3_info: None }));
    exchange(&mut ms, &mut bs, 3);
    ms.dump_sinks();
    bs.dump_sinks();

    // I frame reaches the BS, its RR is lost
    ms.submit_rll(SapMsgInner::RllDataReq(RllDataReq { chan_nr, link_id, l3_info: vec![0x05, 0x24, 0x11] }));
    ms.run_stack(Some(1));
    forward_blocks(&mut ms, &mut bs);
    bs.run_stack(Some(1));
    bs.dump_sink(GsmEntity::Phy);
    assert_eq!(bs.dump_sink(GsmEntity::Rr).len(), 1);

    // MS polls after T200, BS answers with RR F=1 and the link recovers
    exchange(&mut ms, &mut bs, 30);
    assert_eq!(sapi0_state(&mut ms), Some(DlState::MultiFrameEstablished));
    let ms_rr = ms.dump_sink(GsmEntity::Rr);
    assert_eq!(names(ms_rr), vec!["RllDataConf"]);
    // The repeated I frame was not delivered twice
    assert!(bs.dump_sink(GsmEntity::Rr).is_empty());
}
