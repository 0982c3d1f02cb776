mod common;

use gsm_config::StackMode;
use gsm_core::gsm_entities::GsmEntity;
use gsm_core::{GsmTime, LinkId, Sap, Sapi, debug};
use gsm_saps::control::{LinkStatus, LinkStatusInd};
use gsm_saps::ph::{PhRachConf, PhSacchHeaderReq, SacchL1Header};
use gsm_saps::rll::*;
use gsm_saps::sapmsg::SapMsgInner;
use common::component_test::{block, ph_blocks, test_sdcch};
use common::{ComponentTest, default_test_config};

fn names(msgs: &[gsm_saps::SapMsg]) -> Vec<String> {
    msgs.iter().map(|m| m.msg.to_string()).collect()
}

#[test]
fn test_establish_exchange_release() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    let chan_nr = test_sdcch();
    let link_id = LinkId::new(Sapi::Normal, false);

    // Establish with contention resolution
    test.submit_rll(SapMsgInner::RllEstablishReq(RllEstablishReq { chan_nr, link_id, l3_info: Some(vec![0x06, 0x27, 0x07]) }));
    test.run_stack(Some(1));
    let blocks = ph_blocks(&test.dump_sink(GsmEntity::Phy));
    assert_eq!(blocks, vec![block(&[0x01, 0x3f, 0x0d, 0x06, 0x27, 0x07], 0x00)]);

    // UA from BS echoes the information
    test.submit_block(chan_nr, false, block(&[0x01, 0x73, 0x0d, 0x06, 0x27, 0x07], 0x2b));
    test.run_stack(Some(1));
    let rr = test.dump_sink(GsmEntity::Rr);
    assert_eq!(names(&rr), vec!["RllEstablishConf"]);
    assert_eq!(rr[0].sap, Sap::RllSap);
    let mm = test.dump_sink(GsmEntity::Mm);
    assert_eq!(mm.len(), 1);
    assert!(matches!(mm[0].msg, SapMsgInner::LinkStatusInd(LinkStatusInd { status: LinkStatus::Established, .. })));

    // Send one I frame
    test.submit_rll(SapMsgInner::RllDataReq(RllDataReq { chan_nr, link_id, l3_info: vec![0x05, 0x08, 0x11] }));
    test.run_stack(Some(1));
    let blocks = ph_blocks(&test.dump_sink(GsmEntity::Phy));
    assert_eq!(blocks, vec![block(&[0x01, 0x00, 0x0d, 0x05, 0x08, 0x11], 0x00)]);

    // RR response acknowledges it
    test.submit_block(chan_nr, false, block(&[0x01, 0x21, 0x01], 0x2b));
    test.run_stack(Some(1));
    assert_eq!(names(&test.dump_sink(GsmEntity::Rr)), vec!["RllDataConf"]);

    // I frame command from BS, acknowledging ours
    test.submit_block(chan_nr, false, block(&[0x03, 0x20, 0x09, 0x06, 0x35], 0x2b));
    test.run_stack(Some(1));
    let rr = test.dump_sink(GsmEntity::Rr);
    let SapMsgInner::RllDataInd(ind) = &rr[0].msg else {
        panic!("expected data indication, got {}", rr[0].msg);
    };
    assert_eq!(ind.l3_info, vec![0x06, 0x35]);
    let blocks = ph_blocks(&test.dump_sink(GsmEntity::Phy));
    assert_eq!(blocks, vec![block(&[0x03, 0x21, 0x01], 0x00)]);

    // Release
    test.submit_rll(SapMsgInner::RllReleaseReq(RllReleaseReq { chan_nr, link_id, mode: ReleaseMode::Normal }));
    test.run_stack(Some(1));
    let blocks = ph_blocks(&test.dump_sink(GsmEntity::Phy));
    assert_eq!(blocks, vec![block(&[0x01, 0x53, 0x01], 0x00)]);
    test.submit_block(chan_nr, false, block(&[0x01, 0x73, 0x01], 0x2b));
    test.run_stack(Some(1));
    assert_eq!(names(&test.dump_sink(GsmEntity::Rr)), vec!["RllReleaseConf"]);
    let mm = test.dump_sink(GsmEntity::Mm);
    assert!(matches!(mm[0].msg, SapMsgInner::LinkStatusInd(LinkStatusInd { status: LinkStatus::Released, .. })));
}

#[test]
fn test_establish_timeout() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    let chan_nr = test_sdcch();
    let link_id = LinkId::new(Sapi::Normal, false);

    test.submit_rll(SapMsgInner::RllEstablishReq(RllEstablishReq { chan_nr, link_id, l3_info: None }));

    // T200 of 100 ms is 22 frames: SABM at 0, repeated at 22, 44, 66, 88, 110, failure at 132
    test.run_stack(Some(132));
    assert_eq!(ph_blocks(&test.dump_sink(GsmEntity::Phy)).len(), 6);
    assert!(test.dump_sink(GsmEntity::Rr).is_empty());

    test.run_stack(Some(10));
    assert!(ph_blocks(&test.dump_sink(GsmEntity::Phy)).is_empty());
    let rr = test.dump_sink(GsmEntity::Rr);
    assert_eq!(names(&rr), vec!["RllErrorInd", "RllReleaseInd"]);
    assert!(matches!(rr[0].msg, SapMsgInner::RllErrorInd(RllErrorInd { cause: RllCause::T200Expired, .. })));
    assert!(matches!(rr[1].msg, SapMsgInner::RllReleaseInd(RllReleaseInd { cause: ReleaseCause::Timeout, .. })));
}

#[test]
fn test_sacch_system_information() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    let chan_nr = test_sdcch();

    // B4 UI from BS: L1 header, address, control, 19 octets
    let mut data = vec![0x0f, 0x03, 0x03, 0x03, 0x49, 0x06, 0x1d];
    data.resize(23, 0x2b);
    test.submit_block(chan_nr, true, data);
    test.run_stack(Some(1));

    let rr = test.dump_sink(GsmEntity::Rr);
    assert_eq!(rr.len(), 1);
    let SapMsgInner::RllUnitDataInd(ind) = &rr[0].msg else {
        panic!("expected unit data indication, got {}", rr[0].msg);
    };
    assert_eq!(ind.l3_info.len(), 19);
    assert_eq!(&ind.l3_info[..3], &[0x49, 0x06, 0x1d]);
    assert_eq!(ind.sacch_header, Some(SacchL1Header { ms_power: 0x0f, timing_advance: 0x03 }));
    assert!(ind.link_id.is_acch());
}

#[test]
fn test_sacch_uplink_keeps_length_octet() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    let chan_nr = test_sdcch();
    let link_id = LinkId::new(Sapi::Normal, true);

    let header = SacchL1Header { ms_power: 5, timing_advance: 7 };
    test.submit_message(gsm_saps::SapMsg::new(
        Sap::PhSap,
        GsmEntity::Phy,
        GsmEntity::Lapdm,
        test.now(),
        SapMsgInner::PhSacchHeaderReq(PhSacchHeaderReq { chan_nr, header }),
    ));
    // Measurement report
    test.submit_rll(SapMsgInner::RllUnitDataReq(RllUnitDataReq { chan_nr, link_id, l3_info: vec![0x06, 0x15, 0x3f] }));
    test.run_stack(Some(1));

    let blocks = ph_blocks(&test.dump_sink(GsmEntity::Phy));
    assert_eq!(blocks, vec![block(&[0x05, 0x07, 0x01, 0x03, 0x0d, 0x06, 0x15, 0x3f], 0x00)]);
    assert_eq!(names(&test.dump_sink(GsmEntity::Rr)), vec!["RllUnitDataConf"]);
}

#[test]
fn test_broadcast_block() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    let bcch = gsm_core::ChanNr::new(gsm_core::ChanKind::Bcch, 0);
    let data = block(&[0x55, 0x06, 0x19, 0x8f], 0x2b);
    test.submit_block(bcch, false, data.clone());
    test.run_stack(Some(1));

    let rr = test.dump_sink(GsmEntity::Rr);
    let SapMsgInner::RllUnitDataInd(ind) = &rr[0].msg else {
        panic!("expected unit data indication, got {}", rr[0].msg);
    };
    assert_eq!(ind.l3_info, data);
    assert_eq!(ind.sacch_header, None);
}

#[test]
fn test_fill_frames_are_silent() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));
    // UI with length 0, as sent on idle dedicated channels
    test.submit_block(test_sdcch(), false, block(&[0x03, 0x03, 0x01], 0x2b));
    test.run_stack(Some(1));
    assert!(test.dump_sinks().is_empty());
}

#[test]
fn test_rach_request_and_confirmation() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new_lapdm(default_test_config(StackMode::Ms));

    test.submit_rll(SapMsgInner::RllRachReq(RllRachReq { ra: 0x83, offset: 12, combined_ccch: true, access_delay: 3, ms_power: 5 }));
    test.run_stack(Some(1));
    let phy = test.dump_sink(GsmEntity::Phy);
    assert_eq!(phy.len(), 1);
    assert_eq!(phy[0].sap, Sap::PhSap);
    let SapMsgInner::PhRachReq(req) = &phy[0].msg else {
        panic!("expected RACH request, got {}", phy[0].msg);
    };
    assert_eq!((req.ra, req.offset, req.combined_ccch, req.ta, req.tx_power), (0x83, 12, true, -3, 5));

    // Burst sent at T1 = 33, T2 = 18, T3 = 0
    let fn_tx = GsmTime::new(33 * 1326 + 408);
    test.submit_ph(SapMsgInner::PhRachConf(PhRachConf { fn_tx }));
    test.run_stack(Some(1));
    let rr = test.dump_sink(GsmEntity::Rr);
    assert_eq!(rr.len(), 1);
    let SapMsgInner::RllChanConf(conf) = &rr[0].msg else {
        panic!("expected channel confirmation, got {}", rr[0].msg);
    };
    assert_eq!(conf.req_ref, RequestRef { ra: 0x83, t1: 1, t2: 18, t3: 0 });

    // A second confirmation has no request to refer to
    test.submit_ph(SapMsgInner::PhRachConf(PhRachConf { fn_tx }));
    test.run_stack(Some(1));
    assert!(test.dump_sinks().is_empty());
    assert_eq!(test.lapdm().num_channels(), 0);
}
