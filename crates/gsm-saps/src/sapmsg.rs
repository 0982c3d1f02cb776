use core::fmt::Display;

use gsm_core::GsmTime;
use gsm_core::Sap;
use gsm_core::gsm_entities::GsmEntity;

use crate::control::LinkStatusInd;

use super::ph::*;
use super::rll::*;

/// Exhaustive list of primitives that can be carried in a SapMsg
#[derive(Debug)]
pub enum SapMsgInner {
    // PH-SAP
    PhDataInd(PhDataInd),
    PhDataReq(PhDataReq),
    PhSacchHeaderReq(PhSacchHeaderReq),
    PhRtsInd(PhRtsInd),
    PhEmptyFrameReq(PhEmptyFrameReq),
    PhRachReq(PhRachReq),
    PhRachInd(PhRachInd),
    PhRachConf(PhRachConf),

    // RLL-SAP, layer 3 -> LAPDm
    RllEstablishReq(RllEstablishReq),
    RllReleaseReq(RllReleaseReq),
    RllDataReq(RllDataReq),
    RllUnitDataReq(RllUnitDataReq),
    RllSuspendReq(RllSuspendReq),
    RllResumeReq(RllResumeReq),
    RllRachReq(RllRachReq),

    // RLL-SAP, LAPDm -> layer 3
    RllEstablishConf(RllEstablishConf),
    RllEstablishInd(RllEstablishInd),
    RllReleaseConf(RllReleaseConf),
    RllReleaseInd(RllReleaseInd),
    RllDataInd(RllDataInd),
    RllDataConf(RllDataConf),
    RllUnitDataInd(RllUnitDataInd),
    RllUnitDataConf(RllUnitDataConf),
    RllSuspendConf(RllSuspendConf),
    RllErrorInd(RllErrorInd),
    RllChanRqd(RllChanRqd),
    RllChanConf(RllChanConf),

    // Control
    LinkStatusInd(LinkStatusInd),
}

impl Display for SapMsgInner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            // PH-SAP
            SapMsgInner::PhDataInd(_) => write!(f, "PhDataInd"),
            SapMsgInner::PhDataReq(_) => write!(f, "PhDataReq"),
            SapMsgInner::PhSacchHeaderReq(_) => write!(f, "PhSacchHeaderReq"),
            SapMsgInner::PhRtsInd(_) => write!(f, "PhRtsInd"),
            SapMsgInner::PhEmptyFrameReq(_) => write!(f, "PhEmptyFrameReq"),
            SapMsgInner::PhRachReq(_) => write!(f, "PhRachReq"),
            SapMsgInner::PhRachInd(_) => write!(f, "PhRachInd"),
            SapMsgInner::PhRachConf(_) => write!(f, "PhRachConf"),

            // RLL-SAP
            SapMsgInner::RllEstablishReq(_) => write!(f, "RllEstablishReq"),
            SapMsgInner::RllReleaseReq(_) => write!(f, "RllReleaseReq"),
            SapMsgInner::RllDataReq(_) => write!(f, "RllDataReq"),
            SapMsgInner::RllUnitDataReq(_) => write!(f, "RllUnitDataReq"),
            SapMsgInner::RllSuspendReq(_) => write!(f, "RllSuspendReq"),
            SapMsgInner::RllResumeReq(_) => write!(f, "RllResumeReq"),
            SapMsgInner::RllRachReq(_) => write!(f, "RllRachReq"),
            SapMsgInner::RllEstablishConf(_) => write!(f, "RllEstablishConf"),
            SapMsgInner::RllEstablishInd(_) => write!(f, "RllEstablishInd"),
            SapMsgInner::RllReleaseConf(_) => write!(f, "RllReleaseConf"),
            SapMsgInner::RllReleaseInd(_) => write!(f, "RllReleaseInd"),
            SapMsgInner::RllDataInd(_) => write!(f, "RllDataInd"),
            SapMsgInner::RllDataConf(_) => write!(f, "RllDataConf"),
            SapMsgInner::RllUnitDataInd(_) => write!(f, "RllUnitDataInd"),
            SapMsgInner::RllUnitDataConf(_) => write!(f, "RllUnitDataConf"),
            SapMsgInner::RllSuspendConf(_) => write!(f, "RllSuspendConf"),
            SapMsgInner::RllErrorInd(_) => write!(f, "RllErrorInd"),
            SapMsgInner::RllChanRqd(_) => write!(f, "RllChanRqd"),
            SapMsgInner::RllChanConf(_) => write!(f, "RllChanConf"),

            // Control
            SapMsgInner::LinkStatusInd(_) => write!(f, "LinkStatusInd"),
        }
    }
}

#[derive(Debug)]
pub struct SapMsg {
    pub sap: Sap,
    pub src: GsmEntity,
    pub dest: GsmEntity,
    /// Frame number at the time the message was created
    pub time: GsmTime,

    pub msg: SapMsgInner
}

impl SapMsg {
    pub fn new(
        sap: Sap,
        src: GsmEntity,
        dest: GsmEntity,
        t_submit: GsmTime,
        msg: SapMsgInner
    ) -> Self {
        Self {
            sap,
            src,
            dest,
            time: t_submit,
            msg
        }
    }

    pub fn get_source(&self) -> &GsmEntity {
        &self.src
    }
    pub fn get_dest(&self) -> &GsmEntity {
        &self.dest
    }
    pub fn get_sap(&self) -> &Sap {
        &self.sap
    }
}
