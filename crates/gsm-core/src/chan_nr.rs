use core::fmt;

/// Channel category as carried in the upper five bits of an RSL channel number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanKind {
    /// Full-rate traffic channel with its ACCHs
    TchF,
    /// Half-rate traffic channel, subchannel 0 or 1
    TchH { subslot: u8 },
    /// SDCCH/4, subchannel 0 to 3
    Sdcch4 { subslot: u8 },
    /// SDCCH/8, subchannel 0 to 7
    Sdcch8 { subslot: u8 },
    Bcch,
    Rach,
    PchAgch,
    Unknown { cbits: u8 },
}

/// RSL channel number. Low 3 bits are the timeslot, upper 5 bits (cbits) the category
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChanNr(pub u8);

impl ChanNr {
    pub fn new(kind: ChanKind, tn: u8) -> Self {
        let cbits = match kind {
            ChanKind::TchF => 0x01,
            ChanKind::TchH { subslot } => 0x02 | (subslot & 0x01),
            ChanKind::Sdcch4 { subslot } => 0x04 | (subslot & 0x03),
            ChanKind::Sdcch8 { subslot } => 0x08 | (subslot & 0x07),
            ChanKind::Bcch => 0x10,
            ChanKind::Rach => 0x11,
            ChanKind::PchAgch => 0x12,
            ChanKind::Unknown { cbits } => cbits & 0x1f,
        };
        ChanNr((cbits << 3) | (tn & 0x07))
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn cbits(self) -> u8 {
        self.0 >> 3
    }

    /// Timeslot number
    pub fn tn(self) -> u8 {
        self.0 & 0x07
    }

    pub fn kind(self) -> ChanKind {
        let cbits = self.cbits();
        match cbits {
            0x01 => ChanKind::TchF,
            0x02..=0x03 => ChanKind::TchH { subslot: cbits & 0x01 },
            0x04..=0x07 => ChanKind::Sdcch4 { subslot: cbits & 0x03 },
            0x08..=0x0f => ChanKind::Sdcch8 { subslot: cbits & 0x07 },
            0x10 => ChanKind::Bcch,
            0x11 => ChanKind::Rach,
            0x12 => ChanKind::PchAgch,
            _ => ChanKind::Unknown { cbits },
        }
    }

    /// BCCH and PCH/AGCH carry raw L3 without a LAPDm header
    pub fn is_broadcast(self) -> bool {
        matches!(self.kind(), ChanKind::Bcch | ChanKind::PchAgch)
    }
}

impl fmt::Display for ChanNr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tn = self.tn();
        match self.kind() {
            ChanKind::TchF => write!(f, "TCH/F on TS{}", tn),
            ChanKind::TchH { subslot } => write!(f, "TCH/H({}) on TS{}", subslot, tn),
            ChanKind::Sdcch4 { subslot } => write!(f, "SDCCH/4({}) on TS{}", subslot, tn),
            ChanKind::Sdcch8 { subslot } => write!(f, "SDCCH/8({}) on TS{}", subslot, tn),
            ChanKind::Bcch => write!(f, "BCCH on TS{}", tn),
            ChanKind::Rach => write!(f, "RACH on TS{}", tn),
            ChanKind::PchAgch => write!(f, "PCH/AGCH on TS{}", tn),
            ChanKind::Unknown { .. } => write!(f, "UNKNOWN on TS{}", tn),
        }
    }
}

impl fmt::Debug for ChanNr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChanNr(0x{:02x} {})", self.0, self)
    }
}
