use core::fmt;

use gsm_core::PduParseErr;

use super::enums::s_type::SType;
use super::enums::u_cmd::UCmd;

/// Clause 3.4 Control field, one octet (modulo 8 operation only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Information transfer. `p` is the poll bit
    I { ns: u8, nr: u8, p: bool },
    /// Supervisory
    S { stype: SType, nr: u8, pf: bool },
    /// Unnumbered
    U { cmd: UCmd, pf: bool },
}

impl Control {
    pub fn from_octet(octet: u8) -> Result<Self, PduParseErr> {
        let pf = octet & 0x10 != 0;
        let nr = octet >> 5;

        if octet & 0x01 == 0 {
            return Ok(Control::I { ns: (octet >> 1) & 0x07, nr, p: pf });
        }

        if octet & 0x03 == 0x01 {
            let raw = (octet >> 2) & 0x03;
            let Ok(stype) = SType::try_from(raw) else {
                return Err(PduParseErr::NotImplemented { field: Some("s_type") });
            };
            return Ok(Control::S { stype, nr, pf });
        }

        let raw = ((octet & 0x0c) >> 2) | ((octet & 0xe0) >> 3);
        let Ok(cmd) = UCmd::try_from(raw) else {
            tracing::debug!("unknown U frame code 0x{:02x}", raw);
            return Err(PduParseErr::NotImplemented { field: Some("u_cmd") });
        };
        Ok(Control::U { cmd, pf })
    }

    pub fn to_octet(&self) -> u8 {
        match *self {
            Control::I { ns, nr, p } => ((nr & 7) << 5) | ((p as u8) << 4) | ((ns & 7) << 1),
            Control::S { stype, nr, pf } => ((nr & 7) << 5) | ((pf as u8) << 4) | (stype.into_raw() << 2) | 0x01,
            Control::U { cmd, pf } => {
                let u = cmd.into_raw();
                ((u & 0x1c) << 3) | ((pf as u8) << 4) | ((u & 0x03) << 2) | 0x03
            }
        }
    }

    /// Poll or final bit, whichever applies
    pub fn pf(&self) -> bool {
        match *self {
            Control::I { p, .. } => p,
            Control::S { pf, .. } | Control::U { pf, .. } => pf,
        }
    }

    pub fn is_ui(&self) -> bool {
        matches!(self, Control::U { cmd: UCmd::Ui, .. })
    }

    /// DISC and DM, which never carry information
    pub fn is_disc_or_dm(&self) -> bool {
        matches!(self, Control::U { cmd: UCmd::Disc | UCmd::Dm, .. })
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::I { ns, nr, p } => write!(f, "I ns={} nr={} p={}", ns, nr, *p as u8),
            Control::S { stype, nr, pf } => write!(f, "{} nr={} pf={}", stype, nr, *pf as u8),
            Control::U { cmd, pf } => write!(f, "{} pf={}", cmd, *pf as u8),
        }
    }
}
