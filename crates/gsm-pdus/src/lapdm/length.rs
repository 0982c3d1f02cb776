use core::fmt;

use gsm_core::PduParseErr;

/// Clause 3.6 Length indicator field, one octet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthInd {
    /// 6 bits
    pub len: u8,
    /// More data follows in a subsequent frame
    pub more: bool,
    /// Extension bit, 0 would announce a second length octet
    pub el: bool,
}

impl LengthInd {
    pub fn new(len: usize) -> Self {
        Self { len: (len & 0x3f) as u8, more: false, el: true }
    }

    /// Splits the octet into its fields without judging them
    pub fn from_raw(octet: u8) -> Self {
        Self {
            len: octet >> 2,
            more: octet & 0x02 != 0,
            el: octet & 0x01 != 0,
        }
    }

    /// Refuses a second length octet
    pub fn check_el(self) -> Result<Self, PduParseErr> {
        if !self.el {
            return Err(PduParseErr::UnsupportedFraming { field: "length_el" });
        }
        Ok(self)
    }

    /// Refuses segmented messages
    pub fn check_more(self) -> Result<Self, PduParseErr> {
        if self.more {
            return Err(PduParseErr::UnsupportedFraming { field: "length_m" });
        }
        Ok(self)
    }

    pub fn to_octet(&self) -> u8 {
        (self.len << 2) | ((self.more as u8) << 1) | (self.el as u8)
    }
}

impl fmt::Display for LengthInd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "len={}", self.len)?;
        if self.more {
            write!(f, " M")?;
        }
        if !self.el {
            write!(f, " EL=0")?;
        }
        Ok(())
    }
}
