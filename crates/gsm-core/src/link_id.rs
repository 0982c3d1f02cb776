use core::fmt;

/// Service access point identifier carried in the LAPDm address field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Sapi {
    /// Call control, mobility management and radio resource signalling
    Normal = 0,
    /// Short message service
    Sms = 3,
}

impl std::convert::TryFrom<u8> for Sapi {
    type Error = ();
    fn try_from(x: u8) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(Sapi::Normal),
            3 => Ok(Sapi::Sms),
            _ => Err(()),
        }
    }
}

impl Sapi {
    pub fn into_raw(self) -> u8 {
        self as u8
    }

    /// Slot in the per-entity datalink table
    pub fn index(self) -> usize {
        match self {
            Sapi::Normal => 0,
            Sapi::Sms => 1,
        }
    }
}

impl fmt::Display for Sapi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SAPI{}", self.into_raw())
    }
}

/// RSL link identifier. Bits 2:0 carry the SAPI, bit 6 flags the associated
/// control channel (SACCH) as opposed to the main channel
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LinkId(pub u8);

impl LinkId {
    pub const ACCH_FLAG: u8 = 0x40;

    pub fn new(sapi: Sapi, acch: bool) -> Self {
        let flag = if acch { Self::ACCH_FLAG } else { 0 };
        LinkId(flag | sapi.into_raw())
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn is_acch(self) -> bool {
        self.0 & Self::ACCH_FLAG != 0
    }

    pub fn sapi_raw(self) -> u8 {
        self.0 & 0x07
    }

    /// Returns the SAPI, or the raw value if no datalink exists for it
    pub fn sapi(self) -> Result<Sapi, u8> {
        Sapi::try_from(self.sapi_raw()).map_err(|_| self.sapi_raw())
    }

    /// Same channel flag, different SAPI
    pub fn with_sapi(self, sapi: Sapi) -> Self {
        LinkId((self.0 & !0x07) | sapi.into_raw())
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chan = if self.is_acch() { "ACCH" } else { "DCCH" };
        write!(f, "{} SAPI{}", chan, self.sapi_raw())
    }
}

impl fmt::Debug for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkId(0x{:02x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_id_fields() {
        let link_id = LinkId::new(Sapi::Sms, true);
        assert_eq!(link_id.raw(), 0x43);
        assert!(link_id.is_acch());
        assert_eq!(link_id.sapi(), Ok(Sapi::Sms));
        assert_eq!(link_id.with_sapi(Sapi::Normal).raw(), 0x40);
        assert_eq!(format!("{}", link_id), "ACCH SAPI3");

        assert_eq!(LinkId(0x05).sapi(), Err(5));
        assert!(!LinkId(0x05).is_acch());
    }
}
