/// Clause 3.8.4 Supervisory function bits
/// Bits: 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SType {
    /// Receive ready
    Rr = 0,
    /// Receive not ready
    Rnr = 1,
    /// Reject
    Rej = 2,
}

impl std::convert::TryFrom<u8> for SType {
    type Error = ();
    fn try_from(x: u8) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(SType::Rr),
            1 => Ok(SType::Rnr),
            2 => Ok(SType::Rej),
            _ => Err(()),
        }
    }
}

impl SType {
    pub fn into_raw(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for SType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SType::Rr => write!(f, "RR"),
            SType::Rnr => write!(f, "RNR"),
            SType::Rej => write!(f, "REJ"),
        }
    }
}
