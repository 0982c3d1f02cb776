/// Clause 3.8.4 Unnumbered command/response codes, as the 5-bit value made of
/// control bits 8..6 (high) and 4..3 (low)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UCmd {
    /// Unnumbered information
    Ui = 0x00,
    /// Disconnected mode
    Dm = 0x03,
    /// Set asynchronous balanced mode
    Sabm = 0x07,
    /// Disconnect
    Disc = 0x08,
    /// Unnumbered acknowledgement
    Ua = 0x0c,
}

impl std::convert::TryFrom<u8> for UCmd {
    type Error = ();
    fn try_from(x: u8) -> Result<Self, Self::Error> {
        match x {
            0x00 => Ok(UCmd::Ui),
            0x03 => Ok(UCmd::Dm),
            0x07 => Ok(UCmd::Sabm),
            0x08 => Ok(UCmd::Disc),
            0x0c => Ok(UCmd::Ua),
            _ => Err(()),
        }
    }
}

impl UCmd {
    pub fn into_raw(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for UCmd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UCmd::Ui => write!(f, "UI"),
            UCmd::Dm => write!(f, "DM"),
            UCmd::Sabm => write!(f, "SABM"),
            UCmd::Disc => write!(f, "DISC"),
            UCmd::Ua => write!(f, "UA"),
        }
    }
}
