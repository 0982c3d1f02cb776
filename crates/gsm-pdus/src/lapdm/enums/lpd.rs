/// Clause 3.3.5 Link protocol discriminator
/// Bits: 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lpd {
    Normal = 0,
    /// SMS cell broadcast
    Smscb = 1,
}

impl std::convert::TryFrom<u8> for Lpd {
    type Error = ();
    fn try_from(x: u8) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(Lpd::Normal),
            1 => Ok(Lpd::Smscb),
            _ => Err(()),
        }
    }
}

impl Lpd {
    pub fn into_raw(self) -> u8 {
        self as u8
    }
}
