/// TS 04.06 clause 2.1 frame formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Fill frames on dedicated channels, no information field
    A,
    /// Address, control and length octets followed by information
    B,
    /// No header at all, used on BCCH and PCH/AGCH
    Bbis,
    /// Short header variant, only address and control
    Bter,
    /// SACCH unnumbered information without length octet
    B4,
}

impl core::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameFormat::A => write!(f, "A"),
            FrameFormat::B => write!(f, "B"),
            FrameFormat::Bbis => write!(f, "Bbis"),
            FrameFormat::Bter => write!(f, "Bter"),
            FrameFormat::B4 => write!(f, "B4"),
        }
    }
}
