use super::enums::frame_format::FrameFormat;

/// Length of one LAPDm block on a dedicated or common channel
pub const LAPDM_BLOCK_LEN: usize = 23;
/// MS power and timing advance octets in front of every SACCH block
pub const SACCH_L1_HEADER_LEN: usize = 2;

/// Clause 5.8.3 maximum number of octets in an information field
pub const N201_AB_SACCH: usize = 18;
pub const N201_AB_SDCCH: usize = 20;
pub const N201_AB_FACCH: usize = 20;
pub const N201_BBIS: usize = 23;
pub const N201_BTER_SACCH: usize = 21;
pub const N201_BTER_SDCCH: usize = 23;
pub const N201_BTER_FACCH: usize = 23;
pub const N201_B4: usize = 19;

/// Information field limit for a frame format, `acch` selecting SACCH
pub fn n201(format: FrameFormat, acch: bool) -> usize {
    match (format, acch) {
        (FrameFormat::A, true) | (FrameFormat::B, true) => N201_AB_SACCH,
        (FrameFormat::A, false) | (FrameFormat::B, false) => N201_AB_SDCCH,
        (FrameFormat::Bbis, _) => N201_BBIS,
        (FrameFormat::Bter, true) => N201_BTER_SACCH,
        (FrameFormat::Bter, false) => N201_BTER_SDCCH,
        (FrameFormat::B4, _) => N201_B4,
    }
}
