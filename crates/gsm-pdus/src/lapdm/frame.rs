use core::fmt;

use gsm_core::octet_buffer::dump_hex;
use gsm_core::{OctetBuffer, PduParseErr, let_octet};

use super::address::Address;
use super::control::Control;
use super::length::LengthInd;

/// One LAPDm frame of format B or B4, without L1 header and fill octets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LapdmFrame {
    pub addr: Address,
    pub ctrl: Control,
    /// Absent for B4 frames, which carry no length octet
    pub length: Option<LengthInd>,
    pub info: Vec<u8>,
}

impl LapdmFrame {
    /// Format B frame, length octet derived from the information field
    pub fn new(addr: Address, ctrl: Control, info: Vec<u8>) -> Self {
        Self { addr, ctrl, length: Some(LengthInd::new(info.len())), info }
    }

    /// Format B4 frame (SACCH UI without length octet)
    pub fn new_b4(addr: Address, ctrl: Control, info: Vec<u8>) -> Self {
        Self { addr, ctrl, length: None, info }
    }

    /// Parses the frame header. When `b4_ui` is set, a UI frame is taken to have
    /// no length octet and the rest of the block is its information field.
    /// A length octet with EL=0 or M=1 fails with `UnsupportedFraming`, except
    /// that DISC and DM keep their M bit for the datalink to judge. An announced
    /// length beyond the block yields a shorter `info`, which the datalink
    /// detects against `announced_len`
    pub fn from_bytes(data: &[u8], b4_ui: bool) -> Result<Self, PduParseErr> {
        let mut buf = OctetBuffer::new(data);

        let_octet!(buf, address);
        let addr = Address::from_octet(address)?;
        let_octet!(buf, control);
        let ctrl = Control::from_octet(control)?;

        if b4_ui && ctrl.is_ui() {
            let info = buf.remaining().to_vec();
            return Ok(Self::new_b4(addr, ctrl, info));
        }

        let_octet!(buf, length);
        let length = LengthInd::from_raw(length).check_el()?;
        let length = if ctrl.is_disc_or_dm() { length } else { length.check_more()? };
        let avail = buf.get_len_remaining().min(length.len as usize);
        let info = buf.read_slice(avail, "info")?.to_vec();

        Ok(Self { addr, ctrl, length: Some(length), info })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + self.info.len());
        out.push(self.addr.to_octet());
        out.push(self.ctrl.to_octet());
        if let Some(length) = self.length {
            out.push(length.to_octet());
        }
        out.extend_from_slice(&self.info);
        out
    }

    /// Length given by the length octet, or the information length for B4
    pub fn announced_len(&self) -> usize {
        match self.length {
            Some(length) => length.len as usize,
            None => self.info.len(),
        }
    }

    pub fn more(&self) -> bool {
        self.length.is_some_and(|l| l.more)
    }
}

impl fmt::Display for LapdmFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ctrl, self.addr)?;
        match self.length {
            Some(length) => write!(f, " {}", length)?,
            None => write!(f, " B4")?,
        }
        if !self.info.is_empty() {
            write!(f, " info={}", dump_hex(&self.info))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gsm_core::Sapi;

    use super::*;
    use crate::lapdm::enums::lpd::Lpd;
    use crate::lapdm::enums::s_type::SType;
    use crate::lapdm::enums::u_cmd::UCmd;

    #[test]
    fn test_parse_sabm_with_info() {
        // SABM P=1 from the MS carrying a 3 octet paging response, padded
        let mut block = vec![0x01, 0x3f, 0x0d, 0x06, 0x27, 0x07];
        block.resize(23, 0x2b);
        let frame = LapdmFrame::from_bytes(&block, false).expect("Failed parsing");
        assert_eq!(frame.addr, Address::new(Lpd::Normal, Sapi::Normal, false));
        assert_eq!(frame.ctrl, Control::U { cmd: UCmd::Sabm, pf: true });
        assert_eq!(frame.announced_len(), 3);
        assert_eq!(frame.info, vec![0x06, 0x27, 0x07]);
        assert_eq!(frame.to_bytes(), block[..6].to_vec());
    }

    #[test]
    fn test_build_i_frame() {
        let addr = Address::new(Lpd::Normal, Sapi::Normal, false);
        let frame = LapdmFrame::new(addr, Control::I { ns: 0, nr: 0, p: false }, vec![1, 2, 3]);
        assert_eq!(frame.to_bytes(), vec![0x01, 0x00, 0x0d, 1, 2, 3]);
    }

    #[test]
    fn test_parse_b4_ui() {
        let mut block = vec![0x03, 0x03];
        block.extend_from_slice(&[0x49; 19]);
        let frame = LapdmFrame::from_bytes(&block, true).expect("Failed parsing");
        assert!(frame.length.is_none());
        assert_eq!(frame.info.len(), 19);

        // Not UI: the length octet is still present on SACCH
        let block = [0x03, 0x21, 0x01];
        let frame = LapdmFrame::from_bytes(&block, true).expect("Failed parsing");
        assert_eq!(frame.ctrl, Control::S { stype: SType::Rr, nr: 1, pf: false });
        assert_eq!(frame.length, Some(LengthInd::new(0)));
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(LapdmFrame::from_bytes(&[0x01], false), Err(PduParseErr::BufferEnded { field: Some("control") }));
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x3f], false), Err(PduParseErr::BufferEnded { field: Some("length") }));

        // Announced length beyond the block
        let frame = LapdmFrame::from_bytes(&[0x01, 0x00, 0xfd, 0xaa], false).expect("Failed parsing");
        assert_eq!(frame.announced_len(), 63);
        assert_eq!(frame.info, vec![0xaa]);
    }

    #[test]
    fn test_parse_length_extension_and_more() {
        let el0 = PduParseErr::UnsupportedFraming { field: "length_el" };
        let more = PduParseErr::UnsupportedFraming { field: "length_m" };

        // EL=0 is refused whatever the frame type: RR, DISC, DM, UI
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x21, 0x00], false), Err(el0.clone()));
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x53, 0x00], false), Err(el0.clone()));
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x1f, 0x00], false), Err(el0.clone()));
        assert_eq!(LapdmFrame::from_bytes(&[0x03, 0x03, 0x04, 0x01], false), Err(el0));

        // Segmentation on UI, SABM, UA, RR and I
        assert_eq!(LapdmFrame::from_bytes(&[0x03, 0x03, 0x07, 0x01], false), Err(more.clone()));
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x3f, 0x07, 0x01], false), Err(more.clone()));
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x73, 0x07, 0x01], false), Err(more.clone()));
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x21, 0x03], false), Err(more.clone()));
        assert_eq!(LapdmFrame::from_bytes(&[0x01, 0x00, 0x07, 0x01], false), Err(more));

        // DISC with M=1 still parses
        let frame = LapdmFrame::from_bytes(&[0x01, 0x53, 0x03], false).expect("Failed parsing");
        assert_eq!(frame.ctrl, Control::U { cmd: UCmd::Disc, pf: true });
        assert!(frame.more());
    }
}
