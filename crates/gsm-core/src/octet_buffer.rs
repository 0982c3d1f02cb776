use crate::pdu_parse_error::PduParseErr;

/// Read cursor over an octet-aligned block, such as a LAPDm frame
#[derive(Debug, Clone)]
pub struct OctetBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> OctetBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn peek_octet(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_octet(&mut self) -> Option<u8> {
        let octet = self.peek_octet()?;
        self.pos += 1;
        Some(octet)
    }

    /// Reads one octet, attaching the field name to the error if the buffer ended
    pub fn read_field(&mut self, field: &'static str) -> Result<u8, PduParseErr> {
        self.read_octet().ok_or(PduParseErr::BufferEnded { field: Some(field) })
    }

    /// Reads `len` octets as a slice borrowed from the underlying block
    pub fn read_slice(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], PduParseErr> {
        if self.get_len_remaining() < len {
            return Err(PduParseErr::BufferEnded { field: Some(field) });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize, field: &'static str) -> Result<(), PduParseErr> {
        self.read_slice(len, field).map(|_| ())
    }

    /// Everything not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn get_pos(&self) -> usize {
        self.pos
    }

    pub fn get_len(&self) -> usize {
        self.data.len()
    }

    pub fn get_len_remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Dump the unread part as an uppercase hex string without separators
    pub fn dump_hex(&self) -> String {
        dump_hex(self.remaining())
    }
}

pub fn dump_hex(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for octet in data {
        s.push_str(&format!("{:02X}", octet));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_exhaust() {
        let block = [0x01, 0x3f, 0x05, 0xaa, 0xbb];
        let mut buf = OctetBuffer::new(&block);
        assert_eq!(buf.read_field("address"), Ok(0x01));
        assert_eq!(buf.peek_octet(), Some(0x3f));
        buf.skip(2, "header").expect("two octets left");
        assert_eq!(buf.get_pos(), 3);
        assert_eq!(buf.dump_hex(), "AABB");
        assert_eq!(buf.read_slice(2, "payload"), Ok(&block[3..5]));
        assert_eq!(buf.get_len_remaining(), 0);
        assert_eq!(buf.read_field("length"), Err(PduParseErr::BufferEnded { field: Some("length") }));
    }

    #[test]
    fn test_read_slice_too_long() {
        let block = [0x00, 0x01];
        let mut buf = OctetBuffer::new(&block);
        assert!(buf.read_slice(3, "payload").is_err());
        // A failed read does not move the cursor
        assert_eq!(buf.get_pos(), 0);
    }
}
