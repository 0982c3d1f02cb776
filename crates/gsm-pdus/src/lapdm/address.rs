use core::fmt;

use gsm_core::{PduParseErr, Sapi};

use super::enums::lpd::Lpd;

/// Clause 3.2 Address field, one octet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// 2 bits
    pub lpd: Lpd,
    /// 3 bits. Kept raw, unallocated SAPIs are rejected by the datalink layer
    pub sapi: u8,
    /// Command/response bit
    pub cr: bool,
}

impl Address {
    pub fn new(lpd: Lpd, sapi: Sapi, cr: bool) -> Self {
        Self { lpd, sapi: sapi.into_raw(), cr }
    }

    pub fn from_octet(octet: u8) -> Result<Self, PduParseErr> {
        // EA bit 0 announces a further address octet
        if octet & 0x01 == 0 {
            return Err(PduParseErr::UnsupportedFraming { field: "address_ea" });
        }
        let lpd_raw = (octet >> 5) & 0x03;
        let Ok(lpd) = Lpd::try_from(lpd_raw) else {
            return Err(PduParseErr::InvalidValue { field: "lpd", value: lpd_raw as u64 });
        };
        Ok(Address {
            lpd,
            sapi: (octet >> 2) & 0x07,
            cr: octet & 0x02 != 0,
        })
    }

    pub fn to_octet(&self) -> u8 {
        (self.lpd.into_raw() << 5) | ((self.sapi & 0x07) << 2) | ((self.cr as u8) << 1) | 0x01
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sapi={} cr={}", self.sapi, self.cr as u8)?;
        if self.lpd != Lpd::Normal {
            write!(f, " lpd={:?}", self.lpd)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_known_octets() {
        // SAPI 0 command from the network
        assert_eq!(Address::new(Lpd::Normal, Sapi::Normal, true).to_octet(), 0x03);
        // SAPI 3 response from the network
        assert_eq!(Address::new(Lpd::Normal, Sapi::Sms, false).to_octet(), 0x0d);
        assert_eq!(Address::new(Lpd::Smscb, Sapi::Normal, false).to_octet(), 0x21);
    }

    #[test]
    fn test_address_round_trip() {
        for sapi in [Sapi::Normal, Sapi::Sms] {
            for cr in [false, true] {
                let addr = Address::new(Lpd::Normal, sapi, cr);
                let decoded = Address::from_octet(addr.to_octet()).expect("Failed parsing");
                assert_eq!(decoded.sapi, sapi.into_raw());
                assert_eq!(decoded.cr, cr);
                assert_eq!(decoded, addr);
            }
        }
    }

    #[test]
    fn test_address_rejects_extension() {
        assert_eq!(Address::from_octet(0x02), Err(PduParseErr::UnsupportedFraming { field: "address_ea" }));
        assert!(matches!(Address::from_octet(0x41), Err(PduParseErr::InvalidValue { field: "lpd", .. })));
    }
}
