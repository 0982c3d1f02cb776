//! Modulo 8 arithmetic on the 3-bit sequence numbers N(S), N(R) and the state variables

#[inline]
pub fn inc_mod8(x: u8) -> u8 {
    (x + 1) & 7
}

#[inline]
pub fn add_mod8(x: u8, y: u8) -> u8 {
    (x + y) & 7
}

#[inline]
pub fn sub_mod8(x: u8, y: u8) -> u8 {
    x.wrapping_sub(y) & 7
}
