use core::fmt;

/// Number of TDMA frames in a GSM hyperframe (26 * 51 * 2048)
pub const GSM_HYPERFRAME: u32 = 2_715_648;

/// TDMA frame number. One frame lasts 120/26 ms
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct GsmTime {
    /// Frame number, from 0 to GSM_HYPERFRAME - 1
    pub frame: u32,
}

/// Difference between two frame numbers, handling wrap-around of the hyperframe.
pub fn frame_diff(a: u32, b: u32) -> i32 {
    let wrap = GSM_HYPERFRAME as i32;
    let mut diff = a as i32 - b as i32;
    while diff < -wrap / 2 { diff += wrap; }
    while diff >= wrap / 2 { diff -= wrap; }
    diff
}

impl GsmTime {
    pub fn new(frame: u32) -> Self {
        GsmTime { frame: frame % GSM_HYPERFRAME }
    }

    /// T1: superframe number, fn div (26 * 51)
    pub fn t1(self) -> u32 {
        self.frame / (26 * 51)
    }

    /// T2: position in the 26-multiframe
    pub fn t2(self) -> u8 {
        (self.frame % 26) as u8
    }

    /// T3: position in the 51-multiframe
    pub fn t3(self) -> u8 {
        (self.frame % 51) as u8
    }

    /// Add a (possibly negative) number of frames
    pub fn add_frames(self, num_frames: i32) -> GsmTime {
        let frame = (self.frame as i64 + num_frames as i64).rem_euclid(GSM_HYPERFRAME as i64);
        GsmTime { frame: frame as u32 }
    }

    /// Difference between two times in frames
    pub fn diff(self, b: Self) -> i32 {
        frame_diff(self.frame, b.frame)
    }

    /// Age of this time compared to now
    #[inline(always)]
    pub fn age(self, now: GsmTime) -> i32 {
        now.diff(self)
    }

    /// Number of whole frames covering a duration in milliseconds, at least one
    pub fn frames_from_ms(ms: u32) -> u32 {
        let frames = (ms as u64 * 26).div_ceil(120) as u32;
        frames.max(1)
    }
}

impl fmt::Display for GsmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7} ({:4}/{:02}/{:02})", self.frame, self.t1(), self.t2(), self.t3())
    }
}

impl fmt::Debug for GsmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7} ({:4}/{:02}/{:02})", self.frame, self.t1(), self.t2(), self.t3())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_frames_and_diff() {
        let initial_time = GsmTime::default();

        let mut time = initial_time;
        // Repeat add_frames enough times that the hyperframe wraps
        let iterations = 10000;
        let increment = 1234;
        for _ in 0..iterations {
            let time2 = time.add_frames(increment);
            assert_eq!(time2.diff(time), increment);
            assert_eq!(time.diff(time2), -increment);
            time = time2;
        }

        // Go backwards, should end up back at initial_time
        for _ in 0..iterations {
            let time2 = time.add_frames(-increment);
            assert_eq!(time2.diff(time), -increment);
            time = time2;
        }

        assert_eq!(time, initial_time);
    }

    #[test]
    fn test_wrap_and_t1t2t3() {
        let last = GsmTime::new(GSM_HYPERFRAME - 1);
        assert_eq!(last.add_frames(1), GsmTime::new(0));
        assert_eq!(GsmTime::new(0).diff(last), 1);
        assert_eq!(GsmTime::new(GSM_HYPERFRAME + 5).frame, 5);

        let t = GsmTime::new(26 * 51 + 27);
        assert_eq!(t.t1(), 1);
        assert_eq!(t.t2(), 1);
        assert_eq!(t.t3(), 27);
    }

    #[test]
    fn test_frames_from_ms() {
        // T200 nominal value of one second
        assert_eq!(GsmTime::frames_from_ms(1000), 217);
        assert_eq!(GsmTime::frames_from_ms(120), 26);
        assert_eq!(GsmTime::frames_from_ms(0), 1);
        assert_eq!(GsmTime::frames_from_ms(5), 2);
    }
}
