use gsm_core::{ChanNr, GsmTime, Sapi};

/// Identifies one arming of a datalink's T200. An expiry is only acted upon
/// while the generation still matches the datalink's timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct T200Handle {
    pub chan_nr: ChanNr,
    pub acch: bool,
    pub sapi: Sapi,
    pub generation: u32,
}

/// Retransmission timer, counted in TDMA frames
#[derive(Debug, Clone)]
pub struct T200 {
    duration: u32,
    deadline: Option<GsmTime>,
    generation: u32,
}

impl T200 {
    pub fn new(duration_frames: u32) -> Self {
        Self { duration: duration_frames.max(1), deadline: None, generation: 0 }
    }

    /// Arms the timer, replacing any running instance
    pub fn start(&mut self, now: GsmTime) {
        self.generation = self.generation.wrapping_add(1);
        self.deadline = Some(now.add_frames(self.duration as i32));
        tracing::trace!(ts=%now, "T200 started, gen {} for {} frames", self.generation, self.duration);
    }

    pub fn stop(&mut self) {
        if self.deadline.take().is_some() {
            tracing::trace!("T200 stopped, gen {}", self.generation);
        }
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn deadline(&self) -> Option<GsmTime> {
        self.deadline
    }

    /// Returns the generation of the instance that expired at `now`, disarming it
    pub fn poll(&mut self, now: GsmTime) -> Option<u32> {
        let deadline = self.deadline?;
        if deadline.age(now) < 0 {
            return None;
        }
        self.deadline = None;
        Some(self.generation)
    }

    /// True if an expiry of `generation` is still the current one
    pub fn is_current(&self, generation: u32) -> bool {
        self.deadline.is_none() && self.generation == generation
    }
}
