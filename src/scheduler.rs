use std::time::Duration;

/// Turns a steady frame clock into slower game ticks: one tick every
/// `frames_per_tick` frames.
#[derive(Clone, Debug)]
pub struct FixedStepScheduler {
    frames_per_tick: u32,
    frame_interval: Duration,
    count: u32,
}

impl FixedStepScheduler {
    pub fn new(frames_per_tick: u32, frame_interval: Duration) -> Self {
        FixedStepScheduler { frames_per_tick: frames_per_tick.max(1), frame_interval, count: 0 }
    }

    /// Registers one frame. Returns true when a tick is due.
    pub fn frame(&mut self) -> bool {
        self.count += 1;
        if self.count < self.frames_per_tick {
            return false;
        }
        self.count = 0;
        true
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn tick_interval(&self) -> Duration {
        self.frame_interval * self.frames_per_tick
    }
}
