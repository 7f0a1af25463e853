use std::thread;
use std::time::{Duration, Instant};

use crate::config::LoopConfig;

/// Frame pacing: hands out one clamped delta per frame.
pub struct FrameClock {
    period: Duration,
    max_step: Duration,
    cap_frame_rate: bool,
    last: Instant,
}

impl FrameClock {
    pub fn new(config: &LoopConfig) -> Self {
        let fps = config.target_fps.max(1);
        Self {
            period: Duration::from_secs(1) / fps,
            max_step: config.max_step,
            cap_frame_rate: config.cap_frame_rate,
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick, never more than the configured step.
    pub fn tick(&mut self) -> f32 {
        if self.cap_frame_rate {
            let elapsed = self.last.elapsed();
            if elapsed < self.period {
                thread::sleep(self.period - elapsed);
            }
        }
        self.advance(Instant::now())
    }

    fn advance(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last);
        self.last = now;
        clamp_step(raw, self.max_step)
    }
}

pub fn clamp_step(raw: Duration, cap: Duration) -> f32 {
    raw.min(cap).as_secs_f32()
}
