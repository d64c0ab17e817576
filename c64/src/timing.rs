//! Real-time frame pacing.
//!
//! [`FrameGovernor`] throttles the emulation loop to the display's frame
//! rate. Deadlines accumulate from frame duration rather than from "now",
//! so rounding never drifts; when emulation falls more than a frame
//! behind (a long pause, a debugger stop) the schedule resynchronizes
//! instead of sprinting to catch up.

use std::time::{Duration, Instant};

/// Frame-rate governor for throttling emulation to real time.
///
/// ```no_run
/// use c64::FrameGovernor;
///
/// let mut governor = FrameGovernor::new(50.12); // PAL
/// loop {
///     // ... execute one frame of emulation ...
///     governor.throttle();
/// }
/// ```
pub struct FrameGovernor {
    frame_duration: Duration,
    next_frame: Instant,
    enabled: bool,
    frames: u64,
    frames_dropped: u64,
}

impl FrameGovernor {
    /// A governor targeting `fps` frames per second.
    pub fn new(fps: f64) -> Self {
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / fps),
            next_frame: Instant::now(),
            enabled: true,
            frames: 0,
            frames_dropped: 0,
        }
    }

    /// A governor whose [`FrameGovernor::throttle`] returns immediately
    /// (benchmarks, headless test runs).
    pub fn disabled(fps: f64) -> Self {
        let mut governor = Self::new(fps);
        governor.enabled = false;
        governor
    }

    /// Waits until the next frame deadline. Returns immediately when the
    /// emulation is running behind or the governor is disabled.
    pub fn throttle(&mut self) {
        self.frames += 1;
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        if self.next_frame > now {
            std::thread::sleep(self.next_frame - now);
        }
        self.next_frame += self.frame_duration;

        // more than a frame behind: resynchronize instead of sprinting
        let now = Instant::now();
        if now > self.next_frame + self.frame_duration {
            let behind = now - self.next_frame;
            let dropped = (behind.as_secs_f64() / self.frame_duration.as_secs_f64()) as u64;
            self.frames_dropped += dropped;
            log::warn!("governor {dropped} frames behind, resynchronizing");
            self.next_frame = now;
        }
    }

    /// Resets the schedule (call after a pause).
    pub fn resync(&mut self) {
        self.next_frame = Instant::now();
    }

    /// Frames throttled so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames the schedule has skipped while running behind.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }
}
