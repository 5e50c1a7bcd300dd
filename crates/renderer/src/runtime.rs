use std::time::{Duration, Instant};

use chrono::Utc;

/// Monotonic elapsed time fed to the time uniforms.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.origin).as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

/// Seed derived from wall-clock microseconds since the Unix epoch.
pub fn seed_from_clock() -> u64 {
    let micros = Utc::now().timestamp_micros();
    u64::try_from(micros).unwrap_or_default()
}

/// Frame deadlines for an optional FPS cap.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    /// A non-positive or non-finite `target_fps` leaves rendering uncapped.
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn is_capped(&self) -> bool {
        self.interval.is_some()
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    /// When the next frame is due, or `None` if it is due immediately.
    pub fn next_deadline(&self) -> Option<Instant> {
        let interval = self.interval?;
        self.last_frame.map(|last| last + interval)
    }
}

/// Turns a held key into a single trigger per press.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegenerateLatch {
    held: bool,
}

impl RegenerateLatch {
    /// Returns true only on the transition from released to pressed.
    pub fn press(&mut self) -> bool {
        let fire = !self.held;
        self.held = true;
        fire
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    /// The key-up for a press can be delivered elsewhere once focus is gone.
    pub fn focus_changed(&mut self, focused: bool) {
        if !focused {
            self.release();
        }
    }
}

/// Optional periodic regeneration, restarted whenever a new shader is requested.
#[derive(Debug, Clone)]
pub struct RegenerateTimer {
    interval: Option<Duration>,
    since: Instant,
}

impl RegenerateTimer {
    pub fn new(interval: Option<Duration>, now: Instant) -> Self {
        Self {
            interval: interval.filter(|interval| !interval.is_zero()),
            since: now,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.since = now;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.interval.map(|interval| self.since + interval)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }
}
