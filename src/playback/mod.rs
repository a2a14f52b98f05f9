// Playback clock driving the replay
//
// The clock never schedules anything itself. The host calls `tick` from its repaint callback
// with a monotonic timestamp and the clock decides whether the frame index moves.

pub mod input;

use std::fmt;

use log::debug;

pub use input::{KeyInput, PlaybackCommand, map_key, suppresses_default};

/// Cadence the source frames were sampled at, in frames per second.
pub const BASE_FRAME_RATE: f64 = 30.0;
/// Frames skipped by rewind and fast-forward.
pub const SEEK_STEP_FRAMES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    Double,
    Quadruple,
}

impl PlaybackSpeed {
    /// Cycle order used by `cycle_speed`.
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Double,
        PlaybackSpeed::Quadruple,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
        }
    }

    /// Exact match against the supported multipliers, no rounding to the nearest one.
    pub fn from_multiplier(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.multiplier() == value)
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

/// Owns the current frame index, the play/pause state and the speed multiplier.
///
/// The frame index is always within `[0, frame_count - 1]`. Reaching the last frame while playing
/// pauses the clock, and playing is refused while sitting on the last frame.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    frame_count: usize,
    current_frame: usize,
    is_playing: bool,
    speed: PlaybackSpeed,
    last_advance_ms: Option<f64>,
}

impl PlaybackClock {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count: frame_count.max(1),
            current_frame: 0,
            is_playing: false,
            speed: PlaybackSpeed::default(),
            last_advance_ms: None,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn last_frame(&self) -> usize {
        self.frame_count - 1
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_at_end(&self) -> bool {
        self.current_frame >= self.last_frame()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Minimum wall time between two frame advances at the current speed.
    pub fn frame_interval_ms(&self) -> f64 {
        (1000.0 / BASE_FRAME_RATE) / self.speed.multiplier()
    }

    pub fn play(&mut self) {
        if self.is_playing || self.is_at_end() {
            return;
        }
        self.is_playing = true;
        // the first tick after resuming only primes the timer
        self.last_advance_ms = None;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn toggle(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn seek(&mut self, frame_index: i64) {
        self.current_frame = self.clamp_index(frame_index);
    }

    pub fn step_by(&mut self, delta_frames: i64) {
        let target = (self.current_frame as i64).saturating_add(delta_frames);
        self.current_frame = self.clamp_index(target);
    }

    pub fn rewind(&mut self) {
        self.step_by(-SEEK_STEP_FRAMES);
    }

    pub fn fast_forward(&mut self) {
        self.step_by(SEEK_STEP_FRAMES);
    }

    pub fn cycle_speed(&mut self) {
        self.speed = self.speed.next();
    }

    pub fn set_playback_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Sets the speed from a raw multiplier. Values outside the supported set are ignored and
    /// `false` is returned.
    pub fn set_speed(&mut self, multiplier: f64) -> bool {
        match PlaybackSpeed::from_multiplier(multiplier) {
            Some(speed) => {
                self.speed = speed;
                true
            }
            None => {
                debug!("Ignoring unsupported playback speed {}", multiplier);
                false
            }
        }
    }

    /// Called once per repaint. Advances at most one frame per call, so a slow repaint cycle
    /// slows playback down instead of jumping ahead. Returns whether the frame index moved.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        if !self.is_playing {
            return false;
        }

        let last_advance = *self.last_advance_ms.get_or_insert(timestamp_ms);
        if timestamp_ms - last_advance < self.frame_interval_ms() {
            return false;
        }

        self.last_advance_ms = Some(timestamp_ms);
        self.advance();
        true
    }

    pub fn apply(&mut self, command: PlaybackCommand) {
        match command {
            PlaybackCommand::TogglePlay => self.toggle(),
            PlaybackCommand::StepBy(delta) => self.step_by(delta),
            PlaybackCommand::CycleSpeed => self.cycle_speed(),
            PlaybackCommand::SetSpeed(speed) => self.set_playback_speed(speed),
        }
    }

    fn advance(&mut self) {
        let next = self.current_frame + 1;
        if next >= self.last_frame() {
            self.current_frame = self.last_frame();
            self.is_playing = false;
            debug!("Reached the end of the replay at frame {}", self.current_frame);
        } else {
            self.current_frame = next;
        }
    }

    fn clamp_index(&self, index: i64) -> usize {
        index.clamp(0, self.last_frame() as i64) as usize
    }
}
