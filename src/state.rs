//! The playback state store.
//!
//! Holds what the controls display and applies both engine notifications and user
//! gestures to it. Engine events are authoritative; user gestures update the state
//! optimistically and are reconciled by the next engine event.

use crate::engine::EngineEvent;
use log::trace;

/// Volume restored when unmuting a player whose volume was dragged to zero.
pub const DEFAULT_VOLUME: f64 = 0.8;

/// Current playback state as displayed by the controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// Played position as a fraction of the duration.
    pub played: f64,
    /// Buffered position as a fraction of the duration.
    pub loaded: f64,
    /// Media duration in seconds, `0.0` until known.
    pub duration: f64,
    pub is_playing: bool,
    pub is_muted: bool,
    /// Linear volume, retained while muted.
    pub volume: f64,
    pub is_looping: bool,
    /// Set while the user holds the scrub handle; engine progress is ignored meanwhile.
    pub is_seeking: bool,
    pub is_pip_active: bool,
    pub is_fullscreen: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            played: 0.0,
            loaded: 0.0,
            duration: 0.0,
            is_playing: false,
            is_muted: false,
            volume: DEFAULT_VOLUME,
            is_looping: false,
            is_seeking: false,
            is_pip_active: false,
            is_fullscreen: false,
        }
    }
}

impl PlaybackState {
    /// Applies an engine notification.
    pub fn apply(&mut self, event: &EngineEvent) {
        match *event {
            EngineEvent::Ready => {}
            EngineEvent::Progress { played, loaded } => {
                if self.is_seeking {
                    trace!("dropping progress {played:.3} while seeking");
                    return;
                }
                self.played = clamp_fraction(played);
                self.loaded = clamp_fraction(loaded);
            }
            EngineEvent::Duration(seconds) => {
                self.duration = if seconds.is_finite() {
                    seconds.max(0.0)
                } else {
                    0.0
                };
            }
            EngineEvent::Play => {
                // replaying a finished video starts the timeline over
                if self.played == 1.0 {
                    self.played = 0.0;
                }
                self.is_playing = true;
            }
            EngineEvent::Pause => self.is_playing = false,
            EngineEvent::Ended => self.is_playing = self.is_looping,
            EngineEvent::PipEnabled => self.is_pip_active = true,
            EngineEvent::PipDisabled => self.is_pip_active = false,
        }
    }

    /// The user grabbed the scrub handle.
    pub fn begin_seek(&mut self) {
        self.is_seeking = true;
    }

    /// The user moved the scrub handle to `fraction`; returns the position to seek the engine to.
    pub fn commit_seek(&mut self, fraction: f64) -> f64 {
        let fraction = clamp_fraction(fraction);
        self.is_seeking = false;
        self.played = fraction;
        fraction
    }

    /// The user let go of the scrub handle without moving it.
    pub fn cancel_seek(&mut self) {
        self.is_seeking = false;
    }

    /// Flips the play flag; returns the new value.
    pub fn toggle_playing(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// Flips the mute flag; returns the new value.
    ///
    /// Unmuting a player whose volume is zero restores [`DEFAULT_VOLUME`].
    pub fn toggle_muted(&mut self) -> bool {
        if self.is_muted && self.volume == 0.0 {
            self.volume = DEFAULT_VOLUME;
        }
        self.is_muted = !self.is_muted;
        self.is_muted
    }

    /// Sets the volume level; the mute flag is left alone.
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        self.volume = clamp_fraction(volume);
        self.volume
    }

    pub fn toggle_looping(&mut self) -> bool {
        self.is_looping = !self.is_looping;
        self.is_looping
    }

    pub fn toggle_pip(&mut self) -> bool {
        self.is_pip_active = !self.is_pip_active;
        self.is_pip_active
    }

    /// Volume as shown by the volume slider: zero while muted.
    pub fn displayed_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Played position in seconds.
    pub fn elapsed(&self) -> f64 {
        self.duration * self.played
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
