use crate::Error;

/// Notification emitted by a playback engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The media is loaded and can be played.
    Ready,
    /// Playback started or resumed.
    Play,
    /// Playback paused.
    Pause,
    /// Periodic progress report, both values as fractions of the duration.
    Progress { played: f64, loaded: f64 },
    /// The media duration in seconds became known (or changed).
    Duration(f64),
    /// Playback reached the end of the stream.
    Ended,
    /// Picture-in-picture was entered.
    PipEnabled,
    /// Picture-in-picture was left.
    PipDisabled,
}

/// Commands accepted by a playback engine.
///
/// Every command is fire-and-forget: its effect is observed later through the
/// corresponding [`EngineEvent`], never through the return value.
pub trait Engine {
    /// Starts or resumes playback.
    fn play(&mut self) -> Result<(), Error>;

    /// Pauses playback.
    fn pause(&mut self) -> Result<(), Error>;

    /// Seeks to a position given as a fraction of the duration.
    fn seek(&mut self, fraction: f64) -> Result<(), Error>;

    /// Sets the linear volume, `0.0` to `1.0`.
    fn set_volume(&mut self, volume: f64) -> Result<(), Error>;

    /// Mutes or unmutes audio without changing the volume.
    fn set_muted(&mut self, muted: bool) -> Result<(), Error>;

    /// Sets whether the engine restarts the media when it ends.
    fn set_looping(&mut self, looping: bool) -> Result<(), Error>;

    /// Requests entering or leaving picture-in-picture.
    fn set_pip(&mut self, pip: bool) -> Result<(), Error>;
}
