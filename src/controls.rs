use crate::asset::AssetReference;
use crate::capability::{CapabilityFlags, CapabilityProber, FullscreenListener, Orientation};
use crate::engine::{Engine, EngineEvent};
use crate::state::PlaybackState;
use crate::time::format_time;
use crate::Error;
use log::{debug, error};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// How long the big play button takes to fade out once playback starts.
pub const BIG_BUTTON_FADE: Duration = Duration::from_millis(500);

/// When the big play button is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BigButtonPolicy {
    /// Only while not playing at the very start or the very end of the media.
    #[default]
    AtEndsOnly,
    /// Whenever playback is not running.
    WheneverPaused,
}

/// Which optional controls are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlsConfig {
    pub show_pip: bool,
    pub show_loop: bool,
    pub show_autoplay: bool,
    pub big_button: BigButtonPolicy,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        ControlsConfig {
            show_pip: true,
            show_loop: true,
            show_autoplay: true,
            big_button: BigButtonPolicy::default(),
        }
    }
}

impl ControlsConfig {
    pub fn show_pip(self, show_pip: bool) -> Self {
        ControlsConfig { show_pip, ..self }
    }

    pub fn show_loop(self, show_loop: bool) -> Self {
        ControlsConfig { show_loop, ..self }
    }

    pub fn show_autoplay(self, show_autoplay: bool) -> Self {
        ControlsConfig {
            show_autoplay,
            ..self
        }
    }

    pub fn big_button(self, big_button: BigButtonPolicy) -> Self {
        ControlsConfig { big_button, ..self }
    }
}

/// Hover preview over the scrub bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipPreview {
    /// Position under the pointer as a fraction of the duration.
    pub target: f64,
    /// Horizontal offset of the preview label from the bar's left edge, in pixels.
    pub offset: f32,
}

impl SkipPreview {
    /// Computes the preview for a pointer at `x` over a bar spanning `left..right`.
    pub fn from_pointer(x: f32, left: f32, right: f32) -> Option<Self> {
        let left = left.round();
        let right = right.round();
        let width = right - left;
        if width <= 0.0 || !x.is_finite() {
            return None;
        }
        let target = f64::from((x - left) / width).clamp(0.0, 1.0);
        Some(SkipPreview {
            target: (target * 100.0).round() / 100.0,
            offset: x - left - 4.0,
        })
    }

    /// The offset formatted as a CSS-style pixel length.
    pub fn offset_label(&self) -> String {
        format!("{}px", self.offset)
    }
}

/// Icon shown on the play/pause buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
    Replay,
}

/// Icon shown on the mute button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    High,
}

/// A user gesture on the controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    TogglePlay,
    /// Pointer down on the scrub bar.
    SeekStart,
    /// The scrub bar value changed.
    Seek(f64),
    /// Pointer released or left the scrub bar without a value change.
    SeekRelease,
    /// Pointer moved over the scrub bar at `x`, relative to a bar of the given `width`.
    Hover { x: f32, width: f32 },
    HoverEnd,
    ToggleMute,
    Volume(f64),
    ToggleLoop,
    ToggleAutoplay,
    TogglePip,
    ToggleFullscreen,
}

/// The control surface of one mounted player.
///
/// Owns the playback state store, relays user gestures to the engine and keeps the
/// displayed fullscreen state in sync with the host. Dropping the surface releases its
/// fullscreen subscription.
pub struct ControlSurface<E: Engine, P: CapabilityProber> {
    engine: E,
    prober: P,
    source: AssetReference,
    config: ControlsConfig,
    capabilities: CapabilityFlags,

    state: PlaybackState,
    ready: bool,
    autoplay: bool,
    preview: Option<SkipPreview>,
    fade: Option<Instant>,

    fullscreen: Rc<Cell<bool>>,
    fullscreen_listener: Option<FullscreenListener>,
}

impl<E: Engine, P: CapabilityProber> Drop for ControlSurface<E, P> {
    fn drop(&mut self) {
        self.fade = None;
        if let Some(listener) = self.fullscreen_listener.take() {
            self.prober.unsubscribe_fullscreen(&listener);
        }
    }
}

impl<E: Engine, P: CapabilityProber> ControlSurface<E, P> {
    /// Mounts controls for `source` over `engine`, probing the host through `prober`.
    pub fn new(
        source: impl Into<AssetReference>,
        engine: E,
        prober: P,
        config: ControlsConfig,
    ) -> Self {
        let source = source.into();
        let capabilities = CapabilityFlags::probe(&prober, &source);

        let fullscreen = Rc::new(Cell::new(prober.is_fullscreen()));
        let fullscreen_listener = if capabilities.supports_fullscreen {
            let flag = Rc::clone(&fullscreen);
            let listener: FullscreenListener = Rc::new(move |value| flag.set(value));
            prober.subscribe_fullscreen(Rc::clone(&listener));
            Some(listener)
        } else {
            None
        };

        ControlSurface {
            engine,
            prober,
            source,
            config,
            capabilities,

            state: PlaybackState::default(),
            ready: false,
            autoplay: false,
            preview: None,
            fade: None,

            fullscreen,
            fullscreen_listener,
        }
    }

    /// Applies a notification from the playback engine.
    pub fn on_engine_event(&mut self, event: EngineEvent) {
        if event == EngineEvent::Ready {
            self.ready = true;
            if self.autoplay && !self.state.is_playing {
                debug!("autoplay on ready");
                self.state.is_playing = true;
                relay("play", self.engine.play());
            }
        }
        self.state.apply(&event);
    }

    /// Applies a user gesture, relaying commands to the engine and host.
    pub fn update(&mut self, message: Message) {
        match message {
            Message::TogglePlay => self.toggle_play(),
            Message::SeekStart => self.state.begin_seek(),
            Message::Seek(fraction) => {
                let fraction = self.state.commit_seek(fraction);
                relay("seek", self.engine.seek(fraction));
            }
            Message::SeekRelease => self.state.cancel_seek(),
            Message::Hover { x, width } => {
                self.preview = SkipPreview::from_pointer(x, 0.0, width);
            }
            Message::HoverEnd => {
                self.preview = None;
                self.state.cancel_seek();
            }
            Message::ToggleMute => {
                let previous_volume = self.state.volume;
                let muted = self.state.toggle_muted();
                if self.state.volume != previous_volume {
                    relay("set volume", self.engine.set_volume(self.state.volume));
                }
                relay("set muted", self.engine.set_muted(muted));
            }
            Message::Volume(volume) => {
                let volume = self.state.set_volume(volume);
                relay("set volume", self.engine.set_volume(volume));
            }
            Message::ToggleLoop => {
                let looping = self.state.toggle_looping();
                relay("set looping", self.engine.set_looping(looping));
            }
            Message::ToggleAutoplay => self.autoplay = !self.autoplay,
            Message::TogglePip => {
                if self.capabilities.supports_pip {
                    let pip = self.state.toggle_pip();
                    relay("set pip", self.engine.set_pip(pip));
                }
            }
            Message::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    fn toggle_play(&mut self) {
        if self.state.toggle_playing() {
            self.fade = Some(Instant::now());
            relay("play", self.engine.play());
        } else {
            self.fade = None;
            relay("pause", self.engine.pause());
        }
    }

    /// Asks the host to enter or leave fullscreen. The displayed state only changes once the
    /// host reports the transition, so a refused request leaves the button as it was.
    fn toggle_fullscreen(&mut self) {
        if !self.capabilities.supports_fullscreen {
            return;
        }
        if self.fullscreen.get() {
            relay("exit fullscreen", self.prober.exit_fullscreen());
            if let Err(err) = self.prober.unlock_orientation() {
                debug!("cannot restore orientation: {err}");
            }
        } else {
            relay("request fullscreen", self.prober.request_fullscreen());
            if let Err(err) = self.prober.lock_orientation(Orientation::Landscape) {
                debug!("cannot lock orientation: {err}");
            }
        }
    }

    /// Current playback state, including the host's fullscreen state.
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            is_fullscreen: self.fullscreen.get(),
            ..self.state
        }
    }

    pub fn capabilities(&self) -> CapabilityFlags {
        self.capabilities
    }

    pub fn config(&self) -> ControlsConfig {
        self.config
    }

    pub fn source(&self) -> &AssetReference {
        &self.source
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Whether the engine should show its own controls because native playback is unavailable.
    pub fn engine_controls_enabled(&self) -> bool {
        !self.capabilities.supports_native_playback
    }

    pub fn preview(&self) -> Option<SkipPreview> {
        self.preview
    }

    /// Time under the hover preview, e.g. `"00:42"`.
    pub fn preview_label(&self) -> Option<String> {
        self.preview
            .map(|preview| format_time(self.state.duration * preview.target))
    }

    /// Elapsed and total time, e.g. `"01:00 / 02:00"`.
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.state.elapsed()),
            format_time(self.state.duration)
        )
    }

    pub fn play_icon(&self) -> PlayIcon {
        if self.state.is_playing {
            PlayIcon::Pause
        } else if self.state.played == 1.0 {
            PlayIcon::Replay
        } else {
            PlayIcon::Play
        }
    }

    pub fn volume_level(&self) -> VolumeLevel {
        let volume = self.state.volume;
        if self.state.is_muted || volume == 0.0 {
            VolumeLevel::Muted
        } else if volume <= 0.4 {
            VolumeLevel::Low
        } else if volume <= 0.8 {
            VolumeLevel::Medium
        } else {
            VolumeLevel::High
        }
    }

    pub fn big_button_visible(&self) -> bool {
        if self.state.is_playing {
            return false;
        }
        match self.config.big_button {
            BigButtonPolicy::WheneverPaused => true,
            BigButtonPolicy::AtEndsOnly => self.state.played == 0.0 || self.state.played == 1.0,
        }
    }

    /// Opacity of the big play button at `now`, fading out after playback was started.
    pub fn big_button_opacity(&self, now: Instant) -> f32 {
        if self.big_button_visible() {
            return 1.0;
        }
        match self.fade {
            Some(started) => {
                let elapsed = now.saturating_duration_since(started);
                (1.0 - elapsed.as_secs_f32() / BIG_BUTTON_FADE.as_secs_f32()).max(0.0)
            }
            None => 0.0,
        }
    }

    /// Whether the big play button is still animating at `now`.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.fade
            .is_some_and(|started| now.saturating_duration_since(started) < BIG_BUTTON_FADE)
    }

    pub fn show_pip_button(&self) -> bool {
        self.config.show_pip && self.capabilities.supports_pip
    }

    pub fn show_fullscreen_button(&self) -> bool {
        self.capabilities.supports_fullscreen
    }
}

fn relay(command: &str, result: Result<(), Error>) {
    if let Err(err) = result {
        error!("{command} failed: {err}");
    }
}
