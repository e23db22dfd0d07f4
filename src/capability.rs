use crate::asset::AssetReference;
use crate::Error;
use gstreamer as gst;
use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Callback invoked with the new fullscreen state whenever the host enters or leaves fullscreen.
///
/// Listeners are identified by reference: the one passed to
/// [`CapabilityProber::unsubscribe_fullscreen`] must be the same `Rc` that was subscribed.
pub type FullscreenListener = Rc<dyn Fn(bool)>;

/// Screen orientation requested around fullscreen transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Natural,
}

/// What the host environment supports, probed once when the controls are mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityFlags {
    pub supports_native_playback: bool,
    pub supports_pip: bool,
    pub supports_fullscreen: bool,
}

impl CapabilityFlags {
    /// Queries `prober` for the capabilities available to `source`.
    pub fn probe<P: CapabilityProber + ?Sized>(prober: &P, source: &AssetReference) -> Self {
        let flags = CapabilityFlags {
            supports_native_playback: prober.can_play_natively(),
            supports_pip: prober.can_use_pip(source),
            supports_fullscreen: prober.fullscreen_is_supported(),
        };
        debug!("probed capabilities: {:?}", flags);
        flags
    }
}

/// Queries and requests against the host environment.
///
/// Requests are fire-and-forget; their outcome arrives through fullscreen listeners.
pub trait CapabilityProber {
    fn can_play_natively(&self) -> bool;

    fn can_use_pip(&self, source: &AssetReference) -> bool;

    fn fullscreen_is_supported(&self) -> bool;

    /// Whether the host is currently in fullscreen.
    fn is_fullscreen(&self) -> bool;

    fn request_fullscreen(&self) -> Result<(), Error>;

    fn exit_fullscreen(&self) -> Result<(), Error>;

    /// Locks the screen orientation. Best-effort; many hosts cannot do this.
    fn lock_orientation(&self, orientation: Orientation) -> Result<(), Error>;

    /// Releases an orientation lock.
    fn unlock_orientation(&self) -> Result<(), Error>;

    fn subscribe_fullscreen(&self, listener: FullscreenListener);

    fn unsubscribe_fullscreen(&self, listener: &FullscreenListener);
}

impl<P: CapabilityProber + ?Sized> CapabilityProber for Rc<P> {
    fn can_play_natively(&self) -> bool {
        (**self).can_play_natively()
    }

    fn can_use_pip(&self, source: &AssetReference) -> bool {
        (**self).can_use_pip(source)
    }

    fn fullscreen_is_supported(&self) -> bool {
        (**self).fullscreen_is_supported()
    }

    fn is_fullscreen(&self) -> bool {
        (**self).is_fullscreen()
    }

    fn request_fullscreen(&self) -> Result<(), Error> {
        (**self).request_fullscreen()
    }

    fn exit_fullscreen(&self) -> Result<(), Error> {
        (**self).exit_fullscreen()
    }

    fn lock_orientation(&self, orientation: Orientation) -> Result<(), Error> {
        (**self).lock_orientation(orientation)
    }

    fn unlock_orientation(&self) -> Result<(), Error> {
        (**self).unlock_orientation()
    }

    fn subscribe_fullscreen(&self, listener: FullscreenListener) {
        (**self).subscribe_fullscreen(listener)
    }

    fn unsubscribe_fullscreen(&self, listener: &FullscreenListener) {
        (**self).unsubscribe_fullscreen(listener)
    }
}

/// Desktop host backed by GStreamer for native playback and an Iced window for fullscreen.
///
/// Fullscreen requests are queued and picked up by the application with
/// [`Host::take_mode_request`]; the application reports actual window mode changes
/// back through [`Host::set_fullscreen`], which notifies every listener regardless of
/// what triggered the change.
pub struct Host {
    pip_enabled: bool,
    fullscreen_enabled: bool,
    fullscreen: Cell<bool>,
    requested: Cell<Option<bool>>,
    listeners: RefCell<Vec<FullscreenListener>>,
}

impl Default for Host {
    fn default() -> Self {
        Host {
            pip_enabled: false,
            fullscreen_enabled: true,
            fullscreen: Cell::new(false),
            requested: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the host can show media in a floating picture-in-picture window.
    pub fn pip_enabled(self, pip_enabled: bool) -> Self {
        Host {
            pip_enabled,
            ..self
        }
    }

    /// Sets whether the host window may go fullscreen.
    pub fn fullscreen_enabled(self, fullscreen_enabled: bool) -> Self {
        Host {
            fullscreen_enabled,
            ..self
        }
    }

    /// Takes the pending window mode change, if any.
    pub fn take_mode_request(&self) -> Option<iced::window::Mode> {
        self.requested.take().map(|fullscreen| {
            if fullscreen {
                iced::window::Mode::Fullscreen
            } else {
                iced::window::Mode::Windowed
            }
        })
    }

    /// Records the window's actual fullscreen state and notifies listeners when it changed.
    pub fn set_fullscreen(&self, fullscreen: bool) {
        if self.fullscreen.replace(fullscreen) == fullscreen {
            return;
        }
        // listeners may (un)subscribe while being notified
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(fullscreen);
        }
    }

    /// Number of active fullscreen listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl CapabilityProber for Host {
    fn can_play_natively(&self) -> bool {
        gst::init().is_ok() && gst::ElementFactory::find("playbin").is_some()
    }

    fn can_use_pip(&self, source: &AssetReference) -> bool {
        self.pip_enabled && source.is_video_file()
    }

    fn fullscreen_is_supported(&self) -> bool {
        self.fullscreen_enabled
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.get()
    }

    fn request_fullscreen(&self) -> Result<(), Error> {
        if !self.fullscreen_enabled {
            return Err(Error::Unsupported("fullscreen"));
        }
        self.requested.set(Some(true));
        Ok(())
    }

    fn exit_fullscreen(&self) -> Result<(), Error> {
        self.requested.set(Some(false));
        Ok(())
    }

    fn lock_orientation(&self, _orientation: Orientation) -> Result<(), Error> {
        Err(Error::Unsupported("orientation lock"))
    }

    fn unlock_orientation(&self) -> Result<(), Error> {
        Err(Error::Unsupported("orientation lock"))
    }

    fn subscribe_fullscreen(&self, listener: FullscreenListener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn unsubscribe_fullscreen(&self, listener: &FullscreenListener) {
        self.listeners
            .borrow_mut()
            .retain(|registered| !Rc::ptr_eq(registered, listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener(log: &Rc<RefCell<Vec<bool>>>) -> FullscreenListener {
        let log = Rc::clone(log);
        Rc::new(move |fullscreen| log.borrow_mut().push(fullscreen))
    }

    #[test]
    fn notifies_on_any_mode_change() {
        let host = Host::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        host.subscribe_fullscreen(listener(&log));

        host.set_fullscreen(true);
        host.set_fullscreen(true);
        host.set_fullscreen(false);

        assert_eq!(*log.borrow(), [true, false]);
        assert!(!host.is_fullscreen());
    }

    #[test]
    fn unsubscribes_by_reference() {
        let host = Host::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = listener(&log);
        let second = listener(&log);
        host.subscribe_fullscreen(Rc::clone(&first));
        host.subscribe_fullscreen(Rc::clone(&second));

        host.unsubscribe_fullscreen(&first);
        assert_eq!(host.listener_count(), 1);

        host.set_fullscreen(true);
        assert_eq!(*log.borrow(), [true]);
    }

    #[test]
    fn requests_become_window_modes() {
        let host = Host::new();
        assert_eq!(host.take_mode_request(), None);

        host.request_fullscreen().unwrap();
        assert_eq!(host.take_mode_request(), Some(iced::window::Mode::Fullscreen));
        assert_eq!(host.take_mode_request(), None);

        host.exit_fullscreen().unwrap();
        assert_eq!(host.take_mode_request(), Some(iced::window::Mode::Windowed));
    }

    #[test]
    fn disabled_fullscreen_rejects_requests() {
        let host = Host::new().fullscreen_enabled(false);
        assert!(!host.fullscreen_is_supported());
        assert!(matches!(
            host.request_fullscreen(),
            Err(Error::Unsupported(_))
        ));
        assert_eq!(host.take_mode_request(), None);
    }

    #[test]
    fn pip_requires_host_support_and_video_file() {
        let clip = AssetReference::from("https://x.io/clip.mp4");
        assert!(!Host::new().can_use_pip(&clip));
        assert!(Host::new().pip_enabled(true).can_use_pip(&clip));
        assert!(!Host::new()
            .pip_enabled(true)
            .can_use_pip(&AssetReference::from("https://x.io/song.mp3")));
    }

    #[test]
    fn orientation_lock_is_unsupported() {
        assert!(Host::new().lock_orientation(Orientation::Landscape).is_err());
    }
}
