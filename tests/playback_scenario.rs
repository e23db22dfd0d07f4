use iced_video_controls::{
    ControlSurface, ControlsConfig, Delivery, Engine, EngineEvent, Error, Host, Message,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct RecordingEngine {
    seeks: Rc<RefCell<Vec<f64>>>,
}

impl Engine for RecordingEngine {
    fn play(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn pause(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn seek(&mut self, fraction: f64) -> Result<(), Error> {
        self.seeks.borrow_mut().push(fraction);
        Ok(())
    }

    fn set_volume(&mut self, _volume: f64) -> Result<(), Error> {
        Ok(())
    }

    fn set_muted(&mut self, _muted: bool) -> Result<(), Error> {
        Ok(())
    }

    fn set_looping(&mut self, _looping: bool) -> Result<(), Error> {
        Ok(())
    }

    fn set_pip(&mut self, _pip: bool) -> Result<(), Error> {
        Err(Error::Unsupported("picture-in-picture"))
    }
}

#[test]
fn seeking_suppresses_stale_progress() {
    let engine = RecordingEngine::default();
    let seeks = Rc::clone(&engine.seeks);
    let host = Rc::new(Host::new());
    let source = Delivery::new("https://media.example.com/video")
        .unwrap()
        .resolve("clip");
    let mut surface = ControlSurface::new(source, engine, Rc::clone(&host), ControlsConfig::default());

    surface.on_engine_event(EngineEvent::Ready);
    surface.on_engine_event(EngineEvent::Duration(120.0));
    surface.on_engine_event(EngineEvent::Progress {
        played: 0.5,
        loaded: 0.6,
    });
    assert_eq!(surface.time_label(), "01:00 / 02:00");

    surface.update(Message::SeekStart);
    surface.on_engine_event(EngineEvent::Progress {
        played: 0.9,
        loaded: 0.95,
    });
    assert_eq!(surface.state().played, 0.5);

    surface.update(Message::Seek(0.25));
    let state = surface.state();
    assert_eq!(state.played, 0.25);
    assert!(!state.is_seeking);
    assert_eq!(surface.time_label(), "00:30 / 02:00");
    assert_eq!(*seeks.borrow(), [0.25]);
}

#[test]
fn host_fullscreen_reaches_mounted_controls() {
    let host = Rc::new(Host::new());
    let surface = ControlSurface::new(
        "https://media.example.com/clip.mp4",
        RecordingEngine::default(),
        Rc::clone(&host),
        ControlsConfig::default(),
    );
    assert_eq!(host.listener_count(), 1);
    assert!(!surface.show_pip_button());

    host.set_fullscreen(true);
    assert!(surface.state().is_fullscreen);

    drop(surface);
    assert_eq!(host.listener_count(), 0);
}

#[test]
fn fullscreen_button_queues_window_mode() {
    let host = Rc::new(Host::new());
    let mut surface = ControlSurface::new(
        "https://media.example.com/clip.mp4",
        RecordingEngine::default(),
        Rc::clone(&host),
        ControlsConfig::default(),
    );

    surface.update(Message::ToggleFullscreen);
    assert_eq!(
        host.take_mode_request(),
        Some(iced::window::Mode::Fullscreen)
    );
    // nothing changes until the window actually switches mode
    assert!(!surface.state().is_fullscreen);

    // the window confirms, then leaves fullscreen through another trigger
    host.set_fullscreen(true);
    assert!(surface.state().is_fullscreen);
    host.set_fullscreen(false);
    assert!(!surface.state().is_fullscreen);
}

#[test]
fn refused_window_mode_keeps_controls_windowed() {
    let host = Rc::new(Host::new());
    let mut surface = ControlSurface::new(
        "https://media.example.com/clip.mp4",
        RecordingEngine::default(),
        Rc::clone(&host),
        ControlsConfig::default(),
    );

    surface.update(Message::ToggleFullscreen);
    assert!(host.take_mode_request().is_some());
    // the window stays windowed and reports so
    host.set_fullscreen(false);
    assert!(!surface.state().is_fullscreen);

    surface.update(Message::ToggleFullscreen);
    assert_eq!(
        host.take_mode_request(),
        Some(iced::window::Mode::Fullscreen)
    );
}
