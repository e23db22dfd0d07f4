use crate::asset::AssetReference;
use crate::engine::{Engine, EngineEvent};
use crate::Error;
use gstreamer as gst;
use gstreamer::prelude::*;
use log::{debug, error, warn};
use std::time::Duration;

/// Seeks land on the exact requested position, so the next progress report agrees with
/// the position the controls already show.
const SEEK_FLAGS: gst::SeekFlags = gst::SeekFlags::FLUSH.union(gst::SeekFlags::ACCURATE);

/// A [`Engine`] backed by a GStreamer `playbin`, loaded from a URI (e.g., a local file path or HTTP stream).
///
/// Bus messages are turned into [`EngineEvent`]s by [`Video::poll`], which the host calls
/// periodically (e.g., on every redraw or from a timer subscription).
pub struct Video {
    bus: gst::Bus,
    source: gst::Pipeline,
    uri: Option<url::Url>,

    duration: Duration,
    buffered: f64,
    looping: bool,
    is_eos: bool,
    ready: bool,
}

impl Drop for Video {
    fn drop(&mut self) {
        if let Err(err) = self.source.set_state(gst::State::Null) {
            error!("failed to shut down pipeline: {err}");
        }
    }
}

impl Video {
    /// Loads the first candidate of `asset` that the pipeline can preroll.
    ///
    /// Candidates are tried in order; earlier failures are logged and skipped.
    pub fn new(asset: &AssetReference) -> Result<Self, Error> {
        gst::init()?;

        let mut last_err = Error::NoSource;
        for candidate in asset.candidates() {
            let uri = match url::Url::parse(candidate) {
                Ok(uri) => uri,
                Err(err) => {
                    warn!("skipping malformed candidate {candidate:?}: {err}");
                    last_err = Error::Uri;
                    continue;
                }
            };
            match Self::from_uri(&uri) {
                Ok(video) => return Ok(video),
                Err(err) => {
                    warn!("cannot load {uri}: {err}; trying next candidate");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Creates a new video from a single `uri`.
    /// Note that live sources will report the duration to be zero.
    pub fn from_uri(uri: &url::Url) -> Result<Self, Error> {
        gst::init()?;

        let pipeline = format!("playbin uri=\"{}\"", uri.as_str());
        let pipeline = gst::parse::launch(pipeline.as_ref())?
            .downcast::<gst::Pipeline>()
            .map_err(|_| Error::Cast)?;

        let mut video = Self::from_gst_pipeline(pipeline)?;
        // network sources report buffering; local files are fully available
        if uri.scheme() == "file" {
            video.buffered = 1.0;
        }
        video.uri = Some(uri.clone());
        Ok(video)
    }

    /// Creates a new video based on an existing GStreamer pipeline.
    ///
    /// **Note:** volume and mute control assume a `playbin` pipeline.
    pub fn from_gst_pipeline(pipeline: gst::Pipeline) -> Result<Self, Error> {
        gst::init()?;

        pipeline.set_state(gst::State::Paused)?;

        // wait for up to 5 seconds until the pipeline prerolls
        if let Err(err) = pipeline.state(gst::ClockTime::from_seconds(5)).0 {
            let _ = pipeline.set_state(gst::State::Null);
            return Err(err.into());
        }

        let bus = match pipeline.bus() {
            Some(bus) => bus,
            None => {
                let _ = pipeline.set_state(gst::State::Null);
                return Err(Error::Bus);
            }
        };

        let duration = query_duration(&pipeline).unwrap_or(Duration::ZERO);
        debug!("pipeline prerolled, duration {:?}", duration);

        Ok(Video {
            bus,
            source: pipeline,
            uri: None,

            duration,
            buffered: 0.0,
            looping: false,
            is_eos: false,
            ready: false,
        })
    }

    /// Drains pending bus messages and reports what happened since the last poll,
    /// followed by a progress report.
    pub fn poll(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if !self.ready {
            self.ready = true;
            events.push(EngineEvent::Ready);
            if !self.duration.is_zero() {
                events.push(EngineEvent::Duration(self.duration.as_secs_f64()));
            }
        }

        let mut restart_stream = false;
        let mut eos_pause = false;
        for msg in self.bus.iter() {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    error!("bus returned an error: {err}");
                }
                gst::MessageView::Eos(_eos) => {
                    events.push(EngineEvent::Ended);
                    if self.looping {
                        restart_stream = true;
                    } else {
                        eos_pause = true;
                    }
                }
                gst::MessageView::StateChanged(change) => {
                    if change.src().map(|s| s == &self.source).unwrap_or(false) {
                        match (change.old(), change.current()) {
                            (_, gst::State::Playing) => events.push(EngineEvent::Play),
                            (gst::State::Playing, gst::State::Paused) => {
                                events.push(EngineEvent::Pause)
                            }
                            _ => {}
                        }
                    }
                }
                gst::MessageView::DurationChanged(_) => {
                    if let Some(duration) = query_duration(&self.source) {
                        self.duration = duration;
                        events.push(EngineEvent::Duration(duration.as_secs_f64()));
                    }
                }
                gst::MessageView::Buffering(buffering) => {
                    self.buffered = f64::from(buffering.percent()) / 100.0;
                }
                _ => {}
            }
        }

        // Don't run eos_pause if restart_stream is true; fixes "pausing" after restarting a stream
        if restart_stream {
            if let Err(err) = self.restart_stream() {
                error!("cannot restart stream (can't seek): {err:#?}")
            }
        } else if eos_pause {
            self.is_eos = true;
            // the PLAYING -> PAUSED change is reported as `Pause` on the next poll
            if let Err(err) = self.source.set_state(gst::State::Paused) {
                error!("cannot pause at end of stream: {err}");
            }
        }

        if !self.duration.is_zero() {
            let played = if self.is_eos {
                1.0
            } else {
                (self.position().as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
            };
            events.push(EngineEvent::Progress {
                played,
                loaded: self.buffered.max(played),
            });
        }

        events
    }

    /// Get the current playback position in time.
    pub fn position(&self) -> Duration {
        Duration::from_nanos(
            self.source
                .query_position::<gst::ClockTime>()
                .map_or(0, |pos| pos.nseconds()),
        )
    }

    /// Get the media duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Get if the stream ended or not.
    pub fn eos(&self) -> bool {
        self.is_eos
    }

    /// The URI the video was loaded from, if it was created from one.
    pub fn uri(&self) -> Option<&url::Url> {
        self.uri.as_ref()
    }

    /// Get the underlying GStreamer pipeline.
    pub fn pipeline(&self) -> gst::Pipeline {
        self.source.clone()
    }

    /// Seeks to the first frame and unpauses, clearing the end-of-stream flag.
    pub fn restart_stream(&mut self) -> Result<(), Error> {
        self.is_eos = false;
        self.seek_to(Duration::ZERO)?;
        self.source.set_state(gst::State::Playing)?;
        Ok(())
    }

    fn seek_to(&self, position: Duration) -> Result<(), Error> {
        self.source.seek_simple(
            SEEK_FLAGS,
            gst::ClockTime::from_nseconds(position.as_nanos() as _),
        )?;
        Ok(())
    }
}

impl Engine for Video {
    fn play(&mut self) -> Result<(), Error> {
        if self.is_eos {
            return self.restart_stream();
        }
        self.source.set_state(gst::State::Playing)?;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), Error> {
        self.source.set_state(gst::State::Paused)?;
        Ok(())
    }

    fn seek(&mut self, fraction: f64) -> Result<(), Error> {
        if self.duration.is_zero() {
            return Err(Error::Duration);
        }
        let fraction = fraction.clamp(0.0, 1.0);
        self.seek_to(self.duration.mul_f64(fraction))?;
        if fraction < 1.0 {
            self.is_eos = false;
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), Error> {
        let muted: bool = self.source.property("mute");
        self.source.set_property("volume", volume.clamp(0.0, 1.0));
        self.source.set_property("mute", muted); // for some reason gstreamer unmutes when changing volume?
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), Error> {
        self.source.set_property("mute", muted);
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> Result<(), Error> {
        self.looping = looping;
        Ok(())
    }

    fn set_pip(&mut self, _pip: bool) -> Result<(), Error> {
        Err(Error::Unsupported("picture-in-picture"))
    }
}

fn query_duration(pipeline: &gst::Pipeline) -> Option<Duration> {
    pipeline
        .query_duration::<gst::ClockTime>()
        .map(|duration| Duration::from_nanos(duration.nseconds()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// Polls until `pred` matches an event or the timeout elapses, returning every event seen.
    fn poll_until(
        video: &mut Video,
        pred: impl Fn(&EngineEvent) -> bool,
    ) -> (bool, Vec<EngineEvent>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            let events = video.poll();
            let found = events.iter().any(&pred);
            seen.extend(events);
            if found {
                return (true, seen);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        (false, seen)
    }

    fn test_source() -> Option<Video> {
        gst::init().ok()?;
        gst::ElementFactory::find("videotestsrc")?;
        gst::ElementFactory::find("fakesink")?;
        let pipeline = gst::parse::launch("videotestsrc num-buffers=5 ! fakesink sync=false")
            .ok()?
            .downcast::<gst::Pipeline>()
            .ok()?;
        Video::from_gst_pipeline(pipeline).ok()
    }

    #[test]
    fn end_of_stream_pauses_the_pipeline() {
        let Some(mut video) = test_source() else {
            return;
        };
        video.play().unwrap();

        let (ended, _) = poll_until(&mut video, |event| *event == EngineEvent::Ended);
        assert!(ended);
        assert!(video.eos());

        let (paused, seen) = poll_until(&mut video, |event| *event == EngineEvent::Pause);
        assert!(paused, "no pause after end of stream: {seen:?}");
        assert_eq!(video.pipeline().current_state(), gst::State::Paused);
    }

    #[test]
    fn looping_end_of_stream_keeps_playing() {
        let Some(mut video) = test_source() else {
            return;
        };
        video.set_looping(true).unwrap();
        video.play().unwrap();

        let (ended, _) = poll_until(&mut video, |event| *event == EngineEvent::Ended);
        assert!(ended);
        assert!(!video.eos());
        assert_ne!(video.pipeline().current_state(), gst::State::Paused);
    }

    #[test]
    fn seeks_are_accurate_not_keyframe_snapped() {
        assert!(SEEK_FLAGS.contains(gst::SeekFlags::FLUSH));
        assert!(SEEK_FLAGS.contains(gst::SeekFlags::ACCURATE));
        assert!(!SEEK_FLAGS.contains(gst::SeekFlags::KEY_UNIT));
    }

    #[test]
    fn malformed_candidates_are_skipped() {
        if gst::init().is_err() {
            return;
        }
        let asset = AssetReference::Fallbacks(vec![
            "not a uri".to_owned(),
            "file:///nonexistent/iced_video_controls/clip.webm".to_owned(),
        ]);
        let Err(err) = Video::new(&asset) else {
            panic!("a missing file must not load");
        };
        // the second candidate was attempted rather than giving up on the first
        assert!(!matches!(err, Error::Uri | Error::NoSource), "{err:?}");
    }

    #[test]
    fn nothing_to_load() {
        if gst::init().is_err() {
            return;
        }
        let Err(err) = Video::new(&AssetReference::Fallbacks(Vec::new())) else {
            panic!("empty reference must not load");
        };
        assert!(matches!(err, Error::NoSource));

        let Err(err) = Video::new(&AssetReference::from("not a uri")) else {
            panic!("malformed reference must not load");
        };
        assert!(matches!(err, Error::Uri));
    }
}
