mod asset;
mod capability;
mod controls;
mod engine;
mod state;
mod time;
mod video;
mod view;

use gstreamer as gst;
use thiserror::Error;

pub use asset::{AssetReference, Delivery, DEFAULT_FORMATS};
pub use capability::{CapabilityFlags, CapabilityProber, FullscreenListener, Host, Orientation};
pub use controls::{
    BigButtonPolicy, ControlSurface, ControlsConfig, Message, PlayIcon, SkipPreview, VolumeLevel,
    BIG_BUTTON_FADE,
};
pub use engine::{Engine, EngineEvent};
pub use state::{PlaybackState, DEFAULT_VOLUME};
pub use time::format_time;
pub use video::Video;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Glib(#[from] glib::Error),
    #[error("{0}")]
    Bool(#[from] glib::BoolError),
    #[error("failed to get the gstreamer bus")]
    Bus,
    #[error("{0}")]
    StateChange(#[from] gst::StateChangeError),
    #[error("failed to cast gstreamer element")]
    Cast,
    #[error("invalid URI")]
    Uri,
    #[error("no media source given")]
    NoSource,
    #[error("failed to query media duration or position")]
    Duration,
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}
