use crate::capability::CapabilityProber;
use crate::controls::{ControlSurface, Message, PlayIcon, VolumeLevel};
use crate::engine::Engine;
use iced::widget::{button, container, mouse_area, progress_bar, slider, text, Column, Row};
use iced::{Element, Length};

const SCRUB_WIDTH: f32 = 480.0;

impl<E: Engine, P: CapabilityProber> ControlSurface<E, P> {
    /// Builds the control bar widgets.
    ///
    /// Nothing is shown until the engine reports it is ready.
    pub fn view(&self) -> Element<'_, Message> {
        if !self.is_ready() {
            return Column::new().into();
        }

        let state = self.state();
        let config = self.config();
        let mut controls = Column::new().spacing(5).width(Length::Fill);

        if self.big_button_visible() {
            controls = controls.push(
                container(
                    button(text(play_label(self.play_icon())))
                        .padding(20.0)
                        .on_press(Message::TogglePlay),
                )
                .center_x(Length::Fill),
            );
        }

        controls = controls.push(text(self.time_label()));

        if let (Some(preview), Some(label)) = (self.preview(), self.preview_label()) {
            controls = controls.push(
                container(text(label))
                    .padding(iced::Padding::new(0.0).left(preview.offset.max(0.0))),
            );
        }

        // Iced's slider reports its first value on press, so the bar commits on every change
        // and never sends `SeekStart`; hosts that observe pointer-down themselves send it to
        // hold off engine progress until the commit.
        let scrub = mouse_area(
            slider(0.0..=1.0, state.played, Message::Seek)
                .step(0.001)
                .width(SCRUB_WIDTH)
                .on_release(Message::SeekRelease),
        )
        .on_move(|point| Message::Hover {
            x: point.x,
            width: SCRUB_WIDTH,
        })
        .on_exit(Message::HoverEnd);
        controls = controls
            .push(container(progress_bar(0.0..=1.0, state.loaded as f32)).width(SCRUB_WIDTH))
            .push(scrub);

        let mut bar = Row::new()
            .spacing(5)
            .align_y(iced::alignment::Vertical::Center)
            .push(
                button(text(play_label(self.play_icon())))
                    .width(80.0)
                    .on_press(Message::TogglePlay),
            )
            .push(
                button(text(volume_label(self.volume_level())))
                    .width(80.0)
                    .on_press(Message::ToggleMute),
            )
            .push(
                slider(0.0..=1.0, state.displayed_volume(), Message::Volume)
                    .step(0.01)
                    .width(100.0),
            );

        if config.show_loop {
            bar = bar.push(
                button(text(if state.is_looping {
                    "Disable Loop"
                } else {
                    "Enable Loop"
                }))
                .on_press(Message::ToggleLoop),
            );
        }

        if config.show_autoplay {
            bar = bar.push(
                button(text(if self.autoplay() {
                    "Autoplay On"
                } else {
                    "Autoplay Off"
                }))
                .on_press(Message::ToggleAutoplay),
            );
        }

        if self.show_pip_button() {
            bar = bar.push(
                button(text(if state.is_pip_active {
                    "Exit PiP"
                } else {
                    "PiP"
                }))
                .on_press(Message::TogglePip),
            );
        }

        if self.show_fullscreen_button() {
            bar = bar.push(
                button(text(if state.is_fullscreen {
                    "Exit Fullscreen"
                } else {
                    "Fullscreen"
                }))
                .on_press(Message::ToggleFullscreen),
            );
        }

        container(controls.push(bar))
            .padding(iced::Padding::new(10.0))
            .width(Length::Fill)
            .into()
    }
}

fn play_label(icon: PlayIcon) -> &'static str {
    match icon {
        PlayIcon::Play => "Play",
        PlayIcon::Pause => "Pause",
        PlayIcon::Replay => "Replay",
    }
}

fn volume_label(level: VolumeLevel) -> &'static str {
    match level {
        VolumeLevel::Muted => "Unmute",
        VolumeLevel::Low => "Vol -",
        VolumeLevel::Medium => "Vol",
        VolumeLevel::High => "Vol +",
    }
}
