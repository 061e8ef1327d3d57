use iced::widget::{container, image, text, column};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;

mod config;
mod error;
mod state;
mod ui;
mod upload;

use config::UploaderConfig;
use error::UploadError;
use state::notifications::{Notifier, Toasts};
use state::uploader::{CycleId, Effect, PickId, Uploader};
use upload::file::FileHandle;
use upload::preview::{decode_data_url, PreviewEncoder};
use upload::resolution::ResolutionReader;
use upload::transport::{PlaceholderTransport, UploadEvent};
use upload::validator::{Validator, Verdict};

/// Main application state
struct AvatarUploader {
    /// Idle / Uploading / Done plus what is displayed
    uploader: Uploader,
    validator: Validator,
    encoder: PreviewEncoder,
    transport: PlaceholderTransport,
    /// Shared with the validator, which pushes rejection messages
    toasts: Toasts,
    /// Decoded preview_url, ready for the image widget
    preview: Option<image::Handle>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the picture card
    PickFile,
    /// Picked file was read into memory
    FileLoaded(PickId, Result<FileHandle, UploadError>),
    /// Pre-upload checks finished
    Validated(PickId, FileHandle, Verdict),
    /// Lifecycle event from the upload transport
    Transport(CycleId, UploadEvent),
    /// Data URL for the uploaded file is ready (or failed)
    PreviewEncoded(CycleId, Result<String, UploadError>),
    /// Periodic toast expiry
    Tick,
}

impl AvatarUploader {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = UploaderConfig::load().unwrap_or_else(|e| {
            log::error!("❌ {}; falling back to defaults", e);
            UploaderConfig::default()
        });

        let toasts = Toasts::new(config.toast_lifetime());
        let validator = Validator::new(
            config.rules.clone(),
            ResolutionReader::default(),
            Arc::new(toasts.clone()),
        );
        let transport = PlaceholderTransport::new(
            config.destination.clone(),
            config.field_name.clone(),
            config.transport_latency(),
        );

        log::info!(
            "🎨 Avatar uploader ready: {} under {} bytes, max {}x{}",
            config.rules.accepted_type,
            config.rules.max_bytes,
            config.rules.max_width,
            config.rules.max_height
        );

        (
            AvatarUploader {
                uploader: Uploader::new(),
                validator,
                encoder: PreviewEncoder::default(),
                transport,
                toasts,
                preview: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFile => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select Avatar Image")
                    .add_filter("Images", &["jpg", "jpeg", "png", "gif", "webp", "bmp"])
                    .pick_file();

                match picked {
                    Some(path) => {
                        let pick = self.uploader.begin_pick();
                        log::info!("🔍 Checking {} (pick {})", path.display(), pick);
                        Task::perform(FileHandle::load(path), move |result| {
                            Message::FileLoaded(pick, result)
                        })
                    }
                    None => Task::none(),
                }
            }
            Message::FileLoaded(pick, _) if !self.uploader.is_current_pick(pick) => {
                log::debug!("Pick {} superseded before validation", pick);
                Task::none()
            }
            Message::FileLoaded(pick, Ok(file)) => {
                let validator = self.validator.clone();
                Task::perform(
                    async move {
                        let verdict = validator.validate(&file).await;
                        (file, verdict)
                    },
                    move |(file, verdict)| Message::Validated(pick, file, verdict),
                )
            }
            Message::FileLoaded(_, Err(error)) => {
                self.toasts.notify(&error.to_string());
                Task::none()
            }
            Message::Validated(pick, file, verdict) => {
                log::debug!("Pick {}: {} allowed = {}", pick, file.name, verdict.is_allowed());
                let effect = self.uploader.on_verdict(pick, file, &verdict);
                let cycle = self.uploader.current_cycle();
                self.run(cycle, effect)
            }
            Message::Transport(cycle, event) => {
                log::debug!("Cycle {}: transport event for {}", cycle, event.file().name);
                let effect = self.uploader.on_event(cycle, event);
                self.run(cycle, effect)
            }
            Message::PreviewEncoded(cycle, result) => {
                let before = self.uploader.state().preview_url.clone();
                let effect = self.uploader.on_preview(cycle, result);
                if self.uploader.state().preview_url != before && self.refresh_preview() {
                    self.toasts.info("Avatar updated");
                }
                self.run(cycle, effect)
            }
            Message::Tick => {
                self.toasts.prune(Utc::now());
                Task::none()
            }
        }
    }

    /// Turn a state machine effect into background work
    fn run(&mut self, cycle: CycleId, effect: Effect) -> Task<Message> {
        match effect {
            Effect::None => Task::none(),
            Effect::StartTransport(cycle, file) => {
                let transport = self.transport.clone();
                let uploading = UploadEvent::Uploading { file: file.clone() };
                Task::done(Message::Transport(cycle, uploading)).chain(Task::perform(
                    async move { transport.upload(file).await },
                    move |event| Message::Transport(cycle, event),
                ))
            }
            Effect::EncodePreview(file) => {
                let encoder = self.encoder.clone();
                Task::perform(
                    async move { encoder.encode(&file).await },
                    move |result| Message::PreviewEncoded(cycle, result),
                )
            }
            Effect::Notify(error) => {
                self.toasts.notify(&error.to_string());
                Task::none()
            }
        }
    }

    /// Rebuild the image handle from the current preview_url
    fn refresh_preview(&mut self) -> bool {
        let Some(url) = self.uploader.state().preview_url.as_deref() else {
            return false;
        };

        match decode_data_url(url) {
            Ok((_, bytes)) => {
                self.preview = Some(image::Handle::from_bytes(bytes));
                true
            }
            Err(e) => {
                log::error!("❌ Preview is not displayable: {}", e);
                false
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toasts = self.toasts.snapshot();
        let content = column![
            text("Avatar").size(32),
            ui::avatar::view(self.uploader.state(), self.preview.as_ref(), &toasts),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.toasts.is_empty() {
            Subscription::none()
        } else {
            iced::time::every(Duration::from_millis(500)).map(|_| Message::Tick)
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application(
        "Avatar Uploader",
        AvatarUploader::update,
        AvatarUploader::view,
    )
    .subscription(AvatarUploader::subscription)
    .theme(AvatarUploader::theme)
    .centered()
    .run_with(AvatarUploader::new)
}
