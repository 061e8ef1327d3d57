/// Avatar uploader state machine
///
/// Driven by external events (validator verdicts, transport lifecycle
/// events, preview results) and independent of how it is rendered. Each
/// picked file gets a pick token; only an allowed pick opens an upload cycle.
/// Results carrying an older token or cycle id are ignored.
use crate::error::UploadError;
use crate::upload::file::FileHandle;
use crate::upload::transport::UploadEvent;
use crate::upload::validator::Verdict;

/// Identifies one picked file while it is being validated
pub type PickId = u64;

/// Identifies one allowed file's upload cycle
pub type CycleId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Done,
}

/// What the widget displays
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    /// True while an upload is in flight
    pub loading: bool,
    /// Data URL of the last successfully uploaded file
    pub preview_url: Option<String>,
}

/// Follow-up work the host must run after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    StartTransport(CycleId, FileHandle),
    EncodePreview(FileHandle),
    Notify(UploadError),
}

#[derive(Debug, Default)]
pub struct Uploader {
    phase: Phase,
    state: UploadState,
    pick: PickId,
    cycle: CycleId,
}

impl Uploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// A new file was picked; its verdict must carry the returned token
    ///
    /// Supersedes earlier picks still being validated. The current upload
    /// cycle is untouched until the validator allows the file.
    pub fn begin_pick(&mut self) -> PickId {
        self.pick += 1;
        self.pick
    }

    pub fn current_cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn is_current_pick(&self, pick: PickId) -> bool {
        pick == self.pick
    }

    pub fn on_verdict(&mut self, pick: PickId, file: FileHandle, verdict: &Verdict) -> Effect {
        if !self.is_current_pick(pick) {
            log::debug!("Dropping verdict of pick {} (current {})", pick, self.pick);
            return Effect::None;
        }

        match verdict {
            Verdict::Allowed(_) => {
                self.cycle += 1;
                self.phase = Phase::Uploading;
                self.state.loading = true;
                Effect::StartTransport(self.cycle, file)
            }
            Verdict::Rejected(_) => Effect::None,
        }
    }

    pub fn on_event(&mut self, cycle: CycleId, event: UploadEvent) -> Effect {
        if self.is_stale(cycle) {
            return Effect::None;
        }

        match event {
            UploadEvent::Uploading { file } => {
                log::debug!("⏳ {} in progress", file.name);
                Effect::None
            }
            UploadEvent::Done { file, response } => {
                if self.phase != Phase::Uploading {
                    log::debug!("Ignoring done for {} outside an upload", file.name);
                    return Effect::None;
                }
                log::debug!("{} answered {}", response.destination, response.body);
                log::info!("📸 Upload of {} done, encoding preview", file.name);
                self.phase = Phase::Done;
                self.state.loading = false;
                Effect::EncodePreview(file)
            }
            UploadEvent::Error { file, error } => {
                if self.phase != Phase::Uploading {
                    return Effect::None;
                }
                log::warn!("❌ Upload of {} failed: {}", file.name, error);
                self.state.loading = false;
                self.phase = if self.state.preview_url.is_some() {
                    Phase::Done
                } else {
                    Phase::Idle
                };
                Effect::Notify(error)
            }
        }
    }

    pub fn on_preview(&mut self, cycle: CycleId, result: Result<String, UploadError>) -> Effect {
        if self.is_stale(cycle) || self.phase != Phase::Done {
            return Effect::None;
        }

        match result {
            Ok(url) => {
                self.state.preview_url = Some(url);
                Effect::None
            }
            Err(error) => Effect::Notify(error),
        }
    }

    fn is_stale(&self, cycle: CycleId) -> bool {
        let stale = cycle != self.cycle;
        if stale {
            log::debug!("Dropping result of cycle {} (current {})", cycle, self.cycle);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::resolution::ImageResolution;
    use crate::upload::transport::TransportResponse;

    fn file(name: &str) -> FileHandle {
        FileHandle::from_bytes(name, "image/jpeg", name.as_bytes().to_vec())
    }

    fn allowed() -> Verdict {
        Verdict::Allowed(ImageResolution { width: 500, height: 500 })
    }

    fn done(file: FileHandle) -> UploadEvent {
        UploadEvent::Done {
            file,
            response: TransportResponse {
                destination: "//example.invalid".to_string(),
                body: serde_json::Value::Null,
            },
        }
    }

    fn rejected() -> Verdict {
        Verdict::Rejected(vec![UploadError::DecodeError("bad".into())])
    }

    /// Runs a file through allow + uploading, returns its cycle
    fn start(uploader: &mut Uploader, f: FileHandle) -> CycleId {
        let pick = uploader.begin_pick();
        let cycle = match uploader.on_verdict(pick, f.clone(), &allowed()) {
            Effect::StartTransport(cycle, started) => {
                assert_eq!(started, f);
                cycle
            }
            other => panic!("expected transport start, got {:?}", other),
        };
        uploader.on_event(cycle, UploadEvent::Uploading { file: f });
        cycle
    }

    #[test]
    fn test_rejection_mutates_nothing() {
        let mut uploader = Uploader::new();
        let pick = uploader.begin_pick();

        assert_eq!(uploader.on_verdict(pick, file("a.jpg"), &rejected()), Effect::None);
        assert_eq!(uploader.phase(), Phase::Idle);
        assert_eq!(uploader.state(), &UploadState::default());
    }

    #[test]
    fn test_rejected_pick_keeps_pending_preview() {
        let mut uploader = Uploader::new();
        let cycle = start(&mut uploader, file("a.jpg"));
        uploader.on_event(cycle, done(file("a.jpg")));

        // a second file is picked and rejected before the first preview is ready
        let pick = uploader.begin_pick();
        assert_eq!(uploader.on_verdict(pick, file("b.png"), &rejected()), Effect::None);

        uploader.on_preview(cycle, Ok("data:image/jpeg;base64,AQ==".to_string()));
        assert_eq!(uploader.phase(), Phase::Done);
        assert_eq!(uploader.state().preview_url.as_deref(), Some("data:image/jpeg;base64,AQ=="));
    }

    #[test]
    fn test_superseded_pick_is_ignored() {
        let mut uploader = Uploader::new();
        let first = uploader.begin_pick();
        let second = uploader.begin_pick();
        assert!(!uploader.is_current_pick(first));
        assert!(uploader.is_current_pick(second));

        assert_eq!(uploader.on_verdict(first, file("a.jpg"), &allowed()), Effect::None);
        assert_eq!(uploader.phase(), Phase::Idle);
        assert!(!uploader.state().loading);

        assert!(matches!(
            uploader.on_verdict(second, file("b.jpg"), &allowed()),
            Effect::StartTransport(_, _)
        ));
    }

    #[test]
    fn test_full_cycle() {
        let mut uploader = Uploader::new();
        let cycle = start(&mut uploader, file("a.jpg"));
        assert_eq!(uploader.phase(), Phase::Uploading);
        assert!(uploader.state().loading);
        assert_eq!(uploader.state().preview_url, None);

        // repeated progress events change nothing
        uploader.on_event(cycle, UploadEvent::Uploading { file: file("a.jpg") });
        assert_eq!(uploader.phase(), Phase::Uploading);

        let effect = uploader.on_event(cycle, done(file("a.jpg")));
        assert_eq!(effect, Effect::EncodePreview(file("a.jpg")));
        assert_eq!(uploader.phase(), Phase::Done);
        assert!(!uploader.state().loading);

        uploader.on_preview(cycle, Ok("data:image/jpeg;base64,YQ==".to_string()));
        assert_eq!(uploader.state().preview_url.as_deref(), Some("data:image/jpeg;base64,YQ=="));
    }

    #[test]
    fn test_new_cycle_keeps_previous_preview() {
        let mut uploader = Uploader::new();
        let first = start(&mut uploader, file("a.jpg"));
        uploader.on_event(first, done(file("a.jpg")));
        uploader.on_preview(first, Ok("data:first".to_string()));

        let second = start(&mut uploader, file("b.jpg"));
        assert!(uploader.state().loading);
        assert_eq!(uploader.state().preview_url.as_deref(), Some("data:first"));

        uploader.on_event(second, done(file("b.jpg")));
        assert_eq!(uploader.state().preview_url.as_deref(), Some("data:first"));
        uploader.on_preview(second, Ok("data:second".to_string()));
        assert_eq!(uploader.state().preview_url.as_deref(), Some("data:second"));
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let mut uploader = Uploader::new();
        let first = start(&mut uploader, file("a.jpg"));
        let second = start(&mut uploader, file("b.jpg"));

        assert_eq!(uploader.on_event(first, done(file("a.jpg"))), Effect::None);
        assert_eq!(uploader.phase(), Phase::Uploading);

        uploader.on_event(second, done(file("b.jpg")));
        uploader.on_preview(first, Ok("data:first".to_string()));
        assert_eq!(uploader.state().preview_url, None);
    }

    #[test]
    fn test_transport_error_resets_loading() {
        let mut uploader = Uploader::new();
        let cycle = start(&mut uploader, file("a.jpg"));

        let error = UploadError::TransportError("offline".into());
        let effect = uploader.on_event(cycle, UploadEvent::Error { file: file("a.jpg"), error: error.clone() });
        assert_eq!(effect, Effect::Notify(error));
        assert_eq!(uploader.phase(), Phase::Idle);
        assert!(!uploader.state().loading);
    }

    #[test]
    fn test_transport_error_after_previous_success_keeps_preview() {
        let mut uploader = Uploader::new();
        let first = start(&mut uploader, file("a.jpg"));
        uploader.on_event(first, done(file("a.jpg")));
        uploader.on_preview(first, Ok("data:first".to_string()));

        let second = start(&mut uploader, file("b.jpg"));
        uploader.on_event(second, UploadEvent::Error {
            file: file("b.jpg"),
            error: UploadError::TransportError("offline".into()),
        });
        assert_eq!(uploader.phase(), Phase::Done);
        assert_eq!(uploader.state().preview_url.as_deref(), Some("data:first"));
    }

    #[test]
    fn test_preview_failure_keeps_old_preview() {
        let mut uploader = Uploader::new();
        let cycle = start(&mut uploader, file("a.jpg"));
        uploader.on_event(cycle, done(file("a.jpg")));

        let error = UploadError::ReadError("gone".into());
        assert_eq!(uploader.on_preview(cycle, Err(error.clone())), Effect::Notify(error));
        assert_eq!(uploader.state().preview_url, None);
        assert!(!uploader.state().loading);
    }
}
