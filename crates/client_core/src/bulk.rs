//! Modal bulk-generation workflow.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::Utc;
use shared::{
    domain::{
        clamp_length, validate_bulk_count, validate_length, GenerationSelection,
        DEFAULT_BULK_COUNT,
    },
    protocol::BulkGenerationRequest,
};
use thiserror::Error;
use tokio::sync::{oneshot, watch, Mutex};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::{
    clipboard::ClipboardService,
    debounce::ResponseSequencer,
    error::PanelError,
    notifications::{NotificationCenter, Severity},
    transport::PasswordServiceApi,
};

pub const CONFIRM_LABEL: &str = "Generate";
const ITEM_COPIED_FEEDBACK: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open,
    Generating,
}

/// Visibility of the bulk dialog.
///
/// Its controls only exist once the visibility transition has completed, so
/// [`Modal::show`] hands back a signal that resolves after that point.
#[derive(Debug, Default)]
pub struct Modal {
    visible: AtomicBool,
}

impl Modal {
    pub fn show(&self) -> oneshot::Receiver<()> {
        self.visible.store(true, Ordering::SeqCst);
        let (shown_tx, shown_rx) = oneshot::channel();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            let _ = shown_tx.send(());
        });
        shown_rx
    }

    pub fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there are no passwords to download")]
    Empty,
    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, PartialEq)]
pub struct BulkView {
    pub modal: ModalState,
    pub count: u32,
    pub length: u32,
    pub results: Vec<String>,
    pub confirm_enabled: bool,
    pub confirm_label: String,
    pub copied_item: Option<usize>,
}

impl BulkView {
    pub fn heading(&self) -> Option<String> {
        if self.results.is_empty() {
            None
        } else {
            Some(format!("✓ Generated {} Passwords", self.results.len()))
        }
    }
}

impl fmt::Debug for BulkView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkView")
            .field("modal", &self.modal)
            .field("count", &self.count)
            .field("length", &self.length)
            .field("results", &self.results.len())
            .field("confirm_enabled", &self.confirm_enabled)
            .field("confirm_label", &self.confirm_label)
            .field("copied_item", &self.copied_item)
            .finish()
    }
}

struct BulkState {
    modal: ModalState,
    count: u32,
    length: u32,
    results: Vec<String>,
    confirm_enabled: bool,
    confirm_label: String,
    copied_item: Option<usize>,
    in_flight: bool,
}

impl BulkState {
    fn clear_results(&mut self) {
        for password in &mut self.results {
            password.zeroize();
        }
        self.results.clear();
        self.copied_item = None;
    }
}

pub fn join_passwords(passwords: &[String]) -> String {
    passwords.join("\n")
}

pub struct BulkWorkflowController {
    api: PasswordServiceApi,
    clipboard: Arc<ClipboardService>,
    notifications: NotificationCenter,
    selection: watch::Receiver<GenerationSelection>,
    download_dir: PathBuf,
    modal: Modal,
    state: Mutex<BulkState>,
    requests: ResponseSequencer,
    feedback_epoch: AtomicU64,
}

impl BulkWorkflowController {
    pub fn new(
        api: PasswordServiceApi,
        clipboard: Arc<ClipboardService>,
        notifications: NotificationCenter,
        selection: watch::Receiver<GenerationSelection>,
        download_dir: impl Into<PathBuf>,
    ) -> Arc<Self> {
        let length = selection.borrow().length;
        Arc::new(Self {
            api,
            clipboard,
            notifications,
            selection,
            download_dir: download_dir.into(),
            modal: Modal::default(),
            state: Mutex::new(BulkState {
                modal: ModalState::Closed,
                count: DEFAULT_BULK_COUNT,
                length,
                results: Vec::new(),
                confirm_enabled: true,
                confirm_label: CONFIRM_LABEL.to_string(),
                copied_item: None,
                in_flight: false,
            }),
            requests: ResponseSequencer::default(),
            feedback_epoch: AtomicU64::new(0),
        })
    }

    pub async fn view(&self) -> BulkView {
        let state = self.state.lock().await;
        BulkView {
            modal: state.modal,
            count: state.count,
            length: state.length,
            results: state.results.clone(),
            confirm_enabled: state.confirm_enabled,
            confirm_label: state.confirm_label.clone(),
            copied_item: state.copied_item,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.modal.is_visible()
    }

    pub async fn open(&self) {
        {
            let mut state = self.state.lock().await;
            if state.modal == ModalState::Closed {
                state.modal = ModalState::Open;
            }
        }

        if self.modal.show().await.is_err() {
            warn!("bulk dialog shown signal dropped");
        }

        let length = self.selection.borrow().length;
        self.state.lock().await.length = length;
        debug!(length, "bulk dialog seeded from generator");
    }

    pub async fn set_count(&self, count: u32) {
        self.state.lock().await.count = count;
    }

    pub async fn set_length(&self, length: u32) {
        self.state.lock().await.length = clamp_length(length);
    }

    pub async fn generate_bulk(&self) -> Result<usize, PanelError> {
        let (ticket, request) = {
            let mut state = self.state.lock().await;
            match state.modal {
                ModalState::Closed => return Err(PanelError::ModalClosed),
                ModalState::Generating => return Err(PanelError::Busy),
                // A request issued before the dialog was closed and reopened.
                ModalState::Open if state.in_flight => return Err(PanelError::Busy),
                ModalState::Open => {}
            }
            let options = self.selection.borrow().options;
            if let Err(err) = validate_bulk_count(state.count)
                .and_then(|()| options.ensure_any_selected())
                .and_then(|()| validate_length(state.length))
            {
                self.notifications.notify(err.to_string(), Severity::Warning);
                return Err(err.into());
            }
            state.modal = ModalState::Generating;
            state.in_flight = true;
            state.confirm_enabled = false;
            state.confirm_label = format!("Generating {} passwords...", state.count);
            (
                self.requests.issue(),
                BulkGenerationRequest {
                    length: state.length,
                    count: state.count,
                    options,
                },
            )
        };

        let outcome = self.api.generate_bulk(request).await;

        let mut state = self.state.lock().await;
        state.in_flight = false;
        state.confirm_enabled = true;
        state.confirm_label = CONFIRM_LABEL.to_string();
        if state.modal == ModalState::Generating {
            state.modal = ModalState::Open;
        }
        if !self.requests.is_current(ticket) {
            debug!("bulk dialog closed before results arrived");
            if let Ok(mut passwords) = outcome {
                for password in &mut passwords {
                    password.zeroize();
                }
            }
            return Err(PanelError::Superseded);
        }
        match outcome {
            Ok(passwords) => {
                let generated = passwords.len();
                if generated as u32 != request.count {
                    warn!(requested = request.count, generated, "bulk result count differs from request");
                }
                state.clear_results();
                state.results = passwords;
                info!(generated, length = request.length, "bulk passwords generated");
                self.notifications.notify(
                    format!("✓ Generated {generated} passwords!"),
                    Severity::Success,
                );
                Ok(generated)
            }
            Err(err) => {
                self.notifications
                    .notify(format!("Error: {}", err.message()), Severity::Error);
                Err(err.into())
            }
        }
    }

    pub async fn copy_item(self: &Arc<Self>, index: usize) -> bool {
        let mut password = {
            let state = self.state.lock().await;
            match state.results.get(index) {
                Some(password) => password.clone(),
                None => return false,
            }
        };
        let copied = self.clipboard.copy(&password).await;
        password.zeroize();
        if !copied {
            return false;
        }

        let epoch = self.feedback_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().await.copied_item = Some(index);
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(ITEM_COPIED_FEEDBACK).await;
            if controller.feedback_epoch.load(Ordering::SeqCst) == epoch {
                controller.state.lock().await.copied_item = None;
            }
        });
        true
    }

    pub async fn copy_all(&self) -> bool {
        let (mut text, count) = {
            let state = self.state.lock().await;
            if state.results.is_empty() {
                return false;
            }
            (join_passwords(&state.results), state.results.len())
        };
        let copied = self.clipboard.copy(&text).await;
        text.zeroize();
        if copied {
            self.notifications
                .notify(format!("✓ Copied {count} passwords!"), Severity::Success);
        } else {
            self.notifications
                .notify("Failed to copy passwords", Severity::Error);
        }
        copied
    }

    /// Writes the current list to a timestamped text file in the download
    /// directory. Only ever runs on explicit user request.
    pub async fn download(&self) -> Result<PathBuf, ExportError> {
        let mut text = {
            let state = self.state.lock().await;
            if state.results.is_empty() {
                return Err(ExportError::Empty);
            }
            join_passwords(&state.results)
        };
        let path = self.download_dir.join(download_file_name());
        let outcome = write_export(&self.download_dir, &path, text.as_bytes()).await;
        text.zeroize();

        match outcome {
            Ok(()) => {
                info!(path = %path.display(), "bulk passwords downloaded");
                self.notifications
                    .notify("✓ Passwords downloaded!", Severity::Success);
                Ok(path)
            }
            Err(source) => {
                warn!(path = %path.display(), error = %source, "bulk download failed");
                self.notifications
                    .notify("Failed to download passwords", Severity::Error);
                Err(ExportError::Io { path, source })
            }
        }
    }

    pub async fn close(&self) {
        self.requests.invalidate();
        self.modal.hide();
        let mut state = self.state.lock().await;
        state.clear_results();
        state.modal = ModalState::Closed;
    }
}

fn download_file_name() -> String {
    format!("secure-passwords-{}.txt", Utc::now().timestamp_millis())
}

async fn write_export(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, contents).await
}

#[cfg(test)]
#[path = "tests/bulk_tests.rs"]
mod tests;
