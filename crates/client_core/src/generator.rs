//! Single-password generation and the live entropy preview.

use std::{fmt, sync::Arc, time::Duration};

use shared::{
    domain::{clamp_length, validate_length, CharacterSet, GenerationSelection},
    protocol::{GenerationRequest, GenerationResult},
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::{
    clipboard::ClipboardService,
    debounce::{Debouncer, ResponseSequencer},
    error::PanelError,
    notifications::{NotificationCenter, Severity},
    transport::PasswordServiceApi,
};

pub const ENTROPY_PLACEHOLDER: &str = "0.0 bits";
pub const ENTROPY_PLACEHOLDER_RATING: &str = "(Select at least one option)";
pub const GENERATE_LABEL: &str = "Generate Password";
pub const GENERATING_LABEL: &str = "Generating...";
const COPY_CONFIRMATION: &str = "✓ Copied to clipboard!";
const COPY_CONFIRMATION_DURATION: Duration = Duration::from_millis(2000);
const MASK_CHAR: char = '•';

#[derive(Clone, PartialEq)]
pub struct GeneratorView {
    pub selection: GenerationSelection,
    pub password_text: String,
    pub masked: bool,
    pub copy_enabled: bool,
    pub visibility_enabled: bool,
    pub generate_enabled: bool,
    pub generate_label: String,
    pub entropy_text: String,
    pub rating_text: String,
}

impl GeneratorView {
    fn initial(selection: GenerationSelection) -> Self {
        Self {
            selection,
            password_text: String::new(),
            masked: true,
            copy_enabled: false,
            visibility_enabled: false,
            generate_enabled: true,
            generate_label: GENERATE_LABEL.to_string(),
            entropy_text: ENTROPY_PLACEHOLDER.to_string(),
            rating_text: String::new(),
        }
    }

    /// What the password field shows, honoring the mask.
    pub fn display_text(&self) -> String {
        if self.masked {
            self.password_text.chars().map(|_| MASK_CHAR).collect()
        } else {
            self.password_text.clone()
        }
    }
}

impl fmt::Debug for GeneratorView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorView")
            .field("selection", &self.selection)
            .field("password_len", &self.password_text.chars().count())
            .field("masked", &self.masked)
            .field("copy_enabled", &self.copy_enabled)
            .field("visibility_enabled", &self.visibility_enabled)
            .field("generate_enabled", &self.generate_enabled)
            .field("generate_label", &self.generate_label)
            .field("entropy_text", &self.entropy_text)
            .field("rating_text", &self.rating_text)
            .finish()
    }
}

struct GeneratorState {
    last_result: Option<GenerationResult>,
    view: GeneratorView,
}

pub struct GeneratorPanel {
    api: PasswordServiceApi,
    clipboard: Arc<ClipboardService>,
    notifications: NotificationCenter,
    state: Mutex<GeneratorState>,
    selection_tx: watch::Sender<GenerationSelection>,
    preview: Debouncer,
    preview_sequence: ResponseSequencer,
}

impl GeneratorPanel {
    pub fn new(
        api: PasswordServiceApi,
        clipboard: Arc<ClipboardService>,
        notifications: NotificationCenter,
        preview_quiet: Duration,
    ) -> Arc<Self> {
        let selection = GenerationSelection::default();
        let (selection_tx, _) = watch::channel(selection);
        Arc::new(Self {
            api,
            clipboard,
            notifications,
            state: Mutex::new(GeneratorState {
                last_result: None,
                view: GeneratorView::initial(selection),
            }),
            selection_tx,
            preview: Debouncer::new(preview_quiet),
            preview_sequence: ResponseSequencer::default(),
        })
    }

    /// Read-only handle on the current option/length selection.
    pub fn selection(&self) -> watch::Receiver<GenerationSelection> {
        self.selection_tx.subscribe()
    }

    pub async fn view(&self) -> GeneratorView {
        self.state.lock().await.view.clone()
    }

    pub async fn last_result(&self) -> Option<GenerationResult> {
        self.state.lock().await.last_result.clone()
    }

    pub async fn set_option(self: &Arc<Self>, set: CharacterSet, enabled: bool) {
        self.update_selection(|selection| selection.options.set(set, enabled))
            .await;
        self.on_options_or_length_changed().await;
    }

    pub async fn set_length(self: &Arc<Self>, length: u32) {
        self.update_selection(|selection| selection.length = clamp_length(length))
            .await;
        self.on_options_or_length_changed().await;
    }

    async fn update_selection(&self, apply: impl FnOnce(&mut GenerationSelection)) {
        let mut state = self.state.lock().await;
        apply(&mut state.view.selection);
        let selection = state.view.selection;
        self.selection_tx.send_replace(selection);
    }

    pub async fn on_options_or_length_changed(self: &Arc<Self>) {
        let selection = self.state.lock().await.view.selection;
        if !selection.options.any_selected() {
            self.preview.cancel();
            self.preview_sequence.invalidate();
            let mut state = self.state.lock().await;
            state.view.entropy_text = ENTROPY_PLACEHOLDER.to_string();
            state.view.rating_text = ENTROPY_PLACEHOLDER_RATING.to_string();
            return;
        }

        let panel = Arc::clone(self);
        self.preview.schedule(async move {
            panel.refresh_entropy_preview().await;
        });
    }

    /// Issues the entropy preview for the current selection right away.
    pub async fn refresh_entropy_preview(&self) {
        let selection = self.state.lock().await.view.selection;
        if !selection.options.any_selected() {
            return;
        }

        let ticket = self.preview_sequence.issue();
        match self
            .api
            .calculate_entropy(selection.length, selection.options)
            .await
        {
            Ok(estimate) => {
                if !self.preview_sequence.is_current(ticket) {
                    debug!(length = selection.length, "discarding stale entropy preview");
                    return;
                }
                let mut state = self.state.lock().await;
                state.view.entropy_text = format!("{} bits", estimate.entropy);
                state.view.rating_text = format!("({})", estimate.rating);
            }
            Err(err) => warn!(error = %err, "entropy preview failed"),
        }
    }

    pub async fn generate(&self) -> Result<GenerationResult, PanelError> {
        let selection = {
            let mut state = self.state.lock().await;
            if !state.view.generate_enabled {
                return Err(PanelError::Busy);
            }
            let selection = state.view.selection;
            if let Err(err) = selection
                .options
                .ensure_any_selected()
                .and_then(|()| validate_length(selection.length))
            {
                self.notifications.notify(err.to_string(), Severity::Error);
                return Err(err.into());
            }
            state.view.generate_enabled = false;
            state.view.generate_label = GENERATING_LABEL.to_string();
            selection
        };

        let outcome = self
            .api
            .generate(GenerationRequest {
                length: selection.length,
                options: selection.options,
            })
            .await;

        let mut state = self.state.lock().await;
        state.view.generate_enabled = true;
        state.view.generate_label = GENERATE_LABEL.to_string();
        match outcome {
            Ok(result) => {
                info!(length = selection.length, "password generated");
                state.view.password_text.zeroize();
                state.view.password_text = result.password.clone();
                state.view.copy_enabled = true;
                state.view.visibility_enabled = true;
                state.view.entropy_text = format!("{} bits", result.entropy);
                state.view.rating_text = format!("({})", result.strength_estimate);
                if let Some(mut previous) = state.last_result.replace(result.clone()) {
                    previous.password.zeroize();
                }
                Ok(result)
            }
            Err(err) => {
                self.notifications
                    .notify(format!("Error: {}", err.message()), Severity::Error);
                Err(err.into())
            }
        }
    }

    /// Copies the displayed password. `false` when nothing was generated yet.
    pub async fn copy(&self) -> bool {
        let mut password = {
            let state = self.state.lock().await;
            if state.view.password_text.is_empty() {
                return false;
            }
            state.view.password_text.clone()
        };
        let copied = self.clipboard.copy(&password).await;
        password.zeroize();
        if copied {
            self.notifications.notify_for(
                COPY_CONFIRMATION,
                Severity::Success,
                COPY_CONFIRMATION_DURATION,
            );
        }
        copied
    }

    /// Returns whether the password is masked afterwards.
    pub async fn toggle_visibility(&self) -> bool {
        let mut state = self.state.lock().await;
        state.view.masked = !state.view.masked;
        state.view.masked
    }
}

#[cfg(test)]
#[path = "tests/generator_tests.rs"]
mod tests;
