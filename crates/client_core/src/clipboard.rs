//! Clipboard writes with a two-tier fallback.

use std::{
    io::Write,
    process::{Child, Command, Stdio},
    sync::Arc,
};

use arboard::Clipboard;
use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroize;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write denied: {0}")]
    Denied(String),
    #[error("fallback copy failed: {0}")]
    Fallback(String),
}

pub trait ClipboardBackend: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Text staged for the legacy copy path. Dropping it tears the staging
/// resource down, whatever the outcome of [`StagedCopy::copy_selection`].
pub trait StagedCopy {
    fn copy_selection(&mut self) -> Result<(), ClipboardError>;
}

pub trait ClipboardFallback: Send + Sync {
    fn stage<'a>(&'a self, text: &str) -> Result<Box<dyn StagedCopy + 'a>, ClipboardError>;
}

pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            Clipboard::new().map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| ClipboardError::Denied(err.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipboardCommand {
    program: &'static str,
    args: &'static [&'static str],
}

/// Pipes the text into the platform clipboard utility. The child process is
/// the staging element; it never touches the filesystem.
pub struct CommandFallback {
    candidates: Vec<ClipboardCommand>,
}

impl CommandFallback {
    pub fn for_platform() -> Self {
        let candidates = if cfg!(target_os = "macos") {
            vec![ClipboardCommand {
                program: "pbcopy",
                args: &[],
            }]
        } else if cfg!(target_os = "windows") {
            vec![ClipboardCommand {
                program: "clip",
                args: &[],
            }]
        } else {
            vec![
                ClipboardCommand {
                    program: "wl-copy",
                    args: &[],
                },
                ClipboardCommand {
                    program: "xclip",
                    args: &["-selection", "clipboard"],
                },
                ClipboardCommand {
                    program: "xsel",
                    args: &["--clipboard", "--input"],
                },
            ]
        };
        Self { candidates }
    }
}

impl ClipboardFallback for CommandFallback {
    fn stage<'a>(&'a self, text: &str) -> Result<Box<dyn StagedCopy + 'a>, ClipboardError> {
        for candidate in &self.candidates {
            match Command::new(candidate.program)
                .args(candidate.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => {
                    debug!(program = candidate.program, "staged clipboard fallback");
                    return Ok(Box::new(StagedProcess {
                        child: Some(child),
                        text: text.to_string(),
                    }));
                }
                Err(err) => {
                    debug!(program = candidate.program, error = %err, "clipboard utility unavailable");
                }
            }
        }
        Err(ClipboardError::Fallback(
            "no clipboard utility available".to_string(),
        ))
    }
}

struct StagedProcess {
    child: Option<Child>,
    text: String,
}

impl StagedCopy for StagedProcess {
    fn copy_selection(&mut self) -> Result<(), ClipboardError> {
        let Some(child) = self.child.as_mut() else {
            return Err(ClipboardError::Fallback("staging already released".to_string()));
        };
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClipboardError::Fallback("clipboard utility has no stdin".to_string()))?;
        stdin
            .write_all(self.text.as_bytes())
            .map_err(|err| ClipboardError::Fallback(err.to_string()))?;
        drop(stdin);

        let status = child
            .wait()
            .map_err(|err| ClipboardError::Fallback(err.to_string()))?;
        self.child = None;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Fallback(format!(
                "clipboard utility exited with {status}"
            )))
        }
    }
}

impl Drop for StagedProcess {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.text.zeroize();
    }
}

pub struct ClipboardService {
    primary: Box<dyn ClipboardBackend>,
    fallback: Box<dyn ClipboardFallback>,
}

impl ClipboardService {
    pub fn new(primary: Box<dyn ClipboardBackend>, fallback: Box<dyn ClipboardFallback>) -> Self {
        Self { primary, fallback }
    }

    pub fn system() -> Self {
        Self::new(
            Box::new(SystemClipboard),
            Box::new(CommandFallback::for_platform()),
        )
    }

    /// Returns whether either tier managed to copy `text`. Runs on the
    /// blocking pool.
    pub async fn copy(self: &Arc<Self>, text: &str) -> bool {
        let service = Arc::clone(self);
        let mut text = text.to_string();
        let copied = tokio::task::spawn_blocking(move || {
            let copied = service.copy_blocking(&text);
            text.zeroize();
            copied
        })
        .await;
        match copied {
            Ok(copied) => copied,
            Err(err) => {
                warn!(error = %err, "clipboard task failed");
                false
            }
        }
    }

    fn copy_blocking(&self, text: &str) -> bool {
        match self.primary.set_text(text) {
            Ok(()) => return true,
            Err(err) => debug!(error = %err, "primary clipboard write failed, trying fallback"),
        }

        let mut staged = match self.fallback.stage(text) {
            Ok(staged) => staged,
            Err(err) => {
                warn!(error = %err, "clipboard fallback unavailable");
                return false;
            }
        };
        match staged.copy_selection() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "clipboard fallback failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/clipboard_tests.rs"]
mod tests;
