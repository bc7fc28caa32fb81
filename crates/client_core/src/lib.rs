//! Client-side coordination layer of the password utility: debounced live
//! previews, explicit generate/analyze actions, the bulk workflow, clipboard,
//! notifications and theme state, all talking to the password service through
//! a single transport.

pub mod analyzer;
pub mod bulk;
pub mod clipboard;
pub mod debounce;
pub mod error;
pub mod generator;
pub mod notifications;
pub mod settings;
pub mod shell;
pub mod tabs;
pub mod theme;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use analyzer::{AnalysisReport, AnalyzerPanel, AnalyzerView, StrengthMeterView};
pub use bulk::{BulkView, BulkWorkflowController, ExportError, ModalState};
pub use clipboard::{
    ClipboardBackend, ClipboardError, ClipboardFallback, ClipboardService, StagedCopy,
};
pub use debounce::{Debouncer, ResponseSequencer};
pub use error::{PanelError, ServiceError, ServiceErrorKind};
pub use generator::{GeneratorPanel, GeneratorView};
pub use notifications::{Notification, NotificationCenter, NotificationEvent, Severity};
pub use settings::{load_settings, load_settings_from, ClientSettings};
pub use shell::AppShell;
pub use tabs::{Tab, TabController};
pub use theme::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, ThemeManager};
pub use transport::{HttpTransport, PasswordServiceApi, Transport};
