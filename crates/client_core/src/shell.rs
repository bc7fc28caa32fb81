//! Composition root: wires every controller in dependency order.

use std::{sync::Arc, time::Duration};

use shared::protocol::HealthStatus;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    analyzer::AnalyzerPanel,
    bulk::BulkWorkflowController,
    clipboard::ClipboardService,
    generator::GeneratorPanel,
    notifications::{NotificationCenter, Severity},
    settings::ClientSettings,
    tabs::TabController,
    theme::{PreferenceStore, ThemeManager},
    transport::{PasswordServiceApi, Transport},
};

const ABOUT_NOTICE_DURATION: Duration = Duration::from_millis(4000);

pub struct AppShell {
    pub notifications: NotificationCenter,
    pub clipboard: Arc<ClipboardService>,
    pub theme: ThemeManager,
    pub tabs: TabController,
    pub generator: Arc<GeneratorPanel>,
    pub analyzer: Arc<AnalyzerPanel>,
    pub bulk: Arc<BulkWorkflowController>,
    api: PasswordServiceApi,
}

impl AppShell {
    /// Builds the controllers and fires the initial entropy preview.
    /// Must run inside a tokio runtime.
    pub fn start(
        settings: &ClientSettings,
        transport: Arc<dyn Transport>,
        clipboard: ClipboardService,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        info!(api_root = %settings.api_root, "initializing password utility");

        let api = PasswordServiceApi::new(transport);
        let notifications = NotificationCenter::new();
        let clipboard = Arc::new(clipboard);

        let theme = ThemeManager::new(preferences, notifications.clone());
        theme.load_initial();
        let tabs = TabController::new(notifications.clone());

        let generator = GeneratorPanel::new(
            api.clone(),
            Arc::clone(&clipboard),
            notifications.clone(),
            settings.generator_quiet_period(),
        );
        let analyzer = AnalyzerPanel::new(
            api.clone(),
            notifications.clone(),
            settings.analyzer_quiet_period(),
        );
        let bulk = BulkWorkflowController::new(
            api.clone(),
            Arc::clone(&clipboard),
            notifications.clone(),
            generator.selection(),
            settings.download_dir.clone(),
        );

        let initial_preview = Arc::clone(&generator);
        tokio::spawn(async move {
            initial_preview.refresh_entropy_preview().await;
        });

        info!("password utility initialized");
        Self {
            notifications,
            clipboard,
            theme,
            tabs,
            generator,
            analyzer,
            bulk,
            api,
        }
    }

    /// Best effort; a failing probe is logged and never surfaces to the user.
    pub async fn probe_health(&self) -> Option<HealthStatus> {
        probe(&self.api).await
    }

    pub fn spawn_health_probe(&self) -> JoinHandle<Option<HealthStatus>> {
        let api = self.api.clone();
        tokio::spawn(async move { probe(&api).await })
    }

    pub fn about(&self) {
        self.notifications.notify_for(
            "Secure Password Utility v2.0 - Enterprise-grade security",
            Severity::Info,
            ABOUT_NOTICE_DURATION,
        );
    }

    pub fn privacy(&self) {
        self.notifications.notify_for(
            "All operations in-memory only. Zero data persistence.",
            Severity::Info,
            ABOUT_NOTICE_DURATION,
        );
    }
}

async fn probe(api: &PasswordServiceApi) -> Option<HealthStatus> {
    match api.health().await {
        Ok(health) => {
            if health.success {
                info!(status = %health.status, "API Status: {}", health.status);
            } else {
                warn!(status = %health.status, "password service reports unhealthy");
            }
            Some(health)
        }
        Err(err) => {
            warn!(error = %err, "API health check failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
