//! Password strength analysis and the live strength meter.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::CharacterSet,
    error::ValidationError,
    protocol::AnalysisResult,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::{
    debounce::{Debouncer, ResponseSequencer},
    error::PanelError,
    notifications::{NotificationCenter, Severity},
    transport::PasswordServiceApi,
};

pub const ANALYZE_LABEL: &str = "Analyze Password";
pub const ANALYZING_LABEL: &str = "Analyzing...";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrengthMeterView {
    pub visible: bool,
    pub score: f64,
    pub label: String,
    pub css_class: String,
}

impl StrengthMeterView {
    fn from_analysis(analysis: &AnalysisResult) -> Self {
        Self {
            visible: true,
            score: analysis.score,
            label: analysis.strength.clone(),
            css_class: strength_class(&analysis.strength),
        }
    }
}

/// `"Very Strong"` -> `"very-strong"`.
pub fn strength_class(strength: &str) -> String {
    strength.trim().to_lowercase().replace(' ', "-")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetric {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub metrics: Vec<ReportMetric>,
    pub character_types: Vec<(CharacterSet, bool)>,
    pub detected_patterns: Vec<String>,
    pub recommendations: Vec<String>,
}

impl AnalysisReport {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let diversity = (analysis.diversity_score.clamp(0.0, 1.0) * 100.0).round();
        Self {
            metrics: vec![
                ReportMetric {
                    label: "Length",
                    value: format!("{} characters", analysis.length),
                },
                ReportMetric {
                    label: "Entropy",
                    value: format!("{} bits", analysis.entropy),
                },
                ReportMetric {
                    label: "Diversity",
                    value: format!("{diversity}%"),
                },
                ReportMetric {
                    label: "Crack Time",
                    value: analysis.crack_time.clone(),
                },
            ],
            character_types: vec![
                (CharacterSet::Uppercase, analysis.has_uppercase),
                (CharacterSet::Lowercase, analysis.has_lowercase),
                (CharacterSet::Numbers, analysis.has_numbers),
                (CharacterSet::Symbols, analysis.has_symbols),
            ],
            detected_patterns: analysis.detected_patterns.clone(),
            recommendations: analysis.recommendations.clone(),
        }
    }

    pub fn metric(&self, label: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|metric| metric.label == label)
            .map(|metric| metric.value.as_str())
    }

    pub fn shows_detected_issues(&self) -> bool {
        !self.detected_patterns.is_empty()
    }

    pub fn shows_recommendations(&self) -> bool {
        !self.recommendations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerView {
    pub input_len: usize,
    pub masked: bool,
    pub analyze_enabled: bool,
    pub analyze_label: String,
    pub meter: StrengthMeterView,
    pub report: Option<AnalysisReport>,
}

struct AnalyzerState {
    input: String,
    masked: bool,
    analyze_enabled: bool,
    meter: StrengthMeterView,
    report: Option<AnalysisReport>,
}

pub struct AnalyzerPanel {
    api: PasswordServiceApi,
    notifications: NotificationCenter,
    state: Mutex<AnalyzerState>,
    meter_preview: Debouncer,
    meter_sequence: ResponseSequencer,
    report_sequence: ResponseSequencer,
}

impl AnalyzerPanel {
    pub fn new(
        api: PasswordServiceApi,
        notifications: NotificationCenter,
        meter_quiet: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            notifications,
            state: Mutex::new(AnalyzerState {
                input: String::new(),
                masked: true,
                analyze_enabled: true,
                meter: StrengthMeterView::default(),
                report: None,
            }),
            meter_preview: Debouncer::new(meter_quiet),
            meter_sequence: ResponseSequencer::default(),
            report_sequence: ResponseSequencer::default(),
        })
    }

    pub async fn view(&self) -> AnalyzerView {
        let state = self.state.lock().await;
        AnalyzerView {
            input_len: state.input.chars().count(),
            masked: state.masked,
            analyze_enabled: state.analyze_enabled,
            analyze_label: if state.analyze_enabled {
                ANALYZE_LABEL.to_string()
            } else {
                ANALYZING_LABEL.to_string()
            },
            meter: state.meter.clone(),
            report: state.report.clone(),
        }
    }

    pub async fn set_input(self: &Arc<Self>, text: impl Into<String>) {
        let is_empty = {
            let mut state = self.state.lock().await;
            state.input.zeroize();
            state.input = text.into();
            if state.input.is_empty() {
                state.meter.visible = false;
            }
            state.input.is_empty()
        };

        if is_empty {
            self.meter_preview.cancel();
            self.meter_sequence.invalidate();
            return;
        }

        let panel = Arc::clone(self);
        self.meter_preview.schedule(async move {
            panel.refresh_strength_meter().await;
        });
    }

    pub async fn refresh_strength_meter(&self) {
        let mut password = self.state.lock().await.input.clone();
        if password.is_empty() {
            return;
        }

        let ticket = self.meter_sequence.issue();
        let outcome = self.api.analyze(&password).await;
        password.zeroize();
        match outcome {
            Ok(analysis) => {
                if !self.meter_sequence.is_current(ticket) {
                    debug!("discarding stale strength meter response");
                    return;
                }
                self.state.lock().await.meter = StrengthMeterView::from_analysis(&analysis);
            }
            Err(err) => warn!(error = %err, "strength meter update failed"),
        }
    }

    pub async fn analyze(&self) -> Result<AnalysisReport, PanelError> {
        let mut password = {
            let mut state = self.state.lock().await;
            if !state.analyze_enabled {
                return Err(PanelError::Busy);
            }
            if state.input.is_empty() {
                let err = ValidationError::EmptyPassword;
                self.notifications.notify(err.to_string(), Severity::Error);
                return Err(err.into());
            }
            state.analyze_enabled = false;
            state.input.clone()
        };

        let ticket = self.report_sequence.issue();
        let outcome = self.api.analyze(&password).await;
        password.zeroize();

        let mut state = self.state.lock().await;
        state.analyze_enabled = true;
        if !self.report_sequence.is_current(ticket) {
            debug!("input cleared during analysis, dropping report");
            return Err(PanelError::Superseded);
        }
        match outcome {
            Ok(analysis) => {
                info!(
                    length = analysis.length,
                    patterns = analysis.detected_patterns.len(),
                    "password analyzed"
                );
                let report = AnalysisReport::from_analysis(&analysis);
                state.report = Some(report.clone());
                Ok(report)
            }
            Err(err) => {
                self.notifications
                    .notify(format!("Error: {}", err.message()), Severity::Error);
                Err(err.into())
            }
        }
    }

    pub async fn clear_input(&self) {
        self.meter_preview.cancel();
        self.meter_sequence.invalidate();
        self.report_sequence.invalidate();
        let mut state = self.state.lock().await;
        state.input.zeroize();
        state.input.clear();
        state.meter = StrengthMeterView::default();
        state.report = None;
    }

    /// Returns whether the input is masked afterwards.
    pub async fn toggle_visibility(&self) -> bool {
        let mut state = self.state.lock().await;
        state.masked = !state.masked;
        state.masked
    }
}

#[cfg(test)]
#[path = "tests/analyzer_tests.rs"]
mod tests;
