use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tracing::debug;

use crate::notifications::{NotificationCenter, Severity};

const TAB_NOTICE_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Generator,
    Analyzer,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Generator => "Password Generator",
            Tab::Analyzer => "Password Analyzer",
        }
    }
}

pub struct TabController {
    active: Mutex<Tab>,
    notifications: NotificationCenter,
}

impl TabController {
    pub fn new(notifications: NotificationCenter) -> Self {
        Self {
            active: Mutex::new(Tab::default()),
            notifications,
        }
    }

    pub fn active(&self) -> Tab {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_active(&self, tab: Tab) -> bool {
        self.active() == tab
    }

    pub fn switch(&self, tab: Tab) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = tab;
        debug!(tab = tab.label(), "switched tab");
        self.notifications.notify_for(
            format!("Switched to {}", tab.label()),
            Severity::Info,
            TAB_NOTICE_DURATION,
        );
    }
}

#[cfg(test)]
#[path = "tests/tabs_tests.rs"]
mod tests;
