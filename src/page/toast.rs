//! Transient notifications

use crate::config::UiConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Showing,
    Fading,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created: Instant,
}

/// Timing of a toast: enter, then show, then fade, then removed
#[derive(Debug, Clone, Copy)]
pub struct ToastTimings {
    pub enter: Duration,
    pub show: Duration,
    pub fade: Duration,
}

impl From<&UiConfig> for ToastTimings {
    fn from(ui: &UiConfig) -> Self {
        Self {
            enter: ui.toast_enter,
            show: ui.toast_show,
            fade: ui.toast_fade,
        }
    }
}

impl Toast {
    /// `None` once the toast has fully faded
    pub fn phase(&self, now: Instant, timings: &ToastTimings) -> Option<ToastPhase> {
        let age = now.saturating_duration_since(self.created);
        if age < timings.enter {
            Some(ToastPhase::Entering)
        } else if age < timings.show {
            Some(ToastPhase::Showing)
        } else if age < timings.show + timings.fade {
            Some(ToastPhase::Fading)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    timings: ToastTimings,
}

impl ToastQueue {
    pub fn new(timings: ToastTimings) -> Self {
        Self {
            toasts: VecDeque::new(),
            timings,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, level: ToastLevel, now: Instant) {
        self.toasts.push_back(Toast {
            message: message.into(),
            level,
            created: now,
        });
    }

    /// Drop toasts that have finished fading
    pub fn tick(&mut self, now: Instant) {
        let timings = self.timings;
        self.toasts.retain(|t| t.phase(now, &timings).is_some());
    }

    /// Live toasts with their current phase, oldest first
    pub fn visible(&self, now: Instant) -> Vec<(&Toast, ToastPhase)> {
        self.toasts
            .iter()
            .filter_map(|t| t.phase(now, &self.timings).map(|p| (t, p)))
            .collect()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.toasts.iter().map(|t| t.message.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
