//! Step wizard: Upload, Select & Preview, Analysis

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Upload = 1,
    Select = 2,
    Complete = 3,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [WizardStep::Upload, WizardStep::Select, WizardStep::Complete];

    pub fn number(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Upload => "Upload",
            WizardStep::Select => "Select & Preview",
            WizardStep::Complete => "Analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepIndicator {
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct StepWizard {
    pub indicators: Vec<StepIndicator>,
    /// Fill of the progress bar, 0..=100
    pub progress: f64,
}

impl StepWizard {
    pub fn new(labels: &[&'static str]) -> Self {
        Self {
            indicators: labels
                .iter()
                .map(|&label| StepIndicator {
                    label,
                    active: false,
                })
                .collect(),
            progress: 0.0,
        }
    }

    pub fn total(&self) -> usize {
        self.indicators.len()
    }

    /// 1-based number of the active step
    pub fn current(&self) -> Option<usize> {
        self.indicators.iter().position(|s| s.active).map(|i| i + 1)
    }

    pub fn set_step(&mut self, step: WizardStep) -> bool {
        self.set_step_number(step.number())
    }

    /// Activate step `n` (1-based). Numbers outside `1..=total` are rejected
    /// and leave the wizard untouched.
    pub fn set_step_number(&mut self, n: usize) -> bool {
        let total = self.total();
        if total == 0 {
            return false;
        }
        if n == 0 || n > total {
            warn!("Ignoring wizard step {} outside 1..={}", n, total);
            return false;
        }

        for (i, indicator) in self.indicators.iter_mut().enumerate() {
            indicator.active = i == n - 1;
        }
        self.progress = 100.0 * n as f64 / total as f64;
        true
    }
}

impl Default for StepWizard {
    fn default() -> Self {
        let labels: Vec<&'static str> = WizardStep::ALL.iter().map(|s| s.label()).collect();
        Self::new(&labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_step_marks_one_indicator_and_progress() {
        let mut wizard = StepWizard::default();
        for k in 1..=3 {
            assert!(wizard.set_step_number(k));
            let active: Vec<usize> = wizard
                .indicators
                .iter()
                .enumerate()
                .filter(|(_, s)| s.active)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(active, vec![k - 1]);
            assert_eq!(wizard.progress, 100.0 * k as f64 / 3.0);
        }
        assert_eq!(wizard.current(), Some(3));
        assert_eq!(wizard.progress, 100.0);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut wizard = StepWizard::default();
        wizard.set_step(WizardStep::Select);

        assert!(!wizard.set_step_number(0));
        assert!(!wizard.set_step_number(4));
        assert_eq!(wizard.current(), Some(2));
        assert_eq!(wizard.progress, 100.0 * 2.0 / 3.0);
    }

    #[test]
    fn test_empty_wizard_is_noop() {
        let mut wizard = StepWizard::new(&[]);
        assert!(!wizard.set_step_number(1));
        assert_eq!(wizard.current(), None);
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(WizardStep::Upload.number(), 1);
        assert_eq!(WizardStep::Complete.number(), 3);
    }
}
