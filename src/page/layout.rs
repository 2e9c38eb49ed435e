//! Viewport-dependent layout: resize debouncing and responsive tables

use std::time::{Duration, Instant};

/// Coalesces bursts of calls into one, fired `wait` after the last call
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// Replace any pending value and restart the timer
    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.wait));
    }

    /// The latest value, once its timer has expired
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, due)) if now >= due => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// How tables are drawn: as a grid, or as stacked `label: value` cards on
/// narrow screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Columns,
    Cards,
}

impl TableLayout {
    pub fn for_width(columns: u16, card_columns: u16) -> Self {
        if columns <= card_columns {
            TableLayout::Cards
        } else {
            TableLayout::Columns
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_coalesces_burst() {
        let start = Instant::now();
        let mut resize = Debouncer::new(Duration::from_millis(250));

        resize.call((100u16, 30u16), start);
        resize.call((90, 30), start + Duration::from_millis(100));
        resize.call((80, 24), start + Duration::from_millis(200));

        assert_eq!(resize.poll(start + Duration::from_millis(300)), None);
        assert!(resize.is_pending());
        assert_eq!(resize.poll(start + Duration::from_millis(450)), Some((80, 24)));
        assert_eq!(resize.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_table_layout_breakpoint() {
        assert_eq!(TableLayout::for_width(100, 100), TableLayout::Cards);
        assert_eq!(TableLayout::for_width(101, 100), TableLayout::Columns);
    }
}
