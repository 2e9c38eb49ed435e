//! Tab panels and the links that open them

use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Visibility of a panel during a cross-fade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    FadingIn { until: Instant },
    FadingOut { until: Instant },
    Shown,
}

impl Phase {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Phase::Hidden)
    }
}

#[derive(Debug, Clone)]
pub struct TabPanel {
    pub name: &'static str,
    pub active: bool,
    pub phase: Phase,
}

#[derive(Debug, Clone)]
pub struct TabLink {
    pub target: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Static description of one tab: panel name and link label
#[derive(Debug, Clone, Copy)]
pub struct TabSpec {
    pub name: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone)]
pub struct TabSet {
    pub panels: Vec<TabPanel>,
    pub links: Vec<TabLink>,
    transition: Duration,
}

impl TabSet {
    /// Build the set and activate the default tab: `default` if it names a
    /// panel, otherwise the panel of the first link
    pub fn new(specs: &[TabSpec], default: Option<&str>, transition: Duration) -> Self {
        let panels = specs
            .iter()
            .map(|spec| TabPanel {
                name: spec.name,
                active: false,
                phase: Phase::Hidden,
            })
            .collect();
        let links = specs
            .iter()
            .map(|spec| TabLink {
                target: spec.name,
                label: spec.label,
                active: false,
            })
            .collect();

        let mut tabs = Self {
            panels,
            links,
            transition,
        };

        let initial = default
            .and_then(|name| tabs.panel_index(name))
            .or_else(|| tabs.links.first().and_then(|l| tabs.panel_index(l.target)));

        if let Some(index) = initial {
            tabs.panels[index].active = true;
            tabs.panels[index].phase = Phase::Shown;
            let name = tabs.panels[index].name;
            if let Some(link) = tabs.links.iter_mut().find(|l| l.target == name) {
                link.active = true;
            }
        }
        tabs
    }

    fn panel_index(&self, name: &str) -> Option<usize> {
        self.panels.iter().position(|p| p.name == name)
    }

    pub fn active_panel(&self) -> Option<&TabPanel> {
        self.panels.iter().find(|p| p.active)
    }

    pub fn active_name(&self) -> Option<&'static str> {
        self.active_panel().map(|p| p.name)
    }

    pub fn active_link_index(&self) -> Option<usize> {
        self.links.iter().position(|l| l.active)
    }

    /// Activate `name` and the link at `link_index`, cross-fading from the
    /// previously active panel. Returns false (and changes nothing) when the
    /// name does not resolve to a panel.
    pub fn open_tab(&mut self, link_index: usize, name: &str, now: Instant) -> bool {
        let Some(target) = self.panel_index(name) else {
            warn!("Tab '{}' does not exist", name);
            return false;
        };
        let previous = self.panels.iter().position(|p| p.active);

        for (i, panel) in self.panels.iter_mut().enumerate() {
            panel.active = i == target;
            if Some(i) != previous && i != target {
                panel.phase = Phase::Hidden;
            }
        }

        let link = if link_index < self.links.len() {
            Some(link_index)
        } else {
            self.links.iter().position(|l| l.target == name)
        };
        for (i, l) in self.links.iter_mut().enumerate() {
            l.active = Some(i) == link;
        }

        match previous {
            Some(prev) if prev != target => {
                let until = now + self.transition;
                self.panels[prev].phase = Phase::FadingOut { until };
                self.panels[target].phase = Phase::FadingIn { until };
            }
            _ => self.panels[target].phase = Phase::Shown,
        }

        debug!("Opened tab '{}'", name);
        true
    }

    /// Finish transitions whose deadline has passed
    pub fn tick(&mut self, now: Instant) {
        for panel in self.panels.iter_mut() {
            panel.phase = match panel.phase {
                Phase::FadingOut { until } if now >= until => Phase::Hidden,
                Phase::FadingIn { until } if now >= until => Phase::Shown,
                other => other,
            };
        }
    }

    pub fn in_transition(&self) -> bool {
        self.panels
            .iter()
            .any(|p| matches!(p.phase, Phase::FadingIn { .. } | Phase::FadingOut { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[TabSpec] = &[
        TabSpec { name: "analysis", label: "Analysis" },
        TabSpec { name: "report", label: "Report" },
        TabSpec { name: "about", label: "About" },
    ];

    fn tabs() -> TabSet {
        TabSet::new(SPECS, Some("analysis"), Duration::from_millis(300))
    }

    fn assert_settled(tabs: &TabSet, name: &str) {
        let shown: Vec<_> = tabs.panels.iter().filter(|p| p.phase == Phase::Shown).collect();
        let active: Vec<_> = tabs.panels.iter().filter(|p| p.active).collect();
        assert_eq!(shown.len(), 1);
        assert_eq!(active.len(), 1);
        assert_eq!(shown[0].name, name);
        assert_eq!(active[0].name, name);
        assert_eq!(tabs.links.iter().filter(|l| l.active).count(), 1);
    }

    #[test]
    fn test_default_tab() {
        assert_settled(&tabs(), "analysis");

        let fallback = TabSet::new(SPECS, Some("missing"), Duration::ZERO);
        assert_eq!(fallback.active_name(), Some("analysis"));

        let second = TabSet::new(SPECS, Some("about"), Duration::ZERO);
        assert_eq!(second.active_name(), Some("about"));
        assert_eq!(second.active_link_index(), Some(2));
    }

    #[test]
    fn test_every_tab_settles_to_one_panel() {
        let start = Instant::now();
        for (i, spec) in SPECS.iter().enumerate() {
            let mut tabs = tabs();
            assert!(tabs.open_tab(i, spec.name, start));
            tabs.tick(start + Duration::from_millis(300));
            assert_settled(&tabs, spec.name);
            assert_eq!(tabs.active_link_index(), Some(i));
        }
    }

    #[test]
    fn test_cross_fade_phases() {
        let start = Instant::now();
        let mut tabs = tabs();
        tabs.open_tab(1, "report", start);

        assert!(matches!(tabs.panels[0].phase, Phase::FadingOut { .. }));
        assert!(matches!(tabs.panels[1].phase, Phase::FadingIn { .. }));
        assert!(tabs.panels[1].active);
        assert!(!tabs.panels[0].active);

        tabs.tick(start + Duration::from_millis(100));
        assert!(tabs.in_transition());

        tabs.tick(start + Duration::from_millis(300));
        assert!(!tabs.in_transition());
        assert_eq!(tabs.panels[0].phase, Phase::Hidden);
    }

    #[test]
    fn test_reopening_active_tab_shows_immediately() {
        let mut tabs = tabs();
        tabs.open_tab(0, "analysis", Instant::now());
        assert!(!tabs.in_transition());
        assert_settled(&tabs, "analysis");
    }

    #[test]
    fn test_unknown_tab_leaves_state_unchanged() {
        let mut tabs = tabs();
        assert!(!tabs.open_tab(1, "settings", Instant::now()));
        assert_settled(&tabs, "analysis");
        assert_eq!(tabs.active_link_index(), Some(0));
    }

    #[test]
    fn test_switch_during_transition() {
        let start = Instant::now();
        let mut tabs = tabs();
        tabs.open_tab(1, "report", start);
        tabs.open_tab(2, "about", start + Duration::from_millis(50));
        tabs.tick(start + Duration::from_secs(1));
        assert_settled(&tabs, "about");
    }
}
