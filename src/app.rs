use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::Args;
use crate::error::{IssueMapError, Result};
use crate::issues::{is_mappable, Issue, IssueId};
use crate::map::{FocusTarget, View, ViewportConfig};

/// Highest zoom the terminal map allows
pub const MAX_ZOOM: f64 = 19.0;

/// Validated startup settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: String,
    /// `None` disables polling
    pub refresh: Option<Duration>,
    pub viewport: ViewportConfig,
    pub initial_focus: Option<FocusTarget>,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self> {
        check_zoom("zoom", args.zoom)?;
        check_zoom("focus-zoom", args.focus_zoom)?;
        check_zoom("max-zoom", args.max_zoom)?;

        if !args.fly_seconds.is_finite() || args.fly_seconds < 0.0 {
            return Err(IssueMapError::Config(format!(
                "fly-seconds must be a non-negative number, got {}",
                args.fly_seconds
            )));
        }
        if !args.padding.is_finite() || args.padding < 0.0 {
            return Err(IssueMapError::Config(format!(
                "padding must be a non-negative number, got {}",
                args.padding
            )));
        }
        if args.source.trim().is_empty() {
            return Err(IssueMapError::Config("source must not be empty".into()));
        }

        let fly_duration = Duration::try_from_secs_f64(args.fly_seconds).map_err(|e| {
            IssueMapError::Config(format!(
                "fly-seconds {} is out of range: {}",
                args.fly_seconds, e
            ))
        })?;

        Ok(Self {
            source: args.source.clone(),
            refresh: (args.refresh_seconds > 0).then(|| Duration::from_secs(args.refresh_seconds)),
            viewport: ViewportConfig {
                initial: View::new(args.center, args.zoom),
                focus_zoom: args.focus_zoom,
                fly_duration,
                padding: args.padding,
                max_zoom: args.max_zoom,
            },
            initial_focus: args.focus.map(FocusTarget::from),
        })
    }
}

fn check_zoom(name: &str, zoom: f64) -> Result<()> {
    if zoom.is_finite() && (0.0..=MAX_ZOOM).contains(&zoom) {
        Ok(())
    } else {
        Err(IssueMapError::Config(format!(
            "{} must be between 0 and {}, got {}",
            name, MAX_ZOOM, zoom
        )))
    }
}

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    /// Shutdown flag
    pub should_quit: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            settings,
            should_quit: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Signal shutdown
    pub fn quit(&self) {
        self.should_quit.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown requested
    pub fn is_quitting(&self) -> bool {
        self.should_quit.load(Ordering::SeqCst)
    }
}

/// Missing coordinates become NaN, which the controller treats as no focus
fn focus_target_of(issue: &Issue) -> FocusTarget {
    FocusTarget::new(issue.lat.unwrap_or(f64::NAN), issue.lng.unwrap_or(f64::NAN))
}

/// Current focus request and the issue it came from, if any
#[derive(Debug, Clone, PartialEq)]
struct Focus {
    target: FocusTarget,
    issue: Option<IssueId>,
}

/// Issue list with the user's selection, focus and popup state.
///
/// Any change that affects the map marks the board dirty so the UI loop
/// knows to re-evaluate the map core.
#[derive(Debug)]
pub struct IssueBoard {
    issues: Vec<Issue>,
    selected: usize,
    focus: Option<Focus>,
    popup_open: bool,
    dirty: bool,
}

impl IssueBoard {
    pub fn new(initial_focus: Option<FocusTarget>) -> Self {
        Self {
            issues: Vec::new(),
            selected: 0,
            focus: initial_focus.map(|target| Focus {
                target,
                issue: None,
            }),
            popup_open: false,
            dirty: true,
        }
    }

    /// Replace the issue list, keeping the selection on the same issue when it survives.
    ///
    /// A focus taken from an issue follows that issue's new position and is
    /// released when the issue is gone.
    pub fn set_issues(&mut self, issues: Vec<Issue>) {
        let selected_id = self.selected_issue().map(|issue| issue.id.clone());
        self.issues = issues;
        self.selected = selected_id
            .and_then(|id| self.issues.iter().position(|issue| issue.id == id))
            .unwrap_or(0);

        if let Some(id) = self.focused_issue().cloned() {
            self.focus = self
                .issues
                .iter()
                .find(|issue| issue.id == id)
                .map(|issue| Focus {
                    target: focus_target_of(issue),
                    issue: Some(id),
                });
        }
        self.dirty = true;
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.issues.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.issues.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Focus the selected issue, or release focus if it is already focused
    pub fn toggle_focus(&mut self) {
        let Some(issue) = self.selected_issue() else {
            return;
        };

        if self.focused_issue() == Some(&issue.id) {
            self.focus = None;
        } else {
            self.focus = Some(Focus {
                target: focus_target_of(issue),
                issue: Some(issue.id.clone()),
            });
        }
        self.dirty = true;
    }

    pub fn clear_focus(&mut self) {
        if self.focus.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn focus_target(&self) -> Option<FocusTarget> {
        self.focus.as_ref().map(|focus| focus.target)
    }

    pub fn focused_issue(&self) -> Option<&IssueId> {
        self.focus.as_ref().and_then(|focus| focus.issue.as_ref())
    }

    /// Open the popup when the selected issue has a marker, or close it
    pub fn toggle_popup(&mut self, on_map: bool) {
        self.popup_open = !self.popup_open && on_map;
    }

    pub fn popup_open(&self) -> bool {
        self.popup_open
    }

    pub fn mapped_count(&self) -> usize {
        self.issues.iter().filter(|issue| is_mappable(issue)).count()
    }

    /// Whether the map needs re-evaluating; clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
