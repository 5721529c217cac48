use std::time::Duration;

use crate::issues::IssueId;

use super::geo::{LatLngBounds, Size, View};
use super::markers::MarkerDescriptor;

/// A viewport change requested from the surface
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportDirective {
    /// Animate to `target` over `duration`
    FlyTo { target: View, duration: Duration },
    /// Frame `bounds`; `target` is the view it resolves to on the current surface
    FitBounds {
        bounds: LatLngBounds,
        padding: f64,
        max_zoom: f64,
        target: View,
    },
}

impl ViewportDirective {
    pub fn target(&self) -> View {
        match self {
            ViewportDirective::FlyTo { target, .. } => *target,
            ViewportDirective::FitBounds { target, .. } => *target,
        }
    }

    pub fn is_fly_to(&self) -> bool {
        matches!(self, ViewportDirective::FlyTo { .. })
    }
}

/// Rendering surface the map core drives.
///
/// Directives are fire-and-forget: a surface animates them however it likes
/// and a newer directive replaces any transition still in flight.
pub trait MapSurface {
    /// Drawable area in display units
    fn size(&self) -> Size;

    /// Jump to a view without animation
    fn set_view(&mut self, view: View);

    fn apply(&mut self, directive: &ViewportDirective);

    fn marker(&self, id: &IssueId) -> Option<&MarkerDescriptor>;

    fn marker_ids(&self) -> Vec<IssueId>;

    /// Place a marker, replacing any marker with the same id
    fn upsert_marker(&mut self, marker: MarkerDescriptor);

    fn remove_marker(&mut self, id: &IssueId);
}

/// Surface double that records everything applied to it
#[cfg(test)]
#[derive(Debug)]
pub struct RecordingSurface {
    pub size: Size,
    pub views: Vec<View>,
    pub directives: Vec<ViewportDirective>,
    pub markers: std::collections::BTreeMap<IssueId, MarkerDescriptor>,
    pub upserts: usize,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            views: Vec::new(),
            directives: Vec::new(),
            markers: std::collections::BTreeMap::new(),
            upserts: 0,
        }
    }
}

#[cfg(test)]
impl MapSurface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn set_view(&mut self, view: View) {
        self.views.push(view);
    }

    fn apply(&mut self, directive: &ViewportDirective) {
        self.views.push(directive.target());
        self.directives.push(directive.clone());
    }

    fn marker(&self, id: &IssueId) -> Option<&MarkerDescriptor> {
        self.markers.get(id)
    }

    fn marker_ids(&self) -> Vec<IssueId> {
        self.markers.keys().cloned().collect()
    }

    fn upsert_marker(&mut self, marker: MarkerDescriptor) {
        self.upserts += 1;
        self.markers.insert(marker.id.clone(), marker);
    }

    fn remove_marker(&mut self, id: &IssueId) {
        self.markers.remove(id);
    }
}
