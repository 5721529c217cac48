use std::time::Duration;

use tracing::debug;

use crate::issues::{Issue, IssueId};

use super::geo::{fit_view, LatLng, LatLngBounds, Size, View};
use super::surface::{MapSurface, ViewportDirective};

/// Explicit request to center the map on a coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTarget {
    pub lat: f64,
    pub lng: f64,
}

impl FocusTarget {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The point to fly to, `None` unless both coordinates are finite
    pub fn position(&self) -> Option<LatLng> {
        let ll = LatLng::new(self.lat, self.lng);
        ll.is_finite().then_some(ll)
    }
}

impl From<LatLng> for FocusTarget {
    fn from(ll: LatLng) -> Self {
        Self::new(ll.lat, ll.lng)
    }
}

/// Viewport tunables
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    /// View applied once when the controller is created
    pub initial: View,
    /// Zoom used when flying to a focus target
    pub focus_zoom: f64,
    pub fly_duration: Duration,
    /// Padding around fitted bounds, per side, in display units
    pub padding: f64,
    /// Zoom cap when fitting bounds
    pub max_zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            initial: View::new(LatLng::new(12.9716, 77.5946), 12.0),
            focus_zoom: 14.0,
            fly_duration: Duration::from_millis(1500),
            padding: 50.0,
            max_zoom: 15.0,
        }
    }
}

/// Inputs of the last evaluation, compared by content
#[derive(Debug, Clone, PartialEq)]
struct Inputs {
    points: Vec<(IssueId, LatLng)>,
    focus: Option<LatLng>,
}

impl Inputs {
    fn new(mappable: &[&Issue], focus: Option<FocusTarget>) -> Self {
        Self {
            points: mappable
                .iter()
                .filter_map(|issue| Some((issue.id.clone(), issue.position()?)))
                .collect(),
            focus: focus.and_then(|f| f.position()),
        }
    }
}

#[derive(Debug)]
struct ViewportState {
    view: View,
    last_inputs: Option<Inputs>,
}

/// Decides how the map view follows the issue set and the focus target.
///
/// Priority on every evaluation: fly to a valid focus target, else fit the
/// bounds of the mappable issues, else leave the view alone. Evaluating the
/// same inputs twice does nothing the second time.
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
}

impl ViewportController {
    /// Create the controller and put the surface at the initial view
    pub fn new(config: ViewportConfig, surface: &mut dyn MapSurface) -> Self {
        surface.set_view(config.initial);
        debug!(
            lat = config.initial.center.lat,
            lng = config.initial.center.lng,
            zoom = config.initial.zoom,
            "Initial view"
        );

        Self {
            state: ViewportState {
                view: config.initial,
                last_inputs: None,
            },
            config,
        }
    }

    /// View the controller last committed to
    pub fn view(&self) -> View {
        self.state.view
    }

    /// Re-evaluate after the mappable set or focus target changed.
    ///
    /// Returns the directive applied to the surface, if any.
    pub fn on_inputs_changed(
        &mut self,
        surface: &mut dyn MapSurface,
        mappable: &[&Issue],
        focus: Option<FocusTarget>,
    ) -> Option<ViewportDirective> {
        let inputs = Inputs::new(mappable, focus);
        if self.state.last_inputs.as_ref() == Some(&inputs) {
            return None;
        }

        let directive = self.decide(&inputs, surface.size());
        self.state.last_inputs = Some(inputs);

        let Some(directive) = directive else {
            debug!("No focus and nothing mappable, keeping view");
            return None;
        };

        self.state.view = directive.target();
        surface.apply(&directive);
        Some(directive)
    }

    fn decide(&self, inputs: &Inputs, size: Size) -> Option<ViewportDirective> {
        if let Some(center) = inputs.focus {
            debug!(lat = center.lat, lng = center.lng, "Flying to focus target");
            return Some(ViewportDirective::FlyTo {
                target: View::new(center, self.config.focus_zoom),
                duration: self.config.fly_duration,
            });
        }

        let bounds = LatLngBounds::from_points(inputs.points.iter().map(|(_, ll)| *ll))?;
        let target = fit_view(&bounds, size, self.config.padding, self.config.max_zoom);
        debug!(
            points = inputs.points.len(),
            degenerate = bounds.is_degenerate(),
            zoom = target.zoom,
            "Fitting bounds"
        );

        Some(ViewportDirective::FitBounds {
            bounds,
            padding: self.config.padding,
            max_zoom: self.config.max_zoom,
            target,
        })
    }
}
