mod camera;
mod geo;
mod markers;
mod palette;
mod surface;
mod viewport;

pub use camera::Camera;
pub use geo::{project, world_size, LatLng, LatLngBounds, Size, View};
pub use markers::{present, sync_markers, MarkerDescriptor, MarkerDiff, ICON_SIZE};
pub use palette::{CategoryPalette, Rgb};
pub use surface::{MapSurface, ViewportDirective};
pub use viewport::{FocusTarget, ViewportConfig, ViewportController};

use tracing::debug;

use crate::issues::{mappable, Issue};

/// What one evaluation changed on the surface
#[derive(Debug, Default)]
pub struct MapUpdate {
    pub markers: MarkerDiff,
    pub viewport: Option<ViewportDirective>,
    pub mapped: usize,
}

/// Issue map core: validator → marker presenter + viewport controller
pub struct IssueMap {
    palette: CategoryPalette,
    controller: ViewportController,
}

impl IssueMap {
    pub fn new(
        palette: CategoryPalette,
        config: ViewportConfig,
        surface: &mut dyn MapSurface,
    ) -> Self {
        Self {
            palette,
            controller: ViewportController::new(config, surface),
        }
    }

    pub fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.controller
    }

    /// Evaluate after the issue list or focus target changed
    pub fn on_inputs_changed(
        &mut self,
        surface: &mut dyn MapSurface,
        issues: &[Issue],
        focus: Option<FocusTarget>,
    ) -> MapUpdate {
        let mappable = mappable(issues);
        let markers = sync_markers(surface, present(&mappable, &self.palette));
        let viewport = self.controller.on_inputs_changed(surface, &mappable, focus);

        debug!(
            issues = issues.len(),
            mapped = mappable.len(),
            moved = viewport.is_some(),
            "Map updated"
        );

        MapUpdate {
            markers,
            viewport,
            mapped: mappable.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{test_issue, IssueId};
    use super::surface::RecordingSurface;

    fn issue_map(surface: &mut RecordingSurface) -> IssueMap {
        IssueMap::new(CategoryPalette::default(), ViewportConfig::default(), surface)
    }

    #[test]
    fn test_end_to_end_skips_unmappable_issue() {
        let mut surface = RecordingSurface::new(Size::new(640.0, 384.0));
        let mut map = issue_map(&mut surface);
        let issues = vec![
            test_issue("1", Some(12.97), Some(77.59), "garbage"),
            test_issue("2", None, Some(77.60), "road"),
        ];

        let update = map.on_inputs_changed(&mut surface, &issues, None);

        assert_eq!(update.mapped, 1);
        assert_eq!(update.markers.added, vec![IssueId::from("1")]);
        assert_eq!(surface.markers.len(), 1);
        assert_eq!(
            surface.markers[&IssueId::from("1")].color,
            map.palette().color_for("garbage")
        );

        match update.viewport {
            Some(ViewportDirective::FitBounds { bounds, target, max_zoom, .. }) => {
                assert_eq!(bounds, LatLngBounds::from_point(LatLng::new(12.97, 77.59)));
                assert!(target.zoom <= max_zoom);
            }
            other => panic!("expected a bounds fit, got {:?}", other),
        }
        assert_eq!(map.viewport().view(), surface.directives[0].target());
    }

    #[test]
    fn test_all_invalid_draws_nothing() {
        let mut surface = RecordingSurface::new(Size::new(640.0, 384.0));
        let mut map = issue_map(&mut surface);
        let issues = vec![
            test_issue("1", None, None, "garbage"),
            test_issue("2", Some(f64::NAN), Some(77.60), "road"),
        ];

        let update = map.on_inputs_changed(&mut surface, &issues, None);
        assert_eq!(update.mapped, 0);
        assert!(update.markers.is_empty());
        assert!(update.viewport.is_none());
        assert!(surface.markers.is_empty());
        assert_eq!(map.viewport().view(), ViewportConfig::default().initial);
    }

    #[test]
    fn test_focus_with_markers() {
        let mut surface = RecordingSurface::new(Size::new(640.0, 384.0));
        let mut map = issue_map(&mut surface);
        let issues = vec![
            test_issue("1", Some(12.97), Some(77.59), "garbage"),
            test_issue("2", Some(12.93), Some(77.61), "water"),
        ];

        let update = map.on_inputs_changed(&mut surface, &issues, Some(FocusTarget::new(12.93, 77.61)));
        assert!(update.viewport.unwrap().is_fly_to());
        assert_eq!(surface.markers.len(), 2);

        // Same inputs again: no marker churn, no movement
        let update = map.on_inputs_changed(&mut surface, &issues, Some(FocusTarget::new(12.93, 77.61)));
        assert!(update.markers.is_empty());
        assert!(update.viewport.is_none());
    }
}
