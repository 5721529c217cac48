use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::app::MAX_ZOOM;
use crate::issues::IssueId;
use crate::map::{
    project, world_size, Camera, LatLng, LatLngBounds, MapSurface, MarkerDescriptor, Size, View,
    ViewportDirective,
};

/// Display units per terminal cell (a typical 8x16 font)
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

/// Bounds fits ease in quickly rather than fly
const FIT_DURATION: Duration = Duration::from_millis(250);

/// Map surface drawn on a ratatui canvas
pub struct TerminalMap {
    camera: Camera,
    markers: BTreeMap<IssueId, MarkerDescriptor>,
    size: Size,
}

impl TerminalMap {
    pub fn new() -> Self {
        Self {
            camera: Camera::new(View::new(LatLng::new(0.0, 0.0), 0.0)),
            markers: BTreeMap::new(),
            size: Size::new(0.0, 0.0),
        }
    }

    /// Set the drawable area in terminal cells
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.size = Size::new(cols as f64 * CELL_WIDTH, rows as f64 * CELL_HEIGHT);
    }

    pub fn view_at(&self, now: Instant) -> View {
        self.camera.view_at(now)
    }

    pub fn tick(&mut self, now: Instant) -> View {
        self.camera.tick(now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.camera.is_animating(now)
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerDescriptor> {
        self.markers.values()
    }

    /// Pan by whole cells
    pub fn pan(&mut self, cols: f64, rows: f64, now: Instant) {
        self.camera.pan_by(cols * CELL_WIDTH, rows * CELL_HEIGHT, now);
    }

    pub fn zoom(&mut self, delta: f64, now: Instant) {
        self.camera.zoom_by(delta, 0.0, MAX_ZOOM, now);
    }

    pub fn visible_bounds(&self, now: Instant) -> LatLngBounds {
        self.view_at(now).visible_bounds(self.size)
    }

    /// Canvas axes at `now` as ([west, east], [south, north])
    pub fn canvas_bounds(&self, now: Instant) -> ([f64; 2], [f64; 2]) {
        let bounds = self.visible_bounds(now);
        (
            [bounds.south_west.lng, bounds.north_east.lng],
            [bounds.south_west.lat, bounds.north_east.lat],
        )
    }

    /// Canvas coordinates of `position` at `now`.
    ///
    /// The canvas y axis is linear in latitude between the visible edges, so
    /// the point's projected row is mapped onto it. Markers land where the
    /// Web-Mercator fit placed them; the coastline stays linear in latitude.
    pub fn canvas_point(&self, position: LatLng, now: Instant) -> (f64, f64) {
        let view = self.view_at(now);
        let bounds = view.visible_bounds(self.size);
        if self.size.height <= 0.0 {
            return (position.lng, position.lat);
        }

        let top = project(view.center, view.zoom).y - self.size.height / 2.0;
        let t = (project(position, view.zoom).y - top) / self.size.height;
        let north = bounds.north_east.lat;
        let south = bounds.south_west.lat;
        (position.lng, north - t * (north - south))
    }

    /// Degrees of longitude covered by one display unit at `now`
    pub fn degrees_per_unit(&self, now: Instant) -> f64 {
        360.0 / world_size(self.view_at(now).zoom)
    }
}

impl Default for TerminalMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for TerminalMap {
    fn size(&self) -> Size {
        self.size
    }

    fn set_view(&mut self, view: View) {
        self.camera.jump_to(view);
    }

    fn apply(&mut self, directive: &ViewportDirective) {
        let now = Instant::now();
        match directive {
            ViewportDirective::FlyTo { target, duration } => {
                self.camera.fly_to(*target, *duration, now);
            }
            ViewportDirective::FitBounds { target, .. } => {
                self.camera.ease_to(*target, FIT_DURATION, now);
            }
        }
    }

    fn marker(&self, id: &IssueId) -> Option<&MarkerDescriptor> {
        self.markers.get(id)
    }

    fn marker_ids(&self) -> Vec<IssueId> {
        self.markers.keys().cloned().collect()
    }

    fn upsert_marker(&mut self, marker: MarkerDescriptor) {
        self.markers.insert(marker.id.clone(), marker);
    }

    fn remove_marker(&mut self, id: &IssueId) {
        self.markers.remove(id);
    }
}
