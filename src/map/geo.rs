//! Geographic primitives and Web-Mercator projection.
//!
//! Projected coordinates are display units on a world that is `256 * 2^zoom`
//! units wide, the same tiling scheme slippy maps use.

use std::f64::consts::PI;

/// Width of one map tile at integer zoom levels
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A point in projected display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Size of a rendering surface in display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// World size in display units at a zoom level
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Project a coordinate to display units at `zoom`
pub fn project(ll: LatLng, zoom: f64) -> Point {
    let scale = world_size(zoom);
    let lat = ll.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (ll.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    Point::new(x, y)
}

/// Inverse of [`project`]
pub fn unproject(p: Point, zoom: f64) -> LatLng {
    let scale = world_size(zoom);
    let lng = p.x / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * p.y / scale;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Axis-aligned geographic rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Zero-area bounds around a single point
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Minimal rectangle enclosing all points, `None` when there are none
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::from_point(first);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn is_degenerate(&self) -> bool {
        self.south_west == self.north_east
    }
}

/// Center and zoom of a map view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: LatLng,
    pub zoom: f64,
}

impl View {
    pub const fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Geographic rectangle visible on a surface of `size`
    pub fn visible_bounds(&self, size: Size) -> LatLngBounds {
        let c = project(self.center, self.zoom);
        let nw = unproject(
            Point::new(c.x - size.width / 2.0, c.y - size.height / 2.0),
            self.zoom,
        );
        let se = unproject(
            Point::new(c.x + size.width / 2.0, c.y + size.height / 2.0),
            self.zoom,
        );
        LatLngBounds {
            south_west: LatLng::new(se.lat, nw.lng),
            north_east: LatLng::new(nw.lat, se.lng),
        }
    }
}

/// Resolve the view that frames `bounds` on a surface of `size`.
///
/// The zoom is the largest whole level at which the projected bounds fit
/// inside the surface minus `padding` on every side, capped at `max_zoom`
/// and never below 0. Zero-area bounds go straight to `max_zoom`.
pub fn fit_view(bounds: &LatLngBounds, size: Size, padding: f64, max_zoom: f64) -> View {
    let nw = project(bounds.north_west(), 0.0);
    let se = project(bounds.south_east(), 0.0);
    let span_x = (se.x - nw.x).abs();
    let span_y = (se.y - nw.y).abs();

    let avail_w = size.width - 2.0 * padding;
    let avail_h = size.height - 2.0 * padding;

    let zoom = if avail_w <= 0.0 || avail_h <= 0.0 {
        0.0
    } else {
        let scale_x = if span_x > 0.0 { avail_w / span_x } else { f64::INFINITY };
        let scale_y = if span_y > 0.0 { avail_h / span_y } else { f64::INFINITY };
        let scale = scale_x.min(scale_y);
        if scale.is_infinite() {
            max_zoom
        } else {
            scale.log2().floor()
        }
    };

    let zoom = zoom.min(max_zoom).max(0.0);
    let center = unproject(nw.lerp(se, 0.5), 0.0);
    View::new(center, zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() < eps, "{} != {} (eps {})", a, b, eps);
    }

    #[test]
    fn test_projection_round_trip() {
        let ll = LatLng::new(12.9716, 77.5946);
        for zoom in [0.0, 5.0, 12.0, 15.5] {
            let back = unproject(project(ll, zoom), zoom);
            assert_close(back.lat, ll.lat, 1e-9);
            assert_close(back.lng, ll.lng, 1e-9);
        }
    }

    #[test]
    fn test_projection_origin() {
        let p = project(LatLng::new(0.0, 0.0), 0.0);
        assert_close(p.x, 128.0, 1e-9);
        assert_close(p.y, 128.0, 1e-9);

        // Poles clamp to the square world edge
        let top = project(LatLng::new(90.0, 0.0), 0.0);
        assert_close(top.y, 0.0, 1e-6);
    }

    #[test]
    fn test_bounds_from_points() {
        assert!(LatLngBounds::from_points(Vec::new()).is_none());

        let bounds = LatLngBounds::from_points([
            LatLng::new(12.90, 77.60),
            LatLng::new(13.05, 77.50),
            LatLng::new(12.95, 77.70),
        ])
        .unwrap();

        assert_eq!(bounds.south_west, LatLng::new(12.90, 77.50));
        assert_eq!(bounds.north_east, LatLng::new(13.05, 77.70));
        assert!(bounds.contains(LatLng::new(13.0, 77.6)));
        assert!(!bounds.contains(LatLng::new(13.1, 77.6)));
        assert!(!bounds.is_degenerate());
    }

    #[test]
    fn test_fit_degenerate_bounds_uses_cap() {
        let point = LatLng::new(12.9, 77.6);
        let view = fit_view(&LatLngBounds::from_point(point), Size::new(640.0, 384.0), 50.0, 15.0);

        assert_eq!(view.zoom, 15.0);
        assert_close(view.center.lat, 12.9, 1e-9);
        assert_close(view.center.lng, 77.6, 1e-9);
    }

    #[test]
    fn test_fit_keeps_bounds_inside_padding() {
        let bounds = LatLngBounds::from_points([
            LatLng::new(12.85, 77.45),
            LatLng::new(13.10, 77.75),
        ])
        .unwrap();
        let size = Size::new(640.0, 384.0);
        let view = fit_view(&bounds, size, 50.0, 18.0);

        assert!(view.zoom < 18.0);
        assert_eq!(view.zoom, view.zoom.floor());

        let nw = project(bounds.north_west(), view.zoom);
        let se = project(bounds.south_east(), view.zoom);
        assert!(se.x - nw.x <= size.width - 100.0);
        assert!(se.y - nw.y <= size.height - 100.0);

        // One more level would overflow the padded area
        let nw = project(bounds.north_west(), view.zoom + 1.0);
        let se = project(bounds.south_east(), view.zoom + 1.0);
        assert!(se.x - nw.x > size.width - 100.0 || se.y - nw.y > size.height - 100.0);

        assert!(view.visible_bounds(size).contains(LatLng::new(12.85, 77.45)));
        assert!(view.visible_bounds(size).contains(LatLng::new(13.10, 77.75)));
    }

    #[test]
    fn test_fit_on_tiny_surface() {
        let bounds = LatLngBounds::from_point(LatLng::new(1.0, 2.0));
        let view = fit_view(&bounds, Size::new(60.0, 40.0), 50.0, 15.0);
        assert_eq!(view.zoom, 0.0);
    }
}
