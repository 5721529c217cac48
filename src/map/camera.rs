use std::f64::consts::PI;
use std::time::{Duration, Instant};

use super::geo::{project, unproject, world_size, Point, View};

/// How a transition moves between views
#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    /// Zoom out mid-flight when the hop is long, then back in
    Fly { dip: f64 },
    Ease,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: View,
    to: View,
    started: Instant,
    duration: Duration,
    motion: Motion,
}

impl Transition {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn view_at(&self, now: Instant) -> View {
        let t = self.progress(now);
        if t <= 0.0 {
            return self.from;
        }
        if t >= 1.0 {
            return self.to;
        }

        let e = ease_in_out(t);
        let from = project(self.from.center, 0.0);
        let to = project(self.to.center, 0.0);
        let center = unproject(from.lerp(to, e), 0.0);

        let mut zoom = self.from.zoom + (self.to.zoom - self.from.zoom) * e;
        if let Motion::Fly { dip } = self.motion {
            zoom -= dip * (PI * t).sin();
        }

        View::new(center, zoom.max(0.0))
    }
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Zoom levels to back out so a long hop stays readable.
///
/// Zero when the target is within about one screen at the lower zoom.
fn fly_dip(from: View, to: View) -> f64 {
    let zoom = from.zoom.min(to.zoom);
    let a = project(from.center, zoom);
    let b = project(to.center, zoom);
    let screens = a.distance(b) / 512.0;
    if screens <= 1.0 {
        0.0
    } else {
        screens.log2().min(zoom)
    }
}

/// The view a surface is actually showing, with at most one transition in flight.
///
/// Starting a transition (or moving the camera by hand) always begins from
/// whatever is on screen right now, so a newer request cancels the old one.
#[derive(Debug, Clone)]
pub struct Camera {
    view: View,
    transition: Option<Transition>,
}

impl Camera {
    pub fn new(view: View) -> Self {
        Self {
            view,
            transition: None,
        }
    }

    pub fn jump_to(&mut self, view: View) {
        self.view = view;
        self.transition = None;
    }

    pub fn fly_to(&mut self, target: View, duration: Duration, now: Instant) {
        let from = self.view_at(now);
        let dip = fly_dip(from, target);
        self.start(from, target, duration, Motion::Fly { dip }, now);
    }

    pub fn ease_to(&mut self, target: View, duration: Duration, now: Instant) {
        let from = self.view_at(now);
        self.start(from, target, duration, Motion::Ease, now);
    }

    fn start(&mut self, from: View, to: View, duration: Duration, motion: Motion, now: Instant) {
        self.view = to;
        self.transition = Some(Transition {
            from,
            to,
            started: now,
            duration,
            motion,
        });
    }

    /// View on screen at `now`
    pub fn view_at(&self, now: Instant) -> View {
        match &self.transition {
            Some(transition) => transition.view_at(now),
            None => self.view,
        }
    }

    /// Drop a transition that has run its course
    pub fn tick(&mut self, now: Instant) -> View {
        if let Some(transition) = &self.transition {
            if transition.progress(now) >= 1.0 {
                self.transition = None;
            }
        }
        self.view_at(now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|transition| transition.progress(now) < 1.0)
    }

    /// Shift the view by display units (user panning)
    pub fn pan_by(&mut self, dx: f64, dy: f64, now: Instant) {
        let view = self.view_at(now);
        let c = project(view.center, view.zoom);
        let size = world_size(view.zoom);
        let y = (c.y + dy).clamp(0.0, size);
        let center = unproject(Point::new(c.x + dx, y), view.zoom);
        self.jump_to(View::new(center, view.zoom));
    }

    /// Change zoom around the current center (user zooming)
    pub fn zoom_by(&mut self, delta: f64, min_zoom: f64, max_zoom: f64, now: Instant) {
        let view = self.view_at(now);
        let zoom = (view.zoom + delta).clamp(min_zoom, max_zoom);
        self.jump_to(View::new(view.center, zoom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::geo::LatLng;

    fn bangalore() -> View {
        View::new(LatLng::new(12.9716, 77.5946), 12.0)
    }

    #[test]
    fn test_fly_interpolates_and_lands() {
        let now = Instant::now();
        let mut camera = Camera::new(bangalore());
        let target = View::new(LatLng::new(12.99, 77.62), 14.0);
        camera.fly_to(target, Duration::from_millis(1500), now);

        assert!(camera.is_animating(now));
        assert_eq!(camera.view_at(now), bangalore());

        let mid = camera.view_at(now + Duration::from_millis(750));
        assert!(mid.center.lat > 12.9716 && mid.center.lat < 12.99);
        assert!(mid.zoom > 12.0 && mid.zoom < 14.0);

        let end = now + Duration::from_millis(1500);
        assert_eq!(camera.tick(end), target);
        assert!(!camera.is_animating(end));
    }

    #[test]
    fn test_long_fly_backs_out() {
        let now = Instant::now();
        let mut camera = Camera::new(bangalore());
        let target = View::new(LatLng::new(51.5074, -0.1278), 12.0);
        camera.fly_to(target, Duration::from_millis(1500), now);

        let mid = camera.view_at(now + Duration::from_millis(750));
        assert!(mid.zoom < 12.0);
    }

    #[test]
    fn test_new_request_supersedes_in_flight() {
        let now = Instant::now();
        let mut camera = Camera::new(bangalore());
        camera.fly_to(
            View::new(LatLng::new(13.1, 77.7), 14.0),
            Duration::from_millis(1500),
            now,
        );

        let later = now + Duration::from_millis(500);
        let on_screen = camera.view_at(later);
        let fit = View::new(LatLng::new(12.95, 77.6), 13.0);
        camera.ease_to(fit, Duration::from_millis(250), later);

        // Starts from where the old flight was, not where it was heading
        assert_eq!(camera.view_at(later), on_screen);
        assert_eq!(camera.view_at(later + Duration::from_millis(250)), fit);
    }

    #[test]
    fn test_manual_moves_cancel_transitions() {
        let now = Instant::now();
        let mut camera = Camera::new(bangalore());
        camera.ease_to(
            View::new(LatLng::new(13.0, 77.6), 13.0),
            Duration::from_millis(250),
            now,
        );
        camera.zoom_by(1.0, 0.0, 18.0, now);
        assert!(!camera.is_animating(now));
        assert_eq!(camera.view_at(now).zoom, 13.0);

        camera.zoom_by(10.0, 0.0, 18.0, now);
        assert_eq!(camera.view_at(now).zoom, 18.0);

        let before = camera.view_at(now);
        camera.pan_by(100.0, 0.0, now);
        let after = camera.view_at(now);
        assert!(after.center.lng > before.center.lng);
        assert!((after.center.lat - before.center.lat).abs() < 1e-9);
    }
}
