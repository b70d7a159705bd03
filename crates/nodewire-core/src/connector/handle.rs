//! Visual handle of a connector, used for pointer hit testing.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default handle radius in surface coordinates.
pub const DEFAULT_HANDLE_RADIUS: f64 = 6.0;

/// The round grab handle a wiring gesture starts and ends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorHandle {
    /// Center in surface coordinates.
    pub position: Point,
    /// Radius of the drawn handle.
    pub radius: f64,
}

impl Default for ConnectorHandle {
    fn default() -> Self {
        Self::new(Point::ZERO)
    }
}

impl ConnectorHandle {
    /// Create a handle with the default radius.
    pub fn new(position: Point) -> Self {
        Self {
            position,
            radius: DEFAULT_HANDLE_RADIUS,
        }
    }

    /// Set the handle radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Whether `point` lies within the handle grown by `tolerance`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = self.radius + tolerance;
        (point - self.position).hypot2() <= reach * reach
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_inside_radius() {
        let handle = ConnectorHandle::new(Point::new(10.0, 10.0));
        assert!(handle.hit_test(Point::new(10.0, 10.0), 0.0));
        assert!(handle.hit_test(Point::new(15.0, 10.0), 0.0));
        assert!(!handle.hit_test(Point::new(17.0, 10.0), 0.0));
    }

    #[test]
    fn test_hit_with_tolerance() {
        let handle = ConnectorHandle::new(Point::new(0.0, 0.0)).with_radius(2.0);
        assert!(!handle.hit_test(Point::new(5.0, 0.0), 0.0));
        assert!(handle.hit_test(Point::new(5.0, 0.0), 3.0));
    }

    #[test]
    fn test_default_handle_at_origin() {
        let handle = ConnectorHandle::default();
        assert_eq!(handle.position, Point::ZERO);
        assert!((handle.radius - DEFAULT_HANDLE_RADIUS).abs() < f64::EPSILON);
    }
}
