use geo::{Distance, Euclidean, Point};

pub const DEFAULT_STEP_SIZE: f64 = 2.0;

/// Anything that sits somewhere on the plant floor.
pub trait Positioned {
    fn position(&self) -> Point;
}

impl Positioned for Point {
    fn position(&self) -> Point {
        *self
    }
}

impl<T: Positioned> Positioned for &T {
    fn position(&self) -> Point {
        (**self).position()
    }
}

pub fn distance(from: Point, to: Point) -> f64 {
    Euclidean.distance(from, to)
}

pub fn distance_between<A: Positioned, B: Positioned>(from: &A, to: &B) -> f64 {
    distance(from.position(), to.position())
}

/// Straight line interpolation from `start` to `end`, advancing `step` units
/// at a time ([`DEFAULT_STEP_SIZE`] unless the caller needs finer paths).
/// Intermediate points are rounded to whole units, the last point is always
/// exactly `end`.
pub fn smooth_path(start: Point, end: Point, step: f64) -> Vec<Point> {
    let mut path = Vec::new();

    if !(step.is_finite() && step > 0.0) {
        path.push(end);
        return path;
    }

    let mut current = start;

    while (current.x() - end.x()).abs() > step || (current.y() - end.y()).abs() > step {
        let dx = end.x() - current.x();
        let dy = end.y() - current.y();
        let length = dx.hypot(dy);

        if length == 0.0 {
            break;
        }

        current = Point::new(
            current.x() + (dx / length) * step,
            current.y() + (dy / length) * step,
        );

        path.push(Point::new(current.x().round(), current.y().round()));
    }

    path.push(end);
    path
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_distance_pythagorean() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(30.0, 40.0)), 50.0);
        assert_eq!(distance(Point::new(3.0, 3.0), Point::new(3.0, 3.0)), 0.0);
    }

    #[test]
    fn test_smooth_path_ends_at_destination() {
        let path = smooth_path(Point::new(0.0, 0.0), Point::new(10.0, 0.0), DEFAULT_STEP_SIZE);

        assert_eq!(
            path,
            vec![
                Point::new(2.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(6.0, 0.0),
                Point::new(8.0, 0.0),
                Point::new(10.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_smooth_path_short_segment() {
        let path = smooth_path(Point::new(0.0, 0.0), Point::new(1.0, 1.5), DEFAULT_STEP_SIZE);
        assert_eq!(path, vec![Point::new(1.0, 1.5)]);
    }

    #[test]
    fn test_smooth_path_invalid_step() {
        let path = smooth_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 0.0);
        assert_eq!(path, vec![Point::new(100.0, 0.0)]);
    }

    proptest! {
        #[test]
        fn test_distance_is_symmetric(
            ax in -1.0e6f64..1.0e6,
            ay in -1.0e6f64..1.0e6,
            bx in -1.0e6f64..1.0e6,
            by in -1.0e6f64..1.0e6,
        ) {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            prop_assert_eq!(distance(a, b), distance(b, a));
        }
    }
}
