//! Geometric primitives for pedigree layout and edge routing.
//!
//! This module provides fundamental geometric types used throughout Kinship
//! for calculating positions, sizes, bounding boxes and routing corridors.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in layout space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Interval`] - A closed 1D range, used for obstacle subtraction on corridor lines
//! - [`Axis`] - Horizontal or vertical orientation of a line
//!
//! # Coordinate System
//!
//! Kinship uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner at `(0, 0)`
//! - **X-axis**: Increases rightward (positive to the right)
//! - **Y-axis**: Increases downward, so older generations sit at smaller `y`

use serde::Serialize;

/// Tolerance used when comparing layout coordinates.
pub const EPSILON: f32 = 1e-3;

/// A 2D point representing a position in layout coordinate space.
///
/// # Examples
///
/// ```
/// use kinship_core::geometry::Point;
///
/// let a = Point::new(10.0, 20.0);
/// let b = Point::new(40.0, 0.0);
/// assert_eq!(a.manhattan_distance(b), 50.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns a copy of this point with a different x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Returns a copy of this point with a different y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Multiplies both coordinates by `factor`
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Sum of the absolute coordinate differences to `other`
    pub fn manhattan_distance(self, other: Point) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Returns `true` if both coordinates are within [`EPSILON`] of `other`
    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    /// Converts a point and size into a bounds rectangle
    ///
    /// The point is treated as the center of the bounds.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_center(self, size)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates the smallest bounds containing both points
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the extent of the bounds along `axis`
    pub fn interval(self, axis: Axis) -> Interval {
        match axis {
            Axis::Horizontal => Interval::new(self.min_x, self.max_x),
            Axis::Vertical => Interval::new(self.min_y, self.max_y),
        }
    }

    /// Merges two bounds to create a larger bounds that contains both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Grows the bounds by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inflate(&self, dx: f32, dy: f32) -> Self {
        Self {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Returns `true` if the point lies strictly inside the bounds.
    ///
    /// Points within [`EPSILON`] of the border count as outside, so corridors
    /// running along an obstacle border stay usable.
    pub fn contains_strict(self, point: Point) -> bool {
        point.x > self.min_x + EPSILON
            && point.x < self.max_x - EPSILON
            && point.y > self.min_y + EPSILON
            && point.y < self.max_y - EPSILON
    }
}

/// Orientation of an axis-aligned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Constant `y`, extending along x.
    Horizontal,
    /// Constant `x`, extending along y.
    Vertical,
}

impl Axis {
    /// Returns the other axis.
    pub fn cross(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// A closed range `[start, end]` on a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    start: f32,
    end: f32,
}

impl Interval {
    /// Creates an interval; the bounds are swapped when given in reverse order.
    pub fn new(start: f32, end: f32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn start(self) -> f32 {
        self.start
    }

    pub fn end(self) -> f32 {
        self.end
    }

    pub fn len(self) -> f32 {
        self.end - self.start
    }

    /// Returns `true` if the interval has no usable length.
    pub fn is_empty(self) -> bool {
        self.len() <= EPSILON
    }

    /// Returns `true` if `value` lies within the interval (borders included).
    pub fn contains(self, value: f32) -> bool {
        value >= self.start - EPSILON && value <= self.end + EPSILON
    }

    /// Returns `true` if `value` lies strictly inside the interval.
    pub fn contains_strict(self, value: f32) -> bool {
        value > self.start + EPSILON && value < self.end - EPSILON
    }

    /// Removes every `cut` from this interval and returns the remaining pieces
    /// in ascending order.
    ///
    /// Pieces shorter than [`EPSILON`] are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use kinship_core::geometry::Interval;
    ///
    /// let line = Interval::new(0.0, 100.0);
    /// let pieces = line.subtract(&[Interval::new(20.0, 30.0), Interval::new(60.0, 120.0)]);
    /// assert_eq!(pieces, vec![Interval::new(0.0, 20.0), Interval::new(30.0, 60.0)]);
    /// ```
    pub fn subtract(self, cuts: &[Interval]) -> Vec<Interval> {
        let mut cuts: Vec<Interval> = cuts.to_vec();
        cuts.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut pieces = Vec::new();
        let mut cursor = self.start;
        for cut in cuts {
            if cut.end <= cursor {
                continue;
            }
            if cut.start >= self.end {
                break;
            }
            let piece = Interval::new(cursor, cut.start.max(cursor));
            if !piece.is_empty() {
                pieces.push(piece);
            }
            cursor = cursor.max(cut.end);
        }
        let tail = Interval::new(cursor.min(self.end), self.end);
        if !tail.is_empty() {
            pieces.push(tail);
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);
        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_point_midpoint() {
        let midpoint = Point::new(0.0, 0.0).midpoint(Point::new(4.0, 6.0));
        assert_eq!(midpoint, Point::new(2.0, 3.0));
    }

    #[test]
    fn test_point_manhattan_distance() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(-2.0, 5.0);
        assert_eq!(a.manhattan_distance(b), 7.0);
        assert_eq!(b.manhattan_distance(a), 7.0);
    }

    #[test]
    fn test_point_with_coordinates() {
        let point = Point::new(1.0, 2.0).with_x(5.0).with_y(6.0);
        assert_eq!(point, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_bounds_from_center() {
        let bounds = Point::new(50.0, 50.0).to_bounds(Size::new(20.0, 10.0));
        assert_eq!(bounds.min_x(), 40.0);
        assert_eq!(bounds.max_x(), 60.0);
        assert_eq!(bounds.min_y(), 45.0);
        assert_eq!(bounds.max_y(), 55.0);
        assert_eq!(bounds.center(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_bounds_from_corners() {
        let bounds = Bounds::from_corners(Point::new(10.0, 0.0), Point::new(0.0, 10.0));
        assert_eq!(bounds.width(), 10.0);
        assert_eq!(bounds.height(), 10.0);
    }

    #[test]
    fn test_bounds_inflate() {
        let bounds = Bounds::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let inflated = bounds.inflate(2.0, 3.0);
        assert_eq!(inflated.min_x(), -2.0);
        assert_eq!(inflated.max_x(), 12.0);
        assert_eq!(inflated.min_y(), -3.0);
        assert_eq!(inflated.max_y(), 13.0);
    }

    #[test]
    fn test_bounds_contains_strict_excludes_border() {
        let bounds = Bounds::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(bounds.contains_strict(Point::new(5.0, 5.0)));
        assert!(!bounds.contains_strict(Point::new(0.0, 5.0)));
        assert!(!bounds.contains_strict(Point::new(5.0, 10.0)));
        assert!(!bounds.contains_strict(Point::new(11.0, 5.0)));
    }

    #[test]
    fn test_bounds_interval() {
        let bounds = Bounds::from_corners(Point::new(1.0, 2.0), Point::new(3.0, 7.0));
        assert_eq!(bounds.interval(Axis::Horizontal), Interval::new(1.0, 3.0));
        assert_eq!(bounds.interval(Axis::Vertical), Interval::new(2.0, 7.0));
    }

    #[test]
    fn test_axis_cross() {
        assert_eq!(Axis::Horizontal.cross(), Axis::Vertical);
        assert_eq!(Axis::Vertical.cross(), Axis::Horizontal);
    }

    #[test]
    fn test_interval_new_swaps() {
        let interval = Interval::new(5.0, 1.0);
        assert_eq!(interval.start(), 1.0);
        assert_eq!(interval.end(), 5.0);
        assert_eq!(interval.len(), 4.0);
    }

    #[test]
    fn test_interval_subtract_no_cuts() {
        let line = Interval::new(0.0, 10.0);
        assert_eq!(line.subtract(&[]), vec![line]);
    }

    #[test]
    fn test_interval_subtract_overlapping_cuts() {
        let line = Interval::new(0.0, 100.0);
        let pieces = line.subtract(&[
            Interval::new(50.0, 70.0),
            Interval::new(10.0, 20.0),
            Interval::new(15.0, 40.0),
        ]);
        assert_eq!(
            pieces,
            vec![
                Interval::new(0.0, 10.0),
                Interval::new(40.0, 50.0),
                Interval::new(70.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_interval_subtract_covering_cut() {
        let line = Interval::new(0.0, 10.0);
        assert!(line.subtract(&[Interval::new(-5.0, 15.0)]).is_empty());
    }

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(0.0, 10.0);
        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(!interval.contains_strict(10.0));
        assert!(interval.contains_strict(5.0));
        assert!(!interval.contains(11.0));
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn interval_strategy() -> impl Strategy<Value = Interval> {
        (-500.0f32..500.0, 0.0f32..300.0).prop_map(|(start, len)| Interval::new(start, start + len))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Manhattan distance is symmetric and never shorter than the straight line.
    fn check_manhattan_distance(p1: Point, p2: Point) -> Result<(), TestCaseError> {
        let d1 = p1.manhattan_distance(p2);
        let d2 = p2.manhattan_distance(p1);
        let euclid = p1.sub_point(p2);

        prop_assert!(approx_eq!(f32, d1, d2));
        prop_assert!(d1 + 0.01 >= euclid.x().hypot(euclid.y()));
        Ok(())
    }

    /// Subtraction never leaves a piece that overlaps a cut.
    fn check_subtract_avoids_cuts(
        line: Interval,
        cuts: Vec<Interval>,
    ) -> Result<(), TestCaseError> {
        let pieces = line.subtract(&cuts);
        for piece in &pieces {
            prop_assert!(piece.start() >= line.start() - EPSILON);
            prop_assert!(piece.end() <= line.end() + EPSILON);
            let mid = (piece.start() + piece.end()) / 2.0;
            for cut in &cuts {
                prop_assert!(!cut.contains_strict(mid));
            }
        }
        for pair in pieces.windows(2) {
            prop_assert!(pair[0].end() <= pair[1].start() + EPSILON);
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn manhattan_distance_properties(p1 in point_strategy(), p2 in point_strategy()) {
            check_manhattan_distance(p1, p2)?;
        }

        #[test]
        fn subtract_avoids_cuts(
            line in interval_strategy(),
            cuts in proptest::collection::vec(interval_strategy(), 0..6),
        ) {
            check_subtract_avoids_cuts(line, cuts)?;
        }
    }
}
