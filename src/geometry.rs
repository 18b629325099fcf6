use serde::{Deserialize, Serialize};

/// A position in device-independent canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Point `t` of the way from `self` to `other`.
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn square(side: f64) -> Self {
        Self::new(side, side)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Rectangle of `size` whose center sits on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self::new(
            Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
            size,
        )
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Grows the rectangle by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Rect {
        Rect::new(
            self.origin.offset(-margin, -margin),
            Size::new(
                self.size.width + 2.0 * margin,
                self.size.height + 2.0 * margin,
            ),
        )
    }

    /// Strict overlap test; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.origin.x < other.right()
            && other.origin.x < self.right()
            && self.origin.y < other.bottom()
            && other.origin.y < self.bottom()
    }

    /// True when the two rectangles are closer than `spacing` to each other.
    pub fn conflicts_with(&self, other: &Rect, spacing: f64) -> bool {
        self.expanded(spacing).intersects(other)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x && p.x <= self.right() && p.y >= self.origin.y && p.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Drawable area handed to the engine by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(Point::new(0.0, 0.0), Size::square(10.0));
        let b = Rect::new(Point::new(10.0, 0.0), Size::square(10.0));
        assert!(!a.intersects(&b));
        assert!(a.conflicts_with(&b, 1.0));
    }

    #[test]
    fn test_spacing_expansion() {
        let a = Rect::new(Point::new(0.0, 0.0), Size::square(10.0));
        let b = Rect::new(Point::new(15.0, 15.0), Size::square(10.0));
        assert!(!a.conflicts_with(&b, 4.0));
        assert!(a.conflicts_with(&b, 6.0));
    }

    #[test]
    fn test_centered_rect() {
        let r = Rect::centered(Point::new(50.0, 50.0), Size::new(20.0, 10.0));
        assert_eq!(r.origin, Point::new(40.0, 45.0));
        assert_eq!(r.center(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_orientation() {
        assert_eq!(Canvas::new(400.0, 800.0).orientation(), Orientation::Portrait);
        assert_eq!(Canvas::new(800.0, 400.0).orientation(), Orientation::Landscape);
        assert_eq!(Canvas::new(500.0, 500.0).orientation(), Orientation::Portrait);
    }

    #[test]
    fn test_negative_canvas_is_clamped() {
        let c = Canvas::new(-5.0, 10.0);
        assert_eq!(c.width, 0.0);
        assert!(c.is_empty());
    }
}
