use crate::geometry::Point;

/// A walker moving over a chain of waypoints in fixed-size discrete steps.
///
/// Every segment is split into the same number of steps, so the walker lands exactly
/// on each waypoint along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTraversal {
    frames: Vec<Point>,
    cursor: usize,
}

impl PathTraversal {
    pub fn new(waypoints: &[Point], steps_per_segment: usize) -> Self {
        let steps = steps_per_segment.max(1);
        let mut frames = Vec::with_capacity(1 + waypoints.len().saturating_sub(1) * steps);

        if let Some(first) = waypoints.first() {
            frames.push(*first);
        }
        for pair in waypoints.windows(2) {
            for k in 1..=steps {
                frames.push(pair[0].lerp(pair[1], k as f64 / steps as f64));
            }
        }

        Self { frames, cursor: 0 }
    }

    /// Total number of frames, including the starting point.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn position(&self) -> Option<Point> {
        self.frames.get(self.cursor).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor + 1 >= self.frames.len()
    }

    /// Moves to the next frame. Returns false once the last frame was reached.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.cursor += 1;
        true
    }
}
