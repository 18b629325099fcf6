use crate::geometry::{Canvas, Point, Rect, Size};
use rand::Rng;

/// Where one requested id ended up, and whether the grid fallback produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement<Id> {
    pub id: Id,
    pub rect: Rect,
    pub fallback: bool,
}

/// Random rejection placement with a deterministic grid fallback.
#[derive(Debug, Clone)]
pub struct SpatialPlacer {
    footprint: Size,
    spacing: f64,
    max_attempts: usize,
}

impl SpatialPlacer {
    pub fn new(footprint: Size, spacing: f64, max_attempts: usize) -> Self {
        Self {
            footprint,
            spacing,
            max_attempts,
        }
    }

    pub fn footprint(&self) -> Size {
        self.footprint
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Assigns a rectangle to every id in `ids`, avoiding `existing` and each other.
    ///
    /// Always returns exactly one placement per id, in request order. Ids that could
    /// not be placed randomly within the attempt bound get a grid slot, which is not
    /// checked against the random neighbors.
    pub fn place<Id: Copy, R: Rng + ?Sized>(
        &self,
        ids: &[Id],
        canvas: Canvas,
        existing: &[Rect],
        rng: &mut R,
    ) -> Vec<Placement<Id>> {
        let mut occupied: Vec<Rect> = existing.to_vec();
        let mut placements = Vec::with_capacity(ids.len());

        for &id in ids {
            let (rect, fallback) = match self.random_slot(canvas, &occupied, rng) {
                Some(rect) => (rect, false),
                None => {
                    let rect = self.grid_slot(canvas, occupied.len());
                    tracing::debug!(index = occupied.len(), "placement fell back to grid");
                    (rect, true)
                }
            };
            occupied.push(rect);
            placements.push(Placement { id, rect, fallback });
        }

        placements
    }

    fn random_slot<R: Rng + ?Sized>(
        &self,
        canvas: Canvas,
        occupied: &[Rect],
        rng: &mut R,
    ) -> Option<Rect> {
        let max_x = canvas.width - self.footprint.width;
        let max_y = canvas.height - self.footprint.height;

        (0..self.max_attempts).find_map(|_| {
            let x = if max_x > 0.0 { rng.gen_range(0.0..=max_x) } else { 0.0 };
            let y = if max_y > 0.0 { rng.gen_range(0.0..=max_y) } else { 0.0 };
            let candidate = Rect::new(Point::new(x, y), self.footprint);
            occupied
                .iter()
                .all(|r| !candidate.conflicts_with(r, self.spacing))
                .then_some(candidate)
        })
    }

    /// Deterministic slot for the `index`-th placement on the canvas.
    pub fn grid_slot(&self, canvas: Canvas, index: usize) -> Rect {
        let cols = self.grid_columns(canvas);
        let col = index % cols;
        let row = index / cols;

        let step_x = self.footprint.width + self.spacing;
        let step_y = self.footprint.height + self.spacing;
        let x = (col as f64 * step_x).min((canvas.width - self.footprint.width).max(0.0));
        let y = (row as f64 * step_y).min((canvas.height - self.footprint.height).max(0.0));

        Rect::new(Point::new(x, y), self.footprint)
    }

    fn grid_columns(&self, canvas: Canvas) -> usize {
        if self.footprint.width <= 0.0 {
            return 2;
        }
        ((canvas.width / self.footprint.width).sqrt().floor() as usize).max(2)
    }
}

/// True when no two rectangles sit closer than `spacing`.
pub fn is_collision_free(rects: &[Rect], spacing: f64) -> bool {
    rects.iter().enumerate().all(|(i, a)| {
        rects[i + 1..]
            .iter()
            .all(|b| !a.conflicts_with(b, spacing))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn placer() -> SpatialPlacer {
        SpatialPlacer::new(Size::new(80.0, 50.0), 8.0, 100)
    }

    #[test]
    fn test_places_every_id() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids: Vec<u32> = (0..12).collect();
        let placements = placer().place(&ids, Canvas::new(800.0, 1200.0), &[], &mut rng);
        assert_eq!(placements.len(), ids.len());
        assert_eq!(
            placements.iter().map(|p| p.id).collect::<Vec<_>>(),
            ids
        );
    }

    #[test]
    fn test_random_placements_do_not_overlap() {
        let mut rng = StdRng::seed_from_u64(8);
        let ids: Vec<u32> = (0..10).collect();
        let placements = placer().place(&ids, Canvas::new(1000.0, 1000.0), &[], &mut rng);
        let rects: Vec<Rect> = placements.iter().map(|p| p.rect).collect();
        assert!(placements.iter().all(|p| !p.fallback));
        assert!(is_collision_free(&rects, 8.0));
    }

    #[test]
    fn test_avoids_existing() {
        let mut rng = StdRng::seed_from_u64(9);
        let canvas = Canvas::new(600.0, 600.0);
        let existing = vec![
            Rect::new(Point::new(0.0, 0.0), Size::new(300.0, 300.0)),
            Rect::new(Point::new(300.0, 300.0), Size::new(300.0, 300.0)),
        ];
        let placements = placer().place(&[1u32, 2, 3], canvas, &existing, &mut rng);
        for p in placements.iter().filter(|p| !p.fallback) {
            for e in &existing {
                assert!(!p.rect.conflicts_with(e, 8.0));
            }
        }
    }

    #[test]
    fn test_stays_inside_canvas() {
        let mut rng = StdRng::seed_from_u64(10);
        let canvas = Canvas::new(500.0, 400.0);
        let ids: Vec<u32> = (0..30).collect();
        for p in placer().place(&ids, canvas, &[], &mut rng) {
            assert!(p.rect.origin.x >= 0.0 && p.rect.right() <= canvas.width);
            assert!(p.rect.origin.y >= 0.0 && p.rect.bottom() <= canvas.height);
        }
    }

    #[test]
    fn test_crowded_canvas_falls_back_to_grid() {
        let mut rng = StdRng::seed_from_u64(11);
        // Room for exactly one card: the second has to use the grid.
        let canvas = Canvas::new(90.0, 60.0);
        let placements = placer().place(&[1u32, 2], canvas, &[], &mut rng);
        assert_eq!(placements.len(), 2);
        assert!(!placements[0].fallback);
        assert!(placements[1].fallback);
    }

    #[test]
    fn test_grid_slot_is_deterministic() {
        let p = placer();
        let canvas = Canvas::new(800.0, 800.0);
        // sqrt(800 / 80) = 3.16 -> 3 columns
        assert_eq!(p.grid_slot(canvas, 0).origin, Point::new(0.0, 0.0));
        assert_eq!(p.grid_slot(canvas, 1).origin, Point::new(88.0, 0.0));
        assert_eq!(p.grid_slot(canvas, 3).origin, Point::new(0.0, 58.0));
        assert_eq!(p.grid_slot(canvas, 4), p.grid_slot(canvas, 4));
    }

    #[test]
    fn test_grid_uses_at_least_two_columns() {
        let p = placer();
        let narrow = Canvas::new(100.0, 800.0);
        assert_eq!(p.grid_slot(narrow, 1).origin.y, 0.0);
        assert_eq!(p.grid_slot(narrow, 2).origin.x, 0.0);
    }

    #[test]
    fn test_zero_sized_canvas_still_returns_positions() {
        let mut rng = StdRng::seed_from_u64(12);
        let placements = placer().place(&[1u32, 2, 3], Canvas::new(0.0, 0.0), &[], &mut rng);
        assert_eq!(placements.len(), 3);
    }
}
