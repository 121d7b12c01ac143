//! Screen-space helpers shared by the drawing primitives: rectangle clipping and
//! the circle and line rasterizers. Everything here is pure integer math.

/// An on-screen rectangle, already clipped. Always at least 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Window {
    /// Inclusive right column.
    pub fn end_x(&self) -> u16 {
        self.x + self.width - 1
    }

    /// Inclusive bottom row.
    pub fn end_y(&self) -> u16 {
        self.y + self.height - 1
    }

    pub fn pixel_count(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && y >= self.y as i32
            && x <= self.end_x() as i32
            && y <= self.end_y() as i32
    }
}

/// Clip the rectangle at `x`, `y` of `w` x `h` against a `screen_width` x
/// `screen_height` screen. A negative origin shrinks the extent. Returns `None`
/// when nothing is left to draw.
pub fn clip_rect(
    x: i16,
    y: i16,
    w: i16,
    h: i16,
    screen_width: u16,
    screen_height: u16,
) -> Option<Window> {
    let (mut x, mut y, mut w, mut h) = (x as i32, y as i32, w as i32, h as i32);
    if x < 0 {
        w += x;
        x = 0;
    }
    if y < 0 {
        h += y;
        y = 0;
    }
    if x + w > screen_width as i32 {
        w = screen_width as i32 - x;
    }
    if y + h > screen_height as i32 {
        h = screen_height as i32 - y;
    }
    if w <= 0 || h <= 0 {
        return None;
    }

    Some(Window {
        x: x as u16,
        y: y as u16,
        width: w as u16,
        height: h as u16,
    })
}

/// Midpoint circle rasterizer.
///
/// Yields one octant offset `(x, y)` per step, starting just after the four axis
/// points. The caller mirrors each offset into all eight octants.
#[derive(Debug, Clone)]
pub struct MidpointCircle {
    f: i32,
    ddf_x: i32,
    ddf_y: i32,
    x: i32,
    y: i32,
}

impl MidpointCircle {
    pub fn new(radius: i16) -> Self {
        let r = radius as i32;
        Self {
            f: 1 - r,
            ddf_x: 1,
            ddf_y: -2 * r,
            x: 0,
            y: r,
        }
    }
}

impl Iterator for MidpointCircle {
    type Item = (i16, i16);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.y {
            return None;
        }
        if self.f >= 0 {
            self.y -= 1;
            self.ddf_y += 2;
            self.f += self.ddf_y;
        }
        self.x += 1;
        self.ddf_x += 2;
        self.f += self.ddf_x;
        Some((self.x as i16, self.y as i16))
    }
}

/// The eight mirror images of an octant offset around `(cx, cy)`.
pub fn octants(cx: i16, cy: i16, x: i16, y: i16) -> [(i16, i16); 8] {
    [
        (cx.saturating_add(x), cy.saturating_add(y)),
        (cx.saturating_sub(x), cy.saturating_add(y)),
        (cx.saturating_add(x), cy.saturating_sub(y)),
        (cx.saturating_sub(x), cy.saturating_sub(y)),
        (cx.saturating_add(y), cy.saturating_add(x)),
        (cx.saturating_sub(y), cy.saturating_add(x)),
        (cx.saturating_add(y), cy.saturating_sub(x)),
        (cx.saturating_sub(y), cy.saturating_sub(x)),
    ]
}

/// Bresenham line from `start` to `end`, both endpoints included.
#[derive(Debug, Clone)]
pub struct LinePoints {
    x: i32,
    y: i32,
    end_x: i32,
    end_y: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl LinePoints {
    pub fn new(start: (i16, i16), end: (i16, i16)) -> Self {
        let (x0, y0) = (start.0 as i32, start.1 as i32);
        let (x1, y1) = (end.0 as i32, end.1 as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            end_x: x1,
            end_y: y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for LinePoints {
    type Item = (i16, i16);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let point = (self.x as i16, self.y as i16);
        if self.x == self.end_x && self.y == self.end_y {
            self.done = true;
            return Some(point);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::collections::BTreeSet;
    use std::vec::Vec;

    #[test]
    fn clip_inside_is_unchanged() {
        assert_eq!(
            clip_rect(10, 20, 30, 40, 160, 128),
            Some(Window { x: 10, y: 20, width: 30, height: 40 })
        );
    }

    #[test]
    fn clip_negative_origin_shrinks_extent() {
        assert_eq!(
            clip_rect(-5, -10, 20, 20, 160, 128),
            Some(Window { x: 0, y: 0, width: 15, height: 10 })
        );
    }

    #[test]
    fn clip_trims_right_and_bottom_edges() {
        let w = clip_rect(150, 120, 50, 50, 160, 128).unwrap();
        assert_eq!(w, Window { x: 150, y: 120, width: 10, height: 8 });
        assert_eq!((w.end_x(), w.end_y()), (159, 127));
        assert_eq!(w.pixel_count(), 80);
    }

    #[test]
    fn clip_rejects_empty_and_offscreen() {
        assert_eq!(clip_rect(0, 0, 0, 10, 160, 128), None);
        assert_eq!(clip_rect(0, 0, 10, -3, 160, 128), None);
        assert_eq!(clip_rect(160, 0, 10, 10, 160, 128), None);
        assert_eq!(clip_rect(0, 128, 10, 10, 160, 128), None);
        assert_eq!(clip_rect(-20, 0, 20, 10, 160, 128), None);
    }

    #[test]
    fn clip_does_not_overflow_near_i16_limits() {
        assert_eq!(
            clip_rect(i16::MAX, 0, i16::MAX, 1, 160, 128),
            None
        );
        assert_eq!(
            clip_rect(i16::MIN, 0, i16::MAX, 1, 160, 128),
            None
        );
        assert_eq!(
            clip_rect(0, 0, i16::MAX, i16::MAX, 160, 128),
            Some(Window { x: 0, y: 0, width: 160, height: 128 })
        );
    }

    #[test]
    fn window_contains_is_inclusive() {
        let w = Window { x: 2, y: 3, width: 4, height: 2 };
        assert!(w.contains(2, 3));
        assert!(w.contains(5, 4));
        assert!(!w.contains(6, 4));
        assert!(!w.contains(5, 5));
        assert!(!w.contains(1, 3));
    }

    fn circle_points(r: i16) -> BTreeSet<(i16, i16)> {
        let mut points = BTreeSet::new();
        points.extend([(0, r), (0, -r), (r, 0), (-r, 0)]);
        for (x, y) in MidpointCircle::new(r) {
            points.extend(octants(0, 0, x, y));
        }
        points
    }

    #[test]
    fn circle_is_eightfold_symmetric() {
        for r in 0..40 {
            let points = circle_points(r);
            for &(x, y) in &points {
                assert!(points.contains(&(-x, y)), "r={r} ({x},{y})");
                assert!(points.contains(&(x, -y)), "r={r} ({x},{y})");
                assert!(points.contains(&(y, x)), "r={r} ({x},{y})");
            }
        }
    }

    #[test]
    fn circle_points_stay_near_the_radius() {
        for r in 1..40i32 {
            for (x, y) in circle_points(r as i16) {
                let d = (x as i32).pow(2) + (y as i32).pow(2) - r * r;
                assert!(d.abs() <= r, "r={r} ({x},{y}) off by {d}");
            }
        }
    }

    #[test]
    fn zero_radius_circle_is_a_single_point() {
        assert_eq!(MidpointCircle::new(0).count(), 0);
        assert_eq!(circle_points(0).into_iter().collect::<Vec<_>>(), [(0, 0)]);
    }

    #[test]
    fn radius_three_matches_reference_raster() {
        let steps: Vec<_> = MidpointCircle::new(3).collect();
        assert_eq!(steps, [(1, 3), (2, 2)]);
    }

    #[test]
    fn line_includes_both_endpoints() {
        let points: Vec<_> = LinePoints::new((0, 0), (4, 2)).collect();
        assert_eq!(points.first(), Some(&(0, 0)));
        assert_eq!(points.last(), Some(&(4, 2)));
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn line_runs_backwards_and_steep() {
        let points: Vec<_> = LinePoints::new((3, 10), (1, 0)).collect();
        assert_eq!(points.first(), Some(&(3, 10)));
        assert_eq!(points.last(), Some(&(1, 0)));
        assert_eq!(points.len(), 11);
        for pair in points.windows(2) {
            assert!((pair[0].0 - pair[1].0).abs() <= 1);
            assert_eq!(pair[0].1 - pair[1].1, 1);
        }
    }

    #[test]
    fn degenerate_line_is_one_point() {
        let points: Vec<_> = LinePoints::new((7, 7), (7, 7)).collect();
        assert_eq!(points, [(7, 7)]);
    }
}
