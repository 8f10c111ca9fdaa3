use super::Vec2;

/// Axis-aligned rectangle, origin at the top-left with +Y pointing down.
///
/// Extents may be negative until [`normalized`](Rect::normalized) is applied.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Corner opposite the origin.
    #[inline]
    pub fn far(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn area(self) -> f32 {
        (self.size.x * self.size.y).abs()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Same area with non-negative extents.
    pub fn normalized(self) -> Self {
        let (x0, x1) = min_max(self.origin.x, self.origin.x + self.size.x);
        let (y0, y1) = min_max(self.origin.y, self.origin.y + self.size.y);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Overlap of two rectangles; rectangles that only share an edge do not overlap.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let (a, b) = (self.normalized(), other.normalized());
        let lo = Vec2::new(a.origin.x.max(b.origin.x), a.origin.y.max(b.origin.y));
        let (af, bf) = (a.far(), b.far());
        let hi = Vec2::new(af.x.min(bf.x), af.y.min(bf.y));

        let r = Rect::from_origin_size(lo, hi - lo);
        (!r.is_empty()).then_some(r)
    }
}

fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    #[test]
    fn normalized_flips_negative_extents() {
        assert_eq!(r(10.0, 10.0, -4.0, -3.0).normalized(), r(6.0, 7.0, 4.0, 3.0));
        assert_eq!(r(1.0, 2.0, 3.0, 4.0).normalized(), r(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn intersect_clips_to_overlap() {
        let content = r(160.0, 0.0, 960.0, 720.0);
        let draw = r(100.0, -20.0, 200.0, 100.0);
        assert_eq!(content.intersect(draw), Some(r(160.0, 0.0, 140.0, 80.0)));
    }

    #[test]
    fn shared_edge_is_not_an_overlap() {
        let bar = r(0.0, 0.0, 160.0, 720.0);
        let content = r(160.0, 0.0, 960.0, 720.0);
        assert_eq!(bar.intersect(content), None);
    }

    #[test]
    fn area_ignores_orientation() {
        assert_eq!(r(0.0, 0.0, 4.0, 5.0).area(), 20.0);
        assert_eq!(r(4.0, 5.0, -4.0, -5.0).area(), 20.0);
    }

    #[test]
    fn empty_when_any_extent_is_not_positive() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, -1.0).is_empty());
        assert!(r(0.0, 0.0, f32::NAN, 1.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
