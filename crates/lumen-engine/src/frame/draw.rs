use crate::coords::{Color, Rect};

/// Draw primitive recorded during a frame session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCmd {
    FillRect { rect: Rect, color: Color },
    /// Outline drawn inward from `rect`'s edges.
    StrokeRect { rect: Rect, color: Color, thickness: f32 },
}

impl DrawCmd {
    /// Expands the command into filled quads.
    ///
    /// Outlines become four non-overlapping edges; an outline thick enough to
    /// cover the whole rectangle degenerates into a single fill.
    pub fn for_each_quad(&self, mut f: impl FnMut(Rect, Color)) {
        match *self {
            DrawCmd::FillRect { rect, color } => {
                let r = rect.normalized();
                if !r.is_empty() {
                    f(r, color);
                }
            }
            DrawCmd::StrokeRect { rect, color, thickness } => {
                let r = rect.normalized();
                if r.is_empty() || thickness <= 0.0 {
                    return;
                }
                let t = thickness.min(r.size.x * 0.5).min(r.size.y * 0.5);
                if t * 2.0 >= r.size.x || t * 2.0 >= r.size.y {
                    f(r, color);
                    return;
                }
                let (x, y, w, h) = (r.origin.x, r.origin.y, r.size.x, r.size.y);
                f(Rect::new(x, y, w, t), color);
                f(Rect::new(x, y + h - t, w, t), color);
                f(Rect::new(x, y + t, t, h - 2.0 * t), color);
                f(Rect::new(x + w - t, y + t, t, h - 2.0 * t), color);
            }
        }
    }
}

/// A recorded command plus its scissor rect (physical pixels, `None` = whole target).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub cmd: DrawCmd,
    pub clip: Option<Rect>,
}

/// Commands recorded for one frame, in submission order.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd, clip: Option<Rect>) {
        self.items.push(DrawItem { cmd, clip });
    }

    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quads(cmd: DrawCmd) -> Vec<Rect> {
        let mut out = Vec::new();
        cmd.for_each_quad(|r, _| out.push(r));
        out
    }

    #[test]
    fn fill_is_one_normalized_quad() {
        let q = quads(DrawCmd::FillRect {
            rect: Rect::new(10.0, 10.0, -4.0, 4.0),
            color: Color::WHITE,
        });
        assert_eq!(q, vec![Rect::new(6.0, 10.0, 4.0, 4.0)]);
    }

    #[test]
    fn stroke_edges_cover_the_ring_without_overlap() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let q = quads(DrawCmd::StrokeRect { rect, color: Color::WHITE, thickness: 2.0 });
        assert_eq!(q.len(), 4);

        let ring: f32 = q.iter().map(|r| r.area()).sum();
        assert_eq!(ring, 100.0 * 50.0 - 96.0 * 46.0);
        for (i, a) in q.iter().enumerate() {
            for b in &q[i + 1..] {
                assert!(a.intersect(*b).is_none());
            }
        }
    }

    #[test]
    fn oversized_stroke_degenerates_to_fill() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let q = quads(DrawCmd::StrokeRect { rect, color: Color::WHITE, thickness: 8.0 });
        assert_eq!(q, vec![rect]);
    }

    #[test]
    fn empty_or_zero_thickness_draws_nothing() {
        assert!(quads(DrawCmd::FillRect { rect: Rect::default(), color: Color::WHITE }).is_empty());
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let hairline = DrawCmd::StrokeRect {
            rect,
            color: Color::WHITE,
            thickness: 0.0,
        };
        assert!(quads(hairline).is_empty());
    }
}
