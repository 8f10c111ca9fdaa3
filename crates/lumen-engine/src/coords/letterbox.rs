use super::Rect;

/// Maximum number of bars: top, bottom, left, right.
pub const MAX_BARS: usize = 4;

/// Fixed-capacity set of letterbox/pillarbox bars in physical pixels.
///
/// Stored inline; recomputing on resize never touches the heap.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Letterbox {
    bars: [Rect; MAX_BARS],
    len: usize,
}

impl Letterbox {
    #[inline]
    pub const fn new() -> Self {
        Self {
            bars: [Rect::new(0.0, 0.0, 0.0, 0.0); MAX_BARS],
            len: 0,
        }
    }

    /// Appends a bar. Bars with no area are dropped.
    pub(crate) fn push(&mut self, bar: Rect) {
        if bar.is_empty() {
            return;
        }
        debug_assert!(self.len < MAX_BARS, "letterbox holds at most {MAX_BARS} bars");
        if self.len < MAX_BARS {
            self.bars[self.len] = bar;
            self.len += 1;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Rect] {
        &self.bars[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sum of all bar areas.
    pub fn total_area(&self) -> f32 {
        self.iter().map(|r| r.area()).sum()
    }
}
