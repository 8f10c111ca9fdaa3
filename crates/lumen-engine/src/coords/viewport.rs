use super::{Letterbox, Rect, Vec2};

/// Leftover extents thinner than this (physical px) are folded into the content rect.
const MIN_BAR_EXTENT: f32 = 1.0e-3;

/// Maps a fixed logical resolution onto the physical output surface.
///
/// Content is scaled uniformly (`s = min(Ow/Lw, Oh/Lh)`) and centered; the
/// leftover space becomes up to four letterbox/pillarbox bars. The mapping is
/// cached and only recomputed when either size actually changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportMapper {
    logical: (u32, u32),
    output: (u32, u32),
    scale: f32,
    content: Rect,
    letterbox: Letterbox,
}

impl ViewportMapper {
    pub fn new(logical_width: u32, logical_height: u32) -> Self {
        let mut mapper = Self {
            logical: (logical_width, logical_height),
            output: (logical_width, logical_height),
            scale: 0.0,
            content: Rect::default(),
            letterbox: Letterbox::new(),
        };
        mapper.recompute();
        mapper
    }

    /// Updates the physical output size. Returns `true` if the mapping was recomputed.
    pub fn set_output_size(&mut self, width: u32, height: u32) -> bool {
        if self.output == (width, height) {
            return false;
        }
        self.output = (width, height);
        self.recompute();
        true
    }

    /// Updates the logical resolution. Returns `true` if the mapping was recomputed.
    pub fn set_logical_size(&mut self, width: u32, height: u32) -> bool {
        if self.logical == (width, height) {
            return false;
        }
        self.logical = (width, height);
        self.recompute();
        true
    }

    #[inline]
    pub fn logical_size(&self) -> (u32, u32) {
        self.logical
    }

    #[inline]
    pub fn output_size(&self) -> (u32, u32) {
        self.output
    }

    /// Uniform logical-to-physical scale. Zero while the output has no area.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Centered content rectangle in physical pixels.
    #[inline]
    pub fn content_rect(&self) -> Rect {
        self.content
    }

    #[inline]
    pub fn letterbox(&self) -> &Letterbox {
        &self.letterbox
    }

    /// Maps a logical point into physical pixels.
    #[inline]
    pub fn to_physical(&self, p: Vec2) -> Vec2 {
        self.content.origin + p * self.scale
    }

    /// Maps a logical rectangle into physical pixels.
    #[inline]
    pub fn rect_to_physical(&self, r: Rect) -> Rect {
        Rect::from_origin_size(self.to_physical(r.origin), r.size * self.scale)
    }

    /// Maps a physical pointer position back into logical space.
    ///
    /// Points over the bars (or outside the surface) clamp to the nearest
    /// logical edge.
    pub fn to_logical(&self, p: Vec2) -> Vec2 {
        if self.scale <= 0.0 {
            return Vec2::zero();
        }
        let max = Vec2::new(self.logical.0 as f32, self.logical.1 as f32);
        ((p - self.content.origin) / self.scale).clamp(Vec2::zero(), max)
    }

    fn recompute(&mut self) {
        self.letterbox.clear();

        let lw = self.logical.0 as f32;
        let lh = self.logical.1 as f32;
        let ow = self.output.0 as f32;
        let oh = self.output.1 as f32;

        if lw <= 0.0 || lh <= 0.0 || ow <= 0.0 || oh <= 0.0 {
            self.scale = 0.0;
            self.content = Rect::default();
            return;
        }

        let sx = ow / lw;
        let sy = oh / lh;

        // The limiting axis is filled exactly; only the other one can leave bars.
        let (scale, mut cw, mut ch) = if sx <= sy {
            (sx, ow, lh * sx)
        } else {
            (sy, lw * sy, oh)
        };
        if ow - cw < MIN_BAR_EXTENT {
            cw = ow;
        }
        if oh - ch < MIN_BAR_EXTENT {
            ch = oh;
        }

        let cx = (ow - cw) * 0.5;
        let cy = (oh - ch) * 0.5;

        self.scale = scale;
        self.content = Rect::new(cx, cy, cw, ch);

        self.letterbox.push(Rect::new(0.0, 0.0, ow, cy));
        self.letterbox.push(Rect::new(0.0, cy + ch, ow, oh - (cy + ch)));
        self.letterbox.push(Rect::new(0.0, cy, cx, ch));
        self.letterbox.push(Rect::new(cx + cw, cy, ow - (cx + cw), ch));

        log::trace!(
            "viewport {}x{} -> {}x{}: scale {:.4}, content {:?}, {} bar(s)",
            self.logical.0,
            self.logical.1,
            self.output.0,
            self.output.1,
            self.scale,
            self.content,
            self.letterbox.len()
        );
    }
}
