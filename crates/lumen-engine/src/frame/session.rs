use crate::coords::{Color, Rect, Vec2, ViewportMapper};
use crate::device::{FrameError, FramePacket, GpuDevice};

use super::{DrawCmd, DrawList};

/// Scoped GPU work for exactly one frame.
///
/// `begin()` acquires the output target and recording context; draw
/// primitives are methods on the session (or its [`Canvas`]), so they cannot
/// be issued outside `begin()`..`end()`. `end()` consumes the session and
/// submits + presents. A session dropped without `end()` discards its target,
/// so no half-open frame ever outlives the iteration that opened it.
pub struct FrameSession<'d, D: GpuDevice> {
    device: &'d mut D,
    frame: Option<D::Frame>,
    viewport: &'d ViewportMapper,
    list: DrawList,
    clear: Color,
    letterbox_color: Color,
}

impl<'d, D: GpuDevice> FrameSession<'d, D> {
    /// Acquires a target and opens a pass that clears to `clear`.
    ///
    /// On error nothing is held; the caller skips drawing and never calls `end()`.
    pub fn begin(
        device: &'d mut D,
        viewport: &'d ViewportMapper,
        clear: Color,
        letterbox_color: Color,
    ) -> Result<Self, FrameError> {
        let frame = device.acquire_frame()?;
        Ok(Self {
            device,
            frame: Some(frame),
            viewport,
            list: DrawList::new(),
            clear,
            letterbox_color,
        })
    }

    /// Draw-primitive view handed to the host's draw callback.
    #[inline]
    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas {
            list: &mut self.list,
            viewport: self.viewport,
        }
    }

    #[inline]
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.canvas().fill_rect(rect, color);
    }

    #[inline]
    pub fn stroke_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        self.canvas().stroke_rect(rect, color, thickness);
    }

    /// Number of commands recorded so far (letterbox bars excluded).
    #[inline]
    pub fn recorded(&self) -> usize {
        self.list.len()
    }

    /// Closes the pass, submits the recorded work and presents.
    ///
    /// On failure the device has already released the target.
    pub fn end(mut self) -> Result<(), FrameError> {
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };

        // Bars go last so overdraw past the content rect never shows.
        for bar in self.viewport.letterbox().iter() {
            self.list.push(
                DrawCmd::FillRect {
                    rect: *bar,
                    color: self.letterbox_color,
                },
                None,
            );
        }

        let packet = FramePacket {
            clear: self.clear,
            items: self.list.items(),
        };
        self.device.submit_frame(frame, &packet)
    }
}

impl<D: GpuDevice> Drop for FrameSession<'_, D> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            log::debug!("frame session closed without end(); discarding target");
            self.device.discard_frame(frame);
        }
    }
}

/// Logical-space drawing surface for the current frame.
///
/// Coordinates are in the configured logical resolution; they are mapped to
/// physical pixels and clipped to the content rectangle.
pub struct Canvas<'s> {
    list: &'s mut DrawList,
    viewport: &'s ViewportMapper,
}

impl Canvas<'_> {
    /// Logical resolution as `(width, height)`.
    pub fn logical_size(&self) -> Vec2 {
        let (w, h) = self.viewport.logical_size();
        Vec2::new(w as f32, h as f32)
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if !rect.is_finite() || !color.is_finite() {
            log::debug!("fill_rect: non-finite input ignored ({rect:?}, {color:?})");
            return;
        }
        let rect = self.viewport.rect_to_physical(rect);
        self.list.push(DrawCmd::FillRect { rect, color }, self.clip());
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        if !rect.is_finite() || !color.is_finite() || !thickness.is_finite() {
            log::debug!("stroke_rect: non-finite input ignored ({rect:?}, {color:?}, {thickness})");
            return;
        }
        let rect = self.viewport.rect_to_physical(rect);
        let thickness = thickness * self.viewport.scale();
        self.list
            .push(DrawCmd::StrokeRect { rect, color, thickness }, self.clip());
    }

    #[inline]
    fn clip(&self) -> Option<Rect> {
        Some(self.viewport.content_rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    fn viewport() -> ViewportMapper {
        let mut v = ViewportMapper::new(640, 480);
        v.set_output_size(1280, 720);
        v
    }

    const CLEAR: Color = Color::rgb(0.1, 0.2, 0.3);

    // ── begin / end ───────────────────────────────────────────────────────

    #[test]
    fn committed_session_presents_once() {
        let vp = viewport();
        let mut dev = MockDevice::new(1280, 720);

        let mut s = FrameSession::begin(&mut dev, &vp, CLEAR, Color::BLACK).unwrap();
        s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        assert_eq!(s.recorded(), 1);
        s.end().unwrap();

        assert_eq!(dev.submitted, 1);
        assert_eq!(dev.outstanding, 0);
        assert_eq!(dev.last_clear, Some(CLEAR));
    }

    #[test]
    fn failed_begin_holds_nothing() {
        let vp = viewport();
        let mut dev = MockDevice::new(1280, 720);
        for _ in 0..3 {
            dev.acquire_failures
                .push_back(FrameError::TargetUnavailable("minimized".into()));
        }

        for _ in 0..3 {
            assert!(FrameSession::begin(&mut dev, &vp, CLEAR, Color::BLACK).is_err());
        }
        assert_eq!(dev.acquired, 0);
        assert_eq!(dev.submitted + dev.failed_submits, 0);
        assert_eq!(dev.outstanding, 0);
    }

    #[test]
    fn dropped_session_is_discarded() {
        let vp = viewport();
        let mut dev = MockDevice::new(1280, 720);
        {
            let mut s = FrameSession::begin(&mut dev, &vp, CLEAR, Color::BLACK).unwrap();
            s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        }
        assert_eq!(dev.discarded, 1);
        assert_eq!(dev.submitted, 0);
        assert_eq!(dev.outstanding, 0);
    }

    #[test]
    fn failed_submit_releases_the_target() {
        let vp = viewport();
        let mut dev = MockDevice::new(1280, 720);
        dev.submit_failures
            .push_back(FrameError::SubmitFailed("validation".into()));

        let s = FrameSession::begin(&mut dev, &vp, CLEAR, Color::BLACK).unwrap();
        let err = s.end().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(dev.outstanding, 0);
        assert_eq!(dev.discarded, 0);
    }

    // ── recording ─────────────────────────────────────────────────────────

    #[test]
    fn draws_are_mapped_and_clipped_to_content() {
        let vp = viewport();
        let mut dev = MockDevice::new(1280, 720);

        let mut s = FrameSession::begin(&mut dev, &vp, CLEAR, Color::BLACK).unwrap();
        {
            let mut canvas = s.canvas();
            assert_eq!(canvas.logical_size(), Vec2::new(640.0, 480.0));
            canvas.fill_rect(Rect::new(10.0, 20.0, 100.0, 50.0), Color::WHITE);
            canvas.stroke_rect(Rect::new(0.0, 0.0, 640.0, 480.0), Color::WHITE, 2.0);
        }
        s.end().unwrap();

        let content = Rect::new(160.0, 0.0, 960.0, 720.0);
        assert_eq!(
            dev.last_items[0].cmd,
            DrawCmd::FillRect {
                rect: Rect::new(175.0, 30.0, 150.0, 75.0),
                color: Color::WHITE,
            }
        );
        assert_eq!(dev.last_items[0].clip, Some(content));
        assert_eq!(
            dev.last_items[1].cmd,
            DrawCmd::StrokeRect { rect: content, color: Color::WHITE, thickness: 3.0 }
        );
    }

    #[test]
    fn letterbox_bars_are_appended_unclipped() {
        let vp = viewport();
        let mut dev = MockDevice::new(1280, 720);
        let bar_color = Color::rgb(0.0, 0.0, 0.05);

        let s = FrameSession::begin(&mut dev, &vp, CLEAR, bar_color).unwrap();
        s.end().unwrap();

        assert_eq!(dev.last_items.len(), 2);
        for (item, bar) in dev.last_items.iter().zip(vp.letterbox().iter()) {
            assert_eq!(item.cmd, DrawCmd::FillRect { rect: *bar, color: bar_color });
            assert_eq!(item.clip, None);
        }
    }

    #[test]
    fn non_finite_draws_are_ignored() {
        let vp = viewport();
        let mut dev = MockDevice::new(1280, 720);

        let mut s = FrameSession::begin(&mut dev, &vp, CLEAR, Color::BLACK).unwrap();
        s.fill_rect(Rect::new(f32::NAN, 0.0, 1.0, 1.0), Color::WHITE);
        s.stroke_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE, f32::INFINITY);
        assert_eq!(s.recorded(), 0);
    }
}
