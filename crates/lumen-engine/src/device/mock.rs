//! Recording `GpuDevice` used by unit tests; no GPU required.

use std::collections::VecDeque;

use winit::dpi::PhysicalSize;

use crate::coords::Color;
use crate::frame::DrawItem;

use super::{FrameError, FramePacket, GpuDevice};

#[derive(Debug)]
pub(crate) struct MockFrame {
    pub id: u64,
}

#[derive(Debug)]
pub(crate) struct MockDevice {
    pub size: PhysicalSize<u32>,
    pub acquire_failures: VecDeque<FrameError>,
    pub submit_failures: VecDeque<FrameError>,

    pub acquired: u64,
    pub submitted: u64,
    pub failed_submits: u64,
    pub discarded: u64,
    /// Targets currently held by the engine.
    pub outstanding: i64,
    pub shown: u32,
    pub resizes: Vec<PhysicalSize<u32>>,

    pub last_clear: Option<Color>,
    pub last_items: Vec<DrawItem>,
}

impl MockDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: PhysicalSize::new(width, height),
            acquire_failures: VecDeque::new(),
            submit_failures: VecDeque::new(),
            acquired: 0,
            submitted: 0,
            failed_submits: 0,
            discarded: 0,
            outstanding: 0,
            shown: 0,
            resizes: Vec::new(),
            last_clear: None,
            last_items: Vec::new(),
        }
    }
}

impl GpuDevice for MockDevice {
    type Frame = MockFrame;

    fn acquire_frame(&mut self) -> Result<MockFrame, FrameError> {
        if let Some(err) = self.acquire_failures.pop_front() {
            return Err(err);
        }
        self.acquired += 1;
        self.outstanding += 1;
        Ok(MockFrame { id: self.acquired })
    }

    fn submit_frame(
        &mut self,
        frame: MockFrame,
        packet: &FramePacket<'_>,
    ) -> Result<(), FrameError> {
        let _ = frame.id;
        self.outstanding -= 1;
        if let Some(err) = self.submit_failures.pop_front() {
            self.failed_submits += 1;
            return Err(err);
        }
        self.submitted += 1;
        self.last_clear = Some(packet.clear);
        self.last_items = packet.items.to_vec();
        Ok(())
    }

    fn discard_frame(&mut self, frame: MockFrame) {
        let _ = frame.id;
        self.outstanding -= 1;
        self.discarded += 1;
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        self.resizes.push(size);
    }

    fn output_size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn show(&mut self) {
        self.shown += 1;
    }
}
