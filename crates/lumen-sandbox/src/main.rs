use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

use lumen_engine::coords::{Color, Rect, Vec2};
use lumen_engine::core::{Callbacks, EngineConfig};
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::memory::{self, Block};
use lumen_engine::window::Runtime;

const LOGICAL_W: u32 = 320;
const LOGICAL_H: u32 = 180;
const BOX_SIZE: f32 = 24.0;

/// A box bouncing off the edges of the logical canvas.
struct Bounce {
    pos: Vec2,
    vel: Vec2,
    hits: u32,
    /// Tracked allocation held between load and unload.
    banner: Option<Block>,
}

impl Bounce {
    fn new() -> Self {
        Self {
            pos: Vec2::new(40.0, 30.0),
            vel: Vec2::new(90.0, 65.0),
            hits: 0,
            banner: None,
        }
    }

    fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;

        let max = Vec2::new(LOGICAL_W as f32 - BOX_SIZE, LOGICAL_H as f32 - BOX_SIZE);
        if self.pos.x < 0.0 || self.pos.x > max.x {
            self.vel.x = -self.vel.x;
            self.hits += 1;
        }
        if self.pos.y < 0.0 || self.pos.y > max.y {
            self.vel.y = -self.vel.y;
            self.hits += 1;
        }
        self.pos = self.pos.clamp(Vec2::zero(), max);
    }

    fn color(&self) -> Color {
        const PALETTE: [Color; 3] = [
            Color::rgb(0.95, 0.55, 0.20),
            Color::rgb(0.30, 0.75, 0.95),
            Color::rgb(0.55, 0.90, 0.40),
        ];
        PALETTE[self.hits as usize % PALETTE.len()]
    }
}

fn setup() -> Option<EngineConfig> {
    let state = Rc::new(RefCell::new(Bounce::new()));

    let load = Rc::clone(&state);
    let update = Rc::clone(&state);
    let draw = Rc::clone(&state);
    let unload = state;

    let callbacks = Callbacks::new()
        .on_load(move || {
            let banner = memory::duplicate_str("lumen sandbox");
            if banner.is_none() {
                log::warn!("sandbox: could not allocate banner");
            }
            load.borrow_mut().banner = banner;
            log::info!("sandbox: loaded");
        })
        .on_update(move |dt| update.borrow_mut().step(dt as f32))
        .on_draw(move |canvas| {
            let s = draw.borrow();
            let size = canvas.logical_size();

            canvas.stroke_rect(Rect::new(0.0, 0.0, size.x, size.y), Color::WHITE, 1.0);
            canvas.fill_rect(Rect::new(s.pos.x, s.pos.y, BOX_SIZE, BOX_SIZE), s.color());
        })
        .on_unload(move || {
            let mut s = unload.borrow_mut();
            if let Some(banner) = s.banner.take() {
                memory::free(banner);
            }
            log::info!("sandbox: unloaded after {} bounces", s.hits);
        });

    Some(
        EngineConfig::new()
            .with_title("lumen sandbox")
            .with_window_size(960.0, 540.0)
            .with_logical_size(LOGICAL_W, LOGICAL_H)
            .with_clear_color(Color::from_u8(24, 26, 33, 255))
            .with_letterbox_color(Color::BLACK)
            .with_callbacks(callbacks),
    )
}

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match Runtime::run(setup) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
