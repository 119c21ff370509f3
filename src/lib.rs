//! Road Racer core crate.
//!
//! A pseudo-3D ("OutRun-style") racer: a looped road of equal-length segments
//! is projected onto a canvas each frame from a camera riding behind the
//! player. The simulation and renderer are host-agnostic and emit plain draw
//! commands; `web` wires them to a browser canvas, keyboard and
//! `requestAnimationFrame`.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod hud;
pub mod math;
pub mod projection;
pub mod race;
pub mod render;
pub mod rng;
pub mod track;
mod web;

pub use config::{ConfigError, GameConfig};
pub use hud::{HudSnapshot, format_lap_time};
pub use race::{Input, Race};
pub use render::{DrawCommand, Frame, render_frame};
pub use web::{reset_game, start_game};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Info).ok();
}
