//! Seeded randomness for decoration placement, traffic seeding and the
//! cosmetic player bounce.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Generator the race owns. Seed with `GameRng::seed_from_u64` for
/// reproducible tracks.
pub type GameRng = Pcg64;

/// Seeds from browser entropy (`rng` feature) or the page clock.
pub fn from_entropy() -> GameRng {
    GameRng::seed_from_u64(entropy_seed())
}

/// `-1.0` or `1.0` with equal odds.
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Uniform in `[min, max)`; `min` when the range is empty.
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if min < max { rng.random_range(min..max) } else { min }
}

#[cfg(feature = "rng")]
fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            log::warn!("getrandom unavailable ({err}), seeding from clock");
            clock_seed()
        }
    }
}

#[cfg(not(feature = "rng"))]
fn entropy_seed() -> u64 {
    clock_seed()
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    let now = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    (now * 1000.0) as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
