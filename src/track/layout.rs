// The fixed circuit plus its roadside dressing and traffic.

use log::info;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::{Band, Car, Track, TrackBuilder};
use crate::config::GameConfig;
use crate::rng::{random_between, random_sign};

/// Builds the full circuit, dresses it and seeds traffic.
pub fn build_track<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Track {
    let road = &config.road;
    let (len, curve, hill) = (road.length, road.curve, road.hill);
    let mut b = TrackBuilder::new(road.segment_length, road.rumble_length);

    b.add_straight(len.short);
    b.add_low_rolling_hills(road, len.short, hill.low);
    b.add_s_curves(road);
    b.add_curve(len.medium, curve.medium, hill.low);
    b.add_bumps();
    b.add_low_rolling_hills(road, len.short, hill.low);
    b.add_curve(len.long * 2, curve.medium, hill.medium);
    b.add_straight(len.medium);
    b.add_hill(len.medium, hill.high);
    b.add_s_curves(road);
    b.add_curve(len.long, -curve.medium, hill.none);
    b.add_hill(len.long, hill.high);
    b.add_curve(len.long, curve.medium, -hill.low);
    b.add_bumps();
    b.add_hill(len.long, -hill.medium);
    b.add_straight(len.medium);
    b.add_s_curves(road);
    b.add_downhill_to_end(road, 200);

    let mut track = b.finish();
    mark_start_finish(&mut track, config.player_z());
    place_decorations(&mut track, config, rng);
    seed_traffic(&mut track, config, rng);

    info!(
        "track built: {} segments, length {}, {} cars",
        track.len(),
        track.track_length(),
        track.cars().len()
    );
    track
}

fn mark_start_finish(track: &mut Track, player_z: f64) {
    let n = track.len();
    if n == 0 {
        return;
    }
    let start = track.segment_index(player_z) + 2;
    for i in [start, start + 1] {
        track.segments[i % n].band = Band::Start;
    }
    let rumble = track.rumble_length().min(n);
    for segment in &mut track.segments[n - rumble..] {
        segment.band = Band::Finish;
    }
}

/// Billboards along the opening straight, palm trees lining the first 200
/// segments, random plants on either side afterwards.
pub fn place_decorations<R: Rng + ?Sized>(track: &mut Track, config: &GameConfig, rng: &mut R) {
    let sprites = &config.sprites;
    for (i, billboard) in sprites.billboards.iter().enumerate() {
        track.add_decoration(20 + i * 20, *billboard, -1.0);
    }

    for n in (10..200).step_by(10) {
        track.add_decoration(n, sprites.palm_tree, rng.random_range(0.5..1.0));
        track.add_decoration(n, sprites.palm_tree, rng.random_range(1.0..3.0));
    }

    for n in (200..track.len()).step_by(10) {
        if let Some(plant) = sprites.plants.choose(rng).copied() {
            let offset = random_sign(rng) * rng.random_range(2.0..5.0);
            track.add_decoration(n, plant, offset);
        }
    }
}

/// Replaces all traffic with `traffic.total_cars` fresh cars.
pub fn seed_traffic<R: Rng + ?Sized>(track: &mut Track, config: &GameConfig, rng: &mut R) {
    track.clear_cars();
    let traffic = &config.traffic;
    if track.is_empty() || config.sprites.cars.is_empty() {
        return;
    }
    for _ in 0..traffic.total_cars {
        let offset = rng.random::<f64>() * random_sign(rng) * 0.8;
        let z = rng.random_range(0..track.len()) as f64 * track.segment_length();
        let Some(sprite) = config.sprites.cars.choose(rng).copied() else {
            break;
        };
        let speed = random_between(rng, traffic.min_speed, traffic.max_speed);
        track.add_car(Car { offset, z, speed, sprite, percent: 0.0 });
    }
}
