// Track generation and segment lookup against the public API.

use rand::SeedableRng;
use road_racer::GameConfig;
use road_racer::rng::GameRng;
use road_racer::track::{TrackBuilder, build_track};

#[test]
fn generated_loop_closes_at_zero_elevation() {
    let config = GameConfig::default();
    for seed in [1, 2, 99] {
        let track = build_track(&config, &mut GameRng::seed_from_u64(seed));
        let segments = track.segments();
        assert_eq!(segments[0].p1.world.y, 0.0);
        assert_eq!(segments[segments.len() - 1].p2.world.y, 0.0);
    }
}

#[test]
fn adjacent_segments_share_edges() {
    let track = build_track(&GameConfig::default(), &mut GameRng::seed_from_u64(4));
    for pair in track.segments().windows(2) {
        assert_eq!(pair[0].p2.world.y, pair[1].p1.world.y);
        assert_eq!(pair[0].p2.world.z, pair[1].p1.world.z);
    }
}

#[test]
fn segment_indices_are_contiguous() {
    let track = build_track(&GameConfig::default(), &mut GameRng::seed_from_u64(4));
    for (i, segment) in track.segments().iter().enumerate() {
        assert_eq!(segment.index, i);
    }
}

#[test]
fn lookup_matches_floor_and_wraps() {
    let track = build_track(&GameConfig::default(), &mut GameRng::seed_from_u64(8));
    let seg_len = track.segment_length();
    let n = track.len();
    let length = track.track_length();

    let mut z = 0.0;
    while z < length {
        assert_eq!(track.find_segment(z).index, (z / seg_len).floor() as usize);
        z += 137.5;
    }
    assert_eq!(track.find_segment(length).index, 0);
    assert_eq!(track.find_segment(length + 3.0 * seg_len + 1.0).index, 3);
    assert_eq!(track.find_segment(-1.0).index, n - 1);
    assert_eq!(track.find_segment(-length - seg_len).index, n - 1);
}

#[test]
fn empty_road_section_adds_nothing() {
    let mut b = TrackBuilder::new(200.0, 3);
    b.add_straight(10);
    b.add_road(0, 0, 0, 6.0, 60.0);
    let track = b.finish();
    assert_eq!(track.len(), 30);
    assert_eq!(track.last_y(), 0.0);
}
