// Renderer output on hand-built and generated tracks.

use rand::SeedableRng;
use road_racer::config::SpriteRect;
use road_racer::projection::Viewport;
use road_racer::render::{DrawCommand, RaceView, Sheet};
use road_racer::rng::GameRng;
use road_racer::track::{Track, TrackBuilder, build_track};
use road_racer::{GameConfig, render_frame};

const VIEW: Viewport = Viewport::new(320.0, 480.0);

fn flat_track(segments: usize) -> Track {
    let mut b = TrackBuilder::new(200.0, 3);
    for _ in 0..segments {
        b.add_segment(0.0, 0.0);
    }
    b.finish()
}

fn sprite_images(commands: &[DrawCommand<'_>]) -> Vec<(SpriteRect, f64)> {
    commands
        .iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::Image { sheet: Sheet::Sprites, source, dest } => Some((*source, dest.w)),
            _ => None,
        })
        .collect()
}

#[test]
fn straight_road_stays_centred() {
    let config = GameConfig::default();
    let track = flat_track(500);
    let frame = render_frame(&config, &track, &RaceView::default(), VIEW);
    let visible: Vec<_> = frame.segments.iter().filter(|s| s.visible).collect();
    assert!(!visible.is_empty());
    for seg in visible {
        assert_eq!(seg.p1.screen.x, VIEW.width / 2.0);
        assert_eq!(seg.p2.screen.x, VIEW.width / 2.0);
    }
}

#[test]
fn segments_at_or_behind_the_camera_are_culled() {
    let config = GameConfig::default();
    let depth = config.camera_depth();
    let track = build_track(&config, &mut GameRng::seed_from_u64(11));
    for position in [0.0, 7_500.0, track.track_length() - 100.0] {
        let view = RaceView { position, ..RaceView::default() };
        let frame = render_frame(&config, &track, &view, VIEW);
        assert_eq!(frame.segments.len(), config.camera.draw_distance);

        let mut maxy = VIEW.height;
        for seg in &frame.segments {
            assert_eq!(seg.clip, maxy);
            if seg.p1.camera.z <= depth {
                assert!(!seg.visible);
            }
            if seg.visible {
                maxy = seg.p1.screen.y;
            }
        }
    }
    // the camera sits on segment 0's near edge at the start
    let frame = render_frame(&config, &track, &RaceView::default(), VIEW);
    assert!(!frame.segments[0].visible);
}

#[test]
fn sprites_paint_far_to_near() {
    let config = GameConfig::default();
    let billboard = config.sprites.billboards[0];
    let mut track = flat_track(500);
    for index in [10, 20, 30] {
        track.add_decoration(index, billboard, -1.2);
    }
    let frame = render_frame(&config, &track, &RaceView::default(), VIEW);
    let images = sprite_images(&frame.commands);

    let widths: Vec<f64> = images.iter().filter(|(s, _)| *s == billboard).map(|(_, w)| *w).collect();
    assert_eq!(widths.len(), 3);
    assert!(widths.windows(2).all(|w| w[0] < w[1]));
    // the player car is the nearest sprite and goes last
    assert_eq!(images.last().map(|(s, _)| *s), Some(config.sprites.player_straight));
}

#[test]
fn light_bands_get_lane_markers_and_dark_do_not() {
    let config = GameConfig::default();
    let track = flat_track(500);
    let frame = render_frame(&config, &track, &RaceView::default(), VIEW);
    let lane = config.colors.light.lane.as_deref();
    let markers = frame
        .commands
        .iter()
        .filter(|cmd| matches!(cmd, DrawCommand::Polygon { color, .. } if Some(*color) == lane))
        .count();
    let light_visible = frame
        .segments
        .iter()
        .filter(|s| s.visible && config.colors.band(s.band).lane.is_some())
        .count();
    assert!(light_visible > 0);
    assert_eq!(markers, light_visible * (config.road.lanes - 1));
}

#[test]
fn empty_track_renders_nothing() {
    let config = GameConfig::default();
    let track = TrackBuilder::new(200.0, 3).finish();
    let frame = render_frame(&config, &track, &RaceView::default(), VIEW);
    assert!(frame.commands.is_empty());
    assert!(frame.segments.is_empty());
}
