//! Per-frame road and sprite rendering into host-agnostic draw commands.
//!
//! Segments are walked from the camera outward. Each one is projected, culled
//! against the running horizon and painted. Projections live in the returned
//! [`Frame`] only and are recomputed every frame.

use crate::config::{GameConfig, SpriteCatalog, SpriteRect};
use crate::math;
use crate::projection::{Projection, Vec3, Viewport, project};
use crate::track::{Band, CarId, Decoration, Track};

/// Player sprite is drawn at a fixed pixel scale, anchored to the bottom edge.
const PLAYER_SCREEN_SCALE: f64 = 2.5;
const PLAYER_BOTTOM_MARGIN: f64 = 30.0;

/// Which sheet an image command samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sheet {
    Sprites,
    Background,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Immediate-mode 2D primitive, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand<'a> {
    Rect { rect: Rect, color: &'a str, alpha: f64 },
    Polygon { points: [(f64, f64); 4], color: &'a str },
    Image { sheet: Sheet, source: SpriteRect, dest: Rect },
}

/// Projection state of one visited segment for this frame only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedSegment {
    pub index: usize,
    pub band: Band,
    pub looped: bool,
    pub fog: f64,
    /// Horizon at the time the segment was visited; sprites on it clip here.
    pub clip: f64,
    pub p1: Projection,
    pub p2: Projection,
    /// Survived culling and was painted.
    pub visible: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Frame<'a> {
    pub commands: Vec<DrawCommand<'a>>,
    /// Visited segments in draw-distance order, nearest first.
    pub segments: Vec<ProjectedSegment>,
}

/// Kinematic snapshot the renderer reads.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RaceView {
    pub position: f64,
    pub player_x: f64,
    pub speed: f64,
    /// -1 steering left, 1 right, 0 straight.
    pub steer: f64,
    /// Vertical jitter of the player sprite, pixels.
    pub bounce: f64,
    pub sky_offset: f64,
    pub hill_offset: f64,
    pub tree_offset: f64,
}

enum Queued {
    Player { slot: usize },
    Car { id: CarId, slot: usize },
    Decoration { decoration: Decoration, slot: usize },
}

pub fn render_frame<'a>(
    config: &'a GameConfig,
    track: &Track,
    view: &RaceView,
    viewport: Viewport,
) -> Frame<'a> {
    let mut frame = Frame::default();
    if track.is_empty() {
        return frame;
    }

    frame.commands.push(DrawCommand::Rect {
        rect: Rect { x: 0.0, y: 0.0, w: viewport.width, h: viewport.height },
        color: &config.colors.sky,
        alpha: 1.0,
    });
    push_background(&mut frame, config, view, viewport);

    let road_width = config.road.width;
    let camera_depth = config.camera_depth();
    let player_z = config.player_z();
    let segment_length = track.segment_length();
    let track_length = track.track_length();
    let draw_distance = config.camera.draw_distance;

    let base = track.find_segment(view.position);
    let base_percent = math::percent_remaining(view.position, segment_length);
    let player_segment = track.find_segment(view.position + player_z);
    let player_percent = math::percent_remaining(view.position + player_z, segment_length);
    let player_y = math::interpolate(
        player_segment.p1.world.y,
        player_segment.p2.world.y,
        player_percent,
    );

    let mut maxy = viewport.height;
    let mut x = 0.0;
    let mut dx = -(base.curve * base_percent);
    let mut queue = Vec::new();

    for n in 0..draw_distance {
        let segment = track.segment_after(base.index, n);
        let looped = segment.index < base.index;
        let camera_z = view.position - if looped { track_length } else { 0.0 };
        let camera_y = player_y + config.camera.height;
        let camera_x = view.player_x * road_width - x;

        let p1 = project(
            Vec3::new(0.0, segment.p1.world.y, segment.p1.world.z),
            Vec3::new(camera_x, camera_y, camera_z),
            camera_depth,
            viewport,
            road_width,
        );
        let p2 = project(
            Vec3::new(0.0, segment.p2.world.y, segment.p2.world.z),
            Vec3::new(camera_x - dx, camera_y, camera_z),
            camera_depth,
            viewport,
            road_width,
        );

        x += dx;
        dx += segment.curve;

        let visible = p1.camera.z > camera_depth
            && p2.screen.y < p1.screen.y
            && p2.screen.y < maxy;

        let slot = frame.segments.len();
        frame.segments.push(ProjectedSegment {
            index: segment.index,
            band: segment.band,
            looped,
            fog: math::exponential_fog(n as f64 / draw_distance as f64, config.camera.fog_density),
            clip: maxy,
            p1,
            p2,
            visible,
        });
        if !visible {
            continue;
        }

        push_segment(&mut frame.commands, config, &frame.segments[slot], viewport);
        maxy = p1.screen.y;

        if segment.index == player_segment.index {
            queue.push(Queued::Player { slot });
        }
        for &id in &segment.cars {
            queue.push(Queued::Car { id, slot });
        }
        for &decoration in &segment.sprites {
            queue.push(Queued::Decoration { decoration, slot });
        }
    }

    // queued near to far; drawing far to near keeps occlusion right
    for item in queue.into_iter().rev() {
        match item {
            Queued::Player { slot } => {
                let seg = &track.segments()[frame.segments[slot].index];
                let uphill = seg.p2.world.y - seg.p1.world.y > 0.0;
                push_player(&mut frame.commands, &config.sprites, view, uphill, viewport);
            }
            Queued::Car { id, slot } => {
                let car = track.car(id);
                let seg = frame.segments[slot];
                let (s1, s2) = (seg.p1.screen, seg.p2.screen);
                let scale = math::interpolate(s1.scale, s2.scale, car.percent);
                let sx = math::interpolate(s1.x, s2.x, car.percent)
                    + scale * car.offset * road_width * viewport.half_width();
                let sy = math::interpolate(s1.y, s2.y, car.percent);
                let placement = SpritePlacement { scale, x: sx, y: sy, anchor_x: -0.5, clip: seg.clip };
                push_sprite(&mut frame.commands, config, car.sprite, placement, viewport);
            }
            Queued::Decoration { decoration, slot } => {
                let seg = frame.segments[slot];
                let scale = seg.p1.screen.scale;
                let sx = seg.p1.screen.x
                    + scale * decoration.offset * road_width * viewport.half_width();
                let anchor_x = if decoration.offset < 0.0 { -1.0 } else { 0.0 };
                let placement = SpritePlacement { scale, x: sx, y: seg.p1.screen.y, anchor_x, clip: seg.clip };
                push_sprite(&mut frame.commands, config, decoration.source, placement, viewport);
            }
        }
    }

    frame
}

fn rumble_width(projected_road_width: f64, lanes: usize) -> f64 {
    projected_road_width / 6f64.max(2.0 * lanes as f64)
}

fn lane_marker_width(projected_road_width: f64, lanes: usize) -> f64 {
    projected_road_width / 32f64.max(8.0 * lanes as f64)
}

fn push_segment<'a>(
    out: &mut Vec<DrawCommand<'a>>,
    config: &'a GameConfig,
    segment: &ProjectedSegment,
    viewport: Viewport,
) {
    let (p1, p2) = (segment.p1.screen, segment.p2.screen);
    let lanes = config.road.lanes;
    let colors = config.colors.band(segment.band);

    let r1 = rumble_width(p1.w, lanes);
    let r2 = rumble_width(p2.w, lanes);
    let l1 = lane_marker_width(p1.w, lanes);
    let l2 = lane_marker_width(p2.w, lanes);

    out.push(DrawCommand::Rect {
        rect: Rect { x: 0.0, y: p2.y, w: viewport.width, h: p1.y - p2.y },
        color: &colors.grass,
        alpha: 1.0,
    });

    let rumble = &colors.rumble;
    out.push(DrawCommand::Polygon {
        points: [
            (p1.x - p1.w - r1, p1.y),
            (p1.x - p1.w, p1.y),
            (p2.x - p2.w, p2.y),
            (p2.x - p2.w - r2, p2.y),
        ],
        color: rumble,
    });
    out.push(DrawCommand::Polygon {
        points: [
            (p1.x + p1.w + r1, p1.y),
            (p1.x + p1.w, p1.y),
            (p2.x + p2.w, p2.y),
            (p2.x + p2.w + r2, p2.y),
        ],
        color: rumble,
    });

    out.push(DrawCommand::Polygon {
        points: [
            (p1.x - p1.w, p1.y),
            (p1.x + p1.w, p1.y),
            (p2.x + p2.w, p2.y),
            (p2.x - p2.w, p2.y),
        ],
        color: &colors.road,
    });

    if let Some(lane_color) = colors.lane.as_deref() {
        if lanes > 1 {
            let lanew1 = p1.w * 2.0 / lanes as f64;
            let lanew2 = p2.w * 2.0 / lanes as f64;
            let mut lanex1 = p1.x - p1.w + lanew1;
            let mut lanex2 = p2.x - p2.w + lanew2;
            for _ in 1..lanes {
                out.push(DrawCommand::Polygon {
                    points: [
                        (lanex1 - l1 / 2.0, p1.y),
                        (lanex1 + l1 / 2.0, p1.y),
                        (lanex2 + l2 / 2.0, p2.y),
                        (lanex2 - l2 / 2.0, p2.y),
                    ],
                    color: lane_color,
                });
                lanex1 += lanew1;
                lanex2 += lanew2;
            }
        }
    }

    if segment.fog < 1.0 {
        out.push(DrawCommand::Rect {
            rect: Rect { x: 0.0, y: p2.y, w: viewport.width, h: p1.y - p2.y },
            color: &config.colors.fog,
            alpha: 1.0 - segment.fog,
        });
    }
}

#[derive(Clone, Copy)]
struct SpritePlacement {
    scale: f64,
    x: f64,
    y: f64,
    /// Horizontal anchor as a fraction of the drawn width (-1 right-aligned, -0.5 centred).
    anchor_x: f64,
    clip: f64,
}

/// Scales a world sprite, bottom-anchors it and crops whatever pokes below
/// `clip` (the road that occludes it). Fully hidden sprites emit nothing.
fn push_sprite(
    out: &mut Vec<DrawCommand<'_>>,
    config: &GameConfig,
    sprite: SpriteRect,
    at: SpritePlacement,
    viewport: Viewport,
) {
    let world_scale = config.sprites.scale * config.road.width;
    let dest_w = sprite.w * at.scale * viewport.half_width() * world_scale;
    let dest_h = sprite.h * at.scale * viewport.half_width() * world_scale;
    let dest_x = at.x + dest_w * at.anchor_x;
    let dest_y = at.y - dest_h;

    let clip_h = if at.clip > 0.0 { (dest_y + dest_h - at.clip).max(0.0) } else { 0.0 };
    if clip_h >= dest_h {
        return;
    }
    out.push(DrawCommand::Image {
        sheet: Sheet::Sprites,
        source: SpriteRect { h: sprite.h - sprite.h * clip_h / dest_h, ..sprite },
        dest: Rect { x: dest_x, y: dest_y, w: dest_w, h: dest_h - clip_h },
    });
}

fn push_player(
    out: &mut Vec<DrawCommand<'_>>,
    sprites: &SpriteCatalog,
    view: &RaceView,
    uphill: bool,
    viewport: Viewport,
) {
    let steer = view.speed * view.steer;
    let sprite = match (steer < 0.0, steer > 0.0, uphill) {
        (true, _, true) => sprites.player_uphill_left,
        (true, _, false) => sprites.player_left,
        (_, true, true) => sprites.player_uphill_right,
        (_, true, false) => sprites.player_right,
        (_, _, true) => sprites.player_uphill_straight,
        (_, _, false) => sprites.player_straight,
    };
    let w = sprite.w * PLAYER_SCREEN_SCALE;
    let h = sprite.h * PLAYER_SCREEN_SCALE;
    out.push(DrawCommand::Image {
        sheet: Sheet::Sprites,
        source: sprite,
        dest: Rect {
            x: viewport.half_width() - w / 2.0,
            y: viewport.height - h - PLAYER_BOTTOM_MARGIN + view.bounce,
            w,
            h,
        },
    });
}

/// Sky, hills and trees, each as two horizontally scrolling tiles meeting
/// around the horizon line.
fn push_background(frame: &mut Frame<'_>, config: &GameConfig, view: &RaceView, viewport: Viewport) {
    let (width, height) = (viewport.width, viewport.height);
    let horizon = height * 0.38;
    let sprites = &config.sprites;
    let hill_h = height * 0.20;
    let tree_h = height * 0.18;
    let layers = [
        (sprites.sky, view.sky_offset, 0.0, horizon + height * 0.08),
        (sprites.hills, view.hill_offset, horizon - hill_h * 0.5, hill_h),
        (sprites.trees, view.tree_offset, horizon - tree_h * 0.4, tree_h),
    ];
    for (source, offset, y, h) in layers {
        let half = SpriteRect { w: source.w / 2.0, ..source };
        let scroll = offset * width;
        for x in [-scroll, width - scroll] {
            let x = if x < -width { width } else { x };
            frame.commands.push(DrawCommand::Image {
                sheet: Sheet::Background,
                source: half,
                dest: Rect { x, y, w: width, h },
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(320.0, 480.0);

    fn image_dest(cmd: &DrawCommand<'_>) -> (SpriteRect, Rect) {
        match cmd {
            DrawCommand::Image { source, dest, .. } => (*source, *dest),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn sprite_below_clip_is_cropped() {
        let config = GameConfig::default();
        let sprite = SpriteRect::new(0.0, 0.0, 100.0, 100.0);
        let mut out = Vec::new();
        // dest is 100 * 0.01 * 160 * (0.00375 * 2000) = 1200 px square, bottom at y=300
        let at = SpritePlacement { scale: 0.01, x: 100.0, y: 300.0, anchor_x: -0.5, clip: 200.0 };
        push_sprite(&mut out, &config, sprite, at, VIEW);
        let (source, dest) = image_dest(&out[0]);
        assert!((dest.w - 1200.0).abs() < 1e-6);
        assert!((dest.x - (100.0 - 600.0)).abs() < 1e-6);
        assert!((dest.y - (300.0 - 1200.0)).abs() < 1e-6);
        // 100 px below the clip line are cut off
        assert!((dest.h - 1100.0).abs() < 1e-6);
        assert!((source.h - 100.0 * 1100.0 / 1200.0).abs() < 1e-6);
    }

    #[test]
    fn fully_clipped_sprite_is_skipped() {
        let config = GameConfig::default();
        let sprite = SpriteRect::new(0.0, 0.0, 100.0, 100.0);
        let mut out = Vec::new();
        let at = SpritePlacement { scale: 0.0001, x: 100.0, y: 300.0, anchor_x: 0.0, clip: 100.0 };
        push_sprite(&mut out, &config, sprite, at, VIEW);
        assert!(out.is_empty());
    }

    #[test]
    fn player_variant_follows_steering_and_slope() {
        let sprites = SpriteCatalog::default();
        let mut out = Vec::new();
        let view = RaceView { speed: 100.0, steer: -1.0, ..RaceView::default() };
        push_player(&mut out, &sprites, &view, true, VIEW);
        let straight = RaceView { speed: 100.0, ..RaceView::default() };
        push_player(&mut out, &sprites, &straight, false, VIEW);
        // steering at standstill shows the straight sprite
        let parked = RaceView { speed: 0.0, steer: 1.0, ..RaceView::default() };
        push_player(&mut out, &sprites, &parked, false, VIEW);
        assert_eq!(image_dest(&out[0]).0, sprites.player_uphill_left);
        assert_eq!(image_dest(&out[1]).0, sprites.player_straight);
        assert_eq!(image_dest(&out[2]).0, sprites.player_straight);
        let (_, dest) = image_dest(&out[1]);
        assert_eq!(dest.x, 160.0 - 100.0);
        assert_eq!(dest.y, 480.0 - 41.0 * 2.5 - 30.0);
    }

    #[test]
    fn background_emits_two_tiles_per_layer() {
        let config = GameConfig::default();
        let mut frame = Frame::default();
        let view = RaceView { sky_offset: 0.25, ..RaceView::default() };
        push_background(&mut frame, &config, &view, VIEW);
        assert_eq!(frame.commands.len(), 6);
        let (_, first) = image_dest(&frame.commands[0]);
        let (_, second) = image_dest(&frame.commands[1]);
        assert_eq!(first.x, -80.0);
        assert_eq!(second.x, 240.0);
    }
}
