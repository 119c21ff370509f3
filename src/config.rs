//! Host-supplied game configuration.
//!
//! The playable-ad page publishes a `GAME_CONFIG` object; the web host hands it
//! over as a JSON string. Every section is `#[serde(default)]` so a page only
//! needs to name the values it overrides. Defaults reproduce the classic
//! pseudo-3D racer tuning (200-unit segments, 60 fps step, 100° FOV).

use serde::Deserialize;
use thiserror::Error;

use crate::track::Band;

/// Simulation step the default speeds are tuned against (seconds).
const STEP: f64 = 1.0 / 60.0;
const SEGMENT_LENGTH: f64 = 200.0;
const MAX_SPEED: f64 = SEGMENT_LENGTH / STEP;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid game config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub road: RoadConfig,
    pub camera: CameraConfig,
    pub player: PlayerConfig,
    pub physics: PhysicsConfig,
    pub traffic: TrafficConfig,
    pub colors: ColorConfig,
    pub sprites: SpriteCatalog,
    pub parallax: ParallaxConfig,
    pub hud: HudConfig,
    pub assets: AssetConfig,
    pub canvas: CanvasConfig,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Distance from the eye to the projection plane: `1 / tan(fov / 2)`.
    pub fn camera_depth(&self) -> f64 {
        1.0 / (self.camera.field_of_view / 2.0).to_radians().tan()
    }

    /// Fixed forward offset of the player car ahead of the camera.
    pub fn player_z(&self) -> f64 {
        self.camera.height * self.camera_depth()
    }

    /// Lateral footprint of the player car in road-half-width units.
    pub fn player_width(&self) -> f64 {
        self.sprites.player_straight.w * self.sprites.scale
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoadConfig {
    /// Half-width of the paved road in world units.
    pub width: f64,
    pub segment_length: f64,
    /// Segments per light/dark color band.
    pub rumble_length: usize,
    pub lanes: usize,
    pub length: RoadLengths,
    pub curve: RoadCurves,
    pub hill: RoadHills,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            segment_length: SEGMENT_LENGTH,
            rumble_length: 3,
            lanes: 3,
            length: RoadLengths::default(),
            curve: RoadCurves::default(),
            hill: RoadHills::default(),
        }
    }
}

/// Segment counts used by the track shapes.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RoadLengths {
    pub none: usize,
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

impl Default for RoadLengths {
    fn default() -> Self {
        Self { none: 0, short: 25, medium: 50, long: 100 }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RoadCurves {
    pub none: f64,
    pub easy: f64,
    pub medium: f64,
    pub hard: f64,
}

impl Default for RoadCurves {
    fn default() -> Self {
        Self { none: 0.0, easy: 2.0, medium: 4.0, hard: 6.0 }
    }
}

/// Elevation deltas, in segment-length units.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RoadHills {
    pub none: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for RoadHills {
    fn default() -> Self {
        Self { none: 0.0, low: 20.0, medium: 40.0, high: 60.0 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub height: f64,
    /// Degrees.
    pub field_of_view: f64,
    /// Segments rendered ahead of the camera.
    pub draw_distance: usize,
    pub fog_density: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { height: 1000.0, field_of_view: 100.0, draw_distance: 300, fog_density: 5.0 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    pub max_speed: f64,
    pub acceleration: f64,
    pub braking: f64,
    pub deceleration: f64,
    pub centrifugal: f64,
    pub off_road_limit: f64,
    pub off_road_decel: f64,
    /// `player_x` is clamped to `[-lateral_limit, lateral_limit]`.
    pub lateral_limit: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            acceleration: MAX_SPEED / 5.0,
            braking: -MAX_SPEED,
            deceleration: -MAX_SPEED / 5.0,
            centrifugal: 0.3,
            off_road_limit: MAX_SPEED / 4.0,
            off_road_decel: -MAX_SPEED / 2.0,
            lateral_limit: 3.0,
        }
    }
}

/// Smoothing factors applied between target and actual kinematic values.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    pub friction: f64,
    pub position_smoothing: f64,
    pub lateral_smoothing: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { friction: 0.9, position_smoothing: 0.85, lateral_smoothing: 0.75 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrafficConfig {
    pub total_cars: usize,
    /// Segments a traffic car scans ahead when dodging.
    pub lookahead: usize,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Player speed multiplier on rear-ending a car.
    pub collision_speed_factor: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            total_cars: 200,
            lookahead: 20,
            min_speed: MAX_SPEED / 4.0,
            max_speed: MAX_SPEED * 3.0 / 4.0,
            collision_speed_factor: 0.5,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoadColors {
    pub road: String,
    pub grass: String,
    pub rumble: String,
    pub lane: Option<String>,
}

impl Default for RoadColors {
    fn default() -> Self {
        Self {
            road: "#6B6B6B".into(),
            grass: "#10AA10".into(),
            rumble: "#555555".into(),
            lane: Some("#CCCCCC".into()),
        }
    }
}

impl RoadColors {
    fn solid(color: &str) -> Self {
        Self { road: color.into(), grass: color.into(), rumble: color.into(), lane: None }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub sky: String,
    pub tree: String,
    pub fog: String,
    pub light: RoadColors,
    pub dark: RoadColors,
    pub start: RoadColors,
    pub finish: RoadColors,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            sky: "#72D7EE".into(),
            tree: "#005108".into(),
            fog: "#005108".into(),
            light: RoadColors::default(),
            dark: RoadColors {
                road: "#696969".into(),
                grass: "#009A00".into(),
                rumble: "#BBBBBB".into(),
                lane: None,
            },
            start: RoadColors::solid("white"),
            finish: RoadColors::solid("black"),
        }
    }
}

impl ColorConfig {
    pub fn band(&self, band: Band) -> &RoadColors {
        match band {
            Band::Light => &self.light,
            Band::Dark => &self.dark,
            Band::Start => &self.start,
            Band::Finish => &self.finish,
        }
    }
}

/// Source rectangle on a sprite sheet, in sheet pixels.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct SpriteRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SpriteRect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Sprite and background sheet coordinates plus the world scale of sprites.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpriteCatalog {
    /// Sheet pixels to road-half-width units.
    pub scale: f64,
    pub player_straight: SpriteRect,
    pub player_left: SpriteRect,
    pub player_right: SpriteRect,
    pub player_uphill_straight: SpriteRect,
    pub player_uphill_left: SpriteRect,
    pub player_uphill_right: SpriteRect,
    pub palm_tree: SpriteRect,
    pub billboards: Vec<SpriteRect>,
    pub plants: Vec<SpriteRect>,
    pub cars: Vec<SpriteRect>,
    pub sky: SpriteRect,
    pub hills: SpriteRect,
    pub trees: SpriteRect,
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        let player_straight = SpriteRect::new(1085.0, 480.0, 80.0, 41.0);
        let palm_tree = SpriteRect::new(5.0, 5.0, 215.0, 540.0);
        Self {
            scale: 0.3 * (1.0 / player_straight.w),
            player_straight,
            player_left: SpriteRect::new(995.0, 480.0, 80.0, 41.0),
            player_right: SpriteRect::new(995.0, 531.0, 80.0, 41.0),
            player_uphill_straight: SpriteRect::new(1295.0, 1018.0, 80.0, 45.0),
            player_uphill_left: SpriteRect::new(1383.0, 961.0, 80.0, 45.0),
            player_uphill_right: SpriteRect::new(1385.0, 1018.0, 80.0, 45.0),
            palm_tree,
            billboards: vec![
                SpriteRect::new(313.0, 897.0, 298.0, 190.0),
                SpriteRect::new(488.0, 555.0, 298.0, 190.0),
                SpriteRect::new(230.0, 5.0, 385.0, 265.0),
                SpriteRect::new(150.0, 555.0, 328.0, 282.0),
                SpriteRect::new(625.0, 375.0, 300.0, 170.0),
                SpriteRect::new(245.0, 1262.0, 215.0, 220.0),
                SpriteRect::new(5.0, 1262.0, 230.0, 220.0),
                SpriteRect::new(1205.0, 310.0, 268.0, 170.0),
                SpriteRect::new(5.0, 897.0, 298.0, 190.0),
            ],
            plants: vec![
                SpriteRect::new(625.0, 5.0, 360.0, 360.0),
                SpriteRect::new(1205.0, 5.0, 282.0, 295.0),
                SpriteRect::new(5.0, 1097.0, 240.0, 155.0),
                SpriteRect::new(255.0, 1097.0, 232.0, 152.0),
                SpriteRect::new(929.0, 897.0, 235.0, 118.0),
                palm_tree,
            ],
            cars: vec![
                SpriteRect::new(1205.0, 1018.0, 80.0, 56.0),
                SpriteRect::new(1383.0, 825.0, 80.0, 59.0),
                SpriteRect::new(1383.0, 760.0, 88.0, 55.0),
                SpriteRect::new(1383.0, 894.0, 80.0, 57.0),
                SpriteRect::new(1365.0, 490.0, 122.0, 144.0),
                SpriteRect::new(1365.0, 644.0, 100.0, 78.0),
            ],
            sky: SpriteRect::new(5.0, 495.0, 1280.0, 480.0),
            hills: SpriteRect::new(5.0, 5.0, 1280.0, 480.0),
            trees: SpriteRect::new(5.0, 985.0, 1280.0, 480.0),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallaxConfig {
    pub sky_speed: f64,
    pub hill_speed: f64,
    pub tree_speed: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self { sky_speed: 0.001, hill_speed: 0.002, tree_speed: 0.003 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HudConfig {
    pub speed_selector: String,
    pub speed_label: String,
    pub lap_time_selector: String,
    pub lap_time_label: String,
    /// Milliseconds between DOM refreshes.
    pub update_frequency: f64,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            speed_selector: "#speed".into(),
            speed_label: "Speed".into(),
            lap_time_selector: "#lap-time".into(),
            lap_time_label: "Time".into(),
            update_frequency: 100.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetConfig {
    pub base_path: String,
    pub sprites: String,
    pub background: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_path: "assets/".into(),
            sprites: "sprites.png".into(),
            background: "background.png".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub element_id: String,
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { element_id: "rr-canvas".into(), width: 320, height: 480 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_depth_from_fov() {
        let cfg = GameConfig::default();
        // 100° FOV -> 1 / tan(50°)
        assert!((cfg.camera_depth() - 0.83909963).abs() < 1e-6);
        assert!((cfg.player_z() - 839.09963).abs() < 1e-3);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{"road": {"lanes": 4}, "camera": {"drawDistance": 120}}"#)
            .unwrap();
        assert_eq!(cfg.road.lanes, 4);
        assert_eq!(cfg.road.segment_length, 200.0);
        assert_eq!(cfg.camera.draw_distance, 120);
        assert_eq!(cfg.camera.field_of_view, 100.0);
        assert_eq!(cfg.traffic.lookahead, 20);
    }

    #[test]
    fn band_colors_resolve() {
        let cfg = GameConfig::default();
        assert!(cfg.colors.band(Band::Light).lane.is_some());
        assert!(cfg.colors.band(Band::Dark).lane.is_none());
        assert_eq!(cfg.colors.band(Band::Finish).road, "black");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(GameConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }
}
