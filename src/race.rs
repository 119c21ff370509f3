//! Race state and per-frame kinematics: player integration, off-road and
//! traffic penalties, traffic avoidance AI and lap timing.
//!
//! `Race` is the whole simulation: the host calls [`Race::update`] with the
//! elapsed time and input state, then [`Race::render`] for the draw commands.

use log::{debug, info};
use rand::Rng;

use crate::config::GameConfig;
use crate::hud::HudSnapshot;
use crate::math;
use crate::projection::Viewport;
use crate::render::{Frame, RaceView, render_frame};
use crate::rng::{GameRng, random_sign};
use crate::track::{CarId, Track, build_track};

/// Footprint tightness when the player clips a roadside decoration.
const DECORATION_OVERLAP: f64 = 1.0;
/// Looser tolerance traffic uses when deciding to dodge.
const DODGE_OVERLAP: f64 = 1.2;
/// Tighter tolerance for the player actually rear-ending a car.
const REAR_END_OVERLAP: f64 = 0.8;
/// Traffic drifts back toward the road once past this offset.
const TRAFFIC_EDGE: f64 = 0.9;
const TRAFFIC_RETURN_STEP: f64 = 0.1;
/// Player offset beyond which dodging traffic commits to the far side.
const DODGE_COMMIT: f64 = 0.5;

/// Raw keyboard state for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub faster: bool,
    pub slower: bool,
}

pub struct Race {
    config: GameConfig,
    track: Track,
    rng: GameRng,
    position: f64,
    player_x: f64,
    speed: f64,
    current_lap_time: f64,
    last_lap_time: Option<f64>,
    sky_offset: f64,
    hill_offset: f64,
    tree_offset: f64,
    steer: f64,
    bounce: f64,
}

impl Race {
    pub fn new(config: GameConfig, mut rng: GameRng) -> Self {
        let track = build_track(&config, &mut rng);
        Self::with_track(config, track, rng)
    }

    /// Starts a race on a prebuilt track.
    pub fn with_track(config: GameConfig, track: Track, rng: GameRng) -> Self {
        Self {
            config,
            track,
            rng,
            position: 0.0,
            player_x: 0.0,
            speed: 0.0,
            current_lap_time: 0.0,
            last_lap_time: None,
            sky_offset: 0.0,
            hill_offset: 0.0,
            tree_offset: 0.0,
            steer: 0.0,
            bounce: 0.0,
        }
    }

    /// Rebuilds the circuit and traffic and puts the player back on the grid.
    pub fn reset(&mut self) {
        self.track = build_track(&self.config, &mut self.rng);
        self.position = 0.0;
        self.player_x = 0.0;
        self.speed = 0.0;
        self.current_lap_time = 0.0;
        self.last_lap_time = None;
        self.sky_offset = 0.0;
        self.hill_offset = 0.0;
        self.tree_offset = 0.0;
        self.steer = 0.0;
        self.bounce = 0.0;
        info!("race reset");
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, position: f64) {
        self.position = math::increase(position, 0.0, self.track.track_length());
    }

    pub fn player_x(&self) -> f64 {
        self.player_x
    }

    pub fn set_player_x(&mut self, player_x: f64) {
        self.player_x = player_x;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn current_lap_time(&self) -> f64 {
        self.current_lap_time
    }

    pub fn set_current_lap_time(&mut self, t: f64) {
        self.current_lap_time = t;
    }

    pub fn last_lap_time(&self) -> Option<f64> {
        self.last_lap_time
    }

    /// One simulation step: player first, then traffic.
    pub fn update(&mut self, dt: f64, input: Input) {
        if self.track.is_empty() {
            return;
        }
        self.update_player(dt, input);
        self.update_cars(dt);
    }

    fn speed_percent(&self, speed: f64) -> f64 {
        let max = self.config.player.max_speed;
        if max > 0.0 { speed / max } else { 0.0 }
    }

    fn update_player(&mut self, dt: f64, input: Input) {
        let cfg = &self.config;
        let player = &cfg.player;
        let physics = &cfg.physics;
        let track_length = self.track.track_length();
        let player_z = cfg.player_z();
        let player_seg = self.track.segment_index(self.position + player_z);
        let curve = self.track.segments()[player_seg].curve;
        let speed_percent = self.speed_percent(self.speed);
        let dx = dt * 2.0 * speed_percent;
        let start_position = self.position;

        // smooth the advance itself so the lap seam never pulls us backwards
        self.position = math::increase(
            self.position,
            dt * self.speed * physics.position_smoothing,
            track_length,
        );

        let mut target_x = self.player_x;
        if input.left {
            target_x -= dx;
        } else if input.right {
            target_x += dx;
        }
        target_x -= dx * speed_percent * curve * player.centrifugal;
        self.player_x += (target_x - self.player_x) * physics.lateral_smoothing;

        let accel = if input.faster {
            player.acceleration
        } else if input.slower {
            player.braking
        } else {
            player.deceleration
        };
        let target_speed = math::accelerate(self.speed, accel, dt);
        self.speed += (target_speed - self.speed) * physics.friction;

        // set when a crash throws the car back; such a step never counts toward a lap
        let mut knocked_back = false;
        let player_w = cfg.player_width();
        if self.player_x < -1.0 || self.player_x > 1.0 {
            if self.speed > player.off_road_limit {
                self.speed = math::accelerate(self.speed, player.off_road_decel, dt);
            }

            let segment = &self.track.segments()[player_seg];
            for decoration in &segment.sprites {
                let sprite_w = decoration.source.w * cfg.sprites.scale;
                let side = if decoration.offset > 0.0 { 1.0 } else { -1.0 };
                let centre = decoration.offset + sprite_w / 2.0 * side;
                if math::overlap(self.player_x, player_w, centre, sprite_w, DECORATION_OVERLAP) {
                    debug!("hit roadside sprite in segment {}", segment.index);
                    self.speed = player.max_speed / 5.0;
                    self.position = math::increase(segment.p1.world.z, -player_z, track_length);
                    knocked_back = true;
                    break;
                }
            }
        }

        let segment = &self.track.segments()[player_seg];
        for &id in &segment.cars {
            let car = self.track.car(id);
            let car_w = car.sprite.w * cfg.sprites.scale;
            if self.speed > car.speed
                && math::overlap(self.player_x, player_w, car.offset, car_w, REAR_END_OVERLAP)
            {
                debug!("rear-ended car {id}");
                self.speed *= cfg.traffic.collision_speed_factor;
                self.position = math::increase(car.z, -player_z, track_length);
                knocked_back = true;
                break;
            }
        }

        self.player_x = math::limit(self.player_x, -player.lateral_limit, player.lateral_limit);
        self.speed = math::limit(self.speed, 0.0, player.max_speed);

        let travelled = math::wrapped_delta(start_position, self.position, track_length);
        let segment_length = self.track.segment_length();
        let parallax = &cfg.parallax;
        let drift = |speed: f64| speed * curve * travelled / segment_length;
        self.sky_offset = math::increase(self.sky_offset, drift(parallax.sky_speed), 1.0);
        self.hill_offset = math::increase(self.hill_offset, drift(parallax.hill_speed), 1.0);
        self.tree_offset = math::increase(self.tree_offset, drift(parallax.tree_speed), 1.0);

        if self.position > player_z && !knocked_back {
            if self.current_lap_time > 0.0 && start_position < player_z {
                self.last_lap_time = Some(self.current_lap_time);
                self.current_lap_time = 0.0;
                info!("lap complete: {:.1}s", self.last_lap_time.unwrap_or_default());
            } else {
                self.current_lap_time += dt;
            }
        }

        self.steer = match (input.left, input.right) {
            (true, _) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let speed_percent = self.speed_percent(self.speed);
        self.bounce = 1.5 * self.rng.random::<f64>() * speed_percent * random_sign(&mut self.rng);
    }

    /// Steers, advances and re-files every traffic car.
    pub fn update_cars(&mut self, dt: f64) {
        for id in 0..self.track.cars().len() {
            let car = self.track.car(id);
            let car_seg = self.track.segment_index(car.z);
            let offset = car.offset + self.car_offset_adjustment(id, car_seg);
            let z = car.z + dt * car.speed;
            self.track.set_car_offset(id, offset);
            self.track.relocate_car(id, z);
        }
    }

    /// Lateral nudge for one car: dodge the player or slower traffic ahead,
    /// otherwise drift back onto the road.
    fn car_offset_adjustment(&self, id: CarId, car_seg: usize) -> f64 {
        let cfg = &self.config;
        let track = &self.track;
        let player_seg = track.segment_index(self.position + cfg.player_z());
        let car = track.car(id);
        let car_w = car.sprite.w * cfg.sprites.scale;
        let player_w = cfg.player_width();

        // traffic beyond render range does not dodge
        if car_seg as i64 - player_seg as i64 > cfg.camera.draw_distance as i64 {
            return 0.0;
        }

        for i in 1..cfg.traffic.lookahead {
            let segment = track.segment_after(car_seg, i);
            let falloff = 1.0 / i as f64;

            if segment.index == player_seg
                && car.speed > self.speed
                && math::overlap(self.player_x, player_w, car.offset, car_w, DODGE_OVERLAP)
            {
                let dir = dodge_direction(car.offset, self.player_x);
                return dir * falloff * self.speed_percent(car.speed - self.speed);
            }

            for &other_id in &segment.cars {
                if other_id == id {
                    continue;
                }
                let other = track.car(other_id);
                let other_w = other.sprite.w * cfg.sprites.scale;
                if car.speed > other.speed
                    && math::overlap(car.offset, car_w, other.offset, other_w, DODGE_OVERLAP)
                {
                    let dir = dodge_direction(car.offset, other.offset);
                    return dir * falloff * self.speed_percent(car.speed - other.speed);
                }
            }
        }

        if car.offset < -TRAFFIC_EDGE {
            TRAFFIC_RETURN_STEP
        } else if car.offset > TRAFFIC_EDGE {
            -TRAFFIC_RETURN_STEP
        } else {
            0.0
        }
    }

    pub fn view(&self) -> RaceView {
        RaceView {
            position: self.position,
            player_x: self.player_x,
            speed: self.speed,
            steer: self.steer,
            bounce: self.bounce,
            sky_offset: self.sky_offset,
            hill_offset: self.hill_offset,
            tree_offset: self.tree_offset,
        }
    }

    pub fn render(&self, viewport: Viewport) -> Frame<'_> {
        render_frame(&self.config, &self.track, &self.view(), viewport)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::new(
            self.speed,
            self.config.player.max_speed,
            self.current_lap_time,
            self.last_lap_time,
        )
    }
}

/// Hard dodge when the obstacle hugs one side, otherwise steer away from it.
fn dodge_direction(own_offset: f64, obstacle_offset: f64) -> f64 {
    if obstacle_offset > DODGE_COMMIT {
        -1.0
    } else if obstacle_offset < -DODGE_COMMIT {
        1.0
    } else if own_offset > obstacle_offset {
        1.0
    } else {
        -1.0
    }
}
