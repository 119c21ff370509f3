//! Segment store for the closed-loop road.
//!
//! The track is a flat, index-addressed ring of equal-length segments; every
//! lookup wraps modulo the segment count. Traffic cars live in an arena on the
//! track and each segment lists the ids of the cars currently inside its z-range.

use crate::config::SpriteRect;
use crate::math;

mod builder;
mod layout;

pub use builder::TrackBuilder;
pub use layout::{build_track, place_decorations, seed_traffic};

/// Color banding of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Light,
    Dark,
    Start,
    Finish,
}

impl Band {
    /// Alternating light/dark bands of `rumble_length` segments.
    pub fn for_index(index: usize, rumble_length: usize) -> Self {
        if (index / rumble_length.max(1)) % 2 == 1 { Band::Dark } else { Band::Light }
    }
}

/// Elevation (`y`) and longitudinal distance (`z`) of a segment edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint {
    pub y: f64,
    pub z: f64,
}

/// Near (`p1`) or far (`p2`) edge of a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgePoint {
    pub world: WorldPoint,
}

/// Roadside decoration placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    pub source: SpriteRect,
    /// Lateral offset in road-half-widths; negative is left of the road.
    pub offset: f64,
}

pub type CarId = usize;

/// Traffic entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    pub offset: f64,
    pub z: f64,
    pub speed: f64,
    pub sprite: SpriteRect,
    /// Progress through the current segment, `[0, 1)`.
    pub percent: f64,
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub index: usize,
    pub p1: EdgePoint,
    pub p2: EdgePoint,
    pub curve: f64,
    pub band: Band,
    pub sprites: Vec<Decoration>,
    pub cars: Vec<CarId>,
}

#[derive(Clone, Debug)]
pub struct Track {
    pub(crate) segments: Vec<Segment>,
    pub(crate) cars: Vec<Car>,
    segment_length: f64,
    rumble_length: usize,
}

impl Track {
    pub(crate) fn new(segment_length: f64, rumble_length: usize) -> Self {
        Self { segments: Vec::new(), cars: Vec::new(), segment_length, rumble_length }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    pub fn rumble_length(&self) -> usize {
        self.rumble_length
    }

    pub fn track_length(&self) -> f64 {
        self.segments.len() as f64 * self.segment_length
    }

    /// Index of the segment containing `z`, wrapping negative and past-the-end
    /// distances around the loop. Returns 0 on an empty track.
    pub fn segment_index(&self, z: f64) -> usize {
        let n = self.segments.len();
        if n == 0 || self.segment_length <= 0.0 {
            return 0;
        }
        ((z / self.segment_length).floor() as i64).rem_euclid(n as i64) as usize
    }

    /// Segment containing `z`.
    ///
    /// # Panics
    /// On an empty track; built tracks always hold segments.
    pub fn find_segment(&self, z: f64) -> &Segment {
        &self.segments[self.segment_index(z)]
    }

    /// Segment `offset` places after `index`, wrapping.
    ///
    /// # Panics
    /// On an empty track, like [`Track::find_segment`].
    pub fn segment_after(&self, index: usize, offset: usize) -> &Segment {
        &self.segments[(index + offset) % self.segments.len()]
    }

    /// Elevation of the far edge of the last segment, 0 for an empty track.
    pub fn last_y(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.p2.world.y)
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> &Car {
        &self.cars[id]
    }

    /// Adds a car to the arena and to the segment containing its `z`.
    pub fn add_car(&mut self, mut car: Car) -> CarId {
        let id = self.cars.len();
        car.z = math::increase(car.z, 0.0, self.track_length());
        let seg = self.segment_index(car.z);
        self.cars.push(car);
        if let Some(segment) = self.segments.get_mut(seg) {
            segment.cars.push(id);
        }
        id
    }

    /// Moves a car to `z` (wrapped) and re-files it if it crossed a segment boundary.
    pub fn relocate_car(&mut self, id: CarId, z: f64) {
        let track_length = self.track_length();
        let old_seg = self.segment_index(self.cars[id].z);
        let car = &mut self.cars[id];
        car.z = math::increase(z, 0.0, track_length);
        car.percent = math::percent_remaining(car.z, self.segment_length);
        let new_z = car.z;
        let new_seg = self.segment_index(new_z);
        if old_seg != new_seg {
            self.segments[old_seg].cars.retain(|&c| c != id);
            self.segments[new_seg].cars.push(id);
        }
    }

    pub(crate) fn set_car_offset(&mut self, id: CarId, offset: f64) {
        self.cars[id].offset = offset;
    }

    pub fn add_decoration(&mut self, index: usize, source: SpriteRect, offset: f64) {
        if let Some(segment) = self.segments.get_mut(index) {
            segment.sprites.push(Decoration { source, offset });
        }
    }

    /// Drops all traffic, leaving the road geometry intact.
    pub fn clear_cars(&mut self) {
        self.cars.clear();
        for segment in &mut self.segments {
            segment.cars.clear();
        }
    }
}
