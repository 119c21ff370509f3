//! Composable road primitives. Everything funnels through [`TrackBuilder::add_road`];
//! the named shapes are fixed parameter tables on top of it.

use super::{Band, EdgePoint, Segment, Track, WorldPoint};
use crate::config::RoadConfig;
use crate::math;

pub struct TrackBuilder {
    track: Track,
}

impl TrackBuilder {
    pub fn new(segment_length: f64, rumble_length: usize) -> Self {
        Self { track: Track::new(segment_length, rumble_length) }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn finish(self) -> Track {
        self.track
    }

    /// Appends one segment. Its near edge continues from the previous far edge.
    pub fn add_segment(&mut self, curve: f64, y: f64) {
        let n = self.track.segments.len();
        let length = self.track.segment_length();
        let start_y = self.track.last_y();
        self.track.segments.push(Segment {
            index: n,
            p1: EdgePoint { world: WorldPoint { y: start_y, z: n as f64 * length } },
            p2: EdgePoint { world: WorldPoint { y, z: (n + 1) as f64 * length } },
            curve,
            band: Band::for_index(n, self.track.rumble_length()),
            sprites: Vec::new(),
            cars: Vec::new(),
        });
    }

    /// Appends `enter + hold + leave` segments: curvature eases in, holds, then
    /// eases back toward zero while elevation eases in-out by `elevation`
    /// segment lengths. All-zero counts add nothing.
    pub fn add_road(&mut self, enter: usize, hold: usize, leave: usize, curve: f64, elevation: f64) {
        let start_y = self.track.last_y();
        let end_y = start_y + elevation * self.track.segment_length();
        self.add_road_to(enter, hold, leave, curve, end_y);
    }

    fn add_road_to(&mut self, enter: usize, hold: usize, leave: usize, curve: f64, end_y: f64) {
        let start_y = self.track.last_y();
        let total = (enter + hold + leave) as f64;
        let y_at = |k: usize| math::ease_in_out(start_y, end_y, (k + 1) as f64 / total);

        for n in 0..enter {
            self.add_segment(math::ease_in(0.0, curve, n as f64 / enter as f64), y_at(n));
        }
        for n in 0..hold {
            self.add_segment(curve, y_at(enter + n));
        }
        for n in 0..leave {
            self.add_segment(
                math::ease_in_out(curve, 0.0, n as f64 / leave as f64),
                y_at(enter + hold + n),
            );
        }
    }

    pub fn add_straight(&mut self, num: usize) {
        self.add_road(num, num, num, 0.0, 0.0);
    }

    pub fn add_hill(&mut self, num: usize, height: f64) {
        self.add_road(num, num, num, 0.0, height);
    }

    pub fn add_curve(&mut self, num: usize, curve: f64, height: f64) {
        self.add_road(num, num, num, curve, height);
    }

    pub fn add_low_rolling_hills(&mut self, road: &RoadConfig, num: usize, height: f64) {
        let easy = road.curve.easy;
        self.add_road(num, num, num, 0.0, height / 2.0);
        self.add_road(num, num, num, 0.0, -height);
        self.add_road(num, num, num, easy, height);
        self.add_road(num, num, num, 0.0, 0.0);
        self.add_road(num, num, num, -easy, height / 2.0);
        self.add_road(num, num, num, 0.0, 0.0);
    }

    pub fn add_s_curves(&mut self, road: &RoadConfig) {
        let m = road.length.medium;
        let (easy, medium) = (road.curve.easy, road.curve.medium);
        self.add_road(m, m, m, -easy, road.hill.none);
        self.add_road(m, m, m, medium, road.hill.medium);
        self.add_road(m, m, m, easy, -road.hill.low);
        self.add_road(m, m, m, -easy, road.hill.medium);
        self.add_road(m, m, m, -medium, -road.hill.medium);
    }

    pub fn add_bumps(&mut self) {
        for height in [5.0, -2.0, -5.0, 8.0, 5.0, -7.0, 5.0, -2.0] {
            self.add_road(10, 10, 10, 0.0, height);
        }
    }

    /// Closes the loop: eases the curve out and brings elevation back to exactly 0.
    pub fn add_downhill_to_end(&mut self, road: &RoadConfig, num: usize) {
        self.add_road_to(num, num, num, -road.curve.easy, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_road_is_a_noop() {
        let mut b = TrackBuilder::new(200.0, 3);
        b.add_road(0, 0, 0, 4.0, 20.0);
        assert!(b.track().is_empty());
    }

    #[test]
    fn add_road_reaches_target_elevation() {
        let mut b = TrackBuilder::new(200.0, 3);
        b.add_road(5, 5, 5, 0.0, 10.0);
        let track = b.finish();
        assert_eq!(track.len(), 15);
        assert!((track.last_y() - 2000.0).abs() < 1e-9);
        assert_eq!(track.segments()[0].p1.world.y, 0.0);
    }

    #[test]
    fn curvature_eases_in_holds_and_leaves() {
        let mut b = TrackBuilder::new(200.0, 3);
        b.add_road(4, 2, 4, 4.0, 0.0);
        let curves: Vec<f64> = b.track().segments().iter().map(|s| s.curve).collect();
        assert_eq!(curves[0], 0.0);
        assert!(curves[1] > 0.0 && curves[1] < curves[3]);
        assert_eq!(curves[4], 4.0);
        assert_eq!(curves[5], 4.0);
        assert_eq!(curves[6], 4.0);
        assert!(curves[9] < curves[7]);
    }

    #[test]
    fn downhill_closes_loop_exactly() {
        let road = RoadConfig::default();
        let mut b = TrackBuilder::new(200.0, 3);
        b.add_hill(7, 13.3);
        b.add_bumps();
        b.add_downhill_to_end(&road, 20);
        assert_eq!(b.track().last_y(), 0.0);
    }
}
