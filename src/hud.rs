//! Read-only HUD values derived from race state once per frame.

/// Scale of the speedometer at full speed.
const SPEEDO_TOP: f64 = 200.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HudSnapshot {
    pub speed: f64,
    pub speed_mph: u32,
    pub current_lap_time: f64,
    pub last_lap_time: Option<f64>,
}

impl HudSnapshot {
    pub fn new(speed: f64, max_speed: f64, current_lap_time: f64, last_lap_time: Option<f64>) -> Self {
        let speed_mph = if max_speed > 0.0 {
            (speed / max_speed * SPEEDO_TOP).round().max(0.0) as u32
        } else {
            0
        };
        Self { speed, speed_mph, current_lap_time, last_lap_time }
    }

    pub fn current_lap_text(&self) -> String {
        format_lap_time(self.current_lap_time)
    }

    pub fn last_lap_text(&self) -> Option<String> {
        self.last_lap_time.map(format_lap_time)
    }
}

/// `m.ss.t` once past a minute, `s.t` before that. Components are truncated.
pub fn format_lap_time(t: f64) -> String {
    let t = t.max(0.0);
    let minutes = (t / 60.0).floor();
    let seconds = (t - minutes * 60.0).floor();
    let tenths = (10.0 * (t - t.floor())).floor();
    if minutes > 0.0 {
        format!("{}.{:02}.{}", minutes as u64, seconds as u64, tenths as u64)
    } else {
        format!("{}.{}", seconds as u64, tenths as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_time_formats() {
        assert_eq!(format_lap_time(0.0), "0.0");
        assert_eq!(format_lap_time(9.25), "9.2");
        assert_eq!(format_lap_time(65.5), "1.05.5");
        assert_eq!(format_lap_time(130.0), "2.10.0");
    }

    #[test]
    fn speedometer_scales_to_two_hundred() {
        assert_eq!(HudSnapshot::new(6000.0, 12000.0, 0.0, None).speed_mph, 100);
        assert_eq!(HudSnapshot::new(12000.0, 12000.0, 0.0, None).speed_mph, 200);
        assert_eq!(HudSnapshot::new(50.0, 0.0, 0.0, None).speed_mph, 0);
    }

    #[test]
    fn last_lap_only_after_a_lap() {
        let hud = HudSnapshot::new(0.0, 1.0, 3.0, None);
        assert_eq!(hud.last_lap_text(), None);
        let hud = HudSnapshot::new(0.0, 1.0, 3.0, Some(61.2));
        assert_eq!(hud.last_lap_text().as_deref(), Some("1.01.2"));
        assert_eq!(hud.current_lap_text(), "3.0");
    }
}
