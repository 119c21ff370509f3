//! World-to-screen perspective projection.

/// Viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub const fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub const fn half_height(&self) -> f64 {
        self.height / 2.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Projected position of an edge: screen `x`/`y` of the road centre, half
/// road width `w` in pixels, and the perspective `scale`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub scale: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projection {
    /// Point relative to the camera.
    pub camera: Vec3,
    pub screen: ScreenPoint,
}

/// Projects `world` as seen from `camera`. Screen coordinates snap to whole
/// pixels. Meaningless when the point is at or behind the camera
/// (`camera.z <= 0`); the renderer culls those segments before using them.
pub fn project(
    world: Vec3,
    camera: Vec3,
    camera_depth: f64,
    viewport: Viewport,
    road_width: f64,
) -> Projection {
    let rel = Vec3::new(world.x - camera.x, world.y - camera.y, world.z - camera.z);
    let scale = camera_depth / rel.z;
    let (hw, hh) = (viewport.half_width(), viewport.half_height());
    Projection {
        camera: rel,
        screen: ScreenPoint {
            x: (hw + scale * rel.x * hw).round(),
            y: (hh - scale * rel.y * hh).round(),
            w: (scale * road_width * hw).round(),
            scale,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(320.0, 480.0);

    #[test]
    fn centred_point_projects_to_centre_column() {
        let p = project(Vec3::new(0.0, 0.0, 1000.0), Vec3::new(0.0, 1000.0, 0.0), 1.0, VIEW, 2000.0);
        assert_eq!(p.camera, Vec3::new(0.0, -1000.0, 1000.0));
        assert_eq!(p.screen.scale, 0.001);
        assert_eq!(p.screen.x, 160.0);
        // one camera height below at depth 1000 with depth 1 -> bottom of screen
        assert_eq!(p.screen.y, 480.0);
        assert_eq!(p.screen.w, 320.0);
    }

    #[test]
    fn farther_points_shrink_toward_horizon() {
        let cam = Vec3::new(0.0, 1000.0, 0.0);
        let near = project(Vec3::new(0.0, 0.0, 1000.0), cam, 0.84, VIEW, 2000.0);
        let far = project(Vec3::new(0.0, 0.0, 5000.0), cam, 0.84, VIEW, 2000.0);
        assert!(far.screen.y < near.screen.y);
        assert!(far.screen.w < near.screen.w);
        assert!(far.screen.y > VIEW.half_height());
    }

    #[test]
    fn projection_is_pure() {
        let world = Vec3::new(-500.0, 120.0, 7300.0);
        let cam = Vec3::new(40.0, 1100.0, 200.0);
        let a = project(world, cam, 0.839, VIEW, 2000.0);
        let b = project(world, cam, 0.839, VIEW, 2000.0);
        assert_eq!(a, b);
    }
}
