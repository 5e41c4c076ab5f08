use crate::camera::Lens;
use crate::terrain::Terrain;
use vantage_common::Viewpoint;

/// Renderer-agnostic interface.
///
/// A renderer reads a viewpoint snapshot and the static terrain and produces
/// output. It never writes the viewpoint; the kernel owns it.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, viewpoint: &Viewpoint, terrain: &Terrain) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Produces a human-readable description of the frame: camera state and
/// which parts of the terrain fall inside the view.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    lens: Lens,
}

impl DebugTextRenderer {
    pub fn new(lens: Lens) -> Self {
        Self { lens }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, viewpoint: &Viewpoint, terrain: &Terrain) -> String {
        let p = viewpoint.position;
        let o = viewpoint.orientation;
        let mut out = format!(
            "=== Frame (terrain {}x{}) ===\n",
            terrain.width(),
            terrain.depth()
        );
        out.push_str(&format!(
            "Camera: pos=({:.2}, {:.2}, {:.2}) pitch={:.1} yaw={:.1} roll={:.1} fov={:.0}\n",
            p.x, p.y, p.z, o.pitch, o.yaw, o.roll, self.lens.fov_degrees
        ));
        if !terrain.contains(p) {
            out.push_str("  (outside terrain)\n");
        }

        let ground_visible = terrain
            .ground()
            .iter()
            .filter(|c| self.lens.is_visible(viewpoint, **c))
            .count();
        out.push_str(&format!("  ground: {ground_visible}/4 corners in view\n"));
        for wall in terrain.walls() {
            let visible = wall
                .corners
                .iter()
                .filter(|c| self.lens.is_visible(viewpoint, **c))
                .count();
            out.push_str(&format!("  {} wall: {visible}/4 corners in view\n", wall.name));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn describes_camera() {
        let r = DebugTextRenderer::default();
        let out = r.render(&Viewpoint::START, &Terrain::default());
        assert!(out.contains("terrain 10x10"));
        assert!(out.contains("pos=(0.00, 1.00, 0.00)"));
        assert!(out.contains("fov=65"));
        assert!(!out.contains("outside terrain"));
    }

    #[test]
    fn back_wall_is_ahead_at_start() {
        let r = DebugTextRenderer::default();
        let out = r.render(&Viewpoint::START, &Terrain::default());
        // Looking down -Z from the middle: the whole back wall is in view,
        // the front wall behind is not.
        assert!(out.contains("back wall: 4/4"));
        assert!(out.contains("front wall: 0/4"));
    }

    #[test]
    fn flags_viewpoint_outside_terrain() {
        let r = DebugTextRenderer::default();
        let v = Viewpoint {
            position: Vec3::new(20.0, 1.0, 0.0),
            ..Viewpoint::START
        };
        assert!(r.render(&v, &Terrain::default()).contains("outside terrain"));
    }
}
