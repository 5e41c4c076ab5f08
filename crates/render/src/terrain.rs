use glam::Vec3;
use vantage_common::SimulatorConfig;

/// Clear color behind the terrain.
pub const SKY_COLOR: [f32; 3] = [0.5, 0.7, 1.0];
pub const GROUND_COLOR: [f32; 3] = [0.0, 0.25, 0.0];
const RED_WALL: [f32; 3] = [1.0, 0.2, 0.2];
const YELLOW_WALL: [f32; 3] = [1.0, 1.0, 0.2];

/// A position with a flat color, ready to be uploaded by a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredVertex {
    pub position: Vec3,
    pub color: [f32; 3],
}

/// One boundary wall: a vertical quad along an edge of the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub name: &'static str,
    pub corners: [Vec3; 4],
    pub color: [f32; 3],
}

/// Static scene: a flat ground quad centred on the origin, fenced by four
/// walls at its half-extents.
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    width: f32,
    depth: f32,
    ground: [Vec3; 4],
    walls: [Wall; 4],
}

impl Terrain {
    pub fn new(width: f32, depth: f32, wall_height: f32) -> Self {
        let left = -width / 2.0;
        let right = width / 2.0;
        let back = -depth / 2.0;
        let front = depth / 2.0;
        let h = wall_height;

        let ground = [
            Vec3::new(left, 0.0, front),
            Vec3::new(left, 0.0, back),
            Vec3::new(right, 0.0, back),
            Vec3::new(right, 0.0, front),
        ];

        let walls = [
            Wall {
                name: "left",
                corners: [
                    Vec3::new(left, 0.0, front),
                    Vec3::new(left, 0.0, back),
                    Vec3::new(left, h, back),
                    Vec3::new(left, h, front),
                ],
                color: RED_WALL,
            },
            Wall {
                name: "right",
                corners: [
                    Vec3::new(right, 0.0, front),
                    Vec3::new(right, 0.0, back),
                    Vec3::new(right, h, back),
                    Vec3::new(right, h, front),
                ],
                color: YELLOW_WALL,
            },
            Wall {
                name: "back",
                corners: [
                    Vec3::new(right, 0.0, back),
                    Vec3::new(left, 0.0, back),
                    Vec3::new(left, h, back),
                    Vec3::new(right, h, back),
                ],
                color: RED_WALL,
            },
            Wall {
                name: "front",
                corners: [
                    Vec3::new(right, 0.0, front),
                    Vec3::new(left, 0.0, front),
                    Vec3::new(left, h, front),
                    Vec3::new(right, h, front),
                ],
                color: YELLOW_WALL,
            },
        ];

        tracing::debug!(width, depth, wall_height, "terrain built");
        Self {
            width,
            depth,
            ground,
            walls,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(config.terrain_width, config.terrain_depth, config.wall_height)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn ground(&self) -> &[Vec3; 4] {
        &self.ground
    }

    pub fn walls(&self) -> &[Wall; 4] {
        &self.walls
    }

    /// Whether `p` lies over the ground, ignoring height.
    pub fn contains(&self, p: Vec3) -> bool {
        p.x.abs() <= self.width / 2.0 && p.z.abs() <= self.depth / 2.0
    }

    /// Triangle list for the whole scene: the ground first, then each wall.
    pub fn triangles(&self) -> Vec<ColoredVertex> {
        let mut out = Vec::with_capacity(6 * (1 + self.walls.len()));
        push_quad(&mut out, &self.ground, GROUND_COLOR);
        for wall in &self.walls {
            push_quad(&mut out, &wall.corners, wall.color);
        }
        out
    }
}

fn push_quad(out: &mut Vec<ColoredVertex>, corners: &[Vec3; 4], color: [f32; 3]) {
    for i in [0, 1, 2, 2, 3, 0] {
        out.push(ColoredVertex {
            position: corners[i],
            color,
        });
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::from_config(&SimulatorConfig::default())
    }
}
