use crate::vector::{clamp_distance, distance};
use legion::Entity;
use nalgebra::Vector2;

pub const DEFAULT_ELASTICITY: f64 = 0.8;
pub const DEFAULT_FRICTION: f64 = 0.001;

/// Normalized segment geometry.
///
/// Vertical segments have no finite slope, so they keep their x and the y
/// extent instead. Sloped segments are stored with `start.x < end.x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Vertical {
        x: f64,
        min: f64,
        max: f64,
    },
    Sloped {
        start: Vector2<f64>,
        end: Vector2<f64>,
        slope: f64,
        y_intercept: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bound {
    geometry: Geometry,
    angle: f64,
    length: f64,
    pub elasticity: f64,
    // Not used by collision response yet.
    pub friction: f64,
}

/// Present on a bound that acts as a rod between two marbles. The bound's
/// geometry is rebuilt from the two marbles every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub ends: [Entity; 2],
}

impl Link {
    pub fn contains(&self, entity: Entity) -> bool {
        self.ends[0] == entity || self.ends[1] == entity
    }

    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.ends[0] == entity {
            Some(self.ends[1])
        } else if self.ends[1] == entity {
            Some(self.ends[0])
        } else {
            None
        }
    }
}

impl Bound {
    pub fn new(p0: Vector2<f64>, p1: Vector2<f64>) -> Bound {
        let mut bound = Bound {
            geometry: Geometry::Vertical {
                x: 0.,
                min: 0.,
                max: 0.,
            },
            angle: 0.,
            length: 0.,
            elasticity: DEFAULT_ELASTICITY,
            friction: DEFAULT_FRICTION,
        };
        bound.set_geometry(p0, p1);
        bound
    }

    pub fn with_elasticity(mut self, elasticity: f64) -> Bound {
        self.elasticity = elasticity;
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Bound {
        self.friction = friction;
        self
    }

    /// Recomputes the derived geometry from two endpoints, in any order.
    pub fn set_geometry(&mut self, p0: Vector2<f64>, p1: Vector2<f64>) {
        if p0.x == p1.x {
            let (min, max) = if p1.y > p0.y { (p0.y, p1.y) } else { (p1.y, p0.y) };
            self.geometry = Geometry::Vertical { x: p0.x, min, max };
            self.angle = std::f64::consts::FRAC_PI_2;
            self.length = max - min;
        } else {
            let (start, end) = if p0.x > p1.x { (p1, p0) } else { (p0, p1) };
            let slope = (end.y - start.y) / (end.x - start.x);
            self.geometry = Geometry::Sloped {
                start,
                end,
                slope,
                y_intercept: start.y - slope * start.x,
            };
            self.angle = slope.atan();
            self.length = distance(&start, &end);
        }
    }

    /// Moves a rod so it spans the two given marble centers.
    pub fn follow(&mut self, p0: &Vector2<f64>, p1: &Vector2<f64>) {
        self.set_geometry(*p0, *p1);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self.geometry, Geometry::Vertical { .. })
    }

    pub fn slope(&self) -> Option<f64> {
        match self.geometry {
            Geometry::Vertical { .. } => None,
            Geometry::Sloped { slope, .. } => Some(slope),
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Start and end of the segment. Vertical segments go from min to max y.
    pub fn endpoints(&self) -> (Vector2<f64>, Vector2<f64>) {
        match self.geometry {
            Geometry::Vertical { x, min, max } => (Vector2::new(x, min), Vector2::new(x, max)),
            Geometry::Sloped { start, end, .. } => (start, end),
        }
    }

    /// Point of the finite segment nearest to `point`.
    pub fn closest_point(&self, point: &Vector2<f64>) -> Vector2<f64> {
        match self.geometry {
            Geometry::Vertical { x, min, max } => Vector2::new(x, point.y.max(min).min(max)),
            Geometry::Sloped {
                start,
                end,
                slope,
                y_intercept,
            } => {
                if slope == 0. {
                    // The perpendicular would be vertical.
                    return Vector2::new(point.x.max(start.x).min(end.x), y_intercept);
                }
                let perpendicular_slope = -1. / slope;
                let perpendicular_intercept = point.y - point.x * perpendicular_slope;
                let x = ((perpendicular_intercept - y_intercept) / (slope - perpendicular_slope))
                    .max(start.x)
                    .min(end.x);
                Vector2::new(x, slope * x + y_intercept)
            }
        }
    }

    /// Fraction along the segment, from its start (or min y) to its end
    /// (or max y), of the point closest to `point`.
    pub fn relative_position(&self, point: &Vector2<f64>) -> f64 {
        let closest = self.closest_point(point);
        match self.geometry {
            Geometry::Vertical { min, max, .. } => (closest.y - min) / clamp_distance(max - min),
            Geometry::Sloped { start, end, .. } => {
                (closest.x - start.x) / clamp_distance(end.x - start.x)
            }
        }
    }
}
