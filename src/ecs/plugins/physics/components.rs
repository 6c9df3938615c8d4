use glam::Vec2;
use parry2d::bounding_volume::Aabb;
use parry2d::math::{Isometry, Point, Real, Vector};
use parry2d::query;
use parry2d::shape::{Ball, Capsule, Cuboid, Shape};

// ============================================================================
// HANDLES AND OWNERSHIP
// ============================================================================

/// Stable identifier for a body inside a spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u64);

/// What a body stands for in the world, so queries can tell characters from
/// map geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyOwner {
    Character(String),
    Terrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Integrated every step.
    Dynamic,
    /// Never moves; used for terrain and for dead characters.
    Static,
}

// ============================================================================
// SHAPES
// ============================================================================

/// Shape description in glam terms. Overlap tests go through parry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Circle { center: Vec2, radius: f32 },
    /// Segment swept by a radius.
    Capsule { a: Vec2, b: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
}

/// A parry shape plus its placement relative to whatever frame the
/// `Geometry` was given in.
pub(crate) enum Collider {
    Ball(Isometry<Real>, Ball),
    Capsule(Capsule),
    Cuboid(Isometry<Real>, Cuboid),
}

impl Collider {
    fn local_pose(&self) -> Isometry<Real> {
        match self {
            Collider::Ball(pose, _) | Collider::Cuboid(pose, _) => *pose,
            Collider::Capsule(_) => Isometry::identity(),
        }
    }

    fn shape(&self) -> &dyn Shape {
        match self {
            Collider::Ball(_, ball) => ball,
            Collider::Capsule(capsule) => capsule,
            Collider::Cuboid(_, cuboid) => cuboid,
        }
    }

    /// World-space bounds when the owning frame sits at `frame`.
    pub(crate) fn aabb(&self, frame: &Isometry<Real>) -> Aabb {
        self.shape().compute_aabb(&(frame * self.local_pose()))
    }

    pub(crate) fn intersects(
        &self,
        frame: &Isometry<Real>,
        other: &Collider,
        other_frame: &Isometry<Real>,
    ) -> bool {
        query::intersection_test(
            &(frame * self.local_pose()),
            self.shape(),
            &(other_frame * other.local_pose()),
            other.shape(),
        )
        .unwrap_or(false)
    }
}

fn point(v: Vec2) -> Point<Real> {
    Point::new(v.x, v.y)
}

impl Geometry {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Geometry::Circle { center, radius }
    }

    pub(crate) fn collider(&self) -> Collider {
        match *self {
            Geometry::Circle { center, radius } => {
                Collider::Ball(Isometry::translation(center.x, center.y), Ball::new(radius))
            }
            Geometry::Capsule { a, b, radius } => {
                Collider::Capsule(Capsule::new(point(a), point(b), radius))
            }
            Geometry::Rect { min, max } => {
                let center = (min + max) * 0.5;
                let half = (max - min) * 0.5;
                Collider::Cuboid(
                    Isometry::translation(center.x, center.y),
                    Cuboid::new(Vector::new(half.x, half.y)),
                )
            }
        }
    }

    /// Both shapes in the same frame.
    pub fn overlaps(&self, other: &Geometry) -> bool {
        let identity = Isometry::identity();
        self.collider().intersects(&identity, &other.collider(), &identity)
    }
}

/// A shape attached to a body, in body-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDef {
    pub geometry: Geometry,
    /// Sensors never show up in overlap queries.
    pub sensor: bool,
}

impl ShapeDef {
    pub fn solid(geometry: Geometry) -> Self {
        Self { geometry, sensor: false }
    }

    pub fn sensor(geometry: Geometry) -> Self {
        Self { geometry, sensor: true }
    }
}

// ============================================================================
// BODIES
// ============================================================================

#[derive(Debug, Clone)]
pub struct Body {
    pub owner: BodyOwner,
    pub body_type: BodyType,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub mass: f32,
    pub force: Vec2,
    pub shapes: Vec<ShapeDef>,
}

impl Body {
    pub fn dynamic(owner: BodyOwner, position: Vec2, mass: f32) -> Self {
        Self {
            owner,
            body_type: BodyType::Dynamic,
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            mass,
            force: Vec2::ZERO,
            shapes: Vec::new(),
        }
    }

    /// Static rectangle of map geometry.
    pub fn terrain(min: Vec2, max: Vec2) -> Self {
        Self {
            owner: BodyOwner::Terrain,
            body_type: BodyType::Static,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            mass: f32::INFINITY,
            force: Vec2::ZERO,
            shapes: vec![ShapeDef::solid(Geometry::Rect { min, max })],
        }
    }

    pub fn with_shape(mut self, shape: ShapeDef) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Frame that body-local shapes are posed in.
    pub fn isometry(&self) -> Isometry<Real> {
        Isometry::new(Vector::new(self.position.x, self.position.y), self.angle)
    }

    /// Colliders for every non-sensor shape, in body-local coordinates.
    pub(crate) fn solid_colliders(&self) -> impl Iterator<Item = Collider> + '_ {
        self.shapes
            .iter()
            .filter(|shape| !shape.sensor)
            .map(|shape| shape.geometry.collider())
    }
}

/// One body overlapping a queried shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeHit {
    pub handle: BodyHandle,
    pub owner: BodyOwner,
}
