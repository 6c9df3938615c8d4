use std::collections::BTreeMap;

use parry2d::bounding_volume::BoundingVolume;
use parry2d::math::Isometry;

use crate::ecs::plugins::physics::components::*;

/// The capabilities the simulation needs from a 2D physics space.
///
/// Broad and narrow phase live behind this trait; the zone only adds and
/// removes bodies, steps time, and asks what overlaps a shape.
pub trait SpatialIndex {
    fn add_body(&mut self, body: Body) -> BodyHandle;

    /// Returns the removed body, or `None` if the handle was not present.
    fn remove_body(&mut self, handle: BodyHandle) -> Option<Body>;

    fn body(&self, handle: BodyHandle) -> Option<&Body>;

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body>;

    fn step(&mut self, dt: f32);

    /// Every body with a solid shape overlapping `shape` (world space),
    /// at most one hit per body, in insertion order.
    fn query_shape(&self, shape: &Geometry) -> Vec<ShapeHit>;

    fn body_count(&self) -> usize;
}

/// Spatial index over a flat map of bodies. Queries cull by parry AABB
/// before the exact intersection test; good enough for a zone's worth of
/// bodies.
#[derive(Debug, Default)]
pub struct Space {
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u64,
}

impl Space {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialIndex for Space {
    fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, body);
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        self.bodies.remove(&handle)
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(&handle)
    }

    fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            match body.body_type {
                BodyType::Dynamic => {
                    if body.mass > 0.0 {
                        body.velocity += body.force / body.mass * dt;
                    }
                    body.position += body.velocity * dt;
                }
                BodyType::Static => body.velocity = glam::Vec2::ZERO,
            }
            body.force = glam::Vec2::ZERO;
        }
    }

    fn query_shape(&self, shape: &Geometry) -> Vec<ShapeHit> {
        let identity = Isometry::identity();
        let query = shape.collider();
        let bounds = query.aabb(&identity);
        self.bodies
            .iter()
            .filter(|(_, body)| {
                let frame = body.isometry();
                body.solid_colliders().any(|collider| {
                    collider.aabb(&frame).intersects(&bounds)
                        && collider.intersects(&frame, &query, &identity)
                })
            })
            .map(|(&handle, body)| ShapeHit {
                handle,
                owner: body.owner.clone(),
            })
            .collect()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn character_body(uuid: &str, position: Vec2) -> Body {
        Body::dynamic(BodyOwner::Character(uuid.to_string()), position, 10.0)
            .with_shape(ShapeDef::solid(Geometry::circle(Vec2::ZERO, 0.5)))
            .with_shape(ShapeDef::sensor(Geometry::Capsule {
                a: Vec2::ZERO,
                b: Vec2::new(3.0, 0.0),
                radius: 0.1,
            }))
    }

    #[test]
    fn step_integrates_force_then_velocity() {
        let mut space = Space::new();
        let handle = space.add_body(character_body("a", Vec2::ZERO));
        space.body_mut(handle).unwrap().apply_force(Vec2::new(100.0, 0.0));

        space.step(0.5);

        let body = space.body(handle).unwrap();
        assert_eq!(body.velocity, Vec2::new(5.0, 0.0));
        assert_eq!(body.position, Vec2::new(2.5, 0.0));
        assert_eq!(body.force, Vec2::ZERO);
    }

    #[test]
    fn static_bodies_do_not_move() {
        let mut space = Space::new();
        let handle = space.add_body(character_body("a", Vec2::ZERO));
        let body = space.body_mut(handle).unwrap();
        body.velocity = Vec2::new(3.0, 3.0);
        body.body_type = BodyType::Static;

        space.step(1.0);

        assert_eq!(space.body(handle).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn query_skips_sensors_and_reports_owners() {
        let mut space = Space::new();
        space.add_body(character_body("near", Vec2::ZERO));
        space.add_body(Body::terrain(Vec2::new(10.0, 10.0), Vec2::new(12.0, 12.0)));

        // Inside "near"'s sensor hitbox, outside its body circle.
        let point = Geometry::circle(Vec2::new(2.5, 0.0), 0.1);
        assert!(space.query_shape(&point).is_empty());

        let point = Geometry::circle(Vec2::new(0.2, 0.0), 0.1);
        let hits = space.query_shape(&point);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].owner, BodyOwner::Character("near".to_string()));

        let point = Geometry::circle(Vec2::new(11.0, 11.0), 0.1);
        assert_eq!(space.query_shape(&point)[0].owner, BodyOwner::Terrain);
    }

    #[test]
    fn removing_twice_reports_absence() {
        let mut space = Space::new();
        let handle = space.add_body(character_body("a", Vec2::ZERO));
        assert!(space.remove_body(handle).is_some());
        assert!(space.remove_body(handle).is_none());
        assert_eq!(space.body_count(), 0);
    }
}
