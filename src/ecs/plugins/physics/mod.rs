/*!
# Physics

Opaque 2D physics capability consumed by the zone: bodies for characters and
terrain, overlap queries, and a fixed-step integrator. The rest of the server
only talks to the `SpatialIndex` trait.

Shapes are described with glam types and tested for overlap with parry.
*/

pub mod components;
pub mod space;

pub use components::{Body, BodyHandle, BodyOwner, BodyType, Geometry, ShapeDef, ShapeHit};
pub use space::{Space, SpatialIndex};
