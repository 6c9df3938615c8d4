pub mod systems;

pub use systems::{HEAL_AMT, HEAL_DST_SQ, MedicalManager, RESPAWN_TIME};
