//! Pure mechanics processors. Each submodule covers one named mechanic
//! from the combat spec and is unit-tested in isolation; the `phases`
//! module composes them into the fixed per-turn pipeline.

pub mod ammo;
pub mod attack;
pub mod charge;
pub mod contagion;
pub mod engagement;
pub mod facing;
pub mod los;
pub mod movement;
pub mod phalanx;
pub mod resolve;
pub mod riposte;
pub mod shred;
