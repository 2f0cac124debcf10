#![deny(missing_docs)]

//! Welcome to `marrow`: a software skeletal deformation engine. 🦴
//!
//! `marrow` owns the part of a character pipeline between an animation source
//! and a renderer: a hierarchical joint/segment/site skeleton that
//! accumulates parent-to-child transforms top-down with dirty-flag
//! propagation, then blends per-vertex skin deformation from per-joint
//! weight lists into output coordinate and normal buffers. It performs no
//! rendering, threading or I/O of its own — every operation runs to
//! completion on the caller's thread, once per externally driven tick.
//!
//! The entry point is [`Humanoid`]: build a [`skeleton::Skeleton`] through
//! it, bind a skin, then call [`Humanoid::update_mesh`] each tick and read
//! back the global matrices and deformed buffers. While the character is
//! live, topology mutations queue up until
//! [`schedule_functions::end_frame`], so a renderer never observes a
//! half-mutated tree.

pub use glam;

pub use humanoid::Humanoid;
pub use marrow_error::MarrowError;

/// Components are data carried by skeleton nodes and the humanoid root
pub mod components;
mod humanoid;
mod marrow_error;
/// Schedule functions are synchronization points called between ticks
pub mod schedule_functions;
/// The joint/segment/site tree
pub mod skeleton;
/// The deformable skin and its output buffers
pub mod skin;
/// Systems are functions called each tick to update the simulation
pub mod systems;

/// Marrow result type
pub type MarrowResult<T> = std::result::Result<T, MarrowError>;
