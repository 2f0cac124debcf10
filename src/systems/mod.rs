#![allow(missing_docs)]
pub mod skinning;
pub mod update_skeleton;

pub use skinning::skinning_system;
pub use update_skeleton::update_skeleton_system;
