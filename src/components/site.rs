use serde::{Deserialize, Serialize};

/// An attachment point at the edge of the skeleton.
///
/// Sites mark locations for accessories, end effectors and viewpoints. They
/// participate in transform propagation like any other node but carry no
/// deformation data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {}
