use thiserror::Error;

/// Errors raised by skeleton topology mutation and skin binding.
///
/// Every variant is a programming or data error surfaced at the call that
/// introduced it; there are no retryable conditions in this crate.
#[derive(Error, Debug)]
pub enum MarrowError {
    /// The child's kind is not accepted by the parent node
    #[error("a {child} is not a valid child of a {parent}")]
    InvalidChildKind {
        /// Kind of the node the child was added to
        parent: &'static str,
        /// Kind of the rejected child
        child: &'static str,
    },
    /// The operation requires a node of a different kind
    #[error("expected a {expected} node, found a {found}")]
    WrongNodeKind {
        /// The kind the operation requires
        expected: &'static str,
        /// The kind that was supplied
        found: &'static str,
    },
    /// The node is already attached elsewhere in the tree
    #[error("the node is already attached to a parent")]
    AlreadyParented,
    /// The node is not currently a child of the given parent
    #[error("the node is not a child of the given parent")]
    NotAChild,
    /// The mutation would make a node its own ancestor
    #[error("attaching this child would make the skeleton cyclic")]
    CyclicTopology,
    /// The node id was minted by a different skeleton
    #[error("the node id does not belong to this skeleton")]
    UnknownNode,
    /// The displacer index is out of range for the segment
    #[error("the segment has no displacer at index {index}")]
    UnknownDisplacer {
        /// Index into the segment's displacer list
        index: usize,
    },
    /// A joint's weight list references a vertex the skin does not have
    #[error("joint '{joint}' weights vertex {vertex}, but the skin has {vertex_count} vertices")]
    WeightVertexOutOfRange {
        /// Name of the joint carrying the bad entry
        joint: String,
        /// The out-of-range vertex index
        vertex: usize,
        /// Number of vertices in the bound skin
        vertex_count: usize,
    },
    /// A displacer references a vertex the skin does not have
    #[error(
        "displacer '{displacer}' indexes vertex {vertex}, but the skin has {vertex_count} vertices"
    )]
    DisplacerVertexOutOfRange {
        /// Name of the displacer carrying the bad entry
        displacer: String,
        /// The out-of-range vertex index
        vertex: usize,
        /// Number of vertices in the bound skin
        vertex_count: usize,
    },
    /// A displacer's index and offset lists have different lengths
    #[error("displacer '{displacer}' has {indices} indices but {offsets} offsets")]
    DisplacerCountMismatch {
        /// Name of the malformed displacer
        displacer: String,
        /// Length of its index list
        indices: usize,
        /// Length of its offset list
        offsets: usize,
    },
    /// The normal array's length differs from the coordinate array's
    #[error("the skin has {coords} coordinates but {normals} normals")]
    NormalCountMismatch {
        /// Length of the coordinate array
        coords: usize,
        /// Length of the normal array
        normals: usize,
    },
    /// Wrapper for embedder errors flowing through this crate
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
