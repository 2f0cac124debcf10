use crate::Humanoid;

/// Applies topology mutations queued while the character was live.
///
/// This is the synchronization point the live-mutation contract defers to:
/// the child lists a renderer observes change here, atomically, and nowhere
/// else. Call it between ticks, after the adapter has consumed this frame's
/// matrices and buffers — never during an update pass.
///
/// Basic usage:
/// ```ignore
/// fn tick(humanoid: &mut Humanoid) {
///     humanoid.update_mesh()?;
///     // ... renderer reads buffers ...
///     end_frame(humanoid);
/// }
/// ```
pub fn end_frame(humanoid: &mut Humanoid) {
    humanoid.skeleton_mut().apply_pending();
}
