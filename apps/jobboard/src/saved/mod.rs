// Save-State Reconciler: the signed-in user's bookmarks, toggled optimistically
// against the record store and rolled back when the store refuses.

pub mod dedup;
pub mod reconciler;

pub use reconciler::{LoadPolicy, SaveReconciler};
