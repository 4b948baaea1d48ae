// Filter Engine: pure functions from (records, filter state) to the visible list
// and the choice lists that populate the filter controls.

pub mod engine;
pub mod options;

pub use engine::{compute_visible, FilterField, FilterState};
pub use options::{filter_options, FilterOptions};
