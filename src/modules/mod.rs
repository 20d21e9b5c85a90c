//! The built-in filter and tool modules.

pub mod collect;
pub mod stretch_set;

pub use collect::{Collect, CollectParams, CollectParamsBuilder};
pub use stretch_set::{StretchParams, StretchParamsBuilder, StretchSet, MAX_DATA_PORTS};
