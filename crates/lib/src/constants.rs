//! Constants used throughout formweave.

/// Prop name dependency views are injected under by default.
pub const DEFAULT_SLOTS_PROP: &str = "formSlots";

/// Most `null` entries a single write may pad onto the end of an array.
pub const MAX_INDEX_GAP: usize = 1024;
