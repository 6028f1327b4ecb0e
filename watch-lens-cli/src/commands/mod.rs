pub(crate) mod analyze;
pub(crate) mod config;
pub(crate) mod normalize;
pub(crate) mod stats;
