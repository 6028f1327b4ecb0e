pub mod async_util;
pub mod error;
pub mod intake;
pub mod output;
pub mod settings;

pub use error::IntakeError;
pub use intake::{IntakeBundle, IntakeSources};
pub use output::{OutputTargets, WrittenFiles};

// Re-export the domain types so frontends only need this crate.
pub use watch_lens_core::*;
