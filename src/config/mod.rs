pub mod types;

pub use types::{TargetsConfig, VelocityConfig};
