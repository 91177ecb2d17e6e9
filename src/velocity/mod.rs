pub mod metrics;
pub mod renderer;
pub mod report;

pub use report::{MetricReport, VelocityReport};
