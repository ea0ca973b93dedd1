pub mod alarm;
pub mod config;
pub mod error;
pub mod reading;
pub mod units;

pub use alarm::*;
pub use config::Config;
pub use error::*;
pub use reading::extract_reading;
pub use units::{format_reason, MetricUnit};
