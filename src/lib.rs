pub mod chart;
pub mod config;
pub mod convert;
pub mod encoding;
pub mod error;
pub mod json;
pub mod metadata;
pub mod midi;
pub mod simfile;
pub mod tempo;
pub mod timeline;

pub use config::ConvertOptions;
pub use convert::{ChartSource, Converter};
pub use error::Error;
