//! Apple platform identifiers for xcsettings
//!
//! This crate provides:
//! - The platforms a target can be built for
//! - The desktop / device split that drives runtime search paths

mod error;
mod platform;

pub use error::PlatformError;
pub use platform::Platform;
