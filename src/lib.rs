//! A render pass engine over GLES style graphics APIs.
//!
//! Callers describe resources with plain descriptors (`*Def` types) and work with
//! [`Submit`]s of passes. The [`Context`] lazily builds the backend objects those need,
//! keeps them in sync with descriptor changes, and walks each submission in order.

pub mod caps;
pub mod config;
pub mod error;
pub mod formats;
pub mod logging;
pub mod device;
pub mod resource_manager;
pub mod commands;
pub mod context;

pub use caps::{Capabilities, Feature, Tier};
pub use config::ContextConfig;
pub use context::Context;
pub use device::{Device, GlDevice};
pub use error::{Error, SubmitReport};
pub use logging::{init_logging, LoggingConfig};

pub use commands::*;
pub use resource_manager::*;
pub use resource_manager::layout::UniformValue;
