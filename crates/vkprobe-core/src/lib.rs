//! Shared configuration, error types and collaborator interfaces for the
//! vkprobe Vulkan layer.

pub mod config;
pub mod error;
pub mod frame_pointer;

pub use config::{ContractPolicy, LayerConfig};
pub use error::CoreError;
