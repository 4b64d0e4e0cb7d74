//! vkprobe Vulkan layer
//!
//! Routing core of a profiling layer: for any dispatchable handle the
//! application passes in, find the next layer's entry points captured for
//! the instance or device that owns it.

pub mod dispatch;
pub mod dispatch_table;
pub mod entry_points;
pub mod error;
pub mod layer;
pub mod resolver;

pub use dispatch::{DispatchKey, Dispatchable};
pub use dispatch_table::{CapabilityFlags, DispatchTable};
pub use entry_points::{DeviceExtension, DeviceFn, InstanceFn};
pub use error::{DispatchError, TableKind};
pub use layer::Layer;
pub use resolver::{NextDeviceResolver, NextInstanceResolver, ProcResolver};
