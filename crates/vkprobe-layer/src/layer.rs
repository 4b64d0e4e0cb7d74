//! The layer object that owns the dispatch table for the lifetime of the
//! process.
//!
//! The interception entry points call the lifecycle hooks here when they see
//! an instance or device come and go, and use [`Layer::dispatch_table`] to
//! forward everything else.

use ash::vk;
use tracing::info;
use vkprobe_core::LayerConfig;

use crate::dispatch::{DispatchKey, Dispatchable};
use crate::dispatch_table::DispatchTable;
use crate::error::DispatchError;
use crate::resolver::{NextDeviceResolver, NextInstanceResolver};

pub struct Layer {
    config: LayerConfig,
    dispatch_table: DispatchTable,
}

impl Layer {
    /// Build the layer from `config` and initialize logging.
    pub fn new(config: LayerConfig) -> Self {
        vkprobe_common::logging::init_logging(&config.log_filter);
        info!(
            platform = vkprobe_common::platform::platform_name(),
            policy = ?config.contract_policy,
            "vkprobe layer initialized"
        );
        Self {
            dispatch_table: DispatchTable::with_policy(config.contract_policy),
            config,
        }
    }

    /// Build the layer from the config file found at the default location.
    pub fn from_default_config() -> Self {
        let path = vkprobe_core::config::default_config_path();
        Self::new(LayerConfig::load_or_default(path))
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.dispatch_table
    }

    /// # Safety
    /// `handle` must be a live dispatchable object.
    pub unsafe fn key_of<H: Dispatchable>(&self, handle: H) -> DispatchKey {
        unsafe { DispatchKey::from_handle(handle) }
    }

    /// Record a freshly created instance. Call after the next layer's
    /// vkCreateInstance succeeded, with the next layer's vkGetInstanceProcAddr.
    ///
    /// # Safety
    /// `instance` must be the live instance the next layer just returned.
    pub unsafe fn on_create_instance(
        &self,
        instance: vk::Instance,
        next_get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    ) -> Result<(), DispatchError> {
        let key = unsafe { DispatchKey::from_handle(instance) };
        let resolver = NextInstanceResolver {
            instance,
            get_instance_proc_addr: next_get_instance_proc_addr,
        };
        self.dispatch_table
            .create_instance_dispatch_table(key, &resolver)
    }

    /// Forget an instance. Call before forwarding vkDestroyInstance.
    ///
    /// # Safety
    /// `instance` must still be live.
    pub unsafe fn on_destroy_instance(&self, instance: vk::Instance) -> Result<(), DispatchError> {
        let key = unsafe { DispatchKey::from_handle(instance) };
        self.dispatch_table.remove_instance_dispatch_table(key)
    }

    /// Record a freshly created device. Call after the next layer's
    /// vkCreateDevice succeeded, with the next layer's vkGetDeviceProcAddr.
    ///
    /// # Safety
    /// `device` must be the live device the next layer just returned.
    pub unsafe fn on_create_device(
        &self,
        device: vk::Device,
        next_get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
    ) -> Result<(), DispatchError> {
        let key = unsafe { DispatchKey::from_handle(device) };
        let resolver = NextDeviceResolver {
            device,
            get_device_proc_addr: next_get_device_proc_addr,
        };
        self.dispatch_table.create_device_dispatch_table(key, &resolver)
    }

    /// Forget a device. Call before forwarding vkDestroyDevice.
    ///
    /// # Safety
    /// `device` must still be live.
    pub unsafe fn on_destroy_device(&self, device: vk::Device) -> Result<(), DispatchError> {
        let key = unsafe { DispatchKey::from_handle(device) };
        self.dispatch_table.remove_device_dispatch_table(key)
    }
}
