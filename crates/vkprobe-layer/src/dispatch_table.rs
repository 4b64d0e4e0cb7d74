//! Thread-safe dispatch tables for routing intercepted calls to the next layer.
//!
//! One table per live instance and one per live device, keyed by the
//! [`DispatchKey`] of the owning object. Entry points are resolved by name
//! once, when the instance/device is created, and then served from memory
//! on every intercepted call.
//!
//! All state sits behind a single read/write lock. Tables are written a
//! handful of times per process (create/destroy) and read on every call, so
//! readers share the lock and writers take it exclusively for one insert or
//! erase.

use std::collections::HashMap;

use ash::vk;
use parking_lot::RwLock;
use tracing::{debug, error, info};
use vkprobe_core::ContractPolicy;

use crate::dispatch::DispatchKey;
use crate::entry_points::{DeviceExtension, DeviceFn, InstanceFn};
use crate::error::{DispatchError, TableKind};
use crate::resolver::ProcResolver;

type RawProc = unsafe extern "system" fn();

// Extension command signatures.
#[allow(non_camel_case_types)]
pub type PFN_vkQueuePresentKHR =
    unsafe extern "system" fn(queue: vk::Queue, p_present_info: *const vk::PresentInfoKHR<'_>) -> vk::Result;
#[allow(non_camel_case_types)]
pub type PFN_vkCmdBeginDebugUtilsLabelEXT = unsafe extern "system" fn(
    command_buffer: vk::CommandBuffer,
    p_label_info: *const vk::DebugUtilsLabelEXT<'_>,
);
#[allow(non_camel_case_types)]
pub type PFN_vkCmdEndDebugUtilsLabelEXT = unsafe extern "system" fn(command_buffer: vk::CommandBuffer);
#[allow(non_camel_case_types)]
pub type PFN_vkCmdDebugMarkerBeginEXT = unsafe extern "system" fn(
    command_buffer: vk::CommandBuffer,
    p_marker_info: *const vk::DebugMarkerMarkerInfoEXT<'_>,
);
#[allow(non_camel_case_types)]
pub type PFN_vkCmdDebugMarkerEndEXT = unsafe extern "system" fn(command_buffer: vk::CommandBuffer);

/// Entry points captured from the next layer for one instance.
#[derive(Clone)]
pub struct InstanceEntry {
    procs: [vk::PFN_vkVoidFunction; InstanceFn::COUNT],
}

impl InstanceEntry {
    pub fn resolve(resolver: &dyn ProcResolver) -> Self {
        let mut procs = [None; InstanceFn::COUNT];
        for &op in InstanceFn::ALL {
            procs[op.index()] = resolver.resolve(op.name());
        }
        Self { procs }
    }

    pub fn get(&self, op: InstanceFn) -> vk::PFN_vkVoidFunction {
        self.procs[op.index()]
    }

    fn missing(&self) -> Vec<InstanceFn> {
        InstanceFn::ALL
            .iter()
            .copied()
            .filter(|&op| self.get(op).is_none())
            .collect()
    }
}

/// Whether the optional labeling extensions are usable on a device.
/// Fixed when the device is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
    pub debug_utils: bool,
    pub debug_marker: bool,
}

impl CapabilityFlags {
    pub fn supports(self, extension: DeviceExtension) -> bool {
        match extension {
            DeviceExtension::DebugUtils => self.debug_utils,
            DeviceExtension::DebugMarker => self.debug_marker,
        }
    }
}

/// Entry points captured from the next layer for one device, together with
/// the capability flags derived from them.
#[derive(Clone)]
pub struct DeviceEntry {
    procs: [vk::PFN_vkVoidFunction; DeviceFn::COUNT],
    capabilities: CapabilityFlags,
}

impl DeviceEntry {
    pub fn resolve(resolver: &dyn ProcResolver) -> Self {
        let mut procs = [None; DeviceFn::COUNT];
        for &op in DeviceFn::ALL {
            procs[op.index()] = resolver.resolve(op.name());
        }
        let present = |extension: DeviceExtension| {
            extension
                .entry_points()
                .iter()
                .all(|op| procs[op.index()].is_some())
        };
        let capabilities = CapabilityFlags {
            debug_utils: present(DeviceExtension::DebugUtils),
            debug_marker: present(DeviceExtension::DebugMarker),
        };
        Self { procs, capabilities }
    }

    pub fn get(&self, op: DeviceFn) -> vk::PFN_vkVoidFunction {
        self.procs[op.index()]
    }

    pub fn capabilities(&self) -> CapabilityFlags {
        self.capabilities
    }

    fn missing(&self) -> Vec<DeviceFn> {
        DeviceFn::ALL
            .iter()
            .copied()
            .filter(|&op| self.get(op).is_none())
            .collect()
    }
}

#[derive(Default)]
struct Tables {
    instances: HashMap<DispatchKey, InstanceEntry>,
    devices: HashMap<DispatchKey, DeviceEntry>,
}

/// Registry of per-instance and per-device dispatch tables.
///
/// Internally synchronized; share it by reference across threads.
pub struct DispatchTable {
    tables: RwLock<Tables>,
    policy: ContractPolicy,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::with_policy(ContractPolicy::default())
    }

    pub fn with_policy(policy: ContractPolicy) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            policy,
        }
    }

    pub fn policy(&self) -> ContractPolicy {
        self.policy
    }

    // ── Registration ────────────────────────────────────────

    /// Capture the instance-level entry points for `key` from the next layer.
    pub fn create_instance_dispatch_table(
        &self,
        key: DispatchKey,
        resolver: &dyn ProcResolver,
    ) -> Result<(), DispatchError> {
        let entry = InstanceEntry::resolve(resolver);
        let missing = entry.missing();
        if !missing.is_empty() {
            debug!(%key, ?missing, "next layer lacks instance entry points");
        }

        let result = {
            let mut tables = self.tables.write();
            if tables.instances.contains_key(&key) {
                Err(DispatchError::AlreadyRegistered {
                    table: TableKind::Instance,
                    key,
                })
            } else {
                tables.instances.insert(key, entry);
                Ok(())
            }
        };
        if result.is_ok() {
            debug!(%key, "instance dispatch table created");
        }
        self.enforce(result)
    }

    pub fn remove_instance_dispatch_table(&self, key: DispatchKey) -> Result<(), DispatchError> {
        let result = match self.tables.write().instances.remove(&key) {
            Some(_) => Ok(()),
            None => Err(DispatchError::NotRegistered {
                table: TableKind::Instance,
                key,
            }),
        };
        if result.is_ok() {
            debug!(%key, "instance dispatch table removed");
        }
        self.enforce(result)
    }

    /// Capture the device-level entry points for `key` from the next layer
    /// and derive the extension capability flags from them.
    pub fn create_device_dispatch_table(
        &self,
        key: DispatchKey,
        resolver: &dyn ProcResolver,
    ) -> Result<(), DispatchError> {
        let entry = DeviceEntry::resolve(resolver);
        let missing = entry.missing();
        if !missing.is_empty() {
            debug!(%key, ?missing, "next layer lacks device entry points");
        }
        let capabilities = entry.capabilities();

        let result = {
            let mut tables = self.tables.write();
            if tables.devices.contains_key(&key) {
                Err(DispatchError::AlreadyRegistered {
                    table: TableKind::Device,
                    key,
                })
            } else {
                tables.devices.insert(key, entry);
                Ok(())
            }
        };
        if result.is_ok() {
            info!(
                %key,
                debug_utils = capabilities.debug_utils,
                debug_marker = capabilities.debug_marker,
                "device dispatch table created"
            );
        }
        self.enforce(result)
    }

    /// Drop the device table for `key`; its capability flags go with it.
    pub fn remove_device_dispatch_table(&self, key: DispatchKey) -> Result<(), DispatchError> {
        let result = match self.tables.write().devices.remove(&key) {
            Some(_) => Ok(()),
            None => Err(DispatchError::NotRegistered {
                table: TableKind::Device,
                key,
            }),
        };
        if result.is_ok() {
            debug!(%key, "device dispatch table removed");
        }
        self.enforce(result)
    }

    // ── Lookup ──────────────────────────────────────────────

    /// The next layer's implementation of `op` for the instance owning `key`.
    /// The entry point must have been provided.
    pub fn instance_proc(&self, key: DispatchKey, op: InstanceFn) -> Result<RawProc, DispatchError> {
        let result = {
            let tables = self.tables.read();
            match tables.instances.get(&key) {
                Some(entry) => entry.get(op).ok_or_else(|| DispatchError::MissingEntryPoint {
                    key,
                    name: op.to_string(),
                }),
                None => Err(DispatchError::NotRegistered {
                    table: TableKind::Instance,
                    key,
                }),
            }
        };
        self.enforce(result)
    }

    /// The next layer's implementation of `op` for the device owning `key`.
    /// The entry point must have been provided; for extension entry points
    /// check [`Self::is_extension_supported`] first.
    pub fn device_proc(&self, key: DispatchKey, op: DeviceFn) -> Result<RawProc, DispatchError> {
        let result = {
            let tables = self.tables.read();
            match tables.devices.get(&key) {
                Some(entry) => entry.get(op).ok_or_else(|| DispatchError::MissingEntryPoint {
                    key,
                    name: op.to_string(),
                }),
                None => Err(DispatchError::NotRegistered {
                    table: TableKind::Device,
                    key,
                }),
            }
        };
        self.enforce(result)
    }

    pub fn is_extension_supported(
        &self,
        key: DispatchKey,
        extension: DeviceExtension,
    ) -> Result<bool, DispatchError> {
        self.capabilities(key)
            .map(|capabilities| capabilities.supports(extension))
    }

    pub fn is_debug_utils_extension_supported(&self, key: DispatchKey) -> Result<bool, DispatchError> {
        self.is_extension_supported(key, DeviceExtension::DebugUtils)
    }

    pub fn is_debug_marker_extension_supported(&self, key: DispatchKey) -> Result<bool, DispatchError> {
        self.is_extension_supported(key, DeviceExtension::DebugMarker)
    }

    pub fn capabilities(&self, key: DispatchKey) -> Result<CapabilityFlags, DispatchError> {
        let result = self
            .tables
            .read()
            .devices
            .get(&key)
            .map(DeviceEntry::capabilities)
            .ok_or(DispatchError::NotRegistered {
                table: TableKind::Device,
                key,
            });
        self.enforce(result)
    }

    pub fn instance_count(&self) -> usize {
        self.tables.read().instances.len()
    }

    pub fn device_count(&self) -> usize {
        self.tables.read().devices.len()
    }

    /// Apply the contract policy. Callers must not hold the lock.
    fn enforce<T>(&self, result: Result<T, DispatchError>) -> Result<T, DispatchError> {
        if let Err(e) = &result {
            error!("dispatch table contract violated: {}", e);
            if self.policy == ContractPolicy::Abort {
                panic!("dispatch table contract violated: {}", e);
            }
        }
        result
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

// ── Typed accessors ─────────────────────────────────────────

macro_rules! typed_accessors {
    ($lookup:ident, $op_type:ident, $($method:ident => $op:ident: $pfn:ty,)*) => {
        impl DispatchTable {
            $(
                pub fn $method(&self, key: DispatchKey) -> Result<$pfn, DispatchError> {
                    let raw = self.$lookup(key, $op_type::$op)?;
                    // SAFETY: the next layer returned this pointer for the command
                    // named by the same identifier, so it has this signature.
                    Ok(unsafe { std::mem::transmute::<RawProc, $pfn>(raw) })
                }
            )*
        }
    };
}

typed_accessors!(instance_proc, InstanceFn,
    destroy_instance => DestroyInstance: vk::PFN_vkDestroyInstance,
    get_instance_proc_addr => GetInstanceProcAddr: vk::PFN_vkGetInstanceProcAddr,
    enumerate_device_extension_properties => EnumerateDeviceExtensionProperties: vk::PFN_vkEnumerateDeviceExtensionProperties,
    get_physical_device_properties => GetPhysicalDeviceProperties: vk::PFN_vkGetPhysicalDeviceProperties,
);

typed_accessors!(device_proc, DeviceFn,
    destroy_device => DestroyDevice: vk::PFN_vkDestroyDevice,
    get_device_proc_addr => GetDeviceProcAddr: vk::PFN_vkGetDeviceProcAddr,
    create_command_pool => CreateCommandPool: vk::PFN_vkCreateCommandPool,
    destroy_command_pool => DestroyCommandPool: vk::PFN_vkDestroyCommandPool,
    reset_command_pool => ResetCommandPool: vk::PFN_vkResetCommandPool,
    allocate_command_buffers => AllocateCommandBuffers: vk::PFN_vkAllocateCommandBuffers,
    free_command_buffers => FreeCommandBuffers: vk::PFN_vkFreeCommandBuffers,
    begin_command_buffer => BeginCommandBuffer: vk::PFN_vkBeginCommandBuffer,
    end_command_buffer => EndCommandBuffer: vk::PFN_vkEndCommandBuffer,
    reset_command_buffer => ResetCommandBuffer: vk::PFN_vkResetCommandBuffer,
    queue_submit => QueueSubmit: vk::PFN_vkQueueSubmit,
    queue_present_khr => QueuePresentKHR: PFN_vkQueuePresentKHR,
    get_device_queue => GetDeviceQueue: vk::PFN_vkGetDeviceQueue,
    get_device_queue2 => GetDeviceQueue2: vk::PFN_vkGetDeviceQueue2,
    create_query_pool => CreateQueryPool: vk::PFN_vkCreateQueryPool,
    destroy_query_pool => DestroyQueryPool: vk::PFN_vkDestroyQueryPool,
    // vkResetQueryPoolEXT is the pre-1.2 name of vkResetQueryPool.
    reset_query_pool_ext => ResetQueryPoolEXT: vk::PFN_vkResetQueryPool,
    cmd_write_timestamp => CmdWriteTimestamp: vk::PFN_vkCmdWriteTimestamp,
    get_query_pool_results => GetQueryPoolResults: vk::PFN_vkGetQueryPoolResults,
    cmd_begin_debug_utils_label_ext => CmdBeginDebugUtilsLabelEXT: PFN_vkCmdBeginDebugUtilsLabelEXT,
    cmd_end_debug_utils_label_ext => CmdEndDebugUtilsLabelEXT: PFN_vkCmdEndDebugUtilsLabelEXT,
    cmd_debug_marker_begin_ext => CmdDebugMarkerBeginEXT: PFN_vkCmdDebugMarkerBeginEXT,
    cmd_debug_marker_end_ext => CmdDebugMarkerEndEXT: PFN_vkCmdDebugMarkerEndEXT,
);
