//! Name-based resolution of next-layer entry points.

use std::ffi::CStr;

use ash::vk;

/// Resolves a Vulkan command name to the next layer's implementation.
pub trait ProcResolver {
    fn resolve(&self, name: &CStr) -> vk::PFN_vkVoidFunction;
}

impl<F> ProcResolver for F
where
    F: Fn(&CStr) -> vk::PFN_vkVoidFunction,
{
    fn resolve(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        self(name)
    }
}

/// The next layer's `vkGetInstanceProcAddr`, bound to one instance.
#[derive(Clone, Copy)]
pub struct NextInstanceResolver {
    pub instance: vk::Instance,
    pub get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
}

impl ProcResolver for NextInstanceResolver {
    fn resolve(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        // SAFETY: the loader handed us this pointer for exactly this instance.
        unsafe { (self.get_instance_proc_addr)(self.instance, name.as_ptr()) }
    }
}

/// The next layer's `vkGetDeviceProcAddr`, bound to one device.
#[derive(Clone, Copy)]
pub struct NextDeviceResolver {
    pub device: vk::Device,
    pub get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
}

impl ProcResolver for NextDeviceResolver {
    fn resolve(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        // SAFETY: the loader handed us this pointer for exactly this device.
        unsafe { (self.get_device_proc_addr)(self.device, name.as_ptr()) }
    }
}
