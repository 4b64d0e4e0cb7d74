//! Dispatch keys for Vulkan dispatchable handles.
//!
//! The loader ABI requires that every dispatchable object (VkInstance,
//! VkPhysicalDevice, VkDevice, VkQueue, VkCommandBuffer) starts with a
//! pointer to the loader's dispatch table. That pointer is shared by all
//! objects created under the same instance or device, so a command buffer
//! and the device it was allocated from carry the same first word. We use
//! that word as the identity of the owning instance/device.

use std::fmt;

use ash::vk;

/// Identity of the instance or device that owns a dispatchable handle.
/// Never dereferenced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchKey(usize);

impl DispatchKey {
    /// Read the dispatch key of a dispatchable handle.
    ///
    /// # Safety
    /// `handle` must be a live, non-null dispatchable object created through
    /// the Vulkan loader (or laid out like one: first field is a pointer).
    pub unsafe fn from_handle<H: Dispatchable>(handle: H) -> Self {
        let object = handle.as_raw() as usize as *const usize;
        debug_assert!(!object.is_null(), "dispatch key of a null {:?}", H::TYPE);
        Self(unsafe { object.read() })
    }

    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> usize {
        self.0
    }
}

impl fmt::Debug for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DispatchKey({:#x})", self.0)
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Handle types whose objects begin with the loader dispatch pointer.
pub trait Dispatchable: vk::Handle + Copy {}

impl Dispatchable for vk::Instance {}
impl Dispatchable for vk::PhysicalDevice {}
impl Dispatchable for vk::Device {}
impl Dispatchable for vk::Queue {}
impl Dispatchable for vk::CommandBuffer {}
