//! Identifiers for the next-layer entry points the dispatch table captures.

use std::ffi::CStr;
use std::fmt;

macro_rules! entry_points {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $vk_name:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];
            pub const COUNT: usize = Self::ALL.len();

            /// The Vulkan command name used to resolve this entry point.
            pub fn name(self) -> &'static CStr {
                match self {
                    $($name::$variant => $vk_name,)*
                }
            }

            pub(crate) fn index(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.name().to_string_lossy())
            }
        }
    };
}

entry_points! {
    /// Instance-level entry points.
    pub enum InstanceFn {
        DestroyInstance => c"vkDestroyInstance",
        GetInstanceProcAddr => c"vkGetInstanceProcAddr",
        EnumerateDeviceExtensionProperties => c"vkEnumerateDeviceExtensionProperties",
        GetPhysicalDeviceProperties => c"vkGetPhysicalDeviceProperties",
    }
}

entry_points! {
    /// Device-level entry points.
    pub enum DeviceFn {
        DestroyDevice => c"vkDestroyDevice",
        GetDeviceProcAddr => c"vkGetDeviceProcAddr",
        CreateCommandPool => c"vkCreateCommandPool",
        DestroyCommandPool => c"vkDestroyCommandPool",
        ResetCommandPool => c"vkResetCommandPool",
        AllocateCommandBuffers => c"vkAllocateCommandBuffers",
        FreeCommandBuffers => c"vkFreeCommandBuffers",
        BeginCommandBuffer => c"vkBeginCommandBuffer",
        EndCommandBuffer => c"vkEndCommandBuffer",
        ResetCommandBuffer => c"vkResetCommandBuffer",
        QueueSubmit => c"vkQueueSubmit",
        QueuePresentKHR => c"vkQueuePresentKHR",
        GetDeviceQueue => c"vkGetDeviceQueue",
        GetDeviceQueue2 => c"vkGetDeviceQueue2",
        CreateQueryPool => c"vkCreateQueryPool",
        DestroyQueryPool => c"vkDestroyQueryPool",
        ResetQueryPoolEXT => c"vkResetQueryPoolEXT",
        CmdWriteTimestamp => c"vkCmdWriteTimestamp",
        GetQueryPoolResults => c"vkGetQueryPoolResults",
        CmdBeginDebugUtilsLabelEXT => c"vkCmdBeginDebugUtilsLabelEXT",
        CmdEndDebugUtilsLabelEXT => c"vkCmdEndDebugUtilsLabelEXT",
        CmdDebugMarkerBeginEXT => c"vkCmdDebugMarkerBeginEXT",
        CmdDebugMarkerEndEXT => c"vkCmdDebugMarkerEndEXT",
    }
}

/// Optional device extensions whose labeling entry points we forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceExtension {
    /// VK_EXT_debug_utils
    DebugUtils,
    /// VK_EXT_debug_marker
    DebugMarker,
}

impl DeviceExtension {
    pub const ALL: [DeviceExtension; 2] = [DeviceExtension::DebugUtils, DeviceExtension::DebugMarker];

    /// The begin/end pair that must both be present for the extension to count
    /// as supported.
    pub fn entry_points(self) -> [DeviceFn; 2] {
        match self {
            DeviceExtension::DebugUtils => [
                DeviceFn::CmdBeginDebugUtilsLabelEXT,
                DeviceFn::CmdEndDebugUtilsLabelEXT,
            ],
            DeviceExtension::DebugMarker => [
                DeviceFn::CmdDebugMarkerBeginEXT,
                DeviceFn::CmdDebugMarkerEndEXT,
            ],
        }
    }

    pub fn extension_name(self) -> &'static CStr {
        match self {
            DeviceExtension::DebugUtils => c"VK_EXT_debug_utils",
            DeviceExtension::DebugMarker => c"VK_EXT_debug_marker",
        }
    }
}
