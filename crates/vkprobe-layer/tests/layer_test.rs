//! Integration test: Layer lifecycle hooks
//!
//! Drives the hooks with fake dispatchable objects and fake next-layer
//! vkGet*ProcAddr functions, the way the interception entry points would.

mod common;

use std::ffi::{c_char, CStr};

use ash::vk;
use common::*;
use vkprobe_core::{ContractPolicy, LayerConfig};
use vkprobe_layer::{DeviceExtension, DeviceFn, DispatchError, InstanceFn, Layer};

const NEXT_INSTANCE_BASE: usize = 0x7_0000;
const NEXT_DEVICE_BASE: usize = 0x8_0000;

unsafe extern "system" fn next_get_instance_proc_addr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    assert_ne!(instance, vk::Instance::null());
    let name = unsafe { CStr::from_ptr(p_name) };
    InstanceFn::ALL
        .iter()
        .find(|op| op.name() == name)
        .map(|&op| fake_proc(instance_addr(NEXT_INSTANCE_BASE, op)))
}

/// A driver without VK_EXT_debug_marker.
unsafe extern "system" fn next_get_device_proc_addr(
    device: vk::Device,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    assert_ne!(device, vk::Device::null());
    let name = unsafe { CStr::from_ptr(p_name) };
    DeviceFn::ALL
        .iter()
        .find(|op| op.name() == name)
        .filter(|op| {
            !matches!(
                op,
                DeviceFn::CmdDebugMarkerBeginEXT | DeviceFn::CmdDebugMarkerEndEXT
            )
        })
        .map(|&op| fake_proc(device_addr(NEXT_DEVICE_BASE, op)))
}

fn report_layer() -> Layer {
    Layer::new(LayerConfig {
        contract_policy: ContractPolicy::Report,
        ..LayerConfig::default()
    })
}

#[test]
fn test_instance_and_device_lifecycle() {
    let layer = Layer::new(LayerConfig::default());
    assert_eq!(layer.dispatch_table().policy(), ContractPolicy::Abort);

    let instance_dispatch = Box::new(0usize);
    let device_dispatch = Box::new(0usize);
    let instance = fake_handle::<vk::Instance>(&*instance_dispatch as *const usize as usize, 1);
    let physical_device =
        fake_handle::<vk::PhysicalDevice>(&*instance_dispatch as *const usize as usize, 2);
    let device = fake_handle::<vk::Device>(&*device_dispatch as *const usize as usize, 3);
    let command_buffer =
        fake_handle::<vk::CommandBuffer>(&*device_dispatch as *const usize as usize, 4);

    unsafe {
        layer
            .on_create_instance(instance.handle, next_get_instance_proc_addr)
            .expect("instance registered");
        layer
            .on_create_device(device.handle, next_get_device_proc_addr)
            .expect("device registered");
    }

    let table = layer.dispatch_table();
    let physical_device_key = unsafe { layer.key_of(physical_device.handle) };
    assert_eq!(
        table
            .get_physical_device_properties(physical_device_key)
            .expect("lookup") as usize,
        instance_addr(NEXT_INSTANCE_BASE, InstanceFn::GetPhysicalDeviceProperties)
    );

    let command_buffer_key = unsafe { layer.key_of(command_buffer.handle) };
    assert_eq!(
        table.begin_command_buffer(command_buffer_key).expect("lookup") as usize,
        device_addr(NEXT_DEVICE_BASE, DeviceFn::BeginCommandBuffer)
    );
    assert!(table
        .is_extension_supported(command_buffer_key, DeviceExtension::DebugUtils)
        .expect("flag"));
    assert!(!table
        .is_extension_supported(command_buffer_key, DeviceExtension::DebugMarker)
        .expect("flag"));

    unsafe {
        layer.on_destroy_device(device.handle).expect("device removed");
        layer.on_destroy_instance(instance.handle).expect("instance removed");
    }
    assert_eq!(table.device_count(), 0);
    assert_eq!(table.instance_count(), 0);
}

#[test]
fn test_duplicate_notifications_reported() {
    let layer = report_layer();
    let device_dispatch = Box::new(0usize);
    let device = fake_handle::<vk::Device>(&*device_dispatch as *const usize as usize, 1);
    let key = unsafe { layer.key_of(device.handle) };

    unsafe {
        layer
            .on_create_device(device.handle, next_get_device_proc_addr)
            .expect("device registered");
        assert_eq!(
            layer.on_create_device(device.handle, next_get_device_proc_addr),
            Err(DispatchError::AlreadyRegistered {
                table: vkprobe_layer::TableKind::Device,
                key,
            })
        );
        layer.on_destroy_device(device.handle).expect("device removed");
        assert!(layer.on_destroy_device(device.handle).is_err());
    }
}

#[test]
#[should_panic(expected = "no instance dispatch table")]
fn test_destroy_unknown_instance_aborts() {
    let layer = Layer::new(LayerConfig::default());
    let instance_dispatch = Box::new(0usize);
    let instance = fake_handle::<vk::Instance>(&*instance_dispatch as *const usize as usize, 1);
    unsafe {
        let _ = layer.on_destroy_instance(instance.handle);
    }
}
