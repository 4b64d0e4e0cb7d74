//! Fake dispatchable objects and next-layer resolvers shared by the
//! integration tests.

#![allow(dead_code)]

use std::ffi::CStr;

use ash::vk;
use ash::vk::Handle;
use vkprobe_layer::{DeviceFn, InstanceFn};

/// Laid out like a loader-created dispatchable object: the first word is the
/// dispatch pointer shared by everything under one instance/device.
#[repr(C)]
pub struct FakeObject {
    pub loader_data: usize,
    pub local_id: u64,
}

/// A fake dispatchable object plus the handle pointing at it. The box keeps
/// the object alive for as long as the handle is used.
pub struct FakeHandle<H> {
    _object: Box<FakeObject>,
    pub handle: H,
}

pub fn fake_handle<H: Handle>(loader_data: usize, local_id: u64) -> FakeHandle<H> {
    let object = Box::new(FakeObject {
        loader_data,
        local_id,
    });
    let handle = H::from_raw(&*object as *const FakeObject as u64);
    FakeHandle {
        _object: object,
        handle,
    }
}

/// A non-null function pointer that is only ever compared, never called.
pub fn fake_proc(addr: usize) -> unsafe extern "system" fn() {
    assert_ne!(addr, 0);
    unsafe { std::mem::transmute::<usize, unsafe extern "system" fn()>(addr) }
}

pub fn proc_addr(f: unsafe extern "system" fn()) -> usize {
    f as usize
}

/// Address the fake next layer hands out for `op`.
pub fn instance_addr(base: usize, op: InstanceFn) -> usize {
    base + (op as usize + 1) * 0x10
}

pub fn device_addr(base: usize, op: DeviceFn) -> usize {
    base + (op as usize + 1) * 0x10
}

/// Resolves every instance entry point to a distinct address derived from `base`.
pub fn instance_resolver(base: usize) -> impl Fn(&CStr) -> vk::PFN_vkVoidFunction {
    move |name: &CStr| {
        InstanceFn::ALL
            .iter()
            .find(|op| op.name() == name)
            .map(|&op| fake_proc(instance_addr(base, op)))
    }
}

/// Resolves every device entry point except `missing` to a distinct address
/// derived from `base`.
pub fn device_resolver(base: usize, missing: &[DeviceFn]) -> impl Fn(&CStr) -> vk::PFN_vkVoidFunction {
    let missing = missing.to_vec();
    move |name: &CStr| {
        DeviceFn::ALL
            .iter()
            .find(|op| op.name() == name)
            .filter(|op| !missing.contains(op))
            .map(|&op| fake_proc(device_addr(base, op)))
    }
}
