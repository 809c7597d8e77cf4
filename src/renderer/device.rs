use std::os::raw::c_char;

use ash::{
    vk::{DeviceCreateInfo, DeviceQueueCreateInfo, Queue},
    Instance,
};
use log::info;

use super::{
    constants::{
        PHYSICAL_DEVICE_OPTIONAL_EXTENSION_NAMES, PHYSICAL_DEVICE_REQUIRED_EXTENSION_NAMES,
    },
    error::{Result, VkResultExt},
    physical_device::PhysicalDevice,
    utils::extension::Extension,
};

pub struct Device {
    pub inner: ash::Device,
    pub physical_device: PhysicalDevice,
    pub graphics_queue: Queue,
    pub present_queue: Queue,
}

impl Device {
    pub fn new(instance: &Instance, physical_device: PhysicalDevice) -> Result<Self> {
        let queue_priorities = [1.0];
        let queue_create_infos: Vec<DeviceQueueCreateInfo> = physical_device
            .queue_family_indices
            .get_unique_indices()
            .into_iter()
            .map(|unique| {
                DeviceQueueCreateInfo::builder()
                    .queue_family_index(unique)
                    .queue_priorities(&queue_priorities)
                    .build()
            })
            .collect();

        let enabled_extensions: Vec<Extension> = physical_device
            .extensions
            .iter()
            .filter(|x| {
                PHYSICAL_DEVICE_REQUIRED_EXTENSION_NAMES.contains(&x.name)
                    || PHYSICAL_DEVICE_OPTIONAL_EXTENSION_NAMES.contains(&x.name)
            })
            .cloned()
            .collect();

        let enabled_extensions_names_raw: Vec<*const c_char> =
            enabled_extensions.iter().map(|x| x.name.as_ptr()).collect();

        let enabled_features = PhysicalDevice::required_features();

        let device_create_info = DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&enabled_extensions_names_raw)
            .enabled_features(&enabled_features);

        let inner = unsafe {
            instance
                .create_device(physical_device.inner, &device_create_info, None)
                .during("vkCreateDevice")?
        };

        let graphics_family = physical_device.queue_family_indices.graphics()?;
        let present_family = physical_device.queue_family_indices.present()?;
        let graphics_queue = unsafe { inner.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { inner.get_device_queue(present_family, 0) };

        info!(
            "Device Extensions used: {:?}",
            enabled_extensions
                .iter()
                .map(|x| &x.name)
                .collect::<Vec<_>>()
        );
        info!(
            "Queue families: graphics {}, present {}",
            graphics_family, present_family
        );

        Ok(Self {
            inner,
            physical_device,
            graphics_queue,
            present_queue,
        })
    }

    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.inner.device_wait_idle().during("vkDeviceWaitIdle") }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe { self.inner.destroy_device(None) };
    }
}
