use std::ffi::CString;

use ash::vk::PhysicalDeviceType;

use super::{apiversion::ApiVersion, cstringstuff};

pub struct PhysicalDeviceProperties {
    pub api_version: ApiVersion,
    pub device_type: PhysicalDeviceType,
    pub name: CString,
}

impl From<ash::vk::PhysicalDeviceProperties> for PhysicalDeviceProperties {
    fn from(properties: ash::vk::PhysicalDeviceProperties) -> Self {
        PhysicalDeviceProperties {
            api_version: ApiVersion::from(properties.api_version),
            device_type: properties.device_type,
            name: cstringstuff::c_char_slice_to_cstring(&properties.device_name),
        }
    }
}
