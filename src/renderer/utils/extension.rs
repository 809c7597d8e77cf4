use std::ffi::CString;

use ash::vk::ExtensionProperties;

use crate::renderer::utils::cstringstuff;

#[derive(Clone, Debug)]
pub struct Extension {
    pub name: CString,
    pub spec_version: u32,
}

impl Extension {
    pub fn from_properties(properties: &ExtensionProperties) -> Self {
        let name = cstringstuff::c_char_slice_to_cstring(&properties.extension_name);

        Extension {
            name,
            spec_version: properties.spec_version,
        }
    }

    pub fn convert_vec(properties: &[ExtensionProperties]) -> Vec<Extension> {
        properties.iter().map(Extension::from_properties).collect()
    }
}
