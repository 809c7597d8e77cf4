use ash::extensions::ext::DebugUtils;

use crate::constants::WINDOW_TITLE;
use crate::renderer::names::{VK_KHR_SWAPCHAIN, VK_LAYER_KHRONOS_VALIDATION};
use crate::renderer::utils::apiversion::ApiVersion;
use std::ffi::CString;

pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

lazy_static! {
    // INSTANCE
    pub static ref INSTANCE_APPLICATION_NAME: CString = CString::new(WINDOW_TITLE).unwrap();
    pub static ref INSTANCE_APPLICATION_VERSION: ApiVersion = ApiVersion::new(0, 0, 1, 0);
    pub static ref INSTANCE_ENGINE_NAME: CString = CString::new("Wiresphere").unwrap();
    pub static ref INSTANCE_ENGINE_VERSION: ApiVersion = ApiVersion::new(0, 0, 1, 0);
    pub static ref INSTANCE_API_VERSION: ApiVersion = ApiVersion::new(0, 1, 2, 0);

    pub static ref INSTANCE_DEBUG_LAYER_NAMES: Vec<CString> = vec![CString::from(VK_LAYER_KHRONOS_VALIDATION)];
    pub static ref INSTANCE_REQUIRED_LAYER_NAMES: Vec<CString> = vec![];
    pub static ref INSTANCE_DEBUG_EXTENSION_NAMES: Vec<CString> = vec![CString::from(DebugUtils::name())];
    pub static ref INSTANCE_REQUIRED_EXTENSION_NAMES: Vec<CString> = vec![];
    pub static ref INSTANCE_OPTIONAL_EXTENSION_NAMES: Vec<CString> = vec![];

    // PHYSICAL DEVICE
    pub static ref PHYSICAL_DEVICE_REQUIRED_EXTENSION_NAMES: Vec<CString> = vec![CString::from(VK_KHR_SWAPCHAIN)];
    pub static ref PHYSICAL_DEVICE_OPTIONAL_EXTENSION_NAMES: Vec<CString> = vec![];
}
