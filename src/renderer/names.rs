use cstr::cstr;
use std::ffi::CStr;
// --- INSTANCE
// LAYERS
pub const VK_LAYER_KHRONOS_VALIDATION: &CStr = cstr!("VK_LAYER_KHRONOS_validation");

// --- PHYSICAL DEVICE
pub const VK_KHR_SWAPCHAIN: &CStr = cstr!("VK_KHR_swapchain");

// --- SHADERS
pub const SHADER_ENTRY_POINT: &CStr = cstr!("main");
