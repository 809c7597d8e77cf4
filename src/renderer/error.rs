use std::ffi::CString;

use ash::vk;
use thiserror::Error;

use super::utils::apiversion::ApiVersion;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("{call} failed: {result}")]
    Vulkan {
        call: &'static str,
        result: vk::Result,
    },

    #[error("Vulkan API version is too low! Actual: {actual:?}, Required: {required:?}")]
    ApiVersionTooLow {
        actual: ApiVersion,
        required: ApiVersion,
    },

    #[error("required layer not supported: {0:?}")]
    MissingLayer(CString),

    #[error("required extension not supported: {0:?}")]
    MissingExtension(CString),

    #[error("no suitable GPU found")]
    NoSuitableDevice,

    #[error("no memory type matches {0:?}")]
    NoSuitableMemoryType(vk::MemoryPropertyFlags),

    #[error("shader compiler unavailable")]
    ShaderCompilerUnavailable,

    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompilation { stage: &'static str, log: String },
}

pub type Result<T> = std::result::Result<T, RendererError>;

/// Tags a raw `VkResult` with the name of the call that produced it.
pub trait VkResultExt<T> {
    fn during(self, call: &'static str) -> Result<T>;
}

impl<T> VkResultExt<T> for ash::prelude::VkResult<T> {
    fn during(self, call: &'static str) -> Result<T> {
        self.map_err(|result| RendererError::Vulkan { call, result })
    }
}
