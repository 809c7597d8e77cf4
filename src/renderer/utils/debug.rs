use std::ffi::{c_void, CStr};

use ash::{
    extensions::ext::DebugUtils,
    vk::{
        self, DebugUtilsMessageSeverityFlagsEXT as Severity,
        DebugUtilsMessageTypeFlagsEXT as MessageType, DebugUtilsMessengerCallbackDataEXT,
        DebugUtilsMessengerCreateInfoEXT, DebugUtilsMessengerCreateInfoEXTBuilder,
        DebugUtilsMessengerEXT,
    },
    Entry, Instance,
};
use log::{info, Level, LevelFilter};

use crate::renderer::error::{Result, VkResultExt};

/// Log level a validation message of `severity` is reported at.
fn level_for(severity: Severity) -> Level {
    match severity {
        Severity::ERROR => Level::Error,
        Severity::WARNING => Level::Warn,
        Severity::INFO => Level::Debug,
        Severity::VERBOSE => Level::Trace,
        _ => Level::Error,
    }
}

fn type_prefix(message_type: MessageType) -> &'static str {
    match message_type {
        MessageType::GENERAL => "general",
        MessageType::PERFORMANCE => "performance",
        MessageType::VALIDATION => "validation",
        _ => "unknown",
    }
}

/// Severities worth asking the driver for under the current `max_level`.
/// Errors are always requested; the mask may not be empty.
fn severities_for(max_level: LevelFilter) -> Severity {
    [
        Severity::WARNING,
        Severity::INFO,
        Severity::VERBOSE,
    ]
    .into_iter()
    .filter(|&severity| level_for(severity) <= max_level)
    .fold(Severity::ERROR, |mask, severity| mask | severity)
}

unsafe extern "system" fn debug_callback(
    severity: Severity,
    message_type: MessageType,
    callback_data: *const DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();
    log::log!(
        target: "vulkan",
        level_for(severity),
        "[{}] {}",
        type_prefix(message_type),
        message
    );
    vk::FALSE
}

/// Routes `VK_EXT_debug_utils` messages into the `log` facade under the
/// `vulkan` target.
pub struct DebugMessenger {
    pub loader: DebugUtils,
    pub messenger: DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    pub fn new(entry: &Entry, instance: &Instance) -> Result<Self> {
        let loader = DebugUtils::new(entry, instance);
        let create_info = DebugMessenger::get_create_info();
        let messenger = unsafe {
            loader
                .create_debug_utils_messenger(&create_info, None)
                .during("vkCreateDebugUtilsMessengerEXT")?
        };
        info!(
            "Validation messages routed to the logger up to {}",
            log::max_level()
        );

        Ok(Self { loader, messenger })
    }

    pub fn get_create_info() -> DebugUtilsMessengerCreateInfoEXTBuilder<'static> {
        DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(severities_for(log::max_level()))
            .message_type(MessageType::GENERAL | MessageType::PERFORMANCE | MessageType::VALIDATION)
            .pfn_user_callback(Some(debug_callback))
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        unsafe {
            self.loader
                .destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_info_is_demoted_to_debug() {
        assert_eq!(level_for(Severity::INFO), Level::Debug);
        assert_eq!(level_for(Severity::VERBOSE), Level::Trace);
        assert_eq!(level_for(Severity::ERROR), Level::Error);
    }

    #[test]
    fn severity_mask_follows_log_level() {
        assert_eq!(
            severities_for(LevelFilter::Warn),
            Severity::ERROR | Severity::WARNING
        );
        assert_eq!(
            severities_for(LevelFilter::Trace),
            Severity::ERROR | Severity::WARNING | Severity::INFO | Severity::VERBOSE
        );
        assert_eq!(severities_for(LevelFilter::Off), Severity::ERROR);
    }
}
