use std::{collections::HashSet, ffi::CStr, os::raw::c_char};

use ash::{
    extensions::ext::DebugUtils,
    vk::{ApplicationInfo, InstanceCreateInfo},
    Entry,
};
use log::info;
use winit::window::Window;

use crate::renderer::{
    constants::{
        INSTANCE_DEBUG_EXTENSION_NAMES, INSTANCE_DEBUG_LAYER_NAMES,
        INSTANCE_OPTIONAL_EXTENSION_NAMES, INSTANCE_REQUIRED_EXTENSION_NAMES,
        INSTANCE_REQUIRED_LAYER_NAMES,
    },
    error::{RendererError, Result, VkResultExt},
    utils::extension::Extension,
};

use super::{
    constants::{
        INSTANCE_API_VERSION, INSTANCE_APPLICATION_NAME, INSTANCE_APPLICATION_VERSION,
        INSTANCE_ENGINE_NAME, INSTANCE_ENGINE_VERSION,
    },
    utils::{apiversion::ApiVersion, debug::DebugMessenger, layer::Layer},
};

pub struct Instance {
    pub inner: ash::Instance,
    pub extensions: Vec<Extension>,
}

impl Instance {
    pub fn new(entry: &Entry, window: &Window) -> Result<Self> {
        let version = match entry
            .try_enumerate_instance_version()
            .during("vkEnumerateInstanceVersion")?
        {
            Some(version) => ApiVersion::from(version),
            None => ApiVersion::new(0, 1, 0, 0),
        };

        if version < INSTANCE_API_VERSION.patchless() {
            return Err(RendererError::ApiVersionTooLow {
                actual: version,
                required: *INSTANCE_API_VERSION,
            });
        }

        let layers: Vec<Layer> = Layer::convert_vec(
            &entry
                .enumerate_instance_layer_properties()
                .during("vkEnumerateInstanceLayerProperties")?,
        )
        .into_iter()
        .filter(|l| {
            let is_debug = cfg!(debug_assertions) && INSTANCE_DEBUG_LAYER_NAMES.contains(&l.name);
            is_debug || INSTANCE_REQUIRED_LAYER_NAMES.contains(&l.name)
        })
        .collect();

        let mut extensions: Vec<Extension> = Extension::convert_vec(
            &entry
                .enumerate_instance_extension_properties(None)
                .during("vkEnumerateInstanceExtensionProperties")?,
        );
        for layer in &layers {
            extensions.extend(Extension::convert_vec(
                &entry
                    .enumerate_instance_extension_properties(Some(layer.name.as_c_str()))
                    .during("vkEnumerateInstanceExtensionProperties")?,
            ));
        }

        extensions = extensions
            .into_iter()
            .filter(|e| {
                let is_debug =
                    cfg!(debug_assertions) && INSTANCE_DEBUG_EXTENSION_NAMES.contains(&e.name);
                INSTANCE_REQUIRED_EXTENSION_NAMES.contains(&e.name)
                    || INSTANCE_OPTIONAL_EXTENSION_NAMES.contains(&e.name)
                    || is_debug
            })
            .collect();
        // The same extension may be reported by the loader and by a layer.
        let mut unique = HashSet::new();
        extensions.retain(|e| unique.insert(e.name.clone()));

        for required in &*INSTANCE_REQUIRED_LAYER_NAMES {
            if !layers.iter().any(|layer| layer.name == *required) {
                return Err(RendererError::MissingLayer(required.clone()));
            }
        }

        for required in &*INSTANCE_REQUIRED_EXTENSION_NAMES {
            if !extensions.iter().any(|extension| extension.name == *required) {
                return Err(RendererError::MissingExtension(required.clone()));
            }
        }

        let application_info = ApplicationInfo::builder()
            .application_name(&INSTANCE_APPLICATION_NAME)
            .application_version(INSTANCE_APPLICATION_VERSION.u32())
            .engine_name(&INSTANCE_ENGINE_NAME)
            .engine_version(INSTANCE_ENGINE_VERSION.u32())
            .api_version(INSTANCE_API_VERSION.u32_patchless());

        let layer_names_raw: Vec<*const c_char> =
            layers.iter().map(|l| l.name.as_c_str().as_ptr()).collect();

        let mut extension_names_raw: Vec<*const c_char> = extensions
            .iter()
            .map(|l| l.name.as_c_str().as_ptr())
            .collect();
        extension_names_raw.extend(
            ash_window::enumerate_required_extensions(window)
                .during("ash_window::enumerate_required_extensions")?,
        );

        let mut create_info = InstanceCreateInfo::builder()
            .application_info(&application_info)
            .enabled_layer_names(&layer_names_raw)
            .enabled_extension_names(&extension_names_raw);

        // Also covers messages emitted by vkCreateInstance/vkDestroyInstance.
        let mut instance_debug_create_info;
        if cfg!(debug_assertions)
            && extensions
                .iter()
                .any(|x| (x.name).as_c_str() == DebugUtils::name())
        {
            instance_debug_create_info = DebugMessenger::get_create_info();
            create_info = create_info.push_next(&mut instance_debug_create_info);
        }

        let inner = unsafe {
            entry
                .create_instance(&create_info, None)
                .during("vkCreateInstance")?
        };

        info!("Vulkan instance {} created", version);
        for layer in &layers {
            info!(
                "INSTANCE LAYER USED: {:?} (spec {}) {:?}",
                layer.name, layer.spec_version, layer.description
            );
        }
        for extension in &extensions {
            info!(
                "INSTANCE EXTENSION USED: {:?} (rev {})",
                extension.name, extension.spec_version
            );
        }

        Ok(Instance { inner, extensions })
    }

    pub fn has_extension_debug_utils(&self) -> bool {
        self.has_extension(DebugUtils::name())
    }

    pub fn has_extension(&self, name: &CStr) -> bool {
        self.extensions.iter().any(|x| (x.name).as_c_str() == name)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            self.inner.destroy_instance(None);
        }
    }
}
