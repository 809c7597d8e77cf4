use std::collections::HashSet;

use ash::vk::{
    ColorSpaceKHR, Extent2D, Format, MemoryPropertyFlags, PhysicalDeviceFeatures,
    PhysicalDeviceMemoryProperties, PhysicalDeviceType, PresentModeKHR, QueueFamilyProperties,
    QueueFlags, SurfaceCapabilitiesKHR, SurfaceFormatKHR,
};
use log::{debug, info};
use winit::dpi::PhysicalSize;

use super::{
    constants::{
        INSTANCE_API_VERSION, PHYSICAL_DEVICE_OPTIONAL_EXTENSION_NAMES,
        PHYSICAL_DEVICE_REQUIRED_EXTENSION_NAMES,
    },
    error::{RendererError, Result, VkResultExt},
    instance::Instance,
    surface::Surface,
    utils::{extension::Extension, properties::PhysicalDeviceProperties},
};

pub struct PhysicalDevice {
    pub inner: ash::vk::PhysicalDevice,
    pub extensions: Vec<Extension>,
    pub properties: PhysicalDeviceProperties,
    pub memory_properties: PhysicalDeviceMemoryProperties,
    pub queue_family_indices: QueueFamiliesIndices,
}

impl PhysicalDevice {
    pub fn pick(instance: &Instance, surface: &Surface) -> Result<Self> {
        let available = unsafe {
            instance
                .inner
                .enumerate_physical_devices()
                .during("vkEnumeratePhysicalDevices")?
        };

        let mut best: Option<(ash::vk::PhysicalDevice, u32)> = None;
        for candidate in available {
            if let Some(score) = PhysicalDevice::rate(instance, &candidate, surface)? {
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((candidate, score));
                }
            }
        }
        let inner = best.ok_or(RendererError::NoSuitableDevice)?.0;

        let extensions = Extension::convert_vec(unsafe {
            &instance
                .inner
                .enumerate_device_extension_properties(inner)
                .during("vkEnumerateDeviceExtensionProperties")?
        });
        let properties: PhysicalDeviceProperties =
            unsafe { instance.inner.get_physical_device_properties(inner).into() };
        let memory_properties =
            unsafe { instance.inner.get_physical_device_memory_properties(inner) };
        let queue_family_properties = unsafe {
            instance
                .inner
                .get_physical_device_queue_family_properties(inner)
        };
        let queue_family_indices =
            QueueFamiliesIndices::extract(surface, &inner, &queue_family_properties)?;

        info!(
            "Using GPU {:?} ({:?}, Vulkan {})",
            properties.name, properties.device_type, properties.api_version
        );

        Ok(PhysicalDevice {
            inner,
            extensions,
            properties,
            memory_properties,
            queue_family_indices,
        })
    }

    /// `None` when the device cannot draw the sphere at all.
    fn rate(
        instance: &Instance,
        vkphysical_device: &ash::vk::PhysicalDevice,
        surface: &Surface,
    ) -> Result<Option<u32>> {
        let mut score = 0;

        unsafe {
            let properties: PhysicalDeviceProperties = instance
                .inner
                .get_physical_device_properties(*vkphysical_device)
                .into();

            let extensions = Extension::convert_vec(
                &instance
                    .inner
                    .enumerate_device_extension_properties(*vkphysical_device)
                    .during("vkEnumerateDeviceExtensionProperties")?,
            );
            for required in &*PHYSICAL_DEVICE_REQUIRED_EXTENSION_NAMES {
                if !extensions.iter().any(|e| &e.name == required) {
                    debug!("{:?} lacks extension {:?}", properties.name, required);
                    return Ok(None);
                }
            }
            score += extensions
                .iter()
                .filter(|e| PHYSICAL_DEVICE_OPTIONAL_EXTENSION_NAMES.contains(&e.name))
                .count() as u32
                * 10;

            // Wireframe rasterisation needs PolygonMode::LINE.
            let features = instance
                .inner
                .get_physical_device_features(*vkphysical_device);
            if features.fill_mode_non_solid == 0 {
                debug!("{:?} lacks fillModeNonSolid", properties.name);
                return Ok(None);
            }

            let queue_family_properties = instance
                .inner
                .get_physical_device_queue_family_properties(*vkphysical_device);
            let queue_family_indices =
                QueueFamiliesIndices::extract(surface, vkphysical_device, &queue_family_properties)?;

            if queue_family_indices.graphics_family.is_none()
                || queue_family_indices.present_family.is_none()
            {
                debug!("{:?} has no graphics/present queue", properties.name);
                return Ok(None);
            }

            if !SwapChainSupportDetails::extract(surface, *vkphysical_device)?.is_suitable() {
                debug!("{:?} has no usable swapchain", properties.name);
                return Ok(None);
            }

            if properties.api_version < INSTANCE_API_VERSION.patchless() {
                debug!(
                    "{:?} only supports Vulkan {}",
                    properties.name, properties.api_version
                );
                return Ok(None);
            }

            match properties.device_type {
                PhysicalDeviceType::DISCRETE_GPU => score += 1000,
                PhysicalDeviceType::INTEGRATED_GPU => score += 500,
                PhysicalDeviceType::VIRTUAL_GPU => score += 500,
                PhysicalDeviceType::OTHER => score += 300,
                _ => {}
            }
        }

        Ok(Some(score))
    }

    /// Features the renderer turns on; the device was rated on them.
    pub fn required_features() -> PhysicalDeviceFeatures {
        PhysicalDeviceFeatures::builder()
            .fill_mode_non_solid(true)
            .build()
    }

    pub fn find_memory_type(&self, type_bits: u32, flags: MemoryPropertyFlags) -> Result<u32> {
        find_memory_type(&self.memory_properties, type_bits, flags)
            .ok_or(RendererError::NoSuitableMemoryType(flags))
    }
}

fn find_memory_type(
    memory_properties: &PhysicalDeviceMemoryProperties,
    type_bits: u32,
    flags: MemoryPropertyFlags,
) -> Option<u32> {
    (0..memory_properties.memory_type_count).find(|&i| {
        type_bits & (1 << i) != 0
            && memory_properties.memory_types[i as usize]
                .property_flags
                .contains(flags)
    })
}

#[derive(Debug)]
pub struct QueueFamiliesIndices {
    pub graphics_family: Option<u32>,
    pub present_family: Option<u32>,
}

impl QueueFamiliesIndices {
    pub fn extract(
        surface: &Surface,
        vkphysical_device: &ash::vk::PhysicalDevice,
        properties: &[QueueFamilyProperties],
    ) -> Result<Self> {
        let mut graphics_family = None;
        let mut present_family = None;

        for (index, property) in properties.iter().enumerate() {
            if property.queue_flags.contains(QueueFlags::GRAPHICS) && graphics_family.is_none() {
                graphics_family = Some(index as u32);
            }

            if present_family.is_none()
                && unsafe {
                    surface
                        .loader
                        .get_physical_device_surface_support(
                            *vkphysical_device,
                            index as u32,
                            surface.inner,
                        )
                        .during("vkGetPhysicalDeviceSurfaceSupportKHR")?
                }
            {
                present_family = Some(index as u32);
            }
        }

        Ok(Self {
            graphics_family,
            present_family,
        })
    }

    pub fn graphics(&self) -> Result<u32> {
        self.graphics_family.ok_or(RendererError::NoSuitableDevice)
    }

    pub fn present(&self) -> Result<u32> {
        self.present_family.ok_or(RendererError::NoSuitableDevice)
    }

    pub fn get_unique_indices(&self) -> Vec<u32> {
        let mut result: Vec<u32> = self
            .graphics_family
            .into_iter()
            .chain(self.present_family)
            .collect();
        let mut unique = HashSet::new();
        result.retain(|i| unique.insert(*i));
        result
    }
}

pub struct SwapChainSupportDetails {
    pub surface_capabilities: SurfaceCapabilitiesKHR,
    pub formats: Vec<SurfaceFormatKHR>,
    pub present_modes: Vec<PresentModeKHR>,
}

impl SwapChainSupportDetails {
    pub fn extract(
        surface: &Surface,
        vkphysical_device: ash::vk::PhysicalDevice,
    ) -> Result<Self> {
        unsafe {
            let surface_capabilities = surface
                .loader
                .get_physical_device_surface_capabilities(vkphysical_device, surface.inner)
                .during("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")?;
            let formats = surface
                .loader
                .get_physical_device_surface_formats(vkphysical_device, surface.inner)
                .during("vkGetPhysicalDeviceSurfaceFormatsKHR")?;
            let present_modes = surface
                .loader
                .get_physical_device_surface_present_modes(vkphysical_device, surface.inner)
                .during("vkGetPhysicalDeviceSurfacePresentModesKHR")?;

            Ok(Self {
                surface_capabilities,
                formats,
                present_modes,
            })
        }
    }

    pub fn is_suitable(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }

    pub fn choose_format(&self) -> SurfaceFormatKHR {
        for available in &self.formats {
            if available.format == Format::B8G8R8A8_SRGB
                && available.color_space == ColorSpaceKHR::SRGB_NONLINEAR
            {
                return *available;
            }
        }
        self.formats[0]
    }

    pub fn choose_present_mode(&self) -> PresentModeKHR {
        for available in &self.present_modes {
            if *available == PresentModeKHR::MAILBOX {
                return *available;
            }
        }
        PresentModeKHR::FIFO
    }

    pub fn choose_swap_extent(&self, framebuffer_size: PhysicalSize<u32>) -> Extent2D {
        if self.surface_capabilities.current_extent.width != u32::MAX {
            return self.surface_capabilities.current_extent;
        }

        Extent2D {
            width: framebuffer_size.width.clamp(
                self.surface_capabilities.min_image_extent.width,
                self.surface_capabilities.max_image_extent.width,
            ),
            height: framebuffer_size.height.clamp(
                self.surface_capabilities.min_image_extent.height,
                self.surface_capabilities.max_image_extent.height,
            ),
        }
    }

    pub fn choose_image_count(&self) -> u32 {
        let capabilities = &self.surface_capabilities;
        let image_count = capabilities.min_image_count + 1;
        if capabilities.max_image_count > 0 && image_count > capabilities.max_image_count {
            capabilities.max_image_count
        } else {
            image_count
        }
    }
}

#[cfg(test)]
mod tests {
    use ash::vk::{MemoryHeap, MemoryType};

    use super::*;

    fn details(
        formats: Vec<SurfaceFormatKHR>,
        present_modes: Vec<PresentModeKHR>,
    ) -> SwapChainSupportDetails {
        SwapChainSupportDetails {
            surface_capabilities: SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 3,
                current_extent: Extent2D {
                    width: u32::MAX,
                    height: u32::MAX,
                },
                min_image_extent: Extent2D {
                    width: 1,
                    height: 1,
                },
                max_image_extent: Extent2D {
                    width: 1024,
                    height: 512,
                },
                ..Default::default()
            },
            formats,
            present_modes,
        }
    }

    fn format(format: Format, color_space: ColorSpaceKHR) -> SurfaceFormatKHR {
        SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn prefers_srgb_bgra() {
        let preferred = format(Format::B8G8R8A8_SRGB, ColorSpaceKHR::SRGB_NONLINEAR);
        let d = details(
            vec![
                format(Format::R8G8B8A8_UNORM, ColorSpaceKHR::SRGB_NONLINEAR),
                preferred,
            ],
            vec![PresentModeKHR::FIFO],
        );

        let chosen = d.choose_format();
        assert_eq!(chosen.format, preferred.format);
        assert_eq!(chosen.color_space, preferred.color_space);
    }

    #[test]
    fn falls_back_to_first_format() {
        let first = format(Format::R8G8B8A8_UNORM, ColorSpaceKHR::SRGB_NONLINEAR);
        let d = details(
            vec![
                first,
                format(Format::B8G8R8A8_SRGB, ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
            ],
            vec![PresentModeKHR::FIFO],
        );

        let chosen = d.choose_format();
        assert_eq!(chosen.format, first.format);
        assert_eq!(chosen.color_space, first.color_space);
    }

    #[test]
    fn prefers_mailbox_then_fifo() {
        let first = format(Format::B8G8R8A8_SRGB, ColorSpaceKHR::SRGB_NONLINEAR);
        let with_mailbox = details(
            vec![first],
            vec![PresentModeKHR::IMMEDIATE, PresentModeKHR::MAILBOX],
        );
        let without = details(vec![first], vec![PresentModeKHR::IMMEDIATE]);

        assert_eq!(with_mailbox.choose_present_mode(), PresentModeKHR::MAILBOX);
        assert_eq!(without.choose_present_mode(), PresentModeKHR::FIFO);
    }

    #[test]
    fn extent_clamps_to_surface_limits() {
        let d = details(vec![], vec![]);

        assert_eq!(
            d.choose_swap_extent(PhysicalSize::new(800, 600)),
            Extent2D {
                width: 800,
                height: 512
            }
        );
        assert_eq!(
            d.choose_swap_extent(PhysicalSize::new(0, 0)),
            Extent2D {
                width: 1,
                height: 1
            }
        );
        assert!(!d.is_suitable());
    }

    #[test]
    fn fixed_surface_extent_wins() {
        let mut d = details(vec![], vec![]);
        d.surface_capabilities.current_extent = Extent2D {
            width: 640,
            height: 480,
        };

        assert_eq!(
            d.choose_swap_extent(PhysicalSize::new(800, 600)),
            Extent2D {
                width: 640,
                height: 480
            }
        );
    }

    #[test]
    fn image_count_respects_maximum() {
        let mut d = details(vec![], vec![]);
        assert_eq!(d.choose_image_count(), 3);

        d.surface_capabilities.min_image_count = 3;
        assert_eq!(d.choose_image_count(), 3);

        d.surface_capabilities.max_image_count = 0;
        assert_eq!(d.choose_image_count(), 4);
    }

    #[test]
    fn memory_type_matches_bits_and_flags() {
        let mut memory = PhysicalDeviceMemoryProperties {
            memory_type_count: 3,
            memory_heap_count: 1,
            ..Default::default()
        };
        memory.memory_heaps[0] = MemoryHeap::default();
        memory.memory_types[0] = MemoryType {
            property_flags: MemoryPropertyFlags::DEVICE_LOCAL,
            heap_index: 0,
        };
        memory.memory_types[1] = MemoryType {
            property_flags: MemoryPropertyFlags::HOST_VISIBLE,
            heap_index: 0,
        };
        memory.memory_types[2] = MemoryType {
            property_flags: MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT,
            heap_index: 0,
        };

        let host = MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT;
        assert_eq!(find_memory_type(&memory, 0b111, host), Some(2));
        assert_eq!(find_memory_type(&memory, 0b011, host), None);
        assert_eq!(
            find_memory_type(&memory, 0b111, MemoryPropertyFlags::DEVICE_LOCAL),
            Some(0)
        );
        assert_eq!(
            find_memory_type(&memory, 0b110, MemoryPropertyFlags::DEVICE_LOCAL),
            None
        );
    }
}
