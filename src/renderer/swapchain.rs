use ash::vk::{
    ComponentMapping, ComponentSwizzle, CompositeAlphaFlagsKHR, Extent2D, Framebuffer,
    FramebufferCreateInfo, ImageAspectFlags, ImageSubresourceRange, ImageUsageFlags, ImageView,
    ImageViewCreateInfo, ImageViewType, RenderPass, SharingMode,
    SurfaceFormatKHR, SwapchainCreateInfoKHR, SwapchainKHR,
};
use log::info;
use winit::dpi::PhysicalSize;

use super::{
    device::Device,
    error::{Result, VkResultExt},
    instance::Instance,
    physical_device::SwapChainSupportDetails,
    surface::Surface,
};

pub struct SwapChain {
    pub inner: SwapchainKHR,
    pub loader: ash::extensions::khr::Swapchain,
    pub images: Vec<ash::vk::Image>,
    pub image_views: Vec<ImageView>,
    pub surface_format: SurfaceFormatKHR,
    pub extent: Extent2D,
    pub framebuffers: Vec<Framebuffer>,
    device: ash::Device,
}

impl SwapChain {
    /// Builds a swapchain sized to `framebuffer_size`, retiring `old` if given.
    pub fn new(
        instance: &Instance,
        surface: &Surface,
        device: &Device,
        framebuffer_size: PhysicalSize<u32>,
        old: Option<&SwapChain>,
    ) -> Result<Self> {
        // Capabilities change with the window, so query them fresh.
        let support = SwapChainSupportDetails::extract(surface, device.physical_device.inner)?;
        let surface_format = support.choose_format();
        let present_mode = support.choose_present_mode();
        let extent = support.choose_swap_extent(framebuffer_size);
        let image_count = support.choose_image_count();

        let mut create_info = SwapchainCreateInfoKHR::builder()
            .surface(surface.inner)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(support.surface_capabilities.current_transform)
            .composite_alpha(CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old.map_or(SwapchainKHR::null(), |old| old.inner));

        let indices = &device.physical_device.queue_family_indices;
        let graphics_family = indices.graphics()?;
        let present_family = indices.present()?;
        let queue_family_indices = [graphics_family, present_family];
        if graphics_family != present_family {
            create_info = create_info
                .image_sharing_mode(SharingMode::CONCURRENT)
                .queue_family_indices(&queue_family_indices);
        } else {
            create_info = create_info.image_sharing_mode(SharingMode::EXCLUSIVE);
        }

        let loader = ash::extensions::khr::Swapchain::new(&instance.inner, &device.inner);
        let inner = unsafe {
            loader
                .create_swapchain(&create_info, None)
                .during("vkCreateSwapchainKHR")?
        };

        // Owns the swapchain from here so early returns clean up.
        let mut swapchain = Self {
            inner,
            loader,
            images: Vec::new(),
            image_views: Vec::new(),
            surface_format,
            framebuffers: Vec::new(),
            extent,
            device: device.inner.clone(),
        };

        swapchain.images = unsafe {
            swapchain
                .loader
                .get_swapchain_images(inner)
                .during("vkGetSwapchainImagesKHR")?
        };

        for image in &swapchain.images {
            let components = ComponentMapping::builder()
                .a(ComponentSwizzle::IDENTITY)
                .r(ComponentSwizzle::IDENTITY)
                .g(ComponentSwizzle::IDENTITY)
                .b(ComponentSwizzle::IDENTITY);

            let subresource_range = ImageSubresourceRange::builder()
                .aspect_mask(ImageAspectFlags::COLOR)
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1);

            let image_view_create_info = ImageViewCreateInfo::builder()
                .image(*image)
                .view_type(ImageViewType::TYPE_2D)
                .format(surface_format.format)
                .components(*components)
                .subresource_range(*subresource_range);

            let image_view = unsafe {
                device
                    .inner
                    .create_image_view(&image_view_create_info, None)
                    .during("vkCreateImageView")?
            };

            swapchain.image_views.push(image_view);
        }

        info!(
            "Swapchain {}x{} {:?} {:?}, {} images",
            extent.width,
            extent.height,
            surface_format.format,
            present_mode,
            swapchain.images.len()
        );

        Ok(swapchain)
    }

    pub fn create_framebuffers(&mut self, render_pass: RenderPass) -> Result<()> {
        self.destroy_framebuffers();
        for image_view in &self.image_views {
            let attachments = [*image_view];
            let create_info = FramebufferCreateInfo::builder()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(self.extent.width)
                .height(self.extent.height)
                .layers(1);

            let framebuffer = unsafe {
                self.device
                    .create_framebuffer(&create_info, None)
                    .during("vkCreateFramebuffer")?
            };
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    fn destroy_framebuffers(&mut self) {
        for framebuffer in self.framebuffers.drain(..) {
            unsafe { self.device.destroy_framebuffer(framebuffer, None) };
        }
    }
}

impl Drop for SwapChain {
    fn drop(&mut self) {
        self.destroy_framebuffers();
        unsafe {
            for image_view in &self.image_views {
                self.device.destroy_image_view(*image_view, None);
            }
            self.loader.destroy_swapchain(self.inner, None);
        }
    }
}
