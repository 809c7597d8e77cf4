//! Vulkan side of the demo: brings the device up, owns every GPU object and
//! records one indexed wireframe draw per frame.
//!
//! Fields of [`Renderer`] are declared so that Rust's in-order field drop
//! tears objects down before the objects they were created from.

use ash::{
    vk::{
        BufferUsageFlags, ClearColorValue, ClearValue, CommandBuffer, CommandBufferBeginInfo,
        CommandBufferResetFlags, DeviceSize, IndexType, Offset2D, PipelineBindPoint,
        PipelineStageFlags, PresentInfoKHR, Rect2D, RenderPassBeginInfo, SubmitInfo,
        SubpassContents, Viewport,
    },
    Entry,
};
use log::{debug, info};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{constants::CLEAR_COLOR, sphere::SphereMesh, transform::SceneUniforms};

use self::{
    buffer::Buffer,
    command_pool::CommandPool,
    constants::MAX_FRAMES_IN_FLIGHT,
    descriptor::{SceneDescriptorLayout, SceneDescriptors},
    device::Device,
    error::{Result, VkResultExt},
    instance::Instance,
    physical_device::PhysicalDevice,
    pipeline_graphics::GraphicsPipeline,
    shader_module::{
        ShaderCompiler, ShaderModule, ShaderStage, SPHERE_FRAGMENT_SOURCE, SPHERE_VERTEX_SOURCE,
    },
    surface::Surface,
    swapchain::SwapChain,
    sync::FrameSync,
    utils::debug::DebugMessenger,
};

pub use self::error::RendererError;

mod buffer;
mod command_pool;
mod constants;
mod descriptor;
mod device;
pub mod error;
mod instance;
mod names;
mod physical_device;
mod pipeline_graphics;
mod shader_module;
mod surface;
mod swapchain;
mod sync;
mod utils;

pub struct Renderer {
    frames: Vec<FrameSync>,
    command_buffers: Vec<CommandBuffer>,
    command_pool: CommandPool,
    descriptors: SceneDescriptors,
    uniform_buffers: Vec<Buffer>,
    index_buffer: Buffer,
    index_count: u32,
    vertex_buffer: Buffer,
    pipeline: GraphicsPipeline,
    _descriptor_layout: SceneDescriptorLayout,
    swapchain: SwapChain,
    device: Device,
    surface: Surface,
    _debug_messenger: Option<DebugMessenger>,
    instance: Instance,
    _entry: Entry,

    current_frame: usize,
    framebuffer_resized: bool,
}

impl Renderer {
    pub fn new(window: &Window, mesh: &SphereMesh) -> Result<Self> {
        let entry = Entry::linked();
        let instance = Instance::new(&entry, window)?;

        let debug_messenger = if cfg!(debug_assertions) && instance.has_extension_debug_utils() {
            Some(DebugMessenger::new(&entry, &instance.inner)?)
        } else {
            None
        };

        let surface = Surface::new(&entry, &instance, window)?;
        let physical_device = PhysicalDevice::pick(&instance, &surface)?;
        let device = Device::new(&instance.inner, physical_device)?;

        let mut swapchain = SwapChain::new(&instance, &surface, &device, window.inner_size(), None)?;

        // Compiled once; the modules only live until the pipeline is built.
        let compiler = ShaderCompiler::new()?;
        let shaders = [
            ShaderModule::compile(
                &device,
                &compiler,
                ShaderStage::Vertex,
                SPHERE_VERTEX_SOURCE,
                "sphere.vert",
            )?,
            ShaderModule::compile(
                &device,
                &compiler,
                ShaderStage::Fragment,
                SPHERE_FRAGMENT_SOURCE,
                "sphere.frag",
            )?,
        ];
        let descriptor_layout = SceneDescriptorLayout::new(&device)?;
        let pipeline = GraphicsPipeline::new(
            &device,
            swapchain.surface_format.format,
            &descriptor_layout,
            &shaders,
        )?;
        drop(shaders);
        swapchain.create_framebuffers(pipeline.render_pass)?;

        let command_pool = CommandPool::new(&device)?;
        let vertex_buffer = Buffer::with_data(
            &device,
            &command_pool,
            BufferUsageFlags::VERTEX_BUFFER,
            mesh.vertices(),
        )?;
        let index_buffer = Buffer::with_data(
            &device,
            &command_pool,
            BufferUsageFlags::INDEX_BUFFER,
            mesh.indices(),
        )?;
        info!(
            "Sphere uploaded: {} vertices ({} floats), {} indices",
            mesh.vertex_count(),
            mesh.scalar_count(),
            mesh.index_count()
        );

        let uniform_buffers = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| {
                Buffer::mapped(
                    &device,
                    std::mem::size_of::<SceneUniforms>() as DeviceSize,
                    BufferUsageFlags::UNIFORM_BUFFER,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let descriptors = SceneDescriptors::new(&device, &descriptor_layout, &uniform_buffers)?;

        let command_buffers = command_pool.allocate(MAX_FRAMES_IN_FLIGHT as u32)?;
        let frames = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| FrameSync::new(&device))
            .collect::<Result<Vec<_>>>()?;

        Ok(Renderer {
            frames,
            command_buffers,
            command_pool,
            descriptors,
            uniform_buffers,
            index_buffer,
            index_count: mesh.index_count() as u32,
            vertex_buffer,
            pipeline,
            _descriptor_layout: descriptor_layout,
            swapchain,
            device,
            surface,
            _debug_messenger: debug_messenger,
            instance,
            _entry: entry,
            current_frame: 0,
            framebuffer_resized: false,
        })
    }

    /// Framebuffer size changed; the swapchain is rebuilt before the next frame.
    pub fn framebuffer_resized(&mut self, size: PhysicalSize<u32>) {
        debug!("Framebuffer resized to {}x{}", size.width, size.height);
        self.framebuffer_resized = true;
    }

    pub fn draw_frame(&mut self, window: &Window, uniforms: &SceneUniforms) -> Result<()> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if self.framebuffer_resized {
            self.recreate_swapchain(size)?;
        }

        let frame = &self.frames[self.current_frame];
        frame.wait()?;

        let acquired = unsafe {
            self.swapchain.loader.acquire_next_image(
                self.swapchain.inner,
                u64::MAX,
                frame.image_available,
                ash::vk::Fence::null(),
            )
        };
        let image_index = match acquired {
            Ok((image_index, _)) => image_index,
            Err(ash::vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                return self.recreate_swapchain(size);
            }
            Err(result) => {
                return Err(RendererError::Vulkan {
                    call: "vkAcquireNextImageKHR",
                    result,
                })
            }
        };

        // Only reset once work is certain to be submitted, or the next wait hangs.
        frame.reset()?;
        self.uniform_buffers[self.current_frame].write(bytemuck::bytes_of(uniforms));

        let command_buffer = self.command_buffers[self.current_frame];
        self.record(command_buffer, image_index as usize)?;

        let frame = &self.frames[self.current_frame];
        let wait_semaphores = [frame.image_available];
        let wait_stages = [PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_buffer];
        let signal_semaphores = [frame.render_finished];
        let submit_info = SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .inner
                .queue_submit(
                    self.device.graphics_queue,
                    &[submit_info.build()],
                    frame.in_flight,
                )
                .during("vkQueueSubmit")?;
        }

        let swapchains = [self.swapchain.inner];
        let image_indices = [image_index];
        let present_info = PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let presented = unsafe {
            self.swapchain
                .loader
                .queue_present(self.device.present_queue, &present_info)
        };
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;

        match presented {
            Ok(false) if !self.framebuffer_resized => Ok(()),
            Ok(_) | Err(ash::vk::Result::ERROR_OUT_OF_DATE_KHR) => self.recreate_swapchain(size),
            Err(result) => Err(RendererError::Vulkan {
                call: "vkQueuePresentKHR",
                result,
            }),
        }
    }

    fn record(&self, command_buffer: CommandBuffer, image_index: usize) -> Result<()> {
        let device = &self.device.inner;
        let extent = self.swapchain.extent;

        let clear_values = [ClearValue {
            color: ClearColorValue {
                float32: CLEAR_COLOR,
            },
        }];
        let render_area = Rect2D {
            offset: Offset2D { x: 0, y: 0 },
            extent,
        };
        let render_pass_begin = RenderPassBeginInfo::builder()
            .render_pass(self.pipeline.render_pass)
            .framebuffer(self.swapchain.framebuffers[image_index])
            .render_area(render_area)
            .clear_values(&clear_values);
        let viewport = Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };

        unsafe {
            device
                .reset_command_buffer(command_buffer, CommandBufferResetFlags::empty())
                .during("vkResetCommandBuffer")?;
            device
                .begin_command_buffer(command_buffer, &CommandBufferBeginInfo::builder())
                .during("vkBeginCommandBuffer")?;

            device.cmd_begin_render_pass(command_buffer, &render_pass_begin, SubpassContents::INLINE);
            device.cmd_bind_pipeline(
                command_buffer,
                PipelineBindPoint::GRAPHICS,
                self.pipeline.inner,
            );
            device.cmd_set_viewport(command_buffer, 0, &[viewport]);
            device.cmd_set_scissor(command_buffer, 0, &[render_area]);
            device.cmd_bind_vertex_buffers(command_buffer, 0, &[self.vertex_buffer.inner], &[0]);
            device.cmd_bind_index_buffer(command_buffer, self.index_buffer.inner, 0, IndexType::UINT32);
            device.cmd_bind_descriptor_sets(
                command_buffer,
                PipelineBindPoint::GRAPHICS,
                self.pipeline.pipeline_layout,
                0,
                &[self.descriptors.sets[self.current_frame]],
                &[],
            );
            device.cmd_draw_indexed(command_buffer, self.index_count, 1, 0, 0, 0);
            device.cmd_end_render_pass(command_buffer);

            device
                .end_command_buffer(command_buffer)
                .during("vkEndCommandBuffer")
        }
    }

    fn recreate_swapchain(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        self.framebuffer_resized = false;
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        self.device.wait_idle()?;
        let mut swapchain = SwapChain::new(
            &self.instance,
            &self.surface,
            &self.device,
            size,
            Some(&self.swapchain),
        )?;
        swapchain.create_framebuffers(self.pipeline.render_pass)?;
        self.swapchain = swapchain;
        debug!(
            "Swapchain recreated at {}x{}",
            self.swapchain.extent.width, self.swapchain.extent.height
        );
        Ok(())
    }

    /// Blocks until the GPU has finished every submitted frame.
    pub fn wait_idle(&self) -> Result<()> {
        self.device.wait_idle()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Nothing may still be executing when the fields below are destroyed.
        if let Err(err) = self.device.wait_idle() {
            log::error!("Failed to idle the device before teardown: {}", err);
        }
        info!("Renderer released");
    }
}
