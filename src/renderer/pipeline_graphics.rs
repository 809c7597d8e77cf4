use std::mem::size_of;

use ash::vk::{
    AccessFlags, AttachmentDescription, AttachmentLoadOp, AttachmentReference, AttachmentStoreOp,
    ColorComponentFlags, CullModeFlags, DynamicState, Format, FrontFace,
    GraphicsPipelineCreateInfo, ImageLayout, PipelineBindPoint, PipelineCache,
    PipelineColorBlendAttachmentState, PipelineColorBlendStateCreateInfo,
    PipelineDynamicStateCreateInfo, PipelineInputAssemblyStateCreateInfo, PipelineLayout,
    PipelineLayoutCreateInfo, PipelineMultisampleStateCreateInfo,
    PipelineRasterizationStateCreateInfo, PipelineShaderStageCreateInfo, PipelineStageFlags,
    PipelineVertexInputStateCreateInfo, PipelineViewportStateCreateInfo, PolygonMode,
    PrimitiveTopology, RenderPass, RenderPassCreateInfo, SampleCountFlags, SubpassDependency,
    SubpassDescription, VertexInputAttributeDescription, VertexInputBindingDescription,
    VertexInputRate,
};
use log::info;

use super::{
    descriptor::SceneDescriptorLayout,
    device::Device,
    error::{Result, VkResultExt},
    names::SHADER_ENTRY_POINT,
    shader_module::ShaderModule,
};

/// Wireframe triangle-list pipeline drawing `[f32; 3]` positions from
/// binding 0 into a single colour attachment.
pub struct GraphicsPipeline {
    pub inner: ash::vk::Pipeline,
    pub pipeline_layout: PipelineLayout,
    pub render_pass: RenderPass,
    pub device: ash::Device,
}

impl GraphicsPipeline {
    pub fn new(
        device: &Device,
        color_format: Format,
        descriptor_layout: &SceneDescriptorLayout,
        shaders: &[ShaderModule],
    ) -> Result<Self> {
        let render_pass = GraphicsPipeline::create_render_pass(device, color_format)?;

        // Owns the render pass from here; the rest is filled in below.
        let mut pipeline = Self {
            inner: ash::vk::Pipeline::null(),
            pipeline_layout: PipelineLayout::null(),
            render_pass,
            device: device.inner.clone(),
        };

        let set_layouts = [descriptor_layout.inner];
        let pipeline_layout_create_info = PipelineLayoutCreateInfo::builder().set_layouts(&set_layouts);
        pipeline.pipeline_layout = unsafe {
            device
                .inner
                .create_pipeline_layout(&pipeline_layout_create_info, None)
                .during("vkCreatePipelineLayout")?
        };

        let shader_stage_create_infos: Vec<PipelineShaderStageCreateInfo> = shaders
            .iter()
            .map(|shader| {
                PipelineShaderStageCreateInfo::builder()
                    .stage(shader.stage.flags())
                    .module(shader.inner)
                    .name(SHADER_ENTRY_POINT)
                    .build()
            })
            .collect();

        let binding_descriptions = [VertexInputBindingDescription::builder()
            .binding(0)
            .stride(size_of::<[f32; 3]>() as u32)
            .input_rate(VertexInputRate::VERTEX)
            .build()];
        let attribute_descriptions = [VertexInputAttributeDescription::builder()
            .location(0)
            .binding(0)
            .format(Format::R32G32B32_SFLOAT)
            .offset(0)
            .build()];
        let vertex_input_create_info = PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly_create_info = PipelineInputAssemblyStateCreateInfo::builder()
            .topology(PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Viewport and scissor follow the swapchain extent at record time.
        let viewport_create_info = PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);
        let dynamic_states = [DynamicState::VIEWPORT, DynamicState::SCISSOR];
        let dynamic_state_create_info =
            PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        // Sphere winding is not consistent, so nothing is culled.
        let rasterizer_create_info = PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(PolygonMode::LINE)
            .line_width(1.0)
            .cull_mode(CullModeFlags::NONE)
            .front_face(FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let multisample_create_info = PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(SampleCountFlags::TYPE_1);

        let color_blend_attachment = PipelineColorBlendAttachmentState::builder()
            .color_write_mask(
                ColorComponentFlags::R
                    | ColorComponentFlags::G
                    | ColorComponentFlags::B
                    | ColorComponentFlags::A,
            )
            .blend_enable(false);

        let color_blend_attachments = [color_blend_attachment.build()];
        let color_blend_create_info = PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let create_info = GraphicsPipelineCreateInfo::builder()
            .stages(&shader_stage_create_infos)
            .vertex_input_state(&vertex_input_create_info)
            .input_assembly_state(&input_assembly_create_info)
            .viewport_state(&viewport_create_info)
            .rasterization_state(&rasterizer_create_info)
            .multisample_state(&multisample_create_info)
            .color_blend_state(&color_blend_create_info)
            .dynamic_state(&dynamic_state_create_info)
            .layout(pipeline.pipeline_layout)
            .render_pass(render_pass)
            .subpass(0);

        let create_infos = [create_info.build()];
        pipeline.inner = unsafe {
            device
                .inner
                .create_graphics_pipelines(PipelineCache::null(), &create_infos, None)
                .map_err(|(_, result)| result)
                .during("vkCreateGraphicsPipelines")?[0]
        };
        info!("Wireframe pipeline created for {:?}", color_format);

        Ok(pipeline)
    }

    fn create_render_pass(device: &Device, color_format: Format) -> Result<RenderPass> {
        let attachment_description = AttachmentDescription::builder()
            .format(color_format)
            .samples(SampleCountFlags::TYPE_1)
            .load_op(AttachmentLoadOp::CLEAR)
            .store_op(AttachmentStoreOp::STORE)
            .stencil_load_op(AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(AttachmentStoreOp::DONT_CARE)
            .initial_layout(ImageLayout::UNDEFINED)
            .final_layout(ImageLayout::PRESENT_SRC_KHR);

        let attachment_reference = AttachmentReference::builder()
            .attachment(0)
            .layout(ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

        let color_attachment_refs = [attachment_reference.build()];
        let subpass_description = SubpassDescription::builder()
            .pipeline_bind_point(PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_attachment_refs);

        let color_attachments = [attachment_description.build()];

        let subpass_dependency = SubpassDependency::builder()
            .src_subpass(ash::vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_stage_mask(PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(AccessFlags::COLOR_ATTACHMENT_WRITE);

        let subpass_dependencies = [subpass_dependency.build()];
        let subpasses = [subpass_description.build()];
        let render_pass_create_info = RenderPassCreateInfo::builder()
            .attachments(&color_attachments)
            .subpasses(&subpasses)
            .dependencies(&subpass_dependencies);

        unsafe {
            device
                .inner
                .create_render_pass(&render_pass_create_info, None)
                .during("vkCreateRenderPass")
        }
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        // Null handles from a partially built pipeline are ignored by Vulkan.
        unsafe {
            self.device.destroy_pipeline(self.inner, None);
            self.device
                .destroy_pipeline_layout(self.pipeline_layout, None);
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
