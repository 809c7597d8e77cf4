use ash::vk::{
    DescriptorBufferInfo, DescriptorPool, DescriptorPoolCreateInfo, DescriptorPoolSize,
    DescriptorSet, DescriptorSetAllocateInfo, DescriptorSetLayout, DescriptorSetLayoutBinding,
    DescriptorSetLayoutCreateInfo, DescriptorType, ShaderStageFlags, WriteDescriptorSet,
};

use super::{
    buffer::Buffer,
    device::Device,
    error::{Result, VkResultExt},
};

/// Binding of the scene uniform block in `sphere.vert`.
pub const SCENE_UNIFORMS_BINDING: u32 = 0;

/// Set 0 of the sphere pipeline: one uniform buffer for the vertex stage.
pub struct SceneDescriptorLayout {
    pub inner: DescriptorSetLayout,
    device: ash::Device,
}

impl SceneDescriptorLayout {
    pub fn new(device: &Device) -> Result<Self> {
        let bindings = [DescriptorSetLayoutBinding::builder()
            .binding(SCENE_UNIFORMS_BINDING)
            .descriptor_type(DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(ShaderStageFlags::VERTEX)
            .build()];
        let create_info = DescriptorSetLayoutCreateInfo::builder().bindings(&bindings);

        let inner = unsafe {
            device
                .inner
                .create_descriptor_set_layout(&create_info, None)
                .during("vkCreateDescriptorSetLayout")?
        };

        Ok(Self {
            inner,
            device: device.inner.clone(),
        })
    }
}

impl Drop for SceneDescriptorLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.inner, None);
        }
    }
}

/// One descriptor set per uniform buffer, all written once at creation.
pub struct SceneDescriptors {
    pub pool: DescriptorPool,
    pub sets: Vec<DescriptorSet>,
    device: ash::Device,
}

impl SceneDescriptors {
    pub fn new(
        device: &Device,
        layout: &SceneDescriptorLayout,
        uniform_buffers: &[Buffer],
    ) -> Result<Self> {
        let count = uniform_buffers.len() as u32;
        let pool_sizes = [DescriptorPoolSize::builder()
            .ty(DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(count)
            .build()];
        let pool_info = DescriptorPoolCreateInfo::builder()
            .pool_sizes(&pool_sizes)
            .max_sets(count);

        let pool = unsafe {
            device
                .inner
                .create_descriptor_pool(&pool_info, None)
                .during("vkCreateDescriptorPool")?
        };
        // Owns the pool from here; sets are freed with it.
        let mut descriptors = Self {
            pool,
            sets: Vec::new(),
            device: device.inner.clone(),
        };

        let layouts = vec![layout.inner; uniform_buffers.len()];
        let alloc_info = DescriptorSetAllocateInfo::builder()
            .descriptor_pool(pool)
            .set_layouts(&layouts);
        descriptors.sets = unsafe {
            device
                .inner
                .allocate_descriptor_sets(&alloc_info)
                .during("vkAllocateDescriptorSets")?
        };

        for (set, buffer) in descriptors.sets.iter().zip(uniform_buffers) {
            let buffer_infos = [DescriptorBufferInfo::builder()
                .buffer(buffer.inner)
                .offset(0)
                .range(buffer.size)
                .build()];
            let writes = [WriteDescriptorSet::builder()
                .dst_set(*set)
                .dst_binding(SCENE_UNIFORMS_BINDING)
                .descriptor_type(DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&buffer_infos)
                .build()];
            unsafe { device.inner.update_descriptor_sets(&writes, &[]) };
        }

        Ok(descriptors)
    }
}

impl Drop for SceneDescriptors {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}
