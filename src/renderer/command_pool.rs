use ash::vk::{
    CommandBuffer, CommandBufferAllocateInfo, CommandBufferBeginInfo, CommandBufferLevel,
    CommandBufferUsageFlags, CommandPoolCreateFlags, CommandPoolCreateInfo, Fence, SubmitInfo,
};

use super::{
    device::Device,
    error::{Result, VkResultExt},
};

pub struct CommandPool {
    pub inner: ash::vk::CommandPool,
    device: ash::Device,
}

impl CommandPool {
    pub fn new(device: &Device) -> Result<Self> {
        let create_info = CommandPoolCreateInfo::builder()
            .flags(CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(device.physical_device.queue_family_indices.graphics()?);

        let inner = unsafe {
            device
                .inner
                .create_command_pool(&create_info, None)
                .during("vkCreateCommandPool")?
        };

        Ok(Self {
            inner,
            device: device.inner.clone(),
        })
    }

    pub fn allocate(&self, count: u32) -> Result<Vec<CommandBuffer>> {
        let alloc_info = CommandBufferAllocateInfo::builder()
            .command_pool(self.inner)
            .level(CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        unsafe {
            self.device
                .allocate_command_buffers(&alloc_info)
                .during("vkAllocateCommandBuffers")
        }
    }

    /// Records `record` into a throwaway command buffer, submits it to the
    /// graphics queue and blocks until it has executed.
    pub fn submit_once<F>(&self, device: &Device, record: F) -> Result<()>
    where
        F: FnOnce(CommandBuffer),
    {
        let command_buffer = self.allocate(1)?[0];
        let result = self.record_and_wait(device, command_buffer, record);
        unsafe {
            self.device
                .free_command_buffers(self.inner, &[command_buffer]);
        }
        result
    }

    fn record_and_wait<F>(&self, device: &Device, command_buffer: CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(CommandBuffer),
    {
        let begin_info =
            CommandBufferBeginInfo::builder().flags(CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            self.device
                .begin_command_buffer(command_buffer, &begin_info)
                .during("vkBeginCommandBuffer")?;
            record(command_buffer);
            self.device
                .end_command_buffer(command_buffer)
                .during("vkEndCommandBuffer")?;

            let command_buffers = [command_buffer];
            let submit_info = SubmitInfo::builder().command_buffers(&command_buffers);
            self.device
                .queue_submit(device.graphics_queue, &[submit_info.build()], Fence::null())
                .during("vkQueueSubmit")?;
            self.device
                .queue_wait_idle(device.graphics_queue)
                .during("vkQueueWaitIdle")
        }
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_command_pool(self.inner, None);
        }
    }
}
