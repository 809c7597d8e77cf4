use ash::vk::{Fence, FenceCreateFlags, FenceCreateInfo, Semaphore, SemaphoreCreateInfo};

use super::{
    device::Device,
    error::{Result, VkResultExt},
};

/// Semaphores and fence guarding one frame in flight.
pub struct FrameSync {
    pub image_available: Semaphore,
    pub render_finished: Semaphore,
    pub in_flight: Fence,
    device: ash::Device,
}

impl FrameSync {
    pub fn new(device: &Device) -> Result<Self> {
        let semaphore_info = SemaphoreCreateInfo::builder();
        // Signalled so the first wait on each frame returns immediately.
        let fence_info = FenceCreateInfo::builder().flags(FenceCreateFlags::SIGNALED);

        let mut sync = FrameSync {
            image_available: Semaphore::null(),
            render_finished: Semaphore::null(),
            in_flight: Fence::null(),
            device: device.inner.clone(),
        };
        unsafe {
            sync.image_available = device
                .inner
                .create_semaphore(&semaphore_info, None)
                .during("vkCreateSemaphore")?;
            sync.render_finished = device
                .inner
                .create_semaphore(&semaphore_info, None)
                .during("vkCreateSemaphore")?;
            sync.in_flight = device
                .inner
                .create_fence(&fence_info, None)
                .during("vkCreateFence")?;
        }

        Ok(sync)
    }

    pub fn wait(&self) -> Result<()> {
        unsafe {
            self.device
                .wait_for_fences(&[self.in_flight], true, u64::MAX)
                .during("vkWaitForFences")
        }
    }

    pub fn reset(&self) -> Result<()> {
        unsafe {
            self.device
                .reset_fences(&[self.in_flight])
                .during("vkResetFences")
        }
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        // Destroying null handles is a no-op.
        unsafe {
            self.device.destroy_fence(self.in_flight, None);
            self.device.destroy_semaphore(self.render_finished, None);
            self.device.destroy_semaphore(self.image_available, None);
        }
    }
}
