use std::ffi::c_void;

use ash::vk::{
    BufferCopy, BufferCreateInfo, BufferUsageFlags, DeviceMemory, DeviceSize, MemoryAllocateInfo,
    MemoryMapFlags, MemoryPropertyFlags, SharingMode,
};
use bytemuck::Pod;
use log::debug;

use super::{
    command_pool::CommandPool,
    device::Device,
    error::{Result, VkResultExt},
};

/// A `VkBuffer` bound to its own allocation.
pub struct Buffer {
    pub inner: ash::vk::Buffer,
    pub memory: DeviceMemory,
    pub size: DeviceSize,
    mapped: Option<*mut c_void>,
    device: ash::Device,
}

impl Buffer {
    pub fn new(
        device: &Device,
        size: DeviceSize,
        usage: BufferUsageFlags,
        properties: MemoryPropertyFlags,
    ) -> Result<Self> {
        let create_info = BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(SharingMode::EXCLUSIVE);

        let inner = unsafe {
            device
                .inner
                .create_buffer(&create_info, None)
                .during("vkCreateBuffer")?
        };

        // From here on `buffer` owns `inner` and frees whatever was bound.
        let mut buffer = Buffer {
            inner,
            memory: DeviceMemory::null(),
            size,
            mapped: None,
            device: device.inner.clone(),
        };

        let requirements = unsafe { device.inner.get_buffer_memory_requirements(inner) };
        let memory_type = device
            .physical_device
            .find_memory_type(requirements.memory_type_bits, properties)?;
        let alloc_info = MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type);

        unsafe {
            buffer.memory = device
                .inner
                .allocate_memory(&alloc_info, None)
                .during("vkAllocateMemory")?;
            device
                .inner
                .bind_buffer_memory(inner, buffer.memory, 0)
                .during("vkBindBufferMemory")?;
        }

        Ok(buffer)
    }

    /// Device-local buffer filled once through a staging copy.
    pub fn with_data<T: Pod>(
        device: &Device,
        command_pool: &CommandPool,
        usage: BufferUsageFlags,
        data: &[T],
    ) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let size = bytes.len() as DeviceSize;

        let mut staging = Buffer::new(
            device,
            size,
            BufferUsageFlags::TRANSFER_SRC,
            MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT,
        )?;
        staging.map()?;
        staging.write(bytes);

        let buffer = Buffer::new(
            device,
            size,
            usage | BufferUsageFlags::TRANSFER_DST,
            MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        command_pool.submit_once(device, |command_buffer| unsafe {
            let region = BufferCopy::builder().size(size).build();
            device
                .inner
                .cmd_copy_buffer(command_buffer, staging.inner, buffer.inner, &[region]);
        })?;
        debug!("Uploaded {} bytes as {:?}", size, usage);

        Ok(buffer)
    }

    /// Host-visible buffer that stays mapped for per-frame writes.
    pub fn mapped(device: &Device, size: DeviceSize, usage: BufferUsageFlags) -> Result<Self> {
        let mut buffer = Buffer::new(
            device,
            size,
            usage,
            MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT,
        )?;
        buffer.map()?;
        Ok(buffer)
    }

    fn map(&mut self) -> Result<()> {
        if self.mapped.is_none() {
            let ptr = unsafe {
                self.device
                    .map_memory(self.memory, 0, self.size, MemoryMapFlags::empty())
                    .during("vkMapMemory")?
            };
            self.mapped = Some(ptr);
        }
        Ok(())
    }

    /// Copies `bytes` to the start of a mapped buffer. Panics if the buffer
    /// was never mapped or `bytes` does not fit.
    pub fn write(&mut self, bytes: &[u8]) {
        assert!(bytes.len() as DeviceSize <= self.size);
        let ptr = self.mapped.expect("write to unmapped buffer");
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr as *mut u8, bytes.len());
        }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            if self.mapped.take().is_some() {
                self.device.unmap_memory(self.memory);
            }
            self.device.destroy_buffer(self.inner, None);
            if self.memory != DeviceMemory::null() {
                self.device.free_memory(self.memory, None);
            }
        }
    }
}
