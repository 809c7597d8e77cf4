use ash::{vk::SurfaceKHR, Entry};
use winit::window::Window;

use super::{
    error::{Result, VkResultExt},
    instance::Instance,
};

pub struct Surface {
    pub inner: SurfaceKHR,
    pub loader: ash::extensions::khr::Surface,
}

impl Surface {
    pub fn new(entry: &Entry, instance: &Instance, window: &Window) -> Result<Self> {
        let inner = unsafe {
            ash_window::create_surface(entry, &instance.inner, window, None)
                .during("ash_window::create_surface")?
        };
        let loader = ash::extensions::khr::Surface::new(entry, &instance.inner);

        Ok(Surface { inner, loader })
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.inner, None);
        }
    }
}
