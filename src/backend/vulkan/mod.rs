//! Render pass device over a live Vulkan device using ash.

use ash::prelude::VkResult;
use ash::vk;

use super::RenderPassDevice;

/// [`RenderPassDevice`] backed by an `ash::Device`.
///
/// The device is borrowed, not owned: destroying the `ash::Device` stays the
/// caller's job and must happen after every render pass created through this
/// wrapper has been destroyed.
#[derive(Clone)]
pub struct VulkanDevice {
    device: ash::Device,
    extended_render_pass: bool,
}

impl VulkanDevice {
    /// Wrap a logical device created with `api_version`.
    ///
    /// `vkCreateRenderPass2` is core since Vulkan 1.2; on older versions the
    /// legacy encoding is used.
    pub fn new(device: ash::Device, api_version: u32) -> Self {
        let extended = (vk::api_version_major(api_version), vk::api_version_minor(api_version)) >= (1, 2);

        log::info!(
            "Vulkan render pass device: API {}.{}, create_renderpass2: {}",
            vk::api_version_major(api_version),
            vk::api_version_minor(api_version),
            extended
        );

        Self::with_extended_render_pass(device, extended)
    }

    /// Wrap a logical device with an explicit capability flag, e.g. when
    /// `VK_KHR_create_renderpass2` is enabled on a 1.1 device whose loader
    /// exposes the core entry point.
    pub fn with_extended_render_pass(device: ash::Device, supported: bool) -> Self {
        Self {
            device,
            extended_render_pass: supported,
        }
    }

    /// Get the underlying device.
    pub fn handle(&self) -> &ash::Device {
        &self.device
    }
}

impl std::fmt::Debug for VulkanDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanDevice")
            .field("device", &self.device.handle())
            .field("extended_render_pass", &self.extended_render_pass)
            .finish()
    }
}

impl RenderPassDevice for VulkanDevice {
    fn supports_extended_render_pass(&self) -> bool {
        self.extended_render_pass
    }

    fn create_render_pass(&self, create_info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        unsafe { self.device.create_render_pass(create_info, None) }
    }

    fn create_render_pass2(&self, create_info: &vk::RenderPassCreateInfo2<'_>) -> VkResult<vk::RenderPass> {
        if !self.extended_render_pass {
            return Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT);
        }
        unsafe { self.device.create_render_pass2(create_info, None) }
    }

    fn render_area_granularity(&self, render_pass: vk::RenderPass) -> vk::Extent2D {
        unsafe { self.device.get_render_area_granularity(render_pass) }
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        log::trace!("Destroying render pass {:?}", render_pass);
        unsafe { self.device.destroy_render_pass(render_pass, None) };
    }
}

static_assertions::assert_impl_all!(VulkanDevice: Send, Sync);
