//! Backend encoding of compiled render passes.
//!
//! The compiler produces one backend-neutral [`RenderPassLayout`]. This
//! module translates it into Vulkan create-info structures and hands them to
//! a [`RenderPassDevice`].
//!
//! # Available Encodings
//!
//! - [`legacy::LegacyEncoder`]: `VkRenderPassCreateInfo` (Vulkan 1.0)
//! - [`extended::ExtendedEncoder`]: `VkRenderPassCreateInfo2` (Vulkan 1.2 or
//!   `VK_KHR_create_renderpass2`), with depth/stencil resolve support
//!
//! # Available Devices
//!
//! - [`dummy::DummyDevice`]: no GPU, hands out fake handles and records what
//!   it was asked to create
//! - `vulkan::VulkanDevice` (`vulkan-backend` feature): wraps an `ash::Device`

pub mod dummy;
pub mod extended;
pub mod legacy;

#[cfg(feature = "vulkan-backend")]
pub mod vulkan;

use ash::prelude::VkResult;
use ash::vk;

use crate::compiler::{AttachmentRef, RenderPassLayout, SubpassReferences};

/// Device operations needed to create and destroy render passes.
pub trait RenderPassDevice {
    /// Whether `vkCreateRenderPass2` is available.
    fn supports_extended_render_pass(&self) -> bool;

    fn create_render_pass(&self, create_info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass>;

    fn create_render_pass2(&self, create_info: &vk::RenderPassCreateInfo2<'_>) -> VkResult<vk::RenderPass>;

    fn render_area_granularity(&self, render_pass: vk::RenderPass) -> vk::Extent2D;

    fn destroy_render_pass(&self, render_pass: vk::RenderPass);
}

/// Create-info encoding used for a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingKind {
    Legacy,
    Extended,
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => f.write_str("VkRenderPassCreateInfo"),
            Self::Extended => f.write_str("VkRenderPassCreateInfo2"),
        }
    }
}

/// Translates a [`RenderPassLayout`] into device create-info and creates it.
///
/// Implementations own only the translation. All layout and dependency
/// decisions are made before an encoder sees the layout.
pub trait RenderPassEncoder: Send + Sync {
    fn kind(&self) -> EncodingKind;

    fn create(&self, device: &dyn RenderPassDevice, layout: &RenderPassLayout) -> VkResult<vk::RenderPass>;
}

/// Get the encoder for an encoding kind.
pub fn encoder(kind: EncodingKind) -> &'static dyn RenderPassEncoder {
    match kind {
        EncodingKind::Legacy => &legacy::LegacyEncoder,
        EncodingKind::Extended => &extended::ExtendedEncoder,
    }
}

/// Encode the color resolve list of a subpass.
///
/// Vulkan reads `pResolveAttachments` with `colorAttachmentCount` entries, so
/// a non-empty list is padded with `unused` up to the color count, or
/// truncated to it. An empty list stays empty.
pub(crate) fn encode_color_resolves<T: Clone>(
    subpass: &SubpassReferences,
    unused: T,
    encode: impl Fn(&AttachmentRef) -> T,
) -> Vec<T> {
    let color_count = subpass.color.len();
    let resolve_count = subpass.color_resolve.len();

    if resolve_count == 0 {
        return Vec::new();
    }

    if resolve_count > color_count {
        log::warn!(
            "Subpass {:?} has {} color resolves for {} color outputs, extra resolves are ignored",
            subpass.debug_name,
            resolve_count,
            color_count
        );
    }

    let mut resolves: Vec<T> = subpass.color_resolve.iter().take(color_count).map(encode).collect();
    resolves.resize(color_count, unused);
    resolves
}
