//! # RedLilium Render Pass
//!
//! Render pass compiler for the RedLilium Vulkan backend.
//!
//! ## Overview
//!
//! Given the attachments of a render target and an ordered list of subpasses
//! that read and write them, the compiler infers
//! - the layout every attachment starts and ends the render pass in
//! - the subpass dependencies ordering the subpasses
//!
//! and creates the device render pass. The caller never states a layout or a
//! barrier.
//!
//! This crate provides:
//! - [`RenderPassCompiler`] - compiles descriptions into [`CompiledRenderPass`]es
//! - [`compile_layout`] - the backend-independent part, usable without a device
//! - [`RenderPassCache`] - shares render passes between identical topologies
//! - [`RenderPassDevice`] - device seam, implemented by a Vulkan and a Dummy
//!   (for testing) device
//!
//! ## Example
//!
//! ```ignore
//! use redlilium_renderpass::{Attachment, DummyDevice, RenderPassCompiler, SubpassInfo};
//!
//! let device = DummyDevice::new();
//! let compiler = RenderPassCompiler::new(&device);
//! let render_pass = compiler.compile(
//!     &[Attachment::color(vk::Format::B8G8R8A8_SRGB), Attachment::depth(vk::Format::D32_SFLOAT)],
//!     &[LoadStoreInfo::default(), LoadStoreInfo::clear_discard()],
//!     &[SubpassInfo::new("forward").with_outputs([0])],
//! )?;
//! ```

pub mod backend;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod render_pass;
pub mod types;

// Re-export main types for convenience
pub use backend::dummy::DummyDevice;
#[cfg(feature = "vulkan-backend")]
pub use backend::vulkan::VulkanDevice;
pub use backend::{EncodingKind, RenderPassDevice, RenderPassEncoder};
pub use cache::{RenderPassCache, RenderPassKey};
pub use compiler::{
    AttachmentDescriptor, AttachmentRef, CompilerConfig, EncodingPreference, RenderPassCompiler,
    RenderPassLayout, SubpassDependency, SubpassReferences, compile_layout,
};
pub use error::{AttachmentRole, RenderPassError, RenderPassResult};
pub use render_pass::CompiledRenderPass;
pub use types::{Attachment, LoadStoreInfo, SubpassInfo};

/// Render pass library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dummy_device() {
        let device = DummyDevice::new();
        assert_eq!(device.name(), "Dummy Device");
        assert!(!device.supports_extended_render_pass());
    }
}
