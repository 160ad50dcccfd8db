//! Compiled render pass.

use ash::vk;

use crate::backend::{EncodingKind, RenderPassDevice};
use crate::compiler::{AttachmentDescriptor, RenderPassLayout, SubpassDependency, SubpassReferences};

/// A device render pass together with the layout it was compiled from.
///
/// Never mutated after construction. The handle is not destroyed on drop;
/// call [`destroy`](Self::destroy) on the device that created it. Not
/// `Clone`: share it through an `Arc` so the handle has a single owner.
#[derive(Debug, PartialEq, Eq)]
pub struct CompiledRenderPass {
    layout: RenderPassLayout,
    handle: vk::RenderPass,
    render_area_granularity: vk::Extent2D,
    encoding: EncodingKind,
}

impl CompiledRenderPass {
    pub(crate) fn new(
        layout: RenderPassLayout,
        handle: vk::RenderPass,
        render_area_granularity: vk::Extent2D,
        encoding: EncodingKind,
    ) -> Self {
        Self {
            layout,
            handle,
            render_area_granularity,
            encoding,
        }
    }

    pub fn handle(&self) -> vk::RenderPass {
        self.handle
    }

    pub fn layout(&self) -> &RenderPassLayout {
        &self.layout
    }

    pub fn attachments(&self) -> &[AttachmentDescriptor] {
        &self.layout.attachments
    }

    pub fn subpasses(&self) -> &[SubpassReferences] {
        &self.layout.subpasses
    }

    pub fn dependencies(&self) -> &[SubpassDependency] {
        &self.layout.dependencies
    }

    /// Number of subpasses, at least one.
    pub fn subpass_count(&self) -> usize {
        self.layout.subpass_count()
    }

    /// Number of color attachments written by `subpass`.
    ///
    /// # Panics
    ///
    /// Panics if `subpass >= self.subpass_count()`.
    pub fn color_output_count(&self, subpass: usize) -> u32 {
        self.layout.color_output_counts[subpass]
    }

    /// Granularity render areas should be aligned to, queried once at creation.
    pub fn render_area_granularity(&self) -> vk::Extent2D {
        self.render_area_granularity
    }

    pub fn encoding(&self) -> EncodingKind {
        self.encoding
    }

    /// Index of the attachment bound as depth/stencil, if any.
    pub fn depth_attachment(&self) -> Option<u32> {
        self.layout.depth_attachment
    }

    /// Destroy the device render pass.
    pub fn destroy(self, device: &dyn RenderPassDevice) {
        log::debug!("Destroying render pass {:?}", self.handle);
        device.destroy_render_pass(self.handle);
    }
}

static_assertions::assert_impl_all!(CompiledRenderPass: Send, Sync);
static_assertions::assert_not_impl_any!(CompiledRenderPass: Clone);
