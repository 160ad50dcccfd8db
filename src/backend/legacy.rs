//! `VkRenderPassCreateInfo` encoding.

use ash::prelude::VkResult;
use ash::vk;

use super::{EncodingKind, RenderPassDevice, RenderPassEncoder, encode_color_resolves};
use crate::compiler::{
    AttachmentDescriptor, AttachmentRef, RenderPassLayout, SubpassDependency, SubpassReferences,
};

/// Encoder for the Vulkan 1.0 render pass structures.
///
/// This encoding has no way to express a depth/stencil resolve. Subpasses
/// requesting one are created without it and a warning is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyEncoder;

impl RenderPassEncoder for LegacyEncoder {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Legacy
    }

    fn create(&self, device: &dyn RenderPassDevice, layout: &RenderPassLayout) -> VkResult<vk::RenderPass> {
        let attachments: Vec<_> = layout.attachments.iter().map(attachment_description).collect();

        let references: Vec<_> = layout.subpasses.iter().map(SubpassAttachmentRefs::new).collect();
        let subpasses: Vec<_> = references.iter().map(SubpassAttachmentRefs::description).collect();

        let dependencies: Vec<_> = layout.dependencies.iter().map(dependency).collect();

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        log::trace!(
            "LegacyEncoder: creating render pass ({} attachments, {} subpasses, {} dependencies)",
            attachments.len(),
            subpasses.len(),
            dependencies.len()
        );

        device.create_render_pass(&create_info)
    }
}

/// Backing storage for the reference arrays a `vk::SubpassDescription` points to.
struct SubpassAttachmentRefs {
    color: Vec<vk::AttachmentReference>,
    input: Vec<vk::AttachmentReference>,
    resolve: Vec<vk::AttachmentReference>,
    depth_stencil: Option<vk::AttachmentReference>,
}

impl SubpassAttachmentRefs {
    fn new(subpass: &SubpassReferences) -> Self {
        if subpass.depth_stencil_resolve.is_some() {
            log::warn!(
                "Subpass {:?}: depth/stencil resolve requires VkRenderPassCreateInfo2, dropping it",
                subpass.debug_name
            );
        }

        let unused = vk::AttachmentReference {
            attachment: vk::ATTACHMENT_UNUSED,
            layout: vk::ImageLayout::UNDEFINED,
        };

        Self {
            color: subpass.color.iter().map(reference).collect(),
            input: subpass.input.iter().map(reference).collect(),
            resolve: encode_color_resolves(subpass, unused, reference),
            depth_stencil: subpass.depth_stencil.as_ref().map(reference),
        }
    }

    fn description(&self) -> vk::SubpassDescription<'_> {
        let mut description = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .input_attachments(&self.input)
            .color_attachments(&self.color);

        if !self.resolve.is_empty() {
            description = description.resolve_attachments(&self.resolve);
        }

        if let Some(depth_stencil) = &self.depth_stencil {
            description = description.depth_stencil_attachment(depth_stencil);
        }

        description
    }
}

fn attachment_description(attachment: &AttachmentDescriptor) -> vk::AttachmentDescription {
    vk::AttachmentDescription::default()
        .format(attachment.format)
        .samples(attachment.samples)
        .load_op(attachment.load_op)
        .store_op(attachment.store_op)
        .stencil_load_op(attachment.stencil_load_op)
        .stencil_store_op(attachment.stencil_store_op)
        .initial_layout(attachment.initial_layout)
        .final_layout(attachment.final_layout)
}

fn reference(reference: &AttachmentRef) -> vk::AttachmentReference {
    vk::AttachmentReference {
        attachment: reference.attachment,
        layout: reference.layout,
    }
}

fn dependency(dependency: &SubpassDependency) -> vk::SubpassDependency {
    vk::SubpassDependency::default()
        .src_subpass(dependency.src_subpass)
        .dst_subpass(dependency.dst_subpass)
        .src_stage_mask(dependency.src_stage_mask)
        .dst_stage_mask(dependency.dst_stage_mask)
        .src_access_mask(dependency.src_access_mask)
        .dst_access_mask(dependency.dst_access_mask)
        .dependency_flags(dependency.dependency_flags)
}
