//! `VkRenderPassCreateInfo2` encoding.
//!
//! Unlike the legacy structures, `VkAttachmentReference2` carries an aspect
//! mask and subpasses can chain a `VkSubpassDescriptionDepthStencilResolve`.

use ash::prelude::VkResult;
use ash::vk;

use super::{EncodingKind, RenderPassDevice, RenderPassEncoder, encode_color_resolves};
use crate::compiler::{
    AttachmentDescriptor, AttachmentRef, RenderPassLayout, SubpassDependency, SubpassReferences,
};
use crate::types::{aspect_mask_for_format, is_depth_stencil_format};

/// Encoder for the Vulkan 1.2 render pass structures.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedEncoder;

impl RenderPassEncoder for ExtendedEncoder {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Extended
    }

    fn create(&self, device: &dyn RenderPassDevice, layout: &RenderPassLayout) -> VkResult<vk::RenderPass> {
        let attachments: Vec<_> = layout.attachments.iter().map(attachment_description).collect();

        let references: Vec<_> = layout
            .subpasses
            .iter()
            .map(|subpass| SubpassAttachmentRefs::new(&layout.attachments, subpass))
            .collect();

        // Chained structs must stay in place until the create call returns
        let mut depth_resolves: Vec<_> = references
            .iter()
            .map(SubpassAttachmentRefs::depth_stencil_resolve)
            .collect();

        let subpasses: Vec<_> = references
            .iter()
            .zip(depth_resolves.iter_mut())
            .map(|(refs, depth_resolve)| {
                let description = refs.description();
                match depth_resolve {
                    Some(depth_resolve) => description.push_next(depth_resolve),
                    None => description,
                }
            })
            .collect();

        let dependencies: Vec<_> = layout.dependencies.iter().map(dependency).collect();

        let create_info = vk::RenderPassCreateInfo2::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        log::trace!(
            "ExtendedEncoder: creating render pass ({} attachments, {} subpasses, {} dependencies)",
            attachments.len(),
            subpasses.len(),
            dependencies.len()
        );

        device.create_render_pass2(&create_info)
    }
}

/// Backing storage for the reference arrays a `vk::SubpassDescription2` points to.
struct SubpassAttachmentRefs {
    color: Vec<vk::AttachmentReference2<'static>>,
    input: Vec<vk::AttachmentReference2<'static>>,
    resolve: Vec<vk::AttachmentReference2<'static>>,
    depth_stencil: Option<vk::AttachmentReference2<'static>>,
    depth_stencil_resolve: Option<vk::AttachmentReference2<'static>>,
    depth_resolve_mode: vk::ResolveModeFlags,
    stencil_resolve_mode: vk::ResolveModeFlags,
}

impl SubpassAttachmentRefs {
    fn new(attachments: &[AttachmentDescriptor], subpass: &SubpassReferences) -> Self {
        let encode = |r: &AttachmentRef| reference(attachments, r);

        let unused = vk::AttachmentReference2::default()
            .attachment(vk::ATTACHMENT_UNUSED)
            .layout(vk::ImageLayout::UNDEFINED);

        let depth_stencil_resolve = match (&subpass.depth_stencil, &subpass.depth_stencil_resolve) {
            (Some(_), Some(resolve)) => Some(encode(resolve)),
            (None, Some(_)) => {
                log::warn!(
                    "Subpass {:?} has a depth/stencil resolve but no depth/stencil attachment, dropping it",
                    subpass.debug_name
                );
                None
            }
            _ => None,
        };

        let has_stencil = subpass
            .depth_stencil
            .is_some_and(|r| is_depth_stencil_format(attachments[r.attachment as usize].format));

        Self {
            color: subpass.color.iter().map(encode).collect(),
            input: subpass.input.iter().map(encode).collect(),
            resolve: encode_color_resolves(subpass, unused, encode),
            depth_stencil: subpass.depth_stencil.as_ref().map(encode),
            depth_stencil_resolve,
            depth_resolve_mode: subpass.depth_stencil_resolve_mode,
            stencil_resolve_mode: if has_stencil {
                stencil_resolve_mode(subpass.depth_stencil_resolve_mode)
            } else {
                vk::ResolveModeFlags::NONE
            },
        }
    }

    fn depth_stencil_resolve(&self) -> Option<vk::SubpassDescriptionDepthStencilResolve<'_>> {
        self.depth_stencil_resolve.as_ref().map(|resolve| {
            vk::SubpassDescriptionDepthStencilResolve::default()
                .depth_resolve_mode(self.depth_resolve_mode)
                .stencil_resolve_mode(self.stencil_resolve_mode)
                .depth_stencil_resolve_attachment(resolve)
        })
    }

    fn description(&self) -> vk::SubpassDescription2<'_> {
        let mut description = vk::SubpassDescription2::default()
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

fn attachment_description(attachment: &AttachmentDescriptor) -> vk::AttachmentDescription2<'static> {
    vk::AttachmentDescription2::default()
        .format(attachment.format)
        .samples(attachment.samples)
        .load_op(attachment.load_op)
        .store_op(attachment.store_op)
        .stencil_load_op(attachment.stencil_load_op)
        .stencil_store_op(attachment.stencil_store_op)
        .initial_layout(attachment.initial_layout)
        .final_layout(attachment.final_layout)
}

fn reference(attachments: &[AttachmentDescriptor], reference: &AttachmentRef) -> vk::AttachmentReference2<'static> {
    vk::AttachmentReference2::default()
        .attachment(reference.attachment)
        .layout(reference.layout)
        .aspect_mask(aspect_mask_for_format(attachments[reference.attachment as usize].format))
}

/// Stencil follows the depth resolve mode, except that stencil values cannot
/// be averaged.
fn stencil_resolve_mode(depth_mode: vk::ResolveModeFlags) -> vk::ResolveModeFlags {
    if depth_mode == vk::ResolveModeFlags::AVERAGE {
        vk::ResolveModeFlags::SAMPLE_ZERO
    } else {
        depth_mode
    }
}

fn dependency(dependency: &SubpassDependency) -> vk::SubpassDependency2<'static> {
    vk::SubpassDependency2::default()
        .src_subpass(dependency.src_subpass)
        .dst_subpass(dependency.dst_subpass)
        .src_stage_mask(dependency.src_stage_mask)
        .dst_stage_mask(dependency.dst_stage_mask)
        .src_access_mask(dependency.src_access_mask)
        .dst_access_mask(dependency.dst_access_mask)
        .dependency_flags(dependency.dependency_flags)
}
