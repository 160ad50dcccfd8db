//! Per-subpass attachment references.
//!
//! Classifies every attachment a subpass touches into one of five roles and
//! assigns each reference the layout the subpass expects the image to be in.
//! No state crosses subpass boundaries here; cross-subpass reasoning lives in
//! [`layout`](super::layout) and [`dependencies`](super::dependencies).

use ash::vk;

use crate::error::{AttachmentRole, RenderPassError, RenderPassResult};
use crate::types::{Attachment, SubpassInfo, is_depth_format};

/// An attachment index paired with the layout it has during a subpass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentRef {
    pub attachment: u32,
    pub layout: vk::ImageLayout,
}

impl AttachmentRef {
    pub fn new(attachment: u32, layout: vk::ImageLayout) -> Self {
        Self { attachment, layout }
    }
}

/// All attachment references of one subpass, grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SubpassReferences {
    pub color: Vec<AttachmentRef>,
    pub input: Vec<AttachmentRef>,
    pub depth_stencil: Option<AttachmentRef>,
    pub color_resolve: Vec<AttachmentRef>,
    pub depth_stencil_resolve: Option<AttachmentRef>,
    pub depth_stencil_resolve_mode: vk::ResolveModeFlags,
    pub debug_name: String,
}

impl SubpassReferences {
    /// Iterate references in role order: color, input, depth/stencil,
    /// color resolve, depth/stencil resolve.
    ///
    /// Both layout inference phases depend on this order.
    pub fn iter(&self) -> impl Iterator<Item = (AttachmentRole, AttachmentRef)> + '_ {
        let color = self.color.iter().map(|r| (AttachmentRole::Color, *r));
        let input = self.input.iter().map(|r| (AttachmentRole::Input, *r));
        let depth = self
            .depth_stencil
            .iter()
            .map(|r| (AttachmentRole::DepthStencil, *r));
        let resolve = self
            .color_resolve
            .iter()
            .map(|r| (AttachmentRole::ColorResolve, *r));
        let depth_resolve = self
            .depth_stencil_resolve
            .iter()
            .map(|r| (AttachmentRole::DepthStencilResolve, *r));

        color.chain(input).chain(depth).chain(resolve).chain(depth_resolve)
    }

    /// Check whether the subpass references `attachment` in any role.
    pub fn references(&self, attachment: u32) -> bool {
        self.iter().any(|(_, r)| r.attachment == attachment)
    }
}

/// Index of the depth/stencil attachment of the render pass.
///
/// Only the first depth-format attachment is ever used as the depth/stencil
/// attachment. Any later depth-format attachment is invisible to layout and
/// dependency inference; it can still be listed as an input or resolve target.
pub fn find_depth_attachment(attachments: &[Attachment]) -> Option<u32> {
    attachments
        .iter()
        .position(Attachment::is_depth)
        .map(|index| index as u32)
}

/// Build the references of every subpass.
pub fn collect(
    attachments: &[Attachment],
    subpasses: &[SubpassInfo],
) -> RenderPassResult<Vec<SubpassReferences>> {
    validate_indices(attachments, subpasses)?;

    let depth_attachment = find_depth_attachment(attachments);

    subpasses
        .iter()
        .enumerate()
        .map(|(index, subpass)| collect_subpass(attachments, depth_attachment, index, subpass))
        .collect()
}

/// References of the single subpass synthesized when none are given.
///
/// Every color attachment is written in `GENERAL` layout and the depth
/// attachment, if any, is bound as depth/stencil.
pub fn collect_default(attachments: &[Attachment]) -> SubpassReferences {
    let color = attachments
        .iter()
        .enumerate()
        .filter(|(_, attachment)| !attachment.is_depth())
        .map(|(index, _)| AttachmentRef::new(index as u32, vk::ImageLayout::GENERAL))
        .collect();

    let depth_stencil = find_depth_attachment(attachments).map(|index| {
        AttachmentRef::new(index, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
    });

    SubpassReferences {
        color,
        depth_stencil,
        debug_name: "default".to_string(),
        ..Default::default()
    }
}

fn collect_subpass(
    attachments: &[Attachment],
    depth_attachment: Option<u32>,
    index: usize,
    subpass: &SubpassInfo,
) -> RenderPassResult<SubpassReferences> {
    let mut refs = SubpassReferences {
        debug_name: subpass.debug_name.clone(),
        ..Default::default()
    };

    refs.color = color_refs(attachments, &subpass.output_attachments);

    refs.input = subpass
        .input_attachments
        .iter()
        .map(|&i| {
            let layout = if is_depth_format(attachments[i as usize].format) {
                vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL
            } else {
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
            };
            AttachmentRef::new(i, layout)
        })
        .collect();

    refs.color_resolve = color_refs(attachments, &subpass.color_resolve_attachments);

    if subpass.disable_depth_stencil_attachment {
        return Ok(refs);
    }

    let Some(depth) = depth_attachment else {
        if subpass.resolves_depth_stencil() {
            log::warn!(
                "Subpass {} ({:?}) requests a depth/stencil resolve but the render pass has no depth attachment",
                index,
                subpass.debug_name
            );
        }
        return Ok(refs);
    };

    refs.depth_stencil = Some(AttachmentRef::new(
        depth,
        layout_or(
            attachments[depth as usize].initial_layout,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ),
    ));

    let resolve = subpass
        .depth_stencil_resolve_attachment
        .filter(|_| subpass.resolves_depth_stencil());
    if let Some(resolve) = resolve {
        refs.depth_stencil_resolve = Some(AttachmentRef::new(
            resolve,
            layout_or(
                attachments[resolve as usize].initial_layout,
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            ),
        ));
        refs.depth_stencil_resolve_mode = subpass.depth_stencil_resolve_mode;
    }

    Ok(refs)
}

/// Color-role references; depth-format indices are skipped.
fn color_refs(attachments: &[Attachment], indices: &[u32]) -> Vec<AttachmentRef> {
    indices
        .iter()
        .filter(|&&i| !attachments[i as usize].is_depth())
        .map(|&i| {
            AttachmentRef::new(
                i,
                layout_or(
                    attachments[i as usize].initial_layout,
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                ),
            )
        })
        .collect()
}

fn layout_or(declared: vk::ImageLayout, fallback: vk::ImageLayout) -> vk::ImageLayout {
    if declared == vk::ImageLayout::UNDEFINED {
        fallback
    } else {
        declared
    }
}

fn validate_indices(attachments: &[Attachment], subpasses: &[SubpassInfo]) -> RenderPassResult<()> {
    for (index, subpass) in subpasses.iter().enumerate() {
        let lists = [
            (AttachmentRole::Color, subpass.output_attachments.as_slice()),
            (AttachmentRole::Input, subpass.input_attachments.as_slice()),
            (AttachmentRole::ColorResolve, subpass.color_resolve_attachments.as_slice()),
            (
                AttachmentRole::DepthStencilResolve,
                subpass.depth_stencil_resolve_attachment.as_slice(),
            ),
        ];

        if subpass.resolves_depth_stencil() && subpass.depth_stencil_resolve_attachment.is_none() {
            return Err(RenderPassError::MissingDepthResolveAttachment { subpass: index });
        }

        for (role, list) in lists {
            if let Some(&attachment) = list.iter().find(|&&i| i as usize >= attachments.len()) {
                return Err(RenderPassError::AttachmentOutOfRange {
                    subpass: index,
                    role,
                    attachment,
                    attachment_count: attachments.len(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gbuffer_attachments() -> Vec<Attachment> {
        vec![
            Attachment::color(vk::Format::B8G8R8A8_SRGB),
            Attachment::depth(vk::Format::D32_SFLOAT),
            Attachment::color(vk::Format::R8G8B8A8_UNORM),
            Attachment::color(vk::Format::A2B10G10R10_UNORM_PACK32),
        ]
    }

    #[test]
    fn test_find_depth_attachment_picks_first() {
        let attachments = [
            Attachment::color(vk::Format::R8G8B8A8_UNORM),
            Attachment::depth(vk::Format::D24_UNORM_S8_UINT),
            Attachment::depth(vk::Format::D32_SFLOAT),
        ];
        assert_eq!(find_depth_attachment(&attachments), Some(1));
        assert_eq!(find_depth_attachment(&attachments[..1]), None);
    }

    #[test]
    fn test_collect_classifies_roles() {
        let attachments = gbuffer_attachments();
        let subpasses = [
            SubpassInfo::new("geometry").with_outputs([1, 2, 3]),
            SubpassInfo::new("lighting").with_inputs([1, 2, 3]).with_outputs([0]),
        ];

        let refs = collect(&attachments, &subpasses).unwrap();

        // Depth-format output is filtered out of the color list
        assert_eq!(
            refs[0].color,
            vec![
                AttachmentRef::new(2, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
                AttachmentRef::new(3, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
            ]
        );
        assert_eq!(
            refs[0].depth_stencil,
            Some(AttachmentRef::new(1, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL))
        );

        assert_eq!(
            refs[1].input,
            vec![
                AttachmentRef::new(1, vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL),
                AttachmentRef::new(2, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                AttachmentRef::new(3, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
            ]
        );
        assert_eq!(refs[1].debug_name, "lighting");
    }

    #[test]
    fn test_collect_uses_declared_initial_layout() {
        let attachments = [
            Attachment::color(vk::Format::B8G8R8A8_SRGB)
                .with_initial_layout(vk::ImageLayout::PRESENT_SRC_KHR),
            Attachment::depth(vk::Format::D32_SFLOAT)
                .with_initial_layout(vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL),
        ];
        let refs = collect(&attachments, &[SubpassInfo::new("main").with_outputs([0])]).unwrap();

        assert_eq!(refs[0].color[0].layout, vk::ImageLayout::PRESENT_SRC_KHR);
        assert_eq!(
            refs[0].depth_stencil.map(|r| r.layout),
            Some(vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL)
        );
    }

    #[test]
    fn test_collect_disabled_depth() {
        let attachments = gbuffer_attachments();
        let refs = collect(
            &attachments,
            &[SubpassInfo::new("ui").with_outputs([0]).without_depth_stencil()],
        )
        .unwrap();

        assert!(refs[0].depth_stencil.is_none());
    }

    #[test]
    fn test_collect_resolves() {
        let attachments = [
            Attachment::color(vk::Format::R8G8B8A8_UNORM).with_samples(vk::SampleCountFlags::TYPE_4),
            Attachment::depth(vk::Format::D32_SFLOAT).with_samples(vk::SampleCountFlags::TYPE_4),
            Attachment::color(vk::Format::R8G8B8A8_UNORM),
            Attachment::depth(vk::Format::D32_SFLOAT),
        ];
        let subpass = SubpassInfo::new("msaa")
            .with_outputs([0])
            .with_color_resolves([2])
            .with_depth_stencil_resolve(3, vk::ResolveModeFlags::SAMPLE_ZERO);

        let refs = collect(&attachments, &[subpass]).unwrap();

        assert_eq!(
            refs[0].color_resolve,
            vec![AttachmentRef::new(2, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)]
        );
        assert_eq!(refs[0].depth_stencil.map(|r| r.attachment), Some(1));
        assert_eq!(
            refs[0].depth_stencil_resolve,
            Some(AttachmentRef::new(3, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL))
        );
        assert_eq!(refs[0].depth_stencil_resolve_mode, vk::ResolveModeFlags::SAMPLE_ZERO);
    }

    #[test]
    fn test_collect_depth_resolve_requires_depth_attachment() {
        let attachments = [
            Attachment::color(vk::Format::R8G8B8A8_UNORM),
            Attachment::color(vk::Format::R8G8B8A8_UNORM),
        ];
        let subpass = SubpassInfo::new("no_depth")
            .with_outputs([0])
            .with_depth_stencil_resolve(1, vk::ResolveModeFlags::AVERAGE);

        let refs = collect(&attachments, &[subpass]).unwrap();
        assert!(refs[0].depth_stencil.is_none());
        assert!(refs[0].depth_stencil_resolve.is_none());
    }

    #[test]
    fn test_collect_missing_depth_resolve_attachment() {
        let attachments = gbuffer_attachments();
        let mut subpass = SubpassInfo::new("broken").with_outputs([0]);
        subpass.depth_stencil_resolve_mode = vk::ResolveModeFlags::MIN;

        let result = collect(&attachments, &[subpass]);
        assert_eq!(
            result,
            Err(RenderPassError::MissingDepthResolveAttachment { subpass: 0 })
        );
    }

    #[test]
    fn test_collect_missing_depth_resolve_attachment_without_depth() {
        let no_depth = [Attachment::color(vk::Format::R8G8B8A8_UNORM)];
        let mut subpass = SubpassInfo::new("broken").with_outputs([0]);
        subpass.depth_stencil_resolve_mode = vk::ResolveModeFlags::MAX;

        assert_eq!(
            collect(&no_depth, &[subpass.clone()]),
            Err(RenderPassError::MissingDepthResolveAttachment { subpass: 0 })
        );

        let disabled = subpass.without_depth_stencil();
        assert_eq!(
            collect(&gbuffer_attachments(), &[disabled]),
            Err(RenderPassError::MissingDepthResolveAttachment { subpass: 0 })
        );
    }

    #[test]
    fn test_collect_rejects_out_of_range_index() {
        let attachments = gbuffer_attachments();
        let subpasses = [
            SubpassInfo::new("ok").with_outputs([0]),
            SubpassInfo::new("bad").with_inputs([2, 9]),
        ];

        let result = collect(&attachments, &subpasses);
        assert_eq!(
            result,
            Err(RenderPassError::AttachmentOutOfRange {
                subpass: 1,
                role: AttachmentRole::Input,
                attachment: 9,
                attachment_count: 4,
            })
        );
    }

    #[test]
    fn test_collect_default_subpass() {
        let attachments = [
            Attachment::color(vk::Format::B8G8R8A8_SRGB),
            Attachment::depth(vk::Format::D32_SFLOAT),
            Attachment::color(vk::Format::R16G16B16A16_SFLOAT),
            Attachment::depth(vk::Format::D16_UNORM),
        ];
        let refs = collect_default(&attachments);

        assert_eq!(
            refs.color,
            vec![
                AttachmentRef::new(0, vk::ImageLayout::GENERAL),
                AttachmentRef::new(2, vk::ImageLayout::GENERAL),
            ]
        );
        assert_eq!(
            refs.depth_stencil,
            Some(AttachmentRef::new(1, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL))
        );
        assert!(refs.input.is_empty());
    }

    #[test]
    fn test_iter_role_order() {
        let refs = SubpassReferences {
            color: vec![AttachmentRef::new(0, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)],
            input: vec![AttachmentRef::new(1, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)],
            depth_stencil: Some(AttachmentRef::new(2, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)),
            color_resolve: vec![AttachmentRef::new(3, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)],
            depth_stencil_resolve: Some(AttachmentRef::new(
                4,
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            )),
            ..Default::default()
        };

        let roles: Vec<_> = refs.iter().map(|(role, r)| (role, r.attachment)).collect();
        assert_eq!(
            roles,
            vec![
                (AttachmentRole::Color, 0),
                (AttachmentRole::Input, 1),
                (AttachmentRole::DepthStencil, 2),
                (AttachmentRole::ColorResolve, 3),
                (AttachmentRole::DepthStencilResolve, 4),
            ]
        );
        assert!(refs.references(4));
        assert!(!refs.references(5));
    }
}
