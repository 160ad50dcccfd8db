//! Attachment table: concrete attachment descriptors built from the inputs.

use ash::vk;

use crate::types::{Attachment, LoadStoreInfo, is_depth_format};

/// Backend-neutral description of one render pass attachment.
///
/// Translated to `VkAttachmentDescription` or `VkAttachmentDescription2` by
/// the selected [`RenderPassEncoder`](crate::backend::RenderPassEncoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentDescriptor {
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub stencil_load_op: vk::AttachmentLoadOp,
    pub stencil_store_op: vk::AttachmentStoreOp,
    pub initial_layout: vk::ImageLayout,
    pub final_layout: vk::ImageLayout,
}

/// Final layout an attachment keeps when the terminal subpass doesn't touch it.
pub fn default_final_layout(format: vk::Format) -> vk::ImageLayout {
    if is_depth_format(format) {
        vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL
    } else {
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
    }
}

/// Build one descriptor per attachment.
///
/// Load/store infos are matched by index. Attachments past the end of
/// `load_store_infos` get `DONT_CARE` for every operation.
pub fn build(attachments: &[Attachment], load_store_infos: &[LoadStoreInfo]) -> Vec<AttachmentDescriptor> {
    attachments
        .iter()
        .enumerate()
        .map(|(i, attachment)| {
            let (load_op, store_op) = match load_store_infos.get(i) {
                Some(info) => (info.load_op, info.store_op),
                None => (vk::AttachmentLoadOp::DONT_CARE, vk::AttachmentStoreOp::DONT_CARE),
            };

            AttachmentDescriptor {
                format: attachment.format,
                samples: attachment.samples,
                load_op,
                store_op,
                stencil_load_op: load_op,
                stencil_store_op: store_op,
                initial_layout: attachment.initial_layout,
                final_layout: default_final_layout(attachment.format),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_copies_load_store_to_both_aspects() {
        let attachments = [
            Attachment::color(vk::Format::R8G8B8A8_UNORM),
            Attachment::depth(vk::Format::D24_UNORM_S8_UINT),
        ];
        let infos = [LoadStoreInfo::default(), LoadStoreInfo::clear_discard()];

        let table = build(&attachments, &infos);

        assert_eq!(table.len(), 2);
        assert_eq!(table[1].load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(table[1].store_op, vk::AttachmentStoreOp::DONT_CARE);
        assert_eq!(table[1].stencil_load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(table[1].stencil_store_op, vk::AttachmentStoreOp::DONT_CARE);
        assert_eq!(table[0].store_op, vk::AttachmentStoreOp::STORE);
    }

    #[test]
    fn test_build_defaults_missing_load_store() {
        let attachments = [
            Attachment::color(vk::Format::R8G8B8A8_UNORM),
            Attachment::color(vk::Format::R16G16B16A16_SFLOAT),
        ];
        let table = build(&attachments, &[LoadStoreInfo::load_store()]);

        assert_eq!(table[0].load_op, vk::AttachmentLoadOp::LOAD);
        assert_eq!(table[1].load_op, vk::AttachmentLoadOp::DONT_CARE);
        assert_eq!(table[1].store_op, vk::AttachmentStoreOp::DONT_CARE);
    }

    #[test]
    fn test_build_final_layout_depends_on_format() {
        let attachments = [
            Attachment::color(vk::Format::B8G8R8A8_SRGB),
            Attachment::depth(vk::Format::D32_SFLOAT)
                .with_initial_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
        ];
        let table = build(&attachments, &[]);

        assert_eq!(table[0].final_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        assert_eq!(table[0].initial_layout, vk::ImageLayout::UNDEFINED);
        assert_eq!(table[1].final_layout, vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL);
        assert_eq!(
            table[1].initial_layout,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        );
    }
}
