//! Attachment layout inference.
//!
//! Runs in three explicit steps over the reference table built by
//! [`references`](super::references):
//!
//! 1. [`assign_initial_layouts`] - an attachment starts in the layout the first
//!    subpass touching it expects (first touch wins).
//! 2. [`release_depth_used_as_input`] - the terminal subpass drops its
//!    depth/stencil reference when it reads that same depth image as input.
//! 3. [`assign_final_layouts`] - an attachment ends in the layout the terminal
//!    subpass leaves it in.
//!
//! Final layouts only look at the terminal subpass: an attachment last used
//! by an earlier subpass keeps the default final layout of the attachment
//! table. It is not a "last use anywhere" rule.

use ash::vk;

use super::attachments::AttachmentDescriptor;
use super::references::SubpassReferences;

/// Set the initial layout of every attachment still `UNDEFINED` to the
/// layout of its first reference.
///
/// Subpasses are scanned in order and, within a subpass, references in role
/// order (see [`SubpassReferences::iter`]). Layouts declared by the caller are
/// never overwritten.
pub fn assign_initial_layouts(attachments: &mut [AttachmentDescriptor], subpasses: &[SubpassReferences]) {
    for reference in subpasses.iter().flat_map(|s| s.iter()).map(|(_, r)| r) {
        let attachment = &mut attachments[reference.attachment as usize];
        if attachment.initial_layout == vk::ImageLayout::UNDEFINED {
            attachment.initial_layout = reference.layout;
        }
    }
}

/// Clear the depth/stencil reference of the terminal subpass if that subpass
/// also reads the bound depth attachment as an input attachment.
///
/// Binding the same depth image as both input and depth/stencil attachment
/// would write two conflicting final layouts for it. Other depth-format
/// inputs (a shadow map, say) leave the reference alone. Returns whether a
/// reference was cleared.
pub fn release_depth_used_as_input(subpasses: &mut [SubpassReferences]) -> bool {
    let Some(last) = subpasses.last_mut() else {
        return false;
    };
    let Some(depth) = last.depth_stencil.map(|r| r.attachment) else {
        return false;
    };

    if last.input.iter().any(|r| r.attachment == depth) {
        log::debug!(
            "Subpass {:?} reads depth attachment {} as input, dropping its depth/stencil attachment",
            last.debug_name,
            depth
        );
        last.depth_stencil = None;
        return true;
    }

    false
}

/// Set the final layout of every attachment referenced by the terminal
/// subpass. When one attachment appears in several roles, the last role in
/// role order wins.
pub fn assign_final_layouts(attachments: &mut [AttachmentDescriptor], subpasses: &[SubpassReferences]) {
    let Some(last) = subpasses.last() else {
        return;
    };

    for (role, reference) in last.iter() {
        log::trace!(
            "Attachment {} leaves the render pass in {:?} ({})",
            reference.attachment,
            reference.layout,
            role
        );
        attachments[reference.attachment as usize].final_layout = reference.layout;
    }
}
