//! Subpass dependency synthesis.
//!
//! Every pair of adjacent subpasses gets a by-region color dependency. A
//! second, depth/stencil dependency per pair is added when the depth
//! attachment is shared between subpasses (see [`depth_is_shared`]).

use ash::vk;

use super::references::SubpassReferences;

/// Backend-neutral subpass dependency.
///
/// `src_subpass` / `dst_subpass` may be `vk::SUBPASS_EXTERNAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubpassDependency {
    pub src_subpass: u32,
    pub dst_subpass: u32,
    pub src_stage_mask: vk::PipelineStageFlags,
    pub dst_stage_mask: vk::PipelineStageFlags,
    pub src_access_mask: vk::AccessFlags,
    pub dst_access_mask: vk::AccessFlags,
    pub dependency_flags: vk::DependencyFlags,
}

impl SubpassDependency {
    /// Color writes of `src` made visible to color and input reads of `dst`.
    pub fn color(src: u32, dst: u32) -> Self {
        Self {
            src_subpass: src,
            dst_subpass: dst,
            src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::FRAGMENT_SHADER,
            src_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            dst_access_mask: vk::AccessFlags::INPUT_ATTACHMENT_READ
                | vk::AccessFlags::COLOR_ATTACHMENT_READ
                | vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            dependency_flags: vk::DependencyFlags::BY_REGION,
        }
    }

    /// Depth/stencil writes of `src` made visible to depth tests and input
    /// reads of `dst`.
    pub fn depth_stencil(src: u32, dst: u32) -> Self {
        let fragment_tests = vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
            | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS;

        Self {
            src_subpass: src,
            dst_subpass: dst,
            src_stage_mask: fragment_tests,
            dst_stage_mask: fragment_tests | vk::PipelineStageFlags::FRAGMENT_SHADER,
            src_access_mask: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            dst_access_mask: vk::AccessFlags::INPUT_ATTACHMENT_READ
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            dependency_flags: vk::DependencyFlags::BY_REGION,
        }
    }

    pub fn by_region(&self) -> bool {
        self.dependency_flags.contains(vk::DependencyFlags::BY_REGION)
    }
}

/// Decide whether depth/stencil dependencies are needed.
///
/// True when more than one subpass binds a depth/stencil attachment, or when
/// any subpass reads `depth_attachment` as an input attachment. This is a
/// heuristic over the reference table, not a hazard analysis: it can add a
/// dependency that a particular pipeline does not strictly need.
pub fn depth_is_shared(subpasses: &[SubpassReferences], depth_attachment: Option<u32>) -> bool {
    let depth_users = subpasses
        .iter()
        .filter(|s| s.depth_stencil.is_some())
        .count();

    let depth_read_as_input = depth_attachment.is_some_and(|depth| {
        subpasses
            .iter()
            .any(|s| s.input.iter().any(|r| r.attachment == depth))
    });

    depth_users > 1 || depth_read_as_input
}

/// Chain `subpass_count` subpasses with dependencies between neighbours.
///
/// Color dependencies come first, one per adjacent pair; depth/stencil
/// dependencies follow when `depth_shared` is set.
pub fn synthesize(subpass_count: usize, depth_shared: bool) -> Vec<SubpassDependency> {
    if subpass_count <= 1 {
        return Vec::new();
    }

    let pairs = (0..subpass_count as u32 - 1).map(|src| (src, src + 1));

    let mut dependencies: Vec<_> = pairs
        .clone()
        .map(|(src, dst)| SubpassDependency::color(src, dst))
        .collect();

    if depth_shared {
        dependencies.extend(pairs.map(|(src, dst)| SubpassDependency::depth_stencil(src, dst)));
    }

    dependencies
}
