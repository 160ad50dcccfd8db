//! Dummy render pass device for testing and development.
//!
//! This device doesn't talk to a GPU. It hands out unique fake handles and
//! keeps a decoded copy of every create-info it receives, so tests can check
//! exactly what an encoder produced without requiring GPU hardware.

use std::sync::atomic::{AtomicU64, Ordering};

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use parking_lot::Mutex;

use super::{EncodingKind, RenderPassDevice};
use crate::compiler::SubpassDependency;

/// Attachment description as received by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedAttachment {
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub initial_layout: vk::ImageLayout,
    pub final_layout: vk::ImageLayout,
}

/// Subpass description as received by the device.
///
/// References are `(attachment, layout)` pairs. Aspect masks and resolve
/// modes stay empty for the legacy encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedSubpass {
    pub color: Vec<(u32, vk::ImageLayout)>,
    pub input: Vec<(u32, vk::ImageLayout)>,
    pub input_aspect_masks: Vec<vk::ImageAspectFlags>,
    pub resolve: Vec<(u32, vk::ImageLayout)>,
    pub depth_stencil: Option<(u32, vk::ImageLayout)>,
    pub depth_stencil_resolve: Option<(u32, vk::ImageLayout)>,
    pub depth_resolve_mode: vk::ResolveModeFlags,
    pub stencil_resolve_mode: vk::ResolveModeFlags,
}

/// A render pass created on a [`DummyDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRenderPass {
    pub handle: vk::RenderPass,
    pub encoding: EncodingKind,
    pub attachments: Vec<RecordedAttachment>,
    pub subpasses: Vec<RecordedSubpass>,
    pub dependencies: Vec<SubpassDependency>,
}

/// Dummy render pass device.
#[derive(Debug)]
pub struct DummyDevice {
    extended_render_pass: bool,
    granularity: vk::Extent2D,
    failure: Option<vk::Result>,
    recording: bool,
    next_handle: AtomicU64,
    created: Mutex<Vec<RecordedRenderPass>>,
    destroyed: Mutex<Vec<vk::RenderPass>>,
}

impl DummyDevice {
    /// Create a new dummy device with legacy render pass support only.
    pub fn new() -> Self {
        Self {
            extended_render_pass: false,
            granularity: vk::Extent2D { width: 1, height: 1 },
            failure: None,
            recording: true,
            next_handle: AtomicU64::new(1),
            created: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_extended_render_pass(mut self, supported: bool) -> Self {
        self.extended_render_pass = supported;
        self
    }

    pub fn with_render_area_granularity(mut self, granularity: vk::Extent2D) -> Self {
        self.granularity = granularity;
        self
    }

    /// Make every render pass creation fail with `result`.
    pub fn with_failure(mut self, result: vk::Result) -> Self {
        self.failure = Some(result);
        self
    }

    /// Keep decoded create-infos (the default). Turned off for benchmarks.
    pub fn with_recording(mut self, recording: bool) -> Self {
        self.recording = recording;
        self
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Dummy Device"
    }

    /// All render passes created so far, in creation order.
    pub fn created_render_passes(&self) -> Vec<RecordedRenderPass> {
        self.created.lock().clone()
    }

    pub fn last_render_pass(&self) -> Option<RecordedRenderPass> {
        self.created.lock().last().cloned()
    }

    pub fn destroyed_render_passes(&self) -> Vec<vk::RenderPass> {
        self.destroyed.lock().clone()
    }

    /// Number of recorded render passes not destroyed yet.
    pub fn live_render_passes(&self) -> usize {
        self.created.lock().len().saturating_sub(self.destroyed.lock().len())
    }

    fn record(&self, mut render_pass: RecordedRenderPass) -> VkResult<vk::RenderPass> {
        if let Some(result) = self.failure {
            log::trace!("DummyDevice: failing render pass creation with {:?}", result);
            return Err(result);
        }

        let handle = vk::RenderPass::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed));
        render_pass.handle = handle;

        log::trace!(
            "DummyDevice: created render pass {:?} ({}, {} attachments, {} subpasses)",
            handle,
            render_pass.encoding,
            render_pass.attachments.len(),
            render_pass.subpasses.len()
        );

        if self.recording {
            self.created.lock().push(render_pass);
        }
        Ok(handle)
    }
}

impl Default for DummyDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassDevice for DummyDevice {
    fn supports_extended_render_pass(&self) -> bool {
        self.extended_render_pass
    }

    fn create_render_pass(&self, create_info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        // SAFETY: the create-info and the arrays it points to are borrowed for
        // the duration of this call, as for a real vkCreateRenderPass.
        let render_pass = unsafe { decode_legacy(create_info) };
        self.record(render_pass)
    }

    fn create_render_pass2(&self, create_info: &vk::RenderPassCreateInfo2<'_>) -> VkResult<vk::RenderPass> {
        if !self.extended_render_pass {
            return Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT);
        }

        // SAFETY: as above.
        let render_pass = unsafe { decode_extended(create_info) };
        self.record(render_pass)
    }

    fn render_area_granularity(&self, _render_pass: vk::RenderPass) -> vk::Extent2D {
        self.granularity
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        log::trace!("DummyDevice: destroying render pass {:?}", render_pass);
        self.destroyed.lock().push(render_pass);
    }
}

unsafe fn raw_slice<'a, T>(ptr: *const T, len: u32) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len as usize)
    }
}

unsafe fn decode_legacy(info: &vk::RenderPassCreateInfo<'_>) -> RecordedRenderPass {
    let attachments = raw_slice(info.p_attachments, info.attachment_count)
        .iter()
        .map(|a| RecordedAttachment {
            format: a.format,
            samples: a.samples,
            load_op: a.load_op,
            store_op: a.store_op,
            initial_layout: a.initial_layout,
            final_layout: a.final_layout,
        })
        .collect();

    let pair = |r: &vk::AttachmentReference| (r.attachment, r.layout);

    let subpasses = raw_slice(info.p_subpasses, info.subpass_count)
        .iter()
        .map(|s| RecordedSubpass {
            color: raw_slice(s.p_color_attachments, s.color_attachment_count)
                .iter()
                .map(pair)
                .collect(),
            input: raw_slice(s.p_input_attachments, s.input_attachment_count)
                .iter()
                .map(pair)
                .collect(),
            resolve: raw_slice(s.p_resolve_attachments, s.color_attachment_count)
                .iter()
                .map(pair)
                .collect(),
            depth_stencil: s.p_depth_stencil_attachment.as_ref().map(pair),
            ..Default::default()
        })
        .collect();

    let dependencies = raw_slice(info.p_dependencies, info.dependency_count)
        .iter()
        .map(|d| SubpassDependency {
            src_subpass: d.src_subpass,
            dst_subpass: d.dst_subpass,
            src_stage_mask: d.src_stage_mask,
            dst_stage_mask: d.dst_stage_mask,
            src_access_mask: d.src_access_mask,
            dst_access_mask: d.dst_access_mask,
            dependency_flags: d.dependency_flags,
        })
        .collect();

    RecordedRenderPass {
        handle: vk::RenderPass::null(),
        encoding: EncodingKind::Legacy,
        attachments,
        subpasses,
        dependencies,
    }
}

unsafe fn decode_extended(info: &vk::RenderPassCreateInfo2<'_>) -> RecordedRenderPass {
    let attachments = raw_slice(info.p_attachments, info.attachment_count)
        .iter()
        .map(|a| RecordedAttachment {
            format: a.format,
            samples: a.samples,
            load_op: a.load_op,
            store_op: a.store_op,
            initial_layout: a.initial_layout,
            final_layout: a.final_layout,
        })
        .collect();

    let pair = |r: &vk::AttachmentReference2| (r.attachment, r.layout);

    let subpasses = raw_slice(info.p_subpasses, info.subpass_count)
        .iter()
        .map(|s| {
            let inputs = raw_slice(s.p_input_attachments, s.input_attachment_count);
            let mut subpass = RecordedSubpass {
                color: raw_slice(s.p_color_attachments, s.color_attachment_count)
                    .iter()
                    .map(pair)
                    .collect(),
                input: inputs.iter().map(pair).collect(),
                input_aspect_masks: inputs.iter().map(|r| r.aspect_mask).collect(),
                resolve: raw_slice(s.p_resolve_attachments, s.color_attachment_count)
                    .iter()
                    .map(pair)
                    .collect(),
                depth_stencil: s.p_depth_stencil_attachment.as_ref().map(pair),
                ..Default::default()
            };

            if let Some(resolve) = find_depth_stencil_resolve(s) {
                subpass.depth_stencil_resolve = resolve.p_depth_stencil_resolve_attachment.as_ref().map(pair);
                subpass.depth_resolve_mode = resolve.depth_resolve_mode;
                subpass.stencil_resolve_mode = resolve.stencil_resolve_mode;
            }

            subpass
        })
        .collect();

    let dependencies = raw_slice(info.p_dependencies, info.dependency_count)
        .iter()
        .map(|d| SubpassDependency {
            src_subpass: d.src_subpass,
            dst_subpass: d.dst_subpass,
            src_stage_mask: d.src_stage_mask,
            dst_stage_mask: d.dst_stage_mask,
            src_access_mask: d.src_access_mask,
            dst_access_mask: d.dst_access_mask,
            dependency_flags: d.dependency_flags,
        })
        .collect();

    RecordedRenderPass {
        handle: vk::RenderPass::null(),
        encoding: EncodingKind::Extended,
        attachments,
        subpasses,
        dependencies,
    }
}

/// Walk the `pNext` chain of a subpass for a depth/stencil resolve.
unsafe fn find_depth_stencil_resolve<'a>(
    subpass: &'a vk::SubpassDescription2<'_>,
) -> Option<&'a vk::SubpassDescriptionDepthStencilResolve<'a>> {
    let mut next = subpass.p_next as *const vk::BaseInStructure<'_>;

    while let Some(base) = next.as_ref() {
        if base.s_type == vk::StructureType::SUBPASS_DESCRIPTION_DEPTH_STENCIL_RESOLVE {
            return Some(&*(next as *const vk::SubpassDescriptionDepthStencilResolve<'a>));
        }
        next = base.p_next;
    }

    None
}

static_assertions::assert_impl_all!(DummyDevice: Send, Sync);
