//! Input descriptions consumed by the render pass compiler.
//!
//! These are plain value types supplied by the render target (attachments)
//! and by the pipeline author (load/store infos and subpasses). All of them
//! are `Hash + Eq` so a whole render pass topology can key a cache.

use ash::vk;

/// Check whether a format has a depth component.
pub fn is_depth_format(format: vk::Format) -> bool {
    is_depth_only_format(format) || is_depth_stencil_format(format)
}

/// Check whether a format is depth without stencil.
pub fn is_depth_only_format(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D16_UNORM | vk::Format::X8_D24_UNORM_PACK32 | vk::Format::D32_SFLOAT
    )
}

/// Check whether a format has both depth and stencil components.
pub fn is_depth_stencil_format(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D16_UNORM_S8_UINT
            | vk::Format::D24_UNORM_S8_UINT
            | vk::Format::D32_SFLOAT_S8_UINT
    )
}

/// Image aspects an attachment reference of this format covers.
pub fn aspect_mask_for_format(format: vk::Format) -> vk::ImageAspectFlags {
    if is_depth_stencil_format(format) {
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    } else if is_depth_only_format(format) {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

/// Description of an image shared by the subpasses of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attachment {
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub usage: vk::ImageUsageFlags,
    /// Layout the image is already in. `UNDEFINED` means "not known", in
    /// which case the compiler infers it from the first subpass using it.
    pub initial_layout: vk::ImageLayout,
}

impl Attachment {
    pub fn new(
        format: vk::Format,
        samples: vk::SampleCountFlags,
        usage: vk::ImageUsageFlags,
    ) -> Self {
        Self {
            format,
            samples,
            usage,
            initial_layout: vk::ImageLayout::UNDEFINED,
        }
    }

    /// Single-sampled color attachment.
    pub fn color(format: vk::Format) -> Self {
        Self::new(
            format,
            vk::SampleCountFlags::TYPE_1,
            vk::ImageUsageFlags::COLOR_ATTACHMENT,
        )
    }

    /// Single-sampled depth/stencil attachment.
    pub fn depth(format: vk::Format) -> Self {
        Self::new(
            format,
            vk::SampleCountFlags::TYPE_1,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
        )
    }

    pub fn with_samples(mut self, samples: vk::SampleCountFlags) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_usage(mut self, usage: vk::ImageUsageFlags) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_initial_layout(mut self, layout: vk::ImageLayout) -> Self {
        self.initial_layout = layout;
        self
    }

    pub fn is_depth(&self) -> bool {
        is_depth_format(self.format)
    }
}

/// Load and store operations of one attachment.
///
/// The same pair is applied to the color and stencil aspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadStoreInfo {
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
}

impl LoadStoreInfo {
    pub fn new(load_op: vk::AttachmentLoadOp, store_op: vk::AttachmentStoreOp) -> Self {
        Self { load_op, store_op }
    }

    /// Clear on load, discard on store. Typical for transient depth.
    pub fn clear_discard() -> Self {
        Self::new(vk::AttachmentLoadOp::CLEAR, vk::AttachmentStoreOp::DONT_CARE)
    }

    /// Keep previous contents and store the result.
    pub fn load_store() -> Self {
        Self::new(vk::AttachmentLoadOp::LOAD, vk::AttachmentStoreOp::STORE)
    }
}

impl Default for LoadStoreInfo {
    fn default() -> Self {
        Self::new(vk::AttachmentLoadOp::CLEAR, vk::AttachmentStoreOp::STORE)
    }
}

/// One subpass of a render pass, expressed as attachment indices per role.
///
/// The depth/stencil attachment is not listed explicitly: unless disabled,
/// every subpass uses the first depth-format attachment of the render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubpassInfo {
    pub input_attachments: Vec<u32>,
    pub output_attachments: Vec<u32>,
    pub color_resolve_attachments: Vec<u32>,
    pub disable_depth_stencil_attachment: bool,
    pub depth_stencil_resolve_attachment: Option<u32>,
    pub depth_stencil_resolve_mode: vk::ResolveModeFlags,
    pub debug_name: String,
}

impl SubpassInfo {
    pub fn new(debug_name: impl Into<String>) -> Self {
        Self {
            debug_name: debug_name.into(),
            ..Default::default()
        }
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = u32>) -> Self {
        self.input_attachments = inputs.into_iter().collect();
        self
    }

    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = u32>) -> Self {
        self.output_attachments = outputs.into_iter().collect();
        self
    }

    pub fn with_color_resolves(mut self, resolves: impl IntoIterator<Item = u32>) -> Self {
        self.color_resolve_attachments = resolves.into_iter().collect();
        self
    }

    pub fn without_depth_stencil(mut self) -> Self {
        self.disable_depth_stencil_attachment = true;
        self
    }

    /// Resolve the depth/stencil attachment into `attachment` with `mode`.
    pub fn with_depth_stencil_resolve(mut self, attachment: u32, mode: vk::ResolveModeFlags) -> Self {
        self.depth_stencil_resolve_attachment = Some(attachment);
        self.depth_stencil_resolve_mode = mode;
        self
    }

    pub fn resolves_depth_stencil(&self) -> bool {
        self.depth_stencil_resolve_mode != vk::ResolveModeFlags::NONE
    }
}

impl Default for SubpassInfo {
    fn default() -> Self {
        Self {
            input_attachments: Vec::new(),
            output_attachments: Vec::new(),
            color_resolve_attachments: Vec::new(),
            disable_depth_stencil_attachment: false,
            depth_stencil_resolve_attachment: None,
            depth_stencil_resolve_mode: vk::ResolveModeFlags::NONE,
            debug_name: String::new(),
        }
    }
}
