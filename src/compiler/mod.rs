//! Render pass compilation.
//!
//! Turns attachments, load/store infos and subpasses into a
//! [`CompiledRenderPass`]: a table of attachment descriptors with inferred
//! initial and final layouts, per-subpass attachment references, and the
//! subpass dependencies that order the subpasses.
//!
//! # Pipeline
//!
//! 1. [`attachments`] - one descriptor per attachment, load/store ops applied
//! 2. [`references`] - per-subpass references by role (or the default subpass)
//! 3. [`layout`] - initial layouts (first touch), final layouts (terminal subpass)
//! 4. [`dependencies`] - color chain plus depth chain when depth is shared
//! 5. [`RenderPassCompiler`] - hands the result to the selected encoder and device
//!
//! Steps 1-4 are backend independent and exposed through [`compile_layout`].
//!
//! # Example
//!
//! ```ignore
//! let device = DummyDevice::new();
//! let compiler = RenderPassCompiler::new(&device);
//!
//! let attachments = [
//!     Attachment::color(vk::Format::B8G8R8A8_SRGB),
//!     Attachment::depth(vk::Format::D32_SFLOAT),
//! ];
//! let load_store = [LoadStoreInfo::default(), LoadStoreInfo::clear_discard()];
//! let subpasses = [SubpassInfo::new("forward").with_outputs([0])];
//!
//! let render_pass = compiler.compile(&attachments, &load_store, &subpasses)?;
//! assert_eq!(render_pass.color_output_count(0), 1);
//! ```

pub mod attachments;
pub mod dependencies;
pub mod layout;
pub mod references;

pub use attachments::AttachmentDescriptor;
pub use dependencies::SubpassDependency;
pub use references::{AttachmentRef, SubpassReferences, find_depth_attachment};

use crate::backend::{self, EncodingKind, RenderPassDevice, RenderPassEncoder};
use crate::error::{RenderPassError, RenderPassResult};
use crate::render_pass::CompiledRenderPass;
use crate::types::{Attachment, LoadStoreInfo, SubpassInfo};

/// Which create-info encoding the compiler hands to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingPreference {
    /// Extended encoding when the device supports it, legacy otherwise.
    #[default]
    Auto,
    /// Always `VkRenderPassCreateInfo`. Depth/stencil resolves are dropped.
    Legacy,
    /// Always `VkRenderPassCreateInfo2`. Fails on devices without support.
    Extended,
}

/// Configuration of a [`RenderPassCompiler`].
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    pub encoding: EncodingPreference,
}

impl CompilerConfig {
    pub fn with_encoding(mut self, encoding: EncodingPreference) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Backend-independent result of render pass compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassLayout {
    pub attachments: Vec<AttachmentDescriptor>,
    pub subpasses: Vec<SubpassReferences>,
    pub dependencies: Vec<SubpassDependency>,
    /// Number of color references per subpass.
    pub color_output_counts: Vec<u32>,
    /// The single attachment used as depth/stencil, if any.
    pub depth_attachment: Option<u32>,
}

impl RenderPassLayout {
    pub fn subpass_count(&self) -> usize {
        self.subpasses.len()
    }
}

/// Infer layouts, references and dependencies without touching a device.
///
/// An empty `subpasses` list compiles to a single default subpass. A
/// `load_store_infos` list whose length differs from `attachments` is
/// tolerated: a warning is logged and attachments without a matching entry
/// get `DONT_CARE` operations.
pub fn compile_layout(
    attachments: &[Attachment],
    load_store_infos: &[LoadStoreInfo],
    subpasses: &[SubpassInfo],
) -> RenderPassResult<RenderPassLayout> {
    if load_store_infos.len() != attachments.len() {
        log::warn!(
            "Render pass has {} attachments but {} load/store infos",
            attachments.len(),
            load_store_infos.len()
        );
    }

    let mut descriptors = attachments::build(attachments, load_store_infos);

    let depth_attachment = find_depth_attachment(attachments);
    let depth_format_count = attachments.iter().filter(|a| a.is_depth()).count();
    if depth_format_count > 1 {
        log::debug!(
            "{} depth attachments provided, only attachment {:?} is bound as depth/stencil",
            depth_format_count,
            depth_attachment
        );
    }

    let mut subpass_refs = if subpasses.is_empty() {
        vec![references::collect_default(attachments)]
    } else {
        references::collect(attachments, subpasses)?
    };

    layout::assign_initial_layouts(&mut descriptors, &subpass_refs);
    layout::release_depth_used_as_input(&mut subpass_refs);
    layout::assign_final_layouts(&mut descriptors, &subpass_refs);

    let depth_shared = dependencies::depth_is_shared(&subpass_refs, depth_attachment);
    let dependencies = dependencies::synthesize(subpass_refs.len(), depth_shared);

    let color_output_counts = subpass_refs.iter().map(|s| s.color.len() as u32).collect();

    log::debug!(
        "Compiled render pass layout: {} attachments, {} subpasses, {} dependencies (depth shared: {})",
        descriptors.len(),
        subpass_refs.len(),
        dependencies.len(),
        depth_shared
    );

    Ok(RenderPassLayout {
        attachments: descriptors,
        subpasses: subpass_refs,
        dependencies,
        color_output_counts,
        depth_attachment,
    })
}

/// Compiles render pass descriptions into device render passes.
///
/// The encoding is chosen once, when the compiler is created. Compilation
/// itself holds no state, so one compiler can serve any number of calls.
pub struct RenderPassCompiler<'a, D: RenderPassDevice> {
    device: &'a D,
    encoder: &'static dyn RenderPassEncoder,
}

impl<'a, D: RenderPassDevice> RenderPassCompiler<'a, D> {
    /// Create a compiler using the best encoding the device supports.
    pub fn new(device: &'a D) -> Self {
        let kind = if device.supports_extended_render_pass() {
            EncodingKind::Extended
        } else {
            EncodingKind::Legacy
        };

        Self {
            device,
            encoder: backend::encoder(kind),
        }
    }

    /// Create a compiler with an explicit configuration.
    pub fn with_config(device: &'a D, config: &CompilerConfig) -> RenderPassResult<Self> {
        let kind = match config.encoding {
            EncodingPreference::Auto => return Ok(Self::new(device)),
            EncodingPreference::Legacy => EncodingKind::Legacy,
            EncodingPreference::Extended if device.supports_extended_render_pass() => {
                EncodingKind::Extended
            }
            EncodingPreference::Extended => {
                return Err(RenderPassError::FeatureNotSupported(
                    "VkRenderPassCreateInfo2 encoding".to_string(),
                ))
            }
        };

        Ok(Self {
            device,
            encoder: backend::encoder(kind),
        })
    }

    pub fn encoding(&self) -> EncodingKind {
        self.encoder.kind()
    }

    pub fn device(&self) -> &'a D {
        self.device
    }

    /// Compile and create a render pass.
    ///
    /// # Errors
    ///
    /// - [`RenderPassError::AttachmentOutOfRange`] if a subpass lists an index
    ///   past the end of `attachments`
    /// - [`RenderPassError::MissingDepthResolveAttachment`] if a subpass sets a
    ///   depth/stencil resolve mode without a target
    /// - [`RenderPassError::CreationFailed`] if the device rejects the render pass
    pub fn compile(
        &self,
        attachments: &[Attachment],
        load_store_infos: &[LoadStoreInfo],
        subpasses: &[SubpassInfo],
    ) -> RenderPassResult<CompiledRenderPass> {
        let layout = compile_layout(attachments, load_store_infos, subpasses)?;

        let handle = self
            .encoder
            .create(self.device, &layout)
            .map_err(RenderPassError::creation_failed)?;

        let granularity = self.device.render_area_granularity(handle);

        Ok(CompiledRenderPass::new(layout, handle, granularity, self.encoder.kind()))
    }
}
