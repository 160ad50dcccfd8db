//! Common utilities for render pass integration tests.
//!
//! This module provides shared test infrastructure that can be reused
//! across both create-info encodings.

use ash::vk;

use redlilium_renderpass::backend::dummy::{DummyDevice, RecordedRenderPass};
use redlilium_renderpass::{
    Attachment, CompiledRenderPass, CompilerConfig, EncodingKind, EncodingPreference,
    LoadStoreInfo, RenderPassCompiler, RenderPassResult, SubpassInfo,
};

pub const COLOR_FORMAT: vk::Format = vk::Format::B8G8R8A8_SRGB;
pub const GBUFFER_FORMAT: vk::Format = vk::Format::R16G16B16A16_SFLOAT;
pub const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

// ============================================================================
// Encoding Enumeration
// ============================================================================

/// Create-info encodings to run scenarios against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Legacy,
    Extended,
}

impl Encoding {
    pub fn kind(self) -> EncodingKind {
        match self {
            Encoding::Legacy => EncodingKind::Legacy,
            Encoding::Extended => EncodingKind::Extended,
        }
    }

    fn preference(self) -> EncodingPreference {
        match self {
            Encoding::Legacy => EncodingPreference::Legacy,
            Encoding::Extended => EncodingPreference::Extended,
        }
    }
}

// ============================================================================
// Test Context
// ============================================================================

/// A dummy device able to run either encoding.
pub struct TestContext {
    pub device: DummyDevice,
    pub encoding: Encoding,
}

impl TestContext {
    pub fn new(encoding: Encoding) -> Self {
        init_logging();
        Self {
            device: DummyDevice::new().with_extended_render_pass(true),
            encoding,
        }
    }

    pub fn compiler(&self) -> RenderPassCompiler<'_, DummyDevice> {
        let config = CompilerConfig::default().with_encoding(self.encoding.preference());
        match RenderPassCompiler::with_config(&self.device, &config) {
            Ok(compiler) => compiler,
            Err(e) => panic!("dummy device rejected {:?} encoding: {e}", self.encoding),
        }
    }

    pub fn compile(
        &self,
        attachments: &[Attachment],
        load_store_infos: &[LoadStoreInfo],
        subpasses: &[SubpassInfo],
    ) -> RenderPassResult<CompiledRenderPass> {
        self.compiler().compile(attachments, load_store_infos, subpasses)
    }

    /// What the device received for the most recent render pass.
    pub fn recorded(&self) -> RecordedRenderPass {
        self.device
            .last_render_pass()
            .expect("no render pass was created")
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Scenario Helpers
// ============================================================================

/// `[color, depth]`
pub fn forward_attachments() -> Vec<Attachment> {
    vec![Attachment::color(COLOR_FORMAT), Attachment::depth(DEPTH_FORMAT)]
}

/// `[color A, color B, depth]`
pub fn two_color_attachments() -> Vec<Attachment> {
    vec![
        Attachment::color(COLOR_FORMAT),
        Attachment::color(GBUFFER_FORMAT),
        Attachment::depth(DEPTH_FORMAT),
    ]
}

/// `[backbuffer, depth, albedo, normal]` with a geometry and a lighting subpass.
pub fn deferred_setup() -> (Vec<Attachment>, Vec<LoadStoreInfo>, Vec<SubpassInfo>) {
    let attachments = vec![
        Attachment::color(COLOR_FORMAT),
        Attachment::depth(DEPTH_FORMAT),
        Attachment::color(vk::Format::R8G8B8A8_UNORM),
        Attachment::color(GBUFFER_FORMAT),
    ];
    let load_store = vec![
        LoadStoreInfo::default(),
        LoadStoreInfo::clear_discard(),
        LoadStoreInfo::clear_discard(),
        LoadStoreInfo::clear_discard(),
    ];
    let subpasses = vec![
        SubpassInfo::new("geometry").with_outputs([2, 3]),
        SubpassInfo::new("lighting").with_inputs([1, 2, 3]).with_outputs([0]),
    ];
    (attachments, load_store, subpasses)
}

/// A chain of `count` subpasses writing attachment 0 with depth/stencil disabled.
pub fn color_chain(count: usize) -> Vec<SubpassInfo> {
    (0..count)
        .map(|i| SubpassInfo::new(format!("pass_{i}")).with_outputs([0]).without_depth_stencil())
        .collect()
}
