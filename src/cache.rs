//! Render pass cache.
//!
//! Pipelines built from the same attachment and subpass topology share one
//! device render pass. The cache is keyed by the complete compiler input, so
//! two requests hit the same entry only if they would compile identically.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::RenderPassDevice;
use crate::compiler::RenderPassCompiler;
use crate::error::RenderPassResult;
use crate::render_pass::CompiledRenderPass;
use crate::types::{Attachment, LoadStoreInfo, SubpassInfo};

/// Everything a compiled render pass depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassKey {
    pub attachments: Vec<Attachment>,
    pub load_store_infos: Vec<LoadStoreInfo>,
    pub subpasses: Vec<SubpassInfo>,
}

impl RenderPassKey {
    pub fn new(attachments: &[Attachment], load_store_infos: &[LoadStoreInfo], subpasses: &[SubpassInfo]) -> Self {
        Self {
            attachments: attachments.to_vec(),
            load_store_infos: load_store_infos.to_vec(),
            subpasses: subpasses.to_vec(),
        }
    }
}

/// Cache of compiled render passes, shared as `Arc<CompiledRenderPass>`.
///
/// Cached render passes live until [`clear`](Self::clear) destroys them.
#[derive(Debug, Default)]
pub struct RenderPassCache {
    entries: RwLock<HashMap<RenderPassKey, Arc<CompiledRenderPass>>>,
}

impl RenderPassCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the render pass for a topology, compiling it on first request.
    ///
    /// Failed compilations are not cached.
    pub fn request<D: RenderPassDevice>(
        &self,
        compiler: &RenderPassCompiler<'_, D>,
        attachments: &[Attachment],
        load_store_infos: &[LoadStoreInfo],
        subpasses: &[SubpassInfo],
    ) -> RenderPassResult<Arc<CompiledRenderPass>> {
        let key = RenderPassKey::new(attachments, load_store_infos, subpasses);

        // Fast path: read lock
        if let Some(render_pass) = self.entries.read().get(&key) {
            return Ok(Arc::clone(render_pass));
        }

        // Slow path: write lock, held while compiling so a topology compiles once
        let mut entries = self.entries.write();
        if let Some(render_pass) = entries.get(&key) {
            return Ok(Arc::clone(render_pass));
        }

        let render_pass = Arc::new(compiler.compile(attachments, load_store_infos, subpasses)?);
        log::debug!(
            "Cached render pass {:?} ({} subpasses)",
            render_pass.handle(),
            render_pass.subpass_count()
        );
        entries.insert(key, Arc::clone(&render_pass));

        Ok(render_pass)
    }

    /// Get the number of cached render passes.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Destroy every cached render pass and empty the cache.
    ///
    /// Handles still held elsewhere through their `Arc` become invalid.
    pub fn clear(&self, device: &dyn RenderPassDevice) {
        let entries: Vec<_> = self.entries.write().drain().map(|(_, entry)| entry).collect();

        for entry in entries {
            if Arc::strong_count(&entry) > 1 {
                log::warn!(
                    "Destroying render pass {:?} while it is still referenced",
                    entry.handle()
                );
            }
            device.destroy_render_pass(entry.handle());
        }
    }
}

#[cfg(test)]
mod tests {
    use ash::vk;

    use super::*;
    use crate::backend::dummy::DummyDevice;

    fn attachments() -> Vec<Attachment> {
        vec![
            Attachment::color(vk::Format::B8G8R8A8_SRGB),
            Attachment::depth(vk::Format::D32_SFLOAT),
        ]
    }

    #[test]
    fn test_cache_reuses_render_pass() {
        let device = DummyDevice::new();
        let compiler = RenderPassCompiler::new(&device);
        let cache = RenderPassCache::new();
        let subpasses = [SubpassInfo::new("forward").with_outputs([0])];

        let a = cache.request(&compiler, &attachments(), &[], &subpasses).unwrap();
        let b = cache.request(&compiler, &attachments(), &[], &subpasses).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!(device.created_render_passes().len(), 1);
    }

    #[test]
    fn test_cache_distinguishes_topologies() {
        let device = DummyDevice::new();
        let compiler = RenderPassCompiler::new(&device);
        let cache = RenderPassCache::new();

        let a = cache
            .request(&compiler, &attachments(), &[], &[SubpassInfo::new("forward").with_outputs([0])])
            .unwrap();
        let b = cache
            .request(
                &compiler,
                &attachments(),
                &[],
                &[SubpassInfo::new("forward").with_outputs([0]).without_depth_stencil()],
            )
            .unwrap();

        assert_ne!(a.handle(), b.handle());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_does_not_store_failures() {
        let device = DummyDevice::new();
        let compiler = RenderPassCompiler::new(&device);
        let cache = RenderPassCache::new();

        let result = cache.request(&compiler, &attachments(), &[], &[SubpassInfo::new("bad").with_inputs([7])]);

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear_destroys_entries() {
        let device = DummyDevice::new();
        let compiler = RenderPassCompiler::new(&device);
        let cache = RenderPassCache::new();

        cache.request(&compiler, &attachments(), &[], &[]).unwrap();
        cache
            .request(&compiler, &attachments(), &[LoadStoreInfo::load_store()], &[])
            .unwrap();
        assert_eq!(device.live_render_passes(), 2);

        cache.clear(&device);

        assert!(cache.is_empty());
        assert_eq!(device.live_render_passes(), 0);
    }
}
