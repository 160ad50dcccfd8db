//! Render pass compilation errors.

use ash::vk;
use thiserror::Error;

/// Role in which a subpass references an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentRole {
    Color,
    Input,
    DepthStencil,
    ColorResolve,
    DepthStencilResolve,
}

impl std::fmt::Display for AttachmentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Color => "color output",
            Self::Input => "input",
            Self::DepthStencil => "depth/stencil",
            Self::ColorResolve => "color resolve",
            Self::DepthStencilResolve => "depth/stencil resolve",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by [`RenderPassCompiler::compile`](crate::RenderPassCompiler::compile).
///
/// A mismatch between the attachment and load/store counts is not an error:
/// it is logged as a warning and compilation continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderPassError {
    #[error(
        "subpass {subpass} references attachment {attachment} as {role}, \
         but only {attachment_count} attachments were provided"
    )]
    AttachmentOutOfRange {
        subpass: usize,
        role: AttachmentRole,
        attachment: u32,
        attachment_count: usize,
    },
    #[error("subpass {subpass} sets a depth/stencil resolve mode without a resolve attachment")]
    MissingDepthResolveAttachment { subpass: usize },
    #[error("{context}: {result:?}")]
    CreationFailed {
        result: vk::Result,
        context: &'static str,
    },
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
}

impl RenderPassError {
    /// Wrap a failed render pass creation call.
    pub fn creation_failed(result: vk::Result) -> Self {
        Self::CreationFailed {
            result,
            context: "cannot create render pass",
        }
    }
}

pub type RenderPassResult<T> = Result<T, RenderPassError>;
