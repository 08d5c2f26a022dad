/// Render device collaborator interfaces.
///
/// The scene layer never talks to a GPU API directly. It consumes these
/// traits: a device receiving clear/bind/draw commands, a factory creating
/// render targets for scene scripts, and a provider resolving named effects
/// and textures. Backends implement them.

use std::fmt;
use std::sync::Arc;
use bitflags::bitflags;
use glam::Vec4;
use crate::error::Galaxy3dResult;
use super::material::Material;
use super::render_operation::RenderOperation;

bitflags! {
    /// Buffers affected by `RenderDevice::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const TARGET  = 1 << 0;
        const DEPTH   = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

// ===== FORMATS =====

/// Color formats a scene script can request for a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    A8R8G8B8,
    X8R8G8B8,
    A2R10G10B10,
    R32F,
    G16R16F,
    A16B16G16R16F,
    A32B32G32R32F,
}

impl PixelFormat {
    /// Parse a format name as written in scene scripts (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        const NAMES: [(&str, PixelFormat); 7] = [
            ("A8R8G8B8", PixelFormat::A8R8G8B8),
            ("X8R8G8B8", PixelFormat::X8R8G8B8),
            ("A2R10G10B10", PixelFormat::A2R10G10B10),
            ("R32F", PixelFormat::R32F),
            ("G16R16F", PixelFormat::G16R16F),
            ("A16B16G16R16F", PixelFormat::A16B16G16R16F),
            ("A32B32G32R32F", PixelFormat::A32B32G32R32F),
        ];
        NAMES.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, f)| *f)
    }
}

/// Depth-stencil formats a scene script can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFormat {
    D16,
    D24X8,
    D24S8,
    D32,
}

impl DepthFormat {
    /// Parse a depth format name as written in scene scripts (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        const NAMES: [(&str, DepthFormat); 4] = [
            ("D16", DepthFormat::D16),
            ("D24X8", DepthFormat::D24X8),
            ("D24S8", DepthFormat::D24S8),
            ("D32", DepthFormat::D32),
        ];
        NAMES.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, f)| *f)
    }
}

// ===== RESOURCE HANDLES =====

/// Render target handle created by an `ObjectFactory`
pub trait RenderTarget: Send + Sync + fmt::Debug {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> PixelFormat;
    fn sample_count(&self) -> u32;
}

/// Depth-stencil buffer handle created by an `ObjectFactory`
pub trait DepthStencilBuffer: Send + Sync + fmt::Debug {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> DepthFormat;
}

/// Texture handle resolved by a `ResourceProvider`
pub trait Texture: Send + Sync + fmt::Debug {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Effect (shader program family) resolved by a `ResourceProvider`
pub trait Effect: Send + Sync + fmt::Debug {
    /// Effect name, as referenced by `<Source>` in scene scripts
    fn name(&self) -> &str;

    /// Whether the effect exposes a parameter with this name
    fn has_parameter(&self, name: &str) -> bool;
}

// ===== DESCRIPTORS =====

/// Render target creation descriptor (sizes already resolved to pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub sample_count: u32,
}

/// Depth-stencil creation descriptor (sizes already resolved to pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilDesc {
    pub width: u32,
    pub height: u32,
    pub format: DepthFormat,
}

// ===== COLLABORATOR TRAITS =====

/// Device receiving the commands produced by batches and scene passes.
pub trait RenderDevice {
    /// Clear the selected buffers of the bound targets.
    fn clear(&mut self, flags: ClearFlags, color: Vec4, depth: f32, stencil: i32) -> Galaxy3dResult<()>;

    /// Bind (or unbind with `None`) the color target at `index`.
    fn set_render_target(&mut self, index: u32, target: Option<&Arc<dyn RenderTarget>>) -> Galaxy3dResult<()>;

    /// Bind (or unbind with `None`) the depth-stencil buffer.
    fn set_depth_stencil_buffer(&mut self, buffer: Option<&Arc<dyn DepthStencilBuffer>>) -> Galaxy3dResult<()>;

    /// Submit a batch of operations sharing `material`.
    ///
    /// `selector_id` is the pass selector (-1 means "all passes").
    fn render(&mut self, material: &Material, operations: &[RenderOperation], selector_id: i32) -> Galaxy3dResult<()>;
}

/// Factory for GPU objects declared by scene scripts
pub trait ObjectFactory {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Galaxy3dResult<Arc<dyn RenderTarget>>;
    fn create_depth_stencil_buffer(&mut self, desc: &DepthStencilDesc) -> Galaxy3dResult<Arc<dyn DepthStencilBuffer>>;
}

/// Named lookup of effects and textures referenced by scene scripts.
///
/// Passed explicitly to the script parser.
pub trait ResourceProvider: Send + Sync {
    fn effect(&self, name: &str) -> Option<Arc<dyn Effect>>;
    fn texture(&self, name: &str) -> Option<Arc<dyn Texture>>;
}
