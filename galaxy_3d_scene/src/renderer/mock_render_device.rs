/// Mock render device and resources for unit tests (no GPU required)
///
/// The mock device records every command it receives so tests can assert
/// on what batches and scene passes submitted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use glam::Vec4;
use rustc_hash::FxHashMap;
use crate::error::{Galaxy3dError, Galaxy3dResult};
use crate::renderer::{
    ClearFlags, DepthFormat, DepthStencilBuffer, DepthStencilDesc, Effect, Material,
    MaterialId, ObjectFactory, ParamValue, PixelFormat, RenderDevice, RenderOperation,
    RenderTarget, RenderTargetDesc, ResourceProvider, Texture,
};

// ============================================================================
// Recorded commands
// ============================================================================

#[derive(Debug, Clone)]
pub enum DeviceCommand {
    Clear {
        flags: ClearFlags,
        color: Vec4,
        depth: f32,
        stencil: i32,
    },
    SetRenderTarget {
        index: u32,
        target: Option<u32>,
    },
    SetDepthStencil {
        buffer: Option<u32>,
    },
    Render {
        material: MaterialId,
        material_name: String,
        pass_flags: u64,
        params: Vec<(String, ParamValue)>,
        operation_count: usize,
        first_transform: Option<glam::Mat4>,
        selector_id: i32,
    },
}

// ============================================================================
// Mock RenderDevice
// ============================================================================

#[derive(Debug, Default)]
pub struct MockRenderDevice {
    pub commands: Vec<DeviceCommand>,
}

impl MockRenderDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render commands only, in submission order
    pub fn renders(&self) -> Vec<&DeviceCommand> {
        self.commands.iter()
            .filter(|c| matches!(c, DeviceCommand::Render { .. }))
            .collect()
    }

    /// Names of the materials submitted, in submission order
    pub fn rendered_material_names(&self) -> Vec<String> {
        self.commands.iter()
            .filter_map(|c| match c {
                DeviceCommand::Render { material_name, .. } => Some(material_name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Total number of operations submitted through `render`
    pub fn rendered_operation_count(&self) -> usize {
        self.commands.iter()
            .map(|c| match c {
                DeviceCommand::Render { operation_count, .. } => *operation_count,
                _ => 0,
            })
            .sum()
    }
}

impl RenderDevice for MockRenderDevice {
    fn clear(&mut self, flags: ClearFlags, color: Vec4, depth: f32, stencil: i32) -> Galaxy3dResult<()> {
        self.commands.push(DeviceCommand::Clear { flags, color, depth, stencil });
        Ok(())
    }

    fn set_render_target(&mut self, index: u32, target: Option<&Arc<dyn RenderTarget>>) -> Galaxy3dResult<()> {
        self.commands.push(DeviceCommand::SetRenderTarget {
            index,
            target: target.map(|t| t.width()),
        });
        Ok(())
    }

    fn set_depth_stencil_buffer(&mut self, buffer: Option<&Arc<dyn DepthStencilBuffer>>) -> Galaxy3dResult<()> {
        self.commands.push(DeviceCommand::SetDepthStencil {
            buffer: buffer.map(|b| b.width()),
        });
        Ok(())
    }

    fn render(&mut self, material: &Material, operations: &[RenderOperation], selector_id: i32) -> Galaxy3dResult<()> {
        self.commands.push(DeviceCommand::Render {
            material: material.id(),
            material_name: material.name().to_string(),
            pass_flags: material.pass_flags(),
            params: material.params().to_vec(),
            operation_count: operations.len(),
            first_transform: operations.first().map(|op| op.root_transform),
            selector_id,
        });
        Ok(())
    }
}

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockRenderTarget {
    pub desc: RenderTargetDesc,
}

impl RenderTarget for MockRenderTarget {
    fn width(&self) -> u32 { self.desc.width }
    fn height(&self) -> u32 { self.desc.height }
    fn format(&self) -> PixelFormat { self.desc.format }
    fn sample_count(&self) -> u32 { self.desc.sample_count }
}

#[derive(Debug)]
pub struct MockDepthStencil {
    pub desc: DepthStencilDesc,
}

impl DepthStencilBuffer for MockDepthStencil {
    fn width(&self) -> u32 { self.desc.width }
    fn height(&self) -> u32 { self.desc.height }
    fn format(&self) -> DepthFormat { self.desc.format }
}

#[derive(Debug)]
pub struct MockTexture {
    pub width: u32,
    pub height: u32,
}

impl Texture for MockTexture {
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
}

#[derive(Debug)]
pub struct MockEffect {
    pub name: String,
    pub parameters: Vec<String>,
}

impl MockEffect {
    pub fn new(name: &str, parameters: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Effect for MockEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p == name)
    }
}

// ============================================================================
// Mock ObjectFactory
// ============================================================================

#[derive(Debug, Default)]
pub struct MockObjectFactory {
    pub render_targets_created: AtomicU32,
    pub depth_stencils_created: AtomicU32,
    /// When set, render target creation fails
    pub fail_render_targets: bool,
}

impl ObjectFactory for MockObjectFactory {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Galaxy3dResult<Arc<dyn RenderTarget>> {
        if self.fail_render_targets {
            return Err(Galaxy3dError::BackendError("render target creation disabled".to_string()));
        }
        self.render_targets_created.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(MockRenderTarget { desc: *desc }))
    }

    fn create_depth_stencil_buffer(&mut self, desc: &DepthStencilDesc) -> Galaxy3dResult<Arc<dyn DepthStencilBuffer>> {
        self.depth_stencils_created.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(MockDepthStencil { desc: *desc }))
    }
}

// ============================================================================
// Mock ResourceProvider
// ============================================================================

#[derive(Debug, Default)]
pub struct MockResources {
    pub effects: FxHashMap<String, Arc<dyn Effect>>,
    pub textures: FxHashMap<String, Arc<dyn Texture>>,
}

impl MockResources {
    pub fn with_effect(mut self, effect: MockEffect) -> Self {
        self.effects.insert(effect.name.clone(), Arc::new(effect));
        self
    }

    pub fn with_texture(mut self, name: &str, width: u32, height: u32) -> Self {
        self.textures.insert(name.to_string(), Arc::new(MockTexture { width, height }));
        self
    }
}

impl ResourceProvider for MockResources {
    fn effect(&self, name: &str) -> Option<Arc<dyn Effect>> {
        self.effects.get(name).cloned()
    }

    fn texture(&self, name: &str) -> Option<Arc<dyn Texture>> {
        self.textures.get(name).cloned()
    }
}

// ============================================================================
// Capturing logger
// ============================================================================

/// Logger keeping every entry, to assert on reported content problems
#[derive(Debug, Default)]
pub struct CaptureLogger {
    pub entries: std::sync::Mutex<Vec<crate::log::LogEntry>>,
}

impl CaptureLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Messages logged at `severity`
    pub fn messages(&self, severity: crate::log::LogSeverity) -> Vec<String> {
        self.entries.lock()
            .map(|entries| entries.iter()
                .filter(|e| e.severity == severity)
                .map(|e| e.message.clone())
                .collect())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(crate::log::LogSeverity::Warn)
    }
}

impl crate::log::Logger for CaptureLogger {
    fn log(&self, entry: &crate::log::LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}
