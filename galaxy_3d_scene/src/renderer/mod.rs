/// Renderer module - collaborator interfaces and draw-call value types
///
/// The scene layer consumes these traits and never owns a GPU API.

mod render_device;
mod material;
mod render_operation;

#[cfg(test)]
pub(crate) mod mock_render_device;

pub use render_device::{
    ClearFlags, PixelFormat, DepthFormat,
    RenderTarget, DepthStencilBuffer, Texture, Effect,
    RenderTargetDesc, DepthStencilDesc,
    RenderDevice, ObjectFactory, ResourceProvider,
};
pub use material::{Material, MaterialDesc, MaterialId, ParamValue};
pub use render_operation::{GeometryData, GeometryId, RenderOperation};
