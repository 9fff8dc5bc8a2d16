//! Graphics context.
//!
//! A graphics context is an object that abstracts all the low-level operations that happen on a
//! graphics device. Backends implement [`GraphicsContext`] for the capability set they target;
//! callers only ever see this trait and the types of this crate.
//!
//! # On context and threads
//!
//! An object which type implements `GraphicsContext` must be `!Send` and `!Sync`: a device has a
//! single current surface per thread and contexts select it right before talking to the device.

use crate::blending::BlendState;
use crate::depth_stencil::DepthStencilState;
use crate::draw::DrawError;
use crate::framebuffer::FramebufferError;
use crate::rasterizer::RasterizerState;
use crate::tess::Mode;
use crate::texture::{Dim, Sampler, TextureError, TextureFormat, TextureSurface};
use crate::vertex::VertexArrays;

/// Class of graphics context.
pub trait GraphicsContext {
  /// Handle to a texture living in the context.
  type Texture: Copy + Eq;

  /// Create a texture.
  ///
  /// `size` is the logical `[width, height, depth]`; axes not used by `dim` are ignored.
  fn create_texture(
    &mut self,
    dim: Dim,
    size: [u32; 3],
    format: TextureFormat,
    sampler: Sampler,
  ) -> Result<Self::Texture, TextureError>;

  /// Destroy a texture. The handle becomes stale.
  fn destroy_texture(&mut self, texture: Self::Texture) -> Result<(), TextureError>;

  /// Logical and physical size of a texture.
  fn texture_surface(&self, texture: Self::Texture) -> Result<TextureSurface, TextureError>;

  /// Upload texels to a 2D region of a texture.
  ///
  /// `texels` are tightly packed rows of the texture format.
  fn upload_texels(
    &mut self,
    texture: Self::Texture,
    offset: [u32; 2],
    size: [u32; 2],
    texels: &[u8],
  ) -> Result<(), TextureError>;

  /// Read back the logical area of a 2D texture.
  fn read_texels(&mut self, texture: Self::Texture) -> Result<Vec<u8>, TextureError>;

  /// Select (or unselect, with `None`) the texture sampled by a texture unit.
  fn set_texture(
    &mut self,
    unit: usize,
    texture: Option<Self::Texture>,
  ) -> Result<(), DrawError>;

  /// Change the blending configuration.
  fn set_blend_state(&mut self, state: &BlendState);

  /// Change the rasterizer configuration.
  fn set_rasterizer_state(&mut self, state: &RasterizerState);

  /// Change the depth and stencil configuration.
  fn set_depth_stencil_state(&mut self, state: &DepthStencilState);

  /// Attach a texture as the color target and render into it from now on.
  fn attach_color(&mut self, texture: Self::Texture, level: u32) -> Result<(), FramebufferError>;

  /// Make sure everything rendered so far lands in the attached texture, drop the attachment and
  /// render to the window again.
  fn detach_all(&mut self) -> Result<(), FramebufferError>;

  /// Draw `count` vertices starting at `first`.
  fn draw_arrays(
    &mut self,
    mode: Mode,
    first: usize,
    count: usize,
    arrays: &VertexArrays,
  ) -> Result<(), DrawError>;
}
