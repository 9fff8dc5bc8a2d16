//! Fixed-function OpenGL backend.
//!
//! This module implements a backend for devices exposing OpenGL 1.3 or later, without relying on
//! anything programmable. The backend type is [`Gl1`]. Missing features are emulated:
//!
//! - Render-to-texture goes through offscreen surfaces mirroring the attached textures when the
//!   device has no framebuffer objects.
//! - Non-power-of-two textures are stored in power-of-two storage; texture coordinates are
//!   rescaled on the fly.
//! - Per-vertex texture selection is turned into one draw per run of identical texture index.

mod capabilities;
mod depth_stencil;
mod device;
mod draw;
mod framebuffer;
pub mod native;
mod opt;
mod state;
mod texture;

pub use self::capabilities::{Capabilities, ContextError, MAX_TEXTURE_UNIT_COUNT, MIN_VERSION};
pub use self::native::NativeGl;
pub use self::opt::Gl1Opt;
pub use self::texture::TextureId;

use gl::types::*;
use log::debug;

use self::device::Device;
use self::framebuffer::RenderTarget;
use self::state::StateTracker;
use self::texture::TextureArena;
use lustre::blending::BlendState;
use lustre::context::GraphicsContext;
use lustre::depth_stencil::DepthStencilState;
use lustre::draw::DrawError;
use lustre::framebuffer::FramebufferError;
use lustre::rasterizer::RasterizerState;
use lustre::tess::Mode;
use lustre::texture::{Dim, Sampler, TextureError, TextureFormat, TextureSurface};
use lustre::vertex::VertexArrays;

/// A fixed-function OpenGL backend.
///
/// A context is tied to the thread it was created on. Several contexts can live on the same
/// thread; each one selects its device surface right before talking to it.
pub struct Gl1<N>
where
  N: NativeGl,
{
  device: Device<N>,
  caps: Capabilities,
  textures: TextureArena,
  // texture selected on every unit
  selected: Vec<Option<TextureId>>,
  blend: StateTracker<BlendState>,
  rasterizer: StateTracker<RasterizerState>,
  depth_stencil: StateTracker<DepthStencilState>,
  target: RenderTarget,
  // rescaled texture coordinates, indexed like the vertices they come from
  coords: Vec<f32>,
}

impl<N> Gl1<N>
where
  N: NativeGl,
{
  /// Create a new backend on top of a native table.
  ///
  /// The window surface is selected, the device capabilities are queried and the default state
  /// descriptions are sent to the device.
  pub fn new(native: N, opt: Gl1Opt) -> Result<Self, ContextError> {
    let mut device = Device::new(native);
    let caps = unsafe { Capabilities::query(device.gl(), &opt)? };

    let mut ctx = Gl1 {
      device,
      caps,
      textures: TextureArena::default(),
      selected: vec![None; caps.max_texture_units],
      blend: StateTracker::new(BlendState::default()),
      rasterizer: StateTracker::new(RasterizerState::default()),
      depth_stencil: StateTracker::new(DepthStencilState::default()),
      target: RenderTarget::new(caps.render_to_texture),
      coords: Vec::new(),
    };

    ctx.apply_states();
    Ok(ctx)
  }

  /// What the device can do.
  pub fn capabilities(&self) -> &Capabilities {
    &self.caps
  }

  /// Native table.
  pub fn native(&self) -> &N {
    self.device.native()
  }

  /// Whether this context is the one currently selected on this thread.
  pub fn is_current(&self) -> bool {
    self.device.is_active()
  }

  /// Forget what state the device is in and send every state description again.
  ///
  /// Use this after something else than this context changed the device state.
  pub fn invalidate_state(&mut self) {
    self.blend.invalidate();
    self.rasterizer.invalidate();
    self.depth_stencil.invalidate();
    self.apply_states();
  }

  /// Render to the attached texture again, after [`Gl1::stop`].
  pub fn start(&mut self) -> Result<(), FramebufferError> {
    self.start_target()
  }

  /// Render to the window again, keeping the attachment around for a later [`Gl1::start`].
  ///
  /// Everything rendered so far is synchronized to the attached texture.
  pub fn stop(&mut self) {
    self.stop_target();
  }

  /// Whether rendering currently goes to an attached texture.
  pub fn is_rendering_to_texture(&self) -> bool {
    self.is_target_started()
  }

  /// Clear the color buffer of the current render target.
  pub fn clear_color(&mut self, color: [f32; 4]) {
    self.activate_target();
    let gl = self.device.gl();

    unsafe {
      gl.clear_color(color);
      gl.clear(gl::COLOR_BUFFER_BIT);
    }
  }

  /// Clear the depth buffer of the current render target.
  pub fn clear_depth(&mut self, depth: f32) {
    self.activate_target();
    let gl = self.device.gl();

    unsafe {
      gl.clear_depth(depth as f64);
      gl.clear(gl::DEPTH_BUFFER_BIT);
    }
  }

  /// Clear the stencil buffer of the current render target.
  pub fn clear_stencil(&mut self, stencil: i32) {
    self.activate_target();
    let gl = self.device.gl();

    unsafe {
      gl.clear_stencil(stencil);
      gl.clear(gl::STENCIL_BUFFER_BIT);
    }
  }

  /// Change the viewport, in pixels from the bottom-left corner.
  pub fn set_viewport(&mut self, origin: [i32; 2], size: [u32; 2]) {
    unsafe {
      self.device.gl().viewport(
        origin[0],
        origin[1],
        size[0] as GLsizei,
        size[1] as GLsizei,
      )
    };
  }

  /// Map normalized depth to `[near, far]`, both clamped to `[0, 1]`.
  pub fn set_depth_range(&mut self, near: f32, far: f32) {
    let clamp = |depth: f32| depth.max(0.).min(1.) as f64;
    unsafe { self.device.gl().depth_range(clamp(near), clamp(far)) };
  }

  /// Read back a region of the current render target as RGBA8 texels.
  ///
  /// Rows are tightly packed, bottom row first. Pixels outside of the render target are
  /// undefined.
  pub fn read_pixels(&mut self, origin: [i32; 2], size: [u32; 2]) -> Vec<u8> {
    let mut pixels = vec![0; size[0] as usize * size[1] as usize * 4];

    if pixels.is_empty() {
      return pixels;
    }

    self.activate_target();
    let gl = self.device.gl();

    unsafe {
      gl.pixel_store(gl::PACK_ALIGNMENT, 1);
      gl.read_pixels(
        origin,
        [size[0] as GLsizei, size[1] as GLsizei],
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        &mut pixels,
      );
    }

    pixels
  }

  /// Change the scissor box, in pixels from the bottom-left corner.
  ///
  /// Scissoring must be enabled by the current [`RasterizerState`].
  pub fn set_scissor(&mut self, origin: [i32; 2], size: [u32; 2]) -> Result<(), DrawError> {
    if !self.rasterizer.current().scissor() {
      return Err(DrawError::ScissorDisabled);
    }

    unsafe {
      self.device.gl().scissor(
        origin[0],
        origin[1],
        size[0] as GLsizei,
        size[1] as GLsizei,
      )
    };

    Ok(())
  }

  /// Make the scissor box cover the whole viewport again.
  pub fn reset_scissor(&mut self) {
    let gl = self.device.gl();

    unsafe {
      let [x, y, w, h] = gl.get_viewport();
      gl.scissor(x, y, w, h);
    }
  }

  fn apply_states(&mut self) {
    self.blend.apply(&mut self.device, &self.caps);
    self.rasterizer.apply(&mut self.device, &self.caps);
    self.depth_stencil.apply(&mut self.device, &self.caps);
  }
}

impl<N> GraphicsContext for Gl1<N>
where
  N: NativeGl,
{
  type Texture = TextureId;

  fn create_texture(
    &mut self,
    dim: Dim,
    size: [u32; 3],
    format: TextureFormat,
    sampler: Sampler,
  ) -> Result<Self::Texture, TextureError> {
    self.new_texture(dim, size, format, &sampler)
  }

  fn destroy_texture(&mut self, texture: Self::Texture) -> Result<(), TextureError> {
    self.drop_texture(texture)
  }

  fn texture_surface(&self, texture: Self::Texture) -> Result<TextureSurface, TextureError> {
    self
      .textures
      .get(texture)
      .map(|texture| texture.surface)
      .ok_or(TextureError::UnknownTexture)
  }

  fn upload_texels(
    &mut self,
    texture: Self::Texture,
    offset: [u32; 2],
    size: [u32; 2],
    texels: &[u8],
  ) -> Result<(), TextureError> {
    self.upload_part(texture, offset, size, texels)
  }

  fn read_texels(&mut self, texture: Self::Texture) -> Result<Vec<u8>, TextureError> {
    self.get_texels(texture)
  }

  fn set_texture(
    &mut self,
    unit: usize,
    texture: Option<Self::Texture>,
  ) -> Result<(), DrawError> {
    if unit >= self.caps.max_texture_units {
      return Err(DrawError::InvalidTextureUnit {
        unit,
        max: self.caps.max_texture_units,
      });
    }

    if let Some(id) = texture {
      if !self.textures.is_live(id) {
        return Err(TextureError::UnknownTexture.into());
      }
    }

    if unit > 0 && !self.caps.multitexture {
      debug!("ignoring texture selection on unit {} without multitexturing", unit);
      return Ok(());
    }

    self.selected[unit] = texture;
    Ok(())
  }

  fn set_blend_state(&mut self, state: &BlendState) {
    self.blend.set(state);
    self.blend.apply(&mut self.device, &self.caps);
  }

  fn set_rasterizer_state(&mut self, state: &RasterizerState) {
    self.rasterizer.set(state);
    self.rasterizer.apply(&mut self.device, &self.caps);
  }

  fn set_depth_stencil_state(&mut self, state: &DepthStencilState) {
    self.depth_stencil.set(state);
    self.depth_stencil.apply(&mut self.device, &self.caps);
  }

  fn attach_color(&mut self, texture: Self::Texture, level: u32) -> Result<(), FramebufferError> {
    self.attach_color_texture(texture, level)
  }

  fn detach_all(&mut self) -> Result<(), FramebufferError> {
    self.detach_all_targets();
    Ok(())
  }

  fn draw_arrays(
    &mut self,
    mode: Mode,
    first: usize,
    count: usize,
    arrays: &VertexArrays,
  ) -> Result<(), DrawError> {
    self.dispatch_draw(mode, first, count, arrays)
  }
}

impl<N> Drop for Gl1<N>
where
  N: NativeGl,
{
  fn drop(&mut self) {
    self.dispose_targets();

    for texture in self.textures.drain() {
      unsafe { self.device.gl().delete_texture(texture.handle) };
    }

    self.device.release();
  }
}
