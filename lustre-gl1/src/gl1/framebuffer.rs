//! Render-to-texture.
//!
//! Devices with framebuffer objects render straight into the attached texture. Older devices
//! render to an offscreen surface of the texture size instead, and both are kept in sync lazily:
//! the surface gets the texture content drawn into it when it is activated with stale pixels, and
//! the texture gets the surface content copied back when something needs to read it.

use cgmath::{ortho, Matrix4, SquareMatrix};
use gl::types::*;
use log::{debug, trace};

use crate::gl1::device::Device;
use crate::gl1::native::{ClientArray, MatrixMode, NativeGl, OffscreenSurface, Surface};
use crate::gl1::state::from_fill_mode;
use crate::gl1::texture::{TextureArena, TextureId};
use crate::gl1::Gl1;
use lustre::framebuffer::{FramebufferError, IncompleteReason};
use lustre::texture::{Dim, TextureError};

// enables saved around synchronization draws and turned off during them
const SYNC_DISABLED_CAPS: [GLenum; 8] = [
  gl::BLEND,
  gl::DEPTH_TEST,
  gl::CULL_FACE,
  gl::SCISSOR_TEST,
  gl::STENCIL_TEST,
  gl::POLYGON_OFFSET_POINT,
  gl::POLYGON_OFFSET_LINE,
  gl::POLYGON_OFFSET_FILL,
];

const SYNC_CLIENT_ARRAYS: [ClientArray; 4] = [
  ClientArray::Vertex,
  ClientArray::Color,
  ClientArray::Normal,
  ClientArray::TextureCoord,
];

/// Where rendering goes when a render target is started.
pub(crate) enum RenderTarget {
  Native(NativeTarget),
  Emulated(EmulatedTarget),
}

impl RenderTarget {
  pub(crate) fn new(native: bool) -> Self {
    if native {
      RenderTarget::Native(NativeTarget::default())
    } else {
      RenderTarget::Emulated(EmulatedTarget::default())
    }
  }

  fn attached(&self) -> Option<TextureId> {
    match *self {
      RenderTarget::Native(ref target) => target.attached,
      RenderTarget::Emulated(ref target) => target.attached,
    }
  }

  fn is_started(&self) -> bool {
    match *self {
      RenderTarget::Native(ref target) => target.started,
      RenderTarget::Emulated(ref target) => target.started,
    }
  }
}

#[derive(Default)]
pub(crate) struct NativeTarget {
  framebuffer: GLuint,
  attached: Option<TextureId>,
  started: bool,
}

/// Offscreen surface mirroring a texture.
struct Mirror {
  texture: TextureId,
  surface: OffscreenSurface,
  // texture revision the surface content matches, if any
  synced_revision: Option<u64>,
  // rendering happened on the surface since the last copy to the texture
  offscreen_newer: bool,
}

#[derive(Default)]
pub(crate) struct EmulatedTarget {
  mirrors: Vec<Mirror>,
  attached: Option<TextureId>,
  started: bool,
}

impl EmulatedTarget {
  fn mirror_mut(&mut self, id: TextureId) -> Option<&mut Mirror> {
    self.mirrors.iter_mut().find(|mirror| mirror.texture == id)
  }

  fn active_mirror_mut(&mut self) -> Option<&mut Mirror> {
    let id = self.attached?;
    self.mirror_mut(id)
  }
}

fn column_major(m: Matrix4<f32>) -> [f32; 16] {
  let columns: [[f32; 4]; 4] = m.into();
  let mut out = [0.; 16];

  for (out, column) in out.chunks_mut(4).zip(&columns) {
    out.copy_from_slice(column);
  }

  out
}

fn incomplete_reason(status: GLenum) -> IncompleteReason {
  match status {
    gl::FRAMEBUFFER_UNDEFINED => IncompleteReason::Undefined,
    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => IncompleteReason::IncompleteAttachment,
    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => IncompleteReason::MissingAttachment,
    gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => IncompleteReason::IncompleteDrawBuffer,
    gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => IncompleteReason::IncompleteReadBuffer,
    gl::FRAMEBUFFER_UNSUPPORTED => IncompleteReason::Unsupported,
    gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => IncompleteReason::IncompleteMultisample,
    _ => IncompleteReason::Unknown(status),
  }
}

/// Device state a synchronization draw or copy clobbers.
struct SavedState {
  viewport: [GLint; 4],
  matrix_mode: MatrixMode,
  projection: [f32; 16],
  modelview: [f32; 16],
  texture_matrix: [f32; 16],
  caps: [bool; 8],
  // not queryable, taken from the state trackers
  color_write: [bool; 4],
  fill_mode: GLenum,
  texture_2d: bool,
  texture_binding: GLuint,
  client_arrays: [bool; 4],
}

impl SavedState {
  // texture unit 0 must be selected
  unsafe fn save<N>(gl: &mut N, color_write: [bool; 4], fill_mode: GLenum) -> Self
  where
    N: NativeGl,
  {
    let mut caps = [false; 8];
    for (saved, &cap) in caps.iter_mut().zip(&SYNC_DISABLED_CAPS) {
      *saved = gl.is_enabled(cap);
    }

    let mut client_arrays = [false; 4];
    for (saved, &array) in client_arrays.iter_mut().zip(&SYNC_CLIENT_ARRAYS) {
      *saved = gl.is_client_state_enabled(array);
    }

    SavedState {
      viewport: gl.get_viewport(),
      matrix_mode: gl.get_matrix_mode(),
      projection: gl.get_matrix(MatrixMode::Projection),
      modelview: gl.get_matrix(MatrixMode::ModelView),
      texture_matrix: gl.get_matrix(MatrixMode::Texture),
      caps,
      color_write,
      fill_mode,
      texture_2d: gl.is_enabled(gl::TEXTURE_2D),
      texture_binding: gl.get_integer(gl::TEXTURE_BINDING_2D).unwrap_or(0) as GLuint,
      client_arrays,
    }
  }

  unsafe fn restore<N>(&self, gl: &mut N)
  where
    N: NativeGl,
  {
    let [x, y, w, h] = self.viewport;
    gl.viewport(x, y, w, h);

    gl.matrix_mode(MatrixMode::Projection);
    gl.load_matrix(&self.projection);
    gl.matrix_mode(MatrixMode::ModelView);
    gl.load_matrix(&self.modelview);
    gl.matrix_mode(MatrixMode::Texture);
    gl.load_matrix(&self.texture_matrix);
    gl.matrix_mode(self.matrix_mode);

    for (&enabled, &cap) in self.caps.iter().zip(&SYNC_DISABLED_CAPS) {
      set_enabled(gl, cap, enabled);
    }

    let [r, g, b, a] = self.color_write;
    gl.color_mask(r, g, b, a);
    gl.polygon_mode(gl::FRONT_AND_BACK, self.fill_mode);

    set_enabled(gl, gl::TEXTURE_2D, self.texture_2d);
    gl.bind_texture(gl::TEXTURE_2D, self.texture_binding);

    for (&enabled, &array) in self.client_arrays.iter().zip(&SYNC_CLIENT_ARRAYS) {
      if enabled {
        gl.enable_client_state(array);
      } else {
        gl.disable_client_state(array);
      }
    }
  }
}

unsafe fn set_enabled<N>(gl: &mut N, cap: GLenum, enabled: bool)
where
  N: NativeGl,
{
  if enabled {
    gl.enable(cap);
  } else {
    gl.disable(cap);
  }
}

unsafe fn select_first_unit<N>(gl: &mut N, multitexture: bool, client_multitexture: bool)
where
  N: NativeGl,
{
  if multitexture {
    gl.active_texture(gl::TEXTURE0);
  }

  if client_multitexture {
    gl.client_active_texture(gl::TEXTURE0);
  }
}

impl<N> Gl1<N>
where
  N: NativeGl,
{
  pub(crate) fn attach_color_texture(
    &mut self,
    id: TextureId,
    level: u32,
  ) -> Result<(), FramebufferError> {
    let texture = self.textures.get(id).ok_or(TextureError::UnknownTexture)?;
    let (handle, surface) = (texture.handle, texture.surface);

    if surface.dim() != Dim::Dim2 {
      return Err(TextureError::UnsupportedDim(surface.dim()).into());
    }

    if level != 0 {
      return Err(FramebufferError::UnsupportedAttachment { level });
    }

    match self.target {
      RenderTarget::Native(ref mut target) => {
        let gl = self.device.gl();

        if target.framebuffer == 0 {
          target.framebuffer = unsafe { gl.gen_framebuffer() };

          if target.framebuffer == 0 {
            return Err(FramebufferError::SurfaceCreationFailed(
              "the device didn’t hand out a framebuffer name".to_owned(),
            ));
          }
        }

        let status = unsafe {
          gl.bind_framebuffer(target.framebuffer);
          gl.framebuffer_texture_2d(handle, level as GLint);
          gl.check_framebuffer_status()
        };

        if status != gl::FRAMEBUFFER_COMPLETE {
          unsafe {
            gl.framebuffer_texture_2d(0, 0);
            gl.bind_framebuffer(0);
          }

          target.attached = None;
          target.started = false;
          return Err(incomplete_reason(status).into());
        }

        target.attached = Some(id);
        target.started = true;
        Ok(())
      }

      RenderTarget::Emulated(_) => {
        self.sync_texture();

        let emulated = emulated_mut(&mut self.target);

        let offscreen = match emulated.mirror_mut(id) {
          Some(mirror) => mirror.surface,

          None => {
            let [width, height, _] = surface.size();
            let offscreen = unsafe {
              self
                .device
                .gl()
                .create_offscreen_surface(width, height)
                .map_err(FramebufferError::SurfaceCreationFailed)?
            };

            debug!(
              "created offscreen surface {} of size {}×{}",
              offscreen.handle(),
              width,
              height
            );

            emulated.mirrors.push(Mirror {
              texture: id,
              surface: offscreen,
              synced_revision: None,
              offscreen_newer: false,
            });

            offscreen
          }
        };

        emulated.attached = Some(id);
        emulated.started = true;
        self.device.set_target(Surface::Offscreen(offscreen));
        self.sync_pbuffer();

        prune_mirrors(&mut self.device, &self.textures, emulated_mut(&mut self.target));
        Ok(())
      }
    }
  }

  pub(crate) fn start_target(&mut self) -> Result<(), FramebufferError> {
    match self.target {
      RenderTarget::Native(ref mut target) => {
        if target.attached.is_none() {
          return Err(FramebufferError::NoRenderTarget);
        }

        unsafe { self.device.gl().bind_framebuffer(target.framebuffer) };
        target.started = true;
      }

      RenderTarget::Emulated(ref mut target) => {
        if target.attached.is_none() {
          return Err(FramebufferError::NoRenderTarget);
        }

        target.started = true;
        self.activate_target();
      }
    }

    Ok(())
  }

  pub(crate) fn stop_target(&mut self) {
    match self.target {
      RenderTarget::Native(ref mut target) => {
        if target.started {
          unsafe { self.device.gl().bind_framebuffer(0) };
          target.started = false;
        }
      }

      RenderTarget::Emulated(_) => {
        self.sync_texture();

        let target = emulated_mut(&mut self.target);
        target.started = false;
        self.device.set_target(Surface::Window);
      }
    }
  }

  pub(crate) fn detach_all_targets(&mut self) {
    match self.target {
      RenderTarget::Native(ref mut target) => {
        if target.attached.is_some() {
          let gl = self.device.gl();

          unsafe {
            gl.bind_framebuffer(target.framebuffer);
            gl.framebuffer_texture_2d(0, 0);
            gl.bind_framebuffer(0);
          }
        }

        target.attached = None;
        target.started = false;
      }

      RenderTarget::Emulated(_) => {
        self.sync_texture();

        let target = emulated_mut(&mut self.target);
        target.attached = None;
        target.started = false;
        self.device.set_target(Surface::Window);
      }
    }
  }

  /// Route rendering to the started render target, if any.
  ///
  /// Must be called before anything that writes pixels.
  pub(crate) fn activate_target(&mut self) {
    let target = match self.target {
      RenderTarget::Emulated(ref mut target) if target.started => target,
      _ => return,
    };

    let surface = match target.active_mirror_mut() {
      Some(mirror) => mirror.surface,
      None => return,
    };

    self.device.set_target(Surface::Offscreen(surface));
    self.sync_pbuffer();

    if let Some(mirror) = emulated_mut(&mut self.target).active_mirror_mut() {
      mirror.offscreen_newer = true;
    }
  }

  /// Make sure a texture has every pixel rendered to it, if it is the current attachment.
  pub(crate) fn flush_attachment(&mut self, id: TextureId) {
    if self.target.attached() == Some(id) {
      self.sync_texture();
    }
  }

  /// Detach a texture that is about to be destroyed.
  ///
  /// The offscreen surface mirroring it stays around until the next attachment prunes it.
  pub(crate) fn forget_attachment(&mut self, id: TextureId) {
    if self.target.attached() != Some(id) {
      return;
    }

    match self.target {
      RenderTarget::Native(ref mut target) => {
        let gl = self.device.gl();

        unsafe {
          gl.bind_framebuffer(target.framebuffer);
          gl.framebuffer_texture_2d(0, 0);
          gl.bind_framebuffer(0);
        }

        target.attached = None;
        target.started = false;
      }

      RenderTarget::Emulated(ref mut target) => {
        if let Some(mirror) = target.active_mirror_mut() {
          mirror.offscreen_newer = false;
        }

        target.attached = None;
        target.started = false;
        self.device.set_target(Surface::Window);
      }
    }
  }

  /// Release every offscreen surface and framebuffer.
  pub(crate) fn dispose_targets(&mut self) {
    match self.target {
      RenderTarget::Native(ref mut target) => {
        if target.framebuffer != 0 {
          let gl = self.device.gl();

          unsafe {
            gl.bind_framebuffer(0);
            gl.delete_framebuffer(target.framebuffer);
          }
        }

        *target = NativeTarget::default();
      }

      RenderTarget::Emulated(ref mut target) => {
        self.device.set_target(Surface::Window);

        for mirror in target.mirrors.drain(..) {
          destroy_surface(&mut self.device, mirror.surface);
        }

        target.attached = None;
        target.started = false;
      }
    }
  }

  /// Whether rendering currently goes to a render target rather than the window.
  pub(crate) fn is_target_started(&self) -> bool {
    self.target.is_started()
  }

  /// Draw the texture into its offscreen surface if the surface is stale.
  fn sync_pbuffer(&mut self) {
    let target = match self.target {
      RenderTarget::Emulated(ref mut target) => target,
      RenderTarget::Native(_) => return,
    };

    let mirror = match target.active_mirror_mut() {
      Some(mirror) => mirror,
      None => return,
    };

    let texture = match self.textures.get(mirror.texture) {
      Some(texture) => texture,
      None => return,
    };

    if mirror.synced_revision == Some(texture.revision) {
      return;
    }

    let [width, height, _] = texture.surface.size();
    let [physical_width, physical_height, _] = texture.surface.physical_size();
    let (w, h) = (width as f32, height as f32);

    let projection = column_major(ortho(0., w, 0., h, -1., 1.));
    let texture_matrix = column_major(Matrix4::from_nonuniform_scale(
      1. / physical_width as f32,
      1. / physical_height as f32,
      1.,
    ));
    let identity = column_major(Matrix4::identity());

    // positions and texture coordinates are both in pixels
    let quad: [f32; 8] = [0., 0., w, 0., w, h, 0., h];

    let color_write = self.blend.current().color_write();
    let fill_mode = from_fill_mode(self.rasterizer.current().fill_mode());

    self.device.set_target(Surface::Offscreen(mirror.surface));
    let gl = self.device.gl();

    unsafe {
      select_first_unit(gl, self.caps.multitexture, self.caps.client_multitexture);
      let saved = SavedState::save(gl, color_write, fill_mode);

      gl.viewport(0, 0, width as GLsizei, height as GLsizei);
      gl.matrix_mode(MatrixMode::Projection);
      gl.load_matrix(&projection);
      gl.matrix_mode(MatrixMode::ModelView);
      gl.load_matrix(&identity);
      gl.matrix_mode(MatrixMode::Texture);
      gl.load_matrix(&texture_matrix);

      for &cap in &SYNC_DISABLED_CAPS {
        gl.disable(cap);
      }

      // every texel must land, whatever the caller renders with
      gl.color_mask(true, true, true, true);
      gl.polygon_mode(gl::FRONT_AND_BACK, gl::FILL);

      gl.enable(gl::TEXTURE_2D);
      gl.bind_texture(gl::TEXTURE_2D, texture.handle);
      gl.color([1., 1., 1., 1.]);

      gl.disable_client_state(ClientArray::Color);
      gl.disable_client_state(ClientArray::Normal);
      gl.enable_client_state(ClientArray::Vertex);
      gl.enable_client_state(ClientArray::TextureCoord);
      gl.vertex_pointer(2, gl::FLOAT, 0, quad.as_ptr() as *const _);
      gl.tex_coord_pointer(2, gl::FLOAT, 0, quad.as_ptr() as *const _);
      gl.draw_arrays(gl::TRIANGLE_FAN, 0, 4);

      saved.restore(gl);
    }

    trace!(
      "synchronized offscreen surface {} with texture revision {}",
      mirror.surface.handle(),
      texture.revision
    );

    mirror.synced_revision = Some(texture.revision);
    mirror.offscreen_newer = false;
  }

  /// Copy the offscreen surface back into its texture if the texture is stale.
  fn sync_texture(&mut self) {
    let target = match self.target {
      RenderTarget::Emulated(ref mut target) => target,
      RenderTarget::Native(_) => return,
    };

    let mirror = match target.active_mirror_mut() {
      Some(mirror) if mirror.offscreen_newer => mirror,
      _ => return,
    };

    let texture = match self.textures.get_mut(mirror.texture) {
      Some(texture) => texture,
      None => {
        mirror.offscreen_newer = false;
        return;
      }
    };

    let [width, height, _] = texture.surface.size();
    let previous_target = self.device.target();
    let color_write = self.blend.current().color_write();
    let fill_mode = from_fill_mode(self.rasterizer.current().fill_mode());

    self.device.set_target(Surface::Offscreen(mirror.surface));
    let gl = self.device.gl();

    unsafe {
      select_first_unit(gl, self.caps.multitexture, self.caps.client_multitexture);
      let saved = SavedState::save(gl, color_write, fill_mode);

      gl.bind_texture(gl::TEXTURE_2D, texture.handle);
      gl.copy_tex_sub_image_2d(
        gl::TEXTURE_2D,
        [0, 0],
        [0, 0],
        [width as GLsizei, height as GLsizei],
      );

      saved.restore(gl);
    }

    self.device.set_target(previous_target);

    let revision = texture.touch();
    trace!(
      "copied offscreen surface {} back, texture now at revision {}",
      mirror.surface.handle(),
      revision
    );

    mirror.synced_revision = Some(revision);
    mirror.offscreen_newer = false;
  }
}

fn emulated_mut(target: &mut RenderTarget) -> &mut EmulatedTarget {
  match *target {
    RenderTarget::Emulated(ref mut target) => target,
    RenderTarget::Native(_) => unreachable!("render target is native"),
  }
}

fn destroy_surface<N>(device: &mut Device<N>, surface: OffscreenSurface)
where
  N: NativeGl,
{
  device.release_surface(Surface::Offscreen(surface));
  unsafe { device.gl().destroy_offscreen_surface(surface) };

  debug!("destroyed offscreen surface {}", surface.handle());
}

// surfaces mirroring destroyed textures
fn prune_mirrors<N>(device: &mut Device<N>, textures: &TextureArena, target: &mut EmulatedTarget)
where
  N: NativeGl,
{
  let (live, dead): (Vec<_>, Vec<_>) = target
    .mirrors
    .drain(..)
    .partition(|mirror| textures.is_live(mirror.texture));

  target.mirrors = live;

  for mirror in dead {
    destroy_surface(device, mirror.surface);
  }
}
