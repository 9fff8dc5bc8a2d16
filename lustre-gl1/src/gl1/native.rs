//! Native capability table.
//!
//! The backend never calls into a GL loader directly. Instead, the platform integration hands it a
//! [`NativeGl`] implementation: a table of the fixed-function entry points the device exposes,
//! plus a way to select the surface subsequent calls apply to. Optional entry points are only
//! called after [`NativeGl::has_entry_point`] reported them as present.
//!
//! Every surface of a device shares the same rendering state (enables, matrices, bound textures,
//! etc.); selecting a surface only changes where pixels go.

use gl::types::*;
use std::os::raw::c_void;

/// `GL_MAX_TEXTURE_COORDS`, not part of the core profile.
pub const MAX_TEXTURE_COORDS: GLenum = 0x8871;

/// `GL_MAX_TEXTURE_UNITS`, not part of the core profile.
pub const MAX_TEXTURE_UNITS: GLenum = 0x84E2;

/// Optional entry points.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntryPoint {
  /// `glActiveTexture`.
  ActiveTexture,
  /// `glClientActiveTexture`.
  ClientActiveTexture,
  /// `glBlendEquation`.
  BlendEquation,
  /// `glBlendEquationSeparate`.
  BlendEquationSeparate,
  /// `glBlendFuncSeparate`.
  BlendFuncSeparate,
  /// `glBlendColor`.
  BlendColor,
  /// `glStencilFuncSeparate`, `glStencilOpSeparate` and `glStencilMaskSeparate`.
  StencilSeparate,
  /// `glTexImage3D` and `glTexSubImage3D`.
  TexImage3D,
  /// Framebuffer objects (`glGenFramebuffers` and friends).
  FramebufferObject,
  /// `glDrawArraysInstanced`.
  DrawArraysInstanced,
}

/// An offscreen surface created by the device.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OffscreenSurface(u64);

impl OffscreenSurface {
  /// Wrap a device-specific handle.
  pub fn new(handle: u64) -> Self {
    OffscreenSurface(handle)
  }

  /// Device-specific handle.
  pub fn handle(&self) -> u64 {
    self.0
  }
}

/// Surface the device renders to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Surface {
  /// The window the context was created for.
  Window,
  /// An offscreen surface.
  Offscreen(OffscreenSurface),
}

/// Client-side vertex arrays.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ClientArray {
  /// `GL_VERTEX_ARRAY`.
  Vertex,
  /// `GL_COLOR_ARRAY`.
  Color,
  /// `GL_NORMAL_ARRAY`.
  Normal,
  /// `GL_TEXTURE_COORD_ARRAY`, for the current client texture unit.
  TextureCoord,
}

/// Fixed-function matrix stacks.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatrixMode {
  /// `GL_MODELVIEW`.
  ModelView,
  /// `GL_PROJECTION`.
  Projection,
  /// `GL_TEXTURE`, for the current texture unit.
  Texture,
}

/// Fixed-function entry points of a device.
///
/// # Unsafety
///
/// Implementors must forward every call to the surface selected by the last
/// [`NativeGl::make_current`] call. Pointers passed to the `*_pointer` entry points are read back
/// by [`NativeGl::draw_arrays`]; callers guarantee they stay valid until then.
pub unsafe trait NativeGl {
  /// Whether an optional entry point is present.
  fn has_entry_point(&self, entry: EntryPoint) -> bool;

  /// Whether the device advertises an extension.
  fn has_extension(&self, name: &str) -> bool;

  /// `glGetString`.
  unsafe fn get_string(&mut self, name: GLenum) -> Option<String>;

  /// `glGetIntegerv` for a single value. Returns the error code (`GL_INVALID_ENUM`, typically) if
  /// the query isn’t supported.
  unsafe fn get_integer(&mut self, name: GLenum) -> Result<GLint, GLenum>;

  /// Select the surface subsequent calls apply to.
  unsafe fn make_current(&mut self, surface: Surface);

  /// Create an offscreen surface. The carried [`String`] of the error explains the failure.
  unsafe fn create_offscreen_surface(
    &mut self,
    width: u32,
    height: u32,
  ) -> Result<OffscreenSurface, String>;

  /// Destroy an offscreen surface.
  unsafe fn destroy_offscreen_surface(&mut self, surface: OffscreenSurface);

  /// `glEnable`.
  unsafe fn enable(&mut self, cap: GLenum);

  /// `glDisable`.
  unsafe fn disable(&mut self, cap: GLenum);

  /// `glIsEnabled`.
  unsafe fn is_enabled(&mut self, cap: GLenum) -> bool;

  /// `glEnableClientState`.
  unsafe fn enable_client_state(&mut self, array: ClientArray);

  /// `glDisableClientState`.
  unsafe fn disable_client_state(&mut self, array: ClientArray);

  /// `glIsEnabled` for client arrays.
  unsafe fn is_client_state_enabled(&mut self, array: ClientArray) -> bool;

  /// `glColorMask`.
  unsafe fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool);

  /// `glBlendEquation`. Optional.
  unsafe fn blend_equation(&mut self, mode: GLenum);

  /// `glBlendEquationSeparate`. Optional.
  unsafe fn blend_equation_separate(&mut self, color: GLenum, alpha: GLenum);

  /// `glBlendFunc`.
  unsafe fn blend_func(&mut self, src: GLenum, dst: GLenum);

  /// `glBlendFuncSeparate`. Optional.
  unsafe fn blend_func_separate(
    &mut self,
    src_color: GLenum,
    dst_color: GLenum,
    src_alpha: GLenum,
    dst_alpha: GLenum,
  );

  /// `glBlendColor`. Optional.
  unsafe fn blend_color(&mut self, color: [f32; 4]);

  /// `glCullFace`.
  unsafe fn cull_face(&mut self, face: GLenum);

  /// `glFrontFace`.
  unsafe fn front_face(&mut self, winding: GLenum);

  /// `glPolygonMode`.
  unsafe fn polygon_mode(&mut self, face: GLenum, mode: GLenum);

  /// `glPolygonOffset`.
  unsafe fn polygon_offset(&mut self, factor: f32, units: f32);

  /// `glPointSize`.
  unsafe fn point_size(&mut self, size: f32);

  /// `glLineWidth`.
  unsafe fn line_width(&mut self, width: f32);

  /// `glScissor`.
  unsafe fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

  /// `glDepthMask`.
  unsafe fn depth_mask(&mut self, write: bool);

  /// `glDepthFunc`.
  unsafe fn depth_func(&mut self, func: GLenum);

  /// `glStencilFunc`.
  unsafe fn stencil_func(&mut self, func: GLenum, reference: GLint, mask: GLuint);

  /// `glStencilFuncSeparate`. Optional.
  unsafe fn stencil_func_separate(
    &mut self,
    face: GLenum,
    func: GLenum,
    reference: GLint,
    mask: GLuint,
  );

  /// `glStencilOp`.
  unsafe fn stencil_op(&mut self, stencil_fail: GLenum, depth_fail: GLenum, pass: GLenum);

  /// `glStencilOpSeparate`. Optional.
  unsafe fn stencil_op_separate(
    &mut self,
    face: GLenum,
    stencil_fail: GLenum,
    depth_fail: GLenum,
    pass: GLenum,
  );

  /// `glStencilMask`.
  unsafe fn stencil_mask(&mut self, mask: GLuint);

  /// `glStencilMaskSeparate`. Optional.
  unsafe fn stencil_mask_separate(&mut self, face: GLenum, mask: GLuint);

  /// `glViewport`.
  unsafe fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

  /// `glGetIntegerv(GL_VIEWPORT)`.
  unsafe fn get_viewport(&mut self) -> [GLint; 4];

  /// `glDepthRange`.
  unsafe fn depth_range(&mut self, near: f64, far: f64);

  /// `glMatrixMode`.
  unsafe fn matrix_mode(&mut self, mode: MatrixMode);

  /// `glGetIntegerv(GL_MATRIX_MODE)`.
  unsafe fn get_matrix_mode(&mut self) -> MatrixMode;

  /// `glLoadMatrixf` on the current matrix stack. Column-major.
  unsafe fn load_matrix(&mut self, matrix: &[f32; 16]);

  /// `glGetFloatv` of the top of a matrix stack. Column-major.
  unsafe fn get_matrix(&mut self, mode: MatrixMode) -> [f32; 16];

  /// `glClearColor`.
  unsafe fn clear_color(&mut self, color: [f32; 4]);

  /// `glClearDepth`.
  unsafe fn clear_depth(&mut self, depth: f64);

  /// `glClearStencil`.
  unsafe fn clear_stencil(&mut self, stencil: GLint);

  /// `glClear`.
  unsafe fn clear(&mut self, mask: GLbitfield);

  /// `glFlush`.
  unsafe fn flush(&mut self);

  /// `glActiveTexture`. Optional.
  unsafe fn active_texture(&mut self, unit: GLenum);

  /// `glClientActiveTexture`. Optional.
  unsafe fn client_active_texture(&mut self, unit: GLenum);

  /// `glGenTextures` for a single texture; `0` on failure.
  unsafe fn gen_texture(&mut self) -> GLuint;

  /// `glDeleteTextures` for a single texture.
  unsafe fn delete_texture(&mut self, handle: GLuint);

  /// `glBindTexture`.
  unsafe fn bind_texture(&mut self, target: GLenum, handle: GLuint);

  /// `glTexParameteri`.
  unsafe fn tex_parameter(&mut self, target: GLenum, name: GLenum, value: GLint);

  /// `glPixelStorei`.
  unsafe fn pixel_store(&mut self, name: GLenum, value: GLint);

  /// `glTexImage1D`, `glTexImage2D` or `glTexImage3D`, depending on `target`.
  ///
  /// `texels` is `None` to allocate uninitialized storage.
  unsafe fn tex_image(
    &mut self,
    target: GLenum,
    internal_format: GLint,
    size: [u32; 3],
    format: GLenum,
    ty: GLenum,
    texels: Option<&[u8]>,
  );

  /// `glTexSubImage1D`, `glTexSubImage2D` or `glTexSubImage3D`, depending on `target`.
  unsafe fn tex_sub_image(
    &mut self,
    target: GLenum,
    offset: [u32; 3],
    size: [u32; 3],
    format: GLenum,
    ty: GLenum,
    texels: &[u8],
  );

  /// `glCopyTexSubImage2D`: copy a region of the current surface into the bound texture.
  unsafe fn copy_tex_sub_image_2d(
    &mut self,
    target: GLenum,
    offset: [GLint; 2],
    origin: [GLint; 2],
    size: [GLsizei; 2],
  );

  /// `glGetTexImage` of level 0 of the bound texture.
  unsafe fn get_tex_image(&mut self, target: GLenum, format: GLenum, ty: GLenum, out: &mut [u8]);

  /// `glReadPixels` from the color buffer of the current surface, or of the bound framebuffer
  /// object.
  unsafe fn read_pixels(
    &mut self,
    origin: [GLint; 2],
    size: [GLsizei; 2],
    format: GLenum,
    ty: GLenum,
    out: &mut [u8],
  );

  /// `glColor4f`.
  unsafe fn color(&mut self, color: [f32; 4]);

  /// `glVertexPointer`.
  unsafe fn vertex_pointer(&mut self, size: GLint, ty: GLenum, stride: GLsizei, ptr: *const c_void);

  /// `glColorPointer`.
  unsafe fn color_pointer(&mut self, size: GLint, ty: GLenum, stride: GLsizei, ptr: *const c_void);

  /// `glNormalPointer`.
  unsafe fn normal_pointer(&mut self, ty: GLenum, stride: GLsizei, ptr: *const c_void);

  /// `glTexCoordPointer`, for the current client texture unit.
  unsafe fn tex_coord_pointer(
    &mut self,
    size: GLint,
    ty: GLenum,
    stride: GLsizei,
    ptr: *const c_void,
  );

  /// `glDrawArrays`.
  unsafe fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei);

  /// `glGenFramebuffers` for a single framebuffer; `0` on failure. Optional.
  unsafe fn gen_framebuffer(&mut self) -> GLuint {
    0
  }

  /// `glDeleteFramebuffers` for a single framebuffer. Optional.
  unsafe fn delete_framebuffer(&mut self, _handle: GLuint) {}

  /// `glBindFramebuffer(GL_FRAMEBUFFER, handle)`. Optional.
  unsafe fn bind_framebuffer(&mut self, _handle: GLuint) {}

  /// `glFramebufferTexture2D` on the color attachment 0 of the bound framebuffer. Optional.
  unsafe fn framebuffer_texture_2d(&mut self, _texture: GLuint, _level: GLint) {}

  /// `glCheckFramebufferStatus` of the bound framebuffer. Optional.
  unsafe fn check_framebuffer_status(&mut self) -> GLenum {
    gl::FRAMEBUFFER_UNSUPPORTED
  }
}
