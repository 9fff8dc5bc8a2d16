//! A fake fixed-function device.
//!
//! Every entry point is logged. Surfaces and textures hold real pixels so that render-to-texture
//! can be checked end to end:
//!
//! - clears fill the current surface (or the texture attached to the bound framebuffer);
//! - a draw with `GL_TEXTURE_2D` and the texture coordinate array enabled copies the bound texture
//!   into the current surface, texel for pixel; any other draw fills it with the current color;
//! - pixel writes only touch the channels enabled by `glColorMask`, and draws outside of
//!   `GL_FILL` polygon mode write nothing;
//! - `glCopyTexSubImage2D` copies pixels of the current surface into the bound texture.
//! - `glReadPixels` reads the current surface, or the texture attached to the bound framebuffer.

#![allow(dead_code)]

use gl::types::*;
use lustre_gl1::gl1::native::{
  ClientArray, EntryPoint, MatrixMode, NativeGl, OffscreenSurface, Surface,
};
use lustre_gl1::{Gl1, Gl1Opt};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::os::raw::c_void;
use std::rc::Rc;

pub const WINDOW_SIZE: [u32; 2] = [64, 48];

pub const IDENTITY: [f32; 16] = [
  1., 0., 0., 0., //
  0., 1., 0., 0., //
  0., 0., 1., 0., //
  0., 0., 0., 1.,
];

pub struct Pixels {
  pub width: u32,
  pub height: u32,
  pub data: Vec<[u8; 4]>,
}

impl Pixels {
  fn new(width: u32, height: u32) -> Self {
    Pixels {
      width,
      height,
      data: vec![[0; 4]; width as usize * height as usize],
    }
  }

  fn fill(&mut self, color: [u8; 4], mask: [bool; 4]) {
    for pixel in &mut self.data {
      write_masked(pixel, color, mask);
    }
  }

  pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
    self.data[(y * self.width + x) as usize]
  }
}

pub struct MockTexture {
  pub size: [u32; 3],
  pub bytes_per_texel: usize,
  pub texels: Vec<u8>,
}

impl MockTexture {
  pub fn texel(&self, x: u32, y: u32) -> &[u8] {
    let start = (y * self.size[0] + x) as usize * self.bytes_per_texel;
    &self.texels[start..start + self.bytes_per_texel]
  }

  fn set_texel(&mut self, x: u32, y: u32, texel: &[u8]) {
    let start = (y * self.size[0] + x) as usize * self.bytes_per_texel;
    self.texels[start..start + self.bytes_per_texel].copy_from_slice(texel);
  }
}

/// A draw as seen by the device.
#[derive(Clone, Debug, PartialEq)]
pub struct Draw {
  pub surface: Option<Surface>,
  pub mode: GLenum,
  pub first: GLint,
  pub count: GLsizei,
  /// Texture bound and enabled on the active unit, if any.
  pub texture: Option<GLuint>,
  pub unit: GLenum,
  /// Texture coordinates read for `first..first + count`, if the array was enabled.
  pub tex_coords: Option<Vec<f32>>,
}

#[derive(Clone, Copy)]
struct Pointer {
  size: GLint,
  ty: GLenum,
  stride: GLsizei,
  ptr: *const c_void,
}

pub struct MockState {
  // what the device reports
  pub version: String,
  pub entry_points: HashSet<EntryPoint>,
  pub extensions: Vec<String>,
  pub max_texture_coords: Option<GLint>,
  pub max_texture_units: GLint,
  pub max_texture_size: GLint,
  pub fail_surface_creation: bool,
  pub framebuffer_status: GLenum,

  // what happened
  pub calls: Vec<String>,
  pub current: Option<Surface>,
  pub make_current_calls: usize,
  pub window: Pixels,
  pub surfaces: HashMap<u64, Pixels>,
  pub created_surfaces: Vec<u64>,
  pub destroyed_surfaces: Vec<u64>,
  pub textures: HashMap<GLuint, MockTexture>,
  pub deleted_textures: Vec<GLuint>,
  pub draws: Vec<Draw>,
  pub copies: Vec<GLuint>,
  pub viewport: [GLint; 4],
  pub scissor: [GLint; 4],
  pub matrix_mode: MatrixMode,
  pub matrices: HashMap<MatrixMode, [f32; 16]>,
  pub color: [f32; 4],
  pub clear_color: [f32; 4],
  pub color_write: [bool; 4],
  pub fill_mode: GLenum,
  pub depth_range: [f64; 2],
  pub framebuffer: GLuint,
  pub framebuffer_attachment: GLuint,

  pub(crate) next_surface: u64,
  pub(crate) next_texture: GLuint,
  pub(crate) next_framebuffer: GLuint,
  pub(crate) enabled: HashSet<(GLenum, GLenum)>,
  pub(crate) client_arrays: HashSet<(ClientArray, GLenum)>,
  pub(crate) bindings: HashMap<(GLenum, GLenum), GLuint>,
  pub(crate) pointers: HashMap<(ClientArray, GLenum), Pointer>,
  pub(crate) active_unit: GLenum,
  pub(crate) client_unit: GLenum,
}

impl MockState {
  /// An OpenGL 1.5 device with multitexturing, no framebuffer objects and power-of-two textures
  /// only.
  pub fn legacy() -> Self {
    let entry_points = [
      EntryPoint::ActiveTexture,
      EntryPoint::ClientActiveTexture,
      EntryPoint::BlendEquation,
      EntryPoint::BlendFuncSeparate,
      EntryPoint::BlendColor,
    ];

    MockState {
      version: "1.5.0 Mock".to_owned(),
      entry_points: entry_points.iter().copied().collect(),
      extensions: Vec::new(),
      max_texture_coords: Some(4),
      max_texture_units: 2,
      max_texture_size: 2048,
      fail_surface_creation: false,
      framebuffer_status: gl::FRAMEBUFFER_COMPLETE,

      calls: Vec::new(),
      current: None,
      make_current_calls: 0,
      window: Pixels::new(WINDOW_SIZE[0], WINDOW_SIZE[1]),
      surfaces: HashMap::new(),
      created_surfaces: Vec::new(),
      destroyed_surfaces: Vec::new(),
      textures: HashMap::new(),
      deleted_textures: Vec::new(),
      draws: Vec::new(),
      copies: Vec::new(),
      viewport: [0, 0, WINDOW_SIZE[0] as GLint, WINDOW_SIZE[1] as GLint],
      scissor: [0, 0, WINDOW_SIZE[0] as GLint, WINDOW_SIZE[1] as GLint],
      matrix_mode: MatrixMode::ModelView,
      matrices: HashMap::new(),
      color: [1.; 4],
      clear_color: [0.; 4],
      color_write: [true; 4],
      fill_mode: gl::FILL,
      depth_range: [0., 1.],
      framebuffer: 0,
      framebuffer_attachment: 0,

      next_surface: 0,
      next_texture: 0,
      next_framebuffer: 0,
      enabled: HashSet::new(),
      client_arrays: HashSet::new(),
      bindings: HashMap::new(),
      pointers: HashMap::new(),
      active_unit: gl::TEXTURE0,
      client_unit: gl::TEXTURE0,
    }
  }

  /// An OpenGL 2.1 device with every optional entry point.
  pub fn modern() -> Self {
    let entry_points = [
      EntryPoint::ActiveTexture,
      EntryPoint::ClientActiveTexture,
      EntryPoint::BlendEquation,
      EntryPoint::BlendEquationSeparate,
      EntryPoint::BlendFuncSeparate,
      EntryPoint::BlendColor,
      EntryPoint::StencilSeparate,
      EntryPoint::TexImage3D,
      EntryPoint::FramebufferObject,
      EntryPoint::DrawArraysInstanced,
    ];

    MockState {
      version: "2.1.2 Mock".to_owned(),
      entry_points: entry_points.iter().copied().collect(),
      max_texture_coords: Some(8),
      max_texture_units: 4,
      ..MockState::legacy()
    }
  }

  /// Number of logged calls to an entry point.
  pub fn count(&self, name: &str) -> usize {
    self.calls.iter().filter(|call| entry_name(call) == name).count()
  }

  /// Whether a call was logged, arguments included.
  pub fn called(&self, call: &str) -> bool {
    self.calls.iter().any(|logged| logged == call)
  }

  /// Forget the logged calls and draws.
  pub fn reset_log(&mut self) {
    self.calls.clear();
    self.draws.clear();
  }

  pub fn is_enabled_cap(&self, cap: GLenum) -> bool {
    self.enabled.contains(&self.cap_key(cap))
  }

  pub fn is_client_array_enabled(&self, array: ClientArray) -> bool {
    self.client_arrays.contains(&self.array_key(array))
  }

  pub fn surface(&self, handle: u64) -> &Pixels {
    &self.surfaces[&handle]
  }

  fn log(&mut self, call: String) {
    self.calls.push(call);
  }

  // texturing enables are per texture unit
  fn cap_key(&self, cap: GLenum) -> (GLenum, GLenum) {
    match cap {
      gl::TEXTURE_1D | gl::TEXTURE_2D | gl::TEXTURE_3D => (cap, self.active_unit),
      _ => (cap, 0),
    }
  }

  fn array_key(&self, array: ClientArray) -> (ClientArray, GLenum) {
    match array {
      ClientArray::TextureCoord => (array, self.client_unit),
      _ => (array, 0),
    }
  }

  fn bound(&self, target: GLenum) -> GLuint {
    self
      .bindings
      .get(&(target, self.active_unit))
      .copied()
      .unwrap_or(0)
  }

  fn current_pixels(&mut self) -> &mut Pixels {
    match self.current {
      None | Some(Surface::Window) => &mut self.window,
      Some(Surface::Offscreen(surface)) => self
        .surfaces
        .get_mut(&surface.handle())
        .expect("rendering to a destroyed offscreen surface"),
    }
  }

  fn read_tex_coords(&self, first: GLint, count: GLsizei) -> Option<Vec<f32>> {
    if !self.is_client_array_enabled(ClientArray::TextureCoord) {
      return None;
    }

    let pointer = self.pointers.get(&self.array_key(ClientArray::TextureCoord))?;
    if pointer.ty != gl::FLOAT || pointer.ptr.is_null() {
      return None;
    }

    let size = pointer.size as usize;
    let stride = if pointer.stride == 0 {
      size * 4
    } else {
      pointer.stride as usize
    };

    let mut coords = Vec::with_capacity(count as usize * size);
    for vertex in first as usize..(first + count) as usize {
      for component in 0..size {
        let offset = vertex * stride + component * 4;
        let value =
          unsafe { std::ptr::read_unaligned((pointer.ptr as *const u8).add(offset) as *const f32) };
        coords.push(value);
      }
    }

    Some(coords)
  }
}

fn entry_name(call: &str) -> &str {
  call.split('(').next().unwrap_or(call)
}

fn write_masked(pixel: &mut [u8; 4], color: [u8; 4], mask: [bool; 4]) {
  for ((channel, &value), &enabled) in pixel.iter_mut().zip(&color).zip(&mask) {
    if enabled {
      *channel = value;
    }
  }
}

fn to_u8(color: [f32; 4]) -> [u8; 4] {
  let c = |x: f32| (x.max(0.).min(1.) * 255.).round() as u8;
  [c(color[0]), c(color[1]), c(color[2]), c(color[3])]
}

fn bytes_per_texel(format: GLenum, ty: GLenum) -> usize {
  match (format, ty) {
    (gl::RGBA, gl::UNSIGNED_BYTE) | (gl::BGRA, gl::UNSIGNED_BYTE) => 4,
    (gl::RGB, gl::UNSIGNED_BYTE) | (gl::BGR, gl::UNSIGNED_BYTE) => 3,
    _ => 2,
  }
}

/// Shared handle to a [`MockState`].
#[derive(Clone)]
pub struct MockGl(pub Rc<RefCell<MockState>>);

impl MockGl {
  pub fn new(state: MockState) -> (Self, Rc<RefCell<MockState>>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let state = Rc::new(RefCell::new(state));
    (MockGl(state.clone()), state)
  }
}

pub fn context_with(
  state: MockState,
  opt: Gl1Opt,
) -> (Gl1<MockGl>, Rc<RefCell<MockState>>) {
  let (native, state) = MockGl::new(state);
  let ctx = Gl1::new(native, opt).expect("mock context");
  state.borrow_mut().reset_log();

  (ctx, state)
}

pub fn legacy_context() -> (Gl1<MockGl>, Rc<RefCell<MockState>>) {
  context_with(MockState::legacy(), Gl1Opt::default())
}

pub fn modern_context() -> (Gl1<MockGl>, Rc<RefCell<MockState>>) {
  context_with(MockState::modern(), Gl1Opt::default())
}

/// `width × height` RGBA8 texels of the same color.
pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
  color.repeat(width as usize * height as usize)
}

unsafe impl NativeGl for MockGl {
  fn has_entry_point(&self, entry: EntryPoint) -> bool {
    self.0.borrow().entry_points.contains(&entry)
  }

  fn has_extension(&self, name: &str) -> bool {
    self.0.borrow().extensions.iter().any(|ext| ext == name)
  }

  unsafe fn get_string(&mut self, name: GLenum) -> Option<String> {
    let s = self.0.borrow();

    if name == gl::VERSION {
      Some(s.version.clone())
    } else {
      None
    }
  }

  unsafe fn get_integer(&mut self, name: GLenum) -> Result<GLint, GLenum> {
    let s = self.0.borrow();

    match name {
      0x8871 => s.max_texture_coords.ok_or(gl::INVALID_ENUM),
      0x84E2 => Ok(s.max_texture_units),
      gl::MAX_TEXTURE_SIZE => Ok(s.max_texture_size),
      gl::TEXTURE_BINDING_2D => Ok(s.bound(gl::TEXTURE_2D) as GLint),
      _ => Err(gl::INVALID_ENUM),
    }
  }

  unsafe fn make_current(&mut self, surface: Surface) {
    let mut s = self.0.borrow_mut();
    s.log(format!("make_current({:?})", surface));
    s.make_current_calls += 1;
    s.current = Some(surface);
  }

  unsafe fn create_offscreen_surface(
    &mut self,
    width: u32,
    height: u32,
  ) -> Result<OffscreenSurface, String> {
    let mut s = self.0.borrow_mut();
    s.log(format!("create_offscreen_surface({}, {})", width, height));

    if s.fail_surface_creation {
      return Err("no pbuffer support".to_owned());
    }

    s.next_surface += 1;
    let handle = s.next_surface;
    s.surfaces.insert(handle, Pixels::new(width, height));
    s.created_surfaces.push(handle);

    Ok(OffscreenSurface::new(handle))
  }

  unsafe fn destroy_offscreen_surface(&mut self, surface: OffscreenSurface) {
    let mut s = self.0.borrow_mut();
    s.log(format!("destroy_offscreen_surface({})", surface.handle()));
    s.surfaces.remove(&surface.handle());
    s.destroyed_surfaces.push(surface.handle());
  }

  unsafe fn enable(&mut self, cap: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("enable({:#x})", cap));
    let key = s.cap_key(cap);
    s.enabled.insert(key);
  }

  unsafe fn disable(&mut self, cap: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("disable({:#x})", cap));
    let key = s.cap_key(cap);
    s.enabled.remove(&key);
  }

  unsafe fn is_enabled(&mut self, cap: GLenum) -> bool {
    self.0.borrow().is_enabled_cap(cap)
  }

  unsafe fn enable_client_state(&mut self, array: ClientArray) {
    let mut s = self.0.borrow_mut();
    s.log(format!("enable_client_state({:?})", array));
    let key = s.array_key(array);
    s.client_arrays.insert(key);
  }

  unsafe fn disable_client_state(&mut self, array: ClientArray) {
    let mut s = self.0.borrow_mut();
    s.log(format!("disable_client_state({:?})", array));
    let key = s.array_key(array);
    s.client_arrays.remove(&key);
  }

  unsafe fn is_client_state_enabled(&mut self, array: ClientArray) -> bool {
    self.0.borrow().is_client_array_enabled(array)
  }

  unsafe fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
    let mut s = self.0.borrow_mut();
    s.log(format!("color_mask({}, {}, {}, {})", red, green, blue, alpha));
    s.color_write = [red, green, blue, alpha];
  }

  unsafe fn blend_equation(&mut self, mode: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("blend_equation({:#x})", mode));
  }

  unsafe fn blend_equation_separate(&mut self, color: GLenum, alpha: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("blend_equation_separate({:#x}, {:#x})", color, alpha));
  }

  unsafe fn blend_func(&mut self, src: GLenum, dst: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("blend_func({:#x}, {:#x})", src, dst));
  }

  unsafe fn blend_func_separate(
    &mut self,
    src_color: GLenum,
    dst_color: GLenum,
    src_alpha: GLenum,
    dst_alpha: GLenum,
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!(
      "blend_func_separate({:#x}, {:#x}, {:#x}, {:#x})",
      src_color, dst_color, src_alpha, dst_alpha
    ));
  }

  unsafe fn blend_color(&mut self, color: [f32; 4]) {
    let mut s = self.0.borrow_mut();
    s.log(format!("blend_color({:?})", color));
  }

  unsafe fn cull_face(&mut self, face: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("cull_face({:#x})", face));
  }

  unsafe fn front_face(&mut self, winding: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("front_face({:#x})", winding));
  }

  unsafe fn polygon_mode(&mut self, face: GLenum, mode: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("polygon_mode({:#x}, {:#x})", face, mode));
    s.fill_mode = mode;
  }

  unsafe fn polygon_offset(&mut self, factor: f32, units: f32) {
    let mut s = self.0.borrow_mut();
    s.log(format!("polygon_offset({}, {})", factor, units));
  }

  unsafe fn point_size(&mut self, size: f32) {
    let mut s = self.0.borrow_mut();
    s.log(format!("point_size({})", size));
  }

  unsafe fn line_width(&mut self, width: f32) {
    let mut s = self.0.borrow_mut();
    s.log(format!("line_width({})", width));
  }

  unsafe fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
    let mut s = self.0.borrow_mut();
    s.log(format!("scissor({}, {}, {}, {})", x, y, width, height));
    s.scissor = [x, y, width, height];
  }

  unsafe fn depth_mask(&mut self, write: bool) {
    let mut s = self.0.borrow_mut();
    s.log(format!("depth_mask({})", write));
  }

  unsafe fn depth_func(&mut self, func: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("depth_func({:#x})", func));
  }

  unsafe fn stencil_func(&mut self, func: GLenum, reference: GLint, mask: GLuint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("stencil_func({:#x}, {}, {:#x})", func, reference, mask));
  }

  unsafe fn stencil_func_separate(
    &mut self,
    face: GLenum,
    func: GLenum,
    reference: GLint,
    mask: GLuint,
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!(
      "stencil_func_separate({:#x}, {:#x}, {}, {:#x})",
      face, func, reference, mask
    ));
  }

  unsafe fn stencil_op(&mut self, stencil_fail: GLenum, depth_fail: GLenum, pass: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!(
      "stencil_op({:#x}, {:#x}, {:#x})",
      stencil_fail, depth_fail, pass
    ));
  }

  unsafe fn stencil_op_separate(
    &mut self,
    face: GLenum,
    stencil_fail: GLenum,
    depth_fail: GLenum,
    pass: GLenum,
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!(
      "stencil_op_separate({:#x}, {:#x}, {:#x}, {:#x})",
      face, stencil_fail, depth_fail, pass
    ));
  }

  unsafe fn stencil_mask(&mut self, mask: GLuint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("stencil_mask({:#x})", mask));
  }

  unsafe fn stencil_mask_separate(&mut self, face: GLenum, mask: GLuint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("stencil_mask_separate({:#x}, {:#x})", face, mask));
  }

  unsafe fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
    let mut s = self.0.borrow_mut();
    s.log(format!("viewport({}, {}, {}, {})", x, y, width, height));
    s.viewport = [x, y, width, height];
  }

  unsafe fn get_viewport(&mut self) -> [GLint; 4] {
    self.0.borrow().viewport
  }

  unsafe fn depth_range(&mut self, near: f64, far: f64) {
    let mut s = self.0.borrow_mut();
    s.log(format!("depth_range({}, {})", near, far));
    s.depth_range = [near, far];
  }

  unsafe fn matrix_mode(&mut self, mode: MatrixMode) {
    let mut s = self.0.borrow_mut();
    s.log(format!("matrix_mode({:?})", mode));
    s.matrix_mode = mode;
  }

  unsafe fn get_matrix_mode(&mut self) -> MatrixMode {
    self.0.borrow().matrix_mode
  }

  unsafe fn load_matrix(&mut self, matrix: &[f32; 16]) {
    let mut s = self.0.borrow_mut();
    s.log("load_matrix()".to_owned());
    let mode = s.matrix_mode;
    s.matrices.insert(mode, *matrix);
  }

  unsafe fn get_matrix(&mut self, mode: MatrixMode) -> [f32; 16] {
    self
      .0
      .borrow()
      .matrices
      .get(&mode)
      .copied()
      .unwrap_or(IDENTITY)
  }

  unsafe fn clear_color(&mut self, color: [f32; 4]) {
    let mut s = self.0.borrow_mut();
    s.log(format!("clear_color({:?})", color));
    s.clear_color = color;
  }

  unsafe fn clear_depth(&mut self, depth: f64) {
    let mut s = self.0.borrow_mut();
    s.log(format!("clear_depth({})", depth));
  }

  unsafe fn clear_stencil(&mut self, stencil: GLint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("clear_stencil({})", stencil));
  }

  unsafe fn clear(&mut self, mask: GLbitfield) {
    let mut s = self.0.borrow_mut();
    s.log(format!("clear({:#x})", mask));

    if mask & gl::COLOR_BUFFER_BIT == 0 {
      return;
    }

    let color = to_u8(s.clear_color);
    let mask = s.color_write;

    if s.framebuffer != 0 && s.framebuffer_attachment != 0 {
      let attachment = s.framebuffer_attachment;
      if let Some(texture) = s.textures.get_mut(&attachment) {
        let [w, h, _] = texture.size;
        for y in 0..h {
          for x in 0..w {
            texture.set_texel(x, y, &color);
          }
        }
      }
    } else {
      s.current_pixels().fill(color, mask);
    }
  }

  unsafe fn flush(&mut self) {
    self.0.borrow_mut().log("flush()".to_owned());
  }

  unsafe fn active_texture(&mut self, unit: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("active_texture({:#x})", unit));
    s.active_unit = unit;
  }

  unsafe fn client_active_texture(&mut self, unit: GLenum) {
    let mut s = self.0.borrow_mut();
    s.log(format!("client_active_texture({:#x})", unit));
    s.client_unit = unit;
  }

  unsafe fn gen_texture(&mut self) -> GLuint {
    let mut s = self.0.borrow_mut();
    s.log("gen_texture()".to_owned());
    s.next_texture += 1;
    s.next_texture
  }

  unsafe fn delete_texture(&mut self, handle: GLuint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("delete_texture({})", handle));
    s.textures.remove(&handle);
    s.deleted_textures.push(handle);
  }

  unsafe fn bind_texture(&mut self, target: GLenum, handle: GLuint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("bind_texture({:#x}, {})", target, handle));
    let unit = s.active_unit;
    s.bindings.insert((target, unit), handle);
  }

  unsafe fn tex_parameter(&mut self, target: GLenum, name: GLenum, value: GLint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("tex_parameter({:#x}, {:#x}, {:#x})", target, name, value));
  }

  unsafe fn pixel_store(&mut self, name: GLenum, value: GLint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("pixel_store({:#x}, {})", name, value));
  }

  unsafe fn tex_image(
    &mut self,
    target: GLenum,
    _internal_format: GLint,
    size: [u32; 3],
    format: GLenum,
    ty: GLenum,
    texels: Option<&[u8]>,
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!("tex_image({:#x}, {:?})", target, size));

    let bytes_per_texel = bytes_per_texel(format, ty);
    let len = size.iter().map(|&len| len as usize).product::<usize>() * bytes_per_texel;
    let texels = texels.map_or_else(|| vec![0; len], |texels| texels[..len].to_vec());
    let handle = s.bound(target);

    s.textures.insert(
      handle,
      MockTexture {
        size,
        bytes_per_texel,
        texels,
      },
    );
  }

  unsafe fn tex_sub_image(
    &mut self,
    target: GLenum,
    offset: [u32; 3],
    size: [u32; 3],
    _format: GLenum,
    _ty: GLenum,
    texels: &[u8],
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!("tex_sub_image({:#x}, {:?}, {:?})", target, offset, size));

    let handle = s.bound(target);
    let texture = s.textures.get_mut(&handle).expect("no texture bound");
    let bpt = texture.bytes_per_texel;

    for y in 0..size[1] {
      for x in 0..size[0] {
        let src = ((y * size[0] + x) as usize) * bpt;
        texture.set_texel(offset[0] + x, offset[1] + y, &texels[src..src + bpt]);
      }
    }
  }

  unsafe fn copy_tex_sub_image_2d(
    &mut self,
    target: GLenum,
    offset: [GLint; 2],
    origin: [GLint; 2],
    size: [GLsizei; 2],
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!(
      "copy_tex_sub_image_2d({:#x}, {:?}, {:?}, {:?})",
      target, offset, origin, size
    ));

    let handle = s.bound(target);
    s.copies.push(handle);

    let pixels: Vec<(u32, u32, [u8; 4])> = {
      let source = s.current_pixels();
      (0..size[1] as u32)
        .flat_map(|y| (0..size[0] as u32).map(move |x| (x, y)))
        .map(|(x, y)| {
          let pixel = source.get(origin[0] as u32 + x, origin[1] as u32 + y);
          (offset[0] as u32 + x, offset[1] as u32 + y, pixel)
        })
        .collect()
    };

    let texture = s.textures.get_mut(&handle).expect("no texture bound");
    for (x, y, pixel) in pixels {
      texture.set_texel(x, y, &pixel);
    }
  }

  unsafe fn get_tex_image(&mut self, target: GLenum, _format: GLenum, _ty: GLenum, out: &mut [u8]) {
    let mut s = self.0.borrow_mut();
    s.log(format!("get_tex_image({:#x})", target));

    let handle = s.bound(target);
    let texture = &s.textures[&handle];
    let len = out.len().min(texture.texels.len());
    out[..len].copy_from_slice(&texture.texels[..len]);
  }

  unsafe fn read_pixels(
    &mut self,
    origin: [GLint; 2],
    size: [GLsizei; 2],
    format: GLenum,
    ty: GLenum,
    out: &mut [u8],
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!(
      "read_pixels({:?}, {:?}, {:#x}, {:#x})",
      origin, size, format, ty
    ));

    let attachment = Some(s.framebuffer_attachment).filter(|_| s.framebuffer != 0);
    let pixel = |s: &mut MockState, x: u32, y: u32| -> Option<[u8; 4]> {
      match attachment {
        Some(handle) => {
          let texture = s.textures.get(&handle)?;
          let [w, h, _] = texture.size;
          if x >= w || y >= h {
            return None;
          }
          let t = texture.texel(x, y);
          Some([t[0], t[1], t[2], t[3]])
        }

        None => {
          let pixels = s.current_pixels();
          if x >= pixels.width || y >= pixels.height {
            return None;
          }
          Some(pixels.get(x, y))
        }
      }
    };

    for row in 0..size[1] {
      for column in 0..size[0] {
        let (x, y) = (origin[0] + column, origin[1] + row);
        if x < 0 || y < 0 {
          continue;
        }

        if let Some(color) = pixel(&mut *s, x as u32, y as u32) {
          let start = (row * size[0] + column) as usize * 4;
          out[start..start + 4].copy_from_slice(&color);
        }
      }
    }
  }

  unsafe fn color(&mut self, color: [f32; 4]) {
    let mut s = self.0.borrow_mut();
    s.log(format!("color({:?})", color));
    s.color = color;
  }

  unsafe fn vertex_pointer(&mut self, size: GLint, ty: GLenum, stride: GLsizei, ptr: *const c_void) {
    let mut s = self.0.borrow_mut();
    s.log(format!("vertex_pointer({}, {:#x}, {})", size, ty, stride));
    s.pointers.insert(
      (ClientArray::Vertex, 0),
      Pointer {
        size,
        ty,
        stride,
        ptr,
      },
    );
  }

  unsafe fn color_pointer(&mut self, size: GLint, ty: GLenum, stride: GLsizei, ptr: *const c_void) {
    let mut s = self.0.borrow_mut();
    s.log(format!("color_pointer({}, {:#x}, {})", size, ty, stride));
    s.pointers.insert(
      (ClientArray::Color, 0),
      Pointer {
        size,
        ty,
        stride,
        ptr,
      },
    );
  }

  unsafe fn normal_pointer(&mut self, ty: GLenum, stride: GLsizei, ptr: *const c_void) {
    let mut s = self.0.borrow_mut();
    s.log(format!("normal_pointer({:#x}, {})", ty, stride));
    s.pointers.insert(
      (ClientArray::Normal, 0),
      Pointer {
        size: 3,
        ty,
        stride,
        ptr,
      },
    );
  }

  unsafe fn tex_coord_pointer(
    &mut self,
    size: GLint,
    ty: GLenum,
    stride: GLsizei,
    ptr: *const c_void,
  ) {
    let mut s = self.0.borrow_mut();
    s.log(format!("tex_coord_pointer({}, {:#x}, {})", size, ty, stride));
    let key = s.array_key(ClientArray::TextureCoord);
    s.pointers.insert(
      key,
      Pointer {
        size,
        ty,
        stride,
        ptr,
      },
    );
  }

  unsafe fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
    let mut s = self.0.borrow_mut();
    s.log(format!("draw_arrays({:#x}, {}, {})", mode, first, count));

    let texture = Some(s.bound(gl::TEXTURE_2D))
      .filter(|&handle| handle != 0 && s.is_enabled_cap(gl::TEXTURE_2D));
    let tex_coords = s.read_tex_coords(first, count);

    let draw = Draw {
      surface: s.current,
      mode,
      first,
      count,
      texture,
      unit: s.active_unit,
      tex_coords: tex_coords.clone(),
    };
    s.draws.push(draw);

    if s.framebuffer != 0 || s.fill_mode != gl::FILL {
      return;
    }

    let mask = s.color_write;

    match (texture, tex_coords) {
      (Some(handle), Some(_)) => {
        let texels: Vec<(u32, u32, [u8; 4])> = {
          let texture = &s.textures[&handle];
          let [w, h, _] = texture.size;
          (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|_| texture.bytes_per_texel == 4)
            .map(|(x, y)| {
              let t = texture.texel(x, y);
              (x, y, [t[0], t[1], t[2], t[3]])
            })
            .collect()
        };

        let target = s.current_pixels();
        for (x, y, texel) in texels {
          if x < target.width && y < target.height {
            let width = target.width;
            write_masked(&mut target.data[(y * width + x) as usize], texel, mask);
          }
        }
      }

      _ => {
        let color = to_u8(s.color);
        s.current_pixels().fill(color, mask);
      }
    }
  }

  unsafe fn gen_framebuffer(&mut self) -> GLuint {
    let mut s = self.0.borrow_mut();
    s.log("gen_framebuffer()".to_owned());
    s.next_framebuffer += 1;
    s.next_framebuffer
  }

  unsafe fn delete_framebuffer(&mut self, handle: GLuint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("delete_framebuffer({})", handle));
  }

  unsafe fn bind_framebuffer(&mut self, handle: GLuint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("bind_framebuffer({})", handle));
    s.framebuffer = handle;
  }

  unsafe fn framebuffer_texture_2d(&mut self, texture: GLuint, level: GLint) {
    let mut s = self.0.borrow_mut();
    s.log(format!("framebuffer_texture_2d({}, {})", texture, level));
    s.framebuffer_attachment = texture;
  }

  unsafe fn check_framebuffer_status(&mut self) -> GLenum {
    let mut s = self.0.borrow_mut();
    s.log("check_framebuffer_status()".to_owned());
    s.framebuffer_status
  }
}
