//! Graphics state.
//!
//! Blending, rasterizer and depth-stencil configurations are each tracked by their own
//! [`StateTracker`]. Setting a description only compares it with the current one; applying it only
//! sends the device the calls needed to go from what was applied last to the new description.
//! Trackers never look at each other, so touching one category never re-emits another.

use gl::types::*;
use log::debug;

use crate::gl1::capabilities::Capabilities;
use crate::gl1::depth_stencil::{comparison_to_glenum, stencil_op_to_glenum};
use crate::gl1::device::Device;
use crate::gl1::native::NativeGl;
use lustre::blending::{BlendState, Equation, Factor};
use lustre::depth_stencil::{DepthStencilState, StencilFace};
use lustre::rasterizer::{CullMode, FillMode, FrontFace, RasterizerState};

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set. A non-cached value (i.e. empty) means we don’t
/// know what the device is using, which forces the next command to run.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// An empty cache.
  fn empty() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }
}

/// A state description that knows how to reach itself on a device.
pub(crate) trait DeviceState: Copy + PartialEq {
  /// Send the calls needed to go from `previous` to `self`. `None` means the device state is
  /// unknown and everything must be sent.
  ///
  /// # Unsafety
  ///
  /// The device must be current.
  unsafe fn reach<N>(&self, previous: Option<&Self>, gl: &mut N, caps: &Capabilities)
  where
    N: NativeGl;
}

/// A state description plus a dirty flag.
#[derive(Debug)]
pub(crate) struct StateTracker<D>
where
  D: DeviceState,
{
  current: D,
  dirty: bool,
  applied: Cached<D>,
}

impl<D> StateTracker<D>
where
  D: DeviceState,
{
  /// A tracker which first [`StateTracker::apply`] sends everything.
  pub(crate) fn new(initial: D) -> Self {
    StateTracker {
      current: initial,
      dirty: true,
      applied: Cached::empty(),
    }
  }

  /// Description the device will be in after the next apply.
  pub(crate) fn current(&self) -> &D {
    &self.current
  }

  /// Change the description; only marks the tracker dirty if it actually differs.
  pub(crate) fn set(&mut self, desc: &D) {
    if self.current != *desc {
      self.current = *desc;
      self.dirty = true;
    }
  }

  /// Send the current description to the device, if dirty.
  pub(crate) fn apply<N>(&mut self, device: &mut Device<N>, caps: &Capabilities)
  where
    N: NativeGl,
  {
    if !self.dirty {
      return;
    }

    self.dirty = false;

    unsafe {
      self.current.reach(self.applied.get(), device.gl(), caps);
    }

    self.applied.set(self.current);
  }

  /// Forget what the device is using; the next apply sends everything.
  pub(crate) fn invalidate(&mut self) {
    self.applied.invalidate();
    self.dirty = true;
  }
}

// Whether a part of a description must be sent.
fn differs<D, T, F>(previous: Option<&D>, current: &D, part: F) -> bool
where
  T: PartialEq,
  F: Fn(&D) -> T,
{
  previous.map_or(true, |previous| part(previous) != part(current))
}

unsafe fn set_capability<N>(gl: &mut N, cap: GLenum, enabled: bool)
where
  N: NativeGl,
{
  if enabled {
    gl.enable(cap);
  } else {
    gl.disable(cap);
  }
}

impl DeviceState for BlendState {
  unsafe fn reach<N>(&self, previous: Option<&Self>, gl: &mut N, caps: &Capabilities)
  where
    N: NativeGl,
  {
    if differs(previous, self, BlendState::enabled) {
      set_capability(gl, gl::BLEND, self.enabled());
    }

    if differs(previous, self, BlendState::color_write) {
      let [r, g, b, a] = self.color_write();
      gl.color_mask(r, g, b, a);
    }

    if differs(previous, self, |s| (s.equation(), s.equation_alpha())) {
      let (color, alpha) = (self.equation(), self.equation_alpha());

      if color != alpha && caps.blend_equation_separate {
        gl.blend_equation_separate(from_blending_equation(color), from_blending_equation(alpha));
      } else if caps.blend_equation {
        if color != alpha {
          debug!("separate blend equations unsupported, using the color one for alpha");
        }

        gl.blend_equation(from_blending_equation(color));
      }
    }

    if differs(previous, self, |s| (s.factors(), s.factors_alpha())) {
      let (src, dst) = self.factors();
      let (src_alpha, dst_alpha) = self.factors_alpha();

      if (src, dst) != (src_alpha, dst_alpha) && caps.blend_func_separate {
        gl.blend_func_separate(
          from_blending_factor(src),
          from_blending_factor(dst),
          from_blending_factor(src_alpha),
          from_blending_factor(dst_alpha),
        );
      } else {
        gl.blend_func(from_blending_factor(src), from_blending_factor(dst));
      }
    }

    if caps.blend_color && differs(previous, self, BlendState::constant_color) {
      gl.blend_color(self.constant_color());
    }
  }
}

impl DeviceState for RasterizerState {
  unsafe fn reach<N>(&self, previous: Option<&Self>, gl: &mut N, _: &Capabilities)
  where
    N: NativeGl,
  {
    if differs(previous, self, RasterizerState::culled) {
      set_capability(gl, gl::CULL_FACE, self.culled());
    }

    if differs(previous, self, RasterizerState::cull_mode) {
      gl.cull_face(from_cull_mode(self.cull_mode()));
    }

    if differs(previous, self, RasterizerState::fill_mode) {
      gl.polygon_mode(gl::FRONT_AND_BACK, from_fill_mode(self.fill_mode()));
    }

    if differs(previous, self, RasterizerState::front_face) {
      gl.front_face(from_front_face(self.front_face()));
    }

    if differs(previous, self, RasterizerState::line_antialiased) {
      set_capability(gl, gl::LINE_SMOOTH, self.line_antialiased());
    }

    if differs(previous, self, RasterizerState::polygon_antialiased) {
      set_capability(gl, gl::POLYGON_SMOOTH, self.polygon_antialiased());
    }

    if differs(previous, self, RasterizerState::offset_enabled) {
      let [point, line, fill] = self.offset_enabled();
      set_capability(gl, gl::POLYGON_OFFSET_POINT, point);
      set_capability(gl, gl::POLYGON_OFFSET_LINE, line);
      set_capability(gl, gl::POLYGON_OFFSET_FILL, fill);
    }

    if differs(previous, self, RasterizerState::offset) {
      let (factor, units) = self.offset();
      gl.polygon_offset(factor, units);
    }

    if differs(previous, self, RasterizerState::point_size) {
      gl.point_size(self.point_size());
    }

    if differs(previous, self, RasterizerState::line_width) {
      gl.line_width(self.line_width());
    }

    if differs(previous, self, RasterizerState::scissor) {
      set_capability(gl, gl::SCISSOR_TEST, self.scissor());
    }
  }
}

impl DeviceState for DepthStencilState {
  unsafe fn reach<N>(&self, previous: Option<&Self>, gl: &mut N, caps: &Capabilities)
  where
    N: NativeGl,
  {
    if differs(previous, self, DepthStencilState::stencil_test) {
      set_capability(gl, gl::STENCIL_TEST, self.stencil_test());
    }

    let front = self.stencil_front();
    let back = self.stencil_back();
    let separate = caps.stencil_separate;

    if differs(previous, self, |s| (s.stencil_front().test, s.stencil_back().test)) {
      if front.test == back.test || !separate {
        let (func, reference, mask) = stencil_func(&front);
        gl.stencil_func(func, reference, mask);
      } else {
        let (func, reference, mask) = stencil_func(&front);
        gl.stencil_func_separate(gl::FRONT, func, reference, mask);
        let (func, reference, mask) = stencil_func(&back);
        gl.stencil_func_separate(gl::BACK, func, reference, mask);
      }
    }

    if differs(previous, self, |s| {
      (s.stencil_front().operations, s.stencil_back().operations)
    }) {
      if front.operations == back.operations || !separate {
        let (sfail, dpfail, pass) = stencil_ops(&front);
        gl.stencil_op(sfail, dpfail, pass);
      } else {
        let (sfail, dpfail, pass) = stencil_ops(&front);
        gl.stencil_op_separate(gl::FRONT, sfail, dpfail, pass);
        let (sfail, dpfail, pass) = stencil_ops(&back);
        gl.stencil_op_separate(gl::BACK, sfail, dpfail, pass);
      }
    }

    if differs(previous, self, |s| {
      (s.stencil_front().write_mask, s.stencil_back().write_mask)
    }) {
      if front.write_mask == back.write_mask || !separate {
        gl.stencil_mask(front.write_mask as GLuint);
      } else {
        gl.stencil_mask_separate(gl::FRONT, front.write_mask as GLuint);
        gl.stencil_mask_separate(gl::BACK, back.write_mask as GLuint);
      }
    }

    if differs(previous, self, DepthStencilState::depth_test) {
      set_capability(gl, gl::DEPTH_TEST, self.depth_test());
    }

    if differs(previous, self, DepthStencilState::depth_write) {
      gl.depth_mask(self.depth_write());
    }

    if differs(previous, self, DepthStencilState::depth_comparison) {
      gl.depth_func(comparison_to_glenum(self.depth_comparison()));
    }
  }
}

fn stencil_func(face: &StencilFace) -> (GLenum, GLint, GLuint) {
  (
    comparison_to_glenum(face.test.comparison),
    face.test.reference as GLint,
    face.test.mask as GLuint,
  )
}

fn stencil_ops(face: &StencilFace) -> (GLenum, GLenum, GLenum) {
  let ops = &face.operations;

  (
    stencil_op_to_glenum(ops.depth_passes_stencil_fails),
    stencil_op_to_glenum(ops.depth_fails_stencil_passes),
    stencil_op_to_glenum(ops.depth_stencil_pass),
  )
}

#[inline]
fn from_blending_equation(equation: Equation) -> GLenum {
  match equation {
    Equation::Additive => gl::FUNC_ADD,
    Equation::Subtract => gl::FUNC_SUBTRACT,
    Equation::ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
    Equation::Min => gl::MIN,
    Equation::Max => gl::MAX,
  }
}

#[inline]
fn from_blending_factor(factor: Factor) -> GLenum {
  match factor {
    Factor::One => gl::ONE,
    Factor::Zero => gl::ZERO,
    Factor::SrcColor => gl::SRC_COLOR,
    Factor::SrcColorComplement => gl::ONE_MINUS_SRC_COLOR,
    Factor::DestColor => gl::DST_COLOR,
    Factor::DestColorComplement => gl::ONE_MINUS_DST_COLOR,
    Factor::SrcAlpha => gl::SRC_ALPHA,
    Factor::SrcAlphaComplement => gl::ONE_MINUS_SRC_ALPHA,
    Factor::DstAlpha => gl::DST_ALPHA,
    Factor::DstAlphaComplement => gl::ONE_MINUS_DST_ALPHA,
    Factor::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
    Factor::ConstantColor => gl::CONSTANT_COLOR,
    Factor::ConstantColorComplement => gl::ONE_MINUS_CONSTANT_COLOR,
    Factor::ConstantAlpha => gl::CONSTANT_ALPHA,
    Factor::ConstantAlphaComplement => gl::ONE_MINUS_CONSTANT_ALPHA,
  }
}

fn from_cull_mode(mode: CullMode) -> GLenum {
  match mode {
    CullMode::Front => gl::FRONT,
    CullMode::Back => gl::BACK,
    CullMode::Both => gl::FRONT_AND_BACK,
  }
}

pub(crate) fn from_fill_mode(mode: FillMode) -> GLenum {
  match mode {
    FillMode::Point => gl::POINT,
    FillMode::Line => gl::LINE,
    FillMode::Fill => gl::FILL,
  }
}

fn from_front_face(face: FrontFace) -> GLenum {
  match face {
    FrontFace::CW => gl::CW,
    FrontFace::CCW => gl::CCW,
  }
}
