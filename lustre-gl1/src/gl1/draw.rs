//! Batched draws.
//!
//! A fixed-function device textures a whole draw with the textures bound at the time of the call.
//! Vertices carrying a texture index are therefore split in runs of identical index, and every run
//! is drawn on its own with the texture of its index bound.

use gl::types::*;
use log::trace;
use std::ops::RangeInclusive;
use std::os::raw::c_void;

use crate::gl1::native::{ClientArray, NativeGl};
use crate::gl1::texture::{check_scalable, transform_coordinates, TextureId};
use crate::gl1::Gl1;
use lustre::draw::DrawError;
use lustre::tess::Mode;
use lustre::vertex::VertexAttribType::*;
use lustre::vertex::{AttributeStream, VertexArrays, VertexAttribType};

const POSITION_TYPES: &[VertexAttribType] = &[Short, Int, Float];
const COLOR_TYPES: &[VertexAttribType] = &[
  Byte,
  UnsignedByte,
  Short,
  UnsignedShort,
  Int,
  UnsignedInt,
  Float,
];
const NORMAL_TYPES: &[VertexAttribType] = &[Byte, Short, Int, Float];
const TEX_COORD_TYPES: &[VertexAttribType] = &[Short, Int, Float];

pub(crate) fn opengl_mode(mode: Mode) -> GLenum {
  match mode {
    Mode::Point => gl::POINTS,
    Mode::Line => gl::LINES,
    Mode::LineStrip => gl::LINE_STRIP,
    Mode::LineLoop => gl::LINE_LOOP,
    Mode::Triangle => gl::TRIANGLES,
    Mode::TriangleFan => gl::TRIANGLE_FAN,
    Mode::TriangleStrip => gl::TRIANGLE_STRIP,
  }
}

fn opengl_attrib_type(ty: VertexAttribType) -> GLenum {
  match ty {
    Byte => gl::BYTE,
    UnsignedByte => gl::UNSIGNED_BYTE,
    Short => gl::SHORT,
    UnsignedShort => gl::UNSIGNED_SHORT,
    Int => gl::INT,
    UnsignedInt => gl::UNSIGNED_INT,
    Float => gl::FLOAT,
  }
}

/// Vertices sharing the same texture index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Run {
  pub(crate) index: i64,
  pub(crate) first: usize,
  pub(crate) count: usize,
}

/// Split `[first, first + count)` in maximal runs of identical texture index.
///
/// A stream without components selects index `0` for every vertex.
pub(crate) fn index_runs(
  stream: &AttributeStream,
  first: usize,
  count: usize,
) -> Result<Vec<Run>, DrawError> {
  if !stream.ty().is_integral() {
    return Err(DrawError::UnsupportedAttributeType {
      stream: "texture index",
      ty: stream.ty(),
    });
  }

  if count == 0 {
    return Ok(Vec::new());
  }

  if stream.components() == 0 {
    return Ok(vec![Run {
      index: 0,
      first,
      count,
    }]);
  }

  let read = |vertex| {
    stream
      .read_integer(vertex, 0)
      .ok_or(DrawError::StreamOverflow {
        stream: "texture index",
        vertex,
      })
  };

  let mut runs = Vec::new();
  let mut run = Run {
    index: read(first)?,
    first,
    count: 1,
  };

  for vertex in first + 1..first + count {
    let index = read(vertex)?;

    if index == run.index {
      run.count += 1;
    } else {
      runs.push(run);
      run = Run {
        index,
        first: vertex,
        count: 1,
      };
    }
  }

  runs.push(run);
  Ok(runs)
}

// make sure a stream can be handed to the device as-is for the given range
fn check_stream(
  name: &'static str,
  stream: &AttributeStream,
  types: &[VertexAttribType],
  components: RangeInclusive<usize>,
  first: usize,
  count: usize,
) -> Result<(), DrawError> {
  if !types.contains(&stream.ty()) {
    return Err(DrawError::UnsupportedAttributeType {
      stream: name,
      ty: stream.ty(),
    });
  }

  if !components.contains(&stream.components()) {
    return Err(DrawError::UnsupportedComponentCount {
      stream: name,
      components: stream.components(),
    });
  }

  if count == 0 {
    return Ok(());
  }

  let last = first.saturating_add(count - 1);
  let component = stream.components() - 1;
  let readable = if stream.ty() == Float {
    stream.read_f32(last, component).is_some()
  } else {
    stream.read_integer(last, component).is_some()
  };

  if readable {
    Ok(())
  } else {
    Err(DrawError::StreamOverflow {
      stream: name,
      vertex: last,
    })
  }
}

// (size, type, stride, pointer)
fn stream_pointer(stream: &AttributeStream) -> (GLint, GLenum, GLsizei, *const c_void) {
  (
    stream.components() as GLint,
    opengl_attrib_type(stream.ty()),
    stream.stride() as GLsizei,
    stream.as_ptr() as *const c_void,
  )
}

impl<N> Gl1<N>
where
  N: NativeGl,
{
  pub(crate) fn dispatch_draw(
    &mut self,
    mode: Mode,
    first: usize,
    count: usize,
    arrays: &VertexArrays,
  ) -> Result<(), DrawError> {
    if count == 0 {
      return Ok(());
    }

    // validate everything before touching the device
    if let Some(ref position) = arrays.position {
      check_stream("position", position, POSITION_TYPES, 2..=4, first, count)?;
    }

    if let Some(ref color) = arrays.color {
      check_stream("color", color, COLOR_TYPES, 3..=4, first, count)?;
    }

    if let Some(ref normal) = arrays.normal {
      check_stream("normal", normal, NORMAL_TYPES, 3..=3, first, count)?;
    }

    if let Some(ref tex_coord) = arrays.tex_coord {
      check_stream("texture coordinate", tex_coord, TEX_COORD_TYPES, 1..=4, first, count)?;
    }

    let runs = match (arrays.tex_coord, arrays.tex_index) {
      (None, _) => Vec::new(),

      (Some(_), None) => vec![Run {
        index: 0,
        first,
        count,
      }],

      (Some(_), Some(ref tex_index)) => index_runs(tex_index, first, count)?,
    };

    // coordinates of padded textures get scaled, which only some streams allow
    if let Some(ref tex_coord) = arrays.tex_coord {
      let padded = runs.iter().any(|run| {
        self
          .run_texture(run.index)
          .and_then(|id| self.textures.get(id))
          .map_or(false, |texture| !texture.surface.is_exact())
      });

      if padded {
        check_scalable(tex_coord)?;
      }
    }

    self.activate_target();
    let mode = opengl_mode(mode);

    unsafe {
      let gl = self.device.gl();

      if let Some(ref position) = arrays.position {
        let (size, ty, stride, ptr) = stream_pointer(position);
        gl.enable_client_state(ClientArray::Vertex);
        gl.vertex_pointer(size, ty, stride, ptr);
      }

      if let Some(ref color) = arrays.color {
        let (size, ty, stride, ptr) = stream_pointer(color);
        gl.enable_client_state(ClientArray::Color);
        gl.color_pointer(size, ty, stride, ptr);
      }

      if let Some(ref normal) = arrays.normal {
        let (_, ty, stride, ptr) = stream_pointer(normal);
        gl.enable_client_state(ClientArray::Normal);
        gl.normal_pointer(ty, stride, ptr);
      }
    }

    let result = match arrays.tex_coord {
      None => {
        unsafe {
          self
            .device
            .gl()
            .draw_arrays(mode, first as GLint, count as GLsizei)
        };
        Ok(())
      }

      Some(ref tex_coord) => {
        trace!("drawing {} vertices in {} run(s)", count, runs.len());

        runs
          .iter()
          .try_for_each(|run| self.draw_run(mode, tex_coord, *run))
      }
    };

    unsafe {
      let gl = self.device.gl();
      gl.disable_client_state(ClientArray::Vertex);
      gl.disable_client_state(ClientArray::Color);
      gl.disable_client_state(ClientArray::Normal);
      gl.disable_client_state(ClientArray::TextureCoord);
    }

    result
  }

  fn run_texture(&self, index: i64) -> Option<TextureId> {
    let unit = usize::try_from(index).ok()?;
    self.selected.get(unit).copied().flatten()
  }

  // draw a run of vertices textured with the texture selected on the unit of its index
  fn draw_run(
    &mut self,
    mode: GLenum,
    tex_coord: &AttributeStream,
    run: Run,
  ) -> Result<(), DrawError> {
    let texture = self
      .run_texture(run.index)
      .and_then(|id| self.textures.get(id))
      .map(|texture| (texture.target, texture.handle, texture.surface));

    let (target, handle, surface) = match texture {
      Some(texture) => texture,

      None => {
        // nothing to texture with, still draw the vertices
        unsafe {
          self
            .device
            .gl()
            .draw_arrays(mode, run.first as GLint, run.count as GLsizei)
        };
        return Ok(());
      }
    };

    let (size, ty, stride, ptr) = if surface.is_exact() {
      stream_pointer(tex_coord)
    } else {
      transform_coordinates(
        surface.ratio(),
        tex_coord,
        run.first,
        run.count,
        run.first + run.count,
        &mut self.coords,
      )?;

      (
        tex_coord.components() as GLint,
        gl::FLOAT,
        0,
        self.coords.as_ptr() as *const c_void,
      )
    };

    // index is a valid unit at this point, since it selected a texture
    let unit = gl::TEXTURE0 + run.index as GLenum;
    let (multitexture, client_multitexture) = (self.caps.multitexture, self.caps.client_multitexture);
    let gl = self.device.gl();

    unsafe {
      if multitexture {
        gl.active_texture(unit);
      }

      if client_multitexture {
        gl.client_active_texture(unit);
      }

      gl.enable(target);
      gl.bind_texture(target, handle);
      gl.enable_client_state(ClientArray::TextureCoord);
      gl.tex_coord_pointer(size, ty, stride, ptr);

      gl.draw_arrays(mode, run.first as GLint, run.count as GLsizei);

      gl.disable_client_state(ClientArray::TextureCoord);
      gl.bind_texture(target, 0);
      gl.disable(target);

      if unit != gl::TEXTURE0 {
        if multitexture {
          gl.active_texture(gl::TEXTURE0);
        }

        if client_multitexture {
          gl.client_active_texture(gl::TEXTURE0);
        }
      }
    }

    Ok(())
  }
}
