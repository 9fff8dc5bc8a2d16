//! Vertex attribute streams.
//!
//! Vertex data lives in user memory and is only *borrowed* for the duration of a draw. An
//! [`AttributeStream`] describes where one attribute lives in a byte buffer: the offset of the
//! first element, the stride between two consecutive vertices, the element type and the number of
//! components per vertex.
//!
//! A draw receives its streams grouped in a [`VertexArrays`].

use std::fmt;

/// Type of the components of a vertex attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VertexAttribType {
  /// Signed 8-bit integer.
  Byte,
  /// Unsigned 8-bit integer.
  UnsignedByte,
  /// Signed 16-bit integer.
  Short,
  /// Unsigned 16-bit integer.
  UnsignedShort,
  /// Signed 32-bit integer.
  Int,
  /// Unsigned 32-bit integer.
  UnsignedInt,
  /// 32-bit floating point.
  Float,
}

impl VertexAttribType {
  /// Size of a single component, in bytes.
  pub fn size(self) -> usize {
    match self {
      VertexAttribType::Byte | VertexAttribType::UnsignedByte => 1,
      VertexAttribType::Short | VertexAttribType::UnsignedShort => 2,
      VertexAttribType::Int | VertexAttribType::UnsignedInt | VertexAttribType::Float => 4,
    }
  }

  /// Whether the type is an integral one.
  pub fn is_integral(self) -> bool {
    !matches!(self, VertexAttribType::Float)
  }
}

impl fmt::Display for VertexAttribType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    let name = match *self {
      VertexAttribType::Byte => "i8",
      VertexAttribType::UnsignedByte => "u8",
      VertexAttribType::Short => "i16",
      VertexAttribType::UnsignedShort => "u16",
      VertexAttribType::Int => "i32",
      VertexAttribType::UnsignedInt => "u32",
      VertexAttribType::Float => "f32",
    };

    f.write_str(name)
  }
}

/// A borrowed, strided view over one vertex attribute.
///
/// A `stride` of `0` means the vertices are tightly packed, i.e. the stride is the size of one
/// element (`components * ty.size()`).
#[derive(Clone, Copy, Debug)]
pub struct AttributeStream<'a> {
  data: &'a [u8],
  offset: usize,
  stride: usize,
  ty: VertexAttribType,
  components: usize,
}

impl<'a> AttributeStream<'a> {
  /// Create a tightly packed stream over raw bytes.
  pub fn new(data: &'a [u8], ty: VertexAttribType, components: usize) -> Self {
    AttributeStream {
      data,
      offset: 0,
      stride: 0,
      ty,
      components,
    }
  }

  /// Create a tightly packed stream of floats.
  pub fn from_f32(data: &'a [f32], components: usize) -> Self {
    Self::new(
      bytemuck::cast_slice(data),
      VertexAttribType::Float,
      components,
    )
  }

  /// Create a tightly packed stream of signed 32-bit integers.
  pub fn from_i32(data: &'a [i32], components: usize) -> Self {
    Self::new(bytemuck::cast_slice(data), VertexAttribType::Int, components)
  }

  /// Create a tightly packed stream of unsigned 16-bit integers.
  pub fn from_u16(data: &'a [u16], components: usize) -> Self {
    Self::new(
      bytemuck::cast_slice(data),
      VertexAttribType::UnsignedShort,
      components,
    )
  }

  /// Create a tightly packed stream of unsigned bytes.
  pub fn from_u8(data: &'a [u8], components: usize) -> Self {
    Self::new(data, VertexAttribType::UnsignedByte, components)
  }

  /// Byte offset of the first element.
  pub fn set_offset(self, offset: usize) -> Self {
    Self { offset, ..self }
  }

  /// Byte distance between two consecutive vertices; `0` for tightly packed data.
  pub fn set_stride(self, stride: usize) -> Self {
    Self { stride, ..self }
  }

  /// Underlying bytes.
  pub fn data(&self) -> &'a [u8] {
    self.data
  }

  /// Byte offset of the first element.
  pub fn offset(&self) -> usize {
    self.offset
  }

  /// Byte stride, as given (`0` for tightly packed).
  pub fn stride(&self) -> usize {
    self.stride
  }

  /// Component type.
  pub fn ty(&self) -> VertexAttribType {
    self.ty
  }

  /// Number of components per vertex.
  pub fn components(&self) -> usize {
    self.components
  }

  /// Byte distance between two consecutive vertices, resolving tightly packed data.
  pub fn vertex_stride(&self) -> usize {
    if self.stride == 0 {
      self.components * self.ty.size()
    } else {
      self.stride
    }
  }

  /// Bytes of one component of one vertex, if they lie in the stream.
  fn component_bytes(&self, vertex: usize, component: usize) -> Option<&'a [u8]> {
    let size = self.ty.size();
    let start = self
      .offset
      .checked_add(vertex.checked_mul(self.vertex_stride())?)?
      .checked_add(component.checked_mul(size)?)?;

    self.data.get(start..start.checked_add(size)?)
  }

  /// Read a float component.
  ///
  /// Returns `None` if the stream isn’t a float stream or if the component lies outside of it.
  pub fn read_f32(&self, vertex: usize, component: usize) -> Option<f32> {
    if self.ty != VertexAttribType::Float {
      return None;
    }

    let bytes = self.component_bytes(vertex, component)?;
    Some(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
  }

  /// Read an integral component, widened to `i64`.
  ///
  /// Returns `None` if the stream isn’t integral or if the component lies outside of it.
  pub fn read_integer(&self, vertex: usize, component: usize) -> Option<i64> {
    let bytes = self.component_bytes(vertex, component)?;

    let value = match self.ty {
      VertexAttribType::Byte => bytes[0] as i8 as i64,
      VertexAttribType::UnsignedByte => bytes[0] as i64,
      VertexAttribType::Short => i16::from_ne_bytes([bytes[0], bytes[1]]) as i64,
      VertexAttribType::UnsignedShort => u16::from_ne_bytes([bytes[0], bytes[1]]) as i64,
      VertexAttribType::Int => i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
      VertexAttribType::UnsignedInt => {
        u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64
      }
      VertexAttribType::Float => return None,
    };

    Some(value)
  }

  /// Pointer to the first element, as expected by native attribute pointer entry points.
  ///
  /// The pointer is only valid as long as the borrowed data is; it’s dangling if the offset is
  /// past the end of the data.
  pub fn as_ptr(&self) -> *const u8 {
    self.data.as_ptr().wrapping_add(self.offset)
  }
}

/// Streams bound for a single draw.
///
/// Only the position stream is required by most devices; every other stream is optional. The
/// texture index stream selects, per vertex, the texture unit used to texture it.
#[derive(Clone, Copy, Debug, Default)]
pub struct VertexArrays<'a> {
  /// Positions.
  pub position: Option<AttributeStream<'a>>,
  /// Colors.
  pub color: Option<AttributeStream<'a>>,
  /// Texture coordinates.
  pub tex_coord: Option<AttributeStream<'a>>,
  /// Per-vertex texture unit indices.
  pub tex_index: Option<AttributeStream<'a>>,
  /// Normals.
  pub normal: Option<AttributeStream<'a>>,
}

impl<'a> VertexArrays<'a> {
  /// Create an empty set of streams.
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind the position stream.
  pub fn set_position(self, stream: AttributeStream<'a>) -> Self {
    Self {
      position: Some(stream),
      ..self
    }
  }

  /// Bind the color stream.
  pub fn set_color(self, stream: AttributeStream<'a>) -> Self {
    Self {
      color: Some(stream),
      ..self
    }
  }

  /// Bind the texture coordinate stream.
  pub fn set_tex_coord(self, stream: AttributeStream<'a>) -> Self {
    Self {
      tex_coord: Some(stream),
      ..self
    }
  }

  /// Bind the texture index stream.
  pub fn set_tex_index(self, stream: AttributeStream<'a>) -> Self {
    Self {
      tex_index: Some(stream),
      ..self
    }
  }

  /// Bind the normal stream.
  pub fn set_normal(self, stream: AttributeStream<'a>) -> Self {
    Self {
      normal: Some(stream),
      ..self
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn packed_float_reads() {
    let data = [1., 2., 3., 4., 5., 6.];
    let stream = AttributeStream::from_f32(&data, 2);

    assert_eq!(stream.vertex_stride(), 8);
    assert_eq!(stream.read_f32(0, 0), Some(1.));
    assert_eq!(stream.read_f32(1, 1), Some(4.));
    assert_eq!(stream.read_f32(2, 0), Some(5.));
    assert_eq!(stream.read_f32(3, 0), None);
    assert_eq!(stream.read_integer(0, 0), None);
  }

  #[test]
  fn strided_reads_honor_offset() {
    // interleaved (x, y, u, v) with u, v as the stream of interest
    let data = [0., 0., 0.25, 0.5, 1., 1., 0.75, 1.];
    let stream = AttributeStream::from_f32(&data, 2)
      .set_offset(8)
      .set_stride(16);

    assert_eq!(stream.read_f32(0, 0), Some(0.25));
    assert_eq!(stream.read_f32(0, 1), Some(0.5));
    assert_eq!(stream.read_f32(1, 0), Some(0.75));
    assert_eq!(stream.read_f32(1, 1), Some(1.));
    assert_eq!(stream.read_f32(2, 0), None);
  }

  #[test]
  fn integral_reads_widen() {
    let ints = [-3, 7];
    let stream = AttributeStream::from_i32(&ints, 1);
    assert_eq!(stream.read_integer(0, 0), Some(-3));
    assert_eq!(stream.read_integer(1, 0), Some(7));

    let bytes = [200, 1];
    let stream = AttributeStream::from_u8(&bytes, 1);
    assert_eq!(stream.read_integer(0, 0), Some(200));

    let stream = AttributeStream::new(&bytes, VertexAttribType::Byte, 1);
    assert_eq!(stream.read_integer(0, 0), Some(-56));
  }
}
