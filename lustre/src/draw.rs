//! Draw errors.

use std::fmt;

use crate::error::ErrorKind;
use crate::framebuffer::FramebufferError;
use crate::texture::TextureError;
use crate::vertex::VertexAttribType;

/// Errors that might happen when issuing draw calls or touching draw-related context state.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DrawError {
  /// A stream has a component type the operation cannot handle.
  ///
  /// Texture coordinates must be floats and texture indices must be integers.
  UnsupportedAttributeType {
    /// Name of the stream.
    stream: &'static str,
    /// Type of the stream.
    ty: VertexAttribType,
  },
  /// A stream has a component count the operation cannot handle.
  UnsupportedComponentCount {
    /// Name of the stream.
    stream: &'static str,
    /// Number of components of the stream.
    components: usize,
  },
  /// A vertex of the drawn range lies outside of a stream’s data.
  StreamOverflow {
    /// Name of the stream.
    stream: &'static str,
    /// Index of the first vertex that couldn’t be read.
    vertex: usize,
  },
  /// The texture unit is out of the range supported by the device.
  InvalidTextureUnit {
    /// Requested unit.
    unit: usize,
    /// Number of units of the device.
    max: usize,
  },
  /// A scissor rectangle was set while the rasterizer state has scissoring disabled.
  ScissorDisabled,
  /// Texture error.
  TextureError(TextureError),
  /// Framebuffer error.
  FramebufferError(FramebufferError),
}

impl DrawError {
  /// Class of the error.
  pub fn kind(&self) -> ErrorKind {
    match *self {
      DrawError::TextureError(ref e) => e.kind(),
      DrawError::FramebufferError(ref e) => e.kind(),
      _ => ErrorKind::Usage,
    }
  }
}

impl fmt::Display for DrawError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      DrawError::UnsupportedAttributeType { stream, ty } => {
        write!(f, "unsupported {} component type for {} stream", ty, stream)
      }

      DrawError::UnsupportedComponentCount { stream, components } => write!(
        f,
        "unsupported component count for {} stream: {}",
        stream, components
      ),

      DrawError::StreamOverflow { stream, vertex } => {
        write!(f, "vertex {} lies outside of the {} stream", vertex, stream)
      }

      DrawError::InvalidTextureUnit { unit, max } => write!(
        f,
        "invalid texture unit {} (the device has {} units)",
        unit, max
      ),

      DrawError::ScissorDisabled => f.write_str("scissor is disabled in the rasterizer state"),

      DrawError::TextureError(ref e) => write!(f, "draw texture error: {}", e),

      DrawError::FramebufferError(ref e) => write!(f, "draw framebuffer error: {}", e),
    }
  }
}

impl std::error::Error for DrawError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      DrawError::TextureError(e) => Some(e),
      DrawError::FramebufferError(e) => Some(e),
      _ => None,
    }
  }
}

impl From<TextureError> for DrawError {
  fn from(e: TextureError) -> Self {
    DrawError::TextureError(e)
  }
}

impl From<FramebufferError> for DrawError {
  fn from(e: FramebufferError) -> Self {
    DrawError::FramebufferError(e)
  }
}
