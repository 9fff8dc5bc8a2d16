//! Render targets.
//!
//! Rendering goes either to the window or to a texture attached as the color target of the
//! context. Devices without render-to-texture support emulate the latter with an offscreen
//! surface that is kept in sync with the texture.

use std::fmt;

use crate::error::ErrorKind;
use crate::texture::TextureError;

/// Framebuffer error.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FramebufferError {
  /// Texture error.
  ///
  /// This happens while attaching a texture.
  TextureError(TextureError),
  /// Incomplete error.
  ///
  /// This happens when a native framebuffer object rejects its attachments.
  Incomplete(IncompleteReason),
  /// Rendering to a texture was requested but no texture is attached.
  NoRenderTarget,
  /// The texture cannot be attached (only level `0` of 2D textures can be).
  UnsupportedAttachment {
    /// Mipmap level that was asked.
    level: u32,
  },
  /// The device failed to create the offscreen surface backing an attachment.
  ///
  /// The carried [`String`] gives the reason of the failure.
  SurfaceCreationFailed(String),
}

impl FramebufferError {
  /// Class of the error.
  pub fn kind(&self) -> ErrorKind {
    match *self {
      FramebufferError::TextureError(ref e) => e.kind(),
      FramebufferError::SurfaceCreationFailed(_) => ErrorKind::ResourceExhausted,
      FramebufferError::Incomplete(_) => ErrorKind::ResourceExhausted,
      FramebufferError::NoRenderTarget | FramebufferError::UnsupportedAttachment { .. } => {
        ErrorKind::Usage
      }
    }
  }
}

impl fmt::Display for FramebufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      FramebufferError::TextureError(ref e) => write!(f, "framebuffer texture error: {}", e),

      FramebufferError::Incomplete(ref e) => write!(f, "incomplete framebuffer: {}", e),

      FramebufferError::NoRenderTarget => f.write_str("framebuffer does not contain a texture"),

      FramebufferError::UnsupportedAttachment { level } => write!(
        f,
        "cannot attach level {}: only level 0 of 2D textures can be attached",
        level
      ),

      FramebufferError::SurfaceCreationFailed(ref e) => {
        write!(f, "offscreen surface creation failed: {}", e)
      }
    }
  }
}

impl std::error::Error for FramebufferError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      FramebufferError::TextureError(e) => Some(e),
      _ => None,
    }
  }
}

impl From<TextureError> for FramebufferError {
  fn from(e: TextureError) -> Self {
    FramebufferError::TextureError(e)
  }
}

impl From<IncompleteReason> for FramebufferError {
  fn from(e: IncompleteReason) -> Self {
    FramebufferError::Incomplete(e)
  }
}

/// Completeness status reported by the device after attaching a texture.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IncompleteReason {
  /// The default framebuffer is bound but doesn’t exist.
  Undefined,
  /// The attached texture can’t be rendered to.
  IncompleteAttachment,
  /// Nothing is attached.
  MissingAttachment,
  /// The draw buffer has no attachment.
  IncompleteDrawBuffer,
  /// The read buffer has no attachment.
  IncompleteReadBuffer,
  /// The device can’t render to this combination of formats.
  Unsupported,
  /// Attachments disagree on their sample count.
  IncompleteMultisample,
  /// Any status the device reported that isn’t listed above.
  Unknown(u32),
}

impl fmt::Display for IncompleteReason {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      IncompleteReason::Undefined => f.write_str("undefined framebuffer"),
      IncompleteReason::IncompleteAttachment => f.write_str("attachment can’t be rendered to"),
      IncompleteReason::MissingAttachment => f.write_str("no attachment"),
      IncompleteReason::IncompleteDrawBuffer => f.write_str("draw buffer without attachment"),
      IncompleteReason::IncompleteReadBuffer => f.write_str("read buffer without attachment"),
      IncompleteReason::Unsupported => f.write_str("unsupported attachment formats"),
      IncompleteReason::IncompleteMultisample => f.write_str("mismatched sample counts"),
      IncompleteReason::Unknown(status) => write!(f, "unknown status 0x{:x}", status),
    }
  }
}
