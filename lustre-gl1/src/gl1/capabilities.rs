//! Device capabilities.
//!
//! Capabilities are queried once, when the context is created, and never change afterwards. The
//! rest of the backend branches on plain flags instead of probing the device again.

use gl::types::*;
use log::{debug, info};
use std::error;
use std::fmt;

use crate::gl1::native::{EntryPoint, NativeGl, MAX_TEXTURE_COORDS, MAX_TEXTURE_UNITS};
use crate::gl1::opt::Gl1Opt;
use lustre::texture::MAX_TEXTURE_SIZE;

/// Oldest supported version, as `(major, minor)`.
pub const MIN_VERSION: (u32, u32) = (1, 3);

/// Upper bound on texture units, whatever the device reports.
pub const MAX_TEXTURE_UNIT_COUNT: usize = 255;

/// What the device can do.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capabilities {
  /// Device version, as `(major, minor)`.
  pub version: (u32, u32),
  /// Native framebuffer objects are available and used for render-to-texture.
  pub render_to_texture: bool,
  /// Native instanced draws are available.
  ///
  /// Only reported for callers: draws through a [`Gl1`](crate::Gl1) are never instanced, so
  /// callers wanting instancing must repeat their draws when this is `false`.
  pub instancing: bool,
  /// `glBlendEquation` is available.
  pub blend_equation: bool,
  /// `glBlendEquationSeparate` is available.
  pub blend_equation_separate: bool,
  /// `glBlendFuncSeparate` is available.
  pub blend_func_separate: bool,
  /// `glBlendColor` is available.
  pub blend_color: bool,
  /// Separate front / back stencil entry points are available.
  pub stencil_separate: bool,
  /// `glActiveTexture` is available.
  pub multitexture: bool,
  /// `glClientActiveTexture` is available.
  pub client_multitexture: bool,
  /// 3D textures are available.
  pub texture_3d: bool,
  /// Texture storage can have non-power-of-two dimensions.
  pub npot_textures: bool,
  /// Number of usable texture units, in `1..=255`.
  pub max_texture_units: usize,
  /// Largest texture size, per axis.
  pub max_texture_size: u32,
}

impl Capabilities {
  /// Query the device.
  ///
  /// # Unsafety
  ///
  /// The device must be current.
  pub(crate) unsafe fn query<N>(gl: &mut N, opt: &Gl1Opt) -> Result<Self, ContextError>
  where
    N: NativeGl,
  {
    let version_string = gl.get_string(gl::VERSION).unwrap_or_default();
    let version = parse_version(&version_string)
      .ok_or_else(|| ContextError::UnknownVersion(version_string.clone()))?;

    if version < MIN_VERSION {
      return Err(ContextError::UnsupportedVersion {
        major: version.0,
        minor: version.1,
      });
    }

    let render_to_texture =
      gl.has_entry_point(EntryPoint::FramebufferObject) && !opt.emulate_render_to_texture();

    let npot_textures = (version >= (2, 0)
      || gl.has_extension("GL_ARB_texture_non_power_of_two"))
      && !opt.emulate_npot();

    let mut max_texture_units = query_texture_units(gl);
    if let Some(cap) = opt.max_texture_units() {
      max_texture_units = max_texture_units.min(cap.max(1));
    }

    let max_texture_size = gl
      .get_integer(gl::MAX_TEXTURE_SIZE)
      .ok()
      .filter(|&size| size > 0)
      .map_or(MAX_TEXTURE_SIZE, |size| (size as u32).min(MAX_TEXTURE_SIZE));

    let caps = Capabilities {
      version,
      render_to_texture,
      instancing: gl.has_entry_point(EntryPoint::DrawArraysInstanced),
      blend_equation: gl.has_entry_point(EntryPoint::BlendEquation),
      blend_equation_separate: gl.has_entry_point(EntryPoint::BlendEquationSeparate),
      blend_func_separate: gl.has_entry_point(EntryPoint::BlendFuncSeparate),
      blend_color: gl.has_entry_point(EntryPoint::BlendColor),
      stencil_separate: gl.has_entry_point(EntryPoint::StencilSeparate),
      multitexture: gl.has_entry_point(EntryPoint::ActiveTexture),
      client_multitexture: gl.has_entry_point(EntryPoint::ClientActiveTexture),
      texture_3d: gl.has_entry_point(EntryPoint::TexImage3D),
      npot_textures,
      max_texture_units,
      max_texture_size,
    };

    info!(
      "OpenGL {}.{}: render-to-texture {}, npot textures {}, {} texture units, max texture size {}",
      version.0,
      version.1,
      if caps.render_to_texture { "native" } else { "emulated" },
      if caps.npot_textures { "native" } else { "emulated" },
      caps.max_texture_units,
      caps.max_texture_size
    );

    Ok(caps)
  }
}

// Texture coordinate sets are what matters for multitexturing through client arrays; old drivers
// don’t know about them and only report texture units.
unsafe fn query_texture_units<N>(gl: &mut N) -> usize
where
  N: NativeGl,
{
  let units = match gl.get_integer(MAX_TEXTURE_COORDS) {
    Ok(units) => units,
    Err(code) => {
      debug!(
        "MAX_TEXTURE_COORDS unavailable (0x{:x}), falling back to MAX_TEXTURE_UNITS",
        code
      );
      gl.get_integer(MAX_TEXTURE_UNITS).unwrap_or(1)
    }
  };

  (units.max(1) as usize).min(MAX_TEXTURE_UNIT_COUNT)
}

/// Parse the `major.minor` prefix of a `GL_VERSION` string.
pub(crate) fn parse_version(version: &str) -> Option<(u32, u32)> {
  let numbers = version.split_whitespace().next()?;
  let mut parts = numbers.split('.');
  let major = parts.next()?.parse().ok()?;
  let minor = parts
    .next()?
    .chars()
    .take_while(char::is_ascii_digit)
    .collect::<String>()
    .parse()
    .ok()?;

  Some((major, minor))
}

/// Errors that might happen when creating a context.
#[non_exhaustive]
#[derive(Debug)]
pub enum ContextError {
  /// The device version is too old.
  UnsupportedVersion {
    /// Major version.
    major: u32,
    /// Minor version.
    minor: u32,
  },
  /// The device version string couldn’t be understood.
  UnknownVersion(String),
}

impl fmt::Display for ContextError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ContextError::UnsupportedVersion { major, minor } => write!(
        f,
        "unsupported OpenGL version {}.{} (at least {}.{} is required)",
        major, minor, MIN_VERSION.0, MIN_VERSION.1
      ),

      ContextError::UnknownVersion(ref version) => {
        write!(f, "cannot parse OpenGL version: {:?}", version)
      }
    }
  }
}

impl error::Error for ContextError {}
