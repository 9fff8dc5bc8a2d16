//! Texture API.
//!
//! Textures are created with a *logical* size: the size the user asked for. Some hardware can only
//! allocate power-of-two dimensions, in which case the *physical* storage is bigger than the
//! logical image and texture coordinates have to be scaled down by [`TextureSurface::ratio`] to
//! address the logical area only.

use std::fmt;

use crate::error::ErrorKind;

/// Largest size, per axis, a texture can have.
pub const MAX_TEXTURE_SIZE: u32 = 32768;

/// How to wrap texture coordinates while sampling textures?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// If textures coordinates lay outside of *[0;1]*, they will be clamped to either *0* or *1* for
  /// every components.
  ClampToEdge,
  /// Textures coordinates are repeated if they lay outside of *[0;1]*.
  Repeat,
  /// Same as `Repeat` but it will alternatively repeat between *[0;1]* and *[1;0]*.
  MirroredRepeat,
}

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
}

/// A `Sampler` object gives hint on how a texture should be sampled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sampler {
  /// How should we wrap around the *r* sampling coordinate?
  pub wrap_r: Wrap,
  /// How should we wrap around the *s* sampling coordinate?
  pub wrap_s: Wrap,
  /// How should we wrap around the *t* sampling coordinate?
  pub wrap_t: Wrap,
  /// Minification filter.
  pub min_filter: MinFilter,
  /// Magnification filter.
  pub mag_filter: MagFilter,
}

/// Default value is as following:
///
/// - wrapping: [`Wrap::ClampToEdge`] on all axes.
/// - filters: [`MinFilter::Linear`] and [`MagFilter::Linear`].
impl Default for Sampler {
  fn default() -> Self {
    Sampler {
      wrap_r: Wrap::ClampToEdge,
      wrap_s: Wrap::ClampToEdge,
      wrap_t: Wrap::ClampToEdge,
      min_filter: MinFilter::Linear,
      mag_filter: MagFilter::Linear,
    }
  }
}

/// Dimension of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dim {
  /// 1D.
  Dim1,
  /// 2D.
  Dim2,
  /// 3D.
  Dim3,
}

impl Dim {
  /// Number of axes this dimension uses.
  pub fn axes(self) -> usize {
    match self {
      Dim::Dim1 => 1,
      Dim::Dim2 => 2,
      Dim::Dim3 => 3,
    }
  }
}

/// Texel formats.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureFormat {
  /// 8-bit red, green and blue.
  RGB8,
  /// 8-bit red, green, blue and alpha.
  RGBA8,
  /// 8-bit blue, green and red.
  BGR8,
  /// 8-bit blue, green, red and alpha.
  BGRA8,
  /// 4-bit red, green, blue and alpha, packed in 16 bits.
  RGBA4,
  /// 5-bit red, green and blue plus 1-bit alpha, packed in 16 bits.
  RGB5A1,
}

impl TextureFormat {
  /// Size of a single texel, in bytes.
  pub fn bytes_per_texel(self) -> usize {
    match self {
      TextureFormat::RGB8 | TextureFormat::BGR8 => 3,
      TextureFormat::RGBA8 | TextureFormat::BGRA8 => 4,
      TextureFormat::RGBA4 | TextureFormat::RGB5A1 => 2,
    }
  }
}

/// Smallest power of two greater than or equal to `value`.
///
/// The result is capped at [`MAX_TEXTURE_SIZE`]; `0` rounds to `1`.
pub fn next_power_of_two(value: u32) -> u32 {
  let mut pot = 1;

  while pot < value && pot < MAX_TEXTURE_SIZE {
    pot *= 2;
  }

  pot
}

/// Logical and physical size of a texture.
///
/// A surface is immutable: resizing a texture means building a new surface. Unused axes (height of
/// a 1D texture, depth of 1D and 2D textures) are always `1` with a `1.0` ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureSurface {
  dim: Dim,
  size: [u32; 3],
  physical: [u32; 3],
  ratio: [f32; 3],
}

impl TextureSurface {
  /// Surface of a texture whose physical storage is rounded up to powers of two.
  pub fn power_of_two(dim: Dim, size: [u32; 3]) -> Result<Self, TextureError> {
    let size = Self::validate(dim, size)?;
    let physical = [
      next_power_of_two(size[0]),
      next_power_of_two(size[1]),
      next_power_of_two(size[2]),
    ];

    Ok(Self::from_sizes(dim, size, physical))
  }

  /// Surface of a texture whose physical storage has the exact logical size.
  pub fn exact(dim: Dim, size: [u32; 3]) -> Result<Self, TextureError> {
    let size = Self::validate(dim, size)?;
    Ok(Self::from_sizes(dim, size, size))
  }

  fn validate(dim: Dim, size: [u32; 3]) -> Result<[u32; 3], TextureError> {
    let axes = dim.axes();
    let mut normalized = [1; 3];

    for (axis, &len) in size.iter().enumerate().take(axes) {
      if len == 0 || len > MAX_TEXTURE_SIZE {
        return Err(TextureError::InvalidSize(size));
      }

      normalized[axis] = len;
    }

    Ok(normalized)
  }

  fn from_sizes(dim: Dim, size: [u32; 3], physical: [u32; 3]) -> Self {
    let ratio = [
      size[0] as f32 / physical[0] as f32,
      size[1] as f32 / physical[1] as f32,
      size[2] as f32 / physical[2] as f32,
    ];

    TextureSurface {
      dim,
      size,
      physical,
      ratio,
    }
  }

  /// Dimension of the texture.
  pub fn dim(&self) -> Dim {
    self.dim
  }

  /// Logical size, as `[width, height, depth]`.
  pub fn size(&self) -> [u32; 3] {
    self.size
  }

  /// Physical size, as `[width, height, depth]`.
  pub fn physical_size(&self) -> [u32; 3] {
    self.physical
  }

  /// Logical / physical ratio, as `[width, height, depth]`.
  pub fn ratio(&self) -> [f32; 3] {
    self.ratio
  }

  /// Whether the logical size fills the whole physical storage.
  pub fn is_exact(&self) -> bool {
    self.size == self.physical
  }

  /// Number of texels in the logical area.
  pub fn texel_count(&self) -> usize {
    self.size.iter().map(|&len| len as usize).product()
  }
}

/// Errors that might happen when working with textures.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextureError {
  /// A texture’s storage failed to be created.
  ///
  /// The carried [`String`] gives the reason of the failure.
  TextureStorageCreationFailed(String),
  /// A size is either zero or too big on one of the axes used by the texture dimension.
  InvalidSize([u32; 3]),
  /// The texture handle doesn’t refer to a live texture anymore.
  UnknownTexture,
  /// Not enough pixel data provided for the given area asked.
  ///
  /// The first [`usize`] is the number of expected bytes to be uploaded and the second [`usize`] is
  /// the number you provided. You must provide at least as many pixels as expected by the area in
  /// the texture you’re uploading to.
  NotEnoughPixels(usize, usize),
  /// The region (offset and size) doesn’t fit in the logical size of the texture.
  RegionOutOfBounds {
    /// Offset of the region.
    offset: [u32; 2],
    /// Size of the region.
    size: [u32; 2],
    /// Logical size of the texture.
    bounds: [u32; 2],
  },
  /// The operation is only available for 2D textures.
  UnsupportedDim(Dim),
}

impl TextureError {
  /// Class of the error.
  pub fn kind(&self) -> ErrorKind {
    match *self {
      TextureError::TextureStorageCreationFailed(_) => ErrorKind::ResourceExhausted,
      _ => ErrorKind::Usage,
    }
  }
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      TextureError::TextureStorageCreationFailed(ref e) => {
        write!(f, "texture storage creation failed: {}", e)
      }

      TextureError::InvalidSize(size) => write!(
        f,
        "invalid texture size {:?}: every axis must be in 1..={}",
        size, MAX_TEXTURE_SIZE
      ),

      TextureError::UnknownTexture => f.write_str("unknown or destroyed texture"),

      TextureError::NotEnoughPixels(expected, provided) => write!(
        f,
        "not enough texels provided: expected {} bytes, provided {} bytes",
        expected, provided
      ),

      TextureError::RegionOutOfBounds {
        offset,
        size,
        bounds,
      } => write!(
        f,
        "region at {:?} of size {:?} doesn’t fit in a {:?} texture",
        offset, size, bounds
      ),

      TextureError::UnsupportedDim(dim) => write!(f, "unsupported texture dimension: {:?}", dim),
    }
  }
}

impl std::error::Error for TextureError {}
