use gl::types::*;
use log::debug;

use crate::gl1::native::NativeGl;
use crate::gl1::Gl1;
use lustre::draw::DrawError;
use lustre::texture::{
  Dim, MagFilter, MinFilter, Sampler, TextureError, TextureFormat, TextureSurface, Wrap,
};
use lustre::vertex::{AttributeStream, VertexAttribType};

/// Handle to a texture of a [`Gl1`] context.
///
/// Handles are generation-counted: once a texture is destroyed, its handle (and every copy of it)
/// is detected as stale, even if the slot gets reused by a new texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TextureId {
  index: u32,
  generation: u32,
}

pub(crate) struct Texture {
  pub(crate) handle: GLuint, // handle to the GPU texture object
  pub(crate) target: GLenum, // “type” of the texture; used for bindings
  pub(crate) surface: TextureSurface,
  pub(crate) format: TextureFormat,
  // bumped every time the texels change
  pub(crate) revision: u64,
}

impl Texture {
  pub(crate) fn touch(&mut self) -> u64 {
    self.revision += 1;
    self.revision
  }
}

struct Slot {
  generation: u32,
  texture: Option<Texture>,
}

/// Textures of a context.
#[derive(Default)]
pub(crate) struct TextureArena {
  slots: Vec<Slot>,
  free: Vec<u32>,
}

impl TextureArena {
  pub(crate) fn insert(&mut self, texture: Texture) -> TextureId {
    match self.free.pop() {
      Some(index) => {
        let slot = &mut self.slots[index as usize];
        slot.texture = Some(texture);

        TextureId {
          index,
          generation: slot.generation,
        }
      }

      None => {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
          generation: 0,
          texture: Some(texture),
        });

        TextureId {
          index,
          generation: 0,
        }
      }
    }
  }

  pub(crate) fn get(&self, id: TextureId) -> Option<&Texture> {
    self
      .slots
      .get(id.index as usize)
      .filter(|slot| slot.generation == id.generation)
      .and_then(|slot| slot.texture.as_ref())
  }

  pub(crate) fn get_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
    self
      .slots
      .get_mut(id.index as usize)
      .filter(|slot| slot.generation == id.generation)
      .and_then(|slot| slot.texture.as_mut())
  }

  pub(crate) fn is_live(&self, id: TextureId) -> bool {
    self.get(id).is_some()
  }

  pub(crate) fn remove(&mut self, id: TextureId) -> Option<Texture> {
    let slot = self
      .slots
      .get_mut(id.index as usize)
      .filter(|slot| slot.generation == id.generation)?;
    let texture = slot.texture.take()?;

    slot.generation = slot.generation.wrapping_add(1);
    self.free.push(id.index);

    Some(texture)
  }

  /// Remove every texture.
  pub(crate) fn drain(&mut self) -> Vec<Texture> {
    self.free.clear();
    self
      .slots
      .drain(..)
      .filter_map(|slot| slot.texture)
      .collect()
  }
}

pub(crate) fn opengl_target(dim: Dim) -> GLenum {
  match dim {
    Dim::Dim1 => gl::TEXTURE_1D,
    Dim::Dim2 => gl::TEXTURE_2D,
    Dim::Dim3 => gl::TEXTURE_3D,
  }
}

// (internal format, format, type)
pub(crate) fn opengl_format(format: TextureFormat) -> (GLint, GLenum, GLenum) {
  match format {
    TextureFormat::RGB8 => (gl::RGB8 as GLint, gl::RGB, gl::UNSIGNED_BYTE),
    TextureFormat::RGBA8 => (gl::RGBA8 as GLint, gl::RGBA, gl::UNSIGNED_BYTE),
    TextureFormat::BGR8 => (gl::RGB8 as GLint, gl::BGR, gl::UNSIGNED_BYTE),
    TextureFormat::BGRA8 => (gl::RGBA8 as GLint, gl::BGRA, gl::UNSIGNED_BYTE),
    TextureFormat::RGBA4 => (gl::RGBA4 as GLint, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4),
    TextureFormat::RGB5A1 => (gl::RGB5_A1 as GLint, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),
  }
}

fn opengl_wrap(wrap: Wrap) -> GLenum {
  match wrap {
    Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    Wrap::Repeat => gl::REPEAT,
    Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
  }
}

fn opengl_min_filter(filter: MinFilter) -> GLenum {
  match filter {
    MinFilter::Nearest => gl::NEAREST,
    MinFilter::Linear => gl::LINEAR,
  }
}

fn opengl_mag_filter(filter: MagFilter) -> GLenum {
  match filter {
    MagFilter::Nearest => gl::NEAREST,
    MagFilter::Linear => gl::LINEAR,
  }
}

unsafe fn apply_sampler_to_texture<N>(gl: &mut N, target: GLenum, sampler: &Sampler)
where
  N: NativeGl,
{
  gl.tex_parameter(target, gl::TEXTURE_WRAP_S, opengl_wrap(sampler.wrap_s) as GLint);

  if target != gl::TEXTURE_1D {
    gl.tex_parameter(target, gl::TEXTURE_WRAP_T, opengl_wrap(sampler.wrap_t) as GLint);
  }

  if target == gl::TEXTURE_3D {
    gl.tex_parameter(target, gl::TEXTURE_WRAP_R, opengl_wrap(sampler.wrap_r) as GLint);
  }

  gl.tex_parameter(
    target,
    gl::TEXTURE_MIN_FILTER,
    opengl_min_filter(sampler.min_filter) as GLint,
  );
  gl.tex_parameter(
    target,
    gl::TEXTURE_MAG_FILTER,
    opengl_mag_filter(sampler.mag_filter) as GLint,
  );
}

/// Check that a texture coordinate stream can be scaled by [`transform_coordinates`].
pub(crate) fn check_scalable(stream: &AttributeStream) -> Result<(), DrawError> {
  if stream.ty() != VertexAttribType::Float {
    return Err(DrawError::UnsupportedAttributeType {
      stream: "texture coordinate",
      ty: stream.ty(),
    });
  }

  let components = stream.components();
  if components == 0 || components > 3 {
    return Err(DrawError::UnsupportedComponentCount {
      stream: "texture coordinate",
      components,
    });
  }

  Ok(())
}

/// Scale texture coordinates by the logical / physical ratio of a texture.
///
/// Vertices in `[vertex_offset, vertex_offset + num_vertices)` are read from `stream` and written,
/// tightly packed, at the same vertex index in `out`. `out` grows to hold `total_vertices`
/// vertices but never shrinks; entries outside of the range are left untouched.
pub(crate) fn transform_coordinates(
  ratio: [f32; 3],
  stream: &AttributeStream,
  vertex_offset: usize,
  num_vertices: usize,
  total_vertices: usize,
  out: &mut Vec<f32>,
) -> Result<(), DrawError> {
  check_scalable(stream)?;

  let components = stream.components();
  let needed = total_vertices.max(vertex_offset + num_vertices) * components;
  if out.len() < needed {
    out.resize(needed, 0.);
  }

  for vertex in vertex_offset..vertex_offset + num_vertices {
    for (component, &scale) in ratio.iter().enumerate().take(components) {
      let value = stream
        .read_f32(vertex, component)
        .ok_or(DrawError::StreamOverflow {
          stream: "texture coordinate",
          vertex,
        })?;

      out[vertex * components + component] = value * scale;
    }
  }

  Ok(())
}

impl<N> Gl1<N>
where
  N: NativeGl,
{
  pub(crate) fn new_texture(
    &mut self,
    dim: Dim,
    size: [u32; 3],
    format: TextureFormat,
    sampler: &Sampler,
  ) -> Result<TextureId, TextureError> {
    if dim == Dim::Dim3 && !self.caps.texture_3d {
      return Err(TextureError::UnsupportedDim(dim));
    }

    let surface = if self.caps.npot_textures {
      TextureSurface::exact(dim, size)?
    } else {
      TextureSurface::power_of_two(dim, size)?
    };

    if surface
      .physical_size()
      .iter()
      .any(|&len| len > self.caps.max_texture_size)
    {
      return Err(TextureError::InvalidSize(size));
    }

    let target = opengl_target(dim);
    let (internal_format, gl_format, ty) = opengl_format(format);
    let gl = self.device.gl();

    let handle = unsafe { gl.gen_texture() };
    if handle == 0 {
      return Err(TextureError::TextureStorageCreationFailed(
        "the device didn’t hand out a texture name".to_owned(),
      ));
    }

    unsafe {
      gl.bind_texture(target, handle);
      apply_sampler_to_texture(gl, target, sampler);
      gl.pixel_store(gl::UNPACK_ALIGNMENT, 1);

      if surface.is_exact() {
        gl.tex_image(
          target,
          internal_format,
          surface.physical_size(),
          gl_format,
          ty,
          None,
        );
      } else {
        // padding must not contain garbage, it’s sampled at the logical edges
        let physical = surface.physical_size();
        let len = physical.iter().map(|&len| len as usize).product::<usize>()
          * format.bytes_per_texel();
        let zeros = vec![0; len];

        gl.tex_image(
          target,
          internal_format,
          physical,
          gl_format,
          ty,
          Some(&zeros),
        );
      }

      gl.bind_texture(target, 0);
    }

    debug!(
      "created {:?} texture {} of size {:?} (physical {:?})",
      dim,
      handle,
      surface.size(),
      surface.physical_size()
    );

    Ok(self.textures.insert(Texture {
      handle,
      target,
      surface,
      format,
      revision: 0,
    }))
  }

  pub(crate) fn drop_texture(&mut self, id: TextureId) -> Result<(), TextureError> {
    let texture = self.textures.remove(id).ok_or(TextureError::UnknownTexture)?;

    for selected in &mut self.selected {
      if *selected == Some(id) {
        *selected = None;
      }
    }

    self.forget_attachment(id);

    unsafe { self.device.gl().delete_texture(texture.handle) };
    Ok(())
  }

  pub(crate) fn upload_part(
    &mut self,
    id: TextureId,
    offset: [u32; 2],
    size: [u32; 2],
    texels: &[u8],
  ) -> Result<(), TextureError> {
    let texture = self.textures.get(id).ok_or(TextureError::UnknownTexture)?;
    let (target, handle, format, surface) =
      (texture.target, texture.handle, texture.format, texture.surface);

    if surface.dim() == Dim::Dim3 {
      return Err(TextureError::UnsupportedDim(surface.dim()));
    }

    let logical = surface.size();
    let bounds = [logical[0], logical[1]];
    let fits = |axis: usize| offset[axis] as u64 + size[axis] as u64 <= bounds[axis] as u64;
    if !fits(0) || !fits(1) {
      return Err(TextureError::RegionOutOfBounds {
        offset,
        size,
        bounds,
      });
    }

    let bpt = format.bytes_per_texel();
    let row_len = size[0] as usize * bpt;
    let expected = row_len * size[1] as usize;
    if texels.len() < expected {
      return Err(TextureError::NotEnoughPixels(expected, texels.len()));
    }

    if size[0] == 0 || size[1] == 0 {
      return Ok(());
    }

    // pending renders would overwrite these texels when synchronized
    self.flush_attachment(id);

    let (_, gl_format, ty) = opengl_format(format);
    let physical = surface.physical_size();
    let texels = &texels[..expected];
    let gl = self.device.gl();

    unsafe {
      gl.bind_texture(target, handle);
      gl.pixel_store(gl::UNPACK_ALIGNMENT, 1);
      gl.tex_sub_image(
        target,
        [offset[0], offset[1], 0],
        [size[0], size[1], 1],
        gl_format,
        ty,
        texels,
      );

      // replicate the logical edges into the padding so that filtering at the edges doesn’t pick
      // padding texels
      let pad_right = if offset[0] + size[0] == logical[0] {
        physical[0] - logical[0]
      } else {
        0
      };

      if pad_right > 0 {
        let mut column = Vec::with_capacity(pad_right as usize * bpt * size[1] as usize);

        for row in texels.chunks(row_len) {
          let last = &row[row_len - bpt..];
          for _ in 0..pad_right {
            column.extend_from_slice(last);
          }
        }

        gl.tex_sub_image(
          target,
          [logical[0], offset[1], 0],
          [pad_right, size[1], 1],
          gl_format,
          ty,
          &column,
        );
      }

      if offset[1] + size[1] == logical[1] && physical[1] > logical[1] {
        let pad_bottom = physical[1] - logical[1];
        let last_row = &texels[expected - row_len..];
        let mut row = last_row.to_vec();

        for _ in 0..pad_right {
          row.extend_from_slice(&last_row[row_len - bpt..]);
        }

        let rows = row.repeat(pad_bottom as usize);

        gl.tex_sub_image(
          target,
          [offset[0], logical[1], 0],
          [size[0] + pad_right, pad_bottom, 1],
          gl_format,
          ty,
          &rows,
        );
      }

      gl.bind_texture(target, 0);
    }

    if let Some(texture) = self.textures.get_mut(id) {
      texture.touch();
    }

    Ok(())
  }

  pub(crate) fn get_texels(&mut self, id: TextureId) -> Result<Vec<u8>, TextureError> {
    let surface = self
      .textures
      .get(id)
      .ok_or(TextureError::UnknownTexture)?
      .surface;

    if surface.dim() == Dim::Dim3 {
      return Err(TextureError::UnsupportedDim(surface.dim()));
    }

    self.flush_attachment(id);

    let texture = self.textures.get(id).ok_or(TextureError::UnknownTexture)?;
    let (_, gl_format, ty) = opengl_format(texture.format);
    let bpt = texture.format.bytes_per_texel();
    let physical = surface.physical_size();
    let logical = surface.size();
    let mut texels = vec![0; physical[0] as usize * physical[1] as usize * bpt];
    let (target, handle) = (texture.target, texture.handle);
    let gl = self.device.gl();

    unsafe {
      gl.bind_texture(target, handle);
      gl.pixel_store(gl::PACK_ALIGNMENT, 1);
      gl.get_tex_image(target, gl_format, ty, &mut texels);
      gl.bind_texture(target, 0);
    }

    if surface.is_exact() {
      return Ok(texels);
    }

    // crop the padding out
    let physical_row = physical[0] as usize * bpt;
    let logical_row = logical[0] as usize * bpt;

    Ok(
      texels
        .chunks(physical_row)
        .take(logical[1] as usize)
        .flat_map(|row| &row[..logical_row])
        .copied()
        .collect(),
    )
  }
}
