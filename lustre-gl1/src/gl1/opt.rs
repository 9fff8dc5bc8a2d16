//! Context options.

/// Different context options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Gl1Opt {
  emulate_render_to_texture: bool,
  emulate_npot: bool,
  max_texture_units: Option<usize>,
}

impl Default for Gl1Opt {
  /// Defaults:
  ///
  /// - `emulate_render_to_texture` set to `false`.
  /// - `emulate_npot` set to `false`.
  /// - `max_texture_units` set to `None`.
  fn default() -> Self {
    Gl1Opt {
      emulate_render_to_texture: false,
      emulate_npot: false,
      max_texture_units: None,
    }
  }
}

impl Gl1Opt {
  /// Always render to textures through offscreen surfaces, even if the device supports
  /// framebuffer objects. Default to `false`.
  #[inline]
  pub fn set_emulate_render_to_texture(self, emulate: bool) -> Self {
    Gl1Opt {
      emulate_render_to_texture: emulate,
      ..self
    }
  }

  /// Whether render-to-texture is always emulated.
  #[inline]
  pub fn emulate_render_to_texture(&self) -> bool {
    self.emulate_render_to_texture
  }

  /// Always round texture storage up to powers of two, even if the device supports
  /// non-power-of-two textures. Default to `false`.
  #[inline]
  pub fn set_emulate_npot(self, emulate: bool) -> Self {
    Gl1Opt {
      emulate_npot: emulate,
      ..self
    }
  }

  /// Whether non-power-of-two textures are always emulated.
  #[inline]
  pub fn emulate_npot(&self) -> bool {
    self.emulate_npot
  }

  /// Cap the number of texture units the context uses.
  ///
  /// Pass `None` to use as many as the device supports.
  #[inline]
  pub fn set_max_texture_units<U>(self, units: U) -> Self
  where
    U: Into<Option<usize>>,
  {
    Gl1Opt {
      max_texture_units: units.into(),
      ..self
    }
  }

  /// Cap on the number of texture units, if any.
  #[inline]
  pub fn max_texture_units(&self) -> Option<usize> {
    self.max_texture_units
  }
}
