//! Rasterizer state.
//!
//! The rasterizer turns primitives into fragments. Its configuration covers face culling (which
//! side of a triangle is discarded), how polygons are filled, antialiasing, polygon offsetting and
//! whether the scissor test is active.

/// Face culling order.
///
/// The order determines how a triangle is determined to be discarded. If the triangle’s vertices
/// wind up in the same direction as the `FrontFace`, it’s assigned the front side, otherwise, it’s
/// the back side.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum FrontFace {
  /// Clockwise order.
  CW,
  /// Counter-clockwise order.
  CCW,
}

/// Side to cull.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum CullMode {
  /// Cull the front side only.
  Front,
  /// Cull the back side only.
  Back,
  /// Always cull any triangle.
  Both,
}

/// How polygons are rasterized.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum FillMode {
  /// Only the vertices are drawn.
  Point,
  /// Only the edges are drawn.
  Line,
  /// The interior is filled.
  Fill,
}

/// Rasterizer description.
///
/// As every state description, a [`RasterizerState`] is immutable; use the `set_*` methods to
/// build modified copies.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RasterizerState {
  culled: bool,
  cull_mode: CullMode,
  fill_mode: FillMode,
  front_face: FrontFace,
  line_antialiased: bool,
  polygon_antialiased: bool,
  scissor: bool,
  offset_point: bool,
  offset_line: bool,
  offset_fill: bool,
  offset_factor: f32,
  offset_units: f32,
  point_size: f32,
  line_width: f32,
}

impl RasterizerState {
  /// Create a [`Default`] [`RasterizerState`].
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable face culling.
  pub fn set_culled(self, culled: bool) -> Self {
    Self { culled, ..self }
  }

  /// Whether face culling is enabled.
  pub fn culled(&self) -> bool {
    self.culled
  }

  /// Side culled when face culling is enabled.
  pub fn set_cull_mode(self, cull_mode: CullMode) -> Self {
    Self { cull_mode, ..self }
  }

  /// Side culled when face culling is enabled.
  pub fn cull_mode(&self) -> CullMode {
    self.cull_mode
  }

  /// Polygon fill mode, for both sides.
  pub fn set_fill_mode(self, fill_mode: FillMode) -> Self {
    Self { fill_mode, ..self }
  }

  /// Polygon fill mode.
  pub fn fill_mode(&self) -> FillMode {
    self.fill_mode
  }

  /// Winding of front-facing triangles.
  pub fn set_front_face(self, front_face: FrontFace) -> Self {
    Self { front_face, ..self }
  }

  /// Winding of front-facing triangles.
  pub fn front_face(&self) -> FrontFace {
    self.front_face
  }

  /// Enable or disable line antialiasing.
  pub fn set_line_antialiased(self, line_antialiased: bool) -> Self {
    Self {
      line_antialiased,
      ..self
    }
  }

  /// Whether lines are antialiased.
  pub fn line_antialiased(&self) -> bool {
    self.line_antialiased
  }

  /// Enable or disable polygon antialiasing.
  pub fn set_polygon_antialiased(self, polygon_antialiased: bool) -> Self {
    Self {
      polygon_antialiased,
      ..self
    }
  }

  /// Whether polygons are antialiased.
  pub fn polygon_antialiased(&self) -> bool {
    self.polygon_antialiased
  }

  /// Enable or disable the scissor test.
  ///
  /// The scissor rectangle itself is not part of the description; it’s set on the context, which
  /// only accepts it while scissoring is enabled.
  pub fn set_scissor(self, scissor: bool) -> Self {
    Self { scissor, ..self }
  }

  /// Whether the scissor test is enabled.
  pub fn scissor(&self) -> bool {
    self.scissor
  }

  /// Enable polygon offsetting for points, lines and filled polygons, respectively.
  pub fn set_offset_enabled(self, point: bool, line: bool, fill: bool) -> Self {
    Self {
      offset_point: point,
      offset_line: line,
      offset_fill: fill,
      ..self
    }
  }

  /// Polygon offsetting state, as `[point, line, fill]`.
  pub fn offset_enabled(&self) -> [bool; 3] {
    [self.offset_point, self.offset_line, self.offset_fill]
  }

  /// Polygon offset factor and units.
  pub fn set_offset(self, factor: f32, units: f32) -> Self {
    Self {
      offset_factor: factor,
      offset_units: units,
      ..self
    }
  }

  /// Polygon offset, as `(factor, units)`.
  pub fn offset(&self) -> (f32, f32) {
    (self.offset_factor, self.offset_units)
  }

  /// Rasterized point diameter, in pixels.
  pub fn set_point_size(self, point_size: f32) -> Self {
    Self { point_size, ..self }
  }

  /// Rasterized point diameter, in pixels.
  pub fn point_size(&self) -> f32 {
    self.point_size
  }

  /// Rasterized line width, in pixels.
  pub fn set_line_width(self, line_width: f32) -> Self {
    Self { line_width, ..self }
  }

  /// Rasterized line width, in pixels.
  pub fn line_width(&self) -> f32 {
    self.line_width
  }
}

impl Default for RasterizerState {
  /// Defaults:
  ///
  /// - no face culling; [`CullMode::Back`] and [`FrontFace::CCW`] when enabled.
  /// - [`FillMode::Fill`].
  /// - no antialiasing, no scissor test, no polygon offset.
  /// - `1.0` point size and line width.
  fn default() -> Self {
    RasterizerState {
      culled: false,
      cull_mode: CullMode::Back,
      fill_mode: FillMode::Fill,
      front_face: FrontFace::CCW,
      line_antialiased: false,
      polygon_antialiased: false,
      scissor: false,
      offset_point: false,
      offset_line: false,
      offset_fill: false,
      offset_factor: 0.,
      offset_units: 0.,
      point_size: 1.,
      line_width: 1.,
    }
  }
}
