//! Primitive modes.
//!
//! The [`Mode`] of a draw call tells the device how to connect consecutive vertices.

/// Primitive mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
  /// Every vertex is a point on its own.
  Point,
  /// Vertices are taken two by two, each pair being a segment.
  Line,
  /// Each vertex after the first one adds a segment from the previous vertex.
  LineStrip,
  /// Like [`Mode::LineStrip`], with an extra segment from the last vertex back to the first one.
  LineLoop,
  /// Vertices are taken three by three, each triple being a triangle.
  Triangle,
  /// Triangles sharing the first vertex.
  ///
  /// Each vertex after the second one forms a triangle with the first vertex and the previous
  /// one. Full-surface quads are drawn this way.
  TriangleFan,
  /// Triangles sharing an edge with the previous one.
  ///
  /// Each vertex after the second one forms a triangle with the two vertices before it.
  TriangleStrip,
}
