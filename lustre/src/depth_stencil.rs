//! Per-fragment depth and stencil tests of the fixed-function pipeline.
//!
//! A [`DepthStencilState`] is sent to the device as a whole; the enables, the comparison
//! functions and the stencil operations are all part of it.

/// Function comparing an incoming value against the stored one.
///
/// For the depth test, the incoming value is the fragment depth and the stored one the depth
/// buffer. For the stencil test, the incoming value is the masked reference and the stored one the
/// masked stencil buffer.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Comparison {
  /// Every fragment is discarded (`GL_NEVER`).
  Never,
  /// Every fragment passes (`GL_ALWAYS`).
  Always,
  /// Passes on `incoming == stored`.
  Equal,
  /// Passes on `incoming != stored`.
  NotEqual,
  /// Passes on `incoming < stored`.
  Less,
  /// Passes on `incoming <= stored`.
  LessOrEqual,
  /// Passes on `incoming > stored`.
  Greater,
  /// Passes on `incoming >= stored`.
  GreaterOrEqual,
}

/// Arguments of `glStencilFunc`: the function, its reference value and the mask applied to both
/// sides before comparing.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct StencilTest {
  /// Function the fragment must satisfy.
  pub comparison: Comparison,

  /// Value compared against the stencil buffer.
  pub reference: u8,

  /// Bits of the reference and of the buffer taking part in the comparison.
  pub mask: u8,
}

impl StencilTest {
  /// A test from its `glStencilFunc` arguments.
  pub fn new(comparison: Comparison, reference: u8, mask: u8) -> Self {
    Self {
      comparison,
      reference,
      mask,
    }
  }
}

/// Matches the device defaults: [`Comparison::Always`], reference `0`, every bit compared.
impl Default for StencilTest {
  fn default() -> Self {
    StencilTest::new(Comparison::Always, 0, 0xFF)
  }
}

/// Arguments of `glStencilOp`: what happens to the stored stencil value for each outcome of the
/// stencil and depth tests.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct StencilOperations {
  /// Stencil test failed (`sfail`); the depth test isn’t run.
  pub depth_passes_stencil_fails: StencilOp,

  /// Stencil test passed, depth test failed (`dpfail`).
  pub depth_fails_stencil_passes: StencilOp,

  /// Fragment passed both tests (`dppass`).
  pub depth_stencil_pass: StencilOp,
}

impl StencilOperations {
  /// Keep the stored value whatever happens.
  pub fn new() -> Self {
    Self::default()
  }

  /// Operation run on stencil failures.
  pub fn on_depth_passes_stencil_fails(self, op: StencilOp) -> Self {
    Self {
      depth_passes_stencil_fails: op,
      ..self
    }
  }

  /// Operation run when only the depth test fails.
  pub fn on_depth_fails_stencil_passes(self, op: StencilOp) -> Self {
    Self {
      depth_fails_stencil_passes: op,
      ..self
    }
  }

  /// Operation run when the fragment is kept.
  pub fn on_depth_stencil_pass(self, op: StencilOp) -> Self {
    Self {
      depth_stencil_pass: op,
      ..self
    }
  }
}

/// [`StencilOp::Keep`] for every outcome, as on a fresh device.
impl Default for StencilOperations {
  fn default() -> Self {
    Self {
      depth_passes_stencil_fails: StencilOp::Keep,
      depth_fails_stencil_passes: StencilOp::Keep,
      depth_stencil_pass: StencilOp::Keep,
    }
  }
}

/// Update of a stored stencil value, mapped to the `GL_KEEP`, `GL_ZERO`… family.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum StencilOp {
  /// Leave the buffer alone.
  Keep,

  /// Write `0`.
  Zero,

  /// Write the reference value of the [`StencilTest`].
  Replace,

  /// Add one, saturating at the largest value.
  Increment,

  /// Add one, going back to `0` after the largest value.
  ///
  /// Needs OpenGL 1.4 or `GL_EXT_stencil_wrap`.
  IncrementWrap,

  /// Subtract one, saturating at `0`.
  Decrement,

  /// Subtract one, going to the largest value after `0`.
  ///
  /// Needs OpenGL 1.4 or `GL_EXT_stencil_wrap`.
  DecrementWrap,

  /// Flip every bit.
  Invert,
}

/// Stencil configuration of one face (front or back).
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct StencilFace {
  /// Test to perform.
  pub test: StencilTest,

  /// Operations to run depending on the test outcomes.
  pub operations: StencilOperations,

  /// Bits of the stencil buffer that can be written.
  pub write_mask: u8,
}

impl StencilFace {
  /// Create a new [`StencilFace`].
  pub fn new(test: StencilTest, operations: StencilOperations, write_mask: u8) -> Self {
    Self {
      test,
      operations,
      write_mask,
    }
  }
}

/// Depth and stencil description.
///
/// Front-facing and back-facing primitives have their own stencil configuration.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct DepthStencilState {
  depth_test: bool,
  depth_write: bool,
  depth_comparison: Comparison,
  stencil_test: bool,
  stencil_front: StencilFace,
  stencil_back: StencilFace,
}

impl DepthStencilState {
  /// Create a [`Default`] [`DepthStencilState`].
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable the depth test.
  pub fn set_depth_test(self, depth_test: bool) -> Self {
    Self { depth_test, ..self }
  }

  /// Whether the depth test is enabled.
  pub fn depth_test(&self) -> bool {
    self.depth_test
  }

  /// Enable or disable depth writes.
  pub fn set_depth_write(self, depth_write: bool) -> Self {
    Self {
      depth_write,
      ..self
    }
  }

  /// Whether depth writes are enabled.
  pub fn depth_write(&self) -> bool {
    self.depth_write
  }

  /// Comparison used by the depth test.
  pub fn set_depth_comparison(self, depth_comparison: Comparison) -> Self {
    Self {
      depth_comparison,
      ..self
    }
  }

  /// Comparison used by the depth test.
  pub fn depth_comparison(&self) -> Comparison {
    self.depth_comparison
  }

  /// Enable or disable the stencil test.
  pub fn set_stencil_test(self, stencil_test: bool) -> Self {
    Self {
      stencil_test,
      ..self
    }
  }

  /// Whether the stencil test is enabled.
  pub fn stencil_test(&self) -> bool {
    self.stencil_test
  }

  /// Use the same stencil configuration for both faces.
  pub fn set_stencil(self, face: StencilFace) -> Self {
    Self {
      stencil_front: face,
      stencil_back: face,
      ..self
    }
  }

  /// Use different stencil configurations for front and back faces.
  pub fn set_stencil_separate(self, front: StencilFace, back: StencilFace) -> Self {
    Self {
      stencil_front: front,
      stencil_back: back,
      ..self
    }
  }

  /// Stencil configuration of front faces.
  pub fn stencil_front(&self) -> StencilFace {
    self.stencil_front
  }

  /// Stencil configuration of back faces.
  pub fn stencil_back(&self) -> StencilFace {
    self.stencil_back
  }
}

/// Default implementation for [`StencilFace`]: [`StencilTest::default`],
/// [`StencilOperations::default`] and a full write mask.
impl Default for StencilFace {
  fn default() -> Self {
    StencilFace::new(StencilTest::default(), StencilOperations::default(), 0xFF)
  }
}

impl Default for DepthStencilState {
  /// Defaults:
  ///
  /// - depth test disabled, depth writes enabled, [`Comparison::Less`].
  /// - stencil test disabled; both faces always pass and keep values, full write mask.
  fn default() -> Self {
    let face = StencilFace::default();

    DepthStencilState {
      depth_test: false,
      depth_write: true,
      depth_comparison: Comparison::Less,
      stencil_test: false,
      stencil_front: face,
      stencil_back: face,
    }
  }
}
