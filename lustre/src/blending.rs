//! That module exports blending-related types and functions.
//!
//! Given two pixels *src* and *dst* – source and destination, we associate each pixel a blending
//! factor – respectively, *srcK* and *dstK*. *src* is the pixel being computed, and *dst* is the
//! pixel that is already stored in the framebuffer.
//!
//! The pixels can be blended in several ways. See the documentation of [`Equation`] for further
//! details.
//!
//! The factors are encoded with [`Factor`]. The whole blending configuration of a context is
//! described by a [`BlendState`].
//!
//! [`Equation`]: crate::blending::Equation
//! [`Factor`]: crate::blending::Factor
//! [`BlendState`]: crate::blending::BlendState

/// Blending equation. Used to state how blending factors and pixel data should be blended.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Equation {
  /// `Additive` represents the following blending equation:
  ///
  /// > `blended = src * srcK + dst * dstK`
  Additive,
  /// `Subtract` represents the following blending equation:
  ///
  /// > `blended = src * srcK - dst * dstK`
  Subtract,
  /// Because subtracting is not commutative, `ReverseSubtract` represents the following additional
  /// blending equation:
  ///
  /// > `blended = dst * dstK - src * srcK`
  ReverseSubtract,
  /// `Min` represents the following blending equation:
  ///
  /// > `blended = min(src, dst)`
  Min,
  /// `Max` represents the following blending equation:
  ///
  /// > `blended = max(src, dst)`
  Max,
}

/// Blending factors. Pixel data are multiplied by these factors to achieve several effects driven
/// by *blending equations*.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Factor {
  /// `1 * color = factor`
  One,
  /// `0 * color = 0`
  Zero,
  /// `src * color`
  SrcColor,
  /// `(1 - src) * color`
  SrcColorComplement,
  /// `dst * color`
  DestColor,
  /// `(1 - dst) * color`
  DestColorComplement,
  /// `srcA * color`
  SrcAlpha,
  /// `(1 - src) * color`
  SrcAlphaComplement,
  /// `dstA * color`
  DstAlpha,
  /// `(1 - dstA) * color`
  DstAlphaComplement,
  /// `min(srcA, 1 - dstA) * color`
  SrcAlphaSaturate,
  /// `constant * color`, where `constant` is the [`BlendState`] constant color.
  ConstantColor,
  /// `(1 - constant) * color`
  ConstantColorComplement,
  /// `constantA * color`
  ConstantAlpha,
  /// `(1 - constantA) * color`
  ConstantAlphaComplement,
}

/// Blending description.
///
/// A [`BlendState`] is an immutable value: the `set_*` methods return a modified copy. Color and
/// alpha channels can use different equations and factors; backends are free to issue a single
/// combined device call when both are the same.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlendState {
  enabled: bool,
  color_write: [bool; 4],
  equation: Equation,
  equation_alpha: Equation,
  src: Factor,
  dst: Factor,
  src_alpha: Factor,
  dst_alpha: Factor,
  constant_color: [f32; 4],
}

impl BlendState {
  /// Create a [`Default`] [`BlendState`].
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable blending.
  pub fn set_enabled(self, enabled: bool) -> Self {
    Self { enabled, ..self }
  }

  /// Whether blending is enabled.
  pub fn enabled(&self) -> bool {
    self.enabled
  }

  /// Enable or disable writing to the red, green, blue and alpha channels.
  pub fn set_color_write(self, red: bool, green: bool, blue: bool, alpha: bool) -> Self {
    Self {
      color_write: [red, green, blue, alpha],
      ..self
    }
  }

  /// Channel write mask, as `[red, green, blue, alpha]`.
  pub fn color_write(&self) -> [bool; 4] {
    self.color_write
  }

  /// Use the same equation for color and alpha.
  pub fn set_equation(self, equation: Equation) -> Self {
    Self {
      equation,
      equation_alpha: equation,
      ..self
    }
  }

  /// Use different equations for color and alpha.
  pub fn set_equation_separate(self, color: Equation, alpha: Equation) -> Self {
    Self {
      equation: color,
      equation_alpha: alpha,
      ..self
    }
  }

  /// Color equation.
  pub fn equation(&self) -> Equation {
    self.equation
  }

  /// Alpha equation.
  pub fn equation_alpha(&self) -> Equation {
    self.equation_alpha
  }

  /// Use the same source and destination factors for color and alpha.
  pub fn set_factors(self, src: Factor, dst: Factor) -> Self {
    Self {
      src,
      dst,
      src_alpha: src,
      dst_alpha: dst,
      ..self
    }
  }

  /// Use different factors for color and alpha.
  pub fn set_factors_separate(
    self,
    src: Factor,
    dst: Factor,
    src_alpha: Factor,
    dst_alpha: Factor,
  ) -> Self {
    Self {
      src,
      dst,
      src_alpha,
      dst_alpha,
      ..self
    }
  }

  /// Color factors, as `(src, dst)`.
  pub fn factors(&self) -> (Factor, Factor) {
    (self.src, self.dst)
  }

  /// Alpha factors, as `(src, dst)`.
  pub fn factors_alpha(&self) -> (Factor, Factor) {
    (self.src_alpha, self.dst_alpha)
  }

  /// Set the constant color used by the `Constant*` factors.
  pub fn set_constant_color(self, constant_color: [f32; 4]) -> Self {
    Self {
      constant_color,
      ..self
    }
  }

  /// Constant color used by the `Constant*` factors.
  pub fn constant_color(&self) -> [f32; 4] {
    self.constant_color
  }
}

impl Default for BlendState {
  /// Defaults:
  ///
  /// - `enabled`: `false`
  /// - `color_write`: all channels
  /// - equations: [`Equation::Additive`]
  /// - factors: [`Factor::One`] for source, [`Factor::Zero`] for destination
  /// - `constant_color`: transparent black
  fn default() -> Self {
    BlendState {
      enabled: false,
      color_write: [true; 4],
      equation: Equation::Additive,
      equation_alpha: Equation::Additive,
      src: Factor::One,
      dst: Factor::Zero,
      src_alpha: Factor::One,
      dst_alpha: Factor::Zero,
      constant_color: [0., 0., 0., 0.],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builders_return_new_values() {
    let base = BlendState::new();
    let alpha = base
      .set_enabled(true)
      .set_factors(Factor::SrcAlpha, Factor::SrcAlphaComplement);

    assert!(!base.enabled());
    assert!(alpha.enabled());
    assert_eq!(alpha.factors(), alpha.factors_alpha());
    assert_ne!(base, alpha);
  }

  #[test]
  fn separate_setters_keep_channels_apart() {
    let state = BlendState::new()
      .set_equation_separate(Equation::Additive, Equation::Max)
      .set_factors_separate(Factor::One, Factor::One, Factor::Zero, Factor::One);

    assert_eq!(state.equation(), Equation::Additive);
    assert_eq!(state.equation_alpha(), Equation::Max);
    assert_eq!(state.factors(), (Factor::One, Factor::One));
    assert_eq!(state.factors_alpha(), (Factor::Zero, Factor::One));
  }
}
