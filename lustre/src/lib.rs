//! # A uniform rendering API over modern and legacy graphics hardware
//!
//! lustre describes rendering with a small set of backend-agnostic types: textures, render
//! targets, primitive state and draw calls. Backends implement [`GraphicsContext`] for a given
//! capability set. A modern programmable device implements it more or less directly; a legacy
//! fixed-function device has to emulate the missing features (render-to-texture, non-power-of-two
//! textures, per-vertex texture selection) on top of whatever the hardware exposes.
//!
//! This crate only contains the vocabulary shared by all backends:
//!
//! - **State descriptions**: [`BlendState`], [`RasterizerState`] and [`DepthStencilState`] are
//!   immutable values. Changing the state means building a new description and handing it to the
//!   context, which decides whether anything has to be sent to the device.
//! - **Textures**: [`TextureSurface`] captures the logical size a user asked for along with the
//!   physical size the hardware really allocated, and the ratio between both.
//! - **Vertex attribute streams**: [`AttributeStream`] is a borrowed, strided view over vertex
//!   data; [`VertexArrays`] groups the streams of a single draw.
//! - **Errors**: every error type exposes an [`ErrorKind`] so that callers can tell a misuse of the
//!   API apart from the device running out of resources.
//!
//! # Feature flags
//!
//! None so far.
//!
//! [`GraphicsContext`]: crate::context::GraphicsContext
//! [`BlendState`]: crate::blending::BlendState
//! [`RasterizerState`]: crate::rasterizer::RasterizerState
//! [`DepthStencilState`]: crate::depth_stencil::DepthStencilState
//! [`TextureSurface`]: crate::texture::TextureSurface
//! [`AttributeStream`]: crate::vertex::AttributeStream
//! [`VertexArrays`]: crate::vertex::VertexArrays
//! [`ErrorKind`]: crate::error::ErrorKind

#![deny(missing_docs)]

pub mod blending;
pub mod context;
pub mod depth_stencil;
pub mod draw;
pub mod error;
pub mod framebuffer;
pub mod rasterizer;
pub mod tess;
pub mod texture;
pub mod vertex;
