//! Legacy OpenGL backends.
//!
//! This crate exports a fixed-function [OpenGL](https://www.khronos.org/opengl/) backend for
//! [lustre](https://crates.io/crates/lustre), targeting devices that only expose OpenGL 1.3 or a
//! bit more. The backend doesn’t load OpenGL itself: the platform integration creates the device,
//! its window and offscreen surfaces, and hands the backend a [`NativeGl`] table to talk to them.
//!
//! ```ignore
//! use lustre::context::GraphicsContext;
//! use lustre_gl1::{Gl1, Gl1Opt};
//!
//! let mut ctx = Gl1::new(my_native_table, Gl1Opt::default())?;
//! let texture = ctx.create_texture(Dim::Dim2, [300, 200, 1], TextureFormat::RGBA8, Sampler::default())?;
//!
//! ctx.attach_color(texture, 0)?;
//! ctx.clear_color([0., 0., 0., 1.]);
//! ctx.draw_arrays(Mode::TriangleFan, 0, 4, &arrays)?;
//! ctx.detach_all()?;
//! ```
//!
//! [`NativeGl`]: crate::gl1::NativeGl

pub mod gl1;

pub use gl1::{Capabilities, ContextError, Gl1, Gl1Opt, NativeGl, TextureId};
