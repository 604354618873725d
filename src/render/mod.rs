//! Poster rendering: fonts, text layout, pixel helpers and the compositor.

pub mod canvas;
pub mod compositor;
pub mod font;
pub mod layout;
pub mod logo;

pub use canvas::{cover, fit_to_dimensions};
pub use compositor::{encode, Composition, Compositor, PosterContent};
pub use font::{FontFace, FontLibrary};
pub use logo::{load_logo, placeholder_logo};
