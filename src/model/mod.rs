//! Authoring data: the road path and the reusable cross-section it sweeps.

mod color;
mod cross_section;
mod path;

pub use color::Rgba;
pub use cross_section::{CrossSection, Module, Pattern, PatternKind, TextureResolution};
pub use path::{Anchor, Path, TangentHandle};
