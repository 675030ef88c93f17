//! Rich text
//!
//! A small component model in the spirit of Adventure: a tree of styled text
//! nodes where children inherit their parent's style. Message templates are
//! written in a tag markup (see [`markup`]) and parsed into components.

mod color;
mod component;
pub mod markup;

pub use color::NamedColor;
pub use component::{Component, Style};
