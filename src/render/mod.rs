//! Turning change records into human-readable diff text.

pub mod decode;
pub mod filter;
pub mod fragment;

pub use decode::{EncodingStrategy, decode_text};
pub use filter::ExtensionFilter;
pub use fragment::{Elision, RenderOptions, RenderedFragment, concat_fragments, render_all, render_fragment};
