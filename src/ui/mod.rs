//! Terminal presentation: colors, spinner, themed prompts

pub mod form;
pub mod style;
pub mod theme;

pub use form::{FormOption, PaletteForm};
pub use style::{colors, symbols};
