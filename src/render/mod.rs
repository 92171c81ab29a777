pub mod markup;
pub mod styled;

pub use markup::render;
