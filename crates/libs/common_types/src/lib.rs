#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod labels;
mod narrative;
mod observer;
mod outfit;
mod photo;

pub use labels::*;
pub use narrative::*;
pub use observer::*;
pub use outfit::*;
pub use photo::*;
