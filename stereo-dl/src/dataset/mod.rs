//! Dataset indexing and loading toolkit.

mod decode;
mod error;
mod index;
mod loader;
mod record;
mod streaming;
mod taxonomy;
mod template;

pub use decode::*;
pub use error::*;
pub use index::*;
pub use loader::*;
pub use record::*;
pub use streaming::*;
pub use taxonomy::*;
pub use template::*;
