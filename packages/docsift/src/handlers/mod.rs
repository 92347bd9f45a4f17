//! Content handlers and their composition.
//!
//! - [`BodyTextHandler`]: bounded body text
//! - [`LinkHandler`]: hyperlinks in document order
//! - [`TeeHandler`]: fans one event stream out to several handlers
//! - [`BoundedEchoHandler`]: echoes a capped prefix of the markup
//! - [`EventRecorder`]: records raw events for inspection

mod body;
mod echo;
mod link;
mod recorder;
mod tee;

pub use body::*;
pub use echo::*;
pub use link::*;
pub use recorder::*;
pub use tee::*;
