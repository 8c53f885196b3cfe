#[macro_use]
mod errors;

mod projection;
mod spans;

pub use errors::{Error, ErrorKind, Result};
pub use projection::{ColumnProjector, Projection, Viewpoint, DEFAULT_NEAR};
pub use spans::{SolidSpans, Span, SENTINEL_EXTENT};
