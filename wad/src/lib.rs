#[macro_use]
mod errors;

mod archive;
mod level;
mod name;

pub mod tree;
pub mod types;
pub mod util;

#[cfg(test)]
mod fixture;

pub use archive::{encode_record, Archive, LumpReader};
pub use errors::{Error, ErrorKind, Result};
pub use level::{Bounds, Level};
pub use name::{IntoWadName, WadName};
pub use tree::{BspNode, BspTree, Child, Partition, Side};
pub use types::Marker;
