#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate cssparser;
#[macro_use]
extern crate log;

mod allocator;
pub mod css;
pub mod cursor;
pub mod dom;
mod error;
pub mod finder;
pub mod label;
pub mod landmark_tree;
pub mod lint;
mod misc;
pub mod options;
pub mod pause;
pub mod role;
pub mod selector;
pub mod session;
pub mod style;
pub mod visibility;

pub use crate::error::{Error, Result};
pub use crate::finder::{LandmarkElementInfo, LandmarkInfo, LandmarksFinder, TreeEntry};
pub use crate::lint::Warnings;
pub use crate::options::ScanOptions;
pub use crate::role::Role;
pub use crate::session::ContentSession;
