#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod layout;
pub mod line;
pub mod lookup;
pub mod packer;
pub mod resolver;
pub mod search;
pub mod source;

pub use error::{LookupError, PackError, PackResult};
pub use layout::LibraryLayout;
pub use packer::{PackReport, Packer};
pub use resolver::{ResolveContext, ResolvedDocument, Resolver};
