//! KFC2 archive container parser for Enshrouded.
//!
//! The `.kfc` archive holds every serialized game object of an Enshrouded
//! install: a header, fifteen fixed-purpose metadata sections, and a single
//! resource payload region. This crate materializes the metadata tables and
//! locates each resource's payload bytes; decoding those bytes is the job of
//! `veles-reflection`.
//!
//! # Quick Start
//!
//! ```no_run
//! use veles_kfc::KfcFile;
//!
//! let file = KfcFile::open("enshrouded.kfc")?;
//! let archive = file.archive();
//!
//! println!("SVN revision: {}", archive.svn_version().version);
//! println!("Resources: {}", archive.resource_count());
//!
//! for (i, info) in archive.resource_infos().iter().enumerate() {
//!     let bytes = file.resource_bytes(i)?;
//!     println!("{} ({} bytes)", info.guid, bytes.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Format notes
//!
//! Every section header is a (relative offset, count) pair, and the relative
//! offset resolves against the file position of the offset field itself -
//! not against the position after the pair has been consumed. The same
//! convention recurs inside serialized resources (see `veles-reflection`).
//!
//! Archives using the reserved sections 2/3, more than one resource bundle,
//! or non-zero reserved resource-identity fields are rejected outright
//! rather than parsed best-effort.

mod archive;
mod error;
mod svn;

pub mod sections;

pub use archive::{KfcArchive, KfcFile, KFC2_MAGIC};
pub use error::{Error, Result};
pub use svn::SvnVersion;
