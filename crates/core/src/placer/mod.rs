//! Copies resolved audio files into the organized tree.
//!
//! Sources are never moved or removed. A destination that already exists is
//! refused with [`PlacerError::DestinationExists`].
//!
//! # Example
//!
//! ```ignore
//! use audioshelf_core::placer::{FilePlacement, FsPlacer, Placer};
//!
//! let placer = FsPlacer::with_defaults();
//! let placed = placer
//!     .place(FilePlacement::new("/in/book.mp3", "/out/A/B/audiotrack/book.mp3"))
//!     .await?;
//! println!("Copied {} bytes", placed.size_bytes);
//! ```

mod error;
mod fs_placer;
mod traits;
mod types;

pub use error::PlacerError;
pub use fs_placer::FsPlacer;
pub use traits::Placer;
pub use types::{FilePlacement, PlacedFile};
