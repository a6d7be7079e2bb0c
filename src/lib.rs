//! Combo-Gen: shader combo enumeration core for batch shader compilation
//!
//! A shader configuration declares, per shader, a set of integer-valued
//! defines (axes) and a boolean skip expression. The Cartesian product of
//! the axes is that shader's combo space; combos the skip expression
//! evaluates true for are excluded from compilation. This crate enumerates
//! those spaces: all shaders are laid out on a single linear command axis,
//! and any command index can be turned into a concrete axis assignment and
//! a serialized compiler command.
//!
//! # Key pieces
//!
//! - **Defines & generators**: ordered axis lists with stable slot numbers
//! - **Skip expressions**: recursive-descent parsed, arena-stored,
//!   evaluated as pure integer arithmetic (malformed input skips nothing)
//! - **Mixed-radix cursors**: slot 0 is the least-significant digit;
//!   seeking and stepping are O(axes) arithmetic, never re-enumeration
//! - **Bookmarks**: a sparse map of pre-positioned cursors bounds random
//!   access into combo spaces far too large to walk
//!
//! # Usage
//!
//! ```ignore
//! use combo_gen::Catalog;
//!
//! let catalog = Catalog::load("shaders/config.json")?;
//! let (mut command, end) = (0, catalog.total_commands());
//! let mut cursor = None;
//! let mut buffer = Vec::new();
//! while catalog.next_combo(&mut command, &mut cursor, end) {
//!     let combo = cursor.as_ref().unwrap();
//!     catalog.format_command(combo, &mut buffer);
//!     dispatch(&buffer);
//!     command += 1;
//! }
//! ```
//!
//! The catalog is immutable after load; callers scale by partitioning the
//! command axis into stripes and driving one cursor per worker.

mod catalog;
mod command;
mod config;
mod cursor;
mod define;
mod entry;
mod error;
mod expr;
mod generator;

pub use catalog::Catalog;
pub use config::{DefineDescriptor, ShaderDescriptor};
pub use cursor::ComboCursor;
pub use define::Define;
pub use entry::{CfgEntry, CfgEntryInfo};
pub use error::ConfigError;
pub use expr::Expression;
pub use generator::ComboGenerator;

// =============================================================================
// Bookmark tuning
// =============================================================================

/// Minimum command-axis spacing between bookmarks within one entry
pub const BOOKMARK_MIN_STEP: u64 = 1000;

/// Target number of bookmark intervals per entry; entries larger than
/// `BOOKMARK_MIN_STEP * BOOKMARK_INTERVALS` combos get proportionally wider
/// strides
pub const BOOKMARK_INTERVALS: u64 = 500;
