//! Per-shader configuration entries
//!
//! A `CfgEntry` bundles everything the enumerator needs for one shader: its
//! combo generator, its parsed skip expression, and the derived counts and
//! command-axis range that callers see as a [`CfgEntryInfo`] snapshot.

use std::sync::Arc;

use crate::expr::Expression;
use crate::generator::ComboGenerator;

/// Read-only description of one catalog entry, as exposed to callers.
///
/// Shared strings are `Arc<str>` so snapshots, entries, and cursors all
/// reference one allocation per distinct name for the catalog's lifetime.
#[derive(Debug, Clone)]
pub struct CfgEntryInfo {
    pub name: Arc<str>,
    pub shader_file_name: Arc<str>,
    pub shader_version: Arc<str>,
    pub centroid_mask: i32,
    pub num_combos: u64,
    pub num_static_combos: u64,
    pub num_dynamic_combos: u64,
    /// First command of this entry on the global axis.
    pub command_start: u64,
    /// One past the last command of this entry; `command_end - command_start
    /// == num_combos`.
    pub command_end: u64,
}

impl CfgEntryInfo {
    /// The zeroed terminator snapshot closing a catalog description.
    pub(crate) fn terminator(total_commands: u64) -> Self {
        Self {
            name: Arc::from(""),
            shader_file_name: Arc::from(""),
            shader_version: Arc::from(""),
            centroid_mask: 0,
            num_combos: 0,
            num_static_combos: 0,
            num_dynamic_combos: 0,
            command_start: total_commands,
            command_end: total_commands,
        }
    }
}

/// One shader's bundle: generator, skip expression, derived info.
#[derive(Debug, Clone)]
pub struct CfgEntry {
    generator: ComboGenerator,
    skip: Expression,
    info: CfgEntryInfo,
}

impl CfgEntry {
    pub(crate) fn new(generator: ComboGenerator, skip: Expression, info: CfgEntryInfo) -> Self {
        Self {
            generator,
            skip,
            info,
        }
    }

    pub fn generator(&self) -> &ComboGenerator {
        &self.generator
    }

    pub(crate) fn skip(&self) -> &Expression {
        &self.skip
    }

    pub fn info(&self) -> &CfgEntryInfo {
        &self.info
    }

    pub(crate) fn info_mut(&mut self) -> &mut CfgEntryInfo {
        &mut self.info
    }
}
