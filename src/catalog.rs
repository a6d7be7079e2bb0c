//! Catalog: the loaded configuration and its command axis
//!
//! Loading sorts entries by descending combo count, lays them out
//! contiguously on a single command axis starting at 0, and seeds the
//! bookmark table: a sparse map from command index to a pre-positioned
//! cursor snapshot. Random access into a combo space of any size then costs
//! one predecessor lookup, one cursor clone, and at most one bookmark
//! stride of mixed-radix advance arithmetic.
//!
//! The catalog is immutable after load. Workers typically partition
//! `[0, total_commands)` into stripes and drive [`Catalog::next_combo`]
//! over one stripe each; cursors are independent values, so no
//! synchronization is needed beyond sharing `&Catalog`.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::command;
use crate::config;
use crate::cursor::ComboCursor;
use crate::entry::{CfgEntry, CfgEntryInfo};
use crate::error::ConfigError;
use crate::{BOOKMARK_INTERVALS, BOOKMARK_MIN_STEP};

/// The loaded configuration: entries in catalog order plus the bookmark
/// table over the global command axis.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CfgEntry>,
    bookmarks: BTreeMap<u64, ComboCursor>,
    total_commands: u64,
}

impl Catalog {
    /// Read a configuration file and build the catalog and bookmarks.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let entries = config::load_entries(path.as_ref())?;
        Ok(Self::from_entries(entries))
    }

    pub(crate) fn from_entries(mut entries: Vec<CfgEntry>) -> Self {
        // Largest entries first; the sort is stable, so equal-sized entries
        // keep their configuration (name) order.
        entries.sort_by(|a, b| b.info().num_combos.cmp(&a.info().num_combos));

        let mut bookmarks = BTreeMap::new();
        let mut command = 0u64;

        for (slot, entry) in entries.iter_mut().enumerate() {
            let num_combos = entry.info().num_combos;
            entry.info_mut().command_start = command;
            entry.info_mut().command_end = command + num_combos;

            let mut cursor = ComboCursor::init(command, slot, entry);
            bookmarks.insert(command, cursor.clone());

            let step = BOOKMARK_MIN_STEP.max(num_combos / BOOKMARK_INTERVALS);
            let mut record = command + step;
            while record < command + num_combos {
                let mut delta = step;
                cursor.advance(entry, &mut delta);
                bookmarks.insert(record, cursor.clone());
                record += step;
            }

            debug!(
                "catalog entry '{}': {} combos at commands [{}, {}), skip [ {} ]",
                entry.info().name,
                num_combos,
                command,
                command + num_combos,
                entry.skip()
            );
            command += num_combos;
        }

        // Terminator bookmark closing the axis; its cursor's entry slot is
        // one past the end and resolves to no entry.
        bookmarks.insert(command, ComboCursor::terminator(command, entries.len()));

        Self {
            entries,
            bookmarks,
            total_commands: command,
        }
    }

    /// Number of commands on the global axis (the sum of all combo counts).
    pub fn total_commands(&self) -> u64 {
        self.total_commands
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> &[CfgEntry] {
        &self.entries
    }

    /// Snapshot of the catalog in catalog order, closed by a zeroed
    /// terminator entry with `command_start == command_end ==
    /// total_commands`.
    pub fn describe(&self) -> Vec<CfgEntryInfo> {
        let mut infos: Vec<CfgEntryInfo> =
            self.entries.iter().map(|entry| entry.info().clone()).collect();
        infos.push(CfgEntryInfo::terminator(self.total_commands));
        infos
    }

    /// Position a fresh cursor at global command index `command`, or `None`
    /// if it lies outside the axis.
    pub fn combo(&self, command: u64) -> Option<ComboCursor> {
        if command >= self.total_commands {
            return None;
        }
        let (&found, bookmark) = self.bookmarks.range(..=command).next_back()?;
        let entry = self.entries.get(bookmark.entry_slot())?;

        let mut cursor = bookmark.clone();
        let mut delta = command - found;
        if !cursor.advance(entry, &mut delta) {
            return None;
        }
        Some(cursor)
    }

    /// Advance to the next surviving combo at or after `*command`, strictly
    /// below `command_end`.
    ///
    /// On success, positions `*cursor` on the combo, writes its command
    /// index back into `*command`, and returns true. On exhaustion, clears
    /// `*cursor`, sets `*command` to `command_end`, and returns false. A
    /// `None` cursor is seeded by bookmark lookup; iteration crosses entry
    /// boundaries by re-entering the lookup one command past an exhausted
    /// entry.
    pub fn next_combo(
        &self,
        command: &mut u64,
        cursor: &mut Option<ComboCursor>,
        command_end: u64,
    ) -> bool {
        let mut current = match cursor.take() {
            Some(existing) => existing,
            None => {
                let Some(found) = self.combo(*command) else {
                    return false;
                };
                if !self.is_skipped(&found) {
                    *cursor = Some(found);
                    return true;
                }
                found
            }
        };

        loop {
            let Some(entry) = self.entries.get(current.entry_slot()) else {
                *command = command_end;
                return false;
            };

            if current.next_not_skipped(entry, command_end) {
                *command = current.command_num();
                *cursor = Some(current);
                return true;
            }

            if current.command_num() + 1 >= command_end {
                *command = command_end;
                return false;
            }

            // The entry ran dry inside the window; step one command past it
            // and re-enter through the bookmark table.
            *command = current.command_num() + 1;
            let Some(next) = self.combo(*command) else {
                *command = command_end;
                return false;
            };
            if !self.is_skipped(&next) {
                *cursor = Some(next);
                return true;
            }
            current = next;
        }
    }

    /// The catalog entry a cursor is positioned on, or `None` for a
    /// detached cursor.
    pub fn entry_info(&self, cursor: &ComboCursor) -> Option<&CfgEntryInfo> {
        self.entries.get(cursor.entry_slot()).map(CfgEntry::info)
    }

    /// Serialize the cursor's combo into the machine-readable command
    /// payload. Leaves `buffer` empty for a detached cursor.
    pub fn format_command(&self, cursor: &ComboCursor, buffer: &mut Vec<u8>) {
        match self.entries.get(cursor.entry_slot()) {
            Some(entry) => command::format_command(entry, cursor, buffer),
            None => buffer.clear(),
        }
    }

    /// Render the cursor's combo as a human-readable `fxc.exe` command
    /// line. Empty for a detached cursor.
    pub fn format_command_human_readable(&self, cursor: &ComboCursor) -> String {
        match self.entries.get(cursor.entry_slot()) {
            Some(entry) => command::format_command_human_readable(entry, cursor),
            None => String::new(),
        }
    }

    fn is_skipped(&self, cursor: &ComboCursor) -> bool {
        match self.entries.get(cursor.entry_slot()) {
            Some(entry) => cursor.is_skipped(entry),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define::Define;
    use crate::expr::Expression;
    use crate::generator::ComboGenerator;
    use std::sync::Arc;

    fn entry(name: &str, defs: &[(&str, i32, i32)], skip: &str) -> CfgEntry {
        let mut cg = ComboGenerator::new();
        for &(def_name, min, max) in defs {
            cg.add_define(Define::new(def_name, min, max, false)).unwrap();
        }
        let skip = Expression::parse(skip, &cg);
        let num_combos = cg.num_combos();
        let info = CfgEntryInfo {
            name: Arc::from(name),
            shader_file_name: Arc::from(format!("{}.fxc", name).as_str()),
            shader_version: Arc::from("ps_2_0"),
            centroid_mask: 0,
            num_combos,
            num_static_combos: 1,
            num_dynamic_combos: num_combos,
            command_start: 0,
            command_end: num_combos,
        };
        CfgEntry::new(cg, skip, info)
    }

    fn catalog_s4() -> Catalog {
        // "small" has 4 combos, "big" has 6; the catalog must order "big"
        // first regardless of construction order.
        Catalog::from_entries(vec![
            entry("small", &[("X", 0, 3)], ""),
            entry("big", &[("A", 0, 1), ("B", 0, 2)], ""),
        ])
    }

    #[test]
    fn test_entries_sorted_by_descending_combo_count() {
        let catalog = catalog_s4();
        let infos = catalog.describe();
        assert_eq!(infos.len(), 3);
        assert_eq!(&*infos[0].name, "big");
        assert_eq!(infos[0].command_start, 0);
        assert_eq!(infos[0].command_end, 6);
        assert_eq!(&*infos[1].name, "small");
        assert_eq!(infos[1].command_start, 6);
        assert_eq!(infos[1].command_end, 10);
        // Terminator
        assert_eq!(&*infos[2].name, "");
        assert_eq!(infos[2].num_combos, 0);
        assert_eq!(infos[2].command_start, 10);
        assert_eq!(infos[2].command_end, 10);
        assert_eq!(catalog.total_commands(), 10);
    }

    #[test]
    fn test_equal_sized_entries_keep_insertion_order() {
        let catalog = Catalog::from_entries(vec![
            entry("alpha", &[("X", 0, 3)], ""),
            entry("beta", &[("Y", 0, 3)], ""),
        ]);
        let infos = catalog.describe();
        assert_eq!(&*infos[0].name, "alpha");
        assert_eq!(&*infos[1].name, "beta");
    }

    #[test]
    fn test_combo_random_access_lands_in_second_entry() {
        let catalog = catalog_s4();
        let cursor = catalog.combo(7).expect("command 7 is on the axis");
        assert_eq!(cursor.command_num(), 7);
        assert_eq!(cursor.combo_num(), 2);
        assert_eq!(&*catalog.entry_info(&cursor).unwrap().name, "small");
    }

    #[test]
    fn test_combo_out_of_range_is_none() {
        let catalog = catalog_s4();
        assert!(catalog.combo(10).is_none());
        assert!(catalog.combo(u64::MAX).is_none());

        let empty = Catalog::from_entries(Vec::new());
        assert_eq!(empty.total_commands(), 0);
        assert!(empty.combo(0).is_none());
    }

    #[test]
    fn test_next_combo_crosses_entry_boundary() {
        // Skip everything in "big" past command 0 so iteration has to hop
        // from the first entry into the second through the bookmark table.
        let catalog = Catalog::from_entries(vec![
            entry("small", &[("X", 0, 3)], ""),
            entry("big", &[("A", 0, 1), ("B", 0, 2)], "$A < 1 || $B < 2"),
        ]);
        let end = catalog.total_commands();

        let mut command = 0;
        let mut cursor = None;
        let mut visited = Vec::new();
        while catalog.next_combo(&mut command, &mut cursor, end) {
            let cur = cursor.as_ref().unwrap();
            visited.push((
                catalog.entry_info(cur).unwrap().name.to_string(),
                cur.command_num(),
            ));
            command += 1;
            cursor = None;
        }
        assert_eq!(command, end);
        let expected: Vec<(String, u64)> = [("big", 0), ("small", 6), ("small", 7), ("small", 8), ("small", 9)]
            .iter()
            .map(|&(n, c)| (n.to_string(), c))
            .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_next_combo_with_persistent_cursor() {
        let catalog = catalog_s4();
        let end = catalog.total_commands();
        let mut command = 0;
        let mut cursor = None;
        let mut count = 0;
        while catalog.next_combo(&mut command, &mut cursor, end) {
            count += 1;
            if count > 16 {
                break;
            }
        }
        assert_eq!(count, 10);
        assert_eq!(command, end);
        assert!(cursor.is_none());
    }

    #[test]
    fn test_detached_cursor_is_inert() {
        let catalog = catalog_s4();
        let detached = ComboCursor::default();
        assert!(catalog.entry_info(&detached).is_none());
        assert_eq!(catalog.format_command_human_readable(&detached), "");
        let mut buffer = vec![1, 2, 3];
        catalog.format_command(&detached, &mut buffer);
        assert!(buffer.is_empty());
    }
}
