//! Combo cursor: iteration state over one entry's combo space
//!
//! An entry's axes form a mixed-radix numeral with slot 0 as the
//! least-significant digit. A freshly positioned cursor sits at combo
//! `num_combos - 1` with every axis at its max; walking the command axis
//! forward decrements the combo number, stepping slot 0 down by one and
//! rippling into higher slots when a value would underflow its min.
//!
//! Cursors are plain owned values: `Clone` yields an independent copy,
//! `Default` the detached null cursor. They reference their entry by catalog
//! slot and never outlive the catalog's data, which is immutable after load.

use crate::entry::CfgEntry;

/// Catalog slot marking a cursor that is not positioned on any entry.
pub(crate) const NO_ENTRY: usize = usize::MAX;

/// Iteration state for walking one shader's combos.
#[derive(Debug, Clone)]
pub struct ComboCursor {
    total_command: u64,
    combo_number: u64,
    num_combos: u64,
    entry_slot: usize,
    values: Vec<i32>,
}

impl Default for ComboCursor {
    /// A detached cursor, positioned on nothing. Every catalog query treats
    /// it as exhausted.
    fn default() -> Self {
        Self {
            total_command: 0,
            combo_number: 0,
            num_combos: 0,
            entry_slot: NO_ENTRY,
            values: Vec::new(),
        }
    }
}

impl ComboCursor {
    /// Position a cursor at `entry`'s first command on the global axis:
    /// combo number `num_combos - 1`, every axis at its max.
    pub(crate) fn init(global_start: u64, entry_slot: usize, entry: &CfgEntry) -> Self {
        let num_combos = entry.info().num_combos;
        Self {
            total_command: global_start,
            combo_number: num_combos - 1,
            num_combos,
            entry_slot,
            values: entry.generator().defines().iter().map(|d| d.max()).collect(),
        }
    }

    /// The cursor stored in the terminator bookmark closing the command axis.
    pub(crate) fn terminator(total_commands: u64, entry_slot: usize) -> Self {
        Self {
            total_command: total_commands,
            combo_number: 0,
            num_combos: 0,
            entry_slot,
            values: Vec::new(),
        }
    }

    /// Global command index this cursor is positioned at.
    pub fn command_num(&self) -> u64 {
        self.total_command
    }

    /// Combo index within the cursor's entry.
    pub fn combo_num(&self) -> u64 {
        self.combo_number
    }

    /// Current axis values, one per slot in insertion order.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub(crate) fn entry_slot(&self) -> usize {
        self.entry_slot
    }

    /// Seek forward by `*delta` commands within this entry.
    ///
    /// If the entry has fewer than `*delta` combos left, consumes them from
    /// `*delta` and returns false with the residual still in `*delta`.
    /// Otherwise performs the mixed-radix subtraction across the value
    /// vector, leaves `*delta` at 0, and returns true.
    pub(crate) fn advance(&mut self, entry: &CfgEntry, delta: &mut u64) -> bool {
        if *delta == 0 {
            return true;
        }
        if self.combo_number < *delta {
            *delta -= self.combo_number;
            return false;
        }

        self.total_command += *delta;
        self.combo_number -= *delta;

        let mut remaining = *delta;
        for (value, define) in self.values.iter_mut().zip(entry.generator().defines()) {
            if remaining == 0 {
                break;
            }
            remaining += (define.max() - *value) as u64;
            *value = define.max();
            let cardinality = define.cardinality();
            *value -= (remaining % cardinality) as i32;
            remaining /= cardinality;
        }

        *delta = 0;
        true
    }

    /// Step to the next combo with a false skip expression, staying strictly
    /// below `command_end`. Returns false when the window or the entry is
    /// exhausted; the cursor then rests on its last visited combo.
    pub(crate) fn next_not_skipped(&mut self, entry: &CfgEntry, command_end: u64) -> bool {
        loop {
            if self.total_command + 1 >= command_end || self.combo_number == 0 {
                return false;
            }

            self.combo_number -= 1;
            self.total_command += 1;

            let mut rippled = false;
            for (value, define) in self.values.iter_mut().zip(entry.generator().defines()) {
                *value -= 1;
                if *value >= define.min() {
                    rippled = true;
                    break;
                }
                *value = define.max();
            }
            if !rippled {
                return false;
            }

            if entry.skip().evaluate(&self.values) == 0 {
                return true;
            }
        }
    }

    pub(crate) fn is_skipped(&self, entry: &CfgEntry) -> bool {
        entry.skip().evaluate(&self.values) != 0
    }
}
