//! Combo generator: the ordered axis list of one shader
//!
//! A `ComboGenerator` owns a shader's defines in insertion order, hands out
//! dense slot numbers for them, and tracks the current assignment vector.
//! Slot numbers are stable and shared by every component that touches axis
//! values: the expression parser resolves `$NAME` references to slots, the
//! cursor's mixed-radix encoding treats slot 0 as the least-significant
//! digit, and command serialization walks slots in order.

use hashbrown::HashMap;

use crate::define::Define;

/// Ordered list of defines plus the current assignment vector.
#[derive(Debug, Clone, Default)]
pub struct ComboGenerator {
    defines: Vec<Define>,
    slots: HashMap<String, usize>,
    values: Vec<i32>,
}

impl ComboGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis, assigning it the next slot.
    ///
    /// The slot's assignment value starts at the sentinel 1; it is
    /// overwritten the first time a cursor is positioned on this entry.
    /// Returns the assigned slot, or `None` when an axis with the same name
    /// already exists.
    pub fn add_define(&mut self, define: Define) -> Option<usize> {
        if self.slots.contains_key(define.name()) {
            return None;
        }
        let slot = self.defines.len();
        self.slots.insert(define.name().to_owned(), slot);
        self.defines.push(define);
        self.values.push(1);
        Some(slot)
    }

    pub fn defines(&self) -> &[Define] {
        &self.defines
    }

    /// Total combo count: the product of all axis cardinalities.
    ///
    /// An empty generator yields 1 (the empty product). The product is not
    /// checked for 64-bit overflow; configurations are expected to keep each
    /// shader's combo space within `u64`.
    pub fn num_combos(&self) -> u64 {
        self.defines.iter().map(Define::cardinality).product()
    }

    /// Combo count over axes whose static flag matches `is_static`; the
    /// other axes contribute a factor of 1.
    pub fn num_combos_of(&self, is_static: bool) -> u64 {
        self.defines
            .iter()
            .map(|d| {
                if d.is_static() == is_static {
                    d.cardinality()
                } else {
                    1
                }
            })
            .product()
    }

    /// Slot of the named axis, or -1 if no such axis exists.
    pub fn slot_of(&self, name: &str) -> i32 {
        match self.slots.get(name) {
            Some(&slot) => slot as i32,
            None => -1,
        }
    }

    pub fn name_at(&self, slot: usize) -> Option<&str> {
        self.defines.get(slot).map(Define::name)
    }

    pub fn value_at(&self, slot: usize) -> Option<i32> {
        self.values.get(slot).copied()
    }

    /// Current assignment vector, one value per slot.
    pub fn values(&self) -> &[i32] {
        &self.values
    }
}
