//! Date-keyed record store built on the AVL tree
//!
//! Records are grouped into one [`DueSlot`] per date; the tree orders the
//! slots by date alone. The threshold scan walks the slots in order and
//! keeps the records that are due on or before a pivot date and pass a
//! caller-supplied readiness check. The store never looks at a record's
//! business fields beyond its date.

use std::borrow::Borrow;
use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::tree::AvlTree;

/// Anything that can be placed on the agenda by date
pub trait Dated {
    fn due_date(&self) -> NaiveDate;
}

impl<R: Dated + ?Sized> Dated for &R {
    fn due_date(&self) -> NaiveDate {
        (**self).due_date()
    }
}

/// All records due on one date, in insertion order
#[derive(Debug, Clone)]
pub struct DueSlot<R> {
    due: NaiveDate,
    records: Vec<R>,
}

impl<R> DueSlot<R> {
    /// The date shared by every record in the slot
    pub fn due(&self) -> NaiveDate {
        self.due
    }

    /// Records due on this date
    pub fn records(&self) -> &[R] {
        &self.records
    }
}

impl<R> PartialEq for DueSlot<R> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due
    }
}

impl<R> Eq for DueSlot<R> {}

impl<R> PartialOrd for DueSlot<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for DueSlot<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due)
    }
}

impl<R> Borrow<NaiveDate> for DueSlot<R> {
    fn borrow(&self) -> &NaiveDate {
        &self.due
    }
}

/// Records indexed by due date
#[derive(Debug, Clone)]
pub struct DueIndex<R> {
    slots: AvlTree<DueSlot<R>>,
    len: usize,
}

impl<R> Default for DueIndex<R> {
    fn default() -> Self {
        Self {
            slots: AvlTree::new(),
            len: 0,
        }
    }
}

impl<R: Dated> DueIndex<R> {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record under its due date
    pub fn insert(&mut self, record: R) {
        let due = record.due_date();
        if let Some(slot) = self.slots.find_mut(&due) {
            slot.records.push(record);
        } else {
            self.slots.insert(DueSlot {
                due,
                records: vec![record],
            });
        }
        self.len += 1;
    }

    /// Removes the first record due on `date` that matches `predicate`
    ///
    /// The slot is dropped from the tree once its last record is gone.
    pub fn remove_where<P>(&mut self, date: NaiveDate, predicate: P) -> Option<R>
    where
        P: FnMut(&R) -> bool,
    {
        let slot = self.slots.find_mut(&date)?;
        let position = slot.records.iter().position(predicate)?;
        let record = slot.records.remove(position);
        if slot.records.is_empty() {
            self.slots.remove(&date);
        }
        self.len -= 1;
        Some(record)
    }

    /// Records due exactly on `date`, or None if nothing is due that day
    pub fn exact_lookup(&self, date: NaiveDate) -> Option<&[R]> {
        self.slots.find(&date).map(|slot| slot.records())
    }

    /// Records due on or before `pivot` that pass `ready`, ascending by date
    ///
    /// Records that share a date come out in insertion order.
    pub fn threshold_scan<F>(&self, pivot: NaiveDate, mut ready: F) -> Vec<&R>
    where
        F: FnMut(&R) -> bool,
    {
        self.slots
            .iter()
            .take_while(|slot| pivot >= slot.due)
            .flat_map(|slot| slot.records.iter())
            .filter(|record| ready(*record))
            .collect()
    }
}

impl<R> DueIndex<R> {
    /// Total number of records
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no records are indexed
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of distinct due dates
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every record
    pub fn make_empty(&mut self) {
        self.slots.make_empty();
        self.len = 0;
    }

    /// The earliest slot
    pub fn earliest(&self) -> Option<&DueSlot<R>> {
        self.slots.find_min()
    }

    /// The latest slot
    pub fn latest(&self) -> Option<&DueSlot<R>> {
        self.slots.find_max()
    }

    /// Every record, ascending by date
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.slots.iter().flat_map(|slot| slot.records.iter())
    }

    /// The distinct due dates, ascending
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.slots.iter().map(DueSlot::due)
    }
}

impl<R: Dated> FromIterator<R> for DueIndex<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
