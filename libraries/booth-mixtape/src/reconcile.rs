//! Live list reconciliation
//!
//! Merges insert/update/delete notifications from a change feed into a
//! locally held list without refetching it. The list is always ordered by
//! the rows' position field (ties by ID), never by arrival order, so two
//! clients that saw the same events in different orders end up with the
//! same list.

use booth_core::{MixtapeTrack, TrackId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// A row that can be kept live
pub trait LiveRow {
    /// Unique identifier type
    type Id: Clone + Ord + fmt::Debug;

    /// Unique identifier
    fn id(&self) -> &Self::Id;

    /// Sort key within the list
    fn position(&self) -> u32;
}

impl LiveRow for MixtapeTrack {
    type Id = TrackId;

    fn id(&self) -> &TrackId {
        &self.id
    }

    fn position(&self) -> u32 {
        self.position
    }
}

/// A row-level change notification
///
/// Wire format: `{"type": "insert" | "update" | "delete", "entity": ...}`,
/// where a delete carries only the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entity", rename_all = "lowercase")]
#[serde(bound(
    serialize = "T: Serialize, T::Id: Serialize",
    deserialize = "T: Deserialize<'de>, T::Id: Deserialize<'de>"
))]
pub enum ChangeEvent<T: LiveRow> {
    /// Row created
    Insert(T),
    /// Row changed
    Update(T),
    /// Row deleted
    Delete(T::Id),
}

impl<T: LiveRow> ChangeEvent<T> {
    /// Identifier of the affected row
    pub fn id(&self) -> &T::Id {
        match self {
            ChangeEvent::Insert(row) | ChangeEvent::Update(row) => row.id(),
            ChangeEvent::Delete(id) => id,
        }
    }
}

fn row_order<T: LiveRow>(a: &T, b: &T) -> Ordering {
    a.position()
        .cmp(&b.position())
        .then_with(|| a.id().cmp(b.id()))
}

/// Locally held, position-ordered list of live rows
#[derive(Debug, Clone)]
pub struct Reconciler<T: LiveRow> {
    rows: Vec<T>,
}

impl<T: LiveRow> Default for Reconciler<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: LiveRow> Reconciler<T> {
    /// Create empty reconciler
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a fetched snapshot
    pub fn from_rows(rows: Vec<T>) -> Self {
        let mut reconciler = Self::new();
        reconciler.resync(rows);
        reconciler
    }

    /// Replace everything with a fresh snapshot
    ///
    /// Used after a reconnect: missed events are not replayed, the whole
    /// list is fetched again. Duplicate IDs in the snapshot keep the first.
    pub fn resync(&mut self, rows: Vec<T>) {
        let mut seen = std::collections::BTreeSet::new();
        let mut rows: Vec<T> = rows
            .into_iter()
            .filter(|row| seen.insert(row.id().clone()))
            .collect();
        rows.sort_by(row_order);
        self.rows = rows;
    }

    /// Apply an insert
    ///
    /// Ignored if a row with the same ID is already present, which covers a
    /// feed echo of an optimistic local insert. Returns whether the list
    /// changed.
    pub fn on_insert(&mut self, row: T) -> bool {
        if self.index_of(row.id()).is_some() {
            trace!(id = ?row.id(), "Ignoring duplicate insert");
            return false;
        }
        let at = self
            .rows
            .partition_point(|existing| row_order(existing, &row) == Ordering::Less);
        self.rows.insert(at, row);
        true
    }

    /// Apply an update
    ///
    /// Ignored if the row is unknown (for example already deleted locally).
    pub fn on_update(&mut self, row: T) -> bool {
        let Some(index) = self.index_of(row.id()) else {
            trace!(id = ?row.id(), "Ignoring update for unknown row");
            return false;
        };
        let moved = self.rows[index].position() != row.position();
        self.rows[index] = row;
        if moved {
            self.rows.sort_by(row_order);
        }
        true
    }

    /// Apply a delete
    ///
    /// Ignored if the row is unknown.
    pub fn on_delete(&mut self, id: &T::Id) -> bool {
        let Some(index) = self.index_of(id) else {
            trace!(?id, "Ignoring delete for unknown row");
            return false;
        };
        self.rows.remove(index);
        true
    }

    /// Apply any change event
    pub fn apply(&mut self, event: ChangeEvent<T>) -> bool {
        match event {
            ChangeEvent::Insert(row) => self.on_insert(row),
            ChangeEvent::Update(row) => self.on_update(row),
            ChangeEvent::Delete(id) => self.on_delete(&id),
        }
    }

    fn index_of(&self, id: &T::Id) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    /// Find a row by ID
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Rows in position order
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Consume into the ordered rows
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pure reducer form of [`Reconciler::apply`]
pub fn apply_event<T: LiveRow>(rows: Vec<T>, event: ChangeEvent<T>) -> Vec<T> {
    let mut reconciler = Reconciler::from_rows(rows);
    reconciler.apply(event);
    reconciler.into_rows()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Row {
        id: String,
        position: u32,
        label: String,
    }

    impl LiveRow for Row {
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }

        fn position(&self) -> u32 {
            self.position
        }
    }

    fn row(id: &str, position: u32) -> Row {
        Row {
            id: id.to_string(),
            position,
            label: "original".to_string(),
        }
    }

    fn ids(reconciler: &Reconciler<Row>) -> Vec<&str> {
        reconciler.rows().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let mut reconciler = Reconciler::new();
        assert!(reconciler.on_insert(row("a", 0)));
        assert!(!reconciler.on_insert(row("a", 0)));
        assert_eq!(reconciler.len(), 1);
    }

    #[test]
    fn inserts_sort_by_position_not_arrival() {
        let mut reconciler = Reconciler::new();
        reconciler.on_insert(row("c", 2));
        reconciler.on_insert(row("a", 0));
        reconciler.on_insert(row("b", 1));
        assert_eq!(ids(&reconciler), vec!["a", "b", "c"]);
    }

    #[test]
    fn colliding_positions_break_ties_by_id() {
        let mut first = Reconciler::new();
        first.on_insert(row("y", 3));
        first.on_insert(row("x", 3));

        let mut second = Reconciler::new();
        second.on_insert(row("x", 3));
        second.on_insert(row("y", 3));

        assert_eq!(ids(&first), vec!["x", "y"]);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn update_replaces_in_place() {
        let mut reconciler = Reconciler::from_rows(vec![row("a", 0), row("b", 1)]);
        let mut changed = row("a", 0);
        changed.label = "edited".to_string();

        assert!(reconciler.on_update(changed));
        assert_eq!(reconciler.get(&"a".to_string()).unwrap().label, "edited");
        assert_eq!(ids(&reconciler), vec!["a", "b"]);
    }

    #[test]
    fn update_that_moves_row_resorts() {
        let mut reconciler = Reconciler::from_rows(vec![row("a", 0), row("b", 1), row("c", 2)]);
        reconciler.on_update(row("a", 5));
        assert_eq!(ids(&reconciler), vec!["b", "c", "a"]);
    }

    #[test]
    fn stale_update_after_delete_is_noop() {
        let mut reconciler = Reconciler::from_rows(vec![row("a", 0), row("b", 1)]);
        assert!(reconciler.on_delete(&"a".to_string()));
        let before = reconciler.rows().to_vec();

        assert!(!reconciler.on_update(row("a", 0)));
        assert_eq!(reconciler.rows(), before.as_slice());
    }

    #[test]
    fn delete_unknown_is_noop() {
        let mut reconciler = Reconciler::from_rows(vec![row("a", 0)]);
        assert!(!reconciler.on_delete(&"zzz".to_string()));
        assert_eq!(reconciler.len(), 1);
    }

    #[test]
    fn resync_replaces_and_dedupes() {
        let mut reconciler = Reconciler::from_rows(vec![row("old", 0)]);
        reconciler.resync(vec![row("b", 1), row("a", 0), row("a", 0)]);
        assert_eq!(ids(&reconciler), vec!["a", "b"]);
    }

    #[test]
    fn apply_event_is_pure_reducer() {
        let rows = vec![row("a", 0)];
        let rows = apply_event(rows, ChangeEvent::Insert(row("b", 1)));
        let rows = apply_event(rows, ChangeEvent::Delete("a".to_string()));
        assert_eq!(rows, vec![row("b", 1)]);
    }

    #[test]
    fn change_event_wire_format() {
        let event: ChangeEvent<Row> = ChangeEvent::Delete("a".to_string());
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "delete", "entity": "a"})
        );

        let parsed: ChangeEvent<MixtapeTrack> = serde_json::from_value(json!({
            "type": "insert",
            "entity": {
                "id": "t1",
                "mixtape_id": "tape",
                "position": 0,
                "duration_ms": 1000,
                "title": "Song",
                "artist": "Band",
                "added_by_user_id": "u1",
                "added_at": "2024-05-01T12:00:00Z"
            }
        }))
        .unwrap();
        assert_eq!(parsed.id(), &TrackId::new("t1"));
    }
}
