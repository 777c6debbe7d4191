//! Note list presenter.
//!
//! # Responsibility
//! - Hold the rows currently rendered by the list surface.
//! - Replace them from store snapshots and report what changed, keyed by id.
//! - Turn a row tap into a selection event carrying the note id.
//!
//! # Invariants
//! - After `set_notes(s)` the rows mirror exactly the notes of `s`, in order.
//! - Snapshots older than or equal to the applied version are ignored.
//! - One successful selection emits exactly one `NoteSelection`.

use crate::model::note::{Note, NoteId};
use crate::store::live::{LiveNotes, NoteSnapshot};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const PREVIEW_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: NoteId,
    pub title: String,
    /// Raw content, kept so changes can be detected per row.
    pub content: String,
    /// Single-line summary of `content` for compact rendering.
    pub preview: String,
}

impl NoteRow {
    fn from_note(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            preview: derive_preview(&note.content),
        }
    }
}

/// Event sent to the edit screen when a row is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSelection {
    pub id: NoteId,
}

/// Row-level difference between two applied snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListChange {
    pub inserted: Vec<NoteId>,
    pub updated: Vec<NoteId>,
    pub removed: Vec<NoteId>,
    /// Whether rows present in both snapshots changed relative order.
    pub reordered: bool,
}

impl ListChange {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
            && self.updated.is_empty()
            && self.removed.is_empty()
            && !self.reordered
    }
}

pub struct NoteListPresenter {
    rows: Vec<NoteRow>,
    version: Option<u64>,
    on_select: Box<dyn FnMut(NoteSelection) + Send>,
}

impl NoteListPresenter {
    pub fn new(on_select: impl FnMut(NoteSelection) + Send + 'static) -> Self {
        Self {
            rows: Vec::new(),
            version: None,
            on_select: Box::new(on_select),
        }
    }

    pub fn rows(&self) -> &[NoteRow] {
        &self.rows
    }

    /// Version of the last applied snapshot, if any.
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// Replaces all rows with `snapshot`.
    ///
    /// Returns `None` when the snapshot is not newer than the applied one.
    pub fn set_notes(&mut self, snapshot: &NoteSnapshot) -> Option<ListChange> {
        if self.version.is_some_and(|applied| snapshot.version <= applied) {
            debug!(
                "event=list_apply module=presenter status=stale version={} applied={:?}",
                snapshot.version, self.version
            );
            return None;
        }

        let next: Vec<NoteRow> = snapshot.notes().iter().map(NoteRow::from_note).collect();
        let change = diff_rows(&self.rows, &next);
        self.rows = next;
        self.version = Some(snapshot.version);
        debug!(
            "event=list_apply module=presenter status=ok version={} rows={} inserted={} updated={} removed={}",
            snapshot.version,
            self.rows.len(),
            change.inserted.len(),
            change.updated.len(),
            change.removed.len()
        );
        Some(change)
    }

    /// Applies the newest pending snapshot from `live`, if there is one.
    pub fn sync(&mut self, live: &LiveNotes) -> Option<ListChange> {
        let snapshot = live.try_latest()?;
        self.set_notes(&snapshot)
    }

    /// Emits a selection for the row at `index`.
    pub fn select(&mut self, index: usize) -> bool {
        match self.rows.get(index) {
            Some(row) => {
                let selection = NoteSelection { id: row.id };
                (self.on_select)(selection);
                true
            }
            None => false,
        }
    }

    /// Emits a selection for the row with `id`, if it is rendered.
    pub fn select_id(&mut self, id: NoteId) -> bool {
        match self.rows.iter().position(|row| row.id == id) {
            Some(index) => self.select(index),
            None => false,
        }
    }
}

fn diff_rows(previous: &[NoteRow], next: &[NoteRow]) -> ListChange {
    let before: HashMap<NoteId, &NoteRow> = previous.iter().map(|row| (row.id, row)).collect();
    let after: HashMap<NoteId, &NoteRow> = next.iter().map(|row| (row.id, row)).collect();

    let mut change = ListChange::default();
    for row in next {
        match before.get(&row.id) {
            None => change.inserted.push(row.id),
            Some(old) if old.title != row.title || old.content != row.content => {
                change.updated.push(row.id)
            }
            Some(_) => {}
        }
    }
    change.removed = previous
        .iter()
        .filter(|row| !after.contains_key(&row.id))
        .map(|row| row.id)
        .collect();

    let kept_before = previous
        .iter()
        .filter(|row| after.contains_key(&row.id))
        .map(|row| row.id);
    let kept_after = next
        .iter()
        .filter(|row| before.contains_key(&row.id))
        .map(|row| row.id);
    change.reordered = !kept_before.eq(kept_after);
    change
}

/// Collapses whitespace and keeps the first 100 characters.
pub fn derive_preview(content: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(content, " ");
    collapsed.trim().chars().take(PREVIEW_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{derive_preview, NoteListPresenter, NoteSelection};
    use crate::model::note::Note;
    use crate::store::live::NoteSnapshot;
    use std::sync::{Arc, Mutex};

    fn recording_presenter() -> (NoteListPresenter, Arc<Mutex<Vec<NoteSelection>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let presenter = NoteListPresenter::new(move |selection| {
            sink.lock().unwrap().push(selection);
        });
        (presenter, seen)
    }

    #[test]
    fn set_notes_fully_replaces_rows_and_reports_diff() {
        let (mut presenter, _) = recording_presenter();
        let a = Note::new("a", "one");
        let b = Note::new("b", "two");
        presenter.set_notes(&NoteSnapshot::new(1, vec![a.clone(), b.clone()]));

        let mut a_edited = a.clone();
        a_edited.content = "one more".to_string();
        let c = Note::new("c", "three");
        let change = presenter
            .set_notes(&NoteSnapshot::new(2, vec![c.clone(), a_edited]))
            .unwrap();

        assert_eq!(change.inserted, vec![c.id]);
        assert_eq!(change.updated, vec![a.id]);
        assert_eq!(change.removed, vec![b.id]);
        assert!(!change.reordered);
        let ids: Vec<_> = presenter.rows().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
    }

    #[test]
    fn stale_snapshot_is_ignored() {
        let (mut presenter, _) = recording_presenter();
        presenter.set_notes(&NoteSnapshot::new(3, vec![Note::new("a", "b")]));
        assert!(presenter.set_notes(&NoteSnapshot::new(2, Vec::new())).is_none());
        assert_eq!(presenter.rows().len(), 1);
    }

    #[test]
    fn reorder_is_detected() {
        let (mut presenter, _) = recording_presenter();
        let a = Note::new("a", "1");
        let b = Note::new("b", "2");
        presenter.set_notes(&NoteSnapshot::new(1, vec![a.clone(), b.clone()]));
        let change = presenter.set_notes(&NoteSnapshot::new(2, vec![b, a])).unwrap();
        assert!(change.reordered);
        assert!(change.inserted.is_empty() && change.updated.is_empty());
    }

    #[test]
    fn select_emits_one_event_with_row_id() {
        let (mut presenter, seen) = recording_presenter();
        let note = Note::new("pick", "me");
        presenter.set_notes(&NoteSnapshot::new(1, vec![note.clone()]));

        assert!(presenter.select(0));
        assert!(!presenter.select(5));
        assert_eq!(*seen.lock().unwrap(), vec![NoteSelection { id: note.id }]);
    }

    #[test]
    fn preview_collapses_whitespace_and_caps_length() {
        assert_eq!(derive_preview("  Milk,\n\tEggs  "), "Milk, Eggs");
        assert_eq!(derive_preview(&"x".repeat(150)).chars().count(), 100);
    }
}
