//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list/create/edit/delete use-cases to Dart via FRB.
//! - Route every write through the core create/edit flows so the mobile UI
//!   gets the same validation as any other caller.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-scoped view-model backs every call.
//! - Failure envelopes carry a user-facing message; details go to the log.

use log::warn;
use once_cell::sync::OnceCell;
use pocketnote_core::presenter::list::derive_preview;
use pocketnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CreateFlow, EditFlow, FlowError, Note, NoteId, NoteStore, NoteViewModel,
    SqliteNoteRepository, StoreError,
};
use std::path::PathBuf;
use uuid::Uuid;

const NOTES_DB_FILE_NAME: &str = "pocketnote.sqlite3";
const NOTES_DB_PATH_ENV: &str = "POCKETNOTE_DB_PATH";

static NOTES_DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static NOTES_VIEW_MODEL: OnceCell<NoteViewModel<SqliteNoteRepository>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One note as rendered by the Dart list and edit screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note ID in string form.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Single-line summary for list rows.
    pub preview: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Notes newest first; empty on failure.
    pub items: Vec<NoteItem>,
    /// Store version the items were read at; lets Dart skip stale redraws.
    pub version: u64,
    pub message: String,
}

/// Single-note action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected note, when one exists after the operation.
    pub note: Option<NoteItem>,
    /// Human-readable message for a toast.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<Note>) -> Self {
        Self {
            ok: true,
            note: note.as_ref().map(to_note_item),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }

    fn from_flow_error(operation: &str, err: &FlowError) -> Self {
        warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
        Self::failure(err.user_message())
    }
}

/// Lists all notes.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    match view_model().and_then(|vm| vm.snapshot()) {
        Ok(snapshot) => NotesListResponse {
            ok: true,
            items: snapshot.notes().iter().map(to_note_item).collect(),
            version: snapshot.version,
            message: if snapshot.is_empty() {
                "No notes.".to_string()
            } else {
                format!("{} note(s).", snapshot.len())
            },
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=notes_list error={err}");
            NotesListResponse {
                ok: false,
                items: Vec::new(),
                version: 0,
                message: FlowError::from(err).user_message(),
            }
        }
    }
}

/// Loads one note for the edit screen.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(id: String) -> NoteActionResponse {
    let id = match parse_note_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match view_model().and_then(|vm| vm.get(id)) {
        Ok(Some(note)) => NoteActionResponse::success("", Some(note)),
        Ok(None) => NoteActionResponse::failure("This note no longer exists"),
        Err(err) => NoteActionResponse::from_flow_error("note_get", &FlowError::from(err)),
    }
}

/// Confirms the add-note dialog.
///
/// # FFI contract
/// - Blank title or content is rejected without writing.
/// - Returns the stored note on success.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, content: String) -> NoteActionResponse {
    let result = view_model().map_err(FlowError::from).and_then(|vm| {
        let mut flow = CreateFlow::new();
        flow.open();
        flow.set_title(title)?;
        flow.set_content(content)?;
        flow.confirm(&vm)
    });
    match result {
        Ok(note) => NoteActionResponse::success(CreateFlow::SUCCESS_NOTICE, Some(note)),
        Err(err) => NoteActionResponse::from_flow_error("note_create", &err),
    }
}

/// Saves the edit screen fields for note `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, title: String, content: String) -> NoteActionResponse {
    let id = match parse_note_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let result = view_model().map_err(FlowError::from).and_then(|vm| {
        let mut flow = EditFlow::enter(&vm, id)?;
        flow.set_title(title)?;
        flow.set_content(content)?;
        flow.save(&vm)
    });
    match result {
        Ok(note) => NoteActionResponse::success("Note saved", Some(note)),
        Err(err) => NoteActionResponse::from_flow_error("note_update", &err),
    }
}

/// Deletes note `id`; deleting an already-deleted note succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> NoteActionResponse {
    let id = match parse_note_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let result = view_model()
        .map_err(FlowError::from)
        .and_then(|vm| EditFlow::enter(&vm, id)?.delete(&vm));
    match result {
        Ok(outcome) => NoteActionResponse::success(outcome.notice(), None),
        Err(FlowError::Store(StoreError::NoteNotFound(_))) => {
            NoteActionResponse::success("Note was already deleted", None)
        }
        Err(err) => NoteActionResponse::from_flow_error("note_delete", &err),
    }
}

fn parse_note_id(raw: &str) -> Result<NoteId, NoteActionResponse> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| NoteActionResponse::failure(format!("invalid note id `{raw}`")))
}

fn view_model() -> Result<NoteViewModel<SqliteNoteRepository>, StoreError> {
    NOTES_VIEW_MODEL
        .get_or_try_init(|| NoteStore::open(resolve_db_path()).map(NoteViewModel::new))
        .cloned()
}

fn resolve_db_path() -> PathBuf {
    NOTES_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(NOTES_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(NOTES_DB_FILE_NAME)
        })
        .clone()
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        preview: derive_preview(&note.content),
        created_at_ms: note.created_at,
        updated_at_ms: note.updated_at,
    }
}
