//! crates/revision_core/src/history.rs
//!
//! The history store: an ordered, most-recent-first collection of revisions,
//! together with its persisted JSON form.
//!
//! The persisted form is a JSON array (newest first) of revision records. The
//! domain types never derive serde traits; the private record structs below are
//! the only place where the wire shape is defined.

use crate::diff::{backward_text, compute_diff, forward_text};
use crate::domain::{DiffSegment, Revision, RevisionId, SegmentKind};
use crate::error::{RevisionError, RevisionResult};
use crate::ports::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{error, info, warn};
use uuid::Uuid;

//=========================================================================================
// The History Store
//=========================================================================================

/// Every revision created in a session, newest first. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    revisions: VecDeque<Revision>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `revision`.
    ///
    /// Fails without touching the history if a revision with the same id is
    /// already stored.
    pub fn append(&mut self, revision: Revision) -> RevisionResult<()> {
        if self.contains(revision.id()) {
            return Err(RevisionError::DuplicateRevision(revision.id()));
        }
        self.revisions.push_front(revision);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.iter()
    }

    pub fn get(&self, id: RevisionId) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: RevisionId) -> bool {
        self.get(id).is_some()
    }

    pub fn latest(&self) -> Option<&Revision> {
        self.revisions.front()
    }

    /// Drops every revision. This is the only way revisions leave the history.
    pub fn clear(&mut self) {
        self.revisions.clear();
    }

    //-------------------------------------------------------------------------------------
    // Serialization
    //-------------------------------------------------------------------------------------

    /// Serializes the whole history as one JSON document.
    pub fn serialize(&self) -> String {
        let records: Vec<RevisionRecord> =
            self.revisions.iter().map(RevisionRecord::from_domain).collect();
        serde_json::to_string(&records).expect("revision records always serialize")
    }

    /// Parses a persisted history.
    ///
    /// A revision whose cached diff is missing, malformed, or inconsistent with
    /// its texts is repaired by recomputing the diff; a warning is logged for each
    /// repair. Any other structural problem fails the whole load.
    pub fn load(serialized: &str) -> RevisionResult<Self> {
        let value: Value = serde_json::from_str(serialized)
            .map_err(|e| RevisionError::Deserialization(format!("not valid JSON: {}", e)))?;
        let Value::Array(items) = value else {
            return Err(RevisionError::Deserialization(
                "persisted history is not a sequence".to_string(),
            ));
        };

        let mut history = History::new();
        for (position, item) in items.into_iter().enumerate() {
            let revision = revive(position, item)?;
            let id = revision.id();
            if history.contains(id) {
                return Err(RevisionError::Deserialization(format!(
                    "duplicate revision id {}",
                    id
                )));
            }
            // Stored newest first; appending in reverse keeps that order.
            history.revisions.push_back(revision);
        }
        Ok(history)
    }

    /// Like `load`, but falls back to an empty history when the input is invalid.
    pub fn load_or_empty(serialized: &str) -> Self {
        match Self::load(serialized) {
            Ok(history) => history,
            Err(e) => {
                error!("Discarding persisted history: {}", e);
                History::new()
            }
        }
    }

    //-------------------------------------------------------------------------------------
    // Key-value persistence
    //-------------------------------------------------------------------------------------

    /// Writes the serialized history under `key`.
    pub fn persist(&self, store: &dyn KeyValueStore, key: &str) -> RevisionResult<()> {
        store
            .set(key, &self.serialize())
            .map_err(RevisionError::Persistence)
    }

    /// Reads the history stored under `key`. A missing key is an empty history
    /// and invalid contents are discarded with an error log.
    pub fn restore_from(store: &dyn KeyValueStore, key: &str) -> RevisionResult<Self> {
        let history = match store.get(key).map_err(RevisionError::Persistence)? {
            Some(serialized) => Self::load_or_empty(&serialized),
            None => History::new(),
        };
        info!("Restored {} revision(s) from '{}'.", history.len(), key);
        Ok(history)
    }
}

//=========================================================================================
// "Impure" Persisted Record Structs
//=========================================================================================

#[derive(Serialize)]
struct RevisionRecord<'a> {
    id: Uuid,
    original: &'a str,
    suggestion: &'a str,
    instruction: &'a str,
    created_at: DateTime<Utc>,
    diff: Vec<SegmentRecord>,
}

impl<'a> RevisionRecord<'a> {
    fn from_domain(revision: &'a Revision) -> Self {
        Self {
            id: revision.id().as_uuid(),
            original: revision.original(),
            suggestion: revision.suggestion(),
            instruction: revision.instruction(),
            created_at: revision.created_at(),
            diff: revision.diff().iter().map(SegmentRecord::from_domain).collect(),
        }
    }
}

/// The required fields of a persisted revision. `diff` is parsed separately so a
/// broken diff can be repaired instead of failing the load.
#[derive(Deserialize)]
struct StoredRevision {
    id: Uuid,
    original: String,
    suggestion: String,
    instruction: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    diff: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct SegmentRecord {
    value: String,
    kind: KindRecord,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindRecord {
    Unchanged,
    Added,
    Removed,
}

impl SegmentRecord {
    fn from_domain(segment: &DiffSegment) -> Self {
        let kind = match segment.kind {
            SegmentKind::Unchanged => KindRecord::Unchanged,
            SegmentKind::Added => KindRecord::Added,
            SegmentKind::Removed => KindRecord::Removed,
        };
        Self {
            value: segment.value.clone(),
            kind,
        }
    }

    fn to_domain(self) -> DiffSegment {
        let kind = match self.kind {
            KindRecord::Unchanged => SegmentKind::Unchanged,
            KindRecord::Added => SegmentKind::Added,
            KindRecord::Removed => SegmentKind::Removed,
        };
        DiffSegment::new(kind, self.value)
    }
}

fn revive(position: usize, item: Value) -> RevisionResult<Revision> {
    let stored: StoredRevision = serde_json::from_value(item).map_err(|e| {
        RevisionError::Deserialization(format!("revision at position {}: {}", position, e))
    })?;
    let id = RevisionId::from_uuid(stored.id);

    let cached = stored
        .diff
        .ok_or_else(|| "diff is missing".to_string())
        .and_then(|raw| {
            serde_json::from_value::<Vec<SegmentRecord>>(raw).map_err(|e| e.to_string())
        })
        .map(|records| records.into_iter().map(SegmentRecord::to_domain).collect::<Vec<_>>())
        .and_then(|segments| {
            if forward_text(&segments) == stored.suggestion
                && backward_text(&segments) == stored.original
            {
                Ok(segments)
            } else {
                Err("diff does not match the stored texts".to_string())
            }
        });

    let diff = match cached {
        Ok(segments) => segments,
        Err(reason) => {
            warn!(
                "Recomputing diff for revision {} ({}); the cached diff was discarded.",
                id, reason
            );
            compute_diff(&stored.original, &stored.suggestion)
        }
    };

    Ok(Revision::from_parts(
        id,
        stored.original,
        stored.suggestion,
        stored.instruction,
        stored.created_at,
        diff,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn revision(original: &str, suggestion: &str, instruction: &str) -> Revision {
        Revision::from_parts(
            RevisionId::new(),
            original.to_string(),
            suggestion.to_string(),
            instruction.to_string(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            compute_diff(original, suggestion),
        )
    }

    fn sample_history() -> History {
        let mut history = History::new();
        history
            .append(revision("The cat sat.", "The dog sat.", "swap the animal"))
            .unwrap();
        history
            .append(revision("hi there", "Good afternoon.", "make formal"))
            .unwrap();
        history
            .append(revision("", "", "nothing at all"))
            .unwrap();
        history
    }

    #[test]
    fn append_prepends() {
        let history = sample_history();
        let instructions: Vec<_> = history.iter().map(|r| r.instruction()).collect();
        assert_eq!(
            instructions,
            vec!["nothing at all", "make formal", "swap the animal"]
        );
        assert_eq!(history.latest().unwrap().instruction(), "nothing at all");
    }

    #[test]
    fn duplicate_append_is_rejected_and_history_unchanged() {
        let mut history = sample_history();
        let before = history.clone();
        let duplicate = history.iter().nth(1).unwrap().clone();

        let err = history.append(duplicate.clone()).unwrap_err();
        assert!(matches!(err, RevisionError::DuplicateRevision(id) if id == duplicate.id()));
        assert_eq!(history, before);

        // Failing again changes nothing either.
        assert!(history.append(duplicate).is_err());
        assert_eq!(history, before);
    }

    #[test]
    fn serialize_then_load_round_trips() {
        let history = sample_history();
        let loaded = History::load(&history.serialize()).unwrap();

        assert_eq!(loaded.len(), 3);
        let ids: Vec<_> = loaded.iter().map(|r| r.id()).collect();
        let expected: Vec<_> = history.iter().map(|r| r.id()).collect();
        assert_eq!(ids, expected);
        assert_eq!(loaded, history);
    }

    #[test]
    fn serialize_is_deterministic() {
        let history = sample_history();
        assert_eq!(history.serialize(), history.serialize());
        assert_eq!(History::new().serialize(), "[]");
    }

    #[test]
    fn load_rejects_non_sequence() {
        let err = History::load(r#"{"id": "x"}"#).unwrap_err();
        assert!(matches!(err, RevisionError::Deserialization(_)));
        assert!(History::load("not json").is_err());
    }

    #[test]
    fn load_rejects_member_missing_required_field() {
        let serialized = r#"[{
            "id": "0190b3c2-7a10-7cc0-8b8e-0d4a3c7e9f01",
            "original": "a",
            "instruction": "b",
            "created_at": "2024-05-01T12:30:00Z",
            "diff": []
        }]"#;
        let err = History::load(serialized).unwrap_err();
        assert!(matches!(err, RevisionError::Deserialization(msg) if msg.contains("position 0")));
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let history = sample_history();
        let first = history.latest().unwrap();
        let record = serde_json::to_value(RevisionRecord::from_domain(first)).unwrap();
        let serialized = serde_json::to_string(&vec![record.clone(), record]).unwrap();
        assert!(matches!(
            History::load(&serialized),
            Err(RevisionError::Deserialization(_))
        ));
    }

    #[test]
    fn load_repairs_broken_diff() {
        let serialized = r#"[{
            "id": "0190b3c2-7a10-7cc0-8b8e-0d4a3c7e9f01",
            "original": "The cat sat.",
            "suggestion": "The dog sat.",
            "instruction": "swap",
            "created_at": "2024-05-01T12:30:00Z",
            "diff": [{"value": "The ", "kind": "sideways"}]
        }, {
            "id": "0190b3c2-7a10-7cc0-8b8e-0d4a3c7e9f00",
            "original": "old",
            "suggestion": "new",
            "instruction": "swap",
            "created_at": "2024-05-01T12:29:00Z"
        }]"#;
        let history = History::load(serialized).unwrap();
        assert_eq!(history.len(), 2);

        let repaired = history.latest().unwrap();
        assert_eq!(repaired.diff(), compute_diff("The cat sat.", "The dog sat.").as_slice());
        let missing = history.iter().nth(1).unwrap();
        assert_eq!(missing.diff(), compute_diff("old", "new").as_slice());
    }

    #[test]
    fn load_repairs_diff_that_no_longer_matches() {
        let serialized = r#"[{
            "id": "0190b3c2-7a10-7cc0-8b8e-0d4a3c7e9f01",
            "original": "The cat sat.",
            "suggestion": "The dog sat.",
            "instruction": "swap",
            "created_at": "2024-05-01T12:30:00Z",
            "diff": [{"value": "something else", "kind": "unchanged"}]
        }]"#;
        let history = History::load(serialized).unwrap();
        let revision = history.latest().unwrap();
        assert_eq!(forward_text(revision.diff()), "The dog sat.");
    }

    #[test]
    fn load_or_empty_falls_back() {
        assert!(History::load_or_empty("[1, 2, 3]").is_empty());
        let history = sample_history();
        assert_eq!(History::load_or_empty(&history.serialize()), history);
    }

    #[test]
    fn clear_removes_everything() {
        let mut history = sample_history();
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
