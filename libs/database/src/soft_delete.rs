//! Logical deletion as an embeddable capability.
//!
//! An entity that supports soft deletion embeds a [`SoftDelete`] value and
//! implements [`SoftDeletable`]. Reads never filter implicitly: every read
//! path takes a [`ReadScope`] so the caller always states whether deleted
//! rows are wanted.
//!
//! ```
//! use chrono::Utc;
//! use database::soft_delete::{ReadScope, SoftDelete};
//!
//! let mut state = SoftDelete::active();
//! state.mark_deleted(Utc::now());
//! assert!(!ReadScope::Active.matches(&state));
//! assert!(ReadScope::DeletedOnly.matches(&state));
//!
//! state.restore();
//! assert!(ReadScope::Active.matches(&state));
//! assert_eq!(state.deleted_at(), None);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deletion flag and timestamp, kept consistent with each other.
///
/// `is_deleted()` is true exactly when `deleted_at()` is `Some`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SoftDeleteColumns", into = "SoftDeleteColumns")]
pub struct SoftDelete {
    deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete {
    pub fn active() -> Self {
        Self { deleted_at: None }
    }

    /// Rebuild from the stored `deleted_at` column.
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        Self { deleted_at }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
    }

    /// Clear the deletion; a no-op on an entity that was never deleted.
    pub fn restore(&mut self) {
        self.deleted_at = None;
    }
}

/// Wire shape with both columns spelled out
#[derive(Serialize, Deserialize)]
struct SoftDeleteColumns {
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
}

/// The stored flag and timestamp disagree
#[derive(Debug, thiserror::Error)]
#[error("is_deleted = {is_deleted} does not agree with deleted_at")]
pub struct InconsistentSoftDelete {
    pub is_deleted: bool,
}

impl TryFrom<SoftDeleteColumns> for SoftDelete {
    type Error = InconsistentSoftDelete;

    fn try_from(columns: SoftDeleteColumns) -> Result<Self, Self::Error> {
        match (columns.is_deleted, columns.deleted_at) {
            (false, None) => Ok(SoftDelete::active()),
            (true, Some(at)) => Ok(SoftDelete::from_deleted_at(Some(at))),
            (is_deleted, _) => Err(InconsistentSoftDelete { is_deleted }),
        }
    }
}

impl From<SoftDelete> for SoftDeleteColumns {
    fn from(state: SoftDelete) -> Self {
        Self {
            is_deleted: state.is_deleted(),
            deleted_at: state.deleted_at,
        }
    }
}

/// Which rows a read should see
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadScope {
    /// Only rows that are not soft-deleted
    #[default]
    Active,
    /// Every row, deleted or not
    All,
    /// Only soft-deleted rows
    DeletedOnly,
}

impl ReadScope {
    pub fn from_include_deleted(include_deleted: bool) -> Self {
        if include_deleted {
            ReadScope::All
        } else {
            ReadScope::Active
        }
    }

    pub fn matches(&self, state: &SoftDelete) -> bool {
        match self {
            ReadScope::Active => !state.is_deleted(),
            ReadScope::All => true,
            ReadScope::DeletedOnly => state.is_deleted(),
        }
    }

    /// SeaORM condition over the entity's `is_deleted` column.
    #[cfg(feature = "postgres")]
    pub fn condition<C>(&self, is_deleted: C) -> sea_orm::Condition
    where
        C: sea_orm::ColumnTrait,
    {
        use sea_orm::Condition;

        match self {
            ReadScope::Active => Condition::all().add(is_deleted.eq(false)),
            ReadScope::All => Condition::all(),
            ReadScope::DeletedOnly => Condition::all().add(is_deleted.eq(true)),
        }
    }
}

/// How a delete request should be carried out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Flag the row and keep it
    #[default]
    Soft,
    /// Remove the row irreversibly
    Hard,
}

impl DeleteMode {
    pub fn from_hard(hard: bool) -> Self {
        if hard { DeleteMode::Hard } else { DeleteMode::Soft }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, DeleteMode::Hard)
    }
}

/// Entities carrying a [`SoftDelete`] state.
pub trait SoftDeletable {
    fn soft_delete_state(&self) -> &SoftDelete;

    fn soft_delete_state_mut(&mut self) -> &mut SoftDelete;

    fn is_deleted(&self) -> bool {
        self.soft_delete_state().is_deleted()
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.soft_delete_state().deleted_at()
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.soft_delete_state_mut().mark_deleted(now);
    }

    fn restore(&mut self) {
        self.soft_delete_state_mut().restore();
    }

    fn is_visible_in(&self, scope: ReadScope) -> bool {
        scope.matches(self.soft_delete_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bin {
        state: SoftDelete,
    }

    impl SoftDeletable for Bin {
        fn soft_delete_state(&self) -> &SoftDelete {
            &self.state
        }

        fn soft_delete_state_mut(&mut self) -> &mut SoftDelete {
            &mut self.state
        }
    }

    #[test]
    fn test_mark_deleted_sets_flag_and_timestamp() {
        let now = Utc::now();
        let mut bin = Bin { state: SoftDelete::active() };

        bin.mark_deleted(now);

        assert!(bin.is_deleted());
        assert_eq!(bin.deleted_at(), Some(now));
    }

    #[test]
    fn test_restore_clears_flag_and_timestamp() {
        let mut bin = Bin { state: SoftDelete::active() };
        bin.mark_deleted(Utc::now());

        bin.restore();

        assert!(!bin.is_deleted());
        assert_eq!(bin.deleted_at(), None);
    }

    #[test]
    fn test_restore_on_active_entity_is_harmless() {
        let mut bin = Bin { state: SoftDelete::active() };
        bin.restore();
        assert_eq!(bin.state, SoftDelete::active());
    }

    #[test]
    fn test_scopes_partition_rows() {
        let active = SoftDelete::active();
        let deleted = SoftDelete::from_deleted_at(Some(Utc::now()));

        assert!(ReadScope::Active.matches(&active));
        assert!(!ReadScope::Active.matches(&deleted));

        assert!(ReadScope::All.matches(&active));
        assert!(ReadScope::All.matches(&deleted));

        assert!(!ReadScope::DeletedOnly.matches(&active));
        assert!(ReadScope::DeletedOnly.matches(&deleted));
    }

    #[test]
    fn test_include_deleted_flag_maps_to_scope() {
        assert_eq!(ReadScope::from_include_deleted(false), ReadScope::Active);
        assert_eq!(ReadScope::from_include_deleted(true), ReadScope::All);
        assert_eq!(ReadScope::default(), ReadScope::Active);
    }

    #[test]
    fn test_delete_mode_defaults_to_soft() {
        assert_eq!(DeleteMode::default(), DeleteMode::Soft);
        assert!(DeleteMode::from_hard(true).is_hard());
        assert!(!DeleteMode::from_hard(false).is_hard());
    }

    #[test]
    fn test_serializes_both_columns() {
        let json = serde_json::to_value(SoftDelete::active()).unwrap();
        assert_eq!(json, serde_json::json!({"is_deleted": false, "deleted_at": null}));
    }

    #[test]
    fn test_deserialize_rejects_flag_without_timestamp() {
        let result = serde_json::from_value::<SoftDelete>(
            serde_json::json!({"is_deleted": true, "deleted_at": null}),
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("does not agree with deleted_at"), "{}", err);
    }

    #[test]
    fn test_deserialize_rejects_timestamp_without_flag() {
        let result = serde_json::from_value::<SoftDelete>(serde_json::json!({
            "is_deleted": false,
            "deleted_at": "2025-03-01T08:00:00Z",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_consistent_pair() {
        let state: SoftDelete = serde_json::from_value(serde_json::json!({
            "is_deleted": true,
            "deleted_at": "2025-03-01T08:00:00Z",
        }))
        .unwrap();
        assert!(state.is_deleted());
        assert!(state.deleted_at().is_some());
    }

    #[test]
    fn test_scope_deserializes_snake_case() {
        let scope: ReadScope = serde_json::from_str("\"deleted_only\"").unwrap();
        assert_eq!(scope, ReadScope::DeletedOnly);
    }
}
