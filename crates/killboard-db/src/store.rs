//! The storage seam used by the reconciliation engine and aggregation layer.
//!
//! [`KillboardStore`] lists the CRUD primitives both layers need. Methods
//! return `Send` futures so a store can be shared across tasks; concrete
//! implementations are [`PgStore`](crate::PgStore) and
//! [`MemoryStore`](crate::MemoryStore).

use std::collections::BTreeSet;
use std::future::Future;

use killboard_types::{
    Binding, GuildFilter, GuildId, KillEvent, KillerTally, NewBinding, PlayerId, ScopeId,
};

use crate::error::DbError;

/// Persistence primitives for guild bindings and kill events.
pub trait KillboardStore: Send + Sync {
    /// Find the binding owned by `scope`.
    fn find_binding_by_scope(
        &self,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Option<Binding>, DbError>> + Send;

    /// Find the binding of `external_id` owned by `scope`.
    fn find_binding(
        &self,
        external_id: &GuildId,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Option<Binding>, DbError>> + Send;

    /// Insert a new binding and return the stored row.
    ///
    /// Fails with [`DbError::Conflict`] when the scope already owns a binding
    /// or the `(external_id, scope_id)` pair exists.
    fn insert_binding(
        &self,
        binding: &NewBinding,
    ) -> impl Future<Output = Result<Binding, DbError>> + Send;

    /// Delete the binding owned by `scope`. Returns whether a row was removed.
    fn delete_binding(&self, scope: &ScopeId) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Number of scopes currently bound to `external_id`.
    fn count_bindings_for_guild(
        &self,
        external_id: &GuildId,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Delete every event involving `external_id` on either side, except
    /// rows whose other side belongs to another bound guild.
    /// Returns the number of rows removed.
    fn delete_events_by_guild(
        &self,
        external_id: &GuildId,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// The `limit` most recent events involving `external_id`, newest first.
    fn list_recent_events(
        &self,
        external_id: &GuildId,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<KillEvent>, DbError>> + Send;

    /// Insert one event. Fails with [`DbError::Conflict`] on a duplicate `event_id`.
    fn insert_event(&self, event: &KillEvent) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Delete the events `killer` scored for `external_id`.
    /// Returns the number of rows removed.
    fn delete_events_by_killer(
        &self,
        external_id: &GuildId,
        killer: &PlayerId,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Distinct killer ids over events scored for `external_id`.
    fn distinct_killer_ids(
        &self,
        external_id: &GuildId,
    ) -> impl Future<Output = Result<BTreeSet<PlayerId>, DbError>> + Send;

    /// Kill counts grouped by killer name, highest first, ties by name.
    fn top_killers(
        &self,
        filter: &GuildFilter,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<KillerTally>, DbError>> + Send;

    /// Sum of `kill_fame` over matching events; `0` when there are none.
    fn total_fame(&self, filter: &GuildFilter) -> impl Future<Output = Result<i64, DbError>> + Send;
}
