//! Merge and move emulation composed from dispatcher primitives.
//!
//! When source and destination live on one backend that merges natively,
//! the engine delegates. Everything else is decomposed into dispatcher
//! calls: fetch, create in destination, delete from source. The
//! decomposition is best-effort and not transactional; partial failure
//! leaves a source partially drained and is reported, never rolled back.

use std::sync::Arc;

use crate::federation::domain::{CalendarId, ObjectId};
use crate::federation::ports::{CacheGate, OperationLog};
use crate::federation::services::dispatcher::{
    CalendarFederationService, FederationError, FederationResult,
};

/// How a source calendar was merged into the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The owning backend performed the merge natively.
    Delegated,
    /// The federation layer moved objects one at a time.
    Emulated,
}

/// Outcome of merging one source calendar.
#[derive(Debug, Clone)]
pub struct SourceMergeOutcome {
    /// The source calendar this outcome describes.
    pub source: CalendarId,
    /// Strategy used for this source.
    pub strategy: MergeStrategy,
    /// Objects moved into the destination before completion or failure.
    /// Always zero for delegated merges.
    pub moved_objects: usize,
    /// Failure that stopped this source, if any. Objects moved before the
    /// failure stay moved.
    pub failure: Option<String>,
}

impl SourceMergeOutcome {
    /// Reports whether this source was fully merged.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Report for a multi-source merge, in caller-supplied source order.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Per-source outcomes.
    pub outcomes: Vec<SourceMergeOutcome>,
}

impl MergeReport {
    /// Reports whether every source was fully merged.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(SourceMergeOutcome::is_complete)
    }
}

/// Merge/move engine over the federation dispatcher.
#[derive(Clone)]
pub struct CalendarMergeService<G, L>
where
    G: CacheGate,
    L: OperationLog,
{
    federation: Arc<CalendarFederationService<G, L>>,
}

impl<G, L> CalendarMergeService<G, L>
where
    G: CacheGate,
    L: OperationLog,
{
    /// Creates an engine over the given dispatcher.
    #[must_use]
    pub const fn new(federation: Arc<CalendarFederationService<G, L>>) -> Self {
        Self { federation }
    }

    /// Moves one object, delegating natively when possible and emulating
    /// the move as create-then-delete otherwise.
    ///
    /// `Ok(false)` covers every incomplete outcome: a backend that
    /// attempted and failed, a source object that no longer exists, or a
    /// destination that rejected the copy. The emulated path is
    /// best-effort: a source delete failing after the copy leaves the
    /// object in both calendars.
    ///
    /// # Errors
    ///
    /// Identifier and registry failures, and a destination backend without
    /// object creation, surface as typed errors.
    pub async fn move_object(
        &self,
        id: &ObjectId,
        destination: &CalendarId,
    ) -> FederationResult<bool> {
        match self.federation.move_object(id, destination).await {
            Ok(moved) => Ok(moved),
            Err(FederationError::UnsupportedOperation { .. }) => {
                self.emulate_move(id, destination).await
            }
            Err(err) => Err(err),
        }
    }

    /// Merges the source calendars into the destination, in the order
    /// supplied.
    ///
    /// Each source is merged natively when co-located with the destination
    /// on a backend that supports merge, and by object-by-object
    /// decomposition otherwise: enumerate, fetch, create in destination,
    /// delete from source, and finally delete the drained source calendar
    /// (the degraded hide path counts as deletion). The first failed move
    /// stops that source and is reported in its outcome; earlier moves are
    /// not unwound, and remaining sources are still processed.
    ///
    /// # Errors
    ///
    /// Returns a typed failure only when the destination backend cannot be
    /// resolved; per-source failures live in the report.
    pub async fn merge_calendars(
        &self,
        destination: &CalendarId,
        sources: &[CalendarId],
    ) -> FederationResult<MergeReport> {
        // Resolving the destination up front keeps a mistyped destination
        // from draining sources into nowhere.
        self.federation.get_calendar(destination).await?;

        let mut report = MergeReport::default();
        for source in sources {
            let outcome = match self.merge_source(destination, source).await {
                Ok(outcome) => outcome,
                Err(err) => SourceMergeOutcome {
                    source: source.clone(),
                    strategy: MergeStrategy::Emulated,
                    moved_objects: 0,
                    failure: Some(err.to_string()),
                },
            };
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    async fn merge_source(
        &self,
        destination: &CalendarId,
        source: &CalendarId,
    ) -> FederationResult<SourceMergeOutcome> {
        match self.federation.merge_calendar(destination, source).await {
            Ok(merged) => Ok(SourceMergeOutcome {
                source: source.clone(),
                strategy: MergeStrategy::Delegated,
                moved_objects: 0,
                failure: (!merged).then(|| "backend reported merge failure".to_owned()),
            }),
            Err(FederationError::UnsupportedOperation { .. }) => {
                self.emulate_merge(destination, source).await
            }
            Err(err) => Err(err),
        }
    }

    async fn emulate_merge(
        &self,
        destination: &CalendarId,
        source: &CalendarId,
    ) -> FederationResult<SourceMergeOutcome> {
        // A source whose calendar cannot be fetched is reported, not
        // drained: a failing backend answers listings with nothing, and
        // deleting a calendar on the strength of an empty error-listing
        // would destroy data.
        if self.federation.get_calendar(source).await?.is_none() {
            return Ok(failed_outcome(source, 0, "source calendar not found"));
        }

        let objects = self.federation.list_objects(source).await?;
        let mut moved = 0_usize;
        for object in &objects {
            let object_id = source.object(object.uid())?;
            match self.move_object(&object_id, destination).await {
                Ok(true) => moved += 1,
                Ok(false) => {
                    return Ok(failed_outcome(
                        source,
                        moved,
                        format!("failed to move object '{}'", object.uid()),
                    ));
                }
                Err(err) => return Ok(failed_outcome(source, moved, err.to_string())),
            }
        }

        let deleted = self.federation.delete_calendar(source).await?;
        Ok(SourceMergeOutcome {
            source: source.clone(),
            strategy: MergeStrategy::Emulated,
            moved_objects: moved,
            failure: (!deleted).then(|| "failed to delete drained source calendar".to_owned()),
        })
    }

    async fn emulate_move(
        &self,
        id: &ObjectId,
        destination: &CalendarId,
    ) -> FederationResult<bool> {
        let Some(object) = self.federation.find_object(id).await? else {
            return Ok(false);
        };
        let created = self
            .federation
            .create_object(destination, &object.as_data())
            .await?;
        if created.is_none() {
            return Ok(false);
        }
        self.federation.delete_object(id).await
    }
}

fn failed_outcome(
    source: &CalendarId,
    moved_objects: usize,
    failure: impl Into<String>,
) -> SourceMergeOutcome {
    SourceMergeOutcome {
        source: source.clone(),
        strategy: MergeStrategy::Emulated,
        moved_objects,
        failure: Some(failure.into()),
    }
}
