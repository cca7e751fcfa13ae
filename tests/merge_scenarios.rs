//! Behaviour tests for calendar merge and degraded deletion.

mod merge_steps;

use merge_steps::world::{world, MergeWorld};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/calendar_merge.feature",
    name = "Merge a calendar without native backend support"
)]
#[tokio::test(flavor = "multi_thread")]
async fn merge_without_native_support(world: MergeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/calendar_merge.feature",
    name = "Degraded delete hides a calendar"
)]
#[tokio::test(flavor = "multi_thread")]
async fn degraded_delete_hides(world: MergeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/calendar_merge.feature",
    name = "Unknown backends fail with a typed error"
)]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_backend_is_typed(world: MergeWorld) {
    let _ = world;
}
