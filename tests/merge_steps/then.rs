//! Then steps for calendar merge BDD scenarios.

use super::world::{owner, run_async, scenario_calendar_id, MergeWorld};
use almanac::federation::services::{CalendarFilter, FederationError, RegistryError};
use rstest_bdd_macros::then;

#[then("the merge report is complete")]
fn merge_report_is_complete(world: &MergeWorld) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing merge report in scenario world"))?;
    if !report.is_complete() {
        return Err(eyre::eyre!("expected a complete merge, got {report:?}"));
    }
    Ok(())
}

#[then(r#"calendar "{name}" contains objects "{first}" and "{second}""#)]
fn calendar_contains_objects(
    world: &mut MergeWorld,
    name: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let id = scenario_calendar_id(&name)?;
    let objects = run_async(world.federation.list_objects(&id))
        .map_err(|err| eyre::eyre!("listing failed: {err}"))?;
    let uids: Vec<&str> = objects.iter().map(|object| object.uid()).collect();
    if uids != [first.as_str(), second.as_str()] {
        return Err(eyre::eyre!(
            "expected '{name}' to contain [{first}, {second}], found {uids:?}"
        ));
    }
    Ok(())
}

#[then(r#"calendar "{name}" is no longer listed"#)]
fn calendar_is_not_listed(world: &mut MergeWorld, name: String) -> Result<(), eyre::Report> {
    let user = owner()?;
    let listed = run_async(
        world
            .federation
            .list_calendars(&user, &CalendarFilter::new().with_active_only()),
    )
    .map_err(|err| eyre::eyre!("listing failed: {err}"))?;
    let uri = scenario_calendar_id(&name)?.to_string();
    if listed.iter().any(|calendar| calendar.uri() == uri) {
        return Err(eyre::eyre!("expected '{uri}' to be absent from listings"));
    }
    Ok(())
}

#[then("the deletion reports success")]
fn deletion_reports_success(world: &MergeWorld) -> Result<(), eyre::Report> {
    match world.last_delete {
        Some(true) => Ok(()),
        Some(false) => Err(eyre::eyre!("deletion reported failure")),
        None => Err(eyre::eyre!("missing deletion result in scenario world")),
    }
}

#[then("the lookup fails with backend-not-found")]
fn lookup_fails_with_backend_not_found(world: &MergeWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_fetch
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing fetch result in scenario world"))?;
    if !matches!(
        result,
        Err(FederationError::Registry(RegistryError::BackendNotFound(_)))
    ) {
        return Err(eyre::eyre!("expected backend-not-found, got {result:?}"));
    }
    Ok(())
}
