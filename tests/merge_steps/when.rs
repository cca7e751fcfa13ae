//! When steps for calendar merge BDD scenarios.

use super::world::{run_async, scenario_calendar_id, MergeWorld};
use almanac::federation::domain::CalendarId;
use rstest_bdd_macros::when;

#[when(r#""{source}" is merged into "{destination}""#)]
fn merge_into(
    world: &mut MergeWorld,
    source: String,
    destination: String,
) -> Result<(), eyre::Report> {
    let source_id = scenario_calendar_id(&source)?;
    let destination_id = scenario_calendar_id(&destination)?;
    let report = run_async(
        world
            .engine
            .merge_calendars(&destination_id, std::slice::from_ref(&source_id)),
    )
    .map_err(|err| eyre::eyre!("merge failed: {err}"))?;
    world.last_report = Some(report);
    Ok(())
}

#[when(r#"calendar "{name}" is deleted"#)]
fn delete_calendar(world: &mut MergeWorld, name: String) -> Result<(), eyre::Report> {
    let id = scenario_calendar_id(&name)?;
    let deleted = run_async(world.federation.delete_calendar(&id))
        .map_err(|err| eyre::eyre!("deletion failed: {err}"))?;
    world.last_delete = Some(deleted);
    Ok(())
}

#[when(r#"calendar "{id}" is fetched"#)]
fn fetch_calendar(world: &mut MergeWorld, id: String) -> Result<(), eyre::Report> {
    let calendar_id =
        CalendarId::parse(&id).map_err(|err| eyre::eyre!("invalid identifier: {err}"))?;
    world.last_fetch = Some(run_async(world.federation.get_calendar(&calendar_id)));
    Ok(())
}
