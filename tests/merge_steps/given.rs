//! Given steps for calendar merge BDD scenarios.

use super::world::{scenario_calendar, scenario_object, MergeWorld};
use almanac::federation::domain::OperationKind;
use rstest_bdd_macros::given;

#[given("a backend without native merge support")]
fn backend_without_merge(world: &mut MergeWorld) -> Result<(), eyre::Report> {
    world.activate_backend(OperationKind::ALL.into_iter().filter(|kind| {
        !matches!(
            kind,
            OperationKind::MergeCalendars | OperationKind::MoveObject
        )
    }))
}

#[given("a backend without native delete support")]
fn backend_without_delete(world: &mut MergeWorld) -> Result<(), eyre::Report> {
    world.activate_backend(
        OperationKind::ALL
            .into_iter()
            .filter(|kind| *kind != OperationKind::DeleteCalendar),
    )
}

#[given("no activated backends")]
fn no_activated_backends(world: &mut MergeWorld) {
    let _ = world;
}

#[given(r#"the calendar "{name}" containing objects "{first}" and "{second}""#)]
fn calendar_with_objects(
    world: &mut MergeWorld,
    name: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let backend = world.backend()?;
    backend
        .seed_calendar(scenario_calendar(&name)?)
        .map_err(|err| eyre::eyre!("seeding calendar failed: {err}"))?;
    for uid in [first, second] {
        backend
            .seed_object(&name, scenario_object(&uid)?)
            .map_err(|err| eyre::eyre!("seeding object failed: {err}"))?;
    }
    Ok(())
}

#[given(r#"the empty calendar "{name}""#)]
fn empty_calendar(world: &mut MergeWorld, name: String) -> Result<(), eyre::Report> {
    world
        .backend()?
        .seed_calendar(scenario_calendar(&name)?)
        .map_err(|err| eyre::eyre!("seeding calendar failed: {err}"))
}
