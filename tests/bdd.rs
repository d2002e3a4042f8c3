use std::{fmt, sync::Arc};

use anyhow::Context;
use chrono::NaiveDate;
use cucumber::{given, then, when, World as _};
use logbook::{
    clock::{Clock, FixedClock},
    config::AppConfig,
    error::{AppError, Outcome, UseCaseError},
    models::{
        settings::ThemeMode,
        trip::{Trip, TripId, TripStatus},
        trip_group::TripGroup,
    },
    state::Logbook,
    usecases::{
        delete::delete_trip_group,
        edit,
        outward::{finish_outward, start_outward, StartOutward},
        return_trip::{cancel_return, finish_return, start_return},
        session::resume_ongoing_session,
        trip_type::decide_trip_type,
    },
};
use tempfile::TempDir;

const START_MILLIS: i64 = 1_714_550_400_000; // 2024-05-01T08:00:00Z
const MINUTE: i64 = 60_000;

#[derive(Debug, cucumber::World, Default)]
struct LogbookWorld {
    state: Option<TestState>,
    outward_id: Option<TripId>,
    earlier_outward_id: Option<TripId>,
    return_id: Option<TripId>,
    noted_group: Option<TripGroup>,
    last_error: Option<UseCaseError>,
    last_succeeded: bool,
    resumed: Option<Trip>,
}

impl LogbookWorld {
    fn logbook(&self) -> &Logbook {
        &self
            .state
            .as_ref()
            .expect("state must be initialised first")
            .logbook
    }

    fn clock(&self) -> &FixedClock {
        &self
            .state
            .as_ref()
            .expect("state must be initialised first")
            .clock
    }

    fn outward_id(&self) -> TripId {
        self.outward_id.expect("an outward trip must exist")
    }

    fn return_id(&self) -> TripId {
        self.return_id.expect("a return trip must exist")
    }

    fn record<T>(&mut self, outcome: Outcome<T>) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.last_succeeded = true;
                self.last_error = None;
                Some(value)
            }
            Err(err) => {
                self.last_succeeded = false;
                self.last_error = Some(err);
                None
            }
        }
    }

    fn latest_group(&self) -> TripGroup {
        self.logbook()
            .feed()
            .groups()
            .into_iter()
            .next()
            .expect("at least one seance expected")
    }

    async fn trip(&self, id: TripId) -> Trip {
        self.logbook()
            .trips
            .get_by_id(id)
            .await
            .expect("load trip")
            .expect("trip exists")
    }
}

struct TestState {
    logbook: Logbook,
    clock: Arc<FixedClock>,
    config: AppConfig,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        let config = AppConfig {
            database_url: format!("sqlite://{}", db_path.to_string_lossy()),
            preferences_path: root.path().join("prefs").join("preferences.json"),
            max_connections: 1,
        };
        let clock = Arc::new(FixedClock::new(START_MILLIS));
        let logbook = Logbook::open(&config, clock.clone()).await?;
        Ok(Self {
            logbook,
            clock,
            config,
            _root: root,
        })
    }

    async fn reopen(&mut self) -> anyhow::Result<()> {
        self.logbook = Logbook::open(&self.config, self.clock.clone()).await?;
        Ok(())
    }
}

#[given("an empty logbook")]
async fn given_empty_logbook(world: &mut LogbookWorld) {
    world.state = Some(TestState::new().await.expect("state"));
}

#[given(regex = r#"^an outward trip started at (\d+) km from "([^"]*)"$"#)]
async fn given_outward_started(world: &mut LogbookWorld, km: i32, place: String) {
    start_outward_trip(world, km, place, "1".into()).await;
    assert!(world.last_succeeded, "start failed: {:?}", world.last_error);
    world.clock().advance(10 * MINUTE);
}

#[given(regex = r"^a running trip was stored directly at (\d+) km$")]
async fn given_running_trip_stored(world: &mut LogbookWorld, km: i32) {
    let clock = world.clock();
    let trip = Trip::outward(km, "Depot", clock.now_millis(), clock.today());
    world
        .logbook()
        .trips
        .insert(&trip)
        .await
        .expect("insert running trip");
}

#[given(regex = r"^a finished simple trip from (\d+) km to (\d+) km$")]
async fn given_finished_simple_trip(world: &mut LogbookWorld, start_km: i32, end_km: i32) {
    start_outward_trip(world, start_km, "Paris".into(), "1".into()).await;
    world.clock().advance(20 * MINUTE);
    let outcome = finish_outward(world.logbook(), world.outward_id(), end_km, "Lyon", false).await;
    world.record(outcome);
    decide(world, false).await;
    assert!(world.last_succeeded, "setup failed: {:?}", world.last_error);
}

#[when(regex = r"^(\d+) minutes pass$")]
async fn when_minutes_pass(world: &mut LogbookWorld, minutes: i64) {
    world.clock().advance(minutes * MINUTE);
}

#[when(regex = r#"^I start an outward trip at (-?\d+) km from "([^"]*)" with guide "([^"]*)"$"#)]
async fn when_start_outward(world: &mut LogbookWorld, km: i32, place: String, guide: String) {
    start_outward_trip(world, km, place, guide).await;
}

async fn start_outward_trip(world: &mut LogbookWorld, km: i32, place: String, guide: String) {
    let outcome = start_outward(
        world.logbook(),
        StartOutward {
            start_km: km,
            start_place: place,
            conditions: String::new(),
            guide,
        },
    )
    .await;
    if let Some(id) = world.record(outcome) {
        world.earlier_outward_id = world.outward_id.replace(id);
        world.return_id = None;
    }
}

#[when(regex = r#"^I finish the outward trip at (-?\d+) km in "([^"]*)"$"#)]
async fn when_finish_outward(world: &mut LogbookWorld, km: i32, place: String) {
    let outcome = finish_outward(world.logbook(), world.outward_id(), km, &place, false).await;
    world.record(outcome);
}

#[when(regex = r#"^I confirm finishing the outward trip at (-?\d+) km in "([^"]*)"$"#)]
async fn when_confirm_finish_outward(world: &mut LogbookWorld, km: i32, place: String) {
    let outcome = finish_outward(world.logbook(), world.outward_id(), km, &place, true).await;
    world.record(outcome);
}

#[when("I prepare the return trip")]
async fn when_prepare_return(world: &mut LogbookWorld) {
    decide(world, true).await;
}

#[when("I close the trip without return")]
async fn when_close_without_return(world: &mut LogbookWorld) {
    decide(world, false).await;
}

#[when("I prepare the return trip for the earlier outward trip")]
async fn when_prepare_earlier_return(world: &mut LogbookWorld) {
    let earlier = world
        .earlier_outward_id
        .expect("an earlier outward trip must exist");
    decide_for(world, earlier, true).await;
}

async fn decide(world: &mut LogbookWorld, prepare_return: bool) {
    let outward_id = world.outward_id();
    decide_for(world, outward_id, prepare_return).await;
}

async fn decide_for(world: &mut LogbookWorld, outward_id: TripId, prepare_return: bool) {
    let outcome = decide_trip_type(world.logbook(), outward_id, prepare_return).await;
    if let Some(id) = world.record(outcome) {
        world.return_id = Some(id);
    }
}

#[when("I start the return trip")]
async fn when_start_return(world: &mut LogbookWorld) {
    let outcome = start_return(world.logbook(), world.return_id(), None).await;
    world.record(outcome);
}

#[when(regex = r"^I start the return trip at (-?\d+) km$")]
async fn when_start_return_at(world: &mut LogbookWorld, km: i32) {
    let outcome = start_return(world.logbook(), world.return_id(), Some(km)).await;
    world.record(outcome);
}

#[when(regex = r"^I finish the return trip at (-?\d+) km$")]
async fn when_finish_return(world: &mut LogbookWorld, km: i32) {
    let outcome = finish_return(world.logbook(), world.return_id(), km, false).await;
    world.record(outcome);
}

#[when(regex = r"^I confirm finishing the return trip at (-?\d+) km$")]
async fn when_confirm_finish_return(world: &mut LogbookWorld, km: i32) {
    let outcome = finish_return(world.logbook(), world.return_id(), km, true).await;
    world.record(outcome);
}

#[when("I cancel the return trip")]
async fn when_cancel_return(world: &mut LogbookWorld) {
    let outcome = cancel_return(world.logbook(), world.return_id()).await;
    world.record(outcome);
}

#[when(regex = r"^I edit the outward trip (start|end) km to (-?\d+)$")]
async fn when_edit_km(world: &mut LogbookWorld, field: String, km: i32) {
    let id = world.outward_id();
    let outcome = match field.as_str() {
        "start" => edit::edit_start_km(world.logbook(), id, km).await,
        _ => edit::edit_end_km(world.logbook(), id, km).await,
    };
    world.record(outcome);
}

#[when(regex = r"^I edit the return trip (start|end) km to (-?\d+)$")]
async fn when_edit_return_km(world: &mut LogbookWorld, field: String, km: i32) {
    let id = world.return_id();
    let outcome = match field.as_str() {
        "start" => edit::edit_start_km(world.logbook(), id, km).await,
        _ => edit::edit_end_km(world.logbook(), id, km).await,
    };
    world.record(outcome);
}

#[when(regex = r#"^I edit the conditions of both legs to "([^"]*)" and "([^"]*)" at the same time$"#)]
async fn when_edit_both_conditions(world: &mut LogbookWorld, outward: String, back: String) {
    let logbook = world.logbook();
    let (first, second) = tokio::join!(
        edit::edit_conditions(logbook, world.outward_id(), &outward),
        edit::edit_conditions(logbook, world.return_id(), &back),
    );
    let outcome = first.and(second);
    world.record(outcome);
}

#[when(regex = r"^I edit trip (\d+) end km to (\d+)$")]
async fn when_edit_trip_end_km(world: &mut LogbookWorld, id: TripId, km: i32) {
    let outcome = edit::edit_end_km(world.logbook(), id, km).await;
    world.record(outcome);
}

#[when(regex = r"^I edit the outward trip end time to (\d+) minutes from now$")]
async fn when_edit_end_time_future(world: &mut LogbookWorld, minutes: i64) {
    let end_time = world.clock().now_millis() + minutes * MINUTE;
    let outcome = edit::edit_end_time(world.logbook(), world.outward_id(), end_time).await;
    world.record(outcome);
}

#[when(regex = r"^I edit the outward trip (start|end) time to (\d+) minutes before its start$")]
async fn when_edit_time_before_start(world: &mut LogbookWorld, field: String, minutes: i64) {
    let id = world.outward_id();
    let trip = world.trip(id).await;
    let ts = trip.start_time - minutes * MINUTE;
    let outcome = match field.as_str() {
        "start" => edit::edit_start_time(world.logbook(), id, ts).await,
        _ => edit::edit_end_time(world.logbook(), id, ts).await,
    };
    world.record(outcome);
}

#[when(regex = r#"^I edit the outward trip conditions to "([^"]*)"$"#)]
async fn when_edit_conditions(world: &mut LogbookWorld, conditions: String) {
    let outcome = edit::edit_conditions(world.logbook(), world.outward_id(), &conditions).await;
    world.record(outcome);
}

#[when(regex = r"^I edit the outward trip conditions to (\d+) characters$")]
async fn when_edit_long_conditions(world: &mut LogbookWorld, len: usize) {
    let conditions = "x".repeat(len);
    let outcome = edit::edit_conditions(world.logbook(), world.outward_id(), &conditions).await;
    world.record(outcome);
}

#[when(regex = r#"^I edit the outward trip date to "([^"]*)"$"#)]
async fn when_edit_date(world: &mut LogbookWorld, raw: String) {
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").expect("iso date");
    let outcome = edit::edit_date(world.logbook(), world.outward_id(), date).await;
    world.record(outcome);
}

#[when("I delete the latest seance")]
async fn when_delete_latest_seance(world: &mut LogbookWorld) {
    let group = world.latest_group();
    let outcome = delete_trip_group(world.logbook(), &group).await;
    world.record(outcome);
}

#[when("I note the latest seance")]
async fn when_note_latest_seance(world: &mut LogbookWorld) {
    world.noted_group = Some(world.latest_group());
}

#[when("I delete the noted seance")]
async fn when_delete_noted_seance(world: &mut LogbookWorld) {
    let group = world.noted_group.clone().expect("a seance must be noted");
    let outcome = delete_trip_group(world.logbook(), &group).await;
    world.record(outcome);
}

#[when("I delete the return trip directly")]
async fn when_delete_return_directly(world: &mut LogbookWorld) {
    let trip = world.trip(world.return_id()).await;
    world
        .logbook()
        .trips
        .delete(&trip)
        .await
        .expect("delete trip");
}

#[when("I delete the outward trip directly")]
async fn when_delete_outward_directly(world: &mut LogbookWorld) {
    let trip = world.trip(world.outward_id()).await;
    world
        .logbook()
        .trips
        .delete(&trip)
        .await
        .expect("delete trip");
}

#[when("I resume the ongoing session")]
async fn when_resume(world: &mut LogbookWorld) {
    let outcome = resume_ongoing_session(world.logbook()).await;
    world.resumed = world.record(outcome).flatten();
}

#[when(regex = r"^I set the theme mode to (Dynamic|Light|Dark)$")]
async fn when_set_theme(world: &mut LogbookWorld, mode: String) {
    world
        .logbook()
        .preferences
        .set_theme_mode(parse_theme(&mode))
        .await
        .expect("set theme");
}

#[when(regex = r#"^I set the default guide to "([^"]*)"$"#)]
async fn when_set_default_guide(world: &mut LogbookWorld, guide: String) {
    world
        .logbook()
        .preferences
        .set_default_guide(&guide)
        .await
        .expect("set default guide");
}

#[when("I turn off delete confirmation")]
async fn when_turn_off_delete_confirmation(world: &mut LogbookWorld) {
    world
        .logbook()
        .preferences
        .set_show_delete_confirmation(false)
        .await
        .expect("set delete confirmation");
}

#[when("I reset the settings")]
async fn when_reset_settings(world: &mut LogbookWorld) {
    world
        .logbook()
        .preferences
        .reset_settings()
        .await
        .expect("reset settings");
}

#[when("I reopen the logbook")]
async fn when_reopen(world: &mut LogbookWorld) {
    world
        .state
        .as_mut()
        .expect("state must be initialised first")
        .reopen()
        .await
        .expect("reopen");
}

#[then("the last action succeeded")]
async fn then_succeeded(world: &mut LogbookWorld) {
    assert!(world.last_succeeded, "unexpected error: {:?}", world.last_error);
}

#[then(regex = r#"^the last action failed with a message mentioning "([^"]*)"$"#)]
async fn then_failed_with_message(world: &mut LogbookWorld, fragment: String) {
    let err = world.last_error.as_ref().expect("an error was expected");
    assert!(!err.is_km_inconsistency(), "unexpected km inconsistency");
    assert!(
        err.message().contains(&fragment),
        "{:?} does not mention {fragment:?}",
        err.message()
    );
}

#[then(regex = r"^the last action failed with a km inconsistency from (\d+) to (-?\d+)$")]
async fn then_km_inconsistency(world: &mut LogbookWorld, start_km: i32, end_km: i32) {
    let err = world.last_error.as_ref().expect("an error was expected");
    let inconsistency = err
        .km_inconsistency()
        .unwrap_or_else(|| panic!("expected a km inconsistency, got {err:?}"));
    assert_eq!(inconsistency.start_km, start_km);
    assert_eq!(inconsistency.end_km, end_km);
}

#[then("the last action failed because the trip does not exist")]
async fn then_not_found(world: &mut LogbookWorld) {
    let err = world.last_error.as_ref().expect("an error was expected");
    assert!(matches!(err, UseCaseError::NotFound(_)), "got {err:?}");
}

#[then("the last action failed because a trip was already gone from storage")]
async fn then_storage_not_found(world: &mut LogbookWorld) {
    let err = world.last_error.as_ref().expect("an error was expected");
    assert!(
        matches!(err, UseCaseError::Unexpected(AppError::NotFound)),
        "got {err:?}"
    );
}

#[then(regex = r"^the driving state is ([A-Z_]+)$")]
async fn then_driving_state(world: &mut LogbookWorld, expected: String) {
    assert_eq!(world.logbook().feed().driving_state().as_str(), expected);
}

#[then(regex = r"^the outward trip has status ([A-Z]+) and end km (\d+)$")]
async fn then_outward_status(world: &mut LogbookWorld, status: String, end_km: i32) {
    let trip = world.trip(world.outward_id()).await;
    let expected: TripStatus = status.parse().expect("status");
    assert_eq!(trip.status, expected);
    assert_eq!(trip.end_km, Some(end_km));
}

#[then(regex = r"^the logbook stores (\d+) trips?$")]
async fn then_stored_trips(world: &mut LogbookWorld, expected: usize) {
    let trips = world.logbook().trips.list_all().await.expect("list trips");
    assert_eq!(trips.len(), expected);
}

#[then(regex = r"^the logbook has (\d+) seances?$")]
async fn then_seance_count(world: &mut LogbookWorld, expected: usize) {
    assert_eq!(world.logbook().feed().groups().len(), expected);
    assert_eq!(world.logbook().feed().summary().seance_count, expected);
}

#[then(regex = r"^the latest seance is number (\d+) with (\d+) km$")]
async fn then_latest_seance(world: &mut LogbookWorld, number: u32, km: i32) {
    let group = world.latest_group();
    assert_eq!(group.seance_number, number);
    assert_eq!(group.total_kms(), km);
}

#[then("the latest seance has a return")]
async fn then_latest_has_return(world: &mut LogbookWorld) {
    assert!(world.latest_group().has_return());
}

#[then("the latest seance has no return")]
async fn then_latest_has_no_return(world: &mut LogbookWorld) {
    assert!(!world.latest_group().has_return());
}

#[then("the latest seance has a skipped return")]
async fn then_latest_has_skipped_return(world: &mut LogbookWorld) {
    let group = world.latest_group();
    let status = group.return_trip.as_ref().map(|t| t.status);
    assert_eq!(status, Some(TripStatus::Skipped));
}

#[then("the latest seance is complete")]
async fn then_latest_complete(world: &mut LogbookWorld) {
    assert!(world.latest_group().is_complete());
}

#[then(regex = r"^the logbook stores (\d+) running return trips?$")]
async fn then_running_returns(world: &mut LogbookWorld, expected: usize) {
    let trips = world.logbook().trips.list_all().await.expect("list trips");
    let running = trips
        .iter()
        .filter(|t| t.is_return && t.status == TripStatus::Active)
        .count();
    assert_eq!(running, expected);
}

#[then(regex = r"^the return trip starts at (\d+) km$")]
async fn then_return_start_km(world: &mut LogbookWorld, km: i32) {
    assert_eq!(world.trip(world.return_id()).await.start_km, km);
}

#[then(regex = r#"^the (outward|return) trip conditions are "([^"]*)"$"#)]
async fn then_leg_conditions(world: &mut LogbookWorld, which: String, conditions: String) {
    let id = match which.as_str() {
        "outward" => world.outward_id(),
        _ => world.return_id(),
    };
    assert_eq!(world.trip(id).await.conditions, conditions);
}

#[then("the trip feed matches the stored trips")]
async fn then_feed_matches_storage(world: &mut LogbookWorld) {
    let stored = world.logbook().trips.list_all().await.expect("list trips");
    assert_eq!(world.logbook().feed().snapshot(), stored);
}

#[then("the latest seance matches the stored trips")]
async fn then_latest_matches_storage(world: &mut LogbookWorld) {
    let group = world.latest_group();
    for member in group.trips() {
        assert_eq!(&world.trip(member.id).await, member);
    }
}

#[then(regex = r"^the ongoing session points at the (outward|return) trip$")]
async fn then_ongoing_points_at(world: &mut LogbookWorld, which: String) {
    let expected = match which.as_str() {
        "outward" => world.outward_id(),
        _ => world.return_id(),
    };
    let ongoing = world
        .logbook()
        .preferences
        .ongoing_session_id()
        .await
        .expect("read ongoing session");
    assert_eq!(ongoing, Some(expected));
    assert_eq!(
        *world.logbook().preferences.observe_ongoing_session_id().borrow(),
        Some(expected)
    );
}

#[then("there is no ongoing session")]
async fn then_no_ongoing(world: &mut LogbookWorld) {
    let ongoing = world
        .logbook()
        .preferences
        .ongoing_session_id()
        .await
        .expect("read ongoing session");
    assert_eq!(ongoing, None);
}

#[then("the outward trip is resumed")]
async fn then_outward_resumed(world: &mut LogbookWorld) {
    let resumed = world.resumed.as_ref().expect("a trip should be resumed");
    assert_eq!(resumed.id, world.outward_id());
}

#[then("there is nothing to resume")]
async fn then_nothing_resumed(world: &mut LogbookWorld) {
    assert!(world.last_succeeded, "unexpected error: {:?}", world.last_error);
    assert!(world.resumed.is_none());
}

#[then(regex = r"^the theme mode is (Dynamic|Light|Dark)$")]
async fn then_theme(world: &mut LogbookWorld, mode: String) {
    let settings = world.logbook().preferences.settings().await.expect("settings");
    assert_eq!(settings.theme_mode, parse_theme(&mode));
    assert_eq!(
        world.logbook().preferences.observe_settings().borrow().theme_mode,
        parse_theme(&mode)
    );
}

#[then(regex = r#"^the default guide is "([^"]*)"$"#)]
async fn then_default_guide(world: &mut LogbookWorld, guide: String) {
    let settings = world.logbook().preferences.settings().await.expect("settings");
    assert_eq!(settings.default_guide, guide);
}

#[then("delete confirmation is on")]
async fn then_delete_confirmation_on(world: &mut LogbookWorld) {
    let settings = world.logbook().preferences.settings().await.expect("settings");
    assert!(settings.show_delete_confirmation);
}

fn parse_theme(raw: &str) -> ThemeMode {
    match raw {
        "Light" => ThemeMode::Light,
        "Dark" => ThemeMode::Dark,
        _ => ThemeMode::Dynamic,
    }
}

#[tokio::main]
async fn main() {
    LogbookWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run_and_exit("tests/features")
        .await;
}
