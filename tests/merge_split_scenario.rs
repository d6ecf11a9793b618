//! End-to-end merge/split scenario driven through dispatcher commands.
use ball_merger::core::components::{
    AggregateChildren, Ball, BallColor, BallDiameter, BallState, GridPos,
};
use ball_merger::core::config::GameConfig;
use ball_merger::gameplay::spawn::ball_bundle;
use ball_merger::interaction::aggregate::{BallSplit, BallsMerged};
use ball_merger::interaction::dispatcher::{
    dispatch_events, EventPayload, InputDispatcher, MERGE_COMMAND, SPLIT_COMMAND,
};
use ball_merger::interaction::select::register_selection_handlers;
use bevy::prelude::*;

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(GameConfig::default());
    app.init_resource::<InputDispatcher>();
    app.add_event::<BallsMerged>();
    app.add_event::<BallSplit>();
    app.add_systems(Startup, register_selection_handlers);
    app.add_systems(Update, dispatch_events);
    app
}

fn spawn_ball(app: &mut App, pos: Vec2, diameter: f32, color: Color) -> Entity {
    // Default grid: radius 50 over 10 cells -> unit 10
    app.world_mut()
        .spawn(ball_bundle(pos, diameter, color, 10.0, 0.0))
        .id()
}

fn select(app: &mut App, entity: Entity) {
    app.world_mut()
        .get_mut::<BallState>(entity)
        .unwrap()
        .selected = true;
}

fn emit_command(app: &mut App, command: &str) {
    app.world_mut()
        .resource_mut::<InputDispatcher>()
        .emit(command, EventPayload::Command);
}

fn find_aggregate(app: &mut App) -> Option<Entity> {
    let world = app.world_mut();
    let mut q = world.query_filtered::<Entity, (With<Ball>, With<AggregateChildren>)>();
    q.iter(world).next()
}

#[test]
fn merge_then_split_round_trip() {
    let mut app = test_app();
    let a = spawn_ball(&mut app, Vec2::new(-4.0, -3.0), 1.0, Color::srgb(0.19, 0.15, 0.24));
    let b = spawn_ball(&mut app, Vec2::new(-3.0, -2.0), 1.0, Color::srgb(0.80, 0.48, 0.26));
    let c = spawn_ball(&mut app, Vec2::new(0.0, 0.0), 2.0, Color::srgb(0.47, 0.64, 0.35));
    app.update();

    select(&mut app, a);
    select(&mut app, b);
    emit_command(&mut app, MERGE_COMMAND);
    app.update();

    let aggregate = find_aggregate(&mut app).expect("merge creates an aggregate");
    {
        let world = app.world();
        // Diameter is conserved and the aggregate sits at the union center
        assert_eq!(world.get::<BallDiameter>(aggregate).unwrap().0, 2.0);
        assert_eq!(
            world.get::<GridPos>(aggregate).unwrap().0,
            Vec2::new(-3.5, -2.5)
        );
        assert_eq!(
            world.get::<AggregateChildren>(aggregate).unwrap().0,
            vec![a, b]
        );
        assert_eq!(*world.get::<Visibility>(a).unwrap(), Visibility::Hidden);
        assert_eq!(*world.get::<Visibility>(b).unwrap(), Visibility::Hidden);
        assert_eq!(*world.get::<Visibility>(c).unwrap(), Visibility::Visible);
        assert_eq!(world.resource::<Events<BallsMerged>>().len(), 1);
    }

    // Snapshot the originals' attributes to verify the split restores them
    let snapshot: Vec<(Vec2, f32, Color)> = [a, b]
        .iter()
        .map(|&e| {
            let world = app.world();
            (
                world.get::<GridPos>(e).unwrap().0,
                world.get::<BallDiameter>(e).unwrap().0,
                world.get::<BallColor>(e).unwrap().0,
            )
        })
        .collect();

    select(&mut app, aggregate);
    emit_command(&mut app, SPLIT_COMMAND);
    app.update();

    let world = app.world();
    assert!(world.get_entity(aggregate).is_err(), "aggregate removed");
    for (&entity, (pos, diameter, color)) in [a, b].iter().zip(snapshot) {
        assert_eq!(*world.get::<Visibility>(entity).unwrap(), Visibility::Visible);
        assert_eq!(world.get::<GridPos>(entity).unwrap().0, pos);
        assert_eq!(world.get::<BallDiameter>(entity).unwrap().0, diameter);
        assert_eq!(world.get::<BallColor>(entity).unwrap().0, color);
    }
    assert_eq!(world.resource::<Events<BallSplit>>().len(), 1);
}

#[test]
fn merge_command_with_single_selection_changes_nothing() {
    let mut app = test_app();
    let a = spawn_ball(&mut app, Vec2::ZERO, 1.0, Color::WHITE);
    spawn_ball(&mut app, Vec2::ONE, 1.0, Color::WHITE);
    app.update();

    select(&mut app, a);
    emit_command(&mut app, MERGE_COMMAND);
    app.update();

    assert!(find_aggregate(&mut app).is_none());
    let world = app.world_mut();
    let mut q = world.query_filtered::<&Visibility, With<Ball>>();
    assert!(q.iter(world).all(|v| *v == Visibility::Visible));
}

#[test]
fn split_command_on_leaf_changes_nothing() {
    let mut app = test_app();
    let a = spawn_ball(&mut app, Vec2::ZERO, 1.0, Color::WHITE);
    app.update();

    select(&mut app, a);
    emit_command(&mut app, SPLIT_COMMAND);
    app.update();

    let world = app.world_mut();
    assert!(world.get_entity(a).is_ok());
    let mut q = world.query_filtered::<(), With<Ball>>();
    assert_eq!(q.iter(world).count(), 1);
}

#[test]
fn repeated_merges_stay_reversible_one_level_at_a_time() {
    let mut app = test_app();
    let a = spawn_ball(&mut app, Vec2::new(-1.0, 0.0), 1.0, Color::WHITE);
    let b = spawn_ball(&mut app, Vec2::new(1.0, 0.0), 1.0, Color::WHITE);
    let c = spawn_ball(&mut app, Vec2::new(0.0, 2.0), 3.0, Color::WHITE);
    app.update();

    select(&mut app, a);
    select(&mut app, b);
    emit_command(&mut app, MERGE_COMMAND);
    app.update();
    let first = find_aggregate(&mut app).expect("first merge");

    select(&mut app, first);
    select(&mut app, c);
    emit_command(&mut app, MERGE_COMMAND);
    app.update();

    let aggregates: Vec<(Entity, f32)> = {
        let world = app.world_mut();
        let mut q = world
            .query_filtered::<(Entity, &BallDiameter), (With<Ball>, With<AggregateChildren>)>();
        q.iter(world).map(|(e, d)| (e, d.0)).collect()
    };
    // Both levels exist; only the outer one is visible
    assert_eq!(aggregates.len(), 2);
    let outer = aggregates
        .iter()
        .copied()
        .find(|(e, _)| *e != first)
        .expect("outer aggregate");
    assert_eq!(outer.1, 5.0);
    assert_eq!(
        *app.world().get::<Visibility>(first).unwrap(),
        Visibility::Hidden
    );

    select(&mut app, outer.0);
    emit_command(&mut app, SPLIT_COMMAND);
    app.update();
    // One split restores the first aggregate and c, not the leaves
    let world = app.world();
    assert_eq!(*world.get::<Visibility>(first).unwrap(), Visibility::Visible);
    assert_eq!(*world.get::<Visibility>(c).unwrap(), Visibility::Visible);
    assert_eq!(*world.get::<Visibility>(a).unwrap(), Visibility::Hidden);
    assert_eq!(*world.get::<Visibility>(b).unwrap(), Visibility::Hidden);
}
