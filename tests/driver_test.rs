//! Driver and clock behaviour under paused tokio time

use std::time::Duration;

use honeycomb_stack::core::{GameConfig, GameSession};
use honeycomb_stack::engine::{plan_place, spawn_driver, RoundClock};
use honeycomb_stack::types::Phase;

#[tokio::test(start_paused = true)]
async fn test_driver_elapsed_follows_clock() {
    let session = GameSession::new(GameConfig::default(), 4242).unwrap();
    let (handle, join) = spawn_driver(session, Duration::from_secs(1));

    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(handle.snapshot().elapsed, 5);

    // Restart resets the clock.
    let snap = handle.restart().await.unwrap();
    assert_eq!(snap.round, 2);
    assert_eq!(snap.elapsed, 0);
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(handle.snapshot().elapsed, 2);

    handle.shutdown().await;
    let session = join.await.unwrap();
    assert_eq!(session.elapsed(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_driver_plays_planned_moves() {
    let session = GameSession::new(GameConfig::default(), 17).unwrap();
    let (handle, join) = spawn_driver(session, Duration::from_secs(1));
    handle.start().await.unwrap();
    handle.shutdown().await;
    let mut session = join.await.unwrap();

    // Plan on the returned session, then replay through a fresh driver.
    let choice = plan_place(&session).unwrap();
    let grid = session.registry().grid();
    let point = grid.center(grid.index_of(choice.cell).unwrap());

    let (handle, join) = spawn_driver(session.clone(), Duration::from_secs(1));
    let via_driver = handle.place(choice.stack, point).await.unwrap();
    handle.shutdown().await;
    join.await.unwrap();

    let direct = session.place_stack(choice.stack, point).unwrap();
    assert_eq!(via_driver, direct);
    assert!(via_driver.success);
}

#[tokio::test(start_paused = true)]
async fn test_watch_subscriber_sees_updates() {
    let session = GameSession::new(GameConfig::default(), 8).unwrap();
    let (handle, join) = spawn_driver(session, Duration::from_secs(1));
    let mut updates = handle.subscribe();
    assert_eq!(updates.borrow_and_update().phase, Phase::Idle);

    handle.start().await.unwrap();
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().phase, Phase::Running);

    handle.abandon().await.unwrap();
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow().phase, Phase::Idle);

    handle.shutdown().await;
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_round_clock_stops_cleanly() {
    let mut clock = RoundClock::start(Duration::from_millis(250));
    assert_eq!(clock.tick().await, Some(1));
    drop(clock);

    let mut clock = RoundClock::start(Duration::from_millis(250));
    clock.stop();
    assert_eq!(clock.tick().await, None);
    assert!(!clock.is_running());
}
