//! Session driver.
//!
//! Bridges callers and the clock with the single session owner: one tokio task holds the
//! [`GameSession`], receives commands over an mpsc channel, drives the [`RoundClock`] while a
//! round runs and publishes a fresh snapshot on a `watch` channel after every step. Terminal
//! transitions are forwarded once on an unbounded signal channel.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use honeycomb_core::types::{Phase, Point, StackId};
use honeycomb_core::{
    GameError, GameSession, PlacementResult, RandomSource, RoundSignal, SessionSnapshot,
};

use crate::clock::RoundClock;

const COMMAND_BUFFER: usize = 32;

/// Command delivered to the driver task.
#[derive(Debug)]
pub enum SessionCommand {
    Start {
        reply: oneshot::Sender<Result<SessionSnapshot, GameError>>,
    },
    Restart {
        reply: oneshot::Sender<Result<SessionSnapshot, GameError>>,
    },
    Abandon {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Place {
        stack: StackId,
        point: Point,
        reply: oneshot::Sender<Result<PlacementResult, GameError>>,
    },
    DismissCleared {
        stack: StackId,
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("session driver has shut down")]
    Closed,
    #[error(transparent)]
    Game(#[from] GameError),
}

impl DriverError {
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Closed => "driver_closed",
            DriverError::Game(err) => err.code(),
        }
    }
}

/// Caller side of a running driver
#[derive(Debug)]
pub struct DriverHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    signals: mpsc::UnboundedReceiver<RoundSignal>,
}

impl DriverHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, DriverError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| DriverError::Closed)?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    pub async fn start(&self) -> Result<SessionSnapshot, DriverError> {
        Ok(self.request(|reply| SessionCommand::Start { reply }).await??)
    }

    pub async fn restart(&self) -> Result<SessionSnapshot, DriverError> {
        Ok(self.request(|reply| SessionCommand::Restart { reply }).await??)
    }

    pub async fn abandon(&self) -> Result<SessionSnapshot, DriverError> {
        self.request(|reply| SessionCommand::Abandon { reply }).await
    }

    pub async fn place(&self, stack: StackId, point: Point) -> Result<PlacementResult, DriverError> {
        Ok(self
            .request(|reply| SessionCommand::Place {
                stack,
                point,
                reply,
            })
            .await??)
    }

    pub async fn dismiss_cleared(&self, stack: StackId) -> Result<bool, DriverError> {
        self.request(|reply| SessionCommand::DismissCleared { stack, reply })
            .await
    }

    /// Ask the driver to stop; the join handle then yields the session
    pub async fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown).await;
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch receiver for callers that want change notifications
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Next terminal transition, `None` once the driver is gone
    pub async fn next_signal(&mut self) -> Option<RoundSignal> {
        self.signals.recv().await
    }

    pub fn try_signal(&mut self) -> Option<RoundSignal> {
        self.signals.try_recv().ok()
    }
}

enum Event {
    Command(Option<SessionCommand>),
    Tick(Option<u64>),
}

struct SessionDriver<R: RandomSource> {
    session: GameSession<R>,
    period: Duration,
    clock: Option<RoundClock>,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    signals: mpsc::UnboundedSender<RoundSignal>,
}

/// Spawn a driver task owning `session`
///
/// `period` is the wall-clock length of one elapsed-time unit. Must be called inside a tokio
/// runtime.
pub fn spawn_driver<R>(
    session: GameSession<R>,
    period: Duration,
) -> (DriverHandle, JoinHandle<GameSession<R>>)
where
    R: RandomSource + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snap_tx, snap_rx) = watch::channel(session.snapshot());
    let (sig_tx, sig_rx) = mpsc::unbounded_channel();

    let mut driver = SessionDriver {
        session,
        period,
        clock: None,
        commands: cmd_rx,
        snapshots: snap_tx,
        signals: sig_tx,
    };
    // A session handed over mid-round keeps its clock.
    driver.sync_clock();

    let join = tokio::spawn(driver.run());
    let handle = DriverHandle {
        commands: cmd_tx,
        snapshots: snap_rx,
        signals: sig_rx,
    };
    (handle, join)
}

async fn next_tick(clock: &mut Option<RoundClock>) -> Option<u64> {
    match clock {
        Some(clock) => clock.tick().await,
        None => std::future::pending().await,
    }
}

impl<R: RandomSource> SessionDriver<R> {
    async fn run(mut self) -> GameSession<R> {
        loop {
            let event = tokio::select! {
                cmd = self.commands.recv() => Event::Command(cmd),
                tick = next_tick(&mut self.clock) => Event::Tick(tick),
            };

            match event {
                Event::Command(None) | Event::Command(Some(SessionCommand::Shutdown)) => break,
                Event::Command(Some(cmd)) => self.handle(cmd),
                Event::Tick(Some(_)) => {
                    self.session.tick();
                    self.settle();
                }
                Event::Tick(None) => {
                    // Clock task ended on its own; settle restarts it if still wanted.
                    self.clock = None;
                    self.settle();
                }
            }
        }

        self.drop_clock();
        tracing::debug!(round = self.session.round(), "session driver stopped");
        self.session
    }

    /// Apply one command; the reply goes out after the new state is published
    fn handle(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Start { reply } => {
                // A fresh round gets a fresh clock phase.
                self.drop_clock();
                let result = self.session.start_round();
                self.settle();
                let _ = reply.send(result);
            }
            SessionCommand::Restart { reply } => {
                self.drop_clock();
                let result = self.session.restart();
                self.settle();
                let _ = reply.send(result);
            }
            SessionCommand::Abandon { reply } => {
                self.session.abandon();
                self.settle();
                let _ = reply.send(self.session.snapshot());
            }
            SessionCommand::Place {
                stack,
                point,
                reply,
            } => {
                let result = self.session.place_stack(stack, point);
                self.settle();
                let _ = reply.send(result);
            }
            SessionCommand::DismissCleared { stack, reply } => {
                let dismissed = self.session.dismiss_cleared(stack);
                self.settle();
                let _ = reply.send(dismissed);
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn settle(&mut self) {
        self.sync_clock();
        self.publish();
    }

    /// Run the clock exactly while the round runs with its clock enabled
    fn sync_clock(&mut self) {
        let wanted = self.session.phase() == Phase::Running && self.session.clock_running();
        match (wanted, self.clock.is_some()) {
            (true, false) => self.clock = Some(RoundClock::start(self.period)),
            (false, true) => self.drop_clock(),
            _ => {}
        }
    }

    fn drop_clock(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.stop();
        }
    }

    fn publish(&mut self) {
        if let Some(signal) = self.session.take_signal() {
            let _ = self.signals.send(signal);
        }
        self.snapshots.send_modify(|snap| self.session.snapshot_into(snap));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeycomb_core::types::Outcome;
    use honeycomb_core::{GameConfig, ScriptedRng, SimpleRng};

    fn small_config() -> GameConfig {
        GameConfig {
            rows: 2,
            columns: 2,
            background_seed_count: 0,
            deal_batch_size: 1,
            target_score_candidates: vec![100],
            ..GameConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_publishes_start_snapshot() {
        let session = GameSession::new(GameConfig::default(), 7).unwrap();
        let (handle, join) = spawn_driver(session, Duration::from_secs(1));

        let started = handle.start().await.unwrap();
        assert_eq!(started.phase, Phase::Running);
        assert_eq!(handle.snapshot().round, 1);

        handle.shutdown().await;
        let session = join.await.unwrap();
        assert_eq!(session.phase(), Phase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_ticks_while_running() {
        let session = GameSession::new(GameConfig::default(), 7).unwrap();
        let (handle, join) = spawn_driver(session, Duration::from_secs(1));
        handle.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(handle.snapshot().elapsed, 3);

        handle.abandon().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        let snap = handle.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.elapsed, 0);

        handle.shutdown().await;
        join.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_forwards_placement_and_signal() {
        let config = GameConfig {
            clear_threshold: 2,
            target_score_candidates: vec![2],
            ..small_config()
        };
        let session = GameSession::with_rng(config, ScriptedRng::new(vec![0])).unwrap();
        let (mut handle, join) = spawn_driver(session, Duration::from_secs(1));

        let started = handle.start().await.unwrap();
        let stack = started.movable().next().unwrap().id;
        assert_eq!(handle.snapshot().total_cells, 4);

        // Height 2 reaches the threshold alone, which reaches the target.
        let result = handle.place(stack, Point::new(35.0, 187.0)).await.unwrap();
        assert!(result.success);
        assert_eq!(result.cleared_amount, Some(2));
        assert_eq!(result.outcome, Outcome::Won);

        let signal = handle.next_signal().await.unwrap();
        assert_eq!(signal.outcome, Outcome::Won);
        assert_eq!(signal.score, 2);
        assert!(handle.try_signal().is_none());

        assert!(handle.dismiss_cleared(stack).await.unwrap());
        assert!(handle.snapshot().stack(stack).is_none());

        handle.shutdown().await;
        join.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_rejects_place_when_idle() {
        let session = GameSession::new(small_config(), 3).unwrap();
        let (handle, join) = spawn_driver(session, Duration::from_secs(1));

        let err = handle
            .place(StackId(0), Point::new(35.0, 187.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Game(GameError::NotRunning)));
        assert_eq!(err.code(), GameError::NotRunning.code());

        handle.shutdown().await;
        join.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_reports_closed_driver() {
        let session: GameSession<SimpleRng> = GameSession::new(small_config(), 3).unwrap();
        let (handle, join) = spawn_driver(session, Duration::from_secs(1));
        handle.shutdown().await;
        join.await.unwrap();

        let err = handle.start().await.unwrap_err();
        assert!(matches!(err, DriverError::Closed));
        assert_eq!(err.code(), "driver_closed");
    }
}
