use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, trace};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::config::EngineConfig;
use crate::error::{ConfigError, TransitionError};
use crate::game::{BoardSnapshot, Game, GamePhase};
use crate::heading::{Heading, sanitize};
use crate::snake::MoveOutcome;

/// Receives a board copy after every mutating tick, blink toggle and phase entry.
///
/// Calls happen after the engine has released the game, one at a time and in
/// the order the changes were made. A copy that is overtaken by a newer one
/// before it is handed over is dropped. Implementations may read from the
/// [`Engine`] but must not call its transition methods, and a slow observer
/// only delays later notifications.
pub trait BoardObserver: Send + Sync + 'static {
    fn on_board_changed(&self, snapshot: BoardSnapshot);
}

impl<F> BoardObserver for F
where
    F: Fn(BoardSnapshot) + Send + Sync + 'static,
{
    fn on_board_changed(&self, snapshot: BoardSnapshot) {
        self(snapshot);
    }
}

const NO_HEADING: u8 = 0;

fn encode(heading: Heading) -> u8 {
    match heading {
        Heading::Top => 1,
        Heading::Bottom => 2,
        Heading::Left => 3,
        Heading::Right => 4,
    }
}

fn decode(value: u8) -> Option<Heading> {
    match value {
        1 => Some(Heading::Top),
        2 => Some(Heading::Bottom),
        3 => Some(Heading::Left),
        4 => Some(Heading::Right),
        _ => None,
    }
}

/// Single-slot mailbox for direction requests, written without the game lock.
///
/// `applied` mirrors the heading of the last tick so requests can be
/// sanitized on arrival; the tick re-sanitizes against the game's own heading.
struct HeadingSlot {
    pending: AtomicU8,
    applied: AtomicU8,
}

impl HeadingSlot {
    fn new(applied: Heading) -> Self {
        Self {
            pending: AtomicU8::new(NO_HEADING),
            applied: AtomicU8::new(encode(applied)),
        }
    }

    fn request(&self, heading: Heading) {
        let next = decode(self.applied.load(Ordering::Acquire))
            .map_or(heading, |applied| sanitize(applied, heading));
        self.pending.store(encode(next), Ordering::Release);
    }

    fn take(&self) -> Option<Heading> {
        decode(self.pending.swap(NO_HEADING, Ordering::AcqRel))
    }

    fn applied(&self, heading: Heading) {
        self.applied.store(encode(heading), Ordering::Release);
    }

    fn reset(&self, heading: Heading) {
        self.pending.store(NO_HEADING, Ordering::Release);
        self.applied(heading);
    }
}

/// A board copy stamped with the order of the change that produced it.
struct Notice {
    sequence: u64,
    snapshot: BoardSnapshot,
}

struct Shared {
    game: Mutex<Game>,
    observer: Box<dyn BoardObserver>,
    headings: HeadingSlot,
    sequence: AtomicU64,
    delivered: Mutex<u64>,
    tick_interval: Duration,
    blink_interval: Duration,
}

impl Shared {
    fn lock_game(&self) -> MutexGuard<'_, Game> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Must be called with the game lock held so sequence order is change order.
    fn capture(&self, game: &Game) -> Notice {
        Notice {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            snapshot: game.snapshot(),
        }
    }

    // Must be called without the game lock.
    fn deliver(&self, notice: Notice) {
        let mut delivered = self.delivered.lock().unwrap_or_else(PoisonError::into_inner);
        if notice.sequence <= *delivered {
            trace!("dropping board {} superseded by {}", notice.sequence, *delivered);
            return;
        }
        *delivered = notice.sequence;
        self.observer.on_board_changed(notice.snapshot);
    }
}

/// Owns a [`Game`] and the single timer task that advances it.
///
/// Every transition bumps the game's epoch under the lock and aborts the
/// previous timer; a timer whose epoch no longer matches exits without
/// mutating anything. Timer tasks are spawned on the ambient tokio runtime,
/// so [`Engine::start`] must be called from within one.
pub struct Engine {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Builds the board and enters Init, notifying `observer` once.
    pub fn new<O: BoardObserver>(config: &EngineConfig, observer: O) -> Result<Self, ConfigError> {
        config.validate()?;
        let game = Game::new(config)?;

        let shared = Arc::new(Shared {
            headings: HeadingSlot::new(game.heading()),
            game: Mutex::new(game),
            observer: Box::new(observer),
            sequence: AtomicU64::new(0),
            delivered: Mutex::new(0),
            tick_interval: config.tick_interval(),
            blink_interval: config.blink_interval(),
        });
        let notice = shared.capture(&shared.lock_game());
        shared.deliver(notice);

        Ok(Self {
            shared,
            timer: Mutex::new(None),
        })
    }

    /// Rebuilds the board at `board_size` and re-enters Init.
    ///
    /// On error the running phase and its timer are left alone.
    pub fn build(&self, board_size: usize) -> Result<(), ConfigError> {
        let notice = {
            let mut game = self.shared.lock_game();
            game.build(board_size)?;
            self.shared.headings.reset(game.heading());
            self.replace_timer(None);
            self.shared.capture(&game)
        };
        self.shared.deliver(notice);
        Ok(())
    }

    /// Init -> Playing; starts the tick timer.
    pub fn start(&self) -> Result<(), TransitionError> {
        let notice = {
            let mut game = self.shared.lock_game();
            game.start()?;

            let task = tokio::spawn(run_timer(Arc::clone(&self.shared), game.epoch()));
            self.replace_timer(Some(task));
            self.shared.capture(&game)
        };
        self.shared.deliver(notice);
        Ok(())
    }

    /// Any phase -> Init; cancels whatever timer is running.
    pub fn restart(&self) {
        let notice = {
            let mut game = self.shared.lock_game();
            game.restart();
            self.shared.headings.reset(game.heading());
            self.replace_timer(None);
            self.shared.capture(&game)
        };
        self.shared.deliver(notice);
    }

    /// Records a sanitized heading for the next tick. Never fails and never
    /// waits on the game lock.
    pub fn change_direction(&self, heading: Heading) {
        self.shared.headings.request(heading);
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.shared.lock_game().snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.shared.lock_game().phase()
    }

    /// Stops the timer without changing the phase.
    pub fn shutdown(&self) {
        let _game = self.shared.lock_game();
        self.replace_timer(None);
    }

    // Callers hold the game lock, which keeps lock order game -> timer.
    fn replace_timer(&self, next: Option<JoinHandle<()>>) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        *timer = next;
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = timer.take() {
            task.abort();
        }
    }
}

enum Step {
    Continue,
    EnterBlink(u64),
    Stop,
}

fn phase_ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_timer(shared: Arc<Shared>, mut epoch: u64) {
    let mut ticker = phase_ticker(shared.tick_interval);

    loop {
        ticker.tick().await;

        let (step, notice) = {
            let mut game = shared.lock_game();
            if game.epoch() != epoch {
                debug!("timer for epoch {epoch} is stale, exiting");
                (Step::Stop, None)
            } else {
                match game.phase() {
                    GamePhase::Playing => {
                        if let Some(heading) = shared.headings.take() {
                            game.change_direction(heading);
                        }
                        let outcome = game.tick();
                        shared.headings.applied(game.heading());
                        let step = if outcome == Some(MoveOutcome::Collided) {
                            Step::EnterBlink(game.epoch())
                        } else {
                            Step::Continue
                        };
                        (step, Some(shared.capture(&game)))
                    }
                    GamePhase::GameOver => {
                        game.blink();
                        (Step::Continue, Some(shared.capture(&game)))
                    }
                    GamePhase::Init => (Step::Stop, None),
                }
            }
        };

        if let Some(notice) = notice {
            shared.deliver(notice);
        }

        match step {
            Step::Continue => {}
            Step::EnterBlink(next_epoch) => {
                info!("game over, blinking every {:?}", shared.blink_interval);
                epoch = next_epoch;
                ticker = phase_ticker(shared.blink_interval);
            }
            Step::Stop => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use crate::config::EngineConfig;
    use crate::error::TransitionError;
    use crate::game::{BoardSnapshot, GamePhase};
    use crate::grid::{CellContent, Position};
    use crate::heading::Heading;

    use super::Engine;

    type Log = Arc<Mutex<Vec<BoardSnapshot>>>;

    fn engine(config: EngineConfig) -> (Engine, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let engine = Engine::new(&config, move |snapshot: BoardSnapshot| {
            sink.lock().expect("log lock").push(snapshot);
        })
        .expect("engine should build");
        (engine, log)
    }

    fn seeded(initial_length: usize) -> EngineConfig {
        EngineConfig {
            initial_length,
            seed: Some(17),
            ..EngineConfig::default()
        }
    }

    fn count(log: &Log) -> usize {
        log.lock().expect("log lock").len()
    }

    fn last(log: &Log) -> BoardSnapshot {
        log.lock()
            .expect("log lock")
            .last()
            .cloned()
            .expect("at least one notification")
    }

    // Requests land 50ms after each tick boundary so no request races a tick.
    async fn drive_into_own_body(engine: &Engine) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        for heading in [Heading::Top, Heading::Left, Heading::Bottom] {
            engine.change_direction(heading);
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn construction_notifies_the_init_board() {
        let (engine, log) = engine(seeded(3));

        assert_eq!(count(&log), 1);
        assert_eq!(last(&log).phase, GamePhase::Init);
        assert_eq!(engine.phase(), GamePhase::Init);
    }

    #[tokio::test(start_paused = true)]
    async fn playing_ticks_on_the_configured_interval() {
        let (engine, log) = engine(seeded(3));
        engine.start().expect("start from Init should succeed");
        let after_start = count(&log);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count(&log), after_start);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count(&log), after_start + 1);
        let snapshot = last(&log);
        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(
            snapshot.content(Position::new(6, 5)),
            Some(CellContent::SnakeHead)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_rejected() {
        let (engine, _log) = engine(seeded(3));
        engine.start().expect("start from Init should succeed");

        assert_eq!(
            engine.start(),
            Err(TransitionError::NotInInit(GamePhase::Playing))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_the_running_timer() {
        let (engine, log) = engine(seeded(3));
        engine.start().expect("start from Init should succeed");
        tokio::time::sleep(Duration::from_millis(450)).await;

        engine.restart();
        let after_restart = count(&log);
        tokio::time::sleep(Duration::from_millis(3_000)).await;

        assert_eq!(count(&log), after_restart);
        assert_eq!(last(&log).phase, GamePhase::Init);
        assert_eq!(engine.phase(), GamePhase::Init);
    }

    #[tokio::test(start_paused = true)]
    async fn collision_switches_to_blinking_without_mutation() {
        let (engine, log) = engine(seeded(6));
        engine.start().expect("start from Init should succeed");

        drive_into_own_body(&engine).await;
        assert_eq!(engine.phase(), GamePhase::GameOver);
        let frozen = last(&log);
        assert!(frozen.visible);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let blinked = last(&log);
        assert!(!blinked.visible);
        assert_eq!(blinked.cells, frozen.cells);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(last(&log).visible);
        assert_eq!(last(&log).cells, frozen.cells);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_from_game_over_returns_to_a_clean_init() {
        let (engine, log) = engine(seeded(6));
        engine.start().expect("start from Init should succeed");
        drive_into_own_body(&engine).await;
        assert_eq!(engine.phase(), GamePhase::GameOver);

        engine.restart();
        let after_restart = count(&log);
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        assert_eq!(count(&log), after_restart);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Init);
        assert!(snapshot.visible);
        assert!(snapshot
            .cells
            .iter()
            .all(|cell| cell.content != CellContent::Food));
        assert_eq!(
            snapshot.content(Position::new(5, 5)),
            Some(CellContent::SnakeHead)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn build_rejects_bad_sizes_and_keeps_playing() {
        let (engine, _log) = engine(seeded(3));
        engine.start().expect("start from Init should succeed");

        assert!(engine.build(3).is_err());
        assert_eq!(engine.phase(), GamePhase::Playing);

        engine.build(12).expect("12x12 board should build");
        assert_eq!(engine.phase(), GamePhase::Init);
        assert_eq!(engine.snapshot().size, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn reversal_between_ticks_keeps_the_current_heading() {
        let (engine, log) = engine(seeded(3));
        engine.start().expect("start from Init should succeed");
        tokio::time::sleep(Duration::from_millis(50)).await;

        engine.change_direction(Heading::Top);
        engine.change_direction(Heading::Left);
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(
            last(&log).content(Position::new(6, 5)),
            Some(CellContent::SnakeHead)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_observer_does_not_hold_up_direction_changes() {
        let slow = Arc::new(AtomicBool::new(false));
        let busy = Arc::new(AtomicBool::new(false));
        let (slow_flag, busy_flag) = (Arc::clone(&slow), Arc::clone(&busy));
        let config = EngineConfig {
            tick_interval_ms: 50,
            ..seeded(3)
        };
        let engine = Engine::new(&config, move |_snapshot: BoardSnapshot| {
            if slow_flag.load(Ordering::SeqCst) {
                busy_flag.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(300));
            }
        })
        .expect("engine should build");
        engine.start().expect("start from Init should succeed");
        slow.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + Duration::from_secs(2);
        while !busy.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "timer never reached the observer");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let called = Instant::now();
        engine.change_direction(Heading::Top);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.snapshot().size, 10);
        assert!(
            called.elapsed() < Duration::from_millis(100),
            "engine calls waited {:?} on the observer",
            called.elapsed()
        );

        engine.shutdown();
    }
}
