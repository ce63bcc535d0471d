//! Integration tests for the threaded simulation engine.
//!
//! Each test wires an observer that pauses the engine from inside the
//! batch hook. The hook runs on the worker before its next loop head, so the
//! worker always parks at an exact roll count and the assertions below see a
//! settled walk.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use monopoly_board::Board;
use monopoly_core::{
    DiceSource, EngineConfig, RandomDice, ScriptedDice, SimulationEngine, SimulationObserver,
    WeakSimulationEngine,
};

const WAIT: Duration = Duration::from_secs(10);

struct PausingObserver {
    engine: OnceLock<WeakSimulationEngine>,
    pause_every: u64,
    batches: AtomicU64,
    resumed: AtomicU64,
    paused: AtomicU64,
    paused_tx: Sender<u64>,
    batch_thread: Mutex<Option<String>>,
}

impl SimulationObserver for PausingObserver {
    fn on_resumed(&self) {
        let _ = self.resumed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_paused(&self) {
        let _ = self.paused.fetch_add(1, Ordering::SeqCst);
        let rolls = self
            .engine
            .get()
            .and_then(WeakSimulationEngine::upgrade)
            .map_or(0, |engine| engine.roll_count());
        let _ = self.paused_tx.send(rolls);
    }

    fn on_batch_complete(&self) {
        let batches = self.batches.fetch_add(1, Ordering::SeqCst) + 1;
        *self.batch_thread.lock().unwrap() = thread::current().name().map(str::to_owned);
        if batches % self.pause_every == 0 {
            if let Some(engine) = self.engine.get().and_then(WeakSimulationEngine::upgrade) {
                engine.pause();
            }
        }
    }
}

struct Harness {
    engine: SimulationEngine,
    observer: Arc<PausingObserver>,
    paused_rx: Receiver<u64>,
}

impl Harness {
    fn new(dice: impl DiceSource + 'static, config: &EngineConfig, pause_every: u64) -> Self {
        let (paused_tx, paused_rx) = mpsc::channel();
        let observer = Arc::new(PausingObserver {
            engine: OnceLock::new(),
            pause_every,
            batches: AtomicU64::new(0),
            resumed: AtomicU64::new(0),
            paused: AtomicU64::new(0),
            paused_tx,
            batch_thread: Mutex::new(None),
        });
        let engine = SimulationEngine::with_dice(
            Arc::new(Board::standard()),
            config,
            observer.clone(),
            Box::new(dice),
        )
        .unwrap();
        let _ = observer.engine.set(engine.downgrade());
        engine.start().unwrap();

        Self {
            engine,
            observer,
            paused_rx,
        }
    }

    /// Resume and block until the observer pauses the engine again.
    fn run_until_paused(&self) -> u64 {
        self.engine.resume();
        let rolls = self.paused_rx.recv_timeout(WAIT).unwrap();

        // `on_paused` fires before the run flag drops.
        let deadline = Instant::now() + WAIT;
        while self.engine.is_running() {
            assert!(Instant::now() < deadline, "engine never settled");
            thread::yield_now();
        }
        rolls
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.engine.shutdown();
    }
}

fn config(batch_size: u64) -> EngineConfig {
    EngineConfig {
        batch_size,
        ..EngineConfig::default()
    }
}

#[test]
fn three_double_ones_then_pause() {
    let harness = Harness::new(ScriptedDice::repeating(1, 1), &config(3), 1);

    let rolls = harness.run_until_paused();

    let engine = &harness.engine;
    assert_eq!(rolls, 3);
    assert_eq!(engine.roll_count(), 3);
    assert_eq!(engine.position(), 6);
    assert!(!engine.is_running());
    for field in [2, 4, 6] {
        assert!((engine.probability(field) - 1.0 / 3.0).abs() < 1e-12);
    }
    assert_eq!(engine.probability(0), 0.0);
    assert_eq!(engine.probability(40), 0.0);
}

#[test]
fn jail_entry_tallies_two_fields_in_one_step() {
    // 0 -> 12 -> 24 -> 28 -> 30 (jail) -> 10
    let dice = ScriptedDice::new([(6, 6), (6, 6), (2, 2), (1, 1)]).unwrap();
    let harness = Harness::new(dice, &config(4), 1);

    let rolls = harness.run_until_paused();

    let visits = harness.engine.visit_counts();
    assert_eq!(rolls, 4);
    assert_eq!(harness.engine.position(), 10);
    assert_eq!(visits[30], 1);
    assert_eq!(visits[10], 1);
    assert_eq!(visits.iter().sum::<u64>(), 5);
}

#[test]
fn resume_continues_from_where_it_paused() {
    let harness = Harness::new(ScriptedDice::repeating(1, 2), &config(5), 1);

    assert_eq!(harness.run_until_paused(), 5);
    assert_eq!(harness.engine.position(), 15);

    assert_eq!(harness.run_until_paused(), 10);
    // 10 rolls of 3 from 0 would hit 30, which sends the token to 10 first.
    let visits = harness.engine.visit_counts();
    assert_eq!(visits[30], 1);
    assert_eq!(harness.engine.roll_count(), 10);
    assert_eq!(visits.iter().sum::<u64>(), 11);
}

#[test]
fn batch_hook_fires_on_every_multiple() {
    let harness = Harness::new(RandomDice::seeded(42), &config(1_000), 5);

    let rolls = harness.run_until_paused();

    assert_eq!(rolls, 5_000);
    assert_eq!(harness.observer.batches.load(Ordering::SeqCst), 5);
}

#[test]
fn hooks_fire_on_expected_threads() {
    let harness = Harness::new(ScriptedDice::repeating(3, 3), &config(2), 1);

    let _ = harness.run_until_paused();

    let batch_thread = harness.observer.batch_thread.lock().unwrap().clone();
    assert_eq!(batch_thread.as_deref(), Some("monopoly-sim"));
    assert_eq!(harness.observer.resumed.load(Ordering::SeqCst), 1);
    assert_eq!(harness.observer.paused.load(Ordering::SeqCst), 1);
}

#[test]
fn repeated_pause_fires_hook_each_time() {
    let harness = Harness::new(ScriptedDice::repeating(1, 1), &config(3), 1);
    let _ = harness.run_until_paused();

    harness.engine.pause();
    harness.engine.pause();

    assert!(!harness.engine.is_running());
    assert_eq!(harness.observer.paused.load(Ordering::SeqCst), 3);
    // Paused workers take no further steps.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(harness.engine.roll_count(), 3);
}

#[test]
fn post_step_delay_throttles_the_worker() {
    let config = EngineConfig {
        batch_size: 5,
        post_step_delay_ms: 10,
        ..EngineConfig::default()
    };
    let harness = Harness::new(ScriptedDice::repeating(1, 0), &config, 1);

    let started = Instant::now();
    let rolls = harness.run_until_paused();

    assert_eq!(rolls, 5);
    // The fifth sleep starts after the pause, so at least four have elapsed.
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[test]
fn readers_see_valid_values_while_running() {
    let harness = Harness::new(RandomDice::seeded(9), &config(10_000), 20);
    let engine = harness.engine.clone();

    let reader = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_millis(200);
        let mut reads = 0_u64;
        while Instant::now() < deadline {
            for field in 0..40 {
                let p = engine.probability(field);
                assert!((0.0..=1.0).contains(&p));
                let m = engine.mapped_probability(field);
                assert!((0.0..=1.0).contains(&m));
            }
            let snapshot = engine.snapshot();
            let jail_visits = snapshot.field(30).map_or(0, |f| f.visits);
            assert_eq!(snapshot.total_visits(), snapshot.roll_count + jail_visits);
            reads += 1;
        }
        reads
    });

    let rolls = harness.run_until_paused();
    let reads = reader.join().unwrap();

    assert_eq!(rolls, 200_000);
    assert!(reads > 0);
    let visits = harness.engine.visit_counts();
    assert_eq!(visits.iter().sum::<u64>(), rolls + visits[30]);
    assert!(visits[10] >= visits[30]);
}

#[test]
fn mapped_probability_uses_configured_range() {
    let config = EngineConfig {
        batch_size: 20_000,
        probability_map_range: [0.0, 10.0],
        ..EngineConfig::default()
    };
    let harness = Harness::new(RandomDice::seeded(1), &config, 1);
    let _ = harness.run_until_paused();

    let mapped: Vec<f64> = (0..40)
        .map(|field| harness.engine.mapped_probability(field))
        .collect();
    assert!(mapped.iter().all(|m| (0.0..=10.0).contains(m)));
    assert!(mapped.iter().any(|&m| m == 0.0));
    assert!(mapped.iter().any(|&m| m == 10.0));
    assert_eq!(harness.engine.mapped_probability(40), 0.0);

    let snapshot = harness.engine.snapshot();
    for stats in &snapshot.fields {
        assert_eq!(stats.mapped, mapped[stats.field]);
    }
}

#[test]
fn status_reports_rolls_and_run_flag() {
    let harness = Harness::new(ScriptedDice::repeating(2, 2), &config(7), 1);
    let _ = harness.run_until_paused();

    let status = harness.engine.status();
    assert!(!status.running);
    assert_eq!(status.roll_count, 7);
    assert_eq!(status.position, harness.engine.position());
    assert!(status.started_at.is_some());
}

#[test]
fn shutdown_releases_a_running_worker() {
    let harness = Harness::new(RandomDice::seeded(4), &config(u64::MAX), 1);
    harness.engine.resume();
    thread::sleep(Duration::from_millis(20));

    harness.engine.shutdown();
    let settled = harness.engine.roll_count();
    thread::sleep(Duration::from_millis(20));

    assert!(settled > 0);
    assert_eq!(harness.engine.roll_count(), settled);
}
