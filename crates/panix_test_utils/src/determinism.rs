//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a game produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Generation is driven purely by the deltas passed to `tick`, and every
//! mutation is an [`Action`]. Replaying the same action script against the
//! same config must therefore reach the same [`Game::state_hash`].
//! Sources of non-determinism this catches include:
//!
//! - **HashMap iteration order**: tiles are iterated in layout order and
//!   ledgers are `BTreeMap`s; a regression here shows up as diverging hashes.
//!
//! - **Hidden clocks**: the core must never read the system time.
//!
//! - **Lossy persistence**: a save/restore round trip must not alter state.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual managers
//! 2. **Property tests**: random action scripts still replay identically
//! 3. **Parallel tests**: running N games on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use panix_core::action::Action;
use panix_core::game::Game;
use panix_core::save::SaveData;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Game is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use panix_test_utils::determinism::verify_determinism;
/// use panix_core::game::Game;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     600, // 600 frames each
///     Game::default,
///     |game| game.tick(1000.0 / 60.0),
///     Game::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Apply a script to a game, ignoring rejected actions.
///
/// Returns how many actions were rejected.
pub fn run_script(game: &mut Game, script: &[Action]) -> usize {
    script
        .iter()
        .enumerate()
        .filter(|(i, action)| game.apply(action, *i as u64).is_err())
        .count()
}

/// Replay an action script `runs` times from fresh games and compare hashes.
///
/// # Example
///
/// ```ignore
/// use panix_test_utils::determinism::verify_script_determinism;
/// use panix_test_utils::fixtures::game_with_drones;
///
/// let result = verify_script_determinism(3, || game_with_drones(2), &script);
/// result.assert_deterministic();
/// ```
pub fn verify_script_determinism<F>(runs: usize, setup_fn: F, script: &[Action]) -> DeterminismResult
where
    F: Fn() -> Game,
{
    let mut hashes = Vec::with_capacity(runs);
    for _ in 0..runs {
        let mut game = setup_fn();
        run_script(&mut game, script);
        hashes.push(game.state_hash());
    }

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: script.len() as u64,
    }
}

/// Replay a script on N threads and verify all games agree.
///
/// Uses scoped threads so the setup function need not be `'static`.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_scripts<F>(setup_fn: F, num_games: usize, script: &[Action]) -> DeterminismResult
where
    F: Fn() -> Game + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_games)
            .map(|_| {
                s.spawn(|| {
                    let mut game = setup_fn();
                    run_script(&mut game, script);
                    game.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: script.len() as u64,
    }
}

/// Compare two replays action-by-action, finding the first divergence.
///
/// # Returns
///
/// `None` if the games stay identical, `Some(index)` of the first action
/// after which the hashes differ (`Some(0)` if the initial states differ).
pub fn find_first_divergence<F>(setup_fn: F, script: &[Action]) -> Option<usize>
where
    F: Fn() -> Game,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for (i, action) in script.iter().enumerate() {
        let now = i as u64;
        let _ = a.apply(action, now);
        let _ = b.apply(action, now);

        if a.state_hash() != b.state_hash() {
            return Some(i + 1);
        }
    }

    None
}

/// Verify that a JSON and a bincode save/restore both preserve the state hash.
pub fn verify_save_round_trip(game: &Game) -> bool {
    let hash_before = game.state_hash();
    let data = SaveData::capture(game, 0);

    let via_json = data
        .to_json()
        .and_then(|json| SaveData::from_json(&json));
    let via_bytes = data
        .to_bytes()
        .and_then(|bytes| SaveData::from_bytes(&bytes));

    [via_json, via_bytes].into_iter().all(|decoded| {
        let Ok(decoded) = decoded else {
            return false;
        };
        let mut restored = Game::new(game.config().clone());
        decoded.restore(&mut restored).is_ok() && restored.state_hash() == hash_before
    })
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
