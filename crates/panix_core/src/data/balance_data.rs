//! Balance constants: generation rates, drone limits, loop timing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// All tunable balance values.
///
/// # Example RON
///
/// ```ron
/// BalanceData(
///     resources: (
///         starting_tile_rate: 1.0,
///         drone_generation_rate: 0.5,
///         starting_resources: {"iron": 0.0, "silicon": 0.0, "energy": 0.0},
///     ),
///     drones: (max_drones_per_tile: 10, starting_drones: 0),
///     game_loop: (target_fps: 60, auto_save_interval_ms: 10000, max_offline_ms: 28800000),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceData {
    /// Resource generation.
    pub resources: ResourceBalance,
    /// Drone limits.
    pub drones: DroneBalance,
    /// Host loop timing.
    #[serde(default)]
    pub game_loop: GameLoopBalance,
}

/// Resource generation rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBalance {
    /// Iron per second from the starting base, independent of drones.
    pub starting_tile_rate: f64,
    /// Resource per second contributed by each deployed drone.
    pub drone_generation_rate: f64,
    /// Ledger contents at game start.
    #[serde(default)]
    pub starting_resources: BTreeMap<String, f64>,
}

/// Drone limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroneBalance {
    /// Capacity of every tile.
    pub max_drones_per_tile: u32,
    /// Drones in the pool at game start.
    #[serde(default)]
    pub starting_drones: u32,
}

/// Host loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLoopBalance {
    /// Frames per second the host aims for.
    pub target_fps: u32,
    /// Milliseconds between automatic saves.
    pub auto_save_interval_ms: u64,
    /// Upper bound on elapsed time credited when resuming after a pause.
    pub max_offline_ms: u64,
}

impl Default for GameLoopBalance {
    fn default() -> Self {
        Self {
            target_fps: 60,
            auto_save_interval_ms: 10_000,
            max_offline_ms: 8 * 60 * 60 * 1000,
        }
    }
}

impl Default for BalanceData {
    fn default() -> Self {
        let starting_resources = [("iron", 0.0), ("silicon", 0.0), ("energy", 0.0)]
            .into_iter()
            .map(|(id, amount)| (id.to_string(), amount))
            .collect();

        Self {
            resources: ResourceBalance {
                starting_tile_rate: 1.0,
                drone_generation_rate: 0.5,
                starting_resources,
            },
            drones: DroneBalance {
                max_drones_per_tile: 10,
                starting_drones: 0,
            },
            game_loop: GameLoopBalance::default(),
        }
    }
}

impl BalanceData {
    /// Milliseconds per frame at the target rate. Hosts use this as the
    /// tick length when none is given.
    #[must_use]
    pub fn frame_ms(&self) -> f64 {
        if self.game_loop.target_fps == 0 {
            0.0
        } else {
            1000.0 / f64::from(self.game_loop.target_fps)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let balance = BalanceData::default();
        assert_eq!(balance.resources.starting_tile_rate, 1.0);
        assert_eq!(balance.resources.drone_generation_rate, 0.5);
        assert_eq!(balance.drones.max_drones_per_tile, 10);
        assert_eq!(balance.resources.starting_resources.len(), 3);
    }

    #[test]
    fn test_optional_sections_default() {
        let ron_str = r#"(
            resources: (starting_tile_rate: 2.0, drone_generation_rate: 1.0),
            drones: (max_drones_per_tile: 4),
        )"#;
        let balance: BalanceData = ron::from_str(ron_str).unwrap();
        assert_eq!(balance.drones.starting_drones, 0);
        assert_eq!(balance.game_loop, GameLoopBalance::default());
        assert!(balance.resources.starting_resources.is_empty());
    }

    #[test]
    fn test_frame_ms() {
        let balance = BalanceData::default();
        assert!((balance.frame_ms() - 16.666).abs() < 0.01);
    }
}
