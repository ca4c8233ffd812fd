//! Player actions as data.
//!
//! Every mutation a player (or a script) can make is an [`Action`]. Scenario
//! files, the headless protocol and the determinism harness all drive a
//! [`Game`] through [`Game::apply`], so a recorded action list replays to
//! the same state.

use serde::{Deserialize, Serialize};

use crate::error::ActionResult;
use crate::game::Game;
use crate::hex::HexCoord;

/// A single player action or time step.
///
/// # Example RON
///
/// ```ron
/// [
///     AddResource(resource: "iron", amount: 100.0),
///     Craft(component: "chassis"),
///     Deploy(q: 3, r: 1),
///     Tick(ms: 1000.0),
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Advance time.
    Tick {
        /// Elapsed milliseconds.
        ms: f64,
    },
    /// Craft one component.
    Craft {
        /// Component id.
        component: String,
    },
    /// Assemble one drone.
    BuildDrone {
        /// Drone type id.
        drone_type: String,
    },
    /// Deploy a drone onto a tile.
    Deploy {
        /// Axial q.
        q: i32,
        /// Axial r.
        r: i32,
    },
    /// Recall a drone from a tile.
    Remove {
        /// Axial q.
        q: i32,
        /// Axial r.
        r: i32,
    },
    /// Place a structure.
    BuildStructure {
        /// Structure type id.
        structure_type: String,
        /// Axial q.
        q: i32,
        /// Axial r.
        r: i32,
    },
    /// Remove a structure.
    Demolish {
        /// Axial q.
        q: i32,
        /// Axial r.
        r: i32,
    },
    /// Grant resources directly.
    AddResource {
        /// Resource id.
        resource: String,
        /// Amount, may be fractional.
        amount: f64,
    },
}

impl Action {
    /// Short name for logs and error responses.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Craft { .. } => "craft",
            Self::BuildDrone { .. } => "build_drone",
            Self::Deploy { .. } => "deploy",
            Self::Remove { .. } => "remove",
            Self::BuildStructure { .. } => "build_structure",
            Self::Demolish { .. } => "demolish",
            Self::AddResource { .. } => "add_resource",
        }
    }
}

impl Game {
    /// Apply one action. `now_ms` stamps structures built by it.
    ///
    /// # Errors
    ///
    /// Whatever the underlying manager rejects; the game is unchanged then.
    pub fn apply(&mut self, action: &Action, now_ms: u64) -> ActionResult {
        match action {
            Action::Tick { ms } => {
                self.tick(*ms);
                Ok(())
            }
            Action::Craft { component } => self.craft_component(component),
            Action::BuildDrone { drone_type } => self.build_drone(drone_type),
            Action::Deploy { q, r } => self.deploy_drone(HexCoord::new(*q, *r)),
            Action::Remove { q, r } => self.remove_drone(HexCoord::new(*q, *r)),
            Action::BuildStructure {
                structure_type,
                q,
                r,
            } => self.build_structure(structure_type, HexCoord::new(*q, *r), now_ms),
            Action::Demolish { q, r } => self.demolish_structure(HexCoord::new(*q, *r)),
            Action::AddResource { resource, amount } => {
                self.add_resource(resource, *amount);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;

    #[test]
    fn test_script_from_ron() {
        let script: Vec<Action> = ron::from_str(
            r#"[
                AddResource(resource: "iron", amount: 100.0),
                Craft(component: "chassis"),
                Tick(ms: 500.0),
            ]"#,
        )
        .unwrap();
        assert_eq!(script.len(), 3);
        assert_eq!(script[1].name(), "craft");

        let mut game = Game::default();
        for action in &script {
            game.apply(action, 0).unwrap();
        }
        assert_eq!(game.crafting().component("chassis"), 1);
        assert_eq!(game.resources().resource("iron"), 50);
    }

    #[test]
    fn test_apply_reports_errors() {
        let mut game = Game::default();
        let err = game
            .apply(&Action::Deploy { q: 0, r: 0 }, 0)
            .unwrap_err();
        assert_eq!(err, ActionError::NoDronesAvailable);
    }
}
