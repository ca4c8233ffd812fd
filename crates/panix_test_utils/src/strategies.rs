//! Proptest strategies.
//!
//! These strategies generate random but reproducible inputs for
//! property-based testing of the ledger, inventories and action replay.
//! Coordinates are drawn from a box slightly larger than the default map so
//! that invalid tiles are exercised too.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;

use panix_core::action::Action;
use panix_core::data::{ComponentCost, ResourceCost, BASIC_GATHERER, SOLAR_PANEL};

/// Built-in resource ids.
pub const RESOURCES: [&str; 3] = ["iron", "silicon", "energy"];

/// Built-in component ids.
pub const COMPONENTS: [&str; 3] = ["chassis", "circuit", "powerCore"];

/// Pick a built-in resource id.
pub fn arb_resource_id() -> impl Strategy<Value = String> {
    prop::sample::select(&RESOURCES[..]).prop_map(str::to_string)
}

/// Pick a component id, occasionally an unknown one.
pub fn arb_component_id() -> impl Strategy<Value = String> {
    prop_oneof![
        9 => prop::sample::select(&COMPONENTS[..]).prop_map(str::to_string),
        1 => Just("widget".to_string()),
    ]
}

/// Resource cost over the built-in resources, each `0..max`.
pub fn arb_cost(max: u64) -> impl Strategy<Value = ResourceCost> {
    btree_map(arb_resource_id(), 0..max, 0..=3)
}

/// Component cost over the built-in components, each `0..max`.
pub fn arb_component_cost(max: u32) -> impl Strategy<Value = ComponentCost> {
    btree_map(
        prop::sample::select(&COMPONENTS[..]).prop_map(str::to_string),
        0..max,
        0..=3,
    )
}

/// Starting amounts for the three built-in resources.
pub fn arb_amounts() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(0.0..500.0f64)
}

/// Frame delta in milliseconds, including the odd long stall.
pub fn arb_delta_ms() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => 0.0..50.0f64,
        1 => 50.0..10_000.0f64,
        1 => Just(0.0),
    ]
}

/// Axial coordinate around the default map.
pub fn arb_coord() -> impl Strategy<Value = (i32, i32)> {
    (-2i32..12, -7i32..12)
}

/// Any single action.
pub fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => arb_delta_ms().prop_map(|ms| Action::Tick { ms }),
        3 => arb_component_id().prop_map(|component| Action::Craft { component }),
        2 => prop_oneof![Just(BASIC_GATHERER.to_string()), Just("warDrone".to_string())]
            .prop_map(|drone_type| Action::BuildDrone { drone_type }),
        2 => arb_coord().prop_map(|(q, r)| Action::Deploy { q, r }),
        1 => arb_coord().prop_map(|(q, r)| Action::Remove { q, r }),
        1 => arb_coord().prop_map(|(q, r)| Action::BuildStructure {
            structure_type: SOLAR_PANEL.to_string(),
            q,
            r,
        }),
        1 => arb_coord().prop_map(|(q, r)| Action::Demolish { q, r }),
        2 => (arb_resource_id(), -50.0..200.0f64)
            .prop_map(|(resource, amount)| Action::AddResource { resource, amount }),
    ]
}

/// A script of up to `max_len` actions.
pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
    vec(arb_action(), 0..max_len)
}
