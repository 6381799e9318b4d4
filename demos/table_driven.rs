//! Table-Driven Character Controller
//!
//! This example demonstrates driving a machine from a transition table
//! loaded out of JSON configuration.
//!
//! Key concepts:
//! - Transition tables as pure, serializable data
//! - Event dispatch through EventDriver
//! - Non-fatal handling of undefined (state, event) pairs
//!
//! Run with: cargo run --example table_driven

use stance::{EventDriver, Fsm, Sentinels, StateHooks, TransitionTable};

const TABLE_JSON: &str = r#"[
    {"from": "idle",    "on": "key-forward", "to": "walking"},
    {"from": "walking", "on": "key-forward", "to": "running"},
    {"from": "running", "on": "key-stop",    "to": "idle"},
    {"from": "walking", "on": "key-stop",    "to": "idle"},
    {"from": "idle",    "on": "key-space",   "to": "jumping"},
    {"from": "jumping", "on": "landed",      "to": "idle"}
]"#;

fn main() {
    println!("=== Table-Driven Character Controller ===\n");

    let mut character = Fsm::new("character", Sentinels::default());
    for name in ["idle", "walking", "running", "jumping"] {
        let state = name.to_string();
        character.add_state(
            name.to_string(),
            StateHooks::new().on_enter(move |_, _| println!("  animation: {state}")),
        );
    }
    character.request("idle".to_string());

    let table: TransitionTable<String, String> = serde_json::from_str(TABLE_JSON).unwrap();
    println!("Loaded {} transition rules\n", table.len());

    let mut driver = EventDriver::new(character, table);

    println!("Dispatching events:");
    for event in [
        "key-forward",
        "key-forward",
        "key-space", // undefined while running: ignored
        "key-stop",
        "key-space",
        "landed",
    ] {
        match driver.handle(&event.to_string()) {
            Some(_) => println!("  {event}: handled"),
            None => println!("  {event}: no transition defined, ignored"),
        }
    }

    println!("\nFinal state: {}", driver.fsm().current_or_next_state());

    println!("\n=== Example Complete ===");
}
