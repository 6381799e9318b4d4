//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine.
//!
//! Key concepts:
//! - Runtime state registration with enter/exit hooks
//! - Self-describing transitions via request()
//! - Cleanup back to the off state
//!
//! Run with: cargo run --example traffic_light

use stance::{FsmBuilder, Sentinels, StateHooks};

fn main() {
    println!("=== Traffic Light State Machine ===\n");

    let mut light = FsmBuilder::new("traffic-light")
        .sentinels(Sentinels::default())
        .state(
            "red".to_string(),
            StateHooks::new().on_enter(|_, _| println!("  red: stop")),
        )
        .state(
            "green".to_string(),
            StateHooks::new().on_enter(|_, _| println!("  green: go")),
        )
        .state(
            "yellow".to_string(),
            StateHooks::new().on_enter(|_, _| println!("  yellow: caution")),
        )
        .build()
        .unwrap();

    println!("Cycling twice through red -> green -> yellow:");
    for _ in 0..2 {
        light.request("red".to_string());
        light.request("green".to_string());
        light.request("yellow".to_string());
    }

    light.cleanup();
    println!("\nLight is off: {}", light.is_off());

    println!("\nPath taken:");
    for key in light.history().path() {
        println!("  {key}");
    }

    println!("\n=== Example Complete ===");
}
