//! Demonstration of raw scroll capture.
//!
//! This example shows how to:
//! 1. Check that global input hooking is permitted
//! 2. Create and start a collector
//! 3. Receive scroll events and count them in a session
//!
//! Run with: cargo run --example capture_demo
//!
//! Note: Requires Input Monitoring permission on macOS.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use scroll_tracker::{
    collector::{check_permission, Collector, PERMISSION_HINT},
    dashboard::{format_duration, scroll_bar, BAR_WIDTH},
    session::SessionCounters,
};

fn main() {
    println!("Scroll Tracker - Capture Demo");
    println!("=============================");
    println!();

    print!("Checking input permission... ");
    if check_permission() {
        println!("OK ✓");
    } else {
        println!("FAILED ✗");
        println!();
        println!("{PERMISSION_HINT}");
        return;
    }
    println!();

    let mut collector = Collector::new();
    let session = SessionCounters::new();

    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {e}");
        return;
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    println!("Capturing for 15 seconds... scroll away! (Ctrl+C to stop early)");
    println!();

    let started = Instant::now();
    let receiver = collector.receiver().clone();
    while running.load(Ordering::SeqCst) && started.elapsed() < Duration::from_secs(15) {
        if let Ok(event) = receiver.recv_timeout(Duration::from_millis(100)) {
            session.record_scroll(event.direction);
            println!(
                "[{}] {:?}",
                event.timestamp.format("%H:%M:%S%.3f"),
                event.direction
            );
        }
    }

    collector.stop();

    let snapshot = session.snapshot();
    println!();
    println!(
        "Captured {} ticks in {} (up {}, down {})",
        snapshot.total(),
        format_duration(started.elapsed().as_secs_f64()),
        snapshot.up,
        snapshot.down
    );
    println!("{}", scroll_bar(snapshot.up, snapshot.down, BAR_WIDTH));
}
