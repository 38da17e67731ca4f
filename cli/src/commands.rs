use std::io::Write;

use waksense_core::context::AppConfigExt;
use waksense_core::types::{ClassKind, MonitorState, OverlaySnapshot};

use crate::CliContext;

pub async fn show_status(ctx: &CliContext) {
    let pipelines = ctx.pipelines().lock().await;
    if pipelines.is_empty() {
        println!("No characters tracked. Use `add <name> <class>`.");
        return;
    }

    for pipeline in pipelines.iter() {
        let snapshot = pipeline.snapshot();
        let state = match pipeline.monitor_state() {
            MonitorState::Running => "running".to_string(),
            MonitorState::WaitingForFile => "waiting for log file".to_string(),
            MonitorState::Stopped { reason } => format!("stopped ({reason})"),
        };
        let lock = if pipeline.is_locked() { " [locked]" } else { "" };
        println!(
            "{} ({}){} - {}",
            pipeline.character(),
            pipeline.class(),
            lock,
            state
        );
        print_snapshot(&snapshot);
        println!();
    }
}

fn print_snapshot(snapshot: &OverlaySnapshot) {
    let combat = match (&snapshot.tracked_player, snapshot.in_combat) {
        (Some(player), true) => format!("in combat, tracking {player}"),
        (None, true) => "in combat".to_string(),
        _ => "out of combat".to_string(),
    };
    println!(
        "  {combat}{}{}",
        if snapshot.is_tracked_turn { ", their turn" } else { "" },
        if snapshot.overlay_visible { ", overlay shown" } else { "" },
    );

    for counter in &snapshot.resources.counters {
        println!("  {:<20} {:>4} / {}", counter.name, counter.value, counter.cap);
    }
    let flags: Vec<_> = snapshot
        .resources
        .flags
        .iter()
        .filter(|f| f.active)
        .map(|f| f.name.as_str())
        .collect();
    if !flags.is_empty() {
        println!("  active: {}", flags.join(", "));
    }

    if !snapshot.timeline.live.is_empty() {
        let casts: Vec<_> = snapshot
            .timeline
            .live
            .iter()
            .map(|e| format!("{} ({})", e.spell, e.display_cost))
            .collect();
        println!("  timeline: {}", casts.join(" > "));
    }
    for combo in snapshot.combos.iter().filter(|c| c.step > 0 || c.completed_this_turn) {
        let marker = if combo.completed_this_turn { " done" } else { "" };
        println!("  combo {:<26} {}/{}{}", combo.id, combo.step, combo.len, marker);
    }
    if !snapshot.fighters.is_empty() {
        let fighters: Vec<_> = snapshot
            .fighters
            .iter()
            .map(|f| match f.class {
                Some(class) => format!("{} ({class})", f.name),
                None => f.name.clone(),
            })
            .collect();
        println!("  fighters: {}", fighters.join(", "));
    }
}

pub async fn show_stats(ctx: &CliContext, reset: bool) {
    let pipelines = ctx.pipelines().lock().await;
    if reset {
        for pipeline in pipelines.iter() {
            pipeline.reset_dedup_stats().await;
        }
        println!("Duplicate statistics reset");
        return;
    }

    println!(
        "{:<24} {:>10} {:>10} {:>8} {:>8}",
        "Character", "Lines", "Dupes", "Rate", "Window"
    );
    println!("{}", "-".repeat(64));
    for pipeline in pipelines.iter() {
        let stats = pipeline.snapshot().dedup;
        println!(
            "{:<24} {:>10} {:>10} {:>7.1}% {:>6}ms",
            pipeline.character(),
            stats.total_messages,
            stats.duplicates_detected,
            stats.duplicate_rate,
            stats.duplicate_window_ms
        );
    }
}

pub async fn set_locked(ctx: &CliContext, name: &str, locked: bool) {
    if let Err(err) = ctx.config.write().await.set_locked(name, locked) {
        println!("{err}");
        return;
    }
    if let Some(pipeline) = ctx
        .pipelines()
        .lock()
        .await
        .iter()
        .find(|p| p.character() == name)
    {
        pipeline.set_locked(locked);
    }
    if let Err(err) = ctx.save_config().await {
        println!("Lock applied but not saved: {err}");
        return;
    }
    println!("{name} {}", if locked { "locked" } else { "unlocked" });
}

pub async fn add_character(ctx: &CliContext, name: &str, class: ClassKind) {
    let character = {
        let mut config = ctx.config.write().await;
        if let Err(err) = config.add_character(name, class) {
            println!("{err}");
            return;
        }
        config.character(name).cloned()
    };
    let Some(character) = character else {
        return;
    };

    if let Err(err) = ctx.save_config().await {
        println!("Failed to save config: {err}");
    }
    ctx.start(&character).await;
    println!("Tracking {name} ({class})");
}

pub async fn remove_character(ctx: &CliContext, name: &str) {
    if let Err(err) = ctx.config.write().await.remove_character(name) {
        println!("{err}");
        return;
    }
    if let Some(Err(err)) = ctx.stop(name).await {
        println!("Pipeline for {name} had stopped with an error: {err}");
    }
    if let Err(err) = ctx.save_config().await {
        println!("Failed to save config: {err}");
    }
    println!("Stopped tracking {name}");
}

pub async fn show_config(ctx: &CliContext) {
    let config = ctx.config.read().await;
    println!("log file:          {}", config.log_file);
    println!(
        "duplicate window:  {}ms ({} lines{})",
        config.dedup.window_ms,
        config.dedup.capacity,
        if config.dedup.enabled { "" } else { ", disabled" }
    );
    println!("poll interval:     {}ms", config.tailer.poll_interval_ms);
    println!("timeline length:   {}", config.timeline_capacity);
    for character in &config.characters {
        println!(
            "character:         {} ({}){}",
            character.name,
            character.class,
            if character.locked { " locked" } else { "" }
        );
    }
}

pub async fn exit(ctx: &CliContext) {
    ctx.stop_all().await;
    // stdout may already be gone on shutdown
    let _ = write!(std::io::stdout(), "quitting...");
    let _ = std::io::stdout().flush();
}
