//! Integration tests for signal emission
//!
//! Runs raw log lines (inline, and from fixture files) through the suppressor,
//! the parser and the processor, the same order the pipeline uses.

use waksense_types::{ClassKind, DedupStats};

use crate::combat_log::{CombatEvent, DuplicateSuppressor, LogParser, ParsedLine};

use super::{EventProcessor, GameSignal};

const IOP_FIGHT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/iop_fight.log"
));

struct Run {
    parsed: Vec<ParsedLine>,
    signals: Vec<GameSignal>,
}

fn run_lines<'a>(
    processor: &mut EventProcessor,
    lines: impl IntoIterator<Item = &'a str>,
    locked: bool,
) -> Run {
    let mut dedup = DuplicateSuppressor::default();
    let parser = LogParser::new();
    let mut run = Run {
        parsed: Vec::new(),
        signals: Vec::new(),
    };

    for (idx, line) in lines.into_iter().enumerate() {
        if !dedup.accept(line) {
            continue;
        }
        let Some(parsed) = parser.parse_line(idx as u64 + 1, line) else {
            continue;
        };
        run.signals.extend(processor.process_line(&parsed, locked));
        run.parsed.push(parsed);
    }
    run
}

fn iop() -> EventProcessor {
    EventProcessor::new("Goultard", ClassKind::Iop, 5)
}

fn combat(body: &str) -> String {
    format!("10:00:00,000 - [Information (combat)] {body}")
}

#[test]
fn test_end_to_end_scenario() {
    let lines = [
        "10:00:00,000 - [Information (combat)] Foo: lance le sort Jugement (Critiques)",
        "10:00:00,050 - [Information (combat)] Foo: lance le sort Jugement (Critiques)",
        "10:00:05,000 - [Information (combat)] Foo: Concentration (+65 Niv.)",
        "10:00:10,000 - [Information (combat)] 5 secondes reportées pour le tour suivant.",
    ];
    let mut processor = EventProcessor::new("Foo", ClassKind::Iop, 5);
    let run = run_lines(&mut processor, lines, false);

    let events: Vec<&CombatEvent> = run.parsed.iter().flat_map(|p| &p.events).collect();
    let casts = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::SpellCast { .. }))
        .count();
    assert_eq!(casts, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::ResourceReport { resource, total: 65, .. } if resource == "Concentration"
    )));

    let state = processor.turn_state();
    assert_eq!(state.tracked_player.as_deref(), Some("Foo"));
    assert!(state.in_combat);
    assert!(!state.is_tracked_turn);
    assert!(!state.overlay_visible);

    let snapshot = processor.snapshot(DedupStats::default());
    assert_eq!(snapshot.resources.counter("Concentration"), Some(65));
}

#[test]
fn test_fixture_fight_signals() {
    let mut processor = iop();
    let run = run_lines(&mut processor, IOP_FIGHT.lines(), false);
    let signals = &run.signals;

    assert!(signals.contains(&GameSignal::FighterJoined {
        name: "Goultard".to_string(),
        class: Some(ClassKind::Iop),
    }));
    // monsters are never recorded
    assert!(
        !signals
            .iter()
            .any(|s| matches!(s, GameSignal::FighterJoined { name, .. } if name == "Bouftou Royal"))
    );
    assert!(signals.contains(&GameSignal::FighterJoined {
        name: "Percimol".to_string(),
        class: Some(ClassKind::Cra),
    }));

    assert!(signals.contains(&GameSignal::TrackedPlayerAssigned {
        player: "Goultard".to_string()
    }));
    // duplicate Fulgur is suppressed, so exactly one completion
    let completions: Vec<_> = signals
        .iter()
        .filter(|s| matches!(s, GameSignal::ComboCompleted { .. }))
        .collect();
    assert_eq!(
        completions,
        vec![&GameSignal::ComboCompleted {
            combo: "Vol de vie"
        }]
    );

    assert!(signals.contains(&GameSignal::CostCorrected {
        spell: "Charge",
        cost: "3PA"
    }));

    // chat end and fight-system end for the same fight: one signal
    let ends = signals
        .iter()
        .filter(|s| matches!(s, GameSignal::CombatEnded { .. }))
        .count();
    assert_eq!(ends, 1);

    // only the tracked player's turn end is reported
    let turn_ends = signals
        .iter()
        .filter(|s| matches!(s, GameSignal::TrackedTurnEnded { .. }))
        .count();
    assert_eq!(turn_ends, 1);

    let snapshot = processor.snapshot(DedupStats::default());
    assert!(!snapshot.in_combat);
    assert!(snapshot.resources.counters.iter().all(|c| c.value == 0));
    assert!(snapshot.timeline.live.is_empty());
    assert!(snapshot.fighters.is_empty());
}

#[test]
fn test_timeline_and_combos_follow_tracked_casts() {
    let mut processor = iop();
    let lines = [
        combat("Goultard: lance le sort Éventrail"),
        combat("Percimol: lance le sort Jugement"),
        combat("Goultard: lance le sort Fulgur"),
    ];
    run_lines(&mut processor, lines.iter().map(String::as_str), false);

    let spells: Vec<_> = processor
        .timeline()
        .entries()
        .map(|e| (e.spell.clone(), e.display_cost.clone()))
        .collect();
    assert_eq!(
        spells,
        vec![
            ("Éventrail".to_string(), "1PM".to_string()),
            ("Fulgur".to_string(), "3PA".to_string()),
        ]
    );
    assert_eq!(processor.combos().step("Vol de vie"), Some(2));
}

#[test]
fn test_turn_passed_clears_timeline_and_combos() {
    let mut processor = iop();
    let lines = [
        combat("Goultard: lance le sort Éventrail"),
        combat("Goultard: lance le sort Fulgur"),
        combat("Goultard: lance le sort Fulgur"),
        "10:00:01,000 - [Information (combat)] 2 secondes reportées pour le tour suivant.".to_string(),
    ];
    // distinct timestamps so the repeated cast isn't a duplicate
    let lines: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| l.replacen("10:00:00,000", &format!("10:00:00,{:03}", i * 200), 1))
        .collect();
    run_lines(&mut processor, lines.iter().map(String::as_str), false);

    assert!(processor.timeline().is_empty());
    assert!(processor.combos().completed_this_turn().is_empty());
    assert_eq!(processor.combos().step("Vol de vie"), Some(0));
}

#[test]
fn test_locked_overlay_survives_turn_end() {
    let mut processor = iop();
    let lines = [
        combat("Goultard: lance le sort Jugement"),
        "10:00:01,000 - [Information (combat)] 2 secondes reportées pour le tour suivant.".to_string(),
    ];
    let run = run_lines(&mut processor, lines.iter().map(String::as_str), true);

    assert!(run.signals.contains(&GameSignal::TrackedTurnEnded {
        player: Some("Goultard".to_string()),
        overlay_kept: true,
    }));
    let snapshot = processor.snapshot(DedupStats::default());
    assert!(snapshot.overlay_visible);
    assert!(!snapshot.is_tracked_turn);
}

#[test]
fn test_punching_bag_knockout_ends_combat() {
    let mut processor = iop();
    let lines = [
        "10:00:00,000 - [Information (jeu)] Sac à patate: Quand tu auras fini de me frapper, dis-le moi.",
        "10:00:01,000 - [Information (combat)] Goultard: lance le sort Jugement",
        "10:00:01,100 - [Information (combat)] Goultard: Concentration (+40 Niv.)",
        "10:00:02,000 - [Information (combat)] Sac à patate est KO !",
    ];
    let run = run_lines(&mut processor, lines, false);

    assert!(run.signals.contains(&GameSignal::SpecialCombatFlagged));
    assert!(run.signals.contains(&GameSignal::CombatEnded { fight_id: None }));
    let snapshot = processor.snapshot(DedupStats::default());
    assert!(!snapshot.in_combat);
    assert_eq!(snapshot.resources.counter("Concentration"), Some(0));
}

#[test]
fn test_combat_end_clears_resources_before_any_class_cast() {
    let mut processor = EventProcessor::new("Rocky", ClassKind::Ouginak, 5);
    let lines = [
        "10:00:00,000 - [Information (combat)] Rocky: 12 Rage (Traqueur)",
        "10:00:01,000 - [Information (combat)] Combat terminé, cliquez ici pour rouvrir l'écran de fin de combat.",
    ];
    let run = run_lines(&mut processor, lines, false);

    // nobody was tracked, so the end itself is silent
    assert!(
        !run.signals
            .iter()
            .any(|s| matches!(s, GameSignal::CombatEnded { .. }))
    );
    let snapshot = processor.snapshot(DedupStats::default());
    assert!(!snapshot.in_combat);
    assert_eq!(snapshot.resources.counter("Rage"), Some(0));
}

#[test]
fn test_repeated_end_marker_clears_late_reports() {
    let mut processor = iop();
    let lines = [
        combat("Goultard: lance le sort Jugement"),
        combat("Combat terminé, cliquez ici pour rouvrir l'écran de fin de combat."),
        combat("Goultard: Puissance (+40 Niv.)"),
        "10:00:00,000 - [Game Log] [FIGHT] End fight with id 12".to_string(),
    ];
    let run = run_lines(&mut processor, lines.iter().map(String::as_str), false);

    let ends = run
        .signals
        .iter()
        .filter(|s| matches!(s, GameSignal::CombatEnded { .. }))
        .count();
    assert_eq!(ends, 1);
    let snapshot = processor.snapshot(DedupStats::default());
    assert_eq!(snapshot.resources.counter("Puissance"), Some(0));
}

#[test]
fn test_cra_keeps_no_timeline() {
    let mut processor = EventProcessor::new("Robin", ClassKind::Cra, 5);
    let lines = [
        combat("Robin: lance le sort Flèche criblante"),
        combat("Robin: Affûtage (+140 Niv.)"),
    ];
    run_lines(&mut processor, lines.iter().map(String::as_str), false);

    assert_eq!(processor.turn_state().tracked_player.as_deref(), Some("Robin"));
    assert!(processor.timeline().is_empty());
    let snapshot = processor.snapshot(DedupStats::default());
    assert_eq!(snapshot.resources.counter("Pointe affûtée"), Some(1));
    assert!(snapshot.combos.is_empty());
}

#[test]
fn test_ouginak_timeline_shows_rage_in_ougigarou() {
    let mut processor = EventProcessor::new("Rocky", ClassKind::Ouginak, 5);
    let lines = [
        "10:00:00,000 - [Information (combat)] Rocky: lance le sort Rupture",
        "10:00:00,200 - [Information (combat)] Rocky: 20 Rage (Traqueur)",
        "10:00:00,400 - [Information (combat)] Rocky: Ougigarou (Niv. 1)",
        "10:00:00,600 - [Information (combat)] Rocky: lance le sort Baroud",
    ];
    run_lines(&mut processor, lines, false);

    let costs: Vec<_> = processor
        .timeline()
        .entries()
        .map(|e| e.display_cost.as_str())
        .collect();
    assert_eq!(costs, vec!["2PA", "7RG"]);
    assert_eq!(
        processor.snapshot(DedupStats::default()).resources.counter("Rage"),
        Some(13)
    );
}

#[test]
fn test_snapshot_hands_out_eviction_once() {
    let mut processor = EventProcessor::new("Goultard", ClassKind::Iop, 2);
    let lines = [
        "10:00:00,000 - [Information (combat)] Goultard: lance le sort Jugement",
        "10:00:00,200 - [Information (combat)] Goultard: lance le sort Rafale",
        "10:00:00,400 - [Information (combat)] Goultard: lance le sort Duel",
    ];
    run_lines(&mut processor, lines, false);

    let first = processor.snapshot(DedupStats::default());
    assert_eq!(first.timeline.evicting.unwrap().spell, "Jugement");
    assert_eq!(first.timeline.live.len(), 2);

    let second = processor.snapshot(DedupStats::default());
    assert!(second.timeline.evicting.is_none());
}
