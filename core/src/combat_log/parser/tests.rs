use super::*;

fn test_parser() -> LogParser {
    LogParser::new()
}

fn single_event(line: &str) -> CombatEvent {
    let parsed = test_parser().parse_line(1, line);
    assert!(parsed.is_some(), "line was rejected: {line}");
    let mut events = parsed.unwrap().events;
    assert_eq!(events.len(), 1, "expected one event for {line}");
    events.remove(0)
}

// split_timestamp
#[test]
fn test_split_timestamp() {
    let result = split_timestamp("10:00:05,042 - [Information (combat)] Foo: lance le sort Jugement");
    assert!(result.is_some());

    let (time, rest) = result.unwrap();
    assert_eq!(time, NaiveTime::from_hms_milli_opt(10, 0, 5, 42).unwrap());
    assert_eq!(rest, "[Information (combat)] Foo: lance le sort Jugement");
}

#[test]
fn test_split_timestamp_rejects_malformed() {
    assert!(split_timestamp("10:00:05.042 - content").is_none());
    assert!(split_timestamp("1a:00:05,042 - content").is_none());
    assert!(split_timestamp("25:00:05,042 - content").is_none());
    assert!(split_timestamp("10:00:05,042 content").is_none());
    assert!(split_timestamp("10:00:05,042 - ").is_none());
}

// spell casts
#[test]
fn test_parse_spell_cast() {
    let event = single_event("10:00:00,000 - [Information (combat)] Foo: lance le sort Jugement (Critiques)");
    assert_eq!(
        event,
        CombatEvent::SpellCast {
            caster: "Foo".to_string(),
            spell: "Jugement".to_string(),
        }
    );
}

#[test]
fn test_parse_spell_cast_without_colon_or_suffix() {
    let event = single_event("10:00:00,000 - [Information (combat)] Astra Gladia lance le sort Colère de Iop");
    assert_eq!(
        event,
        CombatEvent::SpellCast {
            caster: "Astra Gladia".to_string(),
            spell: "Colère de Iop".to_string(),
        }
    );
}

#[test]
fn test_parse_spell_cast_fallback_split() {
    let parser = test_parser();
    let event = parser.parse_spell_cast(":Foo: lance le sort Flèche criblante (Feu)");
    assert_eq!(
        event,
        Some(CombatEvent::SpellCast {
            caster: "Foo".to_string(),
            spell: "Flèche criblante".to_string(),
        })
    );
}

// resources and buffs
#[test]
fn test_parse_resource_report_with_tag() {
    let event = single_event("10:00:00,000 - [Information (combat)] Foo: Courroux (+2 Niv.) (Compulsion)");
    assert_eq!(
        event,
        CombatEvent::ResourceReport {
            target: "Foo".to_string(),
            resource: "Courroux".to_string(),
            total: 2,
            tags: vec!["Compulsion".to_string()],
        }
    );
    assert!(event.has_tag("Compulsion"));
    assert!(!event.has_tag("Concentration"));
}

#[test]
fn test_oversized_totals_saturate() {
    let event = single_event("10:00:00,000 - [Information (combat)] Foo: Puissance (+99999999999 Niv.)");
    assert!(matches!(
        event,
        CombatEvent::ResourceReport { total: u32::MAX, .. }
    ));

    let event = single_event("10:00:00,000 - [Information (combat)] Wolfy: 4294967296 Rage (Traqueur)");
    assert!(matches!(
        event,
        CombatEvent::ResourceReport { total: u32::MAX, .. }
    ));

    let event = single_event("10:00:00,000 - [Information (combat)] Bouftou: -123456789012 PV (Feu)");
    assert!(matches!(
        event,
        CombatEvent::Damage { amount: u32::MAX, .. }
    ));
}

#[test]
fn test_parse_total() {
    assert_eq!(parse_total("42"), 42);
    assert_eq!(parse_total("4294967295"), u32::MAX);
    assert_eq!(parse_total("4294967296"), u32::MAX);
    // non-ASCII digits the regex accepts
    assert_eq!(parse_total("٣"), 0);
}

#[test]
fn test_parse_rage_report() {
    let event = single_event("10:00:00,000 - [Information (combat)] Wolfy: 12 Rage (Traqueur)");
    assert_eq!(
        event,
        CombatEvent::ResourceReport {
            target: "Wolfy".to_string(),
            resource: "Rage".to_string(),
            total: 12,
            tags: vec!["Traqueur".to_string()],
        }
    );
}

#[test]
fn test_parse_buff_gained() {
    let event = single_event("10:00:00,000 - [Information (combat)] Arc: Tir précis (Niv. 1)");
    assert_eq!(
        event,
        CombatEvent::BuffGained {
            target: "Arc".to_string(),
            buff: "Tir précis".to_string(),
            tags: vec![],
        }
    );
}

#[test]
fn test_parse_buff_lost() {
    let event = single_event(
        "10:00:00,000 - [Information (combat)] Foo: n'est plus sous l'emprise de 'Puissance' (Iop isolé)",
    );
    assert_eq!(
        event,
        CombatEvent::BuffLost {
            target: "Foo".to_string(),
            buff: "Puissance".to_string(),
            tags: vec!["Iop isolé".to_string()],
        }
    );
}

#[test]
fn test_parse_damage_with_tags() {
    let event = single_event("10:00:00,000 - [Information (combat)] Sac à patates: -133 PV (Feu) (Courroux)");
    assert_eq!(
        event,
        CombatEvent::Damage {
            target: "Sac à patates".to_string(),
            amount: 133,
            tags: vec!["Feu".to_string(), "Courroux".to_string()],
        }
    );
}

// turn and combat markers
#[test]
fn test_parse_turn_passed_singular_and_plural() {
    let plural = single_event("10:00:10,000 - [Information (combat)] 5 secondes reportées pour le tour suivant.");
    assert_eq!(plural, CombatEvent::TurnPassed);

    let singular = single_event("10:00:10,000 - [Information (combat)] 1 seconde reportée pour le tour suivant.");
    assert_eq!(singular, CombatEvent::TurnPassed);
}

#[test]
fn test_parse_combat_ended() {
    let event = single_event(
        "10:05:00,000 - [Information (combat)] Combat terminé, cliquez ici pour rouvrir l'écran de fin de combat.",
    );
    assert_eq!(event, CombatEvent::CombatEnded { fight_id: None });
}

#[test]
fn test_parse_fight_system_end() {
    let event = single_event("INFO 10:05:00,000 [main] - [FIGHT] End fight with id 1552084023");
    assert_eq!(
        event,
        CombatEvent::CombatEnded {
            fight_id: Some(1552084023)
        }
    );
}

#[test]
fn test_parse_punching_bag_taunt_outside_combat_tag() {
    let event = single_event("10:00:00,000 - [Information] Sac à patate: Quand tu auras fini de me frapper, préviens-moi.");
    assert_eq!(event, CombatEvent::SpecialCombatStart);
}

#[test]
fn test_parse_knockout() {
    let event = single_event("10:00:00,000 - [Information (combat)] Sac à patate est KO !");
    assert_eq!(
        event,
        CombatEvent::Knockout {
            target: "Sac à patate".to_string()
        }
    );
}

// fighter roster
#[test]
fn test_parse_fighter_joined() {
    let event = single_event(
        "INFO 10:00:00,000 [main] - [_FL_] fightId=1552072008 Astra Gladia breed : 8 [7595487] isControlledByAI=false obstacleId : -1",
    );
    assert_eq!(
        event,
        CombatEvent::FighterJoined {
            fight_id: 1552072008,
            name: "Astra Gladia".to_string(),
            breed: 8,
        }
    );
}

#[test]
fn test_parse_fighter_ignores_monsters() {
    let parsed = test_parser().parse_line(
        1,
        "INFO 10:00:00,000 [main] - [_FL_] fightId=1552072008 Bouftou breed : 1 [12] isControlledByAI=true",
    );
    assert!(parsed.is_none());
}

// rejection
#[test]
fn test_non_combat_lines_are_rejected() {
    let parser = test_parser();
    assert!(parser.parse_line(1, "10:00:00,000 - [Guilde] Foo: salut").is_none());
    assert!(parser.parse_line(2, "").is_none());
    assert!(parser.parse_line(3, "   ").is_none());
}

#[test]
fn test_unrecognized_combat_line_keeps_content() {
    let parsed = test_parser()
        .parse_line(7, "10:00:00,000 - [Information (combat)] Foo: Consomme Pointe affûtée");
    assert!(parsed.is_some());

    let parsed = parsed.unwrap();
    assert!(parsed.events.is_empty());
    assert_eq!(parsed.line_number, 7);
    assert!(parsed.contains("Consomme Pointe affûtée"));
}

// parse_tags
#[test]
fn test_parse_tags() {
    assert_eq!(
        parse_tags("  (Feu) (Courroux)"),
        vec!["Feu".to_string(), "Courroux".to_string()]
    );
    assert!(parse_tags(" sans tag").is_empty());
    assert_eq!(parse_tags(" (ouvert"), Vec::<String>::new());
}
