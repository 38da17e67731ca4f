use super::*;
use chrono::NaiveTime;
use memchr::{memchr, memmem};
use regex::Regex;
use std::num::IntErrorKind;

#[cfg(test)]
mod tests;

const COMBAT_TAG: &str = "[Information (combat)]";
const CAST_MARKER: &str = "lance le sort";
const BUFF_LOST_MARKER: &str = "n'est plus sous l'emprise de";
const TURN_PASSED_MARKERS: [&str; 2] = [
    "reportée pour le tour suivant",
    "reportées pour le tour suivant",
];
const COMBAT_ENDED_MARKER: &str = "Combat terminé";
const PUNCHING_BAG: &str = "Sac à patate";
const PUNCHING_BAG_TAUNTS: [&str; 3] = [
    "Quand tu auras fini de me frapper",
    "abandonner",
    "Abandonne le combat",
];
const FIGHTER_MARKER: &str = "[_FL_]";
const FIGHT_END_MARKER: &str = "[FIGHT]";

/// Converts chat log lines into [`CombatEvent`]s.
///
/// The regexes are compiled once per parser; one parser lives per pipeline.
pub struct LogParser {
    cast_pattern: Regex,
    resource_pattern: Regex,
    rage_pattern: Regex,
    buff_gained_pattern: Regex,
    buff_lost_pattern: Regex,
    damage_pattern: Regex,
    knockout_pattern: Regex,
    fighter_pattern: Regex,
    fight_end_pattern: Regex,
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            cast_pattern: Regex::new(r"^([^:]+?)[:\s]+\s*lance le sort\s+(.+?)(?:\s*\(|$)")
                .expect("Invalid cast regex"),
            resource_pattern: Regex::new(r"^([^:]+):\s*(.+?)\s*\(\+(\d+)(?:\s*Niv\.)?\)(.*)$")
                .expect("Invalid resource regex"),
            rage_pattern: Regex::new(r"(\d+)\s+Rage\s*\(Traqueur\)").expect("Invalid rage regex"),
            buff_gained_pattern: Regex::new(r"^([^:]+):\s*(.+?)\s*\(Niv\.\s*\d+\)(.*)$")
                .expect("Invalid buff regex"),
            buff_lost_pattern: Regex::new(r"^([^:]+):\s*n'est plus sous l'emprise de '([^']+)'(.*)$")
                .expect("Invalid buff lost regex"),
            damage_pattern: Regex::new(r"^([^:]+):\s*-(\d+)\s*PV(.*)$")
                .expect("Invalid damage regex"),
            knockout_pattern: Regex::new(r"^(.+?)\s+est (?:hors-combat|KO !)")
                .expect("Invalid knockout regex"),
            fighter_pattern: Regex::new(
                r"\[_FL_\]\s+fightId=(\d+)\s+(.+?)\s+breed\s*:\s*(\d+)\s+.*?isControlledByAI=(true|false)",
            )
            .expect("Invalid fighter regex"),
            fight_end_pattern: Regex::new(r"\[FIGHT\]\s+End fight with id\s+(\d+)")
                .expect("Invalid fight end regex"),
        }
    }

    /// Parse one raw line.
    ///
    /// Returns `None` for lines that are neither combat-information lines nor
    /// one of the fight system markers.
    pub fn parse_line(&self, line_number: u64, line: &str) -> Option<ParsedLine> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (timestamp, content) = match split_timestamp(line) {
            Some((time, rest)) => (Some(time), rest),
            None => (None, line),
        };

        let mut events = Vec::new();

        // Markers that show up outside combat-information lines
        if is_punching_bag_taunt(content) {
            events.push(CombatEvent::SpecialCombatStart);
        } else if content.contains(FIGHTER_MARKER) {
            events.extend(self.parse_fighter(content));
        } else if content.contains(FIGHT_END_MARKER) {
            events.extend(self.parse_fight_end(content));
        }

        let Some(tag_pos) = memmem::find(content.as_bytes(), COMBAT_TAG.as_bytes()) else {
            if events.is_empty() {
                return None;
            }
            return Some(ParsedLine {
                line_number,
                timestamp,
                content: content.to_string(),
                events,
            });
        };

        let body = content[tag_pos + COMBAT_TAG.len()..].trim();
        self.parse_combat_body(body, &mut events);

        Some(ParsedLine {
            line_number,
            timestamp,
            content: content.to_string(),
            events,
        })
    }

    fn parse_combat_body(&self, body: &str, events: &mut Vec<CombatEvent>) {
        if body.contains(CAST_MARKER) {
            events.extend(self.parse_spell_cast(body));
            return;
        }

        if TURN_PASSED_MARKERS.iter().any(|m| body.contains(m)) {
            events.push(CombatEvent::TurnPassed);
            return;
        }

        if body.contains(COMBAT_ENDED_MARKER) {
            events.push(CombatEvent::CombatEnded { fight_id: None });
            return;
        }

        if body.contains(BUFF_LOST_MARKER) {
            if let Some(caps) = self.buff_lost_pattern.captures(body) {
                events.push(CombatEvent::BuffLost {
                    target: caps[1].trim().to_string(),
                    buff: caps[2].trim().to_string(),
                    tags: parse_tags(&caps[3]),
                });
            }
            return;
        }

        if let Some(caps) = self.damage_pattern.captures(body) {
            events.push(CombatEvent::Damage {
                target: caps[1].trim().to_string(),
                amount: parse_total(&caps[2]),
                tags: parse_tags(&caps[3]),
            });
            return;
        }

        if let Some(caps) = self.rage_pattern.captures(body) {
            events.push(CombatEvent::ResourceReport {
                target: speaker(body).unwrap_or_default().to_string(),
                resource: "Rage".to_string(),
                total: parse_total(&caps[1]),
                tags: vec!["Traqueur".to_string()],
            });
            return;
        }

        if let Some(caps) = self.resource_pattern.captures(body) {
            events.push(CombatEvent::ResourceReport {
                target: caps[1].trim().to_string(),
                resource: caps[2].trim().to_string(),
                total: parse_total(&caps[3]),
                tags: parse_tags(&caps[4]),
            });
            return;
        }

        if let Some(caps) = self.buff_gained_pattern.captures(body) {
            events.push(CombatEvent::BuffGained {
                target: caps[1].trim().to_string(),
                buff: caps[2].trim().to_string(),
                tags: parse_tags(&caps[3]),
            });
            return;
        }

        if let Some(caps) = self.knockout_pattern.captures(body) {
            events.push(CombatEvent::Knockout {
                target: caps[1].trim().to_string(),
            });
        }
    }

    fn parse_spell_cast(&self, body: &str) -> Option<CombatEvent> {
        let (caster, spell) = match self.cast_pattern.captures(body) {
            Some(caps) => (
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(2).map_or("", |m| m.as_str()),
            ),
            // e.g. a caster name with a colon the pattern refuses
            None => {
                let (before, after) = body.split_once(CAST_MARKER)?;
                let spell = after.split('(').next().unwrap_or_default();
                (before, spell)
            }
        };

        let caster = caster.trim().trim_matches(':').trim();
        let spell = spell.trim();
        if caster.is_empty() || spell.is_empty() {
            return None;
        }

        Some(CombatEvent::SpellCast {
            caster: caster.to_string(),
            spell: spell.to_string(),
        })
    }

    fn parse_fighter(&self, content: &str) -> Option<CombatEvent> {
        let caps = self.fighter_pattern.captures(content)?;
        // Monsters are AI-controlled
        if &caps[4] == "true" {
            return None;
        }
        Some(CombatEvent::FighterJoined {
            fight_id: caps[1].parse().ok()?,
            name: caps[2].trim().to_string(),
            breed: caps[3].parse().ok()?,
        })
    }

    fn parse_fight_end(&self, content: &str) -> Option<CombatEvent> {
        let caps = self.fight_end_pattern.captures(content)?;
        Some(CombatEvent::CombatEnded {
            fight_id: caps[1].parse().ok(),
        })
    }
}

/// Split a leading `HH:MM:SS,mmm - ` prefix off a line.
pub(crate) fn split_timestamp(line: &str) -> Option<(NaiveTime, &str)> {
    let b = line.as_bytes();
    if b.len() < 12 || b[2] != b':' || b[5] != b':' || b[8] != b',' {
        return None;
    }
    let digit = |i: usize| -> Option<u32> {
        let c = b[i];
        c.is_ascii_digit().then(|| (c - b'0') as u32)
    };

    let hour = digit(0)? * 10 + digit(1)?;
    let minute = digit(3)? * 10 + digit(4)?;
    let second = digit(6)? * 10 + digit(7)?;
    let millis = digit(9)? * 100 + digit(10)? * 10 + digit(11)?;
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;

    // `\s*-\s*` then at least one content character
    let rest = line[12..].trim_start();
    let rest = rest.strip_prefix('-')?.trim_start();
    if rest.is_empty() {
        return None;
    }
    Some((time, rest))
}

/// Reported numbers saturate at `u32::MAX`; engines clamp to their own caps.
fn parse_total(digits: &str) -> u32 {
    match digits.parse::<u32>() {
        Ok(value) => value,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
        Err(_) => 0,
    }
}

fn is_punching_bag_taunt(content: &str) -> bool {
    content.contains(PUNCHING_BAG) && PUNCHING_BAG_TAUNTS.iter().any(|t| content.contains(t))
}

/// Name before the first colon of a combat line body.
fn speaker(body: &str) -> Option<&str> {
    let colon = memchr(b':', body.as_bytes())?;
    Some(body[..colon].trim())
}

/// Collect every `(...)` group in a line suffix.
fn parse_tags(rest: &str) -> Vec<String> {
    let b = rest.as_bytes();
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(open) = memchr(b'(', &b[pos..]) {
        let start = pos + open + 1;
        let Some(close) = memchr(b')', &b[start..]) else {
            break;
        };
        let tag = rest[start..start + close].trim();
        if !tag.is_empty() {
            tags.push(tag.to_string());
        }
        pos = start + close + 1;
    }
    tags
}
