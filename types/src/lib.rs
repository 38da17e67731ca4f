//! Shared configuration and snapshot types for Waksense
//!
//! This crate contains serializable types that are shared between the core
//! engine (waksense-core) and whatever renders its output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Classes
// ─────────────────────────────────────────────────────────────────────────────

/// Character classes with a resource engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassKind {
    #[default]
    Iop,
    Cra,
    Ouginak,
}

impl ClassKind {
    pub const ALL: [ClassKind; 3] = [ClassKind::Iop, ClassKind::Cra, ClassKind::Ouginak];

    /// Map the numeric `breed` from fighter roster lines to a class.
    /// Only breeds confirmed against real logs are listed.
    pub fn from_breed(breed: u32) -> Option<Self> {
        match breed {
            8 => Some(ClassKind::Iop),
            9 => Some(ClassKind::Cra),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClassKind::Iop => "Iop",
            ClassKind::Cra => "Cra",
            ClassKind::Ouginak => "Ouginak",
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a class name doesn't match any [`ClassKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownClass(pub String);

impl fmt::Display for UnknownClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown class '{}' (expected iop, cra or ouginak)", self.0)
    }
}

impl std::error::Error for UnknownClass {}

impl FromStr for ClassKind {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassKind::ALL
            .into_iter()
            .find(|class| class.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownClass(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_window_ms() -> i64 {
    100
}

fn default_capacity() -> usize {
    1000
}

fn default_timeline_capacity() -> usize {
    5
}

/// A character the overlay runs a pipeline for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedCharacter {
    pub name: String,
    pub class: ClassKind,
    /// Locked overlays stay visible when the character's turn ends.
    #[serde(default)]
    pub locked: bool,
}

/// Duplicate suppression tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupSettings {
    #[serde(default = "default_window_ms")]
    pub window_ms: i64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            capacity: default_capacity(),
            enabled: true,
        }
    }
}

/// Tailer polling and backoff, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailerSettings {
    pub poll_interval_ms: u64,
    pub missing_file_interval_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub max_consecutive_failures: u32,
}

impl Default for TailerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            missing_file_interval_ms: 1000,
            backoff_base_ms: 1000,
            backoff_max_ms: 10_000,
            max_consecutive_failures: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log_file: String,
    #[serde(default)]
    pub characters: Vec<TrackedCharacter>,
    #[serde(default)]
    pub dedup: DedupSettings,
    #[serde(default)]
    pub tailer: TailerSettings,
    #[serde(default = "default_timeline_capacity")]
    pub timeline_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_log_file(String::new())
    }
}

impl AppConfig {
    /// Create a new AppConfig pointing at the given chat log.
    /// Other fields use their default values.
    pub fn with_log_file(log_file: String) -> Self {
        Self {
            log_file,
            characters: Vec::new(),
            dedup: DedupSettings::default(),
            tailer: TailerSettings::default(),
            timeline_capacity: default_timeline_capacity(),
        }
    }

    pub fn character(&self, name: &str) -> Option<&TrackedCharacter> {
        self.characters.iter().find(|c| c.name == name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot Types (core → renderer)
// ─────────────────────────────────────────────────────────────────────────────

/// Current value of a capped counter or stack pile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterView {
    pub name: String,
    pub value: u32,
    pub cap: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagView {
    pub name: String,
    pub active: bool,
}

/// Class resources as the renderer sees them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub counters: Vec<CounterView>,
    pub flags: Vec<FlagView>,
}

impl ResourceSnapshot {
    pub fn counter(&self, name: &str) -> Option<u32> {
        self.counters.iter().find(|c| c.name == name).map(|c| c.value)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.iter().find(|f| f.name == name).map(|f| f.active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboView {
    pub id: String,
    pub step: usize,
    pub len: usize,
    /// One more matching cast completes this combo.
    pub ready_to_complete: bool,
    pub completed_this_turn: bool,
}

/// One tracked-player cast in the history strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub spell: String,
    pub display_cost: String,
    pub sequence_index: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineView {
    pub live: Vec<TimelineEntry>,
    /// Entry pushed out by the latest cast, reported once before it is dropped.
    pub evicting: Option<TimelineEntry>,
}

/// Duplicate suppressor counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupStats {
    pub total_messages: u64,
    pub duplicates_detected: u64,
    pub messages_processed: usize,
    pub duplicate_window_ms: i64,
    /// Percentage of seen lines that were rejected.
    pub duplicate_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorState {
    #[default]
    Running,
    WaitingForFile,
    Stopped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterView {
    pub name: String,
    pub class: Option<ClassKind>,
}

/// Everything a renderer needs for one tracked character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlaySnapshot {
    pub character: String,
    pub class: ClassKind,
    pub in_combat: bool,
    pub tracked_player: Option<String>,
    pub is_tracked_turn: bool,
    pub overlay_visible: bool,
    pub resources: ResourceSnapshot,
    pub combos: Vec<ComboView>,
    pub timeline: TimelineView,
    pub fighters: Vec<FighterView>,
    pub dedup: DedupStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_from_str_ignores_case() {
        assert_eq!("cra".parse::<ClassKind>(), Ok(ClassKind::Cra));
        assert_eq!(" OUGINAK ".parse::<ClassKind>(), Ok(ClassKind::Ouginak));
        assert!("eniripsa".parse::<ClassKind>().is_err());
    }

    #[test]
    fn test_breed_mapping() {
        assert_eq!(ClassKind::from_breed(8), Some(ClassKind::Iop));
        assert_eq!(ClassKind::from_breed(9), Some(ClassKind::Cra));
        assert_eq!(ClassKind::from_breed(11), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.dedup.window_ms, 100);
        assert_eq!(config.dedup.capacity, 1000);
        assert_eq!(config.tailer.max_consecutive_failures, 5);
        assert_eq!(config.timeline_capacity, 5);
    }
}
