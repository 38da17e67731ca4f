//! Fighters seen in the current combat.

use waksense_types::{ClassKind, FighterView};

use crate::resources::{CRA_SPELLS, IOP_SPELLS, OUGINAK_SPELLS};

/// Lowercase and strip French diacritics so "Éventrail" matches "eventrail".
fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'à' | 'â' | 'ä' | 'À' | 'Â' | 'Ä' => out.push('a'),
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => out.push('e'),
            'î' | 'ï' | 'Î' | 'Ï' => out.push('i'),
            'ô' | 'ö' | 'Ô' | 'Ö' => out.push('o'),
            'ù' | 'û' | 'ü' | 'Ù' | 'Û' | 'Ü' => out.push('u'),
            'ç' | 'Ç' => out.push('c'),
            'œ' | 'Œ' => out.push_str("oe"),
            'æ' | 'Æ' => out.push_str("ae"),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

fn list_matches<'a>(mut names: impl Iterator<Item = &'a str>, folded: &str) -> bool {
    names.any(|name| folded.contains(&fold(name)))
}

/// Class owning a spell, by folded substring. Iop is checked first, then Cra,
/// then Ouginak.
pub fn detect_class(spell: &str) -> Option<ClassKind> {
    let folded = fold(spell.trim());
    if folded.is_empty() {
        return None;
    }
    if list_matches(IOP_SPELLS.keys().copied(), &folded) {
        Some(ClassKind::Iop)
    } else if list_matches(CRA_SPELLS.iter().copied(), &folded) {
        Some(ClassKind::Cra)
    } else if list_matches(OUGINAK_SPELLS.iter().copied(), &folded) {
        Some(ClassKind::Ouginak)
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    fighters: Vec<FighterView>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fighter. Returns true when the name is new, or when a known
    /// fighter's class was first learned.
    pub fn record(&mut self, name: &str, class: Option<ClassKind>) -> bool {
        match self.fighters.iter_mut().find(|f| f.name == name) {
            Some(known) if known.class.is_none() && class.is_some() => {
                known.class = class;
                true
            }
            Some(_) => false,
            None => {
                self.fighters.push(FighterView {
                    name: name.to_string(),
                    class,
                });
                true
            }
        }
    }

    /// Record the caster of a spell under the class that spell belongs to.
    pub fn record_cast(&mut self, caster: &str, spell: &str) -> Option<ClassKind> {
        let class = detect_class(spell)?;
        self.record(caster, Some(class)).then_some(class)
    }

    pub fn class_of(&self, name: &str) -> Option<ClassKind> {
        self.fighters
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.class)
    }

    pub fn fighters(&self) -> &[FighterView] {
        &self.fighters
    }

    pub fn clear(&mut self) {
        self.fighters.clear();
    }
}
