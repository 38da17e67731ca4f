//! Ability sequence ("combo") matching over cast cost tokens.

use waksense_types::ComboView;

/// A fixed sequence of cost tokens such as `["1PM", "3PA", "3PA"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboDefinition {
    pub id: &'static str,
    pub tokens: &'static [&'static str],
}

impl ComboDefinition {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Progress through every combo of one class.
///
/// Completion is transient: a finished combo is recorded for the turn and
/// its step drops straight back to 0.
#[derive(Debug, Clone)]
pub struct ComboMatcher {
    definitions: &'static [ComboDefinition],
    steps: Vec<usize>,
    completed_this_turn: Vec<&'static str>,
}

impl ComboMatcher {
    pub fn new(definitions: &'static [ComboDefinition]) -> Self {
        Self {
            definitions,
            steps: vec![0; definitions.len()],
            completed_this_turn: Vec::new(),
        }
    }

    /// Feed the cost token of one tracked-player cast.
    /// Returns the ids of combos completed by this token.
    pub fn feed(&mut self, token: &str) -> Vec<&'static str> {
        let matched: Vec<bool> = self
            .definitions
            .iter()
            .zip(&self.steps)
            .map(|(def, &step)| def.tokens.get(step) == Some(&token))
            .collect();

        if matched.iter().any(|&m| m) {
            for (step, matched) in self.steps.iter_mut().zip(&matched) {
                if *matched {
                    *step += 1;
                } else {
                    *step = 0;
                }
            }
        } else {
            self.steps.fill(0);
            // only the first combo opening with this token restarts
            if let Some(idx) = self
                .definitions
                .iter()
                .position(|def| def.tokens.first() == Some(&token))
            {
                self.steps[idx] = 1;
            }
        }

        let mut completed = Vec::new();
        for (def, step) in self.definitions.iter().zip(self.steps.iter_mut()) {
            if *step >= def.len() {
                *step = 0;
                completed.push(def.id);
                if !self.completed_this_turn.contains(&def.id) {
                    self.completed_this_turn.push(def.id);
                }
            }
        }
        completed
    }

    /// Drop all progress, including this turn's completions.
    pub fn reset(&mut self) {
        self.steps.fill(0);
        self.completed_this_turn.clear();
    }

    /// Turn boundary; same as [`ComboMatcher::reset`].
    pub fn end_turn(&mut self) {
        self.reset();
    }

    pub fn step(&self, id: &str) -> Option<usize> {
        self.definitions
            .iter()
            .position(|def| def.id == id)
            .map(|idx| self.steps[idx])
    }

    pub fn completed_this_turn(&self) -> &[&'static str] {
        &self.completed_this_turn
    }

    pub fn views(&self) -> Vec<ComboView> {
        self.definitions
            .iter()
            .zip(&self.steps)
            .map(|(def, &step)| ComboView {
                id: def.id.to_string(),
                step,
                len: def.len(),
                ready_to_complete: step > 0 && step + 1 == def.len(),
                completed_this_turn: self.completed_this_turn.contains(&def.id),
            })
            .collect()
    }
}
