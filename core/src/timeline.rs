//! Recent-cast history for the overlay.

use std::collections::VecDeque;

use waksense_types::{TimelineEntry, TimelineView};

pub const DEFAULT_TIMELINE_CAPACITY: usize = 5;

/// Bounded history of the tracked player's casts.
///
/// Holds at most `capacity` live entries. On overflow the oldest entry stays
/// at the front as a transient extra until [`CastTimeline::take_evicting`]
/// hands it out once, or the next push replaces it.
#[derive(Debug, Clone)]
pub struct CastTimeline {
    entries: VecDeque<TimelineEntry>,
    capacity: usize,
    next_index: u64,
}

impl Default for CastTimeline {
    fn default() -> Self {
        Self::new(DEFAULT_TIMELINE_CAPACITY)
    }
}

impl CastTimeline {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            next_index: 0,
        }
    }

    fn has_evicting(&self) -> bool {
        self.entries.len() > self.capacity
    }

    pub fn push(&mut self, spell: &str, display_cost: &str) {
        // an eviction nobody looked at is dropped for good
        if self.has_evicting() {
            self.entries.pop_front();
        }
        self.entries.push_back(TimelineEntry {
            spell: spell.to_string(),
            display_cost: display_cost.to_string(),
            sequence_index: self.next_index,
        });
        self.next_index += 1;
    }

    /// Rewrite the cost of the newest entry in place.
    ///
    /// Returns false, changing nothing, when the timeline is empty or the
    /// newest entry is a different spell.
    pub fn correct_last(&mut self, spell: &str, display_cost: &str) -> bool {
        match self.entries.back_mut() {
            Some(last) if last.spell == spell => {
                last.display_cost = display_cost.to_string();
                true
            }
            _ => false,
        }
    }

    /// Remove and return the entry being evicted, if any.
    pub fn take_evicting(&mut self) -> Option<TimelineEntry> {
        if self.has_evicting() {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Live entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        let skip = usize::from(self.has_evicting());
        self.entries.iter().skip(skip)
    }

    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len().min(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current view; consumes the pending eviction.
    pub fn view(&mut self) -> TimelineView {
        let evicting = self.take_evicting();
        TimelineView {
            live: self.entries.iter().cloned().collect(),
            evicting,
        }
    }
}
