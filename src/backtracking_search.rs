//! Chronological backtracking over a single owned `Assignment`. Each frame binds a word, checks
//! the whole assignment for consistency, recurses, and unbinds on failure, so no frame ever sees
//! another frame's tentative choice. Domains are read-only here; they only guide the variable and
//! value ordering.

use bit_set::BitSet;
use instant::Instant;
use std::cmp::Reverse;

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// The working assignment: at most one word per slot, indexed by slot id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a grid with the given number of slots.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { words: vec![None; slot_count], assigned_count: 0 }
    }

    /// Assign a word to a slot, returning whatever was there before.
    pub fn bind(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.words[slot_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    /// Clear a slot, returning the word it held.
    pub fn unbind(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.words[slot_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words[slot_id]
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.words[slot_id].is_some()
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned_count
    }

    pub fn slot_count(&self) -> usize {
        self.words.len()
    }

    /// The assigned slots, in slot order.
    pub fn choices(&self) -> Vec<Choice> {
        self.words.iter().enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| Choice { slot_id, word_id }))
            .collect()
    }
}

/// Is every slot in the grid assigned a non-empty word?
pub fn assignment_complete(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> bool {
    assignment.slot_count() == config.slot_count() &&
        assignment.words.iter().all(|word_id| {
            word_id.is_some_and(|word_id| !word_list.word(word_id).is_empty())
        })
}

/// Check the assignment from scratch: no word is used twice, every word fits its slot, and
/// every pair of assigned crossing slots agrees on the shared letter.
pub fn consistent(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> bool {
    let choices = assignment.choices();
    let mut used_word_ids = BitSet::with_capacity(word_list.len());

    for &Choice { slot_id, word_id } in &choices {
        if !used_word_ids.insert(word_id) {
            return false;
        }
        if word_list.word(word_id).len() != config.slot_configs[slot_id].length {
            return false;
        }
    }

    // Lengths are known to match from here on.
    choices.iter().all(|&Choice { slot_id, word_id }| {
        let word = word_list.word(word_id);

        config.slot_configs[slot_id].crossings.iter().enumerate().all(|(cell_idx, crossing)| {
            let Some(crossing) = crossing else {
                return true;
            };
            match assignment.get(crossing.other_slot_id) {
                Some(other_word_id) => {
                    word.glyphs[cell_idx] ==
                        word_list.word(other_word_id).glyphs[crossing.other_slot_cell]
                }
                None => true,
            }
        })
    })
}

/// Pick the unassigned slot with the fewest remaining options, preferring slots with more
/// crossings on a tie and then the lowest slot id.
pub fn select_unassigned_variable(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    config.slot_configs.iter()
        .filter(|slot_config| !assignment.is_assigned(slot_config.id))
        .min_by_key(|slot_config| {
            (domains.len(slot_config.id), Reverse(slot_config.degree()), slot_config.id)
        })
        .map(|slot_config| slot_config.id)
}

/// Return the slot's options ordered by how many options they would rule out in unassigned
/// crossing slots, fewest first. Equal costs keep ascending word id order.
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    slot_id: SlotId,
    assignment: &Assignment,
) -> Vec<WordId> {
    // For each cell crossing an unassigned slot, count how many of that slot's options put each
    // glyph in the shared cell. A candidate's cost at that cell is everything else.
    let crossing_glyph_counts: Vec<(usize, usize, Vec<usize>)> = config.slot_configs[slot_id].crossings
        .iter()
        .enumerate()
        .filter_map(|(cell_idx, crossing)| {
            let crossing = crossing.filter(|crossing| !assignment.is_assigned(crossing.other_slot_id))?;

            let mut glyph_counts = vec![0; word_list.glyphs.len()];
            for other_word_id in domains.get(crossing.other_slot_id) {
                if let Some(&glyph) = word_list.word(other_word_id).glyphs.get(crossing.other_slot_cell) {
                    glyph_counts[glyph] += 1;
                }
            }

            Some((cell_idx, domains.len(crossing.other_slot_id), glyph_counts))
        })
        .collect();

    let mut options = domains.options(slot_id);
    options.sort_by_cached_key(|&word_id| {
        let word = word_list.word(word_id);

        crossing_glyph_counts.iter().map(|(cell_idx, option_count, glyph_counts)| {
            match word.glyphs.get(*cell_idx) {
                Some(&glyph) => option_count - glyph_counts[glyph],
                None => *option_count,
            }
        }).sum::<usize>()
    });
    options
}

/// Returned when the search hits its deadline before reaching an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded;

/// Recursive backtracking search over fixed domains.
#[derive(Debug)]
pub struct BacktrackingSearch<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    domains: &'a Domains,
    deadline: Option<Instant>,

    /// How many calls to `backtrack` have been made.
    pub states: u64,

    /// How many bindings were undone after the subtree below them failed.
    pub backtracks: u64,
}

impl<'a> BacktrackingSearch<'a> {
    pub fn new(
        config: &'a GridConfig,
        word_list: &'a WordList,
        domains: &'a Domains,
        deadline: Option<Instant>,
    ) -> BacktrackingSearch<'a> {
        BacktrackingSearch { config, word_list, domains, deadline, states: 0, backtracks: 0 }
    }

    /// Try to extend `assignment` into a complete, consistent one. On `Ok(true)` the assignment
    /// holds the solution; on `Ok(false)` or `Err` every binding made below this call has been
    /// undone. The deadline is checked at the start of each call.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, DeadlineExceeded> {
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(DeadlineExceeded);
        }
        self.states += 1;

        if assignment_complete(self.config, self.word_list, assignment) {
            return Ok(true);
        }

        let Some(slot_id) = select_unassigned_variable(self.config, self.domains, assignment) else {
            return Ok(false);
        };

        for word_id in order_domain_values(self.config, self.word_list, self.domains, slot_id, assignment) {
            assignment.bind(slot_id, word_id);

            if consistent(self.config, self.word_list, assignment) {
                match self.backtrack(assignment) {
                    Ok(true) => return Ok(true),
                    Ok(false) => self.backtracks += 1,
                    Err(err) => {
                        // Unwinding on the deadline still leaves the assignment as we found it.
                        assignment.unbind(slot_id);
                        return Err(err);
                    }
                }
            }

            assignment.unbind(slot_id);
        }

        Ok(false)
    }
}
