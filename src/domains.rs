use bit_set::BitSet;
use log::{debug, warn};

use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// The current candidate words for each slot. Domains only ever shrink: words are removed by node
/// and arc consistency and are never added back during a solve.
#[derive(Debug, Clone)]
pub struct Domains {
    by_slot: Vec<BitSet>,
}

impl Domains {
    /// Seed every slot's domain with the whole word list.
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        let all_words: BitSet = (0..word_list.len()).collect();

        Domains {
            by_slot: config.slot_configs.iter().map(|_| all_words.clone()).collect(),
        }
    }

    /// Build domains from explicit word ids per slot, for setting up specific propagation
    /// scenarios.
    #[cfg(test)]
    pub(crate) fn from_options(options_by_slot: Vec<Vec<WordId>>) -> Domains {
        Domains {
            by_slot: options_by_slot.into_iter()
                .map(|options| options.into_iter().collect())
                .collect(),
        }
    }

    pub fn get(&self, slot_id: SlotId) -> &BitSet {
        &self.by_slot[slot_id]
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.by_slot[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.by_slot[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.by_slot[slot_id].contains(word_id)
    }

    pub fn slot_count(&self) -> usize {
        self.by_slot.len()
    }

    /// Remove the given words from a slot's domain, returning how many were actually present.
    pub fn eliminate<I>(&mut self, slot_id: SlotId, word_ids: I) -> usize
        where
            I: IntoIterator<Item=WordId>
    {
        let domain = &mut self.by_slot[slot_id];
        word_ids.into_iter().filter(|&word_id| domain.remove(word_id)).count()
    }

    /// Total number of candidates across all slots.
    pub fn total_options(&self) -> usize {
        self.by_slot.iter().map(|domain| domain.len()).sum()
    }

    /// Sorted word ids for a slot's domain.
    pub fn options(&self, slot_id: SlotId) -> Vec<WordId> {
        self.by_slot[slot_id].iter().collect()
    }
}

/// Remove every word whose length doesn't match its slot's length. An emptied domain isn't an
/// error here; it's left for the caller to report.
pub fn enforce_node_consistency(config: &GridConfig, word_list: &WordList, domains: &mut Domains) {
    for slot_config in &config.slot_configs {
        let wrong_length: Vec<WordId> = domains.get(slot_config.id).iter()
            .filter(|&word_id| word_list.word(word_id).len() != slot_config.length)
            .collect();

        domains.eliminate(slot_config.id, wrong_length);

        if domains.is_empty(slot_config.id) {
            warn!(
                "No words of length {} available for slot {} at {:?}",
                slot_config.length, slot_config.id, slot_config.start_cell,
            );
        }
    }

    debug!("Node consistency left {} options across {} slots", domains.total_options(), domains.slot_count());
}
