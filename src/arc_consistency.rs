//! A crossword-specific implementation of the AC-3 algorithm. For our purposes the grid is
//! arc-consistent when every word left in a slot's domain has at least one word in each crossing
//! slot's domain that puts the same letter in the shared cell.
//!
//! Propagation here is a proof tool, not a solver: success only means no local contradiction was
//! found. An emptied domain, on the other hand, means the grid can't be filled.

use bit_set::BitSet;
use log::debug;
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// An ordered pair of slots `(x, y)`; revising it makes `x` consistent with `y`.
pub type Arc = (SlotId, SlotId);

/// Data structure used in `establish_arc_consistency` to track which arcs we need to revise. An
/// arc that's already waiting in the queue isn't added a second time.
#[derive(Debug, Default)]
struct ConsistencyQueue {
    queue: VecDeque<Arc>,
    queued: HashSet<Arc>,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
        where
            Items: IntoIterator<Item=Arc>
    {
        let mut queue = ConsistencyQueue::default();
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Counts from a successful call to `establish_arc_consistency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    pub revisions: usize,
    pub eliminations: usize,
}

/// Returned when propagation empties a slot's domain, which proves the grid is unfillable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub emptied_slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make slot `x` arc-consistent with slot `y`: remove every word from `x`'s domain that has no
/// partner in `y`'s domain sharing its letter at the overlap. Returns the number of words removed,
/// which is always 0 if the slots don't cross.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> usize {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return 0;
    };

    // Which glyphs can `y` still put in the shared cell?
    let supported_glyphs: BitSet = domains.get(y).iter()
        .filter_map(|word_id| word_list.word(word_id).glyphs.get(y_cell).copied())
        .collect();

    let unsupported: Vec<WordId> = domains.get(x).iter()
        .filter(|&word_id| {
            !word_list.word(word_id).glyphs.get(x_cell)
                .is_some_and(|&glyph| supported_glyphs.contains(glyph))
        })
        .collect();

    domains.eliminate(x, unsupported)
}

/// Run AC-3 over the given arcs, or over every arc in the grid if `arcs` is `None`. Whenever a
/// revision shrinks a slot, every other arc pointing at that slot is queued again. Stops at the
/// first emptied domain.
pub fn establish_arc_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<&[Arc]>,
) -> ArcConsistencyResult {
    let mut queue = match arcs {
        Some(arcs) => ConsistencyQueue::with_initial_queue(arcs.iter().copied()),
        None => ConsistencyQueue::with_initial_queue(config.arcs()),
    };

    let mut success = ArcConsistencySuccess { revisions: 0, eliminations: 0 };

    while let Some((x, y)) = queue.pop_front() {
        success.revisions += 1;

        let removed = revise(config, word_list, domains, x, y);
        if removed == 0 {
            continue;
        }
        success.eliminations += removed;

        if domains.is_empty(x) {
            debug!("Arc consistency emptied slot {x} while revising against slot {y}");
            return Err(ArcConsistencyFailure { emptied_slot_id: x });
        }

        // `x` shrank, so its other neighbors may have lost their support in it.
        for z in config.slot_configs[x].neighbors().filter(|&z| z != y) {
            queue.enqueue((z, x));
        }
    }

    debug!(
        "Arc consistency finished after {} revisions, eliminating {} options ({} remain)",
        success.revisions, success.eliminations, domains.total_options(),
    );

    Ok(success)
}
