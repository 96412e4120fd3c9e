pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod word_list;

use instant::{Duration, Instant};
use log::{debug, info, warn};

use crate::arc_consistency::establish_arc_consistency;
use crate::backtracking_search::{Assignment, BacktrackingSearch, DeadlineExceeded};
use crate::domains::{enforce_node_consistency, Domains};

pub use crate::backtracking_search::Choice;
pub use crate::error::{GridError, WordListError};
pub use crate::grid_config::{Direction, GridConfig, GridEntry, SlotId};
pub use crate::word_list::{WordId, WordList};

/// The expected maximum number of distinct characters appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Glyph used by `render_grid` for blocked cells.
const BLOCK_GLYPH: char = '█';

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// Options removed by node and arc consistency before the search started.
    pub pruned_options: usize,
    pub states: u64,
    pub backtracks: u64,
    pub duration: Duration,
}

/// Settings for a fill operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOptions {
    /// Give up once the search has been running this long. The deadline is only checked between
    /// search steps, so the call can run slightly over.
    pub deadline: Option<Duration>,
}

/// A struct representing the results of a fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,

    /// One choice per slot, in slot order.
    pub choices: Vec<Choice>,
}

impl FillSuccess {
    /// The chosen word for each slot, in slot order.
    pub fn words<'a>(&self, word_list: &'a WordList) -> Vec<&'a str> {
        self.choices.iter().map(|choice| word_list.word(choice.word_id).string.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    /// No complete, consistent fill exists.
    Unsatisfiable,

    /// The deadline passed before the search reached an answer.
    DeadlineExceeded,
}

/// Search for a valid fill for the given grid, with no deadline.
pub fn find_fill(config: &GridConfig, word_list: &WordList) -> Result<FillSuccess, FillFailure> {
    find_fill_with_options(config, word_list, &FillOptions::default())
}

/// Search for a valid fill for the given grid: seed every slot with the whole word list, prune by
/// length and then by arc consistency, and finally run a backtracking search over what's left.
pub fn find_fill_with_options(
    config: &GridConfig,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let deadline = options.deadline.map(|deadline| start + deadline);

    let mut domains = Domains::new(config, word_list);
    let initial_options = domains.total_options();

    enforce_node_consistency(config, word_list, &mut domains);
    if let Some(slot_config) = config.slot_configs.iter().find(|slot_config| domains.is_empty(slot_config.id)) {
        info!("No fill possible: slot {} has no words of the right length", slot_config.id);
        return Err(FillFailure::Unsatisfiable);
    }

    if let Err(failure) = establish_arc_consistency(config, word_list, &mut domains, None) {
        info!("No fill possible: arc consistency emptied slot {}", failure.emptied_slot_id);
        return Err(FillFailure::Unsatisfiable);
    }

    let pruned_options = initial_options - domains.total_options();
    debug!("Pruned {pruned_options} of {initial_options} options before searching");

    let mut assignment = Assignment::new(config.slot_count());
    let mut search = BacktrackingSearch::new(config, word_list, &domains, deadline);

    let solved = search.backtrack(&mut assignment).map_err(|DeadlineExceeded| {
        warn!("Gave up after {} states and {} backtracks", search.states, search.backtracks);
        FillFailure::DeadlineExceeded
    })?;

    let statistics = Statistics {
        pruned_options,
        states: search.states,
        backtracks: search.backtracks,
        duration: start.elapsed(),
    };

    if !solved {
        info!("No fill possible: search exhausted ({statistics:?})");
        return Err(FillFailure::Unsatisfiable);
    }

    info!("Found a fill ({statistics:?})");

    Ok(FillSuccess {
        statistics,
        choices: assignment.choices(),
    })
}

/// Turn the given grid config and fill choices into a rendered string, with blocks drawn as `█`
/// and empty fillable cells as spaces.
pub fn render_grid(config: &GridConfig, word_list: &WordList, choices: &[Choice]) -> String {
    let mut grid: Vec<Vec<char>> = config.fillable.iter().map(|row| {
        row.iter().map(|&fillable| if fillable { ' ' } else { BLOCK_GLYPH }).collect()
    }).collect();

    for &Choice { slot_id, word_id } in choices {
        let word = word_list.word(word_id);

        for ((row, col), &glyph) in config.slot_configs[slot_id].cell_coords().into_iter().zip(&word.glyphs) {
            grid[row][col] = word_list.glyphs[glyph];
        }
    }

    grid.into_iter().map(|row| row.into_iter().collect::<String>()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use instant::Duration;

    use crate::backtracking_search::{assignment_complete, consistent, Assignment};
    use crate::grid_config::unindent;
    use crate::{find_fill, find_fill_with_options, render_grid, FillFailure, FillOptions, FillSuccess, GridConfig, WordList};

    /// Check a successful result against the grid from scratch.
    fn assert_valid_fill(config: &GridConfig, word_list: &WordList, result: &FillSuccess) {
        let mut assignment = Assignment::new(config.slot_count());
        for choice in &result.choices {
            assignment.bind(choice.slot_id, choice.word_id);
        }

        assert!(assignment_complete(config, word_list, &assignment), "fill is incomplete");
        assert!(consistent(config, word_list, &assignment), "fill is inconsistent");
    }

    /// ___
    /// ##_
    /// ##_
    #[test]
    fn test_find_fill_for_two_crossing_slots() {
        let config = GridConfig::from_template("___\n##_\n##_").unwrap();
        let word_list = WordList::from_words(["CAT", "DOG", "TIE"]);

        let result = find_fill(&config, &word_list).expect("Failed to find a fill");

        assert_valid_fill(&config, &word_list, &result);
        assert_eq!(result.words(&word_list), ["CAT", "TIE"]);
        assert_eq!(render_grid(&config, &word_list, &result.choices), "CAT\n██I\n██E");
    }

    /// _##
    /// ___
    /// _##
    #[test]
    fn test_find_fill_where_one_slot_starts_mid_crossing() {
        // The down slot's middle cell is the across slot's first cell.
        let config = GridConfig::from_template("_##\n___\n_##").unwrap();
        assert_eq!(config.overlap(1, 0), Some((1, 0)));

        // No down word has a middle letter that starts an across word.
        let word_list = WordList::from_words(["CAT", "DOG", "TIE"]);
        assert_matches!(find_fill(&config, &word_list), Err(FillFailure::Unsatisfiable));

        let word_list = WordList::from_words(["CAT", "DOG", "TIE", "ACE"]);
        let result = find_fill(&config, &word_list).expect("Failed to find a fill");

        assert_valid_fill(&config, &word_list, &result);
        // ACE across with CAT down works too, but CAT comes first in the list.
        assert_eq!(result.words(&word_list), ["CAT", "ACE"]);
        assert_eq!(render_grid(&config, &word_list, &result.choices), "A██\nCAT\nE██");
    }

    /// ___
    /// ___
    /// ___
    #[test]
    fn test_find_fill_for_3x3_square() {
        let config = GridConfig::from_template("___\n___\n___").unwrap();
        let word_list = WordList::from_words([
            "ARE", "CAT", "COW", "DOG", "EMU", "ODE", "ORE", "RAT", "TED", "TOE", "WED",
        ]);

        let result = find_fill(&config, &word_list).expect("Failed to find a fill");

        assert_valid_fill(&config, &word_list, &result);
        assert_eq!(result.choices.len(), 6);
    }

    /// #___#
    /// #_#_#
    /// _____
    /// #_#_#
    /// #___#
    #[test]
    fn test_find_fill_for_template_with_blocks() {
        let config = GridConfig::from_template(&unindent(
            "
            #___#
            #_#_#
            _____
            #_#_#
            #___#
            ",
        )).unwrap();
        // SEA / HERON / TOT across with SHEET / ALOFT down is one fill.
        let word_list = WordList::from_words([
            "ACE", "APE", "ERROR", "HERON", "LEAST", "MOTTO", "OAT", "SEA", "SHEET", "STEPS",
            "TOT", "ARROW", "ATE", "EAR", "OAR", "TEN", "ALOFT", "ONION", "SPA", "TOO",
        ]);

        let result = find_fill(&config, &word_list).expect("Failed to find a fill");

        assert_valid_fill(&config, &word_list, &result);
        assert_eq!(result.choices.len(), 5);
    }

    #[test]
    fn test_missing_word_length_is_unsatisfiable() {
        let config = GridConfig::from_template("____").unwrap();
        let word_list = WordList::from_words(["CAT", "DOG", "EMUS"]);
        let word_list_without_fours = WordList::from_words(["CAT", "DOG", "ELEPHANT"]);

        assert!(find_fill(&config, &word_list).is_ok());
        assert_matches!(find_fill(&config, &word_list_without_fours), Err(FillFailure::Unsatisfiable));
    }

    #[test]
    fn test_incompatible_crossing_is_unsatisfiable() {
        // The across slot crosses the down slot at its middle letter, and nothing lines up.
        let config = GridConfig::from_template("___\n#_#\n#_#").unwrap();
        let word_list = WordList::from_words(["CAT", "HAT", "BOX", "BEE"]);

        assert_matches!(find_fill(&config, &word_list), Err(FillFailure::Unsatisfiable));
    }

    #[test]
    fn test_fill_fails_gracefully_when_only_duplicates_fit() {
        // Arc consistency keeps both words; only the rule against repeats rules out AA crossing AA.
        let config = GridConfig::from_template("__\n_#").unwrap();
        let word_list = WordList::from_words(["AA", "BC"]);

        assert_matches!(find_fill(&config, &word_list), Err(FillFailure::Unsatisfiable));
    }

    #[test]
    fn test_word_list_order_does_not_change_solvability() {
        let puzzles: [(&str, &[&str]); 3] = [
            ("___\n___\n___", &["ARE", "CAT", "COW", "DOG", "EMU", "ODE", "ORE", "RAT", "TED", "TOE", "WED"]),
            ("_##\n___\n_##", &["CAT", "DOG", "TIE", "ACE"]),
            ("__\n_#", &["AA", "BC"]),
        ];

        for (template, words) in puzzles {
            let config = GridConfig::from_template(template).unwrap();
            let forward = WordList::from_words(words.iter());
            let reversed = WordList::from_words(words.iter().rev());

            let forward_result = find_fill(&config, &forward);
            let reversed_result = find_fill(&config, &reversed);

            assert_eq!(forward_result.is_ok(), reversed_result.is_ok(), "{template:?}");
            if let Ok(result) = &reversed_result {
                assert_valid_fill(&config, &reversed, result);
            }
        }
    }

    #[test]
    fn test_fully_blocked_grid_has_empty_fill() {
        let config = GridConfig::from_template("###\n###").unwrap();
        let word_list = WordList::from_words(["CAT"]);

        let result = find_fill(&config, &word_list).expect("Empty grid is trivially filled");

        assert!(result.choices.is_empty());
        assert_eq!(render_grid(&config, &word_list, &result.choices), "███\n███");
    }

    #[test]
    fn test_deadline_is_reported() {
        let config = GridConfig::from_template("___\n___\n___").unwrap();
        let word_list = WordList::from_words(["ARE", "CAT", "COW", "ORE", "TED", "WED"]);

        let result = find_fill_with_options(
            &config,
            &word_list,
            &FillOptions { deadline: Some(Duration::ZERO) },
        );

        assert_matches!(result, Err(FillFailure::DeadlineExceeded));
    }
}
