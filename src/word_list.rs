use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::WordListError;
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given letter, based on its index in the word list's `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the word list's `words` field. Ids follow
/// the order in which each distinct word first appeared in the input.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// The length of the word in glyphs (not bytes).
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The set of candidate words available to fill slots, interned as glyph sequences so that
/// crossing checks are integer comparisons.
#[derive(Default)]
pub struct WordList {
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,
    glyph_ids_by_char: HashMap<char, GlyphId>,
    word_ids_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    pub fn new() -> WordList {
        WordList::default()
    }

    /// Build a word list from any iterator of raw entries. Entries are trimmed and upper-cased,
    /// blank entries are skipped, and duplicates keep the id of their first occurrence.
    pub fn from_words<I, S>(entries: I) -> WordList
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        let mut word_list = WordList::new();
        for entry in entries {
            word_list.add_word(entry.as_ref());
        }
        word_list
    }

    /// Read one word per line from the given reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<WordList, WordListError> {
        let mut word_list = WordList::new();
        for line in reader.lines() {
            word_list.add_word(&line?);
        }
        Ok(word_list)
    }

    /// Read one word per line from the file at the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<WordList, WordListError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            WordListError::FileReadingError(err, path.display().to_string())
        })?;
        WordList::from_reader(BufReader::new(file))
    }

    /// Add a single entry, returning its id, or `None` if the entry was blank.
    pub fn add_word(&mut self, entry: &str) -> Option<WordId> {
        let normalized = entry.trim().to_uppercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(&word_id) = self.word_ids_by_string.get(&normalized) {
            return Some(word_id);
        }

        let glyphs = normalized.chars().map(|c| self.glyph_id_for_char(c)).collect();
        let word_id = self.words.len();
        self.words.push(Word { string: normalized.clone(), glyphs });
        self.word_ids_by_string.insert(normalized, word_id);

        Some(word_id)
    }

    fn glyph_id_for_char(&mut self, c: char) -> GlyphId {
        if let Some(&glyph_id) = self.glyph_ids_by_char.get(&c) {
            return glyph_id;
        }
        let glyph_id = self.glyphs.len();
        self.glyphs.push(c);
        self.glyph_ids_by_char.insert(c, glyph_id);
        glyph_id
    }

    /// Look up the id of a word, if it's in the list.
    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.word_ids_by_string.get(&word.trim().to_uppercase()).copied()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use crate::error::WordListError;
    use crate::word_list::WordList;

    #[test]
    fn test_words_are_normalized_and_deduplicated() {
        let word_list = WordList::from_words(["cat", " Dog ", "", "CAT", "tie"]);

        assert_eq!(word_list.len(), 3);
        assert_eq!(word_list.word(0).string, "CAT");
        assert_eq!(word_list.word(1).string, "DOG");
        assert_eq!(word_list.word_id("cat"), Some(0));
        assert_eq!(word_list.word_id("tie"), Some(2));
        assert_eq!(word_list.word_id("emu"), None);
    }

    #[test]
    fn test_shared_letters_share_glyphs() {
        let word_list = WordList::from_words(["TAT", "AT"]);

        assert_eq!(word_list.glyphs.len(), 2);
        assert_eq!(word_list.word(0).glyphs[0], word_list.word(0).glyphs[2]);
        assert_eq!(word_list.word(1).glyphs[1], word_list.word(0).glyphs[0]);
        assert_eq!(word_list.word(1).len(), 2);
    }

    #[test]
    fn test_from_reader_reads_one_word_per_line() {
        let word_list = WordList::from_reader(Cursor::new("alpha\nbeta\r\n\ngamma\n"))
            .expect("Reading from memory can't fail");

        let strings: Vec<_> = word_list.words.iter().map(|w| w.string.as_str()).collect();
        assert_eq!(strings, ["ALPHA", "BETA", "GAMMA"]);
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let err = WordList::from_path("/definitely/not/a/real/word/list.txt")
            .expect_err("Missing file should fail");

        assert_matches!(err, WordListError::FileReadingError(_, _));
        assert!(err.to_string().contains("/definitely/not/a/real/word/list.txt"));
    }

    #[test]
    fn test_from_reader_reports_read_errors() {
        // Not valid UTF-8, so the line can't be decoded.
        let err = WordList::from_reader(Cursor::new(vec![b'o', b'k', b'\n', 0xff, b'\n']))
            .expect_err("Invalid UTF-8 should fail");

        assert_matches!(err, WordListError::Io(_));
    }
}
