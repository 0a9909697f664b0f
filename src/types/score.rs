//! Scores, raters, and the insertion-ordered snapshot of a score store.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use super::record::RecordId;
use crate::constants::{ANONYMOUS_RATER, DEFAULT_SCORE, MAX_SCORE, MIN_SCORE};

/// Bytes escaped in rater file components: everything but ASCII letters,
/// digits, `.` and `-`.
const RATER_FILE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-');

/// Opinion score in the closed range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Validate a raw integer; anything outside 1..=5 is rejected.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (MIN_SCORE..=MAX_SCORE).contains(v))
            .map(Self)
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self(DEFAULT_SCORE)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when a numeral is not an integer score in range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid score '{0}': expected an integer from 1 to 5")]
pub struct InvalidScore(pub String);

impl TryFrom<i64> for Score {
    type Error = InvalidScore;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| InvalidScore(value.to_string()))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl FromStr for Score {
    type Err = InvalidScore;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidScore(s.to_string()))
    }
}

/// Identity under which a score is recorded. Blank names become `anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Rater(String);

impl Rater {
    pub fn new(name: impl AsRef<str>) -> Self {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            Self::anonymous()
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_RATER.to_string())
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_RATER
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name safe to embed in a file name. Distinct raters never share a
    /// component, and the result never contains `_`, which separates it from
    /// the source stem in store file names.
    #[must_use]
    pub fn file_component(&self) -> String {
        utf8_percent_encode(&self.0, RATER_FILE_SET).to_string()
    }
}

impl Default for Rater {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl From<String> for Rater {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Rater {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Rater> for String {
    fn from(value: Rater) -> Self {
        value.0
    }
}

impl fmt::Display for Rater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored score, unique per `(record_id, rater)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub record_id: RecordId,
    pub rater: Rater,
    /// Display name of the video, not necessarily its playable reference.
    pub video_name: String,
    pub score: Score,
}

impl ScoreEntry {
    #[must_use]
    pub fn key(&self) -> (&RecordId, &Rater) {
        (&self.record_id, &self.rater)
    }
}

/// Whether an upsert appended a new entry or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertEffect {
    Inserted,
    Updated,
}

/// Full contents of a score store in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    entries: Vec<ScoreEntry>,
}

impl ScoreSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot, collapsing repeated keys onto their first position
    /// with the last value seen.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ScoreEntry>,
    {
        let mut snapshot = Self::new();
        for entry in entries {
            snapshot.upsert(entry);
        }
        snapshot
    }

    /// Overwrite the entry with the same key in place, or append.
    pub fn upsert(&mut self, entry: ScoreEntry) -> UpsertEffect {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.key() == entry.key())
        {
            Some(existing) => {
                existing.video_name = entry.video_name;
                existing.score = entry.score;
                UpsertEffect::Updated
            }
            None => {
                self.entries.push(entry);
                UpsertEffect::Inserted
            }
        }
    }

    #[must_use]
    pub fn get(&self, record_id: &RecordId, rater: &Rater) -> Option<&ScoreEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.record_id == record_id && &entry.rater == rater)
    }

    #[must_use]
    pub fn score_for(&self, record_id: &RecordId, rater: &Rater) -> Option<Score> {
        self.get(record_id, rater).map(|entry| entry.score)
    }

    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn raters(&self) -> BTreeSet<&Rater> {
        self.entries.iter().map(|entry| &entry.rater).collect()
    }

    /// Key → value view, independent of row order.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<(RecordId, Rater), (String, Score)> {
        self.entries
            .iter()
            .map(|entry| {
                (
                    (entry.record_id.clone(), entry.rater.clone()),
                    (entry.video_name.clone(), entry.score),
                )
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ScoreSnapshot {
    type Item = &'a ScoreEntry;
    type IntoIter = std::slice::Iter<'a, ScoreEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, rater: &str, video: &str, score: i64) -> ScoreEntry {
        ScoreEntry {
            record_id: RecordId::from(id),
            rater: Rater::new(rater),
            video_name: video.to_string(),
            score: Score::new(score).expect("valid score"),
        }
    }

    #[test]
    fn score_domain_is_one_to_five() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(6).is_none());
        assert!(Score::new(-3).is_none());
        assert_eq!(Score::new(1).map(Score::get), Some(1));
        assert_eq!(Score::new(5).map(Score::get), Some(5));
        assert_eq!(Score::default().get(), DEFAULT_SCORE);
    }

    #[test]
    fn score_parses_only_integers() {
        assert_eq!(" 4 ".parse::<Score>().map(Score::get), Ok(4));
        assert!("4.0".parse::<Score>().is_err());
        assert!("four".parse::<Score>().is_err());
        assert!("".parse::<Score>().is_err());
        assert!("9".parse::<Score>().is_err());
    }

    #[test]
    fn blank_rater_is_anonymous() {
        assert!(Rater::new("   ").is_anonymous());
        assert_eq!(Rater::new(" jy ").as_str(), "jy");
        assert_eq!(Rater::new("a b/c").file_component(), "a%20b%2Fc");
        assert_eq!(Rater::new("jy.kim-2").file_component(), "jy.kim-2");
    }

    #[test]
    fn upsert_updates_in_place() {
        let mut snapshot = ScoreSnapshot::new();
        assert_eq!(snapshot.upsert(entry("1", "a", "v1.mp4", 2)), UpsertEffect::Inserted);
        assert_eq!(snapshot.upsert(entry("2", "a", "v2.mp4", 3)), UpsertEffect::Inserted);
        assert_eq!(snapshot.upsert(entry("1", "a", "v1b.mp4", 5)), UpsertEffect::Updated);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.entries()[0].record_id.as_str(), "1");
        assert_eq!(snapshot.entries()[0].video_name, "v1b.mp4");
        assert_eq!(snapshot.entries()[0].score.get(), 5);
    }

    #[test]
    fn raters_are_part_of_the_key() {
        let snapshot = ScoreSnapshot::from_entries([
            entry("1", "a", "v.mp4", 2),
            entry("1", "b", "v.mp4", 4),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.score_for(&RecordId::from("1"), &Rater::new("b")).map(Score::get),
            Some(4)
        );
        assert_eq!(snapshot.raters().len(), 2);
    }
}
