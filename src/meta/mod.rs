//! Distortion history ledger
//!
//! A plain-text map from video path to the ordered `TYPE:LEVEL` entries that
//! produced it, one record per line, whitespace-delimited:
//!
//! ```text
//! vids/clip_gb3.mp4 GB:3
//! vids/clip_gb3_bw2.mp4 GB:3 BW:2
//! ```
//!
//! Paths containing whitespace are unsupported by the format.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::distortion::{DistortionLevel, DistortionType};
use crate::error::DistortResult;

/// Insertion-ordered map from video path to its distortion history
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetaLedger {
    records: Vec<(String, Vec<String>)>,
}

impl MetaLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger file; a missing file yields an empty ledger
    pub fn load(path: &Path) -> DistortResult<Self> {
        if !path.exists() {
            debug!("no ledger at {}; starting empty", path.display());
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    fn from_text(text: &str) -> Self {
        let mut ledger = Self::new();
        for line in text.lines() {
            let mut fields = line.split_whitespace();
            let Some(key) = fields.next() else { continue };
            let history: Vec<String> = fields.map(str::to_string).collect();
            ledger.insert(key.to_string(), history);
        }
        ledger
    }

    /// History recorded for a path, if any
    pub fn history(&self, path: &str) -> Option<&[String]> {
        self.records
            .iter()
            .find(|(key, _)| key == path)
            .map(|(_, history)| history.as_slice())
    }

    /// Record `output` as `input` plus one more distortion.
    ///
    /// The input's history is copied, never mutated; an unknown input
    /// starts from an empty history. Recording the same output twice
    /// replaces its history.
    pub fn record(
        &mut self,
        input: &str,
        output: &str,
        distortion: DistortionType,
        level: DistortionLevel,
    ) {
        let mut history = self
            .history(input)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        history.push(format!("{distortion}:{level}"));
        self.insert(output.to_string(), history);
    }

    fn insert(&mut self, key: String, history: Vec<String>) {
        match self.records.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = history,
            None => self.records.push((key, history)),
        }
    }

    /// Rewrite the ledger file, records in insertion order
    pub fn persist(&self, path: &Path) -> DistortResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut text = String::new();
        for (key, history) in &self.records {
            text.push_str(key);
            for entry in history {
                text.push(' ');
                text.push_str(entry);
            }
            text.push('\n');
        }
        fs::write(path, text)?;
        info!(
            "ledger persisted: {} records -> {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }

    /// Number of recorded paths
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gb3() -> (DistortionType, DistortionLevel) {
        (
            DistortionType::GaussianBlur,
            DistortionLevel::new(3).unwrap(),
        )
    }

    fn bw2() -> (DistortionType, DistortionLevel) {
        (DistortionType::BlockWise, DistortionLevel::new(2).unwrap())
    }

    #[test]
    fn recording_copies_ancestry_and_appends() {
        let mut ledger = MetaLedger::new();
        let (gb, three) = gb3();
        let (bw, two) = bw2();
        ledger.record("a.mp4", "b.mp4", gb, three);
        ledger.record("b.mp4", "c.mp4", bw, two);

        assert_eq!(ledger.history("b.mp4").unwrap(), ["GB:3"]);
        assert_eq!(ledger.history("c.mp4").unwrap(), ["GB:3", "BW:2"]);
        assert!(ledger.history("a.mp4").is_none(), "inputs are never keyed");
    }

    #[test]
    fn input_history_survives_recording_an_output() {
        let mut ledger = MetaLedger::new();
        let (gb, three) = gb3();
        let (bw, two) = bw2();
        ledger.record("a.mp4", "b.mp4", gb, three);
        let before = ledger.history("b.mp4").unwrap().to_vec();
        ledger.record("b.mp4", "c.mp4", bw, two);
        assert_eq!(ledger.history("b.mp4").unwrap(), before.as_slice());
    }

    #[test]
    fn rerecording_an_output_replaces_its_history() {
        let mut ledger = MetaLedger::new();
        let (gb, three) = gb3();
        let (bw, two) = bw2();
        ledger.record("a.mp4", "out.mp4", gb, three);
        ledger.record("a.mp4", "out.mp4", bw, two);
        assert_eq!(ledger.history("out.mp4").unwrap(), ["BW:2"]);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = MetaLedger::load(&dir.path().join("absent.txt")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn persist_then_load_round_trips_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta").join("ledger.txt");
        let (gb, three) = gb3();
        let (bw, two) = bw2();

        let mut ledger = MetaLedger::new();
        ledger.record("z.mp4", "z_gb.mp4", gb, three);
        ledger.record("a.mp4", "a_bw.mp4", bw, two);
        ledger.record("z_gb.mp4", "z_gb_bw.mp4", bw, two);
        ledger.persist(&path).unwrap();

        let reloaded = MetaLedger::load(&path).unwrap();
        assert_eq!(reloaded, ledger);

        let text = std::fs::read_to_string(&path).unwrap();
        let keys: Vec<&str> = text
            .lines()
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(keys, ["z_gb.mp4", "a_bw.mp4", "z_gb_bw.mp4"]);
    }

    #[test]
    fn loaded_entries_are_kept_verbatim() {
        let ledger = MetaLedger::from_text("old.mp4 XX:9 GB:1\n\nnext.mp4\n");
        assert_eq!(ledger.history("old.mp4").unwrap(), ["XX:9", "GB:1"]);
        assert_eq!(ledger.history("next.mp4").unwrap(), Vec::<String>::new().as_slice());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn persisted_lines_use_single_spaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.txt");
        let (gb, three) = gb3();
        let mut ledger = MetaLedger::new();
        ledger.record("in.mp4", "out.mp4", gb, three);
        ledger.persist(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "out.mp4 GB:3\n");
    }
}
