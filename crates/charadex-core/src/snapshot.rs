//! JSON snapshot persistence for [`LexicalStore`].
//!
//! The whole store is one pretty-printed JSON document. Writes go to a `.tmp`
//! sibling and are renamed into place, so a reader never sees a partial file.
//! Every snapshot carries a `revision`; [`SnapshotFile::commit`] refuses to
//! overwrite a file whose revision moved since the store was loaded.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::store::{Character, LexicalStore, Sentence, Word, WordOccurrence};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("snapshot changed on disk: loaded revision {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },
}

/// On-disk shape of the store. Missing collections default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub characters: BTreeMap<String, Character>,
    #[serde(default)]
    pub words: BTreeMap<String, Word>,
    #[serde(default)]
    pub word_occurrences: BTreeMap<String, WordOccurrence>,
    #[serde(default)]
    pub sentences: BTreeMap<String, Sentence>,
}

impl LexicalStore {
    /// Build a store from a snapshot, rebuilding the word text index.
    ///
    /// Words sharing a text are folded onto the first id in key order: counts
    /// and occurrence lists are summed, meanings unioned, and occurrences and
    /// character references are pointed at the surviving id.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = LexicalStore::new();
        store.set_revision(snapshot.revision);

        let mut by_text: HashMap<String, String> = HashMap::new();
        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut words: Vec<Word> = Vec::with_capacity(snapshot.words.len());
        let mut slot: HashMap<String, usize> = HashMap::new();

        for (_, word) in snapshot.words {
            if let Some(canonical) = by_text.get(&word.word) {
                warn!(word = %word.word, id = %word.id, into = %canonical, "folding duplicate word");
                aliases.insert(word.id.clone(), canonical.clone());
                let target = &mut words[slot[canonical]];
                target.seen_count += word.seen_count;
                target.occurrence_ids.extend(word.occurrence_ids);
                for meaning in word.meanings {
                    if !target.meanings.contains(&meaning) {
                        target.meanings.push(meaning);
                    }
                }
                continue;
            }
            by_text.insert(word.word.clone(), word.id.clone());
            slot.insert(word.id.clone(), words.len());
            words.push(word);
        }
        for word in words {
            store.insert_word(word);
        }

        let canonical = |id: &str| aliases.get(id).cloned().unwrap_or_else(|| id.to_string());

        for (_, mut character) in snapshot.characters {
            if !aliases.is_empty() {
                let mut refs: Vec<String> = Vec::with_capacity(character.word_references.len());
                for id in &character.word_references {
                    let id = canonical(id);
                    if !refs.contains(&id) {
                        refs.push(id);
                    }
                }
                character.word_references = refs;
            }
            store.insert_character(character);
        }
        for (_, mut occurrence) in snapshot.word_occurrences {
            occurrence.word_id = canonical(&occurrence.word_id);
            store.insert_occurrence(occurrence);
        }
        for (_, sentence) in snapshot.sentences {
            store.insert_sentence(sentence);
        }

        debug!(
            revision = store.revision(),
            folded = aliases.len(),
            "store loaded from snapshot"
        );
        store
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision(),
            characters: self
                .characters()
                .map(|c| (c.character.to_string(), c.clone()))
                .collect(),
            words: self.words().map(|w| (w.id.clone(), w.clone())).collect(),
            word_occurrences: self
                .occurrences()
                .map(|o| (o.id.clone(), o.clone()))
                .collect(),
            sentences: self
                .sentences()
                .map(|s| (s.id.clone(), s.clone()))
                .collect(),
        }
    }
}

/// A snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. An absent file is an empty snapshot; so is a file
    /// that is not valid JSON, with a warning.
    pub fn read(&self) -> Result<Snapshot, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot, starting empty");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt snapshot, starting empty");
                Ok(Snapshot::default())
            }
        }
    }

    /// `<file name>.tmp` next to the snapshot.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub fn load(&self) -> Result<LexicalStore, SnapshotError> {
        let _span = debug_span!("snapshot_load").entered();
        Ok(LexicalStore::from_snapshot(self.read()?))
    }

    /// Atomic write: write to .tmp then rename. The store's revision is
    /// written as is.
    pub fn save(&self, store: &LexicalStore) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(&store.to_snapshot())?;
        let tmp = self.tmp_path();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Revision currently on disk, as [`read`](Self::read) sees it: 0 for an
    /// absent or corrupt snapshot.
    pub fn disk_revision(&self) -> Result<u64, SnapshotError> {
        Ok(self.read()?.revision)
    }

    /// Save `store` as the next revision.
    ///
    /// Fails with [`SnapshotError::Conflict`] if another writer committed since
    /// `store` was loaded. On any failure the store's revision is unchanged.
    pub fn commit(&self, store: &mut LexicalStore) -> Result<u64, SnapshotError> {
        let _span = debug_span!("snapshot_commit").entered();
        let expected = store.revision();
        let found = self.disk_revision()?;
        if found != expected {
            return Err(SnapshotError::Conflict { expected, found });
        }

        store.set_revision(expected + 1);
        if let Err(e) = self.save(store) {
            store.set_revision(expected);
            return Err(e);
        }
        debug!(revision = expected + 1, "snapshot committed");
        Ok(expected + 1)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::merge::merge_batch;
    use crate::store::CharacterMeta;
    use crate::validate::validate;

    fn cat_store() -> LexicalStore {
        let mut store = LexicalStore::new();
        store.insert_character(Character::with_reading(
            '猫',
            "māo",
            CharacterMeta {
                definition: Some("cat".to_string()),
                ..CharacterMeta::default()
            },
        ));
        let raw = json!({"sentences": [{"text": "我爱猫", "words": [
            {"word": "我", "meaning": "I"},
            {"word": "爱", "meaning": "love"},
            {"word": "猫", "meaning": "cat"},
        ]}]});
        merge_batch(&mut store, &validate(&raw).unwrap(), "src");
        store
    }

    #[test]
    fn absent_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("data.json"));
        let store = file.load().unwrap();
        assert_eq!(store.stats(), Default::default());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{not json").unwrap();
        let file = SnapshotFile::new(&path);
        assert_eq!(file.load().unwrap().stats(), Default::default());
        assert_eq!(file.disk_revision().unwrap(), 0);
    }

    #[test]
    fn wrong_shape_snapshot_is_replaced_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"revision": 5, "characters": "garbage"}"#).unwrap();
        let file = SnapshotFile::new(&path);

        let mut store = file.load().unwrap();
        assert_eq!(store.revision(), 0);
        assert_eq!(file.disk_revision().unwrap(), 0);

        store.upsert_character_occurrence('猫', "w");
        assert_eq!(file.commit(&mut store).unwrap(), 1);
        let mut reloaded = file.load().unwrap();
        assert_eq!(reloaded.character('猫').unwrap().seen_count, 1);
        assert_eq!(file.commit(&mut reloaded).unwrap(), 2);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"characters": {}}"#).unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn save_and_load_preserves_store() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested").join("data.json"));
        let store = cat_store();
        file.save(&store).unwrap();
        assert!(!file.tmp_path().exists());

        let loaded = file.load().unwrap();
        assert_eq!(loaded.to_snapshot(), store.to_snapshot());
        assert!(loaded.find_word_by_text("猫").is_some());
        assert_eq!(
            loaded.character('猫').unwrap().meta.definition.as_deref(),
            Some("cat")
        );
    }

    #[test]
    fn tmp_file_never_shadows_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("data.tmp"));
        assert_eq!(file.tmp_path(), dir.path().join("data.tmp.tmp"));

        let store = cat_store();
        file.save(&store).unwrap();
        assert!(file.path().exists());
        assert!(!file.tmp_path().exists());
        assert_eq!(file.load().unwrap().to_snapshot(), store.to_snapshot());
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let value = serde_json::to_value(cat_store().to_snapshot()).unwrap();
        assert!(value.get("wordOccurrences").is_some());
        let mao = &value["characters"]["猫"];
        assert_eq!(mao["seenCount"], 1);
        assert_eq!(mao["definition"], "cat");
        assert!(mao.get("radical").is_none());
        let occurrence = value["wordOccurrences"].as_object().unwrap().values().next().unwrap();
        assert!(occurrence.get("sentenceId").is_some());
    }

    #[test]
    fn duplicate_word_texts_are_folded() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "characters": {"猫": {"character": "猫", "seenCount": 2, "pinyin": "māo", "wordReferences": ["a", "b"]}},
            "words": {
                "a": {"id": "a", "word": "猫", "meanings": ["cat"], "seenCount": 1, "occurrenceIds": ["o1"]},
                "b": {"id": "b", "word": "猫", "meanings": ["cat", "kitty"], "seenCount": 1, "occurrenceIds": ["o2"]},
            },
            "wordOccurrences": {
                "o1": {"id": "o1", "wordId": "a", "word": "猫", "meaning": "cat", "pinyin": "māo", "sentenceId": "s1", "position": 0},
                "o2": {"id": "o2", "wordId": "b", "word": "猫", "meaning": "kitty", "pinyin": "māo", "sentenceId": "s2", "position": 0},
            },
        }))
        .unwrap();
        let store = LexicalStore::from_snapshot(snapshot);

        assert_eq!(store.words().count(), 1);
        let mao = store.find_word_by_text("猫").unwrap();
        assert_eq!(mao.id, "a");
        assert_eq!(mao.seen_count, 2);
        assert_eq!(mao.occurrence_ids, vec!["o1".to_string(), "o2".to_string()]);
        assert_eq!(mao.meanings, vec!["cat".to_string(), "kitty".to_string()]);
        assert_eq!(store.occurrence("o2").unwrap().word_id, "a");
        assert_eq!(store.character('猫').unwrap().word_references, vec!["a".to_string()]);
    }

    #[test]
    fn commit_bumps_revision() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("data.json"));
        let mut store = file.load().unwrap();
        assert_eq!(file.commit(&mut store).unwrap(), 1);
        assert_eq!(file.commit(&mut store).unwrap(), 2);
        assert_eq!(file.disk_revision().unwrap(), 2);
        assert_eq!(file.load().unwrap().revision(), 2);
    }

    #[test]
    fn stale_commit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("data.json"));
        let mut first = file.load().unwrap();
        let mut second = file.load().unwrap();

        second.upsert_character_occurrence('猫', "w");
        file.commit(&mut second).unwrap();

        first.upsert_character_occurrence('狗', "w");
        match file.commit(&mut first) {
            Err(SnapshotError::Conflict { expected: 0, found: 1 }) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(first.revision(), 0);

        let on_disk = file.load().unwrap();
        assert!(on_disk.character('猫').is_some());
        assert!(on_disk.character('狗').is_none());
    }
}
