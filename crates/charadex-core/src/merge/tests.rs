use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{json, Value};

use super::*;
use crate::settings::ValidationSettings;
use crate::store::{Character, CharacterMeta};
use crate::unicode::{is_han, strip_ignorable};
use crate::validate::validate_with;

fn validated(raw: Value) -> ValidatedBatch {
    let thresholds = ValidationSettings {
        min_coverage: 0.85,
        warn_coverage: 0.95,
        max_coverage: 1.15,
    };
    validate_with(&raw, &thresholds).expect("fixture must validate")
}

fn cat_batch() -> ValidatedBatch {
    validated(json!({"sentences": [{"text": "我爱猫", "words": [
        {"word": "我", "meaning": "I"},
        {"word": "爱", "meaning": "love"},
        {"word": "猫", "meaning": "cat"},
    ]}]}))
}

fn reconstruct(store: &LexicalStore, sentence_id: &str) -> String {
    let sentence = store.sentence(sentence_id).unwrap();
    store
        .sentence_occurrences(sentence)
        .iter()
        .map(|occ| occ.word.as_str())
        .collect()
}

#[test]
fn occurrence_reading_comes_from_character_table() {
    let mut store = LexicalStore::new();
    store.insert_character(Character::with_reading('猫', "māo", CharacterMeta::default()));
    let batch = validated(json!({"sentences": [{"text": "猫", "words": [
        {"word": "猫", "meaning": "cat", "pinyin": "gǒu"},
    ]}]}));
    assert_eq!(batch.sentences()[0].words[0].pinyin.as_deref(), Some("gǒu"));

    merge_batch(&mut store, &batch, "src");
    let occ = store.occurrences().next().unwrap();
    assert_eq!(occ.pinyin, "māo");
}

#[test]
fn first_ingest_creates_entities() {
    let mut store = LexicalStore::new();
    let stats = merge_batch(&mut store, &cat_batch(), "http://example.com");

    assert_eq!(stats.sentences, 1);
    assert_eq!(stats.words, 3);
    assert_eq!(stats.characters, 3);
    assert_eq!(store.words().count(), 3);
    for text in ["我", "爱", "猫"] {
        let word = store.find_word_by_text(text).unwrap();
        assert_eq!(word.seen_count, 1);
        assert_eq!(word.occurrence_ids.len(), 1);

        let c = store.character(text.chars().next().unwrap()).unwrap();
        assert_eq!(c.seen_count, 1);
        assert_eq!(c.word_references, vec![word.id.clone()]);
    }

    let sentence = store.sentence(&stats.sentence_ids[0]).unwrap();
    assert_eq!(sentence.source, "http://example.com");
    assert_eq!(sentence.text, "我爱猫");
    let positions: Vec<usize> = store
        .sentence_occurrences(sentence)
        .iter()
        .map(|occ| occ.position)
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(reconstruct(&store, &sentence.id), "我爱猫");
}

#[test]
fn reingest_counts_twice_without_new_entities() {
    let mut store = LexicalStore::new();
    merge_batch(&mut store, &cat_batch(), "http://example.com");
    merge_batch(&mut store, &cat_batch(), "http://example.com");

    assert_eq!(store.words().count(), 3);
    assert_eq!(store.characters().count(), 3);
    assert_eq!(store.sentences().count(), 2);
    assert_eq!(store.occurrences().count(), 6);

    let wo = store.find_word_by_text("我").unwrap();
    assert_eq!(wo.seen_count, 2);
    assert_eq!(wo.occurrence_ids.len(), 2);
    assert_eq!(wo.meanings, vec!["I".to_string()]);

    let c = store.character('我').unwrap();
    assert_eq!(c.seen_count, 2);
    assert_eq!(c.word_references.len(), 1);
}

#[test]
fn novel_meaning_is_appended_once() {
    let mut store = LexicalStore::new();
    let batch = validated(json!({"sentences": [
        {"text": "打电话", "words": [{"word": "打", "meaning": "to make"}, {"word": "电话", "meaning": "phone call"}]},
        {"text": "打人", "words": [{"word": "打", "meaning": "to hit"}, {"word": "人", "meaning": "person"}]},
        {"text": "打球", "words": [{"word": "打", "meaning": "to hit"}, {"word": "球", "meaning": "ball"}]},
    ]}));
    merge_batch(&mut store, &batch, "src");

    let da = store.find_word_by_text("打").unwrap();
    assert_eq!(da.seen_count, 3);
    assert_eq!(da.meanings, vec!["to make".to_string(), "to hit".to_string()]);

    // Each occurrence keeps its own context meaning.
    let meanings: Vec<&str> = da
        .occurrence_ids
        .iter()
        .map(|id| store.occurrence(id).unwrap().meaning.as_str())
        .collect();
    assert_eq!(meanings, vec!["to make", "to hit", "to hit"]);
}

#[test]
fn multi_character_word_references_each_character() {
    let mut store = LexicalStore::new();
    let batch = validated(json!({"sentences": [{"text": "中国人", "words": [
        {"word": "中国", "meaning": "China"},
        {"word": "人", "meaning": "person"},
    ]}]}));
    merge_batch(&mut store, &batch, "src");

    let zhongguo = store.find_word_by_text("中国").unwrap();
    for c in ['中', '国'] {
        let ch = store.character(c).unwrap();
        assert_eq!(ch.seen_count, 1);
        assert!(ch.word_references.contains(&zhongguo.id));
    }
}

#[test]
fn repeated_character_in_one_word_counts_per_position() {
    let mut store = LexicalStore::new();
    let batch = validated(json!({"sentences": [{"text": "谢谢", "words": [
        {"word": "谢谢", "meaning": "thanks"},
    ]}]}));
    merge_batch(&mut store, &batch, "src");

    let xie = store.character('谢').unwrap();
    assert_eq!(xie.seen_count, 2);
    assert_eq!(xie.word_references.len(), 1);
}

#[test]
fn non_han_characters_are_not_tracked() {
    let mut store = LexicalStore::new();
    let batch = validated(json!({"sentences": [{"text": "用iPhone", "words": [
        {"word": "用", "meaning": "use"},
        {"word": "iPhone", "meaning": "iPhone"},
    ]}]}));
    let stats = merge_batch(&mut store, &batch, "src");

    assert_eq!(stats.characters, 1);
    assert_eq!(store.characters().count(), 1);
    assert!(store.character('i').is_none());
    assert!(store.find_word_by_text("iPhone").is_some());
}

#[test]
fn occurrence_pinyin_joins_known_readings() {
    let mut store = LexicalStore::new();
    store.insert_character(Character::with_reading('中', "zhōng", CharacterMeta::default()));
    store.insert_character(Character::with_reading('国', "guó", CharacterMeta::default()));
    let batch = validated(json!({"sentences": [{"text": "中国龘", "words": [
        {"word": "中国", "meaning": "China"},
        {"word": "龘", "meaning": "dragon"},
    ]}]}));
    merge_batch(&mut store, &batch, "src");

    let pinyin: Vec<String> = store
        .occurrences()
        .map(|occ| (occ.position, occ.pinyin.clone()))
        .collect::<std::collections::BTreeMap<_, _>>()
        .into_values()
        .collect();
    assert_eq!(pinyin, vec!["zhōng guó".to_string(), String::new()]);

    // Reading and metadata of a reference character survive ingestion.
    assert_eq!(store.character('中').unwrap().pinyin, "zhōng");
    // Out-of-vocabulary character is tracked with an empty reading.
    let long = store.character('龘').unwrap();
    assert_eq!(long.seen_count, 1);
    assert!(long.pinyin.is_empty());
    assert!(long.meta.is_empty());
}

#[test]
fn warnings_are_carried_into_stats() {
    let mut store = LexicalStore::new();
    let batch = validated(json!({"sentences": [{"text": "一二三四五六七八九十", "words": [
        {"word": "一二三四五", "meaning": "a"},
        {"word": "六七八九", "meaning": "b"},
    ]}]}));
    let stats = merge_batch(&mut store, &batch, "src");
    assert_eq!(stats.warnings.len(), 1);
}

fn arb_sentence() -> impl Strategy<Value = Vec<String>> {
    let word = prop::collection::vec(
        prop::sample::select(vec!['我', '爱', '猫', '你', '好', '中', '国', '人']),
        1..3,
    )
    .prop_map(|chars| chars.into_iter().collect::<String>());
    prop::collection::vec(word, 1..6)
}

proptest! {
    #[test]
    fn invariants_hold_after_any_merges(
        batches in prop::collection::vec(prop::collection::vec(arb_sentence(), 1..4), 1..4),
    ) {
        let mut store = LexicalStore::new();
        for sentences in &batches {
            let raw = json!({"sentences": sentences.iter().map(|words| json!({
                "text": words.concat(),
                "words": words.iter().map(|w| json!({"word": w, "meaning": "m"})).collect::<Vec<_>>(),
            })).collect::<Vec<_>>()});
            merge_batch(&mut store, &validated(raw), "src");
        }

        // Word text is unique and seen-count matches occurrences.
        let mut texts = HashSet::new();
        for word in store.words() {
            prop_assert!(texts.insert(word.word.clone()));
            prop_assert_eq!(word.seen_count as usize, word.occurrence_ids.len());
        }

        // Positions are 0..n and the words rebuild the sentence.
        for sentence in store.sentences() {
            let occurrences = store.sentence_occurrences(sentence);
            for (i, occ) in occurrences.iter().enumerate() {
                prop_assert_eq!(occ.position, i);
                prop_assert_eq!(&sentence.occurrence_ids[i], &occ.id);
            }
            prop_assert_eq!(
                strip_ignorable(&reconstruct(&store, &sentence.id)),
                strip_ignorable(&sentence.text)
            );
        }

        // Character counts equal per-position appearances across occurrences.
        for ch in store.characters() {
            let expected: usize = store
                .occurrences()
                .map(|occ| occ.word.chars().filter(|&c| c == ch.character).count())
                .sum();
            prop_assert_eq!(ch.seen_count as usize, expected);
            for id in &ch.word_references {
                let word = store.word(id).unwrap();
                prop_assert!(word.word.contains(ch.character));
            }
        }

        // Every Han character of a word references that word.
        for word in store.words() {
            for c in word.word.chars().filter(|&c| is_han(c)) {
                let ch = store.character(c);
                prop_assert!(ch.is_some(), "missing character {}", c);
                prop_assert!(ch.unwrap().word_references.contains(&word.id));
            }
        }
    }
}
