use crate::libbunpou::db::{GrammarPoint, VocabularyWord};
use crate::libbunpou::{Error, Result};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

pub const QUIZ_LENGTH: usize = 10;
pub const CHOICES_COUNT: usize = 4;
pub const GAME_PAIRS: usize = 6;
pub const CARD_LENGTH: usize = 12;
pub const PROMPT_LENGTH: usize = 10;
pub const BLANK: &str = "[___]";

/// A question answered by picking one of `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceQuestion {
    pub prompt: String,
    pub translation: Option<String>,
    pub options: Vec<String>,
    pub answer: String,
}

/// A word whose meaning has to be typed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingPrompt {
    pub japanese: String,
    pub romaji: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Japanese,
    Meaning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCard {
    /// Romaji of the word both cards of a pair were made from.
    pub key: String,
    pub content: String,
    pub side: Side,
}

pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut items = items.to_vec();
    items.shuffle(rng);
    items
}

/// Shuffled words, one per romaji.
fn distinct_words<R: Rng + ?Sized>(words: &[VocabularyWord], rng: &mut R) -> Vec<VocabularyWord> {
    let mut seen = HashSet::new();
    let mut words: Vec<VocabularyWord> = words
        .iter()
        .filter(|w| seen.insert(w.romaji.clone()))
        .cloned()
        .collect();
    words.shuffle(rng);
    words
}

/// Picks `count` distinct values from `pool` that differ from `answer`.
fn distractors<R: Rng + ?Sized>(
    pool: &[&str],
    answer: &str,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<&str> = pool
        .iter()
        .copied()
        .filter(|c| *c != answer && seen.insert(*c))
        .collect();
    if candidates.len() < count {
        warn!(
            "[Setup] Only {} distractors available for '{}', {} needed.",
            candidates.len(),
            answer,
            count
        );
        return Err(Error::NotEnoughChoices {
            needed: count + 1,
            available: candidates.len() + 1,
        });
    }
    candidates.shuffle(rng);
    Ok(candidates[..count].iter().map(|c| c.to_string()).collect())
}

fn options_with<R: Rng + ?Sized>(answer: &str, mut wrong: Vec<String>, rng: &mut R) -> Vec<String> {
    wrong.push(answer.to_string());
    wrong.shuffle(rng);
    wrong
}

/// Meaning questions: each word's script is the prompt, its meaning the answer.
pub fn multiple_choice<R: Rng + ?Sized>(
    words: &[VocabularyWord],
    question_count: usize,
    choices_count: usize,
    rng: &mut R,
) -> Result<Vec<ChoiceQuestion>> {
    debug!("[Setup] Generating {} multiple choice questions.", question_count);
    let pool = distinct_words(words, rng);
    let meanings: Vec<&str> = pool.iter().map(|w| w.indonesian.as_str()).collect();

    pool.iter()
        .take(question_count)
        .map(|word| {
            let wrong = distractors(
                &meanings,
                &word.indonesian,
                choices_count.saturating_sub(1),
                rng,
            )?;
            Ok(ChoiceQuestion {
                prompt: word.japanese.clone(),
                translation: None,
                options: options_with(&word.indonesian, wrong, rng),
                answer: word.indonesian.clone(),
            })
        })
        .collect()
}

/// Replaces the first standalone occurrence of `particle` with the blank marker.
///
/// The patterns `" X "`, `"X "` and `" X"` are tried in that order and only the
/// first one found is replaced. Returns `None` when none of them occur.
pub fn blank_out(sentence: &str, particle: &str) -> Option<String> {
    let patterns = [
        (format!(" {particle} "), format!(" {BLANK} ")),
        (format!("{particle} "), format!("{BLANK} ")),
        (format!(" {particle}"), format!(" {BLANK}")),
    ];
    patterns
        .iter()
        .find(|(from, _)| sentence.contains(from.as_str()))
        .map(|(from, to)| sentence.replacen(from.as_str(), to, 1))
}

/// Particle questions cut from the example sentences of grammar points that
/// name a particle (both `hiragana` and `reading` set and not blank).
pub fn fill_in_the_blank<R: Rng + ?Sized>(
    points: &[GrammarPoint],
    question_count: usize,
    choices_count: usize,
    rng: &mut R,
) -> Result<Vec<ChoiceQuestion>> {
    let particles: Vec<(&GrammarPoint, &str, &str)> = points
        .iter()
        .filter_map(|p| match (&p.hiragana, &p.reading) {
            (Some(hiragana), Some(reading))
                if !hiragana.trim().is_empty() && !reading.trim().is_empty() =>
            {
                Some((p, hiragana.as_str(), reading.as_str()))
            }
            _ => None,
        })
        .collect();
    let readings: Vec<&str> = particles.iter().map(|(_, _, reading)| *reading).collect();
    debug!("[Setup] {} particle points available.", particles.len());

    let mut questions = Vec::new();
    for (point, hiragana, reading) in &particles {
        for example in &point.examples {
            let Some(blanked) = blank_out(&example.japanese, hiragana) else {
                debug!("[Setup] No '{}' to blank out in {:?}, skipping.", hiragana, example.japanese);
                continue;
            };
            let wrong = distractors(&readings, reading, choices_count.saturating_sub(1), rng)?;
            questions.push(ChoiceQuestion {
                prompt: blanked,
                translation: Some(example.translation.clone()),
                options: options_with(reading, wrong, rng),
                answer: reading.to_string(),
            });
        }
    }

    questions.shuffle(rng);
    questions.truncate(question_count);
    Ok(questions)
}

/// Two cards per word, one showing the script and one the meaning.
pub fn matching_cards<R: Rng + ?Sized>(
    words: &[VocabularyWord],
    pair_count: usize,
    rng: &mut R,
) -> Vec<MatchCard> {
    let mut cards: Vec<MatchCard> = distinct_words(words, rng)
        .into_iter()
        .take(pair_count)
        .flat_map(|word| {
            [
                MatchCard {
                    key: word.romaji.clone(),
                    content: word.japanese,
                    side: Side::Japanese,
                },
                MatchCard {
                    key: word.romaji,
                    content: word.indonesian,
                    side: Side::Meaning,
                },
            ]
        })
        .collect();
    cards.shuffle(rng);
    cards
}

pub fn flashcard_deck<R: Rng + ?Sized>(
    words: &[VocabularyWord],
    count: usize,
    rng: &mut R,
) -> Vec<VocabularyWord> {
    let mut deck = distinct_words(words, rng);
    deck.truncate(count);
    deck
}

pub fn typing_prompts<R: Rng + ?Sized>(
    words: &[VocabularyWord],
    count: usize,
    rng: &mut R,
) -> Vec<TypingPrompt> {
    flashcard_deck(words, count, rng)
        .into_iter()
        .map(|w| TypingPrompt {
            japanese: w.japanese,
            romaji: w.romaji,
            answer: w.indonesian,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libbunpou::db::GrammarExample;
    use crate::libbunpou::naiyou::Content;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn word(romaji: &str, meaning: &str) -> VocabularyWord {
        VocabularyWord {
            romaji: romaji.to_string(),
            japanese: romaji.to_lowercase(),
            indonesian: meaning.to_string(),
            category: "Kategori".to_string(),
        }
    }

    fn particle(hiragana: &str, reading: &str, sentences: &[&str]) -> GrammarPoint {
        GrammarPoint {
            id: None,
            part: "BAGIAN 1".to_string(),
            title: format!("Partikel {hiragana}"),
            hiragana: Some(hiragana.to_string()),
            reading: Some(reading.to_string()),
            function: String::new(),
            examples: sentences
                .iter()
                .map(|s| GrammarExample {
                    source: "TKA".to_string(),
                    japanese: s.to_string(),
                    translation: format!("terjemahan {s}"),
                })
                .collect(),
        }
    }

    fn assert_answer_once(question: &ChoiceQuestion) {
        let hits = question.options.iter().filter(|o| **o == question.answer).count();
        assert_eq!(hits, 1, "{question:?}");
    }

    #[test]
    fn four_words_give_one_answer_and_three_distinct_distractors() {
        let words = vec![
            word("Mizu", "Air"),
            word("Ocha", "Teh"),
            word("Juusu", "Jus"),
            word("Gohan", "Nasi"),
        ];
        let mut rng = StdRng::seed_from_u64(4);
        let questions = multiple_choice(&words, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();

        assert_eq!(questions.len(), 4);
        for q in &questions {
            assert_eq!(q.options.len(), 4);
            assert_answer_once(q);
            let distinct: HashSet<&String> = q.options.iter().collect();
            assert_eq!(distinct.len(), 4);
        }
        let prompts: HashSet<&String> = questions.iter().map(|q| &q.prompt).collect();
        assert_eq!(prompts.len(), 4);
    }

    #[test]
    fn builtin_vocabulary_gives_full_quiz() {
        let content = Content::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let questions =
            multiple_choice(&content.vocabulary, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();
        assert_eq!(questions.len(), QUIZ_LENGTH);
        for q in &questions {
            assert_eq!(q.options.len(), CHOICES_COUNT);
            assert_answer_once(q);
        }
    }

    #[test]
    fn too_small_pool_is_reported() {
        let words = vec![word("Mizu", "Air"), word("Ocha", "Teh"), word("Juusu", "Jus")];
        let mut rng = StdRng::seed_from_u64(1);
        let result = multiple_choice(&words, QUIZ_LENGTH, CHOICES_COUNT, &mut rng);
        assert!(matches!(
            result,
            Err(Error::NotEnoughChoices {
                needed: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn shared_meanings_are_not_offered_twice() {
        let words = vec![
            word("Sensei", "Guru"),
            word("Kyoushi", "Guru"),
            word("Mizu", "Air"),
            word("Ocha", "Teh"),
            word("Juusu", "Jus"),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        let questions = multiple_choice(&words, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();
        for q in &questions {
            assert_answer_once(q);
            let distinct: HashSet<&String> = q.options.iter().collect();
            assert_eq!(distinct.len(), q.options.len());
        }
    }

    #[test]
    fn empty_pool_gives_no_questions() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(multiple_choice(&[], QUIZ_LENGTH, CHOICES_COUNT, &mut rng)
            .unwrap()
            .is_empty());
        assert!(fill_in_the_blank(&[], QUIZ_LENGTH, CHOICES_COUNT, &mut rng)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn blank_out_prefers_surrounded_particle() {
        assert_eq!(
            blank_out("Watashi は gakusei desu.", "は").as_deref(),
            Some("Watashi [___] gakusei desu.")
        );
        assert_eq!(
            blank_out("は gakusei desu.", "は").as_deref(),
            Some("[___] gakusei desu.")
        );
        assert_eq!(blank_out("Mizu を", "を").as_deref(), Some("Mizu [___]"));
        assert_eq!(
            blank_out("Kinou は yasumi は desu", "は").as_deref(),
            Some("Kinou [___] yasumi は desu")
        );
    }

    #[test]
    fn blank_out_ignores_particles_inside_words() {
        assert_eq!(blank_out("こんにちは", "は"), None);
        assert_eq!(blank_out("Gohan o tabemasen.", "を"), None);
    }

    #[test]
    fn only_changed_sentences_become_questions() {
        let points = vec![
            particle("は", "wa", &["Watashi は gakusei desu.", "こんにちは"]),
            particle("が", "ga", &["Neko が imasu."]),
            particle("を", "o", &["Mizu を nomimasu."]),
            particle("に", "ni", &["...5-ji に okimasu."]),
            GrammarPoint {
                id: None,
                part: "BAGIAN 2".to_string(),
                title: "Pola A は B です".to_string(),
                hiragana: None,
                reading: None,
                function: String::new(),
                examples: vec![GrammarExample {
                    source: "TKA".to_string(),
                    japanese: "Ashita は suiyoubi です。".to_string(),
                    translation: "Besok adalah hari Rabu.".to_string(),
                }],
            },
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let questions = fill_in_the_blank(&points, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();

        assert_eq!(questions.len(), 4);
        for q in &questions {
            assert!(q.prompt.contains(BLANK));
            assert_eq!(q.options.len(), 4);
            assert_answer_once(q);
            assert!(q.translation.is_some());
        }
        assert!(!questions.iter().any(|q| q.prompt.contains("suiyoubi")));
    }

    #[test]
    fn blank_particles_are_not_candidates() {
        let points = vec![
            particle("", "", &["Watashi は gakusei desu."]),
            particle("は", "wa", &["Watashi は gakusei desu."]),
            particle("が", "ga", &["Neko が imasu."]),
            particle("を", "o", &["Mizu を nomimasu."]),
            particle("に", "ni", &["...5-ji に okimasu."]),
        ];
        let mut rng = StdRng::seed_from_u64(17);
        let questions = fill_in_the_blank(&points, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();

        assert_eq!(questions.len(), 4);
        for q in &questions {
            assert!(!q.answer.is_empty());
            assert!(q.options.iter().all(|o| !o.trim().is_empty()));
            assert!(q.prompt.contains(&format!(" {BLANK}")));
            assert_answer_once(q);
        }
    }

    #[test]
    fn builtin_grammar_fills_a_session() {
        let content = Content::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let questions =
            fill_in_the_blank(&content.grammar, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();
        assert_eq!(questions.len(), QUIZ_LENGTH);
        for q in &questions {
            assert_answer_once(q);
            assert!(!q.options.contains(&String::new()));
        }
    }

    #[test]
    fn matching_emits_both_sides_of_each_pair() {
        let content = Content::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let cards = matching_cards(&content.vocabulary, GAME_PAIRS, &mut rng);

        assert_eq!(cards.len(), GAME_PAIRS * 2);
        let keys: HashSet<&String> = cards.iter().map(|c| &c.key).collect();
        assert_eq!(keys.len(), GAME_PAIRS);
        for key in keys {
            let sides: Vec<Side> = cards.iter().filter(|c| &c.key == key).map(|c| c.side).collect();
            assert_eq!(sides.len(), 2);
            assert!(sides.contains(&Side::Japanese) && sides.contains(&Side::Meaning));
        }
    }

    #[test]
    fn matching_with_few_words_uses_what_is_there() {
        let words = vec![word("Mizu", "Air"), word("Ocha", "Teh")];
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(matching_cards(&words, GAME_PAIRS, &mut rng).len(), 4);
    }

    #[test]
    fn decks_are_distinct_subsets() {
        let content = Content::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let deck = flashcard_deck(&content.vocabulary, CARD_LENGTH, &mut rng);
        assert_eq!(deck.len(), CARD_LENGTH);
        let romaji: HashSet<&String> = deck.iter().map(|w| &w.romaji).collect();
        assert_eq!(romaji.len(), CARD_LENGTH);

        let prompts = typing_prompts(&content.vocabulary, PROMPT_LENGTH, &mut rng);
        assert_eq!(prompts.len(), PROMPT_LENGTH);
        for prompt in &prompts {
            assert!(content
                .vocabulary
                .iter()
                .any(|w| w.romaji == prompt.romaji && w.indonesian == prompt.answer));
        }
    }

    #[test]
    fn resampling_changes_order() {
        let content = Content::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let first = multiple_choice(&content.vocabulary, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();
        let second = multiple_choice(&content.vocabulary, QUIZ_LENGTH, CHOICES_COUNT, &mut rng).unwrap();
        assert_ne!(first, second);
    }
}
