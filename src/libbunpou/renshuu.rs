use crate::libbunpou::db::VocabularyWord;
use crate::libbunpou::shitsumon::{ChoiceQuestion, MatchCard, TypingPrompt};
use crate::libbunpou::tokei::Clock;
use log::debug;
use std::collections::HashMap;
use std::time::Duration;

pub const CHOICE_FEEDBACK_DELAY: Duration = Duration::from_millis(1500);
pub const TYPING_FEEDBACK_DELAY: Duration = Duration::from_millis(800);
pub const MISMATCH_DELAY: Duration = Duration::from_millis(900);
pub const COMPLETE_DELAY: Duration = Duration::from_millis(400);

pub trait Gradable {
    fn is_correct(&self, input: &str) -> bool;

    /// Whether a wrong answer keeps the question on screen for another try.
    fn retry_on_miss(&self) -> bool {
        false
    }
}

impl Gradable for ChoiceQuestion {
    fn is_correct(&self, input: &str) -> bool {
        input == self.answer
    }
}

impl Gradable for TypingPrompt {
    fn is_correct(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }

    fn retry_on_miss(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Presenting(usize),
    Answered {
        index: usize,
        selected: String,
        correct: bool,
        due: Duration,
    },
    Finished,
}

/// One run through a list of questions: present, answer, show feedback, advance.
#[derive(Debug)]
pub struct QuizSession<Q> {
    questions: Vec<Q>,
    phase: Phase,
    score: u32,
    delay: Duration,
}

impl<Q: Gradable> QuizSession<Q> {
    pub fn new(questions: Vec<Q>, delay: Duration) -> Self {
        Self {
            questions,
            phase: Phase::Idle,
            score: 0,
            delay,
        }
    }

    /// Presents the first question. Without questions the session stays idle.
    pub fn start(&mut self) {
        if self.phase == Phase::Idle && !self.questions.is_empty() {
            self.phase = Phase::Presenting(0);
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn index(&self) -> Option<usize> {
        match self.phase {
            Phase::Presenting(index) | Phase::Answered { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Q> {
        self.index().and_then(|i| self.questions.get(i))
    }

    pub fn progress_percent(&self) -> u32 {
        match (self.index(), self.questions.len()) {
            (_, 0) => 0,
            (Some(i), len) => (i * 100 / len) as u32,
            (None, _) if self.is_finished() => 100,
            (None, _) => 0,
        }
    }

    /// Grades `input` against the current question.
    ///
    /// Returns `None` when no question is waiting for an answer.
    pub fn answer(&mut self, input: &str, clock: &dyn Clock) -> Option<bool> {
        let Phase::Presenting(index) = self.phase else {
            debug!("[Quiz] Ignoring answer in phase {:?}", self.phase);
            return None;
        };
        let question = self.questions.get(index)?;
        let correct = question.is_correct(input);
        if correct {
            self.score += 1;
        } else if question.retry_on_miss() {
            debug!("[Quiz] Question {} missed, retrying.", index + 1);
            return Some(false);
        }

        self.phase = Phase::Answered {
            index,
            selected: input.to_string(),
            correct,
            due: clock.now() + self.delay,
        };
        debug!("[Quiz] Question {} answered, correct: {}", index + 1, correct);
        Some(correct)
    }

    /// When the pending transition is scheduled for, if any.
    pub fn due(&self) -> Option<Duration> {
        match self.phase {
            Phase::Answered { due, .. } => Some(due),
            _ => None,
        }
    }

    /// Moves past the feedback once its delay has elapsed. Returns whether it did.
    pub fn tick(&mut self, clock: &dyn Clock) -> bool {
        let Phase::Answered { index, due, .. } = self.phase else {
            return false;
        };
        if clock.now() < due {
            return false;
        }
        self.phase = if index + 1 < self.questions.len() {
            Phase::Presenting(index + 1)
        } else {
            debug!("[Quiz] Finished with score {}/{}", self.score, self.questions.len());
            Phase::Finished
        };
        true
    }

    /// Starts over with a freshly drawn question set.
    pub fn restart(&mut self, questions: Vec<Q>) {
        self.questions = questions;
        self.score = 0;
        self.phase = Phase::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Picking,
    Mismatch { due: Duration },
    Completing { due: Duration },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Ignored,
    Flipped,
    Matched,
    Mismatched,
}

/// Memory game over face-down cards, two of which are turned at a time.
#[derive(Debug)]
pub struct MatchingSession {
    cards: Vec<MatchCard>,
    selected: Vec<usize>,
    matched: Vec<String>,
    moves: u32,
    pair_count: usize,
    phase: MatchPhase,
}

impl MatchingSession {
    pub fn new(cards: Vec<MatchCard>) -> Self {
        let pair_count = cards.len() / 2;
        Self {
            cards,
            selected: Vec::with_capacity(2),
            matched: Vec::with_capacity(pair_count),
            moves: 0,
            pair_count,
            phase: MatchPhase::Picking,
        }
    }

    pub fn cards(&self) -> &[MatchCard] {
        &self.cards
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.cards
            .get(index)
            .is_some_and(|c| self.matched.contains(&c.key))
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.is_matched(index) || self.selected.contains(&index)
    }

    pub fn progress_percent(&self) -> u32 {
        if self.pair_count == 0 {
            0
        } else {
            (self.matched.len() * 100 / self.pair_count) as u32
        }
    }

    pub fn due(&self) -> Option<Duration> {
        match self.phase {
            MatchPhase::Mismatch { due } | MatchPhase::Completing { due } => Some(due),
            _ => None,
        }
    }

    pub fn select(&mut self, index: usize, clock: &dyn Clock) -> Selection {
        if self.phase != MatchPhase::Picking
            || index >= self.cards.len()
            || self.selected.len() >= 2
            || self.is_matched(index)
            || self.selected.contains(&index)
        {
            return Selection::Ignored;
        }
        self.selected.push(index);
        if self.selected.len() < 2 {
            return Selection::Flipped;
        }

        self.moves += 1;
        let (first, second) = (&self.cards[self.selected[0]], &self.cards[self.selected[1]]);
        if first.key == second.key {
            debug!("[Match] Pair '{}' matched.", first.key);
            self.matched.push(first.key.clone());
            self.selected.clear();
            if self.matched.len() == self.pair_count {
                self.phase = MatchPhase::Completing {
                    due: clock.now() + COMPLETE_DELAY,
                };
            }
            Selection::Matched
        } else {
            self.phase = MatchPhase::Mismatch {
                due: clock.now() + MISMATCH_DELAY,
            };
            Selection::Mismatched
        }
    }

    /// Turns a mismatched pair back over, or finishes a completed board.
    pub fn tick(&mut self, clock: &dyn Clock) -> bool {
        match self.phase {
            MatchPhase::Mismatch { due } if clock.now() >= due => {
                self.selected.clear();
                self.phase = MatchPhase::Picking;
                true
            }
            MatchPhase::Completing { due } if clock.now() >= due => {
                debug!("[Match] Finished in {} moves.", self.moves);
                self.phase = MatchPhase::Finished;
                true
            }
            _ => false,
        }
    }

    pub fn restart(&mut self, cards: Vec<MatchCard>) {
        *self = Self::new(cards);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Remembered,
    Retry,
}

/// Self-graded flashcards: show the word, reveal its meaning, mark it.
#[derive(Debug)]
pub struct FlashcardSession {
    cards: Vec<VocabularyWord>,
    index: usize,
    show_meaning: bool,
    results: HashMap<String, Mark>,
    finished: bool,
}

impl FlashcardSession {
    pub fn new(cards: Vec<VocabularyWord>) -> Self {
        Self {
            cards,
            index: 0,
            show_meaning: false,
            results: HashMap::new(),
            finished: false,
        }
    }

    pub fn current(&self) -> Option<&VocabularyWord> {
        if self.finished {
            None
        } else {
            self.cards.get(self.index)
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress_percent(&self) -> u32 {
        match self.cards.len() {
            0 => 0,
            _ if self.finished => 100,
            len => (self.index * 100 / len) as u32,
        }
    }

    pub fn shows_meaning(&self) -> bool {
        self.show_meaning
    }

    pub fn mark_of(&self, romaji: &str) -> Option<Mark> {
        self.results.get(romaji).copied()
    }

    pub fn reveal(&mut self) {
        self.show_meaning = true;
    }

    fn go_to(&mut self, index: usize) {
        self.index = index;
        self.show_meaning = self
            .cards
            .get(index)
            .is_some_and(|c| self.results.contains_key(&c.romaji));
    }

    pub fn mark(&mut self, mark: Mark) {
        let Some(romaji) = self.current().map(|c| c.romaji.clone()) else {
            return;
        };
        self.results.insert(romaji, mark);
        if self.index + 1 >= self.cards.len() {
            self.finished = true;
        } else {
            self.go_to(self.index + 1);
        }
    }

    pub fn previous(&mut self) {
        if !self.finished && self.index > 0 {
            self.go_to(self.index - 1);
        }
    }

    pub fn next(&mut self) {
        if !self.finished && self.index + 1 < self.cards.len() {
            self.go_to(self.index + 1);
        }
    }

    fn count(&self, mark: Mark) -> usize {
        self.results.values().filter(|m| **m == mark).count()
    }

    pub fn remembered_count(&self) -> usize {
        self.count(Mark::Remembered)
    }

    pub fn retry_count(&self) -> usize {
        self.count(Mark::Retry)
    }

    pub fn restart(&mut self, cards: Vec<VocabularyWord>) {
        *self = Self::new(cards);
    }
}
