use crate::libbunpou::db::{GrammarPoint, VocabularyWord};
use crate::libbunpou::honyaku;
use crate::libbunpou::kotoba;
use crate::libbunpou::naiyou::Content;
use crate::libbunpou::renshuu::{
    FlashcardSession, Gradable, Mark, MatchingSession, QuizSession, Selection,
    CHOICE_FEEDBACK_DELAY, TYPING_FEEDBACK_DELAY,
};
use crate::libbunpou::settei::{Language, Settings, Theme};
use crate::libbunpou::shitsumon::{self, ChoiceQuestion, MatchCard, TypingPrompt};
use crate::libbunpou::tokei::Clock;
use crate::libbunpou::Result as BunpouResult;
use crate::{Choice, Error, QuizMode};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use log::debug;
use rand::rng;
use std::fmt;
use std::io::{self, Write};
use text_io::try_read;

const BOARD_COLUMNS: usize = 4;
const BAR_WIDTH: usize = 20;
const QUIT: &str = "q";

#[derive(Debug, Clone, Copy)]
pub struct QuizOptions {
    pub question_count: usize,
    pub choices_count: usize,
}

/// Everything a view needs besides its content.
pub struct View<'a> {
    pub settings: Settings,
    pub clock: &'a dyn Clock,
}

impl View<'_> {
    fn t(&self, key: &str, replacements: &[(&str, String)]) -> Result<String, Error> {
        Ok(honyaku::t(self.settings.language, key, replacements)?)
    }

    fn accent(&self, text: &str) -> ColoredString {
        text.color(self.settings.theme.accent())
    }

    fn wait_for(&self, due: Option<std::time::Duration>) {
        if let Some(due) = due {
            self.clock.sleep_until(due);
        }
    }
}

/// A closed or exhausted stdin reads as a request to quit.
fn line_or_quit<E: fmt::Debug>(read: Result<String, E>) -> String {
    match read {
        Ok(line) => line.trim().to_string(),
        Err(e) => {
            debug!("[Input] Nothing more to read ({:?}), quitting.", e);
            QUIT.to_string()
        }
    }
}

fn prompt(text: ColoredString) -> Result<String, Error> {
    print!("{} ", text);
    io::stdout().flush()?;
    Ok(line_or_quit(try_read!("{}\n")))
}

fn ask_restart(view: &View) -> Result<bool, Error> {
    let answer = prompt(view.accent(&view.t("quiz.restart", &[])?))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

fn progress_bar(percent: u32) -> String {
    let filled = percent.min(100) as usize * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn print_progress(view: &View, percent: u32) -> Result<(), Error> {
    println!(
        "{} {}",
        view.accent(&progress_bar(percent)),
        view.t("quiz.percent", &[("percent", percent.to_string())])?.dimmed()
    );
    Ok(())
}

fn print_header(
    view: &View,
    current: usize,
    total: usize,
    percent: u32,
    score: Option<u32>,
) -> Result<String, Error> {
    print_progress(view, percent)?;
    let leading = format!(
        "{}. ",
        view.t(
            "quiz.progress",
            &[("current", current.to_string()), ("total", total.to_string())]
        )?
    );
    if let Some(score) = score {
        println!(
            "{}",
            view.t("quiz.score", &[("score", score.to_string())])?.dimmed()
        );
    }
    Ok(leading)
}

fn print_finished<Q: Gradable>(view: &View, session: &QuizSession<Q>) -> Result<(), Error> {
    println!(
        "{}",
        view.t(
            "quiz.finished",
            &[
                ("score", session.score().to_string()),
                ("total", session.len().to_string())
            ]
        )?
        .bold()
        .color(view.settings.theme.accent())
    );
    Ok(())
}

pub fn show_grammar(points: &[GrammarPoint], part: Option<&str>, settings: &Settings) -> Result<(), Error> {
    let accent = settings.theme.accent();
    let function_label = honyaku::lookup(settings.language, "grammar.function")?;
    let examples_label = honyaku::lookup(settings.language, "grammar.examples")?;
    let filter = part.map(|p| p.to_lowercase());

    let mut current_part: Option<&str> = None;
    for point in points {
        if let Some(filter) = &filter {
            if !point.part.to_lowercase().contains(filter) {
                continue;
            }
        }
        if current_part != Some(point.part.as_str()) {
            println!("\n{}", format!("==========> {} <==========", point.part).color(accent));
            current_part = Some(point.part.as_str());
        }
        print!("{}", point.title.bold());
        if let (Some(hiragana), Some(reading)) = (&point.hiragana, &point.reading) {
            print!(" {}", format!("({} · {})", hiragana, reading).color(accent));
        }
        println!();
        println!("  {}: {}", function_label.dimmed(), point.function);
        if !point.examples.is_empty() {
            println!("  {}:", examples_label.dimmed());
        }
        for example in &point.examples {
            println!("    [{}] {}", example.source.yellow(), example.japanese.bold());
            println!("          {}", example.translation.italic());
        }
    }
    Ok(())
}

pub fn show_vocabulary(
    words: &[VocabularyWord],
    search: Option<&str>,
    category: Option<&str>,
    settings: &Settings,
) -> Result<(), Error> {
    let mut groups = kotoba::group_by_category(words);
    if let Some(category) = category {
        groups = kotoba::in_category(groups, category);
    }
    let groups = kotoba::search(&groups, search.unwrap_or_default());
    debug!("[Vocab] {} categories after filtering", groups.len());

    if groups.is_empty() {
        println!("{}", honyaku::lookup(settings.language, "vocab.noResults")?.yellow());
        return Ok(());
    }
    for group in &groups {
        let count = honyaku::t(
            settings.language,
            "vocab.count",
            &[("count", group.words.len().to_string())],
        )?;
        println!(
            "\n{} {}",
            group.category.bold().color(settings.theme.accent()),
            format!("({})", count).dimmed()
        );
        for word in &group.words {
            println!(
                "  {:<20} {:<18} {}",
                word.romaji,
                word.japanese,
                word.indonesian.bright_white()
            );
        }
    }
    Ok(())
}

pub fn show_settings(settings: &Settings) -> Result<(), Error> {
    let accent = settings.theme.accent();
    println!("{}:", honyaku::lookup(settings.language, "settings.language")?.color(accent));
    for language in Language::value_variants() {
        let marker = if *language == settings.language { "●" } else { "○" };
        println!("  {} {:<3} {}", marker, language.tag(), language.label());
    }
    println!("{}:", honyaku::lookup(settings.language, "settings.theme")?.color(accent));
    for theme in Theme::value_variants() {
        let marker = if *theme == settings.theme { "●" } else { "○" };
        println!(
            "  {} {:<9} {}",
            marker,
            theme.tag().color(theme.accent()),
            theme.description()
        );
    }
    Ok(())
}

pub fn run_quiz(mode: QuizMode, content: &Content, options: &QuizOptions, view: &View) -> Result<(), Error> {
    let mut rng = rng();
    let words = &content.vocabulary;
    match mode {
        QuizMode::MultipleChoice => choice_loop(
            || shitsumon::multiple_choice(words, options.question_count, options.choices_count, &mut rng),
            "multipleChoice.instruction",
            "quiz.empty.multipleChoice",
            view,
        ),
        QuizMode::FillInTheBlank => choice_loop(
            || {
                shitsumon::fill_in_the_blank(
                    &content.grammar,
                    options.question_count,
                    options.choices_count,
                    &mut rng,
                )
            },
            "fillBlank.instruction",
            "quiz.empty.fillBlank",
            view,
        ),
        QuizMode::MatchingGame => matching_loop(
            || shitsumon::matching_cards(words, options.question_count, &mut rng),
            view,
        ),
        QuizMode::Flashcards => flashcard_loop(
            || shitsumon::flashcard_deck(words, options.question_count, &mut rng),
            view,
        ),
        QuizMode::TypingDrill => typing_loop(
            || shitsumon::typing_prompts(words, options.question_count, &mut rng),
            view,
        ),
    }
}

fn choice_loop(
    mut generate: impl FnMut() -> BunpouResult<Vec<ChoiceQuestion>>,
    instruction_key: &str,
    empty_key: &str,
    view: &View,
) -> Result<(), Error> {
    let mut session = QuizSession::new(generate()?, CHOICE_FEEDBACK_DELAY);
    loop {
        session.start();
        if session.is_empty() {
            println!("{}", view.t(empty_key, &[])?.yellow());
            return Ok(());
        }
        println!("{}", view.accent(&view.t(instruction_key, &[])?));

        while let Some(question) = session.current().cloned() {
            let idx = session.index().unwrap_or_default();
            let leading = print_header(
                view,
                idx + 1,
                session.len(),
                session.progress_percent(),
                Some(session.score()),
            )?;
            println!(
                "{}{}",
                view.accent(&leading),
                format!(" {} ", question.prompt).black().bold().on_white()
            );
            let indent = " ".repeat(leading.chars().count());
            if let Some(translation) = &question.translation {
                println!("{}{}", indent, format!("\"{}\"", translation).italic().dimmed());
            }
            for (i, option) in question.options.iter().enumerate() {
                println!("{}{}. {}", indent, format!("{}", i + 1).bold(), option);
            }

            let input = prompt(view.accent(&view.t(
                "quiz.answerPrompt",
                &[("count", question.options.len().to_string())],
            )?))?;
            let choice = Choice::from_str(question.options.len(), &input);
            debug!("choice: {:?}", choice);
            let selected = match choice {
                Choice::Option(num) => question.options[num].clone(),
                Choice::OutOfRange => {
                    println!(
                        "{}",
                        view.t(
                            "quiz.outOfRange",
                            &[("count", question.options.len().to_string())]
                        )?
                        .bright_red()
                    );
                    String::new()
                }
                Choice::DontKnow => String::new(),
                Choice::Quit => {
                    println!("{}", view.t("quit", &[])?.cyan());
                    return Ok(());
                }
            };

            match session.answer(&selected, view.clock) {
                Some(true) => println!("{}", view.t("quiz.correct", &[])?.bright_green()),
                Some(false) => println!(
                    "{}",
                    view.t("quiz.incorrect", &[("answer", question.answer.clone())])?
                        .bright_red()
                ),
                None => {}
            }
            view.wait_for(session.due());
            session.tick(view.clock);
        }

        print_finished(view, &session)?;
        if !ask_restart(view)? {
            return Ok(());
        }
        session.restart(generate()?);
    }
}

fn typing_loop(mut generate: impl FnMut() -> Vec<TypingPrompt>, view: &View) -> Result<(), Error> {
    let mut session = QuizSession::new(generate(), TYPING_FEEDBACK_DELAY);
    loop {
        session.start();
        if session.is_empty() {
            println!("{}", view.t("quiz.empty.typing", &[])?.yellow());
            return Ok(());
        }

        while let Some(current) = session.current().cloned() {
            let idx = session.index().unwrap_or_default();
            let leading = print_header(
                view,
                idx + 1,
                session.len(),
                session.progress_percent(),
                Some(session.score()),
            )?;
            println!(
                "{}{} {}",
                view.accent(&leading),
                format!(" {} ", current.japanese).black().bold().on_white(),
                current.romaji.dimmed()
            );

            let input = prompt(view.accent(&view.t("typing.prompt", &[])?))?;
            if input == QUIT {
                println!("{}", view.t("quit", &[])?.cyan());
                return Ok(());
            }
            match session.answer(&input, view.clock) {
                Some(true) => println!("{}", view.t("quiz.correct", &[])?.bright_green()),
                Some(false) => println!("{}", view.t("typing.incorrect", &[])?.bright_red()),
                None => {}
            }
            view.wait_for(session.due());
            session.tick(view.clock);
        }

        print_finished(view, &session)?;
        if !ask_restart(view)? {
            return Ok(());
        }
        session.restart(generate());
    }
}

fn board_cell(session: &MatchingSession, index: usize, card: &MatchCard, view: &View) -> ColoredString {
    let label = format!("{:>2}.", index + 1);
    if session.is_matched(index) {
        format!("{} {:<14}", label, card.content).green()
    } else if session.is_visible(index) {
        view.accent(&format!("{} {:<14}", label, card.content)).bold()
    } else {
        format!("{} {:<14}", label, "?").normal()
    }
}

fn draw_board(session: &MatchingSession, view: &View) -> Result<(), Error> {
    print_progress(view, session.progress_percent())?;
    for (row, chunk) in session.cards().chunks(BOARD_COLUMNS).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, card)| board_cell(session, row * BOARD_COLUMNS + col, card, view).to_string())
            .collect();
        println!("  {}", cells.join(" "));
    }
    println!(
        "{}",
        view.t(
            "matching.status",
            &[
                ("moves", session.moves().to_string()),
                ("matched", session.matched_count().to_string()),
                ("pairs", session.pair_count().to_string())
            ]
        )?
        .dimmed()
    );
    Ok(())
}

fn matching_loop(mut generate: impl FnMut() -> Vec<MatchCard>, view: &View) -> Result<(), Error> {
    let mut session = MatchingSession::new(generate());
    loop {
        if session.cards().is_empty() {
            println!("{}", view.t("quiz.empty.matching", &[])?.yellow());
            return Ok(());
        }

        while !session.is_finished() {
            draw_board(&session, view)?;
            let input = prompt(view.accent(&view.t(
                "matching.prompt",
                &[("count", session.cards().len().to_string())],
            )?))?;
            if input == QUIT {
                println!("{}", view.t("quit", &[])?.cyan());
                return Ok(());
            }
            let Ok(num) = input.parse::<usize>() else {
                continue;
            };
            let selection = session.select(num.wrapping_sub(1), view.clock);
            debug!("[Match] Picked {} -> {:?}", num, selection);
            match selection {
                Selection::Mismatched => {
                    draw_board(&session, view)?;
                    println!("{}", "✘".bright_red());
                }
                Selection::Matched => println!("{}", "✔".bright_green()),
                Selection::Flipped | Selection::Ignored => {}
            }
            view.wait_for(session.due());
            session.tick(view.clock);
        }

        println!(
            "{}",
            view.t("matching.finished", &[("moves", session.moves().to_string())])?
                .bold()
                .color(view.settings.theme.accent())
        );
        if !ask_restart(view)? {
            return Ok(());
        }
        session.restart(generate());
    }
}

fn flashcard_loop(mut generate: impl FnMut() -> Vec<VocabularyWord>, view: &View) -> Result<(), Error> {
    let mut session = FlashcardSession::new(generate());
    loop {
        if session.is_empty() {
            println!("{}", view.t("quiz.empty.flashcards", &[])?.yellow());
            return Ok(());
        }

        while let Some(card) = session.current().cloned() {
            let leading = print_header(
                view,
                session.index() + 1,
                session.len(),
                session.progress_percent(),
                None,
            )?;
            println!(
                "{}{} {}",
                view.accent(&leading),
                format!(" {} ", card.japanese).black().bold().on_white(),
                card.romaji.dimmed()
            );
            if session.shows_meaning() {
                let mark = match session.mark_of(&card.romaji) {
                    Some(Mark::Remembered) => " ✔".bright_green(),
                    Some(Mark::Retry) => " ↺".yellow(),
                    None => "".normal(),
                };
                println!("{}{}{}", " ".repeat(leading.chars().count()), card.indonesian.bold(), mark);
            }

            match prompt(view.accent(&view.t("flashcards.prompt", &[])?))?.as_str() {
                "r" => session.reveal(),
                "1" => session.mark(Mark::Remembered),
                "2" => session.mark(Mark::Retry),
                "p" => session.previous(),
                "n" => session.next(),
                QUIT => {
                    println!("{}", view.t("quit", &[])?.cyan());
                    return Ok(());
                }
                _ => {}
            }
        }

        println!(
            "{}",
            view.t(
                "flashcards.finished",
                &[
                    ("remembered", session.remembered_count().to_string()),
                    ("retry", session.retry_count().to_string())
                ]
            )?
            .bold()
            .color(view.settings.theme.accent())
        );
        if !ask_restart(view)? {
            return Ok(());
        }
        session.restart(generate());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libbunpou::shitsumon::Side;
    use crate::libbunpou::tokei::ManualClock;

    fn card(key: &str, content: &str, side: Side) -> MatchCard {
        MatchCard {
            key: key.to_string(),
            content: content.to_string(),
            side,
        }
    }

    #[test]
    fn closed_input_quits() {
        assert_eq!(line_or_quit::<&str>(Ok(" 2 ".to_string())), "2");
        assert_eq!(line_or_quit(Err("end of input")), QUIT);
        assert_eq!(Choice::from_str(4, &line_or_quit(Err("end of input"))), Choice::Quit);
    }

    #[test]
    fn progress_bar_fills_with_percent() {
        assert_eq!(progress_bar(0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(250), progress_bar(100));
    }

    #[test]
    fn board_hides_unturned_cards() {
        colored::control::set_override(false);
        let clock = ManualClock::new();
        let view = View {
            settings: Settings::default(),
            clock: &clock,
        };
        let cards = vec![card("Mizu", "みず", Side::Japanese), card("Mizu", "Air", Side::Meaning)];
        let mut session = MatchingSession::new(cards.clone());

        assert_eq!(board_cell(&session, 0, &cards[0], &view).to_string().trim_end(), " 1. ?");
        session.select(0, &clock);
        assert_eq!(board_cell(&session, 0, &cards[0], &view).to_string().trim_end(), " 1. みず");
        session.select(1, &clock);
        assert!(session.is_matched(1));
        assert_eq!(board_cell(&session, 1, &cards[1], &view).to_string().trim_end(), " 2. Air");
    }
}
