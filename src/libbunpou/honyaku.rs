use crate::libbunpou::settei::Language;
use crate::libbunpou::{Error, Result};

fn indonesian(key: &str) -> Option<&'static str> {
    Some(match key {
        "app.title" => "文法 (Bunpou)",
        "quit" => "Keluar lebih awal!",
        "grammar.function" => "Fungsi",
        "grammar.examples" => "Contoh",
        "vocab.count" => "{{count}} kata",
        "vocab.noResults" => "Tidak ada kosakata yang cocok. Coba kata kunci lain.",
        "quiz.empty.multipleChoice" => "Membuat soal pilihan ganda... Kosakata belum cukup.",
        "quiz.empty.fillBlank" => "Mengumpulkan kalimat untuk latihan... Coba mode lain jika pesan ini bertahan.",
        "quiz.empty.matching" => "Menyiapkan kartu pasangan... Kosakata belum cukup.",
        "quiz.empty.flashcards" => "Menyiapkan kartu hafalan... Kosakata belum cukup.",
        "quiz.empty.typing" => "Menyiapkan latihan mengetik... Kosakata belum cukup.",
        "quiz.progress" => "Pertanyaan {{current}} dari {{total}}",
        "quiz.score" => "Skor sementara: {{score}}",
        "quiz.percent" => "{{percent}}% selesai",
        "quiz.outOfRange" => "Hanya ada {{count}} pilihan!",
        "quiz.answerPrompt" => "Jawaban (1-{{count}}, q untuk keluar, lainnya jika tidak tahu):",
        "quiz.correct" => "Benar!",
        "quiz.incorrect" => "Salah! Jawaban yang benar: {{answer}}",
        "quiz.finished" => "Sesi selesai! Skor kamu {{score}} dari {{total}}.",
        "quiz.restart" => "Main lagi dengan soal baru? (y/n):",
        "multipleChoice.instruction" => "Apa arti kata berikut?",
        "fillBlank.instruction" => "Pilih partikel yang tepat",
        "matching.prompt" => "Pilih kartu (1-{{count}}, q untuk keluar):",
        "matching.status" => "Langkah: {{moves}}  Cocok: {{matched}} / {{pairs}}",
        "matching.finished" => "Hebat! Semua pasangan berhasil ditemukan! Total langkah: {{moves}}",
        "flashcards.prompt" => "[r] buka arti  [1] ingat  [2] ulangi  [p] sebelumnya  [n] berikutnya  [q] keluar:",
        "flashcards.finished" => "Kartu selesai! Ingat: {{remembered}}, perlu diulang: {{retry}}",
        "typing.prompt" => "Ketik arti kata ini (q untuk keluar):",
        "typing.incorrect" => "Belum tepat, coba lagi!",
        "settings.language" => "Bahasa",
        "settings.theme" => "Tema",
        _ => return None,
    })
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        "quit" => "Quitting early!",
        "grammar.function" => "Function",
        "grammar.examples" => "Examples",
        "vocab.count" => "{{count}} words",
        "vocab.noResults" => "No matching vocabulary. Try another keyword.",
        "quiz.empty.multipleChoice" => "Preparing multiple-choice questions... Not enough vocabulary yet.",
        "quiz.empty.fillBlank" => "Collecting sentences to practise... Try another mode if this persists.",
        "quiz.empty.matching" => "Preparing matching cards... Not enough vocabulary yet.",
        "quiz.empty.flashcards" => "Preparing flashcards... Not enough vocabulary yet.",
        "quiz.empty.typing" => "Preparing the typing drill... Not enough vocabulary yet.",
        "quiz.progress" => "Question {{current}} of {{total}}",
        "quiz.score" => "Current score: {{score}}",
        "quiz.percent" => "{{percent}}% done",
        "quiz.outOfRange" => "There are only {{count}} options available!",
        "quiz.answerPrompt" => "Answer (1-{{count}}, q to quit, anything else if you don't know):",
        "quiz.correct" => "Correct!",
        "quiz.incorrect" => "Wrong! The right answer: {{answer}}",
        "quiz.finished" => "Session complete! You scored {{score}} of {{total}}.",
        "quiz.restart" => "Play again with new questions? (y/n):",
        "multipleChoice.instruction" => "What does this word mean?",
        "fillBlank.instruction" => "Pick the right particle",
        "matching.prompt" => "Pick a card (1-{{count}}, q to quit):",
        "matching.status" => "Moves: {{moves}}  Matched: {{matched}} / {{pairs}}",
        "matching.finished" => "Great! Every pair found! Total moves: {{moves}}",
        "flashcards.prompt" => "[r] reveal  [1] remembered  [2] retry  [p] previous  [n] next  [q] quit:",
        "flashcards.finished" => "Deck done! Remembered: {{remembered}}, to retry: {{retry}}",
        "typing.prompt" => "Type the meaning of this word (q to quit):",
        "typing.incorrect" => "Not quite, try again!",
        "settings.language" => "Language",
        "settings.theme" => "Theme",
        _ => return None,
    })
}

/// Looks `key` up in the active language, then in Indonesian.
pub fn lookup(language: Language, key: &str) -> Result<&'static str> {
    let active = match language {
        Language::Id => indonesian(key),
        Language::En => english(key),
    };
    active
        .or_else(|| indonesian(key))
        .ok_or_else(|| Error::MissingTranslation(key.to_string()))
}

/// Fills `{{ name }}` placeholders in `template`.
pub fn format_template(template: &str, replacements: &[(&str, String)]) -> String {
    replacements
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{{{name}}}}}"), value)
                .replace(&format!("{{{{ {name} }}}}"), value)
        })
}

pub fn t(language: Language, key: &str, replacements: &[(&str, String)]) -> Result<String> {
    Ok(format_template(lookup(language, key)?, replacements))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_falls_back_to_indonesian() {
        assert_eq!(lookup(Language::En, "quiz.correct").unwrap(), "Correct!");
        assert_eq!(lookup(Language::En, "app.title").unwrap(), "文法 (Bunpou)");
    }

    #[test]
    fn missing_key_fails_fast() {
        assert!(matches!(
            lookup(Language::Id, "quiz.nope"),
            Err(Error::MissingTranslation(key)) if key == "quiz.nope"
        ));
    }

    #[test]
    fn placeholders_are_filled() {
        let text = t(
            Language::Id,
            "quiz.finished",
            &[("score", 7.to_string()), ("total", 10.to_string())],
        )
        .unwrap();
        assert_eq!(text, "Sesi selesai! Skor kamu 7 dari 10.");
        assert_eq!(
            t(Language::En, "quiz.outOfRange", &[("count", 4.to_string())]).unwrap(),
            "There are only 4 options available!"
        );
        assert_eq!(
            format_template("{{ a }}-{{a}}-{{b}}", &[("a", "x".to_string())]),
            "x-x-{{b}}"
        );
    }
}
