use crate::libbunpou::db::VocabularyWord;

/// Words of one category, in the order they were stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub words: Vec<&'a VocabularyWord>,
}

/// Groups words by category, categories ordered by first appearance.
pub fn group_by_category(words: &[VocabularyWord]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for word in words {
        match groups.iter_mut().find(|g| g.category == word.category) {
            Some(group) => group.words.push(word),
            None => groups.push(CategoryGroup {
                category: &word.category,
                words: vec![word],
            }),
        }
    }
    groups
}

fn matches(word: &VocabularyWord, needle: &str) -> bool {
    word.romaji.to_lowercase().contains(needle)
        || word.japanese.to_lowercase().contains(needle)
        || word.indonesian.to_lowercase().contains(needle)
}

/// Case-insensitive search over romaji, script and meaning.
/// A blank term keeps everything; categories left without words are dropped.
pub fn search<'a>(groups: &[CategoryGroup<'a>], term: &str) -> Vec<CategoryGroup<'a>> {
    if term.trim().is_empty() {
        return groups.to_vec();
    }
    let needle = term.to_lowercase();
    groups
        .iter()
        .filter_map(|group| {
            let words: Vec<&VocabularyWord> = group
                .words
                .iter()
                .copied()
                .filter(|w| matches(w, &needle))
                .collect();
            if words.is_empty() {
                None
            } else {
                Some(CategoryGroup {
                    category: group.category,
                    words,
                })
            }
        })
        .collect()
}

/// Keeps the categories whose name contains `filter`, ignoring case.
pub fn in_category<'a>(groups: Vec<CategoryGroup<'a>>, filter: &str) -> Vec<CategoryGroup<'a>> {
    let needle = filter.to_lowercase();
    groups
        .into_iter()
        .filter(|g| g.category.to_lowercase().contains(&needle))
        .collect()
}
