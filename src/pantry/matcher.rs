use crate::error::{Error, Result};

/// Message returned when the pantry list is missing or empty
pub const EMPTY_PANTRY_MESSAGE: &str = "Vui lòng cung cấp danh sách nguyên liệu";

/// Normalize an ingredient name for matching (lowercase, trim).
///
/// Diacritics are compared as-is: "bo" and "bò" are different words.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Split a normalized name into words.
///
/// A blank name yields a single empty word, and the empty word is contained
/// in every other word. A blank pantry entry therefore covers every
/// ingredient, and a blank ingredient is covered by any pantry entry.
fn tokenize(normalized: &str) -> Vec<&str> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.is_empty() {
        vec![""]
    } else {
        words
    }
}

/// Word-level containment in either direction.
///
/// NOTE: short words produce false positives ("ăn" is inside "khăn").
/// Kept as-is so scores stay compatible with existing results.
fn words_overlap(pantry_word: &str, ingredient_word: &str) -> bool {
    ingredient_word.contains(pantry_word) || pantry_word.contains(ingredient_word)
}

/// Matched/missing split of one recipe's ingredients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientMatch {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl IngredientMatch {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Share of ingredients covered, rounded half up to a whole percent.
    /// A recipe with no ingredients scores 0.
    pub fn percentage(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        ((200 * self.matched.len() + total) / (2 * total)) as u8
    }

    pub fn explanation(&self) -> String {
        format!(
            "Công thức có {}/{} nguyên liệu bạn có",
            self.matched.len(),
            self.total()
        )
    }
}

/// A recipe to score, together with its ingredient names in recipe order
#[derive(Debug, Clone)]
pub struct Candidate<T> {
    pub recipe: T,
    pub ingredients: Vec<String>,
}

/// A scored recipe that survived filtering
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch<T> {
    pub recipe: T,
    pub match_percentage: u8,
    pub matched_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub explanation: String,
}

/// Scores recipes against the ingredients a user has on hand
#[derive(Debug, Clone)]
pub struct PantryMatcher {
    /// Normalized pantry entries, each split into words
    entries: Vec<Vec<String>>,
}

impl PantryMatcher {
    /// Build a matcher from the user's pantry list.
    ///
    /// Fails with a validation error when the list is empty.
    pub fn new<S: AsRef<str>>(pantry: &[S]) -> Result<Self> {
        if pantry.is_empty() {
            return Err(Error::Validation(EMPTY_PANTRY_MESSAGE.to_string()));
        }

        let entries = pantry
            .iter()
            .map(|entry| {
                let normalized = normalize(entry.as_ref());
                tokenize(&normalized)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        Ok(Self { entries })
    }

    /// Whether any pantry entry shares a word (by containment) with the
    /// already-normalized ingredient name
    fn covers(&self, normalized_ingredient: &str) -> bool {
        let ingredient_words = tokenize(normalized_ingredient);

        self.entries.iter().any(|entry| {
            entry.iter().any(|pantry_word| {
                ingredient_words
                    .iter()
                    .any(|ingredient_word| words_overlap(pantry_word, ingredient_word))
            })
        })
    }

    /// Whether a single recipe ingredient is available in the pantry
    pub fn has_ingredient(&self, ingredient: &str) -> bool {
        self.covers(&normalize(ingredient))
    }

    /// Split a recipe's ingredients into matched and missing, preserving
    /// recipe order. Names in the result are normalized.
    pub fn match_ingredients<S: AsRef<str>>(&self, ingredients: &[S]) -> IngredientMatch {
        let mut matched = Vec::new();
        let mut missing = Vec::new();

        for ingredient in ingredients {
            let normalized = normalize(ingredient.as_ref());
            if self.covers(&normalized) {
                matched.push(normalized);
            } else {
                missing.push(normalized);
            }
        }

        IngredientMatch { matched, missing }
    }

    /// Score every candidate, drop those with no coverage, order by
    /// percentage descending (ties keep input order) and keep at most
    /// `limit` results.
    pub fn rank<T, I>(&self, candidates: I, limit: usize) -> Vec<RankedMatch<T>>
    where
        I: IntoIterator<Item = Candidate<T>>,
    {
        let mut ranked: Vec<RankedMatch<T>> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let result = self.match_ingredients(&candidate.ingredients);
                let match_percentage = result.percentage();
                if match_percentage == 0 {
                    return None;
                }

                let explanation = result.explanation();
                Some(RankedMatch {
                    recipe: candidate.recipe,
                    match_percentage,
                    matched_ingredients: result.matched,
                    missing_ingredients: result.missing,
                    explanation,
                })
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
        ranked.truncate(limit);
        ranked
    }
}
