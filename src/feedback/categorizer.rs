use crate::error::{AppError, Result};
use regex::Regex;

/// Category assigned when no keyword matches
pub const DEFAULT_CATEGORY: &str = "General";

const DEFAULT_TAXONOMY: &[(&str, &[&str])] = &[
    ("Nursing Care", &["nurse", "nurses", "nursing", "care staff"]),
    ("Doctor's Conduct", &["doctor", "dr", "physician", "consultant"]),
    ("Cleanliness", &["clean", "hygiene", "dirty", "messy", "housekeeping"]),
    ("Billing", &["bill", "invoice", "payment", "charge", "insurance"]),
    ("Food", &["food", "meal", "diet", "canteen"]),
    ("Facilities", &["room", "bed", "washroom", "ac", "infrastructure", "wifi"]),
];

/// Ordered keyword taxonomy; the first category with a whole-word match wins
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<(String, Regex)>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(DEFAULT_TAXONOMY.iter().copied())
            .expect("Default taxonomy keywords must compile")
    }
}

impl Taxonomy {
    /// Build a taxonomy from `(category, keywords)` pairs in priority order.
    ///
    /// Keywords match case-insensitively on word boundaries, so "ac" matches
    /// "the AC was broken" but not "accurate".
    pub fn new<'a, I>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let categories = categories
            .into_iter()
            .map(|(name, keywords)| {
                if keywords.is_empty() {
                    return Err(AppError::Configuration(format!(
                        "category '{}' has no keywords",
                        name
                    )));
                }
                let alternation = keywords
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = format!(r"(?i)\b(?:{})\b", alternation);
                let regex = Regex::new(&pattern).map_err(|e| {
                    AppError::Configuration(format!("invalid keywords for '{}': {}", name, e))
                })?;
                Ok((name.to_string(), regex))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { categories })
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    pub fn categorize(&self, text: &str) -> &str {
        self.categories
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(name, _)| name.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_categories() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.categorize("The nurse was excellent"), "Nursing Care");
        assert_eq!(taxonomy.categorize("Dr. Rao explained everything"), "Doctor's Conduct");
        assert_eq!(taxonomy.categorize("Bathrooms were dirty"), "Cleanliness");
        assert_eq!(taxonomy.categorize("The invoice had errors"), "Billing");
        assert_eq!(taxonomy.categorize("Cold meal every day"), "Food");
        assert_eq!(taxonomy.categorize("Great wifi in the room"), "Facilities");
    }

    #[test]
    fn test_default_category() {
        assert_eq!(Taxonomy::default().categorize("Everything was fine"), "General");
        assert_eq!(Taxonomy::default().categorize(""), "General");
    }

    #[test]
    fn test_first_category_wins() {
        let taxonomy = Taxonomy::default();
        assert_eq!(
            taxonomy.categorize("The doctor was late but the nurse helped"),
            "Nursing Care"
        );
        assert_eq!(taxonomy.categorize("Dirty room"), "Cleanliness");
    }

    #[test]
    fn test_whole_word_matching() {
        let taxonomy = Taxonomy::default();
        // "ac" inside "accurate", "bill" inside "billion"
        assert_eq!(taxonomy.categorize("An accurate diagnosis"), "General");
        assert_eq!(taxonomy.categorize("A billion thanks"), "General");
        assert_eq!(taxonomy.categorize("The AC was broken"), "Facilities");
        assert_eq!(taxonomy.categorize("Our care staff were lovely"), "Nursing Care");
    }

    #[test]
    fn test_custom_taxonomy() {
        let taxonomy = Taxonomy::new([("Parking", &["parking", "car park"][..])]).unwrap();
        assert_eq!(taxonomy.categorize("No parking spots"), "Parking");
        assert_eq!(taxonomy.categorize("The nurse was kind"), "General");
        assert_eq!(taxonomy.categories().collect::<Vec<_>>(), vec!["Parking"]);
    }

    #[test]
    fn test_empty_keywords_rejected() {
        let result = Taxonomy::new([("Empty", &[][..])]);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
