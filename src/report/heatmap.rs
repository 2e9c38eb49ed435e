//! Heat-map styling of rating cells
//!
//! Ratings are matched by substring against an ordered rule list; the first
//! rule that matches wins, so the "very" variants must precede their base
//! terms.

use super::markup::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rating {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl Rating {
    pub fn css_class(self) -> &'static str {
        match self {
            Rating::VeryHigh => "rating-very-high",
            Rating::High => "rating-high",
            Rating::Medium => "rating-medium",
            Rating::Low => "rating-low",
            Rating::VeryLow => "rating-very-low",
        }
    }
}

/// (pattern, rating), evaluated top to bottom
pub const RATING_RULES: &[(&str, Rating)] = &[
    ("very high", Rating::VeryHigh),
    ("high", Rating::High),
    ("medium", Rating::Medium),
    ("very low", Rating::VeryLow),
    ("low", Rating::Low),
];

pub fn classify(text: &str) -> Option<Rating> {
    let text = text.trim().to_lowercase();
    RATING_RULES
        .iter()
        .find(|(pattern, _)| text.contains(pattern))
        .map(|(_, rating)| *rating)
}

/// Tag the second cell of every body row in the first table
pub fn apply(document: &mut Document) {
    let Some(table) = document.first_table_mut() else {
        return;
    };

    for row in table.rows.iter_mut() {
        if row.len() < 2 {
            continue;
        }
        let cell = &mut row[1];
        cell.rating = classify(&cell.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::markup::convert;

    #[test]
    fn test_very_variants_take_priority() {
        assert_eq!(classify("Very Low Impact"), Some(Rating::VeryLow));
        assert_eq!(classify("Very High"), Some(Rating::VeryHigh));
        assert_eq!(classify("very high (95%)"), Some(Rating::VeryHigh));
    }

    #[test]
    fn test_base_terms() {
        assert_eq!(classify("High"), Some(Rating::High));
        assert_eq!(classify("  MEDIUM (60%) "), Some(Rating::Medium));
        assert_eq!(classify("Low"), Some(Rating::Low));
        assert_eq!(classify("N/A"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(Rating::VeryLow.css_class(), "rating-very-low");
        assert_eq!(Rating::VeryHigh.css_class(), "rating-very-high");
        assert_eq!(Rating::Medium.css_class(), "rating-medium");
    }

    #[test]
    fn test_apply_only_touches_second_column_of_first_table() {
        let md = "| Category | Rating |\n|---|---|\n| High Risk | Very Low Impact |\n| Solo |\n\n\
                  | Other | Rating |\n|---|---|\n| x | High |\n";
        let mut doc = convert(md).unwrap();
        apply(&mut doc);

        let first = doc.first_table().unwrap();
        assert_eq!(first.header[1].rating, None);
        assert_eq!(first.rows[0][0].rating, None);
        assert_eq!(first.rows[0][1].rating, Some(Rating::VeryLow));

        let second = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                crate::report::Block::Table(t) => Some(t),
                _ => None,
            })
            .nth(1)
            .unwrap();
        assert_eq!(second.rows[0][1].rating, None);
    }

    #[test]
    fn test_unmatched_cell_is_left_unstyled() {
        let mut doc = convert("| A | B |\n|---|---|\n| x | pending |\n").unwrap();
        apply(&mut doc);
        assert_eq!(doc.first_table().unwrap().rows[0][1].rating, None);
    }
}
