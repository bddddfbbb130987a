use serde::{Deserialize, Serialize};

/// One block of a company summary. The first word of `heading` is its icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub heading: String,
    pub text: String,
}

impl SummaryItem {
    pub fn new(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
        }
    }

    /// `(icon, title)`; a single-word heading is all icon.
    pub fn split_heading(&self) -> (&str, &str) {
        let heading = self.heading.trim();
        match heading.split_once(char::is_whitespace) {
            Some((icon, title)) => (icon, title.trim_start()),
            None => (heading, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_word_is_the_icon() {
        let item = SummaryItem::new("🏢 Company Overview", "x");
        assert_eq!(item.split_heading(), ("🏢", "Company Overview"));

        let item = SummaryItem::new("  💰   Pricing  ", "x");
        assert_eq!(item.split_heading(), ("💰", "Pricing"));

        let item = SummaryItem::new("Overview", "x");
        assert_eq!(item.split_heading(), ("Overview", ""));
    }

    #[test]
    fn deserializes_from_a_json_array() {
        let items: Vec<SummaryItem> = serde_json::from_str(
            r#"[{"heading":"🎯 Mission","text":"Make anvils."},{"heading":"👥 Team","text":"Coyotes."}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].split_heading().1, "Team");
    }
}
