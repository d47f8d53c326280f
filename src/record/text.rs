use anyhow::{Context, Result};
use regex::Regex;

use super::keys::decode_key;

/// Cleans section text for reading: decodes it, flattens whitespace and drops the empty brackets and
/// doubled punctuation left behind by unparsed templates.
pub struct TextCleaner {
    spaces: Regex,
    empty_parens: Regex,
    empty_brackets: Regex,
    empty_braces: Regex,
    double_commas: Regex,
    double_periods: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            spaces: Regex::new(r" +").context("failed to compile space-run regex")?,
            empty_parens: Regex::new(r"\(\s*\)").context("failed to compile empty-parens regex")?,
            empty_brackets: Regex::new(r"\[\s*\]")
                .context("failed to compile empty-brackets regex")?,
            empty_braces: Regex::new(r"\{\s*\}").context("failed to compile empty-braces regex")?,
            double_commas: Regex::new(r",\s*,").context("failed to compile double-comma regex")?,
            double_periods: Regex::new(r"\.\s*\.")
                .context("failed to compile double-period regex")?,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        let text = decode_key(text).replace('\n', " ");
        let text = self.spaces.replace_all(&text, " ");
        let text = text.trim().replace("\\`", "`").replace("\\'", "'");

        let text = self.empty_parens.replace_all(&text, "");
        let text = self.empty_brackets.replace_all(&text, "");
        let text = self.empty_braces.replace_all(&text, "");
        let text = self.double_commas.replace_all(&text, ",");
        let text = self.double_periods.replace_all(&text, ".");

        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_whitespace() {
        let cleaner = TextCleaner::new().unwrap();
        assert_eq!(cleaner.clean("  A dog\nis   a  mammal.  "), "A dog is a mammal.");
    }

    #[test]
    fn drops_empty_brackets_and_doubled_punctuation() {
        let cleaner = TextCleaner::new().unwrap();
        assert_eq!(cleaner.clean("Paris ()is big"), "Paris is big");
        assert_eq!(cleaner.clean("x[ ]y{}z"), "xyz");
        assert_eq!(cleaner.clean("one, , two. . end"), "one, two. end");
    }

    #[test]
    fn unescapes_quotes_and_store_sequences() {
        let cleaner = TextCleaner::new().unwrap();
        assert_eq!(cleaner.clean("it\\'s \\`ok\\`"), "it's `ok`");
        assert_eq!(cleaner.clean("cost \\u0024 5 &amp; up"), "cost $ 5 & up");
    }
}
