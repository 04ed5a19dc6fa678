//! Reading time estimation

use super::{ContentBlock, SpanKind};

/// Default reading speed in words per minute
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimates how many minutes a post takes to read.
///
/// Words are counted by splitting on single spaces, so an empty heading
/// still counts as one word. There is no minimum: a post without content
/// reads in 0 minutes.
#[derive(Debug, Clone, Copy)]
pub struct ReadingTimeEstimator {
    words_per_minute: usize,
}

impl ReadingTimeEstimator {
    pub fn new(words_per_minute: usize) -> Self {
        Self {
            words_per_minute: words_per_minute.max(1),
        }
    }

    /// Whole minutes, rounded up
    pub fn estimate(&self, content: &[ContentBlock]) -> usize {
        word_count(content).div_ceil(self.words_per_minute)
    }
}

impl Default for ReadingTimeEstimator {
    fn default() -> Self {
        Self::new(WORDS_PER_MINUTE)
    }
}

/// Heading words plus the words of every text-bearing body span
pub fn word_count(content: &[ContentBlock]) -> usize {
    content
        .iter()
        .map(|block| {
            let body: usize = block
                .body
                .iter()
                .filter(|span| !matches!(span.kind, SpanKind::Image | SpanKind::Embed))
                .map(|span| span.text.split(' ').count())
                .sum();
            block.heading.split(' ').count() + body
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RichTextSpan;

    fn block(heading: &str, texts: &[&str]) -> ContentBlock {
        ContentBlock {
            heading: heading.to_string(),
            body: texts.iter().map(|t| RichTextSpan::paragraph(*t)).collect(),
        }
    }

    #[test]
    fn test_empty_content_is_zero_minutes() {
        assert_eq!(ReadingTimeEstimator::default().estimate(&[]), 0);
    }

    #[test]
    fn test_heading_and_body_words() {
        let content = vec![block("Intro", &["one two three"])];
        assert_eq!(word_count(&content), 4);
        assert_eq!(ReadingTimeEstimator::default().estimate(&content), 1);
    }

    #[test]
    fn test_rounds_up() {
        let words = vec!["word"; 200].join(" ");
        // 1 heading word + 200 body words
        let content = vec![block("Heading", &[words.as_str()])];
        assert_eq!(ReadingTimeEstimator::default().estimate(&content), 2);
        assert_eq!(ReadingTimeEstimator::new(201).estimate(&content), 1);
    }

    #[test]
    fn test_split_on_single_spaces() {
        // Consecutive spaces produce empty segments which still count
        let content = vec![block("a  b", &[""])];
        assert_eq!(word_count(&content), 4);
    }

    #[test]
    fn test_media_spans_are_not_counted() {
        let mut content = vec![block("Intro", &["one two"])];
        content[0].body.push(RichTextSpan {
            kind: SpanKind::Image,
            url: Some("https://example.com/a.png".into()),
            ..Default::default()
        });
        assert_eq!(word_count(&content), 3);
    }

    #[test]
    fn test_monotonic_in_word_count() {
        let estimator = ReadingTimeEstimator::default();
        let mut previous = 0;
        for n in [0usize, 1, 199, 200, 201, 399, 400, 401, 1000] {
            let text = vec!["w"; n].join(" ");
            let minutes = estimator.estimate(&[block("", &[text.as_str()])]);
            assert!(minutes >= previous);
            previous = minutes;
        }
    }
}
