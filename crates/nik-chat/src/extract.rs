//! Turns raw model output into a short, clean reply.

use nik_core::config::ExtractorConfig;
use nik_core::text::{collapse_whitespace, has_terminal_punctuation, split_sentences};

/// Post-processes generated text.
///
/// Extraction is idempotent, and a non-empty input always yields a reply
/// ending in terminal punctuation.
#[derive(Debug, Clone)]
pub struct ResponseExtractor {
    bot_markers: [String; 2],
    max_sentences: usize,
    max_words: usize,
    empty_reply: String,
}

impl ResponseExtractor {
    pub fn new(config: &ExtractorConfig, bot_name: &str) -> Self {
        Self {
            bot_markers: [format!("{bot_name}:"), format!("{bot_name} :")],
            max_sentences: config.max_sentences,
            max_words: config.max_words,
            empty_reply: config.empty_reply.clone(),
        }
    }

    pub fn extract(&self, raw: &str, user_name: Option<&str>) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        // Markers are matched on collapsed text so "N.I.K\n:" and "N.I.K :" agree.
        let text = collapse_whitespace(raw);
        let reply = self.after_last_bot_marker(&text);
        let reply = truncate_at_user_marker(reply, user_name).trim();

        let sentences = split_sentences(reply);
        let mut reply = sentences
            .into_iter()
            .take(self.max_sentences)
            .collect::<Vec<_>>()
            .join(" ");

        let words: Vec<&str> = reply.split_whitespace().collect();
        if words.len() > self.max_words {
            reply = words[..self.max_words]
                .join(" ")
                .trim_end_matches([',', ';', ':', '-'])
                .trim_end()
                .to_string();
        }

        if reply.is_empty() {
            return self.empty_reply.clone();
        }
        if !has_terminal_punctuation(&reply) {
            reply.push('.');
        }
        reply
    }

    fn after_last_bot_marker<'a>(&self, raw: &'a str) -> &'a str {
        self.bot_markers
            .iter()
            .filter_map(|m| raw.rfind(m.as_str()).map(|at| at + m.len()))
            .max()
            .map_or(raw, |end| &raw[end..])
    }
}

fn truncate_at_user_marker<'a>(text: &'a str, user_name: Option<&str>) -> &'a str {
    let named = user_name
        .map(collapse_whitespace)
        .filter(|n| !n.is_empty())
        .and_then(|n| text.find(&format!("{n}:")));
    let generic = text.find("User:");
    match named.into_iter().chain(generic).min() {
        Some(cut) => &text[..cut],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ResponseExtractor {
        ResponseExtractor::new(&ExtractorConfig::default(), "N.I.K")
    }

    #[test]
    fn test_takes_text_after_last_bot_marker() {
        let raw = "Prompt text\nUser: hi\nN.I.K: Hello.\nUser: sup\nN.I.K: Not much, you?";
        assert_eq!(extractor().extract(raw, None), "Not much, you?");
    }

    #[test]
    fn test_spaced_bot_marker() {
        assert_eq!(extractor().extract("N.I.K : hey there", None), "hey there.");
    }

    #[test]
    fn test_truncates_at_user_marker() {
        let raw = "N.I.K: Sure thing. Sam: and then? User: more";
        assert_eq!(extractor().extract(raw, Some("Sam")), "Sure thing.");
        assert_eq!(extractor().extract(raw, None), "Sure thing. Sam: and then?");
    }

    #[test]
    fn test_keeps_three_sentences() {
        let raw = "N.I.K: One. Two! Three? Four. Five.";
        assert_eq!(extractor().extract(raw, None), "One. Two! Three?");
    }

    #[test]
    fn test_collapses_whitespace() {
        let raw = "N.I.K:   Hey\n\nthere   friend";
        assert_eq!(extractor().extract(raw, None), "Hey there friend.");
    }

    #[test]
    fn test_caps_words_and_strips_trailing_separators() {
        let mut words: Vec<String> = (0..59).map(|i| format!("w{i}")).collect();
        words.push("end,".to_string());
        words.push("extra".to_string());
        let raw = format!("N.I.K: {}", words.join(" "));
        let out = extractor().extract(&raw, None);
        assert_eq!(out.split_whitespace().count(), 60);
        assert!(out.ends_with("w58 end."));
    }

    #[test]
    fn test_empty_handling() {
        let e = extractor();
        assert_eq!(e.extract("", None), "");
        assert_eq!(e.extract("   \n ", None), "");
        assert_eq!(e.extract("prompt\nN.I.K:", None), "Hmm.");
        assert_eq!(e.extract("N.I.K: User: hello", None), "Hmm.");
    }

    #[test]
    fn test_idempotent() {
        let e = extractor();
        let inputs = [
            "N.I.K: One. Two! Three? Four.",
            "no marker at all",
            "N.I.K: trailing dash -",
            "N.I.K:",
            "Hmm.",
            "N.I.K: Wait... really?   Yes",
            "N.I.K  : hey there",
            "N.I.K\n: hey there",
            "N.I.K \n\t : one. N.I.K  :two",
            "N.I.K: fine. Sam  : next",
            "N.I.K: fine. Sam\n: next",
            "N.I.K: ok User \n: more",
            "  \n N.I.K:\n\n  spaced   out \n",
        ];
        for raw in inputs {
            for name in [None, Some("Sam"), Some("Sam  Lee")] {
                let once = e.extract(raw, name);
                assert_eq!(e.extract(&once, name), once, "input: {raw:?}, name: {name:?}");
                assert!(has_terminal_punctuation(&once), "input: {raw:?}");
            }
        }
    }

    #[test]
    fn test_markers_split_by_whitespace_still_match() {
        let e = extractor();
        assert_eq!(e.extract("N.I.K  : hey there", None), "hey there.");
        assert_eq!(e.extract("N.I.K\n: hey there", None), "hey there.");
        assert_eq!(e.extract("N.I.K: hi.\n\nSam: yo", Some("Sam")), "hi.");
        assert_eq!(e.extract("N.I.K: hi. Sam Lee: yo", Some("Sam  Lee")), "hi.");
    }
}
