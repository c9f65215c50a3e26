use marquee_core::dataset::Table;
use marquee_core::domain::{Category, DraftAnswer, Evidence, EvidenceValue, Query};
use marquee_core::errors::PipelineError;

use crate::handlers::CategoryHandler;
use crate::text::{normalize_text, tokenize};

struct FaqEntry {
    topic: &'static str,
    question: &'static str,
    answer: &'static str,
    tips: &'static [&'static str],
    related: &'static [&'static str],
}

const FAQ: &[FaqEntry] = &[
    FaqEntry {
        topic: "subscription",
        question: "What subscription plans are available and how much do they cost?",
        answer: "There are three plans: Basic with ads at $6.99 per month, Standard at $15.49 per \
                 month and Premium at $22.99 per month. Plans differ in video quality and in how \
                 many screens can stream at once.",
        tips: &["You can change plans at any time from the account page.", "Prices vary by region."],
        related: &["billing", "plan", "price", "pricing"],
    },
    FaqEntry {
        topic: "content",
        question: "How often is new content added to the catalog?",
        answer: "New movies and series are added every week, with the largest releases usually \
                 arriving on Fridays. Licensed titles can also leave the catalog when agreements end.",
        tips: &["The New & Popular row lists upcoming releases.", "Use Remind Me to get notified."],
        related: &["originals", "release", "new"],
    },
    FaqEntry {
        topic: "download",
        question: "Can I download titles to watch offline?",
        answer: "Most titles can be downloaded on the mobile and tablet apps. Standard allows \
                 downloads on two devices and Premium on six; the ad-supported plan has limited \
                 download support.",
        tips: &[
            "Downloads expire after a period that depends on the title.",
            "Smart Downloads swaps watched episodes for the next ones.",
        ],
        related: &["offline", "device", "storage"],
    },
    FaqEntry {
        topic: "sharing",
        question: "Can I share my account with people outside my household?",
        answer: "An account is meant for one household. Members outside it can be added as extra \
                 members on Standard and Premium plans for an additional monthly fee.",
        tips: &[
            "Profiles keep viewing history separate.",
            "Transfer Profile moves a profile to a new account.",
        ],
        related: &["household", "profile", "account"],
    },
    FaqEntry {
        topic: "quality",
        question: "What video quality do I get?",
        answer: "Basic streams in 720p HD, Standard in 1080p Full HD and Premium in 4K Ultra HD \
                 with HDR where available. Actual quality depends on your connection speed.",
        tips: &["4K needs about 15 Mbps.", "Data usage settings can cap quality on mobile."],
        related: &["resolution", "streaming", "hd", "4k"],
    },
    FaqEntry {
        topic: "originals",
        question: "What are the service's original productions?",
        answer: "Originals are series, films and documentaries produced or licensed exclusively \
                 for the service, from scripted dramas to stand-up specials and international \
                 productions.",
        tips: &["Originals stay in the catalog long term."],
        related: &["content", "exclusive", "series"],
    },
    FaqEntry {
        topic: "cancel",
        question: "How do I cancel my membership?",
        answer: "You can cancel at any time from the account page. Streaming continues until the \
                 end of the current billing period and there are no cancellation fees.",
        tips: &["Viewing history and profiles are kept for ten months after cancelling."],
        related: &["subscription", "billing", "account"],
    },
    FaqEntry {
        topic: "parental_controls",
        question: "How do I set up parental controls?",
        answer: "Create a Kids profile or set a maturity rating per profile from the account \
                 page. A profile lock PIN stops children from switching to other profiles, and \
                 individual titles can be blocked.",
        tips: &["Viewing activity per profile shows what was watched."],
        related: &["kids", "children", "maturity", "profile", "parental"],
    },
    FaqEntry {
        topic: "technical_support",
        question: "What should I do if streaming is not working?",
        answer: "Restart the app and your device, check your internet connection and make sure \
                 the app is up to date. If the problem persists, sign out and back in or contact \
                 the help center.",
        tips: &["The help center lists known service issues.", "Error codes point to specific fixes."],
        related: &["error", "buffering", "playback", "app", "device"],
    },
];

const GENERAL_HELP: &str = "I can help with plans and pricing, downloads, account sharing, \
                            video quality, cancelling, parental controls and technical problems. \
                            Ask about any of these topics for details.";

/// FAQ lookup for plans, accounts and playback questions.
#[derive(Clone, Copy, Debug, Default)]
pub struct SupportHandler;

/// Topic key in the text scores 10, each related topic 5, each question word shared 2.
fn score(entry: &FaqEntry, normalized: &str) -> u64 {
    let topic_words = entry.topic.replace('_', " ");
    let mut score = 0;
    if normalized.contains(&format!(" {topic_words}")) {
        score += 10;
    }
    let related_hits =
        entry.related.iter().filter(|topic| normalized.contains(&format!(" {topic}"))).count();
    score += 5 * related_hits as u64;

    let question = normalize_text(entry.question);
    let question_words = tokenize(&question);
    score += 2 * tokenize(normalized)
        .iter()
        .filter(|word| word.len() > 3 && question_words.contains(word))
        .count() as u64;
    score
}

fn best_entry(normalized: &str) -> Option<(&'static FaqEntry, u64)> {
    let mut best: Option<(&'static FaqEntry, u64)> = None;
    for entry in FAQ {
        let entry_score = score(entry, normalized);
        if entry_score > 0 && best.map_or(true, |(_, best_score)| entry_score > best_score) {
            best = Some((entry, entry_score));
        }
    }
    best
}

impl CategoryHandler for SupportHandler {
    fn category(&self) -> Category {
        Category::Support
    }

    fn handle(&self, query: &Query, table: &Table) -> Result<DraftAnswer, PipelineError> {
        let normalized = normalize_text(query.text());
        let catalog_size = EvidenceValue::Count(table.len() as u64);

        let Some((entry, match_score)) = best_entry(&normalized) else {
            let evidence = Evidence::new()
                .with("faq_topic", EvidenceValue::Text("general_support".to_owned()))
                .with(
                    "related_topics",
                    EvidenceValue::List(FAQ.iter().map(|entry| entry.topic.to_owned()).collect()),
                )
                .with("catalog_size", catalog_size);
            return Ok(DraftAnswer::new(Category::Support, GENERAL_HELP, evidence));
        };

        let mut text = entry.answer.to_owned();
        for tip in entry.tips {
            text.push(' ');
            text.push_str(tip);
        }

        let evidence = Evidence::new()
            .with("faq_topic", EvidenceValue::Text(entry.topic.to_owned()))
            .with("match_score", EvidenceValue::Count(match_score))
            .with(
                "related_topics",
                EvidenceValue::List(entry.related.iter().map(|topic| (*topic).to_owned()).collect()),
            )
            .with("catalog_size", catalog_size);
        Ok(DraftAnswer::new(Category::Support, text, evidence))
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::domain::EvidenceValue;

    use super::SupportHandler;
    use crate::handlers::test_support::{query, sample};
    use crate::handlers::CategoryHandler;

    fn topic_for(text: &str) -> String {
        let draft = SupportHandler.handle(&query(text), &sample()).expect("support never fails");
        match draft.evidence.get("faq_topic") {
            Some(EvidenceValue::Text(topic)) => topic.clone(),
            other => panic!("unexpected faq_topic {other:?}"),
        }
    }

    #[test]
    fn faq_topic_cases() {
        struct Case {
            text: &'static str,
            topic: &'static str,
        }

        let cases = vec![
            Case { text: "How do I cancel my subscription?", topic: "cancel" },
            Case { text: "What plans do you offer and what is the price?", topic: "subscription" },
            Case { text: "Can I download episodes for offline viewing?", topic: "download" },
            Case { text: "How do I set up parental controls for my children?", topic: "parental_controls" },
            Case { text: "The app keeps buffering, help", topic: "technical_support" },
            Case { text: "Can I share my account with my household?", topic: "sharing" },
        ];

        for case in cases {
            assert_eq!(topic_for(case.text), case.topic, "{}", case.text);
        }
    }

    #[test]
    fn unmatched_question_gets_general_support() {
        assert_eq!(topic_for("hello there"), "general_support");
    }

    #[test]
    fn support_answers_carry_catalog_size() {
        let draft = SupportHandler.handle(&query("help with billing"), &sample()).expect("draft");
        assert_eq!(draft.evidence.count("catalog_size"), Some(200));
    }
}
