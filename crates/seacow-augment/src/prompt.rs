//! Merge retrieved data and answer-format rules into the system message.

use seacow_chat::{ChatMessage, Role};

use crate::search::SearchResult;
use crate::statistics::StatisticsHit;

const INSIGHTS_RULE: &str = "End every answer with a section titled \"Insights\" \
containing 2-4 bullets that start with \"•\".";

const STATISTICS_RULES: &str = "Answer using the official figures above. \
Write every number in **bold**. Use \"•\" as the only bullet glyph, never \"-\" or \"*\". \
Keep the main answer to a single paragraph and name the data source.";

const SEARCH_RULES: &str = "Answer using only the search results above and cite the URLs you rely on. \
Do not state any number, percentage, date or statistic that does not appear literally in the results; \
never estimate, extrapolate or invent figures. \
If the user asks for a time series or historical trend that the results do not contain, reply exactly: \
\"I don't have verified time-series data for that; please check the official source linked above.\" \
Write every number in **bold**. Use \"•\" as the only bullet glyph, never \"-\" or \"*\". \
Keep the main answer to a single paragraph.";

/// What was retrieved for the latest question.
#[derive(Debug, Clone, PartialEq)]
pub enum Augmentation {
    Statistics(StatisticsHit),
    Search(Vec<SearchResult>),
    /// Nothing found; only the Insights reminder is added.
    Reminder,
}

impl Augmentation {
    /// Whether live external data made it into the prompt.
    pub fn uses_external_data(&self) -> bool {
        match self {
            Augmentation::Statistics(_) => true,
            Augmentation::Search(results) => !results.is_empty(),
            Augmentation::Reminder => false,
        }
    }

    /// Instruction text to merge into the system message.
    pub fn instruction_text(&self) -> String {
        match self {
            Augmentation::Statistics(hit) => {
                let block = serde_json::to_string_pretty(&hit.to_prompt_json())
                    .unwrap_or_else(|_| hit.record.to_string());
                format!(
                    "Official statistics for {} ({}, source: {}):\n```json\n{}\n```\n\n{}\n\n{}",
                    hit.place,
                    hit.year,
                    hit.source.label(),
                    block,
                    STATISTICS_RULES,
                    INSIGHTS_RULE
                )
            }
            Augmentation::Search(results) if !results.is_empty() => {
                let listing = results
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        format!("{}. {}\n   URL: {}\n   {}", i + 1, r.title, r.url, r.description)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "Live web search results:\n{}\n\n{}\n\n{}",
                    listing, SEARCH_RULES, INSIGHTS_RULE
                )
            }
            Augmentation::Search(_) | Augmentation::Reminder => INSIGHTS_RULE.to_string(),
        }
    }
}

/// Append `text` to the system message, or insert one at the head.
///
/// Afterwards exactly one system message exists: any later system messages
/// are folded into the first, in order. Other messages keep their order.
pub fn inject_system(messages: &mut Vec<ChatMessage>, text: &str) {
    let Some(first) = messages.iter().position(|m| m.role == Role::System) else {
        messages.insert(0, ChatMessage::system(text));
        return;
    };

    let mut extra = Vec::new();
    let mut idx = first + 1;
    while idx < messages.len() {
        if messages[idx].role == Role::System {
            extra.push(messages.remove(idx).content);
        } else {
            idx += 1;
        }
    }

    let system = &mut messages[first].content;
    for content in extra {
        system.push_str("\n\n");
        system.push_str(&content);
    }
    if !system.is_empty() {
        system.push_str("\n\n");
    }
    system.push_str(text);
}

/// Apply an augmentation. Returns whether external data was used.
pub fn augment(messages: &mut Vec<ChatMessage>, augmentation: &Augmentation) -> bool {
    inject_system(messages, &augmentation.instruction_text());
    augmentation.uses_external_data()
}
