//! Formatting and truncation pipeline for tool responses.
//!
//! Every payload is rendered either as Markdown for humans or as pretty JSON,
//! then bounded by [`truncate_if_needed`] to [`CHARACTER_LIMIT`] characters.

use auto_store::PaginatedResponse;
use chrono::{DateTime, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod detail;
mod items;
mod search;

pub use detail::format_application_detail;
pub use items::{
    format_application_item,
    format_domain_item,
    format_healthcheck_item,
    format_infrastructure_item,
    format_network_share_item,
    format_person_item,
    format_service_item,
};
pub use search::format_search_results;

/// Maximum characters returned in a single response.
pub const CHARACTER_LIMIT: usize = 25_000;

const CLEAN_CUT_THRESHOLD: usize = CHARACTER_LIMIT * 9 / 10;
const EMPTY_STATE: &str = "*No results found*";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub content: String,
    pub truncated: bool,
}

#[must_use]
pub fn truncation_suffix(has_metadata: bool) -> String {
    if has_metadata {
        format!(
            "\n\n[TRUNCATED: Content exceeded {CHARACTER_LIMIT} characters. Use pagination or filters to see more results.]"
        )
    } else {
        format!("\n\n[TRUNCATED: Content exceeded {CHARACTER_LIMIT} characters.]")
    }
}

/// Bounds `content` to [`CHARACTER_LIMIT`] characters.
///
/// Oversized content is cut at the limit, or at the last newline before it
/// when that newline keeps more than 90% of the budget. A suffix naming the
/// limit is appended; `has_metadata` selects the wording that points at
/// pagination and filters.
#[must_use]
pub fn truncate_if_needed(content: &str, has_metadata: bool) -> Truncated {
    let Some((limit_byte, _)) = content.char_indices().nth(CHARACTER_LIMIT) else {
        return Truncated {
            content: content.to_string(),
            truncated: false,
        };
    };

    let head = &content[..limit_byte];
    let cut = head
        .rfind('\n')
        .filter(|newline| head[..*newline].chars().count() > CLEAN_CUT_THRESHOLD)
        .unwrap_or(limit_byte);

    let mut truncated = String::with_capacity(cut + 128);
    truncated.push_str(&content[..cut]);
    truncated.push_str(&truncation_suffix(has_metadata));
    Truncated {
        content: truncated,
        truncated: true,
    }
}

/// Renders one page of results.
///
/// # Errors
/// Returns the serializer error when `format` is JSON and a row cannot be
/// serialized.
pub fn format_list<T: Serialize>(
    response: &PaginatedResponse<T>,
    item_formatter: impl Fn(&T) -> String,
    format: ResponseFormat,
) -> serde_json::Result<String> {
    if format == ResponseFormat::Json {
        return serde_json::to_string_pretty(response);
    }

    let mut lines = vec![
        format!("# Results (Page {} of {})", response.page, response.total_pages),
        String::new(),
        format!(
            "**Total:** {} items | **Showing:** {} items",
            response.total,
            response.data.len()
        ),
        String::new(),
    ];

    if response.data.is_empty() {
        lines.push(EMPTY_STATE.to_string());
    } else {
        let rendered: Vec<String> = response.data.iter().map(item_formatter).collect();
        lines.push(rendered.join("\n\n"));
    }

    if response.page < response.total_pages {
        lines.push(String::new());
        lines.push(format!("*Use page={} to see the next page*", response.page + 1));
    }

    Ok(lines.join("\n"))
}

/// Human-readable timestamp, e.g. `Mar 4, 2025, 09:15 AM`. Values that are not
/// RFC 3339 or `YYYY-MM-DD HH:MM:SS` are echoed unchanged.
#[must_use]
pub fn format_date(value: &str) -> String {
    const DISPLAY: &str = "%b %-d, %Y, %I:%M %p";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.naive_utc().format(DISPLAY).to_string();
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .into_iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(value, pattern).ok())
        .map_or_else(|| value.to_string(), |parsed| parsed.format(DISPLAY).to_string())
}

/// First `max` characters of `text`.
pub(crate) fn preview(text: &str, max: usize) -> &str {
    text.char_indices().nth(max).map_or(text, |(end, _)| &text[..end])
}

#[cfg(test)]
mod tests {
    use auto_store::{EntityListItem, PageRequest};

    use super::*;

    fn names(count: u8) -> Vec<EntityListItem> {
        (0..count)
            .map(|index| EntityListItem {
                id: (index + 1).to_string(),
                name: char::from(b'A' + index).to_string(),
                environment: None,
            })
            .collect()
    }

    #[test]
    fn short_content_is_untouched() {
        let result = truncate_if_needed("hello\nworld", true);
        assert_eq!(result.content, "hello\nworld");
        assert!(!result.truncated);

        let exact = "x".repeat(CHARACTER_LIMIT);
        let result = truncate_if_needed(&exact, false);
        assert_eq!(result.content, exact);
        assert!(!result.truncated);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let content = "é".repeat(CHARACTER_LIMIT + 10);
        let result = truncate_if_needed(&content, false);
        assert!(result.truncated);
        let suffix = truncation_suffix(false);
        let body = result.content.strip_suffix(&suffix).expect("suffix present");
        assert_eq!(body.chars().count(), CHARACTER_LIMIT);
    }

    #[test]
    fn list_markdown_shows_next_page_hint() {
        let page = PaginatedResponse::paginate(names(5), &PageRequest::new(1, 2));
        let markdown =
            format_list(&page, |item| format!("## {}", item.name), ResponseFormat::Markdown)
                .expect("markdown");
        assert_eq!(
            markdown,
            "# Results (Page 1 of 3)\n\n**Total:** 5 items | **Showing:** 2 items\n\n## A\n\n## B\n\n*Use page=2 to see the next page*"
        );
    }

    #[test]
    fn last_page_has_no_hint() {
        let page = PaginatedResponse::paginate(names(5), &PageRequest::new(3, 2));
        let markdown =
            format_list(&page, |item| item.name.clone(), ResponseFormat::Markdown).expect("markdown");
        assert!(markdown.starts_with("# Results (Page 3 of 3)"));
        assert!(!markdown.contains("to see the next page"));
    }

    #[test]
    fn json_list_is_pretty_payload() {
        let page = PaginatedResponse::paginate(names(1), &PageRequest::default());
        let json = format_list(&page, |_| String::new(), ResponseFormat::Json).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed["total"], 1);
        assert_eq!(parsed["data"][0]["name"], "A");
        assert!(json.contains("\n  \"data\""));
    }

    #[test]
    fn dates_render_in_short_form() {
        assert_eq!(format_date("2025-03-04T09:15:00Z"), "Mar 4, 2025, 09:15 AM");
        assert_eq!(format_date("2024-12-31 18:05:00"), "Dec 31, 2024, 06:05 PM");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn preview_stops_at_character_count() {
        assert_eq!(preview("abcdef", 3), "abc");
        assert_eq!(preview("ab", 3), "ab");
    }
}
