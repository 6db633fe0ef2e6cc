use auto_core::format::{
    CHARACTER_LIMIT,
    ResponseFormat,
    format_application_item,
    format_list,
    truncate_if_needed,
    truncation_suffix,
};
use auto_store::{Application, PageRequest, PaginatedResponse};
use rstest::rstest;

fn application(id: usize, name: &str) -> Application {
    Application {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        repository_url: None,
        environment: "prd".to_string(),
        url: None,
        status: "active".to_string(),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
        created_by: None,
    }
}

fn string_with_newline_at(position: usize, len: usize) -> String {
    let mut content = "a".repeat(len);
    content.replace_range(position..=position, "\n");
    content
}

#[rstest]
#[case(0)]
#[case(CHARACTER_LIMIT - 1)]
#[case(CHARACTER_LIMIT)]
#[case(CHARACTER_LIMIT + 1)]
#[case(CHARACTER_LIMIT * 4)]
fn truncation_is_bounded(#[case] len: usize) {
    let content = "line of text\n".repeat(len / 13 + 1)[..len].to_string();
    let longest_suffix = truncation_suffix(true).chars().count();

    for has_metadata in [false, true] {
        let result = truncate_if_needed(&content, has_metadata);
        assert!(result.content.chars().count() <= CHARACTER_LIMIT + longest_suffix);
        if len <= CHARACTER_LIMIT {
            assert_eq!(result.content, content);
            assert!(!result.truncated);
        } else {
            assert!(result.truncated);
            assert!(result.content.ends_with(&truncation_suffix(has_metadata)));
        }
    }
}

#[test]
fn truncation_prefers_late_newline() {
    let content = string_with_newline_at(24_500, 30_000);
    let result = truncate_if_needed(&content, false);
    let body = result
        .content
        .strip_suffix(&truncation_suffix(false))
        .expect("suffix");
    assert_eq!(body.len(), 24_500);
    assert!(!body.contains('\n'));
}

#[test]
fn truncation_hard_cuts_when_newline_is_early() {
    let content = string_with_newline_at(20_000, 30_000);
    let result = truncate_if_needed(&content, true);
    let body = result
        .content
        .strip_suffix(&truncation_suffix(true))
        .expect("suffix");
    assert_eq!(body.len(), CHARACTER_LIMIT);
    assert!(result.content.ends_with("Use pagination or filters to see more results.]"));
}

#[test]
fn empty_page_shows_empty_state() {
    let page: PaginatedResponse<Application> =
        PaginatedResponse::paginate(Vec::new(), &PageRequest::default());
    assert_eq!(page.total_pages, 0);

    let markdown =
        format_list(&page, format_application_item, ResponseFormat::Markdown).expect("markdown");
    assert!(markdown.contains("*No results found*"));
    assert!(!markdown.contains("next page"));
}

#[test]
fn second_page_of_five_applications() {
    let apps: Vec<Application> = ["A", "B", "C", "D", "E"]
        .iter()
        .enumerate()
        .map(|(index, name)| application(index + 1, name))
        .collect();
    let page = PaginatedResponse::paginate(apps, &PageRequest::new(2, 2));

    let names: Vec<&str> = page.data.iter().map(|app| app.name.as_str()).collect();
    assert_eq!(names, ["C", "D"]);
    assert_eq!((page.total, page.page, page.per_page, page.total_pages), (5, 2, 2, 3));

    let markdown =
        format_list(&page, format_application_item, ResponseFormat::Markdown).expect("markdown");
    assert!(markdown.contains("Page 2 of 3"));
    assert!(markdown.contains("**Total:** 5 items | **Showing:** 2 items"));
    assert!(markdown.contains("## C (3)"));
    assert!(markdown.ends_with("*Use page=3 to see the next page*"));
}
