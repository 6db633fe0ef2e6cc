use auto_store::SearchResults;

use super::{EMPTY_STATE, preview};

const DESCRIPTION_PREVIEW_CHARS: usize = 100;

fn group<T>(lines: &mut Vec<String>, title: &str, items: &[T], render: impl Fn(&T) -> Vec<String>) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("## {title} ({})", items.len()));
    lines.extend(items.iter().flat_map(render));
    lines.push(String::new());
}

fn described(headline: String, description: Option<&str>) -> Vec<String> {
    let mut lines = vec![headline];
    if let Some(text) = description.filter(|text| !text.is_empty()) {
        lines.push(format!("  {}", preview(text, DESCRIPTION_PREVIEW_CHARS)));
    }
    lines
}

/// Markdown rendering of a cross-entity search, grouped by entity type.
#[must_use]
pub fn format_search_results(query: &str, results: &SearchResults) -> String {
    let mut lines = vec![format!("# Search Results for \"{query}\""), String::new()];

    group(&mut lines, "Applications", &results.applications, |app| {
        described(
            format!("- **{}** ({}) - {}", app.name, app.environment, app.id),
            app.description.as_deref(),
        )
    });
    group(&mut lines, "Services", &results.services, |service| {
        described(
            format!("- **{}** ({}) - {}", service.name, service.environment, service.id),
            service.description.as_deref(),
        )
    });
    group(&mut lines, "Infrastructure", &results.infrastructure, |infra| {
        vec![format!("- **{}** ({}) - {}", infra.name, infra.infra_type, infra.id)]
    });
    group(&mut lines, "Domains", &results.domains, |domain| {
        vec![format!("- **{}** - {}", domain.fqdn, domain.id)]
    });
    group(&mut lines, "People", &results.people, |person| {
        let role = person.role.as_deref().filter(|v| !v.is_empty()).unwrap_or("N/A");
        vec![format!("- **{}** ({role}) - {}", person.name, person.id)]
    });
    group(&mut lines, "Network Shares", &results.network_shares, |share| {
        vec![format!("- **{}** ({}) - {}", share.name, share.share_type, share.path)]
    });

    let total = results.total();
    if total == 0 {
        lines.push(EMPTY_STATE.to_string());
    } else {
        lines.splice(0..0, [format!("**Total Results:** {total}"), String::new()]);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_search_reports_no_results() {
        let rendered = format_search_results("nothing", &SearchResults::default());
        assert_eq!(rendered, "# Search Results for \"nothing\"\n\n*No results found*");
    }

    #[test]
    fn grouped_results_lead_with_total() {
        let results: SearchResults = serde_json::from_value(json!({
            "applications": [{
                "id": "a-1",
                "name": "GitLab",
                "environment": "prd",
                "description": "Source hosting"
            }],
            "domains": [{"id": "d-1", "fqdn": "git.example.org"}]
        }))
        .expect("results");

        let rendered = format_search_results("git", &results);
        assert!(rendered.starts_with("**Total Results:** 2\n\n# Search Results for \"git\""));
        assert!(rendered.contains("## Applications (1)\n- **GitLab** (prd) - a-1\n  Source hosting"));
        assert!(rendered.contains("## Domains (1)\n- **git.example.org** - d-1"));
    }
}
