use auto_store::ApplicationDetail;

use super::{ResponseFormat, format_date, preview};

const NOTE_PREVIEW_CHARS: usize = 100;

fn section<T>(lines: &mut Vec<String>, title: &str, items: &[T], render: impl Fn(&T) -> String) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("## {title}"));
    lines.extend(items.iter().map(render));
}

/// Renders an application with all its relations.
///
/// # Errors
/// Returns the serializer error when `format` is JSON and serialization fails.
pub fn format_application_detail(
    detail: &ApplicationDetail,
    format: ResponseFormat,
) -> serde_json::Result<String> {
    if format == ResponseFormat::Json {
        return serde_json::to_string_pretty(detail);
    }

    let app = &detail.application;
    let mut lines = vec![
        format!("# {}", app.name),
        String::new(),
        format!("**ID:** {}", app.id),
        format!("**Environment:** {}", app.environment),
        format!("**Status:** {}", app.status),
    ];
    if let Some(description) = app.description.as_deref().filter(|v| !v.is_empty()) {
        lines.push(format!("**Description:** {description}"));
    }
    if let Some(repository) = app.repository_url.as_deref().filter(|v| !v.is_empty()) {
        lines.push(format!("**Repository:** {repository}"));
    }
    if let Some(url) = app.url.as_deref().filter(|v| !v.is_empty()) {
        lines.push(format!("**URL:** {url}"));
    }

    lines.push(String::new());
    lines.push(format!("**Created:** {}", format_date(&app.created_at)));
    lines.push(format!("**Updated:** {}", format_date(&app.updated_at)));
    if let Some(created_by) = app.created_by.as_deref().filter(|v| !v.is_empty()) {
        lines.push(format!("**Created By:** {created_by}"));
    }

    section(&mut lines, "Infrastructure", &detail.infra, |infra| {
        format!("- {} ({}) - {}", infra.name, infra.infra_type, infra.id)
    });
    section(&mut lines, "Services", &detail.services, |service| {
        format!("- {} ({}) - {}", service.name, service.environment, service.id)
    });
    section(&mut lines, "Domains", &detail.domains, |domain| {
        format!("- {} - {}", domain.fqdn, domain.id)
    });
    section(&mut lines, "People", &detail.people, |person| {
        let role = person.role.as_deref().filter(|v| !v.is_empty()).unwrap_or("N/A");
        format!("- {} ({role}) - {}", person.name, person.id)
    });
    section(&mut lines, "Network Shares", &detail.network_shares, |share| {
        format!("- {} ({}) - {}", share.name, share.share_type, share.path)
    });
    section(&mut lines, "Technology Stacks", &detail.stacks, |stack| {
        format!("- {} - {}", stack.name, stack.id)
    });
    section(&mut lines, "Healthchecks", &detail.healthchecks, |check| {
        let state = if check.is_enabled { "enabled" } else { "disabled" };
        format!("- {} - {}://{} ({state})", check.name, check.protocol, check.path)
    });
    section(&mut lines, "Notes", &detail.notes, |note| {
        let pin = if note.is_pinned { " 📌" } else { "" };
        let mut rendered = format!("- **{}** ({}){pin}", note.title, note.note_type);
        if let Some(content) = note.content.as_deref().filter(|v| !v.is_empty()) {
            let shown = preview(content, NOTE_PREVIEW_CHARS);
            let ellipsis = if shown.len() < content.len() { "..." } else { "" };
            rendered.push_str(&format!("\n  {shown}{ellipsis}"));
        }
        rendered
    });

    Ok(lines.join("\n"))
}
