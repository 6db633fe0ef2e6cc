use auto_store::{Application, Domain, Healthcheck, Infrastructure, NetworkShare, Person, Service};

use super::format_date;

const fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn push_optional(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        lines.push(format!("- **{label}:** {value}"));
    }
}

#[must_use]
pub fn format_application_item(app: &Application) -> String {
    let mut lines = vec![
        format!("## {} ({})", app.name, app.id),
        format!("- **Environment:** {}", app.environment),
        format!("- **Status:** {}", app.status),
    ];
    push_optional(&mut lines, "Description", app.description.as_deref());
    push_optional(&mut lines, "Repository", app.repository_url.as_deref());
    push_optional(&mut lines, "URL", app.url.as_deref());
    lines.push(format!("- **Updated:** {}", format_date(&app.updated_at)));
    lines.join("\n")
}

#[must_use]
pub fn format_service_item(service: &Service) -> String {
    let mut lines = vec![
        format!("## {} ({})", service.name, service.id),
        format!("- **Environment:** {}", service.environment),
        format!("- **Status:** {}", service.status),
    ];
    push_optional(&mut lines, "Description", service.description.as_deref());
    push_optional(&mut lines, "Repository", service.repository_url.as_deref());
    lines.push(format!("- **Updated:** {}", format_date(&service.updated_at)));
    lines.join("\n")
}

#[must_use]
pub fn format_infrastructure_item(infra: &Infrastructure) -> String {
    let mut lines = vec![
        format!("## {} ({})", infra.name, infra.id),
        format!("- **Type:** {}", infra.infra_type),
    ];
    push_optional(&mut lines, "Description", infra.description.as_deref());
    lines.push(format!("- **Updated:** {}", format_date(&infra.updated_at)));
    lines.join("\n")
}

#[must_use]
pub fn format_domain_item(domain: &Domain) -> String {
    let mut lines = vec![format!("## {} ({})", domain.fqdn, domain.id)];
    push_optional(&mut lines, "Registrar", domain.registrar.as_deref());
    push_optional(&mut lines, "DNS Provider", domain.dns_provider.as_deref());
    if let Some(expires) = domain.expires_at.as_deref().filter(|value| !value.is_empty()) {
        lines.push(format!("- **Expires:** {}", format_date(expires)));
    }
    lines.push(format!("- **Updated:** {}", format_date(&domain.updated_at)));
    lines.join("\n")
}

#[must_use]
pub fn format_person_item(person: &Person) -> String {
    let mut lines = vec![
        format!("## {} ({})", person.name, person.id),
        format!("- **Active:** {}", yes_no(person.is_active)),
    ];
    push_optional(&mut lines, "Email", person.email.as_deref());
    push_optional(&mut lines, "Role", person.role.as_deref());
    push_optional(&mut lines, "Department", person.department.as_deref());
    lines.join("\n")
}

#[must_use]
pub fn format_network_share_item(share: &NetworkShare) -> String {
    let mut lines = vec![
        format!("## {} ({})", share.name, share.id),
        format!("- **Type:** {}", share.share_type),
        format!("- **Path:** {}", share.path),
        format!("- **Status:** {}", share.status),
    ];
    push_optional(&mut lines, "Server", share.server.as_deref());
    push_optional(&mut lines, "Purpose", share.purpose.as_deref());
    lines.join("\n")
}

#[must_use]
pub fn format_healthcheck_item(healthcheck: &Healthcheck) -> String {
    [
        format!("## {} ({})", healthcheck.name, healthcheck.id),
        format!("- **URL:** {}://{}", healthcheck.protocol, healthcheck.path),
        format!("- **Method:** {}", healthcheck.method),
        format!("- **Expected Status:** {}", healthcheck.expected_status),
        format!("- **Enabled:** {}", yes_no(healthcheck.is_enabled)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> Application {
        Application {
            id: "app-1".to_string(),
            name: "Portal".to_string(),
            description: Some("Public portal".to_string()),
            repository_url: None,
            environment: "prd".to_string(),
            url: Some("https://portal.example.org".to_string()),
            status: "active".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-03-04T09:15:00Z".to_string(),
            created_by: None,
        }
    }

    #[test]
    fn application_item_skips_missing_fields() {
        assert_eq!(
            format_application_item(&application()),
            "## Portal (app-1)\n- **Environment:** prd\n- **Status:** active\n- **Description:** Public portal\n- **URL:** https://portal.example.org\n- **Updated:** Mar 4, 2025, 09:15 AM"
        );
    }

    #[test]
    fn person_item_renders_active_flag() {
        let person: Person = serde_json::from_value(serde_json::json!({
            "id": "p-1",
            "name": "Ada",
            "is_active": false,
            "role": "Developer"
        }))
        .expect("person");
        assert_eq!(
            format_person_item(&person),
            "## Ada (p-1)\n- **Active:** No\n- **Role:** Developer"
        );
    }

    #[test]
    fn healthcheck_item_builds_url() {
        let check: Healthcheck = serde_json::from_value(serde_json::json!({
            "id": "h-1",
            "name": "Portal up",
            "protocol": "https",
            "path": "/health",
            "method": "GET",
            "expected_status": 200,
            "is_enabled": true
        }))
        .expect("healthcheck");
        let rendered = format_healthcheck_item(&check);
        assert!(rendered.contains("- **URL:** https:///health"));
        assert!(rendered.ends_with("- **Enabled:** Yes"));
    }
}
