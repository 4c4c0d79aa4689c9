use crate::core::Lead;

const INDEX_HTML: &str = include_str!("web/index.html");
const DASHBOARD_HTML: &str = include_str!("web/dashboard.html");

pub fn index_html() -> &'static str {
    INDEX_HTML
}

/// Dashboard page with one table row per lead, in the order given.
pub fn dashboard_html(leads: &[Lead]) -> String {
    let rows = if leads.is_empty() {
        r#"      <tr><td colspan="6" class="empty">No leads yet</td></tr>"#.to_string()
    } else {
        leads.iter().map(lead_row).collect::<Vec<_>>().join("\n")
    };

    DASHBOARD_HTML
        .replace("{{LEAD_COUNT}}", &leads.len().to_string())
        .replace("{{LEAD_ROWS}}", &rows)
}

fn lead_row(lead: &Lead) -> String {
    format!(
        r#"      <tr id="lead-{id}"><td>{id}</td><td>{name}</td><td>{phone}</td><td>{source}</td><td>{created_at}</td><td><button onclick="deleteLead({id})">Delete</button></td></tr>"#,
        id = lead.id,
        name = escape_html(&lead.name),
        phone = escape_html(&lead.phone),
        source = escape_html(&lead.source),
        created_at = escape_html(&lead.created_at),
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
