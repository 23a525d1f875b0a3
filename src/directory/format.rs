//! Format agent listings as text.

use crate::registry::AgentRecord;
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn format_age(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - last_seen).num_seconds().max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// Human-readable table of live agents, most recently seen first.
pub fn format_agent_list_text(agents: &[AgentRecord], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Registered Agents")));

    if agents.is_empty() {
        out.push_str("  No agents registered.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "URL", "Skills", "Last seen"]);
    for agent in agents {
        let skills = if agent.skills.is_empty() {
            "-".to_string()
        } else {
            agent.skills.join(", ")
        };
        table.add_row(vec![
            agent.name.clone(),
            agent.url.clone(),
            skills,
            format_age(agent.last_seen, now),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("  Total: {}\n", agents.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, url: &str, skills: &[&str], last_seen: DateTime<Utc>) -> AgentRecord {
        AgentRecord {
            name: name.to_string(),
            description: String::new(),
            url: url.to_string(),
            card_url: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            version: None,
            provider: None,
            registered_at: last_seen,
            last_seen,
            expires_at: last_seen + chrono::Duration::seconds(300),
            card: None,
        }
    }

    #[test]
    fn test_empty_listing() {
        let out = format_agent_list_text(&[], Utc::now());
        assert!(out.contains("No agents registered."));
    }

    #[test]
    fn test_listing_rows() {
        let now = Utc::now();
        let agents = vec![
            record("Calc", "http://calc:1", &["add", "sub"], now - chrono::Duration::seconds(5)),
            record("Lights", "http://iot:1", &[], now - chrono::Duration::seconds(120)),
        ];
        let out = format_agent_list_text(&agents, now);
        assert!(out.contains("Calc"));
        assert!(out.contains("add, sub"));
        assert!(out.contains("5s ago"));
        assert!(out.contains("2m ago"));
        assert!(out.contains("Total: 2"));
    }
}
