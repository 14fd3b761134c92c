//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use rapport_domain::{Identity, Relationship, ViewerStatus};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format relationships, optionally with the status seen by `viewer`.
    pub fn format_relationships(
        &self,
        relationships: &[Relationship],
        viewer: Option<&Identity>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_relationships_json(relationships, viewer),
            OutputFormat::Table => Ok(self.format_relationships_table(relationships, viewer)),
            OutputFormat::Quiet => Ok(join_lines(relationships.iter().map(|r| r.id.to_string()))),
        }
    }

    fn format_relationships_json(
        &self,
        relationships: &[Relationship],
        viewer: Option<&Identity>,
    ) -> Result<String> {
        let json: Vec<serde_json::Value> = relationships
            .iter()
            .map(|r| {
                let mut value = serde_json::json!({
                    "id": r.id.to_string(),
                    "identity1": identity_json(&r.identity1),
                    "identity2": identity_json(&r.identity2),
                    "status": r.status.map(|s| s.as_str()),
                    "properties": r.properties.iter().map(|p| serde_json::json!({
                        "name": p.name,
                        "status": p.status.map(|s| s.as_str()),
                        "initiator": identity_json(&p.initiator),
                    })).collect::<Vec<_>>(),
                });
                if let Some(viewer) = viewer {
                    value["view"] = ViewerStatus::resolve(Some(r), viewer).as_str().into();
                }
                value
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_relationships_table(
        &self,
        relationships: &[Relationship],
        viewer: Option<&Identity>,
    ) -> String {
        if relationships.is_empty() {
            return self.colorize("No relationships found.", "yellow");
        }

        let mut header = vec!["ID", "From", "To", "Status", "Properties"];
        if viewer.is_some() {
            header.push("View");
        }

        let mut builder = Builder::default();
        builder.push_record(header);

        for rel in relationships {
            let properties = rel
                .properties
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            let mut row = vec![
                rel.id.to_string(),
                rel.identity1.remote_id.clone(),
                rel.identity2.remote_id.clone(),
                rel.status.map(|s| s.as_str()).unwrap_or("-").to_string(),
                properties,
            ];
            if let Some(viewer) = viewer {
                row.push(ViewerStatus::resolve(Some(rel), viewer).as_str().to_string());
            }
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format identities.
    pub fn format_identities(&self, identities: &[Identity]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = identities.iter().map(identity_json).collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_lines(identities.iter().map(|i| i.id.to_string()))),
            OutputFormat::Table => {
                if identities.is_empty() {
                    return Ok(self.colorize("No identities found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Provider", "Remote ID"]);
                for identity in identities {
                    builder.push_record([
                        identity.id.to_string(),
                        identity.provider_id.clone(),
                        identity.remote_id.clone(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format the status of a relationship seen by `viewer`.
    pub fn format_status(
        &self,
        viewer: &Identity,
        other: &Identity,
        relationship: Option<&Relationship>,
        status: ViewerStatus,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "viewer": identity_json(viewer),
                "other": identity_json(other),
                "relationship": relationship.map(|r| r.id.to_string()),
                "status": status.as_str(),
            }))?),
            OutputFormat::Quiet => Ok(status.as_str().to_string()),
            OutputFormat::Table => {
                let color = match status {
                    ViewerStatus::Confirm => "green",
                    ViewerStatus::Pending => "cyan",
                    ViewerStatus::RequireValidation => "magenta",
                    ViewerStatus::Alien => "yellow",
                };
                Ok(format!(
                    "{} -> {}: {}",
                    viewer,
                    other,
                    self.colorize(status.as_str(), color)
                ))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format the result of a lifecycle transition.
    ///
    /// In quiet mode only the relationship id is printed.
    pub fn transition(&self, action: &str, relationship: &Relationship) -> String {
        if self.format == OutputFormat::Quiet {
            return relationship.id.to_string();
        }
        self.success(&format!(
            "Relationship {} {} ({} -> {})",
            relationship.id, action, relationship.identity1, relationship.identity2
        ))
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn identity_json(identity: &Identity) -> serde_json::Value {
    serde_json::json!({
        "id": identity.id.to_string(),
        "provider": identity.provider_id,
        "remote_id": identity.remote_id,
    })
}

fn join_lines<I: Iterator<Item = String>>(lines: I) -> String {
    lines.collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_domain::{Property, RelationshipStatus};

    fn create_test_relationship() -> Relationship {
        let john = Identity::new("organization", "john");
        let mary = Identity::new("organization", "mary");
        let mut rel = Relationship::new(john.clone(), mary);
        rel.status = Some(RelationshipStatus::Pending);
        rel.properties.push(Property::new("colleague", john));
        rel
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let rel = create_test_relationship();
        let output = formatter.format_relationships(&[rel.clone()], Some(&rel.identity2)).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["status"], "pending");
        assert_eq!(parsed[0]["view"], "require_validation");
        assert_eq!(parsed[0]["properties"][0]["name"], "colleague");
        assert_eq!(parsed[0]["identity1"]["remote_id"], "john");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let rel = create_test_relationship();
        let output = formatter.format_relationships(&[rel.clone(), rel.clone()], None).unwrap();
        assert_eq!(output, format!("{}\n{}", rel.id, rel.id));
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let rel = create_test_relationship();
        let output = formatter.format_relationships(&[rel.clone()], Some(&rel.identity1)).unwrap();
        assert!(output.contains("Properties"));
        assert!(output.contains("View"));
        assert!(output.contains("colleague"));
        assert!(output.contains("mary"));
    }

    #[test]
    fn test_empty_relationships() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_relationships(&[], None).unwrap();
        assert!(output.contains("No relationships found"));
    }

    #[test]
    fn test_identities_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_identities(&[Identity::new("space", "engineering")])
            .unwrap();
        assert!(output.contains("Remote ID"));
        assert!(output.contains("engineering"));
    }

    #[test]
    fn test_status_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let john = Identity::new("organization", "john");
        let paul = Identity::new("organization", "paul");
        let output = formatter
            .format_status(&john, &paul, None, ViewerStatus::Alien)
            .unwrap();
        assert_eq!(output, "organization:john -> organization:paul: alien");
    }

    #[test]
    fn test_transition_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let rel = create_test_relationship();
        assert_eq!(formatter.transition("confirmed", &rel), rel.id.to_string());
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
