use super::Output;
use anyhow::Result;
use colored::Colorize;
use driftkit::{Analysis, Change, ChangeKind, Resource};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Human readable summary on stdout.
pub struct ConsoleOutput {
    /// Also list managed resources
    verbose: bool,
}

impl ConsoleOutput {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn render(&self, analysis: &Analysis) -> String {
        let mut out = String::new();

        if self.verbose && !analysis.managed().is_empty() {
            render_group(&mut out, "Managed resources", analysis.managed());
        }
        if !analysis.deleted().is_empty() {
            render_group(&mut out, "Found missing resources", analysis.deleted());
        }
        if !analysis.unmanaged().is_empty() {
            render_group(&mut out, "Found resources not covered by IaC", analysis.unmanaged());
        }
        if !analysis.differences().is_empty() {
            section(&mut out, "Found changed resources");
            for difference in analysis.differences() {
                let _ = writeln!(out, "  {}:", difference.res.to_string().bold());
                for change in &difference.changelog {
                    let _ = writeln!(out, "    {}", format_change(change));
                }
            }
        }

        let summary = analysis.summary();
        section(&mut out, &format!("Found {} resource(s)", summary.total_resources));
        kv(&mut out, "coverage", &format!("{}%", analysis.coverage()));
        kv(&mut out, "managed", &summary.total_managed.to_string());
        kv(
            &mut out,
            "changed",
            &format!("{}/{}", summary.total_changed, summary.total_managed),
        );
        kv(&mut out, "not covered", &summary.total_unmanaged.to_string());
        kv(&mut out, "missing", &summary.total_deleted.to_string());

        if !analysis.alerts().is_empty() {
            section(&mut out, "Alerts");
            for alerts in analysis.alerts().values() {
                for alert in alerts {
                    let _ = writeln!(out, "{} {}", "⚠".yellow(), alert.message);
                }
            }
        }

        let _ = writeln!(out);
        if analysis.is_sync() {
            let _ = writeln!(
                out,
                "{} {}",
                "✓".green(),
                "Your infrastructure is fully in sync."
            );
        } else {
            let _ = writeln!(out, "{} {}", "✗".red(), "Drift detected.");
        }
        out
    }
}

impl Output for ConsoleOutput {
    fn write(&self, analysis: &Analysis) -> Result<()> {
        print!("{}", self.render(analysis));
        Ok(())
    }

    fn info_enabled(&self) -> bool {
        true
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title.cyan().bold());
}

fn kv(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "  {}: {}", key.dimmed(), value);
}

/// Resources grouped by type, ids sorted.
fn render_group(out: &mut String, title: &str, resources: &[Resource]) {
    section(out, title);
    let mut by_type: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for res in resources {
        by_type.entry(res.ty()).or_default().push(res.id());
    }
    for (ty, ids) in by_type {
        let _ = writeln!(out, "  {ty}:");
        for id in ids {
            let _ = writeln!(out, "    - {id}");
        }
    }
}

fn format_change(change: &Change) -> String {
    let path = change.path.join(".");
    let line = match change.kind {
        ChangeKind::Add => format!("{} {path}: {}", "+".green(), format_value(change.to.as_ref())),
        ChangeKind::Remove => format!("{} {path}: {}", "-".red(), format_value(change.from.as_ref())),
        ChangeKind::Update => format!(
            "{} {path}: {} => {}",
            "~".yellow(),
            format_value(change.from.as_ref()),
            format_value(change.to.as_ref())
        ),
    };
    if change.computed {
        format!("{line} {}", "(computed)".dimmed())
    } else {
        line
    }
}

fn format_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "<nil>".to_string(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftkit::{Alert, Alerts, DriftIgnore, Engine, SchemaRepository};
    use serde_json::json;

    fn res(ty: &str, id: &str, attributes: Value) -> Resource {
        match attributes {
            Value::Object(map) => Resource::new(ty, id).with_attributes(map),
            _ => panic!("expected an object"),
        }
    }

    fn drifted() -> Analysis {
        let mut alerts = Alerts::new();
        alerts
            .entry("aws_iam_access_key".to_string())
            .or_default()
            .push(Alert::access_denied("aws", "aws_iam_access_key"));

        Engine::new(SchemaRepository::new(), DriftIgnore::empty())
            .run(
                vec![
                    res("aws_instance", "i-1", json!({"ami": "ami-2", "tags": {"Env": "prod"}})),
                    res("aws_iam_user", "bob", json!({})),
                ],
                vec![
                    res("aws_instance", "i-1", json!({"ami": "ami-1", "monitoring": true})),
                    res("aws_vpc", "vpc-1", json!({})),
                ],
                alerts,
            )
            .unwrap()
    }

    #[test]
    fn test_render_drift() {
        colored::control::set_override(false);
        let text = ConsoleOutput::new(false).render(&drifted());

        assert!(text.contains("Found missing resources\n  aws_vpc:\n    - vpc-1\n"));
        assert!(text.contains("Found resources not covered by IaC\n  aws_iam_user:\n    - bob\n"));
        assert!(text.contains("  aws_instance.i-1:\n"));
        assert!(text.contains("    ~ ami: \"ami-1\" => \"ami-2\"\n"));
        assert!(text.contains("    - monitoring: true\n"));
        assert!(text.contains("    + tags.Env: \"prod\"\n"));
        assert!(text.contains("Found 3 resource(s)"));
        assert!(text.contains("  coverage: 33%\n"));
        assert!(text.contains("  changed: 1/1\n"));
        assert!(text.contains("Listing aws_iam_access_key is forbidden (aws)."));
        assert!(text.ends_with("✗ Drift detected.\n"));
        assert!(!text.contains("Managed resources"));
    }

    #[test]
    fn test_render_in_sync() {
        colored::control::set_override(false);
        let analysis = Engine::new(SchemaRepository::new(), DriftIgnore::empty())
            .run(
                vec![Resource::new("aws_vpc", "vpc-1")],
                vec![Resource::new("aws_vpc", "vpc-1")],
                Alerts::new(),
            )
            .unwrap();

        let text = ConsoleOutput::new(true).render(&analysis);
        assert!(text.contains("Managed resources\n  aws_vpc:\n    - vpc-1\n"));
        assert!(text.ends_with("✓ Your infrastructure is fully in sync.\n"));
    }

    #[test]
    fn test_format_computed_change() {
        colored::control::set_override(false);
        let change = Change {
            kind: ChangeKind::Update,
            path: vec!["arn".to_string()],
            from: Some(json!("a")),
            to: None,
            computed: true,
        };
        assert_eq!(format_change(&change), "~ arn: \"a\" => <nil> (computed)");
    }
}
