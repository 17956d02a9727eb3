//! WebAPI Manager CLI
//!
//! CLI tool for inspecting, importing into, exporting from and comparing
//! persisted rule state files.

mod state_file;

use std::path::Path;

use clap::{Parser, Subcommand};
use serde::Serialize;

use wam_core::{rule_sets_equivalent, standard_lists_equivalent, PersistedState, RuleStore, DEFAULT_DOMAIN_RULE};
use wam_transfer::{export_string, import_text};

#[derive(Parser)]
#[command(name = "wam-cli")]
#[command(about = "WebAPI Manager rule state tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a state file
    Info {
        /// State file to inspect
        #[arg(short, long)]
        state: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge import text into a state file
    Import {
        /// State file to import into
        #[arg(short, long)]
        state: String,

        /// Import file (JSON array of {pattern, standardIds})
        #[arg(short, long)]
        input: String,

        /// Replace rules for patterns that already exist
        #[arg(long)]
        overwrite: bool,

        /// Where to write the merged state (defaults to --state)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Export rules from a state file
    Export {
        /// State file to export from
        #[arg(short, long)]
        state: String,

        /// Domains to export, in order (defaults to all)
        #[arg(short, long)]
        domain: Vec<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check whether two state files hold the same policy
    Diff {
        #[arg(short, long)]
        left: String,

        #[arg(short, long)]
        right: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { state, json } => cmd_info(&state, json),
        Commands::Import {
            state,
            input,
            overwrite,
            output,
        } => cmd_import(&state, &input, overwrite, output.as_deref()),
        Commands::Export {
            state,
            domain,
            output,
        } => cmd_export(&state, &domain, output.as_deref()),
        Commands::Diff { left, right } => cmd_diff(&left, &right),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_store(path: &str) -> Result<RuleStore, String> {
    let snapshot = state_file::read_state(Path::new(path))?;
    Ok(RuleStore::from_persisted(DEFAULT_DOMAIN_RULE, snapshot))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoSummary {
    should_log: bool,
    domains_with_blocked_standards: Vec<String>,
    domains_with_no_blocked_standards: Vec<String>,
    has_default_rule: bool,
}

fn cmd_info(state: &str, json: bool) -> Result<(), String> {
    let store = load_store(state)?;

    let summary = InfoSummary {
        should_log: store.should_log(),
        domains_with_blocked_standards: store.domains_with_blocked_standards(),
        domains_with_no_blocked_standards: store.domains_with_no_blocked_standards(),
        has_default_rule: store.contains_domain(DEFAULT_DOMAIN_RULE),
    };

    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to serialize summary: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    println!("State: {}", state);
    println!("  Logging:     {}", if summary.should_log { "on" } else { "off" });
    println!("  Domains:     {}", store.domain_names().len());
    println!("  Default:     {}", if summary.has_default_rule { "present" } else { "missing" });
    println!();

    println!("Blocking standards:");
    for domain in &summary.domains_with_blocked_standards {
        let standards = store
            .standards_for_domain(domain)
            .map(|list| list.sorted().join(", "))
            .unwrap_or_default();
        println!("  {:<30} {}", domain, standards);
    }
    println!();

    println!("Blocking nothing:");
    for domain in &summary.domains_with_no_blocked_standards {
        println!("  {}", domain);
    }

    Ok(())
}

fn cmd_import(state: &str, input: &str, overwrite: bool, output: Option<&str>) -> Result<(), String> {
    let mut store = load_store(state)?;
    let text = state_file::read_text(Path::new(input))?;

    let status = import_text(&mut store, &text, overwrite);
    println!("{}", status.import_log);
    if status.import_error {
        return Err(format!("Nothing imported from '{}'", input));
    }

    let output = output.unwrap_or(state);
    state_file::write_state(Path::new(output), &store.to_persisted())?;
    println!("Wrote {} domain rules to '{}'", store.domain_names().len(), output);

    Ok(())
}

fn cmd_export(state: &str, domains: &[String], output: Option<&str>) -> Result<(), String> {
    let store = load_store(state)?;

    let domains: Vec<String> = if domains.is_empty() {
        store.domain_names().to_vec()
    } else {
        domains.to_vec()
    };

    let text = export_string(domains.as_slice(), store.domain_rules()).map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            state_file::write_text(Path::new(path), &text)?;
            println!("Exported {} domains to '{}'", domains.len(), path);
        }
        None => println!("{}", text),
    }

    Ok(())
}

fn cmd_diff(left: &str, right: &str) -> Result<(), String> {
    let left_state = state_file::read_state(Path::new(left))?;
    let right_state = state_file::read_state(Path::new(right))?;

    if rule_sets_equivalent(&left_state.domain_rules, &right_state.domain_rules) {
        println!("Rule sets are equivalent");
        if left_state.should_log != right_state.should_log {
            println!("  (logging flag differs)");
        }
        return Ok(());
    }

    for line in describe_differences(&left_state, &right_state) {
        println!("  {}", line);
    }
    Err("Rule sets differ".to_string())
}

fn describe_differences(left: &PersistedState, right: &PersistedState) -> Vec<String> {
    let mut lines = Vec::new();

    for (pattern, standards) in &left.domain_rules {
        match right.domain_rules.get(pattern) {
            None => lines.push(format!("- {}", pattern)),
            Some(other) if !standard_lists_equivalent(standards, other) => {
                lines.push(format!(
                    "~ {}: [{}] -> [{}]",
                    pattern,
                    standards.sorted().join(", "),
                    other.sorted().join(", ")
                ));
            }
            Some(_) => {}
        }
    }

    for pattern in right.domain_rules.keys() {
        if !left.domain_rules.contains_key(pattern) {
            lines.push(format!("+ {}", pattern));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use wam_core::StandardList;

    fn state(entries: &[(&str, &[&str])]) -> PersistedState {
        PersistedState {
            domain_rules: entries
                .iter()
                .map(|(pattern, ids)| (pattern.to_string(), StandardList::from(*ids)))
                .collect(),
            should_log: false,
        }
    }

    #[test]
    fn differences_list_added_removed_and_changed() {
        let left = state(&[("a.com", &["X"]), ("b.com", &["Y"])]);
        let right = state(&[("b.com", &["Z"]), ("c.com", &[])]);

        let lines = describe_differences(&left, &right);

        assert_eq!(lines, vec!["- a.com", "~ b.com: [Y] -> [Z]", "+ c.com"]);
    }

    #[test]
    fn equivalent_states_have_no_differences() {
        let left = state(&[("a.com", &["X", "Y"])]);
        let right = state(&[("a.com", &["Y", "X"])]);
        assert!(describe_differences(&left, &right).is_empty());
    }
}
