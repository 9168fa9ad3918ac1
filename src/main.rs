#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # jalon
//!
//! Command-line front end for the structural auditor: `audit` runs the full
//! rule catalog against one student script, `check` validates syntax only,
//! and `rules` lists the compiled-in catalog. Exit code 0 means every
//! required milestone passed.

use std::path::PathBuf;

use anyhow::Result;
use bpaf::*;
use jalon::{
    catalog::default_catalog,
    config::AuditConfig,
    constants::DEFAULT_TARGET,
    evaluate, markers,
    parser::{self, ParseResult},
    report,
    source::SourceDocument,
};
use tabled::{Table, Tabled, settings::Style};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Run the full catalog against a file.
    Audit {
        /// Emit the report as JSON on stdout.
        json:        bool,
        /// Override the marker directory.
        markers_dir: Option<PathBuf>,
        /// Skip writing markers.
        no_markers:  bool,
        /// The file under audit.
        file:        PathBuf,
    },
    /// Syntax-validate a file and nothing else.
    Check {
        /// The file to validate.
        file: PathBuf,
    },
    /// List the compiled-in catalog.
    Rules,
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the target file path, defaulting to `main.py`
    fn target() -> impl Parser<PathBuf> {
        positional::<PathBuf>("FILE")
            .help("Path to the Python script under audit")
            .fallback(PathBuf::from(DEFAULT_TARGET))
    }

    let audit = {
        let json = long("json")
            .help("Print the audit report as JSON on stdout")
            .switch();
        let markers_dir = long("markers-dir")
            .help("Directory to write marker files into")
            .argument::<PathBuf>("DIR")
            .optional();
        let no_markers = long("no-markers")
            .help("Do not write marker files")
            .switch();
        let file = target();
        construct!(Cmd::Audit {
            json,
            markers_dir,
            no_markers,
            file
        })
        .to_options()
        .command("audit")
        .help("Audit a script against the rule catalog")
    };

    let check = {
        let file = target();
        construct!(Cmd::Check { file })
            .to_options()
            .command("check")
            .help("Check for syntax errors")
    };

    let rules = pure(Cmd::Rules)
        .to_options()
        .command("rules")
        .help("List every rule in the catalog");

    construct!([audit, check, rules])
        .to_options()
        .descr("Structural auditor for beginner Python scripts")
        .run()
}

/// One row of the `rules` listing.
#[derive(Tabled)]
struct RuleRow {
    /// Owning milestone.
    #[tabled(rename = "Milestone")]
    milestone: String,
    /// Rule identifier.
    #[tabled(rename = "Rule")]
    id:        String,
    /// Predicate kind.
    #[tabled(rename = "Kind")]
    kind:      &'static str,
    /// Point weight.
    #[tabled(rename = "Points")]
    weight:    u32,
}

/// Prints the catalog listing.
fn list_rules() -> Result<()> {
    let catalog = default_catalog()?;
    let rows: Vec<RuleRow> = catalog
        .milestones()
        .iter()
        .flat_map(|milestone| {
            milestone.rules().iter().map(|rule| RuleRow {
                milestone: milestone.name().to_string(),
                id:        rule.id().to_string(),
                kind:      rule.predicate().kind(),
                weight:    rule.weight(),
            })
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::modern()));
    Ok(())
}

fn main() -> Result<()> {
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Audit {
            json,
            markers_dir,
            no_markers,
            file,
        } => {
            let config = AuditConfig::builder()
                .target(file)
                .maybe_markers_dir(markers_dir)
                .json(json)
                .write_markers(!no_markers)
                .build();

            let doc = SourceDocument::load(config.target())?;
            let catalog = default_catalog()?;
            let audit_report = evaluate::audit(&catalog, &doc)?;

            if config.json() {
                println!("{}", serde_json::to_string_pretty(&audit_report)?);
            } else {
                report::print_report(&audit_report);
            }

            if config.write_markers() {
                markers::write_markers(&audit_report, config.markers_dir())?;
            }

            if !audit_report.required_complete() {
                std::process::exit(1);
            }
        }
        Cmd::Check { file } => {
            let doc = SourceDocument::load(&file)?;
            match parser::parse_document(&doc)? {
                ParseResult::Valid(p) => {
                    println!("Syntax OK ({} lines)", p.line_count());
                }
                ParseResult::Invalid(issue) => {
                    eprintln!("{}: {issue}", file.display());
                    std::process::exit(1);
                }
                ParseResult::NoInput => {
                    eprintln!("{}: file not found", file.display());
                    std::process::exit(1);
                }
            }
        }
        Cmd::Rules => list_rules()?,
    }

    Ok(())
}
