use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use check_py_versions::config::{self, known_python_versions};
use check_py_versions::pyproject::{
    get_python_requires, get_supported_python_versions, update_python_requires,
    update_supported_python_versions,
};
use check_py_versions::version::{SortedVersionList, Version};

#[derive(Parser)]
#[command(name = "check-py-versions")]
#[command(version, about = "Check and update Python versions declared in pyproject.toml")]
struct Cli {
    /// Path to a pyproject.toml file
    #[arg(default_value = "pyproject.toml")]
    path: PathBuf,

    /// Rewrite declarations to these versions (comma-separated, e.g. "3.9,3.10,3.11")
    #[arg(long, value_name = "VERSIONS")]
    update: Option<String>,

    /// Write the updated document back to the file instead of printing it
    #[arg(long, requires = "update")]
    write: bool,

    /// Print the extracted declarations as JSON
    #[arg(long, conflicts_with = "update")]
    json: bool,

    /// Newest Python 3 minor release to consider when expanding ranges
    #[arg(long, value_name = "MINOR", default_value_t = config::DEFAULT_MAX_PYTHON_3_MINOR)]
    max_python3: u32,
}

/// Extracted declarations in machine-readable form
#[derive(Serialize)]
struct Report {
    path: String,
    classifiers: Vec<String>,
    requires_python: Option<Vec<String>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let known = known_python_versions(cli.max_python3);

    match &cli.update {
        Some(versions) => {
            let new_versions = parse_version_list(versions)?;
            let Some(updated) = apply_updates(&cli.path, &new_versions, &known)? else {
                println!("{}: nothing to update", cli.path.display());
                return Ok(());
            };
            if cli.write {
                fs::write(&cli.path, &updated)
                    .with_context(|| format!("Could not write {}", cli.path.display()))?;
            } else {
                print!("{updated}");
            }
        }
        None => {
            let report = extract_report(&cli.path, &known)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
    }
    Ok(())
}

fn parse_version_list(versions: &str) -> anyhow::Result<SortedVersionList> {
    let parsed = versions
        .split(',')
        .map(|version| version.trim().parse::<Version>())
        .collect::<Result<Vec<Version>, _>>()
        .with_context(|| format!("Invalid version list {versions:?}"))?;
    anyhow::ensure!(!parsed.is_empty(), "Empty version list");
    Ok(check_py_versions::sorted_versions(parsed))
}

fn read_pyproject(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

fn extract_report(path: &Path, known: &[Version]) -> anyhow::Result<Report> {
    let content = read_pyproject(path)?;
    let classifiers = get_supported_python_versions(&content)?;
    let requires_python = get_python_requires(&content, known)?;
    Ok(Report {
        path: path.display().to_string(),
        classifiers: classifiers.iter().map(Version::to_string).collect(),
        requires_python: requires_python
            .map(|versions| versions.iter().map(Version::to_string).collect()),
    })
}

fn render_report(report: &Report) -> String {
    let mut out = String::new();
    let declared = if report.classifiers.is_empty() {
        "(no classifiers)".to_string()
    } else {
        report.classifiers.join(", ")
    };
    out.push_str(&format!("{} says: {}\n", report.path, declared));
    if let Some(requires) = &report.requires_python {
        out.push_str(&format!("requires-python says: {}\n", requires.join(", ")));
    }
    out
}

/// Run both updaters in sequence over the document text. Returns the final
/// document, or `None` when neither declaration kind was present.
fn apply_updates(
    path: &Path,
    new_versions: &[Version],
    known: &[Version],
) -> anyhow::Result<Option<String>> {
    let mut content = read_pyproject(path)?;
    let mut updated = false;

    if let Some(lines) = update_supported_python_versions(&content, new_versions)? {
        content = lines.join("\n");
        updated = true;
    }
    if let Some(lines) = update_python_requires(&content, new_versions, known)? {
        content = lines.join("\n");
        updated = true;
    }
    Ok(updated.then_some(content))
}
