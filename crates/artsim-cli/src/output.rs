//! Output rendering for command results

use artsim::{Descriptor, RankedMatch, RankingOutcome};
use console::style;
use serde::{Deserialize, Serialize};

use crate::error::CliResult;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Renders results as text or JSON
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
}

/// Compare command result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// First image
    pub first: String,
    /// Second image
    pub second: String,
    /// Similarity in `[0, 1]`
    pub score: f64,
}

/// A candidate that failed to load, as reported to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedReport {
    /// Candidate path
    pub id: String,
    /// Failure description
    pub error: String,
}

/// Rank command result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    /// Target image
    pub target: String,
    /// Highest similarity first
    pub matches: Vec<RankedMatch<String>>,
    /// Candidates left out
    pub skipped: Vec<SkippedReport>,
}

impl RankingReport {
    /// Build a report from a ranking outcome
    #[must_use]
    pub fn new(target: impl Into<String>, outcome: RankingOutcome<String>) -> Self {
        Self {
            target: target.into(),
            matches: outcome.matches,
            skipped: outcome
                .skipped
                .into_iter()
                .map(|s| SkippedReport {
                    id: s.id,
                    error: s.error.to_string(),
                })
                .collect(),
        }
    }
}

impl Renderer {
    /// Create a renderer
    #[must_use]
    pub const fn new(format: OutputFormat, use_color: bool) -> Self {
        Self {
            format,
            use_color,
            quiet: false,
        }
    }

    /// Drop title lines from text output
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Output format
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a descriptor
    pub fn descriptor(&self, label: &str, descriptor: &Descriptor) -> CliResult<String> {
        if self.format == OutputFormat::Json {
            return Ok(descriptor.to_json()?);
        }

        let mut out = String::new();
        self.push_header(
            &mut out,
            &format!(
                "{label}: {grid}x{grid} grid, {cells} cells",
                grid = descriptor.grid_size(),
                cells = descriptor.cell_count()
            ),
        );
        for row in 0..descriptor.grid_size() {
            for col in 0..descriptor.grid_size() {
                let Some(cell) = descriptor.cell(row, col) else {
                    continue;
                };
                let colors: Vec<String> = cell
                    .entries()
                    .iter()
                    .map(|entry| format!("{}x{}", entry.color, entry.count))
                    .collect();
                out.push_str(&format!("  [{row},{col}] {}\n", colors.join(" ")));
            }
        }
        Ok(out)
    }

    /// Render a pairwise comparison
    pub fn comparison(&self, report: &ComparisonReport) -> CliResult<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }
        Ok(format!(
            "{} {} vs {}\n",
            self.score(report.score),
            report.first,
            report.second
        ))
    }

    /// Render a ranking
    pub fn ranking(&self, report: &RankingReport) -> CliResult<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }

        let mut out = String::new();
        self.push_header(&mut out, &format!("Matches for {}", report.target));
        if report.matches.is_empty() {
            out.push_str("  (no candidate could be scored)\n");
        }
        for (rank, m) in report.matches.iter().enumerate() {
            out.push_str(&format!("{:>3}. {} {}\n", rank + 1, self.score(m.score), m.id));
        }
        for skipped in &report.skipped {
            let prefix = if self.use_color {
                style("skipped").yellow().to_string()
            } else {
                "skipped".to_string()
            };
            out.push_str(&format!("     {prefix} {}: {}\n", skipped.id, skipped.error));
        }
        Ok(out)
    }

    fn push_header(&self, out: &mut String, title: &str) {
        if self.quiet {
            return;
        }
        if self.use_color {
            out.push_str(&style(title).bold().to_string());
        } else {
            out.push_str(title);
        }
        out.push('\n');
    }

    fn score(&self, score: f64) -> String {
        let text = format!("{score:.4}");
        if !self.use_color {
            return text;
        }
        if score >= 0.75 {
            style(text).green().to_string()
        } else if score >= 0.4 {
            style(text).yellow().to_string()
        } else {
            style(text).dim().to_string()
        }
    }
}
