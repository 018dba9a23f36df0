//! Report export collaborator. The core only hands structured data to an
//! exporter; nothing downstream is consumed. The bundled implementation
//! renders plain-text reports.

use crate::models::{DocumentInsights, DocumentSummary, ReadinessScore};
use std::io;
use std::path::{Path, PathBuf};

pub enum Report<'a> {
    Summary(&'a DocumentSummary),
    Insights(&'a DocumentInsights),
    Readiness(&'a ReadinessScore),
}

pub trait ReportExporter: Send {
    fn export(&self, title: &str, report: &Report<'_>) -> io::Result<()>;
}

/// Writes one text file per report into a directory.
pub struct TextReportExporter {
    dir: PathBuf,
}

impl TextReportExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn target_path(&self, title: &str, kind: &str) -> PathBuf {
        let safe: String = title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}_{kind}.txt"))
    }
}

impl ReportExporter for TextReportExporter {
    fn export(&self, title: &str, report: &Report<'_>) -> io::Result<()> {
        let (kind, body) = match report {
            Report::Summary(summary) => ("summary", render_summary(title, summary)),
            Report::Insights(insights) => ("insights", render_insights(title, insights)),
            Report::Readiness(score) => ("readiness", render_readiness(title, score)),
        };
        std::fs::create_dir_all(&self.dir)?;
        let path = self.target_path(title, kind);
        std::fs::write(&path, body)?;
        log::info!("exported {kind} report to {}", path.display());
        Ok(())
    }
}

fn section(out: &mut String, heading: &str) {
    out.push_str(heading);
    out.push('\n');
    out.push_str(&"-".repeat(heading.len()));
    out.push('\n');
}

fn bullet_list(out: &mut String, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {item}\n", i + 1));
    }
    out.push('\n');
}

fn render_summary(title: &str, summary: &DocumentSummary) -> String {
    let mut out = String::new();
    section(&mut out, "Research Paper Summary");
    out.push_str(&format!("{title}\n\n"));

    section(&mut out, "Abstract");
    out.push_str(&format!("{}\n\n", summary.abstract_text));

    section(&mut out, "Key Findings");
    bullet_list(&mut out, &summary.findings);

    section(&mut out, "Methodology");
    out.push_str(&format!("{}\n\n", summary.methodology));

    section(&mut out, "Limitations");
    out.push_str(&format!("{}\n", summary.limitations));
    out
}

fn render_insights(title: &str, insights: &DocumentInsights) -> String {
    let mut out = String::new();
    section(&mut out, "Research Paper Insights");
    out.push_str(&format!("{title}\n\n"));

    section(&mut out, "Key Concepts");
    bullet_list(&mut out, &insights.key_concepts);

    section(&mut out, "Objectives");
    bullet_list(&mut out, &insights.objectives);

    section(&mut out, "Results");
    bullet_list(&mut out, &insights.results);

    section(&mut out, "Conclusions");
    bullet_list(&mut out, &insights.conclusions);
    out
}

fn render_readiness(title: &str, score: &ReadinessScore) -> String {
    let mut out = String::new();
    section(&mut out, "Research Readiness Report");
    out.push_str(&format!("{title}\n\n"));
    out.push_str(&format!(
        "Overall: {}/100 ({})\n\n",
        score.average(),
        score.final_verdict
    ));

    section(&mut out, "Detailed Scores");
    out.push_str(&format!("Novelty: {:.0}\n", score.novelty_score));
    out.push_str(&format!("Technical Depth: {:.0}\n", score.technical_depth_score));
    out.push_str(&format!(
        "Experimental Rigor: {:.0}\n",
        score.experimental_rigor_score
    ));
    out.push_str(&format!(
        "Literature Coverage: {:.0}\n",
        score.literature_coverage_score
    ));
    out.push_str(&format!(
        "Publication Readiness: {:.0}\n\n",
        score.publication_readiness_score
    ));

    section(&mut out, "Strengths");
    bullet_list(&mut out, &score.strengths);

    section(&mut out, "Weaknesses");
    bullet_list(&mut out, &score.weaknesses);

    section(&mut out, "Improvement Suggestions");
    bullet_list(&mut out, &score.suggestions);

    section(&mut out, "Suitable Publication Venues");
    bullet_list(&mut out, &score.suitable_venues);
    out
}

/// Directory used by default when nothing else is configured.
pub fn default_export_dir(base: &Path) -> PathBuf {
    base.join("reports")
}
