use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::report::{MetricReport, VelocityReport};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "markdown" | "md" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
    #[error(transparent)]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub struct ReportRenderer {
    template_engine: Handlebars<'static>,
    format: OutputFormat,
}

impl ReportRenderer {
    pub fn new(format: OutputFormat) -> Result<Self, ReportError> {
        let mut template_engine = Handlebars::new();
        template_engine
            .register_template_string("report", include_str!("../../templates/report.md.hbs"))
            .map_err(Box::new)?;

        Ok(Self {
            template_engine,
            format,
        })
    }

    pub fn render(&self, report: &VelocityReport) -> Result<String, ReportError> {
        match self.format {
            OutputFormat::Text => self.render_text(report),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Html => self.render_html(report),
        }
    }

    fn render_text(&self, report: &VelocityReport) -> Result<String, ReportError> {
        let data = json!({
            "repo": format!("{}/{}", report.owner, report.repo),
            "author_filter": report.author_filter,
            "generated_at": report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            "releases": Self::metric_data(&report.releases),
            "pr_merges": Self::metric_data(&report.pr_merges),
        });

        Ok(self.template_engine.render("report", &data)?)
    }

    fn metric_data(metric: &MetricReport) -> serde_json::Value {
        json!({
            "target": metric.target,
            "rolling_30_day_count": metric.rolling_30_day_count,
            "current_month_count": metric.current_month_count,
            "days_elapsed": metric.days_elapsed,
            "days_in_month": metric.days_in_month,
            "projection": format!("{:.2}", metric.projection),
            "percent_vs_target": format!("{:+.0}", metric.percent_vs_target),
            "monthly_history": metric.monthly_history,
        })
    }

    fn render_html(&self, report: &VelocityReport) -> Result<String, ReportError> {
        // The text format is markdown, so conversion is direct.
        let markdown = self.render_text(report)?;
        let parser = pulldown_cmark::Parser::new(&markdown);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Velocity: {}/{}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; max-width: 900px; margin: 0 auto; padding: 20px; }}
        h1, h2, h3 {{ border-bottom: 1px solid #e1e4e8; padding-bottom: 0.3em; }}
        code {{ background: #f6f8fa; padding: 2px 4px; border-radius: 3px; }}
    </style>
</head>
<body>
    {}
</body>
</html>"#,
            report.owner, report.repo, html
        ))
    }
}
