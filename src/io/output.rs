use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::io::Write;

use crate::core::Customer;
use crate::engine::CustomerIntelligence;
use crate::onboarding::total_time;
use crate::risk::{RiskLabel, Urgency};
use crate::trend::RiskTrend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

pub trait OutputWriter {
    fn write_intelligence(&mut self, report: &CustomerIntelligence) -> anyhow::Result<()>;
}

pub fn create_writer<'a, W: Write + 'a>(
    format: OutputFormat,
    writer: W,
) -> Box<dyn OutputWriter + 'a> {
    match format {
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
    }
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_intelligence(&mut self, report: &CustomerIntelligence) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_header(&mut self, report: &CustomerIntelligence) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "{}",
            format!("Customer Intelligence: {} ({})", report.customer_name, report.customer_id)
                .bold()
        )?;
        writeln!(
            self.writer,
            "Generated {} with rules {}",
            report.generated_at.format("%Y-%m-%d %H:%M UTC"),
            report.rules_version
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_risk(&mut self, report: &CustomerIntelligence) -> anyhow::Result<()> {
        let risk = &report.risk;
        writeln!(self.writer, "{}", "CHURN RISK".bold().underline())?;
        writeln!(
            self.writer,
            "  {} risk, score {}/100, trend {}",
            colored_label(risk.label),
            risk.score,
            colored_trend(report.trend)
        )?;
        writeln!(self.writer, "  {}", risk.summary)?;
        writeln!(
            self.writer,
            "  Review within {} days",
            risk.review_within_days
        )?;

        for signal in &risk.signals {
            writeln!(
                self.writer,
                "  - {} (+{:.0}): {}",
                signal.name, signal.contribution, signal.explanation
            )?;
        }

        if !risk.interventions.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "  Interventions:")?;
            for intervention in &risk.interventions {
                writeln!(
                    self.writer,
                    "  [{}] {}",
                    colored_urgency(intervention.urgency),
                    intervention.action
                )?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_recommendations(&mut self, report: &CustomerIntelligence) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "RECOMMENDATIONS".bold().underline())?;
        if report.recommendations.is_empty() {
            writeln!(
                self.writer,
                "  No adoption gaps: every eligible feature is in regular use."
            )?;
            writeln!(self.writer)?;
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "Feature", "Why", "Action", "Impact", "Confidence"]);
        for rec in &report.recommendations {
            table.add_row(vec![
                Cell::new(rec.priority),
                Cell::new(format!("{}\n({})", rec.feature_name, rec.category)),
                Cell::new(&rec.reason),
                Cell::new(&rec.suggested_action),
                Cell::new(&rec.expected_impact),
                Cell::new(format!("{:.0}%", rec.confidence * 100.0)),
            ]);
        }
        writeln!(self.writer, "{}", table)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_onboarding(&mut self, report: &CustomerIntelligence) -> anyhow::Result<()> {
        if report.onboarding.is_empty() {
            return Ok(());
        }
        writeln!(
            self.writer,
            "{} ({} min total)",
            "ONBOARDING PLAN".bold().underline(),
            total_time(&report.onboarding).as_secs() / 60
        )?;
        for step in &report.onboarding {
            writeln!(
                self.writer,
                "  {}. {} [{} min]",
                step.step_number,
                step.what,
                step.estimated_time.as_secs() / 60
            )?;
            writeln!(self.writer, "     Why: {}", step.why)?;
            writeln!(self.writer, "     Do:  {}", step.action)?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_intelligence(&mut self, report: &CustomerIntelligence) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_risk(report)?;
        self.write_recommendations(report)?;
        self.write_onboarding(report)?;
        Ok(())
    }
}

/// Table of known customers for the `list` command.
pub fn write_customer_list<W: Write>(writer: &mut W, customers: &[Customer]) -> anyhow::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Plan", "MRR", "Age (days)", "Account manager"]);
    for customer in customers {
        table.add_row(vec![
            Cell::new(&customer.id),
            Cell::new(&customer.name),
            Cell::new(customer.plan),
            Cell::new(format!("${:.0}", customer.mrr)),
            Cell::new(customer.account_age_days),
            Cell::new(customer.account_manager.as_deref().unwrap_or("-")),
        ]);
    }
    writeln!(writer, "{}", table)?;
    Ok(())
}

fn colored_label(label: RiskLabel) -> ColoredString {
    match label {
        RiskLabel::High => label.to_string().red().bold(),
        RiskLabel::Medium => label.to_string().yellow().bold(),
        RiskLabel::Low => label.to_string().green().bold(),
    }
}

fn colored_urgency(urgency: Urgency) -> ColoredString {
    match urgency {
        Urgency::High => urgency.to_string().red(),
        Urgency::Medium => urgency.to_string().yellow(),
        Urgency::Low => urgency.to_string().normal(),
    }
}

fn colored_trend(trend: RiskTrend) -> ColoredString {
    match trend {
        RiskTrend::Increasing => trend.to_string().red(),
        RiskTrend::Decreasing => trend.to_string().green(),
        RiskTrend::Stable | RiskTrend::Unknown => trend.to_string().normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;
    use crate::data::{demo::demo_dataset, InMemoryDataSource};
    use crate::engine::IntelligenceEngine;
    use crate::trend::InMemoryTrendStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn report(customer_id: &str) -> CustomerIntelligence {
        let as_of = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let engine = IntelligenceEngine::new(
            Arc::new(InMemoryDataSource::from_dataset(demo_dataset(as_of)).unwrap()),
            Arc::new(InMemoryTrendStore::new(10, 5.0)),
            RuleSet::default(),
        );
        engine.analyze_customer_at(customer_id, as_of).unwrap()
    }

    #[test]
    fn test_json_output_parses_back() {
        let report = report("cust_003");
        let mut buffer = Vec::new();
        create_writer(OutputFormat::Json, &mut buffer)
            .write_intelligence(&report)
            .unwrap();
        let parsed: CustomerIntelligence = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.customer_id, report.customer_id);
        assert_eq!(parsed.risk.score, report.risk.score);
        assert_eq!(parsed.onboarding, report.onboarding);
        assert_eq!(parsed.recommendations.len(), report.recommendations.len());
    }

    #[test]
    fn test_terminal_output_sections() {
        let report = report("cust_003");
        let mut buffer = Vec::new();
        create_writer(OutputFormat::Terminal, &mut buffer)
            .write_intelligence(&report)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Legacy Systems Co"));
        assert!(text.contains("CHURN RISK"));
        assert!(text.contains("RECOMMENDATIONS"));
        assert!(text.contains("ONBOARDING PLAN"));
    }

    #[test]
    fn test_customer_list_has_every_customer() {
        let as_of = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let source = InMemoryDataSource::from_dataset(demo_dataset(as_of)).unwrap();
        let mut buffer = Vec::new();
        write_customer_list(&mut buffer, &crate::data::DataAccess::list_customers(&source))
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        for id in ["cust_001", "cust_002", "cust_003", "cust_004", "cust_005"] {
            assert!(text.contains(id));
        }
    }
}
