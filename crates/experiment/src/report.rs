#![allow(clippy::format_push_string)]

use crate::analyzer::AnalysisReport;
use crate::hypothesis::percent;

/// Critical value for the 95% Wilson interval shown next to each group.
const WILSON_Z_95: f64 = 1.96;

const RULE: &str = "===============================================================\n";
const SECTION: &str = "---------------------------------------------------------------\n";

pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders an analysis report as plain text.
    #[must_use]
    pub fn format(report: &AnalysisReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("              A/B TEST: LANDING PAGE CONVERSION                \n");
        output.push_str(RULE);
        output.push_str(&format!(
            "Generated: {}\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push('\n');

        output.push_str("RAW DATA PREVIEW\n");
        output.push_str(SECTION);
        output.push_str(&format!(
            "{:<12} {:<12} {:<14} {}\n",
            "user_id", "group", "landing_page", "converted"
        ));
        for record in &report.preview {
            output.push_str(&format!(
                "{:<12} {:<12} {:<14} {}\n",
                record.user_id,
                record.group,
                record.landing_page,
                u8::from(record.converted)
            ));
        }
        output.push('\n');

        output.push_str("DATA CLEANING\n");
        output.push_str(SECTION);
        output.push_str(&format!(
            "Initial shape:                       {:?}\n",
            report.raw_shape
        ));
        output.push_str(&format!(
            "Shape after removing duplicate users: {:?}\n",
            report.cleaned_shape
        ));
        output.push_str(&format!(
            "Duplicate users dropped:             {} ({} rows)\n",
            report.cleaning.duplicate_users,
            report.cleaning.removed()
        ));
        output.push('\n');

        output.push_str("CONVERSION RATE BY GROUP\n");
        output.push_str(SECTION);
        output.push_str(&Self::format_group_table(&report.group_stats));
        output.push('\n');

        output.push_str("Z TEST FOR DIFFERENCE IN CONVERSION RATES\n");
        output.push_str(SECTION);
        output.push_str(&format!("Z statistic:    {:.4}\n", report.test.z_statistic));
        output.push_str(&format!("P value:        {:.4}\n", report.test.p_value));
        output.push_str(&format!("Alpha:          {:.2}\n", report.alpha));
        output.push_str(&format!("{}\n", report.verdict()));
        output.push('\n');

        if let Some(sim) = &report.simulation {
            output.push_str(&format!(
                "SIMULATED {} PERCENT CONVERSION FOR TREATMENT\n",
                percent(sim.target_rate)
            ));
            output.push_str(SECTION);
            output.push_str(&format!(
                "Treatment conversions: {} -> {} of {} ({} rows flipped)\n",
                sim.previous_successes,
                sim.previous_successes + sim.rows_flipped,
                sim.treatment_rows,
                sim.rows_flipped
            ));
            output.push_str(&Self::format_group_table(&sim.group_stats));
            output.push_str(&format!(
                "Simulated Z statistic: {:.4}\n",
                sim.test.z_statistic
            ));
            output.push_str(&format!("Simulated P value:     {:.4}\n", sim.test.p_value));
            output.push_str(&format!("{}\n", sim.verdict()));
            output.push('\n');
        }

        output.push_str(RULE);
        output
    }

    fn format_group_table(
        stats: &std::collections::BTreeMap<String, crate::aggregate::GroupStats>,
    ) -> String {
        let mut output = format!(
            "{:<12} {:>8} {:>8} {:>10}   {}\n",
            "group", "count", "sum", "rate", "Wilson 95% CI"
        );
        for (group, s) in stats {
            let (lower, upper) = s.wilson_interval(WILSON_Z_95);
            output.push_str(&format!(
                "{:<12} {:>8} {:>8} {:>9.2}%   [{:.2}%, {:.2}%]\n",
                group,
                s.count,
                s.successes,
                s.conversion_rate * 100.0,
                lower * 100.0,
                upper * 100.0
            ));
        }
        output
    }
}
