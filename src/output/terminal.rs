//! Terminal output formatting for analysis reports.

use colored::Colorize;

use crate::result::{Report, Round};

/// Format a Report for human-readable terminal output.
///
/// One block per round, in the layout the round loop logs: winner,
/// significance, threshold, window, use-percentage, efficiency, deadtime,
/// and the cumulative totals.
pub fn format_report(report: &Report) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("hveto\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!("  Primary: {}\n", report.primary_channel));
    output.push_str(&format!(
        "  Livetime: {:.1} s over {} segments\n",
        report.livetime,
        report.analysis_segments.len()
    ));
    output.push_str(&format!("  Primary events: {}\n", report.primary_count));
    output.push('\n');

    if report.rounds.is_empty() {
        output.push_str(&format!(
            "  {}\n",
            "No round reached the minimum significance".yellow().bold()
        ));
        output.push_str(&sep);
        output.push('\n');
        return output;
    }

    for round in &report.rounds {
        output.push_str(&format_round(round));
        output.push('\n');
    }

    output.push_str(&sep);
    output.push('\n');
    output.push_str(&format!(
        "  Total efficiency: {}\n",
        format!("{:.2}%", report.total_efficiency() * 100.0).green().bold()
    ));
    output.push_str(&format!(
        "  Total deadtime:   {:.2}%\n",
        report.total_deadtime() * 100.0
    ));
    output
}

fn format_round(round: &Round) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {} {}\n",
        format!("Round {}:", round.n).bold(),
        round.winner.name.cyan()
    ));
    out.push_str(&format!(
        "    significance: {:.2}  (mu {:.4})\n",
        round.winner.significance, round.winner.mu
    ));
    out.push_str(&format!(
        "    snr >= {}  window +/-{} s\n",
        round.winner.snr, round.winner.window
    ));
    out.push_str(&format!(
        "    use-percentage: {}/{} ({:.1}%)\n",
        round.use_percentage.0,
        round.use_percentage.1,
        round.use_fraction() * 100.0
    ));
    out.push_str(&format!(
        "    efficiency: {}/{} ({:.1}%)  deadtime: {:.2}/{:.1} s ({:.2}%)\n",
        round.efficiency.0,
        round.efficiency.1,
        round.efficiency_fraction() * 100.0,
        round.deadtime.0,
        round.deadtime.1,
        round.deadtime_fraction() * 100.0
    ));
    out.push_str(&format!(
        "    cumulative: {:.1}% efficiency, {:.2}% deadtime\n",
        round.cum_efficiency_fraction() * 100.0,
        round.cum_deadtime_fraction() * 100.0
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Winner;
    use crate::segments::{Segment, SegmentList};
    use std::collections::BTreeMap;

    fn make_report(rounds: Vec<Round>) -> Report {
        Report {
            primary_channel: "X1:PRIMARY".to_string(),
            analysis_segments: SegmentList::from(Segment::new(0.0, 1000.0)),
            livetime: 1000.0,
            primary_count: 100,
            rounds,
        }
    }

    fn make_round() -> Round {
        Round {
            n: 1,
            primary_channel: "X1:PRIMARY".to_string(),
            rank_column: "snr".to_string(),
            segments: SegmentList::from(Segment::new(0.0, 1000.0)),
            winner: Winner {
                name: "X1:AUX-A".to_string(),
                snr: 8.0,
                window: 0.5,
                significance: 12.3,
                mu: 0.5,
            },
            vetoes: SegmentList::from(Segment::new(10.0, 12.0)),
            efficiency: (20, 100),
            use_percentage: (5, 10),
            deadtime: (2.0, 1000.0),
            cum_efficiency: (20, 100),
            cum_deadtime: (2.0, 1000.0),
            significances: BTreeMap::new(),
        }
    }

    #[test]
    fn test_format_report_with_rounds() {
        let text = format_report(&make_report(vec![make_round()]));
        assert!(text.contains("X1:PRIMARY"));
        assert!(text.contains("Round 1:"));
        assert!(text.contains("X1:AUX-A"));
        assert!(text.contains("12.30"));
        assert!(text.contains("20/100"));
    }

    #[test]
    fn test_format_empty_report() {
        let text = format_report(&make_report(vec![]));
        assert!(text.contains("No round reached the minimum significance"));
    }
}
