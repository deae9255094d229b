use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use dodgeball_game::Trajectory;

use super::{GameRecord, SweepAggregate, SweepPlan};

#[derive(Serialize)]
struct JsonReport<'a> {
    plan: &'a SweepPlan,
    aggregate: &'a SweepAggregate,
    records: &'a [GameRecord],
}

fn percent(rate: f64) -> f64 {
    rate * 100.0
}

fn describe_timeout(plan: &SweepPlan) -> String {
    plan.config
        .timeout
        .map_or_else(|| "none".to_string(), |t| format!("{t}"))
}

pub fn generate_console_report<W: Write>(
    mut writer: W,
    plan: &SweepPlan,
    aggregate: &SweepAggregate,
    records: &[GameRecord],
    verbose: bool,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Sweep Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "========================".cyan())?;

    writeln!(
        writer,
        "Matchup: {} vs {} ({} profile, pe {}, pj {})",
        plan.team_one.label().bold(),
        plan.team_two.label().bold(),
        format!("{:?}", plan.profile).to_lowercase(),
        plan.pe,
        plan.pj
    )?;
    writeln!(
        writer,
        "Roster: {}  Rate: {}  Timeout: {}",
        plan.config.roster,
        plan.config.rate,
        describe_timeout(plan)
    )?;
    writeln!(
        writer,
        "Games: {} ({} completed, {} failed, {} stalled)",
        aggregate.games,
        aggregate.completed.to_string().green(),
        aggregate.failed.to_string().red(),
        aggregate.stalled
    )?;
    writeln!(
        writer,
        "Team 1 wins: {} ({:.1}%)",
        aggregate.team_one_wins,
        percent(aggregate.team_one_win_rate)
    )?;
    writeln!(
        writer,
        "Team 2 wins: {} ({:.1}%)",
        aggregate.team_two_wins,
        percent(aggregate.team_two_win_rate)
    )?;
    writeln!(
        writer,
        "Timeouts: {} ({:.1}%)",
        aggregate.timeouts,
        percent(aggregate.timeout_rate)
    )?;
    if aggregate.transition_limits > 0 {
        writeln!(writer, "Transition limits hit: {}", aggregate.transition_limits)?;
    }
    writeln!(
        writer,
        "Game length: {:.4} ± {:.4}",
        aggregate.mean_length, aggregate.std_length
    )?;
    writeln!(writer, "Mean transitions: {:.2}", aggregate.mean_transitions)?;
    writeln!(writer, "Total time: {total_duration:?}")?;

    if verbose {
        writeln!(writer)?;
        writeln!(writer, "{}", "🎲 Runs".bright_yellow().bold())?;
        writeln!(writer, "{}", "=======".yellow())?;
        for record in records {
            let status = if record.failed() {
                "❌".red()
            } else {
                "✅".green()
            };
            write!(
                writer,
                "{status} seed {} #{} {}",
                record.seed,
                record.iteration,
                record.outcome_label()
            )?;
            if let Some(summary) = &record.summary {
                write!(
                    writer,
                    " at t = {:.4} {} after {} transitions",
                    summary.final_time, summary.final_state, summary.transitions
                )?;
            }
            if let Some(failure) = &record.failure {
                write!(writer, ": {}", failure.message.red())?;
            }
            writeln!(writer)?;
        }
    }

    Ok(())
}

pub fn generate_json_report<W: Write>(
    mut writer: W,
    plan: &SweepPlan,
    aggregate: &SweepAggregate,
    records: &[GameRecord],
) -> Result<()> {
    let report = JsonReport {
        plan,
        aggregate,
        records,
    };
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(
    mut writer: W,
    plan: &SweepPlan,
    aggregate: &SweepAggregate,
    records: &[GameRecord],
) -> Result<()> {
    writeln!(writer, "# Dodgeball Sweep Results\n")?;

    writeln!(writer, "## Setup\n")?;
    writeln!(
        writer,
        "- **Matchup**: {} vs {}",
        plan.team_one, plan.team_two
    )?;
    writeln!(
        writer,
        "- **Probabilities**: {:?} profile, pe {}, pj {}",
        plan.profile, plan.pe, plan.pj
    )?;
    writeln!(
        writer,
        "- **Roster**: {}, **rate**: {}, **timeout**: {}",
        plan.config.roster,
        plan.config.rate,
        describe_timeout(plan)
    )?;
    writeln!(
        writer,
        "- **Seeds**: {} × {} iterations\n",
        plan.seeds.len(),
        plan.iterations
    )?;

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "| --- | --- |")?;
    writeln!(writer, "| Games | {} |", aggregate.games)?;
    writeln!(writer, "| Failed | {} |", aggregate.failed)?;
    writeln!(writer, "| Stalled | {} |", aggregate.stalled)?;
    writeln!(
        writer,
        "| Team 1 win rate | {:.1}% |",
        percent(aggregate.team_one_win_rate)
    )?;
    writeln!(
        writer,
        "| Team 2 win rate | {:.1}% |",
        percent(aggregate.team_two_win_rate)
    )?;
    writeln!(
        writer,
        "| Timeout rate | {:.1}% |",
        percent(aggregate.timeout_rate)
    )?;
    writeln!(
        writer,
        "| Game length | {:.4} ± {:.4} |",
        aggregate.mean_length, aggregate.std_length
    )?;
    writeln!(
        writer,
        "| Mean transitions | {:.2} |",
        aggregate.mean_transitions
    )?;

    let failures: Vec<&GameRecord> = records.iter().filter(|r| r.failed()).collect();
    if !failures.is_empty() {
        writeln!(writer, "\n## Failures\n")?;
        for record in failures {
            if let Some(failure) = &record.failure {
                writeln!(
                    writer,
                    "- seed {} #{}: {}",
                    record.seed, record.iteration, failure.message
                )?;
            }
        }
    }
    Ok(())
}

pub fn generate_csv_report<W: Write>(mut writer: W, records: &[GameRecord]) -> Result<()> {
    writeln!(
        writer,
        "seed,iteration,run_seed,outcome,team1,team2,final_time,transitions,error"
    )?;
    for record in records {
        let (team1, team2, time, transitions) = record.summary.as_ref().map_or_else(
            || (String::new(), String::new(), String::new(), String::new()),
            |s| {
                (
                    s.final_state.court[0].to_string(),
                    s.final_state.court[1].to_string(),
                    format!("{:.6}", s.final_time),
                    s.transitions.to_string(),
                )
            },
        );
        let error = record
            .failure
            .as_ref()
            .map_or_else(String::new, |f| csv_field(&f.message));
        writeln!(
            writer,
            "{},{},{},{},{team1},{team2},{time},{transitions},{error}",
            record.seed,
            record.iteration,
            record.run_seed,
            record.outcome_label()
        )?;
    }
    Ok(())
}

/// One row per snapshot, starting at `t = 0`.
pub fn generate_trajectory_csv<W: Write>(mut writer: W, trajectory: &Trajectory) -> Result<()> {
    writeln!(writer, "time,team1,team2")?;
    for (time, state) in trajectory.iter() {
        writeln!(writer, "{time:.6},{},{}", state.court[0], state.court[1])?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Profile;
    use crate::logic::sweep::RunFailure;
    use dodgeball_game::{
        GameState, RunSummary, SimulationConfig, StrategyId, Team, Termination,
    };

    fn plan() -> SweepPlan {
        SweepPlan {
            config: SimulationConfig::new(3).with_timeout(50.0),
            team_one: StrategyId::Heuristic,
            team_two: StrategyId::Aggressive,
            profile: Profile::Linear,
            pe: 0.8,
            pj: 0.4,
            seeds: vec![7],
            iterations: 2,
            capture_trajectory: false,
        }
    }

    fn records() -> Vec<GameRecord> {
        vec![
            GameRecord {
                seed: 7,
                iteration: 0,
                run_seed: 11,
                summary: Some(RunSummary {
                    final_state: GameState::from_counts(2, 0),
                    final_time: 1.5,
                    termination: Termination::Elimination { winner: Team::One },
                    transitions: 5,
                    draws: 10,
                }),
                failure: None,
            },
            GameRecord {
                seed: 7,
                iteration: 1,
                run_seed: 12,
                summary: None,
                failure: Some(RunFailure {
                    message: "stalled at (3, 3)".to_string(),
                    stalled: true,
                }),
            },
        ]
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn console_report_lists_rates_and_runs() {
        let records = records();
        let aggregate = SweepAggregate::from_records(&records);
        let text = render(|w| {
            generate_console_report(w, &plan(), &aggregate, &records, true, Duration::ZERO)
        });
        assert!(text.contains("Sweep Results Summary"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("team 1 wins"));
        assert!(text.contains("stalled at (3, 3)"));
    }

    #[test]
    fn json_report_round_trips_through_serde() {
        let records = records();
        let aggregate = SweepAggregate::from_records(&records);
        let text = render(|w| generate_json_report(w, &plan(), &aggregate, &records));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["aggregate"]["games"], 2);
        assert_eq!(value["aggregate"]["stalled"], 1);
        assert_eq!(value["plan"]["team_two"], "aggressive");
        assert_eq!(value["plan"]["profile"], "linear");
        assert_eq!(
            value["records"][0]["summary"]["termination"]["kind"],
            "elimination"
        );
        assert!(value["records"][1].get("summary").is_none());
    }

    #[test]
    fn markdown_report_has_summary_and_failures() {
        let records = records();
        let aggregate = SweepAggregate::from_records(&records);
        let text = render(|w| generate_markdown_report(w, &plan(), &aggregate, &records));
        assert!(text.starts_with("# Dodgeball Sweep Results"));
        assert!(text.contains("| Games | 2 |"));
        assert!(text.contains("## Failures"));
    }

    #[test]
    fn csv_report_quotes_messages_with_commas() {
        let text = render(|w| generate_csv_report(w, &records()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("seed,iteration"));
        assert_eq!(lines[1], "7,0,11,team 1 wins,2,0,1.500000,5,");
        assert_eq!(lines[2], "7,1,12,stalled,,,,,\"stalled at (3, 3)\"");
    }

    #[test]
    fn trajectory_csv_starts_at_zero() {
        let probs = dodgeball_game::HitProbabilities::constant(0.6, 0.3);
        let result = dodgeball_game::simulate(
            &SimulationConfig::new(2).trajectory(),
            &mut dodgeball_game::Heuristic,
            &mut dodgeball_game::Heuristic,
            &probs,
            dodgeball_game::game_rng(3),
        )
        .unwrap();
        let trajectory = result.trajectory().unwrap();
        let text = render(|w| generate_trajectory_csv(w, trajectory));
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time,team1,team2"));
        assert_eq!(lines.next(), Some("0.000000,2,2"));
        assert_eq!(text.lines().count(), trajectory.len() + 1);
    }
}
