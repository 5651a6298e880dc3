//! Episode aggregates for policy evaluation: success rate, path-cost
//! ratio against the optimum, turning and collision counts, and step
//! latency percentiles. Plain data, no logging.

use crate::env::Environment;
use crate::policy::closed_loop_reference;

/// The outcome of one finished episode.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeRecord {
    pub reached_goal: bool,
    pub steps: u32,
    /// Shortest start-to-goal cost, if the goal was reachable at all.
    pub optimal_cost: Option<usize>,
    pub turns: u32,
    pub collisions: u32,
    pub last_latency_ms: f64,
}

/// Ratio charged to an episode that never reached the goal. Large enough
/// to dominate any real ratio, finite enough to keep means meaningful.
const FAILED_RATIO: f32 = 999.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalSummary {
    pub episodes: usize,
    pub success_rate: f32,
    pub path_cost_ratio_mean: f32,
    pub turns_mean: f32,
    pub collisions_mean: f32,
    pub latency_ms_p50: f64,
    pub latency_ms_p95: f64,
}

impl EvalSummary {
    /// Aggregate finished episodes. Records without a known optimal cost
    /// cannot be rated and are skipped entirely.
    pub fn from_records(records: &[EpisodeRecord]) -> Self {
        let rated: Vec<&EpisodeRecord> =
            records.iter().filter(|r| r.optimal_cost.is_some()).collect();
        if rated.is_empty() {
            return Self::default();
        }

        let n = rated.len() as f32;
        let successes = rated.iter().filter(|r| r.reached_goal).count();

        let ratio_sum: f32 = rated
            .iter()
            .map(|r| {
                if r.reached_goal {
                    let optimal = r.optimal_cost.unwrap_or(1).max(1);
                    r.steps as f32 / optimal as f32
                } else {
                    FAILED_RATIO
                }
            })
            .sum();

        let mut latencies: Vec<f64> = rated.iter().map(|r| r.last_latency_ms).collect();
        latencies.sort_by(f64::total_cmp);

        Self {
            episodes: rated.len(),
            success_rate: successes as f32 / n,
            path_cost_ratio_mean: ratio_sum / n,
            turns_mean: rated.iter().map(|r| r.turns as f32).sum::<f32>() / n,
            collisions_mean: rated.iter().map(|r| r.collisions as f32).sum::<f32>() / n,
            latency_ms_p50: percentile(&latencies, 0.50),
            latency_ms_p95: percentile(&latencies, 0.95),
        }
    }
}

/// Nearest-rank percentile over an already sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((sorted.len() as f64) * q).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Roll the closed-loop reference policy for `episodes` episodes and
/// aggregate the outcomes. Episodes whose goal is unreachable from the
/// start are skipped by the aggregation, mirroring how evaluation treats
/// them as unratable rather than failed.
pub fn evaluate_reference(env: &mut Environment, episodes: usize) -> EvalSummary {
    let mut records = Vec::with_capacity(episodes);

    for _ in 0..episodes {
        env.reset();
        let optimal_cost = env.optimal_path_cost();

        let mut turns = 0u32;
        let mut last_latency_ms = 0.0;
        while !env.is_done() {
            let Some(action) = closed_loop_reference(env) else {
                break;
            };
            if action.is_turn() {
                turns += 1;
            }
            let out = env.step(action);
            last_latency_ms = out.info.latency_ms;
        }

        records.push(EpisodeRecord {
            reached_goal: env.robot().position() == env.maze().goal(),
            steps: env.steps(),
            optimal_cost,
            turns,
            collisions: env.collisions(),
            last_latency_ms,
        });
    }

    EvalSummary::from_records(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnvConfig;

    fn record(reached: bool, steps: u32, optimal: Option<usize>) -> EpisodeRecord {
        EpisodeRecord {
            reached_goal: reached,
            steps,
            optimal_cost: optimal,
            turns: 4,
            collisions: 1,
            last_latency_ms: 0.5,
        }
    }

    #[test]
    fn aggregates_simple_records() {
        let records = [record(true, 10, Some(10)), record(true, 15, Some(10))];
        let summary = EvalSummary::from_records(&records);
        assert_eq!(summary.episodes, 2);
        assert_eq!(summary.success_rate, 1.0);
        assert!((summary.path_cost_ratio_mean - 1.25).abs() < 1e-6);
        assert_eq!(summary.turns_mean, 4.0);
        assert_eq!(summary.collisions_mean, 1.0);
    }

    #[test]
    fn failures_charge_the_sentinel_ratio() {
        let records = [record(true, 10, Some(10)), record(false, 50, Some(10))];
        let summary = EvalSummary::from_records(&records);
        assert_eq!(summary.success_rate, 0.5);
        assert!((summary.path_cost_ratio_mean - 500.0).abs() < 1e-3);
    }

    #[test]
    fn unratable_records_are_skipped() {
        let records = [record(true, 10, Some(10)), record(false, 0, None)];
        let summary = EvalSummary::from_records(&records);
        assert_eq!(summary.episodes, 1);
        assert_eq!(summary.success_rate, 1.0);

        assert_eq!(EvalSummary::from_records(&[]), EvalSummary::default());
    }

    #[test]
    fn percentiles_use_nearest_rank() {
        let sorted: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_eq!(percentile(&sorted, 0.50), 5.0);
        assert_eq!(percentile(&sorted, 0.95), 10.0);
        assert_eq!(percentile(&[3.0], 0.95), 3.0);
    }

    #[test]
    fn reference_policy_evaluates_cleanly_without_noise() {
        let mut env = Environment::new(EnvConfig {
            rows: 6,
            cols: 6,
            seed: 41,
            slip_p: 0.0,
            turn_error_p: 0.0,
            ..EnvConfig::default()
        })
        .unwrap();

        let summary = evaluate_reference(&mut env, 5);
        assert_eq!(summary.episodes, 5);
        assert_eq!(summary.success_rate, 1.0);
        // Noise-free reference runs never collide and never beat the optimum.
        assert_eq!(summary.collisions_mean, 0.0);
        assert!(summary.path_cost_ratio_mean >= 1.0);
    }
}
