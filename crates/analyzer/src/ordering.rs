//! Step 7: topological leveling of pipelines by `depends_on` edges.
//!
//! Plain `petgraph::algo::toposort` refuses to run at all once a cycle
//! exists; pipeline dependency graphs built from real ETL exports do
//! sometimes contain one (a circular reference through a shared staging
//! table). Levels are produced with a manual Kahn's-algorithm pass instead,
//! and any pipelines that never reach zero in-degree are flushed into one
//! final level with a warning.

use std::collections::{HashMap, HashSet, VecDeque};

pub struct OrderingResult {
    pub levels: Vec<Vec<String>>,
    pub cycle_detected: bool,
}

impl OrderingResult {
    pub fn execution_order(&self) -> Vec<&str> {
        self.levels.iter().flatten().map(|s| s.as_str()).collect()
    }

    /// 1-based: the first level (no unresolved dependencies) has priority 1.
    pub fn priority_of(&self, pipeline_id: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.iter().any(|id| id == pipeline_id))
            .map(|level| level + 1)
    }
}

/// `upstream[pipeline] = set of pipelines it depends on`. All pipelines that
/// appear as a key or anywhere in a value set are included in the result.
pub fn compute_levels(pipelines: &[String], upstream: &HashMap<String, HashSet<String>>) -> OrderingResult {
    let mut in_degree: HashMap<&str, usize> = pipelines.iter().map(|p| (p.as_str(), 0)).collect();
    let mut downstream: HashMap<&str, Vec<&str>> = HashMap::new();

    for pipeline in pipelines {
        let deps = upstream.get(pipeline).map(|s| s.len()).unwrap_or(0);
        in_degree.insert(pipeline.as_str(), deps);
        if let Some(deps) = upstream.get(pipeline) {
            for dep in deps {
                downstream.entry(dep.as_str()).or_default().push(pipeline.as_str());
            }
        }
    }

    let mut remaining: HashSet<&str> = pipelines.iter().map(|s| s.as_str()).collect();
    let mut levels: Vec<Vec<String>> = Vec::new();

    loop {
        let mut frontier: VecDeque<&str> = remaining
            .iter()
            .copied()
            .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
            .collect();
        if frontier.is_empty() {
            break;
        }
        let mut level: Vec<String> = frontier.iter().map(|s| s.to_string()).collect();
        level.sort();
        for id in frontier.drain(..) {
            remaining.remove(id);
            if let Some(children) = downstream.get(id) {
                for child in children {
                    if let Some(d) = in_degree.get_mut(child) {
                        *d = d.saturating_sub(1);
                    }
                }
            }
        }
        levels.push(level);
    }

    let cycle_detected = !remaining.is_empty();
    if cycle_detected {
        let mut stuck: Vec<String> = remaining.iter().map(|s| s.to_string()).collect();
        stuck.sort();
        tracing::warn!(pipelines = ?stuck, "cycle detected in pipeline dependency graph, flushing into final level");
        levels.push(stuck);
    }

    OrderingResult { levels, cycle_detected }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn linear_chain_produces_one_pipeline_per_level() {
        let pipelines = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut upstream = HashMap::new();
        upstream.insert("b".to_string(), set(&["a"]));
        upstream.insert("c".to_string(), set(&["b"]));

        let result = compute_levels(&pipelines, &upstream);
        assert!(!result.cycle_detected);
        assert_eq!(result.levels, vec![vec!["a".to_string()], vec!["b".to_string()], vec!["c".to_string()]]);
    }

    #[test]
    fn independent_pipelines_share_a_level() {
        let pipelines = vec!["a".to_string(), "b".to_string()];
        let upstream = HashMap::new();

        let result = compute_levels(&pipelines, &upstream);
        assert_eq!(result.levels.len(), 1);
        assert_eq!(result.levels[0].len(), 2);
    }

    #[test]
    fn cycle_is_flushed_into_a_final_level_with_a_flag() {
        let pipelines = vec!["a".to_string(), "b".to_string()];
        let mut upstream = HashMap::new();
        upstream.insert("a".to_string(), set(&["b"]));
        upstream.insert("b".to_string(), set(&["a"]));

        let result = compute_levels(&pipelines, &upstream);
        assert!(result.cycle_detected);
        assert_eq!(result.levels.len(), 1);
        assert_eq!(result.levels[0].len(), 2);
    }
}
