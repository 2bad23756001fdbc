//! Stage orchestration
//!
//! A run is a small DAG of named stages. `after` edges order stages;
//! `notify` edges also order them and make the notified stage
//! refresh-only: it runs only if at least one of its notifiers reported a
//! change.

use std::collections::HashSet;
use thiserror::Error;

/// Errors in the stage graph
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("stage '{0}' is defined twice")]
    Duplicate(String),

    #[error("stage '{stage}' refers to unknown stage '{target}'")]
    Unknown { stage: String, target: String },

    #[error("stage dependency cycle involving: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// One named stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    /// Stages that must run first
    pub after: Vec<String>,
    /// Stages to refresh when this one changes something
    pub notify: Vec<String>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            after: Vec::new(),
            notify: Vec::new(),
        }
    }

    pub fn after(mut self, stage: impl Into<String>) -> Self {
        self.after.push(stage.into());
        self
    }

    pub fn notify(mut self, stage: impl Into<String>) -> Self {
        self.notify.push(stage.into());
        self
    }
}

/// What a stage reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Changed,
    Unchanged,
}

/// What happened to a stage during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Ran(StageOutcome),
    /// Refresh-only and nothing notified it
    NotNotified,
}

/// Stage graph; validated when ordered
#[derive(Debug, Clone, Default)]
pub struct StageGraph {
    stages: Vec<Stage>,
}

impl StageGraph {
    pub const fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// The standard install, configure, restart pipeline
    pub fn standard() -> Self {
        Self::new(vec![
            Stage::new("install"),
            Stage::new("configure").after("install").notify("restart"),
            Stage::new("restart").after("configure"),
        ])
    }

    /// Stages that notify `name`
    pub fn notifiers(&self, name: &str) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.notify.iter().any(|n| n == name))
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Topological order; ties keep definition order
    pub fn order(&self) -> Result<Vec<&str>, StageError> {
        self.check_references()?;

        let mut done: Vec<&str> = Vec::with_capacity(self.stages.len());
        let mut placed: HashSet<&str> = HashSet::new();

        while done.len() < self.stages.len() {
            let next = self.stages.iter().find(|s| {
                !placed.contains(s.name.as_str())
                    && self.predecessors(&s.name).all(|p| placed.contains(p))
            });
            match next {
                Some(stage) => {
                    placed.insert(&stage.name);
                    done.push(&stage.name);
                }
                None => {
                    let stuck = self
                        .stages
                        .iter()
                        .filter(|s| !placed.contains(s.name.as_str()))
                        .map(|s| s.name.clone())
                        .collect();
                    return Err(StageError::Cycle(stuck));
                }
            }
        }
        Ok(done)
    }

    /// Run every stage in order
    ///
    /// `run` is called for each stage that should run; refresh-only stages
    /// nobody notified are skipped. The first error stops the run.
    pub fn run<E, F>(&self, mut run: F) -> Result<Vec<(String, StageStatus)>, E>
    where
        E: From<StageError>,
        F: FnMut(&str) -> Result<StageOutcome, E>,
    {
        let order = self.order()?;
        let mut changed: HashSet<&str> = HashSet::new();
        let mut report = Vec::with_capacity(order.len());

        for name in order {
            let notifiers = self.notifiers(name);
            if !notifiers.is_empty() && !notifiers.iter().any(|n| changed.contains(n)) {
                log::debug!("stage {name}: not notified, skipping");
                report.push((name.to_string(), StageStatus::NotNotified));
                continue;
            }

            log::debug!("stage {name}: running");
            let outcome = run(name)?;
            if outcome == StageOutcome::Changed {
                changed.insert(name);
            }
            report.push((name.to_string(), StageStatus::Ran(outcome)));
        }
        Ok(report)
    }

    /// `after` edges plus incoming `notify` edges
    fn predecessors<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        let after = self
            .stages
            .iter()
            .filter(move |s| s.name == name)
            .flat_map(|s| s.after.iter().map(String::as_str));
        after.chain(self.notifiers(name))
    }

    fn check_references(&self) -> Result<(), StageError> {
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].iter().any(|s| s.name == stage.name) {
                return Err(StageError::Duplicate(stage.name.clone()));
            }
            for target in stage.after.iter().chain(&stage.notify) {
                if !self.stages.iter().any(|s| &s.name == target) {
                    return Err(StageError::Unknown {
                        stage: stage.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(
        graph: &StageGraph,
        changes: &[&str],
    ) -> (Vec<String>, Vec<(String, StageStatus)>) {
        let mut ran = Vec::new();
        let report = graph
            .run::<StageError, _>(|name| {
                ran.push(name.to_string());
                Ok(if changes.contains(&name) {
                    StageOutcome::Changed
                } else {
                    StageOutcome::Unchanged
                })
            })
            .unwrap();
        (ran, report)
    }

    #[test]
    fn test_standard_order() {
        let graph = StageGraph::standard();
        assert_eq!(graph.order().unwrap(), vec!["install", "configure", "restart"]);
    }

    #[test]
    fn test_restart_runs_only_when_configure_changed() {
        let graph = StageGraph::standard();

        let (ran, report) = run_with(&graph, &["configure"]);
        assert_eq!(ran, vec!["install", "configure", "restart"]);
        assert_eq!(report[2].1, StageStatus::Ran(StageOutcome::Unchanged));

        let (ran, report) = run_with(&graph, &[]);
        assert_eq!(ran, vec!["install", "configure"]);
        assert_eq!(report[2], ("restart".to_string(), StageStatus::NotNotified));
    }

    #[test]
    fn test_install_change_does_not_notify_restart() {
        let (ran, _) = run_with(&StageGraph::standard(), &["install"]);
        assert_eq!(ran, vec!["install", "configure"]);
    }

    #[test]
    fn test_notify_implies_order() {
        let graph = StageGraph::new(vec![
            Stage::new("restart"),
            Stage::new("configure").notify("restart"),
        ]);
        assert_eq!(graph.order().unwrap(), vec!["configure", "restart"]);
    }

    #[test]
    fn test_cycle_detected() {
        let graph = StageGraph::new(vec![
            Stage::new("a").after("b"),
            Stage::new("b").after("a"),
            Stage::new("c"),
        ]);
        assert_eq!(
            graph.order().unwrap_err(),
            StageError::Cycle(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_unknown_stage() {
        let graph = StageGraph::new(vec![Stage::new("configure").notify("reboot")]);
        assert!(matches!(
            graph.order().unwrap_err(),
            StageError::Unknown { target, .. } if target == "reboot"
        ));
    }

    #[test]
    fn test_duplicate_stage() {
        let graph = StageGraph::new(vec![Stage::new("a"), Stage::new("a")]);
        assert_eq!(graph.order().unwrap_err(), StageError::Duplicate("a".into()));
    }

    #[test]
    fn test_error_stops_run() {
        let graph = StageGraph::standard();
        let mut ran = Vec::new();
        let result = graph.run::<anyhow::Error, _>(|name| {
            ran.push(name.to_string());
            if name == "install" {
                anyhow::bail!("not installed");
            }
            Ok(StageOutcome::Changed)
        });
        assert!(result.is_err());
        assert_eq!(ran, vec!["install"]);
    }
}
