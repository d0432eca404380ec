//! Splits the 0.x process tree into 1.x stages and steps.
//!
//! 0.x stores both levels in the `procs` table: a row with `ppid == 0` is a
//! stage, any other row is a step whose stage is the row with
//! `pid == ppid` in the same build. [`split`] partitions the rows in one pass
//! and links each step to its stage through a `(build id, pid)` lookup table.
//! When several stages of one build share a pid, steps link to the first.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::{MigrateError, Result};
use crate::model::{ProcessV0, StageV1, StepV1};

/// Stage name used when the 0.x process has none.
pub const DEFAULT_STAGE_NAME: &str = "default";

/// Platform assigned to every migrated stage.
pub const DEFAULT_OS: &str = "linux";
pub const DEFAULT_ARCH: &str = "amd64";

/// Stages and steps produced from one set of process rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessTree {
    pub stages: Vec<StageV1>,
    pub steps: Vec<StepV1>,
}

/// Build the stages and steps for `processes`.
///
/// # Errors
///
/// Fails if a step has no stage in its build. Nothing is returned in that
/// case, so no partial tree can reach the loader.
pub fn split(processes: &[ProcessV0]) -> Result<ProcessTree> {
    let (parents, children): (Vec<&ProcessV0>, Vec<&ProcessV0>) =
        processes.iter().partition(|p| p.ppid == 0);

    let mut stage_ids: HashMap<(i64, i64), i64> = HashMap::with_capacity(parents.len());
    let mut stages = Vec::with_capacity(parents.len());
    for process in parents {
        match stage_ids.entry((process.build_id, process.pid)) {
            Entry::Vacant(slot) => {
                slot.insert(process.id);
            }
            Entry::Occupied(first) => warn!(
                build = process.build_id,
                pid = process.pid,
                stage = process.id,
                first = *first.get(),
                "Duplicate stage pid, steps link to the first stage"
            ),
        }
        stages.push(stage(process)?);
    }

    let mut steps = Vec::with_capacity(children.len());
    for process in children {
        let Some(&stage_id) = stage_ids.get(&(process.build_id, process.ppid)) else {
            error!(
                build = process.build_id,
                step = process.id,
                ppid = process.ppid,
                "Cannot find parent stage"
            );
            return Err(MigrateError::transform(
                "steps",
                format!(
                    "step {} of build {} has no stage with pid {}",
                    process.id, process.build_id, process.ppid
                ),
            ));
        };
        steps.push(step(process, stage_id));
    }

    debug!(stages = stages.len(), steps = steps.len(), "Split process tree");
    Ok(ProcessTree { stages, steps })
}

/// Stage for a top-level process. The stage keeps the process id.
fn stage(process: &ProcessV0) -> Result<StageV1> {
    let name = if process.name.is_empty() {
        DEFAULT_STAGE_NAME.to_string()
    } else {
        process.name.clone()
    };

    Ok(StageV1 {
        id: process.id,
        repo_id: process.repo_id,
        build_id: process.build_id,
        number: process.pid,
        name,
        kind: String::new(),
        stage_type: String::new(),
        status: process.state.clone(),
        error: process.error.clone(),
        err_ignore: false,
        exit_code: process.exit_code,
        machine: process.machine.clone(),
        os: DEFAULT_OS.to_string(),
        arch: DEFAULT_ARCH.to_string(),
        variant: String::new(),
        kernel: String::new(),
        limit: 0,
        started: process.started,
        stopped: process.stopped,
        created: process.started,
        updated: process.stopped,
        version: 1,
        on_success: true,
        on_failure: false,
        depends_on: serde_json::to_string(&Vec::<String>::new())?,
        labels: serde_json::to_string(&Value::Object(Map::new()))?,
    })
}

fn step(process: &ProcessV0, stage_id: i64) -> StepV1 {
    StepV1 {
        id: process.id,
        stage_id,
        number: process.pid,
        name: process.name.clone(),
        status: process.state.clone(),
        error: process.error.clone(),
        err_ignore: false,
        exit_code: process.exit_code,
        started: process.started,
        stopped: process.stopped,
        version: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(id: i64, build_id: i64, pid: i64, ppid: i64, name: &str) -> ProcessV0 {
        ProcessV0 {
            id,
            build_id,
            repo_id: 7,
            pid,
            ppid,
            name: name.to_string(),
            state: "success".to_string(),
            started: 100 + id,
            stopped: 200 + id,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_links_steps_within_build() {
        // Two builds reuse pid 1 for their stage; steps must not cross builds.
        let rows = vec![
            process(12, 2, 2, 1, "clone"),
            process(10, 1, 1, 0, ""),
            process(11, 1, 2, 1, "clone"),
            process(20, 2, 1, 0, "backend"),
            process(13, 2, 3, 1, "test"),
        ];

        let tree = split(&rows).unwrap();
        assert_eq!(tree.stages.len(), 2);
        assert_eq!(tree.steps.len(), 3);

        let by_id = |id| tree.steps.iter().find(|s| s.id == id).unwrap();
        assert_eq!(by_id(11).stage_id, 10);
        assert_eq!(by_id(12).stage_id, 20);
        assert_eq!(by_id(13).stage_id, 20);
        assert_eq!(by_id(13).number, 3);
    }

    #[test]
    fn test_stage_defaults() {
        let tree = split(&[process(10, 1, 1, 0, "")]).unwrap();
        let stage = &tree.stages[0];

        assert_eq!(stage.id, 10);
        assert_eq!(stage.build_id, 1);
        assert_eq!(stage.repo_id, 7);
        assert_eq!(stage.number, 1);
        assert_eq!(stage.name, DEFAULT_STAGE_NAME);
        assert_eq!(stage.os, "linux");
        assert_eq!(stage.arch, "amd64");
        assert!(stage.on_success);
        assert!(!stage.on_failure);
        assert_eq!(stage.depends_on, "[]");
        assert_eq!(stage.labels, "{}");
        assert_eq!(stage.created, stage.started);
        assert_eq!(stage.updated, stage.stopped);
    }

    #[test]
    fn test_orphan_step_fails_whole_split() {
        let rows = vec![
            process(10, 1, 1, 0, "default"),
            process(11, 1, 2, 1, "clone"),
            // pid 1 exists, but in build 1, not build 2
            process(30, 2, 2, 1, "orphan"),
        ];

        let err = split(&rows).unwrap_err();
        match err {
            MigrateError::Transform { resource, message } => {
                assert_eq!(resource, "steps");
                assert!(message.contains("step 30"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_stage_pid_keeps_both_stages() {
        let rows = vec![
            process(10, 1, 1, 0, "a"),
            process(11, 1, 1, 0, "b"),
            process(12, 1, 2, 1, "clone"),
        ];

        let tree = split(&rows).unwrap();
        let stage_ids: Vec<_> = tree.stages.iter().map(|s| s.id).collect();
        assert_eq!(stage_ids, vec![10, 11]);
        assert_eq!(tree.steps.len(), 1);
        assert_eq!(tree.steps[0].stage_id, 10);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(split(&[]).unwrap(), ProcessTree::default());
    }
}
