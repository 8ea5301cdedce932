use log::debug;

use crate::model::{Action, Stage, StageErrorInfo};

const FAILED: &str = "Failed";

/// Finds the first failed action in a pipeline state tree.
///
/// Stages are walked in the order they were returned; the first stage with
/// a failed action wins, and within it the first failed action. This is a
/// heuristic: when several stages fail at once the earliest listed one is
/// reported, which is not necessarily the root cause.
///
/// A failed action missing its name, stage name or error details yields
/// `None`, same as no failure at all.
pub fn extract(stages: &[Stage]) -> Option<StageErrorInfo> {
    let (stage, action) = stages.iter().find_map(|stage| {
        stage
            .action_states
            .iter()
            .find(|a| is_failed(a))
            .map(|action| (stage, action))
    })?;

    let info = to_error_info(stage, action);
    if info.is_none() {
        debug!("Failed action found but its details are incomplete: {action:?}");
    }
    info
}

fn is_failed(action: &Action) -> bool {
    action
        .latest_execution
        .as_ref()
        .and_then(|e| e.status.as_deref())
        == Some(FAILED)
}

fn to_error_info(stage: &Stage, action: &Action) -> Option<StageErrorInfo> {
    let execution = action.latest_execution.as_ref()?;
    let details = execution.error_details.as_ref()?;

    Some(StageErrorInfo {
        stage_name: stage.stage_name.clone()?,
        action_name: action.action_name.clone()?,
        code: details.code.clone()?,
        message: details.message.clone()?,
        entity_url: action.entity_url.clone(),
        external_execution_id: execution.external_execution_id.clone(),
        external_execution_url: execution.external_execution_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionExecution, ErrorDetails};

    fn action(name: &str, status: &str) -> Action {
        Action {
            action_name: Some(name.to_string()),
            latest_execution: Some(ActionExecution {
                status: Some(status.to_string()),
                ..Default::default()
            }),
            entity_url: None,
        }
    }

    fn failed_action(name: &str, code: &str, message: &str) -> Action {
        Action {
            action_name: Some(name.to_string()),
            latest_execution: Some(ActionExecution {
                status: Some("Failed".to_string()),
                error_details: Some(ErrorDetails {
                    code: Some(code.to_string()),
                    message: Some(message.to_string()),
                }),
                external_execution_id: Some("build:1234".to_string()),
                external_execution_url: Some("https://builds.example.com/1234".to_string()),
            }),
            entity_url: Some("https://builds.example.com/projects/api".to_string()),
        }
    }

    fn stage(name: &str, actions: Vec<Action>) -> Stage {
        Stage {
            stage_name: Some(name.to_string()),
            action_states: actions,
        }
    }

    #[test]
    fn returns_first_failed_action() {
        let stages = vec![
            stage("Source", vec![action("GitHub", "Succeeded")]),
            stage(
                "Build",
                vec![failed_action(
                    "CodeBuild",
                    "JobFailed",
                    "Build terminated with state: FAILED",
                )],
            ),
        ];

        let info = extract(&stages).unwrap();
        assert_eq!(info.stage_name, "Build");
        assert_eq!(info.action_name, "CodeBuild");
        assert_eq!(info.code, "JobFailed");
        assert_eq!(info.message, "Build terminated with state: FAILED");
        assert_eq!(info.external_execution_id.as_deref(), Some("build:1234"));
        assert_eq!(
            info.entity_url.as_deref(),
            Some("https://builds.example.com/projects/api")
        );
    }

    #[test]
    fn earliest_stage_wins_over_later_failures() {
        let stages = vec![
            stage(
                "Build",
                vec![
                    action("Lint", "Succeeded"),
                    failed_action("UnitTests", "JobFailed", "tests failed"),
                    failed_action("Package", "JobFailed", "packaging failed"),
                ],
            ),
            stage(
                "Deploy",
                vec![failed_action("Deploy", "DeployFailed", "deploy failed")],
            ),
        ];

        let info = extract(&stages).unwrap();
        assert_eq!(info.stage_name, "Build");
        assert_eq!(info.action_name, "UnitTests");
    }

    #[test]
    fn no_failure_yields_none() {
        let stages = vec![
            stage("Source", vec![action("GitHub", "Succeeded")]),
            stage("Build", vec![action("CodeBuild", "InProgress")]),
        ];
        assert!(extract(&stages).is_none());
    }

    #[test]
    fn empty_tree_yields_none() {
        assert!(extract(&[]).is_none());
    }

    #[test]
    fn actions_without_executions_are_ignored() {
        let stages = vec![stage(
            "Build",
            vec![Action {
                action_name: Some("CodeBuild".to_string()),
                latest_execution: None,
                entity_url: None,
            }],
        )];
        assert!(extract(&stages).is_none());
    }

    #[test]
    fn failed_action_without_error_details_yields_none() {
        let stages = vec![stage("Build", vec![action("CodeBuild", "Failed")])];
        assert!(extract(&stages).is_none());
    }

    #[test]
    fn failed_action_in_unnamed_stage_yields_none() {
        let stages = vec![Stage {
            stage_name: None,
            action_states: vec![failed_action("CodeBuild", "JobFailed", "boom")],
        }];
        assert!(extract(&stages).is_none());
    }
}
