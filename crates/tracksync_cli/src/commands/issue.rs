use tracksync::{IssueState, IssueUpdate, NewIssue, Row, create_issue, update_issue};

use crate::commands::shared::{OutputFormat, print_rows};
use crate::config::Config;

pub(crate) async fn handle_create(
    repo_url: &str,
    issue: NewIssue,
    output: Option<OutputFormat>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = config.client()?;
    let row = create_issue(&client, repo_url, &issue).await?;
    print_rows(&[Row::Issue(row)], OutputFormat::resolve(output))
}

pub(crate) async fn handle_update(
    repo_url: &str,
    number: u64,
    update: IssueUpdate,
    output: Option<OutputFormat>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = config.client()?;
    let row = update_issue(&client, repo_url, number, &update).await?;
    print_rows(&[Row::Issue(row)], OutputFormat::resolve(output))
}

/// Labels and assignees given on the command line replace the current set.
/// An empty flag list leaves them untouched; `--clear-labels` and
/// `--clear-assignees` empty them.
pub(crate) fn build_update(
    title: Option<String>,
    body: Option<String>,
    state: Option<IssueState>,
    labels: Vec<String>,
    clear_labels: bool,
    assignees: Vec<String>,
    clear_assignees: bool,
) -> IssueUpdate {
    let replace = |values: Vec<String>, clear: bool| {
        if clear {
            Some(Vec::new())
        } else if values.is_empty() {
            None
        } else {
            Some(values)
        }
    };

    IssueUpdate {
        title,
        body,
        state,
        labels: replace(labels, clear_labels),
        assignees: replace(assignees, clear_assignees),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_update_leaves_unset_lists_alone() {
        let update = build_update(
            None,
            None,
            Some(IssueState::Closed),
            Vec::new(),
            false,
            Vec::new(),
            false,
        );
        assert_eq!(update.state, Some(IssueState::Closed));
        assert!(update.labels.is_none());
        assert!(update.assignees.is_none());
    }

    #[test]
    fn test_build_update_replaces_and_clears() {
        let update = build_update(
            Some("New title".to_string()),
            None,
            None,
            vec!["bug".to_string()],
            false,
            Vec::new(),
            true,
        );
        assert_eq!(update.labels, Some(vec!["bug".to_string()]));
        assert_eq!(update.assignees, Some(Vec::new()));
    }

    #[test]
    fn test_build_update_with_nothing_is_empty() {
        assert!(build_update(None, None, None, Vec::new(), false, Vec::new(), false).is_empty());
    }
}
