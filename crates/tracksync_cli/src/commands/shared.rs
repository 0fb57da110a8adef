use clap::ValueEnum;
use console::Term;
use serde::Serialize;
use tabled::Tabled;
use tracksync::github::{IssueRow, PullRequestRow, RepoRow};
use tracksync::{FilterSet, IssueState, RepoChoice, Row};

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table
    Table,
    /// Display as JSON
    Json,
}

impl OutputFormat {
    /// Tables for a terminal, JSON when piped.
    pub(crate) fn resolve(explicit: Option<Self>) -> Self {
        explicit.unwrap_or_else(|| {
            if Term::stdout().is_term() {
                Self::Table
            } else {
                Self::Json
            }
        })
    }
}

/// Filter flags shared by `step` and `sync`.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct FilterArgs {
    /// Only pull requests targeting this base branch
    #[arg(long)]
    pub(crate) base: Option<String>,

    /// Pull request / issue state (default: open)
    #[arg(long, value_parser = parse_state)]
    pub(crate) state: Option<IssueState>,

    /// Only issues with this label (repeatable)
    #[arg(short, long = "label")]
    pub(crate) labels: Vec<String>,

    /// Only issues assigned to this login (`none` or `*` also accepted)
    #[arg(long)]
    pub(crate) assignee: Option<String>,
}

impl From<FilterArgs> for FilterSet {
    fn from(args: FilterArgs) -> Self {
        FilterSet {
            state: args.state,
            base: args.base,
            labels: args.labels,
            assignee: args.assignee,
        }
    }
}

pub(crate) fn parse_state(s: &str) -> Result<IssueState, String> {
    s.parse().map_err(|e: tracksync::SyncError| e.to_string())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table<T: Tabled>(items: Vec<T>) {
    let mut table = tabled::Table::new(items);
    table.with(tabled::settings::Style::rounded());
    println!("{table}");
}

/// Print rows of any kind, grouped into one table per kind.
pub(crate) fn print_rows(
    rows: &[Row],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if format == OutputFormat::Json {
        return print_json(&rows);
    }

    let mut repos = Vec::new();
    let mut pulls = Vec::new();
    let mut issues = Vec::new();
    for row in rows {
        match row {
            Row::Repo(r) => repos.push(RepoDisplay::from(r)),
            Row::PullRequest(r) => pulls.push(PullRequestDisplay::from(r)),
            Row::Issue(r) => issues.push(IssueDisplay::from(r)),
        }
    }

    if rows.is_empty() {
        println!("No records.");
    }
    if !repos.is_empty() {
        print_table(repos);
    }
    if !pulls.is_empty() {
        print_table(pulls);
    }
    if !issues.is_empty() {
        print_table(issues);
    }
    Ok(())
}

pub(crate) fn print_choices(
    choices: &[RepoChoice],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => print_json(&choices),
        OutputFormat::Table => {
            if choices.is_empty() {
                println!("No matching repositories.");
            } else {
                print_table(choices.iter().map(ChoiceDisplay::from).collect());
            }
            Ok(())
        }
    }
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[derive(Tabled)]
struct RepoDisplay {
    #[tabled(rename = "Repository")]
    full_name: String,
    #[tabled(rename = "Private")]
    private: bool,
    #[tabled(rename = "Fork")]
    fork: bool,
    #[tabled(rename = "Stars")]
    stars: u64,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Pushed")]
    pushed: String,
}

impl From<&RepoRow> for RepoDisplay {
    fn from(r: &RepoRow) -> Self {
        Self {
            full_name: r.full_name.clone(),
            private: r.is_private,
            fork: r.is_fork,
            stars: r.stars,
            language: opt(r.language.as_deref()),
            pushed: r
                .pushed_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Tabled)]
struct PullRequestDisplay {
    #[tabled(rename = "#")]
    number: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Base")]
    base: String,
    #[tabled(rename = "Head")]
    head: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Draft")]
    draft: bool,
}

impl From<&PullRequestRow> for PullRequestDisplay {
    fn from(r: &PullRequestRow) -> Self {
        Self {
            number: r.number,
            title: truncate(r.title.as_deref().unwrap_or("-"), 60),
            state: opt(r.state.as_deref()),
            base: opt(r.base_branch.as_deref()),
            head: opt(r.head_branch.as_deref()),
            author: opt(r.author.as_deref()),
            draft: r.is_draft,
        }
    }
}

#[derive(Tabled)]
struct IssueDisplay {
    #[tabled(rename = "#")]
    number: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Labels")]
    labels: String,
    #[tabled(rename = "Assignees")]
    assignees: String,
    #[tabled(rename = "PR")]
    pull_request: bool,
}

impl From<&IssueRow> for IssueDisplay {
    fn from(r: &IssueRow) -> Self {
        Self {
            number: r.number,
            title: truncate(r.title.as_deref().unwrap_or("-"), 60),
            state: opt(r.state.as_deref()),
            author: opt(r.author.as_deref()),
            labels: list(&r.labels),
            assignees: list(&r.assignees),
            pull_request: r.is_pull_request,
        }
    }
}

#[derive(Tabled)]
struct ChoiceDisplay {
    #[tabled(rename = "Repository")]
    display: String,
    #[tabled(rename = "URL")]
    value: String,
}

impl From<&RepoChoice> for ChoiceDisplay {
    fn from(c: &RepoChoice) -> Self {
        Self {
            display: c.display.clone(),
            value: c.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_output_format_wins() {
        assert_eq!(OutputFormat::resolve(Some(OutputFormat::Json)), OutputFormat::Json);
        assert_eq!(OutputFormat::resolve(Some(OutputFormat::Table)), OutputFormat::Table);
    }

    #[test]
    fn test_filter_args_into_filter_set() {
        let filters: FilterSet = FilterArgs {
            base: Some("main".to_string()),
            state: Some(IssueState::Closed),
            labels: vec!["bug".to_string()],
            assignee: None,
        }
        .into();
        assert_eq!(filters.base.as_deref(), Some("main"));
        assert_eq!(filters.state, Some(IssueState::Closed));
        assert_eq!(filters.labels, vec!["bug"]);
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("ALL"), Ok(IssueState::All));
        assert!(parse_state("merged").is_err());
    }

    #[test]
    fn test_truncate_and_list() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title indeed", 10), "a very ...");
        assert_eq!(list(&[]), "-");
        assert_eq!(list(&["a".to_string(), "b".to_string()]), "a, b");
    }

    #[test]
    fn test_print_rows_handles_every_kind() {
        let rows = vec![Row::Issue(IssueRow {
            id: 1,
            number: 2,
            title: Some("Broken".to_string()),
            url: "https://github.com/acme/widgets/issues/2".to_string(),
            state: Some("open".to_string()),
            body: None,
            author: None,
            assignees: vec![],
            labels: vec!["bug".to_string()],
            milestone: None,
            comments: 0,
            is_pull_request: false,
            created_at: None,
            updated_at: None,
            closed_at: None,
        })];
        print_rows(&rows, OutputFormat::Table).unwrap();
        print_rows(&rows, OutputFormat::Json).unwrap();
        print_rows(&[], OutputFormat::Table).unwrap();
    }
}
