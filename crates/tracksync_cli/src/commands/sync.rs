use tracksync::{ResourceKind, SyncParams, sync_to_end};

use crate::commands::shared::{FilterArgs, OutputFormat, print_rows};
use crate::config::Config;
use crate::progress::LoggingReporter;

/// Drain every page of `kind` with the configured retry policy.
pub(crate) async fn handle_sync(
    kind: ResourceKind,
    repo_url: Option<String>,
    filters: FilterArgs,
    output: Option<OutputFormat>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = config.client()?;
    let params = SyncParams {
        repo_url,
        filters: filters.into(),
    };
    let callback = LoggingReporter::new().into_callback();

    let rows = sync_to_end(
        &client,
        kind,
        &params,
        &config.retry_config(),
        Some(&callback),
    )
    .await?;

    print_rows(&rows, OutputFormat::resolve(output))
}
