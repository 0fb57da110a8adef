use tracksync::{ContinuationToken, ResourceKind, SyncParams, sync_step};

use crate::commands::shared::{FilterArgs, print_json};
use crate::config::Config;

/// Run exactly one step and print `{rows, continuation}`.
///
/// No retry here: a host driving steps decides itself whether to re-run a
/// failed step with the same token.
pub(crate) async fn handle_step(
    kind: ResourceKind,
    repo_url: Option<String>,
    filters: FilterArgs,
    continuation: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = config.client()?;
    let params = SyncParams {
        repo_url,
        filters: filters.into(),
    };
    let prior = continuation.map(ContinuationToken::new);

    let output = sync_step(&client, kind, &params, prior.as_ref()).await?;
    tracing::debug!(
        kind = %kind,
        rows = output.rows.len(),
        last = output.is_last(),
        "Step finished"
    );

    print_json(&output)
}
