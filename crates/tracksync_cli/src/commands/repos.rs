use tracksync::{search_repos, with_retry};

use crate::commands::shared::{OutputFormat, print_choices};
use crate::config::Config;
use crate::progress::LoggingReporter;

/// Search the user's repositories by name.
pub(crate) async fn handle_search(
    text: &str,
    output: Option<OutputFormat>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = config.client()?;
    let callback = LoggingReporter::new().into_callback();

    let choices = with_retry(
        || search_repos(&client, text),
        &config.retry_config(),
        Some(&callback),
    )
    .await?;

    print_choices(&choices, OutputFormat::resolve(output))
}
