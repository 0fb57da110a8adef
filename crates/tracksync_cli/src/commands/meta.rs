//! `completions` and `man`: generated from the clap definition in `main.rs`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

use crate::Cli;

const BIN_NAME: &str = "tracksync";

fn write_completions(shell: clap_complete::Shell, sink: &mut impl Write) {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, sink);
}

fn write_man_page(sink: &mut impl Write) -> std::io::Result<()> {
    clap_mangen::Man::new(Cli::command()).render(sink)
}

/// One page for the binary plus one per subcommand, e.g.
/// `tracksync-issue-update.1`.
fn write_man_pages(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    clap_mangen::generate_to(Cli::command(), dir)
}

pub(crate) fn handle_completions(
    shell: clap_complete::Shell,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    write_completions(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

pub(crate) fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = output {
        write_man_pages(&dir)?;
        tracing::info!(dir = %dir.display(), "Wrote man pages");
    } else {
        let mut stdout = std::io::stdout().lock();
        write_man_page(&mut stdout)?;
        stdout.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_zsh_completions_mention_subcommands() {
        let mut out = Vec::new();
        write_completions(clap_complete::Shell::Zsh, &mut out);
        let script = String::from_utf8(out).expect("utf-8 completions");
        for subcommand in ["step", "sync", "repos", "issue"] {
            assert!(script.contains(subcommand), "missing {subcommand}");
        }
    }

    #[test]
    fn test_man_page_title() {
        let mut out = Vec::new();
        write_man_page(&mut out).expect("render man page");
        let page = String::from_utf8(out).expect("utf-8 man page");
        assert!(page.to_lowercase().contains(".th tracksync"));
    }

    #[test]
    fn test_man_pages_cover_nested_subcommands() {
        let dir = std::env::temp_dir().join(format!("tracksync-man-{}", std::process::id()));
        write_man_pages(&dir).expect("write man pages");

        assert!(dir.join("tracksync.1").exists());
        assert!(dir.join("tracksync-step.1").exists());
        assert!(dir.join("tracksync-issue-update.1").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
