//! # Completions Command Implementation
//!
//! Prints a shell completion script generated by `clap_complete` from the
//! `careen` command definition, so every subcommand and global flag
//! completes.
//!
//! ```bash
//! careen completions bash > ~/.local/share/bash-completion/completions/careen
//! careen completions zsh > ~/.zfunc/_careen
//! careen completions fish > ~/.config/fish/completions/careen.fish
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Writes the completion script for `shell` to `writer`.
pub fn write_completions(shell: Shell, writer: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, writer);
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_completions(args.shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buffer = Vec::new();
        write_completions(shell, &mut buffer);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_bash_script_lists_subcommands() {
        let bash = script(Shell::Bash);
        assert!(bash.contains("careen"));
        for sub in ["clone", "apply", "sync", "validate", "version"] {
            assert!(bash.contains(sub), "missing {sub}");
        }
    }

    #[test]
    fn test_zsh_script_mentions_global_flags() {
        let zsh = script(Shell::Zsh);
        assert!(zsh.contains("--manifest"));
        assert!(zsh.contains("--timeout"));
    }
}
