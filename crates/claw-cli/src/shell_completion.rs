use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::{Cli, CliShellCompletion};

impl CliShellCompletion {
    fn generator(self) -> Shell {
        match self {
            CliShellCompletion::Bash => Shell::Bash,
            CliShellCompletion::Zsh => Shell::Zsh,
            CliShellCompletion::Fish => Shell::Fish,
        }
    }
}

/// Writes the completion script for `shell`, keyed on the binary name clap reports.
pub fn render_shell_completion(
    shell: CliShellCompletion,
    mut writer: impl Write,
) -> io::Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    generate(shell.generator(), &mut command, bin_name, &mut writer);
    writer.flush()
}
