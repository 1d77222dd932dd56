use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliShellCompletion {
    Bash,
    Zsh,
    Fish,
}

impl CliShellCompletion {
    pub fn as_str(self) -> &'static str {
        match self {
            CliShellCompletion::Bash => "bash",
            CliShellCompletion::Zsh => "zsh",
            CliShellCompletion::Fish => "fish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How results are written to stdout.
pub enum CliOutputFormat {
    Text,
    Json,
}
