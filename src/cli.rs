use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "fastscript", about = "Rhai scratchpad with a persistent session", version)]
pub struct Cli {
    /// Script file to load into the editor.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Evaluate CODE once, print the result and exit.
    #[arg(short = 'e', long = "eval", value_name = "CODE", conflicts_with = "file")]
    pub eval: Option<String>,

    /// Run FILE once instead of opening it in the editor.
    #[arg(short = 'r', long = "run", requires = "file")]
    pub run: bool,

    /// Print one-shot results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Interrupt evaluations running longer than SECS (0 disables).
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Operation budget for a single evaluation (0 = unlimited).
    #[arg(long = "max-operations", value_name = "N")]
    pub max_operations: Option<u64>,

    /// Log file used while the editor is open.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_and_overrides_parse() {
        let cli = Cli::try_parse_from([
            "fastscript",
            "--eval",
            "2 + 2",
            "--json",
            "--timeout",
            "3",
            "--max-operations",
            "1000",
        ])
        .unwrap();
        assert_eq!(cli.eval.as_deref(), Some("2 + 2"));
        assert!(cli.json);
        assert_eq!(cli.timeout, Some(3));
        assert_eq!(cli.max_operations, Some(1000));
        assert!(cli.file.is_none());
    }

    #[test]
    fn run_requires_a_file() {
        assert!(Cli::try_parse_from(["fastscript", "--run"]).is_err());
        let cli = Cli::try_parse_from(["fastscript", "--run", "script.rhai"]).unwrap();
        assert!(cli.run);
        assert_eq!(cli.file, Some(PathBuf::from("script.rhai")));
    }

    #[test]
    fn eval_conflicts_with_file() {
        assert!(Cli::try_parse_from(["fastscript", "-e", "1", "script.rhai"]).is_err());
    }
}
