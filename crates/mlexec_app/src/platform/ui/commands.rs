use std::path::PathBuf;

use mlexec_core::AlgorithmId;

pub const HELP: &str = "\
commands:
  algorithms       list the supported algorithms
  select <id>      choose candidate-elimination, find-s or id3
  open <path>      upload a dataset (.csv .txt .xls .xlsx)
  run              execute the selected algorithm on the uploaded file
  show             print the current view
  help             this text
  quit             leave the shell";

/// One line of shell input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Algorithms,
    Select(AlgorithmId),
    /// `None` when the path was left empty, like a cancelled picker.
    Open(Option<PathBuf>),
    Run,
    Show,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Ok(ShellCommand::Empty),
        "algorithms" | "list" => Ok(ShellCommand::Algorithms),
        "select" | "use" => rest
            .parse()
            .map(ShellCommand::Select)
            .map_err(|err: mlexec_core::UnknownAlgorithm| err.to_string()),
        "open" | "upload" => Ok(ShellCommand::Open(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        )),
        "run" | "execute" => Ok(ShellCommand::Run),
        "show" => Ok(ShellCommand::Show),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}
