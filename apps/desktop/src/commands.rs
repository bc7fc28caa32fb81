use client_core::Tab;
use shared::domain::CharacterSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Quit,
    Status,
    SwitchTab(Tab),
    ToggleTheme,
    About,
    Privacy,
    SetOption { set: CharacterSet, enabled: bool },
    SetLength(u32),
    Generate,
    CopyPassword,
    TogglePasswordVisibility,
    SetAnalyzerInput(String),
    Analyze,
    ClearAnalyzer,
    ToggleAnalyzerVisibility,
    BulkOpen,
    BulkCount(u32),
    BulkLength(u32),
    BulkGenerate,
    BulkCopyAll,
    BulkCopyItem(usize),
    BulkDownload,
    BulkClose,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

pub const HELP: &str = "\
commands:
  tab generator|analyzer      switch the active panel
  option <set> on|off         set = uppercase, lowercase, numbers, symbols
  length <n>                  password length (1-128)
  generate | copy | show      generate, copy or reveal the password
  input <text>                type into the analyzer
  analyze | clear | reveal    analyze, clear or reveal the analyzer input
  bulk open|close|generate|download
  bulk count <n> | bulk length <n>
  bulk copy [index]           copy all results, or one by index
  theme | about | privacy | status | help | quit";

pub fn parse_command(line: &str) -> Result<ShellCommand, CommandParseError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "" => return Err(CommandParseError::Empty),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "status" => ShellCommand::Status,
        "theme" => ShellCommand::ToggleTheme,
        "about" => ShellCommand::About,
        "privacy" => ShellCommand::Privacy,
        "tab" => ShellCommand::SwitchTab(parse_tab(rest)?),
        "option" => parse_option(rest)?,
        "length" => ShellCommand::SetLength(parse_number(rest, "length <n>")?),
        "generate" => ShellCommand::Generate,
        "copy" => ShellCommand::CopyPassword,
        "show" => ShellCommand::TogglePasswordVisibility,
        // Keeps inner whitespace: the input is the password itself.
        "input" => ShellCommand::SetAnalyzerInput(
            line.get(head.len()..)
                .map(|text| text.strip_prefix(' ').unwrap_or(text))
                .unwrap_or_default()
                .to_string(),
        ),
        "analyze" => ShellCommand::Analyze,
        "clear" => ShellCommand::ClearAnalyzer,
        "reveal" => ShellCommand::ToggleAnalyzerVisibility,
        "bulk" => parse_bulk(rest)?,
        other => return Err(CommandParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn parse_tab(arg: &str) -> Result<Tab, CommandParseError> {
    match arg.to_ascii_lowercase().as_str() {
        "generator" | "gen" => Ok(Tab::Generator),
        "analyzer" | "ana" => Ok(Tab::Analyzer),
        _ => Err(CommandParseError::Usage("tab generator|analyzer")),
    }
}

fn parse_option(args: &str) -> Result<ShellCommand, CommandParseError> {
    const USAGE: &str = "option uppercase|lowercase|numbers|symbols on|off";
    let mut parts = args.split_whitespace();
    let set = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        Some("uppercase") => CharacterSet::Uppercase,
        Some("lowercase") => CharacterSet::Lowercase,
        Some("numbers") => CharacterSet::Numbers,
        Some("symbols") => CharacterSet::Symbols,
        _ => return Err(CommandParseError::Usage(USAGE)),
    };
    let enabled = match parts.next() {
        Some("on") => true,
        Some("off") => false,
        _ => return Err(CommandParseError::Usage(USAGE)),
    };
    Ok(ShellCommand::SetOption { set, enabled })
}

fn parse_bulk(args: &str) -> Result<ShellCommand, CommandParseError> {
    const USAGE: &str = "bulk open|close|generate|download|copy [index]|count <n>|length <n>";
    let (sub, rest) = match args.split_once(char::is_whitespace) {
        Some((sub, rest)) => (sub, rest.trim()),
        None => (args, ""),
    };
    match sub {
        "open" => Ok(ShellCommand::BulkOpen),
        "close" => Ok(ShellCommand::BulkClose),
        "generate" => Ok(ShellCommand::BulkGenerate),
        "download" => Ok(ShellCommand::BulkDownload),
        "copy" if rest.is_empty() => Ok(ShellCommand::BulkCopyAll),
        "copy" => Ok(ShellCommand::BulkCopyItem(parse_number(rest, USAGE)?)),
        "count" => Ok(ShellCommand::BulkCount(parse_number(rest, "bulk count <n>")?)),
        "length" => Ok(ShellCommand::BulkLength(parse_number(rest, "bulk length <n>")?)),
        _ => Err(CommandParseError::Usage(USAGE)),
    }
}

fn parse_number<T: std::str::FromStr>(
    arg: &str,
    usage: &'static str,
) -> Result<T, CommandParseError> {
    if arg.is_empty() {
        return Err(CommandParseError::Usage(usage));
    }
    arg.parse()
        .map_err(|_| CommandParseError::NotANumber(arg.to_string()))
}
