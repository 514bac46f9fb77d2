//! Parsing of one line of user input.

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Prompt(String),
    Temperature(f64),
    TopK(u32),
    Clear,
    Raw,
    Stats,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub const HELP: &str = "\
commands:
  /temp <0-1>   set temperature
  /topk <n>     set top-K
  /clear        clear the chat and start a new session
  /raw          toggle the raw response view
  /stats        show session stats
  /help         show this help
  /quit         exit
anything else is sent as a prompt; Ctrl-C cancels a reply in progress";

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Prompt(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match (name, arg) {
        ("temp" | "temperature", Some(v)) => v
            .parse()
            .map(Command::Temperature)
            .unwrap_or_else(|_| Command::Invalid(format!("not a number: {v}"))),
        ("topk" | "top_k", Some(v)) => v
            .parse()
            .map(Command::TopK)
            .unwrap_or_else(|_| Command::Invalid(format!("not a whole number: {v}"))),
        ("temp" | "temperature" | "topk" | "top_k", None) => {
            Command::Invalid(format!("/{name} needs a value"))
        }
        ("clear", _) => Command::Clear,
        ("raw", _) => Command::Raw,
        ("stats", _) => Command::Stats,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => Command::Invalid(format!("unknown command: /{name}")),
    }
}
