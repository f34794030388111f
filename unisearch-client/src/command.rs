/// Interactive commands understood by the terminal front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `open ?search=MIT` - apply a raw location query
    Open(String),
    /// `search <term>`
    Search(String),
    /// `country <name>`
    Country(String),
    /// `all` - the full paginated listing
    All,
    Next,
    Prev,
    Export,
    /// `suggest <prefix>` - type-ahead candidates
    Suggest(String),
    /// `detail <row>` - links of a displayed row (1-based)
    Detail(usize),
    Help,
    Quit,
    /// Unrecognized input or a command missing its argument
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  open <query>       apply a location query, e.g. open ?search=MIT
  search <term>      look up universities by name
  country <name>     list the universities of a country
  all                list every university, page by page
  next | prev        move through the full listing
  export             save the current results as CSV
  suggest <prefix>   show type-ahead candidates
  detail <row>       show the links of a row
  help               show this help
  quit               exit";

impl Command {
    /// Parse one input line. A leading `/` or `\` is accepted and ignored.
    ///
    /// # Examples
    /// ```
    /// use unisearch_client::command::Command;
    ///
    /// assert_eq!(Command::parse("search Keio University"), Command::Search("Keio University".into()));
    /// assert_eq!(Command::parse("/next"), Command::Next);
    /// ```
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim().trim_start_matches(['/', '\\']);
        let (word, rest) = match trimmed.find(char::is_whitespace) {
            Some(pos) => (&trimmed[..pos], trimmed[pos..].trim()),
            None => (trimmed, ""),
        };

        let needs_arg = |make: fn(String) -> Command, usage: &str| {
            if rest.is_empty() {
                Command::Invalid(format!("usage: {}", usage))
            } else {
                make(rest.to_string())
            }
        };

        match word.to_lowercase().as_str() {
            "open" | "go" => needs_arg(Command::Open, "open <query>"),
            "search" | "s" => needs_arg(Command::Search, "search <term>"),
            "country" | "c" => needs_arg(Command::Country, "country <name>"),
            "suggest" => needs_arg(Command::Suggest, "suggest <prefix>"),
            "all" => Command::All,
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "export" | "csv" => Command::Export,
            "detail" | "d" => match rest.parse::<usize>() {
                Ok(row) if row > 0 => Command::Detail(row),
                _ => Command::Invalid("usage: detail <row number>".to_string()),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => Command::Invalid(String::new()),
            other => Command::Invalid(format!("unknown command '{}'", other)),
        }
    }
}
