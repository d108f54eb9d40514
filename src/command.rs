//! Operator command parsing.
//!
//! A line is trimmed and classified on its first whitespace-delimited word,
//! case-insensitively. Parsing never fails: anything unrecognized becomes
//! [`Command::Unknown`] and is reported by the engine.

/// One operator request, produced fresh for every received line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `run [start [end [step]]]`, carrying everything after the keyword
    Run(String),
    /// `led on`
    LedOn,
    /// `led off`
    LedOff,
    /// `led` followed by anything other than `on` / `off`
    InvalidLed(String),
    /// `home`
    Home,
    /// `help`
    Help,
    /// Blank or whitespace-only line
    Empty,
    /// Anything else, as received (trimmed)
    Unknown(String),
}

impl Command {
    /// Classify one received line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        match keyword.to_ascii_lowercase().as_str() {
            "run" => Command::Run(rest.to_string()),
            "home" => Command::Home,
            "help" => Command::Help,
            "led" if rest.eq_ignore_ascii_case("on") => Command::LedOn,
            "led" if rest.eq_ignore_ascii_case("off") => Command::LedOff,
            "led" => Command::InvalidLed(rest.to_string()),
            _ => Command::Unknown(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(Command::parse("HELP"), Command::Help);
        assert_eq!(Command::parse("Home"), Command::Home);
        assert_eq!(Command::parse("LeD oN"), Command::LedOn);
        assert_eq!(Command::parse("led OFF"), Command::LedOff);
        assert_eq!(Command::parse("RUN 10 20"), Command::Run("10 20".into()));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(Command::parse("   help \r"), Command::Help);
        assert_eq!(Command::parse("\tled   on  "), Command::LedOn);
        assert_eq!(Command::parse("  run   5  90 "), Command::Run("5  90".into()));
    }

    #[test]
    fn run_without_arguments() {
        assert_eq!(Command::parse("run"), Command::Run(String::new()));
        assert_eq!(Command::parse("run   "), Command::Run(String::new()));
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("  \t "), Command::Empty);
    }

    #[test]
    fn malformed_led_argument() {
        assert_eq!(Command::parse("led"), Command::InvalidLed(String::new()));
        assert_eq!(Command::parse("led dim"), Command::InvalidLed("dim".into()));
        assert_eq!(
            Command::parse("led on please"),
            Command::InvalidLed("on please".into())
        );
    }

    #[test]
    fn unknown_keywords() {
        assert_eq!(Command::parse("foo"), Command::Unknown("foo".into()));
        assert_eq!(Command::parse("run10"), Command::Unknown("run10".into()));
        assert_eq!(Command::parse(" ledon "), Command::Unknown("ledon".into()));
    }
}
