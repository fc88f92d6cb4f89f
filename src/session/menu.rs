//! Menu definitions and choice validation.

use std::fmt;

/// Reported when a non-numeric line is entered at a menu.
pub const NOT_A_NUMBER_MESSAGE: &str = "Please enter a number.";
/// Reported when a number outside the menu is entered.
pub const OUT_OF_RANGE_MESSAGE: &str = "Invalid choice.";
/// Reported when a persona is picked twice for the same flow.
pub const ALREADY_SELECTED_MESSAGE: &str = "Already selected. Choose someone else.";

/// Why a menu line was rejected. Always handled at the prompt that read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMenuInput {
    NotANumber,
    OutOfRange,
}

impl InvalidMenuInput {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotANumber => NOT_A_NUMBER_MESSAGE,
            Self::OutOfRange => OUT_OF_RANGE_MESSAGE,
        }
    }
}

impl fmt::Display for InvalidMenuInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Parse a one-based menu choice into a zero-based index below `len`.
pub fn parse_choice(input: &str, len: usize) -> Result<usize, InvalidMenuInput> {
    let n: i64 = input
        .trim()
        .parse()
        .map_err(|_| InvalidMenuInput::NotANumber)?;
    if n >= 1 && (n as u64) <= len as u64 {
        Ok(n as usize - 1)
    } else {
        Err(InvalidMenuInput::OutOfRange)
    }
}

/// Whether `input` is one of `keywords`, ignoring case and surrounding space.
pub fn is_exit_keyword(input: &str, keywords: &[&str]) -> bool {
    let input = input.trim();
    keywords.iter().any(|k| input.eq_ignore_ascii_case(k))
}

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuItem {
    SinglePersonaChat,
    ScenarioChat,
    MultiPersonaDiscussion,
    ProblemSolvingSession,
    ProblemSolvingBattle,
    SpecializedConsultation,
    Exit,
}

impl MainMenuItem {
    pub const ALL: [MainMenuItem; 7] = [
        MainMenuItem::SinglePersonaChat,
        MainMenuItem::ScenarioChat,
        MainMenuItem::MultiPersonaDiscussion,
        MainMenuItem::ProblemSolvingSession,
        MainMenuItem::ProblemSolvingBattle,
        MainMenuItem::SpecializedConsultation,
        MainMenuItem::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SinglePersonaChat => "Chat with a single persona",
            Self::ScenarioChat => "Scenario questions",
            Self::MultiPersonaDiscussion => "Multi-persona discussion",
            Self::ProblemSolvingSession => "Problem-solving session (consult one great mind)",
            Self::ProblemSolvingBattle => "Problem-solving battle (great minds compete)",
            Self::SpecializedConsultation => "Specialized consultation",
            Self::Exit => "Exit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1", 5), Ok(0));
        assert_eq!(parse_choice(" 5 \n", 5), Ok(4));
        assert_eq!(parse_choice("abc", 5), Err(InvalidMenuInput::NotANumber));
        assert_eq!(parse_choice("", 5), Err(InvalidMenuInput::NotANumber));
        assert_eq!(parse_choice("0", 5), Err(InvalidMenuInput::OutOfRange));
        assert_eq!(parse_choice("99", 5), Err(InvalidMenuInput::OutOfRange));
        assert_eq!(parse_choice("-1", 5), Err(InvalidMenuInput::OutOfRange));
        assert_eq!(parse_choice("1", 0), Err(InvalidMenuInput::OutOfRange));
    }

    #[test]
    fn test_exit_keywords() {
        assert!(is_exit_keyword("EXIT", &["exit", "quit"]));
        assert!(is_exit_keyword("  Quit ", &["exit", "quit"]));
        assert!(!is_exit_keyword("quit", &["exit"]));
        assert!(!is_exit_keyword("exit now", &["exit"]));
    }

    #[test]
    fn test_main_menu_ends_with_exit() {
        assert_eq!(MainMenuItem::ALL.len(), 7);
        assert_eq!(MainMenuItem::ALL[6], MainMenuItem::Exit);
        assert_eq!(InvalidMenuInput::NotANumber.to_string(), "Please enter a number.");
    }
}
