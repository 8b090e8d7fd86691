//! Command-line surface of the `nutriaura` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nutriaura")]
#[command(about = "Selfie-based wellness check-ins with quests, goals and a community board")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyse a selfie together with questionnaire answers
    Analyze {
        /// Photo to analyse (jpeg, png or webp)
        image: PathBuf,
        /// JSON file with the questionnaire answers
        answers: Option<PathBuf>,
    },
    /// Level, AP, badges and leaderboard
    Profile,
    /// Past analysis scores
    History,
    /// Missions and their status
    Quests,
    /// Mark a mission as done
    CompleteQuest { id: String },
    /// Community challenges
    Challenges,
    /// Join a challenge
    JoinChallenge { id: String },
    /// Community posts and tips
    Forum,
    /// Add a forum post; words are joined with spaces
    Post {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Personal goals
    Goals,
    /// Add a general goal; words are joined with spaces
    AddGoal {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Toggle light/dark theme
    Theme,
    /// Toggle novelty mode
    Chaos,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("nutriaura").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse(&["analyze", "me.jpg"]).unwrap(),
            Command::Analyze {
                image: "me.jpg".into(),
                answers: None
            }
        );
        assert_eq!(
            parse(&["analyze", "me.png", "quiz.json"]).unwrap(),
            Command::Analyze {
                image: "me.png".into(),
                answers: Some("quiz.json".into())
            }
        );
        assert_eq!(
            parse(&["complete-quest", "daily_hydrate"]).unwrap(),
            Command::CompleteQuest {
                id: "daily_hydrate".into()
            }
        );
        assert_eq!(
            parse(&["post", "drink", "water"]).unwrap(),
            Command::Post {
                text: vec!["drink".into(), "water".into()]
            }
        );
        assert_eq!(parse(&["chaos"]).unwrap(), Command::Chaos);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse(&["analyze"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["add-goal"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["join-challenge", "a", "b"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["dance"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
    }

    #[test]
    fn help_is_rendered_by_clap() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(
            parse(&[]).unwrap_err().kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
