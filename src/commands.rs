//! User command parsing for the interactive FAT32 explorer.
//!
//! The `Command` enum covers every operation the prompt accepts, plus
//! variants for unknown, invalid and empty input. Tokenizing is whitespace
//! based; the command layer owns all user-facing wording.

/// One parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Open a volume image, encapsulating its path.
    Open(String),
    /// Close the open image.
    Close,
    /// Print the volume geometry.
    Info,
    /// Print attribute, size and first cluster of a named entry.
    Stat(String),
    /// Copy a file out of the image into the working directory.
    Get(String),
    /// Change the current directory.
    Cd(String),
    /// List the current directory.
    Ls,
    /// Flag an entry as deleted in the in-memory view.
    Del(String),
    /// Restore a previously deleted entry.
    Undel(String),
    /// Print a byte range of a file as decimal values.
    Read {
        name: String,
        offset: u64,
        length: u64,
    },
    /// Quit the program.
    Quit,
    /// Input that matches no known command.
    Unknown(String),
    /// A known command with missing or unparsable arguments.
    Invalid(String),
    /// Empty or whitespace-only input.
    Empty,
}

impl Command {
    /// Parses a line of user input into a `Command`.
    pub fn from_string(s: &str) -> Self {
        let mut parts = s.trim().split_whitespace();

        match parts.next() {
            Some("open") => unary(parts.next(), Command::Open, "'open' expects an image path"),
            Some("close") => Command::Close,
            Some("info") => Command::Info,
            Some("stat") => unary(parts.next(), Command::Stat, "'stat' expects an entry name"),
            Some("get") => unary(parts.next(), Command::Get, "'get' expects a file name"),
            Some("cd") => unary(parts.next(), Command::Cd, "'cd' expects a directory name"),
            Some("ls") => Command::Ls,
            Some("del") => unary(parts.next(), Command::Del, "'del' expects a file name"),
            Some("undel") => unary(
                parts.next(),
                Command::Undel,
                "'undel' expects a file name",
            ),
            Some("read") => match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(offset), Some(length)) => {
                    match (offset.parse::<u64>(), length.parse::<u64>()) {
                        (Ok(offset), Ok(length)) => Command::Read {
                            name: name.to_string(),
                            offset,
                            length,
                        },
                        _ => Command::Invalid(String::from(
                            "Arg parsing error: 'read' expects a numeric position and byte count.",
                        )),
                    }
                }
                _ => Command::Invalid(String::from(
                    "Missing args: 'read' expects a file name, a position and a byte count.",
                )),
            },
            Some("quit") => Command::Quit,
            Some(other) => Command::Unknown(other.to_string()),
            None => Command::Empty,
        }
    }
}

fn unary(arg: Option<&str>, build: fn(String) -> Command, usage: &str) -> Command {
    match arg {
        Some(arg) => build(arg.to_string()),
        None => Command::Invalid(format!("Missing arg: {usage}.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            Command::from_string("open fat32.img"),
            Command::Open("fat32.img".to_string())
        );
        assert_eq!(
            Command::from_string("  cd  docs "),
            Command::Cd("docs".to_string())
        );
        assert_eq!(
            Command::from_string("read foo.txt 10 4"),
            Command::Read {
                name: "foo.txt".to_string(),
                offset: 10,
                length: 4,
            }
        );
    }

    #[test]
    fn flags_missing_and_bad_arguments() {
        assert!(matches!(Command::from_string("open"), Command::Invalid(_)));
        assert!(matches!(
            Command::from_string("read foo.txt ten 4"),
            Command::Invalid(_)
        ));
        assert!(matches!(
            Command::from_string("read foo.txt 10"),
            Command::Invalid(_)
        ));
    }

    #[test]
    fn classifies_unknown_and_empty_input() {
        assert!(matches!(Command::from_string("format"), Command::Unknown(_)));
        assert_eq!(Command::from_string("   "), Command::Empty);
    }
}
