//! Per-proposal approval prompt for `apply`.

use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Yes,
    No,
    /// Approve this and every remaining proposal.
    All,
    /// Stop; nothing further is applied.
    Quit,
}

impl Approval {
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Approval::Yes),
            "n" | "no" => Some(Approval::No),
            "a" | "all" => Some(Approval::All),
            "q" | "quit" => Some(Approval::Quit),
            _ => None,
        }
    }
}

/// Ask until a valid answer arrives. End of input counts as `Quit`.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<Approval> {
    loop {
        write!(output, "{} [y]es / [n]o / [a]ll / [q]uit: ", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(Approval::Quit);
        }
        match Approval::parse(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(output, "Please answer y, n, a or q.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_answers() {
        assert_eq!(Approval::parse("Y\n"), Some(Approval::Yes));
        assert_eq!(Approval::parse(" no "), Some(Approval::No));
        assert_eq!(Approval::parse("a"), Some(Approval::All));
        assert_eq!(Approval::parse("QUIT"), Some(Approval::Quit));
        assert_eq!(Approval::parse("maybe"), None);
    }

    #[test]
    fn reprompts_until_valid() {
        let mut input = Cursor::new("what\n\ny\n");
        let mut output = Vec::new();
        let answer = ask(&mut input, &mut output, "Apply?").unwrap();
        assert_eq!(answer, Approval::Yes);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Please answer").count(), 2);
    }

    #[test]
    fn eof_quits() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(ask(&mut input, &mut output, "Apply?").unwrap(), Approval::Quit);
    }
}
