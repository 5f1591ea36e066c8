//! Numbered-list prompts over stdin.
//!
//! Validation is a pure function so the accept/reject rules are testable
//! without a terminal; only the loop around it touches I/O.

use std::io::{self, BufRead, Write};

/// Validate one line of selection input against a candidate list.
///
/// The line must parse as an integer inside `[0, len)` and the index must
/// pass the eligibility predicate.
pub fn parse_selection(
    input: &str,
    len: usize,
    eligible: impl Fn(usize) -> bool,
) -> Option<usize> {
    let index: usize = input.trim().parse().ok()?;
    (index < len && eligible(index)).then_some(index)
}

/// Prompt with a numbered list until an eligible index is entered.
///
/// The whole prompt is re-rendered after every invalid answer and the loop
/// has no retry cap: it blocks until the reader yields an acceptable line.
/// A closed reader is an error, not a retry.
pub fn select_one(
    prompt: &str,
    labels: &[String],
    eligible: impl Fn(usize) -> bool,
    input: &mut dyn BufRead,
) -> io::Result<usize> {
    loop {
        println!("{prompt}");
        for (i, label) in labels.iter().enumerate() {
            println!("{i}. {label}");
        }
        print!(" > Your select: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for a selection",
            ));
        }
        if let Some(index) = parse_selection(&line, labels.len(), &eligible) {
            return Ok(index);
        }
    }
}

/// Print a prompt and read one trimmed line.
pub fn ask_line(prompt: &str, input: &mut dyn BufRead) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed while waiting for a line",
        ));
    }
    Ok(line.trim().to_string())
}
