//! Interactive prompts for the credential commands.

use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Read a secret without echoing it.
///
/// Returns `None` when the user aborts with Esc or Ctrl-C. When stdin is
/// not a terminal, a plain line is read instead.
pub fn read_masked(prompt: &str) -> io::Result<Option<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{}: ", prompt)?;
    stderr.flush()?;

    if !io::stdin().is_tty() {
        return read_line().map(Some);
    }

    let mut input = String::new();
    {
        let _raw = RawModeGuard::enable()?;
        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }

            match code {
                KeyCode::Enter => break,
                KeyCode::Esc => return Ok(None),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
                KeyCode::Backspace => {
                    if input.pop().is_some() {
                        write!(stderr, "\x08 \x08")?;
                    }
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    write!(stderr, "*")?;
                }
                _ => {}
            }
            stderr.flush()?;
        }
    }

    writeln!(stderr)?;
    Ok(Some(input))
}

/// Ask a yes/no question. Anything but "y"/"yes" counts as no.
pub fn confirm(question: &str) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{} [Yes/No]: ", question)?;
    stderr.flush()?;

    Ok(is_yes(&read_line()?))
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::is_yes;

    #[test]
    fn only_yes_confirms() {
        assert!(is_yes("Yes"));
        assert!(is_yes(" y \n"));
        assert!(!is_yes("No"));
        assert!(!is_yes(""));
        assert!(!is_yes("yes please"));
    }
}
