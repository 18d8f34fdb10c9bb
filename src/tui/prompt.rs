//! Line input for the interactive shell

use crossterm::style::{Color, Stylize};
use std::io::{self, BufRead, Write};

/// Reads prompts, multi-line blocks and form fields from stdin
#[derive(Debug, Default)]
pub struct PromptHandler;

impl PromptHandler {
    pub fn new() -> Self {
        Self
    }

    /// Display `label>` and read one trimmed line.
    /// Returns None on EOF (Ctrl+D).
    pub fn read_line(&self, label: &str, color: Color) -> Option<String> {
        print!("{} ", format!("{}>", label).with(color));
        io::stdout().flush().ok()?;

        read_raw_line().map(|line| line.trim().to_string())
    }

    /// Read lines until an empty line or EOF, appending them to `first`.
    /// Line breaks inside the block are kept.
    pub fn read_block(&self, first: &str, color: Color) -> String {
        let mut block = first.to_string();

        loop {
            print!("{} ", "..".with(color));
            if io::stdout().flush().is_err() {
                break;
            }
            match read_raw_line() {
                Some(line) if !line.trim().is_empty() => {
                    block.push('\n');
                    block.push_str(line.trim_end_matches(['\r', '\n']));
                }
                _ => break,
            }
        }

        block
    }

    /// Ask for one labelled form field, returning the trimmed answer.
    /// `preset` is used instead of asking when it is non-empty.
    pub fn read_field(&self, label: &str, hint: &str, preset: Option<&str>, color: Color) -> Option<String> {
        if let Some(value) = preset.filter(|v| !v.trim().is_empty()) {
            println!("  {} {}", format!("{}:", label).with(color), value);
            return Some(value.trim().to_string());
        }

        print!("  {} {} ", format!("{}:", label).with(color), format!("({})", hint).dark_grey());
        io::stdout().flush().ok()?;

        read_raw_line().map(|line| line.trim().to_string())
    }
}

fn read_raw_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
