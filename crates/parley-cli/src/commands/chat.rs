use crate::client::{ChatClient, Conversation, Entry, Role};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

pub async fn execute(url: String) -> Result<()> {
    let client = ChatClient::new(url).context("Failed to build HTTP client")?;

    // Start clean; a failed reset only means the old thread continues
    if let Err(e) = client.reset().await {
        warn!("Session reset failed: {}", e);
    }

    println!(
        "Connected to {} (type {} to leave)",
        client.base_url().cyan(),
        "exit".bold()
    );

    let mut conversation = Conversation::new(client);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", ">".dimmed());
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        if is_exit(&line) {
            break;
        }

        if let Some(entry) = conversation.submit(&line).await {
            print_entry(entry);
        }
    }

    println!("Exiting chat. Goodbye!");
    Ok(())
}

fn is_exit(line: &str) -> bool {
    let line = line.trim();
    EXIT_WORDS.iter().any(|word| line.eq_ignore_ascii_case(word))
}

fn print_entry(entry: &Entry) {
    let label = format!("{}:", entry.role.label());
    let label = match entry.role {
        Role::User => label.blue().bold(),
        Role::Assistant => label.green().bold(),
    };
    println!("{} {}", label, entry.content);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words_are_case_insensitive() {
        assert!(is_exit("exit"));
        assert!(is_exit("  QUIT "));
        assert!(!is_exit("exit now"));
        assert!(!is_exit(""));
    }
}
