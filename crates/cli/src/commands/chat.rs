//! `stellar chat`: interactive support chat.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use stellar_agent::{ChatSession, Reply};
use stellar_core::message::Role;
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::CliResult;

/// Pause between words when printing a reply.
const WORD_DELAY: Duration = Duration::from_millis(30);

const SEARCH_PREFIX: &str = "search:";

/// One line of user input, classified.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Exit,
    Reset,
    History,
    Blank,
    Query { text: &'a str, use_search: bool },
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Blank,
        "exit" | "quit" | "/exit" | "/quit" | ":q" => Input::Exit,
        "/reset" => Input::Reset,
        "/history" => Input::History,
        _ => match strip_prefix_ignore_case(line, SEARCH_PREFIX) {
            Some(rest) => Input::Query {
                text: rest.trim(),
                use_search: true,
            },
            None => Input::Query {
                text: line,
                use_search: false,
            },
        },
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &line[prefix.len()..])
}

pub async fn run(config_path: Option<&Path>, knowledge: &[PathBuf]) -> CliResult {
    let config = super::load_config(config_path)?;
    let session = super::start_session(&config, knowledge).await?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Stellar Support — Interactive Chat     ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:    {}", config.provider);
    println!("  Model:       {}", config.model);
    println!("  Knowledge:   {} chunks", session.knowledge_len().await);
    println!(
        "  Web search:  {}",
        if session.has_web_search() { "available (prefix a question with 'search:')" } else { "not configured" }
    );
    println!();
    println!("  Commands: /reset clears the conversation, /history shows it.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Exit => break,
            Input::Blank => {}
            Input::Reset => {
                session.reset().await;
                println!("  Conversation cleared.");
                println!();
            }
            Input::History => print_history(&session).await,
            Input::Query { text, use_search } => {
                if use_search && !session.has_web_search() {
                    eprintln!("  (web search is not configured; answering from the knowledge base)");
                }
                eprint!("  ...");
                let reply = session.respond(text, use_search).await;
                eprint!("\r     \r");
                print_reply(&reply).await?;
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> CliResult {
    print!("  You > ");
    std::io::stdout().flush()?;
    Ok(())
}

async fn print_reply(reply: &Reply) -> CliResult {
    let mut out = std::io::stdout();
    println!();
    print!("  Assistant > ");
    for piece in reply.chunks() {
        print!("{piece}");
        out.flush()?;
        tokio::time::sleep(WORD_DELAY).await;
    }
    println!();
    println!();
    Ok(())
}

async fn print_history(session: &ChatSession) {
    let transcript = session.transcript().await;
    if transcript.is_empty() {
        println!("  (no messages yet)");
    }
    for message in transcript {
        let who = match message.role() {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
        };
        println!("  [{}] {who}: {}", message.timestamp().format("%H:%M:%S"), message.content());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words() {
        for word in ["exit", "quit", "/exit", "/quit", ":q", "  exit  "] {
            assert_eq!(parse_input(word), Input::Exit);
        }
    }

    #[test]
    fn commands_and_blank() {
        assert_eq!(parse_input("/reset"), Input::Reset);
        assert_eq!(parse_input("/history"), Input::History);
        assert_eq!(parse_input("   "), Input::Blank);
    }

    #[test]
    fn plain_question() {
        assert_eq!(
            parse_input("How long do refunds take?"),
            Input::Query { text: "How long do refunds take?", use_search: false }
        );
    }

    #[test]
    fn search_prefix_enables_web_search() {
        assert_eq!(
            parse_input("search: holiday opening hours"),
            Input::Query { text: "holiday opening hours", use_search: true }
        );
        assert_eq!(
            parse_input("Search:latest outage"),
            Input::Query { text: "latest outage", use_search: true }
        );
    }

    #[test]
    fn prefix_check_is_char_safe() {
        assert_eq!(
            parse_input("søk"),
            Input::Query { text: "søk", use_search: false }
        );
    }
}
