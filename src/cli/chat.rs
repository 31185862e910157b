//! CLI `chat` command: a line-based session with one in-process memory.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use iris::config::{Availability, IrisConfig, Secrets};
use iris::conversation::{ConversationMemory, HISTORY_VIEW_LEN};
use iris::oracle::Oracle;

pub async fn chat(config: &IrisConfig) -> Result<()> {
    let secrets = Secrets::from_env();
    let oracle = Oracle::from_config(config, &secrets);
    let database_configured = secrets.status().database == Availability::Present;
    let mut memory = ConversationMemory::new();

    match oracle.init_error() {
        None => println!("IRIS ready. Type /history to review, /quit to leave."),
        Some(reason) => println!("IRIS is not available: {reason}"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                print_history(&memory);
                continue;
            }
            _ => {}
        }

        let result = oracle.process(&mut memory, line).await;
        println!("{}\n", super::render_reply(&result, database_configured));
    }

    Ok(())
}

fn print_history(memory: &ConversationMemory) {
    if memory.is_empty() {
        println!("No history yet.");
        return;
    }
    for exchange in memory.recent(HISTORY_VIEW_LEN) {
        println!(
            "[{}] ({}) you: {}",
            exchange.at.format("%H:%M:%S"),
            exchange.classification,
            exchange.user
        );
        println!("    iris: {}", exchange.assistant);
    }
}
