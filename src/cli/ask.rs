use anyhow::{bail, Result};

use iris::config::{Availability, IrisConfig, Secrets};
use iris::conversation::ConversationMemory;
use iris::oracle::Oracle;
use iris::router::Classification;

/// Answer a single question and print the reply. Fails (non-zero exit) when
/// the question could not be answered.
pub async fn ask(config: &IrisConfig, question: &str) -> Result<()> {
    let secrets = Secrets::from_env();
    let oracle = Oracle::from_config(config, &secrets);
    let database_configured = secrets.status().database == Availability::Present;

    let reply = answer(&oracle, database_configured, question).await?;
    println!("{reply}");
    Ok(())
}

async fn answer(oracle: &Oracle, database_configured: bool, question: &str) -> Result<String> {
    let mut memory = ConversationMemory::new();
    let result = oracle.process(&mut memory, question).await;
    if result.classification == Classification::Error {
        bail!("{}", result.response);
    }
    Ok(super::render_reply(&result, database_configured))
}
