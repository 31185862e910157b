//! CLI `status` command: print secret availability and initialization state.

use iris::config::{Availability, IrisConfig, Secrets};
use iris::oracle::Oracle;

pub fn status(config: &IrisConfig) {
    let oracle = Oracle::from_config(config, &Secrets::from_env());
    let status = oracle.status();

    println!("IRIS Status");
    println!("===========");
    println!();
    println!("OpenAI key:        {}", mark(status.secrets.openai, false));
    println!("Wolfram AppID:     {}", mark(status.secrets.wolfram, false));
    println!("Notion token:      {}", mark(status.secrets.notion, false));
    println!("Notion database:   {}", mark(status.secrets.database, true));
    println!();
    match status.error {
        None => println!("Core:              initialized"),
        Some(reason) => println!("Core:              NOT initialized ({reason})"),
    }
}

fn mark(availability: Availability, optional: bool) -> String {
    match (availability, optional) {
        (Availability::Present, _) => "OK".into(),
        (Availability::Missing, true) => "not set (interactions will not be saved)".into(),
        (Availability::Missing, false) => "MISSING".into(),
        (Availability::Unused, _) => "set but unused (no Notion token)".into(),
    }
}
