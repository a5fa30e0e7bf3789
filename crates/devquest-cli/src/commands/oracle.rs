use clap::Parser;

use crate::client::{ApiClient, fallback};
use crate::error::CliResult;
use crate::output::{OutputFormat, offline_notice, print_json};

#[derive(Parser)]
pub struct OracleCommand {
    #[clap(help = "Question for the Oracle")]
    pub message: String,
}

impl OracleCommand {
    pub async fn execute(&self, client: &ApiClient, format: OutputFormat) -> CliResult<()> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err("The Oracle needs a question".into());
        }

        let reply = match client.chat(message).await {
            Some(reply) => reply,
            None => {
                offline_notice("Oracle");
                fallback::oracle_greeting()
            }
        };

        match format {
            OutputFormat::Json => print_json(&reply)?,
            OutputFormat::Table => {
                match reply.topic {
                    Some(ref topic) => println!("Oracle [{topic}]:"),
                    None => println!("Oracle:"),
                }
                println!("{}", reply.text);
            }
        }

        Ok(())
    }
}
