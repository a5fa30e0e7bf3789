use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::PathBuf;

use crate::client::{ApiClient, CvAnalysis};
use crate::error::CliResult;
use crate::output::{OutputFormat, print_json};

#[derive(Parser)]
pub struct CvCommand {
    #[clap(help = "CV file to upload; omit to show the latest analysis")]
    pub file: Option<PathBuf>,
}

impl CvCommand {
    pub async fn execute(&self, client: &ApiClient, format: OutputFormat) -> CliResult<()> {
        let analysis = match self.file {
            Some(ref path) => {
                let bytes = tokio::fs::read(path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "cv".to_string());
                tracing::debug!("Uploading {} ({} bytes)", file_name, bytes.len());
                client.upload_cv(&file_name, bytes).await
            }
            None => client.cv_analysis().await,
        };

        // No offline placeholder exists for a personal CV analysis
        let analysis = analysis.ok_or("CV analysis unavailable: backend unreachable or rejected the request")?;

        match format {
            OutputFormat::Json => print_json(&analysis)?,
            OutputFormat::Table => print_analysis(&analysis),
        }

        Ok(())
    }
}

fn print_analysis(analysis: &CvAnalysis) {
    println!(
        "{} ({} bytes) - overall score {:.0}",
        analysis.filename, analysis.size, analysis.score
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Section", "Score", "Feedback"]);

    for section in &analysis.sections {
        table.add_row([
            section.name.clone(),
            format!("{:.0}", section.score),
            section.feedback.clone(),
        ]);
    }

    println!("{table}");
}
