use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::client::{ApiClient, fallback};
use crate::error::CliResult;
use crate::output::{OutputFormat, offline_notice, print_json, truncate_string};

#[derive(Parser)]
pub struct QuestsCommand {
    #[clap(long, value_name = "OWNER/REPO", help = "Ask the backend to analyze one repository")]
    pub analyze: Option<String>,

    #[clap(
        long,
        value_name = "OWNER/REPO",
        help = "Show raw details for one repository",
        conflicts_with = "analyze"
    )]
    pub detail: Option<String>,
}

impl QuestsCommand {
    pub async fn execute(&self, client: &ApiClient, format: OutputFormat) -> CliResult<()> {
        if let Some(ref target) = self.analyze {
            return Self::analyze(client, target, format).await;
        }
        if let Some(ref target) = self.detail {
            return Self::detail(client, target).await;
        }
        Self::list(client, format).await
    }

    async fn list(client: &ApiClient, format: OutputFormat) -> CliResult<()> {
        let repos = match client.repos().await {
            Some(repos) => repos,
            None => {
                offline_notice("quest log");
                fallback::repos()
            }
        };
        let stats = client
            .quest_stats()
            .await
            .unwrap_or_else(fallback::quest_stats);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "repos": repos.repos,
                    "source": repos.source,
                    "stats": stats,
                });
                print_json(&output)?;
            }
            OutputFormat::Table => {
                if repos.repos.is_empty() {
                    println!("No quests found.");
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Quest", "Description", "Language", "Stars", "Forks", "Status"]);

                for repo in &repos.repos {
                    table.add_row([
                        repo.name.clone(),
                        truncate_string(&repo.description, 50),
                        repo.language.clone(),
                        repo.stars.to_string(),
                        repo.forks.to_string(),
                        repo.status.clone(),
                    ]);
                }

                println!("{table}");
                println!(
                    "\n{} quests ({} active, {} completed), {} stars, {} XP",
                    stats.total_repos,
                    stats.active_quests,
                    stats.completed_quests,
                    stats.total_stars,
                    stats.total_xp
                );
                if !stats.languages.is_empty() {
                    println!("Languages: {}", stats.languages.join(", "));
                }
            }
        }

        Ok(())
    }

    async fn analyze(client: &ApiClient, target: &str, format: OutputFormat) -> CliResult<()> {
        let (owner, repo) = split_repo(target)?;
        let analysis = client
            .analyze_repo(owner, repo)
            .await
            .ok_or_else(|| format!("Analysis unavailable for {owner}/{repo}"))?;

        match format {
            OutputFormat::Json => print_json(&analysis)?,
            OutputFormat::Table => {
                println!("{} - score {:.0}", analysis.repo, analysis.score);
                println!("{}\n", analysis.summary);

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Strengths", "Improvements"]);

                let rows = analysis.strengths.len().max(analysis.improvements.len());
                for i in 0..rows {
                    table.add_row([
                        analysis.strengths.get(i).cloned().unwrap_or_default(),
                        analysis.improvements.get(i).cloned().unwrap_or_default(),
                    ]);
                }
                println!("{table}");
            }
        }

        Ok(())
    }

    async fn detail(client: &ApiClient, target: &str) -> CliResult<()> {
        let (owner, repo) = split_repo(target)?;
        let detail = client
            .repo_detail(owner, repo)
            .await
            .ok_or_else(|| format!("Repository details unavailable for {owner}/{repo}"))?;
        print_json(&detail)
    }
}

/// Split `owner/repo`, rejecting empty halves and extra segments
fn split_repo(target: &str) -> CliResult<(&str, &str)> {
    let is_name = |s: &str| !s.is_empty() && s != "." && s != "..";
    match target.split_once('/') {
        Some((owner, repo)) if is_name(owner) && is_name(repo) && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(format!("Expected OWNER/REPO, got '{target}'").into()),
    }
}
