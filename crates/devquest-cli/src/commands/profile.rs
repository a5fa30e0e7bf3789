use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::client::{ApiClient, fallback};
use crate::error::CliResult;
use crate::output::{OutputFormat, offline_notice, print_json, truncate_string};

#[derive(Parser)]
pub struct ProfileCommand {
    #[clap(long, help = "Also show the skill tree")]
    pub skills: bool,

    #[clap(long, help = "Also show achievements")]
    pub achievements: bool,

    #[clap(long, help = "Also show the GitHub profile")]
    pub github: bool,
}

impl ProfileCommand {
    pub async fn execute(&self, client: &ApiClient, format: OutputFormat) -> CliResult<()> {
        let profile = match client.profile().await {
            Some(profile) => profile,
            None => {
                offline_notice("profile");
                fallback::profile()
            }
        };
        let summary = client.weekly_summary().await.map(|s| s.summary);
        let skills = if self.skills { client.skills().await } else { None };
        let achievements = if self.achievements {
            client.achievements().await
        } else {
            None
        };
        let github = if self.github {
            client.github_profile().await
        } else {
            None
        };

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "profile": profile,
                    "weekly_summary": summary,
                    "skills": skills,
                    "achievements": achievements,
                    "github": github,
                });
                print_json(&output)?;
            }
            OutputFormat::Table => {
                println!("{} - {}", profile.name, profile.dev_class);
                println!("======================\n");

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Property", "Value"]);

                table.add_row(["Title", &profile.title]);
                table.add_row(["Level", &profile.level.to_string()]);
                table.add_row([
                    "XP".to_string(),
                    format!(
                        "{} / {} ({:.0}%)",
                        profile.xp,
                        profile.xp_next_level,
                        profile.level_progress() * 100.0
                    ),
                ]);
                for stat in profile.stats.values() {
                    table.add_row([stat.label.clone(), stat.value.to_string()]);
                }
                println!("{table}");

                if let Some(summary) = summary {
                    println!("\nThis week: {summary}");
                }

                if self.skills {
                    match skills {
                        Some(skills) => {
                            let mut table = Table::new();
                            table
                                .load_preset(UTF8_FULL_CONDENSED)
                                .set_content_arrangement(ContentArrangement::Dynamic)
                                .set_header(["Branch", "Skill", "Level", "Unlocked"]);
                            for branch in &skills.branches {
                                for skill in &branch.skills {
                                    table.add_row([
                                        branch.name.clone(),
                                        skill.name.clone(),
                                        format!("{}/{}", skill.level, skill.max_level),
                                        if skill.unlocked { "yes" } else { "no" }.to_string(),
                                    ]);
                                }
                            }
                            println!("\n{table}");
                        }
                        None => offline_notice("skill tree (none available)"),
                    }
                }

                if self.achievements {
                    match achievements {
                        Some(achievements) => {
                            let mut table = Table::new();
                            table
                                .load_preset(UTF8_FULL_CONDENSED)
                                .set_content_arrangement(ContentArrangement::Dynamic)
                                .set_header(["Achievement", "Category", "Description", "Unlocked On"]);
                            for achievement in &achievements.achievements {
                                table.add_row([
                                    achievement.name.clone(),
                                    achievement.category.clone(),
                                    truncate_string(&achievement.description, 50),
                                    achievement
                                        .unlock_date
                                        .clone()
                                        .unwrap_or_else(|| "-".to_string()),
                                ]);
                            }
                            println!("\n{table}");
                        }
                        None => offline_notice("achievements (none available)"),
                    }
                }

                if self.github {
                    match github.as_ref().and_then(|g| g.as_object()) {
                        Some(fields) => {
                            let mut table = Table::new();
                            table
                                .load_preset(UTF8_FULL_CONDENSED)
                                .set_content_arrangement(ContentArrangement::Dynamic)
                                .set_header(["GitHub", "Value"]);
                            for (key, value) in fields {
                                if let Some(text) = scalar_text(value) {
                                    table.add_row([key.clone(), truncate_string(&text, 60)]);
                                }
                            }
                            println!("\n{table}");
                        }
                        None => offline_notice("GitHub profile (none available)"),
                    }
                }
            }
        }

        Ok(())
    }
}

/// Display text for a top-level JSON value; nested objects and arrays are skipped
fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => Some("-".to_string()),
        _ => None,
    }
}
