use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::client::{ApiClient, BlogPost, BlogPostDraft, fallback};
use crate::error::CliResult;
use crate::output::{OutputFormat, format_date, offline_notice, print_json, truncate_string};

#[derive(Parser)]
pub struct BlogCommand {
    #[clap(subcommand)]
    pub command: BlogSubcommand,
}

#[derive(Subcommand)]
pub enum BlogSubcommand {
    #[clap(about = "List tavern board posts")]
    List(ListArgs),

    #[clap(about = "Show one post")]
    Show(ShowArgs),

    #[clap(about = "Publish a new post")]
    Post(DraftArgs),

    #[clap(about = "Replace an existing post")]
    Edit(EditArgs),

    #[clap(about = "Delete a post")]
    Delete(DeleteArgs),
}

#[derive(Parser)]
pub struct ListArgs {
    #[clap(long, help = "Only show posts in this category")]
    pub category: Option<String>,
}

#[derive(Parser)]
pub struct ShowArgs {
    #[clap(help = "Post ID")]
    pub id: i64,
}

#[derive(Parser)]
pub struct DeleteArgs {
    #[clap(help = "Post ID to delete")]
    pub id: i64,
}

#[derive(Parser)]
pub struct DraftArgs {
    #[clap(long, help = "Post title")]
    pub title: String,

    #[clap(long, help = "Post body (markdown)")]
    pub content: String,

    #[clap(long, default_value = "update", help = "Category (update, achievement, project, ...)")]
    pub category: String,

    #[clap(long, default_value = "", help = "Comma-separated tags")]
    pub tags: String,

    #[clap(long, default_value = "#8b5cf6", help = "Accent color")]
    pub color: String,

    #[clap(long, help = "Pin the post to the top of the board")]
    pub pinned: bool,
}

impl DraftArgs {
    fn to_draft(&self) -> BlogPostDraft {
        BlogPostDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            color: self.color.clone(),
            pinned: self.pinned,
        }
    }
}

#[derive(Parser)]
pub struct EditArgs {
    #[clap(help = "Post ID to replace")]
    pub id: i64,

    #[clap(flatten)]
    pub draft: DraftArgs,
}

impl BlogCommand {
    pub async fn execute(&self, client: &ApiClient, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            BlogSubcommand::List(args) => Self::list(client, args, format).await,
            BlogSubcommand::Show(args) => Self::show(client, args, format).await,
            BlogSubcommand::Post(args) => Self::post(client, args, format).await,
            BlogSubcommand::Edit(args) => Self::edit(client, args, format).await,
            BlogSubcommand::Delete(args) => Self::delete(client, args, format).await,
        }
    }

    async fn list(client: &ApiClient, args: &ListArgs, format: OutputFormat) -> CliResult<()> {
        let mut posts = match client.blog_posts().await {
            Some(list) => list.posts,
            None => {
                offline_notice("tavern board");
                fallback::blog_posts()
            }
        };

        if let Some(ref category) = args.category {
            posts.retain(|p| p.category.eq_ignore_ascii_case(category));
        }
        sort_for_board(&mut posts);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "posts": posts,
                    "total": posts.len(),
                });
                print_json(&output)?;
            }
            OutputFormat::Table => {
                if posts.is_empty() {
                    println!("No posts found.");
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["ID", "Title", "Category", "Tags", "Date", "Pinned"]);

                for post in &posts {
                    table.add_row([
                        post.id.to_string(),
                        truncate_string(&post.title, 40),
                        post.category.clone(),
                        truncate_string(&post.tag_list().join(", "), 30),
                        format_date(&post.created_at).to_string(),
                        if post.pinned { "*" } else { "" }.to_string(),
                    ]);
                }

                println!("{table}");
                println!("\nTotal: {} posts", posts.len());
            }
        }

        Ok(())
    }

    async fn show(client: &ApiClient, args: &ShowArgs, format: OutputFormat) -> CliResult<()> {
        let post = match client.blog_post(args.id).await {
            Some(post) => post,
            None => {
                let post = fallback::blog_posts()
                    .into_iter()
                    .find(|p| p.id == args.id)
                    .ok_or_else(|| format!("Post not found: {}", args.id))?;
                offline_notice("post");
                post
            }
        };

        match format {
            OutputFormat::Json => print_json(&post)?,
            OutputFormat::Table => print_post(&post),
        }

        Ok(())
    }

    async fn post(client: &ApiClient, args: &DraftArgs, format: OutputFormat) -> CliResult<()> {
        let post = client
            .create_blog_post(&args.to_draft())
            .await
            .ok_or("Failed to publish post")?;

        match format {
            OutputFormat::Json => print_json(&post)?,
            OutputFormat::Table => println!("Published post {}: {}", post.id, post.title),
        }

        Ok(())
    }

    async fn edit(client: &ApiClient, args: &EditArgs, format: OutputFormat) -> CliResult<()> {
        let post = client
            .update_blog_post(args.id, &args.draft.to_draft())
            .await
            .ok_or_else(|| format!("Failed to update post {}", args.id))?;

        match format {
            OutputFormat::Json => print_json(&post)?,
            OutputFormat::Table => println!("Updated post {}: {}", post.id, post.title),
        }

        Ok(())
    }

    async fn delete(client: &ApiClient, args: &DeleteArgs, format: OutputFormat) -> CliResult<()> {
        if client.delete_blog_post(args.id).await != Some(true) {
            return Err(format!("Failed to delete post {}", args.id).into());
        }

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "id": args.id,
                    "deleted": true,
                });
                print_json(&output)?;
            }
            OutputFormat::Table => println!("Deleted post {}", args.id),
        }

        Ok(())
    }
}

/// Pinned posts first, then newest first
fn sort_for_board(posts: &mut [BlogPost]) {
    posts.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

fn print_post(post: &BlogPost) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Property", "Value"]);

    table.add_row(["ID", &post.id.to_string()]);
    table.add_row(["Title", &post.title]);
    table.add_row(["Category", &post.category]);
    table.add_row(["Tags", &post.tag_list().join(", ")]);
    table.add_row(["Pinned", if post.pinned { "yes" } else { "no" }]);
    table.add_row(["Created", &post.created_at]);
    table.add_row(["Updated", &post.updated_at]);

    println!("{table}\n");
    println!("{}", post.content);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(posts: &[BlogPost]) -> Vec<i64> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_sort_for_board() {
        let mut posts = fallback::blog_posts();
        posts.reverse();

        sort_for_board(&mut posts);
        assert_eq!(ids(&posts), vec![1, 4, 3, 2]);
    }

    #[test]
    fn test_sort_for_board_pinned_beats_newer() {
        let mut posts = fallback::blog_posts();
        for post in &mut posts {
            post.pinned = post.id == 2;
        }

        sort_for_board(&mut posts);
        assert_eq!(ids(&posts), vec![2, 1, 4, 3]);
    }
}
