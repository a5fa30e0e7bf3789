//! Response and request bodies of the DevQuest backend API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Gamification
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStat {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub dev_class: String,
    pub level: u32,
    pub xp: u64,
    pub xp_next_level: u64,
    pub avatar_initials: String,
    #[serde(default)]
    pub stats: BTreeMap<String, ProfileStat>,
}

impl Profile {
    /// Progress towards the next level, clamped to `0.0..=1.0`
    pub fn level_progress(&self) -> f64 {
        if self.xp_next_level == 0 {
            return 1.0;
        }
        (self.xp as f64 / self.xp_next_level as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: u32,
    #[serde(rename = "maxLevel")]
    pub max_level: u32,
    pub unlocked: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillBranch {
    pub id: String,
    pub name: String,
    pub color: String,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsResponse {
    pub branches: Vec<SkillBranch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub color: String,
    pub unlocked: bool,
    pub unlock_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub summary: String,
}

// =============================================================================
// GitHub
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    pub stars: u64,
    pub forks: u64,
    pub status: String,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_issues_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReposResponse {
    pub repos: Vec<Repo>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRepoResponse {
    pub repo: String,
    pub score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestStats {
    pub total_repos: u64,
    pub total_stars: u64,
    pub total_xp: u64,
    pub languages: Vec<String>,
    pub active_quests: u64,
    pub completed_quests: u64,
}

// =============================================================================
// CV and Oracle
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvSection {
    pub name: String,
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvAnalysis {
    pub filename: String,
    pub size: u64,
    pub score: f64,
    pub sections: Vec<CvSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub role: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

// =============================================================================
// Blog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    /// Comma-separated tag list
    #[serde(default)]
    pub tags: String,
    pub color: String,
    pub pinned: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl BlogPost {
    pub fn tag_list(&self) -> Vec<&str> {
        split_tags(&self.tags)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostList {
    pub posts: Vec<BlogPost>,
    pub total: usize,
}

/// Body of create and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub color: String,
    pub pinned: bool,
}

impl BlogPostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }
}

impl Default for BlogPostDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: "update".to_string(),
            tags: String::new(),
            color: "#8b5cf6".to_string(),
            pinned: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}
