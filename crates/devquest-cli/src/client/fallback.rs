//! Offline placeholder data shown when the backend cannot be reached

use std::collections::BTreeMap;

use super::types::{BlogPost, ChatReply, Profile, ProfileStat, QuestStats, Repo, ReposResponse};

pub const ORACLE_GREETING: &str = "Greetings, adventurer. I am the Oracle of DevQuest. \
Ask me about your career path, skills to develop, or how to level up your profile.";

pub fn profile() -> Profile {
    let mut stats = BTreeMap::new();
    stats.insert(
        "level".to_string(),
        ProfileStat {
            value: 15.0,
            label: "Level".to_string(),
        },
    );
    stats.insert(
        "xp".to_string(),
        ProfileStat {
            value: 6450.0,
            label: "Total XP".to_string(),
        },
    );

    Profile {
        name: "DevQuest Hero".to_string(),
        title: "Developer".to_string(),
        dev_class: "Full-Stack Mage".to_string(),
        level: 15,
        xp: 6450,
        xp_next_level: 10000,
        avatar_initials: "DQ".to_string(),
        stats,
    }
}

fn quest(name: &str, description: &str, language: &str, stars: u64, forks: u64, status: &str) -> Repo {
    Repo {
        name: name.to_string(),
        description: description.to_string(),
        language: language.to_string(),
        stars,
        forks,
        status: status.to_string(),
        rarity: String::new(),
        xp: 0,
        html_url: String::new(),
        updated_at: String::new(),
        homepage: None,
        topics: None,
        open_issues_count: None,
        owner: None,
    }
}

pub fn repos() -> ReposResponse {
    ReposResponse {
        repos: vec![
            quest(
                "DevQuest Portfolio",
                "Gamified career intelligence platform with RPG mechanics",
                "TypeScript",
                12,
                3,
                "Active",
            ),
            quest(
                "ML Pipeline Engine",
                "Automated machine learning pipeline orchestration tool",
                "Python",
                34,
                8,
                "Completed",
            ),
            quest(
                "Real-Time Chat API",
                "WebSocket-based messaging system with end-to-end encryption",
                "Go",
                21,
                5,
                "Completed",
            ),
        ],
        source: "offline".to_string(),
    }
}

/// Quest statistics derived from the offline quest list
pub fn quest_stats() -> QuestStats {
    let repos = repos().repos;
    let mut languages: Vec<String> = Vec::new();
    for repo in &repos {
        if !languages.contains(&repo.language) {
            languages.push(repo.language.clone());
        }
    }

    QuestStats {
        total_repos: repos.len() as u64,
        total_stars: repos.iter().map(|r| r.stars).sum(),
        total_xp: repos.iter().map(|r| r.xp).sum(),
        languages,
        active_quests: repos.iter().filter(|r| r.status == "Active").count() as u64,
        completed_quests: repos.iter().filter(|r| r.status == "Completed").count() as u64,
    }
}

pub fn oracle_greeting() -> ChatReply {
    ChatReply {
        role: "oracle".to_string(),
        text: ORACLE_GREETING.to_string(),
        topic: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn post(
    id: i64,
    title: &str,
    content: &str,
    category: &str,
    tags: &str,
    color: &str,
    pinned: bool,
    created_at: &str,
) -> BlogPost {
    BlogPost {
        id,
        title: title.to_string(),
        content: content.to_string(),
        category: category.to_string(),
        tags: tags.to_string(),
        color: color.to_string(),
        pinned,
        created_at: created_at.to_string(),
        updated_at: created_at.to_string(),
    }
}

/// Offline tavern board, pinned first then newest first
pub fn blog_posts() -> Vec<BlogPost> {
    vec![
        post(
            1,
            "Won ActInSpace Hackathon - 1st Place!",
            "Our team competed in the ActInSpace international hackathon in France and \
             took 1st place with satellite data and AI-powered analytics.",
            "achievement",
            "hackathon,space-tech,innovation,france,1st-place",
            "#f0c040",
            true,
            "2026-01-20T10:00:00",
        ),
        post(
            4,
            "2nd Place at AKCIT Hackathon",
            "A Generative AI pipeline for automated document analysis, built in 48 hours.",
            "achievement",
            "hackathon,generative-ai,nlp,2nd-place",
            "#22c55e",
            false,
            "2025-10-05T18:00:00",
        ),
        post(
            3,
            "DevQuest: Building My Career as an RPG",
            "DevQuest turns a developer career into an RPG: skill tree, quest log, \
             chronicle and an Oracle advisor.",
            "project",
            "devquest,react,fastapi,portfolio,typescript",
            "#3b82f6",
            false,
            "2025-06-10T14:00:00",
        ),
        post(
            2,
            "Started AI Residency at SENAI/SC",
            "Machine learning, computer vision, generative AI and MLOps for industry.",
            "update",
            "ai,machine-learning,senai,career,education",
            "#8b5cf6",
            false,
            "2025-03-15T09:00:00",
        ),
    ]
}
