//! Demo dataset seeding.
//!
//! Provisions a handful of founder profiles with bearer tokens, a few
//! upcoming events, and a short conversation so a fresh install has
//! something to show. Tokens are printed once; they are the only way to
//! authenticate against the API.

use std::path::Path;

use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use tracing::info;

use foundernet::config::Config;
use foundernet::store::{
    Credential, Event, EventStore, FundingStage, Industry, MessageStore, User, UserStore,
};

pub async fn run(config_path: &str, data_dir_override: Option<&Path>, force: bool) -> Result<()> {
    let config = Config::load(config_path).await?;
    let data_dir = super::resolve_data_dir(config_path, &config, data_dir_override);

    if !force && dir_has_entries(&data_dir)? {
        bail!(
            "data directory '{}' is not empty; pass --force to seed anyway",
            data_dir.display()
        );
    }

    let state = super::open_state(&data_dir).await?;

    let users = demo_users();
    for user in &users {
        state.users.create(user.clone()).await?;
    }
    info!(count = users.len(), "Users seeded");

    let events = demo_events(&users);
    let event_count = events.len();
    for event in events {
        state.events.create(event).await?;
    }
    info!(count = event_count, "Events seeded");

    let sarah = &users[0].id;
    let marcus = &users[1].id;
    state
        .messages
        .create(
            marcus,
            sarah,
            "Hi Sarah! I saw your EcoTech Solutions profile. Would love to connect and \
             discuss potential collaboration opportunities.",
        )
        .await?;
    state
        .messages
        .create(
            sarah,
            marcus,
            "Hi Marcus! Thanks for reaching out. I'd be interested in learning more about \
             HealthBridge. Are you available for a quick call this week?",
        )
        .await?;
    // Mark the opening exchange read, then land one unread follow-up.
    state.messages.mark_read(marcus, sarah).await?;
    state.messages.mark_read(sarah, marcus).await?;
    state
        .messages
        .create(
            marcus,
            sarah,
            "Absolutely! I'm free Thursday afternoon. How does 2 PM PST work for you?",
        )
        .await?;
    info!(count = 3, "Messages seeded");

    println!("Seeded {} users into {}", users.len(), data_dir.display());
    println!();
    println!("Bearer tokens (store these; they are not shown again):");
    for user in &users {
        println!("  {:<18} {}", user.name, user.credential.token);
    }

    Ok(())
}

fn dir_has_entries(dir: &Path) -> Result<bool> {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn demo_user(
    name: &str,
    email: &str,
    startup_name: &str,
    industry: Industry,
    funding_stage: FundingStage,
    location: &str,
    bio: &str,
) -> User {
    let now = Utc::now();
    User {
        id: User::new_id(),
        name: name.to_string(),
        email: email.to_string(),
        startup_name: startup_name.to_string(),
        industry,
        funding_stage,
        location: location.to_string(),
        bio: bio.to_string(),
        profile_image: None,
        is_active: true,
        last_seen: now,
        created_at: now,
        updated_at: now,
        credential: Credential::generate(),
    }
}

fn demo_users() -> Vec<User> {
    vec![
        demo_user(
            "Sarah Chen",
            "sarah@techstartup.com",
            "EcoTech Solutions",
            Industry::CleanTech,
            FundingStage::Seed,
            "San Francisco, CA",
            "Building sustainable technology solutions for a greener future. Former Google \
             engineer with 8 years of experience in developing scalable systems.",
        ),
        demo_user(
            "Marcus Rodriguez",
            "marcus@healthapp.com",
            "HealthBridge",
            Industry::HealthTech,
            FundingStage::SeriesA,
            "Austin, TX",
            "Democratizing healthcare access through innovative mobile solutions. Medical \
             doctor turned entrepreneur with a passion for improving patient outcomes.",
        ),
        demo_user(
            "Emily Johnson",
            "emily@financeai.com",
            "FinanceAI",
            Industry::FinTech,
            FundingStage::PreSeed,
            "New York, NY",
            "Using AI to make personal finance management accessible to everyone. Former \
             Goldman Sachs analyst with expertise in algorithmic trading.",
        ),
        demo_user(
            "David Kim",
            "david@eduplatform.com",
            "LearnTogether",
            Industry::EdTech,
            FundingStage::Seed,
            "Seattle, WA",
            "Revolutionizing online education with peer-to-peer learning platforms. Former \
             Microsoft product manager with a vision for accessible education.",
        ),
        demo_user(
            "Lisa Park",
            "lisa@foodtech.com",
            "FreshFood",
            Industry::FoodTech,
            FundingStage::SeriesA,
            "Los Angeles, CA",
            "Connecting local farmers with urban consumers through our innovative supply \
             chain platform. Passionate about sustainable food systems.",
        ),
    ]
}

fn demo_events(users: &[User]) -> Vec<Event> {
    let now = Utc::now();
    vec![
        Event {
            id: Event::new_id(),
            title: "Startup Pitch Night".to_string(),
            description: "Join us for an evening of innovative startup pitches and networking \
                          with fellow entrepreneurs. Great opportunity to showcase your startup \
                          and get feedback from experienced founders."
                .to_string(),
            date: now + Duration::days(14),
            time: "18:00".to_string(),
            location: "TechHub San Francisco".to_string(),
            organizer: users[0].id.clone(),
            attendees: vec![users[2].id.clone(), users[3].id.clone()],
            max_attendees: 50,
            tags: vec![
                "Networking".to_string(),
                "Pitching".to_string(),
                "Venture Capital".to_string(),
            ],
            image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
        Event {
            id: Event::new_id(),
            title: "HealthTech Founders Meetup".to_string(),
            description: "Monthly gathering for healthcare technology entrepreneurs to share \
                          insights and collaborate on solving healthcare challenges."
                .to_string(),
            date: now + Duration::days(17),
            time: "19:00".to_string(),
            location: "Austin Convention Center".to_string(),
            organizer: users[1].id.clone(),
            attendees: vec![users[4].id.clone()],
            max_attendees: 30,
            tags: vec![
                "HealthTech".to_string(),
                "Networking".to_string(),
                "Innovation".to_string(),
            ],
            image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
        Event {
            id: Event::new_id(),
            title: "FinTech Summit 2026".to_string(),
            description: "Two-day summit featuring the latest trends in financial technology \
                          and regulatory updates. Network with industry leaders and investors."
                .to_string(),
            date: now + Duration::days(30),
            time: "09:00".to_string(),
            location: "New York Financial District".to_string(),
            organizer: users[2].id.clone(),
            attendees: vec![users[0].id.clone(), users[1].id.clone()],
            max_attendees: 200,
            tags: vec![
                "FinTech".to_string(),
                "Summit".to_string(),
                "Regulation".to_string(),
            ],
            image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    ]
}
