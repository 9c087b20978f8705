//! Provisioning of the club catalogue and the bootstrap admin account.

use crate::{
    auth,
    models::{Club, NewClub, NewUser, Role},
    store::Store,
    validation::normalize_username,
};
use tracing::info;

pub struct ClubSeed {
    pub name: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub head_username: &'static str,
}

pub const CLUBS: &[ClubSeed] = &[
    ClubSeed {
        name: "Organisation Committee",
        slug: "organisation-committee",
        description: "Handles all event organization.",
        image: "organisation.png",
        head_username: "org-committee-head",
    },
    ClubSeed {
        name: "Public Relations",
        slug: "public-relations",
        description: "Manages PR and outreach.",
        image: "publicrelation.png",
        head_username: "Publicrelation-head",
    },
    ClubSeed {
        name: "Aalap",
        slug: "aalap",
        description: "Music and club.",
        image: "Aalap.png",
        head_username: "Alap-head",
    },
    ClubSeed {
        name: "Abhinaya",
        slug: "abhinaya",
        description: "Drama and theatre club.",
        image: "Abhinaya.png",
        head_username: "Abhinaya-head",
    },
    ClubSeed {
        name: "Aakarshan",
        slug: "aakarshan",
        description: "Art club.",
        image: "akarshan.png",
        head_username: "Akarshan-head",
    },
    ClubSeed {
        name: "Kreeda Sports Club",
        slug: "kreeda-sports-club",
        description: "Sports and games club.",
        image: "Kreeda.png",
        head_username: "Kreeda-sports-head",
    },
    ClubSeed {
        name: "Mudra",
        slug: "mudra",
        description: "Dance club.",
        image: "Mudra.png",
        head_username: "Mudra-head",
    },
    ClubSeed {
        name: "Traces of Lenses",
        slug: "traces-of-lenses",
        description: "Photography club.",
        image: "Traces.png",
        head_username: "Traces-head",
    },
    ClubSeed {
        name: "Kaivalya",
        slug: "kaivalya",
        description: "Yoga and wellness club.",
        image: "Kaivalya.png",
        head_username: "Kaivalya-head",
    },
    ClubSeed {
        name: "Kmitra",
        slug: "kmitra",
        description: "Innovation and technology club.",
        image: "Kmitra.png",
        head_username: "Kmitra-head",
    },
    ClubSeed {
        name: "Recurse",
        slug: "recurse",
        description: "Coding and algorithms club.",
        image: "Recurse.png",
        head_username: "Rescurse-head",
    },
    ClubSeed {
        name: "Vachan",
        slug: "vachan",
        description: "Literature and reading club.",
        image: "vachan.png",
        head_username: "Vachan-head",
    },
];

/// Inserts one club unless its slug or head username is taken.
pub async fn insert_club(store: &dyn Store, seed: &ClubSeed) -> anyhow::Result<Option<Club>> {
    let club = store
        .insert_club(NewClub {
            slug: seed.slug.to_string(),
            name: seed.name.to_string(),
            head_username: Some(normalize_username(seed.head_username)),
            // head recovery secret, handed out of band
            password_hash: auth::hash_password(rand::random::<[u8; 32]>())?,
            description: seed.description.to_string(),
            image: seed.image.to_string(),
        })
        .await?;
    Ok(club)
}

pub async fn seed_clubs(store: &dyn Store) -> anyhow::Result<usize> {
    let existing = store.list_clubs().await?;
    let mut inserted = 0;
    for seed in CLUBS {
        if existing.iter().any(|c| c.slug == seed.slug) {
            continue;
        }
        if insert_club(store, seed).await?.is_some() {
            inserted += 1;
        }
    }
    info!(inserted, total = CLUBS.len(), "club catalogue seeded");
    Ok(inserted)
}

/// Creates the admin account unless one with that username exists.
pub async fn ensure_admin(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    let username = normalize_username(username);
    if store.find_user(Role::Admin, &username).await?.is_some() {
        return Ok(false);
    }

    store
        .insert_user(NewUser {
            role: Role::Admin,
            username: username.clone(),
            name: "Administrator".to_string(),
            password_hash: auth::hash_password(password)?,
            roll_number: None,
            email: None,
            club_id: None,
            active: true,
        })
        .await?;
    info!(%username, "bootstrap admin created");
    Ok(true)
}
