//! Benchmark utilities.

use rand::Rng;
use time::{Duration, OffsetDateTime};
use widerepo_testkit::Playlist;

const TAGS: [&str; 4] = ["rock", "jazz", "indie", "ambient"];

/// Generate a random instant within a few years of 2020.
pub fn random_instant() -> OffsetDateTime {
    let mut rng = rand::thread_rng();
    OffsetDateTime::UNIX_EPOCH
        + Duration::days(18_262)
        + Duration::milliseconds(rng.gen_range(0..150_000_000_000))
}

/// Generate `count` playlists spread over `users` owners, with random plays,
/// creation times and tags.
pub fn generate_playlists(users: usize, count: usize) -> Vec<Playlist> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let user = format!("user{:03}", i % users.max(1));
            let tag = TAGS[rng.gen_range(0..TAGS.len())];
            Playlist::new(user, format!("list{i:06}"))
                .plays(rng.gen_range(0..10_000))
                .created(random_instant())
                .tags([tag])
        })
        .collect()
}
