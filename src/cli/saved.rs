use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    cli::print_json,
    error,
    error::SpotifyError,
    info,
    spotify::SpotifyClient,
    types::{
        EpisodeListEntry, SavedEpisode, SavedEpisodesOutput, SavedEpisodesPage, SearchSavedOutput,
    },
    utils,
};

/// Page size used while scanning the library for `search`.
const SCAN_PAGE_SIZE: u32 = 50;

/// Upper bound on episodes scanned by `search` (10 pages).
const SCAN_MAX_EPISODES: usize = 500;

/// Lists one page of saved episodes.
pub async fn saved(
    mut client: SpotifyClient,
    limit: u32,
    offset: u32,
    market: Option<String>,
    json: bool,
) {
    let page = match client.saved_episodes(limit, offset, market.as_deref()).await {
        Ok(page) => page,
        Err(e) => error!("{}", e),
    };

    if json {
        print_json(&saved_json(&page));
    } else {
        println!("{}", saved_markdown(&page));
    }
}

/// Searches saved episodes by episode or show name.
pub async fn search(mut client: SpotifyClient, query: String, limit: usize, json: bool) {
    info!("Searching saved episodes for '{}'...", query);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching saved episodes...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let scanned = collect_saved_episodes(&mut client, SCAN_MAX_EPISODES).await;
    pb.finish_and_clear();

    let episodes = match scanned {
        Ok(episodes) => episodes,
        Err(e) => error!("{}", e),
    };

    let matches = utils::filter_saved_episodes(&episodes, &query, limit);
    info!("Found {} matching episodes", matches.len());

    if json {
        print_json(&search_json(&matches, &query));
    } else {
        println!("{}", search_markdown(&matches, &query));
    }
}

/// Pages through the library `SCAN_PAGE_SIZE` at a time until the end or
/// until at least `max` episodes are collected.
pub async fn collect_saved_episodes(
    client: &mut SpotifyClient,
    max: usize,
) -> Result<Vec<SavedEpisode>, SpotifyError> {
    let mut episodes = Vec::new();
    let mut offset = 0;

    while episodes.len() < max {
        let page = client.saved_episodes(SCAN_PAGE_SIZE, offset, None).await?;
        let has_more = page.has_more();
        episodes.extend(page.items);
        if !has_more {
            break;
        }
        offset += SCAN_PAGE_SIZE;
    }

    Ok(episodes)
}

pub fn saved_markdown(page: &SavedEpisodesPage) -> String {
    if page.items.is_empty() {
        return "# Your Saved Episodes\n\nNo saved episodes found.".to_string();
    }

    let mut lines = vec!["# Your Saved Episodes\n".to_string()];
    for (i, saved) in page.items.iter().enumerate() {
        push_entry(&mut lines, page.offset as usize + i + 1, saved);
    }

    let first = page.offset + 1;
    let last = page.offset + page.items.len() as u64;
    if page.has_more() {
        lines.push(format!(
            "\n*Showing episodes {}-{} of {} (more available)*",
            first, last, page.total
        ));
    } else {
        lines.push(format!("\n*Showing episodes {}-{} of {}*", first, last, page.total));
    }

    lines.join("\n")
}

pub fn saved_json(page: &SavedEpisodesPage) -> SavedEpisodesOutput {
    let count = page.items.len();
    SavedEpisodesOutput {
        total: page.total,
        count,
        offset: page.offset,
        limit: page.limit,
        has_more: page.has_more(),
        next_offset: page.has_more().then(|| page.offset + count as u64),
        episodes: page.items.iter().map(EpisodeListEntry::from).collect(),
    }
}

pub fn search_markdown(matches: &[SavedEpisode], query: &str) -> String {
    if matches.is_empty() {
        return format!("# Search Results\n\nNo episodes found matching '{}'", query);
    }

    let mut lines = vec![
        format!("# Search Results for '{}'\n", query),
        format!("Found {} matching episodes\n", matches.len()),
    ];
    for (i, saved) in matches.iter().enumerate() {
        push_entry(&mut lines, i + 1, saved);
    }

    lines.join("\n")
}

pub fn search_json(matches: &[SavedEpisode], query: &str) -> SearchSavedOutput {
    SearchSavedOutput {
        query: query.to_string(),
        count: matches.len(),
        episodes: matches.iter().map(EpisodeListEntry::from).collect(),
    }
}

fn push_entry(lines: &mut Vec<String>, number: usize, saved: &SavedEpisode) {
    let episode = &saved.episode;
    let show_name = episode.show.as_ref().map(|s| s.name.as_str()).unwrap_or("N/A");

    lines.push(format!("{}. **{}**", number, episode.name));
    lines.push(format!("   Show: {}", show_name));
    lines.push(format!("   Released: {}", utils::format_date(&episode.release_date)));
    lines.push(format!("   Added: {}", utils::format_date(&saved.added_at)));
    lines.push(format!(
        "   Duration: {}",
        utils::format_duration_short(episode.duration_ms)
    ));

    if let Some(description) = episode.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("   {}", utils::truncate_description(description)));
    }

    lines.push(String::new());
}
