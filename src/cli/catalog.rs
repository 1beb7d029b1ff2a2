use serde_json::{Value, json};

use crate::{cli::print_json, error, spotify::SpotifyClient, types::SearchResult, utils};

pub struct CatalogQuery {
    pub query: String,
    pub types: String,
    pub limit: u32,
    pub offset: u32,
    pub market: Option<String>,
}

/// Searches the public catalog through the search endpoint.
pub async fn catalog(mut client: SpotifyClient, q: CatalogQuery, json: bool) {
    let result = match client
        .search(&q.query, &q.types, q.limit, q.offset, q.market.as_deref())
        .await
    {
        Ok(result) => result,
        Err(e) => error!("{}", e),
    };

    if json {
        print_json(&catalog_json(&result, &q.query));
    } else {
        println!("{}", catalog_markdown(&result, &q.query));
    }
}

pub fn catalog_markdown(result: &SearchResult, query: &str) -> String {
    let mut lines = vec![format!("# Catalog Search for '{}'\n", query)];
    let mut found = false;

    if let Some(page) = &result.episodes {
        let episodes: Vec<_> = page.items.iter().flatten().collect();
        if !episodes.is_empty() {
            found = true;
            lines.push(format!("## Episodes ({} total)\n", page.total));
            for (i, episode) in episodes.iter().enumerate() {
                lines.push(format!(
                    "{}. **{}**",
                    page.offset as usize + i + 1,
                    episode.name
                ));
                lines.push(format!(
                    "   Released: {}",
                    utils::format_date(&episode.release_date)
                ));
                lines.push(format!(
                    "   Duration: {}",
                    utils::format_duration_short(episode.duration_ms)
                ));
                lines.push(format!("   ID: {}", episode.id));
                lines.push(String::new());
            }
        }
    }

    if let Some(page) = &result.shows {
        let shows: Vec<_> = page.items.iter().flatten().collect();
        if !shows.is_empty() {
            found = true;
            lines.push(format!("## Shows ({} total)\n", page.total));
            for (i, show) in shows.iter().enumerate() {
                lines.push(format!("{}. **{}**", page.offset as usize + i + 1, show.name));
                lines.push(format!("   Publisher: {}", show.publisher));
                if let Some(total) = show.total_episodes {
                    lines.push(format!("   Episodes: {}", total));
                }
                lines.push(format!("   ID: {}", show.id));
                lines.push(String::new());
            }
        }
    }

    if !found {
        lines.push(format!("No results found matching '{}'", query));
    }

    lines.join("\n")
}

pub fn catalog_json(result: &SearchResult, query: &str) -> Value {
    let episodes: Vec<_> = result
        .episodes
        .iter()
        .flat_map(|page| page.items.iter().flatten())
        .map(|episode| {
            json!({
                "id": episode.id,
                "name": episode.name,
                "release_date": episode.release_date,
                "duration_ms": episode.duration_ms,
                "description": episode.description.clone().unwrap_or_default(),
                "uri": episode.uri,
                "external_urls": episode.external_urls,
            })
        })
        .collect();

    let shows: Vec<_> = result
        .shows
        .iter()
        .flat_map(|page| page.items.iter().flatten())
        .map(|show| {
            json!({
                "id": show.id,
                "name": show.name,
                "publisher": show.publisher,
                "total_episodes": show.total_episodes,
                "uri": show.uri,
                "external_urls": show.external_urls,
            })
        })
        .collect();

    json!({
        "query": query,
        "episodes": episodes,
        "shows": shows,
    })
}
