use serde_json::{Value, json};

use crate::{cli::print_json, error, spotify::SpotifyClient, types::Episode, utils};

pub async fn episode(
    mut client: SpotifyClient,
    episode_id: String,
    market: Option<String>,
    json: bool,
) {
    let episode = match client.episode(&episode_id, market.as_deref()).await {
        Ok(episode) => episode,
        Err(e) => error!("{}", e),
    };

    if json {
        print_json(&episode_json(&episode));
    } else {
        println!("{}", episode_markdown(&episode));
    }
}

pub fn episode_markdown(episode: &Episode) -> String {
    let mut lines = vec![format!("# {}\n", episode.name)];

    let (show_name, publisher) = match &episode.show {
        Some(show) => (
            show.name.as_str(),
            show.publisher.as_deref().unwrap_or("N/A"),
        ),
        None => ("N/A", "N/A"),
    };

    lines.push(format!("**Show**: {}", show_name));
    lines.push(format!("**Publisher**: {}", publisher));
    lines.push(format!("**Released**: {}", utils::format_date(&episode.release_date)));
    lines.push(format!("**Duration**: {}", utils::format_duration_long(episode.duration_ms)));
    lines.push(format!("**Language**: {}", episode.language.as_deref().unwrap_or("N/A")));
    lines.push(format!("**Explicit**: {}", if episode.explicit { "Yes" } else { "No" }));
    lines.push(format!("**Type**: {}", episode.kind.as_deref().unwrap_or("episode")));
    lines.push(String::new());

    if let Some(description) = episode.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push("## Description\n".to_string());
        lines.push(description.to_string());
        lines.push(String::new());
    }

    lines.push("## Links\n".to_string());
    if let Some(url) = &episode.external_urls.spotify {
        lines.push(format!("Spotify: {}", url));
    }
    lines.push(format!("URI: {}", episode.uri));
    lines.push(format!("ID: {}", episode.id));

    lines.join("\n")
}

pub fn episode_json(episode: &Episode) -> Value {
    let show = episode.show.as_ref().map(|show| {
        json!({
            "id": show.id,
            "name": show.name,
            "publisher": show.publisher,
        })
    });

    json!({
        "id": episode.id,
        "name": episode.name,
        "show": show,
        "release_date": episode.release_date,
        "duration_ms": episode.duration_ms,
        "language": episode.language,
        "explicit": episode.explicit,
        "description": episode.description.clone().unwrap_or_default(),
        "html_description": episode.html_description.clone().unwrap_or_default(),
        "uri": episode.uri,
        "external_urls": episode.external_urls,
        "audio_preview_url": episode.audio_preview_url,
    })
}
