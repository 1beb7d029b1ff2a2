use serde_json::{Value, json};

use crate::{cli::print_json, error, spotify::SpotifyClient, types::Show};

pub async fn show(mut client: SpotifyClient, show_id: String, json: bool) {
    let show = match client.show(&show_id).await {
        Ok(show) => show,
        Err(e) => error!("{}", e),
    };

    if json {
        print_json(&show_json(&show));
    } else {
        println!("{}", show_markdown(&show));
    }
}

pub fn show_markdown(show: &Show) -> String {
    let mut lines = vec![format!("# {}\n", show.name)];

    let total = show
        .total_episodes
        .map(|t| t.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    lines.push(format!("**Publisher**: {}", show.publisher));
    lines.push(format!("**Total Episodes**: {}", total));
    lines.push(format!(
        "**Language**: {}",
        show.languages.first().map(String::as_str).unwrap_or("N/A")
    ));
    lines.push(format!("**Explicit**: {}", if show.explicit { "Yes" } else { "No" }));
    lines.push(format!(
        "**Media Type**: {}",
        show.media_type.as_deref().unwrap_or("audio")
    ));
    lines.push(String::new());

    if let Some(description) = show.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push("## Description\n".to_string());
        lines.push(description.to_string());
        lines.push(String::new());
    }

    lines.push("## Links\n".to_string());
    if let Some(url) = &show.external_urls.spotify {
        lines.push(format!("Spotify: {}", url));
    }
    lines.push(format!("URI: {}", show.uri));
    lines.push(format!("ID: {}", show.id));

    lines.join("\n")
}

pub fn show_json(show: &Show) -> Value {
    json!({
        "id": show.id,
        "name": show.name,
        "publisher": show.publisher,
        "total_episodes": show.total_episodes,
        "languages": show.languages,
        "explicit": show.explicit,
        "media_type": show.media_type.as_deref().unwrap_or("audio"),
        "description": show.description.clone().unwrap_or_default(),
        "html_description": show.html_description.clone().unwrap_or_default(),
        "uri": show.uri,
        "external_urls": show.external_urls,
    })
}
