use serde::{Deserialize, Serialize};

/// The persisted credential unit.
///
/// Either absent or fully populated; `expires_at` is milliseconds since the
/// epoch, computed as issue time plus the server reported lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub token_type: String,
    pub scope: String,
}

/// Body returned by the token endpoint for both grant types.
///
/// `refresh_token` is mandatory for the authorization code grant and
/// optional for refresh; that rule is enforced by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// Query parameters delivered to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// The simplified show object embedded in episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRef {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub release_date: String,
    pub duration_ms: u64,
    pub uri: String,
    pub description: Option<String>,
    pub html_description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub explicit: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub audio_preview_url: Option<String>,
    /// Present on episode details and saved episodes, absent in search results.
    pub show: Option<ShowRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEpisode {
    pub added_at: String,
    pub episode: Episode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub uri: String,
    pub description: Option<String>,
    pub html_description: Option<String>,
    pub total_episodes: Option<u64>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub explicit: bool,
    pub media_type: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Offset based paging envelope used by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

pub type SavedEpisodesPage = Page<SavedEpisode>;

/// Result of the catalog search endpoint.
///
/// Spotify occasionally returns `null` entries inside search pages, hence the
/// `Option` items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub episodes: Option<Page<Option<Episode>>>,
    pub shows: Option<Page<Option<Show>>>,
}

/// Episode as rendered by the list commands' JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeListEntry {
    pub id: String,
    pub name: String,
    pub show_name: String,
    pub show_id: String,
    pub release_date: String,
    pub added_at: String,
    pub duration_ms: u64,
    pub description: String,
    pub uri: String,
    pub external_urls: ExternalUrls,
}

impl From<&SavedEpisode> for EpisodeListEntry {
    fn from(saved: &SavedEpisode) -> Self {
        let episode = &saved.episode;
        let (show_id, show_name) = episode
            .show
            .as_ref()
            .map(|s| (s.id.clone(), s.name.clone()))
            .unwrap_or_default();

        Self {
            id: episode.id.clone(),
            name: episode.name.clone(),
            show_name,
            show_id,
            release_date: episode.release_date.clone(),
            added_at: saved.added_at.clone(),
            duration_ms: episode.duration_ms,
            description: episode.description.clone().unwrap_or_default(),
            uri: episode.uri.clone(),
            external_urls: episode.external_urls.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedEpisodesOutput {
    pub total: u64,
    pub count: usize,
    pub offset: u64,
    pub limit: u64,
    pub has_more: bool,
    pub next_offset: Option<u64>,
    pub episodes: Vec<EpisodeListEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSavedOutput {
    pub query: String,
    pub count: usize,
    pub episodes: Vec<EpisodeListEntry>,
}
