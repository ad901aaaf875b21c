use popcorn_model::SeriesId;

#[derive(Debug, Clone, Copy)]
pub struct CacheKeys;

impl CacheKeys {
    pub fn series(id: SeriesId) -> String {
        format!("series:{id}")
    }

    pub fn season_episodes(id: SeriesId, season_number: u16) -> String {
        format!("series:{id}:{season_number}")
    }

    pub fn search(query: &str, page: u32) -> String {
        format!("{query}:{page}")
    }
}
