use uuid::Uuid;

/// Identifier of an account that tracks series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub Uuid);

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for UserId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        UserId(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog (TMDB) identifier of a television series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SeriesId(pub u64);

impl SeriesId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SeriesId {
    fn from(value: u64) -> Self {
        SeriesId(value)
    }
}

impl std::fmt::Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Season identity independent of any cached payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonKey {
    pub series_id: SeriesId,
    pub season_number: u16,
}

/// Episode identity independent of any cached payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeKey {
    pub series_id: SeriesId,
    pub season_number: u16,
    pub episode_number: u16,
}

impl EpisodeKey {
    pub fn new(
        series_id: SeriesId,
        season_number: u16,
        episode_number: u16,
    ) -> Self {
        Self {
            series_id,
            season_number,
            episode_number,
        }
    }

    pub fn season(&self) -> SeasonKey {
        SeasonKey {
            series_id: self.series_id,
            season_number: self.season_number,
        }
    }
}
