use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Episode, Series};

/// Window for the synthetic "Recent" category, in calendar days (inclusive)
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Category filter applied to whichever browse level is active
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Matches everything
    All,
    /// Published within the last 30 calendar days
    Recent,
    /// Exact match against the item's category field
    Named(String),
}

impl CategoryFilter {
    pub fn from_label(label: &str) -> Self {
        match label {
            "All" => CategoryFilter::All,
            "Recent" => CategoryFilter::Recent,
            other => CategoryFilter::Named(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Recent => "Recent",
            CategoryFilter::Named(name) => name,
        }
    }
}

/// Flat episode arena plus a series-to-episodes index.
///
/// Series membership is the episode's `series_id` back-reference; the index
/// is rebuilt wholesale on every content fetch rather than maintained
/// incrementally.
#[derive(Debug, Default, Clone)]
pub struct ContentIndex {
    episodes: Vec<Episode>,
    by_series: HashMap<String, Vec<usize>>,
}

impl ContentIndex {
    pub fn new(episodes: Vec<Episode>) -> Self {
        let mut by_series: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, episode) in episodes.iter().enumerate() {
            if let Some(series_id) = &episode.series_id {
                by_series.entry(series_id.clone()).or_default().push(position);
            }
        }
        Self { episodes, by_series }
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Episodes belonging to a series, in arena order
    pub fn episodes_for(&self, series_id: &str) -> Vec<&Episode> {
        self.by_series
            .get(series_id)
            .map(|positions| positions.iter().map(|&i| &self.episodes[i]).collect())
            .unwrap_or_default()
    }

    pub fn find_episode(&self, episode_id: &str) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.id == episode_id)
    }

    /// Whether any episode of the series falls inside the recent window
    pub fn has_recent_episode(&self, series_id: &str, today: NaiveDate) -> bool {
        self.episodes_for(series_id)
            .iter()
            .any(|episode| is_recent(episode.published_at, today))
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

/// Inclusive 30-day window measured in calendar days, not elapsed hours
pub fn is_recent(published: DateTime<Utc>, today: NaiveDate) -> bool {
    (today - published.date_naive()).num_days() <= RECENT_WINDOW_DAYS
}

fn text_matches(query: &str, title: &str, description: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    title.to_lowercase().contains(&query) || description.to_lowercase().contains(&query)
}

fn episode_matches_category(episode: &Episode, category: &CategoryFilter, today: NaiveDate) -> bool {
    match category {
        CategoryFilter::All => true,
        CategoryFilter::Recent => is_recent(episode.published_at, today),
        CategoryFilter::Named(name) => episode.category == *name,
    }
}

fn series_matches_category(
    series: &Series,
    index: &ContentIndex,
    category: &CategoryFilter,
    today: NaiveDate,
) -> bool {
    match category {
        CategoryFilter::All => true,
        CategoryFilter::Recent => index.has_recent_episode(&series.id, today),
        CategoryFilter::Named(name) => series.category == *name,
    }
}

/// Pure filter over episodes: case-insensitive substring on title OR
/// description, AND the category match. Input order is preserved.
pub fn filter_episodes<'a, I>(
    episodes: I,
    query: &str,
    category: &CategoryFilter,
    today: NaiveDate,
) -> Vec<&'a Episode>
where
    I: IntoIterator<Item = &'a Episode>,
{
    episodes
        .into_iter()
        .filter(|episode| {
            text_matches(query, &episode.title, &episode.description)
                && episode_matches_category(episode, category, today)
        })
        .collect()
}

/// Pure filter over series; `Recent` consults the index for any qualifying
/// episode. Input order is preserved.
pub fn filter_series<'a, I>(
    series: I,
    index: &ContentIndex,
    query: &str,
    category: &CategoryFilter,
    today: NaiveDate,
) -> Vec<&'a Series>
where
    I: IntoIterator<Item = &'a Series>,
{
    series
        .into_iter()
        .filter(|series| {
            text_matches(query, &series.title, &series.description)
                && series_matches_category(series, index, category, today)
        })
        .collect()
}

/// Two-level browse state: the series list, or one selected series' episode
/// list, narrowed by the active search text and category.
pub struct SeriesNavigator {
    all_series: Vec<Series>,
    index: ContentIndex,
    selected_series: Option<Series>,
    search_query: String,
    category: CategoryFilter,
}

impl SeriesNavigator {
    pub fn new() -> Self {
        Self {
            all_series: Vec::new(),
            index: ContentIndex::default(),
            selected_series: None,
            search_query: String::new(),
            category: CategoryFilter::All,
        }
    }

    /// Replace the browsable content, rebuilding the episode index.
    ///
    /// An open selection is re-resolved by id so a refresh keeps the user in
    /// place; a series that disappeared sends them back to the list.
    pub fn set_content(&mut self, series: Vec<Series>, episodes: Vec<Episode>) {
        self.index = ContentIndex::new(episodes);
        self.selected_series = self
            .selected_series
            .take()
            .and_then(|old| series.iter().find(|s| s.id == old.id).cloned());
        self.all_series = series;
    }

    /// Open a series' episode list. Re-entrant: opening while one is already
    /// open just replaces the selection.
    pub fn open_series(&mut self, series_id: &str) -> bool {
        match self.all_series.iter().find(|s| s.id == series_id) {
            Some(series) => {
                self.selected_series = Some(series.clone());
                true
            }
            None => false,
        }
    }

    /// Return to the series list
    pub fn go_back(&mut self) {
        self.selected_series = None;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn selected_series(&self) -> Option<&Series> {
        self.selected_series.as_ref()
    }

    /// Whether the series list (rather than an episode list) is showing
    pub fn is_series_view(&self) -> bool {
        self.selected_series.is_none()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    pub fn find_episode(&self, episode_id: &str) -> Option<&Episode> {
        self.index.find_episode(episode_id)
    }

    /// The series list under the active filter
    pub fn visible_series(&self) -> Vec<&Series> {
        filter_series(
            &self.all_series,
            &self.index,
            &self.search_query,
            &self.category,
            Utc::now().date_naive(),
        )
    }

    /// The selected series' episodes under the active filter; empty in the
    /// series-list state
    pub fn visible_episodes(&self) -> Vec<&Episode> {
        let Some(selected) = &self.selected_series else {
            return Vec::new();
        };
        filter_episodes(
            self.index.episodes_for(&selected.id),
            &self.search_query,
            &self.category,
            Utc::now().date_naive(),
        )
    }
}

impl Default for SeriesNavigator {
    fn default() -> Self {
        Self::new()
    }
}
