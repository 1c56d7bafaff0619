use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::country::CountryResolver;
use crate::data::cache::SessionCache;
use crate::data::filter::{apply_filters, country_options, CountryOption, FilterSelection, FilteredView};
use crate::data::loader::DataSource;
use crate::data::model::AuthorTable;
use crate::data::stats::AggregateSummary;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Built once at startup.
    pub resolver: CountryResolver,

    /// Owns the one load of this session.
    session: SessionCache,

    /// Full table of the current session (empty if loading failed).
    pub table: Arc<AuthorTable>,

    /// Country selector entries, computed once per session.
    pub country_options: Vec<CountryOption>,

    /// Current selector values.
    pub selection: FilterSelection,

    /// Rows passing the current selection (cached until it changes).
    pub view: FilteredView,

    /// Aggregates over `view`.
    pub summary: AggregateSummary,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Start a session for the configured source; the table is loaded here.
    pub fn new(config: DashboardConfig) -> Self {
        let session = SessionCache::new(config.source.clone());
        Self::from_session(config, session)
    }

    pub fn from_session(config: DashboardConfig, session: SessionCache) -> Self {
        let mut state = Self {
            config,
            resolver: CountryResolver::new(),
            session,
            table: Arc::new(AuthorTable::empty()),
            country_options: Vec::new(),
            selection: FilterSelection::default(),
            view: FilteredView::default(),
            summary: AggregateSummary::default(),
            status_message: None,
        };
        state.ingest_session();
        state
    }

    fn ingest_session(&mut self) {
        self.table = self.session.table();
        self.status_message = self.session.load_error().map(str::to_string);
        self.country_options = country_options(&self.table, &self.resolver);
        self.selection = FilterSelection::default();
        self.refilter();
    }

    /// Throw away the cached table and load `source` as a new session.
    pub fn restart_session(&mut self, source: DataSource) {
        log::info!("Starting new session for {source}");
        self.config.source = source.clone();
        self.session = SessionCache::new(source);
        self.ingest_session();
    }

    pub fn source(&self) -> &DataSource {
        self.session.source()
    }

    /// Recompute `view` and `summary` after a selection change.
    pub fn refilter(&mut self) {
        self.view = apply_filters(&self.table, &self.selection);
        self.summary =
            AggregateSummary::compute(&self.table, &self.view, &self.resolver, self.config.summary);
        log::debug!(
            "Selection {:?}: {} of {} authors",
            self.selection,
            self.view.len(),
            self.table.len()
        );
    }

    pub fn set_country(&mut self, country: Option<String>) {
        if country == self.selection.country {
            return;
        }
        self.selection = self.selection.with_country(&self.table, country);
        self.refilter();
    }

    pub fn set_institution(&mut self, institution: Option<String>) {
        if institution == self.selection.institution {
            return;
        }
        self.selection = self.selection.with_institution(institution);
        self.refilter();
    }

    pub fn set_author_query(&mut self, query: &str) {
        if query == self.selection.author_query {
            return;
        }
        self.selection = self.selection.with_author_query(query);
        self.refilter();
    }

    /// Selector label of the current country.
    pub fn country_label(&self) -> String {
        match &self.selection.country {
            Some(code) => self.resolver.option_label(code),
            None => "All".to_string(),
        }
    }

    /// Display columns the loaded table actually has.
    pub fn display_columns(&self) -> Vec<&str> {
        self.config
            .display_columns
            .iter()
            .map(String::as_str)
            .filter(|c| self.table.has_column(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::loader::parse_csv;
    use crate::data::stats::DistinctCounts;

    const CSV: &str = "\
authfull,inst_name,cntry,rank (ns)
\"Smith, John\",MIT,usa,1
\"Smithson, Ann\",Harvard,usa,2
\"Lee, Bo\",Oxford,gbr,3
\"Smyth, Jon\",MIT,usa,4
";

    fn state() -> AppState {
        let table = parse_csv(CSV.as_bytes()).unwrap();
        let session = SessionCache::with_table(DataSource::File("inline.csv".into()), table);
        AppState::from_session(DashboardConfig::default(), session)
    }

    #[test]
    fn interactions_recompute_view() {
        let mut s = state();
        assert_eq!(s.view.len(), 4);
        assert_eq!(s.country_label(), "All");

        s.set_country(Some("usa".into()));
        assert_eq!(s.view.institution_options, vec!["Harvard", "MIT"]);
        assert_eq!(s.country_label(), "United States (usa)");

        s.set_institution(Some("MIT".into()));
        s.set_author_query("SMITH");
        assert_eq!(s.view.indices, vec![0]);
        assert_eq!(s.summary.distinct, DistinctCounts { authors: 1, institutions: 1, countries: 1 });

        // MIT is not offered for gbr
        s.set_country(Some("gbr".into()));
        assert_eq!(s.selection.institution, None);
        assert!(s.view.is_empty());
    }

    #[test]
    fn display_columns_skip_absent() {
        let s = state();
        assert_eq!(s.display_columns(), vec!["authfull", "inst_name", "rank (ns)", "cntry"]);
        assert_eq!(s.country_options.len(), 2);
    }

    #[test]
    fn failed_load_shows_no_data() {
        let config = DashboardConfig {
            source: DataSource::File("/missing/authors.csv".into()),
            ..DashboardConfig::default()
        };
        let s = AppState::new(config);
        assert!(s.status_message.is_some());
        assert_eq!(s.summary.distinct, DistinctCounts::default());
        assert!(s.summary.map.is_empty());
        assert!(s.summary.rank_histogram.is_none());
        assert!(s.display_columns().is_empty());
    }
}
