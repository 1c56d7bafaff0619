use std::collections::BTreeSet;

use super::model::{AuthorRecord, AuthorTable, SENTINEL};
use crate::country::CountryResolver;

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// The user's current choices.  `None` stands for "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    /// ISO alpha-3 code, compared case-insensitively.
    pub country: Option<String>,
    /// Exact institution name.
    pub institution: Option<String>,
    /// Case-insensitive substring of the author name; empty means no filter.
    pub author_query: String,
}

impl FilterSelection {
    /// Same selection with a new country.  The institution pin is kept only
    /// if it is still offered for that country.
    pub fn with_country(&self, table: &AuthorTable, country: Option<String>) -> Self {
        let institution = self.institution.clone().filter(|inst| {
            institution_options(table, country.as_deref()).contains(inst)
        });
        FilterSelection {
            country,
            institution,
            author_query: self.author_query.clone(),
        }
    }

    pub fn with_institution(&self, institution: Option<String>) -> Self {
        FilterSelection {
            institution,
            ..self.clone()
        }
    }

    pub fn with_author_query(&self, query: &str) -> Self {
        FilterSelection {
            author_query: query.to_string(),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Result of one pass of the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    /// Indices of records passing all filters, in source order.
    pub indices: Vec<usize>,
    /// Sorted, unique institutions among records matching the country filter.
    pub institution_options: Vec<String>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The matching records, in source order.
    pub fn records<'a>(&'a self, table: &'a AuthorTable) -> impl Iterator<Item = &'a AuthorRecord> {
        self.indices.iter().map(move |&i| &table.records[i])
    }
}

fn matches_country(rec: &AuthorRecord, country: Option<&str>) -> bool {
    country.map_or(true, |c| rec.country.eq_ignore_ascii_case(c))
}

/// Run the cascading filters: country, then institution, then author name.
pub fn apply_filters(table: &AuthorTable, selection: &FilterSelection) -> FilteredView {
    let country = selection.country.as_deref();

    // 1. country
    let by_country: Vec<usize> = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| matches_country(rec, country))
        .map(|(i, _)| i)
        .collect();

    // 2. institution options offered for that country
    let institution_options = sorted_unique(by_country.iter().map(|&i| &table.records[i].institution));

    // 3. institution, 4. author substring
    let query = selection.author_query.to_lowercase();
    let indices = by_country
        .into_iter()
        .filter(|&i| {
            let rec = &table.records[i];
            selection
                .institution
                .as_deref()
                .map_or(true, |inst| rec.institution == inst)
        })
        .filter(|&i| query.is_empty() || author_matches(&table.records[i].author, &query))
        .collect();

    FilteredView {
        indices,
        institution_options,
    }
}

/// `query` must already be lowercase and non-empty.
fn author_matches(author: &str, query: &str) -> bool {
    author != SENTINEL && author.to_lowercase().contains(query)
}

/// Institutions among records matching `country` (all when `None`), sorted.
pub fn institution_options(table: &AuthorTable, country: Option<&str>) -> Vec<String> {
    sorted_unique(
        table
            .records
            .iter()
            .filter(|rec| matches_country(rec, country))
            .map(|rec| &rec.institution),
    )
}

/// One entry of the country selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryOption {
    pub code: String,
    pub label: String,
}

/// Every distinct country code in the table, labelled `"Name (code)"` and
/// sorted by label.
pub fn country_options(table: &AuthorTable, resolver: &CountryResolver) -> Vec<CountryOption> {
    let codes: BTreeSet<&str> = table.records.iter().map(|r| r.country.as_str()).collect();
    let mut options: Vec<CountryOption> = codes
        .into_iter()
        .map(|code| CountryOption {
            code: code.to_string(),
            label: resolver.option_label(code),
        })
        .collect();
    options.sort_by(|a, b| a.label.cmp(&b.label));
    options
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn record(author: &str, inst: &str, country: &str) -> AuthorRecord {
        AuthorRecord {
            author: author.into(),
            institution: inst.into(),
            country: country.into(),
            extra: BTreeMap::new(),
        }
    }

    fn table(rows: Vec<AuthorRecord>) -> AuthorTable {
        AuthorTable::new(
            vec!["authfull".into(), "inst_name".into(), "cntry".into()],
            rows,
        )
    }

    /// 100 rows; 10 in "usa", 3 of which at "X".
    fn hundred_rows() -> AuthorTable {
        let mut rows = Vec::new();
        for i in 0..100 {
            let (inst, country) = match i {
                0..=2 => ("X", "usa"),
                3..=9 => (if i % 2 == 0 { "Y" } else { "Z" }, "usa"),
                10..=19 => ("X", "gbr"),
                _ => ("W", "fra"),
            };
            rows.push(record(&format!("Author {i}"), inst, country));
        }
        table(rows)
    }

    fn pinned(country: Option<&str>, inst: Option<&str>, query: &str) -> FilterSelection {
        FilterSelection {
            country: country.map(str::to_string),
            institution: inst.map(str::to_string),
            author_query: query.into(),
        }
    }

    #[test]
    fn country_then_institution_scenario() {
        let t = hundred_rows();
        let usa = apply_filters(&t, &pinned(Some("USA"), None, ""));
        assert_eq!(usa.len(), 10);
        assert_eq!(usa.institution_options, vec!["X", "Y", "Z"]);

        let usa_x = apply_filters(&t, &pinned(Some("USA"), Some("X"), ""));
        assert_eq!(usa_x.indices, vec![0, 1, 2]);
        assert_eq!(usa_x.institution_options, usa.institution_options);
    }

    #[test]
    fn all_country_offers_every_institution() {
        let t = hundred_rows();
        let view = apply_filters(&t, &FilterSelection::default());
        assert_eq!(view.len(), 100);
        assert_eq!(view.institution_options, vec!["W", "X", "Y", "Z"]);
        assert_eq!(institution_options(&t, None), view.institution_options);
    }

    #[test]
    fn author_query_is_case_insensitive_substring() {
        let t = table(vec![
            record("John Smith", "A", "usa"),
            record("john smith", "A", "usa"),
            record("Smithson", "A", "usa"),
            record("Jon Smyth", "A", "usa"),
            record(SENTINEL, "A", "usa"),
        ]);
        let view = apply_filters(&t, &pinned(None, None, "smith"));
        assert_eq!(view.indices, vec![0, 1, 2]);

        // The sentinel never matches, even a query it happens to contain.
        let view = apply_filters(&t, &pinned(None, None, "unk"));
        assert!(view.is_empty());
    }

    #[test]
    fn empty_stage_propagates() {
        let t = hundred_rows();
        let view = apply_filters(&t, &pinned(Some("deu"), Some("X"), "author"));
        assert!(view.is_empty());
        assert!(view.institution_options.is_empty());
        assert!(apply_filters(&AuthorTable::empty(), &FilterSelection::default()).is_empty());
    }

    #[test]
    fn institution_match_is_case_sensitive() {
        let t = hundred_rows();
        assert!(apply_filters(&t, &pinned(None, Some("x"), "")).is_empty());
    }

    #[test]
    fn changing_country_drops_unavailable_institution() {
        let t = hundred_rows();
        let sel = pinned(Some("usa"), Some("Y"), "a");
        let to_gbr = sel.with_country(&t, Some("gbr".into()));
        assert_eq!(to_gbr.institution, None);
        assert_eq!(to_gbr.author_query, "a");

        let sel = pinned(Some("usa"), Some("X"), "");
        assert_eq!(sel.with_country(&t, Some("gbr".into())).institution.as_deref(), Some("X"));
    }

    #[test]
    fn country_options_are_sorted_labels() {
        let t = hundred_rows();
        let options = country_options(&t, &CountryResolver::new());
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["France (fra)", "United Kingdom (gbr)", "United States (usa)"]);
        assert_eq!(options[2].code, "usa");
    }

    fn arb_table() -> impl Strategy<Value = AuthorTable> {
        let row = (
            prop::sample::select(vec!["Ann Lee", "ann lee", "Bo Smith", "Cy", SENTINEL]),
            prop::sample::select(vec!["A", "B", "C", SENTINEL]),
            prop::sample::select(vec!["usa", "USA", "gbr", "zzz", SENTINEL]),
        )
            .prop_map(|(a, i, c)| record(a, i, c));
        prop::collection::vec(row, 0..40).prop_map(table)
    }

    fn arb_selection() -> impl Strategy<Value = FilterSelection> {
        (
            prop::option::of(prop::sample::select(vec!["usa", "GBR", "zzz"])),
            prop::option::of(prop::sample::select(vec!["A", "B", SENTINEL])),
            prop::sample::select(vec!["", "lee", "SMITH", "x"]),
        )
            .prop_map(|(c, i, q)| pinned(c, i, q))
    }

    proptest! {
        #[test]
        fn result_is_an_ordered_subset(t in arb_table(), sel in arb_selection()) {
            let view = apply_filters(&t, &sel);
            prop_assert!(view.indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(view.indices.iter().all(|&i| i < t.len()));
        }

        #[test]
        fn filtering_is_idempotent(t in arb_table(), sel in arb_selection()) {
            let once = apply_filters(&t, &sel);
            let rows: Vec<AuthorRecord> = once.records(&t).cloned().collect();
            let again = apply_filters(&table(rows.clone()), &sel);
            let twice: Vec<AuthorRecord> = again.records(&table(rows.clone())).cloned().collect();
            prop_assert_eq!(rows, twice);
        }

        #[test]
        fn pinned_country_and_institution_commute(
            t in arb_table(),
            c in prop::sample::select(vec!["usa", "gbr"]),
            i in prop::sample::select(vec!["A", "B"]),
        ) {
            let country_first = apply_filters(&t, &pinned(Some(c), None, ""));
            let narrowed = table(country_first.records(&t).cloned().collect());
            let a: Vec<AuthorRecord> = apply_filters(&narrowed, &pinned(None, Some(i), ""))
                .records(&narrowed).cloned().collect();

            let inst_first = apply_filters(&t, &pinned(None, Some(i), ""));
            let narrowed = table(inst_first.records(&t).cloned().collect());
            let b: Vec<AuthorRecord> = apply_filters(&narrowed, &pinned(Some(c), None, ""))
                .records(&narrowed).cloned().collect();

            prop_assert_eq!(a, b);
        }
    }
}
