//! The faceted search engine.
//!
//! `search` is a pure function over the effective index: filtering,
//! aggregation, sorting, pagination. No side effects, no caching.

use crate::facet::{FacetKey, FacetSettings, FacetSort, SearchConfig, SortOrder};
use crate::query::SearchState;
use epigraph_index::{AnnotationIndex, IndexItem};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// One `{key, count}` pair within a facet's aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub page_count: usize,
}

/// The answer to one query: a page of items, pagination bounds, and one
/// bucket list per declared facet.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub items: Vec<IndexItem>,
    pub pagination: Pagination,
    pub aggregations: BTreeMap<FacetKey, Vec<Bucket>>,
}

/// Run one query against the effective dataset.
///
/// Results are ordered by the fixed ascending sort key, ties broken by
/// item id for a total order. Facet buckets show *sibling* counts: each
/// facet is aggregated over the match set that excludes its own filter,
/// so multi-selecting within one facet never changes that facet's counts.
pub fn search(index: &AnnotationIndex, state: &SearchState, config: &SearchConfig) -> SearchResult {
    let tokens: Vec<String> = state
        .query
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();

    let text_matches: Vec<&IndexItem> = index
        .items()
        .filter(|item| matches_query(item, &tokens))
        .collect();

    let mut matched: Vec<&IndexItem> = text_matches
        .iter()
        .copied()
        .filter(|item| {
            state
                .filters
                .iter()
                .all(|(key, selected)| facet_accepts(item, *key, selected))
        })
        .collect();
    matched.sort_by(|a, b| {
        a.sort_key()
            .cmp(&b.sort_key())
            .then_with(|| a.id.cmp(&b.id))
    });

    let per_page = state.per_page.max(1);
    let total = matched.len();
    let page_count = total.div_ceil(per_page);
    let page = state.page.clamp(1, page_count.max(1));
    let start = (page - 1) * per_page;
    let items: Vec<IndexItem> = matched
        .iter()
        .skip(start)
        .take(per_page)
        .map(|item| (*item).clone())
        .collect();

    let aggregations = config
        .facets
        .iter()
        .map(|(key, settings)| {
            (
                *key,
                aggregate(index, &text_matches, state, *key, settings, config),
            )
        })
        .collect();

    SearchResult {
        items,
        pagination: Pagination {
            page,
            per_page,
            total,
            page_count,
        },
        aggregations,
    }
}

/// Every query token must be a substring of at least one searchable
/// field value (tag names or the derived document id).
fn matches_query(item: &IndexItem, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let doc_id = item.doc_id().to_lowercase();
    tokens.iter().all(|token| {
        doc_id.contains(token)
            || item
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(token.as_str()))
    })
}

/// OR within one facet's selected option set.
fn facet_accepts(item: &IndexItem, key: FacetKey, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    let values = key.values(item);
    selected.iter().any(|option| values.contains(&option.as_str()))
}

fn aggregate(
    index: &AnnotationIndex,
    text_matches: &[&IndexItem],
    state: &SearchState,
    key: FacetKey,
    settings: &FacetSettings,
    config: &SearchConfig,
) -> Vec<Bucket> {
    // Count over the match set excluding this facet's own filter: what
    // would remain if an option of this facet were chosen next.
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in text_matches
        .iter()
        .filter(|item| {
            state
                .filters
                .iter()
                .filter(|(other, _)| **other != key)
                .all(|(other, selected)| facet_accepts(item, *other, selected))
        })
    {
        for value in key.values(item) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    // The option universe is the whole index, so options narrowed away by
    // other facets still appear as zero-count buckets unless hidden.
    let mut universe: BTreeSet<&str> = BTreeSet::new();
    for item in index.items() {
        universe.extend(key.values(item));
    }

    let empty = Vec::new();
    let selected_options = state.filters.get(&key).unwrap_or(&empty);

    let mut buckets: Vec<Bucket> = universe
        .iter()
        .filter_map(|value| {
            let count = counts.get(value).copied().unwrap_or(0);
            let selected = selected_options.iter().any(|o| o == value);
            // Selected options stay visible at zero so they can be
            // unselected.
            if count == 0 && config.hide_zero_count && !selected {
                return None;
            }
            Some(Bucket {
                key: (*value).to_string(),
                count,
                selected,
            })
        })
        .collect();

    buckets.sort_by(|a, b| bucket_cmp(a, b, settings.sort, settings.order));
    buckets.truncate(settings.size);
    buckets
}

fn bucket_cmp(a: &Bucket, b: &Bucket, sort: FacetSort, order: SortOrder) -> Ordering {
    let primary = match sort {
        FacetSort::Key => a.key.cmp(&b.key),
        FacetSort::Count => a.count.cmp(&b.count),
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then_with(|| a.key.cmp(&b.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use epigraph_index::{BaseIndex, IndexMeta};

    fn item(id: &str, script: &str, tags: &[&str]) -> IndexItem {
        let mut item = IndexItem::new(id);
        item.script = script.to_string();
        item.image = format!("https://img.example.org/inscription_images/{id}/{id}_tiled.tif");
        item.tags = tags.iter().map(|t| t.to_string()).collect();
        item
    }

    fn index(items: Vec<IndexItem>) -> AnnotationIndex {
        AnnotationIndex::from_base(BaseIndex {
            meta: IndexMeta::default(),
            data: items,
        })
    }

    fn buckets_of(result: &SearchResult, key: FacetKey) -> &[Bucket] {
        result
            .aggregations
            .get(&key)
            .expect("facet must be aggregated")
    }

    #[test]
    fn facet_query_returns_matching_items_in_sort_order() {
        let idx = index(vec![
            item("a", "latin", &["k.round"]),
            item("b", "latin", &["m.exemplar", "k.round"]),
            item("c", "greek", &[]),
        ]);
        let mut state = SearchState::new();
        state.toggle_option(FacetKey::Tags, "k.round");

        let result = search(&idx, &state, &SearchConfig::default());

        let ids: Vec<&str> = result.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(result.pagination.total, 2);
        assert_eq!(result.pagination.page, 1);
    }

    #[test]
    fn ties_on_sort_key_break_by_id() {
        let mut first = item("b", "latin", &[]);
        let mut second = item("a", "latin", &[]);
        first.image = "same".to_string();
        second.image = "same".to_string();

        let result = search(
            &index(vec![first, second]),
            &SearchState::new(),
            &SearchConfig::default(),
        );
        let ids: Vec<&str> = result.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn query_tokens_match_tags_and_doc_id() {
        let idx = index(vec![
            item("a", "latin", &["k.round"]),
            item("b", "latin", &["m.serif"]),
        ]);

        let mut state = SearchState::new();
        state.query = "ROUND".to_string();
        let result = search(&idx, &state, &SearchConfig::default());
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].id, "a");

        // doc id is derived from the image URL (inscription_images/<id>/)
        state.query = "b".to_string();
        let result = search(&idx, &state, &SearchConfig::default());
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].id, "b");
    }

    #[test]
    fn every_token_must_match_somewhere() {
        let idx = index(vec![item("a", "latin", &["k.round"])]);
        let mut state = SearchState::new();
        state.query = "round ghost".to_string();
        let result = search(&idx, &state, &SearchConfig::default());
        assert_eq!(result.pagination.total, 0);
    }

    #[test]
    fn selecting_an_option_does_not_change_its_own_facet_counts() {
        let idx = index(vec![
            item("a", "latin", &["k.round"]),
            item("b", "latin", &["m.exemplar"]),
            item("c", "greek", &["k.round"]),
        ]);

        let unfiltered = search(&idx, &SearchState::new(), &SearchConfig::default());
        let mut state = SearchState::new();
        state.toggle_option(FacetKey::Tags, "k.round");
        let filtered = search(&idx, &state, &SearchConfig::default());

        let strip =
            |buckets: &[Bucket]| -> Vec<(String, usize)> {
                buckets.iter().map(|b| (b.key.clone(), b.count)).collect()
            };
        assert_eq!(
            strip(buckets_of(&unfiltered, FacetKey::Tags)),
            strip(buckets_of(&filtered, FacetKey::Tags)),
            "own-facet counts must ignore the facet's own filter"
        );

        // Other facets do narrow.
        let scripts = buckets_of(&filtered, FacetKey::Script);
        let latin = scripts.iter().find(|b| b.key == "latin").expect("latin bucket");
        assert_eq!(latin.count, 1);
    }

    #[test]
    fn zero_count_buckets_hide_unless_selected() {
        let idx = index(vec![
            item("a", "latin", &["k.round"]),
            item("b", "greek", &["m.exemplar"]),
        ]);

        let mut state = SearchState::new();
        state.toggle_option(FacetKey::Tags, "k.round");
        state.toggle_option(FacetKey::Script, "greek");

        let config = SearchConfig::default();
        let result = search(&idx, &state, &config);

        // Within the greek selection no item carries k.round, but the
        // selected option must stay visible for deselection.
        let tags = buckets_of(&result, FacetKey::Tags);
        let round = tags.iter().find(|b| b.key == "k.round").expect("selected bucket");
        assert_eq!(round.count, 0);
        assert!(round.selected);

        let mut show_all = SearchConfig::default();
        show_all.hide_zero_count = false;
        let mut state = SearchState::new();
        state.toggle_option(FacetKey::Script, "greek");
        let shown = search(&idx, &state, &show_all);
        let hidden = search(&idx, &state, &config);
        assert!(
            buckets_of(&shown, FacetKey::Tags).len()
                > buckets_of(&hidden, FacetKey::Tags).len()
        );
    }

    #[test]
    fn buckets_sort_and_truncate_per_settings() {
        let idx = index(vec![
            item("a", "latin", &["k.round", "m.exemplar"]),
            item("b", "latin", &["k.round"]),
            item("c", "latin", &["cf.wedge"]),
        ]);

        let mut config = SearchConfig::default();
        let result = search(&idx, &SearchState::new(), &config);
        let keys: Vec<&str> = buckets_of(&result, FacetKey::Tags)
            .iter()
            .map(|b| b.key.as_str())
            .collect();
        // count desc, key asc on ties
        assert_eq!(keys, vec!["k.round", "cf.wedge", "m.exemplar"]);

        let settings = config
            .facets
            .get_mut(&FacetKey::Tags)
            .expect("tags facet is declared");
        settings.sort = FacetSort::Key;
        settings.order = SortOrder::Asc;
        settings.size = 2;
        let result = search(&idx, &SearchState::new(), &config);
        let keys: Vec<&str> = buckets_of(&result, FacetKey::Tags)
            .iter()
            .map(|b| b.key.as_str())
            .collect();
        assert_eq!(keys, vec!["cf.wedge", "k.round"]);
    }

    #[test]
    fn pagination_slices_and_counts_pages() {
        let items: Vec<IndexItem> = (0..5)
            .map(|n| item(&format!("a{n}"), "latin", &[]))
            .collect();
        let idx = index(items);

        let mut state = SearchState::new();
        state.per_page = 2;
        state.page = 2;
        let result = search(&idx, &state, &SearchConfig::default());

        assert_eq!(result.pagination.page_count, 3);
        assert_eq!(result.pagination.total, 5);
        let ids: Vec<&str> = result.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a3"]);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let idx = index(vec![
            item("a", "latin", &[]),
            item("b", "latin", &[]),
            item("c", "latin", &[]),
        ]);

        let mut state = SearchState::new();
        state.per_page = 2;
        state.page = 0;
        let result = search(&idx, &state, &SearchConfig::default());
        assert_eq!(result.pagination.page, 1);

        state.page = 99;
        let result = search(&idx, &state, &SearchConfig::default());
        assert_eq!(result.pagination.page, 2);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn empty_match_set_still_pages_to_one() {
        let idx = index(vec![item("a", "latin", &[])]);
        let mut state = SearchState::new();
        state.query = "absent".to_string();
        state.page = 7;

        let result = search(&idx, &state, &SearchConfig::default());
        assert_eq!(result.pagination.total, 0);
        assert_eq!(result.pagination.page_count, 0);
        assert_eq!(result.pagination.page, 1);
        assert!(result.items.is_empty());
    }

    #[test]
    fn search_is_a_pure_function() {
        let idx = index(vec![
            item("a", "latin", &["k.round"]),
            item("b", "greek", &[]),
        ]);
        let mut state = SearchState::new();
        state.toggle_option(FacetKey::Script, "latin");

        let first = search(&idx, &state, &SearchConfig::default());
        let second = search(&idx, &state, &SearchConfig::default());
        assert_eq!(first.pagination, second.pagination);
        assert_eq!(first.aggregations, second.aggregations);
    }
}
