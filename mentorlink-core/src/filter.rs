//! Client-side filter/sort state for list pages.
//!
//! A `BrowseState` holds the active search string, predicates and sort key.
//! Every transition returns a new state and `apply` re-derives the visible
//! subset from the rows already in hand, so toggling anything back restores
//! the earlier view exactly.

use std::cmp::Ordering;

use serde::Serialize;

/// Text a record exposes to the search box (name, title, company, ...).
pub trait Searchable {
    fn search_text(&self) -> String;
}

pub trait Predicate<T> {
    fn matches(&self, item: &T) -> bool;
}

pub trait SortKey<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowsePhase {
    Idle,
    Filtered,
    Sorted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState<P, S> {
    search: Option<String>,
    predicates: Vec<P>,
    sort: Option<S>,
}

impl<P, S> Default for BrowseState<P, S> {
    fn default() -> Self {
        Self {
            search: None,
            predicates: Vec::new(),
            sort: None,
        }
    }
}

impl<P: PartialEq, S> BrowseState<P, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the search string. Blank input clears the search.
    pub fn with_search(mut self, query: &str) -> Self {
        let query = query.trim().to_lowercase();
        self.search = (!query.is_empty()).then_some(query);
        self
    }

    pub fn clear_search(mut self) -> Self {
        self.search = None;
        self
    }

    /// Add the predicate if it is not active yet.
    pub fn with_predicate(mut self, predicate: P) -> Self {
        if !self.predicates.contains(&predicate) {
            self.predicates.push(predicate);
        }
        self
    }

    pub fn without_predicate(mut self, predicate: &P) -> Self {
        self.predicates.retain(|p| p != predicate);
        self
    }

    /// Add the predicate if absent, remove it if present.
    pub fn toggle_predicate(self, predicate: P) -> Self {
        if self.predicates.contains(&predicate) {
            self.without_predicate(&predicate)
        } else {
            self.with_predicate(predicate)
        }
    }

    pub fn sorted_by(mut self, sort: S) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn unsorted(mut self) -> Self {
        self.sort = None;
        self
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn predicates(&self) -> &[P] {
        &self.predicates
    }

    pub fn sort(&self) -> Option<&S> {
        self.sort.as_ref()
    }

    pub fn phase(&self) -> BrowsePhase {
        if self.sort.is_some() {
            BrowsePhase::Sorted
        } else if self.search.is_some() || !self.predicates.is_empty() {
            BrowsePhase::Filtered
        } else {
            BrowsePhase::Idle
        }
    }

    /// Rows passing the search and every predicate, in sort order (stable),
    /// or in input order when unsorted.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> Vec<&'a T>
    where
        T: Searchable,
        P: Predicate<T>,
        S: SortKey<T>,
    {
        let mut visible: Vec<&T> = items
            .iter()
            .filter(|item| match &self.search {
                Some(q) => item.search_text().to_lowercase().contains(q.as_str()),
                None => true,
            })
            .filter(|item| self.predicates.iter().all(|p| p.matches(item)))
            .collect();
        if let Some(sort) = &self.sort {
            visible.sort_by(|a, b| sort.compare(a, b));
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: &'static str,
        company: &'static str,
        age: u32,
    }

    impl Searchable for Person {
        fn search_text(&self) -> String {
            format!("{} {}", self.name, self.company)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Filter {
        OlderThan(u32),
    }

    impl Predicate<Person> for Filter {
        fn matches(&self, item: &Person) -> bool {
            match self {
                Filter::OlderThan(age) => item.age > *age,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Sort {
        Age,
    }

    impl SortKey<Person> for Sort {
        fn compare(&self, a: &Person, b: &Person) -> Ordering {
            match self {
                Sort::Age => a.age.cmp(&b.age),
            }
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person { name: "Ada", company: "Analytical Engines", age: 36 },
            Person { name: "Grace", company: "Navy", age: 85 },
            Person { name: "Alan", company: "Bletchley", age: 41 },
        ]
    }

    #[test]
    fn test_idle_state_returns_everything_in_order() {
        let state: BrowseState<Filter, Sort> = BrowseState::new();
        let rows = people();
        assert_eq!(state.phase(), BrowsePhase::Idle);
        assert_eq!(state.apply(&rows).len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_fields() {
        let rows = people();
        let state: BrowseState<Filter, Sort> = BrowseState::new().with_search("NAVY");
        let hits = state.apply(&rows);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Grace");
        assert_eq!(state.phase(), BrowsePhase::Filtered);
    }

    #[test]
    fn test_same_search_twice_is_idempotent() {
        let rows = people();
        let once: BrowseState<Filter, Sort> = BrowseState::new().with_search("a");
        let twice = once.clone().with_search("a");
        assert_eq!(once, twice);
        assert_eq!(once.apply(&rows), twice.apply(&rows));
    }

    #[test]
    fn test_toggle_predicate_round_trips() {
        let rows = people();
        let state: BrowseState<Filter, Sort> =
            BrowseState::new().toggle_predicate(Filter::OlderThan(40));
        assert_eq!(state.apply(&rows).len(), 2);
        let state = state.toggle_predicate(Filter::OlderThan(40));
        assert_eq!(state.phase(), BrowsePhase::Idle);
        assert_eq!(state.apply(&rows).len(), 3);
    }

    #[test]
    fn test_sort_then_unsort() {
        let rows = people();
        let state: BrowseState<Filter, Sort> = BrowseState::new().sorted_by(Sort::Age);
        let names: Vec<&str> = state.apply(&rows).iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ada", "Alan", "Grace"]);
        assert_eq!(state.phase(), BrowsePhase::Sorted);
        let names: Vec<&str> = state.unsorted().apply(&rows).iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ada", "Grace", "Alan"]);
    }

    #[test]
    fn test_blank_search_clears() {
        let state: BrowseState<Filter, Sort> =
            BrowseState::new().with_search("ada").with_search("  ");
        assert_eq!(state.search(), None);
    }
}
