//! URL query-string persistence.
//!
//! Each active filter becomes one query parameter named after its key, with
//! the codec token as value: `/orders?status=active&price=10%7C`.
//!
//! The adapter only ever touches parameters it owns: keys it has restored
//! from the URL or written itself. Everything else in the query string is
//! left as it was.

use std::collections::BTreeSet;

use url::form_urlencoded;

use crate::codec;
use crate::schema::{ActiveFilter, FilterDefinition};
use crate::Result;

use super::{restore_filters, PersistenceAdapter};

/// Path plus decoded query parameters, in their original order, and the
/// fragment without its `#`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub params: Vec<(String, String)>,
    pub fragment: Option<String>,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            params: Vec::new(),
            fragment: None,
        }
    }

    /// Parse `"/path?a=1&b=2#section"`.
    pub fn parse(url: &str) -> Self {
        let (url, fragment) = match url.split_once('#') {
            Some((before, fragment)) => (before, Some(fragment.to_string())),
            None => (url, None),
        };
        let (pathname, query) = url.split_once('?').unwrap_or((url, ""));
        let params = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self {
            pathname: pathname.to_string(),
            params,
            fragment,
        }
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key`, keeping the position of its first occurrence.
    pub fn set(&mut self, key: &str, value: String) {
        match self.params.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.params[index].1 = value;
                let mut seen = false;
                self.params.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.params.push((key.to_string(), value)),
        }
    }

    /// Remove every occurrence of `key`.
    pub fn remove(&mut self, key: &str) {
        self.params.retain(|(k, _)| k != key);
    }

    /// Encoded query string, without the leading `?`.
    pub fn search(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// `pathname?search#fragment`; the `?` part is left out when there are
    /// no parameters.
    pub fn to_url(&self) -> String {
        let mut url = self.pathname.clone();
        if !self.params.is_empty() {
            url.push('?');
            url.push_str(&self.search());
        }
        if let Some(fragment) = &self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

/// Host router the URL adapter drives.
///
/// Navigation always replaces the current history entry and must not
/// scroll; filter edits are not separate pages.
pub trait Router {
    fn location(&self) -> Location;

    /// Replace the current URL. Hosts report failures as
    /// [`Error::Navigation`](crate::Error::Navigation).
    fn replace(&mut self, url: &str) -> Result<()>;
}

/// Router that only records navigation. Useful for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryRouter {
    current: Location,
    history: Vec<String>,
}

impl MemoryRouter {
    pub fn new(url: &str) -> Self {
        Self {
            current: Location::parse(url),
            history: Vec::new(),
        }
    }

    pub fn current_url(&self) -> String {
        self.current.to_url()
    }

    /// Every URL passed to `replace`, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Router for MemoryRouter {
    fn location(&self) -> Location {
        self.current.clone()
    }

    fn replace(&mut self, url: &str) -> Result<()> {
        self.current = Location::parse(url);
        self.history.push(url.to_string());
        Ok(())
    }
}

/// Persists filters as query parameters through a [`Router`].
#[derive(Debug, Clone)]
pub struct UrlAdapter<R: Router> {
    router: R,
    owned_keys: BTreeSet<String>,
}

impl<R: Router> UrlAdapter<R> {
    pub fn new(router: R) -> Self {
        Self {
            router,
            owned_keys: BTreeSet::new(),
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Parameter names this adapter will remove when their filter goes away.
    pub fn owned_keys(&self) -> impl Iterator<Item = &str> {
        self.owned_keys.iter().map(String::as_str)
    }

    /// Navigate only when the parameters actually changed.
    fn navigate_if_changed(&mut self, before: &Location, after: Location) -> Result<()> {
        if after.params == before.params {
            return Ok(());
        }
        let url = after.to_url();
        tracing::debug!(url = %url, "updating filter parameters");
        self.router.replace(&url)
    }
}

impl<R: Router> PersistenceAdapter for UrlAdapter<R> {
    fn save_filters(&mut self, filters: &[ActiveFilter]) -> Result<()> {
        let before = self.router.location();
        let mut after = before.clone();

        for filter in filters {
            let token = codec::encode(filter.value());
            if !token.is_empty() && filter.is_valid() {
                after.set(filter.key(), token);
            } else {
                after.remove(filter.key());
            }
            self.owned_keys.insert(filter.key().to_string());
        }

        for key in &self.owned_keys {
            if !filters.iter().any(|f| f.key() == key) {
                after.remove(key);
            }
        }

        self.navigate_if_changed(&before, after)
    }

    fn load_filters(&mut self, available: &[FilterDefinition]) -> Result<Vec<ActiveFilter>> {
        let location = self.router.location();

        for definition in available {
            if location.get(&definition.key).is_some() {
                self.owned_keys.insert(definition.key.clone());
            }
        }

        // Restore in declaration order, not URL order
        let entries = available
            .iter()
            .filter_map(|d| location.get(&d.key).map(|token| (d.key.as_str(), token)));
        Ok(restore_filters(entries, available))
    }

    fn clear_filters(&mut self) -> Result<()> {
        let before = self.router.location();
        let mut after = before.clone();
        for key in &self.owned_keys {
            after.remove(key);
        }
        self.navigate_if_changed(&before, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FilterOption, FilterType, FilterValue, NumberRange};

    fn definitions() -> Vec<FilterDefinition> {
        vec![
            FilterDefinition::new("status", "Status", FilterType::Select)
                .with_options([FilterOption::new("active", "Active")]),
            FilterDefinition::new("price", "Price", FilterType::NumberRange),
            FilterDefinition::new("tags", "Tags", FilterType::MultiSelect),
        ]
    }

    #[test]
    fn test_location_parse_and_url() {
        let loc = Location::parse("/orders?status=active&price=10%7C#top");
        assert_eq!(loc.pathname, "/orders");
        assert_eq!(loc.get("price"), Some("10|"));
        assert_eq!(loc.fragment.as_deref(), Some("top"));
        assert_eq!(loc.to_url(), "/orders?status=active&price=10%7C#top");
        assert_eq!(Location::parse("/orders").to_url(), "/orders");
    }

    #[test]
    fn test_location_set_replaces_in_place() {
        let mut loc = Location::parse("/p?a=1&b=2&a=3");
        loc.set("a", "9".to_string());
        assert_eq!(
            loc.params,
            vec![("a".to_string(), "9".to_string()), ("b".to_string(), "2".to_string())]
        );
        loc.set("c", "x".to_string());
        assert_eq!(loc.search(), "a=9&b=2&c=x");
    }

    #[test]
    fn test_load_from_url() {
        let router = MemoryRouter::new("/orders?page=2&tags=a%2Cb&status=active&price=");
        let mut adapter = UrlAdapter::new(router);

        let loaded = adapter.load_filters(&definitions()).unwrap();
        let keys: Vec<_> = loaded.iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec!["status", "tags"]);
        assert_eq!(loaded[1].value(), &FilterValue::multi(["a", "b"]));

        let owned: Vec<_> = adapter.owned_keys().collect();
        assert_eq!(owned, vec!["price", "status", "tags"]);
    }

    #[test]
    fn test_save_preserves_unrelated_params() {
        let defs = definitions();
        let mut adapter = UrlAdapter::new(MemoryRouter::new("/orders?page=2&sort=desc"));

        adapter
            .save_filters(&[ActiveFilter::new(defs[0].clone(), FilterValue::select("active"))])
            .unwrap();
        assert_eq!(adapter.router().current_url(), "/orders?page=2&sort=desc&status=active");
    }

    #[test]
    fn test_save_removes_only_owned_keys() {
        let defs = definitions();
        // Params that only look like filter keys are never owned
        let mut adapter =
            UrlAdapter::new(MemoryRouter::new("/orders?startDate=2024-01-01&userId=7"));

        let status = ActiveFilter::new(defs[0].clone(), FilterValue::select("active"));
        let price = ActiveFilter::new(
            defs[1].clone(),
            FilterValue::NumberRange(NumberRange::new(Some(10.0), None)),
        );
        adapter.save_filters(&[status.clone(), price]).unwrap();
        assert_eq!(
            adapter.router().current_url(),
            "/orders?startDate=2024-01-01&userId=7&status=active&price=10%7C"
        );

        adapter.save_filters(&[status]).unwrap();
        assert_eq!(
            adapter.router().current_url(),
            "/orders?startDate=2024-01-01&userId=7&status=active"
        );
    }

    #[test]
    fn test_save_drops_invalid_value_param() {
        let defs = definitions();
        let mut adapter = UrlAdapter::new(MemoryRouter::new("/orders?status=active"));
        adapter.load_filters(&defs).unwrap();

        adapter.save_filters(&[ActiveFilter::with_default(defs[0].clone())]).unwrap();
        assert_eq!(adapter.router().current_url(), "/orders");
    }

    #[test]
    fn test_save_keeps_fragment() {
        let defs = definitions();
        let mut adapter = UrlAdapter::new(MemoryRouter::new("/orders?status=active#results"));
        adapter.load_filters(&defs).unwrap();

        adapter
            .save_filters(&[ActiveFilter::new(defs[2].clone(), FilterValue::multi(["a"]))])
            .unwrap();
        assert_eq!(adapter.router().current_url(), "/orders?tags=a#results");

        adapter.clear_filters().unwrap();
        assert_eq!(adapter.router().current_url(), "/orders#results");
    }

    #[test]
    fn test_no_navigation_when_unchanged() {
        let defs = definitions();
        let mut adapter = UrlAdapter::new(MemoryRouter::new("/orders?status=active"));
        let loaded = adapter.load_filters(&defs).unwrap();

        adapter.save_filters(&loaded).unwrap();
        assert!(adapter.router().history().is_empty());
    }

    #[test]
    fn test_clear_removes_owned_keys() {
        let defs = definitions();
        let mut adapter = UrlAdapter::new(MemoryRouter::new("/orders?status=active&page=3"));
        adapter.load_filters(&defs).unwrap();

        adapter.clear_filters().unwrap();
        assert_eq!(adapter.router().current_url(), "/orders?page=3");

        // Nothing left to remove
        adapter.clear_filters().unwrap();
        assert_eq!(adapter.router().history().len(), 1);
    }
}
