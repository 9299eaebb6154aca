//! Click-through navigation for notifications.
//!
//! A notification resolves to a destination taken from its meta payload. An
//! injected [`Navigate`] implementation gets the first shot at handling it;
//! when there is none, or it fails, the destination is opened directly
//! through a [`Location`].

use opsbell_bridge::notification::Notification;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("invalid origin {origin:?}: {source}")]
    InvalidOrigin {
        origin: String,
        source: url::ParseError,
    },
    #[error("invalid destination {destination:?}: {source}")]
    InvalidDestination {
        destination: String,
        source: url::ParseError,
    },
    #[error("failed to open {url}: {source}")]
    Open { url: Url, source: std::io::Error },
}

/// Application-provided navigation, e.g. an in-app router.
pub trait Navigate: Send + Sync {
    fn navigate(&self, path: &str, notification: &Notification) -> anyhow::Result<()>;
}

impl<F> Navigate for F
where
    F: Fn(&str, &Notification) -> anyhow::Result<()> + Send + Sync,
{
    fn navigate(&self, path: &str, notification: &Notification) -> anyhow::Result<()> {
        self(path, notification)
    }
}

/// Direct navigation target.
pub trait Location {
    /// Origin relative destinations are resolved against.
    fn origin(&self) -> &Url;

    fn assign(&self, url: &Url) -> Result<(), NavigationError>;
}

/// Opens destinations in the user's default browser.
#[derive(Debug, Clone)]
pub struct BrowserLocation {
    origin: Url,
}

impl BrowserLocation {
    pub fn new(origin: &str) -> Result<Self, NavigationError> {
        let origin = Url::parse(origin).map_err(|source| NavigationError::InvalidOrigin {
            origin: origin.to_string(),
            source,
        })?;
        Ok(Self { origin })
    }
}

impl Location for BrowserLocation {
    fn origin(&self) -> &Url {
        &self.origin
    }

    fn assign(&self, url: &Url) -> Result<(), NavigationError> {
        webbrowser::open(url.as_str()).map_err(|source| NavigationError::Open {
            url: url.clone(),
            source,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Computes where clicking `notification` leads: an explicit `orderUrl` as
/// is, otherwise `/orders/{id}` for an order identifier, otherwise nowhere.
pub fn resolve_destination(notification: &Notification) -> Option<String> {
    if let Some(url) = non_empty(notification.meta_text("orderUrl")) {
        return Some(url);
    }
    non_empty(notification.meta_text("_id"))
        .or_else(|| non_empty(notification.meta_text("id")))
        .map(|id| format!("/orders/{id}"))
}

fn is_absolute(destination: &str) -> bool {
    let scheme_end = destination.find("://").unwrap_or(0);
    let scheme = &destination[..scheme_end];
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// Turns a destination into a full URL. `http(s)://` destinations are kept,
/// anything else is taken as a path under the scheme, host and port of
/// `origin`, so other schemes and `//host` forms stay on that origin.
pub fn absolute_destination(origin: &Url, destination: &str) -> Result<Url, NavigationError> {
    let parsed = if is_absolute(destination) {
        Url::parse(destination)
    } else {
        let separator = if destination.starts_with('/') { "" } else { "/" };
        Url::parse(&format!(
            "{}{separator}{destination}",
            origin.origin().ascii_serialization()
        ))
    };
    parsed.map_err(|source| NavigationError::InvalidDestination {
        destination: destination.to_string(),
        source,
    })
}

pub struct NavigationResolver<L> {
    location: L,
    navigator: Option<Box<dyn Navigate>>,
}

impl<L: Location> NavigationResolver<L> {
    pub fn new(location: L) -> Self {
        Self {
            location,
            navigator: None,
        }
    }

    pub fn with_navigator(mut self, navigator: impl Navigate + 'static) -> Self {
        self.navigator = Some(Box::new(navigator));
        self
    }

    /// Navigates to the destination of `notification` and returns it, or
    /// returns `None` without doing anything when it has none.
    pub fn open(&self, notification: &Notification) -> Result<Option<String>, NavigationError> {
        let Some(destination) = resolve_destination(notification) else {
            return Ok(None);
        };

        if let Some(navigator) = &self.navigator {
            match navigator.navigate(&destination, notification) {
                Ok(()) => return Ok(Some(destination)),
                Err(error) => {
                    log::warn!("Navigator failed on {destination:?}, opening directly: {error:#}")
                }
            }
        }

        let url = absolute_destination(self.location.origin(), &destination)?;
        log::info!("Opening {url}");
        self.location.assign(&url)?;
        Ok(Some(destination))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use opsbell_bridge::notification::NotificationKind;
    use serde_json::{Value, json};

    use super::*;

    fn notification(meta: Option<Value>) -> Notification {
        Notification {
            id: "1_abc".into(),
            created_at: Utc::now(),
            kind: NotificationKind::Order,
            title: "New order".into(),
            message: String::new(),
            meta,
        }
    }

    #[derive(Clone)]
    struct RecordingLocation {
        origin: Url,
        visited: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingLocation {
        fn new() -> Self {
            Self {
                origin: Url::parse("http://localhost:5173").unwrap(),
                visited: Arc::default(),
            }
        }

        fn visited(&self) -> Vec<String> {
            self.visited.lock().unwrap().clone()
        }
    }

    impl Location for RecordingLocation {
        fn origin(&self) -> &Url {
            &self.origin
        }

        fn assign(&self, url: &Url) -> Result<(), NavigationError> {
            self.visited.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn explicit_url_wins_over_identifiers() {
        let n = notification(Some(json!({ "orderUrl": "https://x/y", "_id": "abc" })));
        assert_eq!(resolve_destination(&n).as_deref(), Some("https://x/y"));
    }

    #[test]
    fn identifiers_become_order_paths() {
        let n = notification(Some(json!({ "_id": "abc" })));
        assert_eq!(resolve_destination(&n).as_deref(), Some("/orders/abc"));

        let n = notification(Some(json!({ "id": 42, "orderUrl": "" })));
        assert_eq!(resolve_destination(&n).as_deref(), Some("/orders/42"));
    }

    #[test]
    fn human_order_ids_are_not_destinations() {
        assert_eq!(resolve_destination(&notification(None)), None);
        let n = notification(Some(json!({ "orderId": "ORD-7" })));
        assert_eq!(resolve_destination(&n), None);
    }

    #[test]
    fn absolute_check_ignores_case() {
        let origin = Url::parse("http://localhost:5173").unwrap();
        assert_eq!(
            absolute_destination(&origin, "HTTPS://x/y").unwrap().as_str(),
            "https://x/y"
        );
        assert_eq!(
            absolute_destination(&origin, "/orders/abc").unwrap().as_str(),
            "http://localhost:5173/orders/abc"
        );
    }

    #[test]
    fn other_schemes_stay_on_the_origin() {
        let origin = Url::parse("http://localhost:5173/app/").unwrap();
        for (destination, expected) in [
            ("file:///etc/passwd", "http://localhost:5173/file:///etc/passwd"),
            ("javascript:alert(1)", "http://localhost:5173/javascript:alert(1)"),
            ("//evil.com/x", "http://localhost:5173//evil.com/x"),
            ("ssh://host", "http://localhost:5173/ssh://host"),
            ("orders/abc", "http://localhost:5173/orders/abc"),
        ] {
            let url = absolute_destination(&origin, destination).unwrap();
            assert_eq!(url.as_str(), expected, "{destination}");
            assert_eq!(url.origin(), origin.origin(), "{destination}");
        }
    }

    #[test]
    fn foreign_order_urls_open_under_the_origin() {
        let location = RecordingLocation::new();
        let resolver = NavigationResolver::new(location.clone());

        for order_url in ["javascript:alert(1)", "//evil.com/x"] {
            let opened = resolver
                .open(&notification(Some(json!({ "orderUrl": order_url }))))
                .unwrap();
            assert_eq!(opened.as_deref(), Some(order_url));
        }
        assert_eq!(
            location.visited(),
            vec![
                "http://localhost:5173/javascript:alert(1)",
                "http://localhost:5173//evil.com/x",
            ]
        );
    }

    #[test]
    fn without_destination_nothing_happens() {
        let location = RecordingLocation::new();
        let resolver = NavigationResolver::new(location.clone());
        assert_eq!(resolver.open(&notification(None)).unwrap(), None);
        assert!(location.visited().is_empty());
    }

    #[test]
    fn navigator_receives_path_and_notification() {
        let location = RecordingLocation::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let resolver = NavigationResolver::new(location.clone()).with_navigator(
            move |path: &str, n: &Notification| -> anyhow::Result<()> {
                recorder.lock().unwrap().push((path.to_string(), n.id.clone()));
                Ok(())
            },
        );

        let opened = resolver
            .open(&notification(Some(json!({ "_id": "abc" }))))
            .unwrap();
        assert_eq!(opened.as_deref(), Some("/orders/abc"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("/orders/abc".to_string(), "1_abc".to_string())]
        );
        assert!(location.visited().is_empty());
    }

    #[test]
    fn failing_navigator_falls_back_to_direct_navigation() {
        let location = RecordingLocation::new();
        let resolver = NavigationResolver::new(location.clone()).with_navigator(
            |_: &str, _: &Notification| -> anyhow::Result<()> { anyhow::bail!("router gone") },
        );

        resolver
            .open(&notification(Some(json!({ "_id": "abc" }))))
            .unwrap();
        assert_eq!(location.visited(), vec!["http://localhost:5173/orders/abc"]);
    }

    #[test]
    fn invalid_origin_is_reported() {
        assert!(matches!(
            BrowserLocation::new("not a url"),
            Err(NavigationError::InvalidOrigin { .. })
        ));
    }
}
