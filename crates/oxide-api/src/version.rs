//! Version precedence between registrations.

use crate::table::Registration;

/// Picks the winning route among candidates that all match the request.
///
/// A candidate tagged with exactly `requested` wins over an untagged one,
/// whatever the declaration order. Within one tier the most specific
/// pattern wins, then the earliest declaration.
pub fn resolve<'t, Req, Res>(
    candidates: &[&'t Registration<Req, Res>],
    requested: &str,
) -> Option<&'t Registration<Req, Res>> {
    most_specific(candidates, |c| c.version.as_deref() == Some(requested))
        .or_else(|| most_specific(candidates, |c| c.version.is_none()))
}

/// Returns true when a filter with this version tag runs for `requested`.
pub fn applies(version: Option<&str>, requested: &str) -> bool {
    version.map_or(true, |v| v == requested)
}

fn most_specific<'t, Req, Res>(
    candidates: &[&'t Registration<Req, Res>],
    in_tier: impl Fn(&Registration<Req, Res>) -> bool,
) -> Option<&'t Registration<Req, Res>> {
    candidates
        .iter()
        .copied()
        .filter(|c| in_tier(*c))
        .max_by(|a, b| {
            a.pattern
                .specificity_cmp(&b.pattern)
                .then_with(|| b.order.cmp(&a.order))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::handler;
    use crate::path::Pattern;
    use crate::request::Method;

    fn route(id: &str, path: &str, version: Option<&str>, order: usize) -> Registration<(), ()> {
        let mut registration = Registration::route(
            id,
            Pattern::compile(path).unwrap(),
            [Method::Get].into_iter().collect(),
            version.map(str::to_string),
            handler(|()| async {}),
        );
        registration.order = order;
        registration
    }

    #[test]
    fn test_exact_version_wins() {
        let unversioned = route("users", "/users", None, 0);
        let versioned = route("a.1.0:users", "/users", Some("a.1.0"), 1);
        let candidates = [&unversioned, &versioned];

        assert_eq!(resolve(&candidates, "a.1.0").and_then(Registration::id), Some("a.1.0:users"));
        assert_eq!(resolve(&candidates, "a.2.0").and_then(Registration::id), Some("users"));
    }

    #[test]
    fn test_no_tier_matches() {
        let versioned = route("a.1.0:users", "/users", Some("a.1.0"), 0);
        assert!(resolve(&[&versioned], "a.2.0").is_none());
        assert!(resolve::<(), ()>(&[], "a.2.0").is_none());
    }

    #[test]
    fn test_specific_pattern_wins_within_tier() {
        let all = route("all", "/::path", None, 0);
        let other = route("other", "/other", None, 1);
        assert_eq!(resolve(&[&all, &other], "current").and_then(Registration::id), Some("other"));
    }

    #[test]
    fn test_filter_versions() {
        assert!(applies(None, "current"));
        assert!(applies(Some("current"), "current"));
        assert!(!applies(Some("old"), "current"));
    }
}
