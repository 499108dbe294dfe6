//! Tests for configurations the router refuses.

mod common;
use common::*;

use oxide_api::{split_parts, Method, Pattern, Route, RouterError};

#[test]
fn route_without_leading_slash() {
    let err = configure_err(|api| {
        api.route("path/to/resources", echo);
    });
    assert!(matches!(err, RouterError::MalformedPattern { .. }));
}

#[test]
fn route_with_trailing_slash() {
    let err = configure_err(|api| {
        api.route("/path/to/resources/", echo);
    });
    assert!(matches!(err, RouterError::MalformedPattern { .. }));
}

#[test]
fn group_without_leading_slash() {
    let err = configure_err(|api| {
        api.group("path/to/resources", |resource| {
            resource.route("/", echo);
        });
    });
    assert!(matches!(err, RouterError::MalformedPattern { .. }));
}

#[test]
fn group_with_trailing_slash() {
    let err = configure_err(|api| {
        api.group("/path/to/resources/", |resource| {
            resource.route("/", echo);
        });
    });
    assert!(matches!(err, RouterError::MalformedPattern { .. }));
}

#[test]
fn routes_with_the_same_id() {
    let err = configure_err(|api| {
        api.route_id("id", "/path/to/resource", echo);
        api.route_id("id", "/path/to/objects", echo);
    });
    assert_eq!(err, RouterError::DuplicateId("id".to_string()));
}

#[test]
fn part_after_the_tail() {
    let err = configure_err(|api| {
        api.route("/files/::path/:id", echo);
    });
    assert!(matches!(err, RouterError::MalformedPattern { .. }));
}

#[test]
fn group_tail_followed_by_route_part() {
    let err = configure_err(|api| {
        api.group("/files/::path", |files| {
            files.route("/meta", echo);
        });
    });
    assert!(matches!(err, RouterError::MalformedPattern { .. }));
}

#[test]
fn same_resource_through_different_groups() {
    let err = configure_err(|api| {
        api.group("/path", |path| {
            path.route_id("id-a", "/to/resource", echo);
        });
        api.group("/path/to", |to| {
            to.route_id("id-b", "/resource", echo);
        });
    });
    match err {
        RouterError::DuplicateRoute {
            id,
            existing,
            method,
            path,
            version,
        } => {
            assert_eq!(id, "id-b");
            assert_eq!(existing, "id-a");
            assert_eq!(method, Method::Get);
            assert_eq!(path, "/path/to/resource");
            assert_eq!(version, None);
        }
        other => panic!("Expected DuplicateRoute, got {other:?}"),
    }
}

#[test]
fn same_shape_with_other_parameter_names() {
    let err = configure_err(|api| {
        api.route_id("by-id", "/users/:id", echo);
        api.route_id("by-name", "/users/:name", echo);
    });
    assert!(matches!(err, RouterError::DuplicateRoute { .. }));
}

#[test]
fn overlapping_method_sets() {
    let err = configure_err(|api| {
        api.add(Route::new("/users", echo).id("a").methods([Method::Get, Method::Put]));
        api.add(Route::new("/users", echo).id("b").methods([Method::Post, Method::Put]));
    });
    assert!(matches!(err, RouterError::DuplicateRoute { method: Method::Put, .. }));
}

#[test]
fn same_version_twice() {
    let err = configure_err(|api| {
        api.version("a.1.0").route_id("one", "/users", echo);
        api.version("a.1.0").route_id("two", "/users", echo);
    });
    assert!(matches!(err, RouterError::DuplicateRoute { .. }));
}

#[test]
fn error_messages() {
    let err = Pattern::compile("/files/::path/:id").unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed path pattern `/files/::path/:id`: a tail segment must be the last segment"
    );
    assert_eq!(
        RouterError::DuplicateId("id".to_string()).to_string(),
        "duplicate route id: id"
    );
}

#[test]
fn strict_split_complains_about_trailing_slash() {
    assert!(split_parts("/path/to/dir/").is_err());
    assert_eq!(split_parts("/path/to/file.ext").unwrap(), ["path", "to", "file.ext"]);
    assert_eq!(split_parts("/").unwrap(), [""]);
}
