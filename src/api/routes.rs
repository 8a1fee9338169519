//! Route-table composition
//!
//! Feature modules describe their routes as [`Blueprint`]s. A [`RouteTable`]
//! mounts each blueprint under an optional URL prefix and, at startup, merges
//! everything into a single axum `Router` together with a [`UrlMap`] used to
//! turn endpoint names back into paths.

use axum::{routing::MethodRouter, Router};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::app::AppState;

/// Errors detected while composing the route table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Blueprint registered twice: {0}")]
    DuplicateBlueprint(String),

    #[error("Invalid URL prefix {0:?}: must start with '/' and must not end with '/'")]
    InvalidPrefix(String),

    #[error("URL prefix {prefix} of blueprint {blueprint} is already mounted")]
    DuplicatePrefix { prefix: String, blueprint: String },

    #[error("URL prefix {inner} overlaps with mounted prefix {outer}")]
    OverlappingPrefix { outer: String, inner: String },

    #[error("Root path {path} collides with mounted prefix {prefix}")]
    RootPathUnderPrefix { path: String, prefix: String },

    #[error("Root path {path} is registered by both {first} and {second}")]
    DuplicateRootPath {
        path: String,
        first: String,
        second: String,
    },
}

/// Owner name reported for application-level routes
const APPLICATION: &str = "application";

/// Independently defined group of routes
pub struct Blueprint {
    name: &'static str,
    router: Router<AppState>,
    endpoints: Vec<(&'static str, &'static str)>,
}

impl Blueprint {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            router: Router::new(),
            endpoints: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds a route and records its endpoint name for URL reversal
    ///
    /// Registering further methods on an existing path is allowed; the
    /// endpoint name is recorded once per call.
    pub fn route(
        mut self,
        path: &'static str,
        endpoint: &'static str,
        method_router: MethodRouter<AppState>,
    ) -> Self {
        self.router = self.router.route(path, method_router);
        self.endpoints.push((endpoint, path));
        self
    }
}

struct Mount {
    blueprint: Blueprint,
    prefix: Option<&'static str>,
}

/// Dispatch table assembled at startup
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<(&'static str, &'static str, MethodRouter<AppState>)>,
    mounts: Vec<Mount>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an application-level route outside any blueprint
    pub fn route(
        mut self,
        path: &'static str,
        endpoint: &'static str,
        method_router: MethodRouter<AppState>,
    ) -> Self {
        self.routes.push((path, endpoint, method_router));
        self
    }

    /// Mounts a blueprint, at the root when `prefix` is `None`
    pub fn register(mut self, blueprint: Blueprint, prefix: Option<&'static str>) -> Self {
        self.mounts.push(Mount { blueprint, prefix });
        self
    }

    /// Prefixes in registration order
    pub fn prefixes(&self) -> Vec<(&'static str, Option<&'static str>)> {
        self.mounts
            .iter()
            .map(|mount| (mount.blueprint.name, mount.prefix))
            .collect()
    }

    /// Checks blueprint names and prefixes without building anything
    pub fn validate(&self) -> Result<(), RouteError> {
        let mut names = HashSet::new();
        let mut mounted: Vec<(&str, &str)> = Vec::new();

        for mount in &self.mounts {
            let name = mount.blueprint.name;
            if !names.insert(name) {
                return Err(RouteError::DuplicateBlueprint(name.to_string()));
            }

            let Some(prefix) = mount.prefix else {
                continue;
            };

            if !prefix.starts_with('/') || prefix.ends_with('/') {
                return Err(RouteError::InvalidPrefix(prefix.to_string()));
            }

            for (other, other_name) in &mounted {
                if *other == prefix {
                    return Err(RouteError::DuplicatePrefix {
                        prefix: prefix.to_string(),
                        blueprint: other_name.to_string(),
                    });
                }
                if is_nested(other, prefix) {
                    return Err(RouteError::OverlappingPrefix {
                        outer: other.to_string(),
                        inner: prefix.to_string(),
                    });
                }
                if is_nested(prefix, other) {
                    return Err(RouteError::OverlappingPrefix {
                        outer: prefix.to_string(),
                        inner: other.to_string(),
                    });
                }
            }
            mounted.push((prefix, name));
        }

        let mut root_paths: HashMap<&str, &str> = HashMap::new();
        let app_paths = self.routes.iter().map(|(path, _, _)| (*path, APPLICATION));
        let blueprint_paths = self
            .mounts
            .iter()
            .filter(|mount| mount.prefix.is_none())
            .flat_map(|mount| {
                mount
                    .blueprint
                    .endpoints
                    .iter()
                    .map(move |(_, path)| (*path, mount.blueprint.name))
            });

        for (path, owner) in app_paths.chain(blueprint_paths) {
            if let Some((prefix, _)) = mounted
                .iter()
                .find(|(prefix, _)| *prefix == path || is_nested(prefix, path))
            {
                return Err(RouteError::RootPathUnderPrefix {
                    path: path.to_string(),
                    prefix: prefix.to_string(),
                });
            }

            // Several methods on one path within the same owner are merged by axum
            match root_paths.get(path) {
                Some(first) if *first != owner => {
                    return Err(RouteError::DuplicateRootPath {
                        path: path.to_string(),
                        first: first.to_string(),
                        second: owner.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    root_paths.insert(path, owner);
                }
            }
        }

        Ok(())
    }

    /// Builds the router and the endpoint map
    pub fn compose(self) -> Result<(Router<AppState>, UrlMap), RouteError> {
        self.validate()?;

        let mut router = Router::new();
        let mut urls = UrlMap::default();

        for (path, endpoint, method_router) in self.routes {
            router = router.route(path, method_router);
            urls.insert(endpoint.to_string(), path.to_string());
        }

        for Mount { blueprint, prefix } in self.mounts {
            for (endpoint, path) in &blueprint.endpoints {
                urls.insert(
                    format!("{}.{}", blueprint.name, endpoint),
                    join_path(prefix, path),
                );
            }

            router = match prefix {
                Some(prefix) => router.nest(prefix, blueprint.router),
                None => router.merge(blueprint.router),
            };
            tracing::debug!(blueprint = blueprint.name, prefix = prefix.unwrap_or("/"), "mounted blueprint");
        }

        Ok((router, urls))
    }
}

fn is_nested(outer: &str, inner: &str) -> bool {
    inner
        .strip_prefix(outer)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn join_path(prefix: Option<&str>, path: &str) -> String {
    match prefix {
        None => path.to_string(),
        Some(prefix) if path == "/" => prefix.to_string(),
        Some(prefix) => format!("{}{}", prefix, path),
    }
}

/// Endpoint name to path lookup
///
/// Blueprint endpoints are addressed as `blueprint.endpoint`, application
/// routes by their bare endpoint name.
#[derive(Debug, Clone, Default)]
pub struct UrlMap {
    paths: HashMap<String, String>,
}

impl UrlMap {
    fn insert(&mut self, endpoint: String, path: String) {
        self.paths.entry(endpoint).or_insert(path);
    }

    pub fn url_for(&self, endpoint: &str) -> Option<&str> {
        self.paths.get(endpoint).map(String::as_str)
    }
}
