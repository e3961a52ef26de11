use std::collections::{BTreeSet, HashMap};

use axum::http::Method;

use super::Authority;

/// Access declaration attached to a controller or a single handler.
///
/// Unset fields fall through to the controller's declaration when the two
/// are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAccess {
    pub public: Option<bool>,
    pub authorities: Option<BTreeSet<Authority>>,
}

impl RouteAccess {
    /// Inherit everything from the controller.
    pub fn inherit() -> Self {
        Self::default()
    }

    pub fn public() -> Self {
        Self {
            public: Some(true),
            authorities: None,
        }
    }

    pub fn authorities<I>(authorities: I) -> Self
    where
        I: IntoIterator<Item = Authority>,
    {
        Self {
            public: None,
            authorities: Some(authorities.into_iter().collect()),
        }
    }

    /// Handler-level fields win over controller-level ones.
    fn merged_over(&self, controller: &RouteAccess) -> AccessRequirement {
        let authorities = self
            .authorities
            .clone()
            .or_else(|| controller.authorities.clone())
            .filter(|set| !set.is_empty());

        AccessRequirement {
            public: self.public.or(controller.public).unwrap_or(false),
            authorities,
        }
    }
}

/// Resolved requirement the guard evaluates for one route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    pub public: bool,
    /// `None` means any authenticated caller is accepted.
    pub authorities: Option<BTreeSet<Authority>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

/// Access table built once at router construction, keyed by method and
/// route pattern (`/libraries/:id`, not the concrete request path).
#[derive(Debug, Clone, Default)]
pub struct RouteAccessRegistry {
    prefix: String,
    routes: HashMap<RouteKey, AccessRequirement>,
}

impl RouteAccessRegistry {
    pub fn builder() -> RouteAccessRegistryBuilder {
        RouteAccessRegistryBuilder::default()
    }

    /// Looks up the requirement for a matched route. Routes nobody declared
    /// require an authenticated caller.
    pub fn resolve(&self, method: &Method, matched_path: &str) -> AccessRequirement {
        let key = RouteKey {
            method: normalize_method(method),
            path: self.normalize_path(matched_path),
        };

        match self.routes.get(&key) {
            Some(requirement) => requirement.clone(),
            None => {
                tracing::debug!(method = %method, path = matched_path, "No access declaration for route, requiring authentication");
                AccessRequirement::default()
            }
        }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    fn normalize_path(&self, matched_path: &str) -> String {
        let path = match matched_path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if !self.prefix.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
            _ => matched_path,
        };
        trim_route(path)
    }
}

fn trim_route(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn normalize_method(method: &Method) -> Method {
    // axum routes HEAD through the GET handler
    if method == Method::HEAD {
        Method::GET
    } else {
        method.clone()
    }
}

#[derive(Debug, Default)]
pub struct RouteAccessRegistryBuilder {
    prefix: String,
    controllers: HashMap<&'static str, RouteAccess>,
    handlers: Vec<(&'static str, RouteKey, RouteAccess)>,
}

impl RouteAccessRegistryBuilder {
    /// Prefix the router is nested under; stripped before lookup.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn controller(mut self, name: &'static str, access: RouteAccess) -> Self {
        self.controllers.insert(name, access);
        self
    }

    pub fn handler(
        mut self,
        controller: &'static str,
        method: Method,
        path: &str,
        access: RouteAccess,
    ) -> Self {
        let key = RouteKey {
            method,
            path: path.to_string(),
        };
        self.handlers.push((controller, key, access));
        self
    }

    pub fn build(self) -> RouteAccessRegistry {
        let mut registry = RouteAccessRegistry {
            prefix: self.prefix,
            routes: HashMap::with_capacity(self.handlers.len()),
        };

        for (controller, key, access) in self.handlers {
            let controller_access = self.controllers.get(controller).cloned().unwrap_or_default();
            let key = RouteKey {
                path: trim_route(&key.path),
                method: key.method,
            };
            registry.routes.insert(key, access.merged_over(&controller_access));
        }

        registry
    }
}
