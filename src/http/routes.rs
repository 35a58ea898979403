//! Route resolution.
//!
//! # Responsibilities
//! - Extract the student id from the last non-empty path segment
//! - Map (method, id) to an explicit route
//!
//! # Design Decisions
//! - A last segment equal to the base name means "no id" (collection root)
//! - POST ignores any id; PUT/PATCH/DELETE without an id still reach the
//!   controller, which reports the missing id
//! - Unknown methods resolve to `MethodNotAllowed` and never touch the store

use axum::http::Method;

/// Operations that need a store handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentAction {
    List,
    Get(String),
    Create,
    Update(Option<String>),
    Delete(Option<String>),
}

/// Every way an incoming request can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// CORS pre-flight probe.
    Preflight,
    Student(StudentAction),
    MethodNotAllowed,
}

impl Route {
    /// Resolve a request's method and path against the base name.
    pub fn resolve(method: &Method, path: &str, base_name: &str) -> Self {
        let id = resource_id(path, base_name);
        let action = match (method, id) {
            (&Method::OPTIONS, _) => return Route::Preflight,
            (&Method::GET, None) => StudentAction::List,
            (&Method::GET, Some(id)) => StudentAction::Get(id),
            (&Method::POST, _) => StudentAction::Create,
            (&Method::PUT | &Method::PATCH, id) => StudentAction::Update(id),
            (&Method::DELETE, id) => StudentAction::Delete(id),
            _ => return Route::MethodNotAllowed,
        };
        Route::Student(action)
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::MethodNotAllowed => "method_not_allowed",
            Route::Student(StudentAction::List) => "list",
            Route::Student(StudentAction::Get(_)) => "get",
            Route::Student(StudentAction::Create) => "create",
            Route::Student(StudentAction::Update(_)) => "update",
            Route::Student(StudentAction::Delete(_)) => "delete",
        }
    }
}

/// The id carried by `path`, if any.
pub fn resource_id(path: &str, base_name: &str) -> Option<String> {
    let last = path.split('/').rfind(|s| !s.is_empty())?;
    (last != base_name).then(|| last.to_string())
}
