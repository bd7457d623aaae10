//! Permission requirements.
//!
//! An [`Evaluator`] describes what a request needs in order to proceed. The
//! gate only ever injects request parameters into it and describes it for
//! logs; deciding whether a principal satisfies it is the access-control
//! engine's job.
//!
//! Three shapes are provided for declaring handler requirements:
//! [`Permission`], [`All`] and [`Any`].

use std::sync::Arc;

use crate::error::InjectionError;
use crate::scope::{ScopeParams, inject_template};

/// A permission requirement, possibly containing scope templates.
///
/// Implementations must keep [`inject`](Evaluator::inject) deterministic
/// and free of side effects: the same parameters always yield the same
/// concrete requirement.
pub trait Evaluator: Send + Sync {
    /// Substitutes request parameters into every scope template.
    ///
    /// # Errors
    ///
    /// Returns an [`InjectionError`] when any template cannot be resolved.
    /// Implementations must fail rather than substitute an empty value.
    fn inject(&self, params: &ScopeParams) -> Result<Arc<dyn Evaluator>, InjectionError>;

    /// Returns a human-readable rendering for logs.
    fn describe(&self) -> String;
}

/// Requires one action on any of the listed scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    action: String,
    scopes: Vec<String>,
}

impl Permission {
    /// Creates a permission requirement.
    pub fn new(action: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            action: action.into(),
            scopes,
        }
    }

    /// Returns the required action.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the scopes, any of which satisfies the requirement.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl Evaluator for Permission {
    fn inject(&self, params: &ScopeParams) -> Result<Arc<dyn Evaluator>, InjectionError> {
        let scopes = self
            .scopes
            .iter()
            .map(|scope| inject_template(scope, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(Permission {
            action: self.action.clone(),
            scopes,
        }))
    }

    fn describe(&self) -> String {
        format!("action:{} scopes:{}", self.action, self.scopes.join(", "))
    }
}

/// Requires every child requirement.
pub struct All(Vec<Arc<dyn Evaluator>>);

impl All {
    /// Returns the child requirements.
    pub fn children(&self) -> &[Arc<dyn Evaluator>] {
        &self.0
    }
}

impl Evaluator for All {
    fn inject(&self, params: &ScopeParams) -> Result<Arc<dyn Evaluator>, InjectionError> {
        Ok(Arc::new(All(inject_children(&self.0, params)?)))
    }

    fn describe(&self) -> String {
        format!("all({})", describe_children(&self.0))
    }
}

/// Requires at least one child requirement.
pub struct Any(Vec<Arc<dyn Evaluator>>);

impl Any {
    /// Returns the child requirements.
    pub fn children(&self) -> &[Arc<dyn Evaluator>] {
        &self.0
    }
}

impl Evaluator for Any {
    fn inject(&self, params: &ScopeParams) -> Result<Arc<dyn Evaluator>, InjectionError> {
        Ok(Arc::new(Any(inject_children(&self.0, params)?)))
    }

    fn describe(&self) -> String {
        format!("any({})", describe_children(&self.0))
    }
}

/// Builds a [`Permission`] requirement.
///
/// # Examples
///
/// ```
/// use access_gate::{ScopeParams, eval_permission};
///
/// let req = eval_permission("dashboards:read", &["dashboards:id:{:id}"]);
/// let params = ScopeParams::new(1, vec![("id".to_string(), "42".to_string())]);
/// let concrete = req.inject(&params).unwrap();
/// assert_eq!(concrete.describe(), "action:dashboards:read scopes:dashboards:id:42");
/// ```
pub fn eval_permission(action: &str, scopes: &[&str]) -> Arc<dyn Evaluator> {
    Arc::new(Permission::new(
        action,
        scopes.iter().map(|s| s.to_string()).collect(),
    ))
}

/// Builds an [`All`] requirement.
pub fn eval_all(children: Vec<Arc<dyn Evaluator>>) -> Arc<dyn Evaluator> {
    Arc::new(All(children))
}

/// Builds an [`Any`] requirement.
pub fn eval_any(children: Vec<Arc<dyn Evaluator>>) -> Arc<dyn Evaluator> {
    Arc::new(Any(children))
}

fn inject_children(
    children: &[Arc<dyn Evaluator>],
    params: &ScopeParams,
) -> Result<Vec<Arc<dyn Evaluator>>, InjectionError> {
    children.iter().map(|child| child.inject(params)).collect()
}

fn describe_children(children: &[Arc<dyn Evaluator>]) -> String {
    children
        .iter()
        .map(|child| child.describe())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ScopeParams {
        ScopeParams::new(7, vec![(":id".to_string(), "42".to_string())])
    }

    #[test]
    fn permission_describe_joins_scopes() {
        let req = eval_permission("folders:read", &["folders:*", "folders:uid:abc"]);
        assert_eq!(
            req.describe(),
            "action:folders:read scopes:folders:*, folders:uid:abc"
        );
    }

    #[test]
    fn permission_without_scopes() {
        let req = eval_permission("users:create", &[]);
        assert_eq!(req.describe(), "action:users:create scopes:");
        assert_eq!(req.inject(&params()).unwrap().describe(), req.describe());
    }

    #[test]
    fn inject_substitutes_org_and_url_param() {
        let req = eval_all(vec![
            eval_permission("orgs:read", &["orgs:{org_id}"]),
            eval_permission("dashboards:write", &["dashboards:id:{:id}"]),
        ]);

        let concrete = req.inject(&params()).unwrap();
        assert_eq!(
            concrete.describe(),
            "all(action:orgs:read scopes:orgs:7 action:dashboards:write scopes:dashboards:id:42)"
        );
    }

    #[test]
    fn inject_leaves_template_untouched() {
        let req = eval_permission("orgs:read", &["orgs:{org_id}"]);
        let _ = req.inject(&params()).unwrap();
        assert_eq!(req.describe(), "action:orgs:read scopes:orgs:{org_id}");
    }

    #[test]
    fn any_describes_children() {
        let req = eval_any(vec![
            eval_permission("a", &["s1"]),
            eval_permission("b", &["s2"]),
        ]);
        assert_eq!(req.describe(), "any(action:a scopes:s1 action:b scopes:s2)");
    }

    #[test]
    fn nested_failure_fails_whole_tree() {
        let req = eval_any(vec![
            eval_permission("a", &["orgs:{org_id}"]),
            eval_all(vec![eval_permission("b", &["teams:{:teamId}"])]),
        ]);

        let err = req.inject(&params()).err().unwrap();
        assert!(matches!(err, InjectionError::MissingUrlParam { ref name, .. } if name == "teamId"));
    }

    #[test]
    fn concrete_types_expose_structure() {
        let p = Permission::new("a", vec!["s".to_string()]);
        assert_eq!(p.action(), "a");
        assert_eq!(p.scopes(), &["s".to_string()]);

        let all = All(vec![Arc::new(p.clone())]);
        let any = Any(vec![Arc::new(p)]);
        assert_eq!(all.children().len(), 1);
        assert_eq!(any.children().len(), 1);
    }
}
