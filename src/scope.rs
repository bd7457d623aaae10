//! Scope parameters and scope template rendering.
//!
//! A scope template is a scope string with placeholders that are filled in
//! per request:
//!
//! - `{org_id}` renders the current org id
//! - `{:name}` renders the matched URL parameter `name`
//! - `{{` and `}}` render literal braces
//!
//! Rendering never falls back to an empty value. A placeholder that cannot
//! be resolved fails the whole template.

use crate::error::InjectionError;
use crate::web::ReqContext;

/// Placeholder name for the current org id.
pub const ORG_ID_PLACEHOLDER: &str = "org_id";

/// Request-derived values used to instantiate scope templates.
///
/// Built fresh for each request by [`ScopeParams::resolve`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeParams {
    org_id: i64,
    url_params: Vec<(String, String)>,
}

impl ScopeParams {
    /// Creates scope parameters from raw parts.
    pub fn new(org_id: i64, url_params: Vec<(String, String)>) -> Self {
        Self { org_id, url_params }
    }

    /// Extracts scope parameters from a request context.
    ///
    /// The org id is the context's current org. URL parameters are copied
    /// verbatim in route-definition order; their values are not validated.
    pub fn resolve(ctx: &ReqContext) -> Self {
        Self {
            org_id: ctx.org_id(),
            url_params: ctx.url_params().to_vec(),
        }
    }

    /// Returns the org id.
    pub fn org_id(&self) -> i64 {
        self.org_id
    }

    /// Returns the URL parameters in route-definition order.
    pub fn url_params(&self) -> &[(String, String)] {
        &self.url_params
    }

    /// Looks up a URL parameter. A leading `:` on either side is ignored.
    pub fn url_param(&self, name: &str) -> Option<&str> {
        let wanted = name.trim_start_matches(':');
        self.url_params
            .iter()
            .find(|(n, _)| n.trim_start_matches(':') == wanted)
            .map(|(_, v)| v.as_str())
    }
}

/// Renders a scope template against `params`.
///
/// # Errors
///
/// Returns an [`InjectionError`] if the template names an unknown
/// placeholder, a URL parameter the request did not match, or has
/// unbalanced braces.
///
/// # Examples
///
/// ```
/// use access_gate::{ScopeParams, inject_template};
///
/// let params = ScopeParams::new(7, vec![(":id".to_string(), "42".to_string())]);
/// assert_eq!(inject_template("orgs:{org_id}", &params).unwrap(), "orgs:7");
/// assert_eq!(inject_template("dashboards:id:{:id}", &params).unwrap(), "dashboards:id:42");
/// assert!(inject_template("folders:uid:{:uid}", &params).is_err());
/// ```
pub fn inject_template(template: &str, params: &ScopeParams) -> Result<String, InjectionError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(InjectionError::UnterminatedPlaceholder {
                        template: template.to_string(),
                    });
                }
                out.push_str(&resolve_placeholder(name.trim(), template, params)?);
            }
            '}' => {
                return Err(InjectionError::UnmatchedBrace {
                    template: template.to_string(),
                });
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

fn resolve_placeholder(
    name: &str,
    template: &str,
    params: &ScopeParams,
) -> Result<String, InjectionError> {
    if name == ORG_ID_PLACEHOLDER {
        return Ok(params.org_id().to_string());
    }

    match name.strip_prefix(':') {
        Some(param) if !param.is_empty() => params
            .url_param(param)
            .map(str::to_string)
            .ok_or_else(|| InjectionError::MissingUrlParam {
                name: param.to_string(),
                template: template.to_string(),
            }),
        _ => Err(InjectionError::UnknownPlaceholder {
            placeholder: name.to_string(),
            template: template.to_string(),
        }),
    }
}
