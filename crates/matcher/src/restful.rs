//! URL-pattern matching for `METHOD /path` actions.

use crate::RuleMatcher;
use regex::Regex;
use std::collections::HashMap;
use std::sync::RwLock;
use warden_core::{Action, ConditionalPolicyRule, EngineError, Resource, Subject};

const HTTP_VERBS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Matches rules against RESTful actions (`GET /api/docs/77`).
///
/// Activated only when the action's first token is an HTTP verb; any other
/// action is handed to the fallback matcher untouched. For RESTful actions
/// the rule's resource is a URL pattern — `:name` captures one path segment,
/// `*` wildcards one path segment, everything else matches verbatim — and
/// the rule's action contributes the HTTP method (or `"*"`).
pub struct RestfulMatcher {
    fallback: Box<dyn RuleMatcher>,
    // Compiled URL patterns, keyed by source text. `None` records a pattern
    // that failed to compile: the rule is treated as non-matching.
    patterns: RwLock<HashMap<String, Option<Regex>>>,
}

impl RestfulMatcher {
    /// A RESTful matcher delegating non-HTTP actions to `fallback`.
    pub fn new(fallback: Box<dyn RuleMatcher>) -> Self {
        Self { fallback, patterns: RwLock::new(HashMap::new()) }
    }

    /// Validate a URL pattern ahead of time.
    ///
    /// Matching itself treats an unparseable pattern as non-matching (a
    /// broken rule is skipped, never fatal); hosts that want to surface the
    /// problem call this when rules are authored.
    pub fn check_pattern(pattern: &str) -> Result<(), EngineError> {
        match pattern {
            "*" => Ok(()),
            p if !p.contains(':') && !p.contains('*') => Ok(()),
            p => match compile_url_pattern(p) {
                Some(_) => Ok(()),
                None => Err(EngineError::MalformedPattern {
                    pattern: p.to_owned(),
                    reason: "does not compile to an anchored URL matcher".to_owned(),
                }),
            },
        }
    }

    /// The action's HTTP verb, if its first whitespace token is one.
    fn http_verb(action: &str) -> Option<String> {
        let first = action.split_whitespace().next()?;
        let upper = first.to_ascii_uppercase();
        HTTP_VERBS.contains(&upper.as_str()).then_some(upper)
    }

    /// Subject test: `"*"` is universal here (no superuser requirement),
    /// otherwise an exact id match.
    fn subject_applies(rule_subject: &str, subject: &Subject) -> bool {
        rule_subject == "*" || rule_subject == subject.id
    }

    fn method_applies(rule_action: &str, request_verb: &str) -> bool {
        if rule_action == "*" {
            return true;
        }
        match rule_action.split_whitespace().next() {
            Some(verb) => verb.eq_ignore_ascii_case(request_verb),
            None => false,
        }
    }

    fn url_applies(&self, pattern: &str, url: &str) -> bool {
        if pattern == "*" {
            return true;
        }
        if !pattern.contains(':') && !pattern.contains('*') {
            return pattern == url;
        }
        if let Some(compiled) = self.patterns.read().ok().and_then(|map| map.get(pattern).cloned())
        {
            return compiled.is_some_and(|re| re.is_match(url));
        }
        let compiled = compile_url_pattern(pattern);
        let matched = compiled.as_ref().is_some_and(|re| re.is_match(url));
        if let Ok(mut map) = self.patterns.write() {
            map.insert(pattern.to_owned(), compiled);
        }
        matched
    }
}

/// Translate a URL pattern into an anchored regex.
///
/// `:name` segments become single-segment captures and `*` segments become
/// single-segment wildcards; literal segments are escaped verbatim.
fn compile_url_pattern(pattern: &str) -> Option<Regex> {
    let mut source = String::from("^");
    for (i, segment) in pattern.split('/').enumerate() {
        if i > 0 {
            source.push('/');
        }
        if segment.starts_with(':') && segment.len() > 1 {
            source.push_str("([^/]+)");
        } else if segment == "*" {
            source.push_str("[^/]+");
        } else {
            source.push_str(&regex::escape(segment));
        }
    }
    source.push('$');
    Regex::new(&source).ok()
}

impl RuleMatcher for RestfulMatcher {
    fn matches(
        &self,
        rule: &ConditionalPolicyRule,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> bool {
        let Some(request_verb) = Self::http_verb(&action.name) else {
            return self.fallback.matches(rule, subject, resource, action);
        };
        if !Self::subject_applies(&rule.subject, subject) {
            return false;
        }
        if !Self::method_applies(&rule.action, &request_verb) {
            return false;
        }
        match rule.resource.as_deref() {
            None | Some("*") => true,
            Some(pattern) => self.url_applies(pattern, &resource.id),
        }
    }
}
