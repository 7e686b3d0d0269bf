//! Gate decision engine
//!
//! Decides, for a single request, whether the caller must authenticate before
//! the request reaches application logic. The engine never builds responses
//! and never talks to the authenticator; acting on [`GateDecision::Challenge`]
//! is the serving layer's job.

use crate::pattern::PatternSet;
use serde::Serialize;
use tracing::trace;

/// Compiled gate configuration, built once at startup and read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct GateConfig {
    /// Paths that must be authenticated
    pub required: PatternSet,
    /// Paths that are always allowed, consulted before `required`
    pub exempt: PatternSet,
}

/// Per-request input to the decision engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Request path, without the query string
    pub path: String,
    /// Whether the caller already holds an authenticated session
    pub authenticated: bool,
}

impl RequestContext {
    pub fn new(path: impl Into<String>, authenticated: bool) -> Self {
        Self {
            path: path.into(),
            authenticated,
        }
    }

    pub fn anonymous(path: impl Into<String>) -> Self {
        Self::new(path, false)
    }

    pub fn authenticated(path: impl Into<String>) -> Self {
        Self::new(path, true)
    }
}

/// Outcome of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateDecision {
    /// The request proceeds to its handler
    Allow,
    /// The caller must pass through the login entry point first
    Challenge,
}

/// Which step of the decision table produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionReason {
    Authenticated,
    Exempt,
    Required,
    Unmatched,
}

/// A decision together with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateVerdict<'a> {
    pub decision: GateDecision,
    pub reason: DecisionReason,
    /// First configured pattern that matched, for exempt and required decisions
    pub pattern: Option<&'a str>,
}

impl GateConfig {
    pub fn new(required: PatternSet, exempt: PatternSet) -> Self {
        Self { required, exempt }
    }

    /// Apply the decision table; the order of the steps is significant.
    pub fn evaluate(&self, ctx: &RequestContext) -> GateVerdict<'_> {
        let (decision, reason, pattern) = if ctx.authenticated {
            (GateDecision::Allow, DecisionReason::Authenticated, None)
        } else if let Some(pattern) = self.exempt.first_match(&ctx.path) {
            (GateDecision::Allow, DecisionReason::Exempt, Some(pattern))
        } else if let Some(pattern) = self.required.first_match(&ctx.path) {
            (GateDecision::Challenge, DecisionReason::Required, Some(pattern))
        } else {
            (GateDecision::Allow, DecisionReason::Unmatched, None)
        };

        trace!(path = %ctx.path, ?decision, ?reason, pattern, "Gate evaluated");
        GateVerdict {
            decision,
            reason,
            pattern,
        }
    }

    pub fn decide(&self, ctx: &RequestContext) -> GateDecision {
        self.evaluate(ctx).decision
    }
}

/// Decide whether `ctx` may proceed under `config`
pub fn decide(config: &GateConfig, ctx: &RequestContext) -> GateDecision {
    config.decide(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternKind;

    fn topsecret() -> GateConfig {
        GateConfig::new(
            PatternSet::compile([r"/topsecret/(.*)$"], PatternKind::Required).unwrap(),
            PatternSet::compile(
                [r"/topsecret/login(.*)$", r"/topsecret/logout(.*)$"],
                PatternKind::Exempt,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_topsecret_scenario() {
        let config = topsecret();

        assert_eq!(
            decide(&config, &RequestContext::anonymous("/topsecret/data")),
            GateDecision::Challenge
        );
        assert_eq!(
            decide(&config, &RequestContext::anonymous("/topsecret/login")),
            GateDecision::Allow
        );
        assert_eq!(
            decide(&config, &RequestContext::authenticated("/topsecret/data")),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_authenticated_always_allowed() {
        let config = GateConfig::new(
            PatternSet::compile([".*"], PatternKind::Required).unwrap(),
            PatternSet::empty(),
        );

        for path in ["/", "/topsecret/data", "/admin", "", "/login"] {
            let verdict = config.evaluate(&RequestContext::authenticated(path));
            assert_eq!(verdict.decision, GateDecision::Allow);
            assert_eq!(verdict.reason, DecisionReason::Authenticated);
        }
    }

    #[test]
    fn test_exempt_wins_over_required() {
        let config = GateConfig::new(
            PatternSet::compile(["/shared/"], PatternKind::Required).unwrap(),
            PatternSet::compile(["/shared/"], PatternKind::Exempt).unwrap(),
        );

        let verdict = config.evaluate(&RequestContext::anonymous("/shared/page"));
        assert_eq!(verdict.decision, GateDecision::Allow);
        assert_eq!(verdict.reason, DecisionReason::Exempt);
        assert_eq!(verdict.pattern, Some("/shared/"));
    }

    #[test]
    fn test_unmatched_paths_default_to_allow() {
        let config = topsecret();

        let verdict = config.evaluate(&RequestContext::anonymous("/public/about"));
        assert_eq!(verdict.decision, GateDecision::Allow);
        assert_eq!(verdict.reason, DecisionReason::Unmatched);
        assert_eq!(verdict.pattern, None);

        let empty = GateConfig::default();
        assert_eq!(
            empty.decide(&RequestContext::anonymous("/topsecret/data")),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_required_only_match_challenges() {
        let config = topsecret();
        let verdict = config.evaluate(&RequestContext::anonymous("/topsecret/report"));
        assert_eq!(verdict.decision, GateDecision::Challenge);
        assert_eq!(verdict.reason, DecisionReason::Required);
        assert_eq!(verdict.pattern, Some(r"/topsecret/(.*)$"));
    }

    #[test]
    fn test_decision_is_repeatable() {
        let config = topsecret();
        let ctx = RequestContext::anonymous("/topsecret/data");
        let first = config.evaluate(&ctx);
        for _ in 0..10 {
            assert_eq!(config.evaluate(&ctx), first);
        }
    }

    #[test]
    fn test_config_is_shareable_across_threads() {
        let config = std::sync::Arc::new(topsecret());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let config = config.clone();
                std::thread::spawn(move || {
                    let path = format!("/topsecret/item/{i}");
                    config.decide(&RequestContext::anonymous(path))
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), GateDecision::Challenge);
        }
    }
}
