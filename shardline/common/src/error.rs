use std::fmt;

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Points users at the issue tracker entry for a feature that is not supported yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackingIssue(Option<u32>);

impl From<u32> for TrackingIssue {
    fn from(issue: u32) -> Self {
        Self(Some(issue))
    }
}

impl From<Option<u32>> for TrackingIssue {
    fn from(issue: Option<u32>) -> Self {
        Self(issue)
    }
}

impl fmt::Display for TrackingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repo = env!("CARGO_PKG_REPOSITORY");
        match self.0 {
            Some(issue) => write!(f, "tracked at {repo}/issues/{issue}"),
            None => write!(f, "not tracked yet, please report it at {repo}/issues"),
        }
    }
}

/// Raised for syntax the parser accepts but binding or execution cannot handle yet.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("not supported yet: {feature}")]
pub struct NotImplemented {
    feature: SmolStr,
    #[help]
    issue: TrackingIssue,
}

impl NotImplemented {
    #[inline]
    pub fn new(feature: impl Into<SmolStr>, issue: impl Into<TrackingIssue>) -> Self {
        Self {
            feature: feature.into(),
            issue: issue.into(),
        }
    }

    #[inline]
    pub fn feature(&self) -> &str {
        &self.feature
    }

    #[inline]
    pub fn issue(&self) -> TrackingIssue {
        self.issue
    }
}

#[inline]
pub fn not_implemented<T, E>(feature: impl Into<SmolStr>, issue: Option<u32>) -> Result<T, E>
where
    E: From<NotImplemented>,
{
    Err(E::from(NotImplemented::new(feature, issue)))
}
