//! Crawl target: one URL plus metadata queued for fetching

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Opaque context carried from a parent target to its children
///
/// The engine never inspects the contents; it only hands the map through to
/// the page processor. `Arc` keeps parent-to-child propagation cheap and the
/// map immutable after creation.
pub type TargetContext = Arc<Map<String, Value>>;

/// Class of a crawl target
///
/// Purely informational routing metadata for the processor; the engine
/// treats it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A page carrying multiple items (e.g. a category index)
    Listing,
    /// A page describing a single item
    Detail,
    /// Any other class, named by the processor that produced it
    Other(String),
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Listing => write!(f, "listing"),
            TargetKind::Detail => write!(f, "detail"),
            TargetKind::Other(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for TargetKind {
    fn from(s: &str) -> Self {
        match s {
            "listing" => TargetKind::Listing,
            "detail" => TargetKind::Detail,
            other => TargetKind::Other(other.to_string()),
        }
    }
}

/// A unit of work for the crawl pipeline
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// Fetch address
    pub url: String,

    /// Target class, opaque to the engine
    pub kind: TargetKind,

    /// Lower value is served first; ties broken by arrival order
    pub priority: u32,

    /// Distance from a seed target; never mutated after creation
    pub depth: u32,

    /// Fetch attempts so far; incremented on each retry
    pub attempt: u32,

    /// Opaque key/value data passed through to the processor
    pub context: TargetContext,
}

impl CrawlTarget {
    /// Creates a seed target at depth 0 with default priority
    pub fn seed(url: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            url: url.into(),
            kind,
            priority: 0,
            depth: 0,
            attempt: 0,
            context: Arc::new(Map::new()),
        }
    }

    /// Creates a child target one level deeper, inheriting this target's context
    pub fn child(&self, url: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            url: url.into(),
            kind,
            priority: self.priority,
            depth: self.depth + 1,
            attempt: 0,
            context: Arc::clone(&self.context),
        }
    }

    /// Sets the priority (lower is served first)
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Replaces the context map
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = Arc::new(context);
        self
    }
}
