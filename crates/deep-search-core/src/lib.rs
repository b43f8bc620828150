use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod dispatch;
pub mod normalize;
pub mod render;
pub mod request;

pub use dispatch::{Dispatcher, Operation, Outcome, ResearchOutcome, SearchOutcome};
pub use normalize::{normalize, NormalizedResult, RawShape, ResultItem};
pub use render::{FormattedOutput, Surface};
pub use request::{ArgumentBag, ResearchRequest, SearchRequest};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The engine signalled a failure in-band; the message is kept verbatim.
    #[error("{0}")]
    Engine(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Known search backends. The engine owns the actual integrations; we only route by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[default]
    Brave,
    Anthropic,
    Openai,
    Google,
    Sonar,
    SonarPro,
    SonarDeepResearch,
    Xai,
}

impl Provider {
    pub const ALL: [Provider; 8] = [
        Provider::Brave,
        Provider::Anthropic,
        Provider::Openai,
        Provider::Google,
        Provider::Sonar,
        Provider::SonarPro,
        Provider::SonarDeepResearch,
        Provider::Xai,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brave => "brave",
            Self::Anthropic => "anthropic",
            Self::Openai => "openai",
            Self::Google => "google",
            Self::Sonar => "sonar",
            Self::SonarPro => "sonar-pro",
            Self::SonarDeepResearch => "sonar-deep-research",
            Self::Xai => "xai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown provider {s:?} (allowed: {})",
                    allowed_list(Self::ALL.iter().map(|p| p.as_str()))
                ))
            })
    }
}

/// Reasoning configuration the research engine should use internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum ModelClass {
    Standard,
    Mini,
    Reasoning,
    #[default]
    ReasoningMini,
    Monologue,
    Metacognition,
    Code,
    Writing,
    Summary,
    Vision,
    VisionMini,
    Search,
    ImageGeneration,
    Embedding,
    Voice,
}

impl ModelClass {
    pub const ALL: [ModelClass; 15] = [
        ModelClass::Standard,
        ModelClass::Mini,
        ModelClass::Reasoning,
        ModelClass::ReasoningMini,
        ModelClass::Monologue,
        ModelClass::Metacognition,
        ModelClass::Code,
        ModelClass::Writing,
        ModelClass::Summary,
        ModelClass::Vision,
        ModelClass::VisionMini,
        ModelClass::Search,
        ModelClass::ImageGeneration,
        ModelClass::Embedding,
        ModelClass::Voice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Mini => "mini",
            Self::Reasoning => "reasoning",
            Self::ReasoningMini => "reasoning_mini",
            Self::Monologue => "monologue",
            Self::Metacognition => "metacognition",
            Self::Code => "code",
            Self::Writing => "writing",
            Self::Summary => "summary",
            Self::Vision => "vision",
            Self::VisionMini => "vision_mini",
            Self::Search => "search",
            Self::ImageGeneration => "image_generation",
            Self::Embedding => "embedding",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown model class {s:?} (allowed: {})",
                    allowed_list(Self::ALL.iter().map(|m| m.as_str()))
                ))
            })
    }
}

fn allowed_list<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// The external search/research collaborator.
///
/// Implementations return the engine's raw payload untouched: it may be JSON, an
/// `Error:`-prefixed string, or prose. Shaping it is the normalizer's job.
/// Neither call is expected to time out on its own; research in particular may run
/// for minutes.
#[async_trait::async_trait]
pub trait SearchEngine: Send + Sync {
    async fn web_search(&self, provider: Provider, query: &str, max_results: usize)
        -> Result<String>;

    async fn web_search_task(&self, query: &str, model_class: ModelClass) -> Result<String>;
}
