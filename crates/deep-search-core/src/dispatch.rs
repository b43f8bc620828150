use crate::normalize::{normalize, NormalizedResult};
use crate::render::{self, FormattedOutput, Surface};
use crate::request::{ArgumentBag, ResearchRequest, SearchRequest};
use crate::{Error, Result, SearchEngine};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    Research,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Research => "research",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    /// Accepts both the CLI verbs and the MCP tool names.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "search" | "deep_search" => Ok(Self::Search),
            "research" | "comprehensive_research" => Ok(Self::Research),
            other => Err(Error::UnsupportedOperation(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub request: SearchRequest,
    pub result: NormalizedResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutcome {
    pub request: ResearchRequest,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Search(SearchOutcome),
    Research(ResearchOutcome),
}

/// Routes named operations to the engine and shapes what comes back.
///
/// Holds no per-call state; one instance can serve concurrent calls.
pub struct Dispatcher {
    engine: Arc<dyn SearchEngine>,
    log: tracing::Span,
}

impl Dispatcher {
    /// `log` is the span every dispatcher event is parented to; front ends create it
    /// once at startup.
    pub fn new(engine: Arc<dyn SearchEngine>, log: tracing::Span) -> Self {
        Self { engine, log }
    }

    pub async fn dispatch(&self, operation: &str, args: &ArgumentBag) -> Result<Outcome> {
        let op = operation.parse::<Operation>().inspect_err(|e| {
            tracing::warn!(parent: &self.log, error = %e, "rejected operation");
        })?;
        match op {
            Operation::Search => {
                let req = SearchRequest::from_args(args)?;
                self.search(req).await.map(Outcome::Search)
            }
            Operation::Research => {
                let req = ResearchRequest::from_args(args)?;
                self.research(req).await.map(Outcome::Research)
            }
        }
    }

    pub async fn dispatch_for(
        &self,
        surface: Surface,
        operation: &str,
        args: &ArgumentBag,
    ) -> Result<FormattedOutput> {
        let outcome = self.dispatch(operation, args).await?;
        Ok(render::format(&outcome, surface))
    }

    pub async fn search(&self, req: SearchRequest) -> Result<SearchOutcome> {
        tracing::info!(
            parent: &self.log,
            query = %req.query,
            provider = %req.provider,
            max_results = req.max_results,
            "search request"
        );
        if let Some(requested) = req.clamped_from {
            tracing::warn!(
                parent: &self.log,
                requested,
                cap = req.max_results,
                "maxResults clamped"
            );
        }
        let t0 = Instant::now();
        let raw = self
            .engine
            .web_search(req.provider, &req.query, req.max_results)
            .await
            .inspect_err(|e| tracing::error!(parent: &self.log, error = %e, "search failed"))?;
        let result = normalize(&raw)
            .inspect_err(|e| tracing::error!(parent: &self.log, error = %e, "engine error"))?;
        tracing::debug!(
            parent: &self.log,
            results = result.results.len(),
            has_answer = result.answer.is_some(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(SearchOutcome {
            request: req,
            result,
        })
    }

    pub async fn research(&self, req: ResearchRequest) -> Result<ResearchOutcome> {
        tracing::info!(
            parent: &self.log,
            query = %req.query,
            model_class = %req.model_class,
            "research request"
        );
        let t0 = Instant::now();
        let report = self
            .engine
            .web_search_task(&req.query, req.model_class)
            .await
            .inspect_err(|e| tracing::error!(parent: &self.log, error = %e, "research failed"))?;
        tracing::debug!(
            parent: &self.log,
            report_chars = report.chars().count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "research complete"
        );
        Ok(ResearchOutcome {
            request: req,
            report,
        })
    }
}
