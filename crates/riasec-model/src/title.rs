use thiserror::Error;

/// Why no job title could be extracted for an occupation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TitleMissing {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("job title element not found")]
    ElementNotFound,

    #[error("job title element is empty")]
    EmptyText,
}

impl TitleMissing {
    /// Short stable label for summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            TitleMissing::Request(_) => "request",
            TitleMissing::HttpStatus(_) => "http_status",
            TitleMissing::ElementNotFound => "element_not_found",
            TitleMissing::EmptyText => "empty_text",
        }
    }
}

/// Result of scraping one occupation's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOutcome {
    Found(String),
    Missing(TitleMissing),
}

impl TitleOutcome {
    /// Value written to the `Job Titles` column; failures become `""`.
    pub fn cell(&self) -> &str {
        match self {
            TitleOutcome::Found(title) => title,
            TitleOutcome::Missing(_) => "",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, TitleOutcome::Found(_))
    }
}

impl From<Result<String, TitleMissing>> for TitleOutcome {
    fn from(result: Result<String, TitleMissing>) -> Self {
        match result {
            Ok(title) => TitleOutcome::Found(title),
            Err(reason) => TitleOutcome::Missing(reason),
        }
    }
}
