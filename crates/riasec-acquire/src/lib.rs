pub mod interests;
pub mod normalize;
pub mod output;
pub mod rate_limit;
pub mod source;
pub mod titles;
pub mod urls;

pub use interests::{fetch_all_occupations, FetchOptions, FetchSummary};
pub use rate_limit::{BackoffPolicy, RatePolicy};
pub use source::{FetchedPage, HttpSource, PageSource};
pub use titles::{scrape_job_titles, TitleReport};
