use anyhow::{Context, Result};
use riasec_model::Combination;
use url::Url;

pub const BASE_URL: &str = "https://www.onetonline.org";

/// URL of the interests-table CSV for one combination.
///
/// Three areas: `/explore/interests-table/A/B/C/A_B_C.csv?fmt=csv`;
/// two areas: `/explore/interests-table/A/B/A_B.csv?fmt=csv`.
pub fn interests_table_url(base: &str, combination: &Combination) -> Result<String> {
    let names: Vec<&str> = combination.areas().iter().map(|a| a.name()).collect();
    let file_name = format!("{}.csv", names.join("_"));

    let mut url = parse_base(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Base URL cannot hold a path: {base}"))?
        .pop_if_empty()
        .extend(["explore", "interests-table"])
        .extend(names.iter().copied())
        .push(&file_name);
    url.query_pairs_mut().append_pair("fmt", "csv");
    Ok(url.into())
}

/// URL of an occupation's detail page.
pub fn occupation_details_url(base: &str, code: &str) -> Result<String> {
    let mut url = parse_base(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Base URL cannot hold a path: {base}"))?
        .pop_if_empty()
        .extend(["link", "details", code.trim()]);
    Ok(url.into())
}

fn parse_base(base: &str) -> Result<Url> {
    Url::parse(base).with_context(|| format!("Invalid base URL: {base}"))
}
