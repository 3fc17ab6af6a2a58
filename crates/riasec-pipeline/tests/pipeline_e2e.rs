// tests/pipeline_e2e.rs
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use riasec_acquire::{FetchedPage, PageSource, RatePolicy};
use riasec_model::{InterestArea, PipelineStage};
use riasec_pipeline::{run, run_step, state, steps, tables, PipelineConfig, PipelinePaths, Step};

const BASE: &str = "http://onet.test";
const HEADER: &str = "Code,Occupation,Job Zone,Interest1,Interest2,Interest3";

/// In-memory stand-in for O*NET OnLine.
struct FakeOnet {
    tables: HashMap<&'static str, &'static str>,
    titles: HashMap<&'static str, &'static str>,
    requests: Mutex<Vec<String>>,
}

impl FakeOnet {
    fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(
            "Realistic_Investigative_Artistic.csv",
            "Code,Occupation,Job Zone,First Interest,Second Interest,Third Interest\n\
             17-2051.00,Civil Engineers,4,Realistic,Investigative,Artistic\n",
        );
        tables.insert(
            "Realistic_Investigative.csv",
            "Code,Occupation,Job Zone,First Interest,Second Interest,Third Interest\n\
             17-2051.00,Civil Engineers (again),4,Realistic,Investigative,\n\
             19-2012.00,Physicists,5,Investigative,Realistic,\n",
        );
        tables.insert(
            "Realistic_Artistic.csv",
            "Code,Occupation,Job Zone,First Interest,Second Interest,Third Interest\n\
             47-2031.00,Carpenters,2,Realistic,Artistic,\n",
        );
        // Last fragment without a trailing newline
        tables.insert(
            "Investigative_Artistic.csv",
            "Code,Occupation,Job Zone,First Interest,Second Interest,Third Interest\n\
             15-1252.00,Software Developers,4,Investigative,Artistic,",
        );

        let mut titles = HashMap::new();
        titles.insert("17-2051.00", "Project Engineer, Structural Engineer");
        titles.insert("15-1252.00", "Application Developer, Software Engineer");

        Self {
            tables,
            titles,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests_matching(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains(needle))
            .count()
    }

    fn detail_page(titles: &str) -> String {
        format!(
            "<html><body><div id=\"content\">\
             <h1>Occupation</h1><p>code</p><p>summary</p><div>badge</div>\
             <p><b>Sample of reported job titles:</b><br>\n{titles}</p>\
             </div></body></html>"
        )
    }
}

#[async_trait]
impl PageSource for FakeOnet {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        self.requests.lock().unwrap().push(url.to_string());
        let page = |status: u16, body: String| FetchedPage { status, body, retry_after: None };

        if url.contains("/explore/interests-table/") {
            let file = url
                .rsplit('/')
                .next()
                .and_then(|last| last.split('?').next())
                .unwrap_or_default();
            return Ok(match self.tables.get(file) {
                Some(body) => page(200, body.to_string()),
                None => page(404, "<html>\n<body>Not Found</body>\n</html>".to_string()),
            });
        }

        let code = url.rsplit('/').next().unwrap_or_default();
        match self.titles.get(code) {
            Some(t) => Ok(page(200, Self::detail_page(t))),
            None if code == "19-2012.00" => Ok(page(200, "<html><body>redesigned page</body></html>".into())),
            None => anyhow::bail!("connection reset"),
        }
    }
}

fn setup(dir: &Path) -> PipelineConfig {
    let paths = PipelinePaths::in_dir(dir);
    fs::write(
        &paths.stem_occupations,
        "Code,Occupation\n\
         17-2051.00,Civil Engineers (STEM list)\n\
         19-2012.00,Physicists\n\
         15-1252.00,Software Developers\n\
         11-9041.00,Architectural and Engineering Managers\n",
    )
    .unwrap();

    PipelineConfig::default()
        .with_paths(paths)
        .with_base_url(BASE)
        .with_interest_areas(vec![
            InterestArea::Realistic,
            InterestArea::Investigative,
            InterestArea::Artistic,
        ])
        .with_rate(RatePolicy::unthrottled())
}

#[tokio::test]
async fn full_run_produces_merged_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let site = FakeOnet::new();

    let final_state = run(&site, &config).await.unwrap();
    assert_eq!(final_state.stage, PipelineStage::Merged);
    assert_eq!(final_state.all_occupation_rows, Some(4));
    assert_eq!(site.requests_matching("/explore/interests-table/"), 4);
    assert_eq!(site.requests_matching("/link/details/"), 4);

    // Deduplicated accumulator, first occurrence wins, combination order kept
    let all = fs::read_to_string(&config.paths.all_occupations).unwrap();
    let lines: Vec<&str> = all.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines[1], "17-2051.00,Civil Engineers,4,Realistic,Investigative,Artistic");
    assert_eq!(lines.len(), 5);
    assert!(lines[4].starts_with("15-1252.00,Software Developers,"));

    // Titles: one per STEM row, failures empty
    let stem = tables::read_table(&config.paths.stem_job_titles).unwrap();
    assert_eq!(stem.headers, vec!["Code", "Occupation", "Job Titles"]);
    assert_eq!(
        stem.column("Job Titles").unwrap(),
        vec![
            "Project Engineer, Structural Engineer",
            "",
            "Application Developer, Software Engineer",
            "",
        ]
    );

    // Merge: left join, STEM occupation name wins
    let merged = tables::read_table(&config.paths.merged).unwrap();
    assert_eq!(
        merged.headers,
        vec!["Code", "Occupation", "Job Titles", "Job Zone", "Interest1", "Interest2", "Interest3"]
    );
    assert_eq!(merged.len(), 4);
    assert_eq!(merged.rows[0][1], "Civil Engineers (STEM list)");
    assert_eq!(merged.rows[0][3], "4");
    assert_eq!(merged.rows[1][3], "5");
    let manager = &merged.rows[3];
    assert_eq!(manager[0], "11-9041.00");
    assert!(manager[3..].iter().all(|v| v.is_empty()));

    let saved = state::load(&config.paths.state).unwrap().unwrap();
    assert_eq!(saved.stage, PipelineStage::Merged);
}

#[tokio::test]
async fn existing_accumulator_skips_download() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let existing = format!(
        "{HEADER}\n\
         15-1252.00,Software Developers,4,Investigative,Conventional,Realistic\n\
         15-1252.00,Software Developers (dup),4,Investigative,Conventional,\n"
    );
    fs::write(&config.paths.all_occupations, &existing).unwrap();

    let site = FakeOnet::new();
    run(&site, &config).await.unwrap();

    assert_eq!(site.requests_matching("/explore/interests-table/"), 0);
    let all = fs::read_to_string(&config.paths.all_occupations).unwrap();
    assert_eq!(
        all,
        format!("{HEADER}\n15-1252.00,Software Developers,4,Investigative,Conventional,Realistic\n")
    );

    let merged = tables::read_table(&config.paths.merged).unwrap();
    assert_eq!(merged.len(), 4);
    assert_eq!(merged.rows[2][4], "Investigative");
    assert!(merged.rows[0][3..].iter().all(|v| v.is_empty()));
}

#[tokio::test]
async fn resume_skips_recorded_steps() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    run(&FakeOnet::new(), &config).await.unwrap();

    let site = FakeOnet::new();
    let resumed = config.clone().with_resume(true);
    let state = run(&site, &resumed).await.unwrap();
    assert_eq!(state.stage, PipelineStage::Merged);
    assert!(site.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn refetch_downloads_again() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    run(&FakeOnet::new(), &config).await.unwrap();

    let site = FakeOnet::new();
    run(&site, &config.clone().with_refetch(true)).await.unwrap();
    assert_eq!(site.requests_matching("/explore/interests-table/"), 4);
}

#[tokio::test]
async fn zone_filter_runs_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path()).with_min_zone(Some(4));
    run(&FakeOnet::new(), &config).await.unwrap();

    let filtered = tables::read_occupations(&config.paths.filtered_by_zone).unwrap();
    let codes: Vec<&str> = filtered.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["17-2051.00", "19-2012.00", "15-1252.00"]);
}

#[test]
fn dedupe_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let paths = PipelinePaths::in_dir(dir.path());
    fs::write(
        &paths.all_occupations,
        format!(
            "{HEADER}\n\
             17-2051.00,Civil Engineers,4,Realistic,Investigative,\n\
             47-2031.00,Carpenters,2,Realistic,,\n\
             17-2051.00,Civil Engineers,4,Realistic,Investigative,\n"
        ),
    )
    .unwrap();

    let first = steps::dedupe(&paths).unwrap();
    assert_eq!((first.before, first.after), (3, 2));
    let once = fs::read(&paths.all_occupations).unwrap();

    let second = steps::dedupe(&paths).unwrap();
    assert_eq!((second.before, second.after), (2, 2));
    assert_eq!(fs::read(&paths.all_occupations).unwrap(), once);
}

#[tokio::test]
async fn stem_file_without_code_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    fs::write(&config.paths.stem_occupations, "Id,Occupation\n1,Physicists\n").unwrap();

    let err = steps::titles(&FakeOnet::new(), &config).await.unwrap_err();
    assert!(format!("{err:#}").contains("missing required column: Code"));
}

#[tokio::test]
async fn resume_after_single_steps_still_dedupes() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    fs::write(
        &config.paths.all_occupations,
        format!(
            "{HEADER}\n\
             15-1252.00,Software Developers,4,Investigative,Conventional,Realistic\n\
             15-1252.00,Software Developers,4,Investigative,Conventional,Realistic\n"
        ),
    )
    .unwrap();

    let site = FakeOnet::new();
    let fetched = run_step(&site, &config, Step::Fetch).await.unwrap();
    assert_eq!(fetched.stage, PipelineStage::Fetched);

    // Titles without a dedupe must not count as progress past it
    let after_titles = run_step(&site, &config, Step::Titles).await.unwrap();
    assert_eq!(after_titles.stage, PipelineStage::Fetched);

    let final_state = run(&site, &config.clone().with_resume(true)).await.unwrap();
    assert_eq!(final_state.stage, PipelineStage::Merged);
    let rows = tables::read_occupations(&config.paths.all_occupations).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(final_state.all_occupation_rows, Some(1));
}

#[tokio::test]
async fn row_count_ignores_error_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path()).with_interest_areas(vec![
        InterestArea::Realistic,
        InterestArea::Investigative,
        InterestArea::Artistic,
        InterestArea::Social,
    ]);
    let site = FakeOnet::new();

    let fetched = run_step(&site, &config, Step::Fetch).await.unwrap();
    assert_eq!(fetched.stage, PipelineStage::Fetched);
    assert_eq!(fetched.all_occupation_rows, None);
    assert!(fs::read_to_string(&config.paths.all_occupations)
        .unwrap()
        .contains("<body>Not Found</body>"));

    let deduped = run_step(&site, &config, Step::Dedupe).await.unwrap();
    assert_eq!(deduped.all_occupation_rows, Some(4));
    let saved = state::load(&config.paths.state).unwrap().unwrap();
    assert_eq!(saved.all_occupation_rows, Some(4));
}
