//! Government statistics lookup (Census ACS, BLS LAUS, BEA Regional).
//!
//! A question is classified by keyword into income / employment / GDP /
//! population intents. When it also names a known county, the matching
//! endpoints are tried in order (ACS, BLS, BEA) until one returns data.
//! Every failure is logged and treated as "no data" for that step.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use seacow_core::{env_nonempty, Error, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Used when the question names no year.
pub const DEFAULT_YEAR: u16 = 2023;

const GEORGIA_FIPS: &str = "13";

pub(crate) const INCOME_TERMS: &[&str] =
    &["income", "earnings", "salary", "salaries", "wage", "wages"];
pub(crate) const EMPLOYMENT_TERMS: &[&str] =
    &["unemployment", "employment", "jobless", "labor force", "jobs"];
pub(crate) const GDP_TERMS: &[&str] = &["gdp", "gross domestic product", "economic output"];
pub(crate) const POPULATION_TERMS: &[&str] = &[
    "population",
    "residents",
    "how many people",
    "demographic",
    "demographics",
];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b20\d{2}\b").unwrap());

static INCOME_RE: Lazy<Regex> = Lazy::new(|| whole_words(INCOME_TERMS));
static EMPLOYMENT_RE: Lazy<Regex> = Lazy::new(|| whole_words(EMPLOYMENT_TERMS));
static GDP_RE: Lazy<Regex> = Lazy::new(|| whole_words(GDP_TERMS));
static POPULATION_RE: Lazy<Regex> = Lazy::new(|| whole_words(POPULATION_TERMS));
/// One matcher per entry of [`PLACES`], same order.
static PLACE_RES: Lazy<Vec<Regex>> =
    Lazy::new(|| PLACES.iter().map(|p| whole_words(p.keywords)).collect());

/// Which statistics API answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatSource {
    #[serde(rename = "ACS")]
    Acs,
    #[serde(rename = "BLS")]
    Bls,
    #[serde(rename = "BEA")]
    Bea,
}

impl StatSource {
    pub fn label(&self) -> &'static str {
        match self {
            StatSource::Acs => "ACS",
            StatSource::Bls => "BLS",
            StatSource::Bea => "BEA",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StatSource::Acs => "U.S. Census Bureau, American Community Survey 5-year estimates",
            StatSource::Bls => "U.S. Bureau of Labor Statistics, Local Area Unemployment Statistics",
            StatSource::Bea => "U.S. Bureau of Economic Analysis, GDP by county (CAGDP1)",
        }
    }
}

impl std::fmt::Display for StatSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A county the statistics APIs can answer for.
#[derive(Debug, PartialEq, Eq)]
pub struct Place {
    pub name: &'static str,
    keywords: &'static [&'static str],
    /// Data-source keys that imply this place when the query names none.
    source_keys: &'static [&'static str],
    pub county_fips: &'static str,
    /// LAUS unemployment-rate series.
    pub bls_series: &'static str,
}

impl Place {
    pub fn geo_fips(&self) -> String {
        format!("{}{}", GEORGIA_FIPS, self.county_fips)
    }
}

pub static PLACES: &[Place] = &[
    Place {
        name: "Chatham County, Georgia",
        keywords: &["chatham", "savannah"],
        source_keys: &["chatham", "savannah"],
        county_fips: "051",
        bls_series: "LAUCN130510000000003",
    },
    Place {
        name: "Bryan County, Georgia",
        keywords: &["bryan"],
        source_keys: &["bryancounty"],
        county_fips: "029",
        bls_series: "LAUCN130290000000003",
    },
];

/// Keyword classification of a question. Categories are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryIntent {
    pub income: bool,
    pub employment: bool,
    pub gdp: bool,
    pub population: bool,
}

impl QueryIntent {
    pub fn is_empty(&self) -> bool {
        !(self.income || self.employment || self.gdp || self.population)
    }
}

/// `\b(?:a|b|...)\b` over literal terms.
fn whole_words(terms: &[&str]) -> Regex {
    let alternatives: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).unwrap()
}

/// Classify a lower-cased query. Terms match whole words only.
pub fn classify(query: &str) -> QueryIntent {
    QueryIntent {
        income: INCOME_RE.is_match(query),
        employment: EMPLOYMENT_RE.is_match(query),
        gdp: GDP_RE.is_match(query),
        population: POPULATION_RE.is_match(query),
    }
}

/// First `20xx` year in the query, else [`DEFAULT_YEAR`].
pub fn extract_year(query: &str) -> u16 {
    YEAR_RE
        .find(query)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_YEAR)
}

/// Place named in the query, else the one implied by the source key.
pub fn find_place(query: &str, source_hint: Option<&str>) -> Option<&'static Place> {
    PLACES
        .iter()
        .zip(PLACE_RES.iter())
        .find(|(_, re)| re.is_match(query))
        .map(|(place, _)| place)
        .or_else(|| {
            let hint = source_hint?.trim().to_lowercase();
            PLACES.iter().find(|p| p.source_keys.contains(&hint.as_str()))
        })
}

/// One statistics request to attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStep {
    Acs {
        place: &'static Place,
        year: u16,
        variables: Vec<&'static str>,
    },
    Bls {
        place: &'static Place,
        year: u16,
    },
    Bea {
        place: &'static Place,
        year: u16,
    },
}

impl LookupStep {
    pub fn source(&self) -> StatSource {
        match self {
            LookupStep::Acs { .. } => StatSource::Acs,
            LookupStep::Bls { .. } => StatSource::Bls,
            LookupStep::Bea { .. } => StatSource::Bea,
        }
    }
}

/// ACS variable codes and what they measure.
pub const ACS_VARIABLES: &[(&str, &str)] = &[
    ("B19013_001E", "Median household income (dollars)"),
    ("B19301_001E", "Per capita income (dollars)"),
    ("B01003_001E", "Total population"),
];

/// Ordered statistics requests for a question. Empty means "search instead".
pub fn plan_lookup(query: &str, source_hint: Option<&str>) -> Vec<LookupStep> {
    let query = query.to_lowercase();
    let intent = classify(&query);
    if intent.is_empty() {
        return Vec::new();
    }
    let Some(place) = find_place(&query, source_hint) else {
        return Vec::new();
    };
    let year = extract_year(&query);

    let mut steps = Vec::new();
    if intent.income || intent.population {
        let mut variables = Vec::new();
        if intent.income {
            variables.extend(["B19013_001E", "B19301_001E"]);
        }
        if intent.population {
            variables.push("B01003_001E");
        }
        steps.push(LookupStep::Acs {
            place,
            year,
            variables,
        });
    }
    if intent.employment {
        steps.push(LookupStep::Bls { place, year });
    }
    if intent.gdp {
        steps.push(LookupStep::Bea { place, year });
    }
    steps
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsHit {
    pub source: StatSource,
    pub place: &'static str,
    pub year: u16,
    /// Opaque payload from the API, passed verbatim to the prompt.
    pub record: Value,
}

impl StatisticsHit {
    /// Labeled JSON block for the prompt.
    pub fn to_prompt_json(&self) -> Value {
        let mut block = json!({
            "source": self.source.label(),
            "dataset": self.source.description(),
            "place": self.place,
            "year": self.year,
            "data": self.record,
        });
        if self.source == StatSource::Acs {
            let legend: Map<String, Value> = ACS_VARIABLES
                .iter()
                .filter(|(code, _)| self.record.get(*code).is_some())
                .map(|(code, label)| (code.to_string(), json!(label)))
                .collect();
            block["variables"] = Value::Object(legend);
        }
        block
    }
}

/// Statistics API endpoints and credentials.
#[derive(Debug, Clone)]
pub struct StatisticsConfig {
    pub census_base_url: String,
    pub census_api_key: Option<String>,
    pub bls_base_url: String,
    pub bls_api_key: Option<String>,
    pub bea_base_url: String,
    /// BEA refuses anonymous requests; without a key the BEA step is skipped.
    pub bea_api_key: Option<String>,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            census_base_url: "https://api.census.gov".into(),
            census_api_key: None,
            bls_base_url: "https://api.bls.gov".into(),
            bls_api_key: None,
            bea_base_url: "https://apps.bea.gov".into(),
            bea_api_key: None,
        }
    }
}

impl StatisticsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            census_base_url: env_nonempty("CENSUS_BASE_URL").unwrap_or(defaults.census_base_url),
            census_api_key: env_nonempty("CENSUS_API_KEY"),
            bls_base_url: env_nonempty("BLS_BASE_URL").unwrap_or(defaults.bls_base_url),
            bls_api_key: env_nonempty("BLS_API_KEY"),
            bea_base_url: env_nonempty("BEA_BASE_URL").unwrap_or(defaults.bea_base_url),
            bea_api_key: env_nonempty("BEA_API_KEY"),
        }
    }
}

/// Runs [`plan_lookup`] steps against the live APIs.
pub struct StatisticsLookup {
    client: Client,
    config: StatisticsConfig,
}

impl StatisticsLookup {
    /// `client` should carry a short timeout.
    pub fn new(client: Client, config: StatisticsConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &StatisticsConfig {
        &self.config
    }

    /// Try each planned step in order; `None` means fall back to web search.
    pub async fn lookup(&self, query: &str, source_hint: Option<&str>) -> Option<StatisticsHit> {
        let steps = plan_lookup(query, source_hint);
        if steps.is_empty() {
            debug!("No statistics intent/place in query: {}", query);
            return None;
        }

        for step in steps {
            let source = step.source();
            let (place, year) = match &step {
                LookupStep::Acs { place, year, .. }
                | LookupStep::Bls { place, year }
                | LookupStep::Bea { place, year } => (*place, *year),
            };

            match self.run_step(&step).await {
                Ok(Some(record)) => {
                    info!("{} statistics found for {} ({})", source, place.name, year);
                    return Some(StatisticsHit {
                        source,
                        place: place.name,
                        year,
                        record,
                    });
                }
                Ok(None) => {
                    info!("{} returned no data for {} ({})", source, place.name, year);
                }
                Err(e) => {
                    warn!("{} lookup failed for query {:?}: {}", source, query, e);
                }
            }
        }
        None
    }

    async fn run_step(&self, step: &LookupStep) -> Result<Option<Value>> {
        match step {
            LookupStep::Acs {
                place,
                year,
                variables,
            } => self.fetch_acs(place, *year, variables).await,
            LookupStep::Bls { place, year } => self.fetch_bls(place, *year).await,
            LookupStep::Bea { place, year } => self.fetch_bea(place, *year).await,
        }
    }

    async fn fetch_acs(
        &self,
        place: &Place,
        year: u16,
        variables: &[&str],
    ) -> Result<Option<Value>> {
        let url = format!(
            "{}/data/{}/acs/acs5",
            self.config.census_base_url.trim_end_matches('/'),
            year
        );
        let mut params = vec![
            ("get", format!("{},NAME", variables.join(","))),
            ("for", format!("county:{}", place.county_fips)),
            ("in", format!("state:{}", GEORGIA_FIPS)),
        ];
        if let Some(key) = &self.config.census_api_key {
            params.push(("key", key.clone()));
        }

        debug!("ACS request {} get={}", url, params[0].1);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| upstream(&url, e))?;
        let body = json_body(response, &url).await?;
        Ok(parse_acs(&body))
    }

    async fn fetch_bls(&self, place: &Place, year: u16) -> Result<Option<Value>> {
        let url = format!(
            "{}/publicAPI/v2/timeseries/data/",
            self.config.bls_base_url.trim_end_matches('/')
        );
        let mut payload = json!({
            "seriesid": [place.bls_series],
            "startyear": year.to_string(),
            "endyear": year.to_string(),
        });
        if let Some(key) = &self.config.bls_api_key {
            payload["registrationkey"] = json!(key);
        }

        debug!("BLS request {} series={}", url, place.bls_series);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| upstream(&url, e))?;
        let body = json_body(response, &url).await?;
        Ok(parse_bls(&body))
    }

    async fn fetch_bea(&self, place: &Place, year: u16) -> Result<Option<Value>> {
        let Some(key) = &self.config.bea_api_key else {
            debug!("BEA_API_KEY not set; skipping BEA lookup");
            return Ok(None);
        };
        let url = format!("{}/api/data", self.config.bea_base_url.trim_end_matches('/'));
        let year = year.to_string();
        let geo_fips = place.geo_fips();
        let params = [
            ("UserID", key.as_str()),
            ("method", "GetData"),
            ("datasetname", "Regional"),
            ("TableName", "CAGDP1"),
            ("LineCode", "1"),
            ("GeoFips", geo_fips.as_str()),
            ("Year", year.as_str()),
            ("ResultFormat", "json"),
        ];

        debug!("BEA request {} GeoFips={} Year={}", url, geo_fips, year);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| upstream(&url, e))?;
        let body = json_body(response, &url).await?;
        Ok(parse_bea(&body))
    }
}

/// Transport failure without the request URL, whose query string may carry a key.
fn upstream(url: &str, e: reqwest::Error) -> Error {
    Error::Upstream(format!("{}: {}", url, e.without_url()))
}

async fn json_body(response: reqwest::Response, url: &str) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Upstream(format!("{} returned HTTP {}", url, status)));
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| Error::Upstream(format!("{}: malformed JSON: {}", url, e.without_url())))
}

/// Zip the ACS header row with the first data row.
fn parse_acs(body: &Value) -> Option<Value> {
    let rows = body.as_array()?;
    let header = rows.first()?.as_array()?;
    let values = rows.get(1)?.as_array()?;
    let record: Map<String, Value> = header
        .iter()
        .zip(values)
        .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.clone())))
        .collect();
    (!record.is_empty()).then_some(Value::Object(record))
}

/// First series, if the request succeeded and it has observations.
fn parse_bls(body: &Value) -> Option<Value> {
    if body["status"].as_str() != Some("REQUEST_SUCCEEDED") {
        return None;
    }
    let series = body["Results"]["series"].get(0)?;
    let has_data = series["data"].as_array().is_some_and(|d| !d.is_empty());
    has_data.then(|| series.clone())
}

fn parse_bea(body: &Value) -> Option<Value> {
    let data = &body["BEAAPI"]["Results"]["Data"];
    let has_data = data.as_array().is_some_and(|d| !d.is_empty());
    has_data.then(|| data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn local_config(addr: SocketAddr) -> StatisticsConfig {
        StatisticsConfig {
            census_base_url: format!("http://{}", addr),
            census_api_key: None,
            bls_base_url: format!("http://{}", addr),
            bls_api_key: None,
            bea_base_url: format!("http://{}", addr),
            bea_api_key: Some("bea-test".into()),
        }
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("income in 2021"), 2021);
        assert_eq!(extract_year("income in 1999"), DEFAULT_YEAR);
        assert_eq!(extract_year("code 120215"), DEFAULT_YEAR);
        assert_eq!(extract_year("no year here"), DEFAULT_YEAR);
    }

    #[test]
    fn test_classify_is_independent() {
        let intent = classify("population and median household income");
        assert!(intent.income && intent.population);
        assert!(!intent.employment && !intent.gdp);
        assert!(classify("what is the weather").is_empty());
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        assert!(classify("jobsite safety rules").is_empty());
        assert!(classify("wageless").is_empty());
        assert!(classify("jobs in town").employment);
        assert!(classify("demographics of the area").population);
        assert!(find_place("bryant park events", None).is_none());
        assert_eq!(
            find_place("savannah's median income", None).map(|p| p.county_fips),
            Some("051")
        );
        assert!(plan_lookup("jobsite openings near bryant", None).is_empty());
    }

    #[test]
    fn test_income_query_plans_acs_with_year() {
        let steps = plan_lookup("median household income in Chatham county 2021", None);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].source(), StatSource::Acs);
        match &steps[0] {
            LookupStep::Acs {
                place,
                year,
                variables,
            } => {
                assert_eq!(*year, 2021);
                assert_eq!(place.county_fips, "051");
                assert_eq!(*variables, vec!["B19013_001E", "B19301_001E"]);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_unemployment_query_plans_bls_with_default_year() {
        let steps = plan_lookup("unemployment rate in Bryan county", None);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].source(), StatSource::Bls);
        match &steps[0] {
            LookupStep::Bls { place, year } => {
                assert_eq!(*year, 2023);
                assert_eq!(place.bls_series, "LAUCN130290000000003");
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_source_hint_supplies_place() {
        assert!(plan_lookup("what is the population", None).is_empty());
        let steps = plan_lookup("what is the population", Some("bryancounty"));
        assert_eq!(steps.len(), 1);
        assert!(matches!(&steps[0], LookupStep::Acs { place, .. } if place.county_fips == "029"));
        assert!(plan_lookup("what is the population", Some("all")).is_empty());
    }

    #[test]
    fn test_multi_intent_plans_in_priority_order() {
        let sources: Vec<StatSource> = plan_lookup("gdp, jobs and income for savannah", None)
            .iter()
            .map(LookupStep::source)
            .collect();
        assert_eq!(sources, vec![StatSource::Acs, StatSource::Bls, StatSource::Bea]);
    }

    #[test]
    fn test_parse_acs_zips_header_and_values() {
        let body = json!([
            ["B19013_001E", "NAME", "state", "county"],
            ["68361", "Chatham County, Georgia", "13", "051"]
        ]);
        let record = parse_acs(&body).unwrap();
        assert_eq!(record["B19013_001E"], "68361");
        assert_eq!(record["NAME"], "Chatham County, Georgia");
        assert!(parse_acs(&json!([["B19013_001E"]])).is_none());
        assert!(parse_acs(&json!({"error": "x"})).is_none());
    }

    #[test]
    fn test_parse_bls_requires_success_and_data() {
        let ok = json!({
            "status": "REQUEST_SUCCEEDED",
            "Results": {"series": [{"seriesID": "LAUCN130290000000003",
                "data": [{"year": "2023", "period": "M12", "value": "2.8"}]}]}
        });
        assert_eq!(parse_bls(&ok).unwrap()["seriesID"], "LAUCN130290000000003");

        let empty = json!({"status": "REQUEST_SUCCEEDED",
            "Results": {"series": [{"seriesID": "x", "data": []}]}});
        assert!(parse_bls(&empty).is_none());
        assert!(parse_bls(&json!({"status": "REQUEST_NOT_PROCESSED"})).is_none());
    }

    #[test]
    fn test_parse_bea() {
        let ok = json!({"BEAAPI": {"Results": {"Data": [{"GeoFips": "13051", "DataValue": "19,514,000"}]}}});
        assert!(parse_bea(&ok).is_some());
        assert!(parse_bea(&json!({"BEAAPI": {"Results": {"Error": {}}}})).is_none());
    }

    #[test]
    fn test_prompt_json_labels_acs_variables() {
        let hit = StatisticsHit {
            source: StatSource::Acs,
            place: "Chatham County, Georgia",
            year: 2021,
            record: json!({"B19013_001E": "68361", "NAME": "Chatham County, Georgia"}),
        };
        let block = hit.to_prompt_json();
        assert_eq!(block["source"], "ACS");
        assert_eq!(block["year"], 2021);
        assert_eq!(block["variables"]["B19013_001E"], "Median household income (dollars)");
        assert!(block["variables"].get("B01003_001E").is_none());
    }

    #[tokio::test]
    async fn test_lookup_acs_against_fixture() {
        let app = Router::new().route(
            "/data/{year}/acs/acs5",
            get(
                |Path(year): Path<u16>, Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(year, 2021);
                    assert_eq!(q["get"], "B19013_001E,B19301_001E,NAME");
                    assert_eq!(q["for"], "county:051");
                    assert_eq!(q["in"], "state:13");
                    assert!(!q.contains_key("key"));
                    Json(json!([
                        ["B19013_001E", "B19301_001E", "NAME", "state", "county"],
                        ["68361", "38012", "Chatham County, Georgia", "13", "051"]
                    ]))
                },
            ),
        );
        let addr = serve(app).await;
        let lookup = StatisticsLookup::new(Client::new(), local_config(addr));

        let hit = lookup
            .lookup("median household income in Chatham county 2021", None)
            .await
            .unwrap();
        assert_eq!(hit.source, StatSource::Acs);
        assert_eq!(hit.year, 2021);
        assert_eq!(hit.record["B19013_001E"], "68361");
    }

    #[tokio::test]
    async fn test_lookup_bls_against_fixture() {
        let app = Router::new().route(
            "/publicAPI/v2/timeseries/data/",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["seriesid"][0], "LAUCN130290000000003");
                assert_eq!(body["startyear"], "2023");
                Json(json!({
                    "status": "REQUEST_SUCCEEDED",
                    "Results": {"series": [{"seriesID": "LAUCN130290000000003",
                        "data": [{"year": "2023", "period": "M12", "value": "2.6"}]}]}
                }))
            }),
        );
        let addr = serve(app).await;
        let lookup = StatisticsLookup::new(Client::new(), local_config(addr));

        let hit = lookup
            .lookup("unemployment rate in Bryan county", None)
            .await
            .unwrap();
        assert_eq!(hit.source, StatSource::Bls);
        assert_eq!(hit.year, 2023);
    }

    #[tokio::test]
    async fn test_failed_step_falls_through_to_next() {
        let app = Router::new()
            .route(
                "/data/{year}/acs/acs5",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/publicAPI/v2/timeseries/data/",
                post(|| async { "not json" }),
            )
            .route(
                "/api/data",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q["UserID"], "bea-test");
                    assert_eq!(q["GeoFips"], "13051");
                    assert_eq!(q["TableName"], "CAGDP1");
                    Json(json!({"BEAAPI": {"Results": {"Data": [{"DataValue": "19,514,000"}]}}}))
                }),
            );
        let addr = serve(app).await;
        let lookup = StatisticsLookup::new(Client::new(), local_config(addr));

        let hit = lookup
            .lookup("income, jobs and gdp in savannah 2022", None)
            .await
            .unwrap();
        assert_eq!(hit.source, StatSource::Bea);
        assert_eq!(hit.year, 2022);
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_leak_keys() {
        let config = StatisticsConfig {
            census_base_url: "http://127.0.0.1:9".into(),
            census_api_key: Some("CENSUSSECRETKEY0123456789".into()),
            bea_base_url: "http://127.0.0.1:9".into(),
            bea_api_key: Some("BEASECRETUSERID0123456789".into()),
            ..StatisticsConfig::default()
        };
        let lookup = StatisticsLookup::new(Client::new(), config);

        for step in plan_lookup("income and gdp in chatham", None) {
            let err = lookup.run_step(&step).await.unwrap_err().to_string();
            assert!(err.contains("127.0.0.1:9"), "{}", err);
            assert!(!err.contains("CENSUSSECRETKEY0123456789"), "{}", err);
            assert!(!err.contains("BEASECRETUSERID0123456789"), "{}", err);
        }
    }

    #[tokio::test]
    async fn test_malformed_body_error_does_not_leak_key() {
        let app = Router::new().route("/data/{year}/acs/acs5", get(|| async { "not json" }));
        let addr = serve(app).await;
        let config = StatisticsConfig {
            census_api_key: Some("CENSUSSECRETKEY0123456789".into()),
            ..local_config(addr)
        };
        let lookup = StatisticsLookup::new(Client::new(), config);

        let steps = plan_lookup("population of chatham", None);
        let err = lookup.run_step(&steps[0]).await.unwrap_err().to_string();
        assert!(err.contains("malformed JSON"), "{}", err);
        assert!(!err.contains("CENSUSSECRETKEY0123456789"), "{}", err);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_none() {
        let config = StatisticsConfig {
            census_base_url: "http://127.0.0.1:9".into(),
            ..StatisticsConfig::default()
        };
        let lookup = StatisticsLookup::new(Client::new(), config);
        assert!(lookup
            .lookup("population of chatham county", None)
            .await
            .is_none());
    }
}
