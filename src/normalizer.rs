//! Transformation logic that converts raw GitHub API responses into
//! normalized records.
//!
//! Each [`ResourceKind`] copies a fixed set of fields from the response into a
//! [`Record`], substituting null, an empty string or an empty list for absent
//! fields so a sparse response never fails normalization. A top-level
//! `message` field marks an API error and yields a classified [`Failure`]
//! instead of a record.

use serde_json::Value as Json;

use crate::{
    failure::{ErrorKind, Failure},
    record::{Mapping, Record, Scalar, Value},
};

/// Visibility assumed when the API omits the field.
const DEFAULT_VISIBILITY: &str = "public";

/// Resource kinds understood by [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum ResourceKind
{
    /// `/repos/{owner}/{name}`
    Repository,
    /// `/repos/{owner}/{name}/languages`
    Languages,
    /// `/repos/{owner}/{name}/releases/latest`
    Release,
    /// `/search/issues` restricted to open pull requests.
    PullRequests,
    /// `/repos/{owner}/{name}/branches`
    Branches,
    /// `/rate_limit`
    RateLimit,
    /// `/users/{login}`
    User,
}

/// Normalizes a raw response of the given kind.
///
/// # Errors
///
/// Returns a [`Failure`] classified from the response's `message` field when
/// the API reported an error. A missing latest release is not an error: it
/// normalizes to `latest_release: null`. An unclassified search error on the
/// pull request count normalizes to a count of 0.
///
/// # Examples
///
/// ```
/// use gitfo::{ErrorKind, ResourceKind, normalize};
/// use serde_json::json;
///
/// let failure = normalize(ResourceKind::User, &json!({ "message": "Bad credentials" }),)
///     .expect_err("error body",);
/// assert_eq!(failure.kind, ErrorKind::BadCredentials);
/// ```
pub fn normalize(kind: ResourceKind, raw: &Json,) -> Result<Record, Failure,>
{
    if let Some(message,) = upstream_message(raw,) {
        let failure = Failure::from_message(message,);
        return match (kind, failure.kind,) {
            (ResourceKind::Release, ErrorKind::NotFound,) => Ok(Record::new().with("latest_release", Scalar::Null,),),
            // search rejects queries on repositories it cannot see
            (ResourceKind::PullRequests, ErrorKind::Unknown,) => {
                Ok(Record::new().with("open_pull_requests", 0_i64,),)
            }
            _ => Err(failure,),
        };
    }

    let record = match kind {
        ResourceKind::Repository => repository(raw,),
        ResourceKind::Languages => Record::new().with("languages", language_breakdown(raw,),),
        ResourceKind::Release => release(raw,),
        ResourceKind::PullRequests => {
            let count = raw.get("total_count",).and_then(Json::as_i64,).unwrap_or(0,);
            Record::new().with("open_pull_requests", count,)
        }
        ResourceKind::Branches => Record::new().with("branches", branch_names(raw,),),
        ResourceKind::RateLimit => rate_limit(raw,),
        ResourceKind::User => user(raw,),
    };

    Ok(record,)
}

/// Converts a language byte distribution into percentages.
///
/// Each share is `round(bytes / total * 100, 2)`. Entries are ordered by
/// descending byte count; ties keep the order of the response. A zero total
/// yields an empty mapping. Non-numeric entries are ignored.
///
/// # Examples
///
/// ```
/// use gitfo::language_breakdown;
/// use serde_json::json;
///
/// let shares = language_breakdown(&json!({ "CSS": 419, "HTML": 581 }),);
/// let order: Vec<&str,> = shares.keys().collect();
/// assert_eq!(order, ["HTML", "CSS"]);
/// ```
pub fn language_breakdown(raw: &Json,) -> Mapping
{
    let mut entries: Vec<(&str, f64,),> = raw
        .as_object()
        .map(|languages| {
            languages
                .iter()
                .filter_map(|(name, bytes,)| bytes.as_f64().map(|bytes| (name.as_str(), bytes,),),)
                .collect()
        },)
        .unwrap_or_default();

    let total: f64 = entries.iter().map(|(_, bytes,)| bytes,).sum();
    if total <= 0.0 {
        return Mapping::new();
    }

    // stable sort keeps encounter order for equal byte counts
    entries.sort_by(|left, right| right.1.total_cmp(&left.1,),);

    entries
        .into_iter()
        .map(|(name, bytes,)| (name, Scalar::Float(round_percent(bytes / total * 100.0,),),),)
        .collect()
}

fn round_percent(value: f64,) -> f64
{
    (value * 100.0).round() / 100.0
}

/// Returns the text of a top-level `message` field, if present and non-null.
fn upstream_message(raw: &Json,) -> Option<String,>
{
    match raw.get("message",)? {
        Json::Null => None,
        Json::String(text,) => Some(text.clone(),),
        other => Some(other.to_string(),),
    }
}

fn repository(raw: &Json,) -> Record
{
    let license = raw
        .get("license",)
        .and_then(|license| license.get("name",),)
        .map(scalar,)
        .unwrap_or(Scalar::Null,);

    let visibility = match field(raw, "visibility",) {
        Scalar::Null => Scalar::from(DEFAULT_VISIBILITY,),
        other => other,
    };

    let owner = raw.get("owner",).unwrap_or(&Json::Null,);

    Record::new()
        .with("name", field(raw, "name",),)
        .with("full_name", field(raw, "full_name",),)
        .with("description", field(raw, "description",),)
        .with("html_url", field(raw, "html_url",),)
        .with("visibility", visibility,)
        .with("license", license,)
        .with("stars", field(raw, "stargazers_count",),)
        .with("forks", field(raw, "forks_count",),)
        .with("watchers", field(raw, "subscribers_count",),)
        .with("open_issues", field(raw, "open_issues_count",),)
        .with("default_branch", field(raw, "default_branch",),)
        .with("created_at", field(raw, "created_at",),)
        .with("updated_at", field(raw, "updated_at",),)
        .with("topics", list(raw, "topics",),)
        .with("owner", mapping(owner, &[("login", "login",), ("type", "type",),],),)
}

fn release(raw: &Json,) -> Record
{
    let body = match raw.get("body",).and_then(Json::as_str,) {
        Some(text,) => text.lines().next().unwrap_or_default().to_owned(),
        None => String::new(),
    };

    let mut details = mapping(
        raw,
        &[("tag", "tag_name",), ("name", "name",), ("published_at", "published_at",),],
    );
    details.insert("body", Scalar::Str(body,),);
    details.insert("url", field(raw, "html_url",),);

    Record::new().with("latest_release", details,)
}

fn branch_names(raw: &Json,) -> Vec<Scalar,>
{
    raw.as_array()
        .map(|branches| {
            branches
                .iter()
                .filter_map(|branch| branch.get("name",).and_then(Json::as_str,),)
                .map(Scalar::from,)
                .collect()
        },)
        .unwrap_or_default()
}

fn rate_limit(raw: &Json,) -> Record
{
    let core = raw
        .get("resources",)
        .and_then(|resources| resources.get("core",),)
        .unwrap_or(&Json::Null,);

    Record::new()
        .with("limit", field(core, "limit",),)
        .with("used", field(core, "used",),)
        .with("remaining", field(core, "remaining",),)
}

fn user(raw: &Json,) -> Record
{
    const FIELDS: &[&str] = &[
        "login",
        "id",
        "type",
        "name",
        "company",
        "blog",
        "location",
        "email",
        "bio",
        "twitter_username",
        "html_url",
        "public_repos",
        "public_gists",
        "followers",
        "following",
        "created_at",
        "updated_at",
    ];

    FIELDS.iter().map(|key| (*key, Value::Scalar(field(raw, key,),),),).collect()
}

/// Scalar at `key`, or null when absent.
fn field(raw: &Json, key: &str,) -> Scalar
{
    raw.get(key,).map(scalar,).unwrap_or(Scalar::Null,)
}

/// List of scalars at `key`, or an empty list when absent.
fn list(raw: &Json, key: &str,) -> Vec<Scalar,>
{
    raw.get(key,)
        .and_then(Json::as_array,)
        .map(|items| items.iter().map(scalar,).collect(),)
        .unwrap_or_default()
}

/// Mapping of `(record key, response key)` pairs read from `raw`.
fn mapping(raw: &Json, keys: &[(&str, &str,)],) -> Mapping
{
    keys.iter().map(|(name, source,)| (*name, field(raw, source,),),).collect()
}

/// Converts a JSON leaf into a scalar. Nested structures collapse to their
/// compact JSON text so records never exceed one level of nesting.
fn scalar(value: &Json,) -> Scalar
{
    match value {
        Json::Null => Scalar::Null,
        Json::Bool(flag,) => Scalar::Bool(*flag,),
        Json::Number(number,) => match number.as_i64() {
            Some(integer,) => Scalar::Int(integer,),
            None => number.as_f64().map(Scalar::Float,).unwrap_or(Scalar::Null,),
        },
        Json::String(text,) => Scalar::Str(text.clone(),),
        nested => Scalar::Str(nested.to_string(),),
    }
}
