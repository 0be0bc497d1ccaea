// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Fetch pipelines for each command kind.
///
/// Every pipeline issues its requests one after another through a
/// [`Transport`], normalizes each response and merges the partial records.
/// Requests are planned up front and produced lazily, so nothing after a
/// failed request is ever sent.
use tracing::debug;

use crate::{
    failure::Failure,
    merge::merge,
    normalizer::{ResourceKind, normalize},
    record::Record,
    target::RepositoryTarget,
    transport::Transport,
};

/// Optional add-ons of a repository fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub struct RepositoryOptions
{
    /// Adds latest release, open pull request count and branch names, and
    /// implies [`with_languages`](Self::with_languages).
    pub full:           bool,
    /// Adds the language percentage breakdown.
    pub with_languages: bool,
}

impl RepositoryOptions
{
    fn languages(self,) -> bool
    {
        self.full || self.with_languages
    }
}

/// One planned request.
struct Step
{
    kind:  ResourceKind,
    route: String,
    query: Vec<(&'static str, String,),>,
}

impl Step
{
    fn new(kind: ResourceKind, route: String,) -> Self
    {
        Self {
            kind, route, query: Vec::new(),
        }
    }

    fn with_query(mut self, key: &'static str, value: String,) -> Self
    {
        self.query.push((key, value,),);
        self
    }

    fn run<T: Transport + ?Sized,>(&self, transport: &T,) -> Result<Record, Failure,>
    {
        let query: Vec<(&str, &str,),> = self.query.iter().map(|(key, value,)| (*key, value.as_str(),),).collect();
        fetch_resource(transport, self.kind, &self.route, &query,)
    }
}

/// Fetches and normalizes a single resource.
///
/// # Errors
///
/// Returns a [`Failure`] when the transport fails or the API reports an
/// error.
pub fn fetch_resource<T: Transport + ?Sized,>(
    transport: &T, kind: ResourceKind, route: &str, query: &[(&str, &str,)],
) -> Result<Record, Failure,>
{
    debug!("fetching {:?} from {}", kind, route);
    let raw = transport.get(route, query,)?;
    normalize(kind, &raw,)
}

/// Fetches a repository and the add-ons selected by `options`.
///
/// Add-ons merge in a fixed order: latest release, open pull requests,
/// branches, languages.
///
/// # Errors
///
/// Returns the first [`Failure`]; when the base request fails no add-on is
/// requested.
pub fn fetch_repository<T: Transport + ?Sized,>(
    transport: &T, target: &RepositoryTarget, options: RepositoryOptions,
) -> Result<Record, Failure,>
{
    let mut plan = vec![Step::new(ResourceKind::Repository, target.route("",),)];

    if options.full {
        plan.push(Step::new(ResourceKind::Release, target.route("/releases/latest",),),);
        plan.push(
            Step::new(ResourceKind::PullRequests, "/search/issues".to_owned(),)
                .with_query("q", format!("repo:{target} type:pr state:open"),),
        );
        plan.push(Step::new(ResourceKind::Branches, target.route("/branches",),),);
    }
    if options.languages() {
        plan.push(Step::new(ResourceKind::Languages, target.route("/languages",),),);
    }

    merge(plan.iter().map(|step| step.run(transport,),),)
}

/// Fetches a user profile.
///
/// # Errors
///
/// Returns a [`Failure`] when the request fails.
pub fn fetch_user<T: Transport + ?Sized,>(transport: &T, login: &str,) -> Result<Record, Failure,>
{
    fetch_resource(transport, ResourceKind::User, &format!("/users/{login}"), &[],)
}

/// Fetches the core API quota of the current identity.
///
/// # Errors
///
/// Returns a [`Failure`] when the request fails.
pub fn fetch_rate_limit<T: Transport + ?Sized,>(transport: &T,) -> Result<Record, Failure,>
{
    fetch_resource(transport, ResourceKind::RateLimit, "/rate_limit", &[],)
}

#[cfg(test)]
mod tests
{
    use serde_json::json;

    use super::*;
    use crate::{
        failure::ErrorKind,
        record::{Scalar, Value},
        transport::{TransportError, fake::FakeTransport},
    };

    fn target() -> RepositoryTarget
    {
        RepositoryTarget::parse("octocat/Hello-World",).expect("valid target",)
    }

    fn repository_body() -> serde_json::Value
    {
        json!({
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "stargazers_count": 80,
            "owner": { "login": "octocat", "type": "User" }
        })
    }

    fn full_transport() -> FakeTransport
    {
        FakeTransport::new()
            .respond("/repos/octocat/Hello-World", repository_body(),)
            .respond(
                "/repos/octocat/Hello-World/releases/latest",
                json!({ "tag_name": "v1.0", "name": "First", "body": "Notes\nmore", "html_url": "u" }),
            )
            .respond("/search/issues", json!({ "total_count": 4 }),)
            .respond("/repos/octocat/Hello-World/branches", json!([{ "name": "main" }, { "name": "dev" }]),)
            .respond("/repos/octocat/Hello-World/languages", json!({ "C": 100, "Rust": 300 }),)
    }

    #[test]
    fn base_fetch_only_issues_one_request()
    {
        let transport = full_transport();
        let record = fetch_repository(&transport, &target(), RepositoryOptions::default(),).expect("record",);

        assert_eq!(transport.routes(), vec!["/repos/octocat/Hello-World"]);
        assert_eq!(record.get("stars"), Some(&Value::from(80_i64)));
        assert!(!record.contains_key("languages"));
    }

    #[test]
    fn full_fetch_runs_add_ons_in_order()
    {
        let transport = full_transport();
        let options = RepositoryOptions {
            full: true, with_languages: false,
        };
        let record = fetch_repository(&transport, &target(), options,).expect("record",);

        assert_eq!(
            transport.routes(),
            vec![
                "/repos/octocat/Hello-World",
                "/repos/octocat/Hello-World/releases/latest",
                "/search/issues?q=repo:octocat/Hello-World type:pr state:open",
                "/repos/octocat/Hello-World/branches",
                "/repos/octocat/Hello-World/languages",
            ]
        );
        assert_eq!(record.get("open_pull_requests"), Some(&Value::from(4_i64)));
        assert_eq!(record.get("branches"), Some(&Value::List(vec![Scalar::from("main"), Scalar::from("dev")])));
        let Some(Value::Mapping(languages,),) = record.get("languages",) else {
            panic!("languages should be a mapping");
        };
        assert_eq!(languages.keys().collect::<Vec<_,>>(), vec!["Rust", "C"]);
    }

    #[test]
    fn languages_only_adds_one_request()
    {
        let transport = full_transport();
        let options = RepositoryOptions {
            full: false, with_languages: true,
        };
        fetch_repository(&transport, &target(), options,).expect("record",);

        assert_eq!(
            transport.routes(),
            vec!["/repos/octocat/Hello-World", "/repos/octocat/Hello-World/languages"]
        );
    }

    #[test]
    fn failed_base_fetch_skips_add_ons()
    {
        let transport = FakeTransport::new();
        let options = RepositoryOptions {
            full: true, with_languages: true,
        };
        let failure = fetch_repository(&transport, &target(), options,).expect_err("missing repo",);

        assert_eq!(failure.kind, ErrorKind::NotFound);
        assert_eq!(transport.routes(), vec!["/repos/octocat/Hello-World"]);
    }

    #[test]
    fn missing_release_is_not_a_failure()
    {
        let transport = FakeTransport::new()
            .respond("/repos/octocat/Hello-World", repository_body(),)
            .respond("/search/issues", json!({ "total_count": 0 }),)
            .respond("/repos/octocat/Hello-World/branches", json!([]),)
            .respond("/repos/octocat/Hello-World/languages", json!({}),);
        let options = RepositoryOptions {
            full: true, with_languages: false,
        };
        let record = fetch_repository(&transport, &target(), options,).expect("record",);

        assert_eq!(record.get("latest_release"), Some(&Value::Scalar(Scalar::Null)));
        assert_eq!(transport.routes().len(), 5);
    }

    #[test]
    fn transport_failure_is_classified()
    {
        let transport = FakeTransport::new().fail(
            "/users/octocat",
            TransportError::Timeout {
                seconds: 10,
            },
        );
        let failure = fetch_user(&transport, "octocat",).expect_err("timeout",);

        assert_eq!(failure.kind, ErrorKind::TransportFailure);
        assert_eq!(failure.message, "request timed out after 10s");
    }

    #[test]
    fn rate_limit_reads_core_quota()
    {
        let transport = FakeTransport::new().respond(
            "/rate_limit",
            json!({ "resources": { "core": { "limit": 5000, "used": 1, "remaining": 4999 } } }),
        );
        let record = fetch_rate_limit(&transport,).expect("record",);

        assert_eq!(record.keys().collect::<Vec<_,>>(), vec!["limit", "used", "remaining"]);
        assert_eq!(record.get("remaining"), Some(&Value::from(4999_i64)));
    }
}
