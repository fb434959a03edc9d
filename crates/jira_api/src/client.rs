use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::jql::IssueQuery;
use crate::models::{
    CreatedIssue, Issue, IssueCreateRequest, Project, SearchResults, Transition, TransitionId,
    TransitionList, TransitionRequest, User, Worklog, WorklogCreateRequest, WorklogPage,
};
use crate::pacing::RequestPacer;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Fields requested from `/search`; enough to identify an issue and read its state.
pub const ISSUE_SUMMARY_FIELDS: &str = "key,summary,status";
pub const MAX_SEARCH_RESULTS: u32 = 100;

#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    pacer: RequestPacer,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let pacer = RequestPacer::new(config.cooldown);
        Ok(Self {
            http,
            config,
            pacer,
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.pacer.wait_turn().await;
        let url = self.url_for(path);
        debug!(method = "GET", %url, "jira request");
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(Method::POST, path, Some(body)).await
    }

    pub async fn send_with_body<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.dispatch(method, path, body).await?;
        Self::parse_json(response).await
    }

    pub async fn send_expect_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self.dispatch(method, path, body).await?;
        Self::ensure_success(response).await.map(|_| ())
    }

    async fn dispatch<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.pacer.wait_turn().await;
        let url = self.url_for(path);
        debug!(method = %method, %url, "jira request");
        let mut request = self.http.request(method, url);
        if let Some(payload) = body {
            request = request.json(payload);
        }
        Ok(request.send().await?)
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(JiraError::from)
    }

    /// Passes 2xx responses through; everything else becomes a typed error carrying the body.
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(JiraError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            Err(JiraError::http(status, body))
        }
    }

    pub async fn get_myself(&self) -> Result<User> {
        self.get("myself").await
    }

    pub async fn get_project(&self, project_key: &str) -> Result<Project> {
        let path = format!("project/{}", project_key);
        self.get(&path).await
    }

    pub async fn search_issues(&self, query: &IssueQuery, max_results: u32) -> Result<Vec<Issue>> {
        let max_results = max_results.clamp(1, MAX_SEARCH_RESULTS);
        let params = [
            ("jql", query.to_jql()),
            ("maxResults", max_results.to_string()),
            ("fields", ISSUE_SUMMARY_FIELDS.to_string()),
        ];
        let results: SearchResults = self.get_with_query("search", &params).await?;
        Ok(results.issues)
    }

    /// Key of the first issue matching `query`, if any.
    pub async fn find_issue(&self, query: &IssueQuery) -> Result<Option<String>> {
        let issues = self.search_issues(query, 1).await?;
        Ok(issues.into_iter().next().map(|issue| issue.key))
    }

    pub async fn create_issue(&self, request: &IssueCreateRequest) -> Result<String> {
        let created: CreatedIssue = self.post("issue", request).await?;
        Ok(created.key)
    }

    pub async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let path = format!("issue/{}/transitions", issue_key);
        let list: TransitionList = self.get(&path).await?;
        Ok(list.transitions)
    }

    /// Executes a workflow transition. A transition id the issue no longer offers is reported as
    /// [`JiraError::StaleTransition`]; any other rejection, such as a failed workflow validator,
    /// stays an [`JiraError::Http`] error.
    pub async fn execute_transition(&self, issue_key: &str, transition_id: &str) -> Result<()> {
        let path = format!("issue/{}/transitions", issue_key);
        let payload = TransitionRequest {
            transition: TransitionId { id: transition_id },
        };
        match self.send_expect_empty(Method::POST, &path, Some(&payload)).await {
            Err(JiraError::Http { status, message })
                if (status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT)
                    && is_invalid_transition(&message) =>
            {
                Err(JiraError::StaleTransition {
                    issue_key: issue_key.to_string(),
                    transition_id: transition_id.to_string(),
                    message,
                })
            }
            other => other,
        }
    }

    pub async fn get_worklogs(&self, issue_key: &str) -> Result<Vec<Worklog>> {
        let path = format!("issue/{}/worklog", issue_key);
        let page: WorklogPage = self.get(&path).await?;
        Ok(page.worklogs)
    }

    pub async fn add_worklog(&self, issue_key: &str, entry: &WorklogCreateRequest) -> Result<()> {
        let path = format!("issue/{}/worklog", issue_key);
        self.send_expect_empty(Method::POST, &path, Some(entry)).await
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let mut auth_value = header_value(config.basic_authorization())?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}

/// Whether a rejected transition body carries Jira's "not valid for this issue" message.
fn is_invalid_transition(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return false;
    };
    value
        .get("errorMessages")
        .and_then(Value::as_array)
        .map(|messages| {
            messages
                .iter()
                .filter_map(Value::as_str)
                .any(|message| message.to_ascii_lowercase().contains("is not valid for this issue"))
        })
        .unwrap_or(false)
}

/// First message from a Jira error body (`errorMessages` or `errors`), for log lines.
pub fn error_summary(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    let from_messages = value
        .get("errorMessages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.iter().find_map(Value::as_str))
        .map(str::to_string);
    from_messages.or_else(|| {
        value
            .get("errors")
            .and_then(Value::as_object)
            .and_then(|errors| errors.iter().next())
            .map(|(field, message)| match message.as_str() {
                Some(text) => format!("{}: {}", field, text),
                None => format!("{}: {}", field, message),
            })
    })
}
