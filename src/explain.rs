//! Ask a text-generation service to explain the drawn fortune.
//!
//! The request never fails from the point of view of the rest of the app:
//! whatever goes wrong, [`explain_or_fallback`] answers [`FALLBACK`]. The
//! request runs on the IO task pool and the result screen shows
//! [`Explanation`] until it is [`Explanation::Ready`].
use std::sync::Arc;

use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{
    category::Category, config::ExplainerConfig, fortune::Rank, state::AppState, state::Session,
};

/// Shown in place of the explanation when it couldn't be obtained.
pub const FALLBACK: &str = "解签服务暂时不可用，请稍后再试。";

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("couldn't decode the answer: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("the answer contains no text")]
    NoText,
}

/// Everything the explanation is about.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationRequest {
    pub category: Category,
    pub user_name: String,
    pub birthday: String,
    pub rank: Rank,
    pub poem: String,
    pub meaning: String,
}
impl ExplanationRequest {
    /// `None` until a category was picked and a fortune drawn.
    pub fn from_session(session: &Session) -> Option<Self> {
        let fortune = session.fortune?;
        Some(Self {
            category: session.category?,
            user_name: session.user_name.clone(),
            birthday: session.birthday.map_or_else(String::new, |b| b.to_string()),
            rank: fortune.rank,
            poem: fortune.poem.to_owned(),
            meaning: fortune.meaning.to_owned(),
        })
    }

    pub fn prompt(&self) -> String {
        let Self { category, user_name, birthday, rank, poem, meaning } = self;
        format!(
            "你是一位精通易经与传统解签的大师。\n\
             求签人：{user_name}，生于{birthday}，所求之事：{category}。\n\
             所得签等：{rank}\n\
             签诗：\n{poem}\n\
             签意：{meaning}\n\n\
             请结合所求之事与求签人的生辰，用通俗、温和、鼓励的语言解签，内容包括：\n\
             1. 签诗的含义；\n\
             2. 针对{category}的备考与心态建议；\n\
             3. 一句祝福。\n\
             直接给出解签内容，不要寒暄，分段清晰。"
        )
    }
}

/// A service able to explain a fortune.
pub trait Explain: Send + Sync {
    fn explain(&self, request: &ExplanationRequest) -> Result<String, ExplainError>;
}

/// The explanation, or [`FALLBACK`] with the error logged.
pub fn explain_or_fallback(backend: &dyn Explain, request: &ExplanationRequest) -> String {
    match backend.explain(request) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!("explanation failed: {}", ExplainError::NoText);
            FALLBACK.to_owned()
        }
        Err(err) => {
            warn!("explanation failed: {err}");
            FALLBACK.to_owned()
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}
#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}
#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Text of the first candidate of a `generateContent` answer.
fn answer_text(body: &str) -> Result<String, ExplainError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map_or_else(Vec::new, |c| c.parts);
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(ExplainError::NoText);
    }
    Ok(text)
}

/// Explanations from the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    config: ExplainerConfig,
    http: reqwest::blocking::Client,
}
impl GeminiClient {
    pub fn new(config: ExplainerConfig) -> Result<Self, ExplainError> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self { config, http })
    }
    fn url(&self) -> String {
        let endpoint = self.config.endpoint.trim_end_matches('/');
        format!("{endpoint}/models/{}:generateContent", self.config.model)
    }
}
impl Explain for GeminiClient {
    fn explain(&self, request: &ExplanationRequest) -> Result<String, ExplainError> {
        let key = self.config.api_key.as_deref().ok_or(ExplainError::MissingApiKey)?;
        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt() }] }],
            "generationConfig": { "temperature": self.config.temperature },
        });
        let response = self.http.post(self.url()).query(&[("key", key)]).json(&body).send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(ExplainError::Status { status: status.as_u16(), body: text });
        }
        answer_text(&text)
    }
}

/// Stands in when the HTTP client couldn't be created.
struct Unavailable;
impl Explain for Unavailable {
    fn explain(&self, _: &ExplanationRequest) -> Result<String, ExplainError> {
        Err(ExplainError::MissingApiKey)
    }
}

/// The backend used for explanations.
#[derive(Clone)]
pub struct Explainer(pub Arc<dyn Explain>);
impl FromWorld for Explainer {
    fn from_world(_: &mut World) -> Self {
        match GeminiClient::new(ExplainerConfig::load()) {
            Ok(client) => Explainer(Arc::new(client)),
            Err(err) => {
                error!("couldn't create the HTTP client: {err}");
                Explainer(Arc::new(Unavailable))
            }
        }
    }
}

/// Explanation of the current fortune.
#[derive(Debug, Clone, PartialEq)]
pub enum Explanation {
    Idle,
    Pending,
    Ready(String),
}
impl Default for Explanation {
    fn default() -> Self {
        Explanation::Idle
    }
}

/// Ask for an explanation of the current fortune, ignored if one was
/// already requested.
pub struct RequestExplanation;

#[derive(Component)]
struct ExplanationTask(Task<String>);

fn start_request(
    mut events: EventReader<RequestExplanation>,
    mut explanation: ResMut<Explanation>,
    mut cmds: Commands,
    session: Res<Session>,
    explainer: Res<Explainer>,
    pool: Res<IoTaskPool>,
) {
    if events.iter().next().is_none() || *explanation != Explanation::Idle {
        return;
    }
    let request = match ExplanationRequest::from_session(&session) {
        Some(request) => request,
        None => {
            warn!("explanation requested without a fortune");
            return;
        }
    };
    info!("asking for an explanation of {}", request.rank);
    let backend = explainer.0.clone();
    let task = pool.spawn(async move { explain_or_fallback(&*backend, &request) });
    cmds.spawn().insert_bundle((ExplanationTask(task), Name::new("Explanation task")));
    *explanation = Explanation::Pending;
}

fn poll_request(
    mut cmds: Commands,
    mut tasks: Query<(Entity, &mut ExplanationTask)>,
    mut explanation: ResMut<Explanation>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(text) = future::block_on(future::poll_once(&mut task.0)) {
            *explanation = Explanation::Ready(text);
            cmds.entity(entity).despawn();
        }
    }
}

/// Drop the explanation and any request still running.
fn discard(
    mut cmds: Commands,
    tasks: Query<Entity, With<ExplanationTask>>,
    mut explanation: ResMut<Explanation>,
) {
    for entity in tasks.iter() {
        cmds.entity(entity).despawn();
    }
    *explanation = Explanation::Idle;
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        app.init_resource::<Explainer>()
            .init_resource::<Explanation>()
            .add_event::<RequestExplanation>()
            .add_system_set(self.0.on_update(start_request).with_system(poll_request))
            .add_system_set(self.0.on_exit(discard));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fortune::CATALOG, profile::Birthday};

    struct Fixed(&'static str);
    impl Explain for Fixed {
        fn explain(&self, _: &ExplanationRequest) -> Result<String, ExplainError> {
            Ok(self.0.to_owned())
        }
    }
    struct Failing;
    impl Explain for Failing {
        fn explain(&self, _: &ExplanationRequest) -> Result<String, ExplainError> {
            Err(ExplainError::Status { status: 503, body: "overloaded".to_owned() })
        }
    }

    fn request() -> ExplanationRequest {
        let session = Session {
            category: Some(Category::CivilService),
            user_name: "小明".to_owned(),
            birthday: "2000-02-29".parse::<Birthday>().ok(),
            fortune: CATALOG.first(),
        };
        ExplanationRequest::from_session(&session).unwrap()
    }

    #[test]
    fn failures_fall_back() {
        let request = request();
        assert_eq!(explain_or_fallback(&Failing, &request), FALLBACK);
        assert_eq!(explain_or_fallback(&Unavailable, &request), FALLBACK);
        assert_eq!(explain_or_fallback(&Fixed("  \n"), &request), FALLBACK);
        assert_eq!(explain_or_fallback(&Fixed("大吉"), &request), "大吉");

        let no_key = GeminiClient::new(ExplainerConfig::default()).unwrap();
        assert!(matches!(no_key.explain(&request), Err(ExplainError::MissingApiKey)));
        assert_eq!(explain_or_fallback(&no_key, &request), FALLBACK);
    }

    #[test]
    fn prompt_mentions_the_draw() {
        let request = request();
        let prompt = request.prompt();
        assert!(prompt.contains("小明"));
        assert!(prompt.contains("2000-02-29"));
        assert!(prompt.contains(Category::CivilService.title()));
        assert!(prompt.contains(request.rank.label()));
        assert!(prompt.contains(&request.meaning));
    }

    #[test]
    fn request_needs_a_fortune() {
        let session = Session { category: Some(Category::Postgraduate), ..Default::default() };
        assert_eq!(ExplanationRequest::from_session(&session), None);
    }

    #[test]
    fn answer_decoding() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"一帆"},{"text":"风顺"}],"role":"model"}},
            {"content":{"parts":[{"text":"ignored"}]}}]}"#;
        assert_eq!(answer_text(body).unwrap(), "一帆风顺");

        let no_text = [
            r#"{"candidates":[]}"#,
            r#"{}"#,
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{}}]}}]}"#,
        ];
        for body in no_text {
            assert!(matches!(answer_text(body), Err(ExplainError::NoText)), "{body}");
        }
        assert!(matches!(answer_text("<html>"), Err(ExplainError::Decode(_))));
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let config = ExplainerConfig {
            endpoint: "https://example.invalid/v1beta/".to_owned(),
            model: "m".to_owned(),
            ..Default::default()
        };
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(client.url(), "https://example.invalid/v1beta/models/m:generateContent");
    }
}
