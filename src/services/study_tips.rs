use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;
use crate::core::metrics;

const COACH_SYSTEM_PROMPT: &str = "You are a concise learning coach.";
const MAX_TIPS: usize = 3;

#[derive(Debug, Clone, Default)]
pub(crate) struct TipsRequest {
    pub(crate) weak_subjects: Vec<String>,
    pub(crate) weakest_topics: Vec<String>,
}

impl TipsRequest {
    fn prompt(&self) -> String {
        format!(
            "A student is weak in subjects: {} and topics: {}.\n\
             Give 3 short, actionable study tips tailored to these areas. \
             Keep each tip under 25 words. Put each tip on its own line.",
            join_or_none(&self.weak_subjects),
            join_or_none(&self.weakest_topics),
        )
    }
}

fn join_or_none(items: &[String]) -> String {
    let cleaned: Vec<&str> =
        items.iter().map(|item| item.trim()).filter(|item| !item.is_empty()).collect();
    if cleaned.is_empty() {
        "none".to_string()
    } else {
        cleaned.join(", ")
    }
}

/// Something that can turn weak areas into a handful of study tips.
#[async_trait]
pub(crate) trait StudyTipsProvider: Send + Sync {
    /// Label reported to clients as `model`.
    fn name(&self) -> &'static str;

    async fn tips(&self, request: &TipsRequest) -> Result<Vec<String>>;
}

/// Deterministic tips; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HeuristicTips;

impl HeuristicTips {
    fn generate(&self, request: &TipsRequest) -> Vec<String> {
        let focus = request
            .weakest_topics
            .iter()
            .chain(request.weak_subjects.iter())
            .map(|item| item.trim())
            .find(|item| !item.is_empty());

        let first = match focus {
            Some(area) => format!("Revisit core definitions in {area}, then practice 5 problems."),
            None => "Revisit core definitions, then practice 5 problems per topic.".to_string(),
        };
        let last = match focus {
            Some(area) => format!("Schedule 20-minute spaced reviews of {area} every day."),
            None => "Schedule 20-minute spaced reviews for the weakest topic daily.".to_string(),
        };

        vec![first, "Summarize mistakes after each quiz; write one-line fixes.".to_string(), last]
    }
}

#[async_trait]
impl StudyTipsProvider for HeuristicTips {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn tips(&self, request: &TipsRequest) -> Result<Vec<String>> {
        Ok(self.generate(request))
    }
}

/// OpenAI-compatible chat completions backend. One attempt per request, no retries.
#[derive(Debug, Clone)]
pub(crate) struct OpenAiTips {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiTips {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let ai = settings.ai();
        Self::new(
            &ai.openai_base_url,
            &ai.openai_api_key,
            &ai.ai_model,
            ai.ai_max_tokens,
            ai.ai_temperature,
            Duration::from_secs(ai.ai_request_timeout),
        )
    }

    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        max_tokens: u32,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5).min(timeout))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
            temperature,
        })
    }
}

#[async_trait]
impl StudyTipsProvider for OpenAiTips {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn tips(&self, request: &TipsRequest) -> Result<Vec<String>> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": COACH_SYSTEM_PROMPT},
                {"role": "user", "content": request.prompt()}
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let timer = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call chat completions API")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            anyhow::bail!("Chat completions API returned {status}: {body}");
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .context("Missing chat completion content")?;

        let tips = split_tips(content);
        tracing::info!(
            model = %self.model,
            tips = tips.len(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Study tips generated"
        );

        if tips.is_empty() {
            anyhow::bail!("Chat completion contained no tips");
        }
        Ok(tips)
    }
}

/// Splits a free-form completion into at most three tips. Breaks on newlines and on
/// inline list markers (`1.`, `2)`, `- `, `* `, `• `), so one-line numbered replies split too.
pub(crate) fn split_tips(content: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut cursor = 0;

    while let Some(current) = content[cursor..].chars().next() {
        if current == '\n' {
            segments.push(&content[start..cursor]);
            cursor += 1;
            start = cursor;
        } else if let Some(len) = list_marker_len(content, cursor) {
            segments.push(&content[start..cursor]);
            cursor += len;
            start = cursor;
        } else {
            cursor += current.len_utf8();
        }
    }
    segments.push(&content[start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .take(MAX_TIPS)
        .map(str::to_string)
        .collect()
}

/// Byte length of a list marker starting at `at`, if one does.
fn list_marker_len(content: &str, at: usize) -> Option<usize> {
    let at_boundary = content[..at].chars().next_back().map_or(true, char::is_whitespace);
    if !at_boundary {
        return None;
    }

    let tail = &content[at..];
    let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
    let rest = if digits > 0 {
        tail[digits..].strip_prefix(['.', ')'])?
    } else {
        tail.strip_prefix(['-', '*', '•'])?
    };

    rest.chars().next().map_or(true, char::is_whitespace).then(|| tail.len() - rest.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TipsOutcome {
    pub(crate) tips: Vec<String>,
    pub(crate) model: &'static str,
}

/// Chooses the configured provider and falls back to [`HeuristicTips`] on any failure.
#[derive(Clone)]
pub(crate) struct StudyTipsService {
    primary: Option<Arc<dyn StudyTipsProvider>>,
    fallback: HeuristicTips,
}

impl StudyTipsService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        if !settings.ai().remote_tips_enabled() {
            return Ok(Self::heuristic_only());
        }

        let remote = OpenAiTips::from_settings(settings)?;
        Ok(Self::with_primary(Arc::new(remote)))
    }

    pub(crate) fn heuristic_only() -> Self {
        Self { primary: None, fallback: HeuristicTips }
    }

    pub(crate) fn with_primary(primary: Arc<dyn StudyTipsProvider>) -> Self {
        Self { primary: Some(primary), fallback: HeuristicTips }
    }

    pub(crate) fn primary_name(&self) -> &'static str {
        self.primary.as_ref().map(|provider| provider.name()).unwrap_or(self.fallback.name())
    }

    pub(crate) async fn tips(&self, request: &TipsRequest) -> TipsOutcome {
        if let Some(primary) = &self.primary {
            match primary.tips(request).await {
                Ok(tips) => {
                    metrics::record_tips_request(primary.name(), false);
                    return TipsOutcome { tips, model: primary.name() };
                }
                Err(err) => {
                    tracing::warn!(
                        provider = primary.name(),
                        error = %format!("{err:#}"),
                        "Study tips provider failed, using heuristic tips"
                    );
                    metrics::record_tips_request(self.fallback.name(), true);
                    return self.heuristic(request);
                }
            }
        }

        metrics::record_tips_request(self.fallback.name(), false);
        self.heuristic(request)
    }

    fn heuristic(&self, request: &TipsRequest) -> TipsOutcome {
        TipsOutcome { tips: self.fallback.generate(request), model: self.fallback.name() }
    }
}
