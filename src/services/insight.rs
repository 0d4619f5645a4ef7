use crate::domain::models::{DateRange, FeedbackRecord};
use crate::services::export::period_labels;
use anyhow::{anyhow, Result};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
    CreateChatCompletionRequestArgs, Role,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use tokio::time::{sleep, Duration};

/// Shown in place of the insight whenever generation fails. Collaborator
/// failures degrade to this text, never to a fatal error.
pub const INSIGHT_FALLBACK: &str =
    "Não foi possível gerar a análise no momento. Tente novamente mais tarde.";

/// Free-text analysis over a filtered feedback set and its date range.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, view: &[FeedbackRecord], range: &DateRange) -> Result<String>;
}

fn build_prompt(view: &[FeedbackRecord], range: &DateRange) -> String {
    let (start, end) = period_labels(range);
    let summary: Vec<serde_json::Value> = view
        .iter()
        .map(|f| {
            serde_json::json!({
                "overall": f.overall.value(),
                "categories": f.categories,
                "comment": f.comments,
                "apartment": f.apartment_number,
                "guest": f.guest_name,
            })
        })
        .collect();
    format!(
        "Analise estes dados de feedback dos hóspedes do resort (Período: {start} até {end}): {}",
        serde_json::Value::Array(summary)
    )
}

pub struct OpenAiInsight {
    client: Client<OpenAIConfig>,
}

impl OpenAiInsight {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
        }
    }
}

#[async_trait]
impl InsightGenerator for OpenAiInsight {
    async fn generate(&self, view: &[FeedbackRecord], range: &DateRange) -> Result<String> {
        let system_prompt = "Você é um analista de experiência do hóspede. \
            Resuma pontos fortes, pontos fracos e ações recomendadas a partir \
            dos dados de avaliação fornecidos. Seja conciso e acionável.";
        let prompt = build_prompt(view, range);

        let mut retries = 0;
        loop {
            let messages = vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    role: Role::System,
                    content: system_prompt.to_string(),
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    role: Role::User,
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.clone()),
                    name: None,
                }),
            ];

            let request = CreateChatCompletionRequestArgs::default()
                .model("gpt-4o-mini")
                .messages(messages)
                .build()?;

            match self.client.chat().create(request).await {
                Ok(resp) => {
                    let content = resp
                        .choices
                        .first()
                        .and_then(|c| c.message.content.clone())
                        .unwrap_or_default();
                    if content.is_empty() {
                        return Err(anyhow!("insight model returned no text"));
                    }
                    return Ok(content);
                }
                Err(err) => {
                    retries += 1;
                    if retries > 3 {
                        return Err(anyhow!("insight generation failed: {err}"));
                    }
                    sleep(Duration::from_millis(500 * retries)).await;
                }
            }
        }
    }
}
