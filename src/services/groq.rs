use serde::Serialize;

use crate::config::Config;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// One blocking round trip to the Groq chat-completions API. No retries; a
/// non-success status or missing content surfaces as an error to the caller.
pub async fn chat_completion(
    config: &Config,
    model: &str,
    temperature: f64,
    messages: &[ChatMessage<'_>],
) -> Result<String, anyhow::Error> {
    // 30-second timeout to prevent indefinite hangs
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let response = client
        .post(GROQ_API_URL)
        .bearer_auth(&config.groq_api_key)
        .json(&serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": 4096,
            "top_p": 1,
            "stream": false,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Groq API error {}: {}", status, body);
    }

    let completion: serde_json::Value = response.json().await?;
    let content = completion["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Groq API returned no message content"))?;

    Ok(content.to_string())
}
