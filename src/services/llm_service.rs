use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::LlmError;

/// Configuration for the language-model service.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub enabled: bool,
    pub provider: String,
    pub api_key: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            api_key: None,
            max_tokens: 400,
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("LLM_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            provider: std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            ..Default::default()
        }
    }
}

/// Provider seam for chat completions. The interpreter supplies the system
/// instruction block; providers only move bytes.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize, Clone)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI chat-completions provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, max_tokens: usize, temperature: f32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            model: "gpt-4o-mini".to_string(),
            max_tokens,
            temperature,
            client,
        }
    }

    async fn call_openai_with_retry(&self, request: OpenAiRequest) -> Result<OpenAiResponse, LlmError> {
        let mut retry_count = 0;
        let max_retries = 3;
        let mut delay = Duration::from_secs(1);

        loop {
            match self.call_openai(&request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= max_retries {
                        error!("OpenAI API call failed after {} retries: {}", max_retries, e);
                        return Err(e);
                    }

                    warn!("OpenAI API call failed (attempt {}/{}): {}. Retrying in {:?}...",
                          retry_count, max_retries, e, delay);
                    tokio::time::sleep(delay).await;
                    delay *= 2; // Exponential backoff: 1s, 2s, 4s
                }
            }
        }
    }

    async fn call_openai(&self, request: &OpenAiRequest) -> Result<OpenAiResponse, LlmError> {
        let response = self.client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        response.json::<OpenAiResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        info!("Requesting LLM completion (model: {}, max_tokens: {})", self.model, self.max_tokens);

        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.call_openai_with_retry(request).await?;

        let content = response.choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .clone();

        if let Some(usage) = response.usage {
            info!("LLM completion generated. Tokens: {} prompt + {} completion = {} total",
                  usage.prompt_tokens, usage.completion_tokens, usage.total_tokens);
        }

        Ok(content)
    }
}

/// Cached response with expiration.
#[derive(Debug, Clone)]
struct CachedResponse {
    content: String,
    created_at: Instant,
}

/// Completion cache with TTL, keyed by question hash. Identical questions
/// inside the window skip the network round trip.
pub struct LlmCache {
    cache: Arc<RwLock<HashMap<String, CachedResponse>>>,
    ttl: Duration,
}

impl LlmCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let cache = self.cache.read().await;
        if let Some(cached) = cache.get(key) {
            if cached.created_at.elapsed() < self.ttl {
                return Some(cached.content.clone());
            }
        }
        None
    }

    pub async fn set(&self, key: String, value: String) {
        let mut cache = self.cache.write().await;
        cache.insert(key, CachedResponse {
            content: value,
            created_at: Instant::now(),
        });
    }
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: usize,
    window_start: Instant,
}

/// Per-investor sliding-window limiter wrapped around the interpret path.
///
/// Lives here as a decorator on the external call, deliberately outside the
/// executor: query execution itself is unmetered.
pub struct InvestorRateLimiter {
    limits: Arc<RwLock<HashMap<Uuid, RateLimitEntry>>>,
    max_requests_per_hour: usize,
    window_duration: Duration,
}

impl InvestorRateLimiter {
    pub fn new(max_requests_per_hour: usize) -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            max_requests_per_hour,
            window_duration: Duration::from_secs(3600),
        }
    }

    pub async fn check_and_increment(&self, investor_id: Uuid) -> Result<(), LlmError> {
        let mut limits = self.limits.write().await;
        let now = Instant::now();

        let entry = limits.entry(investor_id).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.window_duration {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.max_requests_per_hour {
            warn!("Interpreter rate limit exceeded for investor: {}", investor_id);
            return Err(LlmError::RateLimited);
        }

        entry.count += 1;
        Ok(())
    }
}

/// Language-model service: provider selection, caching, per-investor limits.
pub struct LlmService {
    provider: Option<Arc<dyn LlmProvider>>,
    cache: LlmCache,
    rate_limiter: InvestorRateLimiter,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Self {
        let provider = if config.enabled {
            match config.api_key.as_deref() {
                Some(api_key) if !api_key.is_empty() => {
                    match config.provider.as_str() {
                        "openai" => {
                            info!("Initializing LLM service with provider: {}", config.provider);
                            let provider = OpenAiProvider::new(
                                api_key.to_string(),
                                config.max_tokens,
                                config.temperature,
                            );
                            Some(Arc::new(provider) as Arc<dyn LlmProvider>)
                        }
                        other => {
                            warn!("Unknown LLM provider: {}. LLM features disabled.", other);
                            None
                        }
                    }
                }
                _ => {
                    warn!("LLM API key not configured. LLM features disabled.");
                    None
                }
            }
        } else {
            info!("LLM features are disabled in configuration");
            None
        };

        Self {
            provider,
            cache: LlmCache::new(Duration::from_secs(3600)),
            rate_limiter: InvestorRateLimiter::new(50),
        }
    }

    #[cfg(test)]
    pub fn with_provider(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
            cache: LlmCache::new(Duration::from_secs(3600)),
            rate_limiter: InvestorRateLimiter::new(50),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Completion with rate limiting and caching, attributed to an investor.
    pub async fn complete_for_investor(
        &self,
        investor_id: Uuid,
        system: &str,
        user: &str,
    ) -> Result<String, LlmError> {
        self.rate_limiter.check_and_increment(investor_id).await?;

        let cache_key = format!("completion:{}", Self::hash_prompt(user));
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        let provider = self.provider.as_ref().ok_or(LlmError::Disabled)?;
        let result = provider.complete(system, user).await?;

        self.cache.set(cache_key, result.clone()).await;

        Ok(result)
    }

    fn hash_prompt(prompt: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        prompt.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.provider, "openai");
        assert_eq!(config.max_tokens, 400);
    }

    #[test]
    fn test_llm_service_disabled_by_default() {
        let service = LlmService::new(LlmConfig::default());
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_service_returns_disabled_error() {
        let service = LlmService::new(LlmConfig::default());
        let result = service
            .complete_for_investor(Uuid::new_v4(), "system", "user")
            .await;
        assert!(matches!(result, Err(LlmError::Disabled)));
    }

    #[tokio::test]
    async fn test_cache_stores_and_retrieves() {
        let cache = LlmCache::new(Duration::from_secs(60));
        cache.set("k".to_string(), "v".to_string()).await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_cache_expires() {
        let cache = LlmCache::new(Duration::from_millis(50));
        cache.set("k".to_string(), "v".to_string()).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_within_limit() {
        let limiter = InvestorRateLimiter::new(2);
        let investor = Uuid::new_v4();
        assert!(limiter.check_and_increment(investor).await.is_ok());
        assert!(limiter.check_and_increment(investor).await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_blocks_over_limit() {
        let limiter = InvestorRateLimiter::new(1);
        let investor = Uuid::new_v4();
        assert!(limiter.check_and_increment(investor).await.is_ok());
        let result = limiter.check_and_increment(investor).await;
        assert!(matches!(result, Err(LlmError::RateLimited)));
    }

    #[tokio::test]
    async fn test_rate_limiter_is_per_investor() {
        let limiter = InvestorRateLimiter::new(1);
        assert!(limiter.check_and_increment(Uuid::new_v4()).await.is_ok());
        assert!(limiter.check_and_increment(Uuid::new_v4()).await.is_ok());
    }
}
