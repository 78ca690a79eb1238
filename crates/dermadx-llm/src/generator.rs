use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::LlmError;

/// A plain-text prompt in, plain text out. No schema is guaranteed on the
/// returned text; callers parse defensively.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

/// Test double that replays a fixed script of replies and records prompts.
///
/// Once the script runs out every call fails with a transport error.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    pub fn fail(self, err: LlmError) -> Self {
        self.push(Err(err))
    }

    fn push(self, entry: Result<String, LlmError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(entry);
        }
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.replies
            .lock()
            .map_err(|_| LlmError::Transport("script lock poisoned".into()))?
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".into())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let g = ScriptedGenerator::new()
            .reply("first")
            .fail(LlmError::Timeout(1))
            .reply("third");

        assert_eq!(g.generate("a").await.unwrap(), "first");
        assert!(matches!(g.generate("b").await, Err(LlmError::Timeout(1))));
        assert_eq!(g.generate("c").await.unwrap(), "third");
        assert!(matches!(g.generate("d").await, Err(LlmError::Transport(_))));
        assert_eq!(g.prompts(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn arc_forwards() {
        let g: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::new().reply("ok"));
        assert_eq!(g.generate("p").await.unwrap(), "ok");
        assert_eq!(g.model(), "scripted");
    }
}
