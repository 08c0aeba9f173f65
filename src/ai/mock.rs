use super::CompletionService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted completion provider for tests and local harnesses.
///
/// Replies are returned in order and cycle once exhausted. Clones share
/// state, so a clone kept outside the code under test can observe its calls.
#[derive(Clone)]
pub struct MockCompletionClient {
    name: String,
    responses: Arc<Mutex<Vec<std::result::Result<String, String>>>>,
    user_prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockCompletionClient {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: Arc::new(Mutex::new(Vec::new())),
            user_prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(Ok(response));
        self
    }

    /// Queue a provider failure carrying `message`.
    pub fn with_failure(self, message: String) -> Self {
        self.responses.lock().unwrap().push(Err(message));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// User prompts received so far, oldest first.
    pub fn user_prompts(&self) -> Vec<String> {
        self.user_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for MockCompletionClient {
    fn service_name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.user_prompts.lock().unwrap().push(user.to_string());

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            return Ok(format!(
                r#"{{"interpretation":"mock reading from {}","lucky_numbers":[12,34,56],"confidence":"medium"}}"#,
                self.name
            ));
        }

        let index = (*count - 1) % responses.len();
        responses[index].clone().map_err(Error::AiProvider)
    }
}
