use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tldw_core::{Result, TargetLanguage, TldwError, Translator};

#[derive(Clone, Default)]
pub struct MockTranslator {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub fail_with: Option<String>,
    pub delay: Duration,
}

impl MockTranslator {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target.code.to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(TldwError::Translation {
                language: target.name.to_string(),
                reason: msg.clone(),
            });
        }
        Ok(format!("[{}] {}", target.code, text))
    }
}
