use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a feedback message stays visible.
pub const DEFAULT_FEEDBACK_TTL: Duration = Duration::from_secs(3);

/// A selectable form type and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTypeOption {
    pub id: String,
    pub label: String,
}

impl FormTypeOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

pub fn default_form_types() -> Vec<FormTypeOption> {
    vec![
        FormTypeOption::new("userInfo", "User Information"),
        FormTypeOption::new("addressInfo", "Address Information"),
        FormTypeOption::new("paymentInfo", "Payment Information"),
    ]
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub feedback_ttl: Duration,
    pub form_types: Vec<FormTypeOption>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feedback_ttl: DEFAULT_FEEDBACK_TTL,
            form_types: default_form_types(),
        }
    }
}
