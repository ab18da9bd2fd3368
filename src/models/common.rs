use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub tasks: Vec<String>,
}

impl ModelInfo {
    pub fn supports(&self, task_type: &str) -> bool {
        self.tasks.iter().any(|task| task == task_type)
    }
}
