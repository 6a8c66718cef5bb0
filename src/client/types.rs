use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    #[default]
    Tinyllama,
    Openai,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::Tinyllama, Model::Openai];

    pub fn label(self) -> &'static str {
        match self {
            Model::Tinyllama => "TinyLlama (local)",
            Model::Openai => "OpenAI",
        }
    }
}

/// Body sent to both `/generate-local` and `/generate-local/stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: Model,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub output: String,
}
