use std::collections::BTreeMap;

/// Message kinds the remote agent should forward for a call.
pub const TRANSCRIPT_MESSAGES: &str = "transcript";

/// Which remote agent a call is placed with.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum AgentTarget {
    /// A server-side workflow, driven by template variables.
    #[serde(rename_all = "camelCase")]
    Workflow { workflow_id: String },
    /// An inline assistant definition.
    Assistant(AssistantConfig),
}

/// Inline definition of an assistant persona.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    /// Display name of the assistant.
    name: String,

    /// First line spoken when the call connects.
    first_message: String,

    /// Speech-to-text settings.
    transcriber: ProviderModel,

    /// Text-to-speech voice.
    voice: VoiceConfig,

    /// Language model settings.
    model: ProviderModel,

    /// System prompt. May contain `{{variable}}` placeholders.
    system_prompt: String,
}

impl AssistantConfig {
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first_message(&self) -> &str {
        &self.first_message
    }

    pub fn transcriber(&self) -> &ProviderModel {
        &self.transcriber
    }

    pub fn voice(&self) -> &VoiceConfig {
        &self.voice
    }

    pub fn model(&self) -> &ProviderModel {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AssistantConfig {
                name: String::new(),
                first_message: String::new(),
                transcriber: ProviderModel::new("deepgram", "nova-2"),
                voice: VoiceConfig::default(),
                model: ProviderModel::new("openai", "gpt-4"),
                system_prompt: String::new(),
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    pub fn with_first_message(mut self, first_message: &str) -> Self {
        self.config.first_message = first_message.to_string();
        self
    }

    pub fn with_transcriber(mut self, transcriber: ProviderModel) -> Self {
        self.config.transcriber = transcriber;
        self
    }

    pub fn with_voice(mut self, voice: VoiceConfig) -> Self {
        self.config.voice = voice;
        self
    }

    pub fn with_model(mut self, model: ProviderModel) -> Self {
        self.config.model = model;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: &str) -> Self {
        self.config.system_prompt = system_prompt.to_string();
        self
    }

    pub fn build(self) -> AssistantConfig {
        self.config
    }
}

impl Default for AssistantConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A provider plus a model name, e.g. `deepgram` / `nova-2`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProviderModel {
    provider: String,
    model: String,
}

impl ProviderModel {
    pub fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    provider: String,
    voice_id: String,
    stability: f32,
    similarity_boost: f32,
    speed: f32,
}

impl VoiceConfig {
    pub fn new(provider: &str, voice_id: &str) -> Self {
        Self {
            provider: provider.to_string(),
            voice_id: voice_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_stability(mut self, stability: f32) -> Self {
        self.stability = stability;
        self
    }

    pub fn with_similarity_boost(mut self, similarity_boost: f32) -> Self {
        self.similarity_boost = similarity_boost;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider: "11labs".to_string(),
            voice_id: "sarah".to_string(),
            stability: 0.5,
            similarity_boost: 0.75,
            speed: 1.0,
        }
    }
}

/// Per-call options: template variables and which message kinds to forward.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    /// Free-form values substituted into `{{name}}` placeholders by the agent.
    variable_values: BTreeMap<String, String>,

    client_messages: Vec<String>,

    server_messages: Vec<String>,
}

impl StartOptions {
    /// Options that forward transcript messages to both client and server.
    pub fn transcripts() -> Self {
        Self {
            variable_values: BTreeMap::new(),
            client_messages: vec![TRANSCRIPT_MESSAGES.to_string()],
            server_messages: vec![TRANSCRIPT_MESSAGES.to_string()],
        }
    }

    pub fn with_variable(mut self, name: &str, value: impl Into<String>) -> Self {
        self.variable_values.insert(name.to_string(), value.into());
        self
    }

    pub fn variable_values(&self) -> &BTreeMap<String, String> {
        &self.variable_values
    }

    pub fn client_messages(&self) -> &[String] {
        &self.client_messages
    }

    pub fn server_messages(&self) -> &[String] {
        &self.server_messages
    }
}

/// Everything the transport needs to place a call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    #[serde(flatten)]
    target: AgentTarget,

    #[serde(flatten)]
    options: StartOptions,
}

impl StartRequest {
    pub fn new(target: AgentTarget, options: StartOptions) -> Self {
        Self { target, options }
    }

    pub fn target(&self) -> &AgentTarget {
        &self.target
    }

    pub fn options(&self) -> &StartOptions {
        &self.options
    }
}
