// Fixed values for the completion provider and the travel form.
// Anything the operator may override lives in `config` instead.

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const MODEL_NAME: &str = "llama3-8b-8192";
pub const TEMPERATURE: f64 = 0.7;

/// Every real Groq key starts with this.
pub const API_KEY_PREFIX: &str = "gsk_";
/// Substituted when no key is configured so the credential check fails closed.
pub const PLACEHOLDER_API_KEY: &str = "sk-fake-for-testing";

pub const SYSTEM_PROMPT: &str = "You are a friendly and helpful travel advisor.
You answer user questions about travel destinations, planning, and tips in a clear and engaging way.";

pub const CATEGORIES: [&str; 4] = ["Beach", "Mountain", "City", "Countryside"];
pub const REGIONS: [&str; 4] = ["North America", "South Asia", "Europe", "Middle East"];
pub const PREFERENCES: [&str; 4] = ["Budget-Friendly", "Luxury", "Family-Friendly", "Romantic"];

pub const DEFAULT_CATEGORY: &str = CATEGORIES[0];
pub const DEFAULT_REGION: &str = REGIONS[0];

pub const DEFAULT_PORT: u16 = 7860;
