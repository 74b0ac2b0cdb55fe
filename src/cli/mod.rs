use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Webhook Args ---
    /// Webhook endpoint that receives chat payloads. Falls back to the built-in Hub Nexus URL.
    #[arg(long, env = "WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Request timeout in seconds. Unset leaves the HTTP client default.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// How many messages of a multi-message reply to show (all, first)
    #[arg(long, env = "REPLY_POLICY", default_value = "all")]
    pub reply_policy: String,

    // --- Branding Args ---
    /// Logo shown in the chat header. Falls back to the built-in logo URL.
    #[arg(long, env = "LOGO_URL")]
    pub logo_url: Option<String>,

    // --- Agent Args ---
    /// Display name of the agent to open the chat with
    #[arg(short = 'a', long, env = "AGENT_NAME", default_value = "Atendente Virtual")]
    pub agent: String,

    /// Icon class of the agent avatar
    #[arg(long, env = "AGENT_ICON", default_value = "fas fa-robot")]
    pub agent_icon: String,

    // --- Contact Args ---
    /// How contact info is collected (popup, conversational)
    #[arg(long, env = "CONTACT_POLICY", default_value = "popup")]
    pub contact_policy: String,

    /// File holding the collected contact. Defaults to the platform data directory.
    #[arg(long, env = "CONTACT_STORE_PATH")]
    pub contact_store: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
