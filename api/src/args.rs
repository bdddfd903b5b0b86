use std::time::Duration;

use clap::{Args as ClapArgs, Parser};
use menulens_core::domain::{
    common::{LLMConfig, MenuLensConfig, PipelineConfig, ProviderCredentials},
    menu_analysis::policies::{AnalysisPolicy, PartialFailurePolicy, RetryPolicy},
};

#[derive(Debug, Clone, Parser)]
#[command(name = "menulens-api", version, about = "Menu health analysis API")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ServerArgs {
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "SERVER_PORT", default_value_t = 3333)]
    pub port: u16,

    #[arg(long, env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,

    /// Include raw failure details in error responses.
    #[arg(long, env = "EXPOSE_ERROR_DETAILS", default_value_t = false)]
    pub expose_error_details: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LlmArgs {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "ANTHROPIC_MODEL", default_value = "claude-3-5-haiku-latest")]
    pub anthropic_model: String,

    #[arg(long, env = "ANTHROPIC_BASE_URL")]
    pub anthropic_base_url: Option<String>,

    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct PipelineArgs {
    #[arg(long, env = "MAX_CONCURRENT_DISHES", default_value_t = 4)]
    pub max_concurrent_dishes: usize,

    /// `tolerate` drops failed dishes, `abort` fails the whole request.
    #[arg(long, env = "PARTIAL_FAILURE", default_value = "tolerate")]
    pub partial_failure: PartialFailurePolicy,

    #[arg(long, env = "RETRY_DISHES_WITH_FALLBACK", default_value_t = false)]
    pub retry_dishes_with_fallback: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LogArgs {
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Used when RUST_LOG is not set.
    #[arg(long, env = "LOG_FILTER", default_value = "info")]
    pub filter: String,
}

fn credentials(
    api_key: Option<String>,
    model: String,
    base_url: Option<String>,
) -> Option<ProviderCredentials> {
    api_key
        .filter(|key| !key.trim().is_empty())
        .map(|api_key| ProviderCredentials {
            api_key,
            model,
            base_url: base_url.filter(|url| !url.trim().is_empty()),
        })
}

impl From<Args> for MenuLensConfig {
    fn from(args: Args) -> Self {
        Self {
            llm: LLMConfig {
                openai: credentials(
                    args.llm.openai_api_key,
                    args.llm.openai_model,
                    args.llm.openai_base_url,
                ),
                anthropic: credentials(
                    args.llm.anthropic_api_key,
                    args.llm.anthropic_model,
                    args.llm.anthropic_base_url,
                ),
                request_timeout: Duration::from_secs(args.llm.timeout_secs),
            },
            pipeline: PipelineConfig {
                max_concurrent_dishes: args.pipeline.max_concurrent_dishes,
                policy: AnalysisPolicy {
                    partial_failure: args.pipeline.partial_failure,
                    retry: RetryPolicy {
                        dish_fallback: args.pipeline.retry_dishes_with_fallback,
                        ..RetryPolicy::default()
                    },
                },
            },
        }
    }
}
