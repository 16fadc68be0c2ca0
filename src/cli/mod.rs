use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::Config;
use crate::wire::UserResponses;

#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    #[value(name = "anthropic", alias = "claude")]
    Anthropic,
    #[value(name = "ollama")]
    Ollama,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

#[derive(Parser, Debug)]
#[command(name = "mvp_planner", version, about = "Build MVP scoping prompts and validate the plans a model returns")]
pub struct Args {
    /// TOML config file; values are overridden by env and flags
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory where transaction artifacts are written
    #[arg(long, global = true)]
    pub root: Option<String>,

    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[arg(long, global = true)]
    pub save_request: Option<bool>,

    #[arg(long, global = true)]
    pub save_response: Option<bool>,

    /// Show a spinner while waiting for the provider
    #[arg(long, global = true, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the system prompt
    SystemPrompt,
    /// Print the user prompt for a set of answers
    UserPrompt(AnswerArgs),
    /// Print the MVP plan JSON Schema
    Schema {
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// Print the full request envelope that would be sent to a provider
    Request(AnswerArgs),
    /// Send the prompts to a provider, then validate and render the plan
    Plan(PlanArgs),
    /// Validate a saved plan JSON file against the schema and pricing rules
    Validate {
        file: PathBuf,
    },
}

/// Questionnaire answers, from a file and/or individual flags.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct AnswerArgs {
    /// JSON, YAML or TOML file with the questionnaire answers
    #[arg(long)]
    pub answers: Option<PathBuf>,

    #[arg(long)]
    pub project_name: Option<String>,
    #[arg(long)]
    pub app_type: Option<String>,
    #[arg(long)]
    pub app_description: Option<String>,
    #[arg(long)]
    pub problem_solving: Option<String>,
    #[arg(long)]
    pub target_user: Option<String>,
    #[arg(long)]
    pub user_login: Option<String>,
    #[arg(long)]
    pub monetization: Option<String>,
    #[arg(long)]
    pub timeline: Option<String>,
}

impl AnswerArgs {
    pub fn responses(&self) -> UserResponses {
        UserResponses {
            app_type: self.app_type.clone(),
            app_description: self.app_description.clone(),
            problem_solving: self.problem_solving.clone(),
            target_user: self.target_user.clone(),
            user_login: self.user_login.clone(),
            monetization: self.monetization.clone(),
            timeline: self.timeline.clone(),
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub answers: AnswerArgs,

    #[arg(long, value_enum, env = "MVP_PLANNER_PROVIDER")]
    pub provider: Option<ProviderKind>,

    #[arg(long, env = "MVP_PLANNER_MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "OLLAMA_HOST")]
    pub ollama_url: Option<String>,

    /// Build and save the request without calling the provider
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,
}

impl Args {
    /// Global flags win over the config file.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(root) = &self.root {
            cfg.root = root.clone();
        }
        if let Some(t) = self.timeout_secs {
            cfg.timeout_secs = t;
        }
        if let Some(s) = self.save_request {
            cfg.save_request = s;
        }
        if let Some(s) = self.save_response {
            cfg.save_response = s;
        }
    }
}

impl PlanArgs {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(p) = self.provider {
            cfg.provider = p;
        }
        if let Some(m) = &self.model {
            cfg.model = m.clone();
        }
        if let Some(u) = &self.ollama_url {
            cfg.ollama_url = u.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_flags() {
        let args = Args::try_parse_from([
            "mvp_planner", "--debug", "plan", "--provider", "anthropic", "--project-name", "Acme",
            "--monetization", "Subscriptions", "-y", "--progress", "false",
        ])
        .unwrap();
        assert!(args.debug);
        assert!(!args.progress);
        match args.command {
            Command::Plan(p) => {
                assert!(matches!(p.provider, Some(ProviderKind::Anthropic)));
                assert_eq!(p.answers.project_name.as_deref(), Some("Acme"));
                assert_eq!(p.answers.responses().monetization.as_deref(), Some("Subscriptions"));
                assert!(p.yes);
                assert!(!p.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_before_or_after_subcommand() {
        for argv in [
            vec!["mvp_planner", "--timeout-secs", "30", "--save-request", "false", "plan"],
            vec!["mvp_planner", "plan", "--timeout-secs", "30", "--save-request", "false"],
            vec!["mvp_planner", "--timeout-secs", "30", "--save-request", "false", "schema"],
        ] {
            let args = Args::try_parse_from(&argv).unwrap();
            let mut cfg = Config::default();
            args.apply(&mut cfg);
            assert_eq!(cfg.timeout_secs, 30, "{argv:?}");
            assert!(!cfg.save_request, "{argv:?}");
            assert!(cfg.save_response, "{argv:?}");
            assert!(args.progress);
        }
    }

    #[test]
    fn plan_flags_override_config() {
        let args = Args::try_parse_from([
            "mvp_planner", "plan", "--provider", "ollama", "--model", "llama3.1",
            "--ollama-url", "http://gpu-box:11434",
        ])
        .unwrap();
        let Command::Plan(p) = args.command else { panic!("expected plan") };
        let mut cfg = Config::default();
        p.apply(&mut cfg);
        assert!(matches!(cfg.provider, ProviderKind::Ollama));
        assert_eq!(cfg.model, "llama3.1");
        assert_eq!(cfg.ollama_url, "http://gpu-box:11434");
    }

    #[test]
    fn provider_names() {
        assert!(matches!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAI)));
        assert!(matches!("claude".parse::<ProviderKind>(), Ok(ProviderKind::Anthropic)));
        assert!("gemini".parse::<ProviderKind>().is_err());
    }
}
