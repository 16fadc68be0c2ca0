use anyhow::Context;
use clap::Parser;
use fs_err as fs;
use std::path::Path;

mod answers;
mod cli;
mod config;
mod errors;
mod log;
mod plan;
mod prompt;
mod provider;
mod schema;
mod ux;
mod validate;
mod wire;

use cli::{AnswerArgs, Command, PlanArgs};
use errors::PlannerError;

fn resolve_answers(a: &AnswerArgs) -> anyhow::Result<answers::Answers> {
    answers::resolve(a.answers.as_deref(), a.responses(), a.project_name.clone())
}

fn build_request(cfg: &config::Config, a: &AnswerArgs, dry_run: bool) -> anyhow::Result<wire::PlannerRequest> {
    let answers = resolve_answers(a)?;
    Ok(wire::PlannerRequest::new(
        cfg.schema_version.clone(),
        answers.responses,
        answers.user_info,
        dry_run,
    ))
}

/// Validate and audit a model response, rendering whatever we learn.
fn check_plan(value: &serde_json::Value) -> anyhow::Result<()> {
    match validate::validate_plan(value) {
        Ok(p) => {
            ux::show_plan(&p);
            ux::print_warnings(&plan::audit(&p));
            Ok(())
        }
        Err(PlannerError::Validation(violations)) => {
            ux::print_violations(&violations);
            Err(PlannerError::Validation(violations).into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_plan(mut cfg: config::Config, args: PlanArgs, debug: bool, progress: bool) -> anyhow::Result<()> {
    args.apply(&mut cfg);

    let req = build_request(&cfg, &args.answers, args.dry_run)?;
    let txid = req.transaction.id;
    let root = Path::new(&cfg.root);
    tracing::info!(tx = %txid, provider = ?cfg.provider, model = %cfg.model, "planning");

    if args.dry_run {
        let saved = log::save_stage::<_, serde_json::Value>("plan", &req, None, txid, root, true, false)?;
        log::print_saved_paths("plan", &saved);
        if let Some(p) = &saved.request {
            println!("dry run: request written to {}", p.display());
        }
        return Ok(());
    }

    if !(args.yes || cfg.auto_approve)
        && !ux::confirm(&format!("Send project to {:?} ({})?", cfg.provider, cfg.model))
    {
        println!("Aborted by user.");
        return Ok(());
    }

    let prov = provider::make_provider(&cfg)?;
    let pb = ux::spinner(&format!("waiting for {}", prov.name()), progress);
    let sent = prov.send(&req, debug).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let resp = sent.with_context(|| format!("{} provider call failed", prov.name()))?;

    let saved = log::save_stage("plan", &req, Some(&resp), txid, root, cfg.save_request, cfg.save_response)?;
    log::print_saved_paths("plan", &saved);
    if debug {
        log::print_json_debug("plan", &req, Some(&resp))?;
    }

    check_plan(&resp)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    log::init_tracing(args.debug);

    let mut cfg = config::Config::resolve(args.config.as_deref())?;
    args.apply(&mut cfg);

    match args.command {
        Command::SystemPrompt => println!("{}", prompt::build_system_prompt()),
        Command::UserPrompt(a) => {
            let answers = resolve_answers(&a)?;
            println!("{}", prompt::build_user_prompt(&answers.responses, &answers.user_info));
        }
        Command::Schema { compact } => {
            let s = schema::mvp_plan_schema();
            let out = if compact { serde_json::to_string(s)? } else { serde_json::to_string_pretty(s)? };
            println!("{}", out);
        }
        Command::Request(a) => {
            let req = build_request(&cfg, &a, true)?;
            println!("{}", serde_json::to_string_pretty(&req)?);
        }
        Command::Plan(p) => run_plan(cfg, p, args.debug, args.progress).await?,
        Command::Validate { file } => {
            let text = fs::read_to_string(&file)?;
            let value = provider::parse_content(&text)
                .with_context(|| format!("reading plan from {}", file.display()))?;
            check_plan(&value)?;
        }
    }

    Ok(())
}
