use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::plan::{quote, BASE_FEATURE_COUNT};
use crate::validate::Violation;
use crate::wire::{Feature, MvpPlan, Priority};

fn priority_label(p: Priority) -> colored::ColoredString {
    let s = format!("[{}]", p.as_str().to_uppercase());
    match p {
        Priority::High => s.red().bold(),
        Priority::Medium => s.yellow().bold(),
        Priority::Low => s.cyan().bold(),
    }
}

fn print_features(title: &str, features: &[Feature]) {
    println!("{}", title.bold());
    if features.is_empty() {
        println!("  (none)");
    }
    for (i, f) in features.iter().enumerate() {
        println!("  {}. {}  {} - {}", i + 1, priority_label(f.priority), f.name.bold(), f.description);
    }
}

fn dollars(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${out}")
}

pub fn show_plan(plan: &MvpPlan) {
    println!("\n=== MVP PLAN ===");
    println!("{}\n", plan.summary.bold());

    let total = plan.features.core.len() + plan.features.additional.len();
    let q = quote(total);
    println!(
        "{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ Investment ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    println!(
        "  {}: {}   {}: {}   {}: {} ({} base + {} extra)   {}: {}",
        "Cost".green().bold(), dollars(plan.investment.development_cost),
        "Weeks".yellow().bold(), plan.timeline.len(),
        "Features".cyan().bold(), total, BASE_FEATURE_COUNT.min(total), total.saturating_sub(BASE_FEATURE_COUNT),
        "Per user".magenta().bold(), plan.investment.cost_per_user,
    );
    println!(
        "  pricing rules for {} features: {} over {} weeks",
        q.features, dollars(q.development_cost), q.weeks
    );
    println!("  payment terms: {}", plan.investment.payment_terms);
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());

    println!();
    print_features("Core features", &plan.features.core);
    print_features("Additional features", &plan.features.additional);

    println!("\n{}", "Users can".bold());
    for c in &plan.user_capabilities {
        println!("  • {}", c);
    }

    let ts = &plan.tech_stack;
    println!("\n{}", "Tech stack".bold());
    for (label, items) in [
        ("frontend", &ts.frontend),
        ("backend", &ts.backend),
        ("database", &ts.database),
        ("hosting", &ts.hosting),
        ("other", &ts.other),
    ] {
        if !items.is_empty() {
            println!("  {:<9} {}", label, items.join(", "));
        }
    }

    println!("\n{}", "Timeline".bold());
    for m in &plan.timeline {
        println!("  {} {}", format!("Week {}", m.week).green().bold(), m.milestone);
        for d in &m.deliverables {
            println!("      - {}", d);
        }
    }
    println!();
}

pub fn print_violations(violations: &[Violation]) {
    println!("\n{}", format!("Schema violations ({}):", violations.len()).red().bold());
    for v in violations {
        println!(" - {}", v);
    }
}

pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        println!("{}", "Pricing and timeline rules: OK".green());
        return;
    }
    println!("\n{}", "Pricing rule warnings:".yellow().bold());
    for w in warnings {
        println!(" - {}", w);
    }
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

pub fn spinner(message: &str, enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollars_groups_thousands() {
        assert_eq!(dollars(0), "$0");
        assert_eq!(dollars(999), "$999");
        assert_eq!(dollars(10_000), "$10,000");
        assert_eq!(dollars(1_016_666), "$1,016,666");
    }
}
