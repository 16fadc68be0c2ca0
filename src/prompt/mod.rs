use crate::plan::{ADDITIONAL_FEATURE_COST, BASE_FEATURE_COUNT, BASE_PACKAGE_COST};
use crate::wire::{UserInfo, UserResponses};

/// Placeholder rendered for any answer the caller did not supply.
pub const MISSING: &str = "undefined";

fn pricing_rules() -> String {
    format!(
r#"Pricing Rules (fixed, do not negotiate or discount):
- Base package: ${base} covers exactly {n} core features.
- Every feature beyond the first {n} adds ${extra}.
- developmentCost = {base} + ({extra} × number of additional features).
- basePackage.cost MUST be {base}; each additionalFeatures[].cost MUST be {extra}.
- costPerUser is an estimated monthly running cost range per active user, formatted exactly as "$X.XX - $Y.YY".
- paymentTerms: 50% upfront, 50% on delivery, unless the project clearly calls for milestones."#,
        base = BASE_PACKAGE_COST,
        extra = ADDITIONAL_FEATURE_COST,
        n = BASE_FEATURE_COUNT,
    )
}

fn timeline_bands() -> &'static str {
r#"Timeline Rules (total number of features → delivery time):
- 3 features → 4 weeks
- 4–5 features → 5 weeks
- 6–7 features → 6 weeks
- 8–9 features → 7 weeks
- Produce exactly one timeline entry per week, numbered from 1. The final week is always QA, launch and handover."#
}

fn tech_stack() -> &'static str {
r#"Default Technology Stack (deviate only when the answers demand it, and say why in the summary):
- Frontend: Next.js, React, TypeScript, Tailwind CSS
- Backend: Next.js API routes / server actions, Node.js
- Database: PostgreSQL (Supabase)
- Hosting: Vercel
- Other: Stripe for payments, Resend for email, Supabase Auth or Clerk for authentication
- Mobile apps: React Native (Expo) sharing the same backend"#
}

fn feature_guidance() -> &'static str {
r#"Feature Classification:
- A feature is a user-facing capability that delivers product value (e.g. "Booking calendar", "Team dashboards", "AI résumé review").
- Infrastructure is NOT a feature and never counts toward the feature total or price: authentication/login, user accounts, payments/billing setup, transactional email, hosting, analytics, admin panels for basic CRUD, responsive design.
- Pick exactly 3 core features: the smallest set that solves the stated problem for the target user.
- Anything else the answers ask for goes into "additional" features, each priced separately.
- Merge near-duplicates; do not split one capability into several features to inflate scope.
- userCapabilities lists 8–12 concrete things an end user can do, phrased as "Users can …"."#
}

/// System instruction encoding the scoping and pricing rules. The text is a
/// constant; every call returns the same string.
pub fn build_system_prompt() -> String {
    format!(
r#"You are a senior product strategist and technical estimator at a software studio that builds MVPs (Minimum Viable Products) for founders.
Your job is to turn a founder's questionnaire answers into a scoped, priced, week-by-week MVP plan.

{pricing}

{timeline}

{stack}

{features}

Output Rules:
- Reply with exactly one JSON object that matches the provided schema. No markdown, no code fences, no commentary.
- All costs are whole US dollars, written as numbers without separators.
- Be concrete and specific to the founder's domain; avoid generic filler.
- Keep the summary to 2–4 sentences describing what will be built and for whom."#,
        pricing = pricing_rules(),
        timeline = timeline_bands(),
        stack = tech_stack(),
        features = feature_guidance(),
    )
}

fn field(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or(MISSING)
}

fn output_example() -> &'static str {
r#"{
  "summary": "string",
  "userCapabilities": ["Users can ...", "... 8 to 12 entries"],
  "investment": {
    "developmentCost": 10000,
    "featureBreakdown": {
      "basePackage": { "cost": 10000, "features": ["core 1", "core 2", "core 3"] },
      "additionalFeatures": [ { "name": "string", "cost": 3333 } ]
    },
    "costPerUser": "$0.10 - $0.25",
    "paymentTerms": "string"
  },
  "techStack": {
    "frontend": ["string"],
    "backend": ["string"],
    "database": ["string"],
    "hosting": ["string"],
    "other": ["string"]
  },
  "timeline": [
    { "week": 1, "milestone": "string", "deliverables": ["string"] }
  ],
  "features": {
    "core": [ { "name": "string", "description": "string", "priority": "high" } ],
    "additional": [ { "name": "string", "description": "string", "priority": "medium" } ]
  }
}"#
}

/// Per-request instruction built from the questionnaire answers.
pub fn build_user_prompt(responses: &UserResponses, user_info: &UserInfo) -> String {
    format!(
"Analyze the following project and produce an MVP plan.

Project Name: {project}

Questionnaire:
- App type: {app_type}
- What the app does: {app_description}
- Problem it solves: {problem_solving}
- Target user: {target_user}
- User login required: {user_login}
- Monetization: {monetization}
- Desired timeline: {timeline}

Tasks:
1. Identify the user-facing features implied by the answers. Exclude infrastructure (auth, payments, email, hosting).
2. Choose exactly 3 core features; list everything else as additional features.
3. Price the plan with the fixed pricing rules and choose the timeline from the timeline bands using the total feature count.
4. Recommend a tech stack, starting from the default stack.
5. Write 8–12 user capabilities and a week-by-week timeline with deliverables.

If the desired timeline is shorter than the band allows, keep the band and mention the tradeoff in the summary.

Respond with JSON in exactly this structure:
{example}",
        project = field(&user_info.project_name),
        app_type = field(&responses.app_type),
        app_description = field(&responses.app_description),
        problem_solving = field(&responses.problem_solving),
        target_user = field(&responses.target_user),
        user_login = field(&responses.user_login),
        monetization = field(&responses.monetization),
        timeline = field(&responses.timeline),
        example = output_example(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> UserResponses {
        UserResponses {
            app_type: Some("Web app".into()),
            app_description: Some("Scheduling for dog groomers".into()),
            problem_solving: Some("Double bookings and no-shows".into()),
            target_user: Some("Independent groomers".into()),
            user_login: Some("Yes".into()),
            monetization: Some("Monthly subscription".into()),
            timeline: Some("Two months".into()),
        }
    }

    #[test]
    fn system_prompt_is_deterministic() {
        assert_eq!(build_system_prompt(), build_system_prompt());
    }

    #[test]
    fn system_prompt_encodes_business_rules() {
        let p = build_system_prompt();
        assert!(p.contains("$10000 covers exactly 3 core features"));
        assert!(p.contains("adds $3333"));
        assert!(p.contains("3 features → 4 weeks"));
        assert!(p.contains("4–5 features → 5 weeks"));
        assert!(p.contains("6–7 features → 6 weeks"));
        assert!(p.contains("8–9 features → 7 weeks"));
        assert!(p.contains("Infrastructure is NOT a feature"));
        assert!(p.contains("Next.js"));
    }

    #[test]
    fn user_prompt_contains_project_name_verbatim() {
        let info = UserInfo { project_name: Some("Acme".into()) };
        let p = build_user_prompt(&answers(), &info);
        assert!(p.contains("Project Name: Acme"));
        assert!(p.contains("Scheduling for dog groomers"));
        assert!(p.contains("Monthly subscription"));
        assert!(!p.contains(MISSING));
    }

    #[test]
    fn missing_answers_render_as_undefined() {
        let mut r = answers();
        r.monetization = None;
        let p = build_user_prompt(&r, &UserInfo::default());
        assert!(p.contains("- Monetization: undefined"));
        assert!(p.contains("Project Name: undefined"));
    }

    #[test]
    fn user_prompt_repeats_output_structure() {
        let p = build_user_prompt(&UserResponses::default(), &UserInfo::default());
        for key in ["\"userCapabilities\"", "\"basePackage\"", "\"costPerUser\"", "\"techStack\"", "\"core\""] {
            assert!(p.contains(key), "missing {key}");
        }
    }

    #[test]
    fn inline_example_is_valid_json() {
        let v: serde_json::Value = serde_json::from_str(output_example()).unwrap();
        assert_eq!(v["investment"]["featureBreakdown"]["basePackage"]["cost"], 10000);
    }
}
