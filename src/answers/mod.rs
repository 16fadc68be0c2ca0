use anyhow::{Context, Result};
use fs_err as fs;
use serde::Deserialize;
use std::path::Path;

use crate::errors::PlannerError;
use crate::wire::{UserInfo, UserResponses};

/// Questionnaire answers plus project identity, as loaded from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    pub responses: UserResponses,
    pub user_info: UserInfo,
}

/// Either `{ "responses": {...}, "userInfo": {...} }` or a flat object that
/// mixes the questionnaire fields with `projectName`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnswersFile {
    Nested {
        responses: UserResponses,
        #[serde(default, rename = "userInfo")]
        user_info: UserInfo,
    },
    Flat {
        #[serde(flatten)]
        responses: UserResponses,
        #[serde(default, rename = "projectName")]
        project_name: Option<String>,
    },
}

impl From<AnswersFile> for Answers {
    fn from(f: AnswersFile) -> Self {
        match f {
            AnswersFile::Nested { responses, user_info } => Answers { responses, user_info },
            AnswersFile::Flat { responses, project_name } => Answers {
                responses,
                user_info: UserInfo { project_name },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Toml,
}

fn detect(path: &Path) -> Result<Format, PlannerError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => Ok(Format::Json),
        "yaml" | "yml" => Ok(Format::Yaml),
        "toml" => Ok(Format::Toml),
        other => Err(PlannerError::Input(format!(
            "unsupported answers format '{}' for {} (expected .json, .yaml, .yml or .toml)",
            other,
            path.display()
        ))),
    }
}

pub fn parse(text: &str, path: &Path) -> Result<Answers> {
    let file: AnswersFile = match detect(path)? {
        Format::Json => serde_json::from_str(text)
            .with_context(|| format!("parsing {}", path.display()))?,
        Format::Yaml => serde_yaml::from_str(text)
            .with_context(|| format!("parsing {}", path.display()))?,
        Format::Toml => toml::from_str(text)
            .with_context(|| format!("parsing {}", path.display()))?,
    };
    Ok(file.into())
}

pub fn load(path: &Path) -> Result<Answers> {
    let text = fs::read_to_string(path)?;
    let answers = parse(&text, path)?;
    tracing::debug!(path = %path.display(), "loaded questionnaire answers");
    Ok(answers)
}

/// Merge CLI overrides on top of an optional answers file.
pub fn resolve(path: Option<&Path>, flags: UserResponses, project_name: Option<String>) -> Result<Answers> {
    let base = match path {
        Some(p) => load(p)?,
        None => Answers::default(),
    };
    let answers = Answers {
        responses: flags.or(base.responses),
        user_info: UserInfo { project_name: project_name.or(base.user_info.project_name) },
    };
    for (name, missing) in missing_fields(&answers) {
        if missing {
            tracing::warn!(field = name, "questionnaire answer missing; prompt will say \"undefined\"");
        }
    }
    Ok(answers)
}

fn missing_fields(a: &Answers) -> [(&'static str, bool); 8] {
    let r = &a.responses;
    [
        ("projectName", a.user_info.project_name.is_none()),
        ("appType", r.app_type.is_none()),
        ("appDescription", r.app_description.is_none()),
        ("problemSolving", r.problem_solving.is_none()),
        ("targetUser", r.target_user.is_none()),
        ("userLogin", r.user_login.is_none()),
        ("monetization", r.monetization.is_none()),
        ("timeline", r.timeline.is_none()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_json() {
        let text = r#"{
            "responses": { "appType": "Web app", "monetization": "Ads" },
            "userInfo": { "projectName": "Acme" }
        }"#;
        let a = parse(text, Path::new("a.json")).unwrap();
        assert_eq!(a.responses.app_type.as_deref(), Some("Web app"));
        assert_eq!(a.responses.monetization.as_deref(), Some("Ads"));
        assert_eq!(a.user_info.project_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn flat_yaml() {
        let text = "projectName: Groomly\nappType: Mobile app\ntargetUser: Dog groomers\n";
        let a = parse(text, Path::new("answers.yml")).unwrap();
        assert_eq!(a.user_info.project_name.as_deref(), Some("Groomly"));
        assert_eq!(a.responses.target_user.as_deref(), Some("Dog groomers"));
        assert!(a.responses.timeline.is_none());
    }

    #[test]
    fn nested_toml() {
        let text = "[responses]\nappType = \"SaaS\"\ntimeline = \"Q3\"\n\n[userInfo]\nprojectName = \"Ledgerly\"\n";
        let a = parse(text, Path::new("answers.TOML")).unwrap();
        assert_eq!(a.responses.app_type.as_deref(), Some("SaaS"));
        assert_eq!(a.user_info.project_name.as_deref(), Some("Ledgerly"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = parse("{}", Path::new("answers.txt")).unwrap_err();
        assert!(err.to_string().contains("unsupported answers format"));
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        fs::write(&path, r#"{"projectName":"Acme","appType":"Web app","timeline":"6 weeks"}"#).unwrap();

        let flags = UserResponses { app_type: Some("Mobile app".into()), ..Default::default() };
        let a = resolve(Some(&path), flags, None).unwrap();
        assert_eq!(a.responses.app_type.as_deref(), Some("Mobile app"));
        assert_eq!(a.responses.timeline.as_deref(), Some("6 weeks"));
        assert_eq!(a.user_info.project_name.as_deref(), Some("Acme"));

        let a = resolve(None, UserResponses::default(), Some("Solo".into())).unwrap();
        assert_eq!(a.user_info.project_name.as_deref(), Some("Solo"));
        assert_eq!(a.responses, UserResponses::default());
    }
}
