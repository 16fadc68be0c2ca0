use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// ========================================
/// Questionnaire input
/// ========================================

/// Free-form questionnaire answers. Nothing here is validated; a missing
/// answer is rendered as `undefined` in the user prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_solving: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monetization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

impl UserResponses {
    /// Fill every `None` field from `other`, keeping values already set.
    pub fn or(self, other: UserResponses) -> Self {
        Self {
            app_type: self.app_type.or(other.app_type),
            app_description: self.app_description.or(other.app_description),
            problem_solving: self.problem_solving.or(other.problem_solving),
            target_user: self.target_user.or(other.target_user),
            user_login: self.user_login.or(other.user_login),
            monetization: self.monetization.or(other.monetization),
            timeline: self.timeline.or(other.timeline),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// ========================================
/// Expected model output
/// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpPlan {
    pub summary: String,
    pub user_capabilities: Vec<String>,
    pub investment: Investment,
    pub tech_stack: TechStack,
    pub timeline: Vec<Milestone>,
    pub features: Features,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub development_cost: u64,
    pub feature_breakdown: FeatureBreakdown,
    /// Formatted as `"$X.XX - $Y.YY"`.
    pub cost_per_user: String,
    pub payment_terms: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBreakdown {
    pub base_package: BasePackage,
    #[serde(default)]
    pub additional_features: Vec<PricedFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePackage {
    pub cost: u64,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedFeature {
    pub name: String,
    pub cost: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechStack {
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    pub database: Vec<String>,
    pub hosting: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub week: u32,
    pub milestone: String,
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub core: Vec<Feature>,
    #[serde(default)]
    pub additional: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// ========================================
/// Request envelope sent to a provider
/// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tx {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub responses: UserResponses,
    #[serde(rename = "userInfo")]
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerRequest {
    pub schema_version: String,
    pub transaction: Tx,
    pub project: Project,
    pub instruction: Instruction,
    /// JSON Schema the response must satisfy.
    pub schema: Value,
}

impl PlannerRequest {
    pub fn new(
        schema_version: impl Into<String>,
        responses: UserResponses,
        user_info: UserInfo,
        dry_run: bool,
    ) -> Self {
        let instruction = Instruction {
            system: crate::prompt::build_system_prompt(),
            user: crate::prompt::build_user_prompt(&responses, &user_info),
        };
        Self {
            schema_version: schema_version.into(),
            transaction: Tx { id: Uuid::new_v4(), timestamp: Utc::now(), dry_run },
            project: Project { responses, user_info },
            instruction,
            schema: crate::schema::mvp_plan_schema().clone(),
        }
    }
}
