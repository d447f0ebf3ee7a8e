use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A link shown with display text, e.g. a GitHub profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkInfo {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub wechat: String,
    pub age: String,
    pub github: LinkInfo,
    pub homepage: LinkInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobInfo {
    pub position: String,
    pub duration: String,
    pub availability: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderData {
    pub name: String,
    pub contact: ContactInfo,
    pub job_info: JobInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutData {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationData {
    pub title: String,
    pub school: String,
    pub period: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsData {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternItem {
    pub company: String,
    pub position: String,
    pub period: String,
    pub description: String,
    pub responsibilities: Vec<String>,
    pub show: bool,
}

impl Default for InternItem {
    fn default() -> Self {
        Self {
            company: String::new(),
            position: String::new(),
            period: String::new(),
            description: String::new(),
            responsibilities: Vec::new(),
            show: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternData {
    pub title: String,
    pub items: Vec<InternItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectItem {
    pub name: String,
    pub github: String,
    pub demo: String,
    pub tech_stack: String,
    pub description: String,
    pub features: Vec<String>,
    pub show: bool,
}

impl Default for ProjectItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            github: String::new(),
            demo: String::new(),
            tech_stack: String::new(),
            description: String::new(),
            features: Vec::new(),
            show: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsData {
    pub title: String,
    pub items: Vec<ProjectItem>,
}

/// The full résumé document. Section shape is checked by
/// `validation::validate_resume` before untrusted JSON becomes one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub header: HeaderData,
    pub about: AboutData,
    pub education: EducationData,
    pub skills: SkillsData,
    pub intern: InternData,
    pub projects: ProjectsData,
}

/// One named résumé version held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: String,
    pub name: String,
    pub data: ResumeData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `resume_<millis>_<9 chars>`.
pub fn new_resume_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("resume_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
}
