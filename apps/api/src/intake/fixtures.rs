// Canned results returned by the intake placeholders until real OCR and
// parsing backends are wired in.

use crate::resume::models::{
    AboutData, ContactInfo, EducationData, HeaderData, InternData, InternItem, JobInfo,
    ProjectItem, ProjectsData, ResumeData, SkillsData,
};

pub const OCR_TEXT: &str = "\
Jordan Lee
Software Engineer
Phone: 555-0100
Email: jordan.lee@example.com
WeChat: jordanlee

Education
2018-2022 State University, B.Sc. Computer Science

Skills
- JavaScript/TypeScript
- React/Vue.js
- Node.js
- Python
- MySQL/MongoDB

Experience
2022.07-present ABC Technology Co. Frontend Engineer
- Owned frontend development of the main product
- Took part in system architecture and technology selection
- Improved page performance and user experience

Projects
Online Learning Platform
Stack: React + TypeScript + Node.js
- Built a complete online learning system
- Implemented video playback and online quizzes
- Supported desktop and mobile layouts";

pub const OCR_CONFIDENCE: f64 = 0.95;
pub const PARSE_CONFIDENCE: f64 = 0.92;
pub const PARSE_TOKENS_USED: u32 = 1250;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Structured form of `OCR_TEXT`.
pub fn parsed_resume() -> ResumeData {
    ResumeData {
        header: HeaderData {
            name: "Jordan Lee".into(),
            contact: ContactInfo {
                phone: "555-0100".into(),
                email: "jordan.lee@example.com".into(),
                wechat: "jordanlee".into(),
                ..Default::default()
            },
            job_info: JobInfo {
                position: "Software Engineer".into(),
                ..Default::default()
            },
        },
        about: AboutData {
            title: "About".into(),
            content: String::new(),
        },
        education: EducationData {
            title: "Education".into(),
            school: "State University".into(),
            period: "2018-2022".into(),
            details: "B.Sc. Computer Science".into(),
        },
        skills: SkillsData {
            title: "Skills".into(),
            items: strings(&[
                "JavaScript/TypeScript",
                "React/Vue.js",
                "Node.js",
                "Python",
                "MySQL/MongoDB",
            ]),
        },
        intern: InternData {
            title: "Experience".into(),
            items: vec![InternItem {
                company: "ABC Technology Co.".into(),
                position: "Frontend Engineer".into(),
                period: "2022.07-present".into(),
                responsibilities: strings(&[
                    "Owned frontend development of the main product",
                    "Took part in system architecture and technology selection",
                    "Improved page performance and user experience",
                ]),
                ..Default::default()
            }],
        },
        projects: ProjectsData {
            title: "Projects".into(),
            items: vec![ProjectItem {
                name: "Online Learning Platform".into(),
                tech_stack: "React + TypeScript + Node.js".into(),
                features: strings(&[
                    "Built a complete online learning system",
                    "Implemented video playback and online quizzes",
                    "Supported desktop and mobile layouts",
                ]),
                ..Default::default()
            }],
        },
    }
}
