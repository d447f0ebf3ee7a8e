// Résumé optimization prompt templates.

pub const OPTIMIZE_SYSTEM: &str = "\
You are a professional résumé optimization expert with extensive HR and recruiting experience. Your job is to:

1. Analyze the résumé content and the requested improvements
2. Adjust the emphasis of the résumé to the job description, if one is provided
3. Polish the wording so it reads professional and compelling
4. Highlight relevant skills and achievements
5. Keep every fact truthful and never invent experience
6. Return the complete résumé as JSON

Rules:
- Keep the original JSON structure exactly as it is
- Only improve content, never change the data format
- Every field must hold a sensible value
- Write concisely and with impact
- Emphasize quantified results and concrete contributions";

/// Builds the user prompt for one optimization request.
pub fn build_optimization_prompt(
    current_resume: &serde_json::Value,
    suggestions: Option<&str>,
    job_description: Option<&str>,
) -> String {
    let resume_json =
        serde_json::to_string_pretty(current_resume).unwrap_or_else(|_| current_resume.to_string());

    let mut prompt = format!(
        "Optimize the résumé below and return the complete optimized résumé as JSON.\n\n\
         ## Current résumé:\n```json\n{resume_json}\n```\n\n"
    );

    if let Some(suggestions) = suggestions {
        prompt.push_str(&format!("## Requested improvements:\n{suggestions}\n\n"));
    }

    if let Some(jd) = job_description {
        prompt.push_str(&format!(
            "## Target job description:\n{jd}\n\n\
             Adjust the résumé to the requirements of this role and bring forward the most relevant skills and experience.\n\n"
        ));
    }

    let focus = if job_description.is_some() {
        "Tailor the emphasis to the job requirements"
    } else {
        "General improvement of overall quality"
    };

    prompt.push_str(&format!(
        "## Requirements:\n\n\
         1. **Keep the structure**: the JSON structure must stay exactly the same\n\
         2. **Improve content**:\n\
         \x20  - Make the wording more professional and engaging\n\
         \x20  - Bring out matching skills and relevant experience\n\
         \x20  - Quantify results and contributions (performance gains, user growth, ...)\n\
         \x20  - Use industry terminology and keywords\n\
         3. **Truthfulness**: add no false information; only improve what is there\n\
         4. **Focus**: {focus}\n\n\
         ## Output format:\n\
         Return only the complete optimized JSON, with no explanation and no markdown. \
         The JSON must be valid and directly parseable."
    ));

    prompt
}
