//! Email rendering using Tera
//!
//! Builds the subject line and HTML body of an alert analysis notification.

use chrono::{DateTime, Local};
use tera::{Context, Tera};

use crate::{
    report::AnalysisResult,
    text::{clean_text, format_html_text},
    Error, Result,
};

const SUBJECT_PREFIX: &str = "Alert Analysis: ";
const SUBJECT_DESCRIPTION_LIMIT: usize = 50;

// The `.html` name turns on Tera's autoescaping for every value except `| safe`
const EMAIL_TEMPLATE_NAME: &str = "alert_analysis.html";

const EMAIL_TEMPLATE: &str = r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto;">
    <h2 style="color: #d9534f;">Alert Analysis Report</h2>
    <div style="background-color: #f8f9fa; padding: 15px; border-radius: 4px; margin-bottom: 20px;">
        <p><strong>Alert Description:</strong> {{ description }}</p>
        <p><strong>Analysis Time:</strong> {{ analyzed_at }}</p>
    </div>
    <div style="border-left: 4px solid #d9534f; padding-left: 15px; margin-bottom: 20px;">
        <h3 style="color: #d9534f;">Problem:</h3>
        <p>{{ problem }}</p>
    </div>
    <div style="border-left: 4px solid #f0ad4e; padding-left: 15px; margin-bottom: 20px;">
        <h3 style="color: #f0ad4e;">Cause of Problem:</h3>
        <p>{{ cause }}</p>
    </div>
    <div style="border-left: 4px solid #5cb85c; padding-left: 15px;">
        <h3 style="color: #5cb85c;">Solution:</h3>
        {{ solution_html | safe }}
    </div>
</body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Subject line: the cleaned description, cut to 50 characters
pub fn email_subject(alert_description: &str) -> String {
    let description = clean_text(alert_description);
    if description.chars().count() > SUBJECT_DESCRIPTION_LIMIT {
        let cut: String = description.chars().take(SUBJECT_DESCRIPTION_LIMIT).collect();
        format!("{}{}...", SUBJECT_PREFIX, cut)
    } else {
        format!("{}{}", SUBJECT_PREFIX, description)
    }
}

/// Render the notification email for one analysis
pub fn render_email(
    alert_description: &str,
    analysis: &AnalysisResult,
    analyzed_at: DateTime<Local>,
) -> Result<EmailContent> {
    let mut tera = Tera::default();
    tera.add_raw_template(EMAIL_TEMPLATE_NAME, EMAIL_TEMPLATE)
        .map_err(|e| Error::Template(format!("Failed to parse email template: {}", e)))?;

    let mut context = Context::new();
    context.insert("description", &clean_text(alert_description));
    context.insert(
        "analyzed_at",
        &analyzed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    context.insert("problem", &clean_text(&analysis.problem));
    context.insert("cause", &clean_text(&analysis.cause));
    context.insert("solution_html", &format_html_text(&analysis.solution));

    let html = tera
        .render(EMAIL_TEMPLATE_NAME, &context)
        .map_err(|e| Error::Template(format!("Failed to render email template: {}", e)))?;

    Ok(EmailContent {
        subject: email_subject(alert_description),
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            problem: "CPU <b>at</b> 97%".to_string(),
            cause: "Batch job & cron overlap".to_string(),
            solution: "1. Stop the job\n2. Add a CPU limit".to_string(),
        }
    }

    #[test]
    fn test_subject_truncation() {
        assert_eq!(email_subject("Disk full"), "Alert Analysis: Disk full");

        let long = "a".repeat(60);
        assert_eq!(
            email_subject(&long),
            format!("Alert Analysis: {}...", "a".repeat(50))
        );
        assert_eq!(
            email_subject(&"b".repeat(50)),
            format!("Alert Analysis: {}", "b".repeat(50))
        );
    }

    #[test]
    fn test_render_email() {
        let time = Local.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap();
        let email = render_email("<h1>CPU</h1>\nusage high", &analysis(), time).unwrap();

        assert_eq!(email.subject, "Alert Analysis: CPU usage high");
        assert!(email.html.contains("<strong>Alert Description:</strong> CPU usage high"));
        assert!(email.html.contains("2024-05-01 14:30:00"));
        assert!(email.html.contains("<p>CPU at 97%</p>"));
        assert!(email.html.contains("Batch job &amp; cron overlap"));
        assert!(email
            .html
            .contains("<ol><li>Stop the job</li><li>Add a CPU limit</li></ol>"));
    }
}
