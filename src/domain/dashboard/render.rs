//! Usage: Server-rendered HTML for the entry page and the dashboard.

use super::DashboardSummary;
use crate::shared::html::escape;

const STYLE: &str = r#"<style>
body{font-family:system-ui,sans-serif;background:#f9fafb;color:#1f2937;margin:0}
.wrap{max-width:960px;margin:0 auto;padding:32px 16px}
.card{background:#fff;border-radius:8px;box-shadow:0 1px 4px rgba(0,0,0,.1);padding:24px;margin-bottom:24px}
.btn{display:inline-block;background:#fc4c02;color:#fff;font-weight:600;padding:10px 18px;border-radius:8px;text-decoration:none;border:0}
.btn.secondary{background:#e5e7eb;color:#1f2937}
.error{background:#fee2e2;color:#991b1b;border-radius:8px;padding:12px;margin-bottom:16px}
.notice{background:#fef3c7;color:#92400e;border-radius:8px;padding:12px;margin-bottom:16px}
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(180px,1fr));gap:16px}
.stat{border:1px solid #fed7aa;background:#fff7ed;border-radius:8px;padding:16px}
.stat .value{font-size:24px;font-weight:700;color:#fc4c02}
.activity{border:1px solid #e5e7eb;border-radius:8px;padding:16px;margin-bottom:12px}
.muted{color:#6b7280;font-size:13px}
</style>"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title>{STYLE}</head><body>{body}</body></html>",
        escape(title)
    )
}

fn describe_error(code: &str) -> String {
    let friendly = match code {
        "access_denied" => "Authorization was denied on Strava.",
        "no_code" => "Strava did not return an authorization code.",
        "auth_failed" => "Could not complete the Strava authorization. Please try again.",
        "no_token" => "No access token was received. Please try again.",
        "save_failed" => "Signed in, but the session could not be saved locally.",
        _ => "Authorization failed.",
    };
    format!("{friendly} ({})", escape(code))
}

/// Unauthenticated entry point. `error` is the raw `error` query value, if any.
pub fn entry_page(error: Option<&str>) -> String {
    let error_block = error
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|code| format!("<div class=\"error\">{}</div>", describe_error(code)))
        .unwrap_or_default();

    let body = format!(
        "<div class=\"wrap\"><div class=\"card\" style=\"max-width:420px;margin:80px auto;text-align:center\">\
<h1>Strava Data Viewer</h1>\
<p class=\"muted\">View and download your Strava activity data</p>\
{error_block}\
<a class=\"btn\" href=\"/auth/authorize\">Connect with Strava</a>\
<p class=\"muted\">You will be redirected to Strava to grant access</p>\
</div></div>"
    );
    page("Strava Data Viewer", &body)
}

/// Summary region shared by the dashboard and tests; the image export lays out the same data.
pub fn summary_section(summary: &DashboardSummary) -> String {
    let mut out = String::from("<div class=\"card\" id=\"summary\">");

    if let Some(name) = summary.athlete_name() {
        let avatar = summary
            .athlete
            .as_ref()
            .and_then(|a| a.profile.as_deref())
            .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
            .map(|url| {
                format!(
                    "<img src=\"{}\" alt=\"{}\" width=\"96\" height=\"96\" style=\"border-radius:50%;border:4px solid #fc4c02\">",
                    escape(url),
                    escape(&name)
                )
            })
            .unwrap_or_default();
        out.push_str(&format!(
            "<div style=\"display:flex;gap:16px;align-items:center\">{avatar}<div><h2>{}</h2><p class=\"muted\">Strava Athlete</p></div></div>",
            escape(&name)
        ));
    }

    if let Some(cards) = summary.stat_cards() {
        out.push_str("<h3>Total statistics</h3><div class=\"grid\">");
        for card in cards {
            out.push_str(&format!(
                "<div class=\"stat\"><div class=\"muted\">{}</div><div class=\"value\">{}</div></div>",
                escape(card.label),
                escape(&card.value)
            ));
        }
        out.push_str("</div>");
    }

    out.push_str("<h3>Recent activities</h3>");
    let rows = summary.activity_rows();
    if rows.is_empty() {
        out.push_str("<p class=\"muted\">No activities found</p>");
    }
    for row in rows {
        out.push_str(&format!(
            "<div class=\"activity\"><strong>{}</strong>\
<div class=\"grid\" style=\"margin-top:8px\">\
<div><div class=\"muted\">Distance</div>{}</div>\
<div><div class=\"muted\">Time</div>{}</div>\
<div><div class=\"muted\">Elevation</div>{}</div>\
<div><div class=\"muted\">Average speed</div>{}</div>\
</div><p class=\"muted\">{} &bull; {}</p></div>",
            escape(&row.name),
            escape(&row.distance),
            escape(&row.moving_time),
            escape(&row.elevation),
            escape(&row.average_speed),
            escape(&row.date),
            escape(&row.kind),
        ));
    }

    out.push_str("</div>");
    out
}

pub fn dashboard_page(summary: &DashboardSummary) -> String {
    let greeting = summary
        .athlete_name()
        .map(|name| format!("<p class=\"muted\">Welcome, {}</p>", escape(&name)))
        .unwrap_or_default();
    let notices: String = summary
        .notices
        .iter()
        .map(|n| format!("<div class=\"notice\">{}</div>", escape(n)))
        .collect();

    let body = format!(
        "<div class=\"wrap\">\
<div class=\"card\" style=\"display:flex;justify-content:space-between;align-items:center\">\
<div><h1>Strava Dashboard</h1>{greeting}</div>\
<div style=\"display:flex;gap:12px\">\
<a class=\"btn\" href=\"/dashboard/export\">Download Image</a>\
<form method=\"post\" action=\"/logout\" style=\"margin:0\"><button class=\"btn secondary\" type=\"submit\">Logout</button></form>\
</div></div>{notices}{}</div>",
        summary_section(summary)
    );
    page("Strava Dashboard", &body)
}
