//! Server-rendered admin pages.

use crate::domain::admin::AdminSession;
use crate::domain::message::{AuditStats, MessageAttempt};
use std::fmt::Write as _;
use time::macros::format_description;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:60rem;color:#222}\
table{border-collapse:collapse;width:100%}th,td{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}\
.cards{display:flex;gap:1rem}.card{border:1px solid #ddd;border-radius:6px;padding:1rem;flex:1}\
.error{color:#b00020}.failed{color:#b00020}.sent{color:#1b5e20}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape_html(title)
    )
}

#[must_use]
pub fn login_page(error: Option<&str>) -> String {
    let error = error.map(|e| format!("<p class=\"error\">{}</p>", escape_html(e))).unwrap_or_default();
    layout(
        "Admin Login",
        &format!(
            "<h1>Admin Login</h1>{error}\
             <form method=\"post\" action=\"/admin/login\">\
             <p><label>Email <input type=\"email\" name=\"email\" required></label></p>\
             <p><label>Password <input type=\"password\" name=\"password\" required></label></p>\
             <p><button type=\"submit\">Sign in</button></p></form>"
        ),
    )
}

#[must_use]
pub fn dashboard(session: &AdminSession, stats: &AuditStats, recent: &[MessageAttempt]) -> String {
    let timestamp = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    let mut body = format!(
        "<h1>Dashboard</h1><p>Signed in as {} &middot; <a href=\"/admin/logout\">Log out</a></p>\
         <div class=\"cards\"><div class=\"card\"><h2>{}</h2>Total messages</div>\
         <div class=\"card\"><h2>{}</h2>Unique recipients</div></div>",
        escape_html(&session.email),
        stats.total,
        stats.unique
    );

    body.push_str("<h2>Last 7 days</h2><table><tr><th>Date</th><th>Messages</th></tr>");
    for day in &stats.daily {
        let _ = write!(body, "<tr><td>{}</td><td>{}</td></tr>", day.date, day.count);
    }
    body.push_str("</table>");

    body.push_str("<h2>Recent messages</h2><table><tr><th>Time (UTC)</th><th>Recipient</th><th>Message</th><th>Status</th></tr>");
    for attempt in recent {
        let status = attempt.status.as_str();
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{status}\">{status}</td></tr>",
            attempt.created_at.format(timestamp).unwrap_or_default(),
            escape_html(&attempt.phone_number),
            escape_html(&attempt.message),
        );
    }
    body.push_str("</table>");

    layout("Dashboard", &body)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
