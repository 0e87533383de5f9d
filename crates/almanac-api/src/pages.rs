//! Server-rendered HTML. The calendar widget itself renders client-side from
//! the embedded event list.

use axum::response::Html;

use almanac_types::api::EventResponse;
use almanac_types::{Account, Event};

pub fn login(message: Option<&str>) -> Html<String> {
    Html(layout(
        "Log in",
        &format!(
            r#"<h1>Log in</h1>
{flash}
<form method="post" action="/login">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Log in</button>
</form>
<p><a href="/sign_up">Create an account</a></p>"#,
            flash = flash(message),
        ),
    ))
}

pub fn sign_up(message: Option<&str>) -> Html<String> {
    Html(layout(
        "Sign up",
        &format!(
            r#"<h1>Sign up</h1>
{flash}
<form method="post" action="/sign_up">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  <label>Confirm password <input name="confirm_password" type="password" required></label>
  <button type="submit">Sign up</button>
</form>
<p><a href="/login">Back to log in</a></p>"#,
            flash = flash(message),
        ),
    ))
}

pub fn calendar(account: &Account, events: &[Event]) -> anyhow::Result<Html<String>> {
    let feed: Vec<EventResponse> = events.iter().map(EventResponse::from).collect();
    let feed_json = script_safe(&serde_json::to_string(&feed)?);

    Ok(Html(layout(
        "Calendar",
        &format!(
            r#"<header>
  <span>Signed in as {username}</span>
  <a href="/logout">Log out</a>
</header>
<section>
  <form method="post" action="/upload_csv" enctype="multipart/form-data">
    <input type="file" name="csv_file" accept=".csv">
    <button type="submit">Import CSV</button>
  </form>
  <form method="post" action="/delete_all" onsubmit="return confirm('Delete every schedule?');">
    <button type="submit">Delete all</button>
  </form>
  <a href="/download">Guide</a>
  <a href="/download1">CSV template</a>
</section>
<div id="calendar" data-feed="/events"></div>
<script>window.ALMANAC_EVENTS = {feed_json};</script>"#,
            username = escape_html(&account.username),
        ),
    )))
}

/// Response for form posts that end with a browser alert and a redirect home.
pub fn alert_and_return(message: &str) -> Html<String> {
    let literal = script_safe(&serde_json::Value::from(message).to_string());
    Html(format!(
        r#"
<script>
    alert({literal});
    window.location.href = "/";
</script>
"#
    ))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · Almanac</title>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn flash(message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<p class="flash">{}</p>"#, escape_html(m)))
        .unwrap_or_default()
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON is valid JS, but `</script>` inside a string would end the tag early.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}
