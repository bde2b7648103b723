use axum::{extract::State, response::Html, routing::get, Router};

use common::Snapshot;

use crate::AppState;

pub fn dashboard_router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.snapshots.current().await;
    Html(render(&snapshot))
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="60">
<title>Engulf Screener</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem; background: #111; color: #eee; }
  table { border-collapse: collapse; min-width: 48rem; }
  th, td { padding: .4rem .8rem; text-align: left; }
  th { border-bottom: 1px solid #555; }
  td { color: #000; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  .empty { color: #999; }
</style>
</head>
<body>
<h1>RSI + Engulfing Screener</h1>
"#;

/// Render the ranked snapshot as a self-contained HTML page. Each row is
/// tinted with the result's colour.
pub(crate) fn render(snapshot: &Snapshot) -> String {
    let mut page = String::with_capacity(2048 + snapshot.len() * 256);
    page.push_str(HEAD);

    let updated = if snapshot.generated_at.is_empty() {
        "never"
    } else {
        snapshot.generated_at.as_str()
    };
    page.push_str(&format!("<p>Last update: {}</p>\n", escape(updated)));

    page.push_str(
        "<table>\n<thead><tr><th>Symbol</th><th>Signal</th><th class=\"num\">RSI</th><th>Status</th></tr></thead>\n<tbody>\n",
    );

    if snapshot.is_empty() {
        page.push_str("<tr><td class=\"empty\" colspan=\"4\">No signals yet</td></tr>\n");
    }
    for r in &snapshot.results {
        page.push_str(&format!(
            "<tr style=\"background-color: {}\"><td>{}</td><td>{}</td><td class=\"num\">{:.2}</td><td>{}</td></tr>\n",
            escape(&r.color),
            escape(&r.symbol),
            escape(&r.signal),
            r.rsi,
            escape(&r.status),
        ));
    }

    page.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    page
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
