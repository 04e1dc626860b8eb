//! String-templated HTML pages.
//!
//! One shared shell plus small fragment builders; values interpolated
//! into markup go through `esc` first.

use anketo_core::ItemType;
use axum::response::Html;

/// Wrap page content in the shared shell.
pub fn render_page(title: &str, content: &str) -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="icon" href="data:,">
<title>{title} — anketo</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         background: #eef4f2; color: #333; line-height: 1.6; }}
  .header {{ background: #4e8076; color: #fff; padding: 16px 32px; }}
  .header a {{ color: #fff; text-decoration: none; font-weight: 600; font-size: 18px; }}
  .container {{ max-width: 760px; margin: 24px auto; padding: 0 16px; }}
  .card {{ background: #fff; border-radius: 8px; padding: 24px 28px;
          box-shadow: 0 1px 3px rgba(0,0,0,0.1); }}
  .card h2 {{ font-size: 20px; margin-bottom: 16px; }}
  .menu {{ display: grid; gap: 10px; }}
  .menu a {{ display: block; background: #9dbbc9; color: #223; padding: 12px 16px;
            border-radius: 6px; text-decoration: none; font-weight: 600; }}
  .menu a:hover {{ background: #b2ced6; }}
  .banner {{ background: #f3f7f6; border: 1px solid #d5e3df; border-radius: 6px;
            padding: 10px 14px; margin-top: 18px; font-size: 14px; }}
  .alert {{ border-radius: 6px; padding: 10px 14px; margin-bottom: 10px; font-size: 14px; }}
  .alert.success {{ background: #d4edda; color: #155724; }}
  .alert.danger  {{ background: #f8d7da; color: #721c24; }}
  .alert.info    {{ background: #d8e6ee; color: #1b4a63; }}
  label {{ display: block; font-size: 13px; color: #567; margin: 12px 0 4px; }}
  input, textarea {{ width: 100%; padding: 8px 10px; border: 1px solid #c6d4d0;
                    border-radius: 5px; font-size: 14px; font-family: inherit; }}
  textarea {{ min-height: 220px; font-family: ui-monospace, monospace; }}
  button {{ margin-top: 16px; background: #4e8076; color: #fff; border: none;
           border-radius: 5px; padding: 10px 18px; font-size: 14px; cursor: pointer; }}
  button:hover {{ background: #5d968a; }}
  table {{ width: 100%; border-collapse: collapse; font-size: 14px; margin-top: 8px; }}
  th {{ text-align: left; padding: 8px 12px; border-bottom: 2px solid #eee; color: #789; }}
  td {{ padding: 6px 12px; border-bottom: 1px solid #f0f0f0; }}
  details {{ margin-bottom: 10px; background: #f8fafa; border-radius: 6px; padding: 8px 12px; }}
  summary {{ cursor: pointer; font-weight: 600; }}
  .muted {{ color: #95a5a6; font-size: 13px; }}
  .links {{ margin-top: 20px; }}
  .links a {{ color: #4e8076; margin-right: 16px; }}
</style>
</head>
<body>
<div class="header"><a href="/">anketo</a></div>
<div class="container">
  <div class="card">
    <h2>{title}</h2>
    {content}
  </div>
</div>
</body>
</html>
"##
    ))
}

/// A full page holding a single alert plus a way back home.
pub fn error_page(title: &str, message: &str) -> Html<String> {
    render_page(
        title,
        &format!(
            "{}<div class=\"links\"><a href=\"/\">Back to dashboard</a></div>",
            alert("danger", message)
        ),
    )
}

pub fn alert(kind: &str, message: &str) -> String {
    format!("<div class=\"alert {kind}\">{}</div>", esc(message))
}

/// Minimal HTML escaping for interpolated values.
pub fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// HTML input type for a declared item type.
pub fn input_kind(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Text => "text",
        ItemType::Date => "date",
        ItemType::Integer => "number",
    }
}
