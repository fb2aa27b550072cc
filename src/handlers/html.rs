use crate::models::confirm::Navigation;

pub fn escape(text: &str) -> String {
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

pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{}</title>
</head>
<body>
{}
</body>
</html>
"#,
        escape(title),
        body
    )
}

/// Status page that sends the browser on after `navigation.delay`.
///
/// Meta refresh only takes whole seconds; the delay is rounded up.
pub fn redirect_page(status: &str, navigation: &Navigation) -> String {
    let seconds = navigation.delay.as_millis().div_ceil(1000);
    let route = escape(&navigation.route);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta http-equiv="refresh" content="{seconds};url={route}">
    <title>Redirecting...</title>
</head>
<body>
    <p id="status">{status}</p>
    <p>If you are not redirected, <a href="{route}">click here</a>.</p>
</body>
</html>
"#,
        status = escape(status),
    )
}
