//! HTML pages: home and the mock login form.

use crate::oauth::coordinator::AuthorizeContext;
use crate::oauth::types::UserClaims;

const STYLE: &str = r#"<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; display: flex; justify-content: center; align-items: center; min-height: 100vh; }
.card { background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 32px; max-width: 420px; width: 100%; }
h1 { font-size: 20px; margin: 0 0 8px; color: #333; }
h3 { font-size: 15px; margin: 24px 0 8px; color: #333; }
.subtitle { color: #666; font-size: 14px; margin: 0 0 24px; }
label { display: block; font-size: 14px; font-weight: 500; margin: 12px 0 6px; color: #333; }
input[type="text"], input[type="email"] { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px; box-sizing: border-box; }
button { width: 100%; padding: 10px; background: #4a90d9; color: #fff; border: none; border-radius: 4px; font-size: 14px; font-weight: 500; cursor: pointer; margin-top: 16px; }
button:hover { background: #357abd; }
.quick button { background: #fff; color: #333; border: 1px solid #ccc; text-align: left; margin-top: 8px; }
.quick button:hover { border-width: 3px; background: #fff; }
</style>"#;

/// Render the landing page.
pub fn render_home_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Mock OAuth</title>
{STYLE}
</head>
<body>
<div class="card">
<h1>Server is up</h1>
<p class="subtitle">Mock OAuth 2.0 / OpenID Connect provider</p>
</div>
</body>
</html>"#
    )
}

/// Render the login form for an authorization request.
///
/// All parameters are HTML-escaped to prevent XSS.
pub fn render_login_page(ctx: &AuthorizeContext) -> String {
    let action = login_action(&ctx.tenant_id, &ctx.query_string);
    let quick_submit = render_quick_submit(&action, &ctx.identities);
    let client = ctx.client_id.as_deref().unwrap_or("unknown client");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Mock OAuth login</title>
{STYLE}
</head>
<body>
<div class="card">
<h1>Mock OAuth login</h1>
<p class="subtitle"><strong>{client}</strong> in directory <strong>{tenant}</strong></p>
<form id="loginForm" method="POST" action="{action}">
<label for="email">Email</label>
<input type="email" id="email" name="email" required autofocus>
<label for="given_name">Given name</label>
<input type="text" id="given_name" name="given_name" required>
<label for="family_name">Family name</label>
<input type="text" id="family_name" name="family_name" required>
<label for="account_type">Account type</label>
<input type="text" id="account_type" name="account_type" required>
<button type="submit">Sign in</button>
</form>
{quick_submit}
</div>
</body>
</html>"#,
        client = html_escape(client),
        tenant = html_escape(&ctx.tenant_id),
        action = html_escape(&action),
        quick_submit = quick_submit,
    )
}

fn login_action(tenant_id: &str, query_string: &str) -> String {
    let path = login_path(tenant_id).unwrap_or_else(|| format!("/{tenant_id}/oauth2/v2.0/login"));
    if query_string.is_empty() {
        path
    } else {
        format!("{path}?{query_string}")
    }
}

/// Login path with the tenant percent-encoded as a single path segment.
fn login_path(tenant_id: &str) -> Option<String> {
    let mut url = url::Url::parse("http://localhost/").ok()?;
    url.path_segments_mut()
        .ok()?
        .clear()
        .extend([tenant_id, "oauth2", "v2.0", "login"]);
    Some(url.path().to_owned())
}

/// One single-click form per remembered identity.
fn render_quick_submit(action: &str, identities: &[UserClaims]) -> String {
    if identities.is_empty() {
        return String::new();
    }

    let mut html = String::from("<div class=\"quick\">\n<h3>Quick Submit (History)</h3>\n");
    for user in identities {
        html.push_str(&format!(
            r#"<form method="POST" action="{action}">
<input type="hidden" name="email" value="{email}">
<input type="hidden" name="family_name" value="{family_name}">
<input type="hidden" name="given_name" value="{given_name}">
<input type="hidden" name="account_type" value="{account_type}">
<button type="submit">{given_name} {family_name} &lt;{email}&gt; ({account_type})</button>
</form>
"#,
            action = html_escape(action),
            email = html_escape(&user.email),
            family_name = html_escape(&user.family_name),
            given_name = html_escape(&user.given_name),
            account_type = html_escape(&user.account_type),
        ));
    }
    html.push_str("</div>");
    html
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
