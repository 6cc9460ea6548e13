// HTML rendering for GET responses

use crate::InspectedRequest;
use std::borrow::Cow;
use std::fmt::Write as _;

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Render the page describing a GET request
pub fn inspection_page(port: u16, request: &InspectedRequest) -> String {
    let client = request.client_addr.to_string();
    let mut html = String::with_capacity(1024 + request.headers.len() * 96);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Backend Server - Port {port}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        .header {{ background: #f0f0f0; padding: 10px; margin: 5px 0; border-left: 4px solid #007acc; }}
        .port {{ color: blue; font-weight: bold; }}
        .info {{ background: #e0f7fa; padding: 15px; border-radius: 5px; }}
        .client {{ color: green; }}
    </style>
</head>
<body>
    <div class="info">
        <h1>Backend Server</h1>
        <h2>Port: <span class="port">{port}</span></h2>
        <p>Client: <span class="client">{client}</span></p>
    </div>

    <h3>Received Headers:</h3>
    <div id="headers">
"#,
        port = port,
        client = escape_html(&client),
    );

    for (name, value) in &request.headers {
        let _ = writeln!(
            html,
            r#"        <div class="header"><strong>{}:</strong> {}</div>"#,
            escape_html(name),
            escape_html(value)
        );
    }

    html.push_str(
        r#"    </div>
    <hr>
    <p><em>Check the server console for the full request log</em></p>
</body>
</html>
"#,
    );
    html
}
