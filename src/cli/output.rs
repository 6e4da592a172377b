use serde::Serialize;

use crate::ops::session::Response;

/// Horizontal rule framing every response block in plain-text mode.
pub const SEPARATOR: &str = "_______________________________________";

/// JSON shape of one response, for `--json` callers. A GUI shell styles
/// `ok: false` bubbles differently; the semantics are identical.
#[derive(Serialize)]
pub struct ResponseJson<'a> {
    pub ok: bool,
    pub exit: bool,
    pub text: &'a str,
}

impl<'a> ResponseJson<'a> {
    pub fn from_response(response: &'a Response) -> Self {
        ResponseJson {
            ok: !response.error,
            exit: response.exit,
            text: &response.text,
        }
    }
}

/// Print one response block: a JSON object per line in `--json` mode,
/// otherwise the banner-framed text convention.
pub fn print_response(response: &Response, json: bool) -> Result<(), serde_json::Error> {
    if json {
        let obj = ResponseJson::from_response(response);
        println!("{}", serde_json::to_string(&obj)?);
    } else {
        println!("{SEPARATOR}");
        for line in response.text.lines() {
            println!(" {line}");
        }
        println!("{SEPARATOR}");
    }
    Ok(())
}
