//! Access-log line formats.
//!
//! A format is a template mixing literal text with `:token` or
//! `:token[arg]` placeholders. Four named presets are built in; any other
//! value of `LOG_FORMAT` is parsed as a template.
//!
//! | Token | Value |
//! |---|---|
//! | `:remote-addr` | peer address |
//! | `:remote-user` | user from HTTP Basic auth |
//! | `:date[clf\|iso\|web]` | request time (default `web`) |
//! | `:method`, `:url`, `:http-version`, `:status` | request line and status |
//! | `:res[header]`, `:req[header]` | response/request header |
//! | `:referrer`, `:user-agent` | request headers |
//! | `:response-time` | milliseconds, three decimals |
//!
//! Missing values render as `-`.

use std::time::Duration;

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};

use routekit_core::ConfigError;

const COMBINED: &str = r#":remote-addr - :remote-user [:date[clf]] ":method :url HTTP/:http-version" :status :res[content-length] ":referrer" ":user-agent""#;
const COMMON: &str = r#":remote-addr - :remote-user [:date[clf]] ":method :url HTTP/:http-version" :status :res[content-length]"#;
const SHORT: &str = ":remote-addr :remote-user :method :url HTTP/:http-version :status :res[content-length] - :response-time ms";
const TINY: &str = ":method :url :status :res[content-length] - :response-time ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateStyle {
    Clf,
    Iso,
    Web,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    RemoteAddr,
    RemoteUser,
    Date(DateStyle),
    Method,
    Url,
    HttpVersion,
    Status,
    ResHeader(String),
    ReqHeader(String),
    Referrer,
    UserAgent,
    ResponseTime,
}

/// Everything a log line can mention about one request.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub remote_addr: Option<String>,
    pub remote_user: Option<String>,
    pub time: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub http_version: &'static str,
    pub status: u16,
    pub request_headers: HeaderMap,
    pub response_headers: HeaderMap,
    pub response_time: Duration,
}

/// A parsed log-line template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFormat {
    segments: Vec<Segment>,
}

impl LogFormat {
    /// Resolves a preset name (`combined`, `common`, `short`, `tiny`) or
    /// parses `value` as a template.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let template = match value {
            "combined" => COMBINED,
            "common" => COMMON,
            "short" => SHORT,
            "tiny" => TINY,
            other => other,
        };
        Self::parse_template(template)
    }

    fn parse_template(template: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(idx) = rest.find(':') {
            let after = &rest[idx + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_lowercase() || c == '-'))
                .unwrap_or(after.len());

            if name_len == 0 {
                literal.push_str(&rest[..=idx]);
                rest = after;
                continue;
            }

            literal.push_str(&rest[..idx]);
            let name = &after[..name_len];
            let mut tail = &after[name_len..];

            let arg = match tail.strip_prefix('[') {
                Some(open) => {
                    let close = open.find(']').ok_or_else(|| {
                        ConfigError::invalid("LOG_FORMAT", template, format!("unclosed [ after :{}", name))
                    })?;
                    tail = &open[close + 1..];
                    Some(&open[..close])
                }
                None => None,
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(token(name, arg, template)?);
            rest = tail;
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(128);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::RemoteAddr => push_or_dash(&mut line, record.remote_addr.as_deref()),
                Segment::RemoteUser => push_or_dash(&mut line, record.remote_user.as_deref()),
                Segment::Date(style) => line.push_str(&format_date(&record.time, *style)),
                Segment::Method => line.push_str(&record.method),
                Segment::Url => line.push_str(&record.url),
                Segment::HttpVersion => line.push_str(record.http_version),
                Segment::Status => line.push_str(&record.status.to_string()),
                Segment::ResHeader(name) => {
                    push_or_dash(&mut line, header_str(&record.response_headers, name))
                }
                Segment::ReqHeader(name) => {
                    push_or_dash(&mut line, header_str(&record.request_headers, name))
                }
                Segment::Referrer => push_or_dash(
                    &mut line,
                    header_str(&record.request_headers, header::REFERER.as_str())
                        .or_else(|| header_str(&record.request_headers, "referrer")),
                ),
                Segment::UserAgent => push_or_dash(
                    &mut line,
                    header_str(&record.request_headers, header::USER_AGENT.as_str()),
                ),
                Segment::ResponseTime => line.push_str(&format!(
                    "{:.3}",
                    record.response_time.as_secs_f64() * 1000.0
                )),
            }
        }
        line
    }
}

fn token(name: &str, arg: Option<&str>, template: &str) -> Result<Segment, ConfigError> {
    let unknown = || ConfigError::invalid("LOG_FORMAT", template, format!("unknown token :{}", name));
    let needs_arg = || {
        ConfigError::invalid(
            "LOG_FORMAT",
            template,
            format!(":{} needs a [header] argument", name),
        )
    };

    Ok(match name {
        "remote-addr" => Segment::RemoteAddr,
        "remote-user" => Segment::RemoteUser,
        "date" => Segment::Date(match arg {
            None | Some("web") => DateStyle::Web,
            Some("clf") => DateStyle::Clf,
            Some("iso") => DateStyle::Iso,
            Some(_) => return Err(unknown()),
        }),
        "method" => Segment::Method,
        "url" => Segment::Url,
        "http-version" => Segment::HttpVersion,
        "status" => Segment::Status,
        "res" => Segment::ResHeader(arg.ok_or_else(needs_arg)?.to_ascii_lowercase()),
        "req" => Segment::ReqHeader(arg.ok_or_else(needs_arg)?.to_ascii_lowercase()),
        "referrer" => Segment::Referrer,
        "user-agent" => Segment::UserAgent,
        "response-time" => Segment::ResponseTime,
        _ => return Err(unknown()),
    })
}

fn format_date(time: &DateTime<Utc>, style: DateStyle) -> String {
    match style {
        DateStyle::Clf => time.format("%d/%b/%Y:%H:%M:%S +0000").to_string(),
        DateStyle::Iso => time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        DateStyle::Web => time.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn push_or_dash(line: &mut String, value: Option<&str>) {
    line.push_str(value.unwrap_or("-"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::TimeZone;

    fn record() -> LogRecord {
        let mut request_headers = HeaderMap::new();
        request_headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        let mut response_headers = HeaderMap::new();
        response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("4"));

        LogRecord {
            remote_addr: Some("127.0.0.1".to_string()),
            remote_user: None,
            time: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
            method: "GET".to_string(),
            url: "/ping?x=1".to_string(),
            http_version: "1.1",
            status: 200,
            request_headers,
            response_headers,
            response_time: Duration::from_micros(1500),
        }
    }

    #[test]
    fn test_combined_preset() {
        let line = LogFormat::parse("combined").unwrap().render(&record());
        assert_eq!(
            line,
            r#"127.0.0.1 - - [09/Mar/2024:14:05:07 +0000] "GET /ping?x=1 HTTP/1.1" 200 4 "-" "curl/8.0""#
        );
    }

    #[test]
    fn test_tiny_preset() {
        let line = LogFormat::parse("tiny").unwrap().render(&record());
        assert_eq!(line, "GET /ping?x=1 200 4 - 1.500 ms");
    }

    #[test]
    fn test_custom_template_with_literal_colons() {
        let format = LogFormat::parse("at :date[iso] -> :status: :req[User-Agent] 10:30").unwrap();
        assert_eq!(
            format.render(&record()),
            "at 2024-03-09T14:05:07.000Z -> 200: curl/8.0 10:30"
        );
    }

    #[test]
    fn test_default_date_is_web() {
        let format = LogFormat::parse(":date").unwrap();
        assert_eq!(format.render(&record()), "Sat, 09 Mar 2024 14:05:07 GMT");
    }

    #[test]
    fn test_missing_values_render_dash() {
        let mut rec = record();
        rec.remote_addr = None;
        rec.response_headers.clear();
        let format = LogFormat::parse(":remote-addr :remote-user :res[content-length] :referrer").unwrap();
        assert_eq!(format.render(&rec), "- - - -");
    }

    #[test]
    fn test_invalid_templates() {
        assert!(LogFormat::parse(":nope").is_err());
        assert!(LogFormat::parse(":res").is_err());
        assert!(LogFormat::parse(":res[content-length").is_err());
        assert!(LogFormat::parse(":date[unix]").is_err());
    }
}
