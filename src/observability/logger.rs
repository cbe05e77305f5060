//! Structured JSON logging
//!
//! One JSON object per line on stderr, keys emitted in a fixed order
//! (timestamp, level, component, message, then fields sorted by name) so log
//! lines diff cleanly and tests can assert on them. Logging is synchronous;
//! the pipeline stages are coarse enough that buffering is not worth the
//! complexity.

use std::io::Write;

use chrono::Utc;

/// Log severity, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// Component-scoped logger. Cheap to clone; each instance carries only its
/// component label and minimum severity.
#[derive(Debug, Clone)]
pub struct Logger {
    component: String,
    min_severity: Severity,
}

impl Logger {
    /// Creates a logger for a component at the default `Info` level.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            min_severity: Severity::Info,
        }
    }

    /// Sets the minimum severity emitted.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn debug(&self, message: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, message, fields);
    }

    fn log(&self, severity: Severity, message: &str, fields: &[(&str, &str)]) {
        if severity < self.min_severity {
            return;
        }
        let line = format_line(severity, &self.component, message, fields);
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        // A failed log write is not worth failing the operation over.
        let _ = writeln!(handle, "{line}");
    }
}

/// Renders one log line. Fixed keys first, then fields sorted by name.
fn format_line(severity: Severity, component: &str, message: &str, fields: &[(&str, &str)]) -> String {
    let mut line = String::with_capacity(128);
    line.push('{');
    push_pair(&mut line, "ts", &Utc::now().to_rfc3339());
    line.push(',');
    push_pair(&mut line, "level", severity.as_str());
    line.push(',');
    push_pair(&mut line, "component", component);
    line.push(',');
    push_pair(&mut line, "msg", message);

    let mut sorted: Vec<(&str, &str)> = fields.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in sorted {
        line.push(',');
        push_pair(&mut line, key, value);
    }

    line.push('}');
    line
}

fn push_pair(line: &mut String, key: &str, value: &str) {
    push_escaped(line, key);
    line.push(':');
    push_escaped(line, value);
}

fn push_escaped(line: &mut String, text: &str) {
    line.push('"');
    for c in text.chars() {
        match c {
            '"' => line.push_str("\\\""),
            '\\' => line.push_str("\\\\"),
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            '\t' => line.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                line.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => line.push(c),
        }
    }
    line.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_has_fixed_key_order() {
        let line = format_line(Severity::Info, "schema", "loaded", &[]);
        let ts = line.find("\"ts\"").unwrap();
        let level = line.find("\"level\"").unwrap();
        let component = line.find("\"component\"").unwrap();
        let msg = line.find("\"msg\"").unwrap();
        assert!(ts < level && level < component && component < msg);
    }

    #[test]
    fn fields_sorted_by_name() {
        let line = format_line(
            Severity::Info,
            "schema",
            "done",
            &[("zeta", "1"), ("alpha", "2")],
        );
        assert!(line.find("\"alpha\"").unwrap() < line.find("\"zeta\"").unwrap());
    }

    #[test]
    fn values_are_escaped() {
        let line = format_line(Severity::Error, "schema", "bad \"name\"\n", &[]);
        assert!(line.contains("bad \\\"name\\\"\\n"));
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["msg"], "bad \"name\"\n");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }
}
