use serde_json::error::Category;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Secret lookup failed [secret_id={secret_id}]: {message}")]
    Lookup { secret_id: String, message: String },

    #[error("Secret payload is malformed: {reason} at line {line} column {column}")]
    Format {
        reason: String,
        line: usize,
        column: usize,
    },

    #[error("DB connection failed [host={host}, port={port}]: {message}")]
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    #[error("Query failed: {0}")]
    Query(String),
}

// serde_json quotes offending values in its messages, so only the
// category and position survive. Missing-field messages name a struct
// field and nothing from the payload.
impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        let reason = match e.classify() {
            Category::Io => "unreadable payload".to_string(),
            Category::Syntax => "invalid JSON".to_string(),
            Category::Eof => "truncated JSON".to_string(),
            Category::Data => {
                let message = e.to_string();
                match message.strip_prefix("missing field ") {
                    Some(rest) => {
                        let field = rest.split(" at line").next().unwrap_or(rest);
                        format!("missing field {}", field)
                    }
                    None => "unexpected value type".to_string(),
                }
            }
        };

        ImportError::Format {
            reason,
            line: e.line(),
            column: e.column(),
        }
    }
}
