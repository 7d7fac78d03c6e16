// actions/mod.rs - The action catalog
//
// Every operation the proxy exposes is one row in `CATALOG`. The dispatcher
// never branches on an action name; it reads the row and applies the same
// gates to all of them.

mod catalog;

use axum::http::Method;

pub use catalog::CATALOG;

/// Which secret the outbound request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSelector {
    /// Full-privilege backend key
    Admin,
    /// Read-only token for one named dataset
    Dataset(&'static str),
}

/// Query parameters that are substituted into the path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathParam {
    Table,
    Filename,
}

impl PathParam {
    pub fn name(self) -> &'static str {
        match self {
            PathParam::Table => "table",
            PathParam::Filename => "filename",
        }
    }

    /// `.` and `..` survive percent-encoding and the URL parser resolves
    /// them, which would move the request to a different backend path.
    pub fn accepts(self, value: &str) -> bool {
        !matches!(value, "." | "..")
    }

    fn placeholder(self) -> &'static str {
        match self {
            PathParam::Table => "{table}",
            PathParam::Filename => "{filename}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Nothing is forwarded
    None,
    /// Inbound JSON (if any) is re-serialized as the outbound body
    Json,
    /// Raw multipart bytes and their Content-Type are forwarded untouched
    Multipart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Json,
    Binary,
}

#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub name: &'static str,
    pub method: Method,
    /// Backend path, relative to the base URL. May contain `{table}` and `{filename}`.
    pub path: &'static str,
    pub params: &'static [PathParam],
    pub credential: CredentialSelector,
    pub body: BodyMode,
    pub response: ResponseMode,
    /// Subject to the admin role gate when one is configured
    pub admin: bool,
}

impl ActionSpec {
    /// Fill the path template. Values come from the caller, so each one is
    /// percent-encoded as a single path segment.
    pub fn render_path<'a, F>(&self, mut value_of: F) -> String
    where
        F: FnMut(PathParam) -> &'a str,
    {
        let mut path = self.path.to_string();
        for param in self.params {
            let encoded = encode_segment(value_of(*param));
            path = path.replace(param.placeholder(), &encoded);
        }
        path
    }
}

/// Look an action up by name.
pub fn lookup(name: &str) -> Option<&'static ActionSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Every dataset that has its own read token, in catalog order.
pub fn datasets() -> Vec<&'static str> {
    let mut names = Vec::new();
    for spec in CATALOG {
        if let CredentialSelector::Dataset(name) = spec.credential {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        // form encoding turns spaces into '+', which a path would keep literally
        .replace('+', "%20")
}
