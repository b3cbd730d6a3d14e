use std::fmt;

/// Opaque bearer credential.
///
/// Construction rejects empty values so a `?token=` with nothing after it is
/// treated the same as a missing parameter. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialToken(String);

impl CredentialToken {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialToken(<{} bytes>)", self.0.len())
    }
}
