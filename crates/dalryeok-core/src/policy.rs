/// Who is making a request, as asserted by the upstream authenticator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub email: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }
}

/// Decides whether an identity may write to the calendar.
pub trait AccessPolicy: Send + Sync {
    fn is_authorized(&self, identity: &Identity) -> bool;
}

/// Grants access to an exact list of e-mail addresses.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct EmailAllowList {
    emails: Vec<String>,
}

impl EmailAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

impl AccessPolicy for EmailAllowList {
    fn is_authorized(&self, identity: &Identity) -> bool {
        match identity.email.as_deref() {
            Some(email) => self.emails.iter().any(|allowed| allowed == email),
            None => false,
        }
    }
}

/// Nobody may write.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl AccessPolicy for DenyAll {
    fn is_authorized(&self, _identity: &Identity) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_exact_match() {
        let policy = EmailAllowList::new(["admin@example.org", "second@example.org"]);
        assert!(policy.is_authorized(&Identity::with_email("admin@example.org")));
        assert!(policy.is_authorized(&Identity::with_email("second@example.org")));
        assert!(!policy.is_authorized(&Identity::with_email("Admin@example.org")));
        assert!(!policy.is_authorized(&Identity::with_email("admin@example.org ")));
        assert!(!policy.is_authorized(&Identity::with_email("someone@example.org")));
    }

    #[test]
    fn test_anonymous_is_never_authorized() {
        let policy = EmailAllowList::new([""]);
        assert!(!policy.is_authorized(&Identity::anonymous()));
    }

    #[test]
    fn test_deny_all() {
        assert!(!DenyAll.is_authorized(&Identity::with_email("admin@example.org")));
    }
}
