use crate::error::ValidationError;
use crate::event::NewEvent;
use crate::key::DateKey;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_BODY_CHARS: usize = 5000;

/// Validator for event drafts.
pub struct Validator;

impl Validator {
    /// Title must be non-empty after trimming and at most 200 chars.
    pub fn validate_title(title: &str) -> Result<(), ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong(len));
        }
        Ok(())
    }

    /// Body may be empty; at most 5000 chars after trimming.
    pub fn validate_body(body: &str) -> Result<(), ValidationError> {
        let len = body.trim().chars().count();
        if len > MAX_BODY_CHARS {
            return Err(ValidationError::BodyTooLong(len));
        }
        Ok(())
    }

    pub fn validate_org_id(org_id: &str) -> Result<(), ValidationError> {
        if org_id.trim().is_empty() {
            return Err(ValidationError::EmptyOrgId);
        }
        Ok(())
    }

    /// Validate a draft, returning its canonical key.
    pub fn validate_new_event(draft: &NewEvent) -> Result<DateKey, ValidationError> {
        Self::validate_org_id(&draft.org_id)?;
        Self::validate_title(&draft.title)?;
        Self::validate_body(&draft.body)?;
        Ok(DateKey::parse_canonical(draft.date_key.trim())?)
    }
}
