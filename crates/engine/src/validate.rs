//! Structural checks applied before any credential lookup or dispatch.

use formgate_types::{OperationKind, OperationRequest};

use crate::error::TranslationError;

pub const MAX_PAGE_SIZE: u32 = 5000;

pub fn validate(request: &OperationRequest) -> Result<(), TranslationError> {
    let kind = request.kind();
    if let Some(form_id) = request.form_id() {
        if form_id.trim().is_empty() {
            return Err(TranslationError::missing_field(kind, "formId"));
        }
    }

    match request {
        OperationRequest::GetResponses(input) => match input.page_size {
            Some(size) if !(1..=MAX_PAGE_SIZE).contains(&size) => Err(TranslationError::invalid_value(
                kind,
                "pageSize",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {size}"),
            )),
            _ => Ok(()),
        },
        OperationRequest::AddItem(input) if input.item.title.trim().is_empty() => {
            Err(TranslationError::missing_field(OperationKind::AddItem, "item.title"))
        }
        _ => Ok(()),
    }
}
