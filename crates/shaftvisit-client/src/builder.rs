//! The in-progress visit draft.
//!
//! One [`VisitRecordBuilder`] exists per active form session.  Field
//! updates are deliberately unvalidated so the user can fill the form in
//! any order; [`VisitRecordBuilder::validate`] runs at submission time and
//! reports every missing required field at once.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use shaftvisit_shared::{
    Category, FieldError, Location, Priority, Shaft, VisitDetail, VisitHeader,
};

/// Legal mutations of the draft header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderField {
    EmployeeCode(String),
    VisitDate(DateTime<Utc>),
    EntryTime(DateTime<Utc>),
    ExitTime(DateTime<Utc>),
    Comment(String),
}

/// Legal mutations of one detail line.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailField {
    Category(Category),
    Priority(Priority),
    Shaft(Shaft),
    Location(Location),
    FullComment(String),
    ImagePath(String),
    EmployeeCode(String),
}

/// Holds exactly one draft [`VisitHeader`] with its detail lines.
pub struct VisitRecordBuilder {
    draft: VisitHeader,
}

impl VisitRecordBuilder {
    /// Start a fresh draft for the given identity: one blank detail line,
    /// current timestamps for visit date and entry/exit times.
    pub fn new_draft(employee_code: &str, device_id: &str) -> Self {
        let now = Utc::now();
        Self {
            draft: VisitHeader {
                id: Uuid::new_v4(),
                employee_code: employee_code.to_string(),
                device_id: device_id.to_string(),
                visit_date: Some(now),
                entry_time: Some(now),
                exit_time: Some(now),
                comment: String::new(),
                is_sync: false,
                date_sync: None,
                visit_details: vec![VisitDetail::blank(employee_code, now)],
            },
        }
    }

    /// The current draft.
    pub fn draft(&self) -> &VisitHeader {
        &self.draft
    }

    /// Apply a header mutation.  No validation happens here.
    pub fn set_header(&mut self, field: HeaderField) {
        match field {
            HeaderField::EmployeeCode(v) => self.draft.employee_code = v,
            HeaderField::VisitDate(v) => self.draft.visit_date = Some(v),
            HeaderField::EntryTime(v) => self.draft.entry_time = Some(v),
            HeaderField::ExitTime(v) => self.draft.exit_time = Some(v),
            HeaderField::Comment(v) => self.draft.comment = v,
        }
    }

    /// Apply a mutation to the detail line at `index`.
    ///
    /// Returns `false` when no such line exists.
    pub fn set_detail(&mut self, index: usize, field: DetailField) -> bool {
        let Some(detail) = self.draft.visit_details.get_mut(index) else {
            tracing::warn!(index, "detail update for missing line ignored");
            return false;
        };

        match field {
            DetailField::Category(v) => detail.category = Some(v),
            DetailField::Priority(v) => detail.priority = Some(v),
            DetailField::Shaft(v) => detail.shaft = Some(v),
            DetailField::Location(v) => detail.location = Some(v),
            DetailField::FullComment(v) => detail.full_comment = v,
            DetailField::ImagePath(v) => detail.image_path = v,
            DetailField::EmployeeCode(v) => detail.employee_code = v,
        }
        true
    }

    /// Append another blank detail line inheriting the header's employee
    /// code.  Returns its index.
    pub fn add_detail(&mut self) -> usize {
        let detail = VisitDetail::blank(&self.draft.employee_code, Utc::now());
        self.draft.visit_details.push(detail);
        self.draft.visit_details.len() - 1
    }

    /// Collect every missing required field across the header and all
    /// detail lines.  An empty result means the draft is submittable.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.draft.employee_code.trim().is_empty() {
            errors.push(FieldError::header("employeeCode"));
        }
        if self.draft.device_id.trim().is_empty() {
            errors.push(FieldError::header("deviceId"));
        }
        if self.draft.visit_date.is_none() {
            errors.push(FieldError::header("visitDate"));
        }
        if self.draft.entry_time.is_none() {
            errors.push(FieldError::header("entryTime"));
        }

        for (i, detail) in self.draft.visit_details.iter().enumerate() {
            if detail.category.is_none() {
                errors.push(FieldError::detail(i, "category"));
            }
            if detail.priority.is_none() {
                errors.push(FieldError::detail(i, "priority"));
            }
            if detail.shaft.is_none() {
                errors.push(FieldError::detail(i, "shaft"));
            }
            if detail.location.is_none() {
                errors.push(FieldError::detail(i, "location"));
            }
        }

        errors
    }

    /// Discard the current draft and start a new one for the same identity.
    /// Called after a submission resolves (synced or queued).
    pub fn reset(&mut self) {
        *self = Self::new_draft(&self.draft.employee_code, &self.draft.device_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_builder() -> VisitRecordBuilder {
        let mut builder = VisitRecordBuilder::new_draft("EMP-001", "DEV-1-abc");
        builder.set_detail(0, DetailField::Category(Category::Maintenance));
        builder.set_detail(0, DetailField::Priority(Priority::High));
        builder.set_detail(0, DetailField::Shaft(Shaft::Sob));
        builder.set_detail(0, DetailField::Location(Location::Nkana));
        builder
    }

    #[test]
    fn new_draft_has_one_blank_detail() {
        let builder = VisitRecordBuilder::new_draft("EMP-001", "DEV-1-abc");
        let draft = builder.draft();

        assert_eq!(draft.visit_details.len(), 1);
        assert_eq!(draft.visit_details[0].employee_code, "EMP-001");
        assert!(draft.visit_date.is_some());
        assert!(!draft.is_sync);
    }

    #[test]
    fn filled_draft_validates_clean() {
        assert!(filled_builder().validate().is_empty());
    }

    #[test]
    fn validation_collects_every_missing_field() {
        let mut builder = VisitRecordBuilder::new_draft("", "DEV-1-abc");
        builder.add_detail();
        builder.set_detail(1, DetailField::Category(Category::Inspection));

        let errors = builder.validate();
        let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();

        // Header: employee code missing.  Detail 0: all four.  Detail 1:
        // three remaining.
        assert!(rendered.contains(&"employeeCode is required".to_string()));
        assert!(rendered.contains(&"visitDetails[0].category is required".to_string()));
        assert!(rendered.contains(&"visitDetails[1].priority is required".to_string()));
        assert!(!rendered.contains(&"visitDetails[1].category is required".to_string()));
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn whitespace_employee_code_is_missing() {
        let builder = VisitRecordBuilder::new_draft("   ", "DEV-1-abc");
        let errors = builder.validate();
        assert!(errors.contains(&FieldError::header("employeeCode")));
    }

    #[test]
    fn out_of_range_detail_update_is_ignored() {
        let mut builder = filled_builder();
        assert!(!builder.set_detail(5, DetailField::FullComment("x".into())));
        assert!(builder.validate().is_empty());
    }

    #[test]
    fn reset_keeps_identity_but_discards_content() {
        let mut builder = filled_builder();
        builder.set_header(HeaderField::Comment("old draft".into()));
        let old_id = builder.draft().id;

        builder.reset();

        let draft = builder.draft();
        assert_ne!(draft.id, old_id);
        assert_eq!(draft.employee_code, "EMP-001");
        assert_eq!(draft.device_id, "DEV-1-abc");
        assert!(draft.comment.is_empty());
        assert_eq!(draft.visit_details.len(), 1);
        assert!(draft.visit_details[0].category.is_none());
    }
}
