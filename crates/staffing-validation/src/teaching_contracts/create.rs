//! Create validation for teaching contracts

use serde::Deserialize;
use staffing_core::error::ValidationErrors;
use staffing_core::traits::Id;
use staffing_models::{Caller, NewLineItem, NewTeachingContract};
use validator::Validate;

use crate::base::{
    has_control_chars, merge_validator_errors, optional_date, optional_text, required_text,
    CONTROL_CHARS_MESSAGE,
};

/// Upper bound for hours on a single line item
pub const MAX_LINE_ITEM_HOURS: i64 = 10_000;

/// Raw create request as submitted by the admin form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractDraft {
    #[serde(default, alias = "lecturerId")]
    pub lecturer_id: Option<Id>,
    #[serde(default, alias = "academicYear")]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default, alias = "yearLevel")]
    pub year_level: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub courses: Vec<LineItemDraft>,
}

/// One submitted course assignment
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LineItemDraft {
    #[serde(default, alias = "courseId")]
    #[validate(range(min = 1, message = "must reference a course"))]
    pub course_id: i64,

    #[serde(default, alias = "classId")]
    #[validate(range(min = 1, message = "must reference a class"))]
    pub class_id: Option<i64>,

    #[serde(default, alias = "courseName")]
    #[validate(length(max = 255, message = "is too long (maximum is 255 characters)"))]
    pub course_name: String,

    #[serde(default)]
    #[validate(
        required(message = "can't be blank"),
        range(min = 0, max = 10000, message = "must be between 0 and 10000")
    )]
    pub hours: Option<i64>,
}

/// Validates a [`ContractDraft`] into a [`NewTeachingContract`]
///
/// The draft is accepted or rejected as a whole: one bad line item rejects
/// every line item.
pub struct CreateContractValidation<'a> {
    caller: &'a Caller,
}

impl<'a> CreateContractValidation<'a> {
    pub fn new(caller: &'a Caller) -> Self {
        Self { caller }
    }

    pub fn validate(&self, draft: &ContractDraft) -> Result<NewTeachingContract, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let lecturer_id = match draft.lecturer_id {
            Some(id) if id > 0 => Some(id),
            Some(_) => {
                errors.add("lecturer_id", "must reference a lecturer");
                None
            }
            None => {
                errors.add("lecturer_id", "can't be blank");
                None
            }
        };

        let academic_year = required_text("academic_year", draft.academic_year.as_deref(), &mut errors);
        let term = required_text("term", draft.term.as_deref(), &mut errors);
        let year_level = optional_text("year_level", draft.year_level.as_deref(), &mut errors);

        let start_date = optional_date("start_date", draft.start_date.as_deref(), &mut errors);
        let end_date = optional_date("end_date", draft.end_date.as_deref(), &mut errors);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("end_date", "must be on or after the start date");
            }
        }

        if draft.courses.is_empty() {
            errors.add("courses", "can't be empty");
        }
        let line_items: Vec<NewLineItem> = draft
            .courses
            .iter()
            .enumerate()
            .filter_map(|(index, item)| Self::validate_line_item(index, item, &mut errors))
            .collect();

        match (lecturer_id, academic_year, term) {
            (Some(lecturer_id), Some(academic_year), Some(term)) if errors.is_empty() => {
                Ok(NewTeachingContract {
                    lecturer_id,
                    created_by: self.caller.id,
                    academic_year,
                    term,
                    year_level,
                    start_date,
                    end_date,
                    line_items,
                })
            }
            _ => Err(errors),
        }
    }

    fn validate_line_item(
        index: usize,
        item: &LineItemDraft,
        errors: &mut ValidationErrors,
    ) -> Option<NewLineItem> {
        let prefix = format!("courses[{}]", index);
        let mut item_errors = ValidationErrors::new();

        if let Err(field_errors) = item.validate() {
            merge_validator_errors(&prefix, &field_errors, &mut item_errors);
        }

        let course_name = item.course_name.trim();
        if course_name.is_empty() {
            item_errors.add(format!("{}.course_name", prefix), "can't be blank");
        } else if has_control_chars(course_name) {
            item_errors.add(format!("{}.course_name", prefix), CONTROL_CHARS_MESSAGE);
        }

        let hours = item
            .hours
            .filter(|h| (0..=MAX_LINE_ITEM_HOURS).contains(h))
            .and_then(|h| i32::try_from(h).ok());

        if !item_errors.is_empty() {
            errors.merge(item_errors);
            return None;
        }

        hours.map(|hours| NewLineItem {
            course_id: item.course_id,
            class_id: item.class_id,
            course_name: course_name.to_string(),
            hours,
        })
    }
}
