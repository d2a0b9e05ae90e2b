//! The post form, shared by the create and edit views.
//!
//! The form binds two fields: `text`, a required char field, and `group`, an
//! optional choice over every stored group. A bound form is cleaned against
//! the current groups; the errors it collects are rendered back to the user.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::domain::{Group, Post};

pub const TEXT_FIELD: &str = "text";
pub const GROUP_FIELD: &str = "group";

const REQUIRED_MESSAGE: &str = "This field is required.";
const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field widget kinds, named the way templates and tests refer to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    CharField,
    ChoiceField,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Everything a template needs to draw one field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

/// The form as handed to templates under `form`.
#[derive(Debug, Clone, Serialize)]
pub struct FormContext {
    pub is_bound: bool,
    pub has_errors: bool,
    pub fields: BTreeMap<&'static str, FieldContext>,
}

/// Validated form output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<i64>,
}

#[derive(Debug, Validate)]
struct PostInput {
    #[validate(custom(function = "validate_not_blank"))]
    text: String,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED_MESSAGE)),
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct PostForm {
    text: String,
    group: String,
    bound: bool,
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl PostForm {
    /// An empty form for the create page.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// An unbound form pre-filled from an existing post, for the edit page.
    pub fn for_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// A form bound to submitted data. `group` is the raw choice value; blank
    /// means no group.
    pub fn bind(text: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            group: group.into(),
            bound: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn errors(&self) -> &BTreeMap<&'static str, Vec<String>> {
        &self.errors
    }

    /// Validate the bound data against the available groups.
    ///
    /// Returns the cleaned values, or `None` with `errors()` populated.
    pub fn clean(&mut self, groups: &[Group]) -> Option<CleanedPost> {
        self.errors.clear();
        if !self.bound {
            return None;
        }

        let input = PostInput {
            text: self.text.clone(),
        };
        if let Err(errors) = input.validate() {
            for error in errors.field_errors().values().flat_map(|errs| errs.iter()) {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| REQUIRED_MESSAGE.to_string());
                self.add_error(TEXT_FIELD, message);
            }
        }

        let group_id = match self.group.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    self.add_error(GROUP_FIELD, INVALID_CHOICE_MESSAGE.to_string());
                    None
                }
            },
        };

        if !self.errors.is_empty() {
            return None;
        }

        Some(CleanedPost {
            text: self.text.trim().to_string(),
            group_id,
        })
    }

    fn add_error(&mut self, field: &'static str, message: String) {
        self.errors.entry(field).or_default().push(message);
    }

    fn field_errors(&self, field: &str) -> Vec<String> {
        self.errors.get(field).cloned().unwrap_or_default()
    }

    /// Render the form for a template.
    pub fn context(&self, groups: &[Group]) -> FormContext {
        let selected = self.group.trim();
        let mut choices = vec![Choice {
            value: String::new(),
            label: "---------".to_string(),
            selected: selected.is_empty(),
        }];
        choices.extend(groups.iter().map(|group| {
            let value = group.id.to_string();
            Choice {
                selected: value == selected,
                value,
                label: group.title.clone(),
            }
        }));

        let mut fields = BTreeMap::new();
        fields.insert(
            TEXT_FIELD,
            FieldContext {
                name: TEXT_FIELD,
                label: "Post text",
                help_text: "Text of the new post",
                kind: FieldKind::CharField,
                required: true,
                value: self.text.clone(),
                errors: self.field_errors(TEXT_FIELD),
                choices: None,
            },
        );
        fields.insert(
            GROUP_FIELD,
            FieldContext {
                name: GROUP_FIELD,
                label: "Group",
                help_text: "Group the post will belong to",
                kind: FieldKind::ChoiceField,
                required: false,
                value: self.group.clone(),
                errors: self.field_errors(GROUP_FIELD),
                choices: Some(choices),
            },
        );

        FormContext {
            is_bound: self.bound,
            has_errors: !self.errors.is_empty(),
            fields,
        }
    }
}
