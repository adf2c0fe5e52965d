use serde_json::{Map, Value};
use taskboard_core::{TaskboardError, TaskboardResult};

use crate::{
    column::ColumnId,
    ticket::{validate_description, validate_title, TicketPriority},
    user::UserId,
};

/// Three-state update for a nullable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }
}

/// Keys dropped from a patch without error.
const IMMUTABLE_KEYS: &[&str] = &[
    "id",
    "createdAt",
    "created_at",
    "updatedAt",
    "updated_at",
    "createdBy",
    "created_by",
    "board",
    "boardId",
    "board_id",
];

/// Validated partial update of a ticket.
///
/// Changing `column` here only re-points the ticket; positions are the move
/// operation's business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub assignee: FieldUpdate<UserId>,
    pub column: Option<ColumnId>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && !self.assignee.is_change()
            && self.column.is_none()
    }

    /// Build an update from a loosely-typed JSON patch.
    pub fn from_json(patch: Value) -> TaskboardResult<Self> {
        let Value::Object(fields) = patch else {
            return Err(TaskboardError::validation(
                "patch",
                "Update must be a JSON object",
            ));
        };
        Self::from_fields(fields)
    }

    fn from_fields(fields: Map<String, Value>) -> TaskboardResult<Self> {
        let mut update = TicketUpdate::default();

        for (key, value) in fields {
            match key.as_str() {
                "title" => {
                    let raw = expect_str(&key, &value)?;
                    update.title = Some(validate_title(raw)?);
                }
                "description" => {
                    let raw = match &value {
                        Value::Null => "",
                        other => expect_str(&key, other)?,
                    };
                    update.description = Some(validate_description(raw)?);
                }
                "priority" => {
                    let raw = expect_str(&key, &value)?;
                    update.priority = Some(TicketPriority::parse(raw)?);
                }
                "assignee" => {
                    update.assignee = match &value {
                        Value::Null => FieldUpdate::Clear,
                        other => FieldUpdate::Set(parse_id(&key, other)?),
                    };
                }
                "column" | "columnId" | "column_id" => {
                    update.column = Some(parse_id("column", &value)?);
                }
                k if IMMUTABLE_KEYS.contains(&k) => {
                    tracing::debug!("Ignoring immutable ticket field '{}' in update", k);
                }
                other => {
                    return Err(TaskboardError::validation(
                        other,
                        format!("Field '{}' cannot be updated", other),
                    ));
                }
            }
        }

        Ok(update)
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> TaskboardResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| TaskboardError::validation(field, "Expected a string"))
}

fn parse_id(field: &str, value: &Value) -> TaskboardResult<uuid::Uuid> {
    expect_str(field, value)?
        .parse()
        .map_err(|_| TaskboardError::validation(field, "Expected a valid id"))
}
