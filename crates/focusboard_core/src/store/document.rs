//! Update operator evaluation over JSON documents.
//!
//! The same evaluator runs against projection snapshots and stored bodies,
//! so both sides agree on what an operator means.

use super::{Document, StoreError, StoreResult, UpdateOp, ID_FIELD};
use serde_json::{Map, Value};

/// Resolves a dotted field path.
pub fn lookup<'d>(doc: &'d Document, field: &str) -> Option<&'d Value> {
    field
        .split('.')
        .try_fold(doc, |current, segment| current.get(segment))
}

/// Applies operators to `doc` in order.
///
/// On error `doc` may be partially updated; callers apply to a scratch copy
/// or inside a transaction.
pub fn apply_update(doc: &mut Document, ops: &[UpdateOp]) -> StoreResult<()> {
    for op in ops {
        apply_one(doc, op)?;
    }
    Ok(())
}

fn apply_one(doc: &mut Document, op: &UpdateOp) -> StoreResult<()> {
    let field = op.field();
    if field.is_empty() || field.split('.').any(str::is_empty) {
        return Err(invalid(field, "empty path segment"));
    }
    if field == ID_FIELD {
        return Err(invalid(field, "document id is immutable"));
    }

    match op {
        UpdateOp::Set { value, .. } => {
            *slot_mut(doc, field)? = value.clone();
        }
        UpdateOp::Inc { delta, .. } => {
            if !delta.is_finite() {
                return Err(invalid(field, "increment must be finite"));
            }
            let slot = slot_mut(doc, field)?;
            let current = match &*slot {
                Value::Null => 0.0,
                Value::Number(number) => number
                    .as_f64()
                    .ok_or_else(|| invalid(field, "value is not representable as f64"))?,
                _ => return Err(invalid(field, "increment target is not a number")),
            };
            *slot = Value::from(current + delta);
        }
        UpdateOp::Push { value, .. } => {
            let slot = slot_mut(doc, field)?;
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            slot.as_array_mut()
                .ok_or_else(|| invalid(field, "push target is not an array"))?
                .push(value.clone());
        }
        UpdateOp::Pull { value, .. } => {
            let pointer = format!("/{}", field.replace('.', "/"));
            match doc.pointer_mut(&pointer) {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => items.retain(|item| item != value),
                Some(_) => return Err(invalid(field, "pull target is not an array")),
            }
        }
    }
    Ok(())
}

/// Walks to the addressed field, creating intermediate objects and a null
/// leaf when absent.
fn slot_mut<'d>(doc: &'d mut Document, field: &str) -> StoreResult<&'d mut Value> {
    let mut current = doc;
    for segment in field.split('.') {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        let object = current
            .as_object_mut()
            .ok_or_else(|| invalid(field, "path crosses a non-object value"))?;
        current = object.entry(segment.to_string()).or_insert(Value::Null);
    }
    Ok(current)
}

fn invalid(field: &str, reason: &'static str) -> StoreError {
    StoreError::InvalidOperator {
        field: field.to_string(),
        reason,
    }
}
