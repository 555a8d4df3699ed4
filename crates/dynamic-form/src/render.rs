use form_engine::{EngineSnapshot, FormTypeOption, SubmittedRecord};
use form_spec::{FieldKind, FieldSchema, FormSchema};

const MASK: &str = "********";

/// Plain-text view of the engine state, one item per line.
pub fn render_text(snapshot: &EngineSnapshot, form_types: &[FormTypeOption]) -> String {
    let mut lines = Vec::new();

    let Some(form_type) = &snapshot.form_type else {
        lines.push("No form type selected.".to_string());
        push_feedback(&mut lines, snapshot);
        return lines.join("\n");
    };

    let label = form_types
        .iter()
        .find(|option| &option.id == form_type)
        .map_or(form_type.as_str(), |option| option.label.as_str());
    lines.push(format!("Form: {label} ({form_type})"));

    if snapshot.loading {
        lines.push("Loading form structure...".to_string());
    } else if snapshot.schema.is_empty() {
        lines.push("No fields available.".to_string());
    } else {
        let progress = snapshot.progress;
        lines.push(format!(
            "Progress: {}% ({}/{} required)",
            progress.percent, progress.completed, progress.required
        ));
        lines.push("Fields:".to_string());
        for field in snapshot.schema.fields() {
            lines.push(field_line(field, snapshot.values.get(&field.name)));
            if let Some(error) = snapshot.errors.get(&field.name) {
                lines.push(format!("     ! {error}"));
            }
        }
    }

    push_feedback(&mut lines, snapshot);

    if snapshot.records.is_empty() {
        lines.push("Records: none".to_string());
    } else {
        lines.push(format!("Records ({}):", snapshot.records.len()));
        for (index, record) in snapshot.records.iter().enumerate() {
            let mut entry = format!(" [{index}] {}", record_summary(record, &snapshot.schema));
            if snapshot.editing.index() == Some(index) {
                entry.push_str(" (editing)");
            }
            lines.push(entry);
        }
    }

    if !snapshot.schema.is_empty() {
        lines.push(format!("Action: {}", snapshot.editing.submit_label()));
    }

    lines.join("\n")
}

pub fn render_form_types(form_types: &[FormTypeOption]) -> String {
    form_types
        .iter()
        .map(|option| format!("{}\t{}", option.id, option.label))
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_feedback(lines: &mut Vec<String>, snapshot: &EngineSnapshot) {
    if let Some(feedback) = &snapshot.feedback {
        let tag = if feedback.is_error() { "error" } else { "ok" };
        lines.push(format!("[{tag}] {}", feedback.message));
    }
}

fn field_line(field: &FieldSchema, value: Option<&str>) -> String {
    let mut entry = format!(" - {} ({}, {})", field.name, field.label, field.kind.as_str());
    if field.required {
        entry.push_str(" [required]");
    }
    if field.kind == FieldKind::Dropdown {
        entry.push_str(&format!(" {{{}}}", field.options.join(" | ")));
    }
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        entry.push_str(" = ");
        entry.push_str(display_value(field, value));
    }
    entry
}

fn display_value<'a>(field: &FieldSchema, value: &'a str) -> &'a str {
    if field.is_secret() { MASK } else { value }
}

fn record_summary(record: &SubmittedRecord, schema: &FormSchema) -> String {
    let mut parts = Vec::new();
    if schema.is_empty() {
        // without a schema nothing says which fields are secret
        for (name, value) in record.values() {
            if !value.is_empty() {
                parts.push(format!("{name}={MASK}"));
            }
        }
    } else {
        for field in schema.fields() {
            if let Some(value) = record.get(&field.name).filter(|value| !value.is_empty()) {
                parts.push(format!("{}={}", field.name, display_value(field, value)));
            }
        }
    }
    if parts.is_empty() {
        "(empty)".to_string()
    } else {
        parts.join(", ")
    }
}
