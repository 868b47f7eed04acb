use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{confirm, output_error, output_success, warn_if_expired};
use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::editor::{coerce, FieldValue, ResourceEditor};
use crate::error::ConsoleError;
use crate::resource::{self, InputKind, ResourceDef};

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List rows (fixed page size, optional filter)")]
    List {
        #[arg(long, help = "Free-text filter")]
        filter: Option<String>,
    },

    #[command(about = "Show one entity as its edit form")]
    Show {
        #[arg(help = "Entity id")]
        id: String,
    },

    #[command(about = "Create a new entity from --set key=value pairs")]
    Create {
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    #[command(about = "Load an entity, apply --set pairs, and save")]
    Update {
        #[arg(help = "Entity id")]
        id: String,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    #[command(about = "Delete an entity (asks for confirmation)")]
    Delete {
        #[arg(help = "Entity id")]
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Attach a file to a saved image record")]
    Upload {
        #[arg(help = "Image id")]
        id: String,
        #[arg(help = "Path to the file to upload")]
        file: PathBuf,
    },
}

pub async fn handle(
    name: &str,
    cmd: ResourceCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let Some(def) = resource::find(name) else {
        let known: Vec<&str> = resource::RESOURCES.iter().map(|d| d.name).collect();
        output_error(
            &output_format,
            &format!("Unknown resource '{}'. Known resources: {}", name, known.join(", ")),
        )?;
        return Ok(());
    };

    let ctx = AppContext::initialize()?;
    let mut editor = ResourceEditor::new(Arc::clone(&ctx), def);

    let outcome = match cmd {
        ResourceCommands::List { filter } => list(&mut editor, filter, &output_format).await,
        ResourceCommands::Show { id } => show(&mut editor, &id, &output_format).await,
        ResourceCommands::Create { set } => create(&mut editor, def, &set, &output_format).await,
        ResourceCommands::Update { id, set } => {
            update(&mut editor, def, &id, &set, &output_format).await
        }
        ResourceCommands::Delete { id, yes } => delete(&mut editor, &id, yes, &output_format).await,
        ResourceCommands::Upload { id, file } => upload(&mut editor, &id, &file, &output_format).await,
    };

    if let Err(e) = outcome {
        output_error(&output_format, &e.to_string())?;
    }
    warn_if_expired(&ctx, &output_format)
}

async fn list(
    editor: &mut ResourceEditor,
    filter: Option<String>,
    output_format: &OutputFormat,
) -> Result<(), ConsoleError> {
    if let Some(filter) = filter {
        editor.set_filter(filter);
    }
    editor.list().await?;

    let def = editor.def();
    match output_format {
        OutputFormat::Json => {
            let body = json!({ def.list_key: editor.rows() });
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
        }
        OutputFormat::Text => {
            if editor.rows().is_empty() {
                println!("No {} found", def.title.to_lowercase());
            }
            for row in editor.rows() {
                let id = row[def.id_field].as_str().unwrap_or("-");
                // First three fields, mirroring the table columns.
                let cells: Vec<String> = def
                    .fields
                    .iter()
                    .take(3)
                    .map(|f| display_cell(&row[f.key]))
                    .collect();
                println!("{}  {}", id, cells.join("  "));
            }
        }
    }
    Ok(())
}

async fn show(
    editor: &mut ResourceEditor,
    id: &str,
    output_format: &OutputFormat,
) -> Result<(), ConsoleError> {
    editor.load(id).await?;
    if editor.selected_id().is_none() {
        return Err(ConsoleError::precondition(format!(
            "{} item {} not found",
            editor.def().title,
            id
        )));
    }

    let form: Vec<Value> = editor
        .form()
        .fields()
        .iter()
        .map(|f| {
            let value = editor.form().get(f.key).map(FieldValue::to_json).unwrap_or(Value::Null);
            json!({ "key": f.key, "label": f.label, "value": value })
        })
        .collect();

    match output_format {
        OutputFormat::Json => {
            let body = json!({ "id": id, "fields": form });
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
        }
        OutputFormat::Text => {
            println!("{} {}", editor.def().title, id);
            for entry in &form {
                println!("  {}: {}", entry["label"].as_str().unwrap_or(""), display_cell(&entry["value"]));
            }
        }
    }
    Ok(())
}

async fn create(
    editor: &mut ResourceEditor,
    def: &'static ResourceDef,
    set: &[String],
    output_format: &OutputFormat,
) -> Result<(), ConsoleError> {
    apply_sets(editor, def, set)?;
    editor.save().await?;
    let _ = output_success(output_format, editor.notice().unwrap_or("Saved"), None);
    Ok(())
}

async fn update(
    editor: &mut ResourceEditor,
    def: &'static ResourceDef,
    id: &str,
    set: &[String],
    output_format: &OutputFormat,
) -> Result<(), ConsoleError> {
    editor.load(id).await?;
    if editor.selected_id().is_none() {
        return Err(ConsoleError::precondition(format!("{} item {} not found", def.title, id)));
    }
    apply_sets(editor, def, set)?;
    editor.save().await?;
    let _ = output_success(output_format, editor.notice().unwrap_or("Saved"), None);
    Ok(())
}

async fn delete(
    editor: &mut ResourceEditor,
    id: &str,
    yes: bool,
    output_format: &OutputFormat,
) -> Result<(), ConsoleError> {
    if !editor.def().deletable {
        return Err(ConsoleError::precondition(format!(
            "{} cannot be deleted",
            editor.def().title
        )));
    }
    editor.load(id).await?;
    if editor.selected_id().is_none() {
        return Err(ConsoleError::precondition(format!(
            "{} item {} not found",
            editor.def().title,
            id
        )));
    }

    if !yes {
        let question = editor
            .delete_prompt()
            .unwrap_or_else(|| format!("Delete {} item {}?", editor.def().title, id));
        if !confirm(&question).unwrap_or(false) {
            let _ = output_success(output_format, "Delete cancelled", None);
            return Ok(());
        }
    }

    if editor.delete().await? {
        let _ = output_success(output_format, editor.notice().unwrap_or("Deleted"), None);
    }
    Ok(())
}

async fn upload(
    editor: &mut ResourceEditor,
    id: &str,
    file: &PathBuf,
    output_format: &OutputFormat,
) -> Result<(), ConsoleError> {
    editor.load(id).await?;
    let bytes = std::fs::read(file)?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    editor.stage_file(file_name, bytes);
    editor.upload_staged().await?;
    let _ = output_success(output_format, editor.notice().unwrap_or("Uploaded"), None);
    Ok(())
}

fn apply_sets(
    editor: &mut ResourceEditor,
    def: &'static ResourceDef,
    set: &[String],
) -> Result<(), ConsoleError> {
    for pair in set {
        let (key, raw) = pair.split_once('=').ok_or_else(|| {
            ConsoleError::precondition(format!("expected KEY=VALUE, got '{}'", pair))
        })?;
        let field = def.field(key).ok_or_else(|| {
            ConsoleError::precondition(format!("{} has no field '{}'", def.title, key))
        })?;
        editor.set_field(key, parse_field_value(field.kind, raw)?)?;
    }
    Ok(())
}

fn parse_field_value(kind: InputKind, raw: &str) -> Result<FieldValue, ConsoleError> {
    match kind {
        InputKind::Checkbox => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(FieldValue::Flag(true)),
            "false" | "no" | "0" | "off" | "" => Ok(FieldValue::Flag(false)),
            other => Err(ConsoleError::precondition(format!(
                "expected a boolean, got '{}'",
                other
            ))),
        },
        InputKind::Number if raw.trim().is_empty() => Ok(FieldValue::Number(None)),
        InputKind::Number => raw
            .trim()
            .parse::<f64>()
            .map(|n| FieldValue::Number(Some(n)))
            .map_err(|_| ConsoleError::precondition(format!("expected a number, got '{}'", raw))),
        InputKind::Text | InputKind::Textarea => Ok(coerce(kind, &Value::String(raw.to_string()))),
    }
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_set_values() {
        assert_eq!(parse_field_value(InputKind::Checkbox, "true").unwrap(), FieldValue::Flag(true));
        assert_eq!(parse_field_value(InputKind::Checkbox, "0").unwrap(), FieldValue::Flag(false));
        assert!(parse_field_value(InputKind::Checkbox, "maybe").is_err());

        assert_eq!(
            parse_field_value(InputKind::Number, "4.5").unwrap(),
            FieldValue::Number(Some(4.5))
        );
        assert_eq!(parse_field_value(InputKind::Number, "").unwrap(), FieldValue::Number(None));
        assert!(parse_field_value(InputKind::Number, "four").is_err());

        assert_eq!(
            parse_field_value(InputKind::Text, "Tacos").unwrap(),
            FieldValue::Text("Tacos".into())
        );
    }
}
