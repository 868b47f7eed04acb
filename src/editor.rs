//! Generic resource editor: one list/detail/edit workflow driven entirely
//! by a `ResourceDef`. All CRUD calls, form state, and workgroup-scope
//! defaulting live here; the shell and CLI only route user intent in.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::client::api_error;
use crate::context::AppContext;
use crate::error::ConsoleError;
use crate::resource::{Field, InputKind, ResourceDef};

/// Fixed page size for list calls.
const PAGE_SIZE: u32 = 100;

/// File extensions accepted as-is by the image upload endpoint; anything
/// else is normalized to the default.
const KNOWN_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// A form value, closed over the declared input kinds. `Number(None)` is
/// the explicit "empty" sentinel for blank numeric inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    Flag(bool),
}

impl FieldValue {
    pub fn matches(&self, kind: InputKind) -> bool {
        match (self, kind) {
            (FieldValue::Text(_), InputKind::Text | InputKind::Textarea) => true,
            (FieldValue::Number(_), InputKind::Number) => true,
            (FieldValue::Flag(_), InputKind::Checkbox) => true,
            _ => false,
        }
    }

    /// Wire representation. An empty number serializes as `""` so that
    /// coercing the payload back yields the same value (idempotent
    /// round-trip for untouched fields).
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Flag(b) => Value::Bool(*b),
            FieldValue::Number(None) => Value::String(String::new()),
            FieldValue::Number(Some(n)) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::String(String::new()))
                }
            }
        }
    }

    fn is_empty_text(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

/// Type-appropriate empty default for a field.
pub fn default_value(kind: InputKind) -> FieldValue {
    match kind {
        InputKind::Checkbox => FieldValue::Flag(false),
        InputKind::Number => FieldValue::Number(None),
        InputKind::Text | InputKind::Textarea => FieldValue::Text(String::new()),
    }
}

/// Coerce a raw entity value to its declared kind. Applied identically
/// when populating a form from a fetched entity and when interpreting a
/// save payload, so values that pass through unedited are preserved.
pub fn coerce(kind: InputKind, raw: &Value) -> FieldValue {
    match kind {
        InputKind::Checkbox => FieldValue::Flag(truthy(raw)),
        InputKind::Number => FieldValue::Number(numeric(raw)),
        InputKind::Text | InputKind::Textarea => FieldValue::Text(textual(raw)),
    }
}

fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => true,
    }
}

fn numeric(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn textual(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Form state for one editor session. Holds exactly the keys declared by
/// the definition's fields, in declaration order, and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRecord {
    def: &'static ResourceDef,
    values: Vec<FieldValue>,
}

impl FormRecord {
    pub fn new(def: &'static ResourceDef) -> Self {
        let values = def.fields.iter().map(|f| default_value(f.kind)).collect();
        Self { def, values }
    }

    /// Populate from a fetched entity, coercing each declared field.
    pub fn from_entity(def: &'static ResourceDef, entity: &Value) -> Self {
        let values = def
            .fields
            .iter()
            .map(|f| coerce(f.kind, &entity[f.key]))
            .collect();
        Self { def, values }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.def.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.def
            .fields
            .iter()
            .position(|f| f.key == key)
            .map(|i| &self.values[i])
    }

    /// Set a field by key; rejects unknown keys and kind mismatches.
    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<(), ConsoleError> {
        let index = self
            .def
            .fields
            .iter()
            .position(|f| f.key == key)
            .ok_or_else(|| {
                ConsoleError::precondition(format!("{} has no field '{}'", self.def.title, key))
            })?;
        let kind = self.def.fields[index].kind;
        if !value.matches(kind) {
            return Err(ConsoleError::precondition(format!(
                "field '{}' expects a {:?} value",
                key, kind
            )));
        }
        self.values[index] = value;
        Ok(())
    }

    fn is_empty_text(&self, key: &str) -> bool {
        self.get(key).map(FieldValue::is_empty_text).unwrap_or(false)
    }

    /// Save payload: every declared field coerced to its wire form.
    pub fn payload(&self) -> Map<String, Value> {
        self.def
            .fields
            .iter()
            .zip(&self.values)
            .map(|(f, v)| (f.key.to_string(), v.to_json()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One mounted editor instance: Listing, Viewing/Editing an existing row
/// (selection set), or Creating new (no selection, the implicit default).
pub struct ResourceEditor {
    ctx: Arc<AppContext>,
    def: &'static ResourceDef,
    rows: Vec<Value>,
    selected_id: Option<String>,
    form: FormRecord,
    filter: String,
    scoped_organization_id: Option<String>,
    staged_upload: Option<StagedUpload>,
    /// Bumped whenever the form is reset or the scope changes; list
    /// results from a superseded generation are discarded instead of
    /// applied.
    generation: u64,
    notice: Option<String>,
}

impl ResourceEditor {
    pub fn new(ctx: Arc<AppContext>, def: &'static ResourceDef) -> Self {
        let mut editor = Self {
            ctx,
            def,
            rows: Vec::new(),
            selected_id: None,
            form: FormRecord::new(def),
            filter: String::new(),
            scoped_organization_id: None,
            staged_upload: None,
            generation: 0,
            notice: None,
        };
        editor.form = editor.new_record();
        editor
    }

    pub fn def(&self) -> &'static ResourceDef {
        self.def
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn form(&self) -> &FormRecord {
        &self.form
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), ConsoleError> {
        self.form.set(key, value)
    }

    /// Fresh form for "new" mode: type-appropriate empty defaults, with
    /// the workgroup field pre-filled from the active scope for scoped
    /// resources, and the organization field pre-filled from the scoped
    /// workgroup's owner for the users resource.
    fn new_record(&self) -> FormRecord {
        let mut record = FormRecord::new(self.def);
        if let Some(scope) = self.ctx.active_workgroup() {
            if self.def.workgroup_scoped && record.get("workgroupId").is_some() {
                // Unknown key is impossible here; guard keeps this total.
                let _ = record.set("workgroupId", FieldValue::Text(scope));
            }
            if let Some(org) = &self.scoped_organization_id {
                if record.is_empty_text("organizationId") {
                    let _ = record.set("organizationId", FieldValue::Text(org.clone()));
                }
            }
        }
        record
    }

    /// Clears the selection and replaces the form with a fresh record.
    pub fn reset_to_new(&mut self) {
        self.generation += 1;
        self.selected_id = None;
        self.staged_upload = None;
        self.notice = None;
        self.form = self.new_record();
    }

    /// Replace the row set from a list call: fixed page size, optional
    /// free-text filter, and the workgroup filter when this resource is
    /// scoped and a scope is active. Prior rows stay untouched on error.
    pub async fn list(&mut self) -> Result<(), ConsoleError> {
        let generation = self.generation;

        let mut query: Vec<(&str, String)> = vec![
            ("page", "1".to_string()),
            ("items", PAGE_SIZE.to_string()),
        ];
        if !self.filter.is_empty() {
            query.push(("filter", self.filter.clone()));
        }
        if self.def.workgroup_scoped {
            if let Some(scope) = self.ctx.active_workgroup() {
                query.push(("workgroupId", scope));
            }
        }

        let response = self.ctx.client().get_query(self.def.path, &query).await?;
        if generation != self.generation {
            return Ok(());
        }
        if response.is_error() {
            return Err(api_error(&response, &format!("Failed to load {}", self.def.title)));
        }

        self.rows = response.body["data"][self.def.list_key]
            .as_array()
            .cloned()
            .unwrap_or_default();
        Ok(())
    }

    /// Fetch one entity and replace the form with its coerced fields.
    pub async fn load(&mut self, id: &str) -> Result<(), ConsoleError> {
        if id.is_empty() {
            return Ok(());
        }
        let generation = self.generation;

        let path = format!("{}/{}", self.def.path, id);
        let response = self.ctx.client().get(&path).await?;
        if generation != self.generation {
            return Ok(());
        }
        if response.is_error() {
            return Err(api_error(
                &response,
                &format!("Failed to load {} item", self.def.title),
            ));
        }

        let entity = &response.body["data"][self.def.single_key];
        if !entity.is_object() {
            return Ok(());
        }
        self.form = FormRecord::from_entity(self.def, entity);
        self.selected_id = Some(id.to_string());
        self.staged_upload = None;
        Ok(())
    }

    /// Create (no selection) or fully update (selection present). On
    /// success re-runs the list; on failure the form is left unchanged so
    /// the user can correct and retry.
    pub async fn save(&mut self) -> Result<(), ConsoleError> {
        let mut payload = self.form.payload();

        // Creating a scoped resource under an active scope defaults the
        // workgroup field, but never overwrites an explicit value.
        if self.selected_id.is_none() && self.def.workgroup_scoped {
            if let Some(scope) = self.ctx.active_workgroup() {
                let blank = payload
                    .get("workgroupId")
                    .map(|v| match v {
                        Value::Null => true,
                        Value::String(s) => s.is_empty(),
                        _ => false,
                    })
                    .unwrap_or(true);
                if blank {
                    payload.insert("workgroupId".to_string(), Value::String(scope));
                }
            }
        }

        let body = Value::Object(payload);
        let response = match &self.selected_id {
            Some(id) => {
                let path = format!("{}/{}", self.def.path, id);
                self.ctx.client().put(&path, &body).await?
            }
            None => self.ctx.client().post(self.def.path, &body).await?,
        };
        if response.is_error() {
            return Err(api_error(&response, &format!("Failed to save {}", self.def.title)));
        }

        self.notice = Some(format!("{} saved", self.def.title));
        if self.selected_id.is_none() {
            self.form = self.new_record();
            self.staged_upload = None;
        }
        self.list().await
    }

    /// Prompt text for the confirmation the caller must obtain before
    /// invoking `delete`, or `None` when delete would be a no-op anyway.
    pub fn delete_prompt(&self) -> Option<String> {
        if !self.def.deletable {
            return None;
        }
        self.selected_id
            .as_ref()
            .map(|id| format!("Delete {} item {}?", self.def.title, id))
    }

    /// No-op (no network call, no state change) without a selection or
    /// for non-deletable resources. Returns whether a delete happened.
    pub async fn delete(&mut self) -> Result<bool, ConsoleError> {
        if !self.def.deletable {
            return Ok(false);
        }
        let Some(id) = self.selected_id.clone() else {
            return Ok(false);
        };

        let path = format!("{}/{}", self.def.path, id);
        let response = self.ctx.client().delete(&path).await?;
        if response.is_error() {
            return Err(api_error(&response, &format!("Failed to delete {}", self.def.title)));
        }

        self.notice = Some(format!("{} deleted", self.def.title));
        self.selected_id = None;
        self.staged_upload = None;
        self.form = self.new_record();
        self.list().await?;
        Ok(true)
    }

    /// React to an active-workgroup change: refresh the scoped
    /// organization default (users resource only) and re-run the list.
    pub async fn scope_changed(&mut self) -> Result<(), ConsoleError> {
        self.generation += 1;
        self.refresh_scoped_organization().await;
        self.list().await
    }

    async fn refresh_scoped_organization(&mut self) {
        self.scoped_organization_id = None;
        if self.def.path != "/user" {
            return;
        }
        let Some(scope) = self.ctx.active_workgroup() else {
            return;
        };

        let path = format!("/workgroup/{}", scope);
        match self.ctx.client().get(&path).await {
            Ok(response) if !response.is_error() => {
                self.scoped_organization_id = response.body["data"]["workgroup"]["organizationId"]
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
            }
            Ok(response) => {
                tracing::debug!(status = response.status, "scoped workgroup lookup failed");
            }
            Err(e) => {
                tracing::debug!("scoped workgroup lookup failed: {}", e);
            }
        }

        // While creating a new user, silently fill the organization field
        // unless the user already typed a value into it.
        if self.selected_id.is_none() {
            if let Some(org) = &self.scoped_organization_id {
                if self.form.is_empty_text("organizationId") {
                    let _ = self.form.set("organizationId", FieldValue::Text(org.clone()));
                }
            }
        }
    }

    pub fn scoped_organization_id(&self) -> Option<&str> {
        self.scoped_organization_id.as_deref()
    }

    /// Stage a file for upload. Cleared whenever the form resets.
    pub fn stage_file(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) {
        self.staged_upload = Some(StagedUpload { file_name: file_name.into(), bytes });
    }

    pub fn staged_upload(&self) -> Option<&StagedUpload> {
        self.staged_upload.as_ref()
    }

    /// Attach the staged file to the already-saved image record. Both
    /// preconditions are checked locally before any network call.
    pub async fn upload_staged(&mut self) -> Result<(), ConsoleError> {
        if self.def.path != "/image" {
            return Err(ConsoleError::precondition(format!(
                "{} does not support file upload",
                self.def.title
            )));
        }
        let Some(id) = self.selected_id.clone() else {
            return Err(ConsoleError::precondition(
                "Save the image before uploading a file",
            ));
        };
        let Some(staged) = self.staged_upload.clone() else {
            return Err(ConsoleError::precondition("Choose a file to upload first"));
        };

        let extension = normalize_extension(&staged.file_name);
        let path = format!("/image/file/{}", id);
        let response = self
            .ctx
            .client()
            .upload(&path, &extension, &staged.file_name, staged.bytes)
            .await?;
        if response.is_error() {
            return Err(api_error(&response, "Failed to upload image file"));
        }

        self.notice = Some("Image file uploaded".to_string());
        self.staged_upload = None;
        self.list().await
    }
}

/// Lower-case the file's extension, falling back to the default when it
/// is not a known image extension.
pub fn normalize_extension(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if KNOWN_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        ext
    } else {
        DEFAULT_IMAGE_EXTENSION.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource;
    use serde_json::json;

    fn items() -> &'static ResourceDef {
        resource::find("items").unwrap()
    }

    fn users() -> &'static ResourceDef {
        resource::find("users").unwrap()
    }

    #[test]
    fn coercion_per_kind() {
        assert_eq!(coerce(InputKind::Checkbox, &json!(true)), FieldValue::Flag(true));
        assert_eq!(coerce(InputKind::Checkbox, &Value::Null), FieldValue::Flag(false));
        assert_eq!(coerce(InputKind::Checkbox, &json!("")), FieldValue::Flag(false));
        assert_eq!(coerce(InputKind::Checkbox, &json!("yes")), FieldValue::Flag(true));
        assert_eq!(coerce(InputKind::Checkbox, &json!(0)), FieldValue::Flag(false));

        assert_eq!(coerce(InputKind::Number, &json!(3)), FieldValue::Number(Some(3.0)));
        assert_eq!(coerce(InputKind::Number, &json!("3.5")), FieldValue::Number(Some(3.5)));
        assert_eq!(coerce(InputKind::Number, &json!("")), FieldValue::Number(None));
        assert_eq!(coerce(InputKind::Number, &Value::Null), FieldValue::Number(None));
        assert_eq!(coerce(InputKind::Number, &json!("tacos")), FieldValue::Number(None));

        assert_eq!(coerce(InputKind::Text, &json!("Tacos")), FieldValue::Text("Tacos".into()));
        assert_eq!(coerce(InputKind::Text, &Value::Null), FieldValue::Text("".into()));
        assert_eq!(coerce(InputKind::Textarea, &json!(7)), FieldValue::Text("7".into()));
    }

    #[test]
    fn form_has_exactly_the_declared_keys() {
        let entity = json!({
            "id": "I1",
            "name": "Tacos",
            "workgroupId": "WG1",
            "unexpected": "ignored",
        });
        let form = FormRecord::from_entity(items(), &entity);

        let payload = form.payload();
        let declared: Vec<&str> = items().fields.iter().map(|f| f.key).collect();
        assert_eq!(payload.len(), declared.len());
        for key in declared {
            assert!(payload.contains_key(key), "missing declared key {}", key);
        }
        assert!(!payload.contains_key("unexpected"));
        assert!(!payload.contains_key("id"));
    }

    #[test]
    fn coercion_round_trip_is_idempotent() {
        let entity = json!({
            "name": "Tacos",
            "description": "",
            "url": "https://example.com",
            "location": null,
            "categoryId": "C1",
            "workgroupId": "WG1",
        });
        let form = FormRecord::from_entity(items(), &entity);
        let payload = Value::Object(form.payload());
        let round_tripped = FormRecord::from_entity(items(), &payload);
        assert_eq!(form, round_tripped);

        // Numbers and flags survive the trip too.
        let votes = resource::find("votes").unwrap();
        let entity = json!({ "electionId": "E1", "itemId": "I1", "userId": "U1", "score": 4 });
        let form = FormRecord::from_entity(votes, &entity);
        let payload = Value::Object(form.payload());
        assert_eq!(payload["score"], json!(4));
        assert_eq!(form, FormRecord::from_entity(votes, &payload));

        // Empty number serializes as "" and comes back empty.
        let entity = json!({ "electionId": "E1", "itemId": "I1", "userId": "U1", "score": "" });
        let form = FormRecord::from_entity(votes, &entity);
        let payload = Value::Object(form.payload());
        assert_eq!(payload["score"], json!(""));
        assert_eq!(form, FormRecord::from_entity(votes, &payload));
    }

    #[test]
    fn set_rejects_unknown_keys_and_kind_mismatches() {
        let mut form = FormRecord::new(users());
        assert!(form.set("email", FieldValue::Text("a@b.c".into())).is_ok());
        assert!(form.set("nope", FieldValue::Text("x".into())).is_err());
        assert!(form.set("active", FieldValue::Text("true".into())).is_err());
        assert!(form.set("active", FieldValue::Flag(true)).is_ok());
    }

    #[test]
    fn extension_normalization() {
        assert_eq!(normalize_extension("photo.PNG"), "png");
        assert_eq!(normalize_extension("photo.jpeg"), "jpeg");
        assert_eq!(normalize_extension("archive.tar.gz"), "jpg");
        assert_eq!(normalize_extension("noextension"), "jpg");
        assert_eq!(normalize_extension("weird.HEIC"), "jpg");
    }
}
