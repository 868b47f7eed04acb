//! Static per-resource metadata driving the generic editor: API path,
//! ordered field descriptors, envelope keys, and scoping/deletability
//! flags. One definition per manageable entity kind, shared by every
//! editor instance.

/// Closed set of input kinds a field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
    Checkbox,
    Textarea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
}

const fn field(key: &'static str, label: &'static str, kind: InputKind) -> Field {
    Field { key, label, kind }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDef {
    /// Route key used by navigation and the CLI (`users`, `items`, ...).
    pub name: &'static str,
    /// Backend path for collection calls; single-entity calls append `/{id}`.
    pub path: &'static str,
    pub title: &'static str,
    pub fields: &'static [Field],
    pub id_field: &'static str,
    /// Envelope key for list responses, nested under `data`.
    pub list_key: &'static str,
    /// Envelope key for single-entity responses, nested under `data`.
    pub single_key: &'static str,
    pub deletable: bool,
    /// Whether list calls take a `workgroupId` filter and new records
    /// default their workgroup field from the active scope.
    pub workgroup_scoped: bool,
}

impl ResourceDef {
    pub fn field(&self, key: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }
}

use InputKind::{Checkbox, Number, Text, Textarea};

pub const RESOURCES: &[ResourceDef] = &[
    ResourceDef {
        name: "organizations",
        path: "/organization",
        title: "Organizations",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Textarea),
        ],
        id_field: "id",
        list_key: "organizations",
        single_key: "organization",
        deletable: true,
        workgroup_scoped: false,
    },
    ResourceDef {
        name: "workgroups",
        path: "/workgroup",
        title: "Workgroups",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Textarea),
            field("organizationId", "Organization ID", Text),
        ],
        id_field: "id",
        list_key: "workgroups",
        single_key: "workgroup",
        deletable: true,
        workgroup_scoped: false,
    },
    ResourceDef {
        name: "users",
        path: "/user",
        title: "Users",
        fields: &[
            field("email", "Email", Text),
            field("alias", "Alias", Text),
            field("firstName", "First Name", Text),
            field("lastName", "Last Name", Text),
            field("active", "Active", Checkbox),
            field("organizationId", "Organization ID", Text),
        ],
        id_field: "id",
        list_key: "users",
        single_key: "user",
        deletable: true,
        workgroup_scoped: false,
    },
    ResourceDef {
        name: "roles",
        path: "/role",
        title: "Roles",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Text),
            field("protected", "Protected", Checkbox),
        ],
        id_field: "id",
        list_key: "roles",
        single_key: "role",
        deletable: true,
        workgroup_scoped: false,
    },
    ResourceDef {
        name: "capabilities",
        path: "/capability",
        title: "Capabilities",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Text),
        ],
        id_field: "id",
        list_key: "capabilities",
        single_key: "capability",
        // Capabilities are a fixed permission vocabulary; the backend
        // refuses deletes, so the console never offers one.
        deletable: false,
        workgroup_scoped: false,
    },
    ResourceDef {
        name: "categories",
        path: "/category",
        title: "Categories",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Text),
            field("workgroupId", "Workgroup ID", Text),
        ],
        id_field: "id",
        list_key: "categories",
        single_key: "category",
        deletable: true,
        workgroup_scoped: true,
    },
    ResourceDef {
        name: "items",
        path: "/item",
        title: "Items",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Textarea),
            field("url", "URL", Text),
            field("location", "Location", Text),
            field("categoryId", "Category ID", Text),
            field("workgroupId", "Workgroup ID", Text),
        ],
        id_field: "id",
        list_key: "items",
        single_key: "item",
        deletable: true,
        workgroup_scoped: true,
    },
    ResourceDef {
        name: "images",
        path: "/image",
        title: "Images",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Text),
            field("workgroupId", "Workgroup ID", Text),
        ],
        id_field: "id",
        list_key: "images",
        single_key: "image",
        deletable: true,
        workgroup_scoped: true,
    },
    ResourceDef {
        name: "lists",
        path: "/list",
        title: "Lists",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Textarea),
            field("workgroupId", "Workgroup ID", Text),
        ],
        id_field: "id",
        list_key: "lists",
        single_key: "list",
        deletable: true,
        workgroup_scoped: true,
    },
    ResourceDef {
        name: "elections",
        path: "/election",
        title: "Elections",
        fields: &[
            field("name", "Name", Text),
            field("description", "Description", Textarea),
            field("listId", "List ID", Text),
            field("imageId", "Image ID", Text),
            field("workgroupId", "Workgroup ID", Text),
        ],
        id_field: "id",
        list_key: "elections",
        single_key: "election",
        deletable: true,
        workgroup_scoped: true,
    },
    ResourceDef {
        name: "votes",
        path: "/vote",
        title: "Votes",
        fields: &[
            field("electionId", "Election ID", Text),
            field("itemId", "Item ID", Text),
            field("userId", "User ID", Text),
            field("score", "Score", Number),
        ],
        id_field: "id",
        list_key: "votes",
        single_key: "vote",
        // Ballots are an audit record; the backend rejects deletes.
        deletable: false,
        workgroup_scoped: false,
    },
    ResourceDef {
        name: "notifications",
        path: "/notification",
        title: "Notifications",
        fields: &[
            field("userId", "User ID", Text),
            field("message", "Message", Textarea),
            field("read", "Read", Checkbox),
        ],
        id_field: "id",
        list_key: "notifications",
        single_key: "notification",
        deletable: true,
        workgroup_scoped: false,
    },
    ResourceDef {
        name: "preferences",
        path: "/preference",
        title: "Preferences",
        fields: &[
            field("userId", "User ID", Text),
            field("name", "Name", Text),
            field("value", "Value", Text),
        ],
        id_field: "id",
        list_key: "preferences",
        single_key: "preference",
        deletable: true,
        workgroup_scoped: false,
    },
];

pub fn find(name: &str) -> Option<&'static ResourceDef> {
    RESOURCES.iter().find(|def| def.name == name)
}
