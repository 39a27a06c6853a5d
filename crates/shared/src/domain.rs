use std::{fmt, hash::Hash};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(EmployeeId);
id_newtype!(UserId);
id_newtype!(PostId);
id_newtype!(CommentId);
id_newtype!(AlbumId);
id_newtype!(PhotoId);
id_newtype!(TodoId);

/// Records that carry a server-assigned identifier, unique within one collection snapshot.
pub trait Identifiable {
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub employee_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_middle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Employee {
    /// Minimal record with only the required fields populated.
    pub fn new(id: EmployeeId, employee_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            employee_id: employee_id.into(),
            name: name.into(),
            email_local: None,
            email_domain: None,
            email: None,
            department: None,
            gender: None,
            birth_date: None,
            phone_prefix: None,
            phone_middle: None,
            phone_last: None,
            phone: None,
            zip_code: None,
            address1: None,
            address2: None,
            position: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Precomputed `email` wins; otherwise `local@domain` when both halves exist.
    pub fn full_email(&self) -> String {
        if let Some(email) = non_empty(&self.email) {
            return email.to_string();
        }
        match (non_empty(&self.email_local), non_empty(&self.email_domain)) {
            (Some(local), Some(domain)) => format!("{local}@{domain}"),
            _ => String::new(),
        }
    }

    pub fn full_address(&self) -> String {
        [non_empty(&self.address1), non_empty(&self.address2)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn full_phone(&self) -> String {
        if let Some(phone) = non_empty(&self.phone) {
            return phone.to_string();
        }
        [
            non_empty(&self.phone_prefix),
            non_empty(&self.phone_middle),
            non_empty(&self.phone_last),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("-")
    }
}

impl Identifiable for Employee {
    type Id = EmployeeId;

    fn id(&self) -> EmployeeId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: UserId,
    pub id: PostId,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: PostId,
    pub id: CommentId,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub user_id: UserId,
    pub id: AlbumId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub album_id: AlbumId,
    pub id: PhotoId,
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: UserId,
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
}

macro_rules! identifiable {
    ($record:ty, $id:ty) => {
        impl Identifiable for $record {
            type Id = $id;

            fn id(&self) -> $id {
                self.id
            }
        }
    };
}

identifiable!(Post, PostId);
identifiable!(Comment, CommentId);
identifiable!(Album, AlbumId);
identifiable!(Photo, PhotoId);
identifiable!(Todo, TodoId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_decodes_camel_case_payload_with_timestamps() {
        let raw = r#"{
            "id": 3,
            "employeeId": "EMP-003",
            "name": "Park",
            "emailLocal": "park",
            "emailDomain": "example.com",
            "address1": "12 Main St",
            "address2": "Apt 4",
            "createdAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let employee: Employee = serde_json::from_str(raw).expect("decode");
        assert_eq!(employee.id, EmployeeId(3));
        assert_eq!(employee.employee_id, "EMP-003");
        assert_eq!(employee.full_email(), "park@example.com");
        assert_eq!(employee.full_address(), "12 Main St Apt 4");
        assert!(employee.created_at.is_some());
        assert!(employee.updated_at.is_none());
    }

    #[test]
    fn explicit_email_takes_precedence_over_parts() {
        let mut employee = Employee::new(EmployeeId(1), "E1", "Kim");
        employee.email = Some("kim@corp.example".into());
        employee.email_local = Some("other".into());
        employee.email_domain = Some("elsewhere.example".into());
        assert_eq!(employee.full_email(), "kim@corp.example");
    }

    #[test]
    fn partial_email_and_phone_parts_degrade_gracefully() {
        let mut employee = Employee::new(EmployeeId(1), "E1", "Kim");
        employee.email_local = Some("kim".into());
        assert_eq!(employee.full_email(), "");

        employee.phone_prefix = Some("010".into());
        employee.phone_last = Some("5678".into());
        assert_eq!(employee.full_phone(), "010-5678");
    }

    #[test]
    fn demo_records_decode_from_public_api_shape() {
        let photo: Photo = serde_json::from_str(
            r#"{"albumId":1,"id":2,"title":"t","url":"u","thumbnailUrl":"th"}"#,
        )
        .expect("photo");
        assert_eq!(photo.id(), PhotoId(2));
        assert_eq!(photo.album_id, AlbumId(1));

        let todo: Todo =
            serde_json::from_str(r#"{"userId":1,"id":5,"title":"x","completed":true}"#)
                .expect("todo");
        assert!(todo.completed);
    }
}
