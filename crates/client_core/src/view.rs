//! Derived list projections: text filter over one selected field, then a
//! natural-order sort. Both are pure functions of the inputs.

use std::{borrow::Cow, cmp::Ordering, fmt, str::FromStr};

use shared::{
    domain::{Album, Comment, Employee, Photo, Post, Todo},
    error::ValidationError,
};

/// Maps enumerated field tags to the string a record exposes for them.
pub trait ListFields {
    type Filter: Copy + Eq + fmt::Debug;
    type Sort: Copy + Eq + fmt::Debug;

    fn filter_value(&self, field: Self::Filter) -> Cow<'_, str>;
    fn sort_value(&self, field: Self::Sort) -> Cow<'_, str>;
}

macro_rules! field_tags {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
            }
        }
    };
}

field_tags!(
    /// Employee fields searchable in the list view.
    EmployeeFilter {
        Name => "name",
        EmployeeId => "employeeId",
        Department => "department",
        Address => "address",
        Email => "email",
    }
);

field_tags!(
    /// Employee columns the list view can sort by.
    EmployeeSort {
        EmployeeId => "employeeId",
        Name => "name",
        Department => "department",
    }
);

field_tags!(PostField { Id => "id", UserId => "userId", Title => "title", Body => "body" });
field_tags!(CommentField {
    Id => "id",
    PostId => "postId",
    Name => "name",
    Email => "email",
    Body => "body",
});
field_tags!(AlbumField { Id => "id", UserId => "userId", Title => "title" });
field_tags!(PhotoField { Id => "id", AlbumId => "albumId", Title => "title", Url => "url" });
field_tags!(TodoField {
    Id => "id",
    UserId => "userId",
    Title => "title",
    Completed => "completed",
});

fn text(value: &Option<String>) -> Cow<'_, str> {
    Cow::Borrowed(value.as_deref().unwrap_or_default())
}

impl ListFields for Employee {
    type Filter = EmployeeFilter;
    type Sort = EmployeeSort;

    fn filter_value(&self, field: EmployeeFilter) -> Cow<'_, str> {
        match field {
            EmployeeFilter::Name => Cow::Borrowed(self.name.as_str()),
            EmployeeFilter::EmployeeId => Cow::Borrowed(self.employee_id.as_str()),
            EmployeeFilter::Department => text(&self.department),
            EmployeeFilter::Address => Cow::Owned(self.full_address()),
            EmployeeFilter::Email => Cow::Owned(self.full_email()),
        }
    }

    fn sort_value(&self, field: EmployeeSort) -> Cow<'_, str> {
        match field {
            EmployeeSort::EmployeeId => Cow::Borrowed(self.employee_id.as_str()),
            EmployeeSort::Name => Cow::Borrowed(self.name.as_str()),
            EmployeeSort::Department => text(&self.department),
        }
    }
}

macro_rules! same_fields {
    ($record:ty, $tags:ty, |$this:ident, $field:ident| $body:expr) => {
        impl ListFields for $record {
            type Filter = $tags;
            type Sort = $tags;

            fn filter_value(&self, field: $tags) -> Cow<'_, str> {
                let ($this, $field) = (self, field);
                $body
            }

            fn sort_value(&self, field: $tags) -> Cow<'_, str> {
                self.filter_value(field)
            }
        }
    };
}

same_fields!(Post, PostField, |post, field| match field {
    PostField::Id => Cow::Owned(post.id.to_string()),
    PostField::UserId => Cow::Owned(post.user_id.to_string()),
    PostField::Title => Cow::Borrowed(post.title.as_str()),
    PostField::Body => Cow::Borrowed(post.body.as_str()),
});

same_fields!(Comment, CommentField, |comment, field| match field {
    CommentField::Id => Cow::Owned(comment.id.to_string()),
    CommentField::PostId => Cow::Owned(comment.post_id.to_string()),
    CommentField::Name => Cow::Borrowed(comment.name.as_str()),
    CommentField::Email => Cow::Borrowed(comment.email.as_str()),
    CommentField::Body => Cow::Borrowed(comment.body.as_str()),
});

same_fields!(Album, AlbumField, |album, field| match field {
    AlbumField::Id => Cow::Owned(album.id.to_string()),
    AlbumField::UserId => Cow::Owned(album.user_id.to_string()),
    AlbumField::Title => Cow::Borrowed(album.title.as_str()),
});

same_fields!(Photo, PhotoField, |photo, field| match field {
    PhotoField::Id => Cow::Owned(photo.id.to_string()),
    PhotoField::AlbumId => Cow::Owned(photo.album_id.to_string()),
    PhotoField::Title => Cow::Borrowed(photo.title.as_str()),
    PhotoField::Url => Cow::Borrowed(photo.url.as_str()),
});

same_fields!(Todo, TodoField, |todo, field| match field {
    TodoField::Id => Cow::Owned(todo.id.to_string()),
    TodoField::UserId => Cow::Owned(todo.user_id.to_string()),
    TodoField::Title => Cow::Borrowed(todo.title.as_str()),
    TodoField::Completed => Cow::Borrowed(if todo.completed { "done" } else { "open" }),
});

fn strip_accent(c: char) -> Option<char> {
    let base = match c {
        // Combining diacritical marks.
        '\u{0300}'..='\u{036f}' => return None,
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    };
    Some(base)
}

/// Case- and accent-insensitive comparison key.
pub fn fold(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(strip_accent)
        .collect()
}

/// Records whose selected field contains `query`. A blank query keeps everything.
pub fn filter_records<'a, T: ListFields>(
    items: &'a [T],
    query: &str,
    field: T::Filter,
) -> Vec<&'a T> {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| fold(&item.filter_value(field)).contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + Eq> SortState<F> {
    pub fn ascending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Re-selecting the active column flips direction; a new column starts ascending.
    pub fn select(&mut self, field: F) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            *self = Self::ascending(field);
        }
    }
}

/// Stable natural-order sort; missing values compare as empty strings.
pub fn sort_records<T: ListFields>(items: &mut Vec<&T>, sort: SortState<T::Sort>) {
    let mut keyed: Vec<(String, &T)> = items
        .iter()
        .map(|item| (fold(&item.sort_value(sort.field)), *item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        // natord ignores whitespace; distinct keys must still order strictly.
        let ordering: Ordering = natord::compare(a, b).then_with(|| a.cmp(b));
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    *items = keyed.into_iter().map(|(_, item)| item).collect();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<F, S> {
    pub query: String,
    pub filter: F,
    pub sort: Option<SortState<S>>,
}

impl<F: Copy + Eq, S: Copy + Eq> ListQuery<F, S> {
    pub fn new(filter: F) -> Self {
        Self {
            query: String::new(),
            filter,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, field: S) -> Self {
        self.sort = Some(SortState::ascending(field));
        self
    }

    pub fn select_sort(&mut self, field: S) {
        match &mut self.sort {
            Some(sort) => sort.select(field),
            None => self.sort = Some(SortState::ascending(field)),
        }
    }

    pub fn project<'a, T>(&self, items: &'a [T]) -> Vec<&'a T>
    where
        T: ListFields<Filter = F, Sort = S>,
    {
        let mut rows = filter_records(items, &self.query, self.filter);
        if let Some(sort) = self.sort {
            sort_records(&mut rows, sort);
        }
        rows
    }
}

impl Default for ListQuery<EmployeeFilter, EmployeeSort> {
    fn default() -> Self {
        Self::new(EmployeeFilter::Name).sorted_by(EmployeeSort::EmployeeId)
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
