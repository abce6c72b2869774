// Guild domain models - the persisted record and the column-level patch type.
//
// Pure domain types with no Discord or database dependencies.

use super::guild_store::GuildError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One row per registered community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRecord {
    /// Same value as the Discord guild id.
    pub id: u64,
    pub name: String,
    /// Message carrying the self-assignable roles menu, if any.
    pub roles_message_id: Option<u64>,
}

/// Columns of the guild record that may be patched.
///
/// `id` is the key and is deliberately not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuildField {
    Name,
    RolesMessageId,
}

impl GuildField {
    pub fn column(&self) -> &'static str {
        match self {
            GuildField::Name => "name",
            GuildField::RolesMessageId => "roles_message_id",
        }
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (GuildField::Name, FieldValue::Text(_))
                | (GuildField::RolesMessageId, FieldValue::Id(_))
        )
    }
}

impl fmt::Display for GuildField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for GuildField {
    type Err = GuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(GuildField::Name),
            "roles_message_id" => Ok(GuildField::RolesMessageId),
            other => Err(GuildError::InvalidField(other.to_string())),
        }
    }
}

/// Value written to a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Nullable Discord id.
    Id(Option<u64>),
}

/// A validated set of column updates. Each field appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildPatch {
    fields: BTreeMap<GuildField, FieldValue>,
}

impl GuildPatch {
    /// Validate raw `(column, value)` pairs.
    ///
    /// Fails on the first unknown column or mistyped value, so nothing is
    /// ever partially applied. A repeated column keeps its last value.
    pub fn parse<I, K>(fields: I) -> Result<Self, GuildError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: AsRef<str>,
    {
        let mut patch = GuildPatch::default();
        for (name, value) in fields {
            let field: GuildField = name.as_ref().parse()?;
            if !field.accepts(&value) {
                return Err(GuildError::InvalidField(format!(
                    "{} does not accept {:?}",
                    field, value
                )));
            }
            patch.fields.insert(field, value);
        }
        Ok(patch)
    }

    pub fn set(field: GuildField, value: FieldValue) -> Result<Self, GuildError> {
        Self::parse([(field.column(), value)])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GuildField, &FieldValue)> {
        self.fields.iter()
    }

    /// Apply the patch to an in-memory record.
    #[cfg(test)]
    pub fn apply_to(&self, record: &mut GuildRecord) {
        for (field, value) in &self.fields {
            match (field, value) {
                (GuildField::Name, FieldValue::Text(name)) => record.name = name.clone(),
                (GuildField::RolesMessageId, FieldValue::Id(id)) => record.roles_message_id = *id,
                // parse() guarantees field/value kinds line up
                _ => {}
            }
        }
    }
}
