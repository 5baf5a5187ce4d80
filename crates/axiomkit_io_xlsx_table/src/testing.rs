//! Shared record fixtures for unit tests.

use crate::conf::derive_solid_fill_style;
use crate::predicate::SpecMethodTable;
use crate::record::{IntoFieldValue, TableRecord};
use crate::registry::Registry;
use crate::spec::{EnumRecordShape, SpecFieldMeta, SpecFieldValue};

pub(crate) const C_RULE_TAG_NEWFACE: &str = "newface";

#[derive(Debug, Clone)]
pub(crate) struct Person {
    pub id: String,
    pub memo: String,
    pub name: String,
    pub age: i64,
    pub address: String,
    pub account_number: String,
    pub special_id: Option<String>,
}

impl Person {
    fn is_child(&self) -> bool {
        self.age < 18
    }

    fn is_old(&self) -> bool {
        75 <= self.age
    }
}

impl TableRecord for Person {
    fn shape() -> EnumRecordShape {
        EnumRecordShape::Struct(vec![
            SpecFieldMeta::tagged("ID", r#"error:"zero""#),
            SpecFieldMeta::private("memo"),
            SpecFieldMeta::tagged(
                "Name",
                r#"csv:"name" excel:"氏名" newface:"isNewFace" error:"zero""#,
            ),
            SpecFieldMeta::tagged("Age", r#"csv:"age" excel:"年齢" warn:"IsChild,IsOld""#),
            SpecFieldMeta::tagged("Address", r#"csv:"address" excel:"住所" warn:"-""#),
            SpecFieldMeta::tagged("AccountNumber", r#"csv:"account_number" excel:"-""#),
            SpecFieldMeta::tagged("SpecialID", r#"warn:"notZero" error:"nil""#),
        ])
    }

    fn field_value(&self, idx_field: usize) -> SpecFieldValue {
        match idx_field {
            0 => self.id.to_field_value(),
            1 => self.memo.to_field_value(),
            2 => self.name.to_field_value(),
            3 => self.age.to_field_value(),
            4 => self.address.to_field_value(),
            5 => self.account_number.to_field_value(),
            _ => self.special_id.to_field_value(),
        }
    }

    fn methods() -> SpecMethodTable<Self> {
        SpecMethodTable::new()
            .with("IsChild", Person::is_child)
            .with("IsOld", Person::is_old)
    }
}

/// Alice (child, empty special id), Bob (no special id), Carol (old, empty id).
pub(crate) fn derive_persons() -> Vec<Person> {
    vec![
        Person {
            id: "ID-123456".to_string(),
            memo: "m".to_string(),
            name: "Alice".to_string(),
            age: 17,
            address: String::new(),
            account_number: "0000-0000-0000-0000".to_string(),
            special_id: Some(String::new()),
        },
        Person {
            id: "ID-112358".to_string(),
            memo: String::new(),
            name: "Bob".to_string(),
            age: 32,
            address: "Boston".to_string(),
            account_number: "1111-1111-1111-1111".to_string(),
            special_id: None,
        },
        Person {
            id: String::new(),
            memo: String::new(),
            name: "Carol".to_string(),
            age: 100,
            address: "京都".to_string(),
            account_number: String::new(),
            special_id: Some("SID-999999".to_string()),
        },
    ]
}

/// Default registry plus the `newface` rule (priority 0) and `isNewFace` predicate.
pub(crate) fn derive_person_registry() -> Registry {
    let registry = Registry::with_defaults();
    registry.register_rule(0, C_RULE_TAG_NEWFACE, derive_solid_fill_style("#aaffaa"));
    registry.register_predicate("isNewFace", |name: String| {
        ["Alice"].contains(&name.as_str())
    });
    registry
}
