use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::membership::{
    Membership as DomainMembership, MembershipKind, NewMembership as DomainNewMembership,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(
    table_name = crate::schema::recipe_memberships,
    belongs_to(super::recipe::Recipe, foreign_key = recipe_id),
    belongs_to(super::user::User, foreign_key = user_id)
)]
pub struct Membership {
    pub id: i32,
    pub user_id: i32,
    pub recipe_id: i32,
    pub kind: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_memberships)]
pub struct NewMembership {
    pub user_id: i32,
    pub recipe_id: i32,
    pub kind: &'static str,
}

impl Membership {
    /// Converts the row, returning `None` for an unknown `kind` value.
    pub fn into_domain(self) -> Option<DomainMembership> {
        let kind = MembershipKind::parse(&self.kind)?;
        Some(DomainMembership {
            id: self.id,
            user_id: self.user_id,
            recipe_id: self.recipe_id,
            kind,
            created_at: self.created_at,
        })
    }
}

impl From<&DomainNewMembership> for NewMembership {
    fn from(value: &DomainNewMembership) -> Self {
        Self {
            user_id: value.user_id,
            recipe_id: value.recipe_id,
            kind: value.kind.as_str(),
        }
    }
}
