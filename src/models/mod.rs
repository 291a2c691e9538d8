//! Data models for GearGuard

/// Stores a string-backed enum in a TEXT column through its `as_str`/`FromStr` pair.
macro_rules! text_enum_sqlx {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

pub mod equipment;
pub mod principal;
pub mod report;
pub mod request;
pub mod team;
pub mod timestamp;
pub mod user;

/// Blank text values count as absent
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// Re-export commonly used types
pub use equipment::{Equipment, EquipmentSummary, EquipmentView};
pub use principal::{Action, Principal};
pub use request::{MaintenanceRequest, RequestStatus, RequestType, RequestView};
pub use team::{Team, TeamSummary, TeamView};
pub use user::{Role, User, UserSummary};
