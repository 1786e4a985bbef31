/// Implements diesel Text conversions for a string-backed enum with
/// `as_str()` and `FromStr<Err = String>`.
macro_rules! impl_text_sql {
    ($ty:ty) => {
        impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for $ty
        where
            DB: diesel::backend::Backend,
            String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
        {
            fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
                let value =
                    <String as diesel::deserialize::FromSql<diesel::sql_types::Text, DB>>::from_sql(
                        bytes,
                    )?;
                <$ty as std::str::FromStr>::from_str(&value).map_err(|e| e.into())
            }
        }

        impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for $ty
        where
            DB: diesel::backend::Backend,
            str: diesel::serialize::ToSql<diesel::sql_types::Text, DB>,
        {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, DB>,
            ) -> diesel::serialize::Result {
                <str as diesel::serialize::ToSql<diesel::sql_types::Text, DB>>::to_sql(
                    self.as_str(),
                    out,
                )
            }
        }
    };
}

pub(crate) use impl_text_sql;

pub mod analytics;
pub mod link;
pub mod link_click;
pub mod subscription;
pub mod user;

// Re-export common types
pub use analytics::{AnalyticsQuery, PageAnalytics};
pub use link::{
    CreateLinkRequest, Link, LinkLimitsResponse, LinkOrder, NewLink, ReorderLinksRequest,
    UpdateLink, UpdateLinkRequest,
};
pub use link_click::{LinkClick, NewLinkClick, TrackLinkClickRequest};
pub use subscription::{
    CreateSubscriptionRequest, NewSubscription, Subscription, SubscriptionStatus,
    UpdateSubscriptionStatusRequest,
};
pub use user::{
    CreateUserRequest, NewUser, Theme, UpdateUserRequest, User, UserError, UserProfile, UserUpdate,
};
