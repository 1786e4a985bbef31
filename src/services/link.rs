// Link Store: persistence boundary for a user's ordered link list
//
// Every mutation runs in one read-committed transaction that first locks the
// owner's user row, so concurrent mutations of one list are serialized and
// the sibling snapshot used for renumbering is never stale.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{DieselConnection, DieselPool},
    models::{
        link::{
            CreateLinkRequest, Link, LinkLimitsResponse, LinkOrder, NewLink, UpdateLinkRequest,
        },
        user::User,
    },
    services::{
        capacity,
        ordering::{self, IndexChange, Sibling},
    },
    utils::{
        audit_logger::{AuditAction, AuditLogger},
        service_error::ServiceError,
    },
};

// =============================================================================
// QUERY HELPERS
// =============================================================================

/// Current positions of every link the user owns, ascending
pub(crate) async fn load_siblings(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
) -> Result<Vec<Sibling>, diesel::result::Error> {
    use crate::schema::links::dsl;

    let rows = dsl::links
        .filter(dsl::user_id.eq(owner))
        .order((dsl::order_index.asc(), dsl::created_at.asc()))
        .select((dsl::id, dsl::order_index))
        .load::<(Uuid, i32)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, order_index)| Sibling { id, order_index })
        .collect())
}

/// Writes planned index changes, refreshing `updated_at` on each touched row
async fn apply_index_changes(
    conn: &mut AsyncPgConnection,
    changes: &[IndexChange],
    now: DateTime<Utc>,
) -> Result<(), diesel::result::Error> {
    use crate::schema::links::dsl;

    for change in changes {
        diesel::update(dsl::links.find(change.link_id))
            .set((
                dsl::order_index.eq(change.order_index),
                dsl::updated_at.eq(now),
            ))
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn load_user_links(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
) -> Result<Vec<Link>, diesel::result::Error> {
    use crate::schema::links::dsl;

    dsl::links
        .filter(dsl::user_id.eq(owner))
        .order((dsl::order_index.asc(), dsl::created_at.asc()))
        .select(Link::as_select())
        .load::<Link>(conn)
        .await
}

/// Fetches a link for mutation by `caller`. Another user's link is `Unauthorized`.
async fn find_owned_link(
    conn: &mut AsyncPgConnection,
    link_id: Uuid,
    caller: Uuid,
) -> Result<Link, ServiceError> {
    use crate::schema::links::dsl;

    let link = dsl::links
        .find(link_id)
        .select(Link::as_select())
        .first::<Link>(conn)
        .await
        .optional()?
        .ok_or(ServiceError::NotFound)?;

    if link.user_id != caller {
        debug!("Link {} is not owned by {}", link_id, caller);
        return Err(ServiceError::Unauthorized);
    }

    Ok(link)
}

// =============================================================================
// LINK SERVICE
// =============================================================================

#[derive(Clone)]
pub struct LinkService {
    diesel_pool: DieselPool,
}

impl LinkService {
    pub fn new(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    async fn connection(&self) -> Result<DieselConnection<'_>, ServiceError> {
        Ok(self.diesel_pool.get().await?)
    }

    /// Create a link, appended or inserted at a requested position
    #[instrument(skip(self, request))]
    pub async fn create_link(
        &self,
        user_id: Uuid,
        mut request: CreateLinkRequest,
    ) -> Result<Link, ServiceError> {
        use crate::schema::links::dsl;

        request.sanitize();
        request.validate()?;

        let mut conn = self.connection().await?;

        let link = conn
            .build_transaction()
            .read_committed()
            .run::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let owner = User::find_for_update(conn, user_id).await?;
                    let siblings = load_siblings(conn, owner.id).await?;

                    // Inactive links count toward the limit
                    let link_count = i64::try_from(siblings.len()).unwrap_or(i64::MAX);
                    let max_links = capacity::max_links(owner.is_premium);
                    if !max_links.allows_another(link_count) {
                        return Err(ServiceError::CapacityExceeded { max_links });
                    }

                    let position = ordering::insertion_position(request.order_index, &siblings);
                    let now = Utc::now();
                    apply_index_changes(
                        conn,
                        &ordering::shift_for_insert(&siblings, position),
                        now,
                    )
                    .await?;

                    let new_link = NewLink {
                        id: Uuid::new_v4(),
                        user_id: owner.id,
                        title: request.title,
                        url: request.url,
                        icon: request.icon,
                        description: request.description,
                        order_index: position,
                        is_active: true,
                        click_count: 0,
                        created_at: now,
                        updated_at: now,
                    };

                    let link = diesel::insert_into(dsl::links)
                        .values(&new_link)
                        .returning(Link::as_returning())
                        .get_result::<Link>(conn)
                        .await?;

                    Ok(link)
                })
            })
            .await?;

        info!(
            "Created link {} for user {} at index {}",
            link.id, user_id, link.order_index
        );
        AuditLogger::log_link_action(AuditAction::LinkCreated, user_id, link.id, None);

        Ok(link)
    }

    /// Apply a partial update. An `order_index` moves the link within the list.
    #[instrument(skip(self, request))]
    pub async fn update_link(
        &self,
        link_id: Uuid,
        user_id: Uuid,
        mut request: UpdateLinkRequest,
    ) -> Result<Link, ServiceError> {
        use crate::schema::links::dsl;

        request.sanitize();
        request.validate()?;
        request
            .validate_custom()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.connection().await?;

        let link = conn
            .build_transaction()
            .read_committed()
            .run::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    User::find_for_update(conn, user_id).await?;
                    find_owned_link(conn, link_id, user_id).await?;

                    let now = Utc::now();
                    let mut changes = request.to_changeset();
                    changes.updated_at = now;

                    let mut link = diesel::update(dsl::links.find(link_id))
                        .set(&changes)
                        .returning(Link::as_returning())
                        .get_result::<Link>(conn)
                        .await?;

                    if let Some(target) = request.order_index {
                        let siblings = load_siblings(conn, user_id).await?;
                        let moves = ordering::move_to(&siblings, link_id, target)?;
                        apply_index_changes(conn, &moves, now).await?;

                        if let Some(own) = moves.iter().find(|c| c.link_id == link_id) {
                            link.order_index = own.order_index;
                        }
                    }

                    Ok(link)
                })
            })
            .await?;

        info!("Updated link {} for user {}", link_id, user_id);
        AuditLogger::log_link_action(AuditAction::LinkUpdated, user_id, link_id, None);

        Ok(link)
    }

    /// Delete a link and close the gap it leaves
    #[instrument(skip(self))]
    pub async fn delete_link(&self, link_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        use crate::schema::links::dsl;

        let mut conn = self.connection().await?;

        let renumbered = conn
            .build_transaction()
            .read_committed()
            .run::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    User::find_for_update(conn, user_id).await?;
                    let existing = find_owned_link(conn, link_id, user_id).await?;

                    diesel::delete(dsl::links.find(link_id))
                        .execute(conn)
                        .await?;

                    let remaining = load_siblings(conn, user_id).await?;
                    let changes =
                        ordering::compact_after_removal(&remaining, existing.order_index);
                    apply_index_changes(conn, &changes, Utc::now()).await?;

                    Ok(changes.len())
                })
            })
            .await?;

        info!(
            "Deleted link {} for user {}, renumbered {} siblings",
            link_id, user_id, renumbered
        );
        AuditLogger::log_link_action(
            AuditAction::LinkDeleted,
            user_id,
            link_id,
            Some(format!("renumbered {} siblings", renumbered)),
        );

        Ok(())
    }

    /// All of the user's links, ascending by position
    #[instrument(skip(self))]
    pub async fn list_links(&self, user_id: Uuid) -> Result<Vec<Link>, ServiceError> {
        let mut conn = self.connection().await?;
        Ok(load_user_links(&mut conn, user_id).await?)
    }

    /// Active links of the user with `username`. Unknown usernames yield an empty list.
    #[instrument(skip(self))]
    pub async fn list_public_links(&self, username: &str) -> Result<Vec<Link>, ServiceError> {
        use crate::schema::{links, users};

        let mut conn = self.connection().await?;

        let public_links = links::table
            .inner_join(users::table)
            .filter(users::username.eq(username))
            .filter(links::is_active.eq(true))
            .order((links::order_index.asc(), links::created_at.asc()))
            .select(Link::as_select())
            .load::<Link>(&mut conn)
            .await?;

        Ok(public_links)
    }

    /// Apply a reorder batch atomically and return the resulting list.
    ///
    /// The batch is rejected whole when any id is not the caller's, or when the
    /// resulting indices would not be exactly `0..n`.
    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    pub async fn reorder_links(
        &self,
        user_id: Uuid,
        batch: Vec<LinkOrder>,
    ) -> Result<Vec<Link>, ServiceError> {
        let mut conn = self.connection().await?;

        if batch.is_empty() {
            debug!("Empty reorder batch for user {}", user_id);
            return Ok(load_user_links(&mut conn, user_id).await?);
        }

        let touched: Vec<String> = batch.iter().map(|entry| entry.id.to_string()).collect();

        let reordered = conn
            .build_transaction()
            .read_committed()
            .run::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    User::find_for_update(conn, user_id).await?;
                    let siblings = load_siblings(conn, user_id).await?;
                    let changes = ordering::plan_reorder(&siblings, &batch)?;
                    apply_index_changes(conn, &changes, Utc::now()).await?;

                    Ok(load_user_links(conn, user_id).await?)
                })
            })
            .await?;

        info!("Reordered {} links for user {}", touched.len(), user_id);
        AuditLogger::log(
            AuditAction::LinksReordered,
            user_id,
            None,
            Some(format!("links: {}", touched.join(","))),
        );

        Ok(reordered)
    }

    /// Capacity summary. Inactive links count toward the limit.
    #[instrument(skip(self))]
    pub async fn check_limits(&self, user_id: Uuid) -> Result<LinkLimitsResponse, ServiceError> {
        use crate::schema::links::dsl;

        let mut conn = self.connection().await?;

        let user = User::find_by_id(&mut conn, user_id).await?;
        let link_count = dsl::links
            .filter(dsl::user_id.eq(user.id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let max_links = capacity::max_links(user.is_premium);

        Ok(LinkLimitsResponse {
            can_create_link: max_links.allows_another(link_count),
            link_count,
            max_links,
            is_premium: user.is_premium,
        })
    }
}
