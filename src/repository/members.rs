//! Members domain methods on Repository

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::{blank_to_null, folded_opt, push_like, push_like_any, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        member::{CreateMember, Member, MemberSearchFilter, UpdateMember},
        fold_case, Pagination,
    },
};

fn push_member_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: MemberSearchFilter, pattern: Option<&str>) {
    let Some(pattern) = pattern else {
        return;
    };
    qb.push(" WHERE ");
    match filter {
        MemberSearchFilter::Username => push_like(qb, "username_folded", pattern),
        MemberSearchFilter::Email => push_like(qb, "COALESCE(email_folded, '')", pattern),
        MemberSearchFilter::Address => push_like(qb, "COALESCE(address_folded, '')", pattern),
        MemberSearchFilter::Identity => push_like_any(
            qb,
            &[
                "username_folded",
                "COALESCE(email_folded, '')",
                "COALESCE(address_folded, '')",
            ],
            pattern,
        ),
        MemberSearchFilter::All => push_like_any(
            qb,
            &[
                "username_folded",
                "COALESCE(email_folded, '')",
                "COALESCE(address_folded, '')",
                "COALESCE(phone_number, '')",
            ],
            pattern,
        ),
    }
}

impl Repository {
    /// Get member by ID
    pub async fn members_get_by_id(&self, id: i64) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    /// Check if username already exists (case-insensitive)
    pub async fn members_username_exists(&self, username: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM members WHERE username_folded = ? AND id != ?)",
        )
        .bind(fold_case(username))
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Search members, newest first
    pub async fn members_search(
        &self,
        filter: MemberSearchFilter,
        pattern: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<(Vec<Member>, i64, Pagination)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM members");
        push_member_filter(&mut count, filter, pattern);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let pagination = pagination.clamp_to(total);
        let members = self
            .members_find(filter, pattern, pagination.per_page, pagination.offset())
            .await?;

        Ok((members, total, pagination))
    }

    pub async fn members_find(
        &self,
        filter: MemberSearchFilter,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Member>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM members");
        push_member_filter(&mut qb, filter, pattern);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<Member>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Create a new member
    pub async fn members_create(&self, data: &CreateMember) -> AppResult<Member> {
        let now = Utc::now();
        sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (
                username, username_folded, email, email_folded, address,
                address_folded, phone_number, profile_image, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.username)
        .bind(fold_case(&data.username))
        .bind(&data.email)
        .bind(folded_opt(data.email.as_deref()))
        .bind(&data.address)
        .bind(folded_opt(data.address.as_deref()))
        .bind(&data.phone_number)
        .bind(&data.profile_image)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "A member with that username already exists"))
    }

    /// Update the fields present in `data`
    pub async fn members_update(&self, id: i64, data: &UpdateMember) -> AppResult<Member> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE members SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(ref username) = data.username {
            qb.push(", username = ").push_bind(username.clone());
            qb.push(", username_folded = ").push_bind(fold_case(username));
        }
        if let Some(ref email) = data.email {
            qb.push(", email = ").push_bind(blank_to_null(email));
            qb.push(", email_folded = ").push_bind(folded_opt(Some(email.as_str())));
        }
        if let Some(ref address) = data.address {
            qb.push(", address = ").push_bind(blank_to_null(address));
            qb.push(", address_folded = ").push_bind(folded_opt(Some(address.as_str())));
        }
        if let Some(ref phone) = data.phone_number {
            qb.push(", phone_number = ").push_bind(blank_to_null(phone));
        }
        if let Some(ref image) = data.profile_image {
            qb.push(", profile_image = ").push_bind(blank_to_null(image));
        }

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Member>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "A member with that username already exists"))?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    /// Delete member
    pub async fn members_delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }
        Ok(())
    }

    pub async fn members_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
